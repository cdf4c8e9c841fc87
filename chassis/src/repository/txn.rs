//! Request-scoped transaction reuse
//!
//! A [`SharedTxn`] carried in `http::Extensions` lets several repository
//! calls within one request run against the same transaction. The slot is
//! typed — there is no ambient or global lookup; whoever opens the
//! transaction owns commit/rollback.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::Extensions;
use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::error::ChassisError;
use crate::repository::Repository;

/// A shared transaction injected into request extensions
#[derive(Clone)]
pub struct SharedTxn(Arc<DatabaseTransaction>);

impl SharedTxn {
    /// Wrap an open transaction for sharing
    pub fn new(txn: DatabaseTransaction) -> Self {
        Self(Arc::new(txn))
    }

    /// Get a reference to the underlying transaction
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.0
    }

    /// Store this handle in the request's extensions
    pub fn inject(self, extensions: &mut Extensions) {
        extensions.insert(self);
    }

    /// Retrieve a previously injected handle
    pub fn from_extensions(extensions: &Extensions) -> Option<Self> {
        extensions.get::<SharedTxn>().cloned()
    }

    /// Recover the transaction once every clone has been dropped
    ///
    /// Returns `None` while other holders remain. Useful for callers that
    /// own the transaction lifecycle (tests, request teardown).
    pub fn try_into_inner(self) -> Option<DatabaseTransaction> {
        Arc::try_unwrap(self.0).ok()
    }
}

impl Repository {
    /// Execute a closure within a database transaction
    ///
    /// 1) A [`SharedTxn`] in the request extensions is reused; commit and
    ///    rollback stay with whoever injected it.
    /// 2) Otherwise a fresh transaction is owned here: commit on Ok,
    ///    best-effort rollback on Err preserving the original error.
    ///
    /// Rollbacks are logged unless the error is the mapping layer's
    /// record-not-found and the config asked to ignore it.
    pub async fn with_txn<R, F>(
        &self,
        extensions: Option<&Extensions>,
        f: F,
    ) -> Result<R, ChassisError>
    where
        F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        )
            -> Pin<Box<dyn Future<Output = Result<R, ChassisError>> + Send + 'c>>,
    {
        if let Some(shared) = extensions.and_then(SharedTxn::from_extensions) {
            return f(shared.transaction()).await;
        }

        let txn = self.inner().begin().await?;
        match f(&txn).await {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(err) => {
                let _ = txn.rollback().await;
                if !(self.ignore_not_found && err.is_not_found()) {
                    self.log
                        .error("transaction rolled back", &[("error", &err)]);
                }
                Err(err)
            }
        }
    }
}
