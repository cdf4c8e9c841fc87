//! Server bootstrapper
//!
//! Configures an axum router with the toolkit's default middleware and
//! exposes a start/stop lifecycle. `start` is non-blocking: the listener
//! runs on its own task and failures after `start` has returned can only be
//! reported through logs. `stop` shuts down gracefully, bounded by a fixed
//! 5-second timeout, and surfaces shutdown failure to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use chassis_rs::{config::ServerConfig, logger, Server};
//!
//! # async fn run() -> Result<(), chassis_rs::ChassisError> {
//! let log = logger::default()?;
//! let routes = Router::new().route("/health", get(|| async { "ok" }));
//!
//! let mut server = Server::new(&ServerConfig::from_env(), &log)
//!     .with_router(routes)
//!     .with_default_middleware();
//! server.start()?;
//! // ... wait for a shutdown signal ...
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::error::ChassisError;
use crate::logger::Logger;

mod middleware;

/// Graceful shutdown is abandoned after this long.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP server wrapping an axum router
///
/// Logs through a `no_caller` derivative of the injected [`Logger`] for
/// request logging, panic recovery and lifecycle notifications.
pub struct Server {
    router: Router,
    config: ServerConfig,
    logger: Arc<dyn Logger>,
    shutdown: Option<oneshot::Sender<()>>,
    serving: Option<JoinHandle<()>>,
}

impl Server {
    /// Create a server for the given config and logger
    pub fn new(config: &ServerConfig, logger: &Arc<dyn Logger>) -> Self {
        Self {
            router: Router::new(),
            config: config.clone(),
            logger: logger.no_caller(),
            shutdown: None,
            serving: None,
        }
    }

    /// Install application routes
    ///
    /// Call before [`with_default_middleware`](Self::with_default_middleware)
    /// — the middleware wraps the routes registered so far.
    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Register the default middleware stack
    ///
    /// Request logging through the facade logger and panic recovery
    /// returning a JSON 500.
    pub fn with_default_middleware(mut self) -> Self {
        self.router = middleware::apply_defaults(self.router, self.logger.clone());
        self
    }

    /// The composed router, for direct use in tests or embedding
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Begin listening on the configured address, without blocking
    ///
    /// Bind and serve run on their own task; a failure there is logged at
    /// error severity rather than returned, since `start` has already
    /// returned by the time it can happen.
    pub fn start(&mut self) -> Result<(), ChassisError> {
        if self.serving.is_some() {
            return Err(ChassisError::server("server already started"));
        }

        let address = self.config.address();
        let router = self.router.clone();
        let logger = self.logger.clone();
        let (shutdown, shutdown_signal) = oneshot::channel::<()>();

        self.logger
            .info("api server starting", &[("listening", &address)]);

        let serving = tokio::spawn(async move {
            let listener = match TcpListener::bind(&address).await {
                Ok(listener) => listener,
                Err(err) => {
                    logger.error(
                        "api server failed to bind",
                        &[("address", &address), ("error", &err)],
                    );
                    return;
                }
            };
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_signal.await;
            });
            if let Err(err) = serve.await {
                logger.error("api server failed to serve", &[("error", &err)]);
            }
        });

        self.shutdown = Some(shutdown);
        self.serving = Some(serving);
        Ok(())
    }

    /// Shut down gracefully, bounded by a fixed 5-second timeout
    ///
    /// In-flight requests get a chance to finish. A timeout or a failed
    /// serve task is logged and returned as an error.
    pub async fn stop(&mut self) -> Result<(), ChassisError> {
        self.logger.info("api server is shutting down", &[]);

        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(mut serving) = self.serving.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut serving).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    self.logger
                        .error("api server task failed", &[("error", &err)]);
                    return Err(ChassisError::server(format!("serve task failed: {err}")));
                }
                Err(_) => {
                    serving.abort();
                    let timeout_secs = SHUTDOWN_TIMEOUT.as_secs();
                    self.logger.error(
                        "api server shutdown timed out",
                        &[("timeout_secs", &timeout_secs)],
                    );
                    return Err(ChassisError::ShutdownTimeout { timeout_secs });
                }
            }
        }

        self.logger.info("api server stopped gracefully", &[]);
        Ok(())
    }
}
