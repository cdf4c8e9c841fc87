//! Repository bootstrapper
//!
//! Chooses and configures a relational backend from [`DatabaseConfig`] and
//! wraps it in a clonable, thread-safe [`Repository`] handle:
//!
//! - empty host: an in-memory SQLite database (shared cache, named after the
//!   configured database so every pooled connection sees the same data)
//! - non-empty host: a networked PostgreSQL database, created through a
//!   maintenance connection when it does not exist yet
//!
//! Pool settings and statement logging are applied uniformly to both
//! backends. SQL-event logging goes through a `no_caller` derivative of the
//! injected [`Logger`] so records do not point into this module.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

use crate::config::DatabaseConfig;
use crate::error::ChassisError;
use crate::logger::Logger;

mod txn;

pub use txn::SharedTxn;

/// Connections to either backend are recycled after this long.
const CONN_MAX_LIFETIME: Duration = Duration::from_secs(60);

/// Relational backend selected from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-lifetime in-memory SQLite database
    Memory,
    /// Networked PostgreSQL database
    Postgres,
}

impl BackendKind {
    /// Selection policy: an empty host means in-memory
    pub fn select(config: &DatabaseConfig) -> Self {
        if config.host.is_empty() {
            Self::Memory
        } else {
            Self::Postgres
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Postgres => write!(f, "postgres"),
        }
    }
}

/// Clonable, thread-safe handle to the configured database
///
/// Wraps the mapping layer's connection pool; concurrency safety is fully
/// delegated to the pool. Dereferences to [`DatabaseConnection`] for direct
/// queries.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<DatabaseConnection>,
    log: Arc<dyn Logger>,
    ignore_not_found: bool,
}

impl Repository {
    /// Connect to the backend selected by the configuration
    pub async fn connect(
        config: &DatabaseConfig,
        logger: &Arc<dyn Logger>,
    ) -> Result<Self, ChassisError> {
        let log = logger.no_caller();
        let backend = BackendKind::select(config);

        let connection = match backend {
            BackendKind::Memory => connect_memory(config).await?,
            BackendKind::Postgres => connect_postgres(config, &log).await?,
        };

        log.info(
            "repository connected",
            &[("backend", &backend), ("database", &config.name)],
        );

        Ok(Self {
            inner: Arc::new(connection),
            log,
            ignore_not_found: config.ignore_record_not_found,
        })
    }

    /// Get a reference to the underlying connection pool
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }
}

impl AsRef<DatabaseConnection> for Repository {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

impl std::ops::Deref for Repository {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

async fn connect_memory(config: &DatabaseConfig) -> Result<DatabaseConnection, ChassisError> {
    let url = memory_url(&config.name);
    let connection = Database::connect(connect_options(&url, config)).await?;
    Ok(connection)
}

async fn connect_postgres(
    config: &DatabaseConfig,
    log: &Arc<dyn Logger>,
) -> Result<DatabaseConnection, ChassisError> {
    // A short-lived maintenance connection creates the target database when
    // it is missing; application pool settings do not apply to it.
    let mut admin_options = ConnectOptions::new(config.url_for("postgres"));
    admin_options
        .max_connections(1)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    let admin = Database::connect(admin_options).await?;

    let created = ensure_database(&admin, &config.name).await?;
    if created {
        log.info("database created", &[("database", &config.name)]);
    }
    admin.close().await?;

    let url = config.url_for(&config.name);
    let connection = Database::connect(connect_options(&url, config)).await?;
    Ok(connection)
}

async fn ensure_database(
    admin: &DatabaseConnection,
    name: &str,
) -> Result<bool, ChassisError> {
    if database_exists(admin, name).await? {
        return Ok(false);
    }
    if let Err(err) = admin
        .execute_unprepared(&create_database_statement(name))
        .await
    {
        // Lost a creation race with another instance: the database existing
        // now is success, anything else is the original failure.
        if !database_exists(admin, name).await? {
            return Err(err.into());
        }
        return Ok(false);
    }
    Ok(true)
}

async fn database_exists(admin: &DatabaseConnection, name: &str) -> Result<bool, ChassisError> {
    let query = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT 1 FROM pg_database WHERE datname = $1",
        [name.into()],
    );
    Ok(admin.query_one(query).await?.is_some())
}

fn create_database_statement(name: &str) -> String {
    format!("CREATE DATABASE \"{}\"", name.replace('"', "\"\""))
}

fn memory_url(name: &str) -> String {
    format!("sqlite:{}?mode=memory&cache=shared", name)
}

fn connect_options(url: &str, config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.pool_size)
        .max_lifetime(CONN_MAX_LIFETIME)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    match statement_log_level(&config.log_level) {
        None => {
            options.sqlx_logging(false);
        }
        Some(level) => {
            options.sqlx_logging(true).sqlx_logging_level(level);
        }
    }
    if config.slow_query_threshold_ms > 0 {
        options.sqlx_slow_statements_logging_settings(
            log::LevelFilter::Warn,
            Duration::from_millis(config.slow_query_threshold_ms),
        );
    }
    options
}

/// Map the configured verbosity string to a statement log level
///
/// Case-insensitive; `silent` disables statement logging entirely and any
/// unrecognized value falls back to info.
fn statement_log_level(level: &str) -> Option<log::LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "silent" => None,
        "error" => Some(log::LevelFilter::Error),
        "warn" => Some(log::LevelFilter::Warn),
        _ => Some(log::LevelFilter::Info),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::logger::TracingLogger;

    fn memory_config(name: &str) -> DatabaseConfig {
        DatabaseConfig::builder().host("").name(name).build()
    }

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(TracingLogger::default())
    }

    #[test]
    fn test_backend_selection() {
        let memory = DatabaseConfig::builder().host("").build();
        assert_eq!(BackendKind::select(&memory), BackendKind::Memory);

        let networked = DatabaseConfig::builder().host("db.example.com").build();
        assert_eq!(BackendKind::select(&networked), BackendKind::Postgres);
    }

    #[test]
    fn test_statement_log_level_mapping() {
        assert_eq!(statement_log_level("silent"), None);
        assert_eq!(statement_log_level("SILENT"), None);
        assert_eq!(statement_log_level("error"), Some(log::LevelFilter::Error));
        assert_eq!(statement_log_level("WARN"), Some(log::LevelFilter::Warn));
        assert_eq!(statement_log_level("info"), Some(log::LevelFilter::Info));
        assert_eq!(statement_log_level("verbose"), Some(log::LevelFilter::Info));
    }

    #[test]
    fn test_create_database_statement_quotes_identifier() {
        assert_eq!(create_database_statement("app"), "CREATE DATABASE \"app\"");
        assert_eq!(
            create_database_statement("we\"ird"),
            "CREATE DATABASE \"we\"\"ird\""
        );
    }

    #[test]
    fn test_memory_url_is_shared_cache() {
        assert_eq!(memory_url("app"), "sqlite:app?mode=memory&cache=shared");
    }

    #[tokio::test]
    async fn test_memory_backend_roundtrip() {
        let repo = Repository::connect(&memory_config("repo_roundtrip"), &test_logger())
            .await
            .unwrap();

        repo.execute_unprepared(
            "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, label TEXT NOT NULL)",
        )
        .await
        .unwrap();
        repo.execute_unprepared("INSERT INTO items (label) VALUES ('first')")
            .await
            .unwrap();

        let row = repo
            .query_one(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT COUNT(*) AS n FROM items",
            ))
            .await
            .unwrap()
            .unwrap();
        let n: i64 = row.try_get("", "n").unwrap();
        assert_eq!(n, 1);
    }
}
