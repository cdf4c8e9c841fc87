//! Pluggable logging facade
//!
//! Decouples the toolkit (and the services built on it) from the concrete
//! logging backend. A backend satisfies the [`Logger`] capability set; the
//! shipped backend is [`TracingLogger`]. Only one concrete backend exists
//! today — the trait seam is there so a future backend (or a test stub) can
//! be swapped in through an option, nothing more.
//!
//! # Example
//!
//! ```rust,no_run
//! use chassis_rs::{config::Config, logger};
//!
//! let log = logger::new(&Config::new("prod"), Vec::new()).unwrap();
//! log.info("service ready", &[("port", &8080)]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::{env, Config};
use crate::error::ChassisError;

mod tracing_logger;

pub use tracing_logger::TracingLogger;

/// Key/value pairs attached to a single log record
///
/// Values render through `Display`; rendering is best-effort and never
/// fails a logging call.
pub type Fields<'a> = &'a [(&'a str, &'a dyn fmt::Display)];

/// Capability set every logging backend provides
///
/// A `Logger` is created once per process (or per component needing isolated
/// configuration), shared read-only, and dropped when no longer referenced;
/// there is no explicit teardown. Implementations are expected to be safe
/// for concurrent invocation.
pub trait Logger: Send + Sync {
    /// Perform all backend setup and return a ready-to-use logger
    ///
    /// Called by [`new`] on whichever backend was selected; the backend must
    /// configure itself from `config` rather than assume global state.
    fn init(&self, config: &Config) -> Result<Arc<dyn Logger>, ChassisError>;

    /// A variant of this logger that omits call-site metadata
    ///
    /// Used by collaborators that log on behalf of the caller (the
    /// repository and server bootstrappers) and would otherwise report a
    /// misleading call site. All other configuration is identical.
    fn no_caller(&self) -> Arc<dyn Logger>;

    /// Emit one record at debug severity
    #[track_caller]
    fn debug(&self, msg: &str, fields: Fields<'_>);

    /// Emit one record at info severity
    #[track_caller]
    fn info(&self, msg: &str, fields: Fields<'_>);

    /// Emit one record at warn severity
    #[track_caller]
    fn warn(&self, msg: &str, fields: Fields<'_>);

    /// Emit one record at error severity
    #[track_caller]
    fn error(&self, msg: &str, fields: Fields<'_>);
}

/// Accumulates the backend selection before [`new`] finalizes it
#[derive(Default)]
pub struct LoggerBuilder {
    backend: Option<Arc<dyn Logger>>,
}

impl LoggerBuilder {
    /// Select the backend implementation to initialize
    pub fn backend(&mut self, backend: Arc<dyn Logger>) -> &mut Self {
        self.backend = Some(backend);
        self
    }
}

/// A mutation applied to the builder before the backend is finalized
///
/// Options compose by sequential application; the last write wins on
/// conflicting fields.
pub type LoggerOption = Box<dyn FnOnce(&mut LoggerBuilder)>;

/// Option selecting a backend implementation
pub fn with_backend(backend: Arc<dyn Logger>) -> LoggerOption {
    Box::new(move |builder| {
        builder.backend(backend);
    })
}

/// Create a logger from config and options
///
/// Applies each option in order, defaults the backend to [`TracingLogger`]
/// when none was selected, and delegates to the backend's `init`. Whatever
/// `init` returns — logger or error — is propagated unchanged: construction
/// failures are fully owned by the backend.
pub fn new(config: &Config, options: Vec<LoggerOption>) -> Result<Arc<dyn Logger>, ChassisError> {
    let mut builder = LoggerBuilder::default();
    for option in options {
        option(&mut builder);
    }
    let backend = builder
        .backend
        .unwrap_or_else(|| Arc::new(TracingLogger::default()));
    backend.init(config)
}

/// Zero-configuration entry point
///
/// Reads the deployment label from the environment (`DEPLOYMENT`, literal
/// `"default"` when absent or empty) and calls [`new`] with a config
/// carrying only that label and no options.
pub fn default() -> Result<Arc<dyn Logger>, ChassisError> {
    new(&Config::new(env::deployment()), Vec::new())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use super::*;

    /// Backend whose `init` always fails with its label, making the
    /// selected backend observable through the returned error.
    struct FailingBackend {
        label: &'static str,
    }

    impl Logger for FailingBackend {
        fn init(&self, _config: &Config) -> Result<Arc<dyn Logger>, ChassisError> {
            Err(ChassisError::logger(self.label))
        }

        fn no_caller(&self) -> Arc<dyn Logger> {
            Arc::new(FailingBackend { label: self.label })
        }

        fn debug(&self, _msg: &str, _fields: Fields<'_>) {}
        fn info(&self, _msg: &str, _fields: Fields<'_>) {}
        fn warn(&self, _msg: &str, _fields: Fields<'_>) {}
        fn error(&self, _msg: &str, _fields: Fields<'_>) {}
    }

    /// Backend recording the config its `init` received.
    #[derive(Clone, Default)]
    struct CapturingBackend {
        seen: Arc<Mutex<Option<String>>>,
    }

    impl Logger for CapturingBackend {
        fn init(&self, config: &Config) -> Result<Arc<dyn Logger>, ChassisError> {
            *self.seen.lock().unwrap() = Some(config.deployment.clone());
            Ok(Arc::new(self.clone()))
        }

        fn no_caller(&self) -> Arc<dyn Logger> {
            Arc::new(self.clone())
        }

        fn debug(&self, _msg: &str, _fields: Fields<'_>) {}
        fn info(&self, _msg: &str, _fields: Fields<'_>) {}
        fn warn(&self, _msg: &str, _fields: Fields<'_>) {}
        fn error(&self, _msg: &str, _fields: Fields<'_>) {}
    }

    #[test]
    fn test_zero_options_matches_explicit_default_backend() {
        let config = Config::new("test");

        let implicit = new(&config, Vec::new());
        let explicit = new(
            &config,
            vec![with_backend(Arc::new(TracingLogger::default()))],
        );

        assert!(implicit.is_ok());
        assert!(explicit.is_ok());
    }

    #[test]
    fn test_last_option_wins() {
        let config = Config::new("test");
        let err = new(
            &config,
            vec![
                with_backend(Arc::new(FailingBackend { label: "first" })),
                with_backend(Arc::new(FailingBackend { label: "second" })),
            ],
        )
        .err()
        .unwrap();

        assert_eq!(err.to_string(), "logger initialization failed: second");
    }

    #[test]
    fn test_init_error_is_propagated_unwrapped() {
        let config = Config::new("test");
        let result = new(
            &config,
            vec![with_backend(Arc::new(FailingBackend { label: "boom" }))],
        );

        let err = result.err().unwrap();
        assert!(matches!(err, ChassisError::Logger { .. }));
        assert_eq!(err.to_string(), "logger initialization failed: boom");
    }

    #[test]
    fn test_init_receives_the_caller_config() {
        let backend = CapturingBackend::default();
        let seen = backend.seen.clone();

        new(&Config::new("edge-7"), vec![with_backend(Arc::new(backend))]).unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("edge-7"));
    }

    #[test]
    #[serial]
    fn test_default_reads_deployment_from_env() {
        let backend = CapturingBackend::default();
        let seen = backend.seen.clone();

        std::env::set_var(env::DEPLOYMENT_VAR, "prod");
        new(
            &Config::new(env::deployment()),
            vec![with_backend(Arc::new(backend.clone()))],
        )
        .unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("prod"));

        std::env::remove_var(env::DEPLOYMENT_VAR);
        new(
            &Config::new(env::deployment()),
            vec![with_backend(Arc::new(backend))],
        )
        .unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("default"));

        // And the real zero-configuration path stays usable.
        assert!(default().is_ok());
    }
}
