//! Default logging backend built on `tracing`

use std::fmt::Write as _;
use std::panic::Location;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::ChassisError;
use crate::logger::{Fields, Logger};

/// The standard [`Logger`] backend
///
/// `init` installs a global fmt subscriber (filtered by `RUST_LOG`, `info`
/// by default) and returns an instance tagged with the deployment label.
/// An already-installed subscriber is not an error, so several loggers can
/// coexist in one process. Records carry a `caller=<file>:<line>` field
/// captured at the logging call site unless the instance was derived with
/// `no_caller`.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    deployment: String,
    with_caller: bool,
}

enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl TracingLogger {
    fn configured(&self, config: &Config) -> Self {
        Self {
            deployment: config.deployment.clone(),
            with_caller: true,
        }
    }

    fn without_caller(&self) -> Self {
        Self {
            deployment: self.deployment.clone(),
            with_caller: false,
        }
    }

    fn emit(
        &self,
        severity: Severity,
        caller: &'static Location<'static>,
        msg: &str,
        fields: Fields<'_>,
    ) {
        let deployment = self.deployment.as_str();
        let detail = render_fields(fields);
        let site = self
            .with_caller
            .then(|| format!("{}:{}", caller.file(), caller.line()));

        macro_rules! event {
            ($level:ident) => {
                match site {
                    Some(ref site) => {
                        tracing::$level!(deployment = %deployment, caller = %site, "{}{}", msg, detail)
                    }
                    None => tracing::$level!(deployment = %deployment, "{}{}", msg, detail),
                }
            };
        }

        match severity {
            Severity::Debug => event!(debug),
            Severity::Info => event!(info),
            Severity::Warn => event!(warn),
            Severity::Error => event!(error),
        }
    }
}

impl Logger for TracingLogger {
    fn init(&self, config: &Config) -> Result<Arc<dyn Logger>, ChassisError> {
        install_subscriber();
        Ok(Arc::new(self.configured(config)))
    }

    fn no_caller(&self) -> Arc<dyn Logger> {
        Arc::new(self.without_caller())
    }

    #[track_caller]
    fn debug(&self, msg: &str, fields: Fields<'_>) {
        self.emit(Severity::Debug, Location::caller(), msg, fields);
    }

    #[track_caller]
    fn info(&self, msg: &str, fields: Fields<'_>) {
        self.emit(Severity::Info, Location::caller(), msg, fields);
    }

    #[track_caller]
    fn warn(&self, msg: &str, fields: Fields<'_>) {
        self.emit(Severity::Warn, Location::caller(), msg, fields);
    }

    #[track_caller]
    fn error(&self, msg: &str, fields: Fields<'_>) {
        self.emit(Severity::Error, Location::caller(), msg, fields);
    }
}

fn install_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // try_init: an already-set global subscriber keeps the existing output.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn render_fields(fields: Fields<'_>) -> String {
    let mut out = String::new();
    for (key, value) in fields {
        out.push(' ');
        out.push_str(if key.is_empty() { "field" } else { key });
        out.push('=');
        let _ = write!(out, "{value}");
    }
    out
}
