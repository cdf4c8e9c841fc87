//! Configuration module for the chassis toolkit
//!
//! Provides plain data holders consumed by the logger, repository and server
//! bootstrappers, with:
//! - `.env` file loading keyed by the deployment label
//! - `from_env()` constructors with typed defaults
//! - builders whose unset fields fall back to the env defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use chassis_rs::config::{env, Config};
//!
//! env::load_dotenv(std::path::Path::new("."));
//! let config = Config::from_env();
//! println!("deployment: {}", config.deployment);
//! ```

pub mod env;

mod database;
mod server;

pub use database::{DatabaseConfig, DatabaseConfigBuilder};
pub use server::{ServerConfig, ServerConfigBuilder};

/// Top-level configuration passed into the bootstrappers
///
/// Owned by the caller, built once at startup and passed by reference into
/// `logger::new`, `Repository::connect` and `Server::new`. The deployment
/// label is never empty: construction substitutes `"default"` when the
/// caller or the environment does not supply one.
#[derive(Debug, Clone)]
pub struct Config {
    /// Free-text label identifying the running environment/instance
    pub deployment: String,
    /// Repository bootstrapper configuration
    pub database: DatabaseConfig,
    /// Server bootstrapper configuration
    pub server: ServerConfig,
}

impl Config {
    /// Create a config carrying the given deployment label
    ///
    /// Database and server sections take their env defaults. An empty label
    /// is replaced with `"default"`.
    pub fn new(deployment: impl Into<String>) -> Self {
        let deployment = deployment.into();
        Self {
            deployment: if deployment.is_empty() {
                env::DEFAULT_DEPLOYMENT.to_string()
            } else {
                deployment
            },
            database: DatabaseConfig::from_env(),
            server: ServerConfig::from_env(),
        }
    }

    /// Build the whole config from environment variables
    pub fn from_env() -> Self {
        Self {
            deployment: env::deployment(),
            database: DatabaseConfig::from_env(),
            server: ServerConfig::from_env(),
        }
    }

    /// Create a builder for customizing config
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    deployment: Option<String>,
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
}

impl ConfigBuilder {
    /// Set the deployment label
    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = Some(deployment.into());
        self
    }

    /// Set the database section
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.database = Some(database);
        self
    }

    /// Set the server section
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Build the Config
    pub fn build(self) -> Config {
        Config {
            deployment: match self.deployment {
                Some(deployment) if !deployment.is_empty() => deployment,
                _ => env::deployment(),
            },
            database: self.database.unwrap_or_default(),
            server: self.server.unwrap_or_default(),
        }
    }
}
