pub mod config;
pub mod error;
pub mod logger;
pub mod repository;
pub mod server;

pub use config::{Config, DatabaseConfig, ServerConfig};
pub use error::ChassisError;
pub use logger::{Logger, TracingLogger};
pub use repository::{Repository, SharedTxn};
pub use server::Server;
