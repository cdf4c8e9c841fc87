use std::path::Path;

use chassis::config::{env, Config};
use chassis::{logger, ChassisError, Repository, Server};
use sea_orm::{ConnectionTrait, Schema};

mod controllers;
mod models;
mod routes;

#[tokio::main]
async fn main() -> Result<(), ChassisError> {
    env::load_dotenv(Path::new("."));
    let config = Config::from_env();

    let log = logger::default()?;
    let repository = Repository::connect(&config.database, &log).await?;
    setup_schema(&repository).await?;

    let state = routes::AppState {
        repository,
        deployment: config.deployment.clone(),
    };

    let mut server = Server::new(&config.server, &log)
        .with_router(routes::router(state))
        .with_default_middleware();
    server.start()?;
    log.info("demo service ready", &[("deployment", &config.deployment)]);

    tokio::signal::ctrl_c().await?;
    server.stop().await?;
    Ok(())
}

/// Create the demo table from the entity definition when it is missing.
async fn setup_schema(repository: &Repository) -> Result<(), ChassisError> {
    let backend = repository.get_database_backend();
    let schema = Schema::new(backend);
    let mut table = schema.create_table_from_entity(models::notes::Entity);
    table.if_not_exists();
    repository.execute(backend.build(&table)).await?;
    Ok(())
}
