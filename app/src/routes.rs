use axum::routing::get;
use axum::Router;
use chassis::Repository;

use crate::controllers;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub repository: Repository,
    pub deployment: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(controllers::health::show))
        .route(
            "/notes",
            get(controllers::notes::list).post(controllers::notes::create),
        )
        .with_state(state)
}
