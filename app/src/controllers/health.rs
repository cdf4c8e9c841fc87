use axum::extract::State;
use axum::Json;

use crate::routes::AppState;

pub async fn show(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "deployment": state.deployment,
    }))
}
