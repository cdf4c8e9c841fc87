use axum::extract::State;
use axum::Json;
use chassis::ChassisError;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Deserialize;

use crate::models::notes;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct CreateNote {
    pub body: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateNote>,
) -> Result<Json<notes::Model>, ChassisError> {
    let note = state
        .repository
        .with_txn(None, |txn| {
            Box::pin(async move {
                let note = notes::ActiveModel {
                    body: Set(payload.body),
                    ..Default::default()
                };
                Ok(note.insert(txn).await?)
            })
        })
        .await?;

    Ok(Json(note))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<notes::Model>>, ChassisError> {
    let notes = notes::Entity::find().all(state.repository.inner()).await?;
    Ok(Json(notes))
}
