use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthActor,
    models::Direction,
    service::{self, ReactionOutcome},
    state::AppState,
};

#[derive(Deserialize)]
pub struct ReactionPayload {
    pub action: String,
}

pub async fn toggle_reaction_handler(
    Path(sample_id): Path<Uuid>,
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Json(payload): Json<ReactionPayload>,
) -> Result<Json<ReactionOutcome>, (StatusCode, String)> {
    let direction = payload
        .action
        .parse::<Direction>()
        .map_err(|e| e.to_response())?;

    let outcome = service::toggle_reaction(
        state.store.as_ref(),
        actor,
        sample_id,
        direction,
        state.max_commit_retries(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Error toggling reaction on {sample_id}: {}", e);
        e.to_response()
    })?;

    Ok(Json(outcome))
}
