use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{AuthActor, MaybeActor},
    models::{PageQuery, PinnedPage, SampleOrder, SampleView, ScoredSample},
    service,
    state::AppState,
};

#[derive(Deserialize)]
pub struct CreateSamplePayload {
    pub score: f64,
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSamplePayload {
    pub score: f64,
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct SampleListQuery {
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn create_sample_handler(
    Path(aggregate_id): Path<Uuid>,
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Json(payload): Json<CreateSamplePayload>,
) -> Result<Json<Uuid>, (StatusCode, String)> {
    let sample_id = service::create_sample(
        state.store.as_ref(),
        aggregate_id,
        actor,
        payload.score,
        payload.content.unwrap_or_default(),
        state.max_commit_retries(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Error creating sample on {aggregate_id}: {}", e);
        e.to_response()
    })?;

    Ok(Json(sample_id))
}

pub async fn get_sample_handler(
    Path(sample_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ScoredSample>, (StatusCode, String)> {
    let sample = service::get_active_sample(state.store.as_ref(), sample_id)
        .await
        .map_err(|e| {
            tracing::error!("Error retrieving sample {sample_id}: {}", e);
            e.to_response()
        })?;

    Ok(Json(sample))
}

pub async fn update_sample_handler(
    Path(sample_id): Path<Uuid>,
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSamplePayload>,
) -> Result<Json<ScoredSample>, (StatusCode, String)> {
    let sample = service::update_sample(
        state.store.as_ref(),
        sample_id,
        actor,
        payload.score,
        payload.content,
        state.max_commit_retries(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Error updating sample {sample_id}: {}", e);
        e.to_response()
    })?;

    Ok(Json(sample))
}

pub async fn delete_sample_handler(
    Path(sample_id): Path<Uuid>,
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
) -> Result<Json<&'static str>, (StatusCode, String)> {
    service::delete_sample(
        state.store.as_ref(),
        sample_id,
        actor,
        state.max_commit_retries(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Error deleting sample {sample_id}: {}", e);
        e.to_response()
    })?;

    Ok(Json("success"))
}

pub async fn list_samples_handler(
    Path(aggregate_id): Path<Uuid>,
    Query(query): Query<SampleListQuery>,
    MaybeActor(viewer): MaybeActor,
    State(state): State<AppState>,
) -> Result<Json<PinnedPage<SampleView>>, (StatusCode, String)> {
    let order = match query.order.as_deref() {
        Some(raw) => raw.parse::<SampleOrder>().map_err(|e| e.to_response())?,
        None => SampleOrder::default(),
    };
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(state.config.default_page_size, state.config.max_page_size)
    .map_err(|e| e.to_response())?;

    let page = service::list_samples(state.store.as_ref(), aggregate_id, viewer, order, request)
        .await
        .map_err(|e| {
            tracing::error!("Error listing samples of {aggregate_id}: {}", e);
            e.to_response()
        })?;

    tracing::info!(
        "Retrieved {} samples of {aggregate_id} on page {}",
        page.items.len(),
        page.page
    );
    Ok(Json(page))
}
