use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{AuthActor, MaybeActor},
    errors::AppError,
    models::{AggregateFilter, AggregateView, FavoritesPage, PageQuery, RatedAggregate},
    service::{self, ReconcileReport},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CreateAggregatePayload {
    pub title: String,
}

#[derive(Deserialize)]
pub struct AggregateListQuery {
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub favorited: bool,
}

pub async fn create_aggregate_handler(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(payload): Json<CreateAggregatePayload>,
) -> Result<Json<RatedAggregate>, (StatusCode, String)> {
    let aggregate = service::create_aggregate(state.store.as_ref(), &payload.title)
        .await
        .map_err(|e| {
            tracing::error!("Error creating aggregate for {}: {}", actor.id, e);
            e.to_response()
        })?;

    Ok(Json(aggregate))
}

pub async fn get_aggregate_handler(
    Path(aggregate_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<RatedAggregate>, (StatusCode, String)> {
    let aggregate = service::get_visible_aggregate(state.store.as_ref(), aggregate_id)
        .await
        .map_err(|e| {
            tracing::error!("Error retrieving aggregate {aggregate_id}: {}", e);
            e.to_response()
        })?;

    Ok(Json(aggregate))
}

pub async fn list_aggregates_handler(
    Query(query): Query<AggregateListQuery>,
    MaybeActor(viewer): MaybeActor,
    State(state): State<AppState>,
) -> Result<Json<FavoritesPage<AggregateView>>, (StatusCode, String)> {
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(state.config.default_page_size, state.config.max_page_size)
    .map_err(|e| e.to_response())?;

    let filter = AggregateFilter {
        keyword: query.keyword,
    };

    let page = service::list_aggregates(state.store.as_ref(), &filter, viewer, request)
        .await
        .map_err(|e| {
            tracing::error!("Error listing aggregates: {}", e);
            e.to_response()
        })?;

    tracing::info!(
        "Retrieved {} aggregates on page {}",
        page.items.len(),
        page.page
    );
    Ok(Json(page))
}

pub async fn toggle_favorite_handler(
    Path(aggregate_id): Path<Uuid>,
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
) -> Result<Json<FavoriteResponse>, (StatusCode, String)> {
    let favorited = service::toggle_favorite(state.store.as_ref(), actor, aggregate_id)
        .await
        .map_err(|e| {
            tracing::error!("Error toggling favorite {aggregate_id}: {}", e);
            e.to_response()
        })?;

    Ok(Json(FavoriteResponse { favorited }))
}

pub async fn reconcile_handler(
    Path(aggregate_id): Path<Uuid>,
    AuthActor(actor): AuthActor,
    State(state): State<AppState>,
) -> Result<Json<ReconcileReport>, (StatusCode, String)> {
    if !actor.is_elevated {
        tracing::error!("Reconcile attempt by non-staff user {}", actor.id);
        return Err(AppError::Unauthorized("Staff only".into()).to_response());
    }

    let report = service::reconcile(
        state.store.as_ref(),
        aggregate_id,
        state.max_commit_retries(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Error reconciling aggregate {aggregate_id}: {}", e);
        e.to_response()
    })?;

    Ok(Json(report))
}
