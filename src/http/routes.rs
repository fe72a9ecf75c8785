use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        create_aggregate_handler, create_sample_handler, delete_sample_handler,
        get_aggregate_handler, get_sample_handler, list_aggregates_handler, list_samples_handler,
        reconcile_handler, toggle_favorite_handler, toggle_reaction_handler,
        update_sample_handler,
    },
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/aggregates",
            get(list_aggregates_handler).post(create_aggregate_handler),
        )
        .route("/aggregates/{aggregate_id}", get(get_aggregate_handler))
        .route(
            "/aggregates/{aggregate_id}/favorite",
            post(toggle_favorite_handler),
        )
        .route(
            "/aggregates/{aggregate_id}/reconcile",
            post(reconcile_handler),
        )
        .route(
            "/aggregates/{aggregate_id}/samples",
            get(list_samples_handler).post(create_sample_handler),
        )
        .route(
            "/samples/{sample_id}",
            get(get_sample_handler)
                .put(update_sample_handler)
                .delete(delete_sample_handler),
        )
        .route("/samples/{sample_id}/reaction", post(toggle_reaction_handler))
        .with_state(state)
}
