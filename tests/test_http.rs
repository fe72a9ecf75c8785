use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use game_reviews_be::{
    auth::generate_jwt, build_router, config::Config, db::MemoryStore, models::Actor,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn app() -> Router {
    build_router(AppState::new(
        Arc::new(MemoryStore::new()),
        Config::for_memory(SECRET),
    ))
}

fn token(actor: &Actor) -> String {
    generate_jwt(actor, SECRET).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<&Actor>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(actor)));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_game(app: &Router, actor: &Actor) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/aggregates",
        Some(actor),
        Some(json!({ "title": "Stardew Valley" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_writes_require_token() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/aggregates",
        None,
        Some(json!({ "title": "Untitled" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sample_flow_over_http() {
    let app = app();
    let author = Actor::new(Uuid::new_v4());
    let stranger = Actor::new(Uuid::new_v4());
    let game_id = create_game(&app, &author).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/aggregates/{game_id}/samples"),
        Some(&author),
        Some(json!({ "score": 4.0, "content": "Cozy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let sample_id = body.as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/aggregates/{game_id}/samples"),
        Some(&author),
        Some(json!({ "score": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/samples/{sample_id}"),
        Some(&stranger),
        Some(json!({ "score": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/samples/{sample_id}/reaction"),
        Some(&stranger),
        Some(json!({ "action": "like" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newState"], "positive");
    assert_eq!(body["likes"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/aggregates/{game_id}/samples"),
        Some(&author),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pinned"]["id"], sample_id.as_str());
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["pinned"]["likes"], 1);

    let (status, body) = send(&app, "GET", &format!("/aggregates/{game_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meanScore"], 4.0);
    assert_eq!(body["sampleCount"], 1);
    assert!(body.get("version").is_none());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/samples/{sample_id}"),
        Some(&author),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/samples/{sample_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_rejects_bad_paging() {
    let app = app();
    let author = Actor::new(Uuid::new_v4());
    let game_id = create_game(&app, &author).await;

    let (status, _) = send(&app, "GET", "/aggregates?limit=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/aggregates?page=2", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/aggregates/{game_id}/samples?order=oldest"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/aggregates?keyword=stardew", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 1);
    assert_eq!(body["items"][0]["kind"], "item");
}

#[tokio::test]
async fn test_reconcile_is_staff_only() {
    let app = app();
    let user = Actor::new(Uuid::new_v4());
    let staff = Actor::elevated(Uuid::new_v4());
    let game_id = create_game(&app, &user).await;

    let uri = format!("/aggregates/{game_id}/reconcile");
    let (status, _) = send(&app, "POST", &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", &uri, Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["corrected"], false);
    assert_eq!(body["aggregate"]["sampleCount"], 0);
}

#[tokio::test]
async fn test_favorite_marks_listing() {
    let app = app();
    let viewer = Actor::new(Uuid::new_v4());
    let game_id = create_game(&app, &viewer).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/aggregates/{game_id}/favorite"),
        Some(&viewer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorited"], true);

    let (_, body) = send(&app, "GET", "/aggregates", Some(&viewer), None).await;
    assert_eq!(body["favorites"][0]["id"], game_id.as_str());
    assert_eq!(body["favorites"][0]["isFavorite"], true);
    assert_eq!(body["items"][0]["kind"], "placeholder");
}
