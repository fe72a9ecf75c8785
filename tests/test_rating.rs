use std::sync::Arc;

use game_reviews_be::{
    db::{MemoryStore, RatingStore},
    errors::AppError,
    models::{Actor, Direction, RatedAggregate},
    service::{self, reconcile, reconcile_all},
};
use uuid::Uuid;

const RETRIES: u32 = 5;

async fn seeded_store() -> (MemoryStore, Uuid) {
    let store = MemoryStore::new();
    let aggregate = service::create_aggregate(&store, "Hollow Knight")
        .await
        .unwrap();
    (store, aggregate.id)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn test_running_mean_follows_sample_lifecycle() {
    let (store, aggregate_id) = seeded_store().await;
    let first_author = Actor::new(Uuid::new_v4());
    let second_author = Actor::new(Uuid::new_v4());

    let first = service::create_sample(
        &store,
        aggregate_id,
        first_author,
        4.0,
        "Great".into(),
        RETRIES,
    )
    .await
    .unwrap();
    let aggregate = store.get_aggregate(aggregate_id).await.unwrap();
    assert_close(aggregate.mean_score, 4.0);
    assert_eq!(aggregate.sample_count, 1);

    let second = service::create_sample(
        &store,
        aggregate_id,
        second_author,
        2.0,
        "Meh".into(),
        RETRIES,
    )
    .await
    .unwrap();
    let aggregate = store.get_aggregate(aggregate_id).await.unwrap();
    assert_close(aggregate.mean_score, 3.0);
    assert_eq!(aggregate.sample_count, 2);

    let updated = service::update_sample(&store, first, first_author, 5.0, None, RETRIES)
        .await
        .unwrap();
    assert_close(updated.score, 5.0);
    assert_eq!(updated.content, "Great");
    let aggregate = store.get_aggregate(aggregate_id).await.unwrap();
    assert_close(aggregate.mean_score, 3.5);
    assert_eq!(aggregate.sample_count, 2);

    service::delete_sample(&store, second, second_author, RETRIES)
        .await
        .unwrap();
    let aggregate = store.get_aggregate(aggregate_id).await.unwrap();
    assert_close(aggregate.mean_score, 5.0);
    assert_eq!(aggregate.sample_count, 1);

    let removed = store.get_sample(second).await.unwrap();
    assert!(!removed.active);
    assert!(matches!(
        service::get_active_sample(&store, second).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleting_last_sample_resets_to_zero() {
    let (store, aggregate_id) = seeded_store().await;
    let author = Actor::new(Uuid::new_v4());

    let sample_id = service::create_sample(&store, aggregate_id, author, 3.0, String::new(), RETRIES)
        .await
        .unwrap();
    service::delete_sample(&store, sample_id, author, RETRIES)
        .await
        .unwrap();

    let aggregate = store.get_aggregate(aggregate_id).await.unwrap();
    assert_eq!(aggregate.sample_count, 0);
    assert_eq!(aggregate.mean_score, 0.0);

    // The author may rate again once the old sample is gone.
    service::create_sample(&store, aggregate_id, author, 1.0, String::new(), RETRIES)
        .await
        .unwrap();
    let aggregate = store.get_aggregate(aggregate_id).await.unwrap();
    assert_close(aggregate.mean_score, 1.0);
}

#[tokio::test]
async fn test_non_author_cannot_change_sample() {
    let (store, aggregate_id) = seeded_store().await;
    let author = Actor::new(Uuid::new_v4());
    let stranger = Actor::new(Uuid::new_v4());

    let sample_id = service::create_sample(&store, aggregate_id, author, 4.0, String::new(), RETRIES)
        .await
        .unwrap();
    let before = store.get_aggregate(aggregate_id).await.unwrap();

    let update = service::update_sample(&store, sample_id, stranger, 1.0, None, RETRIES).await;
    assert!(matches!(update, Err(AppError::Unauthorized(_))));

    let delete = service::delete_sample(&store, sample_id, stranger, RETRIES).await;
    assert!(matches!(delete, Err(AppError::Unauthorized(_))));

    let after = store.get_aggregate(aggregate_id).await.unwrap();
    assert_eq!(before, after);
    assert_close(store.get_sample(sample_id).await.unwrap().score, 4.0);
}

#[tokio::test]
async fn test_elevated_actor_can_remove_any_sample() {
    let (store, aggregate_id) = seeded_store().await;
    let author = Actor::new(Uuid::new_v4());
    let moderator = Actor::elevated(Uuid::new_v4());

    let sample_id = service::create_sample(&store, aggregate_id, author, 4.0, String::new(), RETRIES)
        .await
        .unwrap();
    service::delete_sample(&store, sample_id, moderator, RETRIES)
        .await
        .unwrap();

    assert_eq!(
        store.get_aggregate(aggregate_id).await.unwrap().sample_count,
        0
    );
}

#[tokio::test]
async fn test_duplicate_sample_is_rejected() {
    let (store, aggregate_id) = seeded_store().await;
    let author = Actor::new(Uuid::new_v4());

    service::create_sample(&store, aggregate_id, author, 4.0, String::new(), RETRIES)
        .await
        .unwrap();
    let before = store.get_aggregate(aggregate_id).await.unwrap();

    let again = service::create_sample(&store, aggregate_id, author, 1.0, String::new(), RETRIES).await;
    assert!(matches!(again, Err(AppError::DuplicateSample(_))));

    assert_eq!(store.get_aggregate(aggregate_id).await.unwrap(), before);
    assert_eq!(store.active_samples(aggregate_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_scores_outside_range_are_rejected() {
    let (store, aggregate_id) = seeded_store().await;
    let author = Actor::new(Uuid::new_v4());

    for score in [-0.5, 5.5, f64::NAN, f64::INFINITY] {
        let result =
            service::create_sample(&store, aggregate_id, author, score, String::new(), RETRIES)
                .await;
        assert!(
            matches!(result, Err(AppError::InvalidInput(_))),
            "score {score} should be rejected"
        );
    }

    let sample_id = service::create_sample(&store, aggregate_id, author, 0.0, String::new(), RETRIES)
        .await
        .unwrap();
    let update = service::update_sample(&store, sample_id, author, 9.0, None, RETRIES).await;
    assert!(matches!(update, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_missing_or_hidden_targets_read_as_not_found() {
    let (store, aggregate_id) = seeded_store().await;
    let author = Actor::new(Uuid::new_v4());

    let missing =
        service::create_sample(&store, Uuid::new_v4(), author, 3.0, String::new(), RETRIES).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let update = service::update_sample(&store, Uuid::new_v4(), author, 3.0, None, RETRIES).await;
    assert!(matches!(update, Err(AppError::NotFound(_))));

    let mut hidden = store.get_aggregate(aggregate_id).await.unwrap();
    hidden.is_visible = false;
    store.replace_aggregate(hidden).await;

    let on_hidden =
        service::create_sample(&store, aggregate_id, author, 3.0, String::new(), RETRIES).await;
    assert!(matches!(on_hidden, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_samples_of_hidden_aggregate_are_untouchable() {
    let (store, aggregate_id) = seeded_store().await;
    let author = Actor::new(Uuid::new_v4());
    let sample_id = service::create_sample(&store, aggregate_id, author, 4.0, String::new(), RETRIES)
        .await
        .unwrap();

    let mut hidden = store.get_aggregate(aggregate_id).await.unwrap();
    hidden.is_visible = false;
    store.replace_aggregate(hidden.clone()).await;

    assert!(matches!(
        service::get_active_sample(&store, sample_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service::update_sample(&store, sample_id, author, 1.0, None, RETRIES).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service::delete_sample(&store, sample_id, author, RETRIES).await,
        Err(AppError::NotFound(_))
    ));
    // Hidden reads as absent even for someone who could not change the sample anyway.
    assert!(matches!(
        service::update_sample(&store, sample_id, Actor::new(Uuid::new_v4()), 1.0, None, RETRIES)
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service::toggle_reaction(
            &store,
            Actor::new(Uuid::new_v4()),
            sample_id,
            Direction::Positive,
            RETRIES
        )
        .await,
        Err(AppError::NotFound(_))
    ));

    assert_eq!(store.get_aggregate(aggregate_id).await.unwrap(), hidden);
    let sample = store.get_sample(sample_id).await.unwrap();
    assert!(sample.active);
    assert_close(sample.score, 4.0);
    assert_eq!(store.reaction_counts(sample_id).await.unwrap().likes, 0);
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let store = MemoryStore::new();
    let result = service::create_aggregate(&store, "   ").await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_samples_do_not_lose_updates() {
    let store: Arc<dyn RatingStore> = Arc::new(MemoryStore::new());
    let aggregate = service::create_aggregate(store.as_ref(), "Celeste")
        .await
        .unwrap();

    let scores = [1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 2.5, 4.5];
    let handles: Vec<_> = scores
        .iter()
        .map(|&score| {
            let store = store.clone();
            let aggregate_id = aggregate.id;
            tokio::spawn(async move {
                service::create_sample(
                    store.as_ref(),
                    aggregate_id,
                    Actor::new(Uuid::new_v4()),
                    score,
                    String::new(),
                    64,
                )
                .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let aggregate = store.get_aggregate(aggregate.id).await.unwrap();
    let expected = scores.iter().sum::<f64>() / scores.len() as f64;
    assert_eq!(aggregate.sample_count, scores.len() as u32);
    assert_close(aggregate.mean_score, expected);
    assert_eq!(aggregate.version, scores.len() as u64);
}

#[tokio::test]
async fn test_reconcile_repairs_drifted_aggregate() {
    let (store, aggregate_id) = seeded_store().await;
    for score in [4.0, 2.0, 3.0] {
        service::create_sample(
            &store,
            aggregate_id,
            Actor::new(Uuid::new_v4()),
            score,
            String::new(),
            RETRIES,
        )
        .await
        .unwrap();
    }

    let clean = reconcile(&store, aggregate_id, RETRIES).await.unwrap();
    assert!(!clean.corrected);

    let drifted = RatedAggregate {
        mean_score: 4.75,
        sample_count: 7,
        ..store.get_aggregate(aggregate_id).await.unwrap()
    };
    store.replace_aggregate(drifted).await;

    let report = reconcile(&store, aggregate_id, RETRIES).await.unwrap();
    assert!(report.corrected);
    assert!(report.drift > 0.0);
    assert_eq!(report.aggregate.sample_count, 3);
    assert_close(report.aggregate.mean_score, 3.0);

    let stored = store.get_aggregate(aggregate_id).await.unwrap();
    assert_eq!(stored, report.aggregate);
}

#[tokio::test]
async fn test_reconcile_all_counts_corrections() {
    let store = MemoryStore::new();
    let healthy = service::create_aggregate(&store, "Hades").await.unwrap();
    let broken = service::create_aggregate(&store, "Inside").await.unwrap();

    store
        .replace_aggregate(RatedAggregate {
            mean_score: 2.0,
            sample_count: 1,
            ..broken.clone()
        })
        .await;

    assert_eq!(reconcile_all(&store, RETRIES).await.unwrap(), 1);
    assert_eq!(
        store.get_aggregate(broken.id).await.unwrap().sample_count,
        0
    );
    assert_eq!(store.get_aggregate(healthy.id).await.unwrap(), healthy);
}
