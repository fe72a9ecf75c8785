//! Runs against a live Redis: `REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored`.

use game_reviews_be::{
    db::{AggregateCommit, RatingStore, RedisStore, SampleWrite},
    errors::AppError,
    models::{Actor, ReactionState, ScoredSample, redis::RedisKey},
    service,
};
use uuid::Uuid;

const RETRIES: u32 = 5;

async fn redis_store() -> Option<RedisStore> {
    let url = std::env::var("REDIS_URL").ok()?;
    Some(RedisStore::connect(&url).await.unwrap())
}

#[tokio::test]
#[ignore]
async fn test_commit_rejects_stale_version() {
    let Some(store) = redis_store().await else {
        return;
    };
    let aggregate = service::create_aggregate(&store, "Dead Cells").await.unwrap();
    service::create_sample(
        &store,
        aggregate.id,
        Actor::new(Uuid::new_v4()),
        4.0,
        String::new(),
        RETRIES,
    )
    .await
    .unwrap();
    let current = store.get_aggregate(aggregate.id).await.unwrap();
    assert_eq!(current.version, 1);

    // Built from the version-0 snapshot.
    let stale = store
        .commit(AggregateCommit {
            expected_version: 0,
            aggregate: aggregate.with_rating(aggregate.rating().added(1.0).unwrap()),
            sample: SampleWrite::Insert(ScoredSample::new(
                aggregate.id,
                Uuid::new_v4(),
                1.0,
                String::new(),
            )),
        })
        .await;
    assert!(matches!(stale, Err(AppError::StateConflict(_))));

    assert_eq!(store.get_aggregate(aggregate.id).await.unwrap(), current);
    assert_eq!(store.active_samples(aggregate.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_commit_rejects_second_active_sample_of_author() {
    let Some(store) = redis_store().await else {
        return;
    };
    let aggregate = service::create_aggregate(&store, "Katana Zero").await.unwrap();
    let author = Actor::new(Uuid::new_v4());
    let first = service::create_sample(&store, aggregate.id, author, 3.0, String::new(), RETRIES)
        .await
        .unwrap();

    // Skips the service pre-check so the script's author index has to catch it.
    let current = store.get_aggregate(aggregate.id).await.unwrap();
    let duplicate = store
        .commit(AggregateCommit {
            expected_version: current.version,
            aggregate: current.with_rating(current.rating().added(5.0).unwrap()),
            sample: SampleWrite::Insert(ScoredSample::new(
                aggregate.id,
                author.id,
                5.0,
                String::new(),
            )),
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::DuplicateSample(_))));
    assert_eq!(store.get_aggregate(aggregate.id).await.unwrap(), current);

    service::delete_sample(&store, first, author, RETRIES)
        .await
        .unwrap();
    assert!(
        store
            .active_sample_by_author(aggregate.id, author.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(store.active_samples(aggregate.id).await.unwrap().is_empty());

    service::create_sample(&store, aggregate.id, author, 2.0, String::new(), RETRIES)
        .await
        .unwrap();
    let after = store.get_aggregate(aggregate.id).await.unwrap();
    assert_eq!(after.sample_count, 1);
    assert_eq!(after.mean_score, 2.0);
}

#[tokio::test]
#[ignore]
async fn test_reaction_swap_only_from_expected_state() {
    let Some(store) = redis_store().await else {
        return;
    };
    let actor = Uuid::new_v4();
    let target = Uuid::new_v4();

    assert!(
        !store
            .swap_reaction(actor, target, ReactionState::Positive, ReactionState::None)
            .await
            .unwrap()
    );
    assert!(
        store
            .swap_reaction(actor, target, ReactionState::None, ReactionState::Positive)
            .await
            .unwrap()
    );
    assert_eq!(
        store.get_reaction(actor, target).await.unwrap(),
        ReactionState::Positive
    );
    assert_eq!(store.reaction_counts(target).await.unwrap().likes, 1);
    assert_eq!(
        store.reactions_of(actor, &[target, Uuid::new_v4()]).await.unwrap(),
        vec![ReactionState::Positive, ReactionState::None]
    );
}

#[tokio::test]
#[ignore]
async fn test_favorite_toggle_script() {
    let Some(store) = redis_store().await else {
        return;
    };
    let actor = Uuid::new_v4();
    let aggregate = Uuid::new_v4();

    assert!(store.toggle_favorite(actor, aggregate).await.unwrap());
    assert!(store.favorites(actor).await.unwrap().contains(&aggregate));
    assert!(!store.toggle_favorite(actor, aggregate).await.unwrap());
    assert!(store.favorites(actor).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_unreadable_sample_fails_the_read() {
    let Some(url) = std::env::var("REDIS_URL").ok() else {
        return;
    };
    let store = RedisStore::connect(&url).await.unwrap();
    let aggregate = service::create_aggregate(&store, "Cuphead").await.unwrap();

    let client = redis::Client::open(url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let broken = Uuid::new_v4();
    let _: () = redis::cmd("HSET")
        .arg(RedisKey::sample(broken))
        .arg("id")
        .arg("not-a-uuid")
        .query_async(&mut conn)
        .await
        .unwrap();
    let _: () = redis::cmd("ZADD")
        .arg(RedisKey::aggregate_samples(aggregate.id))
        .arg(0)
        .arg(broken.to_string())
        .query_async(&mut conn)
        .await
        .unwrap();

    let result = store.active_samples(aggregate.id).await;
    assert!(matches!(result, Err(AppError::Deserialization(_))));
}
