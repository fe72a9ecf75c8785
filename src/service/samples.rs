use uuid::Uuid;

use crate::{
    db::{AggregateCommit, RatingStore, SampleWrite},
    engine::rating::validate_score,
    errors::AppError,
    models::{Actor, RatedAggregate, ScoredSample},
    service::retry::with_commit_retry,
};

const MAX_TITLE_LEN: usize = 200;

pub async fn create_aggregate(
    store: &dyn RatingStore,
    title: &str,
) -> Result<RatedAggregate, AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Title must be between 1 and {} characters",
            MAX_TITLE_LEN
        )));
    }

    let aggregate = RatedAggregate::new(title.to_string());
    store.insert_aggregate(&aggregate).await?;

    tracing::info!("Created aggregate {} ({})", aggregate.id, aggregate.title);
    Ok(aggregate)
}

/// Hidden aggregates read as absent.
pub async fn get_visible_aggregate(
    store: &dyn RatingStore,
    aggregate_id: Uuid,
) -> Result<RatedAggregate, AppError> {
    let aggregate = store.get_aggregate(aggregate_id).await?;
    if !aggregate.is_visible {
        return Err(AppError::NotFound(format!(
            "Aggregate {} not found",
            aggregate_id
        )));
    }
    Ok(aggregate)
}

/// Removed samples, and samples of hidden aggregates, read as absent.
pub async fn get_active_sample(
    store: &dyn RatingStore,
    sample_id: Uuid,
) -> Result<ScoredSample, AppError> {
    let sample = find_active_sample(store, sample_id).await?;
    get_visible_aggregate(store, sample.aggregate_id).await?;
    Ok(sample)
}

async fn find_active_sample(
    store: &dyn RatingStore,
    sample_id: Uuid,
) -> Result<ScoredSample, AppError> {
    let sample = store.get_sample(sample_id).await?;
    if !sample.active {
        return Err(AppError::NotFound(format!("Sample {} not found", sample_id)));
    }
    Ok(sample)
}

pub async fn create_sample(
    store: &dyn RatingStore,
    aggregate_id: Uuid,
    actor: Actor,
    score: f64,
    content: String,
    max_retries: u32,
) -> Result<Uuid, AppError> {
    let score = validate_score(score)?;

    let sample_id = with_commit_retry("create_sample", max_retries, move || {
        let content = content.clone();
        async move {
            let aggregate = get_visible_aggregate(store, aggregate_id).await?;

            if store
                .active_sample_by_author(aggregate_id, actor.id)
                .await?
                .is_some()
            {
                return Err(AppError::DuplicateSample(format!(
                    "Author {} already rated aggregate {}",
                    actor.id, aggregate_id
                )));
            }

            let rating = aggregate.rating().added(score)?;
            let sample = ScoredSample::new(aggregate_id, actor.id, score, content);
            let sample_id = sample.id;

            store
                .commit(AggregateCommit {
                    expected_version: aggregate.version,
                    aggregate: aggregate.with_rating(rating),
                    sample: SampleWrite::Insert(sample),
                })
                .await?;

            Ok(sample_id)
        }
    })
    .await?;

    tracing::info!(
        "Sample {} created on aggregate {} by {} (score {})",
        sample_id,
        aggregate_id,
        actor.id,
        score
    );
    Ok(sample_id)
}

pub async fn update_sample(
    store: &dyn RatingStore,
    sample_id: Uuid,
    actor: Actor,
    new_score: f64,
    content: Option<String>,
    max_retries: u32,
) -> Result<ScoredSample, AppError> {
    let updated = with_commit_retry("update_sample", max_retries, move || {
        let content = content.clone();
        async move {
            let (aggregate, sample) = load_for_change(store, sample_id, actor).await?;
            let new_score = validate_score(new_score)?;

            let rating = aggregate.rating().replaced(sample.score, new_score)?;
            let updated = ScoredSample {
                score: new_score,
                content: content.unwrap_or_else(|| sample.content.clone()),
                updated_at: chrono::Utc::now(),
                ..sample
            };

            store
                .commit(AggregateCommit {
                    expected_version: aggregate.version,
                    aggregate: aggregate.with_rating(rating),
                    sample: SampleWrite::Update(updated.clone()),
                })
                .await?;

            Ok(updated)
        }
    })
    .await?;

    tracing::info!(
        "Sample {} updated by {} (score {})",
        sample_id,
        actor.id,
        updated.score
    );
    Ok(updated)
}

pub async fn delete_sample(
    store: &dyn RatingStore,
    sample_id: Uuid,
    actor: Actor,
    max_retries: u32,
) -> Result<(), AppError> {
    with_commit_retry("delete_sample", max_retries, move || async move {
        let (aggregate, sample) = load_for_change(store, sample_id, actor).await?;

        let rating = aggregate.rating().removed(sample.score)?;
        let removed = ScoredSample {
            active: false,
            updated_at: chrono::Utc::now(),
            ..sample
        };

        store
            .commit(AggregateCommit {
                expected_version: aggregate.version,
                aggregate: aggregate.with_rating(rating),
                sample: SampleWrite::Deactivate(removed),
            })
            .await
    })
    .await?;

    tracing::info!("Sample {} removed by {}", sample_id, actor.id);
    Ok(())
}

/// Snapshot of an active sample and its aggregate for an authorized change.
///
/// The sample is read again after the aggregate, so any write to it after the
/// snapshot has bumped the aggregate version and the commit will conflict.
async fn load_for_change(
    store: &dyn RatingStore,
    sample_id: Uuid,
    actor: Actor,
) -> Result<(RatedAggregate, ScoredSample), AppError> {
    let sample = find_active_sample(store, sample_id).await?;
    let aggregate = get_visible_aggregate(store, sample.aggregate_id).await?;
    if !actor.may_modify(sample.author_id) {
        return Err(AppError::Unauthorized(format!(
            "User {} may not change sample {}",
            actor.id, sample_id
        )));
    }

    let sample = find_active_sample(store, sample_id).await?;
    Ok((aggregate, sample))
}
