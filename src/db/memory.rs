use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::{AggregateCommit, RatingStore, SampleWrite, check_commit_shape},
    errors::AppError,
    models::{RatedAggregate, ReactionCounts, ReactionState, ScoredSample},
};

#[derive(Default)]
struct Inner {
    aggregates: HashMap<Uuid, RatedAggregate>,
    samples: HashMap<Uuid, ScoredSample>,
    reactions: HashMap<(Uuid, Uuid), ReactionState>,
    favorites: HashMap<Uuid, HashSet<Uuid>>,
}

/// Process-local store. A single lock makes every commit atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites an aggregate without a version check. Used to seed fixtures.
    pub async fn replace_aggregate(&self, aggregate: RatedAggregate) {
        let mut inner = self.inner.lock().await;
        inner.aggregates.insert(aggregate.id, aggregate);
    }
}

fn newest_first(samples: &mut [ScoredSample]) {
    samples.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn insert_aggregate(&self, aggregate: &RatedAggregate) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if inner.aggregates.contains_key(&aggregate.id) {
            return Err(AppError::InvalidInput(format!(
                "Aggregate {} already exists",
                aggregate.id
            )));
        }
        inner.aggregates.insert(aggregate.id, aggregate.clone());
        Ok(())
    }

    async fn get_aggregate(&self, aggregate_id: Uuid) -> Result<RatedAggregate, AppError> {
        let inner = self.inner.lock().await;
        inner
            .aggregates
            .get(&aggregate_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Aggregate {} not found", aggregate_id)))
    }

    async fn list_aggregates(&self) -> Result<Vec<RatedAggregate>, AppError> {
        let inner = self.inner.lock().await;
        let mut aggregates: Vec<RatedAggregate> = inner.aggregates.values().cloned().collect();
        aggregates.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(aggregates)
    }

    async fn get_sample(&self, sample_id: Uuid) -> Result<ScoredSample, AppError> {
        let inner = self.inner.lock().await;
        inner
            .samples
            .get(&sample_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Sample {} not found", sample_id)))
    }

    async fn active_samples(&self, aggregate_id: Uuid) -> Result<Vec<ScoredSample>, AppError> {
        let inner = self.inner.lock().await;
        let mut samples: Vec<ScoredSample> = inner
            .samples
            .values()
            .filter(|s| s.aggregate_id == aggregate_id && s.active)
            .cloned()
            .collect();
        newest_first(&mut samples);
        Ok(samples)
    }

    async fn active_sample_by_author(
        &self,
        aggregate_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<ScoredSample>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .samples
            .values()
            .find(|s| s.aggregate_id == aggregate_id && s.author_id == author_id && s.active)
            .cloned())
    }

    async fn commit(&self, commit: AggregateCommit) -> Result<(), AppError> {
        check_commit_shape(&commit)?;

        let mut inner = self.inner.lock().await;
        let aggregate_id = commit.aggregate.id;

        let current = inner
            .aggregates
            .get(&aggregate_id)
            .ok_or_else(|| AppError::NotFound(format!("Aggregate {} not found", aggregate_id)))?;
        if current.version != commit.expected_version {
            return Err(AppError::StateConflict(format!(
                "Aggregate {} moved from version {} to {}",
                aggregate_id, commit.expected_version, current.version
            )));
        }

        if let SampleWrite::Insert(sample) = &commit.sample {
            let duplicate = inner.samples.values().any(|s| {
                s.aggregate_id == aggregate_id && s.author_id == sample.author_id && s.active
            });
            if duplicate {
                return Err(AppError::DuplicateSample(format!(
                    "Author {} already rated aggregate {}",
                    sample.author_id, aggregate_id
                )));
            }
        }

        match commit.sample {
            SampleWrite::None => {}
            SampleWrite::Insert(sample)
            | SampleWrite::Update(sample)
            | SampleWrite::Deactivate(sample) => {
                inner.samples.insert(sample.id, sample);
            }
        }
        inner.aggregates.insert(aggregate_id, commit.aggregate);

        Ok(())
    }

    async fn get_reaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<ReactionState, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .reactions
            .get(&(actor_id, target_id))
            .copied()
            .unwrap_or_default())
    }

    async fn swap_reaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        expected: ReactionState,
        next: ReactionState,
    ) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().await;
        let slot = inner.reactions.entry((actor_id, target_id)).or_default();
        if *slot != expected {
            return Ok(false);
        }
        *slot = next;
        Ok(true)
    }

    async fn reaction_counts(&self, target_id: Uuid) -> Result<ReactionCounts, AppError> {
        let inner = self.inner.lock().await;
        Ok(ReactionCounts::from_states(
            inner
                .reactions
                .iter()
                .filter(|((_, target), _)| *target == target_id)
                .map(|(_, state)| state),
        ))
    }

    async fn reaction_counts_many(
        &self,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionCounts>, AppError> {
        let inner = self.inner.lock().await;
        Ok(target_ids
            .iter()
            .map(|id| {
                ReactionCounts::from_states(
                    inner
                        .reactions
                        .iter()
                        .filter(|((_, target), _)| target == id)
                        .map(|(_, state)| state),
                )
            })
            .collect())
    }

    async fn reactions_of(
        &self,
        actor_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionState>, AppError> {
        let inner = self.inner.lock().await;
        Ok(target_ids
            .iter()
            .map(|target| {
                inner
                    .reactions
                    .get(&(actor_id, *target))
                    .copied()
                    .unwrap_or_default()
            })
            .collect())
    }

    async fn favorites(&self, actor_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.favorites.get(&actor_id).cloned().unwrap_or_default())
    }

    async fn toggle_favorite(&self, actor_id: Uuid, aggregate_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().await;
        let set = inner.favorites.entry(actor_id).or_default();
        if set.remove(&aggregate_id) {
            Ok(false)
        } else {
            set.insert(aggregate_id);
            Ok(true)
        }
    }
}
