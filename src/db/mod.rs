pub mod aggregate;
pub mod favorite;
pub mod memory;
pub mod reaction;
pub mod redis_store;
pub mod sample;

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{RatedAggregate, ReactionCounts, ReactionState, ScoredSample},
};

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Sample write that rides along with an aggregate commit.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleWrite {
    /// Reconciliation: only the aggregate changes.
    None,
    /// New active sample; fails with `DuplicateSample` if the author already has one.
    Insert(ScoredSample),
    /// Score or content of an active sample changed.
    Update(ScoredSample),
    /// Soft delete; the sample must arrive with `active == false`.
    Deactivate(ScoredSample),
}

/// One atomic read-modify-write of an aggregate.
///
/// The store applies it only while the persisted version still equals
/// `expected_version`, otherwise it fails with `StateConflict` and nothing is written.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCommit {
    pub expected_version: u64,
    pub aggregate: RatedAggregate,
    pub sample: SampleWrite,
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn insert_aggregate(&self, aggregate: &RatedAggregate) -> Result<(), AppError>;

    async fn get_aggregate(&self, aggregate_id: Uuid) -> Result<RatedAggregate, AppError>;

    /// Every aggregate, newest first, visible or not.
    async fn list_aggregates(&self) -> Result<Vec<RatedAggregate>, AppError>;

    async fn get_sample(&self, sample_id: Uuid) -> Result<ScoredSample, AppError>;

    /// Active samples of one aggregate, newest first.
    async fn active_samples(&self, aggregate_id: Uuid) -> Result<Vec<ScoredSample>, AppError>;

    async fn active_sample_by_author(
        &self,
        aggregate_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<ScoredSample>, AppError>;

    async fn commit(&self, commit: AggregateCommit) -> Result<(), AppError>;

    async fn get_reaction(&self, actor_id: Uuid, target_id: Uuid)
    -> Result<ReactionState, AppError>;

    /// Writes `next` only if the stored state still equals `expected`. Returns whether it did.
    async fn swap_reaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        expected: ReactionState,
        next: ReactionState,
    ) -> Result<bool, AppError>;

    /// Counted from the stored reactions at call time.
    async fn reaction_counts(&self, target_id: Uuid) -> Result<ReactionCounts, AppError>;

    /// `reaction_counts` for many targets in one round trip, in input order.
    async fn reaction_counts_many(
        &self,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionCounts>, AppError>;

    /// The actor's reaction to each target, in input order.
    async fn reactions_of(
        &self,
        actor_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionState>, AppError>;

    async fn favorites(&self, actor_id: Uuid) -> Result<HashSet<Uuid>, AppError>;

    /// Flips membership and returns the new state.
    async fn toggle_favorite(&self, actor_id: Uuid, aggregate_id: Uuid) -> Result<bool, AppError>;
}

pub(crate) fn check_commit_shape(commit: &AggregateCommit) -> Result<(), AppError> {
    if commit.aggregate.version != commit.expected_version + 1 {
        return Err(AppError::InternalError(format!(
            "Commit for aggregate {} must advance version {} by one",
            commit.aggregate.id, commit.expected_version
        )));
    }

    let sample = match &commit.sample {
        SampleWrite::None => return Ok(()),
        SampleWrite::Insert(s) | SampleWrite::Update(s) | SampleWrite::Deactivate(s) => s,
    };

    if sample.aggregate_id != commit.aggregate.id {
        return Err(AppError::InternalError(format!(
            "Sample {} does not belong to aggregate {}",
            sample.id, commit.aggregate.id
        )));
    }

    let expect_active = !matches!(commit.sample, SampleWrite::Deactivate(_));
    if sample.active != expect_active {
        return Err(AppError::InternalError(format!(
            "Sample {} has the wrong active flag for this write",
            sample.id
        )));
    }

    Ok(())
}
