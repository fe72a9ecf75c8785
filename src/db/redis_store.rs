use std::collections::HashSet;

use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use uuid::Uuid;

use crate::{
    db::{AggregateCommit, RatingStore, aggregate, check_commit_shape, favorite, reaction, sample},
    errors::AppError,
    models::{RatedAggregate, ReactionCounts, ReactionState, ScoredSample},
    state::RedisClient,
};

/// Redis-backed store. Multi-key writes run as server-side scripts, which Redis
/// executes atomically.
#[derive(Clone)]
pub struct RedisStore {
    redis: RedisClient,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let manager = RedisConnectionManager::new(redis_url)?;
        let redis = Pool::builder().build(manager).await?;
        Ok(Self { redis })
    }
}

#[async_trait]
impl RatingStore for RedisStore {
    async fn insert_aggregate(&self, aggregate: &RatedAggregate) -> Result<(), AppError> {
        aggregate::create_aggregate(aggregate, self.redis.clone()).await
    }

    async fn get_aggregate(&self, aggregate_id: Uuid) -> Result<RatedAggregate, AppError> {
        aggregate::get_aggregate(aggregate_id, self.redis.clone()).await
    }

    async fn list_aggregates(&self) -> Result<Vec<RatedAggregate>, AppError> {
        aggregate::get_all_aggregates(self.redis.clone()).await
    }

    async fn get_sample(&self, sample_id: Uuid) -> Result<ScoredSample, AppError> {
        sample::get_sample(sample_id, self.redis.clone()).await
    }

    async fn active_samples(&self, aggregate_id: Uuid) -> Result<Vec<ScoredSample>, AppError> {
        sample::get_active_samples(aggregate_id, self.redis.clone()).await
    }

    async fn active_sample_by_author(
        &self,
        aggregate_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<ScoredSample>, AppError> {
        sample::get_active_sample_by_author(aggregate_id, author_id, self.redis.clone()).await
    }

    async fn commit(&self, commit: AggregateCommit) -> Result<(), AppError> {
        check_commit_shape(&commit)?;
        aggregate::commit_aggregate(commit, self.redis.clone()).await
    }

    async fn get_reaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> Result<ReactionState, AppError> {
        reaction::get_reaction(actor_id, target_id, self.redis.clone()).await
    }

    async fn swap_reaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        expected: ReactionState,
        next: ReactionState,
    ) -> Result<bool, AppError> {
        reaction::swap_reaction(actor_id, target_id, expected, next, self.redis.clone()).await
    }

    async fn reaction_counts(&self, target_id: Uuid) -> Result<ReactionCounts, AppError> {
        reaction::count_reactions(target_id, self.redis.clone()).await
    }

    async fn reaction_counts_many(
        &self,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionCounts>, AppError> {
        reaction::count_reactions_many(target_ids, self.redis.clone()).await
    }

    async fn reactions_of(
        &self,
        actor_id: Uuid,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionState>, AppError> {
        reaction::get_reactions_of(actor_id, target_ids, self.redis.clone()).await
    }

    async fn favorites(&self, actor_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
        favorite::get_favorites(actor_id, self.redis.clone()).await
    }

    async fn toggle_favorite(&self, actor_id: Uuid, aggregate_id: Uuid) -> Result<bool, AppError> {
        favorite::toggle_favorite(actor_id, aggregate_id, self.redis.clone()).await
    }
}
