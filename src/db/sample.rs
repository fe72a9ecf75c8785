use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{ScoredSample, redis::RedisKey},
    state::RedisClient,
};

pub async fn get_sample(sample_id: Uuid, redis: RedisClient) -> Result<ScoredSample, AppError> {
    let mut conn = redis.get().await?;

    let map: HashMap<String, String> = redis::cmd("HGETALL")
        .arg(RedisKey::sample(sample_id))
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    if map.is_empty() {
        return Err(AppError::NotFound(format!("Sample {} not found", sample_id)));
    }

    ScoredSample::from_redis_hash(&map)
}

pub async fn get_active_samples(
    aggregate_id: Uuid,
    redis: RedisClient,
) -> Result<Vec<ScoredSample>, AppError> {
    let mut conn = redis.get().await?;

    let ids: Vec<String> = redis::cmd("ZREVRANGE")
        .arg(RedisKey::aggregate_samples(aggregate_id))
        .arg(0)
        .arg(-1)
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    let valid_ids: Vec<Uuid> = ids
        .iter()
        .filter_map(|id_str| Uuid::parse_str(id_str).ok())
        .collect();
    if valid_ids.is_empty() {
        return Ok(Vec::new());
    }

    // Batch all HGETALLs using a Redis pipeline
    let mut pipe = redis::pipe();
    for sample_id in &valid_ids {
        pipe.cmd("HGETALL").arg(RedisKey::sample(*sample_id));
    }
    let results: Vec<HashMap<String, String>> = pipe
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    let mut samples = Vec::with_capacity(results.len());
    for map in results.iter().filter(|m| !m.is_empty()) {
        let sample = ScoredSample::from_redis_hash(map)?;
        if sample.active {
            samples.push(sample);
        }
    }

    // Same-millisecond entries come back in member order; settle ties by timestamp.
    samples.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(samples)
}

pub async fn get_active_sample_by_author(
    aggregate_id: Uuid,
    author_id: Uuid,
    redis: RedisClient,
) -> Result<Option<ScoredSample>, AppError> {
    let mut conn = redis.get().await?;

    let sample_id: Option<String> = redis::cmd("GET")
        .arg(RedisKey::author_sample(aggregate_id, author_id))
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    let Some(sample_id) = sample_id else {
        return Ok(None);
    };
    let sample_id = Uuid::parse_str(&sample_id).map_err(|e| {
        AppError::Deserialization(format!("Invalid UUID in author index: {}", e))
    })?;

    drop(conn);
    let sample = get_sample(sample_id, redis).await?;
    Ok(sample.active.then_some(sample))
}
