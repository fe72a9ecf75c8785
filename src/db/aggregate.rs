use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::{AggregateCommit, SampleWrite},
    errors::AppError,
    models::{RatedAggregate, redis::RedisKey},
    state::RedisClient,
};

// KEYS: aggregate hash, aggregate's active-sample zset, sample hash, author index.
// ARGV: expected version, mode, sample id, sample zset score, aggregate fields, sample fields.
// Returns 1 on commit, 0 on version mismatch, -1 if the aggregate is gone, -2 on duplicate.
const COMMIT_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return -1
end
local current = redis.call('HGET', KEYS[1], 'version') or '0'
if tonumber(current) ~= tonumber(ARGV[1]) then
  return 0
end
local mode = ARGV[2]
if mode == 'insert' and redis.call('EXISTS', KEYS[4]) == 1 then
  return -2
end
local function write_hash(key, encoded)
  for field, value in pairs(cjson.decode(encoded)) do
    redis.call('HSET', key, field, value)
  end
end
write_hash(KEYS[1], ARGV[5])
if mode == 'insert' then
  write_hash(KEYS[3], ARGV[6])
  redis.call('ZADD', KEYS[2], ARGV[4], ARGV[3])
  redis.call('SET', KEYS[4], ARGV[3])
elseif mode == 'update' then
  write_hash(KEYS[3], ARGV[6])
elseif mode == 'deactivate' then
  write_hash(KEYS[3], ARGV[6])
  redis.call('ZREM', KEYS[2], ARGV[3])
  redis.call('DEL', KEYS[4])
end
return 1
"#;

pub async fn create_aggregate(
    aggregate: &RatedAggregate,
    redis: RedisClient,
) -> Result<(), AppError> {
    let mut conn = redis.get().await?;

    let key = RedisKey::aggregate(aggregate.id);
    let exists: bool = redis::cmd("EXISTS")
        .arg(&key)
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;
    if exists {
        return Err(AppError::InvalidInput(format!(
            "Aggregate {} already exists",
            aggregate.id
        )));
    }

    let fields = aggregate.to_redis_hash();
    let _: () = redis::pipe()
        .atomic()
        .cmd("HSET")
        .arg(&key)
        .arg(
            fields
                .iter()
                .flat_map(|(k, v)| [k.as_str(), v.as_str()])
                .collect::<Vec<&str>>(),
        )
        .ignore()
        .cmd("ZADD")
        .arg(RedisKey::aggregates())
        .arg(aggregate.created_at.timestamp_millis())
        .arg(aggregate.id.to_string())
        .ignore()
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    Ok(())
}

pub async fn get_aggregate(
    aggregate_id: Uuid,
    redis: RedisClient,
) -> Result<RatedAggregate, AppError> {
    let mut conn = redis.get().await?;

    let map: HashMap<String, String> = redis::cmd("HGETALL")
        .arg(RedisKey::aggregate(aggregate_id))
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    if map.is_empty() {
        return Err(AppError::NotFound(format!(
            "Aggregate {} not found",
            aggregate_id
        )));
    }

    RatedAggregate::from_redis_hash(&map)
}

pub async fn get_all_aggregates(redis: RedisClient) -> Result<Vec<RatedAggregate>, AppError> {
    let mut conn = redis.get().await?;

    let ids: Vec<String> = redis::cmd("ZREVRANGE")
        .arg(RedisKey::aggregates())
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

    let mut pipe = redis::pipe();
    for id in &valid_ids {
        pipe.cmd("HGETALL").arg(RedisKey::aggregate(*id));
    }
    let results: Vec<HashMap<String, String>> = pipe
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    // An unreadable hash fails the whole read.
    results
        .iter()
        .filter(|m| !m.is_empty())
        .map(RatedAggregate::from_redis_hash)
        .collect()
}

pub async fn commit_aggregate(commit: AggregateCommit, redis: RedisClient) -> Result<(), AppError> {
    let mut conn = redis.get().await?;

    let aggregate_id = commit.aggregate.id;
    let (mode, sample) = match &commit.sample {
        SampleWrite::None => ("none", None),
        SampleWrite::Insert(s) => ("insert", Some(s)),
        SampleWrite::Update(s) => ("update", Some(s)),
        SampleWrite::Deactivate(s) => ("deactivate", Some(s)),
    };

    // Reconciliation carries no sample; the script never touches these keys then.
    let (sample_id, author_id, sample_score, sample_fields) = match sample {
        Some(s) => (
            s.id,
            s.author_id,
            s.created_at.timestamp_millis(),
            serde_json::to_string(&s.to_redis_hash())
                .map_err(|e| AppError::Serialization(e.to_string()))?,
        ),
        None => (Uuid::nil(), Uuid::nil(), 0, "{}".to_string()),
    };
    let aggregate_fields = serde_json::to_string(&commit.aggregate.to_redis_hash())
        .map_err(|e| AppError::Serialization(e.to_string()))?;

    let outcome: i64 = redis::cmd("EVAL")
        .arg(COMMIT_SCRIPT)
        .arg(4)
        .arg(RedisKey::aggregate(aggregate_id))
        .arg(RedisKey::aggregate_samples(aggregate_id))
        .arg(RedisKey::sample(sample_id))
        .arg(RedisKey::author_sample(aggregate_id, author_id))
        .arg(commit.expected_version)
        .arg(mode)
        .arg(sample_id.to_string())
        .arg(sample_score)
        .arg(aggregate_fields)
        .arg(sample_fields)
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    match outcome {
        1 => Ok(()),
        0 => Err(AppError::StateConflict(format!(
            "Aggregate {} changed since version {}",
            aggregate_id, commit.expected_version
        ))),
        -1 => Err(AppError::NotFound(format!(
            "Aggregate {} not found",
            aggregate_id
        ))),
        -2 => Err(AppError::DuplicateSample(format!(
            "Author {} already rated aggregate {}",
            author_id, aggregate_id
        ))),
        other => Err(AppError::InternalError(format!(
            "Unexpected commit outcome {} for aggregate {}",
            other, aggregate_id
        ))),
    }
}
