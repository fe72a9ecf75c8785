use std::collections::HashSet;

use uuid::Uuid;

use crate::{errors::AppError, models::redis::RedisKey, state::RedisClient};

// KEYS: the actor's favorites set. ARGV: aggregate id. Returns 1 when now a favorite.
const TOGGLE_SCRIPT: &str = r#"
if redis.call('SISMEMBER', KEYS[1], ARGV[1]) == 1 then
  redis.call('SREM', KEYS[1], ARGV[1])
  return 0
end
redis.call('SADD', KEYS[1], ARGV[1])
return 1
"#;

pub async fn get_favorites(actor_id: Uuid, redis: RedisClient) -> Result<HashSet<Uuid>, AppError> {
    let mut conn = redis.get().await?;

    let members: Vec<String> = redis::cmd("SMEMBERS")
        .arg(RedisKey::favorites(actor_id))
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    Ok(members
        .iter()
        .filter_map(|id| Uuid::parse_str(id).ok())
        .collect())
}

pub async fn toggle_favorite(
    actor_id: Uuid,
    aggregate_id: Uuid,
    redis: RedisClient,
) -> Result<bool, AppError> {
    let mut conn = redis.get().await?;

    let favorited: i64 = redis::cmd("EVAL")
        .arg(TOGGLE_SCRIPT)
        .arg(1)
        .arg(RedisKey::favorites(actor_id))
        .arg(aggregate_id.to_string())
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    Ok(favorited == 1)
}
