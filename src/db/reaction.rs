use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{ReactionCounts, ReactionState, redis::RedisKey},
    state::RedisClient,
};

// KEYS: reactions hash of the target. ARGV: actor id, expected code, next code.
const SWAP_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], ARGV[1]) or '0'
if current ~= ARGV[2] then
  return 0
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[3])
return 1
"#;

pub async fn get_reaction(
    actor_id: Uuid,
    target_id: Uuid,
    redis: RedisClient,
) -> Result<ReactionState, AppError> {
    let mut conn = redis.get().await?;

    let code: Option<String> = redis::cmd("HGET")
        .arg(RedisKey::reactions(target_id))
        .arg(actor_id.to_string())
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    match code {
        Some(code) => parse_code(&code),
        None => Ok(ReactionState::None),
    }
}

pub async fn swap_reaction(
    actor_id: Uuid,
    target_id: Uuid,
    expected: ReactionState,
    next: ReactionState,
    redis: RedisClient,
) -> Result<bool, AppError> {
    let mut conn = redis.get().await?;

    let swapped: i64 = redis::cmd("EVAL")
        .arg(SWAP_SCRIPT)
        .arg(1)
        .arg(RedisKey::reactions(target_id))
        .arg(actor_id.to_string())
        .arg(expected.as_code().to_string())
        .arg(next.as_code().to_string())
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    Ok(swapped == 1)
}

pub async fn count_reactions(
    target_id: Uuid,
    redis: RedisClient,
) -> Result<ReactionCounts, AppError> {
    let mut conn = redis.get().await?;

    let codes: Vec<String> = redis::cmd("HVALS")
        .arg(RedisKey::reactions(target_id))
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    let states = codes
        .iter()
        .map(|code| parse_code(code))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReactionCounts::from_states(&states))
}

pub async fn count_reactions_many(
    target_ids: &[Uuid],
    redis: RedisClient,
) -> Result<Vec<ReactionCounts>, AppError> {
    if target_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut conn = redis.get().await?;

    let mut pipe = redis::pipe();
    for target_id in target_ids {
        pipe.cmd("HVALS").arg(RedisKey::reactions(*target_id));
    }
    let results: Vec<Vec<String>> = pipe
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    results
        .iter()
        .map(|codes| {
            let states = codes
                .iter()
                .map(|code| parse_code(code))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ReactionCounts::from_states(&states))
        })
        .collect()
}

pub async fn get_reactions_of(
    actor_id: Uuid,
    target_ids: &[Uuid],
    redis: RedisClient,
) -> Result<Vec<ReactionState>, AppError> {
    if target_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut conn = redis.get().await?;

    let actor = actor_id.to_string();
    let mut pipe = redis::pipe();
    for target_id in target_ids {
        pipe.cmd("HGET").arg(RedisKey::reactions(*target_id)).arg(&actor);
    }
    let results: Vec<Option<String>> = pipe
        .query_async(&mut *conn)
        .await
        .map_err(AppError::RedisCommandError)?;

    results
        .iter()
        .map(|code| match code {
            Some(code) => parse_code(code),
            None => Ok(ReactionState::None),
        })
        .collect()
}

fn parse_code(raw: &str) -> Result<ReactionState, AppError> {
    let code = raw
        .parse::<u8>()
        .map_err(|_| AppError::Deserialization(format!("Invalid reaction code: {}", raw)))?;
    ReactionState::from_code(code)
}
