use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::reaction::{ReactionCounts, ReactionState},
};

/// One scored review of an aggregate. Removal only clears `active`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSample {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub author_id: Uuid,
    pub score: f64,
    pub content: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScoredSample {
    pub fn new(aggregate_id: Uuid, author_id: Uuid, score: f64, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            aggregate_id,
            author_id,
            score,
            content,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_redis_hash(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("id".into(), self.id.to_string());
        map.insert("aggregate_id".into(), self.aggregate_id.to_string());
        map.insert("author_id".into(), self.author_id.to_string());
        map.insert("score".into(), self.score.to_string());
        map.insert("content".into(), self.content.clone());
        map.insert("active".into(), self.active.to_string());
        map.insert("created_at".into(), self.created_at.to_rfc3339());
        map.insert("updated_at".into(), self.updated_at.to_rfc3339());
        map
    }

    pub fn from_redis_hash(map: &HashMap<String, String>) -> Result<Self, AppError> {
        let uuid_field = |name: &str| -> Result<Uuid, AppError> {
            map.get(name)
                .ok_or_else(|| AppError::Deserialization(format!("Missing {name}")))?
                .parse()
                .map_err(|_| AppError::Deserialization(format!("Invalid UUID for {name}")))
        };
        let time_field = |name: &str| -> Result<DateTime<Utc>, AppError> {
            let raw = map
                .get(name)
                .ok_or_else(|| AppError::Deserialization(format!("Missing {name}")))?;
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppError::Deserialization(format!("Invalid {name}")))
        };

        Ok(Self {
            id: uuid_field("id")?,
            aggregate_id: uuid_field("aggregate_id")?,
            author_id: uuid_field("author_id")?,
            score: map
                .get("score")
                .ok_or_else(|| AppError::Deserialization("Missing score".into()))?
                .parse()
                .map_err(|_| AppError::Deserialization("Invalid score".into()))?,
            content: map.get("content").cloned().unwrap_or_default(),
            active: map.get("active").map(|v| v == "true").unwrap_or(false),
            created_at: time_field("created_at")?,
            updated_at: time_field("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SampleOrder {
    #[default]
    New,
    Likes,
    Dislikes,
}

impl FromStr for SampleOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(SampleOrder::New),
            "likes" => Ok(SampleOrder::Likes),
            "dislikes" => Ok(SampleOrder::Dislikes),
            other => Err(AppError::InvalidInput(format!(
                "Unknown sample order: {}",
                other
            ))),
        }
    }
}

/// Listing entry for a sample with live reaction counts and the caller's own reaction.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleView {
    #[serde(flatten)]
    pub sample: ScoredSample,
    pub likes: u64,
    pub dislikes: u64,
    pub my_reaction: ReactionState,
}

impl SampleView {
    pub fn new(sample: ScoredSample, counts: ReactionCounts, my_reaction: ReactionState) -> Self {
        Self {
            sample,
            likes: counts.likes,
            dislikes: counts.dislikes,
            my_reaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_parses_known_values_only() {
        assert_eq!("LIKES".parse::<SampleOrder>().unwrap(), SampleOrder::Likes);
        assert_eq!("new".parse::<SampleOrder>().unwrap(), SampleOrder::New);
        assert!(matches!(
            "stars".parse::<SampleOrder>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn redis_hash_restores_inactive_sample() {
        let mut sample = ScoredSample::new(Uuid::new_v4(), Uuid::new_v4(), 2.5, "ok".into());
        sample.active = false;

        let restored = ScoredSample::from_redis_hash(&sample.to_redis_hash()).unwrap();

        assert_eq!(restored.id, sample.id);
        assert_eq!(restored.score, 2.5);
        assert!(!restored.active);
        assert_eq!(restored.content, "ok");
    }
}
