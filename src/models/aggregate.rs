use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{engine::rating::RunningMean, errors::AppError};

/// A rated entity (a game) holding the running mean of its active samples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatedAggregate {
    pub id: Uuid,
    pub title: String,
    pub mean_score: f64,
    pub sample_count: u32,
    #[serde(skip_serializing, default)]
    pub version: u64,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl RatedAggregate {
    pub fn new(title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            mean_score: 0.0,
            sample_count: 0,
            version: 0,
            is_visible: true,
            created_at: Utc::now(),
        }
    }

    pub fn rating(&self) -> RunningMean {
        RunningMean {
            mean_score: self.mean_score,
            sample_count: self.sample_count,
        }
    }

    /// Copy with the new rating applied and the version bumped, ready to commit.
    pub fn with_rating(&self, rating: RunningMean) -> Self {
        Self {
            mean_score: rating.mean_score,
            sample_count: rating.sample_count,
            version: self.version + 1,
            ..self.clone()
        }
    }

    pub fn to_redis_hash(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("id".into(), self.id.to_string());
        map.insert("title".into(), self.title.clone());
        map.insert("mean_score".into(), self.mean_score.to_string());
        map.insert("sample_count".into(), self.sample_count.to_string());
        map.insert("version".into(), self.version.to_string());
        map.insert("is_visible".into(), self.is_visible.to_string());
        map.insert("created_at".into(), self.created_at.to_rfc3339());
        map
    }

    pub fn from_redis_hash(map: &HashMap<String, String>) -> Result<Self, AppError> {
        Ok(Self {
            id: map
                .get("id")
                .ok_or_else(|| AppError::Deserialization("Missing id".into()))?
                .parse()
                .map_err(|_| AppError::Deserialization("Invalid UUID for id".into()))?,

            title: map
                .get("title")
                .ok_or_else(|| AppError::Deserialization("Missing title".into()))?
                .clone(),

            mean_score: map
                .get("mean_score")
                .ok_or_else(|| AppError::Deserialization("Missing mean_score".into()))?
                .parse()
                .map_err(|_| AppError::Deserialization("Invalid mean_score".into()))?,

            sample_count: map
                .get("sample_count")
                .ok_or_else(|| AppError::Deserialization("Missing sample_count".into()))?
                .parse()
                .map_err(|_| AppError::Deserialization("Invalid sample_count".into()))?,

            version: map
                .get("version")
                .map(|v| v.parse())
                .transpose()
                .map_err(|_| AppError::Deserialization("Invalid version".into()))?
                .unwrap_or(0),

            is_visible: map
                .get("is_visible")
                .map(|v| v == "true")
                .unwrap_or(true),

            created_at: map
                .get("created_at")
                .ok_or_else(|| AppError::Deserialization("Missing created_at".into()))
                .and_then(|s| {
                    DateTime::parse_from_rfc3339(s)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|_| AppError::Deserialization("Invalid created_at".into()))
                })?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateFilter {
    pub keyword: Option<String>,
}

impl AggregateFilter {
    pub fn matches(&self, aggregate: &RatedAggregate) -> bool {
        if !aggregate.is_visible {
            return false;
        }

        match self.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => aggregate
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            _ => true,
        }
    }
}

/// Listing entry for an aggregate, annotated for the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    #[serde(flatten)]
    pub aggregate: RatedAggregate,
    pub is_favorite: bool,
}
