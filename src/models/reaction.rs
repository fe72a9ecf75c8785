use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ReactionState {
    #[default]
    None,
    Positive,
    Negative,
}

impl ReactionState {
    /// Compact form stored in Redis hashes.
    pub fn as_code(&self) -> u8 {
        match self {
            ReactionState::None => 0,
            ReactionState::Positive => 1,
            ReactionState::Negative => 2,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, AppError> {
        match code {
            0 => Ok(ReactionState::None),
            1 => Ok(ReactionState::Positive),
            2 => Ok(ReactionState::Negative),
            other => Err(AppError::Deserialization(format!(
                "Unknown reaction code: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Positive,
    Negative,
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" | "positive" => Ok(Direction::Positive),
            "dislike" | "negative" => Ok(Direction::Negative),
            other => Err(AppError::InvalidInput(format!(
                "Unknown reaction direction: {}",
                other
            ))),
        }
    }
}

impl From<Direction> for ReactionState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Positive => ReactionState::Positive,
            Direction::Negative => ReactionState::Negative,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCounts {
    pub likes: u64,
    pub dislikes: u64,
}

impl ReactionCounts {
    pub fn from_states<'a>(states: impl IntoIterator<Item = &'a ReactionState>) -> Self {
        states
            .into_iter()
            .fold(ReactionCounts::default(), |mut counts, state| {
                match state {
                    ReactionState::Positive => counts.likes += 1,
                    ReactionState::Negative => counts.dislikes += 1,
                    ReactionState::None => {}
                }
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_accepts_wire_aliases() {
        assert_eq!("like".parse::<Direction>().unwrap(), Direction::Positive);
        assert_eq!(" Dislike ".parse::<Direction>().unwrap(), Direction::Negative);
        assert_eq!("negative".parse::<Direction>().unwrap(), Direction::Negative);
        assert!(matches!(
            "love".parse::<Direction>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn codes_are_stable() {
        for state in [
            ReactionState::None,
            ReactionState::Positive,
            ReactionState::Negative,
        ] {
            assert_eq!(ReactionState::from_code(state.as_code()).unwrap(), state);
        }
        assert!(ReactionState::from_code(7).is_err());
    }

    #[test]
    fn counts_ignore_cleared_reactions() {
        let states = [
            ReactionState::Positive,
            ReactionState::None,
            ReactionState::Negative,
            ReactionState::Positive,
        ];
        assert_eq!(
            ReactionCounts::from_states(&states),
            ReactionCounts {
                likes: 2,
                dislikes: 1
            }
        );
    }
}
