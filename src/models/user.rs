use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user ID
    #[serde(default)]
    pub is_staff: bool,
    pub exp: usize, // expiration time
}

/// The caller on whose behalf a core operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_elevated: bool,
}

impl Actor {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            is_elevated: false,
        }
    }

    pub fn elevated(id: Uuid) -> Self {
        Self {
            id,
            is_elevated: true,
        }
    }

    /// Authors may change their own records; elevated actors may change anyone's.
    pub fn may_modify(&self, author_id: Uuid) -> bool {
        self.is_elevated || self.id == author_id
    }
}

impl TryFrom<&Claims> for Actor {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".into()))?;
        Ok(Self {
            id,
            is_elevated: claims.is_staff,
        })
    }
}
