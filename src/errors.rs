use axum::http::StatusCode;
use redis::RedisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Redis pool error: {0}")]
    RedisPoolError(String),

    #[error("Redis command error: {0}")]
    RedisCommandError(#[from] RedisError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate sample: {0}")]
    DuplicateSample(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Page size exceeded: {0}")]
    PageSizeExceeded(String),

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Env error: {0}")]
    EnvError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn to_response(&self) -> (StatusCode, String) {
        match self {
            AppError::RedisPoolError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.clone()),
            AppError::RedisCommandError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::JwtError(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            AppError::Serialization(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Deserialization(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            // Missing tokens are rejected by the extractor with 401 before reaching here.
            AppError::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DuplicateSample(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidPage(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PageSizeExceeded(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::StateConflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::EnvError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected server error".into(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        }
    }
}

impl From<bb8::RunError<RedisError>> for AppError {
    fn from(e: bb8::RunError<RedisError>) -> Self {
        match e {
            bb8::RunError::User(err) => AppError::RedisCommandError(err),
            bb8::RunError::TimedOut => {
                AppError::RedisPoolError("Redis connection timed out".into())
            }
        }
    }
}
