use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    errors::AppError,
    models::{Actor, Claims},
    state::AppState,
};

/// The authenticated caller. Rejects requests without a valid bearer token.
pub struct AuthActor(pub Actor);

/// The caller if a bearer token was sent. A present but invalid token is still rejected.
pub struct MaybeActor(pub Option<Actor>);

impl FromRequestParts<AppState> for AuthActor {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = <TypedHeader<Authorization<Bearer>> as FromRequestParts<
            AppState,
        >>::from_request_parts(parts, state)
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid Authorization header".into(),
            )
        })?;

        actor_from_token(bearer.token(), &state.config.jwt_secret).map(AuthActor)
    }
}

impl FromRequestParts<AppState> for MaybeActor {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = <TypedHeader<Authorization<Bearer>> as OptionalFromRequestParts<
            AppState,
        >>::from_request_parts(parts, state)
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".into(),
            )
        })?;

        match header {
            Some(TypedHeader(Authorization(bearer))) => {
                actor_from_token(bearer.token(), &state.config.jwt_secret)
                    .map(|actor| MaybeActor(Some(actor)))
            }
            None => Ok(MaybeActor(None)),
        }
    }
}

pub fn actor_from_token(token: &str, secret: &str) -> Result<Actor, (StatusCode, String)> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired token".into()))?;

    Actor::try_from(&token_data.claims)
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid user ID in token".into()))
}

/// Tokens are normally issued by the identity service; this mirrors its format.
pub fn generate_jwt(actor: &Actor, secret: &str) -> Result<String, AppError> {
    let expiration = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let claims = Claims {
        sub: actor.id.to_string(),
        is_staff: actor.is_elevated,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(AppError::JwtError)
}
