use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use agora_core::UserId;

use crate::error::AgoraError;

/// The authenticated caller.
///
/// Identity is issued elsewhere; the bearer token is treated as an opaque
/// user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

/// The caller if a token was sent, for read paths that personalize output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeUser(pub Option<UserId>);

fn bearer(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AgoraError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer(parts).map(AuthUser).ok_or(AgoraError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AgoraError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(bearer(parts)))
    }
}
