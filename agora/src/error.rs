use agora_core::CoreError;
use agora_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Errors surfaced by the deliberation service and its HTTP handlers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgoraError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Severe moderation hit; nothing was stored
    #[error("Content rejected: {0}")]
    Rejected(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for service operations
pub type AgoraResult<T> = Result<T, AgoraError>;

impl AgoraError {
    pub fn status(&self) -> StatusCode {
        match self {
            AgoraError::NotFound(_) => StatusCode::NOT_FOUND,
            AgoraError::Unauthorized => StatusCode::UNAUTHORIZED,
            AgoraError::Forbidden(_) => StatusCode::FORBIDDEN,
            AgoraError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AgoraError::Validation(_) => StatusCode::BAD_REQUEST,
            AgoraError::Conflict(_) => StatusCode::CONFLICT,
            AgoraError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AgoraError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for AgoraError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AgoraError::NotFound(what),
            StoreError::Conflict(what) => AgoraError::Conflict(what),
            StoreError::Internal(what) => AgoraError::Internal(what),
        }
    }
}

impl From<CoreError> for AgoraError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidVoteValue(_) | CoreError::InvalidStance(_) => {
                AgoraError::Validation(err.to_string())
            }
            other => AgoraError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AgoraError {
    fn from(errors: ValidationErrors) -> Self {
        AgoraError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AgoraError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AgoraError::Rejected("severe".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AgoraError::from(StoreError::Conflict("slug".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AgoraError::from(CoreError::InvalidVoteValue(7)).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
