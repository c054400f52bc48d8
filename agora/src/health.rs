use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::state::SharedState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status of the service
    pub status: String,

    /// Deployment environment
    pub environment: Environment,

    /// API version
    pub version: String,
}

pub async fn check_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        environment: state.config.environment,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
