pub mod communities;
pub mod nodes;
pub mod threads;
pub mod topics;

use axum::Router;

use crate::state::SharedState;

/// Everything mounted under `/api`
pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .nest("/nodes", nodes::routes())
        .nest("/threads", threads::routes())
        .nest("/topics", topics::routes())
        .nest("/communities", communities::routes())
}
