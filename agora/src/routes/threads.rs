use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use agora_core::NodeView;

use crate::auth::MaybeUser;
use crate::error::AgoraResult;
use crate::models::ThreadQuery;
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/:tree_id", get(get_thread))
}

/// Sorted, annotated tree. `?sort=best&recursive=true`
async fn get_thread(
    State(state): State<SharedState>,
    MaybeUser(viewer): MaybeUser,
    Path(tree_id): Path<Uuid>,
    Query(query): Query<ThreadQuery>,
) -> AgoraResult<Json<Vec<NodeView>>> {
    let views = state
        .deliberation()
        .thread(tree_id, query, viewer.as_deref())
        .await?;
    Ok(Json(views))
}
