use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};

use agora_core::NodeId;

use crate::auth::AuthUser;
use crate::error::AgoraResult;
use crate::models::{
    CreateNodeRequest, DeleteResponse, EditNodeRequest, NodeResponse, ViewCountResponse,
    VoteRequest, VoteResponse,
};
use crate::state::SharedState;

// Setup routes
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_node))
        .route("/:id", patch(edit_node).delete(delete_node))
        .route("/:id/vote", post(vote))
        .route("/:id/view", post(record_view))
}

async fn create_node(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateNodeRequest>,
) -> AgoraResult<(StatusCode, Json<NodeResponse>)> {
    let created = state.deliberation().create_node(&user, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn edit_node(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<NodeId>,
    Json(request): Json<EditNodeRequest>,
) -> AgoraResult<Json<NodeResponse>> {
    let edited = state.deliberation().edit_node(&user, id, request).await?;
    Ok(Json(edited))
}

async fn delete_node(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<NodeId>,
) -> AgoraResult<Json<DeleteResponse>> {
    let outcome = state.deliberation().delete_node(&user, id).await?;
    Ok(Json(DeleteResponse {
        node_id: id,
        outcome,
    }))
}

async fn vote(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<NodeId>,
    Json(request): Json<VoteRequest>,
) -> AgoraResult<Json<VoteResponse>> {
    let result = state.deliberation().vote(&user, id, request.value).await?;
    Ok(Json(result))
}

async fn record_view(
    State(state): State<SharedState>,
    Path(id): Path<NodeId>,
) -> AgoraResult<Json<ViewCountResponse>> {
    let view_count = state.deliberation().record_view(id).await?;
    Ok(Json(ViewCountResponse {
        node_id: id,
        view_count,
    }))
}
