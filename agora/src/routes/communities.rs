use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use agora_core::{Community, NodeView};

use crate::auth::{AuthUser, MaybeUser};
use crate::error::AgoraResult;
use crate::models::{CreateCommunityRequest, PostListQuery};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_communities).post(create_community))
        .route("/:slug", get(get_community))
        .route("/:slug/posts", get(list_posts))
}

async fn list_communities(State(state): State<SharedState>) -> AgoraResult<Json<Vec<Community>>> {
    Ok(Json(state.deliberation().communities().await?))
}

async fn get_community(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> AgoraResult<Json<Community>> {
    Ok(Json(state.deliberation().community(&slug).await?))
}

/// Posts of a community. `?sort=views`
async fn list_posts(
    State(state): State<SharedState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
    Query(query): Query<PostListQuery>,
) -> AgoraResult<Json<Vec<NodeView>>> {
    let posts = state
        .deliberation()
        .community_posts(&slug, query, viewer.as_deref())
        .await?;
    Ok(Json(posts))
}

async fn create_community(
    State(state): State<SharedState>,
    AuthUser(_user): AuthUser,
    Json(request): Json<CreateCommunityRequest>,
) -> AgoraResult<(StatusCode, Json<Community>)> {
    let community = state.deliberation().create_community(request).await?;
    Ok((StatusCode::CREATED, Json(community)))
}
