use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use agora_core::{RankedTopic, Topic, TopicActivity};

use crate::auth::AuthUser;
use crate::error::AgoraResult;
use crate::models::{CreateTopicRequest, TopicQuery};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_topics).post(create_topic))
        .route("/hot", get(hot_topics))
}

async fn list_topics(
    State(state): State<SharedState>,
    Query(query): Query<TopicQuery>,
) -> AgoraResult<Json<Vec<RankedTopic>>> {
    let topics = state
        .deliberation()
        .topics(query.sort.unwrap_or_default())
        .await?;
    Ok(Json(topics))
}

async fn create_topic(
    State(state): State<SharedState>,
    AuthUser(_user): AuthUser,
    Json(request): Json<CreateTopicRequest>,
) -> AgoraResult<(StatusCode, Json<Topic>)> {
    let topic = state.deliberation().create_topic(request).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn hot_topics(State(state): State<SharedState>) -> AgoraResult<Json<Vec<TopicActivity>>> {
    Ok(Json(state.deliberation().hot_topics().await?))
}
