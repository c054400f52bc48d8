use agora_core::{
    ArgumentNode, DeletionPlan, Evidence, Metrics, NodeId, NodeKind, SortStrategy, Stance,
    TopicSort, VoteAction, VoteValue,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateNodeRequest {
    /// Tree to publish into. Optional for replies (the parent's tree is
    /// used) and for new posts (the post starts its own tree).
    pub tree_id: Option<Uuid>,
    #[serde(default)]
    pub kind: NodeKind,
    pub parent_id: Option<NodeId>,
    /// Slug of the community a post is published into; posts only
    pub community: Option<String>,
    #[validate(length(min = 3, max = 300))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    pub stance: Option<Stance>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EditNodeRequest {
    #[validate(length(min = 3, max = 300))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    /// 1 likes, -1 dislikes, 0 clears
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub node_id: NodeId,
    pub action: VoteAction,
    pub user_vote: Option<VoteValue>,
    pub metrics: Metrics,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub node_id: NodeId,
    pub outcome: DeletionPlan,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewCountResponse {
    pub node_id: NodeId,
    pub view_count: u64,
}

/// Node as returned by write paths
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeResponse {
    #[serde(flatten)]
    pub node: ArgumentNode,
    pub metrics: Metrics,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ThreadQuery {
    pub sort: Option<SortStrategy>,
    pub recursive: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub sort: Option<SortStrategy>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TopicQuery {
    pub sort: Option<TopicSort>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTopicRequest {
    #[validate(length(min = 3, max = 300))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCommunityRequest {
    #[validate(length(min = 3, max = 30))]
    pub name: String,
    #[validate(length(min = 3, max = 60))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}
