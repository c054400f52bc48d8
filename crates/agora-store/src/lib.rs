/*!
# Agora Store

Storage abstraction for argument nodes, topics and communities.

The [`DataStore`] trait is what the server talks to. Every mutation that
reads and writes the same record (votes, view counts, deletions) happens
inside a single call so implementations can make it atomic.
*/

use agora_core::{
    ArgumentNode, Community, DeletionPlan, NodeId, Topic, VoteAction, VoteIntent,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod error;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;

/// Persistence operations used by the deliberation service
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Store a new node. Fails with `Conflict` if the id is taken.
    async fn insert_node(&self, node: ArgumentNode) -> StoreResult<ArgumentNode>;

    /// Fetch one node
    async fn get_node(&self, id: NodeId) -> StoreResult<Option<ArgumentNode>>;

    /// All nodes of one tree, oldest first
    async fn list_tree(&self, tree_id: Uuid) -> StoreResult<Vec<ArgumentNode>>;

    /// Nodes across all trees, optionally only those created at or after `since`
    async fn list_nodes(&self, since: Option<DateTime<Utc>>) -> StoreResult<Vec<ArgumentNode>>;

    /// Posts published into one community, oldest first
    async fn list_community_posts(&self, community_id: Uuid) -> StoreResult<Vec<ArgumentNode>>;

    /// Replace the title and content of a node
    async fn update_content(
        &self,
        id: NodeId,
        title: Option<String>,
        content: String,
    ) -> StoreResult<ArgumentNode>;

    /// Delete a node: removed outright when it has no replies, tombstoned otherwise
    async fn delete_node(&self, id: NodeId) -> StoreResult<DeletionPlan>;

    /// Apply a vote intent atomically and return the action taken with the updated node
    async fn apply_vote(
        &self,
        node_id: NodeId,
        user_id: &str,
        intent: VoteIntent,
        at: DateTime<Utc>,
    ) -> StoreResult<(VoteAction, ArgumentNode)>;

    /// Bump the view counter, returning the new count
    async fn record_view(&self, id: NodeId) -> StoreResult<u64>;

    /// Store a new topic
    async fn insert_topic(&self, topic: Topic) -> StoreResult<Topic>;

    /// Fetch one topic
    async fn get_topic(&self, id: Uuid) -> StoreResult<Option<Topic>>;

    /// All topics, newest first
    async fn list_topics(&self) -> StoreResult<Vec<Topic>>;

    /// Store a new community. Fails with `Conflict` if the slug is taken.
    async fn insert_community(&self, community: Community) -> StoreResult<Community>;

    /// Fetch a community by slug
    async fn get_community(&self, slug: &str) -> StoreResult<Option<Community>>;

    /// All communities in insertion order
    async fn list_communities(&self) -> StoreResult<Vec<Community>>;
}
