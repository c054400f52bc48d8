use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use agora_core::lifecycle::{has_children, tombstone};
use agora_core::{
    apply_vote, plan_deletion, ArgumentNode, Community, DeletionPlan, NodeId, NodeKind, Topic,
    VoteAction, VoteIntent,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::lock::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::DataStore;

/// Nodes keyed by id, with an insertion sequence to break timestamp ties
#[derive(Default)]
struct NodeTable {
    rows: HashMap<NodeId, (u64, ArgumentNode)>,
    next_seq: u64,
}

impl NodeTable {
    fn get_mut(&mut self, id: NodeId) -> StoreResult<&mut ArgumentNode> {
        self.rows
            .get_mut(&id)
            .map(|(_, node)| node)
            .ok_or_else(|| StoreError::NotFound(format!("Node {}", id)))
    }

    /// Matching nodes ordered by creation time, then insertion order
    fn collect(&self, keep: impl Fn(&ArgumentNode) -> bool) -> Vec<ArgumentNode> {
        let mut matched: Vec<&(u64, ArgumentNode)> =
            self.rows.values().filter(|(_, node)| keep(node)).collect();
        matched.sort_by_key(|(seq, node)| (node.created_at, *seq));
        matched.into_iter().map(|(_, node)| node.clone()).collect()
    }
}

/// In-memory implementation of [`DataStore`]
#[derive(Clone, Default)]
pub struct InMemoryStore {
    /// Argument nodes of every kind
    nodes: Arc<Mutex<NodeTable>>,

    /// Topics keyed by id
    topics: Arc<Mutex<HashMap<Uuid, Topic>>>,

    /// Communities in insertion order
    communities: Arc<Mutex<Vec<Community>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn insert_node(&self, node: ArgumentNode) -> StoreResult<ArgumentNode> {
        let mut table = self.nodes.lock().await;
        if table.rows.contains_key(&node.id) {
            return Err(StoreError::Conflict(format!("Node {} already exists", node.id)));
        }

        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(node.id, (seq, node.clone()));

        debug!(node_id = %node.id, tree_id = %node.tree_id, "Inserted node");
        Ok(node)
    }

    async fn get_node(&self, id: NodeId) -> StoreResult<Option<ArgumentNode>> {
        let table = self.nodes.lock().await;
        Ok(table.rows.get(&id).map(|(_, node)| node.clone()))
    }

    async fn list_tree(&self, tree_id: Uuid) -> StoreResult<Vec<ArgumentNode>> {
        let table = self.nodes.lock().await;
        Ok(table.collect(|node| node.tree_id == tree_id))
    }

    async fn list_nodes(&self, since: Option<DateTime<Utc>>) -> StoreResult<Vec<ArgumentNode>> {
        let table = self.nodes.lock().await;
        Ok(table.collect(|node| since.map_or(true, |since| node.created_at >= since)))
    }

    async fn list_community_posts(&self, community_id: Uuid) -> StoreResult<Vec<ArgumentNode>> {
        let table = self.nodes.lock().await;
        Ok(table.collect(|node| {
            node.community_id == Some(community_id) && node.kind == NodeKind::Post
        }))
    }

    async fn update_content(
        &self,
        id: NodeId,
        title: Option<String>,
        content: String,
    ) -> StoreResult<ArgumentNode> {
        let mut table = self.nodes.lock().await;
        let node = table.get_mut(id)?;
        if title.is_some() {
            node.title = title;
        }
        node.content = content;
        Ok(node.clone())
    }

    async fn delete_node(&self, id: NodeId) -> StoreResult<DeletionPlan> {
        let mut table = self.nodes.lock().await;
        if !table.rows.contains_key(&id) {
            return Err(StoreError::NotFound(format!("Node {}", id)));
        }

        let replied = has_children(id, table.rows.values().map(|(_, node)| node));
        let plan = plan_deletion(replied);
        match plan {
            DeletionPlan::HardDelete => {
                table.rows.remove(&id);
            }
            DeletionPlan::Tombstone => tombstone(table.get_mut(id)?),
        }

        debug!(node_id = %id, ?plan, "Deleted node");
        Ok(plan)
    }

    async fn apply_vote(
        &self,
        node_id: NodeId,
        user_id: &str,
        intent: VoteIntent,
        at: DateTime<Utc>,
    ) -> StoreResult<(VoteAction, ArgumentNode)> {
        let mut table = self.nodes.lock().await;
        let node = table.get_mut(node_id)?;
        let action = apply_vote(&mut node.votes, user_id, intent, at);

        debug!(node_id = %node_id, user_id, ?action, "Applied vote");
        Ok((action, node.clone()))
    }

    async fn record_view(&self, id: NodeId) -> StoreResult<u64> {
        let mut table = self.nodes.lock().await;
        let node = table.get_mut(id)?;
        node.view_count = node.view_count.saturating_add(1);
        Ok(node.view_count)
    }

    async fn insert_topic(&self, topic: Topic) -> StoreResult<Topic> {
        let mut topics = self.topics.lock().await;
        if topics.contains_key(&topic.id) {
            return Err(StoreError::Conflict(format!("Topic {} already exists", topic.id)));
        }
        topics.insert(topic.id, topic.clone());
        Ok(topic)
    }

    async fn get_topic(&self, id: Uuid) -> StoreResult<Option<Topic>> {
        let topics = self.topics.lock().await;
        Ok(topics.get(&id).cloned())
    }

    async fn list_topics(&self) -> StoreResult<Vec<Topic>> {
        let topics = self.topics.lock().await;
        let mut listed: Vec<Topic> = topics.values().cloned().collect();
        listed.sort_by_key(|topic| Reverse(topic.created_at));
        Ok(listed)
    }

    async fn insert_community(&self, community: Community) -> StoreResult<Community> {
        let mut communities = self.communities.lock().await;
        if communities.iter().any(|c| c.slug == community.slug) {
            return Err(StoreError::Conflict(format!(
                "Community slug '{}' is taken",
                community.slug
            )));
        }
        communities.push(community.clone());
        Ok(community)
    }

    async fn get_community(&self, slug: &str) -> StoreResult<Option<Community>> {
        let communities = self.communities.lock().await;
        Ok(communities.iter().find(|c| c.slug == slug).cloned())
    }

    async fn list_communities(&self) -> StoreResult<Vec<Community>> {
        let communities = self.communities.lock().await;
        Ok(communities.clone())
    }
}
