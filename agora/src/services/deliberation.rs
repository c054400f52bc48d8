use std::sync::Arc;

use agora_core::lifecycle::{can_modify, is_tombstoned};
use agora_core::{
    is_valid_community_name, rank_topics, slugify, sort_communities, ArgumentNode, Community,
    DeletionPlan, ModerationResult, ModerationScanner, NodeId, NodeKind, NodeView, RankedTopic,
    RankedTopicSelector, ScoreAggregator, SortScope, Topic, TopicActivity, TopicSort, TreeBuilder,
    TreeSorter, ViewBuilder, VoteIntent,
};
use agora_store::DataStore;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::{AgoraError, AgoraResult};
use crate::models::{
    CreateCommunityRequest, CreateNodeRequest, CreateTopicRequest, EditNodeRequest, NodeResponse,
    PostListQuery, ThreadQuery, VoteResponse,
};

/// Write and read paths for argument trees, topics and communities.
///
/// Severe content is rejected before it reaches the store. Everything the
/// service returns for display goes through [`ViewBuilder`], which censors
/// caution-flagged nodes.
pub struct DeliberationService {
    store: Arc<dyn DataStore>,
    scanner: ModerationScanner,
    aggregator: ScoreAggregator,
    selector: RankedTopicSelector,
    config: AppConfig,
}

impl DeliberationService {
    pub fn new(store: Arc<dyn DataStore>, scanner: ModerationScanner, config: AppConfig) -> Self {
        Self {
            store,
            scanner,
            aggregator: ScoreAggregator::new(config.controversial_threshold),
            selector: RankedTopicSelector::new(),
            config,
        }
    }

    /// Run the severe gate over every piece of user text
    fn moderate(&self, parts: &[Option<&str>]) -> AgoraResult<ModerationResult> {
        let text = parts.iter().flatten().copied().collect::<Vec<_>>().join("\n");
        let result = self.scanner.scan(&text);
        if result.is_severe {
            warn!("Rejected content matching {} severe term(s)", result.matches.len());
            return Err(AgoraError::Rejected(
                "content contains prohibited language".to_string(),
            ));
        }
        Ok(result)
    }

    async fn find_node(&self, id: NodeId) -> AgoraResult<ArgumentNode> {
        self.store
            .get_node(id)
            .await?
            .ok_or_else(|| AgoraError::NotFound(format!("Node {}", id)))
    }

    /// Resolve which tree a new node belongs to, checking that its kind
    /// fits under the requested parent
    async fn resolve_tree(&self, request: &CreateNodeRequest, id: NodeId) -> AgoraResult<Uuid> {
        if let Some(parent_id) = request.parent_id {
            let parent = self.store.get_node(parent_id).await?.ok_or_else(|| {
                AgoraError::Validation(format!("parent {} does not exist", parent_id))
            })?;
            if !request.kind.accepts_parent(Some(parent.kind)) {
                return Err(AgoraError::Validation(format!(
                    "a {:?} cannot reply to a {:?}",
                    request.kind, parent.kind
                )));
            }
            if let Some(tree_id) = request.tree_id {
                if tree_id != parent.tree_id {
                    return Err(AgoraError::Validation(format!(
                        "parent {} belongs to a different tree",
                        parent_id
                    )));
                }
            }
            return Ok(parent.tree_id);
        }

        if !request.kind.accepts_parent(None) {
            return Err(AgoraError::Validation(format!(
                "a {:?} must reply to another node",
                request.kind
            )));
        }

        match request.tree_id {
            None => Ok(id),
            Some(tree_id) => {
                let known_topic = self.store.get_topic(tree_id).await?.is_some();
                if known_topic || !self.store.list_tree(tree_id).await?.is_empty() {
                    Ok(tree_id)
                } else {
                    Err(AgoraError::NotFound(format!("Tree {}", tree_id)))
                }
            }
        }
    }

    pub async fn create_node(
        &self,
        author: &str,
        request: CreateNodeRequest,
    ) -> AgoraResult<NodeResponse> {
        request.validate()?;

        if request.kind.is_titled() != request.title.is_some() {
            return Err(AgoraError::Validation(if request.kind.is_titled() {
                "title is required for posts and claims".to_string()
            } else {
                "title is only allowed on posts and claims".to_string()
            }));
        }
        if !request.evidence.is_empty() && request.kind != NodeKind::Claim {
            return Err(AgoraError::Validation(
                "evidence is only allowed on claims".to_string(),
            ));
        }
        let community_id = match (request.kind, request.community.as_deref()) {
            (NodeKind::Post, Some(slug)) => Some(self.community(slug).await?.id),
            (NodeKind::Post, None) => {
                return Err(AgoraError::Validation(
                    "posts must name a community".to_string(),
                ))
            }
            (_, Some(_)) => {
                return Err(AgoraError::Validation(
                    "only posts are published into a community".to_string(),
                ))
            }
            (_, None) => None,
        };

        let moderation =
            self.moderate(&[request.title.as_deref(), Some(request.content.as_str())])?;

        let mut node = ArgumentNode::new(
            Uuid::nil(),
            request.kind,
            request.parent_id,
            author,
            request.content.as_str(),
        );
        node.tree_id = self.resolve_tree(&request, node.id).await?;
        node.community_id = community_id;
        node.title = request.title;
        node.stance = request.stance;
        node.evidence = request.evidence;
        node.caution = moderation.is_caution;

        let node = self.store.insert_node(node).await?;
        info!(
            node_id = %node.id,
            tree_id = %node.tree_id,
            kind = ?node.kind,
            caution = node.caution,
            "Created node"
        );

        let metrics = self.aggregator.aggregate(&node);
        Ok(NodeResponse { node, metrics })
    }

    /// Author-only edit of title and content.
    ///
    /// Edits go through the same severe gate as creation. The caution flag
    /// keeps its creation-time value.
    pub async fn edit_node(
        &self,
        user: &str,
        id: NodeId,
        request: EditNodeRequest,
    ) -> AgoraResult<NodeResponse> {
        request.validate()?;

        let node = self.find_node(id).await?;
        if !can_modify(&node, user) {
            return Err(AgoraError::Forbidden("only the author can edit".to_string()));
        }
        if is_tombstoned(&node) {
            return Err(AgoraError::Conflict(format!("Node {} was deleted", id)));
        }
        if request.title.is_some() && !node.kind.is_titled() {
            return Err(AgoraError::Validation(
                "title is only allowed on posts and claims".to_string(),
            ));
        }

        self.moderate(&[request.title.as_deref(), Some(request.content.as_str())])?;

        let node = self
            .store
            .update_content(id, request.title, request.content)
            .await?;
        debug!(node_id = %id, "Edited node");

        let metrics = self.aggregator.aggregate(&node);
        Ok(NodeResponse { node, metrics })
    }

    /// Author-only delete: leaves disappear, nodes with replies are tombstoned
    pub async fn delete_node(&self, user: &str, id: NodeId) -> AgoraResult<DeletionPlan> {
        let node = self.find_node(id).await?;
        if !can_modify(&node, user) {
            return Err(AgoraError::Forbidden("only the author can delete".to_string()));
        }

        let plan = self.store.delete_node(id).await?;
        info!(node_id = %id, ?plan, "Deleted node");
        Ok(plan)
    }

    /// Like (1), dislike (-1) or clear (0) a node
    pub async fn vote(&self, user: &str, id: NodeId, value: i64) -> AgoraResult<VoteResponse> {
        let intent = VoteIntent::try_from(value)?;
        let (action, node) = self.store.apply_vote(id, user, intent, Utc::now()).await?;

        Ok(VoteResponse {
            node_id: id,
            action,
            user_vote: node.vote_of(user),
            metrics: self.aggregator.aggregate(&node),
        })
    }

    pub async fn record_view(&self, id: NodeId) -> AgoraResult<u64> {
        Ok(self.store.record_view(id).await?)
    }

    /// Build, sort and annotate one tree for display
    pub async fn thread(
        &self,
        tree_id: Uuid,
        query: ThreadQuery,
        viewer: Option<&str>,
    ) -> AgoraResult<Vec<NodeView>> {
        let nodes = self.store.list_tree(tree_id).await?;
        if nodes.is_empty() && self.store.get_topic(tree_id).await?.is_none() {
            return Err(AgoraError::NotFound(format!("Tree {}", tree_id)));
        }

        let strategy = query.sort.unwrap_or_default();
        let scope = if query.recursive.unwrap_or(self.config.recursive_sort) {
            SortScope::Recursive
        } else {
            SortScope::Level
        };

        let forest = TreeBuilder::new().build(nodes);
        let sorted = TreeSorter::new(self.aggregator, Utc::now())
            .with_popularity_window(self.config.popularity_window())
            .arrange(forest, strategy, scope);

        debug!(%tree_id, sort = %strategy, ?scope, "Rendering thread");
        Ok(ViewBuilder::new(&self.aggregator, &self.scanner)
            .for_viewer(viewer)
            .build(sorted))
    }

    /// Topics with the most new nodes inside the hot-topic window
    pub async fn hot_topics(&self) -> AgoraResult<Vec<TopicActivity>> {
        let now = Utc::now();
        let window = self.config.hot_topic_window();
        let topics = self.store.list_topics().await?;
        let recent = self.store.list_nodes(Some(now - window)).await?;

        let activity = self.selector.count_in_window(&topics, &recent, now, window);
        Ok(self.selector.top_k(&activity, self.config.hot_topic_limit))
    }

    pub async fn topics(&self, sort: TopicSort) -> AgoraResult<Vec<RankedTopic>> {
        let topics = self.store.list_topics().await?;
        let nodes = self.store.list_nodes(None).await?;
        Ok(rank_topics(
            topics,
            &nodes,
            sort,
            &self.aggregator,
            Utc::now(),
            self.config.trend_window(),
        ))
    }

    pub async fn create_topic(&self, request: CreateTopicRequest) -> AgoraResult<Topic> {
        request.validate()?;
        self.moderate(&[Some(request.title.as_str()), request.description.as_deref()])?;

        let mut topic = Topic::new(request.title, request.description);
        topic.category = request.category;

        let topic = self.store.insert_topic(topic).await?;
        info!(topic_id = %topic.id, "Created topic");
        Ok(topic)
    }

    pub async fn create_community(
        &self,
        request: CreateCommunityRequest,
    ) -> AgoraResult<Community> {
        request.validate()?;
        if !is_valid_community_name(&request.name) {
            return Err(AgoraError::Validation(
                "community name may only contain letters, digits, '-' and '_'".to_string(),
            ));
        }
        self.moderate(&[
            Some(request.name.as_str()),
            Some(request.title.as_str()),
            request.description.as_deref(),
        ])?;

        let slug = slugify(&request.name);
        if slug.is_empty() {
            return Err(AgoraError::Validation(
                "community name has no usable characters".to_string(),
            ));
        }

        let community = Community {
            id: Uuid::new_v4(),
            slug,
            name: request.name,
            title: request.title,
            description: request.description,
            created_at: Utc::now(),
        };
        let community = self.store.insert_community(community).await?;
        info!(slug = %community.slug, "Created community");
        Ok(community)
    }

    pub async fn community(&self, slug: &str) -> AgoraResult<Community> {
        self.store
            .get_community(slug)
            .await?
            .ok_or_else(|| AgoraError::NotFound(format!("Community {}", slug)))
    }

    pub async fn communities(&self) -> AgoraResult<Vec<Community>> {
        Ok(sort_communities(self.store.list_communities().await?))
    }

    /// Posts of one community as a sorted list of roots, without replies
    pub async fn community_posts(
        &self,
        slug: &str,
        query: PostListQuery,
        viewer: Option<&str>,
    ) -> AgoraResult<Vec<NodeView>> {
        let community = self.community(slug).await?;
        let posts = self.store.list_community_posts(community.id).await?;

        let strategy = query.sort.unwrap_or_default();
        let roots = TreeBuilder::new().build(posts);
        let sorted = TreeSorter::new(self.aggregator, Utc::now())
            .with_popularity_window(self.config.popularity_window())
            .arrange(roots, strategy, SortScope::Level);

        debug!(slug = %community.slug, sort = %strategy, "Listing community posts");
        Ok(ViewBuilder::new(&self.aggregator, &self.scanner)
            .for_viewer(viewer)
            .build(sorted))
    }
}
