//! Display annotation of sorted forests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Evidence, NodeId, NodeKind, Stance, UserId, VoteValue};
use crate::moderation::ModerationScanner;
use crate::score::{Metrics, ScoreAggregator};
use crate::tree::Tree;

/// A node as handed to the display layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub tree_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<Uuid>,
    pub kind: NodeKind,
    pub parent_id: Option<NodeId>,
    pub author_id: UserId,
    pub title: Option<String>,

    /// Content, censored when the node carries the caution flag
    pub content: String,

    /// Stance as stored on the node
    pub stance: Option<Stance>,

    /// Stored stance, or one inferred by alternating from the nearest
    /// ancestor that has a stance. Display only.
    pub display_stance: Option<Stance>,

    pub caution: bool,
    pub created_at: DateTime<Utc>,
    pub metrics: Metrics,

    /// Root-level controversial marker
    pub controversial_badge: bool,

    /// Distance from the root (roots are 0)
    pub depth: usize,

    /// The viewer's own vote, if any
    pub user_vote: Option<VoteValue>,

    pub view_count: u64,
    pub evidence: Vec<Evidence>,

    /// The node was deleted but kept for its replies
    pub deleted: bool,

    pub children: Vec<NodeView>,
}

/// A view still collecting its children
struct Pending {
    view: NodeView,
    remaining: std::vec::IntoIter<Tree>,
}

/// Turns trees into [`NodeView`]s for one viewer.
pub struct ViewBuilder<'a> {
    aggregator: &'a ScoreAggregator,
    scanner: &'a ModerationScanner,
    viewer: Option<&'a str>,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(aggregator: &'a ScoreAggregator, scanner: &'a ModerationScanner) -> Self {
        Self {
            aggregator,
            scanner,
            viewer: None,
        }
    }

    /// Fill in `user_vote` for this viewer
    pub fn for_viewer(mut self, viewer: Option<&'a str>) -> Self {
        self.viewer = viewer;
        self
    }

    /// Annotate a forest, keeping its order.
    ///
    /// Walks with an explicit stack so arbitrarily deep threads are fine.
    pub fn build(&self, trees: Vec<Tree>) -> Vec<NodeView> {
        let mut roots = Vec::with_capacity(trees.len());

        for tree in trees {
            let mut stack = vec![self.annotate(tree, 0, None)];
            while let Some(top) = stack.last_mut() {
                if let Some(child) = top.remaining.next() {
                    let depth = top.view.depth + 1;
                    let inherited = top.view.display_stance;
                    stack.push(self.annotate(child, depth, inherited));
                    continue;
                }

                if let Some(done) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.view.children.push(done.view),
                        None => roots.push(done.view),
                    }
                }
            }
        }

        roots
    }

    /// View of one node; its replies are returned for the caller to visit
    fn annotate(&self, tree: Tree, depth: usize, inherited: Option<Stance>) -> Pending {
        let Tree { node, children } = tree;

        let metrics = self.aggregator.aggregate(&node);
        let display_stance = node.stance.or(inherited.map(Stance::opposite));
        let user_vote = self.viewer.and_then(|viewer| node.vote_of(viewer));
        let (title, content) = if node.caution {
            (
                node.title.as_deref().map(|title| self.scanner.censor(title)),
                self.scanner.censor(&node.content),
            )
        } else {
            (node.title, node.content)
        };

        let view = NodeView {
            id: node.id,
            tree_id: node.tree_id,
            community_id: node.community_id,
            kind: node.kind,
            parent_id: node.parent_id,
            author_id: node.author_id,
            title,
            content,
            stance: node.stance,
            display_stance,
            caution: node.caution,
            created_at: node.created_at,
            metrics,
            controversial_badge: depth == 0 && metrics.is_controversial,
            depth,
            user_vote,
            view_count: node.view_count,
            evidence: node.evidence,
            deleted: node.deleted,
            children: Vec::with_capacity(children.len()),
        };

        Pending {
            view,
            remaining: children.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArgumentNode, Vote};
    use crate::moderation::TermLists;
    use crate::tree::TreeBuilder;

    fn vote(user: &str, value: VoteValue) -> Vote {
        Vote {
            user_id: user.to_string(),
            value,
            cast_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_annotates_tree() {
        let scanner = ModerationScanner::new(TermLists::default()).unwrap();
        let aggregator = ScoreAggregator::default();
        let tree_id = Uuid::new_v4();

        let mut root = ArgumentNode::new(tree_id, NodeKind::Opinion, None, "alice", "root")
            .with_stance(Stance::Pro);
        for i in 0..3 {
            root.votes.push(vote(&format!("up{}", i), VoteValue::Up));
            root.votes.push(vote(&format!("down{}", i), VoteValue::Down));
        }
        let opinion = |parent: Option<NodeId>, author: &str, content: &str| {
            ArgumentNode::new(tree_id, NodeKind::Opinion, parent, author, content)
        };
        let mut reply = opinion(Some(root.id), "bob", "what shit");
        reply.caution = true;
        reply.votes.push(vote("alice", VoteValue::Down));
        let nested = opinion(Some(reply.id), "carol", "nested");

        let forest = TreeBuilder::new().build(vec![root, reply, nested]);
        let views = ViewBuilder::new(&aggregator, &scanner)
            .for_viewer(Some("alice"))
            .build(forest);

        let root = &views[0];
        assert_eq!(root.depth, 0);
        assert!(root.controversial_badge);
        assert_eq!(root.display_stance, Some(Stance::Pro));
        assert_eq!(root.user_vote, None);

        let reply = &root.children[0];
        assert_eq!(reply.depth, 1);
        assert_eq!(reply.content, "what ****");
        assert_eq!(reply.stance, None);
        assert_eq!(reply.display_stance, Some(Stance::Con));
        assert_eq!(reply.user_vote, Some(VoteValue::Down));
        assert_eq!(reply.metrics.score, -1);

        let nested = &reply.children[0];
        assert_eq!(nested.display_stance, Some(Stance::Pro));
        assert!(!nested.controversial_badge);
    }

    #[test]
    fn test_uncautioned_content_is_not_censored() {
        let scanner = ModerationScanner::new(TermLists::default()).unwrap();
        let aggregator = ScoreAggregator::default();
        let text = "an ass is a donkey";
        let node = ArgumentNode::new(Uuid::new_v4(), NodeKind::Comment, None, "a", text);

        let views = ViewBuilder::new(&aggregator, &scanner).build(vec![Tree::leaf(node)]);
        assert_eq!(views[0].content, text);
        assert_eq!(views[0].display_stance, None);
    }

    #[test]
    fn test_deep_chain_keeps_depth_and_order() {
        let scanner = ModerationScanner::new(TermLists::default()).unwrap();
        let aggregator = ScoreAggregator::default();
        let tree_id = Uuid::new_v4();

        let mut nodes = vec![ArgumentNode::new(tree_id, NodeKind::Rebuttal, None, "a", "0")];
        for i in 1..10_000 {
            let parent = nodes[i - 1].id;
            let content = i.to_string();
            nodes.push(ArgumentNode::new(tree_id, NodeKind::Rebuttal, Some(parent), "a", content));
        }
        let first = nodes[0].id;
        nodes.push(ArgumentNode::new(tree_id, NodeKind::Rebuttal, Some(first), "b", "sibling"));

        let forest = TreeBuilder::new().build(nodes);
        let views = ViewBuilder::new(&aggregator, &scanner).build(forest);

        let root = &views[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].content, "sibling");

        let mut depth = 0;
        let mut cursor = root;
        while let Some(next) = cursor.children.first() {
            depth += 1;
            assert_eq!(next.depth, depth);
            cursor = next;
        }
        assert_eq!(depth, 9_999);

        // Drop of a deep view recurses, so unwind it level by level
        let mut views = views;
        let mut level = std::mem::take(&mut views[0].children);
        while let Some(mut next) = level.pop() {
            level.append(&mut next.children);
        }
    }
}
