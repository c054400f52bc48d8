use serde::{Deserialize, Serialize};

use crate::model::{ArgumentNode, NodeId};

/// Content stored in place of a deleted node that still has replies
pub const TOMBSTONE: &str = "[deleted]";

/// How a deletion must be carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPlan {
    /// Leaf: remove the node and its votes
    HardDelete,
    /// Has replies: overwrite content with [`TOMBSTONE`], keep the node
    Tombstone,
}

/// Leaves are removed, anything with replies is tombstoned
pub fn plan_deletion(has_children: bool) -> DeletionPlan {
    if has_children {
        DeletionPlan::Tombstone
    } else {
        DeletionPlan::HardDelete
    }
}

/// Whether any node in `nodes` replies to `id`
pub fn has_children<'a>(id: NodeId, nodes: impl IntoIterator<Item = &'a ArgumentNode>) -> bool {
    nodes.into_iter().any(|node| node.parent_id == Some(id))
}

/// Only the author may edit or delete a node
pub fn can_modify(node: &ArgumentNode, user_id: &str) -> bool {
    node.author_id == user_id
}

/// Whether the node has already been tombstoned
pub fn is_tombstoned(node: &ArgumentNode) -> bool {
    node.deleted
}

/// Overwrite a node's content with the tombstone.
///
/// Votes stay attached so scores of surviving threads do not shift.
pub fn tombstone(node: &mut ArgumentNode) {
    node.deleted = true;
    node.content = TOMBSTONE.to_string();
    if node.title.is_some() {
        node.title = Some(TOMBSTONE.to_string());
    }
    node.evidence.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;
    use uuid::Uuid;

    #[test]
    fn test_plan_deletion() {
        assert_eq!(plan_deletion(false), DeletionPlan::HardDelete);
        assert_eq!(plan_deletion(true), DeletionPlan::Tombstone);
    }

    #[test]
    fn test_has_children() {
        let tree_id = Uuid::new_v4();
        let root = ArgumentNode::new(tree_id, NodeKind::Comment, None, "a", "root");
        let reply = ArgumentNode::new(tree_id, NodeKind::Comment, Some(root.id), "b", "reply");
        let nodes = vec![root.clone(), reply.clone()];

        assert!(has_children(root.id, &nodes));
        assert!(!has_children(reply.id, &nodes));
    }

    #[test]
    fn test_tombstone() {
        let mut claim = ArgumentNode::new(Uuid::new_v4(), NodeKind::Claim, None, "a", "body")
            .with_title("A title");

        assert!(can_modify(&claim, "a"));
        assert!(!can_modify(&claim, "b"));

        tombstone(&mut claim);
        assert!(is_tombstoned(&claim));
        assert_eq!(claim.title.as_deref(), Some(TOMBSTONE));
    }

    #[test]
    fn test_tombstone_text_alone_is_not_deleted() {
        let node = ArgumentNode::new(Uuid::new_v4(), NodeKind::Comment, None, "a", TOMBSTONE);
        assert!(!is_tombstoned(&node));
    }
}
