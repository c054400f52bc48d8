//! Assembly of flat node rows into reply trees.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::model::{ArgumentNode, NodeId};

/// A node together with its replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// The node itself
    #[serde(flatten)]
    pub node: ArgumentNode,

    /// Direct replies, in build or sort order
    pub children: Vec<Tree>,
}

impl Tree {
    /// A tree with no replies
    pub fn leaf(node: ArgumentNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this tree, the root included
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            count += 1;
            stack.extend(tree.children.iter());
        }
        count
    }

    /// Every node of the tree in pre-order
    pub fn flatten(&self) -> Vec<&ArgumentNode> {
        let mut nodes = Vec::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            nodes.push(&tree.node);
            stack.extend(tree.children.iter().rev());
        }
        nodes
    }

    /// Find a node anywhere in this tree
    pub fn find(&self, id: NodeId) -> Option<&Tree> {
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            if tree.node.id == id {
                return Some(tree);
            }
            stack.extend(tree.children.iter());
        }
        None
    }
}

/// Builds a forest from nodes that reference their parent by id.
///
/// Runs in O(n): one pass indexes nodes by id, a second attaches each node
/// to its parent. Children and roots keep the order they had in the input.
/// A node whose parent is missing from the batch, or is the node itself,
/// becomes a root. Parent cycles are broken by promoting the earliest node
/// of the cycle, so every input node appears exactly once in the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Assemble `nodes` into a forest.
    pub fn build(&self, nodes: Vec<ArgumentNode>) -> Vec<Tree> {
        let count = nodes.len();

        // First occurrence wins when an id is duplicated.
        let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(count);
        for (pos, node) in nodes.iter().enumerate() {
            index.entry(node.id).or_insert(pos);
        }

        let mut parent_of: Vec<Option<usize>> = nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| {
                node.parent_id
                    .and_then(|parent| index.get(&parent).copied())
                    .filter(|&parent| parent != pos)
            })
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut roots = Vec::new();
        let mut orphans = 0;
        for (pos, node) in nodes.iter().enumerate() {
            match parent_of[pos] {
                Some(parent) => children[parent].push(pos),
                None => {
                    if node.parent_id.is_some() {
                        orphans += 1;
                    }
                    roots.push(pos);
                }
            }
        }

        let mut reached = vec![false; count];
        for &root in &roots {
            mark_reachable(root, &children, &mut reached);
        }

        let mut cycles = 0;
        for pos in 0..count {
            if reached[pos] {
                continue;
            }
            if let Some(parent) = parent_of[pos].take() {
                children[parent].retain(|&child| child != pos);
            }
            roots.push(pos);
            mark_reachable(pos, &children, &mut reached);
            cycles += 1;
        }
        roots.sort_unstable();

        if orphans > 0 || cycles > 0 {
            debug!(
                "Promoted {} orphaned and {} cyclic nodes to roots",
                orphans, cycles
            );
        }

        assemble(nodes, &children, &roots)
    }
}

fn mark_reachable(start: usize, children: &[Vec<usize>], reached: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(pos) = stack.pop() {
        if reached[pos] {
            continue;
        }
        reached[pos] = true;
        stack.extend(children[pos].iter().copied());
    }
}

/// Build owned trees bottom-up without recursion.
fn assemble(nodes: Vec<ArgumentNode>, children: &[Vec<usize>], roots: &[usize]) -> Vec<Tree> {
    let mut slots: Vec<Option<ArgumentNode>> = nodes.into_iter().map(Some).collect();
    let mut built: Vec<Option<Tree>> = (0..slots.len()).map(|_| None).collect();

    for &root in roots {
        let mut stack = vec![(root, false)];
        while let Some((pos, expanded)) = stack.pop() {
            if expanded {
                let Some(node) = slots[pos].take() else {
                    continue;
                };
                let kids = children[pos]
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
                built[pos] = Some(Tree {
                    node,
                    children: kids,
                });
            } else {
                stack.push((pos, true));
                stack.extend(children[pos].iter().map(|&child| (child, false)));
            }
        }
    }

    roots.iter().filter_map(|&root| built[root].take()).collect()
}
