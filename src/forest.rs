//! Forest model: id-addressed trees, cross-tree arrows, and structural edits.
//!
//! DESIGN
//! ======
//! Each `Tree` is an arena keyed by `NodeId`. Nodes link to their parent and
//! children by id only, so there are no shared pointers between nodes and no
//! reference cycles. A `Forest` holds its trees behind `Arc`, which makes
//! cloning a forest cheap and lets every mutator copy only the tree it edits
//! (`Arc::make_mut`). Callers always receive a new `Forest` value; the input
//! is never observably changed, so it can be kept as an undo snapshot.
//!
//! ERROR HANDLING
//! ==============
//! Mutators are total. An unknown id yields an unchanged forest. Edits that
//! would break the tree shape (a sibling for a root, moving a node under its
//! own subtree) are refused the same way and logged at `warn`.

#[cfg(test)]
#[path = "forest_test.rs"]
mod forest_test;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique identifier for a forest node. Stable across edits.
pub type NodeId = Uuid;

/// A labeled node. An empty `label` marks an empty slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    /// External reference number used to resolve arrow endpoints.
    pub numerical_label: Option<u32>,
    /// `None` only for the root of a tree.
    pub parent: Option<NodeId>,
    /// Ordered children; order is the left-to-right display order.
    pub children: Vec<NodeId>,
}

impl Node {
    /// A parentless, childless node with a fresh id.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), label)
    }

    #[must_use]
    pub fn with_id(id: NodeId, label: impl Into<String>) -> Self {
        Self { id, label: label.into(), numerical_label: None, parent: None, children: Vec::new() }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this node is an empty slot (blank label).
    #[must_use]
    pub fn is_empty_slot(&self) -> bool {
        self.label.is_empty()
    }
}

/// Directed cross-reference between two nodes, possibly in different trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    pub start: NodeId,
    pub end: NodeId,
    pub label: Option<String>,
}

/// Target slot for an insertion: the `index`-th child of `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeInsertionPosition {
    pub parent: NodeId,
    pub index: usize,
}

/// Which side of a node a new sibling is created on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

// =============================================================================
// TREE
// =============================================================================

/// A single rooted hierarchy. Every stored node is reachable from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    root_id: NodeId,
}

impl Tree {
    /// Start a tree from its root node. Any parent link on `root` is cleared.
    #[must_use]
    pub fn new(mut root: Node) -> Self {
        root.parent = None;
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self { nodes, root_id }
    }

    #[must_use]
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_id)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` for a well-formed tree; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ids of `id` and all its descendants in pre-order. Empty if `id` is absent.
    #[must_use]
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Whether `candidate` is `ancestor` itself or lies beneath it.
    #[must_use]
    pub fn is_in_subtree(&self, ancestor: NodeId, candidate: NodeId) -> bool {
        let mut cursor = Some(candidate);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Append `node` as the last child of `parent`. Returns the node's id, or
    /// `None` (and drops the node) when `parent` is not in this tree.
    pub fn attach(&mut self, node: Node, parent: NodeId) -> Option<NodeId> {
        let len = self.nodes.get(&parent)?.children.len();
        self.insert_child(node, parent, len)
    }

    /// Insert `node` as the `index`-th child of `parent`, clamping `index` to
    /// the current child count.
    fn insert_child(&mut self, mut node: Node, parent: NodeId, index: usize) -> Option<NodeId> {
        let id = node.id;
        let parent_node = self.nodes.get_mut(&parent)?;
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, id);
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        Some(id)
    }

    /// Remove `id` from its parent's child list. Returns the former index.
    fn detach(&mut self, id: NodeId) -> Option<usize> {
        let parent_id = self.nodes.get(&id)?.parent?;
        let parent = self.nodes.get_mut(&parent_id)?;
        let index = parent.children.iter().position(|&c| c == id)?;
        parent.children.remove(index);
        Some(index)
    }

    /// Take `id` and its descendants out of the arena, pre-order.
    fn take_subtree(&mut self, id: NodeId) -> Vec<Node> {
        self.subtree_ids(id)
            .into_iter()
            .filter_map(|n| self.nodes.remove(&n))
            .collect()
    }

    /// Splice a detached fragment (pre-order, first node is its root) under
    /// `parent` at `index`.
    fn graft(&mut self, fragment: Vec<Node>, parent: NodeId, index: usize) -> bool {
        let mut nodes = fragment.into_iter();
        let Some(head) = nodes.next() else {
            return false;
        };
        if self.insert_child(head, parent, index).is_none() {
            return false;
        }
        for node in nodes {
            self.nodes.insert(node.id, node);
        }
        true
    }

    fn into_fragment(self) -> Vec<Node> {
        let mut tree = self;
        let root = tree.root_id;
        tree.take_subtree(root)
    }
}

// =============================================================================
// FOREST
// =============================================================================

/// Ordered trees (display order, left to right) plus cross-tree arrows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forest {
    trees: Vec<Arc<Tree>>,
    arrows: Vec<Arrow>,
}

impl Forest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Every arrow, including any whose endpoint has since been deleted.
    #[must_use]
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Arrows whose endpoints both still exist.
    pub fn live_arrows(&self) -> impl Iterator<Item = &Arrow> {
        self.arrows
            .iter()
            .filter(|a| self.has_node(a.start) && self.has_node(a.end))
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(Arc::new(tree));
    }

    pub fn add_arrow(&mut self, arrow: Arrow) {
        self.arrows.push(arrow);
    }

    /// Total number of nodes across all trees.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|t| t.len()).sum()
    }

    #[must_use]
    pub fn has_node(&self, id: NodeId) -> bool {
        self.trees.iter().any(|t| t.contains(id))
    }

    #[must_use]
    pub fn find_node(&self, id: NodeId) -> Option<&Node> {
        self.trees.iter().find_map(|t| t.node(id))
    }

    /// The tree containing `id`.
    #[must_use]
    pub fn tree_of(&self, id: NodeId) -> Option<&Tree> {
        self.trees.iter().map(AsRef::as_ref).find(|t| t.contains(id))
    }

    fn tree_index_of(&self, id: NodeId) -> Option<usize> {
        self.trees.iter().position(|t| t.contains(id))
    }

    // --- Mutators ---

    /// Replace the label of `id`, leaving identity and structure untouched.
    #[must_use]
    pub fn update_node_label(&self, id: NodeId, label: &str) -> Forest {
        let Some(ti) = self.tree_index_of(id) else {
            debug!(%id, "update_node_label: unknown node");
            return self.clone();
        };
        let mut next = self.clone();
        let tree = Arc::make_mut(&mut next.trees[ti]);
        if let Some(node) = tree.nodes.get_mut(&id) {
            node.label = label.to_owned();
        }
        next
    }

    /// Remove `id` and its whole subtree. Deleting a root removes its tree.
    ///
    /// Arrows that pointed into the removed subtree are kept; use
    /// [`Forest::live_arrows`] to skip them.
    #[must_use]
    pub fn delete_node(&self, id: NodeId) -> Forest {
        let Some(ti) = self.tree_index_of(id) else {
            debug!(%id, "delete_node: unknown node");
            return self.clone();
        };
        let mut next = self.clone();
        if self.trees[ti].root_id == id {
            next.trees.remove(ti);
            debug!(%id, "delete_node: removed tree");
            return next;
        }
        let tree = Arc::make_mut(&mut next.trees[ti]);
        tree.detach(id);
        let removed = tree.take_subtree(id);
        debug!(%id, removed = removed.len(), "delete_node: removed subtree");
        next
    }

    /// Append a new empty node as the last child of `parent`.
    #[must_use]
    pub fn make_child(&self, parent: NodeId) -> Forest {
        self.make_child_with(parent, Uuid::new_v4())
    }

    /// [`Forest::make_child`] with a caller-supplied id for the new node.
    #[must_use]
    pub fn make_child_with(&self, parent: NodeId, new_id: NodeId) -> Forest {
        let Some(ti) = self.tree_index_of(parent) else {
            debug!(%parent, "make_child: unknown node");
            return self.clone();
        };
        let mut next = self.clone();
        let tree = Arc::make_mut(&mut next.trees[ti]);
        tree.attach(Node::with_id(new_id, ""), parent);
        next
    }

    /// Insert a new empty node directly left or right of `id`.
    ///
    /// A root has no sibling slot; the forest is returned unchanged.
    #[must_use]
    pub fn make_sibling(&self, id: NodeId, side: Side) -> Forest {
        self.make_sibling_with(id, side, Uuid::new_v4())
    }

    /// [`Forest::make_sibling`] with a caller-supplied id for the new node.
    #[must_use]
    pub fn make_sibling_with(&self, id: NodeId, side: Side, new_id: NodeId) -> Forest {
        let Some(ti) = self.tree_index_of(id) else {
            debug!(%id, "make_sibling: unknown node");
            return self.clone();
        };
        let tree = &self.trees[ti];
        let Some(parent_id) = tree.node(id).and_then(|n| n.parent) else {
            warn!(%id, "make_sibling: refusing to add a sibling to a root");
            return self.clone();
        };
        let Some(index) = tree
            .node(parent_id)
            .and_then(|p| p.children.iter().position(|&c| c == id))
        else {
            return self.clone();
        };
        let index = match side {
            Side::Left => index,
            Side::Right => index + 1,
        };
        let mut next = self.clone();
        let tree = Arc::make_mut(&mut next.trees[ti]);
        tree.insert_child(Node::with_id(new_id, ""), parent_id, index);
        next
    }

    /// Move the subtree rooted at `id` to become the `index`-th child of
    /// `new_parent`. `index` counts children after `id` has been detached and
    /// is clamped to that count. Moving a root dissolves its tree.
    ///
    /// Moving a node beneath itself is refused.
    #[must_use]
    pub fn move_node(&self, id: NodeId, new_parent: NodeId, index: usize) -> Forest {
        let (Some(src), Some(_)) = (self.tree_index_of(id), self.tree_index_of(new_parent)) else {
            debug!(%id, %new_parent, "move_node: unknown node");
            return self.clone();
        };
        if self.trees[src].is_in_subtree(id, new_parent) {
            warn!(%id, %new_parent, "move_node: refusing to move a node under its own subtree");
            return self.clone();
        }

        let mut next = self.clone();
        let fragment = if self.trees[src].root_id == id {
            let tree = next.trees.remove(src);
            Arc::unwrap_or_clone(tree).into_fragment()
        } else {
            let tree = Arc::make_mut(&mut next.trees[src]);
            tree.detach(id);
            tree.take_subtree(id)
        };

        let Some(dst) = next.tree_index_of(new_parent) else {
            return self.clone();
        };
        let tree = Arc::make_mut(&mut next.trees[dst]);
        if !tree.graft(fragment, new_parent, index) {
            return self.clone();
        }
        debug!(%id, %new_parent, index, "move_node: moved subtree");
        next
    }
}
