//! Point queries against a computed [`Layout`]: which node is under the
//! pointer, and where a dropped node would be inserted.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HIT_PADDING, INSERTION_BAND};
use crate::forest::TreeInsertionPosition;
use crate::geom::Point;
use crate::layout::{Layout, LayoutTree, NodeHandle};

/// The node whose padded label box contains `pt` (diagram space).
///
/// Trees are searched left to right. Within a tree the innermost containing
/// node wins: the pre-order index is scanned from the back, so descendants are
/// tried before their ancestors.
#[must_use]
pub fn layout_node_at(layout: &Layout, pt: Point) -> Option<NodeHandle<'_>> {
    layout.trees.iter().enumerate().find_map(|(tree_index, tree)| {
        let (left, right) = tree.span();
        if pt.x < left - HIT_PADDING || pt.x > right + HIT_PADDING {
            return None;
        }
        let local = tree.to_local(pt);
        tree.nodes
            .iter()
            .rev()
            .find(|n| n.hit_box().contains(local))
            .map(|node| NodeHandle { tree_index, tree, node })
    })
}

/// Resolve a drop point to the slot a moved node would occupy.
///
/// Dropping onto a node's box makes the node its first child. Otherwise the
/// nearest node in the same row decides: the slot just before it when the
/// point is to its left, just after it when to its right. Rows are matched
/// within [`INSERTION_BAND`] of the node's baseline; stubs are ignored. A
/// root as the nearest node yields `None`.
#[must_use]
pub fn insertion_position(layout: &Layout, pt: Point) -> Option<TreeInsertionPosition> {
    let tree = nearest_tree(layout, pt.x)?;
    let local = tree.to_local(pt);

    let mut best: Option<(usize, f64)> = None;
    for (index, node) in tree.nodes.iter().enumerate() {
        if node.stub || (node.absolute_y - local.y).abs() > INSERTION_BAND {
            continue;
        }
        let distance = (node.absolute_x - local.x).abs();
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    let (index, _) = best?;
    let node = &tree.nodes[index];

    if node.hit_box().contains(local) {
        return Some(TreeInsertionPosition { parent: node.node_id, index: 0 });
    }

    let parent = &tree.nodes[node.parent?];
    let slot = parent.children.iter().position(|&c| c == index)?;
    let slot = if local.x > node.absolute_x { slot + 1 } else { slot };
    Some(TreeInsertionPosition { parent: parent.node_id, index: slot })
}

/// The tree whose entry point is horizontally closest to `x`. Ties go to the
/// leftmost tree.
fn nearest_tree(layout: &Layout, x: f64) -> Option<&LayoutTree> {
    let mut best: Option<(&LayoutTree, f64)> = None;
    for tree in &layout.trees {
        let distance = (tree.entry_x - x).abs();
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((tree, distance));
        }
    }
    best.map(|(tree, _)| tree)
}
