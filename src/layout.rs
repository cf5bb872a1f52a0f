//! Layout engine: assigns every forest node a label box and a position.
//!
//! DESIGN
//! ======
//! Widths are computed bottom-up: a leaf is as wide as its label, an internal
//! node as wide as the larger of its label and its children laid side by side
//! with `CHILD_PADDING` between them. Positions are then assigned top-down,
//! each child centered in its own slice of the parent's span, one
//! `TRACK_HEIGHT` below the parent.
//!
//! Every node records its offset from its parent (`x`, `y`) and its position
//! in tree-local space (`absolute_x`, `absolute_y`), where the root sits at
//! the origin. A tree's `entry_x`/`entry_y` place that origin in diagram
//! space. `y` is the label baseline; the label box extends upward from it.
//!
//! Text metrics come from a caller-supplied [`TextMeasure`], so layout never
//! depends on a font or a drawing surface.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EditorConfig;
use crate::consts::{CHILD_PADDING, EMPTY_LABEL_GLYPH, HIT_PADDING, LABEL_PADDING, TRACK_HEIGHT, TREE_MARGIN};
use crate::forest::{Forest, NodeId, Tree};
use crate::geom::{Point, Rect};

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

/// Size of a rendered label box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBounds {
    pub width: f64,
    pub height: f64,
}

/// Source of label metrics, supplied by whatever draws the diagram.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> TextBounds;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> TextBounds,
{
    fn measure(&self, text: &str) -> TextBounds {
        self(text)
    }
}

/// Fixed-pitch metrics: every character is `char_width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub char_width: f64,
    pub line_height: f64,
}

impl MonospaceMeasure {
    #[must_use]
    pub fn new(char_width: f64, line_height: f64) -> Self {
        Self { char_width, line_height }
    }

    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.char_width, config.line_height)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str) -> TextBounds {
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f64;
        TextBounds {
            width: chars * self.char_width + LABEL_PADDING,
            height: self.line_height + LABEL_PADDING,
        }
    }
}

/// Memoizing wrapper around a measurer. Owned by whoever lays out, never
/// shared process-wide.
#[derive(Debug)]
pub struct MeasureCache<M> {
    inner: M,
    cache: RefCell<HashMap<String, TextBounds>>,
}

impl<M: TextMeasure> MeasureCache<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner, cache: RefCell::new(HashMap::new()) }
    }

    /// Number of distinct labels measured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<M: TextMeasure> TextMeasure for MeasureCache<M> {
    fn measure(&self, text: &str) -> TextBounds {
        let cached = self.cache.borrow().get(text).copied();
        if let Some(bounds) = cached {
            return bounds;
        }
        let bounds = self.inner.measure(text);
        self.cache.borrow_mut().insert(text.to_owned(), bounds);
        bounds
    }
}

/// Label as it is displayed: empty labels show the empty-slot glyph.
#[must_use]
pub fn display_label(label: &str) -> &str {
    if label.is_empty() { EMPTY_LABEL_GLYPH } else { label }
}

// =============================================================================
// TYPES
// =============================================================================

/// One laid-out node. Indices in `parent`/`children` point into the owning
/// [`LayoutTree::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub node_id: NodeId,
    pub root_id: NodeId,
    /// Display label (empty labels already replaced by the glyph).
    pub label: String,
    pub highlighted: bool,
    /// Collapsed placeholder for a node that is being dragged.
    pub stub: bool,
    /// Label box width.
    pub width: f64,
    /// Label box height.
    pub height: f64,
    /// Width of the whole subtree under this node.
    pub subtree_width: f64,
    /// Offset from the parent's baseline center.
    pub x: f64,
    pub y: f64,
    /// Position in tree-local space.
    pub absolute_x: f64,
    pub absolute_y: f64,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl LayoutNode {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn absolute(&self) -> Point {
        Point::new(self.absolute_x, self.absolute_y)
    }

    /// The label box in tree-local space, padded by [`HIT_PADDING`] on every
    /// side.
    #[must_use]
    pub fn hit_box(&self) -> Rect {
        Rect::new(
            self.absolute_x - self.width / 2.0 - HIT_PADDING,
            self.absolute_y - self.height - HIT_PADDING,
            self.width + 2.0 * HIT_PADDING,
            self.height + 2.0 * HIT_PADDING,
        )
    }
}

/// Layout of one tree. `nodes` is in pre-order; index 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    pub root_id: NodeId,
    /// Diagram-space position of the root's baseline center.
    pub entry_x: f64,
    pub entry_y: f64,
    /// Horizontal extent of the tree.
    pub width: f64,
    /// Vertical extent of all label boxes.
    pub height: f64,
    pub nodes: Vec<LayoutNode>,
}

impl LayoutTree {
    #[must_use]
    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    /// Index of the layout node for `id`.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.node_id == id)
    }

    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.node_id == id)
    }

    /// Left and right edges of the tree in diagram space.
    #[must_use]
    pub fn span(&self) -> (f64, f64) {
        (self.entry_x - self.width / 2.0, self.entry_x + self.width / 2.0)
    }

    /// Map tree-local coordinates of `node` to diagram space.
    #[must_use]
    pub fn diagram_position(&self, node: &LayoutNode) -> Point {
        Point::new(self.entry_x + node.absolute_x, self.entry_y + node.absolute_y)
    }

    /// Map a diagram-space point into this tree's local space.
    #[must_use]
    pub fn to_local(&self, pt: Point) -> Point {
        Point::new(pt.x - self.entry_x, pt.y - self.entry_y)
    }
}

/// Layout of a whole forest, trees left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub trees: Vec<LayoutTree>,
    /// Diagram extent needed to show every tree with margins.
    pub width: f64,
    pub height: f64,
}

/// A layout node together with the tree that owns it.
#[derive(Debug, Clone, Copy)]
pub struct NodeHandle<'a> {
    pub tree_index: usize,
    pub tree: &'a LayoutTree,
    pub node: &'a LayoutNode,
}

impl NodeHandle<'_> {
    /// The node's position in diagram space.
    #[must_use]
    pub fn diagram_position(&self) -> Point {
        self.tree.diagram_position(self.node)
    }
}

impl Layout {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Total number of layout nodes across trees.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|t| t.nodes.len()).sum()
    }

    /// Locate the layout node for a forest node.
    #[must_use]
    pub fn node_handle(&self, id: NodeId) -> Option<NodeHandle<'_>> {
        self.trees.iter().enumerate().find_map(|(tree_index, tree)| {
            tree.find(id).map(|node| NodeHandle { tree_index, tree, node })
        })
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Lay out every tree of `forest`.
///
/// `stub_id` collapses that node to an empty placeholder with no children.
/// Nodes listed in `highlighted` are flagged; geometry is unaffected.
#[must_use]
pub fn layout_forest<M: TextMeasure + ?Sized>(
    measure: &M,
    forest: &Forest,
    stub_id: Option<NodeId>,
    highlighted: &[NodeId],
) -> Layout {
    let mut trees = Vec::with_capacity(forest.tree_count());
    let mut edge = TREE_MARGIN;
    let mut height: f64 = 0.0;

    for tree in forest.trees() {
        let Some(mut laid) = TreeBuilder::new(measure, tree, stub_id, highlighted).build() else {
            continue;
        };
        laid.entry_x = edge + laid.width / 2.0;
        laid.entry_y = TRACK_HEIGHT;
        edge += laid.width + TREE_MARGIN;

        let deepest = laid.nodes.iter().map(|n| n.absolute_y).fold(0.0, f64::max);
        height = height.max(laid.entry_y + deepest + TREE_MARGIN);
        trees.push(laid);
    }

    let layout = Layout { trees, width: edge, height };
    debug!(trees = layout.trees.len(), nodes = layout.node_count(), width = layout.width, "laid out forest");
    layout
}

struct TreeBuilder<'a, M: ?Sized> {
    measure: &'a M,
    tree: &'a Tree,
    stub_id: Option<NodeId>,
    highlighted: &'a [NodeId],
    /// Label bounds and subtree width per node, filled by the width pass.
    sizes: HashMap<NodeId, (TextBounds, f64)>,
    nodes: Vec<LayoutNode>,
}

impl<'a, M: TextMeasure + ?Sized> TreeBuilder<'a, M> {
    fn new(measure: &'a M, tree: &'a Tree, stub_id: Option<NodeId>, highlighted: &'a [NodeId]) -> Self {
        Self { measure, tree, stub_id, highlighted, sizes: HashMap::new(), nodes: Vec::with_capacity(tree.len()) }
    }

    fn build(mut self) -> Option<LayoutTree> {
        let root_id = self.tree.root_id();
        let width = self.subtree_width(root_id);
        self.place(root_id, None, Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        if self.nodes.is_empty() {
            return None;
        }

        let top = self.nodes.iter().map(|n| n.absolute_y - n.height).fold(f64::INFINITY, f64::min);
        let bottom = self.nodes.iter().map(|n| n.absolute_y).fold(f64::NEG_INFINITY, f64::max);

        Some(LayoutTree { root_id, entry_x: 0.0, entry_y: 0.0, width, height: bottom - top, nodes: self.nodes })
    }

    fn is_stub(&self, id: NodeId) -> bool {
        self.stub_id == Some(id)
    }

    fn children_of(&self, id: NodeId) -> &'a [NodeId] {
        if self.is_stub(id) {
            return &[];
        }
        match self.tree.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    fn label_bounds(&self, id: NodeId) -> TextBounds {
        if self.is_stub(id) {
            return self.measure.measure("");
        }
        let label = self.tree.node(id).map_or("", |n| n.label.as_str());
        self.measure.measure(display_label(label))
    }

    /// Bottom-up width pass.
    fn subtree_width(&mut self, id: NodeId) -> f64 {
        let bounds = self.label_bounds(id);
        let children = self.children_of(id);
        let width = if children.is_empty() {
            bounds.width
        } else {
            let sum: f64 = children.iter().map(|&c| self.subtree_width(c)).sum();
            bounds.width.max(sum + gaps(children.len()))
        };
        self.sizes.insert(id, (bounds, width));
        width
    }

    /// Top-down placement pass. Returns the index of the placed node.
    fn place(&mut self, id: NodeId, parent: Option<usize>, offset: Point, parent_abs: Point) -> usize {
        let empty = TextBounds { width: 0.0, height: 0.0 };
        let (bounds, subtree_width) = self.sizes.get(&id).copied().unwrap_or((empty, 0.0));
        let stub = self.is_stub(id);
        let label = if stub {
            String::new()
        } else {
            display_label(self.tree.node(id).map_or("", |n| n.label.as_str())).to_owned()
        };
        let absolute = parent_abs.offset(offset);

        let index = self.nodes.len();
        self.nodes.push(LayoutNode {
            node_id: id,
            root_id: self.tree.root_id(),
            label,
            highlighted: self.highlighted.contains(&id),
            stub,
            width: bounds.width,
            height: bounds.height,
            subtree_width,
            x: offset.x,
            y: offset.y,
            absolute_x: absolute.x,
            absolute_y: absolute.y,
            parent,
            children: Vec::new(),
        });

        let children = self.children_of(id);
        let widths: Vec<f64> = children.iter().map(|c| self.sizes.get(c).map_or(0.0, |s| s.1)).collect();
        let total = widths.iter().sum::<f64>() + gaps(children.len());
        let mut edge = -total / 2.0;
        for (&child, &w) in children.iter().zip(&widths) {
            let child_index = self.place(child, Some(index), Point::new(edge + w / 2.0, TRACK_HEIGHT), absolute);
            self.nodes[index].children.push(child_index);
            edge += w + CHILD_PADDING;
        }
        index
    }
}

/// Total padding between `n` side-by-side subtrees.
fn gaps(n: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let between = n.saturating_sub(1) as f64;
    between * CHILD_PADDING
}
