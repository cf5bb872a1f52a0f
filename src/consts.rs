//! Shared numeric constants for layout and hit-testing.

// ── Layout ──────────────────────────────────────────────────────

/// Vertical distance between a node's baseline and its children's baselines.
pub const TRACK_HEIGHT: f64 = 72.0;

/// Horizontal gap between adjacent sibling subtrees.
pub const CHILD_PADDING: f64 = 16.0;

/// Horizontal gap between adjacent trees, and before the first tree.
pub const TREE_MARGIN: f64 = 36.0;

/// Padding a measurer adds around label text on each axis.
pub const LABEL_PADDING: f64 = 8.0;

/// Glyph displayed (and measured) in place of an empty label.
pub const EMPTY_LABEL_GLYPH: &str = "∅";

// ── Hit-testing ─────────────────────────────────────────────────

/// Slop added to each side of a label box when hit-testing.
pub const HIT_PADDING: f64 = LABEL_PADDING / 2.0;

/// Half-height of the vertical band searched for drop candidates.
pub const INSERTION_BAND: f64 = 20.0;
