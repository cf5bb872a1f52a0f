//! Drag-and-drop state for moving subtrees on the diagram.
//!
//! A drag begins on pointer-down over a node but only counts once the pointer
//! has hovered something other than that node. A click therefore never turns
//! into a move.

#[cfg(test)]
#[path = "dnd_test.rs"]
mod dnd_test;

use crate::forest::{NodeId, TreeInsertionPosition};

/// Gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DndState {
    /// Node grabbed on pointer-down.
    pub dragging: Option<NodeId>,
    /// Parent of the insertion slot under the pointer.
    pub drop_target: Option<NodeId>,
    pub valid_drag_started: bool,
}

impl DndState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_drag(&mut self, node: NodeId) {
        *self = Self { dragging: Some(node), drop_target: None, valid_drag_started: false };
    }

    /// Record what the pointer is over. Ignored when no drag is in progress.
    pub fn moved_over(&mut self, hovered: Option<NodeId>, insertion: Option<TreeInsertionPosition>) {
        let Some(dragging) = self.dragging else {
            return;
        };
        self.valid_drag_started = self.valid_drag_started || hovered != Some(dragging);
        self.drop_target = insertion.map(|pos| pos.parent);
    }

    pub fn end_drag(&mut self) {
        *self = Self::default();
    }

    /// The dragged node, once the drag has become valid.
    #[must_use]
    pub fn currently_dragging(&self) -> Option<NodeId> {
        if self.valid_drag_started { self.dragging } else { None }
    }

    /// Highlight target for the current drag, if any.
    #[must_use]
    pub fn drop_target(&self) -> Option<NodeId> {
        self.currently_dragging().and(self.drop_target)
    }
}
