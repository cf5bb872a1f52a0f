//! Edit session: the forest, its text form, and the current selection,
//! updated by one reducer over [`EditorAction`].
//!
//! The forest and `diagram_text` stay in sync in both directions. Text edits
//! re-parse; structural edits re-serialize. A text edit that fails to parse
//! keeps the last good forest and raises `text_error` instead.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::forest::{Forest, Node, NodeId, Side, TreeInsertionPosition};
use crate::parse::{parse, unparse};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    pub forest: Forest,
    pub diagram_text: String,
    /// Set when `diagram_text` does not parse; `forest` is then the last
    /// version that did.
    pub text_error: bool,
    pub selected: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    UpdateDiagramText(String),
    DeleteNode(NodeId),
    UpdateLabelText { node: NodeId, text: String },
    SelectNode(NodeId),
    DeselectNode,
    MoveNode { node: NodeId, position: TreeInsertionPosition },
    MakeLeftSibling,
    MakeRightSibling,
    MakeChild,
}

// =============================================================================
// REDUCER
// =============================================================================

impl EditorState {
    /// Start a session from text. Unparsable text gives an empty forest with
    /// `text_error` set.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let diagram_text = text.into();
        match parse(&diagram_text) {
            Ok(forest) => Self { forest, diagram_text, text_error: false, selected: None },
            Err(e) => {
                debug!(error = %e, code = e.error_code(), "initial diagram text rejected");
                Self { forest: Forest::new(), diagram_text, text_error: true, selected: None }
            }
        }
    }

    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        self.selected.and_then(|id| self.forest.find_node(id))
    }

    /// Apply one action, returning the next state. Actions that do not apply
    /// (unknown ids, nothing selected, refused edits) return an equal state.
    #[must_use]
    pub fn apply(&self, action: EditorAction) -> EditorState {
        match action {
            EditorAction::UpdateDiagramText(text) => self.with_text(text),
            EditorAction::DeleteNode(id) => {
                if !self.forest.has_node(id) {
                    return self.clone();
                }
                Self::from_edit(self.forest.delete_node(id), self.selected)
            }
            EditorAction::UpdateLabelText { node, text } => {
                if !self.forest.has_node(node) {
                    return self.clone();
                }
                Self::from_edit(self.forest.update_node_label(node, &text), self.selected)
            }
            EditorAction::SelectNode(id) => {
                if !self.forest.has_node(id) {
                    return self.clone();
                }
                Self { selected: Some(id), ..self.clone() }
            }
            EditorAction::DeselectNode => Self { selected: None, ..self.clone() },
            EditorAction::MoveNode { node, position } => {
                let next = self.forest.move_node(node, position.parent, position.index);
                if next == self.forest {
                    return self.clone();
                }
                Self::from_edit(next, self.selected)
            }
            EditorAction::MakeLeftSibling => {
                self.insert_new(|forest, id, new_id| forest.make_sibling_with(id, Side::Left, new_id))
            }
            EditorAction::MakeRightSibling => {
                self.insert_new(|forest, id, new_id| forest.make_sibling_with(id, Side::Right, new_id))
            }
            EditorAction::MakeChild => self.insert_new(Forest::make_child_with),
        }
    }

    fn with_text(&self, text: String) -> EditorState {
        match parse(&text) {
            Ok(forest) => Self { forest, diagram_text: text, text_error: false, selected: None },
            Err(e) => {
                debug!(error = %e, code = e.error_code(), "diagram text rejected");
                Self { diagram_text: text, text_error: true, ..self.clone() }
            }
        }
    }

    /// Install a structurally edited forest: re-serialize, clear the text
    /// error, and drop the selection if its node is gone.
    fn from_edit(forest: Forest, selected: Option<NodeId>) -> EditorState {
        let selected = selected.filter(|&id| forest.has_node(id));
        Self { diagram_text: unparse(&forest), forest, text_error: false, selected }
    }

    /// Create a node relative to the selection and select it.
    fn insert_new<F>(&self, edit: F) -> EditorState
    where
        F: FnOnce(&Forest, NodeId, NodeId) -> Forest,
    {
        let Some(selected) = self.selected else {
            return self.clone();
        };
        let new_id = Uuid::new_v4();
        let next = edit(&self.forest, selected, new_id);
        if !next.has_node(new_id) {
            return self.clone();
        }
        Self::from_edit(next, Some(new_id))
    }
}
