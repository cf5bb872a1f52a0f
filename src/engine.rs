//! Diagram engine: turns pointer and keyboard events into edit actions.
//!
//! `EngineCore` owns everything between the host's event loop and the forest:
//! undoable editor state, drag-and-drop state, the measurement cache, and the
//! current layout. Every handler returns the [`Action`]s the host should act
//! on (repaint, sync the text editor, move the label overlay).

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::config::EditorConfig;
use crate::dnd::DndState;
use crate::forest::{NodeId, Side, TreeInsertionPosition};
use crate::geom::Point;
use crate::history::History;
use crate::hit::{insertion_position, layout_node_at};
use crate::layout::{Layout, MeasureCache, NodeHandle, TextMeasure, layout_forest};
use crate::session::{EditorAction, EditorState};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectionChanged(Option<NodeId>),
    ForestChanged { text: String, text_error: bool },
    RenderNeeded,
}

/// A keyboard key as reported by the host (e.g. `"Backspace"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Core engine state. Free of any drawing surface so it can be driven
/// directly from tests.
#[derive(Debug)]
pub struct EngineCore<M> {
    history: History<EditorState>,
    dnd: DndState,
    measure: MeasureCache<M>,
    pointer: Point,
    layout: Layout,
}

impl<M: TextMeasure> EngineCore<M> {
    #[must_use]
    pub fn new(measure: M, text: &str) -> Self {
        Self::with_config(measure, text, &EditorConfig::default())
    }

    #[must_use]
    pub fn with_config(measure: M, text: &str, config: &EditorConfig) -> Self {
        let mut core = Self {
            history: History::with_merge_window(EditorState::new(text), config.undo_merge_window_ms),
            dnd: DndState::new(),
            measure: MeasureCache::new(measure),
            pointer: Point::new(0.0, 0.0),
            layout: Layout::default(),
        };
        core.relayout();
        core
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.history.present
    }

    #[must_use]
    pub fn selection(&self) -> Option<NodeId> {
        self.history.present.selected
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn dnd(&self) -> &DndState {
        &self.dnd
    }

    /// Last pointer position seen, in diagram space. Hosts draw the drag
    /// preview here.
    #[must_use]
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Layout node of the selection, for positioning the label editor.
    #[must_use]
    pub fn selected_handle(&self) -> Option<NodeHandle<'_>> {
        self.layout.node_handle(self.selection()?)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Input events ---

    /// Select the node under the pointer and arm a drag, or deselect on a miss.
    pub fn on_pointer_down(&mut self, pt: Point, now_ms: u64) -> Vec<Action> {
        self.pointer = pt;
        let Some(id) = layout_node_at(&self.layout, pt).map(|h| h.node.node_id) else {
            return self.dispatch(EditorAction::DeselectNode, now_ms);
        };
        let actions = self.dispatch(EditorAction::SelectNode(id), now_ms);
        self.dnd.start_drag(id);
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point, primary_down: bool) -> Vec<Action> {
        self.pointer = pt;
        let before = (self.dnd.currently_dragging(), self.dnd.drop_target());

        if primary_down {
            let hovered = layout_node_at(&self.layout, pt).map(|h| h.node.node_id);
            let slot = insertion_position(&self.layout, pt);
            self.dnd.moved_over(hovered, slot);
        } else {
            self.dnd.end_drag();
        }

        if (self.dnd.currently_dragging(), self.dnd.drop_target()) != before {
            self.relayout();
            return vec![Action::RenderNeeded];
        }
        if self.dnd.currently_dragging().is_some() {
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Commit an active drag at the pointer, or treat the release as a click.
    pub fn on_pointer_up(&mut self, pt: Point, now_ms: u64) -> Vec<Action> {
        self.pointer = pt;

        if let Some(dragged) = self.dnd.currently_dragging() {
            let slot = insertion_position(&self.layout, pt);
            self.dnd.end_drag();
            let mut actions = match slot {
                Some(position) => {
                    let position = self.adjust_for_detach(dragged, position);
                    self.dispatch(EditorAction::MoveNode { node: dragged, position }, now_ms)
                }
                None => Vec::new(),
            };
            if !actions.contains(&Action::RenderNeeded) {
                self.relayout();
                actions.push(Action::RenderNeeded);
            }
            return actions;
        }

        self.dnd.end_drag();
        match layout_node_at(&self.layout, pt).map(|h| h.node.node_id) {
            Some(id) => self.dispatch(EditorAction::SelectNode(id), now_ms),
            None => self.dispatch(EditorAction::DeselectNode, now_ms),
        }
    }

    /// `Backspace` deletes the selection unless the label editor has focus
    /// and still holds text. `Escape` deselects.
    pub fn on_key_down(&mut self, key: &Key, now_ms: u64, overlay_focused: bool) -> Vec<Action> {
        match key.0.as_str() {
            "Backspace" => {
                let Some(node) = self.state().selected_node() else {
                    return Vec::new();
                };
                if overlay_focused && !node.label.is_empty() {
                    return Vec::new();
                }
                let id = node.id;
                self.dispatch(EditorAction::DeleteNode(id), now_ms)
            }
            "Escape" => self.dispatch(EditorAction::DeselectNode, now_ms),
            _ => Vec::new(),
        }
    }

    // --- Edits ---

    /// Replace the diagram text from the host's text editor.
    pub fn set_text(&mut self, text: &str, now_ms: u64) -> Vec<Action> {
        self.dispatch(EditorAction::UpdateDiagramText(text.to_owned()), now_ms)
    }

    /// Commit text from the label editor.
    pub fn set_label(&mut self, node: NodeId, text: &str, now_ms: u64) -> Vec<Action> {
        self.dispatch(EditorAction::UpdateLabelText { node, text: text.to_owned() }, now_ms)
    }

    pub fn make_child(&mut self, now_ms: u64) -> Vec<Action> {
        self.dispatch(EditorAction::MakeChild, now_ms)
    }

    pub fn make_sibling(&mut self, side: Side, now_ms: u64) -> Vec<Action> {
        let action = match side {
            Side::Left => EditorAction::MakeLeftSibling,
            Side::Right => EditorAction::MakeRightSibling,
        };
        self.dispatch(action, now_ms)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        let before = self.history.present.clone();
        if !self.history.undo() {
            return Vec::new();
        }
        self.changes_since(&before)
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let before = self.history.present.clone();
        if !self.history.redo() {
            return Vec::new();
        }
        self.changes_since(&before)
    }

    // --- Internals ---

    fn dispatch(&mut self, action: EditorAction, now_ms: u64) -> Vec<Action> {
        let before = self.history.present.clone();
        if !self.history.dispatch(action, now_ms, EditorState::apply) {
            return Vec::new();
        }
        self.changes_since(&before)
    }

    fn changes_since(&mut self, before: &EditorState) -> Vec<Action> {
        let after = &self.history.present;
        let mut actions = Vec::new();
        if after.selected != before.selected {
            actions.push(Action::SelectionChanged(after.selected));
        }
        if after.forest != before.forest || after.diagram_text != before.diagram_text || after.text_error != before.text_error
        {
            actions.push(Action::ForestChanged { text: after.diagram_text.clone(), text_error: after.text_error });
        }
        if !actions.is_empty() {
            self.relayout();
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Slots are resolved against a layout in which the dragged node still
    /// occupies its place. Moving right within the same parent therefore
    /// lands one index too far once the node is detached.
    fn adjust_for_detach(&self, dragged: NodeId, position: TreeInsertionPosition) -> TreeInsertionPosition {
        let forest = &self.history.present.forest;
        let Some(parent) = forest.find_node(dragged).and_then(|n| n.parent) else {
            return position;
        };
        if parent != position.parent {
            return position;
        }
        let current = forest
            .find_node(parent)
            .and_then(|p| p.children.iter().position(|&c| c == dragged));
        match current {
            Some(current) if current < position.index => {
                TreeInsertionPosition { parent: position.parent, index: position.index - 1 }
            }
            _ => position,
        }
    }

    fn relayout(&mut self) {
        let highlighted: Vec<NodeId> = self.dnd.drop_target().into_iter().collect();
        self.layout =
            layout_forest(&self.measure, &self.history.present.forest, self.dnd.currently_dragging(), &highlighted);
    }
}
