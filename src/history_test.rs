use super::*;

fn add(state: &i32, delta: i32) -> i32 {
    state + delta
}

fn history() -> History<i32> {
    History::with_merge_window(0, 300)
}

// =============================================================
// dispatch
// =============================================================

#[test]
fn dispatch_records_step() {
    let mut h = history();
    assert!(h.dispatch(5, 1_000, add));
    assert_eq!(h.present, 5);
    assert_eq!(h.past, [0]);
    assert!(h.can_undo());
}

#[test]
fn first_change_always_records_even_at_small_timestamps() {
    let mut h = history();
    h.dispatch(1, 10, add);
    assert_eq!(h.past, [0]);
}

#[test]
fn unchanged_result_is_ignored() {
    let mut h = history();
    h.dispatch(1, 1_000, add);
    assert!(!h.dispatch(0, 5_000, add));
    assert_eq!(h.past, [0]);
    assert_eq!(h.last_update_ms, 1_000);
}

#[test]
fn changes_inside_merge_window_collapse() {
    let mut h = history();
    h.dispatch(1, 1_000, add);
    h.dispatch(1, 1_100, add);
    h.dispatch(1, 1_350, add);
    assert_eq!(h.present, 3);
    assert_eq!(h.past, [0]);
}

#[test]
fn changes_outside_merge_window_are_separate_steps() {
    let mut h = history();
    h.dispatch(1, 1_000, add);
    h.dispatch(1, 1_301, add);
    assert_eq!(h.past, [0, 1]);
}

#[test]
fn dispatch_clears_future() {
    let mut h = history();
    h.dispatch(1, 1_000, add);
    h.undo();
    assert!(h.can_redo());
    h.dispatch(2, 2_000, add);
    assert!(!h.can_redo());
}

#[test]
fn default_window_comes_from_config() {
    let h = History::new(0);
    assert_eq!(h.merge_window_ms, DEFAULT_UNDO_MERGE_WINDOW_MS);
}

// =============================================================
// undo / redo
// =============================================================

#[test]
fn undo_and_redo_walk_the_stacks() {
    let mut h = history();
    h.dispatch(1, 1_000, add);
    h.dispatch(1, 2_000, add);

    assert!(h.undo());
    assert_eq!(h.present, 1);
    assert!(h.undo());
    assert_eq!(h.present, 0);
    assert!(!h.undo());

    assert!(h.redo());
    assert!(h.redo());
    assert_eq!(h.present, 2);
    assert!(!h.redo());
}

#[test]
fn undo_forces_next_dispatch_to_record() {
    let mut h = history();
    h.dispatch(1, 1_000, add);
    h.dispatch(1, 2_000, add);
    h.undo();
    assert_eq!(h.last_update_ms, 0);
    h.dispatch(10, 2_010, add);
    assert_eq!(h.past, [0, 1]);
    assert_eq!(h.present, 11);
}

#[test]
fn fresh_history_cannot_undo_or_redo() {
    let h = history();
    assert!(!h.can_undo());
    assert!(!h.can_redo());
}
