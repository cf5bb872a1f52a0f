use super::*;
use crate::forest::{Forest, NodeId, Tree};
use crate::layout::{TextBounds, layout_forest};
use crate::parse::parse;

#[allow(clippy::cast_precision_loss)]
fn fixed(text: &str) -> TextBounds {
    TextBounds { width: text.chars().count() as f64 * 10.0, height: 20.0 }
}

fn setup(text: &str) -> (Forest, Layout) {
    let forest = parse(text).unwrap();
    let layout = layout_forest(&fixed, &forest, None, &[]);
    (forest, layout)
}

fn id_of(forest: &Forest, label: &str) -> NodeId {
    forest
        .trees()
        .flat_map(Tree::nodes)
        .find(|n| n.label == label)
        .map(|n| n.id)
        .unwrap()
}

fn hit_label(layout: &Layout, x: f64, y: f64) -> Option<String> {
    layout_node_at(layout, Point::new(x, y)).map(|h| h.node.label.clone())
}

fn slot(layout: &Layout, x: f64, y: f64) -> Option<TreeInsertionPosition> {
    insertion_position(layout, Point::new(x, y))
}

// `["Hello" ["A"]["B"]]` with the fixed measurer: entry point (61, 72),
// "A" baseline at (48, 144), "B" baseline at (74, 144).
const HELLO: &str = r#"["Hello" ["A"]["B"]]"#;

// =============================================================
// layout_node_at
// =============================================================

#[test]
fn hits_root_label() {
    let (_, layout) = setup(HELLO);
    assert_eq!(hit_label(&layout, 61.0, 62.0).as_deref(), Some("Hello"));
}

#[test]
fn hits_child_label() {
    let (_, layout) = setup(HELLO);
    assert_eq!(hit_label(&layout, 48.0, 134.0).as_deref(), Some("A"));
    assert_eq!(hit_label(&layout, 74.0, 134.0).as_deref(), Some("B"));
}

#[test]
fn overlapping_boxes_prefer_innermost_node() {
    // Labels taller than a track make the child box reach over the root.
    let tall = |text: &str| TextBounds { width: fixed(text).width, height: 100.0 };
    let forest = parse(HELLO).unwrap();
    let layout = layout_forest(&tall, &forest, None, &[]);
    let a = layout.node_handle(id_of(&forest, "A")).unwrap();
    let root = layout.trees[0].root().unwrap();

    let pt = Point::new(a.diagram_position().x, layout.trees[0].entry_y - 10.0);
    assert!(root.hit_box().contains(layout.trees[0].to_local(pt)));
    assert_eq!(hit_label(&layout, pt.x, pt.y).as_deref(), Some("A"));
}

#[test]
fn hit_box_includes_padding() {
    let (_, layout) = setup(HELLO);
    assert_eq!(hit_label(&layout, 61.0 + 28.0, 62.0).as_deref(), Some("Hello"));
    assert_eq!(hit_label(&layout, 61.0, 75.0).as_deref(), Some("Hello"));
    assert_eq!(hit_label(&layout, 61.0, 77.0), None);
}

#[test]
fn misses_between_rows_and_outside_trees() {
    let (_, layout) = setup(HELLO);
    assert_eq!(hit_label(&layout, 61.0, 100.0), None);
    assert_eq!(hit_label(&layout, 500.0, 62.0), None);
}

#[test]
fn every_node_contains_its_own_anchor() {
    let (_, layout) = setup(r#"["Hello" ["A" ["C"]["D"]]["B"]] ["Tree" ["Number"]["2"]] []"#);
    for tree in &layout.trees {
        for node in &tree.nodes {
            let hit = layout_node_at(&layout, tree.diagram_position(node)).unwrap();
            assert_eq!(hit.node.node_id, node.node_id);
        }
    }
}

#[test]
fn reports_owning_tree() {
    let (_, layout) = setup(r#"["A"] ["B"]"#);
    let hit = layout_node_at(&layout, Point::new(87.0, 62.0)).unwrap();
    assert_eq!(hit.tree_index, 1);
    assert_eq!(hit.node.label, "B");
}

#[test]
fn empty_layout_hits_nothing() {
    let (_, layout) = setup("");
    assert!(layout_node_at(&layout, Point::new(0.0, 0.0)).is_none());
}

// =============================================================
// insertion_position
// =============================================================

#[test]
fn drop_onto_node_becomes_first_child() {
    let (forest, layout) = setup(HELLO);
    let target = slot(&layout, 48.0, 134.0).unwrap();
    assert_eq!(target, TreeInsertionPosition { parent: id_of(&forest, "A"), index: 0 });
}

#[test]
fn drop_right_of_last_child_appends() {
    let (forest, layout) = setup(HELLO);
    let target = slot(&layout, 101.0, 144.0).unwrap();
    assert_eq!(target, TreeInsertionPosition { parent: id_of(&forest, "Hello"), index: 2 });
}

#[test]
fn drop_left_of_first_child_prepends() {
    let (forest, layout) = setup(HELLO);
    let target = slot(&layout, 21.0, 144.0).unwrap();
    assert_eq!(target, TreeInsertionPosition { parent: id_of(&forest, "Hello"), index: 0 });
}

#[test]
fn drop_between_children_ties_to_left_node() {
    let (forest, layout) = setup(HELLO);
    let target = slot(&layout, 61.0, 144.0).unwrap();
    assert_eq!(target, TreeInsertionPosition { parent: id_of(&forest, "Hello"), index: 1 });
}

#[test]
fn beside_root_has_no_slot() {
    let (_, layout) = setup(HELLO);
    assert_eq!(slot(&layout, 101.0, 72.0), None);
}

#[test]
fn outside_every_band_has_no_slot() {
    let (_, layout) = setup(HELLO);
    assert_eq!(slot(&layout, 61.0, 108.0), None);
}

#[test]
fn stub_is_not_a_candidate() {
    let forest = parse(HELLO).unwrap();
    let a = id_of(&forest, "A");
    let layout = layout_forest(&fixed, &forest, Some(a), &[]);
    // The stub sits at local x -13; "B" moves to local x 8.
    let target = slot(&layout, 48.0, 144.0).unwrap();
    assert_eq!(target, TreeInsertionPosition { parent: id_of(&forest, "Hello"), index: 1 });
}

#[test]
fn nearest_tree_tie_goes_left() {
    let (forest, layout) = setup(r#"["A" ["a"]] ["B" ["b"]]"#);
    let target = slot(&layout, 64.0, 144.0).unwrap();
    assert_eq!(target, TreeInsertionPosition { parent: id_of(&forest, "A"), index: 1 });
}

#[test]
fn empty_layout_has_no_slot() {
    let (_, layout) = setup("");
    assert_eq!(slot(&layout, 0.0, 0.0), None);
}
