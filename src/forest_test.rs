use super::*;
use crate::parse::{parse, unparse};

fn forest(text: &str) -> Forest {
    parse(text).unwrap()
}

/// Id of the first node carrying `label`. Test labels are unique.
fn id_of(forest: &Forest, label: &str) -> NodeId {
    forest
        .trees()
        .flat_map(Tree::nodes)
        .find(|n| n.label == label)
        .map(|n| n.id)
        .unwrap()
}

fn labels_of_children(forest: &Forest, parent: NodeId) -> Vec<String> {
    let tree = forest.tree_of(parent).unwrap();
    tree.node(parent)
        .unwrap()
        .children
        .iter()
        .map(|&c| tree.node(c).unwrap().label.clone())
        .collect()
}

/// Parent/child links agree in both directions and every node is reachable.
fn assert_well_formed(forest: &Forest) {
    for tree in forest.trees() {
        let root = tree.root().unwrap();
        assert!(root.parent.is_none());
        assert_eq!(tree.subtree_ids(root.id).len(), tree.len());
        for node in tree.nodes() {
            for &child in &node.children {
                assert_eq!(tree.node(child).unwrap().parent, Some(node.id));
            }
        }
    }
}

// =============================================================
// Tree
// =============================================================

#[test]
fn tree_new_clears_parent_of_root() {
    let mut root = Node::new("r");
    root.parent = Some(Uuid::new_v4());
    let tree = Tree::new(root);
    assert!(tree.root().unwrap().is_root());
    assert_eq!(tree.len(), 1);
}

#[test]
fn tree_attach_to_missing_parent_drops_node() {
    let mut tree = Tree::new(Node::new("r"));
    assert!(tree.attach(Node::new("x"), Uuid::new_v4()).is_none());
    assert_eq!(tree.len(), 1);
}

#[test]
fn subtree_ids_are_pre_order() {
    let f = forest(r#"["R" ["A" ["A1"]] ["B"]]"#);
    let tree = f.trees().next().unwrap();
    let labels: Vec<_> = tree
        .subtree_ids(tree.root_id())
        .into_iter()
        .map(|id| tree.node(id).unwrap().label.clone())
        .collect();
    assert_eq!(labels, ["R", "A", "A1", "B"]);
}

#[test]
fn is_in_subtree_includes_self() {
    let f = forest(r#"["R" ["A" ["A1"]] ["B"]]"#);
    let tree = f.trees().next().unwrap();
    let a = id_of(&f, "A");
    assert!(tree.is_in_subtree(a, a));
    assert!(tree.is_in_subtree(a, id_of(&f, "A1")));
    assert!(!tree.is_in_subtree(a, id_of(&f, "B")));
}

// =============================================================
// Queries
// =============================================================

#[test]
fn node_count_spans_all_trees() {
    let f = forest(r#"["A" ["B"]] ["C"]"#);
    assert_eq!(f.tree_count(), 2);
    assert_eq!(f.node_count(), 3);
}

#[test]
fn tree_of_finds_owning_tree() {
    let f = forest(r#"["A" ["B"]] ["C"]"#);
    let b = id_of(&f, "B");
    assert_eq!(f.tree_of(b).unwrap().root().unwrap().label, "A");
    assert!(f.tree_of(Uuid::new_v4()).is_none());
}

// =============================================================
// update_node_label
// =============================================================

#[test]
fn update_label_keeps_structure_and_identity() {
    let f = forest(r#"["A" ["B"]]"#);
    let b = id_of(&f, "B");
    let next = f.update_node_label(b, "Z");
    let node = next.find_node(b).unwrap();
    assert_eq!(node.label, "Z");
    assert_eq!(node.parent, Some(id_of(&f, "A")));
    assert_eq!(next.node_count(), f.node_count());
}

#[test]
fn update_label_leaves_input_untouched() {
    let f = forest(r#"["A" ["B"]]"#);
    let before = f.clone();
    let _next = f.update_node_label(id_of(&f, "B"), "Z");
    assert_eq!(f, before);
}

// =============================================================
// delete_node
// =============================================================

#[test]
fn delete_removes_whole_subtree() {
    let f = forest(r#"["R" ["A" ["A1"]["A2"]] ["B"]]"#);
    let next = f.delete_node(id_of(&f, "A"));
    assert_eq!(next.node_count(), f.node_count() - 3);
    assert_eq!(labels_of_children(&next, id_of(&f, "R")), ["B"]);
    assert_well_formed(&next);
}

#[test]
fn deleting_root_removes_its_tree() {
    let f = forest(r#"["Hello" ["A"]["B"]] ["Second"]"#);
    let next = f.delete_node(id_of(&f, "Hello"));
    assert_eq!(next.tree_count(), 1);
    assert_eq!(unparse(&next), r#"["Second"]"#);
}

#[test]
fn deleting_arrow_endpoint_hides_arrow() {
    let f = forest(r#"["T" [1 "A"] [2 "B"]] <1 2>"#);
    assert_eq!(f.live_arrows().count(), 1);
    let next = f.delete_node(id_of(&f, "B"));
    assert_eq!(next.arrows().len(), 1);
    assert_eq!(next.live_arrows().count(), 0);
    assert_eq!(unparse(&next), r#"["T" [1 "A"]]"#);
}

// =============================================================
// make_child / make_sibling
// =============================================================

#[test]
fn make_child_appends_empty_last_child() {
    let f = forest(r#"["Hello" ["A"]["B"]]"#);
    let hello = id_of(&f, "Hello");
    let new_id = Uuid::new_v4();
    let next = f.make_child_with(hello, new_id);
    assert_eq!(next.node_count(), f.node_count() + 1);
    assert_eq!(labels_of_children(&next, hello), ["A", "B", ""]);
    assert_eq!(next.find_node(new_id).unwrap().parent, Some(hello));
    assert_eq!(unparse(&next), r#"["Hello" ["A"]["B"][]]"#);
}

#[test]
fn make_sibling_left_and_right_indices() {
    let f = forest(r#"["R" ["A"]["B"]]"#);
    let r = id_of(&f, "R");
    let b = id_of(&f, "B");

    let left = f.make_sibling(b, Side::Left);
    assert_eq!(labels_of_children(&left, r), ["A", "", "B"]);

    let right = f.make_sibling(b, Side::Right);
    assert_eq!(labels_of_children(&right, r), ["A", "B", ""]);
    assert_eq!(right.node_count(), f.node_count() + 1);
}

#[test]
fn make_sibling_of_root_is_noop() {
    let f = forest(r#"["R" ["A"]]"#);
    let next = f.make_sibling(id_of(&f, "R"), Side::Right);
    assert_eq!(next, f);
}

// =============================================================
// move_node
// =============================================================

#[test]
fn move_within_parent_reorders_children() {
    let f = forest(r#"["Hello" ["A"]["B"]]"#);
    let hello = id_of(&f, "Hello");
    let next = f.move_node(id_of(&f, "B"), hello, 0);
    assert_eq!(unparse(&next), r#"["Hello" ["B"]["A"]]"#);
    assert_eq!(next.node_count(), f.node_count());
}

#[test]
fn move_after_sibling_then_delete_root() {
    let f = forest(r#"["Hello" ["A"]["B"]]"#);
    let hello = id_of(&f, "Hello");
    let moved = f.move_node(id_of(&f, "A"), hello, 2);
    assert_eq!(labels_of_children(&moved, hello), ["B", "A"]);

    let deleted = moved.delete_node(hello);
    assert!(deleted.is_empty());
    assert!(!deleted.has_node(id_of(&f, "A")));
    assert!(!deleted.has_node(id_of(&f, "B")));
}

#[test]
fn move_index_is_clamped() {
    let f = forest(r#"["R" ["A"]["B"]]"#);
    let r = id_of(&f, "R");
    let next = f.move_node(id_of(&f, "A"), r, 99);
    assert_eq!(labels_of_children(&next, r), ["B", "A"]);
}

#[test]
fn move_carries_subtree_across_trees() {
    let f = forest(r#"["X" ["Y" ["Y1"]]] ["Z"]"#);
    let z = id_of(&f, "Z");
    let y = id_of(&f, "Y");
    let next = f.move_node(y, z, 0);
    assert_eq!(unparse(&next), "[\"X\"]\n[\"Z\" [\"Y\" [\"Y1\"]]]");
    assert_eq!(next.find_node(y).unwrap().parent, Some(z));
    assert_eq!(next.node_count(), f.node_count());
    assert_well_formed(&next);
}

#[test]
fn moving_root_dissolves_its_tree() {
    let f = forest(r#"["A" ["A1"]] ["B"]"#);
    let next = f.move_node(id_of(&f, "A"), id_of(&f, "B"), 0);
    assert_eq!(next.tree_count(), 1);
    assert_eq!(unparse(&next), r#"["B" ["A" ["A1"]]]"#);
    assert_well_formed(&next);
}

#[test]
fn move_into_own_subtree_is_noop() {
    let f = forest(r#"["R" ["A" ["A1"]]]"#);
    let next = f.move_node(id_of(&f, "A"), id_of(&f, "A1"), 0);
    assert_eq!(next, f);
    let onto_self = f.move_node(id_of(&f, "A"), id_of(&f, "A"), 0);
    assert_eq!(onto_self, f);
}

// =============================================================
// Unknown ids
// =============================================================

#[test]
fn unknown_ids_leave_forest_equal() {
    let f = forest(r#"["R" ["A"]]"#);
    let ghost = Uuid::new_v4();
    let a = id_of(&f, "A");
    assert_eq!(f.update_node_label(ghost, "x"), f);
    assert_eq!(f.delete_node(ghost), f);
    assert_eq!(f.make_child(ghost), f);
    assert_eq!(f.make_sibling(ghost, Side::Left), f);
    assert_eq!(f.move_node(ghost, a, 0), f);
    assert_eq!(f.move_node(a, ghost, 0), f);
}

#[test]
fn mutators_never_change_their_input() {
    let f = forest(r#"["R" ["A" ["A1"]] ["B"]] ["S"]"#);
    let before = f.clone();
    let a = id_of(&f, "A");
    let s = id_of(&f, "S");
    let _deleted = f.delete_node(a);
    let _child = f.make_child(a);
    let _sibling = f.make_sibling(a, Side::Right);
    let _moved = f.move_node(a, s, 0);
    assert_eq!(f, before);
}
