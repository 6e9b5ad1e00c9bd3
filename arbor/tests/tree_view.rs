//! Tests for selection, expansion and activation through the tree view.

use std::collections::HashSet;

use arbor::{NodeKey, TreeConfig, TreeProps, TreeView};
use serde_json::{Value, json};

fn keys(ids: &[i64]) -> Vec<NodeKey> {
    ids.iter().copied().map(NodeKey::from).collect()
}

fn as_set(keys: &[NodeKey]) -> HashSet<NodeKey> {
    keys.iter().cloned().collect()
}

fn single_root_two_children() -> Vec<Value> {
    vec![json!({
        "id": 0, "name": "Root",
        "children": [{ "id": 1, "name": "Child" }, { "id": 2, "name": "Child 2" }]
    })]
}

fn three_levels() -> Vec<Value> {
    vec![json!({
        "id": 0, "name": "Root", "children": [
            { "id": 1, "name": "Child", "children": [{ "id": 2, "name": "Grandchild" }] },
            { "id": 3, "name": "Child" }
        ]
    })]
}

fn mount(config: TreeConfig, props: TreeProps) -> TreeView {
    let mut view = TreeView::new(config);
    let _ = view.sync(props);
    view
}

fn assert_selection_consistent(view: &TreeView) {
    for (key, node) in view.nodes() {
        assert!(
            !(node.is_selected() && node.is_indeterminate()),
            "node {key} is both selected and indeterminate"
        );
        if !node.children().is_empty() {
            let all = node
                .children()
                .iter()
                .all(|child| view.node(child).unwrap().is_selected());
            assert_eq!(node.is_selected(), all, "node {key} disagrees with its children");
        }
    }
}

// =============================================================================
// Rendering snapshot
// =============================================================================

#[test]
fn test_renders_roots_only_until_opened() {
    let mut view = mount(TreeConfig::default(), TreeProps::new(single_root_two_children()));

    let rows = view.visible();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].has_children);
    assert!(!rows[0].is_open);

    let _ = view.toggle_open(&NodeKey::from(0));
    let rows = view.visible();
    assert_eq!(
        rows.iter().map(|r| (r.key.clone(), r.depth)).collect::<Vec<_>>(),
        vec![(NodeKey::from(0), 0), (NodeKey::from(1), 1), (NodeKey::from(2), 1)]
    );
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_select_all_descendants() {
    let mut view = mount(
        TreeConfig::default().with_selectable(true),
        TreeProps::new(three_levels()),
    );

    let settle = view.toggle_select(&NodeKey::from(0));
    assert_eq!(settle.changes.len(), 1);
    assert_eq!(settle.selected(), Some(&keys(&[0, 1, 2, 3])[..]));
    assert_selection_consistent(&view);
}

#[test]
fn test_select_child_then_root() {
    let mut view = mount(
        TreeConfig::default().with_selectable(true),
        TreeProps::new(single_root_two_children()),
    );

    let settle = view.toggle_select(&NodeKey::from(1));
    assert_eq!(settle.selected(), Some(&keys(&[1])[..]));
    assert!(view.node(&NodeKey::from(0)).unwrap().is_indeterminate());

    let settle = view.toggle_select(&NodeKey::from(0));
    assert_eq!(settle.selected(), Some(&keys(&[0, 1, 2])[..]));
    assert_selection_consistent(&view);
}

#[test]
fn test_selecting_every_child_selects_parent() {
    let mut view = mount(
        TreeConfig::default().with_selectable(true),
        TreeProps::new(single_root_two_children()),
    );
    let _ = view.toggle_select(&NodeKey::from(1));
    let settle = view.toggle_select(&NodeKey::from(2));

    assert_eq!(as_set(settle.selected().unwrap()), as_set(&keys(&[0, 1, 2])));
    assert!(!view.node(&NodeKey::from(0)).unwrap().is_indeterminate());
}

#[test]
fn test_select_toggle_ignored_when_disabled() {
    let mut view = mount(TreeConfig::default(), TreeProps::new(three_levels()));
    let settle = view.toggle_select(&NodeKey::from(0));
    assert!(settle.is_empty());
    assert!(view.selected().is_empty());
}

#[test]
fn test_update_selection_when_selected_prop_changes() {
    let items = vec![json!({ "id": 0, "name": "Root", "children": [{ "id": 1, "name": "Child" }] })];
    let mut view = mount(
        TreeConfig::default(),
        TreeProps::new(items).with_selected(Vec::new()),
    );

    let _ = view.toggle_open(&NodeKey::from(0));
    let settle = view.set_selected_value(Some(keys(&[1])));

    assert_eq!(as_set(settle.selected().unwrap()), as_set(&keys(&[0, 1])));
    let rows = view.visible();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.iter().filter(|r| r.is_selected).count(), 2);

    let settle = view.set_selected_value(None);
    assert!(settle.is_empty());
    assert_eq!(as_set(&view.selected()), as_set(&keys(&[0, 1])));
}

// =============================================================================
// Activation
// =============================================================================

#[test]
fn test_emit_active_node_when_clicking_on_it() {
    let mut view = mount(
        TreeConfig::default().with_activatable(true),
        TreeProps::new(vec![json!({ "id": 0, "name": "Root" }), json!({ "id": 1, "name": "Root" })]),
    );

    let settle = view.toggle_active(&NodeKey::from(0));
    assert_eq!(settle.active(), Some(&keys(&[0])[..]));

    let settle = view.toggle_active(&NodeKey::from(0));
    assert_eq!(settle.active(), Some(&[][..]));
}

#[test]
fn test_multiple_active_nodes() {
    let mut view = mount(
        TreeConfig::default()
            .with_activatable(true)
            .with_multiple_active(true),
        TreeProps::new(vec![json!({ "id": 0, "name": "Root" }), json!({ "id": 1, "name": "Root" })]),
    );

    let mut notifications = Vec::new();
    for key in [0, 1] {
        let settle = view.toggle_active(&NodeKey::from(key));
        notifications.extend(settle.active().map(<[NodeKey]>::to_vec));
    }

    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications.last().unwrap(), &keys(&[0, 1]));
}

#[test]
fn test_active_toggle_ignored_when_disabled() {
    let mut view = mount(TreeConfig::default(), TreeProps::new(three_levels()));
    assert!(view.toggle_active(&NodeKey::from(0)).is_empty());
    assert!(view.active().is_empty());
}

// =============================================================================
// Expansion
// =============================================================================

#[test]
fn test_open_all_on_mount() {
    let view = mount(
        TreeConfig::default().with_open_all(true),
        TreeProps::new(three_levels()),
    );
    assert_eq!(view.open(), keys(&[0, 1]));
    assert_eq!(view.visible().len(), 4);
}

#[test]
fn test_close_all() {
    let mut view = mount(
        TreeConfig::default().with_open_all(true),
        TreeProps::new(three_levels()),
    );
    let settle = view.close_all();
    assert_eq!(settle.open(), Some(&[][..]));
    assert_eq!(view.visible().len(), 1);
}

#[test]
fn test_react_to_open_changes() {
    let mut view = mount(
        TreeConfig::default(),
        TreeProps::new(three_levels()).with_open(keys(&[1])),
    );
    assert_eq!(view.open(), keys(&[1]));

    let _ = view.set_open_value(Some(keys(&[0, 1])));
    assert_eq!(view.visible().len(), 4);

    let _ = view.set_open_value(Some(keys(&[0])));
    assert_eq!(view.visible().len(), 3);

    let _ = view.set_open_value(Some(keys(&[0, 1])));
    assert_eq!(view.open(), keys(&[0, 1]));

    // Keys that are not in the tree are never recorded.
    let settle = view.set_open_value(Some(keys(&[7])));
    assert_eq!(settle.open(), Some(&[][..]));
    assert!(view.open().is_empty());
}

#[test]
fn test_toggle_open_on_leaf_is_ignored() {
    let mut view = mount(TreeConfig::default(), TreeProps::new(three_levels()));
    assert!(view.toggle_open(&NodeKey::from(3)).is_empty());
    assert!(view.open().is_empty());
}

// =============================================================================
// Controlled facets and rebuilds
// =============================================================================

#[test]
fn test_update_selected_and_active_on_mount() {
    let mut view = TreeView::new(TreeConfig::default());
    let settle = view.sync(
        TreeProps::new(three_levels())
            .with_active(keys(&[2]))
            .with_selected(keys(&[1])),
    );

    assert_eq!(view.active(), keys(&[2]));
    assert_eq!(view.selected(), keys(&[1, 2]));
    assert_eq!(settle.selected(), Some(&keys(&[1, 2])[..]));
    assert_eq!(settle.active(), Some(&keys(&[2])[..]));
    assert!(view.node(&NodeKey::from(0)).unwrap().is_indeterminate());
}

#[test]
fn test_react_to_changes_for_value_selected_and_active() {
    let mut view = mount(
        TreeConfig::default(),
        TreeProps::new(three_levels())
            .with_active(keys(&[2]))
            .with_selected(keys(&[1])),
    );

    let _ = view.set_active_value(Some(keys(&[0])));
    assert_eq!(view.active(), keys(&[0]));

    // Keys that are not in the tree do not update anything.
    let props = TreeProps {
        active: Some(keys(&[7])),
        selected: Some(keys(&[7])),
        ..view.props().clone()
    };
    let _ = view.sync(props);
    assert!(view.active().is_empty());
    assert_eq!(view.selected(), keys(&[1, 2]));

    // Rebuild reuses cached values.
    let props = TreeProps {
        items: single_root_two_children(),
        active: Some(keys(&[0])),
        ..view.props().clone()
    };
    let _ = view.sync(props);
    assert_eq!(view.active(), keys(&[0]));
    assert_eq!(as_set(&view.selected()), as_set(&keys(&[1, 2, 0])));
    assert_selection_consistent(&view);
}

#[test]
fn test_rebuild_keeps_uncontrolled_state_for_survivors() {
    let mut view = mount(
        TreeConfig::default().with_activatable(true).with_selectable(true),
        TreeProps::new(three_levels()),
    );
    let _ = view.toggle_active(&NodeKey::from(1));
    let _ = view.toggle_open(&NodeKey::from(0));
    let _ = view.toggle_select(&NodeKey::from(3));

    let settle = view.set_items(vec![json!({ "id": 0, "children": [{ "id": 1 }, { "id": 4 }] })]);

    assert_eq!(view.active(), keys(&[1]));
    assert_eq!(view.open(), keys(&[0]));
    assert!(view.selected().is_empty());
    assert_eq!(settle.selected(), Some(&[][..]));
    assert!(settle.active().is_none());
    assert!(settle.open().is_none());
}

#[test]
fn test_rebuild_with_identical_items_emits_nothing() {
    let mut view = mount(
        TreeConfig::default().with_selectable(true),
        TreeProps::new(three_levels()),
    );
    let _ = view.toggle_select(&NodeKey::from(1));
    let settle = view.set_items(three_levels());
    assert!(settle.is_empty());
}

#[test]
fn test_new_children_inherit_selected_parent() {
    let mut view = mount(
        TreeConfig::default(),
        TreeProps::new(single_root_two_children()).with_selected(keys(&[0])),
    );
    let _ = view.set_items(vec![json!({
        "id": 0, "children": [{ "id": 1 }, { "id": 2 }, { "id": 5 }]
    })]);
    assert_eq!(view.selected(), keys(&[0, 1, 2, 5]));
}

#[test]
fn test_accepts_string_keys() {
    let mut view = TreeView::new(TreeConfig::default().with_item_key("name"));
    let _ = view.sync(TreeProps::default());

    let _ = view.set_items(vec![json!({ "name": "Foobar" })]);
    assert!(view.node(&NodeKey::from("Foobar")).is_some());

    let settle = view.set_selected_value(Some(vec![NodeKey::from("Foobar")]));
    assert_eq!(settle.selected(), Some(&[NodeKey::from("Foobar")][..]));
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_hides_non_matching_branches() {
    let mut view = mount(
        TreeConfig::default().with_open_all(true),
        TreeProps::new(three_levels()),
    );
    view.set_search(Some("grand"));

    let visible: Vec<NodeKey> = view.visible().into_iter().map(|r| r.key).collect();
    assert_eq!(visible, keys(&[0, 1, 2]));

    view.set_search(None);
    assert_eq!(view.visible().len(), 4);
}
