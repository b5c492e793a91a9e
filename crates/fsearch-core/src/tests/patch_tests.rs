//! Workspace interception behavior.

use super::fixtures::patched_workspace;
use crate::patch::{Deferred, EMBEDDED_LAST_ACTIVE_MS, PatchedWorkspace};
use fsearch_host::{
    IterScope, LayoutOp, LeafId, MAIN_WINDOW, OpenFileOptions, WindowId, Workspace, WorkspaceOps,
};

fn embed_search_leaf(ws: &mut PatchedWorkspace<Workspace>) -> LeafId {
    let root = ws.surface_mut().create_root("fs-modal");
    let container = ws.surface_mut().create_div(root, "fs-content");
    let (leaf, _) = ws
        .spawn_embedded_leaf(MAIN_WINDOW, container, true)
        .unwrap();
    ws.set_pinned(leaf, true);
    ws.set_search_view(leaf).unwrap();
    leaf
}

#[test]
fn test_spawn_registers_and_reparents() {
    let (mut ws, ..) = patched_workspace();
    let root = ws.surface_mut().create_root("fs-modal");
    let container = ws.surface_mut().create_div(root, "fs-content");
    let (leaf, id) = ws
        .spawn_embedded_leaf(MAIN_WINDOW, container, false)
        .unwrap();

    let root_node = ws.leaf(leaf).unwrap().root_node;
    assert!(ws.surface().contains(container, root_node));
    assert_eq!(ws.registry().view(id).unwrap().synthetic_root, root);
    assert_eq!(ws.registry().active_count(), 1);
}

#[test]
fn test_spawn_into_missing_window_fails_cleanly() {
    let (mut ws, ..) = patched_workspace();
    let root = ws.surface_mut().create_root("fs-modal");
    let result = ws.spawn_embedded_leaf(WindowId(99), root, false);
    assert!(result.is_err());
    assert_eq!(ws.registry().active_count(), 0);
}

#[test]
fn test_dispose_detaches_leaf_once() {
    let (mut ws, ..) = patched_workspace();
    let root = ws.surface_mut().create_root("fs-modal");
    let (leaf, id) = ws.spawn_embedded_leaf(MAIN_WINDOW, root, false).unwrap();

    ws.dispose_embedded(id);
    assert!(ws.leaf(leaf).is_none());
    assert_eq!(ws.registry().active_count(), 0);
    // second dispose is a no-op
    ws.dispose_embedded(id);
}

#[test]
fn test_get_leaf_redirects_away_from_pinned_search_leaf() {
    let (mut ws, ..) = patched_workspace();
    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();
    ws.set_active_leaf(ordinary, false);

    let search = embed_search_leaf(&mut ws);
    ws.set_active_leaf(search, true);

    let target = ws.get_leaf().unwrap();
    assert_eq!(target, ordinary);
    assert_ne!(target, search);
}

#[test]
fn test_get_leaf_creates_when_no_other_leaf_exists() {
    let (mut ws, ..) = patched_workspace();
    let search = embed_search_leaf(&mut ws);
    ws.set_active_leaf(search, true);

    let target = ws.get_leaf().unwrap();
    assert_ne!(target, search);
    assert!(ws.leaf(target).is_some());
}

#[test]
fn test_get_leaf_unpatched_for_ordinary_active() {
    let (mut ws, ..) = patched_workspace();
    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();
    ws.set_active_leaf(ordinary, false);
    assert_eq!(ws.get_leaf().unwrap(), ordinary);
}

#[test]
fn test_iterate_finds_embedded_leaf_as_fallback() {
    let (mut ws, ..) = patched_workspace();
    let search = embed_search_leaf(&mut ws);

    let mut found = None;
    let stopped = ws.iterate_leaves(IterScope::Root, &mut |leaf| {
        if leaf.is_search() {
            found = Some(leaf.id);
            true
        } else {
            false
        }
    });
    assert!(stopped);
    assert_eq!(found, Some(search));
}

#[test]
fn test_iterate_prefers_host_leaves() {
    let (mut ws, ..) = patched_workspace();
    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();
    embed_search_leaf(&mut ws);

    let mut first = None;
    ws.iterate_leaves(IterScope::Root, &mut |leaf| {
        first = Some(leaf.id);
        true
    });
    assert_eq!(first, Some(ordinary));
}

#[test]
fn test_iterate_container_scope_never_falls_back() {
    let (mut ws, ..) = patched_workspace();
    embed_search_leaf(&mut ws);
    let unrelated = ws.surface_mut().create_root("elsewhere");

    let found = ws.iterate_leaves(IterScope::Container(unrelated), &mut |_| true);
    assert!(!found);
}

#[test]
fn test_layout_guard_resets_after_error() {
    let (mut ws, ..) = patched_workspace();
    assert!(ws.change_layout(LayoutOp::CloseWindow(WindowId(42))).is_err());
    assert!(!ws.layout_changing());
    assert!(ws.change_layout(LayoutOp::Rebuild).is_ok());
    assert!(!ws.layout_changing());
}

#[test]
fn test_embedded_leaf_never_wins_mru() {
    let (mut ws, ..) = patched_workspace();
    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();
    ws.set_active_leaf(ordinary, false);

    let search = embed_search_leaf(&mut ws);
    ws.set_active_leaf(search, true);

    assert_eq!(
        ws.leaf(search).unwrap().last_active,
        EMBEDDED_LAST_ACTIVE_MS
    );
    // the ordinary leaf was activated later in wall-clock terms
    assert!(ws.leaf(ordinary).unwrap().last_active > EMBEDDED_LAST_ACTIVE_MS);
    assert_eq!(ws.most_recent_leaf(Some(search)), Some(ordinary));
}

#[test]
fn test_undo_history_shields_search_leaves() {
    let (mut ws, alpha, ..) = patched_workspace();
    let search = embed_search_leaf(&mut ws);
    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();

    ws.push_undo_history(search, alpha);
    assert!(ws.undo_history().is_empty());

    ws.push_undo_history(ordinary, alpha);
    assert_eq!(ws.undo_history().len(), 1);
}

#[test]
fn test_open_into_embedded_leaf_suppresses_recent() {
    let (mut ws, alpha, beta, _) = patched_workspace();
    let root = ws.surface_mut().create_root("fs-modal");
    let (leaf, _) = ws.spawn_embedded_leaf(MAIN_WINDOW, root, true).unwrap();

    ws.open_file(leaf, alpha, None, OpenFileOptions::default())
        .unwrap();
    assert!(ws.recent_files().is_empty());
    assert!(ws
        .take_deferred()
        .contains(&Deferred::RestoreRecentHook));

    // the suppression is per-file: another file still records
    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();
    ws.open_file(ordinary, beta, None, OpenFileOptions::default())
        .unwrap();
    assert_eq!(ws.recent_files(), &[beta]);
}

#[test]
fn test_set_pinned_cannot_unpin_embedded() {
    let (mut ws, ..) = patched_workspace();
    let search = embed_search_leaf(&mut ws);

    ws.set_pinned(search, false);
    assert!(ws.leaf(search).unwrap().pinned);

    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();
    ws.set_pinned(ordinary, true);
    ws.set_pinned(ordinary, false);
    assert!(!ws.leaf(ordinary).unwrap().pinned);
}

#[test]
fn test_get_root_reports_synthetic_root() {
    let (mut ws, ..) = patched_workspace();
    let modal_root = ws.surface_mut().create_root("fs-modal");
    let container = ws.surface_mut().create_div(modal_root, "fs-content");
    let (leaf, _) = ws.spawn_embedded_leaf(MAIN_WINDOW, container, true).unwrap();

    assert_eq!(ws.get_root(leaf), Some(modal_root));

    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();
    assert_eq!(ws.get_root(ordinary), Some(ws.root_container()));
}

#[test]
fn test_into_inner_hands_host_back() {
    let (mut ws, ..) = patched_workspace();
    let ordinary = ws.create_leaf(MAIN_WINDOW).unwrap();

    let inner = ws.into_inner();
    assert!(inner.leaf(ordinary).is_some());
    assert_eq!(inner.get_root(ordinary), Some(inner.root_container()));
}

#[test]
fn test_deferred_queue_drains_once() {
    let (mut ws, ..) = patched_workspace();
    ws.defer(Deferred::FocusSearchInput);
    ws.defer(Deferred::RestoreRecentHook);

    let drained = ws.take_deferred();
    assert_eq!(drained.len(), 2);
    assert!(ws.take_deferred().is_empty());
}
