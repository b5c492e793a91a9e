//! Search-view patch installation and state mirroring.

use super::fixtures::{overlay, patched_workspace};
use crate::commands::open_search_pane;
use crate::patch::search_view::{
    OPTION_CONTROLS, SWITCH_CONTROL, SearchViewBridge, SetStateOutcome, switch_menu_targets,
};
use fsearch_host::WorkspaceOps;
use fsearch_types::{SearchState, SortOrder, StatePatch, ViewKind};
use std::time::Instant;

#[test]
fn test_install_requires_a_search_view() {
    let (mut ws, ..) = patched_workspace();
    let mut bridge = SearchViewBridge::new();

    assert!(!bridge.install(&mut ws));
    assert!(bridge.installed_on().is_none());

    let leaf = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();
    assert!(bridge.install(&mut ws));
    assert_eq!(bridge.installed_on(), Some(leaf));
}

#[test]
fn test_install_injects_controls_once() {
    let (mut ws, ..) = patched_workspace();
    let mut bridge = SearchViewBridge::new();
    let leaf = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();

    assert!(bridge.install(&mut ws));
    // the first successful patch wins; repeat attempts are no-ops
    assert!(!bridge.install(&mut ws));

    let parts = ws.search_parts(leaf).unwrap();
    assert_eq!(parts.view.header_controls, vec![SWITCH_CONTROL.to_string()]);
    assert_eq!(parts.view.option_controls.len(), OPTION_CONTROLS.len());
}

#[test]
fn test_layout_change_reinstalls_after_view_died() {
    let (mut ws, ..) = patched_workspace();
    let mut bridge = SearchViewBridge::new();
    let first = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();
    bridge.install(&mut ws);

    ws.detach_leaf(first);
    bridge.on_layout_change(&mut ws);
    assert!(bridge.installed_on().is_none());

    let second = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();
    bridge.on_layout_change(&mut ws);
    assert_eq!(bridge.installed_on(), Some(second));
}

#[test]
fn test_setters_mirror_only_after_layout_ready() {
    let (mut overlay, _dir) = overlay();
    let (mut ws, ..) = patched_workspace();
    let mut bridge = SearchViewBridge::new();
    let leaf = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();
    bridge.install(&mut ws);
    let now = Instant::now();

    bridge.set_query(&mut ws, &mut overlay.persist, leaf, "early", now);
    assert_eq!(overlay.persist.state().query, "");
    assert!(!overlay.persist.save_pending());

    bridge.mark_layout_ready();
    bridge.set_query(&mut ws, &mut overlay.persist, leaf, "needle", now);
    bridge.set_sort_order(&mut ws, &mut overlay.persist, leaf, SortOrder::ByCreatedTime, now);
    bridge.set_collapse_all(&mut ws, &mut overlay.persist, leaf, true, now);

    assert_eq!(overlay.persist.state().query, "needle");
    assert_eq!(overlay.persist.state().sort_order, SortOrder::ByCreatedTime);
    assert!(overlay.persist.state().collapse_all);
    assert!(overlay.persist.save_pending());

    let parts = ws.search_parts(leaf).unwrap();
    assert_eq!(parts.view.state().query, "needle");
    assert!(parts.view.state().collapse_all);
}

#[test]
fn test_first_external_query_applies_later_ones_redirect() {
    let (mut ws, ..) = patched_workspace();
    let mut bridge = SearchViewBridge::new();
    let leaf = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();
    bridge.install(&mut ws);

    let restore = SearchState {
        query: "restored".to_string(),
        ..SearchState::default()
    };
    assert_eq!(
        bridge.set_state(&mut ws, leaf, restore, false),
        SetStateOutcome::Applied
    );

    let external = SearchState {
        query: "external".to_string(),
        ..SearchState::default()
    };
    let outcome = bridge.set_state(&mut ws, leaf, external.clone(), false);
    assert_eq!(outcome, SetStateOutcome::Redirected(external));
}

#[test]
fn test_self_triggered_set_state_always_applies() {
    let (mut ws, ..) = patched_workspace();
    let mut bridge = SearchViewBridge::new();
    let leaf = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();
    bridge.install(&mut ws);

    for query in ["one", "two", "three"] {
        let state = SearchState {
            query: query.to_string(),
            ..SearchState::default()
        };
        assert_eq!(
            bridge.set_state(&mut ws, leaf, state, true),
            SetStateOutcome::Applied
        );
    }
}

#[test]
fn test_empty_query_loads_never_redirect() {
    let (mut ws, ..) = patched_workspace();
    let mut bridge = SearchViewBridge::new();
    let leaf = open_search_pane(&mut ws, ViewKind::Tab, SearchState::default()).unwrap();
    bridge.install(&mut ws);

    for _ in 0..3 {
        let state = SearchState::default();
        assert_eq!(
            bridge.set_state(&mut ws, leaf, state, false),
            SetStateOutcome::Applied
        );
    }

    let mut patch_state = SearchState::default();
    patch_state.query = "first".to_string();
    assert_eq!(
        bridge.set_state(&mut ws, leaf, patch_state, false),
        SetStateOutcome::Applied
    );
}

#[test]
fn test_switch_menu_skips_current_kind() {
    let targets = switch_menu_targets(ViewKind::Modal);
    assert_eq!(
        targets,
        vec![ViewKind::Sidebar, ViewKind::Split, ViewKind::Tab, ViewKind::Window]
    );
}

#[test]
fn test_switch_menu_from_split_offers_no_tab() {
    let targets = switch_menu_targets(ViewKind::Split);
    assert_eq!(
        targets,
        vec![ViewKind::Modal, ViewKind::Sidebar, ViewKind::Window]
    );
}

#[test]
fn test_state_patch_helper_is_empty() {
    assert!(StatePatch::default().is_empty());
    assert!(!StatePatch::query("q").is_empty());
}
