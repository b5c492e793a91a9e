//! The search-view patch layer.
//!
//! Installs once onto a live search view: injects the view-switch menu and
//! the overlay's option toggles, mirrors every state setter into the
//! debounced persistence layer, and redirects externally-triggered query
//! loads into the modal. Installation retries on layout changes until a
//! search view exists to patch.

use crate::patch::PatchedWorkspace;
use crate::persist::StatePersistence;
use fsearch_host::{IterScope, LeafId, WorkspaceOps};
use fsearch_types::{SearchState, SortOrder, StatePatch, ViewKind};
use std::time::Instant;
use tracing::debug;

/// Header control label for the injected view-switch menu.
pub const SWITCH_CONTROL: &str = "switch-view";

/// Option toggles the overlay adds to the search options panel.
pub const OPTION_CONTROLS: [&str; 3] = ["show-file-path", "show-instructions", "default-view-kind"];

/// What [`SearchViewBridge::set_state`] decided to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetStateOutcome {
    Applied,
    /// A later external query load; the caller should open the modal with
    /// this state instead.
    Redirected(SearchState),
}

#[derive(Debug, Default)]
pub struct SearchViewBridge {
    installed: Option<LeafId>,
    layout_ready: bool,
    first_query_consumed: bool,
}

impl SearchViewBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn installed_on(&self) -> Option<LeafId> {
        self.installed
    }

    #[must_use]
    pub fn layout_ready(&self) -> bool {
        self.layout_ready
    }

    /// The workspace finished restoring; state changes from here on are
    /// user edits worth persisting.
    pub fn mark_layout_ready(&mut self) {
        self.layout_ready = true;
    }

    /// Patch the first live search view found. Idempotent: once installed,
    /// later calls do nothing until the patched leaf disappears.
    pub fn install<W: WorkspaceOps>(&mut self, ws: &mut PatchedWorkspace<W>) -> bool {
        if let Some(leaf) = self.installed {
            if ws.leaf(leaf).is_some() {
                return false;
            }
            self.installed = None;
        }
        let Some(leaf) = find_search_leaf(ws) else {
            return false;
        };
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.header_controls.push(SWITCH_CONTROL.to_string());
            parts
                .surface
                .create_div(parts.view.nav_header, "float-search-view-switch");
            for control in OPTION_CONTROLS {
                parts.view.option_controls.push(control.to_string());
                parts.surface.create_div(parts.view.options, "setting-item");
            }
        }
        debug!("search-view patch installed on {leaf:?}");
        self.installed = Some(leaf);
        true
    }

    /// Layout changed: re-attempt installation if our patched view died.
    pub fn on_layout_change<W: WorkspaceOps>(&mut self, ws: &mut PatchedWorkspace<W>) {
        self.install(ws);
    }

    /// Full state load. The first query after startup is the host restoring
    /// the session and is applied in place; later external loads carry a
    /// query the user asked for elsewhere and are redirected to the modal.
    pub fn set_state<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        leaf: LeafId,
        state: SearchState,
        self_triggered: bool,
    ) -> SetStateOutcome {
        if !self_triggered && !state.query.is_empty() {
            if self.first_query_consumed {
                return SetStateOutcome::Redirected(state);
            }
            self.first_query_consumed = true;
        }
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.set_state(parts.surface, parts.vault, state);
        }
        SetStateOutcome::Applied
    }

    pub fn set_query<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        leaf: LeafId,
        query: &str,
        now: Instant,
    ) {
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.set_query(parts.surface, parts.vault, query);
        }
        self.mirror(persist, StatePatch::query(query), now);
    }

    pub fn set_matching_case<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        leaf: LeafId,
        value: bool,
        now: Instant,
    ) {
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.set_matching_case(parts.surface, parts.vault, value);
        }
        self.mirror(
            persist,
            StatePatch {
                matching_case: Some(value),
                ..StatePatch::default()
            },
            now,
        );
    }

    pub fn set_explain_search<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        leaf: LeafId,
        value: bool,
        now: Instant,
    ) {
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.set_explain_search(value);
        }
        self.mirror(
            persist,
            StatePatch {
                explain_search: Some(value),
                ..StatePatch::default()
            },
            now,
        );
    }

    pub fn set_extra_context<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        leaf: LeafId,
        value: bool,
        now: Instant,
    ) {
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.set_extra_context(value);
        }
        self.mirror(
            persist,
            StatePatch {
                extra_context: Some(value),
                ..StatePatch::default()
            },
            now,
        );
    }

    pub fn set_collapse_all<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        leaf: LeafId,
        value: bool,
        now: Instant,
    ) {
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.set_collapse_all(parts.surface, value);
        }
        self.mirror(
            persist,
            StatePatch {
                collapse_all: Some(value),
                ..StatePatch::default()
            },
            now,
        );
    }

    pub fn set_sort_order<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        leaf: LeafId,
        order: SortOrder,
        now: Instant,
    ) {
        if let Some(parts) = ws.search_parts(leaf) {
            parts.view.set_sort_order(parts.surface, parts.vault, order);
        }
        self.mirror(
            persist,
            StatePatch {
                sort_order: Some(order),
                ..StatePatch::default()
            },
            now,
        );
    }

    /// Persist only once the layout is ready; restore traffic before that
    /// would clobber the remembered state with itself.
    fn mirror(&self, persist: &mut StatePersistence, patch: StatePatch, now: Instant) {
        if self.layout_ready {
            persist.update(&patch, now);
        }
    }
}

/// Targets offered by the view-switch menu: every view kind except the one
/// currently showing, and never a tab when the view is already a split (the
/// host would fold the tab straight back into the split).
#[must_use]
pub fn switch_menu_targets(current: ViewKind) -> Vec<ViewKind> {
    [
        ViewKind::Modal,
        ViewKind::Sidebar,
        ViewKind::Split,
        ViewKind::Tab,
        ViewKind::Window,
    ]
    .into_iter()
    .filter(|&kind| kind != current)
    .filter(|&kind| !(current == ViewKind::Split && kind == ViewKind::Tab))
    .collect()
}

fn find_search_leaf<W: WorkspaceOps>(ws: &mut PatchedWorkspace<W>) -> Option<LeafId> {
    let mut found = None;
    ws.iterate_leaves(IterScope::Root, &mut |leaf| {
        if leaf.is_search() {
            found = Some(leaf.id);
            true
        } else {
            false
        }
    });
    found
}
