//! The workspace interception layer.
//!
//! [`PatchedWorkspace`] wraps any [`WorkspaceOps`] implementation and
//! rewrites the handful of host behaviors the overlay depends on: leaf
//! targeting around pinned modal leaves, embedded-leaf enumeration, MRU and
//! undo-history shielding, and recent-file suppression. Everything else
//! delegates straight through, and [`PatchedWorkspace::into_inner`]
//! uninstalls the layer by handing the untouched host back.

pub mod search_view;

use crate::embed::{EmbeddedRegistry, EmbeddedViewId};
use fsearch_host::{
    FileId, FileKind, FileViewModel, HistoryEntry, HostError, HostResult, IterScope, LayoutOp,
    Leaf, LeafId, MAIN_WINDOW, NodeId, OpenFileOptions, SearchParts, Surface, Vault, WindowId,
    WorkspaceOps,
};
use fsearch_types::EphemeralState;
use tracing::{debug, trace};

/// MRU stamp given to embedded leaves on activation: a fixed instant in the
/// past (2023-01-01T00:00:00Z in unix ms), so `most_recent_leaf` never
/// prefers a modal leaf over any leaf the user actually visited.
pub const EMBEDDED_LAST_ACTIVE_MS: u64 = 1_672_531_200_000;

/// Work queued during an interception and drained on the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Return keyboard focus to the modal's search input.
    FocusSearchInput,
    /// Lift the one-shot recent-file suppression installed by `open_file`.
    RestoreRecentHook,
    /// Select and zoom the canvas node matching a search hit.
    CanvasZoom { leaf: LeafId, match_text: String },
}

pub struct PatchedWorkspace<W: WorkspaceOps> {
    inner: W,
    registry: EmbeddedRegistry,
    deferred: Vec<Deferred>,
    layout_changing: bool,
}

impl<W: WorkspaceOps> PatchedWorkspace<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            registry: EmbeddedRegistry::new(),
            deferred: Vec::new(),
            layout_changing: false,
        }
    }

    /// Uninstall the layer, returning the host untouched.
    pub fn into_inner(self) -> W {
        self.inner
    }

    #[must_use]
    pub fn registry(&self) -> &EmbeddedRegistry {
        &self.registry
    }

    #[must_use]
    pub fn layout_changing(&self) -> bool {
        self.layout_changing
    }

    pub fn defer(&mut self, action: Deferred) {
        trace!("deferring {action:?}");
        self.deferred.push(action);
    }

    /// Drain the deferral queue for this tick.
    pub fn take_deferred(&mut self) -> Vec<Deferred> {
        std::mem::take(&mut self.deferred)
    }

    /// Create a leaf and graft it into an overlay-owned container.
    ///
    /// The leaf is registered so enumeration, root resolution and pinning
    /// keep working for it even though the host never placed it.
    pub fn spawn_embedded_leaf(
        &mut self,
        window: WindowId,
        container: NodeId,
        plugin_owned: bool,
    ) -> HostResult<(LeafId, EmbeddedViewId)> {
        let leaf = self.inner.create_leaf(window)?;
        let root_node = self
            .inner
            .leaf(leaf)
            .map(|l| l.root_node)
            .ok_or(HostError::LeafNotFound(leaf))?;
        self.inner.surface_mut().reparent(root_node, container);
        let synthetic_root = self
            .inner
            .surface()
            .ancestors(container)
            .last()
            .copied()
            .unwrap_or(container);
        let id = self
            .registry
            .register(leaf, window, container, synthetic_root, plugin_owned);
        Ok((leaf, id))
    }

    /// Detach an embedded leaf and drop its overrides. Idempotent.
    pub fn dispose_embedded(&mut self, id: EmbeddedViewId) {
        if let Some(leaf) = self.registry.dispose(id) {
            self.inner.detach_leaf(leaf);
        }
    }

    fn active_leaf_is_shielded(&self) -> bool {
        let Some(active) = self.inner.active_leaf() else {
            return false;
        };
        let Some(leaf) = self.inner.leaf(active) else {
            return false;
        };
        leaf.pinned && (leaf.is_search() || self.registry.is_plugin_owned(active))
    }
}

impl<W: WorkspaceOps> WorkspaceOps for PatchedWorkspace<W> {
    fn create_leaf(&mut self, window: WindowId) -> HostResult<LeafId> {
        self.inner.create_leaf(window)
    }

    fn detach_leaf(&mut self, leaf: LeafId) {
        self.inner.detach_leaf(leaf);
    }

    fn leaf(&self, leaf: LeafId) -> Option<&Leaf> {
        self.inner.leaf(leaf)
    }

    fn leaf_mut(&mut self, leaf: LeafId) -> Option<&mut Leaf> {
        self.inner.leaf_mut(leaf)
    }

    /// Redirect "open here" targeting away from the modal's own leaves:
    /// when the active leaf is a pinned search leaf or sits in an
    /// overlay-owned container, activate the most recent ordinary leaf (or
    /// a fresh one) before asking the host.
    fn get_leaf(&mut self) -> HostResult<LeafId> {
        if self.active_leaf_is_shielded() {
            let active = self.inner.active_leaf();
            let target = match self.inner.most_recent_leaf(active) {
                Some(leaf) => leaf,
                None => self.inner.create_leaf(MAIN_WINDOW)?,
            };
            debug!("get_leaf redirected from {active:?} to {target:?}");
            self.inner.set_active_leaf(target, false);
        }
        self.inner.get_leaf()
    }

    fn change_layout(&mut self, op: LayoutOp) -> HostResult<()> {
        self.layout_changing = true;
        let result = self.inner.change_layout(op);
        self.layout_changing = false;
        result
    }

    /// Host enumeration first; if nothing matched, fall back to the
    /// embedded leaves registered for the scoped window. Suppressed while a
    /// layout change is in flight so half-built trees are never offered.
    fn iterate_leaves(&mut self, scope: IterScope, f: &mut dyn FnMut(&Leaf) -> bool) -> bool {
        if self.inner.iterate_leaves(scope, f) {
            return true;
        }
        if self.layout_changing {
            return false;
        }
        let window = match scope {
            IterScope::Root => MAIN_WINDOW,
            IterScope::Window(window) => window,
            IterScope::Container(_) => return false,
        };
        let embedded: Vec<LeafId> = self
            .registry
            .views_for_window(window)
            .map(|v| v.leaf)
            .collect();
        for leaf in embedded {
            if let Some(leaf) = self.inner.leaf(leaf)
                && f(leaf)
            {
                return true;
            }
        }
        false
    }

    fn active_leaf(&self) -> Option<LeafId> {
        self.inner.active_leaf()
    }

    /// Embedded leaves never win MRU races: after the host stamps the
    /// activation, their `last_active` is forced back to a fixed past
    /// instant.
    fn set_active_leaf(&mut self, leaf: LeafId, focus: bool) {
        self.inner.set_active_leaf(leaf, focus);
        if self.registry.is_embedded(leaf)
            && let Some(l) = self.inner.leaf_mut(leaf)
        {
            l.last_active = EMBEDDED_LAST_ACTIVE_MS;
        }
    }

    fn focused_leaf(&self) -> Option<LeafId> {
        self.inner.focused_leaf()
    }

    fn most_recent_leaf(&self, exclude: Option<LeafId>) -> Option<LeafId> {
        self.inner.most_recent_leaf(exclude)
    }

    /// Search leaves stay out of the host's undo history; file opens from
    /// the modal would otherwise leave phantom entries behind.
    fn push_undo_history(&mut self, leaf: LeafId, file: FileId) {
        if self.inner.leaf(leaf).is_some_and(Leaf::is_search) {
            trace!("dropping undo entry for search leaf {leaf:?}");
            return;
        }
        self.inner.push_undo_history(leaf, file);
    }

    fn on_drag_leaf(&mut self, leaf: LeafId) {
        self.inner.on_drag_leaf(leaf);
    }

    /// Opens into embedded leaves suppress recent-file recording for
    /// exactly this file until the next tick, and canvas opens into
    /// overlay-owned containers queue a zoom to the matched node.
    fn open_file(
        &mut self,
        leaf: LeafId,
        file: FileId,
        ephemeral: Option<EphemeralState>,
        options: OpenFileOptions,
    ) -> HostResult<()> {
        let embedded = self.registry.is_embedded(leaf);
        let plugin_owned = self.registry.is_plugin_owned(leaf);
        if embedded {
            self.inner.set_recent_suppressed(Some(file));
            self.defer(Deferred::RestoreRecentHook);
        }
        let is_canvas = self
            .inner
            .vault()
            .file(file)
            .is_some_and(|f| f.kind == FileKind::Canvas);
        if plugin_owned
            && is_canvas
            && let Some(estate) = &ephemeral
        {
            self.defer(Deferred::CanvasZoom {
                leaf,
                match_text: estate.match_text.clone(),
            });
        }
        self.inner.open_file(leaf, file, ephemeral, options)
    }

    /// Embedded leaves must stay pinned for the leaf-targeting overrides to
    /// hold; attempts to unpin them are rewritten.
    fn set_pinned(&mut self, leaf: LeafId, pinned: bool) {
        let pinned = pinned || self.registry.is_embedded(leaf);
        self.inner.set_pinned(leaf, pinned);
    }

    /// Embedded leaves report the overlay container's root, so host code
    /// walking up from them never escapes into the real workspace tree.
    fn get_root(&self, leaf: LeafId) -> Option<NodeId> {
        if let Some(view) = self.registry.view_for_leaf(leaf) {
            return Some(view.synthetic_root);
        }
        self.inner.get_root(leaf)
    }

    fn set_search_view(&mut self, leaf: LeafId) -> HostResult<()> {
        self.inner.set_search_view(leaf)
    }

    fn search_parts(&mut self, leaf: LeafId) -> Option<SearchParts<'_>> {
        self.inner.search_parts(leaf)
    }

    fn file_view(&self, leaf: LeafId) -> Option<&FileViewModel> {
        self.inner.file_view(leaf)
    }

    fn file_view_mut(&mut self, leaf: LeafId) -> Option<&mut FileViewModel> {
        self.inner.file_view_mut(leaf)
    }

    fn surface(&self) -> &Surface {
        self.inner.surface()
    }

    fn surface_mut(&mut self) -> &mut Surface {
        self.inner.surface_mut()
    }

    fn vault(&self) -> &Vault {
        self.inner.vault()
    }

    fn vault_mut(&mut self) -> &mut Vault {
        self.inner.vault_mut()
    }

    fn create_window(&mut self) -> WindowId {
        self.inner.create_window()
    }

    fn window_container(&self, window: WindowId) -> Option<NodeId> {
        self.inner.window_container(window)
    }

    fn root_container(&self) -> NodeId {
        self.inner.root_container()
    }

    fn reveal_leaf(&mut self, leaf: LeafId) {
        self.inner.reveal_leaf(leaf);
    }

    fn recent_files(&self) -> &[FileId] {
        self.inner.recent_files()
    }

    fn plugin_recent_files(&self) -> Option<&[FileId]> {
        self.inner.plugin_recent_files()
    }

    fn set_recent_suppressed(&mut self, file: Option<FileId>) {
        self.inner.set_recent_suppressed(file);
    }

    fn undo_history(&self) -> &[HistoryEntry] {
        self.inner.undo_history()
    }
}
