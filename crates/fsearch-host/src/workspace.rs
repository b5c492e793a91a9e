//! The host application's workspace: leaves, windows, MRU tracking, undo
//! history and file opening.
//!
//! [`WorkspaceOps`] is the narrow capability surface the overlay consumes.
//! The overlay composes its interception layer as a decorator over any
//! implementation of this trait; [`Workspace`] is the concrete host model.

use crate::error::{HostError, HostResult};
use crate::surface::{NodeId, Surface};
use crate::vault::{FileId, Vault};
use crate::views::{FileViewModel, SearchViewModel};
use fsearch_types::EphemeralState;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

pub const MAIN_WINDOW: WindowId = WindowId(0);

/// What a leaf currently shows.
#[derive(Debug, Clone)]
pub enum View {
    Empty,
    Search(SearchViewModel),
    File(FileViewModel),
}

impl View {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            View::Empty => "empty",
            View::Search(_) => "search",
            View::File(_) => "file",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Leaf {
    pub id: LeafId,
    pub window: WindowId,
    pub view: View,
    pub pinned: bool,
    pub root_node: NodeId,
    pub detached: bool,
    /// Unix milliseconds of the last activation, for MRU ordering.
    pub last_active: u64,
}

impl Leaf {
    #[must_use]
    pub fn is_search(&self) -> bool {
        matches!(self.view, View::Search(_))
    }
}

/// One entry in the host's global navigation/undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub leaf: LeafId,
    pub file: FileId,
}

/// Scope for leaf enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterScope {
    /// The true workspace root.
    Root,
    /// A window container.
    Window(WindowId),
    /// An arbitrary container node.
    Container(NodeId),
}

/// A structural layout operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOp {
    Rebuild,
    OpenWindow,
    CloseWindow(WindowId),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFileOptions {
    pub active: bool,
}

/// Split borrows of a leaf's search view plus the stores it renders from.
pub struct SearchParts<'a> {
    pub view: &'a mut SearchViewModel,
    pub surface: &'a mut Surface,
    pub vault: &'a mut Vault,
}

/// The host capabilities the overlay consumes.
pub trait WorkspaceOps {
    fn create_leaf(&mut self, window: WindowId) -> HostResult<LeafId>;
    fn detach_leaf(&mut self, leaf: LeafId);
    fn leaf(&self, leaf: LeafId) -> Option<&Leaf>;
    fn leaf_mut(&mut self, leaf: LeafId) -> Option<&mut Leaf>;

    /// The host's "get a leaf to act on" used by open-in-current-pane
    /// commands.
    fn get_leaf(&mut self) -> HostResult<LeafId>;
    fn change_layout(&mut self, op: LayoutOp) -> HostResult<()>;
    /// Call `f` for each leaf in `scope`; stops and returns `true` as soon
    /// as `f` does.
    fn iterate_leaves(&mut self, scope: IterScope, f: &mut dyn FnMut(&Leaf) -> bool) -> bool;

    fn active_leaf(&self) -> Option<LeafId>;
    fn set_active_leaf(&mut self, leaf: LeafId, focus: bool);
    fn focused_leaf(&self) -> Option<LeafId>;
    /// Most recently used unpinned leaf, optionally excluding one.
    fn most_recent_leaf(&self, exclude: Option<LeafId>) -> Option<LeafId>;

    fn push_undo_history(&mut self, leaf: LeafId, file: FileId);
    fn on_drag_leaf(&mut self, leaf: LeafId);
    fn open_file(
        &mut self,
        leaf: LeafId,
        file: FileId,
        ephemeral: Option<EphemeralState>,
        options: OpenFileOptions,
    ) -> HostResult<()>;
    fn set_pinned(&mut self, leaf: LeafId, pinned: bool);
    /// The topmost container the leaf reports as its root.
    fn get_root(&self, leaf: LeafId) -> Option<NodeId>;

    fn set_search_view(&mut self, leaf: LeafId) -> HostResult<()>;
    fn search_parts(&mut self, leaf: LeafId) -> Option<SearchParts<'_>>;
    fn file_view(&self, leaf: LeafId) -> Option<&FileViewModel>;
    fn file_view_mut(&mut self, leaf: LeafId) -> Option<&mut FileViewModel>;

    fn surface(&self) -> &Surface;
    fn surface_mut(&mut self) -> &mut Surface;
    fn vault(&self) -> &Vault;
    fn vault_mut(&mut self) -> &mut Vault;

    fn create_window(&mut self) -> WindowId;
    fn window_container(&self, window: WindowId) -> Option<NodeId>;
    fn root_container(&self) -> NodeId;
    fn reveal_leaf(&mut self, leaf: LeafId);

    fn recent_files(&self) -> &[FileId];
    fn plugin_recent_files(&self) -> Option<&[FileId]>;
    /// Shadow the recent-file bookkeeping for exactly this file.
    fn set_recent_suppressed(&mut self, file: Option<FileId>);
    fn undo_history(&self) -> &[HistoryEntry];
}

pub struct Workspace {
    pub surface: Surface,
    pub vault: Vault,
    leaves: Vec<Leaf>,
    windows: Vec<NodeId>,
    active: Option<LeafId>,
    focused: Option<LeafId>,
    root: NodeId,
    recent_files: Vec<FileId>,
    /// The optional third-party recent-files integration's list.
    plugin_recent: Option<Vec<FileId>>,
    recent_suppressed: Option<FileId>,
    undo_history: Vec<HistoryEntry>,
    layout_epoch: u64,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        let mut surface = Surface::new();
        let root = surface.create_root("workspace");
        let main = surface.create_div(root, "window");
        Self {
            surface,
            vault: Vault::new(),
            leaves: Vec::new(),
            windows: vec![main],
            active: None,
            focused: None,
            root,
            recent_files: Vec::new(),
            plugin_recent: None,
            recent_suppressed: None,
            undo_history: Vec::new(),
            layout_epoch: 0,
        }
    }

    /// Enable the third-party recent-files integration.
    pub fn enable_recent_plugin(&mut self) {
        self.plugin_recent = Some(Vec::new());
    }

    #[must_use]
    pub fn layout_epoch(&self) -> u64 {
        self.layout_epoch
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.iter().filter(|l| !l.detached)
    }

    fn record_recent(&mut self, file: FileId) {
        if self.recent_suppressed == Some(file) {
            debug!("recent-file recording suppressed for {file:?}");
            return;
        }
        self.recent_files.retain(|f| *f != file);
        self.recent_files.push(file);
        if let Some(list) = &mut self.plugin_recent {
            list.retain(|f| *f != file);
            list.push(file);
        }
    }
}

impl WorkspaceOps for Workspace {
    fn create_leaf(&mut self, window: WindowId) -> HostResult<LeafId> {
        let container = self
            .window_container(window)
            .ok_or(HostError::WindowNotFound(window))?;
        let id = LeafId(self.leaves.len());
        let root_node = self.surface.create_div(container, "workspace-leaf");
        self.leaves.push(Leaf {
            id,
            window,
            view: View::Empty,
            pinned: false,
            root_node,
            detached: false,
            last_active: 0,
        });
        debug!("created leaf {id:?} in window {window:?}");
        Ok(id)
    }

    fn detach_leaf(&mut self, leaf: LeafId) {
        if let Some(l) = self.leaves.get_mut(leaf.0) {
            l.detached = true;
            let node = l.root_node;
            self.surface.remove(node);
            if self.active == Some(leaf) {
                self.active = None;
            }
            if self.focused == Some(leaf) {
                self.focused = None;
            }
        }
    }

    fn leaf(&self, leaf: LeafId) -> Option<&Leaf> {
        self.leaves.get(leaf.0).filter(|l| !l.detached)
    }

    fn leaf_mut(&mut self, leaf: LeafId) -> Option<&mut Leaf> {
        self.leaves.get_mut(leaf.0).filter(|l| !l.detached)
    }

    fn get_leaf(&mut self) -> HostResult<LeafId> {
        if let Some(active) = self.active {
            return Ok(active);
        }
        let leaf = self.create_leaf(MAIN_WINDOW)?;
        self.set_active_leaf(leaf, false);
        Ok(leaf)
    }

    fn change_layout(&mut self, op: LayoutOp) -> HostResult<()> {
        match op {
            LayoutOp::Rebuild => {}
            LayoutOp::OpenWindow => {
                self.create_window();
            }
            LayoutOp::CloseWindow(window) => {
                let node = self
                    .window_container(window)
                    .ok_or(HostError::WindowNotFound(window))?;
                self.surface.remove(node);
            }
        }
        self.layout_epoch += 1;
        Ok(())
    }

    fn iterate_leaves(&mut self, scope: IterScope, f: &mut dyn FnMut(&Leaf) -> bool) -> bool {
        let container = match scope {
            IterScope::Root => Some(self.root),
            IterScope::Window(window) => self.window_container(window),
            IterScope::Container(node) => Some(node),
        };
        let Some(container) = container else {
            return false;
        };
        for leaf in self.leaves.iter().filter(|l| !l.detached) {
            if self.surface.contains(container, leaf.root_node) && f(leaf) {
                return true;
            }
        }
        false
    }

    fn active_leaf(&self) -> Option<LeafId> {
        self.active
    }

    fn set_active_leaf(&mut self, leaf: LeafId, focus: bool) {
        let Some(l) = self.leaves.get_mut(leaf.0).filter(|l| !l.detached) else {
            return;
        };
        l.last_active = now_ms();
        self.active = Some(leaf);
        if focus {
            self.focused = Some(leaf);
        }
    }

    fn focused_leaf(&self) -> Option<LeafId> {
        self.focused
    }

    fn most_recent_leaf(&self, exclude: Option<LeafId>) -> Option<LeafId> {
        self.leaves
            .iter()
            .filter(|l| !l.detached && !l.pinned && Some(l.id) != exclude)
            .max_by_key(|l| l.last_active)
            .map(|l| l.id)
    }

    fn push_undo_history(&mut self, leaf: LeafId, file: FileId) {
        self.undo_history.push(HistoryEntry { leaf, file });
    }

    fn on_drag_leaf(&mut self, leaf: LeafId) {
        debug!("drag leaf {leaf:?}");
    }

    fn open_file(
        &mut self,
        leaf: LeafId,
        file: FileId,
        ephemeral: Option<EphemeralState>,
        options: OpenFileOptions,
    ) -> HostResult<()> {
        if self.vault.file(file).is_none() {
            return Err(HostError::FileNotFound(format!("{file:?}")));
        }
        {
            let l = self
                .leaves
                .get_mut(leaf.0)
                .filter(|l| !l.detached)
                .ok_or(HostError::LeafNotFound(leaf))?;
            match &mut l.view {
                View::File(view) => view.retarget(file, ephemeral),
                view => *view = View::File(FileViewModel::new(file, ephemeral)),
            }
        }
        self.push_undo_history(leaf, file);
        self.record_recent(file);
        if options.active {
            self.set_active_leaf(leaf, true);
        }
        Ok(())
    }

    fn set_pinned(&mut self, leaf: LeafId, pinned: bool) {
        if let Some(l) = self.leaves.get_mut(leaf.0).filter(|l| !l.detached) {
            l.pinned = pinned;
        }
    }

    fn get_root(&self, leaf: LeafId) -> Option<NodeId> {
        let l = self.leaf(leaf)?;
        self.surface.ancestors(l.root_node).last().copied()
    }

    fn set_search_view(&mut self, leaf: LeafId) -> HostResult<()> {
        let root_node = self
            .leaves
            .get(leaf.0)
            .filter(|l| !l.detached)
            .map(|l| l.root_node)
            .ok_or(HostError::LeafNotFound(leaf))?;
        let view = SearchViewModel::build(&mut self.surface, root_node);
        if let Some(l) = self.leaves.get_mut(leaf.0) {
            l.view = View::Search(view);
        }
        Ok(())
    }

    fn search_parts(&mut self, leaf: LeafId) -> Option<SearchParts<'_>> {
        let Workspace {
            surface,
            vault,
            leaves,
            ..
        } = self;
        let l = leaves.get_mut(leaf.0).filter(|l| !l.detached)?;
        match &mut l.view {
            View::Search(view) => Some(SearchParts {
                view,
                surface,
                vault,
            }),
            _ => None,
        }
    }

    fn file_view(&self, leaf: LeafId) -> Option<&FileViewModel> {
        match &self.leaf(leaf)?.view {
            View::File(view) => Some(view),
            _ => None,
        }
    }

    fn file_view_mut(&mut self, leaf: LeafId) -> Option<&mut FileViewModel> {
        match &mut self.leaf_mut(leaf)?.view {
            View::File(view) => Some(view),
            _ => None,
        }
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }

    fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    fn vault(&self) -> &Vault {
        &self.vault
    }

    fn vault_mut(&mut self) -> &mut Vault {
        &mut self.vault
    }

    fn create_window(&mut self) -> WindowId {
        let node = self.surface.create_root("window");
        self.windows.push(node);
        WindowId(u32::try_from(self.windows.len() - 1).unwrap_or(u32::MAX))
    }

    fn window_container(&self, window: WindowId) -> Option<NodeId> {
        self.windows.get(window.0 as usize).copied()
    }

    fn root_container(&self) -> NodeId {
        self.root
    }

    fn reveal_leaf(&mut self, leaf: LeafId) {
        self.set_active_leaf(leaf, true);
    }

    fn recent_files(&self) -> &[FileId] {
        &self.recent_files
    }

    fn plugin_recent_files(&self) -> Option<&[FileId]> {
        self.plugin_recent.as_deref()
    }

    fn set_recent_suppressed(&mut self, file: Option<FileId>) {
        self.recent_suppressed = file;
    }

    fn undo_history(&self) -> &[HistoryEntry] {
        &self.undo_history
    }
}
