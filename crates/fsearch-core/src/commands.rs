//! The overlay's command surface: everything a palette entry, ribbon icon
//! or URI handler can trigger.

use crate::error::Result;
use crate::modal::OpenSeed;
use crate::patch::PatchedWorkspace;
use crate::Overlay;
use fsearch_host::{FileId, LeafId, MAIN_WINDOW, WorkspaceOps};
use fsearch_types::{SearchState, StatePatch, ViewKind};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open search with a cleared query in the configured default surface.
    GlobalSearch,
    /// Open the modal restoring the remembered state.
    ResumeSearch,
    /// Seed the query from the active file's name.
    SearchCurrentFile,
    /// Seed the query with a link to the active file.
    SearchBacklinks,
    /// Re-host the search UI in another surface.
    OpenViewIn(ViewKind),
    /// Search for the given (selected) text.
    SearchSelection(String),
    /// Preview a file inside the open modal.
    PreviewFile(FileId),
}

pub fn dispatch<W: WorkspaceOps>(
    overlay: &mut Overlay,
    ws: &mut PatchedWorkspace<W>,
    command: Command,
    now: Instant,
) -> Result<()> {
    debug!("dispatching {command:?}");
    match command {
        Command::GlobalSearch => match overlay.settings.default_view_kind {
            ViewKind::Modal => overlay.open_modal(ws, OpenSeed::Query(String::new()), now),
            kind => {
                let state = SearchState {
                    query: String::new(),
                    ..overlay.persist.state().clone()
                };
                open_search_pane(ws, kind, state).map(|_| ())
            }
        },
        Command::ResumeSearch => overlay.open_modal(ws, OpenSeed::Resume, now),
        Command::SearchCurrentFile => {
            let Some(name) = active_file_name(ws) else {
                return Ok(());
            };
            let patch = StatePatch {
                query: Some(name),
                current_file_only: Some(true),
                ..StatePatch::default()
            };
            overlay.open_modal(ws, OpenSeed::Patch(patch), now)
        }
        Command::SearchBacklinks => {
            let Some(name) = active_file_name(ws) else {
                return Ok(());
            };
            overlay.open_modal(ws, OpenSeed::Query(format!("[[{name}]]")), now)
        }
        Command::OpenViewIn(ViewKind::Modal) => overlay.open_modal(ws, OpenSeed::Resume, now),
        Command::OpenViewIn(kind) => {
            open_search_pane(ws, kind, overlay.persist.state().clone()).map(|_| ())
        }
        Command::SearchSelection(text) => overlay.open_modal(ws, OpenSeed::Query(text), now),
        Command::PreviewFile(file) => {
            if !overlay.modal.is_open() {
                overlay.open_modal(ws, OpenSeed::Resume, now)?;
            }
            overlay.modal.preview(ws, file, None)
        }
    }
}

/// Host a non-modal search view: a pane in the main window, or a pane in a
/// fresh popout window.
pub fn open_search_pane<W: WorkspaceOps>(
    ws: &mut PatchedWorkspace<W>,
    kind: ViewKind,
    state: SearchState,
) -> Result<LeafId> {
    let window = match kind {
        ViewKind::Window => ws.create_window(),
        _ => MAIN_WINDOW,
    };
    let leaf = ws.create_leaf(window)?;
    ws.set_search_view(leaf)?;
    if let Some(root_node) = ws.leaf(leaf).map(|l| l.root_node) {
        ws.surface_mut()
            .add_class(root_node, &format!("fs-pane-{}", kind.as_str()));
    }
    if let Some(parts) = ws.search_parts(leaf) {
        parts.view.set_state(parts.surface, parts.vault, state);
    }
    ws.set_active_leaf(leaf, true);
    Ok(leaf)
}

fn active_file_name<W: WorkspaceOps>(ws: &PatchedWorkspace<W>) -> Option<String> {
    let leaf = ws.active_leaf()?;
    let file = ws.file_view(leaf)?.file;
    ws.vault().file(file).map(|f| f.name.clone())
}
