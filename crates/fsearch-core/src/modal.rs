//! The floating search modal.
//!
//! One session at a time: a pinned embedded search leaf, an optional
//! lazily-created preview leaf, and a keyboard state machine over both.
//! Closing reports the final search state to the persistence layer and
//! tears both embedded views down explicitly; nothing about the session is
//! cleaned up implicitly by the host.

use crate::error::Result;
use crate::patch::{Deferred, PatchedWorkspace};
use crate::persist::StatePersistence;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fsearch_host::{
    FileId, MAIN_WINDOW, NodeId, OpenFileOptions, WorkspaceOps,
};
use fsearch_types::{EphemeralState, SearchState, StatePatch};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, warn};

use crate::embed::EmbeddedViewId;

/// Class toggled on the modal while a preview pane widens it.
pub const MODAL_WIDE_CLASS: &str = "fs-modal-wide";

/// Footer hints rendered when instructions are enabled.
const INSTRUCTIONS: [(&str, &str); 5] = [
    ("ctrl+n/ctrl+p", "Navigate"),
    ("alt+enter", "Open file and close"),
    ("tab/shift+tab", "Toggle preview"),
    ("ctrl+g", "Switch between search and file view"),
    ("esc", "Close"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    SearchFocused,
    PreviewOpen,
}

/// How the modal's initial search state is seeded.
#[derive(Debug, Clone)]
pub enum OpenSeed {
    /// Restore the remembered state as-is.
    Resume,
    /// Remembered preferences, but with this query.
    Query(String),
    /// Remembered preferences merged with an explicit patch.
    Patch(StatePatch),
}

#[derive(Debug)]
pub struct ModalSession {
    pub search_leaf: fsearch_host::LeafId,
    pub search_view: EmbeddedViewId,
    pub file_leaf: Option<fsearch_host::LeafId>,
    pub file_view: Option<EmbeddedViewId>,
    pub file_container: Option<NodeId>,
    pub modal_node: NodeId,
    pub content_node: NodeId,
    pub search_container: NodeId,
    pub instructions_node: Option<NodeId>,
    /// Primary offset of the last preview open, for duplicate detection.
    pub last_open_offset: Option<usize>,
    pub phase: ModalPhase,
}

#[derive(Debug, Default)]
pub struct ModalController {
    session: Option<ModalSession>,
}

impl ModalController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&ModalSession> {
        self.session.as_ref()
    }

    /// Open a modal session. An already-open session is closed first, so at
    /// most one session is ever live.
    pub fn open<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        settings: &Settings,
        seed: OpenSeed,
        now: Instant,
    ) -> Result<()> {
        if self.is_open() {
            self.close(ws, persist, now);
        }

        let surface = ws.surface_mut();
        let modal_node = surface.create_root("fs-modal");
        let content_node = surface.create_div(modal_node, "fs-modal-content");
        let search_container = surface.create_div(content_node, "fs-modal-search");
        surface.add_class(search_container, "fs-content");
        let instructions_node = settings
            .show_instructions
            .then(|| build_instructions(ws.surface_mut(), modal_node));

        let (search_leaf, search_view) =
            match ws.spawn_embedded_leaf(MAIN_WINDOW, search_container, true) {
                Ok(pair) => pair,
                Err(err) => {
                    // leave no half-built modal behind
                    ws.surface_mut().remove(modal_node);
                    warn!("modal open failed: {err}");
                    return Err(err.into());
                }
            };
        ws.set_pinned(search_leaf, true);
        ws.set_search_view(search_leaf)?;

        let state = match seed {
            OpenSeed::Resume => persist.state().clone(),
            OpenSeed::Query(query) => persist.state().merged(&StatePatch::query(query)),
            OpenSeed::Patch(patch) => persist.state().merged(&patch),
        };
        if let Some(parts) = ws.search_parts(search_leaf) {
            parts.view.set_state(parts.surface, parts.vault, state);
        }
        ws.set_active_leaf(search_leaf, true);

        debug!("modal opened with search leaf {search_leaf:?}");
        self.session = Some(ModalSession {
            search_leaf,
            search_view,
            file_leaf: None,
            file_view: None,
            file_container: None,
            modal_node,
            content_node,
            search_container,
            instructions_node,
            last_open_offset: None,
            phase: ModalPhase::SearchFocused,
        });
        Ok(())
    }

    /// Close the session: report the final search state, tear down both
    /// embedded views and the modal's element tree. Safe to call when no
    /// session is open, and whether or not a preview was ever created.
    pub fn close<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        now: Instant,
    ) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(parts) = ws.search_parts(session.search_leaf) {
            let final_state: SearchState = parts.view.state().clone();
            persist.record_close(&final_state, now);
        }
        ws.dispose_embedded(session.search_view);
        if let Some(view) = session.file_view {
            ws.dispose_embedded(view);
        }
        ws.surface_mut().clear_children(session.content_node);
        ws.surface_mut().remove(session.modal_node);
        debug!("modal closed");
    }

    /// Keystrokes while the search input holds focus.
    pub fn handle_key<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        key: KeyEvent,
        now: Instant,
    ) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Down if shift => self.with_search(ws, |view, surface, _| {
                view.show_more_after(surface);
            }),
            KeyCode::Down => self.with_search(ws, |view, surface, _| view.focus_next(surface)),
            KeyCode::Up if shift => self.with_search(ws, |view, surface, _| {
                view.show_more_before(surface);
            }),
            KeyCode::Up => self.with_search(ws, |view, surface, _| view.focus_previous(surface)),
            KeyCode::Char('n') if ctrl => {
                self.with_search(ws, |view, surface, _| view.focus_next(surface));
            }
            KeyCode::Char('p') if ctrl => {
                self.with_search(ws, |view, surface, _| view.focus_previous(surface));
            }
            KeyCode::Left => self.with_search(ws, |view, surface, _| view.collapse_focused(surface)),
            KeyCode::Right if ctrl => {
                if let Some(file_leaf) = self.session.as_ref().and_then(|s| s.file_leaf) {
                    ws.set_active_leaf(file_leaf, true);
                }
            }
            KeyCode::Right => self.with_search(ws, |view, surface, _| view.expand_focused(surface)),
            KeyCode::Enter => self.handle_enter(ws, persist, ctrl, shift, alt, now)?,
            KeyCode::BackTab => self.close_preview(ws),
            KeyCode::Tab if shift => self.close_preview(ws),
            KeyCode::Tab => {
                if let Some((file, estate)) = self.focused_target(ws) {
                    self.preview(ws, file, estate)?;
                }
            }
            KeyCode::Char('e') if ctrl => self.toggle_preview_mode(ws),
            KeyCode::Char('g') if ctrl => {
                if let Some(file_leaf) = self.session.as_ref().and_then(|s| s.file_leaf) {
                    ws.set_active_leaf(file_leaf, true);
                }
            }
            KeyCode::Char('c' | 'C') if ctrl && shift => self.copy_focused(ws),
            KeyCode::Esc => self.close(ws, persist, now),
            _ => {}
        }
        Ok(())
    }

    /// Keystrokes while the preview pane holds focus: Ctrl+G and Ctrl+Tab
    /// hand focus back to the search input so the preview never traps it.
    pub fn handle_preview_key<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        key: KeyEvent,
    ) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('g') | KeyCode::Tab)
            && let Some(session) = &self.session
        {
            ws.set_active_leaf(session.search_leaf, true);
        }
    }

    /// Pointer handling inside the modal.
    ///
    /// With fewer than two visible results every click is ignored. While a
    /// preview is open, un-modified clicks on a result row re-target the
    /// preview instead of dismissing the modal; otherwise the click walks up
    /// from its target and dismisses the modal only if it lands on a result
    /// row proper (not its icon, hover button or collapse triangle).
    pub fn handle_click<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        target: NodeId,
        alt: bool,
        now: Instant,
    ) -> Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        let search_leaf = session.search_leaf;
        let search_container = session.search_container;
        let has_preview = session.file_leaf.is_some();

        let visible = ws
            .search_parts(search_leaf)
            .map_or(0, |parts| parts.view.visible_count(parts.surface));
        if visible < 2 {
            return Ok(());
        }

        if has_preview && !alt {
            if !ws.surface().contains(search_container, target) {
                return Ok(());
            }
            let mut clicked = None;
            if let Some(parts) = ws.search_parts(search_leaf) {
                if parts.surface.contains(parts.view.input_container, target)
                    || parts.surface.contains(parts.view.nav_header, target)
                {
                    return Ok(());
                }
                if let Some(index) = parts.view.item_index_at(parts.surface, target) {
                    let name = parts
                        .surface
                        .find_descendant(parts.view.items[index].node, "tree-item-inner")
                        .map(|inner| parts.surface.text(inner).to_string());
                    clicked = name.map(|n| (index, n));
                }
            }
            if let Some((index, name)) = clicked
                && let Some(file) = ws.vault().resolve_link(&name)
            {
                if let Some(parts) = ws.search_parts(search_leaf) {
                    parts.view.set_focused(parts.surface, Some(index));
                }
                self.preview(ws, file, None)?;
                ws.set_active_leaf(search_leaf, true);
            }
            return Ok(());
        }

        for node in ws.surface().ancestors(target) {
            let surface = ws.surface();
            if surface.has_class(node, "tree-item-icon")
                || surface.has_class(node, "search-result-hover-button")
                || surface.has_class(node, "right-triangle")
            {
                return Ok(());
            }
            if surface.has_class(node, "tree-item") {
                self.close(ws, persist, now);
                return Ok(());
            }
        }
        Ok(())
    }

    /// Open `file` in the preview pane, creating the pane on first use.
    ///
    /// Reentrant: with an existing pane the file is re-targeted in place;
    /// re-opening the same match offset jumps focus into the pane, a new
    /// offset keeps focus on the search input.
    pub fn preview<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        file: FileId,
        estate: Option<EphemeralState>,
    ) -> Result<()> {
        let Some(session) = &mut self.session else {
            return Ok(());
        };
        let offset = estate.as_ref().and_then(EphemeralState::first_offset);

        if let Some(file_leaf) = session.file_leaf {
            let same_match = offset.is_some() && offset == session.last_open_offset;
            session.last_open_offset = offset;
            let search_leaf = session.search_leaf;
            ws.open_file(file_leaf, file, estate, OpenFileOptions { active: false })?;
            if same_match {
                ws.set_active_leaf(file_leaf, true);
            } else {
                ws.set_active_leaf(search_leaf, true);
                ws.defer(Deferred::FocusSearchInput);
            }
            return Ok(());
        }

        let content_node = session.content_node;
        let modal_node = session.modal_node;
        let file_container = ws.surface_mut().create_div(content_node, "fs-modal-file");
        ws.surface_mut().add_class(file_container, "fs-content");
        ws.surface_mut().add_class(modal_node, MODAL_WIDE_CLASS);

        let (file_leaf, file_view) = ws.spawn_embedded_leaf(MAIN_WINDOW, file_container, true)?;
        ws.set_pinned(file_leaf, true);
        ws.open_file(file_leaf, file, estate, OpenFileOptions { active: false })?;

        if let Some(session) = self.session.as_mut() {
            session.file_leaf = Some(file_leaf);
            session.file_view = Some(file_view);
            session.file_container = Some(file_container);
            session.last_open_offset = offset;
            session.phase = ModalPhase::PreviewOpen;
            let search_leaf = session.search_leaf;
            ws.set_active_leaf(search_leaf, true);
        }
        Ok(())
    }

    /// Tear the preview pane down and return to the search-focused phase.
    pub fn close_preview<W: WorkspaceOps>(&mut self, ws: &mut PatchedWorkspace<W>) {
        let Some(session) = &mut self.session else {
            return;
        };
        let Some(view) = session.file_view.take() else {
            return;
        };
        session.file_leaf = None;
        session.last_open_offset = None;
        session.phase = ModalPhase::SearchFocused;
        let modal_node = session.modal_node;
        let container = session.file_container.take();
        let search_leaf = session.search_leaf;

        ws.dispose_embedded(view);
        ws.surface_mut().remove_class(modal_node, MODAL_WIDE_CLASS);
        if let Some(container) = container {
            ws.surface_mut().remove(container);
        }
        ws.set_active_leaf(search_leaf, true);
    }

    /// Drain the deferral queue. Every captured reference is re-checked
    /// against the live workspace: a fast close can outrun a continuation.
    pub fn run_deferred<W: WorkspaceOps>(&mut self, ws: &mut PatchedWorkspace<W>) {
        for action in ws.take_deferred() {
            match action {
                Deferred::FocusSearchInput => {
                    if let Some(session) = &self.session
                        && ws.leaf(session.search_leaf).is_some()
                    {
                        ws.set_active_leaf(session.search_leaf, true);
                    }
                }
                Deferred::RestoreRecentHook => ws.set_recent_suppressed(None),
                Deferred::CanvasZoom { leaf, match_text } => {
                    zoom_canvas_match(ws, leaf, &match_text);
                }
            }
        }
    }

    fn handle_enter<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        persist: &mut StatePersistence,
        ctrl: bool,
        shift: bool,
        alt: bool,
        now: Instant,
    ) -> Result<()> {
        let focused = self.focused_target(ws);

        if ctrl && shift && focused.is_none() {
            let query = self
                .session
                .as_ref()
                .and_then(|s| ws.search_parts(s.search_leaf))
                .map_or_else(String::new, |parts| parts.view.state().query.clone());
            let name = sanitize_note_name(&query);
            if name.trim().is_empty() {
                return Ok(());
            }
            let file = ws.vault_mut().open_or_create(&name);
            let target = ws.get_leaf()?;
            ws.open_file(target, file, None, OpenFileOptions { active: true })?;
            self.close(ws, persist, now);
            return Ok(());
        }

        let Some((file, estate)) = focused else {
            return Ok(());
        };
        let target = ws.get_leaf()?;
        ws.open_file(target, file, estate, OpenFileOptions { active: false })?;
        if alt {
            self.close(ws, persist, now);
        }
        Ok(())
    }

    fn toggle_preview_mode<W: WorkspaceOps>(&mut self, ws: &mut PatchedWorkspace<W>) {
        let Some(file_leaf) = self.session.as_ref().and_then(|s| s.file_leaf) else {
            return;
        };
        if let Some(view) = ws.file_view_mut(file_leaf) {
            view.toggle_mode();
        }
        ws.set_active_leaf(file_leaf, true);
        // focus returns to the input on the next tick, after the mode
        // switch has settled
        ws.defer(Deferred::FocusSearchInput);
    }

    fn copy_focused<W: WorkspaceOps>(&self, ws: &mut PatchedWorkspace<W>) {
        if let Some(text) = self.focused_text(ws) {
            copy_to_clipboard(&text);
        }
    }

    /// The focused result's rendered text: file name plus excerpt.
    #[must_use]
    pub fn focused_text<W: WorkspaceOps>(&self, ws: &mut PatchedWorkspace<W>) -> Option<String> {
        let session = self.session.as_ref()?;
        let parts = ws.search_parts(session.search_leaf)?;
        let item = parts.view.focused_item()?;
        let name = parts
            .surface
            .find_descendant(item.node, "tree-item-inner")
            .map_or_else(String::new, |inner| parts.surface.text(inner).to_string());
        Some(format!("{name}\n{}", item.excerpt))
    }

    fn focused_target<W: WorkspaceOps>(
        &self,
        ws: &mut PatchedWorkspace<W>,
    ) -> Option<(FileId, Option<EphemeralState>)> {
        let session = self.session.as_ref()?;
        let parts = ws.search_parts(session.search_leaf)?;
        let item = parts.view.focused_item()?;
        let file = item.file;
        Some((file, parts.view.focused_ephemeral()))
    }

    fn with_search<W, F>(&self, ws: &mut PatchedWorkspace<W>, f: F)
    where
        W: WorkspaceOps,
        F: FnOnce(
            &mut fsearch_host::SearchViewModel,
            &mut fsearch_host::Surface,
            &mut fsearch_host::Vault,
        ),
    {
        if let Some(session) = &self.session
            && let Some(parts) = ws.search_parts(session.search_leaf)
        {
            f(parts.view, parts.surface, parts.vault);
        }
    }
}

fn build_instructions(surface: &mut fsearch_host::Surface, modal_node: NodeId) -> NodeId {
    let instructions = surface.create_div(modal_node, "fs-modal-instructions");
    for (key, text) in INSTRUCTIONS {
        let row = surface.create_div(instructions, "fs-instruction");
        let key_node = surface.create_div(row, "fs-instruction-key");
        surface.set_text(key_node, key);
        let text_node = surface.create_div(row, "fs-instruction-text");
        surface.set_text(text_node, text);
    }
    instructions
}

fn zoom_canvas_match<W: WorkspaceOps>(
    ws: &mut PatchedWorkspace<W>,
    leaf: fsearch_host::LeafId,
    match_text: &str,
) {
    let Some(file) = ws.file_view(leaf).map(|v| v.file) else {
        return;
    };
    let node_id = ws.vault().file(file).and_then(|note| {
        note.canvas_nodes
            .iter()
            .find(|n| match_text.contains(n.text.as_str()) || n.text.contains(match_text))
            .map(|n| n.id.clone())
    });
    let Some(node_id) = node_id else {
        debug!("no canvas node matches {match_text:?}");
        return;
    };
    if let Some(view) = ws.file_view_mut(leaf) {
        view.canvas_selection = Some(node_id);
        view.zoomed = true;
    }
}

/// Replace filesystem-illegal characters so typed text can become a note
/// name.
#[must_use]
pub fn sanitize_note_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect()
}

fn copy_to_clipboard(text: &str) {
    let result = Command::new("wl-copy")
        .arg(text)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    if result.is_err() {
        let fallback = Command::new("xclip")
            .args(["-selection", "clipboard"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .and_then(|mut child| {
                use std::io::Write;
                if let Some(stdin) = child.stdin.as_mut() {
                    stdin.write_all(text.as_bytes())?;
                }
                child.wait()
            });
        if let Err(err) = fallback {
            warn!("clipboard copy failed: {err}");
        }
    }
}
