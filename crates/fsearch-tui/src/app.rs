//! Terminal application state: a patched workspace over a vault loaded from
//! disk, plus the overlay driving it.

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fsearch_core::Overlay;
use fsearch_core::modal::OpenSeed;
use fsearch_core::patch::PatchedWorkspace;
use fsearch_host::Workspace;
use std::path::Path;
use std::time::Instant;
use tracing::info;

pub struct App {
    pub ws: PatchedWorkspace<Workspace>,
    pub overlay: Overlay,
    pub should_quit: bool,
}

impl App {
    pub fn new(overlay: Overlay, workspace: Workspace) -> Self {
        Self {
            ws: PatchedWorkspace::new(workspace),
            overlay,
            should_quit: false,
        }
    }

    pub fn open_modal(&mut self) -> Result<()> {
        self.overlay
            .open_modal(&mut self.ws, OpenSeed::Resume, Instant::now())?;
        // The fresh search leaf is a layout change as far as the bridge is
        // concerned; the first open also ends the restore phase.
        self.overlay.on_layout_change(&mut self.ws);
        self.overlay.bridge.mark_layout_ready();
        Ok(())
    }

    /// Route a key press: plain text edits the query, everything else goes
    /// through the modal's state machine.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let now = Instant::now();
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        if !self.overlay.modal.is_open() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Enter | KeyCode::Char('/') => self.open_modal()?,
                _ => {}
            }
            return Ok(());
        }

        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(c) if plain => {
                self.edit_query(now, |query| query.push(c));
                return Ok(());
            }
            KeyCode::Backspace if plain => {
                self.edit_query(now, |query| {
                    query.pop();
                });
                return Ok(());
            }
            _ => {}
        }

        self.overlay.handle_key(&mut self.ws, key, now)?;
        // the key may have torn leaves down or spawned the preview
        self.overlay.on_layout_change(&mut self.ws);
        Ok(())
    }

    pub fn tick(&mut self, now: Instant) -> Result<()> {
        self.overlay.tick(&mut self.ws, now)?;
        Ok(())
    }

    fn edit_query(&mut self, now: Instant, edit: impl FnOnce(&mut String)) {
        use fsearch_host::WorkspaceOps;
        let Some(leaf) = self.overlay.modal.session().map(|s| s.search_leaf) else {
            return;
        };
        let Some(parts) = self.ws.search_parts(leaf) else {
            return;
        };
        let mut query = parts.view.state().query.clone();
        edit(&mut query);
        self.overlay
            .bridge
            .set_query(&mut self.ws, &mut self.overlay.persist, leaf, &query, now);
    }
}

/// Load every markdown file under `dir` into a fresh workspace vault.
pub fn load_workspace(dir: &Path) -> Result<Workspace> {
    let mut workspace = Workspace::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries =
            std::fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                if !entry.file_name().to_string_lossy().starts_with('.') {
                    pending.push(path);
                }
            } else if path.extension().is_some_and(|ext| ext == "md") {
                let name = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                workspace.vault.add_markdown(&name, &content);
            }
        }
    }
    info!("loaded {} notes from {}", workspace.vault.len(), dir.display());
    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsearch_core::settings::Settings;

    fn test_app() -> App {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Alpha.md"), "a needle here").unwrap();
        std::fs::write(dir.path().join("Beta.md"), "another needle").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let workspace = load_workspace(dir.path()).unwrap();
        let overlay = Overlay::with_settings(
            Settings::default(),
            dir.path().join("settings.json"),
        );
        App::new(overlay, workspace)
    }

    #[test]
    fn test_load_workspace_skips_non_markdown() {
        use fsearch_host::WorkspaceOps;
        let app = test_app();
        assert_eq!(app.ws.vault().len(), 2);
    }

    #[test]
    fn test_typing_edits_query() {
        use fsearch_host::WorkspaceOps;
        let mut app = test_app();
        app.open_modal().unwrap();

        for c in "needle".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
        let leaf = app.overlay.modal.session().unwrap().search_leaf;
        let parts = app.ws.search_parts(leaf).unwrap();
        assert_eq!(parts.view.state().query, "needle");
        assert_eq!(parts.view.items.len(), 2);

        app.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE))
            .unwrap();
        let leaf = app.overlay.modal.session().unwrap().search_leaf;
        let parts = app.ws.search_parts(leaf).unwrap();
        assert_eq!(parts.view.state().query, "needl");
    }

    #[test]
    fn test_open_modal_installs_bridge() {
        let mut app = test_app();
        assert!(app.overlay.bridge.installed_on().is_none());

        app.open_modal().unwrap();
        let leaf = app.overlay.modal.session().unwrap().search_leaf;
        assert_eq!(app.overlay.bridge.installed_on(), Some(leaf));
        assert!(app.overlay.bridge.layout_ready());
    }

    #[test]
    fn test_typing_mirrors_into_persistence() {
        let mut app = test_app();
        app.open_modal().unwrap();

        for c in "abc".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
        assert_eq!(app.overlay.persist.state().query, "abc");
        assert!(app.overlay.persist.save_pending());
    }

    #[test]
    fn test_quit_paths() {
        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))
            .unwrap();
        assert!(app.should_quit);

        let mut app = test_app();
        app.open_modal().unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_esc_closes_modal_then_quits() {
        let mut app = test_app();
        app.open_modal().unwrap();

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(!app.overlay.modal.is_open());
        assert!(!app.should_quit);

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(app.should_quit);
    }
}
