//! Shared builders for overlay tests.

use crate::Overlay;
use crate::patch::PatchedWorkspace;
use crate::settings::Settings;
use fsearch_host::{CanvasNode, FileId, Workspace};
use std::path::PathBuf;

/// A patched workspace over a vault with three markdown notes.
pub fn patched_workspace() -> (PatchedWorkspace<Workspace>, FileId, FileId, FileId) {
    let mut inner = Workspace::new();
    let alpha = inner.vault.add_markdown("Alpha", "a needle here");
    let beta = inner.vault.add_markdown("Beta", "another needle there");
    let gamma = inner.vault.add_markdown("Gamma", "links to [[Alpha]]");
    (PatchedWorkspace::new(inner), alpha, beta, gamma)
}

/// Like [`patched_workspace`] but with a canvas note holding two nodes.
pub fn workspace_with_canvas() -> (PatchedWorkspace<Workspace>, FileId) {
    let mut inner = Workspace::new();
    inner.vault.add_markdown("Alpha", "a needle here");
    let canvas = inner.vault.add_canvas(
        "Board",
        vec![
            CanvasNode {
                id: "node-1".to_string(),
                text: "nothing relevant".to_string(),
            },
            CanvasNode {
                id: "node-2".to_string(),
                text: "a needle in a canvas".to_string(),
            },
        ],
    );
    (PatchedWorkspace::new(inner), canvas)
}

/// An overlay whose settings file lives in a temp dir kept alive by the
/// returned guard.
pub fn overlay() -> (Overlay, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let overlay = Overlay::with_settings(Settings::default(), settings_path(&dir));
    (overlay, dir)
}

pub fn settings_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("settings.json")
}
