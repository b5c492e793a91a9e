//! Floating search overlay for a pane-based note-taking host.
//!
//! The overlay embeds the host's own search view in a floating modal,
//! intercepts the handful of workspace behaviors that would otherwise
//! fight the embedded leaves, and remembers the search state across
//! sessions. [`Overlay`] ties the pieces together; the host is reached
//! exclusively through [`fsearch_host::WorkspaceOps`].

pub mod commands;
pub mod embed;
pub mod error;
pub mod modal;
pub mod patch;
pub mod persist;
pub mod settings;
pub mod uri;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};

use crate::commands::Command;
use crate::modal::{ModalController, OpenSeed};
use crate::patch::PatchedWorkspace;
use crate::patch::search_view::{SearchViewBridge, SetStateOutcome};
use crate::persist::StatePersistence;
use crate::settings::{Directories, Settings};
use crossterm::event::KeyEvent;
use fsearch_host::{LeafId, NodeId, WorkspaceOps};
use fsearch_types::{SearchState, StatePatch, ViewKind};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

pub struct Overlay {
    pub settings: Settings,
    pub persist: StatePersistence,
    pub bridge: SearchViewBridge,
    pub modal: ModalController,
    settings_path: PathBuf,
}

impl Overlay {
    pub fn load(dirs: &Directories) -> Result<Self> {
        let settings = Settings::load(&dirs.settings_file)?;
        info!("loaded settings from {}", dirs.settings_file.display());
        Ok(Self::with_settings(settings, dirs.settings_file.clone()))
    }

    #[must_use]
    pub fn with_settings(settings: Settings, settings_path: PathBuf) -> Self {
        let persist = StatePersistence::new(settings.search.clone());
        Self {
            settings,
            persist,
            bridge: SearchViewBridge::new(),
            modal: ModalController::new(),
            settings_path,
        }
    }

    pub fn open_modal<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        seed: OpenSeed,
        now: Instant,
    ) -> Result<()> {
        self.modal
            .open(ws, &mut self.persist, &self.settings, seed, now)
    }

    pub fn close_modal<W: WorkspaceOps>(&mut self, ws: &mut PatchedWorkspace<W>, now: Instant) {
        self.modal.close(ws, &mut self.persist, now);
    }

    pub fn handle_key<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        key: KeyEvent,
        now: Instant,
    ) -> Result<()> {
        self.modal.handle_key(ws, &mut self.persist, key, now)
    }

    pub fn handle_click<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        target: NodeId,
        alt: bool,
        now: Instant,
    ) -> Result<()> {
        self.modal
            .handle_click(ws, &mut self.persist, target, alt, now)
    }

    pub fn run_command<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        command: Command,
        now: Instant,
    ) -> Result<()> {
        commands::dispatch(self, ws, command, now)
    }

    pub fn handle_uri<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        uri: &str,
        now: Instant,
    ) -> Result<()> {
        let request = uri::parse(uri)?;
        match request.view {
            ViewKind::Modal => self.open_modal(ws, OpenSeed::Query(request.query), now),
            kind => {
                let state = self
                    .persist
                    .state()
                    .merged(&StatePatch::query(request.query));
                commands::open_search_pane(ws, kind, state).map(|_| ())
            }
        }
    }

    /// A host search view asked to load `state`. Applied in place for the
    /// session-restore load; later external loads reopen in the modal.
    pub fn handle_search_request<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        leaf: LeafId,
        state: SearchState,
        self_triggered: bool,
        now: Instant,
    ) -> Result<()> {
        match self.bridge.set_state(ws, leaf, state, self_triggered) {
            SetStateOutcome::Applied => Ok(()),
            SetStateOutcome::Redirected(state) => {
                self.open_modal(ws, OpenSeed::Patch(state.as_patch()), now)
            }
        }
    }

    pub fn on_layout_change<W: WorkspaceOps>(&mut self, ws: &mut PatchedWorkspace<W>) {
        self.bridge.on_layout_change(ws);
    }

    /// One cooperative tick: drain deferred continuations, then poll the
    /// persistence timers and write settings out when the save window
    /// elapses.
    pub fn tick<W: WorkspaceOps>(
        &mut self,
        ws: &mut PatchedWorkspace<W>,
        now: Instant,
    ) -> Result<()> {
        self.modal.run_deferred(ws);
        let events = self.persist.tick(now);
        if events.save {
            self.settings.search = self.persist.state().clone();
            self.settings.save(&self.settings_path)?;
        }
        Ok(())
    }
}
