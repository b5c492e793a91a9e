//! Test module for fsearch-core
//!
//! Covers:
//! - Workspace interception (leaf targeting, enumeration fallback, MRU
//!   shielding, undo shielding, recent-file suppression)
//! - Modal lifecycle, keyboard state machine and pointer handling
//! - Preview pane creation, re-targeting and teardown
//! - Search-view patch installation and state mirroring
//! - Canvas match bridging
//! - Commands and URI entry points

mod bridge_tests;
mod fixtures;
mod patch_tests;
