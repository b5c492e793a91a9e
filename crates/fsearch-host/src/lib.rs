//! In-memory model of the note-taking host application.
//!
//! The overlay treats the host as an external collaborator: it provides the
//! searchable vault, the search/file views, and the workspace of leaves.
//! [`workspace::WorkspaceOps`] is the capability surface the overlay's
//! interception layer decorates.

pub mod error;
pub mod surface;
pub mod vault;
pub mod views;
pub mod workspace;

pub use error::{HostError, HostResult};
pub use surface::{NodeId, Surface};
pub use vault::{CanvasNode, FileId, FileKind, NoteFile, SearchHit, Vault};
pub use views::{FileViewMode, FileViewModel, ResultItem, SearchViewModel};
pub use workspace::{
    HistoryEntry, IterScope, LayoutOp, Leaf, LeafId, MAIN_WINDOW, OpenFileOptions, SearchParts,
    View, WindowId, Workspace, WorkspaceOps,
};
