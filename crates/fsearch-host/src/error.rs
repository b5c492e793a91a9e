use thiserror::Error;

use crate::workspace::{LeafId, WindowId};

#[derive(Error, Debug)]
pub enum HostError {
    #[error("leaf not found: {0:?}")]
    LeafNotFound(LeafId),

    #[error("window not found: {0:?}")]
    WindowNotFound(WindowId),

    #[error("leaf {0:?} has no search view")]
    NotASearchView(LeafId),

    #[error("leaf {0:?} has no file view")]
    NotAFileView(LeafId),

    #[error("file not found: {0}")]
    FileNotFound(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;
