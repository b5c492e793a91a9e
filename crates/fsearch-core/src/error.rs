use fsearch_host::HostError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("failed to read {path}: {source}")]
    ReadSettings {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteSettings {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    ParseSettings(#[from] serde_json::Error),

    #[error("invalid uri: {0}")]
    Uri(String),

    #[error("no config directory available")]
    NoConfigDir,
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Uri(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
