use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Connectivity failure, timeout, non-2xx status or malformed JSON from the server.
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Short tag reported to the shell alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Network(_) => "network",
            CoreError::Parse { .. } => "parse",
            CoreError::Io { .. } => "io",
            CoreError::StorageWrite { .. } => "storage",
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return CoreError::Network(format!("request timed out: {err}"));
        }
        CoreError::Network(err.to_string())
    }
}
