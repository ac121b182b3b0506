use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort loading a graph document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not find file {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("invalid JSON format in {}: {source}", path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::FileNotFound { path }
            | LoadError::MalformedInput { path, .. }
            | LoadError::Io { path, .. } => path,
        }
    }
}
