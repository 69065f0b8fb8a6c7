//! Error types for cal-header

use std::path::PathBuf;

/// Result type for cal-header operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting headers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} header at {path}: {message}")]
    Format {
        path: PathBuf,
        format: String,
        message: String,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(
        path: impl Into<PathBuf>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            path: path.into(),
            format: format.into(),
            message: message.into(),
        }
    }
}
