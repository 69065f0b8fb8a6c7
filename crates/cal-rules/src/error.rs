//! Error types for cal-rules

use std::path::PathBuf;

/// Result type for cal-rules operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while selecting or resolving rule documents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule document {document}: {message}")]
    Parse { document: String, message: String },

    #[error("No entry for {key:?} in {table} of {document}")]
    Lookup {
        document: String,
        table: &'static str,
        key: String,
    },

    #[error("Rule document {document} references undefined {kind} {name:?}")]
    Integrity {
        document: String,
        kind: &'static str,
        name: String,
    },

    #[error("Failed determining reftypes for EXP_TYPE={exp_type} CAL_VER={cal_ver}")]
    Resolve {
        exp_type: String,
        cal_ver: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Wrap `source` with the exposure-type/version context of a failed
    /// top-level resolution.
    pub fn resolve(exp_type: impl Into<String>, cal_ver: impl Into<String>, source: Error) -> Self {
        Self::Resolve {
            exp_type: exp_type.into(),
            cal_ver: cal_ver.into(),
            source: Box::new(source),
        }
    }
}
