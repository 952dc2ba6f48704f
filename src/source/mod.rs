//! # Source access
//!
//! A uniform read interface over a user-supplied ordered list of search
//! roots. Each root is a filesystem directory, a zip archive, or a single
//! `.proto` file. When multiple roots contain the same import path, the
//! earlier root wins; this ordering is user-visible in diagnostics and is
//! preserved deterministically.

pub mod filesystem;
pub mod source_set;

pub use filesystem::{Filesystem, StdFilesystem};
pub use source_set::SourceSet;

use thiserror::Error;

/// Errors raised while reading search roots.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Filesystem read failure.
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Zip archive failure.
    #[error("archive error in {archive}: {message}")]
    Archive { archive: String, message: String },

    /// A configured root does not exist.
    #[error("search root not found: {root}")]
    RootNotFound { root: String },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(archive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Archive {
            archive: archive.into(),
            message: message.into(),
        }
    }
}
