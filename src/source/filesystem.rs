//! Filesystem abstraction.
//!
//! The core opens files read-only and never writes; injecting the filesystem
//! keeps the pipeline a pure transformation from configuration + input to
//! backend callbacks, and lets tests substitute fixtures.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::SourceError;

/// Read-only filesystem interface consumed by the core.
///
/// Archives are zip-format containers; [`Filesystem::is_archive`] decides
/// which paths are treated as such. Path separators inside archives are
/// always forward slashes regardless of platform.
pub trait Filesystem {
    /// Open a file for reading.
    fn open(&self, path: &Path) -> Result<Box<dyn Read>, SourceError>;

    /// List every regular file transitively under `path`, in a stable order.
    fn list(&self, path: &Path) -> Result<Vec<PathBuf>, SourceError>;

    fn is_directory(&self, path: &Path) -> bool;

    fn is_archive(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;

    /// Read a file to a string, tracking the path in any error.
    fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        let mut text = String::new();
        self.open(path)?
            .read_to_string(&mut text)
            .map_err(|e| SourceError::io(path.to_string_lossy(), e))?;
        Ok(text)
    }

    /// Read a file to a byte vector, tracking the path in any error.
    fn read_to_bytes(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let mut bytes = Vec::new();
        self.open(path)?
            .read_to_end(&mut bytes)
            .map_err(|e| SourceError::io(path.to_string_lossy(), e))?;
        Ok(bytes)
    }
}

/// The standard library filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Read>, SourceError> {
        let file = File::open(path).map_err(|e| SourceError::io(path.to_string_lossy(), e))?;
        Ok(Box::new(file))
    }

    fn list(&self, path: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let mut files = Vec::new();
        // Sorted traversal keeps enumeration order stable across platforms
        // and runs.
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                SourceError::io(path.to_string_lossy(), io)
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_archive(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("zip") | Some("jar")
        ) && path.is_file()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
