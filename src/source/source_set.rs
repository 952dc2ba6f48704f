//! Search roots and the [`SourceSet`].

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::core::Location;

use super::{Filesystem, SourceError};

/// One search root: a directory walked recursively, a zip archive walked as
/// an entry tree, or a single file yielding itself.
#[derive(Debug, Clone)]
enum Root {
    Directory { base: String },
    Archive { base: String },
    File { base: String, path: String },
}

/// An ordered list of search roots presenting a uniform read interface.
///
/// Lookup order is the configuration order: when multiple roots contain the
/// same import path, the earlier root wins.
pub struct SourceSet<'fs> {
    fs: &'fs dyn Filesystem,
    roots: Vec<Root>,
}

impl<'fs> SourceSet<'fs> {
    /// Open a source set over the given root locations.
    ///
    /// A location with an empty path names the root itself and is classified
    /// by probing the filesystem; a location with both parts is the explicit
    /// `(base, path)` form for a single file under a known root.
    pub fn open(fs: &'fs dyn Filesystem, roots: &[Location]) -> Result<Self, SourceError> {
        let mut resolved = Vec::with_capacity(roots.len());
        for location in roots {
            resolved.push(Self::classify(fs, location)?);
        }
        Ok(Self {
            fs,
            roots: resolved,
        })
    }

    fn classify(fs: &dyn Filesystem, location: &Location) -> Result<Root, SourceError> {
        if !location.path().is_empty() {
            let full = join(location.base(), location.path());
            if !fs.exists(&full) {
                return Err(SourceError::RootNotFound {
                    root: location.to_string(),
                });
            }
            return Ok(Root::File {
                base: location.base().to_string(),
                path: location.path().to_string(),
            });
        }

        let base = location.base();
        let base_path = Path::new(base);
        if fs.is_directory(base_path) {
            Ok(Root::Directory {
                base: base.to_string(),
            })
        } else if fs.is_archive(base_path) {
            Ok(Root::Archive {
                base: base.to_string(),
            })
        } else if fs.exists(base_path) {
            // A bare file given as a root: its base is the parent directory
            // and only the file itself is visible. Imports living next to it
            // must be put on the proto path explicitly.
            let parent = base_path
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = base_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| base.to_string());
            Ok(Root::File { base: parent, path: name })
        } else {
            Err(SourceError::RootNotFound {
                root: base.to_string(),
            })
        }
    }

    /// Number of configured roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find `import_path` under the first root that contains it.
    ///
    /// Returns `Ok(None)` when no root contains the path; the caller attaches
    /// importer context to that case.
    pub fn locate(&self, import_path: &str) -> Result<Option<(Location, String)>, SourceError> {
        for root in &self.roots {
            match root {
                Root::Directory { base } => {
                    let full = join(base, import_path);
                    if self.fs.exists(&full) && !self.fs.is_directory(&full) {
                        let text = self.fs.read_to_string(&full)?;
                        return Ok(Some((Location::get(base.clone(), import_path), text)));
                    }
                }
                Root::Archive { base } => {
                    if let Some(text) = self.read_archive_entry(base, import_path)? {
                        return Ok(Some((Location::get(base.clone(), import_path), text)));
                    }
                }
                Root::File { base, path } => {
                    if path == import_path {
                        let text = self.fs.read_to_string(&join(base, path))?;
                        return Ok(Some((Location::get(base.clone(), path.clone()), text)));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Enumerate every `.proto` file transitively under every root.
    ///
    /// Directories are walked recursively in sorted order, archives in entry
    /// order, single-file roots yield themselves. The result order is the
    /// root configuration order and is stable across runs.
    pub fn enumerate(&self) -> Result<Vec<(Location, String)>, SourceError> {
        let mut found = Vec::new();
        for root in &self.roots {
            match root {
                Root::Directory { base } => {
                    let base_path = Path::new(base);
                    for file in self.fs.list(base_path)? {
                        if file.extension().and_then(|e| e.to_str()) != Some("proto") {
                            continue;
                        }
                        let rel = relative_slash_path(base_path, &file);
                        let text = self.fs.read_to_string(&file)?;
                        found.push((Location::get(base.clone(), rel), text));
                    }
                }
                Root::Archive { base } => {
                    self.enumerate_archive(base, &mut found)?;
                }
                Root::File { base, path } => {
                    let text = self.fs.read_to_string(&join(base, path))?;
                    found.push((Location::get(base.clone(), path.clone()), text));
                }
            }
        }
        Ok(found)
    }

    /// Read a single entry out of a zip root, releasing the archive before
    /// returning on every path.
    fn read_archive_entry(
        &self,
        archive_path: &str,
        entry_path: &str,
    ) -> Result<Option<String>, SourceError> {
        let bytes = self.fs.read_to_bytes(Path::new(archive_path))?;
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| SourceError::archive(archive_path, format!("failed to open: {e}")))?;
        let mut entry = match archive.by_name(entry_path) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(SourceError::archive(
                    archive_path,
                    format!("failed to read {entry_path}: {e}"),
                ));
            }
        };
        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|e| SourceError::archive(archive_path, format!("failed to read {entry_path}: {e}")))?;
        Ok(Some(text))
    }

    fn enumerate_archive(
        &self,
        archive_path: &str,
        found: &mut Vec<(Location, String)>,
    ) -> Result<(), SourceError> {
        let bytes = self.fs.read_to_bytes(Path::new(archive_path))?;
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| SourceError::archive(archive_path, format!("failed to open: {e}")))?;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| SourceError::archive(archive_path, format!("failed to read entry {i}: {e}")))?;
            if !entry.is_file() || !entry.name().ends_with(".proto") {
                continue;
            }
            let name = entry.name().to_string();
            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .map_err(|e| SourceError::archive(archive_path, format!("failed to read {name}: {e}")))?;
            found.push((Location::get(archive_path, name), text));
        }
        Ok(())
    }
}

/// Join a base directory and a forward-slash import path into a platform path.
fn join(base: &str, import_path: &str) -> PathBuf {
    let mut full = PathBuf::from(base);
    for segment in import_path.split('/').filter(|s| !s.is_empty()) {
        full.push(segment);
    }
    full
}

/// The path of `file` relative to `base`, with forward slashes.
fn relative_slash_path(base: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(base).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
