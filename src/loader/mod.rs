//! # Schema loading
//!
//! Drives the [`SourceSet`] and the parser to build the full set of files
//! required to link the source path: every `.proto` under the source roots,
//! the transitive closure of their imports (searched across source roots
//! first, then proto roots), and the bundled descriptor definitions.
//!
//! Only files originating under source roots are eligible for code
//! generation; proto-path files participate in linking only.

pub mod descriptor;

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::debug;

use crate::core::Location;
use crate::parser::{self, ParseError, ast::FileNode};
use crate::source::{Filesystem, SourceError, SourceSet};

pub use descriptor::DESCRIPTOR_PROTO_PATH;

/// Errors raised while loading the file set.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No search root satisfies an import.
    #[error("unable to resolve import \"{import}\" (imported by {importer})")]
    ImportNotFound { import: String, importer: String },

    /// Two distinct roots provide the same import path in conflict.
    #[error("{path} is ambiguous: found in {first} and {second}")]
    DuplicatePath {
        path: String,
        first: Location,
        second: Location,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// The loaded file set: every parsed file plus the subset of import paths
/// that originated under source roots.
#[derive(Debug)]
pub struct LoadResult {
    pub files: Vec<FileNode>,
    pub source_paths: IndexSet<String>,
}

/// Loads the transitive file set for a configuration's source and proto
/// paths.
pub struct SchemaLoader<'fs> {
    fs: &'fs dyn Filesystem,
    source_path: Vec<Location>,
    proto_path: Vec<Location>,
}

impl<'fs> SchemaLoader<'fs> {
    pub fn new(
        fs: &'fs dyn Filesystem,
        source_path: Vec<Location>,
        proto_path: Vec<Location>,
    ) -> Self {
        Self {
            fs,
            source_path,
            proto_path,
        }
    }

    pub fn load(&self) -> Result<LoadResult, LoadError> {
        let sources = SourceSet::open(self.fs, &self.source_path)?;
        let protos = SourceSet::open(self.fs, &self.proto_path)?;

        // Keyed by import path; insertion order is enumeration order then
        // import discovery order, and is observable downstream.
        let mut loaded: IndexMap<String, FileNode> = IndexMap::new();
        let mut source_paths: IndexSet<String> = IndexSet::new();
        let mut queue: VecDeque<(String, Location)> = VecDeque::new();

        for (location, text) in sources.enumerate()? {
            let path = location.path().to_string();
            if let Some(existing) = loaded.get(&path) {
                return Err(LoadError::DuplicatePath {
                    path,
                    first: existing.location.clone(),
                    second: location,
                });
            }
            debug!(path = %location, "loading source file");
            let file = parser::parse_proto(&location, &text)?;
            enqueue_imports(&file, &mut queue);
            source_paths.insert(path.clone());
            loaded.insert(path, file);
        }

        while let Some((import, importer)) = queue.pop_front() {
            if loaded.contains_key(&import) {
                continue;
            }
            // Source roots shadow proto roots; within a tier the earlier
            // root wins.
            let located = match sources.locate(&import)? {
                Some(found) => Some(found),
                None => protos.locate(&import)?,
            };
            let (location, text) = match located {
                Some(found) => found,
                None if import == DESCRIPTOR_PROTO_PATH => {
                    let file = descriptor::bundled_descriptor()?;
                    loaded.insert(import.clone(), file);
                    continue;
                }
                None => {
                    return Err(LoadError::ImportNotFound {
                        import,
                        importer: importer.to_string(),
                    });
                }
            };
            debug!(path = %location, "loading imported file");
            let file = parser::parse_proto(&location, &text)?;
            enqueue_imports(&file, &mut queue);
            loaded.insert(import, file);
        }

        // The descriptor definitions load implicitly so option resolution
        // can proceed even when nothing imports them.
        if !loaded.contains_key(DESCRIPTOR_PROTO_PATH) {
            loaded.insert(
                DESCRIPTOR_PROTO_PATH.to_string(),
                descriptor::bundled_descriptor()?,
            );
        }

        debug!(
            files = loaded.len(),
            source_files = source_paths.len(),
            "load complete"
        );
        Ok(LoadResult {
            files: loaded.into_values().collect(),
            source_paths,
        })
    }
}

fn enqueue_imports(file: &FileNode, queue: &mut VecDeque<(String, Location)>) {
    for import in &file.imports {
        queue.push_back((import.path.clone(), file.location.clone()));
    }
}
