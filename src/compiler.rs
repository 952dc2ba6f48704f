//! The pipeline driver.
//!
//! [`SchemaCompiler`] owns the run configuration and executes the passes in
//! order: load, link, prune, dispatch. It is a non-consuming builder; one
//! configuration can drive several runs.

use tracing::debug;

use crate::core::Location;
use crate::dispatch::{DispatchSummary, Logger, Target, TargetDispatcher};
use crate::error::CompilerError;
use crate::linker;
use crate::loader::SchemaLoader;
use crate::schema::Schema;
use crate::shake::{IdentifierSet, Pruner};
use crate::source::Filesystem;

/// Configuration for one compilation run.
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    source_path: Vec<Location>,
    proto_path: Vec<Location>,
    tree_shaking_roots: Vec<String>,
    tree_shaking_rubbish: Vec<String>,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root to load and generate from.
    pub fn source_path(mut self, root: Location) -> Self {
        self.source_path.push(root);
        self
    }

    /// Add a root loaded for import resolution only.
    pub fn proto_path(mut self, root: Location) -> Self {
        self.proto_path.push(root);
        self
    }

    /// Add a tree-shaking root rule. When none are configured, everything
    /// is a root.
    pub fn tree_shaking_root(mut self, rule: impl Into<String>) -> Self {
        self.tree_shaking_roots.push(rule.into());
        self
    }

    /// Add a tree-shaking exclusion rule.
    pub fn tree_shaking_rubbish(mut self, rule: impl Into<String>) -> Self {
        self.tree_shaking_rubbish.push(rule.into());
        self
    }

    /// Load, link, and prune, reporting unused-rule diagnostics.
    ///
    /// Returns the pruned schema plus the set of source-set paths eligible
    /// for dispatch.
    pub fn compile(
        &self,
        fs: &dyn Filesystem,
        logger: &dyn Logger,
    ) -> Result<CompiledSchema, CompilerError> {
        let loaded = SchemaLoader::new(fs, self.source_path.clone(), self.proto_path.clone())
            .load()?;
        let source_paths = loaded.source_paths;
        let schema = linker::link(loaded.files)?;
        debug!(
            files = schema.files().len(),
            decls = schema.decl_count(),
            "schema linked"
        );

        // Default roots with no rubbish keep everything: the pruner is
        // bypassed entirely.
        let defaulted = self.tree_shaking_roots.is_empty()
            || self.tree_shaking_roots == ["*"];
        if defaulted && self.tree_shaking_rubbish.is_empty() {
            return Ok(CompiledSchema {
                schema,
                source_paths,
            });
        }

        let mut rules =
            IdentifierSet::new(&self.tree_shaking_roots, &self.tree_shaking_rubbish)?;
        let pruned = Pruner::new(&schema, &mut rules).prune()?;
        for rule in rules.unused_includes() {
            logger.info(&format!("Unused element in treeShakingRoots: {rule}"));
        }
        for rule in rules.unused_excludes() {
            logger.info(&format!("Unused element in treeShakingRubbish: {rule}"));
        }

        Ok(CompiledSchema {
            schema: pruned,
            source_paths,
        })
    }

    /// Full run: compile, then dispatch the source-set declarations to the
    /// configured targets.
    pub fn run(
        &self,
        fs: &dyn Filesystem,
        logger: &dyn Logger,
        targets: &[Box<dyn Target>],
    ) -> Result<(CompiledSchema, DispatchSummary), CompilerError> {
        let compiled = self.compile(fs, logger)?;
        let summary = TargetDispatcher::new(&compiled.schema, &compiled.source_paths)
            .dispatch(targets, fs, logger)
            .map_err(CompilerError::from)?;
        Ok((compiled, summary))
    }
}

/// A compiled schema plus the source-set paths eligible for dispatch.
#[derive(Debug)]
pub struct CompiledSchema {
    pub schema: Schema,
    pub source_paths: indexmap::IndexSet<String>,
}

impl CompiledSchema {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
