//! The "first target claims the type" dispatch loop.

use indexmap::IndexSet;
use tracing::debug;

use crate::schema::{FileId, Schema, TypeId};
use crate::shake::{ConfigError, IdentifierSet};
use crate::source::Filesystem;

use super::logger::Logger;
use super::target::{GenerationError, Target};

/// What happened in a dispatch run: per target, the declarations it
/// claimed; plus the declarations no target wanted.
#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub claimed: Vec<(String, Vec<TypeId>)>,
    pub skipped: Vec<TypeId>,
}

/// Routes each source-set declaration to at most one target.
pub struct TargetDispatcher<'s> {
    schema: &'s Schema,
    /// Source-set declarations in declaration order: file enumeration
    /// order, then pre-order within each file. Stable across runs.
    remaining: Vec<TypeId>,
}

impl<'s> TargetDispatcher<'s> {
    pub fn new(schema: &'s Schema, source_paths: &IndexSet<String>) -> Self {
        let mut remaining = Vec::new();
        for (i, file) in schema.files().iter().enumerate() {
            if !source_paths.contains(file.location.path()) {
                continue;
            }
            for id in schema.file_decls(FileId::new(i)) {
                // Synthetic map entries are carried by their field, never
                // emitted as standalone types.
                if !schema.get(id).is_map_entry() {
                    remaining.push(id);
                }
            }
        }
        Self { schema, remaining }
    }

    /// Run every target in configuration order.
    ///
    /// A recoverable handler error is logged and dispatch continues; a
    /// fatal one aborts. Rules that never fired are reported through the
    /// logger as `Unused element in target elements`.
    pub fn dispatch(
        mut self,
        targets: &[Box<dyn Target>],
        fs: &dyn Filesystem,
        logger: &dyn Logger,
    ) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        for target in targets {
            let mut rules = IdentifierSet::new(target.elements(), &[])
                .map_err(DispatchError::Config)?;
            let mut handler = target.new_handler(self.schema, fs, logger);

            let mut claimed = Vec::new();
            let mut leftover = Vec::with_capacity(self.remaining.len());
            for id in std::mem::take(&mut self.remaining) {
                if rules.includes_type(self.schema.get(id).qualified_name()) {
                    claimed.push(id);
                } else {
                    leftover.push(id);
                }
            }
            self.remaining = leftover;

            debug!(
                name = target.name(),
                claimed = claimed.len(),
                remaining = self.remaining.len(),
                "dispatching"
            );

            for &id in &claimed {
                match handler.handle(self.schema, id) {
                    Ok(()) => {}
                    Err(GenerationError::Recoverable(message)) => {
                        logger.error(&format!(
                            "{}: failed to generate {}: {message}",
                            target.name(),
                            self.schema.get(id).qualified_name()
                        ));
                    }
                    Err(fatal @ GenerationError::Fatal(_)) => {
                        return Err(DispatchError::Generation(fatal));
                    }
                }
            }

            for rule in rules.unused_includes() {
                logger.info(&format!("Unused element in target elements: {rule}"));
            }
            summary.claimed.push((target.name().to_string(), claimed));
        }

        // Whatever no target wanted is silently skipped.
        summary.skipped = self.remaining;
        Ok(summary)
    }
}

/// Errors that abort a dispatch run.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(GenerationError),
}
