//! The backend interface the dispatcher consumes.

use thiserror::Error;

use crate::schema::{Schema, TypeId};
use crate::source::Filesystem;

use super::logger::Logger;

/// Errors raised by a target's handler.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Logged; dispatch continues with subsequent declarations.
    #[error("generation failed: {0}")]
    Recoverable(String),

    /// Aborts the run.
    #[error("generation aborted: {0}")]
    Fatal(String),
}

/// Receives the declarations a target claimed, one call per declaration.
///
/// Handlers may not mutate the schema; they observe it only through the
/// shared reference passed to each call.
pub trait TypeHandler {
    fn handle(&mut self, schema: &Schema, id: TypeId) -> Result<(), GenerationError>;
}

/// A code-generation backend paired with its element-selection rules.
pub trait Target {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Rule strings selecting the declarations this target claims.
    /// An empty list claims everything left.
    fn elements(&self) -> &[String];

    /// Create the handler that will receive this run's claimed
    /// declarations.
    fn new_handler(
        &self,
        schema: &Schema,
        fs: &dyn Filesystem,
        logger: &dyn Logger,
    ) -> Box<dyn TypeHandler>;
}
