//! # Target dispatch
//!
//! Routes each source-set declaration to at most one code-generation
//! backend. Targets claim declarations in configuration order; a
//! declaration claimed by an earlier target is never offered to a later
//! one, and leftovers after the last target are silently skipped.

pub mod dispatcher;
pub mod logger;
pub mod target;

pub use dispatcher::{DispatchError, DispatchSummary, TargetDispatcher};
pub use logger::{Level, Logger, MemoryLogger, TracingLogger};
pub use target::{GenerationError, Target, TypeHandler};
