//! Core of a Protocol Buffers schema compiler.
//!
//! protolink ingests a set of `.proto` source files, links their declarations
//! into a validated schema, optionally prunes that schema to a requested
//! subset, and hands the surviving declarations to one or more
//! code-generation backends.
//!
//! The pipeline runs as a straight sequence of passes:
//!
//! ```text
//! SourceSet -> ProtoParser -> SchemaLoader -> Linker -> Pruner -> TargetDispatcher
//! ```
//!
//! - [`source`] presents a uniform read interface over an ordered list of
//!   search roots (directories, zip archives, single files).
//! - [`parser`] lexes and parses one `.proto` text into a syntax tree.
//! - [`loader`] resolves imports transitively across the source and proto
//!   paths.
//! - [`linker`] binds every type reference, extension, and option, and
//!   enforces schema validity.
//! - [`shake`] matches qualified names against include/exclude rules and
//!   prunes the schema to the transitive closure of reachable declarations.
//! - [`dispatch`] routes each surviving declaration to at most one backend.
//!
//! [`compiler::SchemaCompiler`] owns the configuration and drives the passes
//! in order:
//!
//! ```no_run
//! use protolink::compiler::SchemaCompiler;
//! use protolink::core::Location;
//! use protolink::dispatch::TracingLogger;
//! use protolink::source::StdFilesystem;
//!
//! let schema = SchemaCompiler::new()
//!     .source_path(Location::root("src/main/proto"))
//!     .proto_path(Location::root("third_party/proto"))
//!     .compile(&StdFilesystem, &TracingLogger)?;
//! # Ok::<(), protolink::CompilerError>(())
//! ```

pub mod compiler;
pub mod core;
pub mod dispatch;
pub mod linker;
pub mod loader;
pub mod parser;
pub mod schema;
pub mod shake;
pub mod source;

mod error;

pub use compiler::SchemaCompiler;
pub use error::CompilerError;
pub use schema::{Schema, TypeId};
