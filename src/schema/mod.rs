//! # Linked schema model
//!
//! Messages may reference themselves and each other recursively, so the
//! schema is not a pointer-linked graph: it is an arena. All declarations
//! live in a flat vector, a map takes qualified names to arena indices, and
//! type references are indices after linking. Traversal is safe, cloning for
//! the pruner is cheap, and owning references form no cycles.

pub mod decl;
pub mod graph;

pub use decl::{
    Decl, DeclMeta, EnumConstant, EnumDecl, ExtendBlock, Field, Label, MessageDecl, OneOf,
    OptionSet, Rpc, ScalarKind, ServiceDecl, TypeRef,
};
pub use graph::{FileId, ProtoFile, Schema, TypeId};
