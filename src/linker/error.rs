//! Link errors.
//!
//! The linker collects every error it finds and reports them as one
//! [`LinkFailure`] at end-of-pass, so a single run surfaces all problems.

use std::fmt;

use thiserror::Error;

use crate::core::Location;

#[derive(Debug, Clone, Error)]
pub enum LinkError {
    #[error("{name} ({second}) is already defined at {first}")]
    DuplicateType {
        name: String,
        first: Location,
        second: Location,
    },

    #[error("unable to resolve {name} ({referrer})")]
    UnresolvedReference { name: String, referrer: Location },

    #[error("{name} is a {actual}, expected a {expected} ({referrer})")]
    WrongKind {
        name: String,
        expected: &'static str,
        actual: &'static str,
        referrer: Location,
    },

    #[error("multiple fields share tag {tag} in {scope}: {first} and {second}")]
    TagCollision {
        scope: String,
        tag: i32,
        first: Location,
        second: Location,
    },

    #[error("tag {tag} is out of range in {scope} ({location})")]
    TagOutOfRange {
        scope: String,
        tag: i32,
        location: Location,
    },

    #[error("tag {tag} is reserved in {scope} ({location})")]
    TagReserved {
        scope: String,
        tag: i32,
        location: Location,
    },

    #[error("name '{name}' is reserved in {scope} ({location})")]
    NameReserved {
        scope: String,
        name: String,
        location: Location,
    },

    #[error("proto3 enum {name} must declare its zero-valued constant first ({location})")]
    MissingZeroConstant { name: String, location: Location },

    #[error("duplicate tag {tag} in enum {name} without allow_alias: {first} and {second}")]
    DuplicateEnumTag {
        name: String,
        tag: i32,
        first: Location,
        second: Location,
    },

    #[error("duplicate name '{name}' in {scope}: {first} and {second}")]
    DuplicateMemberName {
        scope: String,
        name: String,
        first: Location,
        second: Location,
    },

    #[error("map key of {field} must be an integral, bool, or string type, not {key} ({location})")]
    InvalidMapKey {
        field: String,
        key: String,
        location: Location,
    },

    #[error("map field {field} may not be a oneof member ({location})")]
    MapFieldInOneOf { field: String, location: Location },

    #[error("map field {field} may not be declared as an extension ({location})")]
    MapFieldAsExtension { field: String, location: Location },

    #[error("required fields are not permitted in proto3: {field} ({location})")]
    RequiredInProto3 { field: String, location: Location },

    #[error("default values are not permitted in proto3: {field} ({location})")]
    DefaultInProto3 { field: String, location: Location },

    #[error("{field} may not be packed: only repeated scalar fields support packing ({location})")]
    PackedNotAllowed { field: String, location: Location },

    #[error("{extendee} does not declare an extension range containing tag {tag} ({location})")]
    ExtensionRangeMismatch {
        extendee: String,
        tag: i32,
        location: Location,
    },

    #[error("unknown option '{name}' on {context} ({location})")]
    UnknownOption {
        name: String,
        context: String,
        location: Location,
    },

    #[error("option '{name}' expects {expected} ({location})")]
    OptionTypeMismatch {
        name: String,
        expected: String,
        location: Location,
    },

    #[error("enum {name} must declare at least one constant ({location})")]
    EnumWithoutConstants { name: String, location: Location },

    #[error("proto2 field {field} requires a label ({location})")]
    MissingLabel { field: String, location: Location },

    #[error("import cycle: {}", chain.join(" -> "))]
    CyclicImports { chain: Vec<String> },
}

/// Aggregate of every error found during linking, in discovery order.
#[derive(Debug, Clone)]
pub struct LinkFailure {
    pub errors: Vec<LinkError>,
}

impl std::error::Error for LinkFailure {}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "linking failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  {error}")?;
        }
        Ok(())
    }
}
