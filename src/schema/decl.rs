//! Declarations stored in the schema arena.

use crate::core::Location;
use crate::parser::ast::{OptionNode, OptionValue, TagRangeNode};

use super::graph::{FileId, TypeId};

/// The protobuf scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Bytes,
    Double,
    Float,
    Fixed32,
    Fixed64,
    Int32,
    Int64,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    String,
    Uint32,
    Uint64,
}

impl ScalarKind {
    /// Classify a type name as written. Scalar names only apply to
    /// unqualified references; `.foo.int32` is a message named `int32`.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "bytes" => Self::Bytes,
            "double" => Self::Double,
            "float" => Self::Float,
            "fixed32" => Self::Fixed32,
            "fixed64" => Self::Fixed64,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "sfixed32" => Self::Sfixed32,
            "sfixed64" => Self::Sfixed64,
            "sint32" => Self::Sint32,
            "sint64" => Self::Sint64,
            "string" => Self::String,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            _ => return None,
        })
    }

    /// True for the types a map key may have: integral, bool, or string.
    pub fn valid_map_key(self) -> bool {
        !matches!(self, Self::Bytes | Self::Double | Self::Float)
    }

    /// True for the numeric and bool types that support packed encoding.
    pub fn packable(self) -> bool {
        !matches!(self, Self::Bytes | Self::String)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Double => "double",
            Self::Float => "float",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::String => "string",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }
}

/// A reference to a type.
///
/// The parser produces [`TypeRef::Named`]; the linker rewrites every named
/// reference to [`TypeRef::Scalar`] or [`TypeRef::Resolved`]. A `Named`
/// variant surviving past linking is a bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(ScalarKind),
    Named(String),
    Resolved(TypeId),
}

impl TypeRef {
    pub fn resolved(&self) -> Option<TypeId> {
        match self {
            TypeRef::Resolved(id) => Some(*id),
            _ => None,
        }
    }
}

/// Options attached to a declaration or member: the entries as written,
/// plus the extension option types the linker resolved them against.
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    pub entries: Vec<OptionNode>,
    /// Arena ids of custom option extension types, recorded during option
    /// checking. The pruner follows these edges.
    pub resolved_types: Vec<TypeId>,
}

impl OptionSet {
    pub fn new(entries: Vec<OptionNode>) -> Self {
        Self {
            entries,
            resolved_types: Vec::new(),
        }
    }

    /// Find a single-part plain option by name.
    pub fn find(&self, name: &str) -> Option<&OptionNode> {
        crate::parser::ast::find_option(&self.entries, name)
    }
}

/// Field label. Oneof membership replaces the written label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Optional,
    Required,
    Repeated,
    OneOf,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub tag: i32,
    pub label: Label,
    pub typ: TypeRef,
    /// Index into the owning message's oneof list.
    pub oneof_index: Option<u32>,
    pub default_value: Option<OptionValue>,
    pub json_name: Option<String>,
    /// The `packed` option as written; `None` when unset.
    pub packed: Option<bool>,
    pub options: OptionSet,
    pub is_extension: bool,
    pub doc: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct OneOf {
    pub name: String,
    pub options: OptionSet,
    pub doc: String,
}

#[derive(Debug, Clone)]
pub struct MessageDecl {
    pub name: String,
    pub qualified_name: String,
    pub fields: Vec<Field>,
    pub oneofs: Vec<OneOf>,
    pub nested: Vec<TypeId>,
    pub reserved_ranges: Vec<TagRangeNode>,
    pub reserved_names: Vec<String>,
    pub extension_ranges: Vec<TagRangeNode>,
    pub options: OptionSet,
    /// Set on the synthetic messages map fields desugar into.
    pub map_entry: bool,
    pub doc: String,
    pub location: Location,
}

impl MessageDecl {
    /// True when `tag` may be declared by an extension of this message.
    pub fn extension_range_covers(&self, tag: i32) -> bool {
        self.extension_ranges.iter().any(|r| r.contains(tag))
    }

    pub fn reserved_range_covers(&self, tag: i32) -> bool {
        self.reserved_ranges.iter().any(|r| r.contains(tag))
    }
}

#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub name: String,
    pub tag: i32,
    pub options: OptionSet,
    pub doc: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub qualified_name: String,
    pub constants: Vec<EnumConstant>,
    pub reserved_ranges: Vec<TagRangeNode>,
    pub reserved_names: Vec<String>,
    pub options: OptionSet,
    /// `option allow_alias = true;` permits duplicate constant tags.
    pub allow_alias: bool,
    pub doc: String,
    pub location: Location,
}

impl EnumDecl {
    pub fn constant(&self, name: &str) -> Option<&EnumConstant> {
        self.constants.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Rpc {
    pub name: String,
    pub request_type: TypeRef,
    pub request_streaming: bool,
    pub response_type: TypeRef,
    pub response_streaming: bool,
    pub options: OptionSet,
    pub doc: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ServiceDecl {
    pub name: String,
    pub qualified_name: String,
    pub rpcs: Vec<Rpc>,
    pub options: OptionSet,
    pub doc: String,
    pub location: Location,
}

/// A declaration in the schema arena: a message, an enum, or a service.
#[derive(Debug, Clone)]
pub enum Decl {
    Message(MessageDecl),
    Enum(EnumDecl),
    Service(ServiceDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::Message(m) => &m.name,
            Decl::Enum(e) => &e.name,
            Decl::Service(s) => &s.name,
        }
    }

    pub fn qualified_name(&self) -> &str {
        match self {
            Decl::Message(m) => &m.qualified_name,
            Decl::Enum(e) => &e.qualified_name,
            Decl::Service(s) => &s.qualified_name,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Decl::Message(m) => &m.location,
            Decl::Enum(e) => &e.location,
            Decl::Service(s) => &s.location,
        }
    }

    pub fn options(&self) -> &OptionSet {
        match self {
            Decl::Message(m) => &m.options,
            Decl::Enum(e) => &e.options,
            Decl::Service(s) => &s.options,
        }
    }

    pub fn as_message(&self) -> Option<&MessageDecl> {
        match self {
            Decl::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDecl> {
        match self {
            Decl::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceDecl> {
        match self {
            Decl::Service(s) => Some(s),
            _ => None,
        }
    }

    /// What this declaration is, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Message(_) => "message",
            Decl::Enum(_) => "enum",
            Decl::Service(_) => "service",
        }
    }

    /// True for the synthetic messages map fields desugar into.
    pub fn is_map_entry(&self) -> bool {
        matches!(self, Decl::Message(m) if m.map_entry)
    }
}

/// A linked `extend` block: the resolved extendee plus the extension fields
/// it declares.
#[derive(Debug, Clone)]
pub struct ExtendBlock {
    pub extendee: TypeId,
    pub fields: Vec<Field>,
    pub doc: String,
    pub location: Location,
}

/// Owning-file bookkeeping carried next to each arena slot.
#[derive(Debug, Clone, Copy)]
pub struct DeclMeta {
    pub file: FileId,
    /// Arena id of the enclosing message, for nested declarations.
    pub parent: Option<TypeId>,
}
