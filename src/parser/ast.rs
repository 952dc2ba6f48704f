//! Syntax tree produced by the parser.
//!
//! One [`FileNode`] per source text. Nothing here is resolved: type
//! references are the names as written, options are retained uninterpreted,
//! and qualified names do not exist yet. The linker turns this tree into the
//! arena-backed [`crate::schema::Schema`].

use crate::core::Location;

/// Proto language version of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// The default when a file carries no `syntax` declaration.
    #[default]
    Proto2,
    Proto3,
}

impl std::fmt::Display for Syntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Syntax::Proto2 => write!(f, "proto2"),
            Syntax::Proto3 => write!(f, "proto3"),
        }
    }
}

/// A parsed `.proto` file.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub location: Location,
    pub syntax: Syntax,
    pub package: Option<String>,
    pub imports: Vec<ImportNode>,
    pub options: Vec<OptionNode>,
    pub types: Vec<TypeNode>,
    pub services: Vec<ServiceNode>,
    pub extends: Vec<ExtendNode>,
}

impl FileNode {
    pub fn empty(location: Location) -> Self {
        Self {
            location,
            syntax: Syntax::default(),
            package: None,
            imports: Vec::new(),
            options: Vec::new(),
            types: Vec::new(),
            services: Vec::new(),
            extends: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Plain,
    Public,
    /// Parsed and treated as a regular import.
    Weak,
}

#[derive(Debug, Clone)]
pub struct ImportNode {
    pub path: String,
    pub kind: ImportKind,
    pub location: Location,
}

/// A message or enum declaration.
#[derive(Debug, Clone)]
pub enum TypeNode {
    Message(MessageNode),
    Enum(EnumNode),
}

impl From<MessageNode> for TypeNode {
    fn from(node: MessageNode) -> Self {
        TypeNode::Message(node)
    }
}

impl From<EnumNode> for TypeNode {
    fn from(node: EnumNode) -> Self {
        TypeNode::Enum(node)
    }
}

impl TypeNode {
    pub fn name(&self) -> &str {
        match self {
            TypeNode::Message(m) => &m.name,
            TypeNode::Enum(e) => &e.name,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            TypeNode::Message(m) => &m.location,
            TypeNode::Enum(e) => &e.location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageNode {
    pub name: String,
    pub location: Location,
    pub doc: String,
    pub fields: Vec<FieldNode>,
    pub oneofs: Vec<OneOfNode>,
    pub nested: Vec<TypeNode>,
    pub extends: Vec<ExtendNode>,
    pub reserved: Vec<ReservedNode>,
    pub extension_ranges: Vec<TagRangeNode>,
    pub options: Vec<OptionNode>,
}

#[derive(Debug, Clone)]
pub struct EnumNode {
    pub name: String,
    pub location: Location,
    pub doc: String,
    pub constants: Vec<EnumConstantNode>,
    pub reserved: Vec<ReservedNode>,
    pub options: Vec<OptionNode>,
}

#[derive(Debug, Clone)]
pub struct EnumConstantNode {
    pub name: String,
    pub tag: i32,
    pub options: Vec<OptionNode>,
    pub doc: String,
    pub location: Location,
}

/// Field label as written. Oneof membership is structural, not a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Optional,
    Required,
    Repeated,
}

/// The declared type of a field: a single named or scalar type, or a
/// `map<K, V>` awaiting desugaring by the linker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A type name as written: `int32`, `Inner.Deep`, `.pkg.Message`.
    /// Scalar classification happens at link time.
    Named(String),
    Map { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct FieldNode {
    pub label: Option<Label>,
    pub field_type: FieldType,
    pub name: String,
    pub tag: i32,
    /// Bracket options as written, `default` and `json_name` included.
    pub options: Vec<OptionNode>,
    pub doc: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct OneOfNode {
    pub name: String,
    pub fields: Vec<FieldNode>,
    pub options: Vec<OptionNode>,
    pub doc: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ServiceNode {
    pub name: String,
    pub location: Location,
    pub doc: String,
    pub rpcs: Vec<RpcNode>,
    pub options: Vec<OptionNode>,
}

#[derive(Debug, Clone)]
pub struct RpcNode {
    pub name: String,
    pub request_type: String,
    pub request_streaming: bool,
    pub response_type: String,
    pub response_streaming: bool,
    pub options: Vec<OptionNode>,
    pub doc: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ExtendNode {
    /// The extendee type name as written.
    pub name: String,
    pub location: Location,
    pub doc: String,
    pub fields: Vec<FieldNode>,
}

/// A `reserved` declaration: tag ranges and/or field names.
#[derive(Debug, Clone)]
pub struct ReservedNode {
    pub ranges: Vec<TagRangeNode>,
    pub names: Vec<String>,
    pub location: Location,
}

/// An inclusive tag range. `reserved 5;` is the degenerate range `5..=5`;
/// `to max` uses [`MAX_TAG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRangeNode {
    pub start: i32,
    pub end: i32,
}

/// The largest tag number protobuf permits.
pub const MAX_TAG: i32 = 536_870_911;

impl TagRangeNode {
    pub fn single(tag: i32) -> Self {
        Self { start: tag, end: tag }
    }

    pub fn contains(&self, tag: i32) -> bool {
        self.start <= tag && tag <= self.end
    }
}

/// One option as written, either a file/type/member `option` statement or a
/// field bracket option.
#[derive(Debug, Clone)]
pub struct OptionNode {
    pub name: OptionName,
    pub value: OptionValue,
    pub location: Location,
}

/// An option name: a dotted sequence of parts, each either a plain field
/// name or a parenthesized extension reference, e.g. `(my.custom).nested`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionName {
    pub parts: Vec<OptionNamePart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionNamePart {
    Plain(String),
    Extension(String),
}

impl std::fmt::Display for OptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match part {
                OptionNamePart::Plain(name) => write!(f, "{name}")?,
                OptionNamePart::Extension(name) => write!(f, "({name})")?,
            }
        }
        Ok(())
    }
}

impl OptionName {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            parts: vec![OptionNamePart::Plain(name.into())],
        }
    }

    /// The simple name when this is a single plain part, as for the
    /// well-known options (`packed`, `default`, `allow_alias`, ...).
    pub fn as_plain(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [OptionNamePart::Plain(name)] => Some(name),
            _ => None,
        }
    }
}

/// An option value, retained as written.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// A bare identifier: `true`, `false`, an enum constant name.
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    /// An aggregate `{ key: value, ... }` body.
    Aggregate(Vec<(String, OptionValue)>),
    /// A `[a, b, c]` list.
    List(Vec<OptionValue>),
}

impl OptionValue {
    /// Interpret this value as a boolean, the way option positions that
    /// require one do.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Ident(s) if s == "true" => Some(true),
            OptionValue::Ident(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Find a single-part plain option by name.
pub fn find_option<'a>(options: &'a [OptionNode], name: &str) -> Option<&'a OptionNode> {
    options.iter().find(|o| o.name.as_plain() == Some(name))
}
