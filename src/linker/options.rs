//! Option resolution and type checking.
//!
//! Every option name resolves against the options message for its context
//! (`google.protobuf.FileOptions` for file options, and so on). Plain parts
//! name fields of that message; parenthesized parts name extension fields,
//! resolved with the same scoping rules as type references. Values
//! type-check against the resolved field: enum constants by name, scalars by
//! literal form, messages recursively through aggregate values.

use indexmap::{IndexMap, IndexSet};

use crate::parser::ast::{OptionNamePart, OptionNode, OptionValue};
use crate::schema::{Decl, Field, FileId, Label, ScalarKind, Schema, TypeId, TypeRef};

use super::resolver::scope_segments;
use super::{ExtensionEntry, LinkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionContext {
    File,
    Message,
    Field,
    OneOf,
    Enum,
    EnumValue,
    Service,
    Method,
}

impl OptionContext {
    fn options_message(self) -> &'static str {
        match self {
            Self::File => "google.protobuf.FileOptions",
            Self::Message => "google.protobuf.MessageOptions",
            Self::Field => "google.protobuf.FieldOptions",
            Self::OneOf => "google.protobuf.OneofOptions",
            Self::Enum => "google.protobuf.EnumOptions",
            Self::EnumValue => "google.protobuf.EnumValueOptions",
            Self::Service => "google.protobuf.ServiceOptions",
            Self::Method => "google.protobuf.MethodOptions",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::File => "a file",
            Self::Message => "a message",
            Self::Field => "a field",
            Self::OneOf => "a oneof",
            Self::Enum => "an enum",
            Self::EnumValue => "an enum constant",
            Self::Service => "a service",
            Self::Method => "an rpc",
        }
    }
}

/// Where a checked option set lives, so resolved extension types can be
/// written back after the read-only pass.
enum Target {
    File(usize),
    Decl(TypeId),
    Field(TypeId, usize),
    OneOf(TypeId, usize),
    Constant(TypeId, usize),
    Rpc(TypeId, usize),
}

pub(crate) fn check_all(
    schema: &mut Schema,
    visible: &[IndexSet<usize>],
    extensions: &[ExtensionEntry],
    extension_index: &IndexMap<String, usize>,
    errors: &mut Vec<LinkError>,
) {
    let mut updates: Vec<(Target, Vec<TypeId>)> = Vec::new();
    {
        let mut checker = Checker {
            schema,
            visible,
            extensions,
            extension_index,
            errors,
        };

        for (i, file) in checker.schema.files().iter().enumerate() {
            let fid = FileId::new(i);
            let scope = match &file.package {
                Some(package) => scope_segments(package),
                None => Vec::new(),
            };
            let resolved =
                checker.check_set(&file.options.entries, OptionContext::File, fid, &scope);
            if !resolved.is_empty() {
                updates.push((Target::File(i), resolved));
            }
            for extend in &file.extends {
                for field in &extend.fields {
                    checker.check_field_options(field, fid, &scope);
                }
            }
        }

        for (id, decl) in checker.schema.decls() {
            let fid = checker.schema.meta(id).file;
            let scope = scope_segments(decl.qualified_name());
            match decl {
                Decl::Message(message) => {
                    let resolved = checker.check_set(
                        &message.options.entries,
                        OptionContext::Message,
                        fid,
                        &scope,
                    );
                    if !resolved.is_empty() {
                        updates.push((Target::Decl(id), resolved));
                    }
                    for (i, field) in message.fields.iter().enumerate() {
                        let resolved = checker.check_field_options(field, fid, &scope);
                        if !resolved.is_empty() {
                            updates.push((Target::Field(id, i), resolved));
                        }
                    }
                    for (i, oneof) in message.oneofs.iter().enumerate() {
                        let resolved = checker.check_set(
                            &oneof.options.entries,
                            OptionContext::OneOf,
                            fid,
                            &scope,
                        );
                        if !resolved.is_empty() {
                            updates.push((Target::OneOf(id, i), resolved));
                        }
                    }
                }
                Decl::Enum(en) => {
                    let resolved =
                        checker.check_set(&en.options.entries, OptionContext::Enum, fid, &scope);
                    if !resolved.is_empty() {
                        updates.push((Target::Decl(id), resolved));
                    }
                    for (i, constant) in en.constants.iter().enumerate() {
                        let resolved = checker.check_set(
                            &constant.options.entries,
                            OptionContext::EnumValue,
                            fid,
                            &scope,
                        );
                        if !resolved.is_empty() {
                            updates.push((Target::Constant(id, i), resolved));
                        }
                    }
                }
                Decl::Service(service) => {
                    let resolved = checker.check_set(
                        &service.options.entries,
                        OptionContext::Service,
                        fid,
                        &scope,
                    );
                    if !resolved.is_empty() {
                        updates.push((Target::Decl(id), resolved));
                    }
                    for (i, rpc) in service.rpcs.iter().enumerate() {
                        let resolved = checker.check_set(
                            &rpc.options.entries,
                            OptionContext::Method,
                            fid,
                            &scope,
                        );
                        if !resolved.is_empty() {
                            updates.push((Target::Rpc(id, i), resolved));
                        }
                    }
                }
            }
        }
    }

    for (target, resolved) in updates {
        match target {
            Target::File(i) => {
                let fid = FileId::new(i);
                schema.file_mut(fid).options.resolved_types = resolved;
            }
            Target::Decl(id) => match schema.get_mut(id) {
                Decl::Message(m) => m.options.resolved_types = resolved,
                Decl::Enum(e) => e.options.resolved_types = resolved,
                Decl::Service(s) => s.options.resolved_types = resolved,
            },
            Target::Field(id, i) => {
                if let Decl::Message(m) = schema.get_mut(id) {
                    m.fields[i].options.resolved_types = resolved;
                }
            }
            Target::OneOf(id, i) => {
                if let Decl::Message(m) = schema.get_mut(id) {
                    m.oneofs[i].options.resolved_types = resolved;
                }
            }
            Target::Constant(id, i) => {
                if let Decl::Enum(e) = schema.get_mut(id) {
                    e.constants[i].options.resolved_types = resolved;
                }
            }
            Target::Rpc(id, i) => {
                if let Decl::Service(s) = schema.get_mut(id) {
                    s.rpcs[i].options.resolved_types = resolved;
                }
            }
        }
    }
}

struct Checker<'a> {
    schema: &'a Schema,
    visible: &'a [IndexSet<usize>],
    extensions: &'a [ExtensionEntry],
    extension_index: &'a IndexMap<String, usize>,
    errors: &'a mut Vec<LinkError>,
}

impl<'a> Checker<'a> {
    fn check_set(
        &mut self,
        entries: &[OptionNode],
        context: OptionContext,
        fid: FileId,
        scope: &[String],
    ) -> Vec<TypeId> {
        let mut resolved = Vec::new();
        for option in entries {
            self.check_option(option, context, fid, scope, &mut resolved);
        }
        resolved
    }

    /// Field options plus the `default` pseudo-option, which type-checks
    /// against the field's own type.
    fn check_field_options(
        &mut self,
        field: &Field,
        fid: FileId,
        scope: &[String],
    ) -> Vec<TypeId> {
        let resolved = self.check_set(&field.options.entries, OptionContext::Field, fid, scope);
        if let Some(default) = &field.default_value {
            if let TypeRef::Resolved(id) = &field.typ
                && self.schema.get(*id).as_message().is_some()
            {
                self.errors.push(LinkError::OptionTypeMismatch {
                    name: "default".to_string(),
                    expected: "a scalar or enum field; messages have no default".to_string(),
                    location: field.location.clone(),
                });
            } else {
                self.check_value("default", &field.typ, false, default, &field.location);
            }
        }
        resolved
    }

    fn check_option(
        &mut self,
        option: &OptionNode,
        context: OptionContext,
        fid: FileId,
        scope: &[String],
        resolved: &mut Vec<TypeId>,
    ) {
        // A user-supplied descriptor may omit an options message; nothing to
        // check against then.
        let Some(options_msg) = self.schema.resolve(context.options_message()) else {
            return;
        };

        let Some(first) = option.name.parts.first() else {
            return;
        };
        let (mut current, mut repeated) = match first {
            OptionNamePart::Plain(name) => {
                if context == OptionContext::Field && (name == "default" || name == "json_name") {
                    return;
                }
                match self.message_field(options_msg, name) {
                    Some(field) => (field.typ.clone(), field.label == Label::Repeated),
                    None => {
                        self.errors.push(LinkError::UnknownOption {
                            name: option.name.to_string(),
                            context: context.label().to_string(),
                            location: option.location.clone(),
                        });
                        return;
                    }
                }
            }
            OptionNamePart::Extension(name) => {
                match self.resolve_extension(name, fid, scope, options_msg) {
                    Some(entry) => {
                        if let TypeRef::Resolved(id) = entry.field.typ {
                            resolved.push(id);
                        }
                        (entry.field.typ.clone(), entry.field.label == Label::Repeated)
                    }
                    None => {
                        self.errors.push(LinkError::UnknownOption {
                            name: option.name.to_string(),
                            context: context.label().to_string(),
                            location: option.location.clone(),
                        });
                        return;
                    }
                }
            }
        };

        // Subsequent parts step into message-typed option fields.
        for part in &option.name.parts[1..] {
            let TypeRef::Resolved(id) = current else {
                self.errors.push(LinkError::OptionTypeMismatch {
                    name: option.name.to_string(),
                    expected: "a message-typed option before '.'".to_string(),
                    location: option.location.clone(),
                });
                return;
            };
            if self.schema.get(id).as_message().is_none() {
                self.errors.push(LinkError::OptionTypeMismatch {
                    name: option.name.to_string(),
                    expected: "a message-typed option before '.'".to_string(),
                    location: option.location.clone(),
                });
                return;
            }
            let next = match part {
                OptionNamePart::Plain(name) => self.message_field(id, name).cloned(),
                OptionNamePart::Extension(name) => self
                    .resolve_extension(name, fid, scope, id)
                    .map(|e| e.field.clone()),
            };
            match next {
                Some(field) => {
                    if let TypeRef::Resolved(sub) = field.typ {
                        resolved.push(sub);
                    }
                    current = field.typ.clone();
                    repeated = field.label == Label::Repeated;
                }
                None => {
                    self.errors.push(LinkError::UnknownOption {
                        name: option.name.to_string(),
                        context: context.label().to_string(),
                        location: option.location.clone(),
                    });
                    return;
                }
            }
        }

        let name = option.name.to_string();
        self.check_value(&name, &current, repeated, &option.value, &option.location);
    }

    fn message_field(&self, id: TypeId, name: &str) -> Option<&'a Field> {
        let message = self.schema.get(id).as_message()?;
        message.fields.iter().find(|f| f.name == name)
    }

    /// Resolve an extension reference with the same innermost-first scoping
    /// as type references, constrained to extensions of `extendee`.
    fn resolve_extension(
        &self,
        name: &str,
        fid: FileId,
        scope: &[String],
        extendee: TypeId,
    ) -> Option<&'a ExtensionEntry> {
        let lookup = |candidate: &str| -> Option<&'a ExtensionEntry> {
            let entry = &self.extensions[*self.extension_index.get(candidate)?];
            (entry.extendee == extendee && self.is_visible(entry.file, fid)).then_some(entry)
        };

        if let Some(absolute) = name.strip_prefix('.') {
            return lookup(absolute);
        }
        for depth in (0..=scope.len()).rev() {
            let candidate = if depth == 0 {
                name.to_string()
            } else {
                format!("{}.{name}", scope[..depth].join("."))
            };
            if let Some(entry) = lookup(&candidate) {
                return Some(entry);
            }
        }
        None
    }

    fn is_visible(&self, declared_in: FileId, from: FileId) -> bool {
        self.visible
            .get(from.index())
            .is_some_and(|set| set.contains(&declared_in.index()))
    }

    fn check_value(
        &mut self,
        name: &str,
        typ: &TypeRef,
        repeated: bool,
        value: &OptionValue,
        location: &crate::core::Location,
    ) {
        if let OptionValue::List(values) = value {
            if !repeated {
                self.errors.push(LinkError::OptionTypeMismatch {
                    name: name.to_string(),
                    expected: "a single value".to_string(),
                    location: location.clone(),
                });
                return;
            }
            for element in values {
                self.check_single(name, typ, element, location);
            }
            return;
        }
        self.check_single(name, typ, value, location);
    }

    fn check_single(
        &mut self,
        name: &str,
        typ: &TypeRef,
        value: &OptionValue,
        location: &crate::core::Location,
    ) {
        let mismatch = |expected: &str| LinkError::OptionTypeMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            location: location.clone(),
        };

        match typ {
            TypeRef::Scalar(scalar) => {
                let ok = match scalar {
                    ScalarKind::Bool => value.as_bool().is_some(),
                    ScalarKind::String | ScalarKind::Bytes => {
                        matches!(value, OptionValue::Str(_))
                    }
                    ScalarKind::Double | ScalarKind::Float => matches!(
                        value,
                        OptionValue::Float(_) | OptionValue::Int(_)
                    ) || is_float_keyword(value),
                    _ => matches!(value, OptionValue::Int(_)),
                };
                if !ok {
                    let expected = match scalar {
                        ScalarKind::Bool => "true or false",
                        ScalarKind::String | ScalarKind::Bytes => "a string",
                        ScalarKind::Double | ScalarKind::Float => "a number",
                        _ => "an integer",
                    };
                    self.errors.push(mismatch(expected));
                }
            }
            TypeRef::Resolved(id) => match self.schema.get(*id) {
                Decl::Enum(en) => {
                    let named_constant = matches!(
                        value,
                        OptionValue::Ident(ident) if en.constant(ident).is_some()
                    );
                    if !named_constant {
                        self.errors
                            .push(mismatch(&format!("a constant of {}", en.qualified_name)));
                    }
                }
                Decl::Message(message) => match value {
                    OptionValue::Aggregate(entries) => {
                        let message_id = *id;
                        let fields: Vec<(String, Field)> = entries
                            .iter()
                            .filter_map(|(key, _)| {
                                self.aggregate_field(message_id, key)
                                    .map(|f| (key.clone(), f))
                            })
                            .collect();
                        for (key, value) in entries {
                            match fields.iter().find(|(k, _)| k == key) {
                                Some((_, field)) => self.check_value(
                                    key,
                                    &field.typ,
                                    field.label == Label::Repeated,
                                    value,
                                    location,
                                ),
                                None => self.errors.push(LinkError::UnknownOption {
                                    name: key.clone(),
                                    context: message.qualified_name.clone(),
                                    location: location.clone(),
                                }),
                            }
                        }
                    }
                    _ => self.errors.push(mismatch("an aggregate value")),
                },
                Decl::Service(_) => {}
            },
            // Unresolved field types were already reported.
            TypeRef::Named(_) => {}
        }
    }

    /// Find an aggregate entry's field: a plain field of the message, or an
    /// extension referenced by its full name.
    fn aggregate_field(&self, id: TypeId, key: &str) -> Option<Field> {
        if key.contains('.') {
            let entry = &self.extensions[*self.extension_index.get(key)?];
            return (entry.extendee == id).then(|| entry.field.clone());
        }
        self.message_field(id, key).cloned()
    }
}

/// `inf`, `-inf`, and `nan` arrive as identifiers.
fn is_float_keyword(value: &OptionValue) -> bool {
    matches!(
        value,
        OptionValue::Ident(ident) if matches!(ident.as_str(), "inf" | "-inf" | "nan")
    )
}
