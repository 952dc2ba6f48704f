//! Structural validation, run after reference resolution.

use std::collections::HashMap;

use crate::parser::ast::{MAX_TAG, Syntax};
use crate::schema::{Decl, EnumDecl, Label, MessageDecl, Schema, ServiceDecl, TypeRef};

use super::{ExtensionEntry, LinkError};

/// The protobuf implementation-reserved tag block.
const IMPL_RESERVED: std::ops::RangeInclusive<i32> = 19_000..=19_999;

pub(crate) fn validate(
    schema: &Schema,
    extensions: &[ExtensionEntry],
    errors: &mut Vec<LinkError>,
) {
    for (id, decl) in schema.decls() {
        let syntax = schema.file(schema.meta(id).file).syntax;
        match decl {
            Decl::Message(message) => validate_message(schema, message, errors),
            Decl::Enum(en) => validate_enum(en, syntax, errors),
            Decl::Service(service) => validate_service(service, errors),
        }
    }
    validate_extensions(schema, extensions, errors);
}

fn validate_message(schema: &Schema, message: &MessageDecl, errors: &mut Vec<LinkError>) {
    let scope = &message.qualified_name;

    let mut tags: HashMap<i32, &crate::core::Location> = HashMap::new();
    let mut names: HashMap<&str, &crate::core::Location> = HashMap::new();

    for field in &message.fields {
        if field.tag < 1 || field.tag > MAX_TAG || IMPL_RESERVED.contains(&field.tag) {
            errors.push(LinkError::TagOutOfRange {
                scope: scope.clone(),
                tag: field.tag,
                location: field.location.clone(),
            });
        }
        if message.reserved_range_covers(field.tag) {
            errors.push(LinkError::TagReserved {
                scope: scope.clone(),
                tag: field.tag,
                location: field.location.clone(),
            });
        }
        if message.reserved_names.iter().any(|n| n == &field.name) {
            errors.push(LinkError::NameReserved {
                scope: scope.clone(),
                name: field.name.clone(),
                location: field.location.clone(),
            });
        }

        match tags.entry(field.tag) {
            std::collections::hash_map::Entry::Occupied(first) => {
                errors.push(LinkError::TagCollision {
                    scope: scope.clone(),
                    tag: field.tag,
                    first: (*first.get()).clone(),
                    second: field.location.clone(),
                });
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(&field.location);
            }
        }
        match names.entry(field.name.as_str()) {
            std::collections::hash_map::Entry::Occupied(first) => {
                errors.push(LinkError::DuplicateMemberName {
                    scope: scope.clone(),
                    name: field.name.clone(),
                    first: (*first.get()).clone(),
                    second: field.location.clone(),
                });
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(&field.location);
            }
        }

        if field.packed == Some(true) && !packable(schema, field) {
            errors.push(LinkError::PackedNotAllowed {
                field: format!("{scope}.{}", field.name),
                location: field.location.clone(),
            });
        }
    }
}

/// Packed encoding applies to repeated numeric scalars and repeated enums.
fn packable(schema: &Schema, field: &crate::schema::Field) -> bool {
    if field.label != Label::Repeated {
        return false;
    }
    match &field.typ {
        TypeRef::Scalar(scalar) => scalar.packable(),
        TypeRef::Resolved(id) => schema.get(*id).as_enum().is_some(),
        TypeRef::Named(_) => false,
    }
}

fn validate_enum(en: &EnumDecl, syntax: Syntax, errors: &mut Vec<LinkError>) {
    if en.constants.is_empty() {
        errors.push(LinkError::EnumWithoutConstants {
            name: en.qualified_name.clone(),
            location: en.location.clone(),
        });
        return;
    }
    if syntax == Syntax::Proto3 && en.constants[0].tag != 0 {
        errors.push(LinkError::MissingZeroConstant {
            name: en.qualified_name.clone(),
            location: en.location.clone(),
        });
    }

    let mut tags: HashMap<i32, &crate::core::Location> = HashMap::new();
    let mut names: HashMap<&str, &crate::core::Location> = HashMap::new();
    for constant in &en.constants {
        match names.entry(constant.name.as_str()) {
            std::collections::hash_map::Entry::Occupied(first) => {
                errors.push(LinkError::DuplicateMemberName {
                    scope: en.qualified_name.clone(),
                    name: constant.name.clone(),
                    first: (*first.get()).clone(),
                    second: constant.location.clone(),
                });
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(&constant.location);
            }
        }
        match tags.entry(constant.tag) {
            std::collections::hash_map::Entry::Occupied(first) => {
                if !en.allow_alias {
                    errors.push(LinkError::DuplicateEnumTag {
                        name: en.qualified_name.clone(),
                        tag: constant.tag,
                        first: (*first.get()).clone(),
                        second: constant.location.clone(),
                    });
                }
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(&constant.location);
            }
        }

        if en.reserved_ranges.iter().any(|r| r.contains(constant.tag)) {
            errors.push(LinkError::TagReserved {
                scope: en.qualified_name.clone(),
                tag: constant.tag,
                location: constant.location.clone(),
            });
        }
        if en.reserved_names.iter().any(|n| n == &constant.name) {
            errors.push(LinkError::NameReserved {
                scope: en.qualified_name.clone(),
                name: constant.name.clone(),
                location: constant.location.clone(),
            });
        }
    }
}

fn validate_service(service: &ServiceDecl, errors: &mut Vec<LinkError>) {
    let mut names: HashMap<&str, &crate::core::Location> = HashMap::new();
    for rpc in &service.rpcs {
        match names.entry(rpc.name.as_str()) {
            std::collections::hash_map::Entry::Occupied(first) => {
                errors.push(LinkError::DuplicateMemberName {
                    scope: service.qualified_name.clone(),
                    name: rpc.name.clone(),
                    first: (*first.get()).clone(),
                    second: rpc.location.clone(),
                });
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(&rpc.location);
            }
        }
    }
}

/// Extension fields share their extendee's tag space and must land inside a
/// declared extension range.
fn validate_extensions(
    schema: &Schema,
    extensions: &[ExtensionEntry],
    errors: &mut Vec<LinkError>,
) {
    let mut claimed: HashMap<(u32, i32), &crate::core::Location> = HashMap::new();

    for entry in extensions {
        let Some(extendee) = schema.get(entry.extendee).as_message() else {
            continue;
        };
        let field = &entry.field;
        let scope = &extendee.qualified_name;

        if field.tag < 1 || field.tag > MAX_TAG || IMPL_RESERVED.contains(&field.tag) {
            errors.push(LinkError::TagOutOfRange {
                scope: scope.clone(),
                tag: field.tag,
                location: field.location.clone(),
            });
            continue;
        }
        if !extendee.extension_range_covers(field.tag) {
            errors.push(LinkError::ExtensionRangeMismatch {
                extendee: scope.clone(),
                tag: field.tag,
                location: field.location.clone(),
            });
        }
        if extendee.reserved_range_covers(field.tag) {
            errors.push(LinkError::TagReserved {
                scope: scope.clone(),
                tag: field.tag,
                location: field.location.clone(),
            });
        }
        if let Some(first) = extendee.fields.iter().find(|f| f.tag == field.tag) {
            errors.push(LinkError::TagCollision {
                scope: scope.clone(),
                tag: field.tag,
                first: first.location.clone(),
                second: field.location.clone(),
            });
        }
        match claimed.entry((entry.extendee.0, field.tag)) {
            std::collections::hash_map::Entry::Occupied(first) => {
                errors.push(LinkError::TagCollision {
                    scope: scope.clone(),
                    tag: field.tag,
                    first: (*first.get()).clone(),
                    second: field.location.clone(),
                });
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(&field.location);
            }
        }
    }
}
