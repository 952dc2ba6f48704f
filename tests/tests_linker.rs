//! Linker tests: qualified-name indexing, reference resolution, import
//! visibility, map desugaring, validation, and error accumulation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

use helpers::{link_files, try_link_files};
use protolink::linker::LinkError;
use protolink::schema::{Label, ScalarKind, TypeRef};
use rstest::rstest;

// ============================================================================
// Indexing and resolution
// ============================================================================

#[test]
fn test_qualified_names() {
    let schema = link_files(&[(
        "a.proto",
        "package a.b;\nmessage Outer { message Inner {} enum E { X = 0; } }",
    )]);
    assert!(schema.resolve("a.b.Outer").is_some());
    assert!(schema.resolve("a.b.Outer.Inner").is_some());
    assert!(schema.resolve("a.b.Outer.E").is_some());
    assert!(schema.resolve("Outer").is_none());
}

#[test]
fn test_field_types_resolve() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage M { N n = 1; int32 x = 2; }\nmessage N {}",
    )]);
    let id = schema.resolve("p.M").unwrap();
    let message = schema.get(id).as_message().unwrap();
    let n = schema.resolve("p.N").unwrap();
    assert_eq!(message.fields[0].typ, TypeRef::Resolved(n));
    assert_eq!(message.fields[1].typ, TypeRef::Scalar(ScalarKind::Int32));
}

#[test]
fn test_innermost_scope_wins() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage T {}\nmessage Outer { message T {} T pick = 1; }",
    )]);
    let outer = schema.resolve("p.Outer").unwrap();
    let inner = schema.resolve("p.Outer.T").unwrap();
    let field = &schema.get(outer).as_message().unwrap().fields[0];
    assert_eq!(field.typ, TypeRef::Resolved(inner));
}

#[test]
fn test_leading_dot_is_absolute() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage T {}\nmessage Outer { message T {} .p.T pick = 1; }",
    )]);
    let outer = schema.resolve("p.Outer").unwrap();
    let top = schema.resolve("p.T").unwrap();
    let field = &schema.get(outer).as_message().unwrap().fields[0];
    assert_eq!(field.typ, TypeRef::Resolved(top));
}

#[test]
fn test_cross_file_resolution() {
    let schema = link_files(&[
        (
            "a.proto",
            "syntax = \"proto3\";\npackage p;\nimport \"q.proto\";\nmessage M { q.N n = 1; }",
        ),
        ("q.proto", "package q;\nmessage N {}"),
    ]);
    let m = schema.resolve("p.M").unwrap();
    let n = schema.resolve("q.N").unwrap();
    assert_eq!(
        schema.get(m).as_message().unwrap().fields[0].typ,
        TypeRef::Resolved(n)
    );
}

#[test]
fn test_rpc_types_resolve_to_messages() {
    let schema = link_files(&[(
        "a.proto",
        "package p;\nmessage Req {}\nmessage Resp {}\nservice S { rpc Call (Req) returns (Resp); }",
    )]);
    let s = schema.resolve("p.S").unwrap();
    let service = schema.get(s).as_service().unwrap();
    assert_eq!(
        service.rpcs[0].request_type,
        TypeRef::Resolved(schema.resolve("p.Req").unwrap())
    );
}

#[test]
fn test_rpc_type_must_be_message() {
    let errors = try_link_files(&[(
        "a.proto",
        "package p;\nenum E { A = 0; }\nmessage Ok {}\nservice S { rpc Call (E) returns (Ok); }",
    )])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::WrongKind { expected, .. } if *expected == "message"));
}

// ============================================================================
// Import visibility
// ============================================================================

#[test]
fn test_unimported_file_is_not_visible() {
    let errors = try_link_files(&[
        ("a.proto", "syntax = \"proto3\";\npackage p;\nmessage M { q.N n = 1; }"),
        ("q.proto", "package q;\nmessage N {}"),
    ])
    .unwrap_err()
    .errors;
    assert!(
        matches!(&errors[0], LinkError::UnresolvedReference { name, .. } if name == "q.N")
    );
}

#[test]
fn test_transitive_import_not_visible_without_public() {
    // a imports b, b imports c: a must not see c's types.
    let errors = try_link_files(&[
        (
            "a.proto",
            "syntax = \"proto3\";\npackage a;\nimport \"b.proto\";\nmessage M { c.C field = 1; }",
        ),
        ("b.proto", "package b;\nimport \"c.proto\";\nmessage B {}"),
        ("c.proto", "package c;\nmessage C {}"),
    ])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::UnresolvedReference { .. }));
}

#[test]
fn test_public_import_reexports() {
    let schema = link_files(&[
        (
            "a.proto",
            "syntax = \"proto3\";\npackage a;\nimport \"b.proto\";\nmessage M { c.C field = 1; }",
        ),
        ("b.proto", "package b;\nimport public \"c.proto\";"),
        ("c.proto", "package c;\nmessage C {}"),
    ]);
    assert!(schema.resolve("c.C").is_some());
}

#[test]
fn test_import_cycle_rejected() {
    let errors = try_link_files(&[
        ("a.proto", "import \"b.proto\";\nmessage A {}"),
        ("b.proto", "import \"a.proto\";\nmessage B {}"),
    ])
    .unwrap_err()
    .errors;
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, LinkError::CyclicImports { .. }))
    );
}

// ============================================================================
// Duplicates and validation
// ============================================================================

#[test]
fn test_duplicate_type_across_files() {
    let errors = try_link_files(&[
        ("a.proto", "package p;\nmessage M {}"),
        ("b.proto", "package p;\nmessage M {}"),
    ])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::DuplicateType { name, .. } if name == "p.M"));
}

#[test]
fn test_tag_collision() {
    let errors = try_link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\nmessage M { int32 a = 1; int32 b = 1; }",
    )])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::TagCollision { tag: 1, .. }));
}

#[test]
fn test_oneof_members_share_tag_space() {
    let errors = try_link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\nmessage M { int32 a = 1; oneof choice { int32 b = 1; } }",
    )])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::TagCollision { tag: 1, .. }));
}

#[rstest]
#[case("syntax = \"proto3\"; message M { int32 a = 0; }")]
#[case("syntax = \"proto3\"; message M { int32 a = 19500; }")]
#[case("syntax = \"proto3\"; message M { int32 a = 536870912; }")]
fn test_tag_out_of_range(#[case] input: &str) {
    let errors = try_link_files(&[("a.proto", input)]).unwrap_err().errors;
    assert!(matches!(&errors[0], LinkError::TagOutOfRange { .. }));
}

#[test]
fn test_reserved_tag_and_name() {
    let errors = try_link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\nmessage M { reserved 5 to 10; reserved \"gone\"; int32 gone = 7; }",
    )])
    .unwrap_err()
    .errors;
    assert!(errors.iter().any(|e| matches!(e, LinkError::TagReserved { tag: 7, .. })));
    assert!(errors.iter().any(|e| matches!(e, LinkError::NameReserved { name, .. } if name == "gone")));
}

#[test]
fn test_proto3_enum_must_lead_with_zero() {
    let errors = try_link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\nenum E { A = 1; B = 0; }",
    )])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::MissingZeroConstant { .. }));
}

#[test]
fn test_proto2_enum_may_start_nonzero() {
    assert!(try_link_files(&[("a.proto", "enum E { A = 5; }")]).is_ok());
}

#[test]
fn test_enum_alias_requires_allow_alias() {
    let errors = try_link_files(&[("a.proto", "enum E { A = 0; B = 0; }")])
        .unwrap_err()
        .errors;
    assert!(matches!(&errors[0], LinkError::DuplicateEnumTag { .. }));

    assert!(
        try_link_files(&[(
            "a.proto",
            "enum E { option allow_alias = true; A = 0; B = 0; }",
        )])
        .is_ok()
    );
}

#[test]
fn test_proto3_prohibitions() {
    let errors = try_link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\nmessage M { required int32 a = 1; int32 b = 2 [default = 5]; }",
    )])
    .unwrap_err()
    .errors;
    assert!(errors.iter().any(|e| matches!(e, LinkError::RequiredInProto3 { .. })));
    assert!(errors.iter().any(|e| matches!(e, LinkError::DefaultInProto3 { .. })));
}

#[test]
fn test_proto2_field_requires_label() {
    let errors = try_link_files(&[("a.proto", "message M { int32 x = 1; }")])
        .map(|_| Vec::new())
        .unwrap_or_else(|f| f.errors);
    assert!(errors.iter().any(|e| matches!(e, LinkError::MissingLabel { .. })));
}

#[test]
fn test_packed_only_on_repeated_scalars() {
    let errors = try_link_files(&[(
        "a.proto",
        "message M { optional string s = 1 [packed = true]; }",
    )])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::PackedNotAllowed { .. }));

    assert!(
        try_link_files(&[(
            "a.proto",
            "message M { repeated sint32 xs = 1 [packed = true]; }",
        )])
        .is_ok()
    );
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn test_map_field_desugars_to_entry_message() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage M { map<string, Val> by_name = 1; }\nmessage Val {}",
    )]);
    let entry_id = schema.resolve("p.M.ByNameEntry").expect("entry registered");
    let entry = schema.get(entry_id).as_message().unwrap();
    assert!(entry.map_entry);
    assert_eq!(entry.fields[0].name, "key");
    assert_eq!(entry.fields[0].tag, 1);
    assert_eq!(entry.fields[0].typ, TypeRef::Scalar(ScalarKind::String));
    assert_eq!(entry.fields[1].name, "value");
    assert_eq!(entry.fields[1].tag, 2);
    assert_eq!(
        entry.fields[1].typ,
        TypeRef::Resolved(schema.resolve("p.Val").unwrap())
    );

    let m = schema.resolve("p.M").unwrap();
    let field = &schema.get(m).as_message().unwrap().fields[0];
    assert_eq!(field.typ, TypeRef::Resolved(entry_id));
    assert_eq!(field.label, Label::Repeated);
}

#[rstest]
#[case("float")]
#[case("bytes")]
#[case("Val")]
fn test_invalid_map_keys(#[case] key: &str) {
    let input = format!(
        "syntax = \"proto3\";\nmessage M {{ map<{key}, int32> m = 1; }}\nmessage Val {{}}"
    );
    let errors = try_link_files(&[("a.proto", &input)]).unwrap_err().errors;
    assert!(matches!(&errors[0], LinkError::InvalidMapKey { .. }));
}

// ============================================================================
// Extensions
// ============================================================================

#[test]
fn test_extension_within_declared_range() {
    let schema = link_files(&[(
        "a.proto",
        "package p;\nmessage M { extensions 100 to 199; }\nextend M { optional int32 extra = 150; }",
    )]);
    let extends = &schema.files()[0].extends;
    assert_eq!(extends.len(), 1);
    assert_eq!(extends[0].extendee, schema.resolve("p.M").unwrap());
    assert!(extends[0].fields[0].is_extension);
}

#[test]
fn test_extension_outside_range_rejected() {
    let errors = try_link_files(&[(
        "a.proto",
        "package p;\nmessage M { extensions 100 to 199; }\nextend M { optional int32 extra = 50; }",
    )])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::ExtensionRangeMismatch { tag: 50, .. }));
}

#[test]
fn test_extension_tag_collision_with_field() {
    let errors = try_link_files(&[(
        "a.proto",
        "package p;\nmessage M { optional int32 x = 1; extensions 1 to 10; }\nextend M { optional int32 y = 1; }",
    )])
    .unwrap_err()
    .errors;
    assert!(errors.iter().any(|e| matches!(e, LinkError::TagCollision { tag: 1, .. })));
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_well_known_options_type_check() {
    assert!(
        try_link_files(&[(
            "a.proto",
            "option java_package = \"com.example\";\noption optimize_for = SPEED;",
        )])
        .is_ok()
    );
}

#[test]
fn test_unknown_option_rejected() {
    let errors = try_link_files(&[("a.proto", "option no_such_option = 1;")])
        .unwrap_err()
        .errors;
    assert!(matches!(&errors[0], LinkError::UnknownOption { .. }));
}

#[test]
fn test_option_value_type_mismatch() {
    let errors = try_link_files(&[("a.proto", "option java_package = 42;")])
        .unwrap_err()
        .errors;
    assert!(matches!(&errors[0], LinkError::OptionTypeMismatch { .. }));
}

#[test]
fn test_enum_option_constant_checked() {
    let errors = try_link_files(&[("a.proto", "option optimize_for = WARP_SPEED;")])
        .unwrap_err()
        .errors;
    assert!(matches!(&errors[0], LinkError::OptionTypeMismatch { .. }));
}

#[test]
fn test_custom_option_resolves_and_type_checks() {
    let files = [(
        "a.proto",
        "package demo;\nimport \"google/protobuf/descriptor.proto\";\n\
         extend google.protobuf.FieldOptions { optional string tag_name = 22101; }\n\
         message M { optional int32 x = 1 [(demo.tag_name) = \"x\"]; }",
    )];
    assert!(try_link_files(&files).is_ok());

    let bad = [(
        "a.proto",
        "package demo;\nimport \"google/protobuf/descriptor.proto\";\n\
         extend google.protobuf.FieldOptions { optional string tag_name = 22101; }\n\
         message M { optional int32 x = 1 [(demo.tag_name) = 42]; }",
    )];
    let errors = try_link_files(&bad).unwrap_err().errors;
    assert!(matches!(&errors[0], LinkError::OptionTypeMismatch { .. }));
}

#[test]
fn test_custom_option_records_option_type_edge() {
    let schema = link_files(&[(
        "a.proto",
        "package demo;\nimport \"google/protobuf/descriptor.proto\";\n\
         message Knobs { optional bool verbose = 1; }\n\
         extend google.protobuf.MessageOptions { optional Knobs knobs = 22102; }\n\
         message M { option (demo.knobs) = { verbose: true }; optional int32 x = 1; }",
    )]);
    let m = schema.resolve("demo.M").unwrap();
    let knobs = schema.resolve("demo.Knobs").unwrap();
    assert_eq!(
        schema.get(m).as_message().unwrap().options.resolved_types,
        vec![knobs]
    );
}

#[test]
fn test_default_value_checked_against_field_type() {
    let errors = try_link_files(&[(
        "a.proto",
        "message M { optional int32 x = 1 [default = \"nope\"]; }",
    )])
    .unwrap_err()
    .errors;
    assert!(matches!(&errors[0], LinkError::OptionTypeMismatch { .. }));

    assert!(
        try_link_files(&[(
            "a.proto",
            "enum E { A = 0; B = 1; }\nmessage M { optional E e = 1 [default = B]; }",
        )])
        .is_ok()
    );
}

// ============================================================================
// Error accumulation
// ============================================================================

#[test]
fn test_all_errors_surface_in_one_failure() {
    let failure = try_link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message M { Missing a = 1; AlsoMissing b = 1; }\n\
         message M2 { int32 c = 1; int32 d = 1; }",
    )])
    .unwrap_err();
    // Two unresolved references, one missing-label pair, one tag collision:
    // everything reported at once.
    assert!(failure.errors.len() >= 3, "got: {failure}");
    assert!(
        failure
            .errors
            .iter()
            .any(|e| matches!(e, LinkError::UnresolvedReference { .. }))
    );
    assert!(
        failure
            .errors
            .iter()
            .any(|e| matches!(e, LinkError::TagCollision { .. }))
    );
}

#[test]
fn test_error_order_is_deterministic() {
    let input = [(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage M { X a = 1; Y b = 2; Z c = 3; }",
    )];
    let first: Vec<String> = try_link_files(&input)
        .unwrap_err()
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect();
    let second: Vec<String> = try_link_files(&input)
        .unwrap_err()
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect();
    assert_eq!(first, second);
}
