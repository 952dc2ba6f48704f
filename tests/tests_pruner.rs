//! Pruner tests: seeding, transitive reachability, member filtering,
//! enclosure retention, idempotence.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

use helpers::link_files;
use protolink::schema::Schema;
use protolink::shake::{IdentifierSet, PruneError, Pruner};

fn prune(schema: &Schema, includes: &[&str], excludes: &[&str]) -> Schema {
    try_prune(schema, includes, excludes).expect("prune failed")
}

fn try_prune(
    schema: &Schema,
    includes: &[&str],
    excludes: &[&str],
) -> Result<Schema, PruneError> {
    let includes: Vec<String> = includes.iter().map(|s| s.to_string()).collect();
    let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
    let mut rules = IdentifierSet::new(&includes, &excludes).unwrap();
    Pruner::new(schema, &mut rules).prune()
}

fn names(schema: &Schema) -> Vec<&str> {
    schema.qualified_names().collect()
}

#[test]
fn test_fast_path_returns_everything() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage Keep {}\nmessage Drop {}",
    )]);
    let pruned = prune(&schema, &["*"], &[]);
    assert_eq!(names(&pruned), names(&schema));
}

#[test]
fn test_rubbish_package_removed() {
    let schema = link_files(&[
        (
            "a.proto",
            "syntax = \"proto3\";\npackage p;\nmessage Keep {}\nmessage Drop {}",
        ),
        ("v.proto", "syntax = \"proto3\";\npackage vitess;\nmessage X {}"),
    ]);
    let pruned = prune(&schema, &[], &["vitess.*"]);
    assert!(pruned.resolve("p.Keep").is_some());
    assert!(pruned.resolve("p.Drop").is_some());
    assert!(pruned.resolve("vitess.X").is_none());
    // The vitess file lost its only declaration and drops entirely.
    assert!(
        !pruned
            .files()
            .iter()
            .any(|f| f.location.path() == "v.proto")
    );
}

#[test]
fn test_roots_pull_referenced_types() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message Root { Dep d = 1; }\nmessage Dep { Deeper x = 1; }\n\
         message Deeper {}\nmessage Unrelated {}",
    )]);
    let pruned = prune(&schema, &["p.Root"], &[]);
    assert_eq!(names(&pruned), vec!["p.Root", "p.Dep", "p.Deeper"]);
}

#[test]
fn test_service_pulls_rpc_types() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message Req {}\nmessage Resp {}\nmessage Unused {}\n\
         service S { rpc Call (Req) returns (Resp); }",
    )]);
    let pruned = prune(&schema, &["p.S"], &[]);
    assert_eq!(names(&pruned), vec!["p.Req", "p.Resp", "p.S"]);
}

#[test]
fn test_excluded_field_drops_with_its_edge() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message Root { Wanted w = 1; Unwanted u = 2; }\n\
         message Wanted {}\nmessage Unwanted {}",
    )]);
    let pruned = prune(&schema, &["p.Root"], &["p.Root#u"]);
    assert_eq!(names(&pruned), vec!["p.Root", "p.Wanted"]);
    let root = pruned.get(pruned.resolve("p.Root").unwrap()).as_message().unwrap();
    let field_names: Vec<&str> = root.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(field_names, vec!["w"]);
}

#[test]
fn test_field_dropped_when_type_excluded() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message Root { Gone g = 1; int32 keep = 2; }\nmessage Gone {}",
    )]);
    let pruned = prune(&schema, &["p.Root"], &["p.Gone"]);
    assert_eq!(names(&pruned), vec!["p.Root"]);
    let root = pruned.get(pruned.resolve("p.Root").unwrap()).as_message().unwrap();
    assert_eq!(root.fields.len(), 1);
    assert_eq!(root.fields[0].name, "keep");
}

#[test]
fn test_member_only_include_restricts_members() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage M { int32 a = 1; int32 b = 2; }",
    )]);
    let pruned = prune(&schema, &["p.M#a"], &[]);
    let m = pruned.get(pruned.resolve("p.M").unwrap()).as_message().unwrap();
    let field_names: Vec<&str> = m.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(field_names, vec!["a"]);
}

#[test]
fn test_enum_constant_excluded() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nenum E { ZERO = 0; OLD = 1; NEW = 2; }",
    )]);
    let pruned = prune(&schema, &["p.E"], &["p.E#OLD"]);
    let e = pruned.get(pruned.resolve("p.E").unwrap()).as_enum().unwrap();
    let constants: Vec<&str> = e.constants.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(constants, vec!["ZERO", "NEW"]);
}

#[test]
fn test_pruning_zero_constant_fails() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nenum E { ZERO = 0; ONE = 1; }",
    )]);
    let error = try_prune(&schema, &["p.E"], &["p.E#ZERO"]).unwrap_err();
    assert!(matches!(error, PruneError::EmptyEnum { name } if name == "p.E"));
}

#[test]
fn test_pruning_all_constants_fails() {
    let schema = link_files(&[(
        "a.proto",
        "package p;\nenum E { A = 1; }",
    )]);
    let error = try_prune(&schema, &["p.E"], &["p.E#A"]).unwrap_err();
    assert!(matches!(error, PruneError::EmptyEnum { .. }));
}

#[test]
fn test_nested_root_keeps_enclosure_as_container() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message Outer { int32 noise = 1; message Inner { int32 x = 1; } }",
    )]);
    let pruned = prune(&schema, &["p.Outer.Inner"], &[]);
    assert_eq!(names(&pruned), vec!["p.Outer", "p.Outer.Inner"]);
    let outer = pruned.get(pruned.resolve("p.Outer").unwrap()).as_message().unwrap();
    // Outer survives only to scope Inner; its own members are gone.
    assert!(outer.fields.is_empty());
    let inner = pruned.get(pruned.resolve("p.Outer.Inner").unwrap()).as_message().unwrap();
    assert_eq!(inner.fields.len(), 1);
}

#[test]
fn test_map_entry_follows_its_field() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message Root { map<string, Val> vals = 1; }\nmessage Val {}",
    )]);
    let pruned = prune(&schema, &["p.Root"], &[]);
    assert!(pruned.resolve("p.Root.ValsEntry").is_some());
    assert!(pruned.resolve("p.Val").is_some());
}

#[test]
fn test_custom_option_type_reachable() {
    let schema = link_files(&[(
        "a.proto",
        "package demo;\nimport \"google/protobuf/descriptor.proto\";\n\
         message Knobs { optional bool verbose = 1; }\n\
         extend google.protobuf.MessageOptions { optional Knobs knobs = 22102; }\n\
         message Root { option (demo.knobs) = { verbose: true }; optional int32 x = 1; }",
    )]);
    let pruned = prune(&schema, &["demo.Root"], &[]);
    assert!(pruned.resolve("demo.Knobs").is_some(), "option type must survive");
}

#[test]
fn test_original_schema_untouched() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\nmessage Keep {}\nmessage Drop {}",
    )]);
    let before = names(&schema).len();
    let _ = prune(&schema, &["p.Keep"], &[]);
    assert_eq!(names(&schema).len(), before);
}

#[test]
fn test_pruning_is_idempotent() {
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message Root { Dep d = 1; int32 noise = 2; }\nmessage Dep {}\nmessage Unused {}",
    )]);
    let once = prune(&schema, &["p.Root"], &["p.Root#noise"]);
    let twice = prune(&once, &["p.Root"], &["p.Root#noise"]);
    assert_eq!(names(&once), names(&twice));
    let fields = |s: &Schema| {
        s.get(s.resolve("p.Root").unwrap())
            .as_message()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(fields(&once), fields(&twice));
}

#[test]
fn test_reachability_closure_property() {
    // Every surviving declaration is reachable from the seeds.
    let schema = link_files(&[(
        "a.proto",
        "syntax = \"proto3\";\npackage p;\n\
         message A { B b = 1; }\nmessage B { C c = 1; }\nmessage C {}\n\
         message Island { D d = 1; }\nmessage D {}",
    )]);
    let pruned = prune(&schema, &["p.A"], &[]);
    assert_eq!(names(&pruned), vec!["p.A", "p.B", "p.C"]);
}
