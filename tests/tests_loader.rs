//! SchemaLoader tests: transitive import loading, source/proto path
//! precedence, and failure modes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use protolink::core::Location;
use protolink::loader::{DESCRIPTOR_PROTO_PATH, LoadError, SchemaLoader};
use protolink::source::StdFilesystem;
use tempfile::TempDir;

fn write_file(dir: &Path, rel: &str, text: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn root(path: &Path) -> Location {
    Location::root(path.to_string_lossy())
}

#[test]
fn test_loads_source_files_and_imports() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "a.proto",
        "import \"q.proto\";\nmessage M {}",
    );
    write_file(dir.path(), "q.proto", "message N {}");

    let fs = StdFilesystem;
    let loaded = SchemaLoader::new(&fs, vec![root(dir.path())], vec![])
        .load()
        .unwrap();

    let paths: Vec<&str> = loaded.files.iter().map(|f| f.location.path()).collect();
    assert!(paths.contains(&"a.proto"));
    assert!(paths.contains(&"q.proto"));
    // Both enumerated under the source root, so both are source paths.
    assert!(loaded.source_paths.contains("a.proto"));
    assert!(loaded.source_paths.contains("q.proto"));
}

#[test]
fn test_proto_path_files_are_not_source() {
    let source = TempDir::new().unwrap();
    let deps = TempDir::new().unwrap();
    write_file(source.path(), "a.proto", "import \"q.proto\";\nmessage M {}");
    write_file(deps.path(), "q.proto", "message N {}");

    let fs = StdFilesystem;
    let loaded = SchemaLoader::new(&fs, vec![root(source.path())], vec![root(deps.path())])
        .load()
        .unwrap();

    assert!(loaded.files.iter().any(|f| f.location.path() == "q.proto"));
    assert!(loaded.source_paths.contains("a.proto"));
    assert!(!loaded.source_paths.contains("q.proto"));
}

#[test]
fn test_transitive_imports_follow() {
    let source = TempDir::new().unwrap();
    let deps = TempDir::new().unwrap();
    write_file(source.path(), "a.proto", "import \"b.proto\";");
    write_file(deps.path(), "b.proto", "import \"c.proto\";");
    write_file(deps.path(), "c.proto", "message C {}");

    let fs = StdFilesystem;
    let loaded = SchemaLoader::new(&fs, vec![root(source.path())], vec![root(deps.path())])
        .load()
        .unwrap();
    assert!(loaded.files.iter().any(|f| f.location.path() == "c.proto"));
}

#[test]
fn test_import_not_found() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.proto", "import \"missing.proto\";");

    let fs = StdFilesystem;
    let error = SchemaLoader::new(&fs, vec![root(dir.path())], vec![])
        .load()
        .unwrap_err();
    match error {
        LoadError::ImportNotFound { import, importer } => {
            assert_eq!(import, "missing.proto");
            assert!(importer.contains("a.proto"));
        }
        other => panic!("expected ImportNotFound, got {other:?}"),
    }
}

#[test]
fn test_duplicate_source_path_conflict() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_file(first.path(), "same.proto", "message A {}");
    write_file(second.path(), "same.proto", "message B {}");

    let fs = StdFilesystem;
    let error = SchemaLoader::new(&fs, vec![root(first.path()), root(second.path())], vec![])
        .load()
        .unwrap_err();
    assert!(matches!(error, LoadError::DuplicatePath { path, .. } if path == "same.proto"));
}

#[test]
fn test_source_root_shadows_proto_root() {
    let source = TempDir::new().unwrap();
    let deps = TempDir::new().unwrap();
    write_file(source.path(), "a.proto", "import \"shared.proto\";");
    write_file(source.path(), "shared.proto", "message Ours {}");
    write_file(deps.path(), "shared.proto", "message Theirs {}");

    let fs = StdFilesystem;
    let loaded = SchemaLoader::new(&fs, vec![root(source.path())], vec![root(deps.path())])
        .load()
        .unwrap();
    let shared = loaded
        .files
        .iter()
        .find(|f| f.location.path() == "shared.proto")
        .unwrap();
    assert_eq!(shared.types[0].name(), "Ours");
}

#[test]
fn test_descriptor_loads_implicitly() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.proto", "message M {}");

    let fs = StdFilesystem;
    let loaded = SchemaLoader::new(&fs, vec![root(dir.path())], vec![])
        .load()
        .unwrap();
    let descriptor = loaded
        .files
        .iter()
        .find(|f| f.location.path() == DESCRIPTOR_PROTO_PATH)
        .expect("bundled descriptor should load");
    assert_eq!(descriptor.package.as_deref(), Some("google.protobuf"));
    assert!(!loaded.source_paths.contains(DESCRIPTOR_PROTO_PATH));
}

#[test]
fn test_descriptor_import_resolves_without_search_path() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "a.proto",
        "import \"google/protobuf/descriptor.proto\";\nmessage M {}",
    );

    let fs = StdFilesystem;
    assert!(
        SchemaLoader::new(&fs, vec![root(dir.path())], vec![])
            .load()
            .is_ok()
    );
}

#[test]
fn test_user_descriptor_takes_precedence() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.proto", "import \"google/protobuf/descriptor.proto\";");
    write_file(
        dir.path(),
        "google/protobuf/descriptor.proto",
        "package google.protobuf;\nmessage FileOptions { extensions 1000 to max; }",
    );

    let fs = StdFilesystem;
    let loaded = SchemaLoader::new(&fs, vec![root(dir.path())], vec![])
        .load()
        .unwrap();
    let descriptor = loaded
        .files
        .iter()
        .find(|f| f.location.path() == DESCRIPTOR_PROTO_PATH)
        .unwrap();
    // The user's copy, not the bundled one: it has exactly one type.
    assert_eq!(descriptor.types.len(), 1);
    assert!(!descriptor.location.base().is_empty());
}

#[test]
fn test_parse_error_surfaces_immediately() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "bad.proto", "message {}");

    let fs = StdFilesystem;
    let error = SchemaLoader::new(&fs, vec![root(dir.path())], vec![])
        .load()
        .unwrap_err();
    assert!(matches!(error, LoadError::Parse(_)));
}
