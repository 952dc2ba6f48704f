//! Bundled descriptor definitions.
//!
//! Option resolution needs the `google.protobuf.*Options` messages. They are
//! injected during loading from this bundled source rather than baked into a
//! process-wide singleton; a real `google/protobuf/descriptor.proto` found
//! on the search path takes precedence.

use once_cell::sync::Lazy;

use crate::core::Location;
use crate::parser::{self, ParseError, ast::FileNode};

/// Import path under which the bundled definitions are registered.
pub const DESCRIPTOR_PROTO_PATH: &str = "google/protobuf/descriptor.proto";

/// The subset of descriptor.proto that matters to option resolution: the
/// options messages, their well-known fields, and their extension ranges.
const DESCRIPTOR_PROTO: &str = r#"
syntax = "proto2";

package google.protobuf;

message FileOptions {
  optional string java_package = 1;
  optional string java_outer_classname = 8;
  optional bool java_multiple_files = 10 [default = false];
  optional bool java_generic_services = 17 [default = false];
  optional OptimizeMode optimize_for = 9 [default = SPEED];
  optional string go_package = 11;
  optional bool deprecated = 23 [default = false];
  optional bool cc_enable_arenas = 31 [default = true];
  optional string objc_class_prefix = 36;
  optional string csharp_namespace = 37;
  optional string swift_prefix = 39;
  optional string php_namespace = 41;
  optional string ruby_package = 45;

  enum OptimizeMode {
    SPEED = 1;
    CODE_SIZE = 2;
    LITE_RUNTIME = 3;
  }

  extensions 1000 to max;
}

message MessageOptions {
  optional bool message_set_wire_format = 1 [default = false];
  optional bool no_standard_descriptor_accessor = 2 [default = false];
  optional bool deprecated = 3 [default = false];
  optional bool map_entry = 7;

  extensions 1000 to max;
}

message FieldOptions {
  optional CType ctype = 1 [default = STRING];
  optional bool packed = 2;
  optional JSType jstype = 6 [default = JS_NORMAL];
  optional bool lazy = 5 [default = false];
  optional bool deprecated = 3 [default = false];

  enum CType {
    STRING = 0;
    CORD = 1;
    STRING_PIECE = 2;
  }

  enum JSType {
    JS_NORMAL = 0;
    JS_STRING = 1;
    JS_NUMBER = 2;
  }

  extensions 1000 to max;
}

message OneofOptions {
  extensions 1000 to max;
}

message EnumOptions {
  optional bool allow_alias = 2;
  optional bool deprecated = 3 [default = false];

  extensions 1000 to max;
}

message EnumValueOptions {
  optional bool deprecated = 1 [default = false];

  extensions 1000 to max;
}

message ServiceOptions {
  optional bool deprecated = 33 [default = false];

  extensions 1000 to max;
}

message MethodOptions {
  optional bool deprecated = 33 [default = false];
  optional IdempotencyLevel idempotency_level = 34 [default = IDEMPOTENCY_UNKNOWN];

  enum IdempotencyLevel {
    IDEMPOTENCY_UNKNOWN = 0;
    NO_SIDE_EFFECTS = 1;
    IDEMPOTENT = 2;
  }

  extensions 1000 to max;
}
"#;

static BUNDLED: Lazy<Result<FileNode, ParseError>> = Lazy::new(|| {
    let location = Location::synthetic(DESCRIPTOR_PROTO_PATH);
    parser::parse_proto(&location, DESCRIPTOR_PROTO)
});

/// The parsed bundled descriptor file.
pub fn bundled_descriptor() -> Result<FileNode, ParseError> {
    BUNDLED.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_descriptor_parses() {
        let file = bundled_descriptor().unwrap();
        assert_eq!(file.package.as_deref(), Some("google.protobuf"));
        assert_eq!(file.location.path(), DESCRIPTOR_PROTO_PATH);
        let names: Vec<_> = file.types.iter().map(|t| t.name().to_string()).collect();
        assert!(names.contains(&"FileOptions".to_string()));
        assert!(names.contains(&"MethodOptions".to_string()));
    }
}
