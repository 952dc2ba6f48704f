//! # Tree shaking
//!
//! [`IdentifierSet`] compiles include/exclude rule lists over qualified
//! names; [`Pruner`] computes the transitive closure of reachable
//! declarations and rewrites the schema to just those.

pub mod identifier_set;
pub mod pruner;

pub use identifier_set::{IdentifierSet, Rule};
pub use pruner::{PruneError, Pruner};

use thiserror::Error;

/// Configuration errors: malformed or redundant rules, unknown targets.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("malformed rule '{rule}'")]
    MalformedRule { rule: String },

    #[error("rule '{rule}' is redundant: '{covered_by}' already covers it")]
    RedundantRule { rule: String, covered_by: String },

    #[error("unknown target '{name}'")]
    UnknownTarget { name: String },
}
