use thiserror::Error;

use crate::dispatch::{DispatchError, GenerationError};
use crate::linker::LinkFailure;
use crate::loader::LoadError;
use crate::shake::{ConfigError, PruneError};

/// Any failure of a compilation run.
#[derive(Debug, Error)]
pub enum CompilerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Link(#[from] LinkFailure),

    #[error(transparent)]
    Prune(#[from] PruneError),

    #[error(transparent)]
    Generation(GenerationError),
}

impl From<DispatchError> for CompilerError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::Config(config) => CompilerError::Config(config),
            DispatchError::Generation(generation) => CompilerError::Generation(generation),
        }
    }
}
