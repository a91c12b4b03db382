//! Inference errors

use std::io;
use thiserror::Error;

/// Errors raised while building or inferring over the symbolic tree
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Name '{name}' is not defined")]
    NameNotFound { name: String },

    #[error("Attribute '{attribute}' not found on {target}")]
    AttributeNotFound { target: String, attribute: String },

    #[error("{target} is not callable")]
    NotCallable { target: String },

    #[error("Module '{0}' not found")]
    ModuleNotFound(String),

    #[error("Inference exceeded the maximum depth of {max_depth}")]
    RecursionLimit { max_depth: usize },

    #[error("Unsupported AST version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid module dump: {0}")]
    InvalidDump(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;
