//! Pyrite Infer - static inference over Python module structure
//!
//! This library provides:
//! - An owned syntax layer with a versioned JSON dump format
//! - A symbolic tree with scope and qualified-name resolution
//! - Value inference for names, attributes and calls
//! - Brain plugins that rewrite nodes whose runtime behaviour is invisible in
//!   source, starting with `functools.lru_cache`

/// Pyrite infer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod ast;
pub mod brain;
pub mod error;
pub mod inference;
pub mod logging;
pub mod lower;
pub mod manager;
pub mod object_model;
pub mod settings;
pub mod span;
pub mod transforms;
pub mod tree;
pub mod value;

// Re-export commonly used types
pub use ast::{VersionedModule, AST_VERSION};
pub use brain::functools::{looks_like_lru_cache, transform_lru_cache, LruWrappedModel, LRU_CACHE};
pub use error::{InferenceError, InferenceResult};
pub use inference::{InferenceContext, Inferencer};
pub use manager::{Manager, Session};
pub use object_model::{AttributeModel, FunctionModel};
pub use settings::{BrainSettings, LogSettings, Settings};
pub use span::Span;
pub use transforms::{NodeCategory, TransformRegistry};
pub use tree::{NodeId, NodeKind, Tree};
pub use value::{BoundMethod, CallResult, Callable, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        assert_eq!(VERSION, "0.1.0");
    }
}
