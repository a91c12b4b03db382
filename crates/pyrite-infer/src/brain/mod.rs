//! Brain plugins
//!
//! Each brain teaches the engine about a library whose runtime behaviour is
//! invisible in its source: it registers transforms for the nodes it
//! recognises and may provide stub modules for the library itself.

pub mod functools;

use crate::ast;
use crate::settings::BrainSettings;
use crate::transforms::TransformRegistry;

/// Register the transforms of every enabled brain
pub fn register_all(registry: &mut TransformRegistry, settings: &BrainSettings) {
    if settings.functools {
        functools::register(registry, settings);
    }
}

/// Library modules modelled by the brains, loaded into every manager
pub fn stub_modules() -> Vec<ast::Module> {
    vec![functools::stub()]
}
