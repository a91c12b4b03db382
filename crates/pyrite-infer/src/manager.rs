//! Module manager
//!
//! Owns the symbolic tree, the module map and the transform registry. Every
//! module built through a [`Manager`] is lowered into the shared tree and then
//! handed to the registered transforms.

use crate::ast::{self, VersionedModule, AST_VERSION};
use crate::brain;
use crate::error::{InferenceError, InferenceResult};
use crate::inference::Inferencer;
use crate::lower::Lowerer;
use crate::settings::Settings;
use crate::transforms::{TransformRegistry, TransformVisitor};
use crate::tree::{NodeId, Tree};
use pyrite_config::Config;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// The analysed program: tree, modules by dotted name, settings
#[derive(Debug)]
pub struct Session {
    tree: Tree,
    modules: HashMap<String, NodeId>,
    settings: Settings,
}

impl Session {
    fn new(settings: Settings) -> Self {
        Self {
            tree: Tree::new(),
            modules: HashMap::new(),
            settings,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Root node of a module by dotted name
    pub fn module(&self, name: &str) -> Option<NodeId> {
        self.modules.get(name).copied()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn inferencer(&self) -> Inferencer<'_> {
        Inferencer::new(self)
    }
}

/// Builds modules and applies brain transforms to them
#[derive(Debug)]
pub struct Manager {
    session: Session,
    registry: TransformRegistry,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Manager with default settings and all default brains
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let mut registry = TransformRegistry::new();
        brain::register_all(&mut registry, &settings.brains);

        let mut manager = Self {
            session: Session::new(settings),
            registry,
        };
        for stub in brain::stub_modules() {
            manager.build_module(&stub);
        }
        manager
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_settings(Settings::from_config(config))
    }

    /// Lower `module`, register it by name and apply transforms.
    /// Returns the module's root node.
    pub fn build_module(&mut self, module: &ast::Module) -> NodeId {
        let root = Lowerer::new(self.session.tree_mut()).lower_module(module);
        self.session.modules.insert(module.name.clone(), root);

        let applied = TransformVisitor::new(&self.registry).visit(&mut self.session, root);
        debug!(
            module = %module.name,
            nodes = self.session.tree.len(),
            transforms = applied,
            "built module"
        );
        root
    }

    /// Build a module from a versioned JSON dump
    pub fn load_module_json(&mut self, json: &str) -> InferenceResult<NodeId> {
        let dump = VersionedModule::from_json(json)?;
        if dump.ast_version != AST_VERSION {
            return Err(InferenceError::UnsupportedVersion {
                found: dump.ast_version,
                expected: AST_VERSION,
            });
        }
        Ok(self.build_module(&dump.module))
    }

    pub fn load_module_file(&mut self, path: &Path) -> InferenceResult<NodeId> {
        let json = fs::read_to_string(path)?;
        self.load_module_json(&json)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tree(&self) -> &Tree {
        self.session.tree()
    }

    pub fn inferencer(&self) -> Inferencer<'_> {
        self.session.inferencer()
    }

    pub fn module(&self, name: &str) -> Option<NodeId> {
        self.session.module(name)
    }

    pub fn settings(&self) -> &Settings {
        self.session.settings()
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Register additional transforms; they apply to modules built afterwards
    pub fn registry_mut(&mut self) -> &mut TransformRegistry {
        &mut self.registry
    }
}
