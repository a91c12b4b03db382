//! Shared test utilities
//!
//! Helpers for building modules through a [`Manager`] and inspecting what the
//! engine infers about them.

#![allow(dead_code)]

use pyrite_infer::ast::{self, Expr, Module, Stmt};
use pyrite_infer::{InferenceResult, Manager, NodeId, Settings, Value};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// Build `module` with default settings
pub fn build(module: Module) -> (Manager, NodeId) {
    build_with(Settings::default(), module)
}

pub fn build_with(settings: Settings, module: Module) -> (Manager, NodeId) {
    let mut manager = Manager::with_settings(settings);
    let root = manager.build_module(&module);
    (manager, root)
}

/// Module `app` importing functools both ways, followed by `body`
pub fn app(body: Vec<Stmt>) -> Module {
    let mut stmts = vec![
        Stmt::import("functools"),
        Stmt::import_from("functools", &["lru_cache"]),
    ];
    stmts.extend(body);
    Module::new("app", stmts)
}

/// `def f(): return 1`, decorated with each of `decorators`
pub fn decorated(name: &str, decorators: Vec<Expr>) -> Stmt {
    let mut func =
        ast::FunctionDef::new(name, &[]).with_body(vec![Stmt::ret(Expr::int(1))]);
    for decorator in decorators {
        func = func.decorated(decorator);
    }
    func.into()
}

/// Node bound to `name` in `scope`
///
/// # Panics
/// If `scope` has no binding for `name`
pub fn local(manager: &Manager, scope: NodeId, name: &str) -> NodeId {
    manager
        .inferencer()
        .local(scope, name)
        .unwrap_or_else(|| panic!("no binding for {:?}", name))
}

/// Whether the function bound to `name` in `scope` carries special attributes
pub fn is_augmented(manager: &Manager, scope: NodeId, name: &str) -> bool {
    let node = local(manager, scope, name);
    manager
        .tree()
        .function(node)
        .unwrap_or_else(|| panic!("{:?} is not a function", name))
        .is_augmented()
}

pub fn infer_name(manager: &Manager, scope: NodeId, name: &str) -> InferenceResult<Vec<Value>> {
    manager.inferencer().infer_name(scope, name)
}

/// Assert that `name` in `scope` infers to exactly `expected`
pub fn assert_infers(manager: &Manager, scope: NodeId, name: &str, expected: Value) {
    match infer_name(manager, scope, name) {
        Ok(values) => assert_eq!(values, vec![expected]),
        Err(err) => panic!("inference of {:?} failed: {}", name, err),
    }
}

pub fn getattr(manager: &Manager, node: NodeId, attribute: &str) -> InferenceResult<Vec<Value>> {
    manager.inferencer().getattr(&Value::Node(node), attribute)
}
