//! Brain for the `functools` module
//!
//! `functools.lru_cache(...)` patches three attributes onto the function it
//! decorates: `__wrapped__`, `cache_info` and `cache_clear`. Decorated
//! functions are replaced by an augmented copy carrying [`LruWrappedModel`],
//! which answers for those attributes.

use crate::ast::{self, Constant, Expr, Param, Stmt};
use crate::manager::Session;
use crate::object_model::AttributeModel;
use crate::settings::BrainSettings;
use crate::span::Span;
use crate::transforms::{NodeCategory, TransformRegistry};
use crate::tree::{FunctionDef, NodeId, NodeKind, Tree};
use crate::value::{BoundMethod, CallResult, Callable, SyntheticFunction, Value};
use std::sync::Arc;
use tracing::trace;

/// Qualified name of the recognised decorator
pub const LRU_CACHE: &str = "functools.lru_cache";

/// Special attributes of a function decorated with `functools.lru_cache`
#[derive(Debug, Clone, Copy)]
pub struct LruWrappedModel {
    instance: NodeId,
}

impl LruWrappedModel {
    const NAMES: &'static [&'static str] = &["__wrapped__", "cache_info", "cache_clear"];

    pub fn new(instance: NodeId) -> Self {
        Self { instance }
    }

    /// `cache_info()` always reports an empty cache: `(0, 0, 0, 0)`
    fn cache_info(&self) -> Value {
        Value::BoundMethod(BoundMethod::new(
            Callable::Function(self.instance),
            Value::Node(self.instance),
            CallResult::Fixed(Box::new(Value::int_tuple(&[0, 0, 0, 0]))),
        ))
    }

    /// `cache_clear` is bound to the scope enclosing the decorated function
    fn cache_clear(&self, tree: &Tree) -> Value {
        let bound = tree
            .parent(self.instance)
            .map(|parent| Value::Node(tree.scope(parent)))
            .unwrap_or(Value::Uninferable);

        Value::BoundMethod(BoundMethod::new(
            Callable::Synthetic(SyntheticFunction::new("cache_clear", &["self"])),
            bound,
            CallResult::NoValue,
        ))
    }
}

impl AttributeModel for LruWrappedModel {
    fn attribute_names(&self) -> &'static [&'static str] {
        Self::NAMES
    }

    fn lookup(&self, tree: &Tree, name: &str) -> Option<Value> {
        match name {
            "__wrapped__" => Some(Value::Node(self.instance)),
            "cache_info" => Some(self.cache_info()),
            "cache_clear" => Some(self.cache_clear(tree)),
            _ => None,
        }
    }
}

/// Recognises functions decorated with `functools.lru_cache`
#[derive(Debug, Clone, Copy, Default)]
pub struct LruCachePredicate {
    /// Also accept the decorator written without a call (`@lru_cache`)
    pub accept_bare: bool,
}

impl LruCachePredicate {
    pub fn matches(&self, session: &Session, node: NodeId) -> bool {
        let tree = session.tree();
        let Some(func) = tree.function(node) else {
            return false;
        };
        if func.decorators.is_empty() {
            return false;
        }

        let inferencer = session.inferencer();
        for decorator in &func.decorators {
            let target = match tree.kind(*decorator) {
                NodeKind::Call { func, .. } => *func,
                _ if self.accept_bare => *decorator,
                _ => {
                    trace!(decorator = %decorator, "skipping uncalled decorator");
                    continue;
                }
            };

            // None covers both failed and ambiguous inference
            let Some(value) = inferencer.safe_infer(target) else {
                continue;
            };
            let Some(candidate) = value.as_node() else {
                continue;
            };
            if tree.function(candidate).is_some() && tree.qname(candidate) == LRU_CACHE {
                trace!(function = %func.name, "decorated with {}", LRU_CACHE);
                return true;
            }
        }
        false
    }
}

/// Whether `node` is a function with a `functools.lru_cache(...)` decorator
pub fn looks_like_lru_cache(session: &Session, node: NodeId) -> bool {
    LruCachePredicate::default().matches(session, node)
}

/// Replace `node` with an augmented function carrying [`LruWrappedModel`].
///
/// The new node shares the original's children; they keep their parent link
/// to the original node.
pub fn transform_lru_cache(tree: &mut Tree, node: NodeId) -> NodeId {
    let Some(original) = tree.function(node) else {
        return node;
    };
    let name = original.name.clone();
    let doc = original.doc.clone();
    let args = original.args;
    let body = original.body.clone();
    let decorators = original.decorators.clone();
    let returns = original.returns;
    let span = tree.node(node).span;
    let parent = tree.parent(node);

    let augmented = tree.alloc(
        NodeKind::FunctionDef(FunctionDef::new(name).with_doc(doc)),
        span,
        parent,
    );
    if let Some(func) = tree.function_mut(augmented) {
        func.install_special_attributes(Arc::new(LruWrappedModel::new(augmented)));
        func.postinit(args, body, decorators, returns);
    }
    augmented
}

/// Register the `lru_cache` transform for function definitions
pub fn register(registry: &mut TransformRegistry, settings: &BrainSettings) {
    let predicate = LruCachePredicate {
        accept_bare: settings.bare_decorators,
    };
    registry.register(
        NodeCategory::FunctionDef,
        "functools.lru_cache",
        move |session: &Session, node: NodeId| predicate.matches(session, node),
        transform_lru_cache,
    );
}

/// Stub of the `functools` module
pub fn stub() -> ast::Module {
    let lru_cache = ast::FunctionDef::new("lru_cache", &[])
        .with_params(vec![
            Param::with_default("maxsize", Expr::int(128)),
            Param::with_default("typed", Expr::Constant(Constant::Bool(false), Span::DUMMY)),
        ])
        .with_doc("Least-recently-used cache decorator.")
        .with_body(vec![
            ast::FunctionDef::new("decorating_function", &["user_function"])
                .with_body(vec![Stmt::ret(Expr::name("user_function"))])
                .into(),
            Stmt::ret(Expr::name("decorating_function")),
        ]);

    let wraps = ast::FunctionDef::new("wraps", &["wrapped"])
        .with_doc("Decorator factory to apply update_wrapper() to a wrapper function.");

    ast::Module::new("functools", vec![lru_cache.into(), wraps.into()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Manager;

    #[test]
    fn test_stub_defines_lru_cache() {
        let manager = Manager::new();
        let functools = manager.module("functools").unwrap();
        let lru_cache = manager.inferencer().local(functools, "lru_cache").unwrap();

        assert_eq!(manager.tree().qname(lru_cache), LRU_CACHE);
    }

    #[test]
    fn test_stub_lru_cache_is_not_itself_augmented() {
        let manager = Manager::new();
        let functools = manager.module("functools").unwrap();
        for stmt in manager.tree().body(functools) {
            assert!(!manager.tree().function(*stmt).unwrap().is_augmented());
        }
    }

    #[test]
    fn test_transform_ignores_non_functions() {
        let mut tree = Tree::new();
        let node = tree.alloc(NodeKind::Pass, Span::DUMMY, None);
        assert_eq!(transform_lru_cache(&mut tree, node), node);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_model_answers_only_its_names() {
        let mut tree = Tree::new();
        let node = tree.alloc(
            NodeKind::FunctionDef(FunctionDef::new("f")),
            Span::DUMMY,
            None,
        );
        let model = LruWrappedModel::new(node);

        assert!(model.provides("cache_clear"));
        assert_eq!(model.lookup(&tree, "__name__"), None);
        assert_eq!(model.lookup(&tree, "__wrapped__"), Some(Value::Node(node)));
    }

    #[test]
    fn test_cache_clear_on_detached_function_is_unbound() {
        let mut tree = Tree::new();
        let node = tree.alloc(
            NodeKind::FunctionDef(FunctionDef::new("f")),
            Span::DUMMY,
            None,
        );
        let clear = LruWrappedModel::new(node).lookup(&tree, "cache_clear").unwrap();
        let method = clear.as_bound_method().unwrap();

        assert_eq!(*method.bound, Value::Uninferable);
        assert_eq!(method.result, CallResult::NoValue);
    }
}
