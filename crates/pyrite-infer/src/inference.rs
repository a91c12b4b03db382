//! Inference over the symbolic tree
//!
//! Provides:
//! - Expression inference with a recursion guard
//! - Name lookup following Python scope rules
//! - Attribute resolution, consulting special attribute models first
//! - Call result inference for functions, classes and bound methods

use crate::ast::{Alias, Constant};
use crate::error::{InferenceError, InferenceResult};
use crate::manager::Session;
use crate::object_model::{AttributeModel, FunctionModel};
use crate::tree::{NodeId, NodeKind, Tree};
use crate::value::{BoundMethod, CallResult, Callable, Value};
use std::collections::HashSet;
use tracing::{trace, warn};

/// State carried through one inference request
#[derive(Debug, Clone)]
pub struct InferenceContext {
    depth: usize,
    max_depth: usize,
    /// Nodes currently being inferred
    path: HashSet<NodeId>,
}

impl InferenceContext {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
            path: HashSet::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter `node`. Returns `Ok(false)` when `node` is already being
    /// inferred further up the stack.
    fn enter(&mut self, node: NodeId) -> InferenceResult<bool> {
        if self.path.contains(&node) {
            return Ok(false);
        }
        if self.depth >= self.max_depth {
            warn!(node = %node, max_depth = self.max_depth, "inference recursion limit reached");
            return Err(InferenceError::RecursionLimit {
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        self.path.insert(node);
        Ok(true)
    }

    fn leave(&mut self, node: NodeId) {
        self.depth -= 1;
        self.path.remove(&node);
    }
}

/// Inference engine over one [`Session`]
#[derive(Clone, Copy)]
pub struct Inferencer<'s> {
    session: &'s Session,
}

impl<'s> Inferencer<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    fn tree(&self) -> &'s Tree {
        self.session.tree()
    }

    fn context(&self) -> InferenceContext {
        InferenceContext::new(self.session.settings().max_depth)
    }

    /// Every value `node` may evaluate to
    pub fn infer(&self, node: NodeId) -> InferenceResult<Vec<Value>> {
        self.infer_with(node, &mut self.context())
    }

    /// The single value `node` evaluates to, if inference succeeds unambiguously
    pub fn safe_infer(&self, node: NodeId) -> Option<Value> {
        match self.infer(node) {
            Ok(values) if values.len() == 1 => values.into_iter().next(),
            Ok(values) => {
                trace!(node = %node, count = values.len(), "ambiguous inference");
                None
            }
            Err(err) => {
                trace!(node = %node, error = %err, "inference failed");
                None
            }
        }
    }

    pub fn infer_with(
        &self,
        node: NodeId,
        ctx: &mut InferenceContext,
    ) -> InferenceResult<Vec<Value>> {
        if !ctx.enter(node)? {
            return Ok(vec![Value::Uninferable]);
        }
        let result = self.infer_node(node, ctx);
        ctx.leave(node);
        result.map(dedup)
    }

    fn infer_node(&self, node: NodeId, ctx: &mut InferenceContext) -> InferenceResult<Vec<Value>> {
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Module(_) | NodeKind::FunctionDef(_) | NodeKind::ClassDef(_) => {
                Ok(vec![Value::Node(node)])
            }
            NodeKind::Name { id } => self.infer_name_with(tree.scope(node), id, ctx),
            NodeKind::Attribute { value, attr } => {
                let mut values = Vec::new();
                for receiver in self.infer_with(*value, ctx)? {
                    values.extend(self.getattr_with(&receiver, attr, ctx)?);
                }
                Ok(values)
            }
            NodeKind::Call { func, .. } => {
                let mut values = Vec::new();
                for callee in self.infer_with(*func, ctx)? {
                    values.extend(self.call_result_with(&callee, ctx)?);
                }
                Ok(values)
            }
            NodeKind::Const(value) => Ok(vec![Value::Const(value.clone())]),
            NodeKind::Tuple { elts } => {
                let mut items = Vec::with_capacity(elts.len());
                for elt in elts {
                    let mut values = self.infer_with(*elt, ctx)?;
                    items.push(if values.len() == 1 {
                        values.remove(0)
                    } else {
                        Value::Uninferable
                    });
                }
                Ok(vec![Value::Tuple(items)])
            }
            NodeKind::Assign { value, .. } | NodeKind::Expr { value } => {
                self.infer_with(*value, ctx)
            }
            NodeKind::Arguments(_)
            | NodeKind::Return { .. }
            | NodeKind::Import { .. }
            | NodeKind::ImportFrom { .. }
            | NodeKind::Pass => Ok(vec![Value::Uninferable]),
        }
    }

    /// Resolve `name` as seen from `scope`
    pub fn infer_name(&self, scope: NodeId, name: &str) -> InferenceResult<Vec<Value>> {
        self.infer_name_with(scope, name, &mut self.context())
    }

    fn infer_name_with(
        &self,
        scope: NodeId,
        name: &str,
        ctx: &mut InferenceContext,
    ) -> InferenceResult<Vec<Value>> {
        let binding = self
            .lookup(scope, name)
            .ok_or_else(|| InferenceError::NameNotFound {
                name: name.to_string(),
            })?;
        self.infer_binding(binding, name, ctx)
    }

    /// Statement binding `name` visible from `scope`.
    ///
    /// Class bodies are only visible to code directly inside them, never to
    /// nested functions.
    pub fn lookup(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        let tree = self.tree();
        let mut current = Some(tree.scope(scope));
        let mut first = true;

        while let Some(scope) = current {
            let is_class = matches!(tree.kind(scope), NodeKind::ClassDef(_));
            if first || !is_class {
                if let Some(binding) = self.local(scope, name) {
                    return Some(binding);
                }
            }
            first = false;
            current = tree.parent(scope).map(|parent| tree.scope(parent));
        }
        None
    }

    /// Binding of `name` in the body of `scope` itself (the last one wins)
    pub fn local(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        let tree = self.tree();
        let from_body = tree
            .body(scope)
            .iter()
            .rev()
            .copied()
            .find(|stmt| binds(tree, *stmt, name));
        if from_body.is_some() {
            return from_body;
        }

        let args = tree.function(scope)?.args?;
        let params = tree.arguments(args)?;
        params.names().any(|p| p == name).then_some(args)
    }

    fn infer_binding(
        &self,
        binding: NodeId,
        name: &str,
        ctx: &mut InferenceContext,
    ) -> InferenceResult<Vec<Value>> {
        let tree = self.tree();
        match tree.kind(binding) {
            NodeKind::Import { names } => {
                let alias = find_alias(names, name, Alias::import_binding)?;
                let module = match alias.asname {
                    Some(_) => alias.name.as_str(),
                    None => alias.import_binding(),
                };
                Ok(vec![Value::Node(self.module(module)?)])
            }
            NodeKind::ImportFrom { module, names } => {
                let alias = find_alias(names, name, Alias::binding)?;
                let module = Value::Node(self.module(module)?);
                if !ctx.enter(binding)? {
                    return Ok(vec![Value::Uninferable]);
                }
                let result = self.getattr_with(&module, &alias.name, ctx);
                ctx.leave(binding);
                result
            }
            _ => self.infer_with(binding, ctx),
        }
    }

    fn module(&self, name: &str) -> InferenceResult<NodeId> {
        self.session
            .module(name)
            .ok_or_else(|| InferenceError::ModuleNotFound(name.to_string()))
    }

    /// Resolve attribute `name` on `value`
    pub fn getattr(&self, value: &Value, name: &str) -> InferenceResult<Vec<Value>> {
        self.getattr_with(value, name, &mut self.context())
    }

    fn getattr_with(
        &self,
        value: &Value,
        name: &str,
        ctx: &mut InferenceContext,
    ) -> InferenceResult<Vec<Value>> {
        let tree = self.tree();
        let not_found = || InferenceError::AttributeNotFound {
            target: value.describe(tree),
            attribute: name.to_string(),
        };

        match value {
            Value::Uninferable => Ok(vec![Value::Uninferable]),
            Value::Node(id) => match tree.kind(*id) {
                NodeKind::Module(_) => {
                    if let Some(binding) = self.local(*id, name) {
                        return self.infer_binding(binding, name, ctx);
                    }
                    let submodule = format!("{}.{}", tree.qname(*id), name);
                    self.session
                        .module(&submodule)
                        .map(|module| vec![Value::Node(module)])
                        .ok_or_else(not_found)
                }
                NodeKind::ClassDef(_) => match self.local(*id, name) {
                    Some(binding) => self.infer_binding(binding, name, ctx),
                    None => Err(not_found()),
                },
                NodeKind::FunctionDef(func) => {
                    if let Some(special) = func.special_attributes() {
                        if let Some(value) = special.lookup(tree, name) {
                            trace!(function = %tree.qname(*id), attribute = name, "special attribute");
                            return Ok(vec![value]);
                        }
                    }
                    FunctionModel::new(*id)
                        .lookup(tree, name)
                        .map(|value| vec![value])
                        .ok_or_else(not_found)
                }
                _ => Err(not_found()),
            },
            Value::Instance(class) => {
                let binding = self.local(*class, name).ok_or_else(not_found)?;
                if tree.function(binding).is_some() {
                    let method = BoundMethod::new(
                        Callable::Function(binding),
                        value.clone(),
                        CallResult::Infer,
                    );
                    return Ok(vec![Value::BoundMethod(method)]);
                }
                self.infer_binding(binding, name, ctx)
            }
            Value::BoundMethod(method) => match &method.proxy {
                Callable::Function(func) => self.getattr_with(&Value::Node(*func), name, ctx),
                Callable::Synthetic(synthetic) if name == "__name__" => {
                    Ok(vec![Value::Const(Constant::Str(synthetic.name.clone()))])
                }
                Callable::Synthetic(_) => Err(not_found()),
            },
            Value::Const(_) | Value::Tuple(_) => Err(not_found()),
        }
    }

    /// Values produced by calling `callee`
    pub fn infer_call_result(&self, callee: &Value) -> InferenceResult<Vec<Value>> {
        self.call_result_with(callee, &mut self.context())
    }

    fn call_result_with(
        &self,
        callee: &Value,
        ctx: &mut InferenceContext,
    ) -> InferenceResult<Vec<Value>> {
        let tree = self.tree();
        match callee {
            Value::Uninferable => Ok(vec![Value::Uninferable]),
            Value::Node(id) => match tree.kind(*id) {
                NodeKind::FunctionDef(func) => {
                    let mut values = Vec::new();
                    for stmt in &func.body {
                        if let NodeKind::Return { value } = tree.kind(*stmt) {
                            match value {
                                Some(value) => values.extend(self.infer_with(*value, ctx)?),
                                None => values.push(Value::none()),
                            }
                        }
                    }
                    if values.is_empty() {
                        values.push(Value::none());
                    }
                    Ok(dedup(values))
                }
                NodeKind::ClassDef(_) => Ok(vec![Value::Instance(*id)]),
                _ => Err(InferenceError::NotCallable {
                    target: callee.describe(tree),
                }),
            },
            Value::BoundMethod(method) => match &method.result {
                CallResult::Fixed(value) => Ok(vec![(**value).clone()]),
                CallResult::NoValue => Ok(vec![Value::none()]),
                CallResult::Infer => match &method.proxy {
                    Callable::Function(func) => self.call_result_with(&Value::Node(*func), ctx),
                    Callable::Synthetic(_) => Ok(vec![Value::Uninferable]),
                },
            },
            Value::Instance(_) | Value::Const(_) | Value::Tuple(_) => {
                Err(InferenceError::NotCallable {
                    target: callee.describe(tree),
                })
            }
        }
    }
}

/// Whether statement `stmt` binds `name` in its scope
fn binds(tree: &Tree, stmt: NodeId, name: &str) -> bool {
    match tree.kind(stmt) {
        NodeKind::FunctionDef(func) => func.name == name,
        NodeKind::ClassDef(class) => class.name == name,
        NodeKind::Assign { targets, .. } => targets.iter().any(|t| t == name),
        NodeKind::Import { names } => names.iter().any(|a| a.import_binding() == name),
        NodeKind::ImportFrom { names, .. } => names.iter().any(|a| a.binding() == name),
        _ => false,
    }
}

fn find_alias<'a>(
    names: &'a [Alias],
    name: &str,
    binding: fn(&Alias) -> &str,
) -> InferenceResult<&'a Alias> {
    names
        .iter()
        .rev()
        .find(|alias| binding(alias) == name)
        .ok_or_else(|| InferenceError::NameNotFound {
            name: name.to_string(),
        })
}

fn dedup(values: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_detects_cycles() {
        let mut ctx = InferenceContext::new(8);
        let mut tree = Tree::new();
        let node = tree.alloc(NodeKind::Pass, Default::default(), None);

        assert!(ctx.enter(node).unwrap());
        assert!(!ctx.enter(node).unwrap());
        ctx.leave(node);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_context_depth_limit() {
        let mut ctx = InferenceContext::new(1);
        let mut tree = Tree::new();
        let a = tree.alloc(NodeKind::Pass, Default::default(), None);
        let b = tree.alloc(NodeKind::Pass, Default::default(), None);

        assert!(ctx.enter(a).unwrap());
        assert!(matches!(
            ctx.enter(b),
            Err(InferenceError::RecursionLimit { max_depth: 1 })
        ));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let values = dedup(vec![Value::none(), Value::Uninferable, Value::none()]);
        assert_eq!(values, vec![Value::none(), Value::Uninferable]);
    }
}
