//! Attribute models for attribute resolution on symbolic nodes

use crate::ast::Constant;
use crate::tree::{NodeId, Tree};
use crate::value::Value;
use std::fmt::Debug;

/// Synthetic attributes attached to a node.
///
/// A model is consulted before ordinary attribute resolution. It computes each
/// attribute on request and must not modify the tree or re-enter the
/// transform machinery.
pub trait AttributeModel: Debug + Send + Sync {
    /// Names this model answers for
    fn attribute_names(&self) -> &'static [&'static str];

    /// Resolve `name`, or `None` when the model does not provide it
    fn lookup(&self, tree: &Tree, name: &str) -> Option<Value>;

    fn provides(&self, name: &str) -> bool {
        self.attribute_names().contains(&name)
    }
}

/// Attributes every function object carries
#[derive(Debug, Clone, Copy)]
pub struct FunctionModel {
    instance: NodeId,
}

impl FunctionModel {
    const NAMES: &'static [&'static str] = &["__name__", "__qualname__", "__module__", "__doc__"];

    pub fn new(instance: NodeId) -> Self {
        Self { instance }
    }
}

impl AttributeModel for FunctionModel {
    fn attribute_names(&self) -> &'static [&'static str] {
        Self::NAMES
    }

    fn lookup(&self, tree: &Tree, name: &str) -> Option<Value> {
        let func = tree.function(self.instance)?;
        let value = match name {
            "__name__" => Constant::Str(func.name.clone()),
            "__qualname__" => Constant::Str(qualname(tree, self.instance)),
            "__module__" => {
                let root = tree.root(self.instance);
                Constant::Str(tree.scope_name(root).unwrap_or_default().to_string())
            }
            "__doc__" => match &func.doc {
                Some(doc) => Constant::Str(doc.clone()),
                None => Constant::None,
            },
            _ => return None,
        };
        Some(Value::Const(value))
    }
}

/// Dotted name relative to the module (`Class.method`)
fn qualname(tree: &Tree, id: NodeId) -> String {
    let qname = tree.qname(id);
    let module = tree.qname(tree.root(id));
    match qname.strip_prefix(&module).and_then(|rest| rest.strip_prefix('.')) {
        Some(rest) => rest.to_string(),
        None => qname,
    }
}
