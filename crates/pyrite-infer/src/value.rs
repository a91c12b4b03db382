//! Inferred values
//!
//! What an expression may evaluate to, as far as static inference can tell.

use crate::ast::Constant;
use crate::tree::{NodeId, NodeKind, Tree};
use std::fmt;

/// Result of inferring an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A definition node itself (module, class, function)
    Node(NodeId),
    /// An instance of the class node
    Instance(NodeId),
    Const(Constant),
    Tuple(Vec<Value>),
    BoundMethod(BoundMethod),
    /// Inference could not decide
    Uninferable,
}

impl Value {
    /// Tuple of integer constants
    pub fn int_tuple(items: &[i64]) -> Self {
        Value::Tuple(
            items
                .iter()
                .map(|i| Value::Const(Constant::Int(*i)))
                .collect(),
        )
    }

    pub fn none() -> Self {
        Value::Const(Constant::None)
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_bound_method(&self) -> Option<&BoundMethod> {
        match self {
            Value::BoundMethod(method) => Some(method),
            _ => None,
        }
    }

    /// Human-readable description, used in error messages
    pub fn describe(&self, tree: &Tree) -> String {
        match self {
            Value::Node(id) => match tree.kind(*id) {
                NodeKind::Module(_) | NodeKind::FunctionDef(_) | NodeKind::ClassDef(_) => {
                    format!("{} '{}'", tree.kind(*id).describe(), tree.qname(*id))
                }
                other => other.describe().to_string(),
            },
            Value::Instance(class) => format!("instance of '{}'", tree.qname(*class)),
            Value::Const(c) => ConstDisplay(c).to_string(),
            Value::Tuple(items) => format!("tuple of {} items", items.len()),
            Value::BoundMethod(method) => format!("bound method '{}'", method.name(tree)),
            Value::Uninferable => "Uninferable".to_string(),
        }
    }
}

struct ConstDisplay<'a>(&'a Constant);

impl fmt::Display for ConstDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Constant::None => write!(f, "None"),
            Constant::Bool(true) => write!(f, "True"),
            Constant::Bool(false) => write!(f, "False"),
            Constant::Int(i) => write!(f, "{}", i),
            Constant::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// Function-like target of a bound method
#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    /// A function definition in the tree
    Function(NodeId),
    /// A function with no backing node, described by name and parameters
    Synthetic(SyntheticFunction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticFunction {
    pub name: String,
    pub params: Vec<String>,
}

impl SyntheticFunction {
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// How calling a bound method produces its result
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// Infer from the proxied function's returns
    Infer,
    /// Always this value
    Fixed(Box<Value>),
    /// The call returns `None`
    NoValue,
}

/// Function bound to a receiver
#[derive(Debug, Clone, PartialEq)]
pub struct BoundMethod {
    pub proxy: Callable,
    pub bound: Box<Value>,
    pub result: CallResult,
}

impl BoundMethod {
    pub fn new(proxy: Callable, bound: Value, result: CallResult) -> Self {
        Self {
            proxy,
            bound: Box::new(bound),
            result,
        }
    }

    pub fn name(&self, tree: &Tree) -> String {
        match &self.proxy {
            Callable::Function(id) => tree
                .function(*id)
                .map(|f| f.name.clone())
                .unwrap_or_default(),
            Callable::Synthetic(synthetic) => synthetic.name.clone(),
        }
    }

    /// Parameters left once the receiver fills the first one
    pub fn remaining_params(&self, tree: &Tree) -> Vec<String> {
        let params: Vec<String> = match &self.proxy {
            Callable::Function(id) => tree
                .function(*id)
                .and_then(|f| f.args)
                .and_then(|args| tree.arguments(args))
                .map(|args| args.names().map(str::to_string).collect())
                .unwrap_or_default(),
            Callable::Synthetic(synthetic) => synthetic.params.clone(),
        };
        params.into_iter().skip(1).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_tuple() {
        assert_eq!(
            Value::int_tuple(&[0, 1]),
            Value::Tuple(vec![
                Value::Const(Constant::Int(0)),
                Value::Const(Constant::Int(1)),
            ])
        );
    }

    #[test]
    fn test_synthetic_remaining_params_drop_receiver() {
        let tree = Tree::new();
        let method = BoundMethod::new(
            Callable::Synthetic(SyntheticFunction::new("cache_clear", &["self"])),
            Value::Uninferable,
            CallResult::NoValue,
        );
        assert!(method.remaining_params(&tree).is_empty());
        assert_eq!(method.name(&tree), "cache_clear");
    }

    #[test]
    fn test_describe_constants() {
        let tree = Tree::new();
        assert_eq!(Value::none().describe(&tree), "None");
        assert_eq!(
            Value::Const(Constant::Str("x".into())).describe(&tree),
            "\"x\""
        );
        assert_eq!(Value::Uninferable.describe(&tree), "Uninferable");
    }
}
