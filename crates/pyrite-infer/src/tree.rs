//! Symbolic tree
//!
//! Arena of symbolic nodes built from the syntax layer. Nodes are addressed by
//! [`NodeId`]; two nodes are the same node only if their ids are equal, never
//! because their contents match. Parent links are plain ids, so ownership stays
//! with the arena.

use crate::ast::{Alias, Constant};
use crate::object_model::AttributeModel;
use crate::span::Span;
use std::fmt;
use std::sync::Arc;

/// Identity of a node within a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One symbolic node
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Enclosing node; `None` for module roots and detached nodes
    pub parent: Option<NodeId>,
}

/// Node payload
#[derive(Debug, Clone)]
pub enum NodeKind {
    Module(ModuleDef),
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Arguments(Arguments),
    Assign { targets: Vec<String>, value: NodeId },
    Return { value: Option<NodeId> },
    Expr { value: NodeId },
    Import { names: Vec<Alias> },
    ImportFrom { module: String, names: Vec<Alias> },
    Pass,
    Name { id: String },
    Attribute { value: NodeId, attr: String },
    Call {
        func: NodeId,
        args: Vec<NodeId>,
        keywords: Vec<(String, NodeId)>,
    },
    Const(Constant),
    Tuple { elts: Vec<NodeId> },
}

impl NodeKind {
    /// Short human-readable kind name
    pub fn describe(&self) -> &'static str {
        match self {
            NodeKind::Module(_) => "module",
            NodeKind::FunctionDef(_) => "function",
            NodeKind::ClassDef(_) => "class",
            NodeKind::Arguments(_) => "arguments",
            NodeKind::Assign { .. } => "assignment",
            NodeKind::Return { .. } => "return",
            NodeKind::Expr { .. } => "expression statement",
            NodeKind::Import { .. } | NodeKind::ImportFrom { .. } => "import",
            NodeKind::Pass => "pass",
            NodeKind::Name { .. } => "name",
            NodeKind::Attribute { .. } => "attribute",
            NodeKind::Call { .. } => "call",
            NodeKind::Const(_) => "constant",
            NodeKind::Tuple { .. } => "tuple",
        }
    }

    /// Whether this node opens a new scope
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::Module(_) | NodeKind::FunctionDef(_) | NodeKind::ClassDef(_)
        )
    }
}

/// Module root
#[derive(Debug, Clone)]
pub struct ModuleDef {
    pub name: String,
    pub body: Vec<NodeId>,
}

/// Class definition
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

/// Parameter list of a function
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pub params: Vec<Parameter>,
}

impl Arguments {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub default: Option<NodeId>,
}

/// Function definition
///
/// Built in two phases: [`FunctionDef::new`] gives the node its identity, then
/// [`FunctionDef::postinit`] attaches the children, which by then can point back
/// at the allocated node. A function carrying special attributes is the
/// augmented form produced by brain transforms; everything else about it is an
/// ordinary function definition.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub doc: Option<String>,
    /// `Arguments` node
    pub args: Option<NodeId>,
    pub body: Vec<NodeId>,
    pub decorators: Vec<NodeId>,
    pub returns: Option<NodeId>,
    special_attributes: Option<Arc<dyn AttributeModel>>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            args: None,
            body: Vec::new(),
            decorators: Vec::new(),
            returns: None,
            special_attributes: None,
        }
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    /// Attach the children once the node has an identity
    pub fn postinit(
        &mut self,
        args: Option<NodeId>,
        body: Vec<NodeId>,
        decorators: Vec<NodeId>,
        returns: Option<NodeId>,
    ) {
        self.args = args;
        self.body = body;
        self.decorators = decorators;
        self.returns = returns;
    }

    /// Install the model consulted before ordinary attribute resolution.
    /// The first installed model stays for the lifetime of the node.
    pub fn install_special_attributes(&mut self, model: Arc<dyn AttributeModel>) {
        self.special_attributes.get_or_insert(model);
    }

    pub fn special_attributes(&self) -> Option<&dyn AttributeModel> {
        self.special_attributes.as_deref()
    }

    pub fn is_augmented(&self) -> bool {
        self.special_attributes.is_some()
    }
}

/// Arena of symbolic nodes shared by every module of a session
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its identity
    pub fn alloc(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span, parent });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Access a node. Ids are only ever handed out by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(id).parent = Some(parent);
    }

    pub fn function(&self, id: NodeId) -> Option<&FunctionDef> {
        match &self.get(id)?.kind {
            NodeKind::FunctionDef(func) => Some(func),
            _ => None,
        }
    }

    pub fn function_mut(&mut self, id: NodeId) -> Option<&mut FunctionDef> {
        match &mut self.nodes.get_mut(id.index())?.kind {
            NodeKind::FunctionDef(func) => Some(func),
            _ => None,
        }
    }

    pub fn arguments(&self, id: NodeId) -> Option<&Arguments> {
        match &self.get(id)?.kind {
            NodeKind::Arguments(args) => Some(args),
            _ => None,
        }
    }

    /// Name of a module, class or function node
    pub fn scope_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Module(m) => Some(&m.name),
            NodeKind::FunctionDef(f) => Some(&f.name),
            NodeKind::ClassDef(c) => Some(&c.name),
            _ => None,
        }
    }

    /// Statements of a scope node (empty for anything else)
    pub fn body(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Module(m) => &m.body,
            NodeKind::FunctionDef(f) => &f.body,
            NodeKind::ClassDef(c) => &c.body,
            _ => &[],
        }
    }

    /// Nearest scope that names inside `id` are resolved in.
    ///
    /// A scope node is its own scope. Decorators, parameter defaults and
    /// annotations of a function (and bases of a class) belong to the scope
    /// enclosing that definition.
    pub fn scope(&self, id: NodeId) -> NodeId {
        if self.node(id).kind.is_scope() {
            return id;
        }

        let mut child = id;
        while let Some(parent) = self.parent(child) {
            if self.node(parent).kind.is_scope() && !self.is_evaluated_outside(parent, child) {
                return parent;
            }
            child = parent;
        }
        child
    }

    fn is_evaluated_outside(&self, scope: NodeId, child: NodeId) -> bool {
        match &self.node(scope).kind {
            NodeKind::FunctionDef(f) => {
                f.decorators.contains(&child) || f.args == Some(child) || f.returns == Some(child)
            }
            NodeKind::ClassDef(c) => c.bases.contains(&child),
            _ => false,
        }
    }

    /// Topmost ancestor (the module for attached nodes)
    pub fn root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Fully qualified dotted name (`module.Class.function`)
    pub fn qname(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Module(m) => m.name.clone(),
            NodeKind::FunctionDef(f) => self.member_qname(id, &f.name),
            NodeKind::ClassDef(c) => self.member_qname(id, &c.name),
            _ => {
                let scope = self.scope(id);
                if scope == id {
                    String::new()
                } else {
                    self.qname(scope)
                }
            }
        }
    }

    fn member_qname(&self, id: NodeId, name: &str) -> String {
        match self.parent(id) {
            Some(parent) => format!("{}.{}", self.qname(self.scope(parent)), name),
            None => name.to_string(),
        }
    }

    /// Direct children in evaluation order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        match &self.node(id).kind {
            NodeKind::Module(m) => children.extend(&m.body),
            NodeKind::FunctionDef(f) => {
                children.extend(&f.decorators);
                children.extend(f.args);
                children.extend(f.returns);
                children.extend(&f.body);
            }
            NodeKind::ClassDef(c) => {
                children.extend(&c.bases);
                children.extend(&c.body);
            }
            NodeKind::Arguments(a) => children.extend(a.params.iter().filter_map(|p| p.default)),
            NodeKind::Assign { value, .. } | NodeKind::Expr { value } => children.push(*value),
            NodeKind::Return { value } => children.extend(*value),
            NodeKind::Attribute { value, .. } => children.push(*value),
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                children.push(*func);
                children.extend(args);
                children.extend(keywords.iter().map(|(_, value)| *value));
            }
            NodeKind::Tuple { elts } => children.extend(elts),
            NodeKind::Import { .. }
            | NodeKind::ImportFrom { .. }
            | NodeKind::Pass
            | NodeKind::Name { .. }
            | NodeKind::Const(_) => {}
        }
        children
    }

    /// Point every slot of `parent` holding `old` at `new`.
    ///
    /// Returns whether anything was replaced. Only the parent's slot changes:
    /// children of `old` keep their parent link.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let mut replaced = false;
        for_each_child_mut(&mut self.node_mut(parent).kind, |slot| {
            if *slot == old {
                *slot = new;
                replaced = true;
            }
        });
        replaced
    }
}

fn for_each_child_mut(kind: &mut NodeKind, mut f: impl FnMut(&mut NodeId)) {
    match kind {
        NodeKind::Module(m) => m.body.iter_mut().for_each(f),
        NodeKind::FunctionDef(func) => {
            func.decorators.iter_mut().for_each(&mut f);
            func.args.iter_mut().for_each(&mut f);
            func.returns.iter_mut().for_each(&mut f);
            func.body.iter_mut().for_each(f);
        }
        NodeKind::ClassDef(c) => {
            c.bases.iter_mut().for_each(&mut f);
            c.body.iter_mut().for_each(f);
        }
        NodeKind::Arguments(a) => a
            .params
            .iter_mut()
            .filter_map(|p| p.default.as_mut())
            .for_each(f),
        NodeKind::Assign { value, .. } | NodeKind::Expr { value } => f(value),
        NodeKind::Return { value } => value.iter_mut().for_each(f),
        NodeKind::Attribute { value, .. } => f(value),
        NodeKind::Call {
            func,
            args,
            keywords,
        } => {
            f(func);
            args.iter_mut().for_each(&mut f);
            keywords.iter_mut().map(|(_, value)| value).for_each(f);
        }
        NodeKind::Tuple { elts } => elts.iter_mut().for_each(f),
        NodeKind::Import { .. }
        | NodeKind::ImportFrom { .. }
        | NodeKind::Pass
        | NodeKind::Name { .. }
        | NodeKind::Const(_) => {}
    }
}
