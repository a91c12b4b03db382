//! Transform registry and dispatch
//!
//! Brains register `(category, predicate, transform)` triples. After a module
//! is lowered, `TransformVisitor` walks it and hands each node of a
//! registered category to the first registration whose predicate accepts it.

use crate::manager::Session;
use crate::tree::{NodeId, NodeKind, Tree};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Node categories transforms can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Module,
    FunctionDef,
    ClassDef,
    Call,
    Name,
    Attribute,
    Other,
}

impl NodeCategory {
    pub fn of(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Module(_) => NodeCategory::Module,
            NodeKind::FunctionDef(_) => NodeCategory::FunctionDef,
            NodeKind::ClassDef(_) => NodeCategory::ClassDef,
            NodeKind::Call { .. } => NodeCategory::Call,
            NodeKind::Name { .. } => NodeCategory::Name,
            NodeKind::Attribute { .. } => NodeCategory::Attribute,
            _ => NodeCategory::Other,
        }
    }
}

/// Decides whether a transform applies. Must not modify anything.
pub type Predicate = Box<dyn Fn(&Session, NodeId) -> bool + Send + Sync>;

/// Produces the node that takes the place of its input
pub type Transform = Box<dyn Fn(&mut Tree, NodeId) -> NodeId + Send + Sync>;

struct Registration {
    name: &'static str,
    predicate: Predicate,
    transform: Transform,
}

/// Registered transforms, in registration order per category
#[derive(Default)]
pub struct TransformRegistry {
    transforms: HashMap<NodeCategory, Vec<Registration>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P, T>(
        &mut self,
        category: NodeCategory,
        name: &'static str,
        predicate: P,
        transform: T,
    ) where
        P: Fn(&Session, NodeId) -> bool + Send + Sync + 'static,
        T: Fn(&mut Tree, NodeId) -> NodeId + Send + Sync + 'static,
    {
        self.transforms
            .entry(category)
            .or_default()
            .push(Registration {
                name,
                predicate: Box::new(predicate),
                transform: Box::new(transform),
            });
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.transforms.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names registered for `category`, in order
    pub fn names(&self, category: NodeCategory) -> Vec<&'static str> {
        self.transforms
            .get(&category)
            .map(|regs| regs.iter().map(|r| r.name).collect())
            .unwrap_or_default()
    }

    fn registrations(&self, category: NodeCategory) -> &[Registration] {
        self.transforms
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (category, regs) in &self.transforms {
            map.entry(category, &regs.iter().map(|r| r.name).collect::<Vec<_>>());
        }
        map.finish()
    }
}

/// Applies registered transforms to a freshly built module
pub(crate) struct TransformVisitor<'r> {
    registry: &'r TransformRegistry,
}

impl<'r> TransformVisitor<'r> {
    pub fn new(registry: &'r TransformRegistry) -> Self {
        Self { registry }
    }

    /// Visit every node under `root`, children before parents.
    ///
    /// The node set is fixed before the walk starts, so nodes produced by a
    /// transform are never visited and each original node is transformed at
    /// most once. Returns the number of transforms applied.
    pub fn visit(&self, session: &mut Session, root: NodeId) -> usize {
        let order = post_order(session.tree(), root);
        let mut applied = 0;

        for node in order {
            let category = NodeCategory::of(session.tree().kind(node));
            for registration in self.registry.registrations(category) {
                if !(registration.predicate)(session, node) {
                    trace!(node = %node, transform = registration.name, "predicate rejected");
                    continue;
                }

                let replacement = (registration.transform)(session.tree_mut(), node);
                if replacement != node {
                    if let Some(parent) = session.tree().parent(node) {
                        session.tree_mut().replace_child(parent, node, replacement);
                    }
                }
                debug!(
                    transform = registration.name,
                    original = %node,
                    replacement = %replacement,
                    qname = %session.tree().qname(replacement),
                    "applied transform"
                );
                applied += 1;
                break;
            }
        }
        applied
    }
}

fn post_order(tree: &Tree, root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut stack = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        stack.push((node, true));
        for child in tree.children(node).into_iter().rev() {
            stack.push((child, false));
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::tree::{FunctionDef, ModuleDef};

    #[test]
    fn test_post_order_visits_children_first() {
        let mut tree = Tree::new();
        let module = tree.alloc(
            NodeKind::Module(ModuleDef {
                name: "m".to_string(),
                body: vec![],
            }),
            Span::DUMMY,
            None,
        );
        let func = tree.alloc(
            NodeKind::FunctionDef(FunctionDef::new("f")),
            Span::DUMMY,
            Some(module),
        );
        let stmt = tree.alloc(NodeKind::Pass, Span::DUMMY, Some(func));
        tree.function_mut(func)
            .unwrap()
            .postinit(None, vec![stmt], vec![], None);
        if let NodeKind::Module(m) = &mut tree.node_mut(module).kind {
            m.body.push(func);
        }

        assert_eq!(post_order(&tree, module), vec![stmt, func, module]);
    }

    #[test]
    fn test_registry_keeps_registration_order() {
        let mut registry = TransformRegistry::new();
        registry.register(NodeCategory::FunctionDef, "first", |_, _| false, |_, id| id);
        registry.register(NodeCategory::FunctionDef, "second", |_, _| false, |_, id| id);

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.names(NodeCategory::FunctionDef),
            vec!["first", "second"]
        );
        assert!(registry.names(NodeCategory::ClassDef).is_empty());
    }
}
