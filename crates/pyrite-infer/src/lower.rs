//! Lowering from syntax to the symbolic tree
//!
//! Scope nodes are allocated before their children so that every child can be
//! created with its parent link already in place.

use crate::ast::{self, Expr, Stmt};
use crate::tree::{
    Arguments, ClassDef, FunctionDef, ModuleDef, NodeId, NodeKind, Parameter, Tree,
};

/// Lowers syntax modules into a [`Tree`]
pub struct Lowerer<'t> {
    tree: &'t mut Tree,
}

impl<'t> Lowerer<'t> {
    pub fn new(tree: &'t mut Tree) -> Self {
        Self { tree }
    }

    /// Lower a module and return its root node
    pub fn lower_module(&mut self, module: &ast::Module) -> NodeId {
        let root = self.tree.alloc(
            NodeKind::Module(ModuleDef {
                name: module.name.clone(),
                body: Vec::new(),
            }),
            Default::default(),
            None,
        );
        let body = self.lower_body(&module.body, root);
        if let NodeKind::Module(m) = &mut self.tree.node_mut(root).kind {
            m.body = body;
        }
        root
    }

    fn lower_body(&mut self, body: &[Stmt], parent: NodeId) -> Vec<NodeId> {
        body.iter().map(|stmt| self.lower_stmt(stmt, parent)).collect()
    }

    fn lower_stmt(&mut self, stmt: &Stmt, parent: NodeId) -> NodeId {
        match stmt {
            Stmt::FunctionDef(func) => self.lower_function(func, parent),
            Stmt::ClassDef(class) => self.lower_class(class, parent),
            Stmt::Assign(assign) => {
                let value = self.lower_expr(&assign.value);
                self.attach(
                    NodeKind::Assign {
                        targets: assign.targets.clone(),
                        value,
                    },
                    stmt,
                    parent,
                    &[value],
                )
            }
            Stmt::Return(ret) => {
                let value = ret.value.as_ref().map(|v| self.lower_expr(v));
                let children: Vec<NodeId> = value.into_iter().collect();
                self.attach(NodeKind::Return { value }, stmt, parent, &children)
            }
            Stmt::Expr(expr) => {
                let value = self.lower_expr(&expr.value);
                self.attach(NodeKind::Expr { value }, stmt, parent, &[value])
            }
            Stmt::Import(import) => self.tree.alloc(
                NodeKind::Import {
                    names: import.names.clone(),
                },
                import.span,
                Some(parent),
            ),
            Stmt::ImportFrom(import) => self.tree.alloc(
                NodeKind::ImportFrom {
                    module: import.module.clone(),
                    names: import.names.clone(),
                },
                import.span,
                Some(parent),
            ),
            Stmt::Pass(span) => self.tree.alloc(NodeKind::Pass, *span, Some(parent)),
        }
    }

    fn attach(&mut self, kind: NodeKind, stmt: &Stmt, parent: NodeId, children: &[NodeId]) -> NodeId {
        let id = self.tree.alloc(kind, stmt.span(), Some(parent));
        self.adopt(id, children);
        id
    }

    fn lower_function(&mut self, func: &ast::FunctionDef, parent: NodeId) -> NodeId {
        let id = self.tree.alloc(
            NodeKind::FunctionDef(FunctionDef::new(&func.name).with_doc(func.doc.clone())),
            func.span,
            Some(parent),
        );

        let decorators: Vec<NodeId> = func.decorators.iter().map(|d| self.lower_expr(d)).collect();
        self.adopt(id, &decorators);

        let params: Vec<Parameter> = func
            .params
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                default: p.default.as_ref().map(|d| self.lower_expr(d)),
            })
            .collect();
        let defaults: Vec<NodeId> = params.iter().filter_map(|p| p.default).collect();
        let args = self
            .tree
            .alloc(NodeKind::Arguments(Arguments { params }), func.span, Some(id));
        self.adopt(args, &defaults);

        let returns = func.returns.as_ref().map(|r| self.lower_expr(r));
        if let Some(annotation) = returns {
            self.tree.set_parent(annotation, id);
        }

        let body = self.lower_body(&func.body, id);

        if let Some(node) = self.tree.function_mut(id) {
            node.postinit(Some(args), body, decorators, returns);
        }
        id
    }

    fn lower_class(&mut self, class: &ast::ClassDef, parent: NodeId) -> NodeId {
        let id = self.tree.alloc(
            NodeKind::ClassDef(ClassDef {
                name: class.name.clone(),
                bases: Vec::new(),
                body: Vec::new(),
            }),
            class.span,
            Some(parent),
        );
        let bases: Vec<NodeId> = class.bases.iter().map(|b| self.lower_expr(b)).collect();
        self.adopt(id, &bases);
        let body = self.lower_body(&class.body, id);

        if let NodeKind::ClassDef(c) = &mut self.tree.node_mut(id).kind {
            c.bases = bases;
            c.body = body;
        }
        id
    }

    /// Lower an expression detached; the caller adopts it
    fn lower_expr(&mut self, expr: &Expr) -> NodeId {
        let span = expr.span();
        match expr {
            Expr::Name(id, _) => self
                .tree
                .alloc(NodeKind::Name { id: id.clone() }, span, None),
            Expr::Attribute { value, attr, .. } => {
                let value = self.lower_expr(value);
                let id = self.tree.alloc(
                    NodeKind::Attribute {
                        value,
                        attr: attr.clone(),
                    },
                    span,
                    None,
                );
                self.adopt(id, &[value]);
                id
            }
            Expr::Call {
                func,
                args,
                keywords,
                ..
            } => {
                let func = self.lower_expr(func);
                let args: Vec<NodeId> = args.iter().map(|a| self.lower_expr(a)).collect();
                let keywords: Vec<(String, NodeId)> = keywords
                    .iter()
                    .map(|k| (k.arg.clone(), self.lower_expr(&k.value)))
                    .collect();
                let mut children = vec![func];
                children.extend(&args);
                children.extend(keywords.iter().map(|(_, v)| *v));

                let id = self.tree.alloc(
                    NodeKind::Call {
                        func,
                        args,
                        keywords,
                    },
                    span,
                    None,
                );
                self.adopt(id, &children);
                id
            }
            Expr::Constant(value, _) => self.tree.alloc(NodeKind::Const(value.clone()), span, None),
            Expr::Tuple(elts, _) => {
                let elts: Vec<NodeId> = elts.iter().map(|e| self.lower_expr(e)).collect();
                let id = self
                    .tree
                    .alloc(NodeKind::Tuple { elts: elts.clone() }, span, None);
                self.adopt(id, &elts);
                id
            }
        }
    }

    fn adopt(&mut self, parent: NodeId, children: &[NodeId]) {
        for child in children {
            self.tree.set_parent(*child, parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Module, Param};

    #[test]
    fn test_lowering_links_parents() {
        let module = Module::new(
            "app",
            vec![ast::FunctionDef::new("f", &["x"])
                .with_params(vec![Param::with_default("x", Expr::int(1))])
                .decorated(Expr::call(Expr::name("deco"), vec![]))
                .with_body(vec![Stmt::ret(Expr::name("x"))])
                .into()],
        );
        let mut tree = Tree::new();
        let root = Lowerer::new(&mut tree).lower_module(&module);

        let func = tree.body(root)[0];
        let def = tree.function(func).unwrap();
        let decorator = def.decorators[0];
        let args = def.args.unwrap();
        let ret = def.body[0];

        assert_eq!(tree.parent(func), Some(root));
        assert_eq!(tree.parent(decorator), Some(func));
        assert_eq!(tree.parent(args), Some(func));
        assert_eq!(tree.parent(ret), Some(func));
        assert_eq!(tree.scope(decorator), root);
        assert_eq!(tree.qname(func), "app.f");

        let default = tree.arguments(args).unwrap().params[0].default.unwrap();
        assert_eq!(tree.parent(default), Some(args));
        assert_eq!(tree.scope(default), root);
    }

    #[test]
    fn test_lowering_class_body() {
        let module = Module::new(
            "app",
            vec![ast::ClassDef::new("C", vec![ast::FunctionDef::new("m", &["self"]).into()]).into()],
        );
        let mut tree = Tree::new();
        let root = Lowerer::new(&mut tree).lower_module(&module);

        let class = tree.body(root)[0];
        let method = tree.body(class)[0];
        assert_eq!(tree.qname(method), "app.C.m");
        assert_eq!(tree.scope(tree.parent(method).unwrap()), class);
    }
}
