//! Abstract Syntax Tree (AST) definitions
//!
//! Owned syntax for the Python subset the inference engine models. Modules are
//! produced by a front end (or written by hand in tests), optionally exchanged
//! as versioned JSON dumps, and lowered into the symbolic [`Tree`](crate::tree::Tree)
//! by [`Manager::build_module`](crate::manager::Manager::build_module).

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// AST schema version
///
/// This version number is included in JSON dumps to ensure compatibility.
/// Increment when making breaking changes to the AST structure.
pub const AST_VERSION: u32 = 1;

/// A module: the unit of analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Dotted module name (e.g. `functools`, `pkg.util`)
    pub name: String,
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(name: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

/// Versioned AST wrapper for JSON serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedModule {
    /// AST schema version
    pub ast_version: u32,
    /// The actual module AST
    #[serde(flatten)]
    pub module: Module,
}

impl VersionedModule {
    /// Create a new versioned module wrapper
    pub fn new(module: Module) -> Self {
        Self {
            ast_version: AST_VERSION,
            module,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Module> for VersionedModule {
    fn from(module: Module) -> Self {
        Self::new(module)
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Assign(Assign),
    Return(Return),
    Expr(ExprStmt),
    Import(Import),
    ImportFrom(ImportFrom),
    Pass(Span),
}

impl Stmt {
    /// Get the span of this statement
    pub fn span(&self) -> Span {
        match self {
            Stmt::FunctionDef(f) => f.span,
            Stmt::ClassDef(c) => c.span,
            Stmt::Assign(a) => a.span,
            Stmt::Return(r) => r.span,
            Stmt::Expr(e) => e.span,
            Stmt::Import(i) => i.span,
            Stmt::ImportFrom(i) => i.span,
            Stmt::Pass(span) => *span,
        }
    }

    /// `name = value`
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Stmt::Assign(Assign {
            targets: vec![name.into()],
            value,
            span: Span::DUMMY,
        })
    }

    /// `return value`
    pub fn ret(value: Expr) -> Self {
        Stmt::Return(Return {
            value: Some(value),
            span: Span::DUMMY,
        })
    }

    /// Bare expression statement
    pub fn expr(value: Expr) -> Self {
        Stmt::Expr(ExprStmt {
            value,
            span: Span::DUMMY,
        })
    }

    /// `import module`
    pub fn import(module: impl Into<String>) -> Self {
        Stmt::Import(Import {
            names: vec![Alias::new(module)],
            span: Span::DUMMY,
        })
    }

    /// `from module import a, b`
    pub fn import_from(module: impl Into<String>, names: &[&str]) -> Self {
        Stmt::ImportFrom(ImportFrom {
            module: module.into(),
            names: names.iter().map(|n| Alias::new(*n)).collect(),
            span: Span::DUMMY,
        })
    }

    pub fn pass() -> Self {
        Stmt::Pass(Span::DUMMY)
    }
}

impl From<FunctionDef> for Stmt {
    fn from(func: FunctionDef) -> Self {
        Stmt::FunctionDef(func)
    }
}

impl From<ClassDef> for Stmt {
    fn from(class: ClassDef) -> Self {
        Stmt::ClassDef(class)
    }
}

/// Function definition
///
/// Syntax: `@decorator def name(params) -> returns: body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    /// Decorator expressions, in source order
    #[serde(default)]
    pub decorators: Vec<Expr>,
    /// Return annotation
    #[serde(default)]
    pub returns: Option<Expr>,
    pub span: Span,
}

impl FunctionDef {
    /// Create a function with the given parameter names and a `pass` body
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: params.iter().map(|p| Param::new(*p)).collect(),
            body: vec![Stmt::pass()],
            decorators: Vec::new(),
            returns: None,
            span: Span::DUMMY,
        }
    }

    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }

    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }

    pub fn decorated(mut self, decorator: Expr) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn returning(mut self, annotation: Expr) -> Self {
        self.returns = Some(annotation);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }
}

/// Function parameter with optional default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub default: Option<Expr>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: Expr) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
        }
    }
}

/// Class definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            body,
            span: Span::DUMMY,
        }
    }
}

/// Assignment to one or more plain names: `a = b = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub targets: Vec<String>,
    pub value: Expr,
    pub span: Span,
}

/// Return statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Return {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Expression statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub value: Expr,
    pub span: Span,
}

/// `import a.b as c`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub names: Vec<Alias>,
    pub span: Span,
}

/// `from module import a as b`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFrom {
    pub module: String,
    pub names: Vec<Alias>,
    pub span: Span,
}

/// Imported name with optional alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    #[serde(default)]
    pub asname: Option<String>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: None,
        }
    }

    pub fn aliased(name: impl Into<String>, asname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asname: Some(asname.into()),
        }
    }

    /// The local name this alias binds for `from m import name`
    pub fn binding(&self) -> &str {
        self.asname.as_deref().unwrap_or(&self.name)
    }

    /// The local name this alias binds for `import a.b` (`a`, or the alias)
    pub fn import_binding(&self) -> &str {
        match &self.asname {
            Some(asname) => asname,
            None => self.name.split('.').next().unwrap_or(&self.name),
        }
    }
}

/// Literal constant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Keyword argument in a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub arg: String,
    pub value: Expr,
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Name(String, Span),
    Attribute {
        value: Box<Expr>,
        attr: String,
        span: Span,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        #[serde(default)]
        keywords: Vec<Keyword>,
        span: Span,
    },
    Constant(Constant, Span),
    Tuple(Vec<Expr>, Span),
}

impl Expr {
    /// Get the span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Name(_, span) => *span,
            Expr::Attribute { span, .. } => *span,
            Expr::Call { span, .. } => *span,
            Expr::Constant(_, span) => *span,
            Expr::Tuple(_, span) => *span,
        }
    }

    pub fn name(id: impl Into<String>) -> Self {
        Expr::Name(id.into(), Span::DUMMY)
    }

    pub fn attr(value: Expr, attr: impl Into<String>) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
            span: Span::DUMMY,
        }
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(func),
            args,
            keywords: Vec::new(),
            span: Span::DUMMY,
        }
    }

    /// Call with keyword arguments only: `func(k=v, ...)`
    pub fn call_kw(func: Expr, keywords: Vec<(&str, Expr)>) -> Self {
        Expr::Call {
            func: Box::new(func),
            args: Vec::new(),
            keywords: keywords
                .into_iter()
                .map(|(arg, value)| Keyword {
                    arg: arg.to_string(),
                    value,
                })
                .collect(),
            span: Span::DUMMY,
        }
    }

    pub fn int(value: i64) -> Self {
        Expr::Constant(Constant::Int(value), Span::DUMMY)
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Constant(Constant::Str(value.into()), Span::DUMMY)
    }

    pub fn none() -> Self {
        Expr::Constant(Constant::None, Span::DUMMY)
    }

    pub fn tuple(elts: Vec<Expr>) -> Self {
        Expr::Tuple(elts, Span::DUMMY)
    }

    /// `a.b.c` from a dotted path
    pub fn dotted(path: &str) -> Self {
        let mut parts = path.split('.');
        let mut expr = Expr::name(parts.next().unwrap_or_default());
        for part in parts {
            expr = Expr::attr(expr, part);
        }
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_dump_carries_version() {
        let module = Module::new("app", vec![Stmt::import("functools")]);
        let json = VersionedModule::new(module.clone()).to_json().unwrap();

        assert!(json.contains("\"ast_version\": 1"));
        let restored = VersionedModule::from_json(&json).unwrap();
        assert_eq!(restored.module, module);
    }

    #[test]
    fn test_dotted_builds_attribute_chain() {
        let expr = Expr::dotted("functools.lru_cache");
        match expr {
            Expr::Attribute { value, attr, .. } => {
                assert_eq!(attr, "lru_cache");
                assert_eq!(*value, Expr::name("functools"));
            }
            other => panic!("expected attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_alias_bindings() {
        assert_eq!(Alias::new("os.path").import_binding(), "os");
        assert_eq!(Alias::aliased("os.path", "p").import_binding(), "p");
        assert_eq!(Alias::aliased("lru_cache", "cache").binding(), "cache");
    }
}
