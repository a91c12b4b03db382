//! Inference engine tests
//!
//! Name lookup, imports, calls, recursion guards and loading modules from
//! dumps and configuration.

mod common;

use common::*;
use common::assert_eq;
use pyrite_config::ConfigLoader;
use pyrite_infer::ast::{self, Constant, Expr, Module, Stmt, VersionedModule};
use pyrite_infer::{logging, InferenceError, LogSettings, Manager, Settings, Value};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Names and imports
// ============================================================================

#[test]
fn test_import_binds_module() {
    let (manager, root) = build(Module::new("app", vec![Stmt::import("functools")]));
    let functools = manager.module("functools").unwrap();

    assert_infers(&manager, root, "functools", Value::Node(functools));
}

#[test]
fn test_import_from_with_alias() {
    let module = Module::new(
        "app",
        vec![Stmt::ImportFrom(ast::ImportFrom {
            module: "functools".to_string(),
            names: vec![ast::Alias::aliased("wraps", "copy_metadata")],
            span: Default::default(),
        })],
    );
    let (manager, root) = build(module);

    let values = infer_name(&manager, root, "copy_metadata").unwrap();
    let wraps = values[0].as_node().unwrap();
    assert_eq!(manager.tree().qname(wraps), "functools.wraps");
}

#[test]
fn test_dotted_import_binds_top_package() {
    let mut manager = Manager::new();
    let pkg = manager.build_module(&Module::new("pkg", vec![]));
    let util = manager.build_module(&Module::new(
        "pkg.util",
        vec![Stmt::assign("LIMIT", Expr::int(10))],
    ));
    let root = manager.build_module(&Module::new(
        "app",
        vec![
            Stmt::import("pkg.util"),
            Stmt::assign("limit", Expr::dotted("pkg.util.LIMIT")),
        ],
    ));

    assert_infers(&manager, root, "pkg", Value::Node(pkg));
    assert_eq!(
        manager
            .inferencer()
            .getattr(&Value::Node(pkg), "util")
            .unwrap(),
        vec![Value::Node(util)]
    );
    assert_infers(&manager, root, "limit", Value::Const(Constant::Int(10)));
}

#[test]
fn test_last_assignment_wins() {
    let module = Module::new(
        "app",
        vec![
            Stmt::assign("x", Expr::int(1)),
            Stmt::assign("x", Expr::str("two")),
        ],
    );
    let (manager, root) = build(module);

    assert_infers(&manager, root, "x", Value::Const(Constant::Str("two".into())));
}

#[rstest]
#[case::undefined_name("missing")]
#[case::unimported_module("functools")]
fn test_unknown_names_fail(#[case] name: &str) {
    let (manager, root) = build(Module::new("app", vec![]));

    assert!(matches!(
        infer_name(&manager, root, name),
        Err(InferenceError::NameNotFound { .. })
    ));
}

#[test]
fn test_missing_module_is_reported() {
    let (manager, root) = build(Module::new("app", vec![Stmt::import("requests")]));

    let err = infer_name(&manager, root, "requests").unwrap_err();
    assert!(matches!(err, InferenceError::ModuleNotFound(ref name) if name == "requests"));
}

#[test]
fn test_circular_from_imports_are_uninferable() {
    let mut manager = Manager::new();
    manager.build_module(&Module::new(
        "a",
        vec![Stmt::import_from("b", &["handler"])],
    ));
    let b = manager.build_module(&Module::new(
        "b",
        vec![Stmt::import_from("a", &["handler"])],
    ));

    assert_infers(&manager, b, "handler", Value::Uninferable);
}

#[test]
fn test_module_importing_from_itself() {
    let (manager, root) = build(Module::new(
        "app",
        vec![Stmt::import_from("app", &["handler"])],
    ));

    assert_infers(&manager, root, "handler", Value::Uninferable);
}

#[test]
fn test_parameters_are_uninferable() {
    let module = Module::new(
        "app",
        vec![
            ast::FunctionDef::new("identity", &["x"])
                .with_body(vec![Stmt::ret(Expr::name("x"))])
                .into(),
            Stmt::assign(
                "y",
                Expr::call(Expr::name("identity"), vec![Expr::int(3)]),
            ),
        ],
    );
    let (manager, root) = build(module);

    assert_infers(&manager, root, "y", Value::Uninferable);
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_method_call_through_instance() {
    let module = Module::new(
        "app",
        vec![
            ast::ClassDef::new(
                "Counter",
                vec![ast::FunctionDef::new("start", &["self"])
                    .with_body(vec![Stmt::ret(Expr::int(0))])
                    .into()],
            )
            .into(),
            Stmt::assign(
                "value",
                Expr::call(
                    Expr::attr(Expr::call(Expr::name("Counter"), vec![]), "start"),
                    vec![],
                ),
            ),
        ],
    );
    let (manager, root) = build(module);

    assert_infers(&manager, root, "value", Value::Const(Constant::Int(0)));
}

#[test]
fn test_methods_do_not_see_class_scope() {
    let module = Module::new(
        "app",
        vec![ast::ClassDef::new(
            "Config",
            vec![
                Stmt::assign("DEFAULT", Expr::int(5)),
                ast::FunctionDef::new("get", &["self"])
                    .with_body(vec![Stmt::ret(Expr::name("DEFAULT"))])
                    .into(),
            ],
        )
        .into()],
    );
    let (manager, root) = build(module);
    let class = local(&manager, root, "Config");
    let get = local(&manager, class, "get");

    let result = manager.inferencer().infer_call_result(&Value::Node(get));
    assert!(matches!(result, Err(InferenceError::NameNotFound { ref name }) if name == "DEFAULT"));
    assert_infers(&manager, class, "DEFAULT", Value::Const(Constant::Int(5)));
}

#[test]
fn test_constants_are_not_callable() {
    let module = Module::new(
        "app",
        vec![
            Stmt::assign("n", Expr::int(1)),
            Stmt::assign("r", Expr::call(Expr::name("n"), vec![])),
        ],
    );
    let (manager, root) = build(module);

    let err = infer_name(&manager, root, "r").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"1 is not callable");
}

// ============================================================================
// Recursion guard
// ============================================================================

#[test]
fn test_assignment_cycle_is_uninferable() {
    let module = Module::new(
        "app",
        vec![
            Stmt::assign("a", Expr::name("b")),
            Stmt::assign("b", Expr::name("a")),
        ],
    );
    let (manager, root) = build(module);

    assert_infers(&manager, root, "a", Value::Uninferable);
}

#[test]
fn test_deep_chain_hits_recursion_limit() {
    let mut body = vec![Stmt::assign("v0", Expr::int(0))];
    for i in 1..40 {
        body.push(Stmt::assign(format!("v{}", i), Expr::name(format!("v{}", i - 1))));
    }
    let (manager, root) = build_with(
        Settings::default().with_max_depth(8),
        Module::new("app", body),
    );

    assert!(matches!(
        infer_name(&manager, root, "v39"),
        Err(InferenceError::RecursionLimit { max_depth: 8 })
    ));
    assert_infers(&manager, root, "v3", Value::Const(Constant::Int(0)));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_versioned_dump_format() {
    let json = VersionedModule::new(Module::new("m", vec![Stmt::pass()]))
        .to_json()
        .unwrap();

    insta::assert_snapshot!(json, @r###"
    {
      "ast_version": 1,
      "name": "m",
      "body": [
        {
          "Pass": {
            "line": 0,
            "column": 0
          }
        }
      ]
    }
    "###);
}

#[test]
fn test_load_module_from_dump_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.json");
    let module = app(vec![decorated(
        "f",
        vec![Expr::call(Expr::name("lru_cache"), vec![])],
    )]);
    fs::write(&path, VersionedModule::new(module).to_json().unwrap()).unwrap();

    let mut manager = Manager::new();
    let root = manager.load_module_file(&path).unwrap();

    assert_eq!(manager.module("app"), Some(root));
    assert!(is_augmented(&manager, root, "f"));
}

#[test]
fn test_invalid_dump_is_rejected() {
    let mut manager = Manager::new();
    assert!(matches!(
        manager.load_module_json("{\"ast_version\": 1"),
        Err(InferenceError::InvalidDump(_))
    ));
}

#[test]
fn test_missing_dump_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = Manager::new();

    assert!(matches!(
        manager.load_module_file(&temp_dir.path().join("absent.json")),
        Err(InferenceError::Io(_))
    ));
}

#[test]
fn test_manager_from_project_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("pyrite.toml"),
        "[inference]\nmax_depth = 16\n[brain]\nbare_decorators = true\n",
    )
    .unwrap();

    let config = ConfigLoader::with_global_config_path(temp_dir.path().join("none.toml"))
        .load_from_directory(temp_dir.path())
        .unwrap();
    let mut manager = Manager::from_config(&config);
    let root = manager.build_module(&app(vec![decorated("f", vec![Expr::name("lru_cache")])]));

    assert_eq!(manager.settings().max_depth, 16);
    assert!(is_augmented(&manager, root, "f"));
}

#[test]
fn test_logging_init_is_idempotent() {
    logging::init(&LogSettings::default());
    assert!(!logging::init(&LogSettings::default()));
}
