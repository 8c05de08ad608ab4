//! Integration tests for dispatcher configuration
//!
//! Loads TOML configs from disk and runs checks through the dispatcher they
//! configure.

use sct_focus::config::ValidationIssue;
use sct_focus::{
    load_from_path, load_from_str, ConfigError, EqualAst, FeedbackLog, State,
    TreeSitterDispatcher,
};
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

const CUSTOM: &str = r#"
language = "rust"

[node_names]
function_item = "function"
macro_invocation = "macro call"

[field_names]
"function_item.name" = "name"

[priorities]
macro_invocation = 3

[start_rules.call]
template = "fn __wrapper__() { $CODE; }"
kind = "call_expression"
"#;

fn state_with(config: &str, student: &str, solution: &str) -> (State, Rc<FeedbackLog>) {
    let config = load_from_str(config).expect("Failed to parse config");
    let dispatcher = TreeSitterDispatcher::new(config).expect("Failed to build dispatcher");
    let log = Rc::new(FeedbackLog::new());
    let state = State::new(student, solution, Rc::new(dispatcher), log.clone()).unwrap();
    (state, log)
}

#[test]
fn test_load_merges_builtin_defaults() {
    let config = load_from_str(CUSTOM).expect("Failed to parse config");

    assert_eq!(config.language, "rust");
    assert_eq!(config.node_names["function_item"], "function");
    assert_eq!(config.node_names["let_declaration"], "variable declaration");
    assert_eq!(config.priority_of("macro_invocation"), 3);
    assert_eq!(config.priority_of("function_item"), 2);
    assert!(config.start_rules.contains_key("call"));
    assert!(config.start_rules.contains_key("expression"));
}

#[test]
fn test_load_from_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rust.toml");
    fs::write(&path, CUSTOM).unwrap();

    let config = load_from_path(&path).expect("Failed to load config");
    assert_eq!(config.node_names["macro_invocation"], "macro call");
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_toml_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "language = ").unwrap();

    let err = load_from_path(&path).unwrap_err();
    match &err {
        ConfigError::Toml { path: Some(p), .. } => assert_eq!(p, &path),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_validation_collects_issues() {
    let toml = r#"
language = "cobol"

[start_rules.bad]
template = "no placeholder"
kind = "x"
"#;
    let err = load_from_str(toml).unwrap_err();
    let ConfigError::Validation { source, path: None } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(source.issues.len(), 2);
    assert!(source
        .issues
        .iter()
        .any(|i| matches!(i, ValidationIssue::UnknownLanguage { name } if name == "cobol")));
    assert!(source
        .issues
        .iter()
        .any(|i| matches!(i, ValidationIssue::InvalidStartRule { rule, .. } if rule == "bad")));
}

#[test]
fn test_configured_names_appear_in_feedback() {
    let (state, log) = state_with(CUSTOM, "fn main() {}", "fn main() {}\nfn helper() {}");

    let err = state.check_node("function_item", 1).unwrap_err();
    assert_eq!(
        err.feedback().map(|f| f.message.as_str()),
        Some("Could not find the second function.")
    );
    assert_eq!(log.len(), 1);
}

#[test]
fn test_configured_field_name() {
    let (state, _log) = state_with(CUSTOM, "fn start() {}", "fn main() {}");

    let name = state
        .check_node("function_item", 0)
        .and_then(|s| s.check_field("name", None))
        .unwrap();
    let err = name.has_equal_ast().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Check the name of the function. The checker expected to find `main` in there."
    );
}

#[test]
fn test_configured_start_rule() {
    let code = "fn main() { let n = parse(input); }";
    let (state, log) = state_with(CUSTOM, code, code);

    let decl = state.check_node("let_declaration", 0).unwrap();
    let query = EqualAst::default().code("parse(input)", Some("call"));
    assert!(decl
        .check_field("value", None)
        .and_then(|s| s.has_equal_ast_with(&query))
        .is_ok());

    let query = EqualAst::default().code("parse(output)", Some("call")).exact(false);
    assert!(decl.has_equal_ast_with(&query).is_err());
    assert_eq!(log.len(), 1);
}
