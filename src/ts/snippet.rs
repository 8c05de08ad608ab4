use crate::ast::{AstNode, FieldValue, Span};
use crate::config::StartRule;
use crate::ts::errors::TreeSitterError;
use crate::ts::parser::LanguageParser;
use std::rc::Rc;

/// Placeholder replaced by the snippet inside a start rule template.
pub const CODE_PLACEHOLDER: &str = "$CODE";

/// Outcome of parsing a snippet under a start rule.
pub enum SnippetTree {
    Parsed(Rc<AstNode>),
    /// The wrapped snippet did not parse; carries the first error span
    /// relative to the wrapped text.
    Invalid(Span),
}

/// Parse `snippet` as the syntactic category described by `rule`.
///
/// The snippet is spliced into the rule's template, the result is parsed and
/// the first node of the rule's kind (or one of its fields) is taken as the
/// snippet's tree. Spans in the returned tree refer to the wrapped text.
pub fn parse_snippet(
    parser: &mut LanguageParser,
    rule_name: &str,
    rule: &StartRule,
    snippet: &str,
) -> Result<SnippetTree, TreeSitterError> {
    let wrapped = rule.template.replacen(CODE_PLACEHOLDER, snippet, 1);
    let parsed = parser.parse_with_source(&wrapped)?;

    if let Some(span) = parsed.first_error() {
        return Ok(SnippetTree::Invalid(span));
    }

    let root = FieldValue::node(parsed.lower());
    let node = first_of_kind(&root, &rule.kind).ok_or_else(|| TreeSitterError::StartRuleNoMatch {
        rule: rule_name.to_string(),
        kind: rule.kind.clone(),
    })?;

    let Some(field) = &rule.field else {
        return Ok(SnippetTree::Parsed(node));
    };

    match node.get_field(field) {
        Some(FieldValue::Node(inner)) => Ok(SnippetTree::Parsed(Rc::clone(inner))),
        _ => Err(TreeSitterError::StartRuleMissingField {
            rule: rule_name.to_string(),
            kind: rule.kind.clone(),
            field: field.clone(),
        }),
    }
}

fn first_of_kind(value: &FieldValue, kind: &str) -> Option<Rc<AstNode>> {
    let node = value.as_node()?;
    if node.kind == kind {
        return Some(Rc::clone(node));
    }
    node.child_nodes()
        .find_map(|child| first_of_kind(&FieldValue::Node(Rc::clone(child)), kind))
}

/// Start rules shipped for the Rust grammar.
pub fn rust_start_rules() -> Vec<(&'static str, StartRule)> {
    vec![
        ("item", StartRule::new("$CODE", "source_file", None)),
        (
            "statement",
            StartRule::new("fn __wrapper__() { $CODE }", "block", None),
        ),
        (
            "expression",
            StartRule::new(
                "fn __wrapper__() { let _ = $CODE; }",
                "let_declaration",
                Some("value"),
            ),
        ),
        (
            "block",
            StartRule::new("fn __wrapper__() $CODE", "function_item", Some("body")),
        ),
        (
            "type",
            StartRule::new("type __Wrapper__ = $CODE;", "type_item", Some("type")),
        ),
    ]
}
