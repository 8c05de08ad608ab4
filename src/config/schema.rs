use crate::ts::snippet::{rust_start_rules, CODE_PLACEHOLDER};
use ast_grep_language::SupportLang;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Configuration of a tree-sitter backed dispatcher.
#[derive(Debug, Deserialize, Clone)]
pub struct DispatcherConfig {
    pub language: String,
    /// Priority of kinds not listed in `priorities`.
    #[serde(default)]
    pub default_priority: u32,
    /// Node kind -> priority. Node searches only descend into nodes whose
    /// priority is below the search priority.
    #[serde(default)]
    pub priorities: BTreeMap<String, u32>,
    /// Node kind -> human readable name used in feedback.
    #[serde(default)]
    pub node_names: BTreeMap<String, String>,
    /// `kind.field` or `field` -> human readable name used in feedback.
    #[serde(default)]
    pub field_names: BTreeMap<String, String>,
    #[serde(default)]
    pub start_rules: BTreeMap<String, StartRule>,
}

impl DispatcherConfig {
    /// Built-in configuration for a language. Rust ships start rules and
    /// names for its common constructs; other languages only get the
    /// whole-program start rule.
    pub fn for_language(language: &str) -> Self {
        let mut config = DispatcherConfig {
            language: language.to_string(),
            default_priority: 0,
            priorities: BTreeMap::new(),
            node_names: BTreeMap::new(),
            field_names: BTreeMap::new(),
            start_rules: BTreeMap::new(),
        };

        if matches!(SupportLang::from_str(language), Ok(SupportLang::Rust)) {
            config.start_rules = rust_start_rules()
                .into_iter()
                .map(|(name, rule)| (name.to_string(), rule))
                .collect();
            for (kind, name, priority) in RUST_CONSTRUCTS {
                config.node_names.insert(kind.to_string(), name.to_string());
                config.priorities.insert(kind.to_string(), *priority);
            }
            config
                .field_names
                .insert("function_item.body".to_string(), "body".to_string());
            config
                .field_names
                .insert("function_item.parameters".to_string(), "parameter list".to_string());
        }

        config
    }

    pub fn priority_of(&self, kind: &str) -> u32 {
        self.priorities
            .get(kind)
            .copied()
            .unwrap_or(self.default_priority)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.language.trim().is_empty() {
            issues.push(ValidationIssue::MissingField { field: "language" });
        } else if SupportLang::from_str(&self.language).is_err() {
            issues.push(ValidationIssue::UnknownLanguage {
                name: self.language.clone(),
            });
        }

        for (name, rule) in &self.start_rules {
            if !rule.template.contains(CODE_PLACEHOLDER) {
                issues.push(ValidationIssue::InvalidStartRule {
                    rule: name.clone(),
                    message: format!("template must contain {CODE_PLACEHOLDER}"),
                });
            }
            if rule.kind.trim().is_empty() {
                issues.push(ValidationIssue::InvalidStartRule {
                    rule: name.clone(),
                    message: "kind must not be empty".to_string(),
                });
            }
            if matches!(&rule.field, Some(field) if field.trim().is_empty()) {
                issues.push(ValidationIssue::InvalidStartRule {
                    rule: name.clone(),
                    message: "field must not be empty when given".to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Rust constructs with their feedback names. Priorities grow from
/// containers towards expressions, so a search for a construct looks inside
/// the constructs listed before it.
const RUST_CONSTRUCTS: &[(&str, &str, u32)] = &[
    ("impl_item", "impl block", 1),
    ("struct_item", "struct definition", 1),
    ("enum_item", "enum definition", 1),
    ("function_item", "function definition", 2),
    ("if_expression", "if expression", 3),
    ("for_expression", "for loop", 3),
    ("while_expression", "while loop", 3),
    ("let_declaration", "variable declaration", 4),
    ("return_expression", "return statement", 5),
    ("binary_expression", "binary expression", 6),
    ("call_expression", "function call", 7),
];

/// How to parse a snippet as a particular syntactic category.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StartRule {
    /// Source text with a `$CODE` placeholder for the snippet.
    pub template: String,
    /// Kind of the first node to take from the parsed template.
    pub kind: String,
    /// Field of that node to take instead of the node itself.
    #[serde(default)]
    pub field: Option<String>,
}

impl StartRule {
    pub fn new(template: &str, kind: &str, field: Option<&str>) -> Self {
        Self {
            template: template.to_string(),
            kind: kind.to_string(),
            field: field.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    UnknownLanguage { name: String },
    InvalidStartRule { rule: String, message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "dispatcher config missing required field '{field}'")
            }
            ValidationIssue::UnknownLanguage { name } => {
                write!(f, "dispatcher config names unsupported language '{name}'")
            }
            ValidationIssue::InvalidStartRule { rule, message } => {
                write!(f, "start rule '{rule}' is invalid: {message}")
            }
        }
    }
}
