use crate::ast::AstNode;
use std::collections::BTreeMap;

/// Extra information for [`Vocabulary::describe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DescribeContext<'a> {
    pub field: Option<&'a str>,
    pub index: Option<usize>,
}

impl<'a> DescribeContext<'a> {
    pub fn index(index: Option<usize>) -> Self {
        Self { field: None, index }
    }

    pub fn field(field: &'a str, index: Option<usize>) -> Self {
        Self {
            field: Some(field),
            index,
        }
    }
}

/// Human readable names for node kinds and fields.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    node_names: BTreeMap<String, String>,
    field_names: BTreeMap<String, String>,
}

impl Vocabulary {
    pub fn new(node_names: BTreeMap<String, String>, field_names: BTreeMap<String, String>) -> Self {
        Self {
            node_names,
            field_names,
        }
    }

    pub fn with_node(mut self, kind: &str, name: &str) -> Self {
        self.node_names.insert(kind.to_string(), name.to_string());
        self
    }

    pub fn with_field(mut self, key: &str, name: &str) -> Self {
        self.field_names.insert(key.to_string(), name.to_string());
        self
    }

    pub fn node_name(&self, kind: &str) -> String {
        self.node_names
            .get(kind)
            .cloned()
            .unwrap_or_else(|| kind.to_string())
    }

    /// Name of `field` on a `kind` node. `kind.field` entries win over
    /// plain `field` entries; unnamed fields read as their identifier with
    /// underscores as spaces.
    pub fn field_name(&self, kind: &str, field: &str) -> String {
        self.field_names
            .get(&format!("{kind}.{field}"))
            .or_else(|| self.field_names.get(field))
            .cloned()
            .unwrap_or_else(|| field.replace('_', " "))
    }

    /// Fill `{node_name}`, `{field_name}` and `{index}` in `template`.
    ///
    /// `{index}` becomes an ordinal followed by a space ("second ") when an
    /// index is given, and nothing otherwise.
    pub fn describe(
        &self,
        node: Option<&AstNode>,
        template: &str,
        ctx: &DescribeContext<'_>,
    ) -> Option<String> {
        let node = node?;
        let node_name = self.node_name(&node.kind);
        let field_name = ctx
            .field
            .map(|f| self.field_name(&node.kind, f))
            .unwrap_or_default();
        let index = ctx
            .index
            .map(|i| format!("{} ", ordinal(i + 1)))
            .unwrap_or_default();

        Some(fill_template(
            template,
            &[
                ("node_name", node_name.as_str()),
                ("field_name", field_name.as_str()),
                ("index", index.as_str()),
            ],
        ))
    }
}

/// English ordinal for a one-based position.
pub fn ordinal(n: usize) -> String {
    const WORDS: [&str; 10] = [
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        "tenth",
    ];
    if (1..=WORDS.len()).contains(&n) {
        return WORDS[n - 1].to_string();
    }
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Replace `{key}` placeholders. Unknown placeholders are left as written.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
