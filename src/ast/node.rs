use std::fmt::{self, Write};
use std::ops::Range;
use std::rc::Rc;

/// Byte range of source text covered by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn hull(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }

    /// Slice `source` by this span, returning an empty string when the span
    /// does not fit the source or splits a character.
    pub fn slice(self, source: &str) -> &str {
        source.get(self.range()).unwrap_or_default()
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Span::new(r.start, r.end)
    }
}

/// Scalar field content (tokens, literals, flags).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Value held by a named field of an [`AstNode`].
///
/// `Null` is an explicit "no value": the field exists but is empty. A field
/// that does not exist at all is reported by [`AstNode::get_field`] returning
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Node(Rc<AstNode>),
    Seq(Vec<Rc<AstNode>>),
    Scalar(Scalar),
    Null,
}

impl FieldValue {
    pub fn node(node: AstNode) -> Self {
        FieldValue::Node(Rc::new(node))
    }

    pub fn seq(nodes: impl IntoIterator<Item = AstNode>) -> Self {
        FieldValue::Seq(nodes.into_iter().map(Rc::new).collect())
    }

    pub fn text(text: impl Into<String>) -> Self {
        FieldValue::Scalar(Scalar::Text(text.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_node(&self) -> Option<&Rc<AstNode>> {
        match self {
            FieldValue::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Short name of the value's shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            FieldValue::Node(_) => "node",
            FieldValue::Seq(_) => "sequence",
            FieldValue::Scalar(_) => "scalar",
            FieldValue::Null => "null",
        }
    }

    /// Source span covered by the value. Sequences cover the hull of their
    /// elements; scalars and null have no span.
    pub fn span(&self) -> Option<Span> {
        match self {
            FieldValue::Node(n) => Some(n.span),
            FieldValue::Seq(nodes) => nodes.iter().map(|n| n.span).reduce(Span::hull),
            FieldValue::Scalar(_) | FieldValue::Null => None,
        }
    }

    /// Recover the source text covered by this value.
    pub fn extract_text(&self, source: &str) -> String {
        match self {
            FieldValue::Scalar(s) => s.to_string(),
            FieldValue::Null => String::new(),
            _ => self
                .span()
                .map(|span| span.slice(source).to_string())
                .unwrap_or_default(),
        }
    }

    /// Canonical structural representation.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    pub(crate) fn write_repr(&self, out: &mut String) {
        match self {
            FieldValue::Node(n) => n.write_repr(out),
            FieldValue::Seq(nodes) => {
                out.push('[');
                for (i, n) in nodes.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    n.write_repr(out);
                }
                out.push(']');
            }
            FieldValue::Scalar(Scalar::Text(s)) => {
                let _ = write!(out, "{s:?}");
            }
            FieldValue::Scalar(s) => {
                let _ = write!(out, "{s}");
            }
            FieldValue::Null => out.push_str("null"),
        }
    }
}

impl From<AstNode> for FieldValue {
    fn from(node: AstNode) -> Self {
        FieldValue::node(node)
    }
}

impl From<Rc<AstNode>> for FieldValue {
    fn from(node: Rc<AstNode>) -> Self {
        FieldValue::Node(node)
    }
}

/// One parsed syntactic construct: a kind tag, ordered named fields and the
/// source span it covers.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: String,
    pub fields: Vec<(String, FieldValue)>,
    pub span: Span,
}

impl AstNode {
    pub fn new(kind: impl Into<String>, span: impl Into<Span>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
            span: span.into(),
        }
    }

    /// Builder-style field insertion. Later fields keep their position.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Nodes directly reachable through this node's fields, in field order.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Rc<AstNode>> {
        self.fields.iter().flat_map(|(_, value)| match value {
            FieldValue::Node(n) => std::slice::from_ref(n).iter(),
            FieldValue::Seq(nodes) => nodes.iter(),
            FieldValue::Scalar(_) | FieldValue::Null => [].iter(),
        })
    }

    /// Canonical structural representation, independent of spans.
    ///
    /// ```
    /// use sct_focus::ast::{AstNode, FieldValue};
    ///
    /// let ident = AstNode::new("Identifier", 0..1).with_field("name", FieldValue::text("a"));
    /// assert_eq!(ident.repr(), r#"(Identifier name="a")"#);
    /// ```
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        out.push('(');
        out.push_str(&self.kind);
        for (name, value) in &self.fields {
            out.push(' ');
            out.push_str(name);
            out.push('=');
            value.write_repr(out);
        }
        out.push(')');
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.fields == other.fields
    }
}

impl Eq for AstNode {}
