use crate::ast::{AstNode, FieldValue, Span};
use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::rc::Rc;
use std::str::FromStr;
use tree_sitter::{Node, Parser, Tree};

/// Field used for named children that are not attached through a grammar field.
pub const CHILDREN_FIELD: &str = "children";

/// Field for anonymous tokens that are not attached through a grammar field.
pub const TOKENS_FIELD: &str = "tokens";

/// Field holding the source text of a named leaf.
pub const TEXT_FIELD: &str = "text";

/// Resolve a language name (`"rust"`, `"rs"`, `"python"`, ...).
pub fn resolve_language(name: &str) -> Result<SupportLang, TreeSitterError> {
    SupportLang::from_str(name).map_err(|_| TreeSitterError::UnknownLanguage {
        name: name.to_string(),
    })
}

/// Tree-sitter parser wrapper for one language.
pub struct LanguageParser {
    parser: Parser,
    lang: SupportLang,
}

impl LanguageParser {
    pub fn new(lang: SupportLang) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        let ts_lang = lang.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser, lang })
    }

    pub fn language(&self) -> SupportLang {
        self.lang
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, TreeSitterError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Span of the first ERROR or MISSING node, if the tree has any.
    pub fn first_error(&self) -> Option<Span> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }
        find_error(root)
    }

    /// Lower the whole tree into an owned [`AstNode`].
    pub fn lower(&self) -> AstNode {
        lower_node(self.root_node(), self.source)
    }
}

fn find_error(node: Node<'_>) -> Option<Span> {
    if node.is_error() || node.is_missing() {
        return Some(node.byte_range().into());
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(span) = find_error(child) {
                return Some(span);
            }
        }
    }

    None
}

enum Member {
    Node(AstNode),
    Token(String),
}

/// Tokens that only delimit structure the tree already encodes.
const DELIMITERS: &[&str] = &["(", ")", "[", "]", "{", "}", ",", ";"];

/// Convert a concrete tree-sitter node into an [`AstNode`].
///
/// Children attached through a grammar field become that field: a single
/// named child is a node, anonymous tokens (operators, say) are a text
/// scalar and several named children are a sequence. When a field mixes
/// nodes and tokens the tokens go to a `<field>_tokens` text field. Named
/// children without a field are gathered under [`CHILDREN_FIELD`], and
/// anonymous tokens without a field other than delimiters under
/// [`TOKENS_FIELD`]. A named node without any of these gets a
/// [`TEXT_FIELD`] with its source text. Extras such as comments are dropped.
pub fn lower_node(node: Node<'_>, source: &str) -> AstNode {
    let mut grouped: Vec<(&'static str, Vec<Member>)> = Vec::new();
    let mut unnamed = Vec::new();
    let mut loose = Vec::new();

    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if !child.is_extra() {
                match cursor.field_name() {
                    Some(field) => {
                        let member = if child.is_named() {
                            Member::Node(lower_node(child, source))
                        } else {
                            Member::Token(node_text(child, source).to_string())
                        };
                        match grouped.iter_mut().find(|(name, _)| *name == field) {
                            Some((_, members)) => members.push(member),
                            None => grouped.push((field, vec![member])),
                        }
                    }
                    None if child.is_named() => unnamed.push(lower_node(child, source)),
                    None => {
                        let token = node_text(child, source);
                        if !DELIMITERS.contains(&token) {
                            loose.push(token);
                        }
                    }
                }
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    let mut ast = AstNode::new(node.kind(), node.byte_range());

    for (field, members) in grouped {
        let (value, tokens) = group_value(members);
        ast = ast.with_field(field, value);
        if let Some(tokens) = tokens {
            ast = ast.with_field(format!("{field}_{TOKENS_FIELD}"), FieldValue::text(tokens));
        }
    }

    if !unnamed.is_empty() {
        ast = ast.with_field(CHILDREN_FIELD, FieldValue::seq(unnamed));
    }

    if !loose.is_empty() {
        ast = ast.with_field(TOKENS_FIELD, FieldValue::text(loose.join(" ")));
    }

    if ast.fields.is_empty() {
        ast = ast.with_field(TEXT_FIELD, FieldValue::text(node_text(node, source)));
    }

    ast
}

/// Value of one grammar field, plus the tokens that did not fit into it.
fn group_value(members: Vec<Member>) -> (FieldValue, Option<String>) {
    let mut nodes = Vec::new();
    let mut tokens = Vec::new();
    for member in members {
        match member {
            Member::Node(n) => nodes.push(Rc::new(n)),
            Member::Token(t) => tokens.push(t),
        }
    }

    let tokens = (!tokens.is_empty()).then(|| tokens.join(" "));
    match (nodes.len(), tokens) {
        (0, Some(tokens)) => (FieldValue::text(tokens), None),
        (1, None) => (FieldValue::Node(nodes.remove(0)), None),
        (_, tokens) => (FieldValue::Seq(nodes), tokens),
    }
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rust_parser() -> LanguageParser {
        LanguageParser::new(resolve_language("rust").unwrap()).unwrap()
    }

    #[test]
    fn resolves_language_aliases() {
        assert!(resolve_language("rust").is_ok());
        assert!(resolve_language("rs").is_ok());
        assert!(matches!(
            resolve_language("klingon"),
            Err(TreeSitterError::UnknownLanguage { .. })
        ));
    }

    #[test]
    fn lowers_fields_and_leaves() {
        let mut parser = rust_parser();
        let parsed = parser.parse_with_source("fn main() { let x = 1; }").unwrap();
        assert!(parsed.first_error().is_none());

        let root = parsed.lower();
        assert_eq!(root.kind, "source_file");

        let FieldValue::Seq(items) = root.get_field(CHILDREN_FIELD).unwrap() else {
            panic!("expected children sequence");
        };
        let func = &items[0];
        assert_eq!(func.kind, "function_item");

        let name = func.get_field("name").unwrap().as_node().unwrap();
        assert_eq!(name.kind, "identifier");
        assert_eq!(name.get_field(TEXT_FIELD), Some(&FieldValue::text("main")));
        assert!(func.get_field("body").is_some());
    }

    #[test]
    fn operator_tokens_are_scalars() {
        let mut parser = rust_parser();
        let plus = parser.parse_with_source("fn f() { a + b; }").unwrap().lower();
        let minus = parser.parse_with_source("fn f() { a - b; }").unwrap().lower();
        assert_ne!(plus, minus);
        assert!(plus.repr().contains(r#"operator="+""#));
    }

    #[test]
    fn comments_and_whitespace_are_ignored() {
        let mut parser = rust_parser();
        let a = parser.parse_with_source("fn f() { g(1); }").unwrap().lower();
        let b = parser
            .parse_with_source("fn f()   {\n  // call\n  g( 1 );\n}")
            .unwrap()
            .lower();
        assert_eq!(a, b);
    }

    #[test]
    fn unfielded_operator_tokens_are_kept() {
        let mut parser = rust_parser();
        assert_eq!(parser.language(), SupportLang::Rust);

        let lower = |parser: &mut LanguageParser, code: &str| {
            parser.parse_with_source(code).unwrap().lower()
        };
        let exclusive = lower(&mut parser, "fn f() { for i in 0..n {} }");
        let inclusive = lower(&mut parser, "fn f() { for i in 0..=n {} }");
        assert_ne!(exclusive, inclusive);
        assert!(exclusive.repr().contains(r#"tokens="..""#));

        let negated = lower(&mut parser, "fn f() { -x; }");
        let inverted = lower(&mut parser, "fn f() { !x; }");
        assert_ne!(negated, inverted);
    }

    #[test]
    fn tokens_in_repeated_fields_are_kept() {
        let mut parser = LanguageParser::new(resolve_language("python").unwrap()).unwrap();
        assert_eq!(parser.language(), SupportLang::Python);

        let ascending = parser.parse_with_source("a < b <= c\n").unwrap().lower();
        let descending = parser.parse_with_source("a > b >= c\n").unwrap().lower();
        assert_ne!(ascending, descending);
        assert!(ascending.repr().contains(r#"operators="< <=""#));
    }

    #[test]
    fn reports_first_error_span() {
        let mut parser = rust_parser();
        let parsed = parser.parse_with_source("fn main( { }").unwrap();
        assert!(parsed.first_error().is_some());
    }
}
