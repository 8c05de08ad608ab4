//! The contract between the check primitives and a language front end.
//!
//! A [`Dispatcher`] parses text, selects typed sub-nodes and describes nodes
//! for feedback. [`TreeSitterDispatcher`] implements it for every grammar
//! bundled with `ast-grep-language`; other front ends only need to lower
//! their trees into [`AstNode`]s.

pub mod describe;
pub mod grammar;

pub use describe::{fill_template, ordinal, DescribeContext, Vocabulary};
pub use grammar::TreeSitterDispatcher;

use crate::ast::{AstNode, FieldValue, Span};
use crate::ts::TreeSitterError;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Marker for code that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseError {
    /// Location of the first syntax error, when the parser reports one.
    pub span: Option<Span>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "syntax error at byte {}..{}", span.start, span.end),
            None => f.write_str("syntax error"),
        }
    }
}

/// Result of parsing a piece of code: a tree, or the parse error marker.
pub type ParseResult = Result<Rc<AstNode>, ParseError>;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unknown start rule '{rule}'")]
    UnknownStartRule { rule: String },

    #[error("invalid dispatcher configuration: {0}")]
    Config(#[from] crate::config::ValidationError),

    #[error(transparent)]
    TreeSitter(#[from] TreeSitterError),
}

pub trait Dispatcher {
    /// Parse `code`. `start` names a grammar rule to parse a snippet with;
    /// `None` parses a whole program. A syntax error in the code is not an
    /// error of the dispatcher: it is returned as `Ok(Err(ParseError))`.
    fn parse(&self, code: &str, start: Option<&str>) -> Result<ParseResult, DispatchError>;

    /// Ordered nodes of kind `kind` under `tree`. `priority` bounds how deep
    /// the search descends; `None` uses the dispatcher's default for `kind`.
    fn select(&self, kind: &str, tree: &FieldValue, priority: Option<u32>) -> Vec<Rc<AstNode>>;

    /// Fill `template` with a description of `node`. `None` tells the caller
    /// to fall back to its generic message.
    fn describe(
        &self,
        node: Option<&AstNode>,
        template: &str,
        ctx: &DescribeContext<'_>,
    ) -> Option<String>;

    /// Source text covered by `value`.
    fn extract_text(&self, value: &FieldValue, source: &str) -> String {
        value.extract_text(source)
    }
}

/// Search priority used when a caller did not request one.
///
/// A kind with a configured priority bounds the search at constructs of the
/// same or higher priority. A kind without one (priority 0) searches the
/// whole tree.
pub fn resolve_search_priority(requested: Option<u32>, kind_priority: u32) -> u32 {
    match (requested, kind_priority) {
        (Some(p), _) => p,
        (None, 0) => u32::MAX,
        (None, p) => p,
    }
}
