//! Tree-sitter front end.
//!
//! Parses source text with the grammars bundled in `ast-grep-language` and
//! lowers the concrete syntax tree into the grammar-neutral [`crate::ast`]
//! model. Comments and layout are dropped during lowering.

pub mod errors;
pub mod parser;
pub mod snippet;

pub use errors::TreeSitterError;
pub use parser::{lower_node, resolve_language, LanguageParser, ParsedSource};
pub use snippet::{parse_snippet, SnippetTree};
