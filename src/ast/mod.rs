//! Owned syntax tree model shared by every dispatcher.
//!
//! Parsers lower their concrete trees into [`AstNode`]s so that the check
//! primitives can compare and search trees without knowing the grammar.

pub mod node;
pub mod search;

pub use node::{AstNode, FieldValue, Scalar, Span};
pub use search::Finder;
