//! sct-focus: focus-narrowing syntax tree comparison
//!
//! Compares a student submission against a reference solution by parsing
//! both with the same grammar, narrowing the focus into corresponding
//! sub-trees on both sides and testing the focus structurally or textually.
//! The first divergence ends the chain with a feedback message that names
//! the focused construct and the span of student code it covers.
//!
//! # Architecture
//!
//! All tree access goes through a [`State`]: an immutable pair of foci plus
//! the [`History`] of narrowing steps that produced it. The check
//! primitives (`check_node`, `check_field`, `has_code`, `has_equal_ast`,
//! `has_parsed_ast`) are methods on `State`. Parsing, node selection and
//! node descriptions are delegated to a [`Dispatcher`]; the bundled
//! [`TreeSitterDispatcher`] covers every grammar shipped with
//! `ast-grep-language`.
//!
//! # Outcomes
//!
//! - a narrowed or unchanged state ([`Step`]),
//! - a student-facing failure ([`CheckError::Failed`]), already delivered to
//!   the [`Reporter`],
//! - an authoring error ([`CheckError::Authoring`]) when the check does not
//!   fit the solution,
//! - a skip ([`Step::Skipped`]) when code failed to parse, so only
//!   `has_parsed_ast` reports that.
//!
//! # Example
//!
//! ```no_run
//! use sct_focus::{CheckError, FeedbackLog, State, TreeSitterDispatcher};
//! use std::rc::Rc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Rc::new(TreeSitterDispatcher::for_language("rust")?);
//! let log = Rc::new(FeedbackLog::new());
//! let state = State::new(
//!     "fn area(w: u32, h: u32) -> u32 { w + h }",
//!     "fn area(w: u32, h: u32) -> u32 { w * h }",
//!     dispatcher,
//!     log.clone(),
//! )?;
//!
//! let run = || -> Result<(), CheckError> {
//!     state.has_parsed_ast()?;
//!     state
//!         .check_node("function_item", 0)?
//!         .check_field("body", None)?
//!         .has_equal_ast()?;
//!     Ok(())
//! };
//!
//! if let Err(CheckError::Failed(feedback)) = run() {
//!     println!("{feedback}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod cache;
pub mod checks;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod pool;
pub mod report;
pub mod state;
pub mod ts;

// Re-exports
pub use ast::{AstNode, FieldValue, Scalar, Span};
pub use checks::{CodeQuery, EqualAst, FieldQuery, NodeQuery};
pub use config::{load_from_path, load_from_str, ConfigError, DispatcherConfig, StartRule};
pub use dispatch::{
    DescribeContext, DispatchError, Dispatcher, ParseError, ParseResult, TreeSitterDispatcher,
    Vocabulary,
};
pub use errors::{AuthoringError, CheckError};
pub use report::{Feedback, FeedbackLog, Reporter, MSG_CHECK_FALLBACK};
pub use state::{Action, Focus, History, State, Step};
pub use ts::TreeSitterError;
