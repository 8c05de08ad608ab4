//! Check primitives.
//!
//! Every primitive is a method on [`crate::State`] returning
//! `Result<Step, CheckError>`:
//!
//! - `check_node` / `check_field` narrow the focus and return
//!   [`crate::Step::Focused`] with a child state,
//! - `has_code` / `has_equal_ast` / `has_parsed_ast` test the focus and
//!   return [`crate::Step::Passed`] with the input state,
//! - tree-walking primitives return [`crate::Step::Skipped`] when either side
//!   failed to parse.
//!
//! A failed test is reported to the state's reporter before the error is
//! returned, so `?` is all a caller needs to stop a chain.

pub mod code;
pub mod equal;
pub mod field;
pub mod node;
pub mod parsed;

pub use code::{CodeQuery, MSG_HAS_CODE};
pub use equal::{EqualAst, MSG_EQUAL_AST};
pub use field::{FieldQuery, MSG_MISSING_FIELD};
pub use node::{NodeQuery, MSG_MISSING_NODE};
pub use parsed::MSG_NOT_PARSED;
