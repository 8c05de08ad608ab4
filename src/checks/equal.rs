use crate::ast::FieldValue;
use crate::dispatch::fill_template;
use crate::errors::{AuthoringError, CheckError};
use crate::report::MSG_CHECK_FALLBACK;
use crate::state::{State, Step};
use tracing::trace;

pub const MSG_EQUAL_AST: &str = "Check the {ast_path}.{extra}";

/// Parameters of [`State::has_equal_ast_with`].
#[derive(Debug, Clone, Copy)]
pub struct EqualAst<'a> {
    pub msg: &'a str,
    /// Code to compare against instead of the solution focus.
    pub code: Option<&'a str>,
    /// Start rule to parse `code` with; `None` parses it as a program.
    pub start: Option<&'a str>,
    /// Require identical trees; otherwise the target only has to occur
    /// somewhere inside the student focus.
    pub exact: bool,
}

impl Default for EqualAst<'_> {
    fn default() -> Self {
        Self {
            msg: MSG_EQUAL_AST,
            code: None,
            start: None,
            exact: true,
        }
    }
}

impl<'a> EqualAst<'a> {
    /// Compare against `code` parsed with start rule `start`.
    pub fn code(mut self, code: &'a str, start: Option<&'a str>) -> Self {
        self.code = Some(code);
        self.start = start;
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn msg(mut self, msg: &'a str) -> Self {
        self.msg = msg;
        self
    }
}

impl State {
    /// Require the student focus to be structurally identical to the
    /// solution focus.
    pub fn has_equal_ast(&self) -> Result<Step, CheckError> {
        self.has_equal_ast_with(&EqualAst::default())
    }

    /// Compare the canonical representation of the student focus with the
    /// solution focus or a parsed snippet.
    pub fn has_equal_ast_with(&self, query: &EqualAst<'_>) -> Result<Step, CheckError> {
        let Some(trees) = self.require_ast("has_equal_ast")? else {
            return Ok(Step::Skipped(self.clone()));
        };

        let target = match query.code {
            None => trees.solution.clone(),
            Some(code) => match trees
                .dispatcher
                .parse(code, query.start)
                .map_err(AuthoringError::from)?
            {
                Ok(node) => FieldValue::Node(node),
                Err(reason) => {
                    return Err(AuthoringError::InvalidSnippet {
                        code: code.to_string(),
                        reason,
                    }
                    .into())
                }
            },
        };

        let student_repr = trees.student.repr();
        let target_repr = target.repr();
        let matched = if query.exact {
            student_repr == target_repr
        } else {
            student_repr.contains(&target_repr)
        };
        trace!(exact = query.exact, matched, student = %student_repr, target = %target_repr, "has_equal_ast");

        if matched {
            return Ok(Step::Passed(self.clone()));
        }

        let expected = match query.code {
            Some(code) => code.to_string(),
            None => trees
                .dispatcher
                .extract_text(trees.solution, self.solution_code()),
        };
        let extra = if expected.is_empty() {
            String::new()
        } else {
            format!(" The checker expected to find `{expected}` in there.")
        };
        let ast_path = self.ast_path();
        let message = fill_template(
            query.msg,
            &[("ast_path", ast_path.as_str()), ("extra", extra.as_str())],
        );
        let message = if message.is_empty() {
            MSG_CHECK_FALLBACK.to_string()
        } else {
            message
        };
        Err(self.fail(message))
    }
}
