use crate::cache::get_or_compile_regex;
use crate::dispatch::fill_template;
use crate::errors::{AuthoringError, CheckError};
use crate::state::{Focus, State, Step};
use tracing::trace;

pub const MSG_HAS_CODE: &str = "Check the {ast_path}. The checker expected to find {text}.";

/// Parameters of [`State::has_code_with`].
#[derive(Debug, Clone, Copy)]
pub struct CodeQuery<'a> {
    pub text: &'a str,
    pub msg: &'a str,
    /// Match `text` literally instead of as a regular expression.
    pub fixed: bool,
}

impl<'a> CodeQuery<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            msg: MSG_HAS_CODE,
            fixed: false,
        }
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn msg(mut self, msg: &'a str) -> Self {
        self.msg = msg;
        self
    }
}

impl State {
    /// Require `text` in the focused student code.
    pub fn has_code(&self, text: &str, fixed: bool) -> Result<Step, CheckError> {
        self.has_code_with(&CodeQuery::new(text).fixed(fixed))
    }

    /// Search the student code covered by the current focus.
    ///
    /// Only the student side is read, so this runs without the AST guard:
    /// when the student code has no usable tree the whole text is searched.
    pub fn has_code_with(&self, query: &CodeQuery<'_>) -> Result<Step, CheckError> {
        let haystack = match (self.student(), self.dispatcher()) {
            (Some(Focus::Tree(value)), Some(dispatcher)) => {
                dispatcher.extract_text(value, self.student_code())
            }
            _ => self.student_code().to_string(),
        };

        let found = if query.fixed {
            haystack.contains(query.text)
        } else {
            get_or_compile_regex(query.text)
                .map_err(|err| AuthoringError::InvalidPattern {
                    pattern: query.text.to_string(),
                    message: err.to_string(),
                })?
                .is_match(&haystack)
        };
        trace!(pattern = query.text, fixed = query.fixed, found, "has_code");

        if !found {
            let ast_path = self.ast_path();
            let message = fill_template(
                query.msg,
                &[("ast_path", ast_path.as_str()), ("text", query.text)],
            );
            return Err(self.fail(message));
        }

        Ok(Step::Passed(self.clone()))
    }
}
