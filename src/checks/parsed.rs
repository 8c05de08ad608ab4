use crate::errors::CheckError;
use crate::state::{Focus, State, Step};

pub const MSG_NOT_PARSED: &str = "AST did not parse";

impl State {
    /// Fail when either side's code did not parse.
    ///
    /// This is the one tree check that runs without the AST guard: it
    /// reports the condition the guard silently skips on.
    pub fn has_parsed_ast(&self) -> Result<Step, CheckError> {
        let failed = [self.student(), self.solution()]
            .into_iter()
            .flatten()
            .any(Focus::is_parse_error);

        if failed {
            return Err(self.fail(MSG_NOT_PARSED));
        }
        Ok(Step::Passed(self.clone()))
    }

    /// Stop the chain with a failure describing this state.
    ///
    /// Meant for inspecting a chain while writing checks: the message holds
    /// `label`, the history and the student focus.
    pub fn debug_break(&self, label: &str) -> CheckError {
        let focus = match self.student() {
            Some(Focus::Tree(value)) => value.repr(),
            Some(Focus::ParseError(err)) => format!("<{err}>"),
            None => "<no tree>".to_string(),
        };
        self.fail(format!(
            "{label}\n\nhistory: {}\nstudent focus: {focus}",
            self.history()
        ))
    }
}
