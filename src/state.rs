//! Immutable navigation state.
//!
//! A [`State`] holds the current focus on the student and the solution side,
//! both source texts and the [`History`] of narrowing steps taken to reach
//! the focus. Primitives never mutate a state: they return it unchanged or
//! build exactly one child. The history is a persistent vector, so children
//! share their ancestors' actions and many chains may branch from one state.

use crate::ast::{AstNode, FieldValue, Span};
use crate::dispatch::{DescribeContext, Dispatcher, ParseError, ParseResult};
use crate::errors::{AuthoringError, CheckError};
use crate::report::{Feedback, Reporter};
use rpds::Vector;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use tracing::debug;

/// What one side of a state points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Tree(FieldValue),
    ParseError(ParseError),
}

impl Focus {
    pub fn tree(&self) -> Option<&FieldValue> {
        match self {
            Focus::Tree(value) => Some(value),
            Focus::ParseError(_) => None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Focus::ParseError(_))
    }
}

impl From<ParseResult> for Focus {
    fn from(result: ParseResult) -> Self {
        match result {
            Ok(node) => Focus::Tree(FieldValue::Node(node)),
            Err(err) => Focus::ParseError(err),
        }
    }
}

/// One narrowing step.
#[derive(Debug, Clone)]
pub enum Action {
    SelectNode {
        name: String,
        index: usize,
        priority: Option<u32>,
        /// The student node the step landed on.
        node: Rc<AstNode>,
    },
    SelectField {
        name: String,
        index: Option<usize>,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SelectNode { name, index, .. } => write!(f, "check_node('{name}', {index})"),
            Action::SelectField {
                name,
                index: Some(index),
            } => write!(f, "check_field('{name}', {index})"),
            Action::SelectField { name, index: None } => write!(f, "check_field('{name}')"),
        }
    }
}

/// Append-only log of the actions that led to a focus.
#[derive(Debug, Clone, Default)]
pub struct History {
    actions: Vector<Action>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new history with `action` appended; `self` is left untouched.
    pub fn push(&self, action: Action) -> History {
        History {
            actions: self.actions.push_back(action),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn last(&self) -> Option<&Action> {
        self.actions.last()
    }

    /// Walk the recorded actions again from `root`.
    ///
    /// Returns `None` when a step no longer resolves, which can only happen
    /// when `root` is not the tree the history was recorded on.
    pub fn replay(&self, root: &FieldValue, dispatcher: &dyn Dispatcher) -> Option<FieldValue> {
        let mut current = root.clone();
        for action in self.iter() {
            current = match action {
                Action::SelectNode {
                    name,
                    index,
                    priority,
                    ..
                } => FieldValue::Node(
                    dispatcher
                        .select(name, &current, *priority)
                        .get(*index)
                        .cloned()?,
                ),
                Action::SelectField { name, index } => {
                    let value = current.as_node()?.get_field(name)?.clone();
                    match index {
                        None => value,
                        Some(i) => match value {
                            FieldValue::Seq(nodes) => FieldValue::Node(nodes.get(*i).cloned()?),
                            _ => return None,
                        },
                    }
                }
            };
        }
        Some(current)
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(root)");
        }
        for (i, action) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

struct Context {
    dispatcher: Option<Rc<dyn Dispatcher>>,
    reporter: Rc<dyn Reporter>,
}

/// The unit of focus threaded through the check primitives.
#[derive(Clone)]
pub struct State {
    student: Option<Focus>,
    solution: Option<Focus>,
    student_code: Rc<str>,
    solution_code: Rc<str>,
    history: History,
    ctx: Rc<Context>,
}

/// Both trees of a state that passed the AST guard.
pub(crate) struct Trees<'s> {
    pub student: &'s FieldValue,
    pub solution: &'s FieldValue,
    pub dispatcher: &'s dyn Dispatcher,
}

impl State {
    /// Root state: parses both texts with `dispatcher`.
    ///
    /// Code that does not parse is not an error here; the state then carries
    /// a parse error marker on that side.
    pub fn new(
        student_code: &str,
        solution_code: &str,
        dispatcher: Rc<dyn Dispatcher>,
        reporter: Rc<dyn Reporter>,
    ) -> Result<State, AuthoringError> {
        let student = dispatcher.parse(student_code, None)?;
        let solution = dispatcher.parse(solution_code, None)?;
        debug!(
            student_parsed = student.is_ok(),
            solution_parsed = solution.is_ok(),
            "root state"
        );
        Ok(State {
            student: Some(student.into()),
            solution: Some(solution.into()),
            student_code: student_code.into(),
            solution_code: solution_code.into(),
            history: History::new(),
            ctx: Rc::new(Context {
                dispatcher: Some(dispatcher),
                reporter,
            }),
        })
    }

    /// Root state without any parser; only text checks can run on it.
    pub fn without_parser(
        student_code: &str,
        solution_code: &str,
        reporter: Rc<dyn Reporter>,
    ) -> State {
        State {
            student: None,
            solution: None,
            student_code: student_code.into(),
            solution_code: solution_code.into(),
            history: History::new(),
            ctx: Rc::new(Context {
                dispatcher: None,
                reporter,
            }),
        }
    }

    pub fn student(&self) -> Option<&Focus> {
        self.student.as_ref()
    }

    pub fn solution(&self) -> Option<&Focus> {
        self.solution.as_ref()
    }

    pub fn student_code(&self) -> &str {
        &self.student_code
    }

    pub fn solution_code(&self) -> &str {
        &self.solution_code
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn dispatcher(&self) -> Option<&dyn Dispatcher> {
        self.ctx.dispatcher.as_deref()
    }

    /// Child state focused on the given values, with `action` recorded.
    pub(crate) fn to_child(&self, student: FieldValue, solution: FieldValue, action: Action) -> State {
        debug!(depth = self.history.len() + 1, %action, "focus");
        State {
            student: Some(Focus::Tree(student)),
            solution: Some(Focus::Tree(solution)),
            student_code: Rc::clone(&self.student_code),
            solution_code: Rc::clone(&self.solution_code),
            history: self.history.push(action),
            ctx: Rc::clone(&self.ctx),
        }
    }

    /// Guard for primitives that walk the trees.
    ///
    /// Errors when either side has no tree at all. Returns `Ok(None)` when
    /// either side failed to parse: the primitive is then skipped, since the
    /// parse failure is reported by `has_parsed_ast` rather than by every
    /// check downstream of it.
    pub(crate) fn require_ast(&self, operation: &'static str) -> Result<Option<Trees<'_>>, CheckError> {
        let (Some(student), Some(solution), Some(dispatcher)) =
            (&self.student, &self.solution, self.dispatcher())
        else {
            tracing::warn!(operation, "no syntax tree available");
            return Err(AuthoringError::NoTree.into());
        };

        match (student, solution) {
            (Focus::Tree(student), Focus::Tree(solution)) => Ok(Some(Trees {
                student,
                solution,
                dispatcher,
            })),
            _ => {
                debug!(operation, "skipped: code did not parse");
                Ok(None)
            }
        }
    }

    /// Report `message` and produce the error that ends the chain.
    pub(crate) fn fail(&self, message: impl Into<String>) -> CheckError {
        let feedback = Feedback::new(message, self.highlight());
        debug!(message = %feedback.message, history = %self.history, "check failed");
        self.ctx.reporter.report(&feedback);
        CheckError::Failed(feedback)
    }

    /// Human readable description of the current focus, e.g. "first SELECT
    /// statement" or "from clause of the SELECT statement".
    pub fn ast_path(&self) -> String {
        const FALLBACK: &str = "code";
        let Some(dispatcher) = self.dispatcher() else {
            return FALLBACK.to_string();
        };

        let mut actions = self.history.iter().rev();
        let described = match actions.next() {
            Some(Action::SelectNode { index, node, .. }) => dispatcher.describe(
                Some(node),
                "{index}{node_name}",
                &DescribeContext::index(Some(*index)),
            ),
            Some(Action::SelectField { name, index }) => {
                let parent = actions.find_map(|action| match action {
                    Action::SelectNode { node, .. } => Some(node),
                    Action::SelectField { .. } => None,
                });
                dispatcher.describe(
                    parent.map(Rc::as_ref),
                    "{index}{field_name} of the {node_name}",
                    &DescribeContext::field(name, *index),
                )
            }
            None => {
                let root = self
                    .student
                    .as_ref()
                    .and_then(Focus::tree)
                    .and_then(FieldValue::as_node);
                dispatcher.describe(root.map(Rc::as_ref), "{node_name}", &DescribeContext::default())
            }
        };

        described.unwrap_or_else(|| FALLBACK.to_string())
    }

    /// Span of the student code the current focus covers, or of the first
    /// syntax error when the student code did not parse.
    pub fn highlight(&self) -> Option<Span> {
        let focus = match &self.student {
            Some(Focus::Tree(value)) => value.span(),
            Some(Focus::ParseError(err)) => err.span,
            None => None,
        };
        focus.or_else(|| {
            self.history.iter().rev().find_map(|action| match action {
                Action::SelectNode { node, .. } => Some(node.span),
                Action::SelectField { .. } => None,
            })
        })
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("student", &self.student)
            .field("solution", &self.solution)
            .field("history", &self.history.to_string())
            .finish_non_exhaustive()
    }
}

/// Successful outcome of a primitive.
///
/// Every variant carries a state and dereferences to it, so primitives chain
/// directly: `state.check_node("SelectStmt", 0)?.check_field("from_clause", None)?`.
#[derive(Debug, Clone)]
pub enum Step {
    /// A narrowing primitive produced a child state.
    Focused(State),
    /// A test primitive passed; the state is the input state.
    Passed(State),
    /// The primitive did not run because code failed to parse; the state is
    /// the input state.
    Skipped(State),
}

impl Step {
    pub fn state(&self) -> &State {
        match self {
            Step::Focused(s) | Step::Passed(s) | Step::Skipped(s) => s,
        }
    }

    pub fn into_state(self) -> State {
        match self {
            Step::Focused(s) | Step::Passed(s) | Step::Skipped(s) => s,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Step::Skipped(_))
    }
}

impl Deref for Step {
    type Target = State;

    fn deref(&self) -> &State {
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FeedbackLog;

    fn node(kind: &str) -> Rc<AstNode> {
        Rc::new(AstNode::new(kind, 0..1))
    }

    #[test]
    fn history_push_does_not_touch_parent() {
        let root = History::new();
        let one = root.push(Action::SelectField {
            name: "a".into(),
            index: None,
        });
        let two_a = one.push(Action::SelectField {
            name: "b".into(),
            index: Some(0),
        });
        let two_b = one.push(Action::SelectNode {
            name: "C".into(),
            index: 1,
            priority: None,
            node: node("C"),
        });

        assert_eq!(root.len(), 0);
        assert_eq!(one.len(), 1);
        assert_eq!(two_a.len(), 2);
        assert_eq!(two_a.to_string(), "check_field('a') -> check_field('b', 0)");
        assert_eq!(two_b.to_string(), "check_field('a') -> check_node('C', 1)");
    }

    #[test]
    fn no_parser_means_no_tree() {
        let state = State::without_parser("a", "b", Rc::new(FeedbackLog::new()));
        let err = state.require_ast("check_node").err().unwrap();
        assert!(matches!(err, CheckError::Authoring(AuthoringError::NoTree)));
        assert_eq!(state.ast_path(), "code");
        assert_eq!(state.highlight(), None);
    }

    #[test]
    fn fail_reports_once() {
        let log = Rc::new(FeedbackLog::new());
        let state = State::without_parser("a", "b", log.clone());
        let err = state.fail("nope");
        assert!(err.is_failure());
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().message, "nope");
    }
}
