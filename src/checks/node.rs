use crate::ast::FieldValue;
use crate::dispatch::DescribeContext;
use crate::errors::{AuthoringError, CheckError};
use crate::report::MSG_CHECK_FALLBACK;
use crate::state::{Action, State, Step};
use tracing::warn;

pub const MSG_MISSING_NODE: &str = "Could not find the {index}{node_name}.";

/// Parameters of [`State::check_node_with`].
#[derive(Debug, Clone, Copy)]
pub struct NodeQuery<'a> {
    pub name: &'a str,
    pub index: usize,
    pub missing_msg: &'a str,
    /// Search depth bound; see [`crate::dispatch::Dispatcher::select`].
    pub priority: Option<u32>,
}

impl<'a> NodeQuery<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            index: 0,
            missing_msg: MSG_MISSING_NODE,
            priority: None,
        }
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn missing_msg(mut self, msg: &'a str) -> Self {
        self.missing_msg = msg;
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl State {
    /// Focus on the `index`-th node of kind `name` on both sides.
    pub fn check_node(&self, name: &str, index: usize) -> Result<Step, CheckError> {
        self.check_node_with(&NodeQuery::new(name).index(index))
    }

    /// Focus on a node selected by kind and position among same-kind nodes.
    ///
    /// A solution without that node is an authoring error; a student
    /// submission without it fails with `missing_msg`.
    pub fn check_node_with(&self, query: &NodeQuery<'_>) -> Result<Step, CheckError> {
        let Some(trees) = self.require_ast("check_node")? else {
            return Ok(Step::Skipped(self.clone()));
        };

        let solution_nodes = trees
            .dispatcher
            .select(query.name, trees.solution, query.priority);
        let Some(solution) = solution_nodes.get(query.index).cloned() else {
            warn!(name = query.name, index = query.index, "solution has no such node");
            return Err(AuthoringError::NodeIndexOutOfRange {
                name: query.name.to_string(),
                index: query.index,
                found: solution_nodes.len(),
            }
            .into());
        };

        let student_nodes = trees
            .dispatcher
            .select(query.name, trees.student, query.priority);
        let Some(student) = student_nodes.get(query.index).cloned() else {
            let message = trees
                .dispatcher
                .describe(
                    Some(&solution),
                    query.missing_msg,
                    &DescribeContext::index(Some(query.index)),
                )
                .unwrap_or_else(|| MSG_CHECK_FALLBACK.to_string());
            return Err(self.fail(message));
        };

        let action = Action::SelectNode {
            name: query.name.to_string(),
            index: query.index,
            priority: query.priority,
            node: student.clone(),
        };
        Ok(Step::Focused(self.to_child(
            FieldValue::Node(student),
            FieldValue::Node(solution),
            action,
        )))
    }
}
