use crate::ast::FieldValue;
use crate::dispatch::DescribeContext;
use crate::errors::{AuthoringError, CheckError};
use crate::report::MSG_CHECK_FALLBACK;
use crate::state::{Action, State, Step, Trees};
use tracing::warn;

pub const MSG_MISSING_FIELD: &str = "Could not find the {index}{field_name} of the {node_name}.";

/// Minimum similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Parameters of [`State::check_field_with`].
#[derive(Debug, Clone, Copy)]
pub struct FieldQuery<'a> {
    pub name: &'a str,
    /// Entry to take when the field holds a sequence.
    pub index: Option<usize>,
    pub missing_msg: &'a str,
}

impl<'a> FieldQuery<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            index: None,
            missing_msg: MSG_MISSING_FIELD,
        }
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn missing_msg(mut self, msg: &'a str) -> Self {
        self.missing_msg = msg;
        self
    }
}

impl State {
    /// Focus on field `name` (and entry `index` of it) on both sides.
    pub fn check_field(&self, name: &str, index: Option<usize>) -> Result<Step, CheckError> {
        let query = FieldQuery {
            index,
            ..FieldQuery::new(name)
        };
        self.check_field_with(&query)
    }

    /// Focus on a field of the focused node.
    ///
    /// Any lookup failure on the solution side is an authoring error. On the
    /// student side a missing field, a value of the wrong shape, an index out
    /// of range, or a null value where the solution has one all fail with
    /// `missing_msg`.
    pub fn check_field_with(&self, query: &FieldQuery<'_>) -> Result<Step, CheckError> {
        let Some(trees) = self.require_ast("check_field")? else {
            return Ok(Step::Skipped(self.clone()));
        };

        let solution = select_field(trees.solution, query.name, query.index).map_err(|err| {
            warn!(field = query.name, %err, "solution lookup failed");
            CheckError::from(err)
        })?;

        let student = match select_field(trees.student, query.name, query.index) {
            Ok(value) if value.is_null() && !solution.is_null() => {
                return Err(self.fail(missing_message(&trees, query)));
            }
            Ok(value) => value,
            Err(_) => return Err(self.fail(missing_message(&trees, query))),
        };

        let action = Action::SelectField {
            name: query.name.to_string(),
            index: query.index,
        };
        Ok(Step::Focused(self.to_child(student, solution, action)))
    }
}

fn missing_message(trees: &Trees<'_>, query: &FieldQuery<'_>) -> String {
    trees
        .dispatcher
        .describe(
            trees.student.as_node().map(|n| n.as_ref()),
            query.missing_msg,
            &DescribeContext::field(query.name, query.index),
        )
        .unwrap_or_else(|| MSG_CHECK_FALLBACK.to_string())
}

fn select_field(
    focus: &FieldValue,
    name: &str,
    index: Option<usize>,
) -> Result<FieldValue, AuthoringError> {
    let node = focus.as_node().ok_or(AuthoringError::NotANode {
        operation: "check_field",
        shape: focus.shape(),
    })?;

    let value = node
        .get_field(name)
        .ok_or_else(|| AuthoringError::MissingField {
            name: name.to_string(),
            kind: node.kind.clone(),
            suggestion: suggest(name, node.field_names()),
        })?;

    let Some(index) = index else {
        return Ok(value.clone());
    };

    match value {
        FieldValue::Seq(nodes) => nodes.get(index).cloned().map(FieldValue::Node).ok_or(
            AuthoringError::FieldIndexOutOfRange {
                name: name.to_string(),
                index,
                len: nodes.len(),
            },
        ),
        other => Err(AuthoringError::FieldNotIndexable {
            name: name.to_string(),
            shape: other.shape(),
        }),
    }
}

/// Closest existing field name, if any is close enough.
fn suggest<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    candidates
        .map(|c| (c, strsim::normalized_levenshtein(name, c)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c.to_string())
}
