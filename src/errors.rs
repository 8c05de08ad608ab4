use crate::dispatch::{DispatchError, ParseError};
use crate::report::Feedback;
use thiserror::Error;

/// Outcome of a primitive that did not produce a state.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The submission did not pass. The feedback has already been handed to
    /// the state's reporter.
    #[error("{0}")]
    Failed(Feedback),

    /// The check itself is malformed relative to the solution.
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
}

impl CheckError {
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckError::Failed(_))
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        match self {
            CheckError::Failed(feedback) => Some(feedback),
            CheckError::Authoring(_) => None,
        }
    }

    pub fn authoring(&self) -> Option<&AuthoringError> {
        match self {
            CheckError::Authoring(err) => Some(err),
            CheckError::Failed(_) => None,
        }
    }
}

/// Fatal errors in the checks, independent of the submission.
#[derive(Error, Debug)]
pub enum AuthoringError {
    #[error("trying to use the syntax tree, but none is available; is a parser configured?")]
    NoTree,

    #[error("can't get {name} node at index {index}: the solution has {found}")]
    NodeIndexOutOfRange {
        name: String,
        index: usize,
        found: usize,
    },

    #[error("can't get field '{name}' of the solution's {kind}{}", suggestion_suffix(.suggestion))]
    MissingField {
        name: String,
        kind: String,
        suggestion: Option<String>,
    },

    #[error("can't get entry {index} of field '{name}': the solution has {len}")]
    FieldIndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    #[error("field '{name}' of the solution holds a {shape}, which can't be indexed")]
    FieldNotIndexable { name: String, shape: &'static str },

    #[error("{operation} needs a node in focus, but the solution focus is a {shape}")]
    NotANode {
        operation: &'static str,
        shape: &'static str,
    },

    #[error("invalid search pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("comparison snippet `{code}` does not parse: {reason}")]
    InvalidSnippet { code: String, reason: ParseError },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}
