//! Failure reporting.
//!
//! A primitive that finds the submission lacking hands a [`Feedback`] to the
//! state's [`Reporter`] and then returns [`crate::CheckError::Failed`], which
//! stops the chain of checks at the caller's `?`.

use crate::ast::Span;
use std::cell::RefCell;
use std::fmt;

/// Fallback message when no better description is available.
pub const MSG_CHECK_FALLBACK: &str = "Your submission is incorrect. Try again!";

/// A student-facing failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub message: String,
    /// Byte span in the student code the message refers to.
    pub highlight: Option<Span>,
}

impl Feedback {
    pub fn new(message: impl Into<String>, highlight: Option<Span>) -> Self {
        Self {
            message: message.into(),
            highlight,
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Sink for student-facing failures.
pub trait Reporter {
    fn report(&self, feedback: &Feedback);
}

impl<F> Reporter for F
where
    F: Fn(&Feedback),
{
    fn report(&self, feedback: &Feedback) {
        self(feedback)
    }
}

/// Reporter that records every failure it receives.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    entries: RefCell<Vec<Feedback>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Feedback> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn last(&self) -> Option<Feedback> {
        self.entries.borrow().last().cloned()
    }
}

impl Reporter for FeedbackLog {
    fn report(&self, feedback: &Feedback) {
        self.entries.borrow_mut().push(feedback.clone());
    }
}
