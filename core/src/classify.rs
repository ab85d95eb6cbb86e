//! Per-operation classification of remote failures.
//!
//! The backend accepts writes but never keeps them, so for Update and Delete
//! any answer that proves the request reached the server (404 or 500) is
//! treated as if the mutation happened. Load and Create have no local value
//! to fall back to and fail outright. A Load with no response at all may be
//! retried because GET is idempotent.

use crate::error::{ApiError, ErrorKind};

/// The controller operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// What the controller should do with a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Issue the same request again, if attempts remain.
    Retry,
    /// Apply the local mutation as if the call had succeeded.
    SimulateSuccess,
    /// Abandon the operation and report `ApiError::user_message`.
    Fail,
}

pub fn classify(operation: Operation, error: &ApiError) -> Disposition {
    match (operation, error.kind()) {
        (Operation::Load, ErrorKind::Transport) => Disposition::Retry,
        (Operation::Update | Operation::Delete, ErrorKind::NotFound | ErrorKind::Server) => {
            Disposition::SimulateSuccess
        }
        _ => Disposition::Fail,
    }
}
