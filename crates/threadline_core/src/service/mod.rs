//! Comment thread use-case services.
//!
//! # Responsibility
//! - Enforce tree invariants above the repository layer.
//! - Compute involved parties and orchestrate create/remove lifecycles.
//!
//! # Invariants
//! - Every mutating use case runs inside one repository unit of work.
//! - Detected invariant violations surface as errors and are logged.

use log::error;

pub mod comment_service;
pub mod comment_tree;
pub mod involved;

use comment_service::CommentServiceError;

/// Logs and wraps a broken structural invariant.
pub(crate) fn invariant_violation(message: String) -> CommentServiceError {
    error!("event=invariant_violation module=service status=error detail={message}");
    CommentServiceError::InconsistentState(message)
}
