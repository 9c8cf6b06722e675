//! External directories consulted by the comment service.
//!
//! # Responsibility
//! - Define lookup contracts for identities and host objects.
//! - Provide in-memory implementations for embedding and tests.
//!
//! # Invariants
//! - Directories are read-only from the comment service's point of view.
//! - The placeholder identity is injected, never discovered by convention.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod host;
pub mod identity;

/// Failure reported by an external directory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryError {
    pub directory: &'static str,
    pub message: String,
}

impl DirectoryError {
    pub fn new(directory: &'static str, message: impl Into<String>) -> Self {
        Self {
            directory,
            message: message.into(),
        }
    }
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} directory lookup failed: {}", self.directory, self.message)
    }
}

impl Error for DirectoryError {}
