//! Repository layer for comment persistence.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for comment rows.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Comment::validate()` before persistence.
//! - Multi-step use cases run inside `CommentRepository::atomically`.

pub mod comment_repo;
