//! Domain model for threaded comments.
//!
//! # Responsibility
//! - Define the comment record and its polymorphic host reference.
//! - Own body/author validation rules shared by repository and service.
//!
//! # Invariants
//! - Every comment is identified by a stable `CommentId`.
//! - A tombstone keeps its row and id; only author and body are replaced.

pub mod comment;
