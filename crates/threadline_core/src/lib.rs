//! Core domain logic for Threadline comment threads.
//! This crate is the single source of truth for comment tree invariants.

pub mod config;
pub mod db;
pub mod directory;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{default_log_level, CoreConfig};
pub use directory::host::{Host, HostDirectory, StaticHostDirectory};
pub use directory::identity::{
    IdentityDirectory, StaticIdentityDirectory, DEFAULT_PLACEHOLDER_LOGIN,
};
pub use directory::DirectoryError;
pub use logging::{init_logging, init_logging_from_config, logging_status};
pub use model::comment::{
    Comment, CommentField, CommentId, CommentValidationError, HostId, HostRef, HostType,
    NewComment, ValidationRule, MAX_BODY_CHARS, TOMBSTONE_BODY,
};
pub use notify::event::{CommentEvent, CommentForPackage, CommentForProject, CommentForRequest};
pub use notify::sink::{DispatchError, EventSink, SqliteEventOutbox, StoredEvent};
pub use repo::comment_repo::{CommentRepository, RepoError, RepoResult, SqliteCommentRepository};
pub use search::mention::scan as scan_mentions;
pub use service::comment_service::{CommentService, CommentServiceError, RemovalOutcome};
pub use service::comment_tree::{CommentTree, ThreadEntry};
pub use service::involved::InvolvedPartySet;

/// Minimal health-check API for smoke probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
