//! Comment lifecycle use-case service.
//!
//! # Responsibility
//! - Create comments with validation and exactly one notification event.
//! - Remove comments by hard delete or tombstone, with cascading cleanup.
//! - Edit bodies of live comments.
//!
//! # Invariants
//! - Validation, persistence, involved-party computation and emission of a
//!   create share one unit of work; a failed emission leaves no comment.
//! - Remove decisions and cleanup chains run in one `BEGIN IMMEDIATE` unit,
//!   so child counts cannot go stale between check and delete.
//! - Tombstones are never reactivated or edited.

use crate::directory::host::HostDirectory;
use crate::directory::identity::IdentityDirectory;
use crate::directory::DirectoryError;
use crate::model::comment::{
    validate_body, Comment, CommentField, CommentId, CommentValidationError, HostRef, NewComment,
    ValidationRule,
};
use crate::notify::event::CommentEvent;
use crate::notify::sink::{DispatchError, EventSink};
use crate::repo::comment_repo::{CommentRepository, RepoError};
use crate::service::comment_tree::{CommentTree, ThreadEntry};
use crate::service::invariant_violation;
use crate::service::involved::InvolvedPartySet;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Result of removing one comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Row deleted together with its notifications.
    HardDeleted,
    /// Row kept with placeholder author and body because it has children.
    Tombstoned,
}

/// Errors from comment service operations.
#[derive(Debug)]
pub enum CommentServiceError {
    /// Input failed a field rule.
    Validation(CommentValidationError),
    /// Target comment does not exist.
    NotFound(CommentId),
    /// Event sink refused the creation event; the creation was rolled back.
    Dispatch(DispatchError),
    /// Identity or host directory failed.
    Directory(DirectoryError),
    /// Tombstoned comments cannot be edited.
    TombstoneImmutable(CommentId),
    /// Stored tree breaks a structural invariant.
    InconsistentState(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for CommentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "comment not found: {id}"),
            Self::Dispatch(err) => write!(f, "{err}"),
            Self::Directory(err) => write!(f, "{err}"),
            Self::TombstoneImmutable(id) => write!(f, "deleted comment cannot be edited: {id}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent comment tree: {details}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Dispatch(err) => Some(err),
            Self::Directory(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommentValidationError> for CommentServiceError {
    fn from(value: CommentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CommentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<DispatchError> for CommentServiceError {
    fn from(value: DispatchError) -> Self {
        Self::Dispatch(value)
    }
}

impl From<DirectoryError> for CommentServiceError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

/// Comment lifecycle facade.
pub struct CommentService<R, I, H, S> {
    repo: R,
    identities: I,
    hosts: H,
    sink: S,
}

impl<R, I, H, S> CommentService<R, I, H, S>
where
    R: CommentRepository,
    I: IdentityDirectory,
    H: HostDirectory,
    S: EventSink,
{
    pub fn new(repo: R, identities: I, hosts: H, sink: S) -> Self {
        Self {
            repo,
            identities,
            hosts,
            sink,
        }
    }

    /// Tree view over the same repository.
    pub fn tree(&self) -> CommentTree<'_, R> {
        CommentTree::new(&self.repo)
    }

    /// Involved-party computation over the same repository and directory.
    pub fn involved_party_set(&self) -> InvolvedPartySet<'_, R, I> {
        InvolvedPartySet::new(&self.repo, &self.identities)
    }

    /// Creates a comment and emits its notification event.
    ///
    /// # Errors
    /// - `Validation` for body, author, host or parent rule failures.
    /// - `Dispatch` when the sink refuses the event; nothing is persisted.
    pub fn create(&self, input: NewComment) -> Result<Comment, CommentServiceError> {
        let started_at = Instant::now();
        match self.repo.atomically(|| self.create_in_unit(&input)) {
            Ok((comment, involved)) => {
                info!(
                    "event=comment_create module=service status=ok comment_id={} host={} reply={} involved={} duration_ms={}",
                    comment.id,
                    comment.host,
                    !comment.is_root(),
                    involved,
                    started_at.elapsed().as_millis()
                );
                Ok(comment)
            }
            Err(err) => {
                warn!(
                    "event=comment_create module=service status=error host={} duration_ms={} error={}",
                    input.host,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Replaces the body of a live comment. Emits no event.
    pub fn update_body(
        &self,
        comment_id: CommentId,
        body: impl Into<String>,
    ) -> Result<Comment, CommentServiceError> {
        let body = body.into();
        let updated = self.repo.atomically(|| {
            let mut comment = self
                .repo
                .get_comment(comment_id)?
                .ok_or(CommentServiceError::NotFound(comment_id))?;
            if self.identities.is_placeholder(&comment.author) {
                return Err(CommentServiceError::TombstoneImmutable(comment_id));
            }
            validate_body(&body)?;
            comment.body = body;
            self.write_comment(&comment)
        })?;

        info!(
            "event=comment_update module=service status=ok comment_id={} host={}",
            updated.id, updated.host
        );
        Ok(updated)
    }

    /// Removes a comment: hard delete when childless, tombstone otherwise.
    ///
    /// A hard delete re-checks the parent chain and deletes tombstones that
    /// were only kept for the removed child.
    pub fn remove(&self, comment_id: CommentId) -> Result<RemovalOutcome, CommentServiceError> {
        let started_at = Instant::now();
        let (outcome, cleaned) = self.repo.atomically(|| self.remove_in_unit(comment_id))?;
        info!(
            "event=comment_remove module=service status=ok comment_id={} outcome={:?} cleaned_ancestors={} duration_ms={}",
            comment_id,
            outcome,
            cleaned,
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }

    pub fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>, CommentServiceError> {
        Ok(self.repo.get_comment(comment_id)?)
    }

    pub fn children_of(&self, comment_id: CommentId) -> Result<Vec<Comment>, CommentServiceError> {
        self.tree().children_of(comment_id)
    }

    pub fn roots_of(&self, host: HostRef) -> Result<Vec<Comment>, CommentServiceError> {
        self.tree().roots_of(host)
    }

    /// Whole thread of `host` in depth-first order.
    pub fn thread(&self, host: HostRef) -> Result<Vec<ThreadEntry>, CommentServiceError> {
        self.tree().walk(host)
    }

    pub fn involved_parties(&self, host: HostRef) -> Result<BTreeSet<String>, CommentServiceError> {
        self.involved_party_set().compute(host)
    }

    fn create_in_unit(&self, input: &NewComment) -> Result<(Comment, usize), CommentServiceError> {
        input.validate()?;
        let host = self.hosts.find_host(input.host)?.ok_or_else(|| {
            CommentValidationError::new(CommentField::Host, ValidationRule::NotFound)
        })?;
        if host.host_type() != input.host.host_type {
            return Err(invariant_violation(format!(
                "host directory returned a {} for {}",
                host.host_type(),
                input.host
            )));
        }
        self.ensure_author_known(&input.author)?;

        let tree = self.tree();
        tree.validate_parent(input.host, input.parent_id)?;
        let comment = self.repo.insert_comment(input)?;
        tree.ensure_parent_shares_host(&comment)?;

        let commenters = self.involved_party_set().compute(comment.host)?;
        let event = CommentEvent::for_comment(&comment, &host, &commenters);
        self.sink.emit(&event)?;
        Ok((comment, commenters.len()))
    }

    fn remove_in_unit(
        &self,
        comment_id: CommentId,
    ) -> Result<(RemovalOutcome, usize), CommentServiceError> {
        let comment = self
            .repo
            .get_comment(comment_id)?
            .ok_or(CommentServiceError::NotFound(comment_id))?;

        if self.repo.count_children(comment_id)? > 0 {
            let mut tombstone = comment;
            tombstone.tombstone(self.identities.placeholder_identity());
            self.write_comment(&tombstone)?;
            return Ok((RemovalOutcome::Tombstoned, 0));
        }

        self.repo.hard_delete_comment(comment_id)?;
        let cleaned = self.on_child_removed(&comment)?;
        Ok((RemovalOutcome::HardDeleted, cleaned))
    }

    /// Deletes placeholder-authored ancestors left without children.
    ///
    /// Stops at the first ancestor that has a real author or still has
    /// children. Returns the number of ancestors deleted.
    fn on_child_removed(&self, removed: &Comment) -> Result<usize, CommentServiceError> {
        let mut cleaned = 0;
        let mut cursor = removed.parent_id;

        while let Some(parent_id) = cursor {
            let parent = self.repo.get_comment(parent_id)?.ok_or_else(|| {
                invariant_violation(format!(
                    "removed comment {} referenced missing parent {parent_id}",
                    removed.id
                ))
            })?;
            if parent.host != removed.host {
                return Err(invariant_violation(format!(
                    "comment {} on {} has ancestor {} on {}",
                    removed.id, removed.host, parent.id, parent.host
                )));
            }
            if !self.identities.is_placeholder(&parent.author)
                || self.repo.count_children(parent_id)? > 0
            {
                break;
            }

            let notifications = self.repo.hard_delete_comment(parent_id)?;
            info!(
                "event=comment_cleanup module=service status=ok comment_id={} host={} notifications={}",
                parent_id, parent.host, notifications
            );
            cleaned += 1;
            cursor = parent.parent_id;
        }
        Ok(cleaned)
    }

    /// Writes an existing comment after re-checking its parent link.
    fn write_comment(&self, comment: &Comment) -> Result<Comment, CommentServiceError> {
        let tree = self.tree();
        tree.validate_parent(comment.host, comment.parent_id)?;
        let stored = self.repo.update_comment(comment)?;
        tree.ensure_parent_shares_host(&stored)?;
        Ok(stored)
    }

    fn ensure_author_known(&self, author: &str) -> Result<(), CommentServiceError> {
        if self.identities.is_placeholder(author) {
            return Err(
                CommentValidationError::new(CommentField::Author, ValidationRule::Reserved).into(),
            );
        }

        let asked = BTreeSet::from([author.to_string()]);
        if !self.identities.find_by_login(&asked)?.contains(author) {
            return Err(
                CommentValidationError::new(CommentField::Author, ValidationRule::NotFound).into(),
            );
        }
        Ok(())
    }
}
