//! Structural queries and checks for one host's comment tree.
//!
//! # Invariants
//! - A parent must be a comment attached to the same host.
//! - Children are listed by `created_at`, ties broken by insertion order.
//! - The tree lives in the store; nothing here caches nodes.

use crate::model::comment::{
    Comment, CommentField, CommentId, CommentValidationError, HostRef, ValidationRule,
};
use crate::repo::comment_repo::CommentRepository;
use crate::service::comment_service::CommentServiceError;
use crate::service::invariant_violation;
use std::collections::HashSet;

/// One node of a depth-first thread walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadEntry {
    /// Root comments have depth 0.
    pub depth: usize,
    pub comment: Comment,
}

/// Tree view over a comment repository.
pub struct CommentTree<'r, R: CommentRepository> {
    repo: &'r R,
}

impl<'r, R: CommentRepository> CommentTree<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Rejects a parent that is not a comment on `host`.
    ///
    /// Must run before every write of a comment row.
    pub fn validate_parent(
        &self,
        host: HostRef,
        parent_id: Option<CommentId>,
    ) -> Result<(), CommentServiceError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if self.repo.exists_under_host(host, parent_id)? {
            return Ok(());
        }
        Err(CommentValidationError::new(
            CommentField::Parent,
            ValidationRule::BelongsToDifferentHost,
        )
        .into())
    }

    /// Post-write check that a stored comment shares its parent's host.
    pub fn ensure_parent_shares_host(&self, comment: &Comment) -> Result<(), CommentServiceError> {
        let Some(parent_id) = comment.parent_id else {
            return Ok(());
        };
        match self.repo.get_comment(parent_id)? {
            Some(parent) if parent.host == comment.host => Ok(()),
            Some(parent) => Err(invariant_violation(format!(
                "comment {} on {} has parent {} on {}",
                comment.id, comment.host, parent.id, parent.host
            ))),
            None => Err(invariant_violation(format!(
                "comment {} references missing parent {parent_id}",
                comment.id
            ))),
        }
    }

    /// Direct children ordered by creation.
    pub fn children_of(&self, comment_id: CommentId) -> Result<Vec<Comment>, CommentServiceError> {
        Ok(self.repo.list_children(comment_id)?)
    }

    /// Comments without a parent on `host`.
    pub fn roots_of(&self, host: HostRef) -> Result<Vec<Comment>, CommentServiceError> {
        Ok(self.repo.list_roots(host)?)
    }

    /// Depth-first, pre-order walk of every thread on `host`.
    pub fn walk(&self, host: HostRef) -> Result<Vec<ThreadEntry>, CommentServiceError> {
        let mut stack: Vec<ThreadEntry> = self
            .roots_of(host)?
            .into_iter()
            .rev()
            .map(|comment| ThreadEntry { depth: 0, comment })
            .collect();
        let mut visited = HashSet::new();
        let mut entries = Vec::new();

        while let Some(entry) = stack.pop() {
            if !visited.insert(entry.comment.id) {
                return Err(invariant_violation(format!(
                    "comment {} reached twice while walking {host}",
                    entry.comment.id
                )));
            }

            for child in self.children_of(entry.comment.id)?.into_iter().rev() {
                if child.host != host {
                    return Err(invariant_violation(format!(
                        "comment {} on {} is a child of {} on {host}",
                        child.id, child.host, entry.comment.id
                    )));
                }
                stack.push(ThreadEntry {
                    depth: entry.depth + 1,
                    comment: child,
                });
            }
            entries.push(entry);
        }
        Ok(entries)
    }
}
