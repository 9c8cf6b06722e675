//! Involved-party computation for comment notifications.
//!
//! # Invariants
//! - Every author of a comment on the host is included.
//! - Mentions are included only when the identity directory resolves them.
//! - The result is a set; order carries no meaning.

use crate::directory::identity::IdentityDirectory;
use crate::directory::DirectoryError;
use crate::model::comment::{Comment, HostRef};
use crate::repo::comment_repo::CommentRepository;
use crate::search::mention;
use crate::service::comment_service::CommentServiceError;
use std::collections::BTreeSet;

/// Computes the identities to notify about activity on a host.
///
/// Rescans every comment of the host on each call, so edited historical
/// bodies are always reflected.
pub struct InvolvedPartySet<'a, R, I: ?Sized> {
    repo: &'a R,
    identities: &'a I,
}

impl<'a, R: CommentRepository, I: IdentityDirectory + ?Sized> InvolvedPartySet<'a, R, I> {
    pub fn new(repo: &'a R, identities: &'a I) -> Self {
        Self { repo, identities }
    }

    pub fn compute(&self, host: HostRef) -> Result<BTreeSet<String>, CommentServiceError> {
        let comments = self.repo.list_for_host(host)?;
        Ok(collect_involved(&comments, self.identities)?)
    }
}

/// Union of authors and resolvable mentions across `comments`.
pub fn collect_involved<I: IdentityDirectory + ?Sized>(
    comments: &[Comment],
    identities: &I,
) -> Result<BTreeSet<String>, DirectoryError> {
    let mut involved = BTreeSet::new();
    let mut candidates = BTreeSet::new();
    for comment in comments {
        involved.insert(comment.author.clone());
        candidates.extend(mention::scan(&comment.body));
    }

    if !candidates.is_empty() {
        involved.extend(identities.find_by_login(&candidates)?);
    }
    Ok(involved)
}

#[cfg(test)]
mod tests {
    use super::collect_involved;
    use crate::directory::identity::StaticIdentityDirectory;
    use crate::model::comment::{Comment, HostRef};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn comment(author: &str, body: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            host: HostRef::project(1),
            author: author.to_string(),
            body: body.to_string(),
            parent_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn unresolved_mentions_are_dropped() {
        let identities = StaticIdentityDirectory::with_logins(["alice", "bob"]);
        let comments = vec![
            comment("alice", "hi @bob and @ghost"),
            comment("alice", "@bob again"),
        ];

        let involved = collect_involved(&comments, &identities).unwrap();
        assert_eq!(
            involved,
            BTreeSet::from(["alice".to_string(), "bob".to_string()])
        );
    }

    #[test]
    fn no_comments_yield_empty_set() {
        let identities = StaticIdentityDirectory::default();
        assert!(collect_involved(&[], &identities).unwrap().is_empty());
    }
}
