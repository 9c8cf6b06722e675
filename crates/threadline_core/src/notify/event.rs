//! Comment event payloads.

use crate::directory::host::Host;
use crate::model::comment::{Comment, CommentId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Keys owned by the common payload; request fields may not override them.
const RESERVED_REQUEST_KEYS: &[&str] = &["id", "commenter", "comment_body", "commenters", "number"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentForProject {
    pub id: CommentId,
    pub commenter: String,
    pub comment_body: String,
    pub commenters: Vec<String>,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentForPackage {
    pub id: CommentId,
    pub commenter: String,
    pub comment_body: String,
    pub commenters: Vec<String>,
    pub package: String,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentForRequest {
    pub id: CommentId,
    pub commenter: String,
    pub comment_body: String,
    pub commenters: Vec<String>,
    pub number: i64,
    #[serde(flatten)]
    pub request: BTreeMap<String, String>,
}

/// Event emitted for a newly created comment, tagged by host type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommentEvent {
    Project(CommentForProject),
    Package(CommentForPackage),
    Request(CommentForRequest),
}

impl CommentEvent {
    /// Builds the event for `comment` attached to `host`.
    ///
    /// `commenters` is serialized in sorted order.
    pub fn for_comment(comment: &Comment, host: &Host, commenters: &BTreeSet<String>) -> Self {
        let id = comment.id;
        let commenter = comment.author.clone();
        let comment_body = comment.body.clone();
        let commenters: Vec<String> = commenters.iter().cloned().collect();

        match host {
            Host::Project { name } => Self::Project(CommentForProject {
                id,
                commenter,
                comment_body,
                commenters,
                project: name.clone(),
            }),
            Host::Package { name, project } => Self::Package(CommentForPackage {
                id,
                commenter,
                comment_body,
                commenters,
                package: name.clone(),
                project: project.clone(),
            }),
            Host::Request {
                number,
                notify_fields,
            } => Self::Request(CommentForRequest {
                id,
                commenter,
                comment_body,
                commenters,
                number: *number,
                request: notify_fields
                    .iter()
                    .filter(|(key, _)| !RESERVED_REQUEST_KEYS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            }),
        }
    }

    /// Stable event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Project(_) => "CommentForProject",
            Self::Package(_) => "CommentForPackage",
            Self::Request(_) => "CommentForRequest",
        }
    }

    pub fn comment_id(&self) -> CommentId {
        match self {
            Self::Project(event) => event.id,
            Self::Package(event) => event.id,
            Self::Request(event) => event.id,
        }
    }

    pub fn commenter(&self) -> &str {
        match self {
            Self::Project(event) => &event.commenter,
            Self::Package(event) => &event.commenter,
            Self::Request(event) => &event.commenter,
        }
    }

    pub fn commenters(&self) -> &[String] {
        match self {
            Self::Project(event) => &event.commenters,
            Self::Package(event) => &event.commenters,
            Self::Request(event) => &event.commenters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CommentEvent;
    use crate::directory::host::Host;
    use crate::model::comment::{Comment, HostRef};
    use std::collections::{BTreeMap, BTreeSet};
    use uuid::Uuid;

    fn comment(host: HostRef) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            host,
            author: "bob".to_string(),
            body: "looks good @carol".to_string(),
            parent_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn commenters() -> BTreeSet<String> {
        ["carol", "alice", "bob"].into_iter().map(String::from).collect()
    }

    #[test]
    fn package_event_carries_package_and_project() {
        let comment = comment(HostRef::package(3));
        let host = Host::Package {
            name: "ctris".to_string(),
            project: "games".to_string(),
        };

        let event = CommentEvent::for_comment(&comment, &host, &commenters());
        assert_eq!(event.event_type(), "CommentForPackage");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], comment.id.to_string());
        assert_eq!(json["commenter"], "bob");
        assert_eq!(json["comment_body"], "looks good @carol");
        assert_eq!(json["commenters"], serde_json::json!(["alice", "bob", "carol"]));
        assert_eq!(json["package"], "ctris");
        assert_eq!(json["project"], "games");
    }

    #[test]
    fn request_fields_never_override_comment_keys() {
        let comment = comment(HostRef::request(42));
        let mut notify_fields = BTreeMap::new();
        notify_fields.insert("id".to_string(), "request-row-9".to_string());
        notify_fields.insert("state".to_string(), "review".to_string());
        let host = Host::Request {
            number: 42,
            notify_fields,
        };

        let event = CommentEvent::for_comment(&comment, &host, &commenters());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(event.event_type(), "CommentForRequest");
        assert_eq!(json["id"], comment.id.to_string());
        assert_eq!(json["number"], 42);
        assert_eq!(json["state"], "review");
    }
}
