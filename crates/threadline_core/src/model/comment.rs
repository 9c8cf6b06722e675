//! Comment domain model.
//!
//! # Responsibility
//! - Define the canonical comment record and its host reference.
//! - Provide field-attributed validation for writes.
//!
//! # Invariants
//! - `body` never contains NUL and never exceeds [`MAX_BODY_CHARS`].
//! - `host` never changes after creation.
//! - A tombstone carries [`TOMBSTONE_BODY`] and the placeholder author.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable comment identifier.
pub type CommentId = Uuid;

/// Identifier of a host object within its host type.
pub type HostId = i64;

/// Storage limit for comment bodies, counted in characters.
///
/// This mirrors the `TEXT` column size of the upstream schema. Bodies above
/// it are unsupported rather than a domain rule.
pub const MAX_BODY_CHARS: usize = 65_535;

/// Body written into a comment when it is tombstoned.
pub const TOMBSTONE_BODY: &str = "This comment has been deleted";

/// Kind of object a comment thread is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostType {
    Project,
    Package,
    Request,
}

impl HostType {
    /// Stable lowercase name used for storage and wire formats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Package => "package",
            Self::Request => "request",
        }
    }

    /// Parses the stable lowercase name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "project" => Some(Self::Project),
            "package" => Some(Self::Package),
            "request" => Some(Self::Request),
            _ => None,
        }
    }
}

impl Display for HostType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged reference to the host object owning a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostRef {
    pub host_type: HostType,
    pub host_id: HostId,
}

impl HostRef {
    pub fn new(host_type: HostType, host_id: HostId) -> Self {
        Self { host_type, host_id }
    }

    pub fn project(host_id: HostId) -> Self {
        Self::new(HostType::Project, host_id)
    }

    pub fn package(host_id: HostId) -> Self {
        Self::new(HostType::Package, host_id)
    }

    pub fn request(host_id: HostId) -> Self {
        Self::new(HostType::Request, host_id)
    }
}

impl Display for HostRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.host_type, self.host_id)
    }
}

/// Persisted comment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Flattened to `host_type` + `host_id` on the wire.
    #[serde(flatten)]
    pub host: HostRef,
    /// Login of the posting identity, or the placeholder for tombstones.
    pub author: String,
    pub body: String,
    /// `None` for root comments.
    pub parent_id: Option<CommentId>,
    /// Unix epoch milliseconds. Sibling ordering key.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last edit or tombstoning.
    pub updated_at: i64,
}

impl Comment {
    /// Returns whether this comment has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns whether this comment is authored by `placeholder`.
    pub fn is_authored_by(&self, placeholder: &str) -> bool {
        self.author == placeholder
    }

    /// Replaces author and body with tombstone values.
    pub fn tombstone(&mut self, placeholder: impl Into<String>) {
        self.author = placeholder.into();
        self.body = TOMBSTONE_BODY.to_string();
    }

    /// Validates fields persisted by write paths.
    pub fn validate(&self) -> Result<(), CommentValidationError> {
        validate_author(&self.author)?;
        validate_body(&self.body)
    }
}

impl Display for Comment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.body)
    }
}

/// Input for creating a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    #[serde(flatten)]
    pub host: HostRef,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    /// Builds a root comment input.
    pub fn root(host: HostRef, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            host,
            author: author.into(),
            body: body.into(),
            parent_id: None,
        }
    }

    /// Builds a reply input under `parent_id`.
    pub fn reply(
        host: HostRef,
        parent_id: CommentId,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::root(host, author, body)
        }
    }

    /// Validates the self-contained fields. Host, author existence and
    /// parent checks need collaborators and happen in the service.
    pub fn validate(&self) -> Result<(), CommentValidationError> {
        validate_body(&self.body)?;
        validate_author(&self.author)
    }
}

/// Field a validation failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentField {
    Body,
    Host,
    Author,
    Parent,
}

impl Display for CommentField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Body => "body",
            Self::Host => "host",
            Self::Author => "author",
            Self::Parent => "parent",
        })
    }
}

/// Rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum ValidationRule {
    /// Missing, empty or whitespace-only.
    Blank,
    TooLong { max: usize, actual: usize },
    ContainsNul,
    /// Referenced host or identity does not exist.
    NotFound,
    /// Identity is reserved for tombstones.
    Reserved,
    /// Parent comment is not attached to the same host.
    BelongsToDifferentHost,
}

/// Field-attributed validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentValidationError {
    pub field: CommentField,
    #[serde(flatten)]
    pub rule: ValidationRule,
}

impl CommentValidationError {
    pub fn new(field: CommentField, rule: ValidationRule) -> Self {
        Self { field, rule }
    }
}

impl Display for CommentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.rule {
            ValidationRule::Blank => write!(f, "{} can't be blank", self.field),
            ValidationRule::TooLong { max, actual } => write!(
                f,
                "{} is too long ({actual} characters, maximum is {max})",
                self.field
            ),
            ValidationRule::ContainsNul => {
                write!(f, "{} must not contain null characters", self.field)
            }
            ValidationRule::NotFound => write!(f, "{} does not exist", self.field),
            ValidationRule::Reserved => write!(f, "{} is reserved", self.field),
            ValidationRule::BelongsToDifferentHost => {
                write!(f, "{} belongs to different object", self.field)
            }
        }
    }
}

impl Error for CommentValidationError {}

/// Validates a comment body against presence, NUL and length rules.
pub fn validate_body(body: &str) -> Result<(), CommentValidationError> {
    if body.contains('\0') {
        return Err(CommentValidationError::new(
            CommentField::Body,
            ValidationRule::ContainsNul,
        ));
    }
    if body.trim().is_empty() {
        return Err(CommentValidationError::new(
            CommentField::Body,
            ValidationRule::Blank,
        ));
    }

    let actual = body.chars().count();
    if actual > MAX_BODY_CHARS {
        return Err(CommentValidationError::new(
            CommentField::Body,
            ValidationRule::TooLong {
                max: MAX_BODY_CHARS,
                actual,
            },
        ));
    }
    Ok(())
}

/// Validates that an author login is present.
pub fn validate_author(author: &str) -> Result<(), CommentValidationError> {
    if author.trim().is_empty() {
        return Err(CommentValidationError::new(
            CommentField::Author,
            ValidationRule::Blank,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_is_reported_before_blank() {
        let err = validate_body("\0").unwrap_err();
        assert_eq!(err.rule, ValidationRule::ContainsNul);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let body = "é".repeat(MAX_BODY_CHARS);
        assert!(body.len() > MAX_BODY_CHARS);
        assert!(validate_body(&body).is_ok());
    }

    #[test]
    fn tombstone_replaces_author_and_body_only() {
        let mut comment = Comment {
            id: Uuid::new_v4(),
            host: HostRef::project(1),
            author: "alice".to_string(),
            body: "hello".to_string(),
            parent_id: None,
            created_at: 1,
            updated_at: 1,
        };
        let id = comment.id;

        comment.tombstone("_nobody_");
        assert_eq!(comment.id, id);
        assert_eq!(comment.body, TOMBSTONE_BODY);
        assert!(comment.is_authored_by("_nobody_"));
        assert_eq!(comment.to_string(), TOMBSTONE_BODY);
    }

    #[test]
    fn validation_error_message_names_field() {
        let err = CommentValidationError::new(
            CommentField::Parent,
            ValidationRule::BelongsToDifferentHost,
        );
        assert_eq!(err.to_string(), "parent belongs to different object");
    }
}
