//! Comment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete and adjacency queries over `comments`.
//! - Provide the transaction boundary used by service operations.
//!
//! # Invariants
//! - Sibling listing is deterministic: `created_at ASC, seq ASC`.
//! - Hard deletes remove the comment's notification rows in the same write.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::comment::{
    Comment, CommentId, CommentValidationError, HostRef, HostType, NewComment,
};
use log::warn;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const COMMENT_SELECT_SQL: &str = "SELECT
    uuid,
    host_type,
    host_id,
    author,
    body,
    parent_uuid,
    created_at,
    updated_at
FROM comments";

/// Savepoint scoping a unit of work inside a caller-owned transaction.
const UNIT_SAVEPOINT: &str = "threadline_unit";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for comment persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(CommentValidationError),
    Db(DbError),
    NotFound(CommentId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "comment not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "comment repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "comment repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted comment data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommentValidationError> for RepoError {
    fn from(value: CommentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for comment rows.
pub trait CommentRepository {
    /// Runs `work` as one atomic unit; any `Err` rolls every write back.
    ///
    /// Inside a caller-owned transaction the unit is a savepoint, so a failed
    /// unit is undone without aborting the caller's other writes.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>;
    /// Inserts a new comment with a fresh id and returns the stored row.
    fn insert_comment(&self, input: &NewComment) -> RepoResult<Comment>;
    /// Overwrites author, body and parent of an existing comment.
    fn update_comment(&self, comment: &Comment) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Returns whether `id` names a comment attached to `host`.
    fn exists_under_host(&self, host: HostRef, id: CommentId) -> RepoResult<bool>;
    /// Lists direct children ordered by creation.
    fn list_children(&self, parent_id: CommentId) -> RepoResult<Vec<Comment>>;
    fn count_children(&self, parent_id: CommentId) -> RepoResult<usize>;
    /// Lists root comments of a host ordered by creation.
    fn list_roots(&self, host: HostRef) -> RepoResult<Vec<Comment>>;
    /// Lists every comment of a host ordered by creation.
    fn list_for_host(&self, host: HostRef) -> RepoResult<Vec<Comment>>;
    /// Deletes one comment and its notification rows.
    ///
    /// Returns the number of notification rows removed.
    fn hard_delete_comment(&self, id: CommentId) -> RepoResult<usize>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_comment_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn load_required(&self, id: CommentId) -> RepoResult<Comment> {
        self.get_comment(id)?.ok_or(RepoError::NotFound(id))
    }

    fn within_savepoint<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        self.conn
            .execute_batch(&format!("SAVEPOINT {UNIT_SAVEPOINT};"))
            .map_err(RepoError::from)?;

        match work() {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE {UNIT_SAVEPOINT};"))
                    .map_err(RepoError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO {UNIT_SAVEPOINT}; RELEASE {UNIT_SAVEPOINT};"
                )) {
                    warn!(
                        "event=unit_rollback module=repo status=error savepoint={UNIT_SAVEPOINT} error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }

    fn query_comments(&self, sql: &str, bind: &[&dyn rusqlite::ToSql]) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        if !self.conn.is_autocommit() {
            // Caller owns the transaction: scope this unit with a savepoint.
            return self.within_savepoint(work);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = work()?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }

    fn insert_comment(&self, input: &NewComment) -> RepoResult<Comment> {
        input.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO comments (
                uuid,
                host_type,
                host_id,
                author,
                body,
                parent_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                input.host.host_type.as_str(),
                input.host.host_id,
                input.author.as_str(),
                input.body.as_str(),
                input.parent_id.map(|value| value.to_string()),
            ],
        )?;
        self.load_required(id)
    }

    fn update_comment(&self, comment: &Comment) -> RepoResult<Comment> {
        comment.validate()?;

        let changed = self.conn.execute(
            "UPDATE comments
             SET
                author = ?2,
                body = ?3,
                parent_uuid = ?4,
                updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
             WHERE uuid = ?1;",
            params![
                comment.id.to_string(),
                comment.author.as_str(),
                comment.body.as_str(),
                comment.parent_id.map(|value| value.to_string()),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(comment.id));
        }
        self.load_required(comment.id)
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn exists_under_host(&self, host: HostRef, id: CommentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM comments
                WHERE uuid = ?1
                  AND host_type = ?2
                  AND host_id = ?3
            );",
            params![id.to_string(), host.host_type.as_str(), host.host_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_children(&self, parent_id: CommentId) -> RepoResult<Vec<Comment>> {
        self.query_comments(
            &format!(
                "{COMMENT_SELECT_SQL}
                 WHERE parent_uuid = ?1
                 ORDER BY created_at ASC, seq ASC;"
            ),
            &[&parent_id.to_string()],
        )
    }

    fn count_children(&self, parent_id: CommentId) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE parent_uuid = ?1;",
            [parent_id.to_string()],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative child count `{count}`")))
    }

    fn list_roots(&self, host: HostRef) -> RepoResult<Vec<Comment>> {
        self.query_comments(
            &format!(
                "{COMMENT_SELECT_SQL}
                 WHERE host_type = ?1
                   AND host_id = ?2
                   AND parent_uuid IS NULL
                 ORDER BY created_at ASC, seq ASC;"
            ),
            &[&host.host_type.as_str(), &host.host_id],
        )
    }

    fn list_for_host(&self, host: HostRef) -> RepoResult<Vec<Comment>> {
        self.query_comments(
            &format!(
                "{COMMENT_SELECT_SQL}
                 WHERE host_type = ?1
                   AND host_id = ?2
                 ORDER BY created_at ASC, seq ASC;"
            ),
            &[&host.host_type.as_str(), &host.host_id],
        )
    }

    fn hard_delete_comment(&self, id: CommentId) -> RepoResult<usize> {
        let notifications = self.conn.execute(
            "DELETE FROM notifications WHERE notifiable_uuid = ?1;",
            [id.to_string()],
        )?;
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(notifications)
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let id = parse_uuid(&row.get::<_, String>("uuid")?, "comments.uuid")?;
    let parent_id = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "comments.parent_uuid"))
        .transpose()?;

    let host_type_text: String = row.get("host_type")?;
    let host_type = HostType::parse(&host_type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid host type `{host_type_text}` in comments.host_type"
        ))
    })?;

    let comment = Comment {
        id,
        host: HostRef::new(host_type, row.get("host_id")?),
        author: row.get("author")?,
        body: row.get("body")?,
        parent_id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    comment
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("comment {id}: {err}")))?;
    Ok(comment)
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_comment_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["comments", "notifications"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
