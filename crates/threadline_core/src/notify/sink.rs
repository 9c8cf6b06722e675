//! Event sink contract and SQLite outbox implementation.
//!
//! # Invariants
//! - A sink error fails the enclosing comment creation.
//! - `SqliteEventOutbox` writes on the caller's connection, so its rows
//!   commit or roll back together with the comment row.

use crate::directory::identity::DEFAULT_PLACEHOLDER_LOGIN;
use crate::model::comment::CommentId;
use crate::notify::event::CommentEvent;
use log::debug;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Failure to hand an event to the sink.
#[derive(Debug)]
pub enum DispatchError {
    /// The sink refused the event.
    Rejected(String),
    /// Payload could not be encoded.
    Encode(serde_json::Error),
    /// Outbox storage failed.
    Storage(rusqlite::Error),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "event rejected: {message}"),
            Self::Encode(err) => write!(f, "event payload encoding failed: {err}"),
            Self::Storage(err) => write!(f, "event outbox write failed: {err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(_) => None,
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<rusqlite::Error> for DispatchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value)
    }
}

/// Consumer of comment events.
pub trait EventSink {
    fn emit(&self, event: &CommentEvent) -> Result<(), DispatchError>;
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, event: &CommentEvent) -> Result<(), DispatchError> {
        (**self).emit(event)
    }
}

/// One stored outbox row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub comment_id: CommentId,
    /// JSON payload as emitted.
    pub payload: String,
}

/// Outbox sink writing events and per-recipient notifications to SQLite.
///
/// Recipients are the event's commenters other than the commenter and the
/// placeholder identity. The placeholder still appears in the payload.
pub struct SqliteEventOutbox<'conn> {
    conn: &'conn Connection,
    placeholder: String,
}

impl<'conn> SqliteEventOutbox<'conn> {
    /// Outbox skipping [`DEFAULT_PLACEHOLDER_LOGIN`] as a recipient.
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            placeholder: DEFAULT_PLACEHOLDER_LOGIN.to_string(),
        }
    }

    /// Uses `login` as the placeholder identity never notified.
    pub fn with_placeholder(mut self, login: impl Into<String>) -> Self {
        self.placeholder = login.into();
        self
    }

    /// Lists stored events for one comment in emission order.
    pub fn events_for_comment(&self, comment_id: CommentId) -> rusqlite::Result<Vec<StoredEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT event_uuid, event_type, comment_uuid, payload
             FROM comment_events
             WHERE comment_uuid = ?1
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([comment_id.to_string()])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            let event_text: String = row.get("event_uuid")?;
            let comment_text: String = row.get("comment_uuid")?;
            events.push(StoredEvent {
                event_id: parse_uuid_column(&event_text, 0)?,
                event_type: row.get("event_type")?,
                comment_id: parse_uuid_column(&comment_text, 2)?,
                payload: row.get("payload")?,
            });
        }
        Ok(events)
    }

    /// Lists notification recipients materialized for one comment.
    pub fn recipients_for_comment(&self, comment_id: CommentId) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT recipient
             FROM notifications
             WHERE notifiable_uuid = ?1
             ORDER BY recipient ASC;",
        )?;
        let mut rows = stmt.query([comment_id.to_string()])?;
        let mut recipients = Vec::new();
        while let Some(row) = rows.next()? {
            recipients.push(row.get(0)?);
        }
        Ok(recipients)
    }
}

impl EventSink for SqliteEventOutbox<'_> {
    fn emit(&self, event: &CommentEvent) -> Result<(), DispatchError> {
        let event_id = Uuid::new_v4();
        let payload = serde_json::to_string(event)?;
        let comment_id = event.comment_id().to_string();

        self.conn.execute(
            "INSERT INTO comment_events (event_uuid, event_type, comment_uuid, payload)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                event_id.to_string(),
                event.event_type(),
                comment_id,
                payload
            ],
        )?;

        let mut recipients = 0usize;
        for recipient in event
            .commenters()
            .iter()
            .map(String::as_str)
            .filter(|login| *login != event.commenter() && *login != self.placeholder)
        {
            self.conn.execute(
                "INSERT INTO notifications (event_uuid, recipient, notifiable_uuid)
                 VALUES (?1, ?2, ?3);",
                params![event_id.to_string(), recipient, comment_id],
            )?;
            recipients += 1;
        }

        debug!(
            "event=event_emit module=notify status=ok event_type={} comment_id={} recipients={}",
            event.event_type(),
            comment_id,
            recipients
        );
        Ok(())
    }
}

fn parse_uuid_column(value: &str, index: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
    })
}
