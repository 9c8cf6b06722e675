#![allow(dead_code)]

use rusqlite::Connection;
use std::collections::BTreeMap;
use threadline_core::db::open_db_in_memory;
use threadline_core::{
    CommentService, Host, HostRef, SqliteCommentRepository, SqliteEventOutbox,
    StaticHostDirectory, StaticIdentityDirectory,
};

pub type Service<'a> = CommentService<
    SqliteCommentRepository<'a>,
    &'a StaticIdentityDirectory,
    &'a StaticHostDirectory,
    SqliteEventOutbox<'a>,
>;

pub struct Fixture {
    pub conn: Connection,
    pub identities: StaticIdentityDirectory,
    pub hosts: StaticHostDirectory,
    pub project: HostRef,
    pub other_project: HostRef,
    pub package: HostRef,
    pub request: HostRef,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_logins(["alice", "bob", "carol", "dave"])
    }

    pub fn with_logins<const N: usize>(logins: [&str; N]) -> Self {
        let mut hosts = StaticHostDirectory::new();
        let project = hosts.insert(
            1,
            Host::Project {
                name: "home:alice".to_string(),
            },
        );
        let other_project = hosts.insert(
            2,
            Host::Project {
                name: "games".to_string(),
            },
        );
        let package = hosts.insert(
            1,
            Host::Package {
                name: "ctris".to_string(),
                project: "games".to_string(),
            },
        );
        let request = hosts.insert(
            1,
            Host::Request {
                number: 1,
                notify_fields: BTreeMap::from([
                    ("state".to_string(), "review".to_string()),
                    ("author".to_string(), "dave".to_string()),
                ]),
            },
        );

        Self {
            conn: open_db_in_memory().unwrap(),
            identities: StaticIdentityDirectory::with_logins(logins),
            hosts,
            project,
            other_project,
            package,
            request,
        }
    }

    pub fn service(&self) -> Service<'_> {
        CommentService::new(
            SqliteCommentRepository::try_new(&self.conn).unwrap(),
            &self.identities,
            &self.hosts,
            SqliteEventOutbox::new(&self.conn),
        )
    }

    pub fn outbox(&self) -> SqliteEventOutbox<'_> {
        SqliteEventOutbox::new(&self.conn)
    }

    pub fn comment_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM comments;", [], |row| row.get(0))
            .unwrap()
    }

    pub fn event_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM comment_events;", [], |row| row.get(0))
            .unwrap()
    }
}
