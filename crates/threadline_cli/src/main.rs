//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `threadline_core` linkage, schema setup and the comment lifecycle.
//! - Keep output deterministic apart from generated ids.

use std::error::Error;
use std::process::ExitCode;
use threadline_core::db::{open_db, open_db_in_memory};
use threadline_core::{
    init_logging_from_config, CommentService, CoreConfig, Host, NewComment,
    SqliteCommentRepository, SqliteEventOutbox, StaticHostDirectory, StaticIdentityDirectory,
};

fn main() -> ExitCode {
    println!("threadline_core ping={}", threadline_core::ping());
    println!("threadline_core version={}", threadline_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("threadline smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    let logging = init_logging_from_config(&config)?;
    println!("logging enabled={logging}");

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    let identities = StaticIdentityDirectory::with_logins(["alice", "bob", "carol"]);
    let mut hosts = StaticHostDirectory::new();
    let project = hosts.insert(
        1,
        Host::Project {
            name: "smoke".to_string(),
        },
    );

    let service = CommentService::new(
        SqliteCommentRepository::try_new(&conn)?,
        &identities,
        &hosts,
        SqliteEventOutbox::new(&conn),
    );

    let root = service.create(NewComment::root(project, "alice", "Looks good"))?;
    let reply = service.create(NewComment::reply(
        project,
        root.id,
        "bob",
        "@carol please check",
    ))?;
    let involved: Vec<String> = service.involved_parties(project)?.into_iter().collect();
    println!("involved={}", involved.join(","));

    println!("remove root outcome={:?}", service.remove(root.id)?);
    for entry in service.thread(project)? {
        println!(
            "thread depth={} author={} body={}",
            entry.depth, entry.comment.author, entry.comment.body
        );
    }
    println!("remove reply outcome={:?}", service.remove(reply.id)?);
    println!("roots remaining={}", service.roots_of(project)?.len());
    Ok(())
}
