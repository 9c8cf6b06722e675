mod common;

use common::Fixture;
use threadline_core::{
    CommentField, CommentServiceError, NewComment, ValidationRule, DEFAULT_PLACEHOLDER_LOGIN,
};

#[test]
fn siblings_are_ordered_by_creation() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let root = service
        .create(NewComment::root(fixture.project, "alice", "root"))
        .unwrap();
    let bodies = ["first", "second", "third", "fourth"];
    for body in bodies {
        service
            .create(NewComment::reply(fixture.project, root.id, "bob", body))
            .unwrap();
    }

    let children: Vec<String> = service
        .children_of(root.id)
        .unwrap()
        .into_iter()
        .map(|comment| comment.body)
        .collect();
    assert_eq!(children, bodies);
}

#[test]
fn roots_are_scoped_to_their_host() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let mine = service
        .create(NewComment::root(fixture.project, "alice", "mine"))
        .unwrap();
    service
        .create(NewComment::reply(fixture.project, mine.id, "bob", "reply"))
        .unwrap();
    service
        .create(NewComment::root(fixture.other_project, "bob", "theirs"))
        .unwrap();
    service
        .create(NewComment::root(fixture.package, "carol", "package"))
        .unwrap();

    let roots = service.roots_of(fixture.project).unwrap();
    assert_eq!(roots, vec![mine]);
    assert_eq!(service.roots_of(fixture.other_project).unwrap().len(), 1);
    assert!(service.roots_of(fixture.request).unwrap().is_empty());
}

#[test]
fn walk_is_pre_order_with_depths() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let a = service
        .create(NewComment::root(fixture.project, "alice", "a"))
        .unwrap();
    let b = service
        .create(NewComment::reply(fixture.project, a.id, "bob", "b"))
        .unwrap();
    service
        .create(NewComment::root(fixture.project, "carol", "d"))
        .unwrap();
    service
        .create(NewComment::reply(fixture.project, b.id, "carol", "c"))
        .unwrap();
    service
        .create(NewComment::reply(fixture.project, a.id, "dave", "b2"))
        .unwrap();

    let walked: Vec<(usize, String)> = service
        .thread(fixture.project)
        .unwrap()
        .into_iter()
        .map(|entry| (entry.depth, entry.comment.body))
        .collect();

    assert_eq!(
        walked,
        vec![
            (0, "a".to_string()),
            (1, "b".to_string()),
            (2, "c".to_string()),
            (1, "b2".to_string()),
            (0, "d".to_string()),
        ]
    );
}

#[test]
fn walk_includes_tombstones() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let a = service
        .create(NewComment::root(fixture.project, "alice", "a"))
        .unwrap();
    service
        .create(NewComment::reply(fixture.project, a.id, "bob", "b"))
        .unwrap();
    service.remove(a.id).unwrap();

    let walked = service.thread(fixture.project).unwrap();
    assert_eq!(walked.len(), 2);
    assert_eq!(walked[0].comment.id, a.id);
    assert_eq!(walked[0].comment.author, DEFAULT_PLACEHOLDER_LOGIN);
}

#[test]
fn validate_parent_accepts_only_same_host_parents() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let here = service
        .create(NewComment::root(fixture.project, "alice", "here"))
        .unwrap();
    let there = service
        .create(NewComment::root(fixture.package, "alice", "there"))
        .unwrap();

    let tree = service.tree();
    tree.validate_parent(fixture.project, None).unwrap();
    tree.validate_parent(fixture.project, Some(here.id)).unwrap();

    match tree.validate_parent(fixture.project, Some(there.id)) {
        Err(CommentServiceError::Validation(err)) => {
            assert_eq!(err.field, CommentField::Parent);
            assert_eq!(err.rule, ValidationRule::BelongsToDifferentHost);
            assert_eq!(err.to_string(), "parent belongs to different object");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
