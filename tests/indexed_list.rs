use std::sync::Arc;

use rd_cache::prelude::*;
use rd_cache::test::backend::BackendError;
use rd_cache::test::backend::MockServer;
use rd_cache::test::backend::ProjectWorkflows;

fn by_name(server: &Arc<MockServer>, caching: bool) -> IndexedCachedList<ByName<ProjectWorkflows>> {
    IndexedCachedList::builder()
        .producer(Arc::new(ByName::new(ProjectWorkflows::new(server))))
        .name("workflows")
        .caching(caching)
        .build()
        .unwrap()
}

#[tokio::test]
async fn lookup_counts_as_one_read() {
    let server = MockServer::with_workflows(&["a", "e", "b"]);
    let list = by_name(&server, true);

    let e = list.get_by_key("e").await.unwrap();
    assert_eq!(e.name, "e");
    assert_eq!(server.list_calls(), 1);

    assert_eq!(list.get_by_key("a").await.unwrap().name, "a");
    assert_eq!(list.count().await.unwrap(), 3);
    assert!(list.contains_key("b").await.unwrap());
    assert_eq!(list.keys().await.unwrap(), vec!["a", "e", "b"]);
    assert_eq!(server.list_calls(), 1);
}

#[tokio::test]
async fn missing_key() {
    let server = MockServer::with_workflows(&["a", "e", "b"]);
    let list = by_name(&server, true);

    let err = list.get_by_key("zz").await.unwrap_err();
    assert!(err.is_key_not_found());
    assert!(err.producer_error().is_none());
    assert_eq!(err.to_string(), "[workflows] no item with key 'zz'");

    assert_eq!(list.try_get_by_key("zz").await.unwrap(), None);
    assert!(!list.contains_key("zz").await.unwrap());
    assert_eq!(server.list_calls(), 1);
}

#[tokio::test]
async fn index_follows_snapshot() {
    let server = MockServer::with_workflows(&["a", "e", "b"]);
    let list = by_name(&server, true);
    assert!(list.try_get_by_key("e").await.unwrap().is_some());

    server.remove_workflow("e");
    server.add_workflow("c");

    // Stale until told otherwise.
    assert!(list.try_get_by_key("e").await.unwrap().is_some());
    assert!(list.try_get_by_key("c").await.unwrap().is_none());

    list.invalidate_cache();
    assert!(list.try_get_by_key("e").await.unwrap().is_none());
    assert_eq!(list.get_by_key("c").await.unwrap().name, "c");
    assert_eq!(server.list_calls(), 2);

    server.remove_workflow("c");
    let snapshot = list.refresh().await.unwrap();
    assert!(!snapshot.contains_key("c"));
    assert!(list.try_get_by_key("c").await.unwrap().is_none());
    assert_eq!(server.list_calls(), 3);
}

#[tokio::test]
async fn duplicate_keys_last_wins() {
    let server = MockServer::with_workflows(&["dup", "a"]);
    let later = server.add_workflow("dup");
    let list = by_name(&server, true);

    assert_eq!(list.count().await.unwrap(), 3);
    assert_eq!(list.get_by_key("dup").await.unwrap(), later);
    assert_eq!(list.keys().await.unwrap(), vec!["a", "dup"]);
}

#[tokio::test]
async fn lookup_by_id() {
    let server = MockServer::with_workflows(&["a", "b"]);
    let b = server.remove_workflow("b").unwrap();
    server.add_workflow("b");
    let list = IndexedCachedList::new(ById::new(ProjectWorkflows::new(&server)), true);

    let items = list.items().await.unwrap();
    let current_b = items.as_slice()[1].clone();
    assert_eq!(list.get_by_key(&current_b.guid).await.unwrap().name, "b");

    let err = list.get_by_key(&b.guid).await.unwrap_err();
    assert!(err.is_key_not_found());
    assert_eq!(list.try_get_by_key(&b.guid).await.unwrap(), None);
}

#[tokio::test]
async fn uncached_lookups_fetch_every_time() {
    let server = MockServer::with_workflows(&["a", "b"]);
    let list = by_name(&server, false);

    list.get_by_key("a").await.unwrap();
    list.try_get_by_key("b").await.unwrap();
    assert!(list.get_by_key("c").await.unwrap_err().is_key_not_found());
    assert_eq!(server.list_calls(), 3);
    assert!(!list.is_cached());
}

#[tokio::test]
async fn producer_failure_is_not_key_not_found() {
    let server = MockServer::with_workflows(&["a"]);
    let list = by_name(&server, true);

    server.fail_next(1);
    let err = list.get_by_key("a").await.unwrap_err();
    assert!(!err.is_key_not_found());
    assert_eq!(err.producer_error(), Some(&BackendError::Unavailable));

    server.fail_next(1);
    assert!(list.try_get_by_key("a").await.is_err());

    assert_eq!(list.get_by_key("a").await.unwrap().name, "a");
    assert_eq!(server.list_calls(), 3);
}

#[tokio::test]
async fn iterates_in_order() {
    let server = MockServer::with_workflows(&["z", "y", "x"]);
    let list = by_name(&server, true);
    let names = list.iter().await.unwrap().map(|w| w.name).collect::<Vec<_>>();
    assert_eq!(names, vec!["z", "y", "x"]);
    assert_eq!(list.get(2).await.unwrap().map(|w| w.name), Some("x".to_string()));
    assert!(list.find(|w| w.name == "y").await.unwrap().is_some());
    assert!(!list.is_empty().await.unwrap());

    let first = list.first().await.unwrap().unwrap();
    assert_eq!(first.name, "z");
    assert_eq!(list.position(|w| w.name == "x").await.unwrap(), Some(2));
    assert_eq!(list.position(|w| w.name == "none").await.unwrap(), None);
    assert!(list.contains(&first).await.unwrap());
    assert_eq!(server.list_calls(), 1);
}
