//! History persistence against a real SQLite file.

use bettersearch::db::Store;
use bettersearch::domain::EngineId;
use bettersearch::models::{EngineCatalog, HistoryEntry};
use bettersearch::services::{
    HistoryScope, HistoryStore, RetentionPolicy, SeaOrmHistoryStore, observe,
};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

async fn temp_store() -> (SeaOrmHistoryStore, PathBuf) {
    let db_path =
        std::env::temp_dir().join(format!("bettersearch-history-test-{}.db", uuid::Uuid::new_v4()));
    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open database");
    (SeaOrmHistoryStore::new(store), db_path)
}

fn cleanup(path: &PathBuf) {
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn resubmitting_keeps_one_entry_with_latest_time() {
    let (history, path) = temp_store().await;
    let ddg = EngineId::from_index(0);

    history
        .insert_or_replace(HistoryEntry::new(ddg, "rust", 100))
        .await
        .unwrap();
    history
        .insert_or_replace(HistoryEntry::new(ddg, "rust", 200))
        .await
        .unwrap();

    assert_eq!(history.count().await.unwrap(), 1);
    assert_eq!(
        history.list_all().await.unwrap(),
        vec![HistoryEntry::new(ddg, "rust", 200)]
    );

    cleanup(&path);
}

#[tokio::test]
async fn same_query_on_two_engines_is_two_entries() {
    let (history, path) = temp_store().await;
    let ddg = EngineId::from_index(0);
    let google = EngineId::from_index(1);

    history
        .insert_or_replace(HistoryEntry::new(ddg, "rust", 1))
        .await
        .unwrap();
    history
        .insert_or_replace(HistoryEntry::new(google, "rust", 2))
        .await
        .unwrap();

    assert_eq!(history.count().await.unwrap(), 2);
    assert_eq!(history.count_by_engine(google).await.unwrap(), 1);
    let by_engine = history.list_by_engine(ddg).await.unwrap();
    assert_eq!(by_engine, vec![HistoryEntry::new(ddg, "rust", 1)]);

    cleanup(&path);
}

#[tokio::test]
async fn lists_are_newest_first_and_delete_uses_key_only() {
    let (history, path) = temp_store().await;
    let ddg = EngineId::from_index(0);

    for (query, time) in [("one", 1), ("three", 3), ("two", 2)] {
        history
            .insert_or_replace(HistoryEntry::new(ddg, query, time))
            .await
            .unwrap();
    }

    let queries: Vec<String> = history
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.query)
        .collect();
    assert_eq!(queries, ["three", "two", "one"]);

    // the stored time does not have to match
    assert!(history
        .delete(&HistoryEntry::new(ddg, "two", 999))
        .await
        .unwrap());
    assert_eq!(history.count().await.unwrap(), 2);

    cleanup(&path);
}

#[tokio::test]
async fn observe_reflects_writes() {
    let (history, path) = temp_store().await;
    let history: Arc<dyn HistoryStore> = Arc::new(history);
    let ddg = EngineId::from_index(0);
    let mut stream = observe(history.clone(), HistoryScope::All);

    let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert!(first.is_empty());

    history
        .insert_or_replace(HistoryEntry::new(ddg, "rust", 1))
        .await
        .unwrap();
    let second = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second, vec![HistoryEntry::new(ddg, "rust", 1)]);

    history
        .delete(&HistoryEntry::new(ddg, "rust", 1))
        .await
        .unwrap();
    let third = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert!(third.is_empty());

    cleanup(&path);
}

#[tokio::test]
async fn retention_on_sqlite_trims_largest_engine() {
    let (history, path) = temp_store().await;
    let bing = EngineId::from_index(6);
    let yahoo = EngineId::from_index(7);

    for t in 0..15 {
        history
            .insert_or_replace(HistoryEntry::new(bing, format!("bing {t}"), t))
            .await
            .unwrap();
    }
    for t in 0..5 {
        history
            .insert_or_replace(HistoryEntry::new(yahoo, format!("yahoo {t}"), 100 + t))
            .await
            .unwrap();
    }

    let outcome = RetentionPolicy::new(19, 10)
        .enforce(&history, &EngineCatalog::builtin())
        .await
        .unwrap()
        .expect("store is over capacity");

    assert_eq!(outcome.engine_id, bing);
    assert_eq!(outcome.removed, 10);
    let remaining: Vec<i64> = history
        .list_by_engine(bing)
        .await
        .unwrap()
        .iter()
        .map(|e| e.time)
        .collect();
    assert_eq!(remaining, [14, 13, 12, 11, 10]);
    assert_eq!(history.count_by_engine(yahoo).await.unwrap(), 5);

    cleanup(&path);
}
