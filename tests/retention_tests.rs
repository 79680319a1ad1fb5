//! Capacity enforcement on a full-size history.

use bettersearch::domain::EngineId;
use bettersearch::models::{EngineCatalog, HistoryEntry};
use bettersearch::services::{HistoryStore, MemoryHistoryStore, RetentionPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn fill(store: &MemoryHistoryStore, engine_id: EngineId, count: usize, offset: i64) {
    for i in 0..count {
        let time = offset + i64::try_from(i).unwrap();
        store
            .insert_or_replace(HistoryEntry::new(engine_id, format!("q{time}"), time))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn one_over_capacity_evicts_ten_oldest_of_largest_engine() {
    let store = MemoryHistoryStore::new();
    let google = EngineId::from_index(1);
    let brave = EngineId::from_index(2);
    let ecosia = EngineId::from_index(3);

    fill(&store, google, 6_001, 0).await;
    fill(&store, brave, 3_000, 100_000).await;
    fill(&store, ecosia, 1_000, 200_000).await;
    assert_eq!(store.count().await.unwrap(), 10_001);

    let outcome = RetentionPolicy::default()
        .enforce(&store, &EngineCatalog::builtin())
        .await
        .unwrap()
        .expect("one entry over capacity");

    assert_eq!(outcome.engine_id, google);
    assert_eq!(outcome.total_before, 10_001);
    assert_eq!(outcome.removed, 10);

    assert_eq!(store.count_by_engine(google).await.unwrap(), 5_991);
    assert_eq!(store.count_by_engine(brave).await.unwrap(), 3_000);
    assert_eq!(store.count_by_engine(ecosia).await.unwrap(), 1_000);

    let oldest = store.oldest_for_engine(google, 1).await.unwrap();
    assert_eq!(oldest[0].time, 10);
}

#[tokio::test]
async fn at_capacity_nothing_is_evicted() {
    let store = MemoryHistoryStore::new();
    fill(&store, EngineId::from_index(0), 10, 0).await;

    let outcome = RetentionPolicy::new(10, 3)
        .enforce(&store, &EngineCatalog::builtin())
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(store.count().await.unwrap(), 10);
}

#[tokio::test]
async fn entries_of_unknown_engines_are_never_chosen() {
    let store = MemoryHistoryStore::new();
    let stray = EngineId::from_uuid(uuid::Uuid::new_v4());
    fill(&store, stray, 20, 0).await;
    fill(&store, EngineId::from_index(9), 2, 100).await;

    let outcome = RetentionPolicy::new(5, 10)
        .enforce(&store, &EngineCatalog::builtin())
        .await
        .unwrap()
        .expect("over capacity");

    assert_eq!(outcome.engine_id, EngineId::from_index(9));
    assert_eq!(outcome.removed, 2);
    assert_eq!(store.count_by_engine(stray).await.unwrap(), 20);
}

#[tokio::test]
async fn watcher_keeps_trimming_after_inserts() {
    let store = Arc::new(MemoryHistoryStore::new());
    let history: Arc<dyn HistoryStore> = store.clone();
    let cancel = CancellationToken::new();
    let watcher = RetentionPolicy::new(5, 2).spawn_watcher(
        history.clone(),
        EngineCatalog::shared(),
        cancel.clone(),
    );

    fill(&store, EngineId::from_index(0), 8, 0).await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while history.count().await.unwrap() > 5 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("watcher brought the store back within bounds");

    cancel.cancel();
    watcher.await.unwrap();
}
