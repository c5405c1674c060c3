//! Cache idempotence, removal propagation, and pruning.

use bytes::Bytes;
use domains::{PageKey, PageKind, PageStore, PostLedger};
use integration_tests::{board, plain, tick, Harness};

/// Every artifact for the board, in a deterministic order.
async fn snapshot(harness: &Harness) -> Vec<(PageKey, Bytes)> {
    let mut keys = harness.store.list_keys("b").await.unwrap();
    keys.sort_by_key(|k| (k.kind as u8, k.index));
    keys.into_iter()
        .map(|key| {
            let bytes = harness.store.get(&key).unwrap();
            (key, bytes)
        })
        .collect()
}

#[tokio::test]
async fn full_rebuild_is_idempotent_to_the_byte() {
    let harness = Harness::new();
    let b = board("b", 10, 100);
    harness.register(&b);

    for i in 0..3 {
        let (thread, _) = harness
            .coordinator
            .create_thread(&b, plain(&format!("thread {i}")), false)
            .await
            .unwrap();
        tick().await;
        harness
            .coordinator
            .create_reply(&b, thread, plain("a reply"), false)
            .await
            .unwrap();
        tick().await;
    }

    harness.cache.full_rebuild(&b).await.unwrap();
    let first = snapshot(&harness).await;
    harness.cache.full_rebuild(&b).await.unwrap();
    let second = snapshot(&harness).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn removing_a_thread_propagates_to_every_artifact() {
    let harness = Harness::new();
    let b = board("b", 10, 100);
    harness.register(&b);

    let (t1, _) = harness
        .coordinator
        .create_thread(&b, plain("doomed"), false)
        .await
        .unwrap();
    tick().await;
    let (t2, _) = harness
        .coordinator
        .create_thread(&b, plain("survivor"), false)
        .await
        .unwrap();

    // Moderation deletes the thread from the ledger, then invalidates.
    harness.ledger.delete_thread("b", t1).await.unwrap();
    harness.cache.remove_thread(&b, t1).await.unwrap();
    harness.cache.rebuild_board_index(&b).await.unwrap();

    assert!(!harness.store.contains(&PageKey::thread("b", t1)));
    let landing = harness.store.get(&PageKey::landing("b")).unwrap();
    let landing = String::from_utf8(landing.to_vec()).unwrap();
    assert!(!landing.contains(&format!("res/{t1}.html")));
    assert!(landing.contains(&format!("res/{t2}.html")));
}

#[tokio::test]
async fn full_rebuild_prunes_artifacts_of_deleted_threads() {
    let harness = Harness::new();
    let b = board("b", 10, 100);
    harness.register(&b);

    let (t1, _) = harness
        .coordinator
        .create_thread(&b, plain("doomed"), false)
        .await
        .unwrap();
    tick().await;
    harness
        .coordinator
        .create_thread(&b, plain("survivor"), false)
        .await
        .unwrap();

    // Bulk moderation path: only the ledger is touched, then the safe
    // fallback regenerates and prunes everything.
    harness.ledger.delete_thread("b", t1).await.unwrap();
    harness.cache.full_rebuild(&b).await.unwrap();

    assert!(!harness.store.contains(&PageKey::thread("b", t1)));
}

#[tokio::test]
async fn shrinking_the_board_prunes_stale_index_pages() {
    let harness = Harness::with_page_size(2);
    let b = board("b", 100, 100);
    harness.register(&b);

    let mut threads = Vec::new();
    for i in 0..5 {
        let (num, _) = harness
            .coordinator
            .create_thread(&b, plain(&format!("thread {i}")), false)
            .await
            .unwrap();
        threads.push(num);
        tick().await;
    }
    // Five threads over page size two: pages 0, 1, 2 plus the landing.
    assert!(harness.store.contains(&PageKey::board_index("b", 2)));

    for num in &threads[..3] {
        harness.ledger.delete_thread("b", *num).await.unwrap();
    }
    harness.cache.full_rebuild(&b).await.unwrap();

    assert!(harness.store.contains(&PageKey::board_index("b", 0)));
    assert!(!harness.store.contains(&PageKey::board_index("b", 1)));
    assert!(!harness.store.contains(&PageKey::board_index("b", 2)));

    // Exactly: landing, page 0, and the two surviving thread pages.
    let keys = harness.store.list_keys("b").await.unwrap();
    assert_eq!(keys.len(), 4);
    assert_eq!(
        keys.iter().filter(|k| k.kind == PageKind::Thread).count(),
        2
    );
}

#[tokio::test]
async fn rebuilding_a_vanished_thread_drops_its_artifact() {
    let harness = Harness::new();
    let b = board("b", 10, 100);
    harness.register(&b);

    let (t1, _) = harness
        .coordinator
        .create_thread(&b, plain("here today"), false)
        .await
        .unwrap();
    harness.ledger.delete_thread("b", t1).await.unwrap();

    // The rebuild tolerates the disappearance and clears the artifact.
    harness.cache.rebuild_thread(&b, t1).await.unwrap();
    assert!(!harness.store.contains(&PageKey::thread("b", t1)));
}

#[tokio::test]
async fn an_empty_board_still_has_a_landing_page() {
    let harness = Harness::new();
    let b = board("b", 10, 100);
    harness.register(&b);

    harness.cache.full_rebuild(&b).await.unwrap();

    assert!(harness.store.contains(&PageKey::landing("b")));
    assert!(harness.store.contains(&PageKey::board_index("b", 0)));
    assert_eq!(harness.store.len(), 2);
}
