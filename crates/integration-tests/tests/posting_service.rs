//! End-to-end posting flows over the in-memory adapters.

use chrono::{DateTime, Utc};
use domains::{PageKey, PostLedger};
use integration_tests::{board, plain, tick, Harness};

async fn last_activity(harness: &Harness, board_url: &str, thread_num: i64) -> DateTime<Utc> {
    let (op, _) = harness
        .ledger
        .find_thread(board_url, thread_num)
        .await
        .unwrap()
        .unwrap();
    op.last_activity.unwrap()
}

fn page_html(harness: &Harness, key: &PageKey) -> String {
    let bytes = harness.store.get(key).expect("artifact missing");
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn creating_a_thread_writes_its_page_and_the_index() {
    let harness = Harness::new();
    let b = board("b", 10, 5);
    harness.register(&b);

    let (num, target) = harness
        .coordinator
        .create_thread(&b, plain("first post"), false)
        .await
        .unwrap();

    assert_eq!(target.to_string(), format!("b/{num}#{num}"));
    assert!(harness.store.contains(&PageKey::thread("b", num)));
    assert!(harness.store.contains(&PageKey::landing("b")));
    assert!(harness.store.contains(&PageKey::board_index("b", 0)));

    let landing = page_html(&harness, &PageKey::landing("b"));
    assert!(landing.contains(&format!("res/{num}.html")));
}

#[tokio::test]
async fn replying_to_a_missing_thread_is_not_found_and_writes_nothing() {
    let harness = Harness::new();
    let b = board("b", 10, 5);
    harness.register(&b);

    let err = harness
        .coordinator
        .create_reply(&b, 99, plain("hello?"), false)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(harness.ledger.thread_count("b").await.unwrap(), 0);
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn creating_a_thread_on_an_unknown_board_is_not_found() {
    let harness = Harness::new();
    let b = board("ghost", 10, 5);
    // Never registered with the ledger.

    let err = harness
        .coordinator
        .create_thread(&b, plain("hello?"), false)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn reply_redirect_points_into_the_parent_thread() {
    let harness = Harness::new();
    let b = board("b", 10, 5);
    harness.register(&b);

    let (thread_num, _) = harness
        .coordinator
        .create_thread(&b, plain("op"), false)
        .await
        .unwrap();
    tick().await;
    let (reply_num, target) = harness
        .coordinator
        .create_reply(&b, thread_num, plain("reply"), false)
        .await
        .unwrap();

    assert_eq!(target.to_string(), format!("b/{thread_num}#{reply_num}"));
}

/// The full scenario: quota 1, bump limit 1.
#[tokio::test]
async fn eviction_bump_and_rebuild_interact_correctly() {
    let harness = Harness::new();
    let b = board("b", 1, 1);
    harness.register(&b);

    let (t1, _) = harness
        .coordinator
        .create_thread(&b, plain("first thread"), false)
        .await
        .unwrap();
    tick().await;
    let (t2, _) = harness
        .coordinator
        .create_thread(&b, plain("second thread"), false)
        .await
        .unwrap();

    // The older thread was evicted and the index only lists the newer one.
    assert_eq!(harness.ledger.thread_count("b").await.unwrap(), 1);
    assert!(harness.ledger.find_thread("b", t1).await.unwrap().is_none());
    assert!(!harness.store.contains(&PageKey::thread("b", t1)));
    let landing = page_html(&harness, &PageKey::landing("b"));
    assert!(landing.contains(&format!("res/{t2}.html")));
    assert!(!landing.contains(&format!("res/{t1}.html")));

    // First plain reply bumps.
    let before = last_activity(&harness, "b", t2).await;
    tick().await;
    let (r1, _) = harness
        .coordinator
        .create_reply(&b, t2, plain("reply one"), false)
        .await
        .unwrap();
    let after_first = last_activity(&harness, "b", t2).await;
    assert!(after_first > before);
    assert!(page_html(&harness, &PageKey::thread("b", t2)).contains(&format!("No.{r1}")));

    // Second plain reply is past the bump limit: no bump, still rendered.
    tick().await;
    let (r2, _) = harness
        .coordinator
        .create_reply(&b, t2, plain("reply two"), false)
        .await
        .unwrap();
    let after_second = last_activity(&harness, "b", t2).await;
    assert_eq!(after_second, after_first);
    assert!(page_html(&harness, &PageKey::thread("b", t2)).contains(&format!("No.{r2}")));
}
