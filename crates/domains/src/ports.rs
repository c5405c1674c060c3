//! # Ports
//!
//! Contracts the engine consumes. The collaborating subsystems (the
//! relational ledger, the page blob store, the template renderer)
//! implement these; the engine never reaches around them.
//!
//! With the `testing` feature enabled, mockall doubles (`MockPostLedger`,
//! `MockPageStore`, `MockPageRenderer`) are exported for test crates.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Board, BoardIndexEntry, PageKey, Post, PostDraft};

/// Sequenced post persistence. The ledger owns `num` assignment and the
/// authoritative activity clock.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PostLedger: Send + Sync {
    /// Persists a post, assigning the next per-board `num` and the
    /// creation timestamp. For a thread OP (`parent_num == None`) the
    /// ledger also initializes `last_activity` to the creation instant.
    /// Errors `NotFound` if the board, or the parent thread of a reply,
    /// does not exist.
    async fn create_post(
        &self,
        board_id: Uuid,
        parent_num: Option<i64>,
        draft: PostDraft,
    ) -> Result<Post>;

    /// The thread OP plus its replies ordered by `created_at` ascending.
    /// `Ok(None)` if no such thread lives on the board.
    async fn find_thread(&self, board_url: &str, thread_num: i64)
        -> Result<Option<(Post, Vec<Post>)>>;

    /// Number of live threads on the board.
    async fn thread_count(&self, board_url: &str) -> Result<u64>;

    /// Every live thread `num` on the board, in no particular order.
    async fn find_thread_nums(&self, board_url: &str) -> Result<Vec<i64>>;

    /// One page of threads ordered by `last_activity` descending, ties
    /// broken by larger `num` first, so the ordering is total.
    async fn list_threads_paginated(
        &self,
        board_url: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>>;

    /// Reply count for a thread, sage included. Errors `NotFound` when
    /// the thread no longer exists.
    async fn find_reply_count(&self, board_url: &str, thread_num: i64) -> Result<u64>;

    /// Non-sage reply count for a thread; what the bump ceiling is
    /// measured against. Errors `NotFound` when the thread no longer
    /// exists.
    async fn find_bumping_reply_count(&self, board_url: &str, thread_num: i64) -> Result<u64>;

    /// Advances a thread's activity clock. Monotone: an instant earlier
    /// than the current value leaves the clock untouched.
    async fn touch_activity(
        &self,
        board_url: &str,
        thread_num: i64,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// The eviction candidate: the thread with the smallest
    /// (`last_activity`, `num`). `Ok(None)` on an empty board.
    async fn find_oldest_activity_thread(&self, board_url: &str) -> Result<Option<Post>>;

    /// Deletes a thread and all its replies. Deleting an absent thread
    /// is a no-op.
    async fn delete_thread(&self, board_url: &str, thread_num: i64) -> Result<()>;
}

/// Key→bytes blob store holding the rendered page artifacts.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Writes (or overwrites) one artifact.
    async fn write(&self, key: &PageKey, bytes: Bytes) -> Result<()>;

    /// Deletes one artifact. Deleting an absent key is not an error.
    async fn delete(&self, key: &PageKey) -> Result<()>;

    /// Every artifact key currently stored for the board.
    async fn list_keys(&self, board_url: &str) -> Result<Vec<PageKey>>;
}

/// Pure rendering function. Implementations must be deterministic over
/// their inputs: rebuilding unchanged data must yield identical bytes.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait PageRenderer: Send + Sync {
    fn render_thread(&self, board: &Board, thread: &Post, replies: &[Post]) -> Result<Bytes>;

    fn render_board_index(
        &self,
        board: &Board,
        page_index: u64,
        entries: &[BoardIndexEntry],
    ) -> Result<Bytes>;
}
