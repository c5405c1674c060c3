//! Capacity enforcement: oldest-activity eviction past the thread quota.

use std::sync::Arc;

use domains::{Board, PostLedger, Result};
use tracing::info;

use crate::cache::CacheCoherencyEngine;

/// Decides whether a board is over its live-thread quota and removes the
/// least-recently-active thread when it is.
///
/// At most one thread is evicted per call; interleaved creations can
/// leave a board transiently over quota, and later creations converge it
/// back, one eviction at a time. The count and the victim are both read
/// from the ledger inside the call, never carried over from earlier in
/// the request.
pub struct CapacityEvictionPolicy {
    ledger: Arc<dyn PostLedger>,
    cache: Arc<CacheCoherencyEngine>,
}

impl CapacityEvictionPolicy {
    pub fn new(ledger: Arc<dyn PostLedger>, cache: Arc<CacheCoherencyEngine>) -> Self {
        Self { ledger, cache }
    }

    /// Evicts the thread with the smallest (`last_activity`, `num`) if
    /// the board is over quota, returning its `num`.
    pub async fn enforce(&self, board: &Board) -> Result<Option<i64>> {
        let count = self.ledger.thread_count(&board.url).await?;
        if count <= u64::from(board.settings.max_threads_on_board) {
            return Ok(None);
        }
        let Some(victim) = self.ledger.find_oldest_activity_thread(&board.url).await? else {
            return Ok(None);
        };
        self.ledger.delete_thread(&board.url, victim.num).await?;
        info!(board = %board.url, thread = victim.num, "evicted least-recently-active thread");
        self.cache.remove_thread(board, victim.num).await?;
        Ok(Some(victim.num))
    }
}
