//! Cache coherency: regenerating derived page artifacts from ledger state.

use std::collections::HashSet;
use std::sync::Arc;

use domains::{
    Board, BoardIndexEntry, EngineError, PageKey, PageKind, PageRenderer, PageStore, PostLedger,
    Result,
};
use tracing::{debug, warn};

/// Regenerates `PageStore` artifacts from `PostLedger` state.
///
/// Every operation re-reads the ledger inside itself rather than reusing
/// state computed earlier in the request, and treats a thread vanishing
/// mid-rebuild as an omitted entry, never a failure. All operations are
/// idempotent: rebuilding unchanged data overwrites artifacts with
/// identical bytes, so last-writer-wins interleaving between rebuilds of
/// the same board is safe.
pub struct CacheCoherencyEngine {
    ledger: Arc<dyn PostLedger>,
    store: Arc<dyn PageStore>,
    renderer: Arc<dyn PageRenderer>,
    page_size: u64,
}

impl CacheCoherencyEngine {
    pub fn new(
        ledger: Arc<dyn PostLedger>,
        store: Arc<dyn PageStore>,
        renderer: Arc<dyn PageRenderer>,
        page_size: u64,
    ) -> Self {
        Self {
            ledger,
            store,
            renderer,
            page_size: page_size.max(1),
        }
    }

    /// Renders and writes one thread page. A thread that disappeared
    /// since the caller looked (eviction racing a rebuild) has its
    /// artifact dropped instead.
    pub async fn rebuild_thread(&self, board: &Board, thread_num: i64) -> Result<()> {
        let scope = format!("{}/thread/{}", board.url, thread_num);
        let found = self
            .ledger
            .find_thread(&board.url, thread_num)
            .await
            .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        let Some((thread, replies)) = found else {
            warn!(board = %board.url, thread = thread_num, "thread vanished mid-rebuild, dropping artifact");
            return self.remove_thread(board, thread_num).await;
        };
        let bytes = self
            .renderer
            .render_thread(board, &thread, &replies)
            .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        self.store
            .write(&PageKey::thread(&board.url, thread_num), bytes)
            .await
            .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        debug!(board = %board.url, thread = thread_num, "thread artifact rebuilt");
        Ok(())
    }

    /// Rebuilds every page of the board index plus the page-0 landing
    /// alias, then prunes stale tail pages left behind by a shrink.
    pub async fn rebuild_board_index(&self, board: &Board) -> Result<()> {
        let scope = format!("{}/index", board.url);
        let count = self
            .ledger
            .thread_count(&board.url)
            .await
            .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        let pages = count.div_ceil(self.page_size).max(1);

        for page in 0..pages {
            let threads = self
                .ledger
                .list_threads_paginated(&board.url, self.page_size, page * self.page_size)
                .await
                .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;

            let mut entries = Vec::with_capacity(threads.len());
            for thread in threads {
                // Reply counts are re-read here; a thread evicted between
                // the page read and the count read is simply omitted.
                match self.ledger.find_reply_count(&board.url, thread.num).await {
                    Ok(reply_count) => entries.push(BoardIndexEntry {
                        thread,
                        reply_count,
                    }),
                    Err(e) if e.is_not_found() => {
                        warn!(board = %board.url, thread = thread.num, "thread vanished mid-rebuild, omitted from index");
                    }
                    Err(e) => return Err(EngineError::cache_rebuild(scope.as_str(), e)),
                }
            }

            let bytes = self
                .renderer
                .render_board_index(board, page, &entries)
                .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
            if page == 0 {
                self.store
                    .write(&PageKey::landing(&board.url), bytes.clone())
                    .await
                    .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
            }
            self.store
                .write(&PageKey::board_index(&board.url, page as i64), bytes)
                .await
                .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        }

        self.prune_index_pages(board, pages).await?;
        debug!(board = %board.url, pages, "board index rebuilt");
        Ok(())
    }

    /// Drops a thread's artifact. Absent artifacts are fine.
    pub async fn remove_thread(&self, board: &Board, thread_num: i64) -> Result<()> {
        self.store
            .delete(&PageKey::thread(&board.url, thread_num))
            .await
            .map_err(|e| {
                EngineError::cache_rebuild(format!("{}/thread/{}", board.url, thread_num), e)
            })
    }

    /// Regenerates every artifact for the board and prunes artifacts of
    /// threads that no longer exist. The safe-but-expensive fallback
    /// after bulk moderation (delete-by-author, delete-all, settings
    /// changes) where precise incremental invalidation is impractical.
    pub async fn full_rebuild(&self, board: &Board) -> Result<()> {
        let scope = format!("{}/full", board.url);
        let nums = self
            .ledger
            .find_thread_nums(&board.url)
            .await
            .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        for num in &nums {
            self.rebuild_thread(board, *num).await?;
        }
        self.rebuild_board_index(board).await?;

        let live: HashSet<i64> = nums.into_iter().collect();
        let keys = self
            .store
            .list_keys(&board.url)
            .await
            .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        for key in keys {
            if key.kind == PageKind::Thread && !live.contains(&key.index) {
                self.store
                    .delete(&key)
                    .await
                    .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
            }
        }
        debug!(board = %board.url, threads = live.len(), "full rebuild complete");
        Ok(())
    }

    async fn prune_index_pages(&self, board: &Board, pages: u64) -> Result<()> {
        let scope = format!("{}/index", board.url);
        let keys = self
            .store
            .list_keys(&board.url)
            .await
            .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
        for key in keys {
            if key.kind == PageKind::BoardIndex && key.index >= pages as i64 {
                self.store
                    .delete(&key)
                    .await
                    .map_err(|e| EngineError::cache_rebuild(scope.as_str(), e))?;
            }
        }
        Ok(())
    }
}
