//! End-to-end posting orchestration: persist, evict, bump, regenerate.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    AuthorInput, Board, EngineError, PostDraft, PostLedger, RedirectTarget, Result,
};
use tracing::{error, info};

use crate::bump::{is_sage, BumpPolicy};
use crate::cache::CacheCoherencyEngine;
use crate::eviction::CapacityEvictionPolicy;

/// Orchestrates thread and reply creation end to end.
///
/// Side effects are strictly sequential per call: ledger write, eviction
/// check, bump check, cache rebuild. Nothing rolls back after the ledger
/// write; a rebuild failure leaves the post durable and the cache stale
/// until the next mutation of the same scope.
pub struct PostingCoordinator {
    ledger: Arc<dyn PostLedger>,
    bump: BumpPolicy,
    eviction: CapacityEvictionPolicy,
    cache: Arc<CacheCoherencyEngine>,
}

impl PostingCoordinator {
    pub fn new(ledger: Arc<dyn PostLedger>, cache: Arc<CacheCoherencyEngine>) -> Self {
        Self {
            bump: BumpPolicy::new(ledger.clone()),
            eviction: CapacityEvictionPolicy::new(ledger.clone(), cache.clone()),
            ledger,
            cache,
        }
    }

    /// Opens a new thread, returning its `num` and the redirect target.
    pub async fn create_thread(
        &self,
        board: &Board,
        author: AuthorInput,
        is_privileged: bool,
    ) -> Result<(i64, RedirectTarget)> {
        let op = self
            .ledger
            .create_post(board.id, None, draft(&author, is_privileged))
            .await?;
        info!(board = %board.url, thread = op.num, "thread created");

        self.eviction.enforce(board).await?;

        self.refresh_thread_page(board, op.num).await?;
        self.refresh_board_index(board).await;

        let target = RedirectTarget {
            board_url: board.url.clone(),
            thread_num: op.num,
            post_num: op.num,
        };
        Ok((op.num, target))
    }

    /// Appends a reply to an existing thread, returning its `num` and the
    /// redirect target.
    pub async fn create_reply(
        &self,
        board: &Board,
        parent_num: i64,
        author: AuthorInput,
        is_privileged: bool,
    ) -> Result<(i64, RedirectTarget)> {
        // The parent lookup must succeed before anything is written, so a
        // reply can never be left referencing a thread that is already
        // gone (including one closed by a racing eviction).
        if self.ledger.find_thread(&board.url, parent_num).await?.is_none() {
            return Err(EngineError::NotFound(
                "thread",
                format!("{}/{}", board.url, parent_num),
            ));
        }

        let reply = self
            .ledger
            .create_post(board.id, Some(parent_num), draft(&author, is_privileged))
            .await?;
        info!(board = %board.url, thread = parent_num, post = reply.num, "reply created");

        if self.bump.should_bump(board, parent_num, &author).await? {
            self.ledger
                .touch_activity(&board.url, parent_num, Utc::now())
                .await?;
        }

        self.refresh_thread_page(board, parent_num).await?;
        self.refresh_board_index(board).await;

        let target = RedirectTarget {
            board_url: board.url.clone(),
            thread_num: parent_num,
            post_num: reply.num,
        };
        Ok((reply.num, target))
    }

    /// The redirect target's own artifact: a failure here is logged as a
    /// stale-cache condition and surfaced to the caller. The post is
    /// never rolled back.
    async fn refresh_thread_page(&self, board: &Board, thread_num: i64) -> Result<()> {
        if let Err(err) = self.cache.rebuild_thread(board, thread_num).await {
            error!(board = %board.url, thread = thread_num, %err, "thread page left stale after durable post write");
            return Err(err);
        }
        Ok(())
    }

    /// Board-index staleness is tolerated when the redirect target itself
    /// was rebuilt: log distinctly, do not fail the request.
    async fn refresh_board_index(&self, board: &Board) {
        if let Err(err) = self.cache.rebuild_board_index(board).await {
            error!(board = %board.url, %err, "board index left stale after durable post write");
        }
    }
}

fn draft(author: &AuthorInput, is_privileged: bool) -> PostDraft {
    PostDraft {
        content: author.content.clone(),
        attachment: author.attachment.clone(),
        sage: is_sage(author),
        privileged: is_privileged,
    }
}
