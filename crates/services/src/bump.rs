//! Bump decision: whether a reply advances its thread's activity clock.

use std::sync::Arc;

use domains::{AuthorInput, Board, PostLedger, Result};
use tracing::debug;

/// Decides whether a given reply advances a thread's activity clock.
///
/// A reply bumps iff it is not saged and the thread's non-sage reply
/// count is still within the board's bump limit. The count is read from
/// the ledger at decision time, after the reply was persisted, so the
/// decision is always over authoritative state even when requests
/// interleave.
pub struct BumpPolicy {
    ledger: Arc<dyn PostLedger>,
}

impl BumpPolicy {
    pub fn new(ledger: Arc<dyn PostLedger>) -> Self {
        Self { ledger }
    }

    /// True when the reply should advance `last_activity`.
    pub async fn should_bump(
        &self,
        board: &Board,
        thread_num: i64,
        author: &AuthorInput,
    ) -> Result<bool> {
        if is_sage(author) {
            debug!(board = %board.url, thread = thread_num, "reply is saged, no bump");
            return Ok(false);
        }
        let count = self
            .ledger
            .find_bumping_reply_count(&board.url, thread_num)
            .await?;
        // Inclusive boundary: the reply that lands the count exactly on
        // the limit still bumps; the next one does not.
        let bump = count <= u64::from(board.settings.bump_limit);
        if !bump {
            debug!(
                board = %board.url,
                thread = thread_num,
                count,
                limit = board.settings.bump_limit,
                "bump limit reached"
            );
        }
        Ok(bump)
    }
}

/// Sage is the explicit flag, or the literal word "sage" in the address
/// field (surrounding whitespace and case ignored). A missing address
/// with no flag is not sage.
pub(crate) fn is_sage(author: &AuthorInput) -> bool {
    if author.sage {
        return true;
    }
    author
        .address
        .as_deref()
        .map(|a| a.trim().eq_ignore_ascii_case("sage"))
        .unwrap_or(false)
}
