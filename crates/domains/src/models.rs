//! # Domain Models
//!
//! Core entities of the posting engine. Boards are owned by the admin
//! subsystem and only ever read here; posts are created once and never
//! updated afterwards, except for a thread's `last_activity` clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single board (e.g. /b/, /v/) together with its capacity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    /// The URL slug (e.g. "b" for /b/), unique across boards.
    pub url: String,
    pub title: String,
    pub settings: BoardSettings,
    pub created_at: DateTime<Utc>,
}

/// Capacity knobs read by the eviction and bump policies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Live-thread quota; a creation that pushes the board past it evicts
    /// the least-recently-active thread. Always > 0.
    pub max_threads_on_board: u32,
    /// Once a thread's non-sage reply count exceeds this, further replies
    /// stop advancing `last_activity`.
    pub bump_limit: u32,
}

/// The fundamental unit of conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Monotonically increasing sequence number, unique per board.
    pub num: i64,
    pub board_id: Uuid,
    /// `None` for a thread-opening post, otherwise the `num` of the
    /// thread replied to.
    pub parent_num: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Board-index sort key. `Some` for every created thread, `None` for
    /// replies. Non-decreasing over a thread's lifetime.
    pub last_activity: Option<DateTime<Utc>>,
    /// Opaque to the engine; formatting happens upstream.
    pub content: String,
    /// Reference into the media subsystem, opaque here.
    pub attachment: Option<String>,
    /// Whether the post was saged at creation. Persisted so the ledger
    /// can answer non-sage reply counts.
    pub sage: bool,
}

impl Post {
    /// Whether this post opens a thread.
    pub fn is_op(&self) -> bool {
        self.parent_num.is_none()
    }

    /// The thread this post belongs to (its own `num` for an OP).
    pub fn thread_num(&self) -> i64 {
        self.parent_num.unwrap_or(self.num)
    }
}

/// Caller-supplied form fields consumed by the engine. Validation,
/// anti-spam, and comment formatting all happen before this is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorInput {
    pub content: String,
    /// The address ("email") form field; writing "sage" here suppresses
    /// the bump, matching the classic convention.
    pub address: Option<String>,
    /// Explicit sage flag, independent of the address field.
    pub sage: bool,
    pub attachment: Option<String>,
}

/// What the coordinator hands the ledger for persistence. The ledger
/// assigns `num` and the timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub content: String,
    pub attachment: Option<String>,
    /// Effective sageness (explicit flag or the address convention),
    /// resolved once at ingestion.
    pub sage: bool,
    /// Set for staff posts; recorded by the ledger, unused by the engine.
    pub privileged: bool,
}

/// Kind of a derived page artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    /// One page of the paginated board index.
    BoardIndex,
    /// Alias for board-index page 0, the board's default landing page.
    Landing,
    /// A single thread page.
    Thread,
}

/// Identity of a cache artifact: `(board url, kind, index)`. The index is
/// a page number for the board index, a thread `num` for thread pages,
/// and always 0 for the landing alias. An artifact has no identity beyond
/// its key and is always derivable from persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey {
    pub board_url: String,
    pub kind: PageKind,
    pub index: i64,
}

impl PageKey {
    pub fn board_index(board_url: impl Into<String>, page: i64) -> Self {
        Self {
            board_url: board_url.into(),
            kind: PageKind::BoardIndex,
            index: page,
        }
    }

    pub fn landing(board_url: impl Into<String>) -> Self {
        Self {
            board_url: board_url.into(),
            kind: PageKind::Landing,
            index: 0,
        }
    }

    pub fn thread(board_url: impl Into<String>, num: i64) -> Self {
        Self {
            board_url: board_url.into(),
            kind: PageKind::Thread,
            index: num,
        }
    }
}

/// One row of a rendered board-index page.
#[derive(Debug, Clone, Serialize)]
pub struct BoardIndexEntry {
    pub thread: Post,
    pub reply_count: u64,
}

/// Where a successful create sends the author, shaped
/// `{board}/{thread}#{post}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub board_url: String,
    pub thread_num: i64,
    pub post_num: i64,
}

impl std::fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.board_url, self.thread_num, self.post_num)
    }
}
