//! In-memory `PostLedger`, for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Board, EngineError, Post, PostDraft, PostLedger, Result};
use uuid::Uuid;

/// Map-backed ledger. Boards must be registered before posting; the
/// ledger then owns per-board `num` sequencing and the activity clock.
///
/// Mirrors what a relational ledger does for this engine: replies
/// ordered by creation, threads ordered by activity, and the eviction
/// candidate being the smallest (`last_activity`, `num`).
#[derive(Default)]
pub struct MemoryPostLedger {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    /// board id -> url
    boards: HashMap<Uuid, String>,
    /// board url -> id
    urls: HashMap<String, Uuid>,
    next_num: HashMap<Uuid, i64>,
    /// Insertion-ordered, which is also `num` order per board.
    posts: Vec<Post>,
}

impl MemoryPostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a board so posts can be created against it.
    pub fn register_board(&self, board: &Board) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.boards.insert(board.id, board.url.clone());
        inner.urls.insert(board.url.clone(), board.id);
        inner.next_num.entry(board.id).or_insert(1);
    }
}

impl Inner {
    fn board_id(&self, board_url: &str) -> Result<Uuid> {
        self.urls
            .get(board_url)
            .copied()
            .ok_or_else(|| EngineError::NotFound("board", board_url.to_string()))
    }

    fn thread_exists(&self, board_id: Uuid, thread_num: i64) -> bool {
        self.posts
            .iter()
            .any(|p| p.board_id == board_id && p.num == thread_num && p.is_op())
    }

    fn ops(&self, board_id: Uuid) -> impl Iterator<Item = &Post> {
        self.posts
            .iter()
            .filter(move |p| p.board_id == board_id && p.is_op())
    }
}

#[async_trait]
impl PostLedger for MemoryPostLedger {
    async fn create_post(
        &self,
        board_id: Uuid,
        parent_num: Option<i64>,
        draft: PostDraft,
    ) -> Result<Post> {
        let mut inner = self.inner.write().expect("lock poisoned");
        if !inner.boards.contains_key(&board_id) {
            return Err(EngineError::NotFound("board", board_id.to_string()));
        }
        if let Some(parent) = parent_num {
            if !inner.thread_exists(board_id, parent) {
                return Err(EngineError::NotFound("thread", parent.to_string()));
            }
        }

        let next = inner.next_num.entry(board_id).or_insert(1);
        let num = *next;
        *next += 1;

        let created_at = Utc::now();
        let post = Post {
            num,
            board_id,
            parent_num,
            created_at,
            last_activity: parent_num.is_none().then_some(created_at),
            content: draft.content,
            attachment: draft.attachment,
            sage: draft.sage,
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    async fn find_thread(
        &self,
        board_url: &str,
        thread_num: i64,
    ) -> Result<Option<(Post, Vec<Post>)>> {
        let inner = self.inner.read().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        let op = inner
            .posts
            .iter()
            .find(|p| p.board_id == board_id && p.num == thread_num && p.is_op());
        let Some(op) = op else {
            return Ok(None);
        };
        let mut replies: Vec<Post> = inner
            .posts
            .iter()
            .filter(|p| p.board_id == board_id && p.parent_num == Some(thread_num))
            .cloned()
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.num.cmp(&b.num)));
        Ok(Some((op.clone(), replies)))
    }

    async fn thread_count(&self, board_url: &str) -> Result<u64> {
        let inner = self.inner.read().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        Ok(inner.ops(board_id).count() as u64)
    }

    async fn find_thread_nums(&self, board_url: &str) -> Result<Vec<i64>> {
        let inner = self.inner.read().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        Ok(inner.ops(board_id).map(|p| p.num).collect())
    }

    async fn list_threads_paginated(
        &self,
        board_url: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>> {
        let inner = self.inner.read().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        let mut threads: Vec<Post> = inner.ops(board_id).cloned().collect();
        threads.sort_by(|a, b| {
            b.last_activity
                .cmp(&a.last_activity)
                .then(b.num.cmp(&a.num))
        });
        Ok(threads
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_reply_count(&self, board_url: &str, thread_num: i64) -> Result<u64> {
        let inner = self.inner.read().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        if !inner.thread_exists(board_id, thread_num) {
            return Err(EngineError::NotFound("thread", thread_num.to_string()));
        }
        Ok(inner
            .posts
            .iter()
            .filter(|p| p.board_id == board_id && p.parent_num == Some(thread_num))
            .count() as u64)
    }

    async fn find_bumping_reply_count(&self, board_url: &str, thread_num: i64) -> Result<u64> {
        let inner = self.inner.read().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        if !inner.thread_exists(board_id, thread_num) {
            return Err(EngineError::NotFound("thread", thread_num.to_string()));
        }
        Ok(inner
            .posts
            .iter()
            .filter(|p| p.board_id == board_id && p.parent_num == Some(thread_num) && !p.sage)
            .count() as u64)
    }

    async fn touch_activity(
        &self,
        board_url: &str,
        thread_num: i64,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        let op = inner
            .posts
            .iter_mut()
            .find(|p| p.board_id == board_id && p.num == thread_num && p.is_op())
            .ok_or_else(|| EngineError::NotFound("thread", thread_num.to_string()))?;
        // Monotone: the clock only ever advances.
        if op.last_activity.map_or(true, |current| at > current) {
            op.last_activity = Some(at);
        }
        Ok(())
    }

    async fn find_oldest_activity_thread(&self, board_url: &str) -> Result<Option<Post>> {
        let inner = self.inner.read().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        Ok(inner
            .ops(board_id)
            .min_by(|a, b| {
                a.last_activity
                    .cmp(&b.last_activity)
                    .then(a.num.cmp(&b.num))
            })
            .cloned())
    }

    async fn delete_thread(&self, board_url: &str, thread_num: i64) -> Result<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let board_id = inner.board_id(board_url)?;
        inner
            .posts
            .retain(|p| p.board_id != board_id || p.thread_num() != thread_num);
        Ok(())
    }
}
