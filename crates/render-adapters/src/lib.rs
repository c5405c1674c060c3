//! # render-adapters
//!
//! Askama implementation of the `PageRenderer` port.
//!
//! The templates render persisted fields only (never the wall clock), so
//! rebuilding unchanged data yields byte-identical artifacts. Content is
//! HTML-escaped by askama's autoescaping.

use askama::Template;
use bytes::Bytes;
use domains::{Board, BoardIndexEntry, EngineError, PageRenderer, Post, Result};

#[derive(Template)]
#[template(path = "thread.html")]
struct ThreadTemplate<'a> {
    board: &'a Board,
    thread: &'a Post,
    replies: &'a [Post],
}

#[derive(Template)]
#[template(path = "board_index.html")]
struct BoardIndexTemplate<'a> {
    board: &'a Board,
    page_index: u64,
    entries: &'a [BoardIndexEntry],
}

/// Renders board pages through the askama templates in `templates/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskamaPageRenderer;

impl AskamaPageRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRenderer for AskamaPageRenderer {
    fn render_thread(&self, board: &Board, thread: &Post, replies: &[Post]) -> Result<Bytes> {
        let html = ThreadTemplate {
            board,
            thread,
            replies,
        }
        .render()
        .map_err(|e| {
            EngineError::dependency(format!("rendering thread {}/{}", board.url, thread.num), e)
        })?;
        Ok(Bytes::from(html.into_bytes()))
    }

    fn render_board_index(
        &self,
        board: &Board,
        page_index: u64,
        entries: &[BoardIndexEntry],
    ) -> Result<Bytes> {
        let html = BoardIndexTemplate {
            board,
            page_index,
            entries,
        }
        .render()
        .map_err(|e| {
            EngineError::dependency(format!("rendering index {}/{}", board.url, page_index), e)
        })?;
        Ok(Bytes::from(html.into_bytes()))
    }
}
