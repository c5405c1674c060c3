//! Shared fixtures for the integration suites: an engine wired end to
//! end over the in-memory adapters and the askama renderer.

use std::sync::Arc;

use chrono::Utc;
use domains::{AuthorInput, Board, BoardSettings};
use render_adapters::AskamaPageRenderer;
use services::{CacheCoherencyEngine, PostingCoordinator};
use storage_adapters::{MemoryPageStore, MemoryPostLedger};
use uuid::Uuid;

/// A board with the given capacity knobs.
pub fn board(url: &str, max_threads: u32, bump_limit: u32) -> Board {
    Board {
        id: Uuid::new_v4(),
        url: url.to_string(),
        title: format!("/{url}/"),
        settings: BoardSettings {
            max_threads_on_board: max_threads,
            bump_limit,
        },
        created_at: Utc::now(),
    }
}

pub fn plain(content: &str) -> AuthorInput {
    AuthorInput {
        content: content.to_string(),
        ..Default::default()
    }
}

pub fn with_address(content: &str, address: &str) -> AuthorInput {
    AuthorInput {
        content: content.to_string(),
        address: Some(address.to_string()),
        ..Default::default()
    }
}

/// In-memory engine wired end to end.
pub struct Harness {
    pub ledger: Arc<MemoryPostLedger>,
    pub store: Arc<MemoryPageStore>,
    pub cache: Arc<CacheCoherencyEngine>,
    pub coordinator: PostingCoordinator,
}

impl Harness {
    /// Wires the engine with the configured default page size.
    pub fn new() -> Self {
        Self::with_page_size(configs::EngineConfig::default().index.page_size)
    }

    pub fn with_page_size(page_size: u64) -> Self {
        init_tracing();
        let ledger = Arc::new(MemoryPostLedger::new());
        let store = Arc::new(MemoryPageStore::new());
        let cache = Arc::new(CacheCoherencyEngine::new(
            ledger.clone(),
            store.clone(),
            Arc::new(AskamaPageRenderer::new()),
            page_size,
        ));
        let coordinator = PostingCoordinator::new(ledger.clone(), cache.clone());
        Self {
            ledger,
            store,
            cache,
            coordinator,
        }
    }

    pub fn register(&self, board: &Board) {
        self.ledger.register_board(board);
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Small real delay so consecutive posts get strictly increasing
/// timestamps even on coarse clocks.
pub async fn tick() {
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
}
