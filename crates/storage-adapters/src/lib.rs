//! # storage-adapters
//!
//! Reference implementations of the engine's persistence ports: an
//! in-memory ledger and page store for tests and embedding, and a
//! tokio-fs page store producing the classic on-disk board layout.

pub mod ledger_memory;
pub mod page_fs;
pub mod page_memory;

pub use ledger_memory::MemoryPostLedger;
pub use page_fs::LocalPageStore;
pub use page_memory::MemoryPageStore;
