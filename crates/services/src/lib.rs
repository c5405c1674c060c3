//! # services
//!
//! The core posting engine: ingestion orchestration, capacity eviction,
//! bump decisions, and cache coherency over the domain ports.

pub mod bump;
pub mod cache;
pub mod eviction;
pub mod posting;

pub use bump::BumpPolicy;
pub use cache::CacheCoherencyEngine;
pub use eviction::CapacityEvictionPolicy;
pub use posting::PostingCoordinator;
