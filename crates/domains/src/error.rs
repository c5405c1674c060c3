//! # EngineError
//!
//! Centralized error handling for the posting engine. Three classes with
//! very different retry semantics; see the variant docs.

use thiserror::Error;

/// The primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Board or parent thread missing. Raised before any write; safe for
    /// the caller to retry.
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Ledger or page-store I/O failure. Fatal for the current request;
    /// nothing was partially applied.
    #[error("dependency failure while {context}: {source}")]
    Dependency {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    /// Render or store failure after the post was already durably
    /// persisted. The post stays; the affected artifact is stale until
    /// the next mutation of the same scope rebuilds it.
    #[error("cache rebuild failed for {scope}: {source}")]
    CacheRebuild {
        scope: String,
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    pub fn dependency(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Dependency {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn cache_rebuild(scope: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::CacheRebuild {
            scope: scope.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(..))
    }

    pub fn is_cache_rebuild(&self) -> bool {
        matches!(self, Self::CacheRebuild { .. })
    }
}

/// A specialized Result type for engine logic.
pub type Result<T> = std::result::Result<T, EngineError>;
