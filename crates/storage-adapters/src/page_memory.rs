//! In-memory `PageStore` over a concurrent map, for tests and embedding.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use domains::{PageKey, PageStore, Result};

/// DashMap-backed page store. Artifacts live in memory; inherent helpers
/// expose the contents for assertions.
#[derive(Default)]
pub struct MemoryPageStore {
    pages: DashMap<PageKey, Bytes>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored bytes for a key, if present.
    pub fn get(&self, key: &PageKey) -> Option<Bytes> {
        self.pages.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.pages.contains_key(key)
    }

    /// Number of artifacts currently stored.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl PageStore for MemoryPageStore {
    async fn write(&self, key: &PageKey, bytes: Bytes) -> Result<()> {
        self.pages.insert(key.clone(), bytes);
        Ok(())
    }

    async fn delete(&self, key: &PageKey) -> Result<()> {
        self.pages.remove(key);
        Ok(())
    }

    async fn list_keys(&self, board_url: &str) -> Result<Vec<PageKey>> {
        Ok(self
            .pages
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| key.board_url == board_url)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let store = MemoryPageStore::new();
        let key = PageKey::thread("b", 1);

        store.write(&key, Bytes::from_static(b"<p>")).await.unwrap();
        assert_eq!(store.get(&key), Some(Bytes::from_static(b"<p>")));

        store.write(&key, Bytes::from_static(b"<q>")).await.unwrap();
        assert_eq!(store.get(&key), Some(Bytes::from_static(b"<q>")));

        store.delete(&key).await.unwrap();
        assert!(store.get(&key).is_none());

        // Absent deletes are fine.
        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn list_keys_is_scoped_to_the_board() {
        let store = MemoryPageStore::new();
        store
            .write(&PageKey::landing("a"), Bytes::from_static(b"a"))
            .await
            .unwrap();
        store
            .write(&PageKey::thread("b", 3), Bytes::from_static(b"b"))
            .await
            .unwrap();

        let keys = store.list_keys("b").await.unwrap();
        assert_eq!(keys, vec![PageKey::thread("b", 3)]);
    }
}
