//! Filesystem `PageStore` writing the classic on-disk board layout.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use domains::{EngineError, PageKey, PageKind, PageStore, Result};
use tokio::fs;
use tracing::debug;

/// Disk-resident page store. Layout per board:
///
/// - `<root>/<board>/index.html` is the landing alias
/// - `<root>/<board>/<n>.html` is board-index page `n`
/// - `<root>/<board>/res/<num>.html` holds the thread pages
pub struct LocalPageStore {
    root: PathBuf,
}

impl LocalPageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &PageKey) -> PathBuf {
        let mut path = self.root.join(&key.board_url);
        match key.kind {
            PageKind::Landing => path.push("index.html"),
            PageKind::BoardIndex => path.push(format!("{}.html", key.index)),
            PageKind::Thread => {
                path.push("res");
                path.push(format!("{}.html", key.index));
            }
        }
        path
    }
}

fn parse_page_file(board_url: &str, name: &str) -> Option<PageKey> {
    if name == "index.html" {
        return Some(PageKey::landing(board_url));
    }
    let page = name.strip_suffix(".html")?.parse::<i64>().ok()?;
    Some(PageKey::board_index(board_url, page))
}

#[async_trait]
impl PageStore for LocalPageStore {
    async fn write(&self, key: &PageKey, bytes: Bytes) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| EngineError::dependency(format!("creating {}", parent.display()), e))?;
        }
        fs::write(&path, &bytes)
            .await
            .map_err(|e| EngineError::dependency(format!("writing {}", path.display()), e))?;
        debug!(path = %path.display(), len = bytes.len(), "page artifact written");
        Ok(())
    }

    async fn delete(&self, key: &PageKey) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::dependency(
                format!("deleting {}", path.display()),
                e,
            )),
        }
    }

    async fn list_keys(&self, board_url: &str) -> Result<Vec<PageKey>> {
        let board_dir = self.root.join(board_url);
        let mut keys = Vec::new();

        let mut entries = match fs::read_dir(&board_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(keys),
            Err(e) => {
                return Err(EngineError::dependency(
                    format!("listing {}", board_dir.display()),
                    e,
                ))
            }
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::dependency(format!("listing {}", board_dir.display()), e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(key) = parse_page_file(board_url, name) {
                keys.push(key);
            }
        }

        let res_dir = board_dir.join("res");
        let mut entries = match fs::read_dir(&res_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(keys),
            Err(e) => {
                return Err(EngineError::dependency(
                    format!("listing {}", res_dir.display()),
                    e,
                ))
            }
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::dependency(format!("listing {}", res_dir.display()), e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(num) = name.strip_suffix(".html").and_then(|s| s.parse::<i64>().ok()) {
                keys.push(PageKey::thread(board_url, num));
            }
        }

        Ok(keys)
    }
}
