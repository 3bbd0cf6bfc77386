//! Model asset retrieval.
//!
//! Detector models are fetched once and kept in a keyed store. A store
//! failure only costs the next load a refetch; a fetch failure makes the
//! model unavailable.

use crate::config::ModelAsset;
use crate::error::AssetError;
use crate::notice::{Notice, NoticeLog};
use std::collections::HashMap;

/// Remote byte source.
pub trait AssetFetcher {
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, AssetError>;
}

/// Keyed byte cache.
pub trait AssetStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AssetError>;
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), AssetError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AssetError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), AssetError> {
        self.entries.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
}

/// Cache lookup by `asset.key`, falling back to fetching `asset.url`.
///
/// # Errors
/// [`AssetError::Unavailable`] when the bytes could be neither read from the
/// store nor fetched.
pub fn load_model_asset(
    store: &mut dyn AssetStore,
    fetcher: &mut dyn AssetFetcher,
    asset: &ModelAsset,
    notices: &mut NoticeLog,
) -> Result<Vec<u8>, AssetError> {
    let key = asset.key.as_str();

    match store.get(key) {
        Ok(Some(bytes)) => {
            notices.push(Notice::success(format!("Loading {key} from cache...")));
            return Ok(bytes);
        }
        Ok(None) => notices.push(Notice::info(format!("{key} not in cache."))),
        Err(e) => log::warn!("asset store lookup for {key} failed: {e}"),
    }

    let bytes = fetcher.fetch(&asset.url).map_err(|e| {
        notices.push(Notice::error(format!("Failed to load/fetch {key}: {e}")));
        AssetError::Unavailable(key.to_owned())
    })?;

    notices.push(Notice::info(format!("Storing {key} in cache...")));
    match store.put(key, &bytes) {
        Ok(()) => notices.push(Notice::success(format!("{key} stored."))),
        Err(e) => notices.push(Notice::warning(format!("Failed to store {key}: {e}."))),
    }

    Ok(bytes)
}
