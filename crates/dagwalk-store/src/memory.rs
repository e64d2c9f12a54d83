//! In-memory implementation of the block store traits.
//!
//! Keeps every block in a `HashMap` behind a `RwLock`. All data is lost when
//! the store is dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;
use dagwalk_core::{compute_cid, HashCode};

use crate::error::{Result, StoreError};
use crate::traits::{BlockFetcher, BlockStore, FetchOptions};

/// Multihash code of the identity hash.
const IDENTITY_HASH: u64 = 0x00;

/// In-memory block store.
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<Cid, Bytes>>,
}

impl MemoryBlockStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Hash `bytes`, store them and return the CID.
    pub fn put_block(&self, codec: u64, hash: HashCode, bytes: &[u8]) -> Result<Cid> {
        let cid = compute_cid(codec, hash, bytes)?;
        self.insert(cid, Bytes::copy_from_slice(bytes));
        Ok(cid)
    }

    /// Store bytes under a CID without checking that they match.
    ///
    /// Returns `true` if the CID was new.
    pub fn insert(&self, cid: Cid, bytes: Bytes) -> bool {
        let mut blocks = self.blocks.write().unwrap_or_else(|e| e.into_inner());
        if blocks.contains_key(&cid) {
            return false;
        }
        blocks.insert(cid, bytes);
        true
    }

    /// Drop a block. Returns `true` if it was present.
    pub fn remove(&self, cid: &Cid) -> bool {
        self.blocks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(cid)
            .is_some()
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.blocks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, cid: &Cid) -> Option<Bytes> {
        if let Some(bytes) = self
            .blocks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(cid)
        {
            return Some(bytes.clone());
        }
        // Identity CIDs carry their block inline.
        if cid.hash().code() == IDENTITY_HASH {
            return Some(Bytes::copy_from_slice(cid.hash().digest()));
        }
        None
    }
}

impl Default for MemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockFetcher for MemoryBlockStore {
    async fn fetch(&self, cid: &Cid, options: &FetchOptions) -> Result<Bytes> {
        if options.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        tracing::trace!("memory fetch {}", cid);
        self.lookup(cid).ok_or(StoreError::NotFound(*cid))
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put(&self, cid: Cid, bytes: Bytes) -> Result<bool> {
        Ok(self.insert(cid, bytes))
    }

    async fn has(&self, cid: &Cid) -> Result<bool> {
        Ok(self.lookup(cid).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagwalk_core::ident::codes;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryBlockStore::new();
        let cid = store
            .put_block(codes::RAW, HashCode::Sha2_256, b"hello")
            .unwrap();

        let bytes = store.fetch(&cid, &FetchOptions::default()).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
        assert!(store.has(&cid).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_idempotent() {
        let store = MemoryBlockStore::new();
        let cid = compute_cid(codes::RAW, HashCode::Sha2_256, b"x").unwrap();

        assert!(store.put(cid, Bytes::from_static(b"x")).await.unwrap());
        assert!(!store.put(cid, Bytes::from_static(b"x")).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_block() {
        let store = MemoryBlockStore::new();
        let cid = compute_cid(codes::RAW, HashCode::Sha2_256, b"absent").unwrap();

        let err = store.fetch(&cid, &FetchOptions::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(c) if c == cid));
    }

    #[tokio::test]
    async fn test_identity_served_inline() {
        let store = MemoryBlockStore::new();
        let cid = compute_cid(codes::RAW, HashCode::Identity, b"inline").unwrap();

        let bytes = store.fetch(&cid, &FetchOptions::default()).await.unwrap();
        assert_eq!(&bytes[..], b"inline");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_fetch() {
        let store = MemoryBlockStore::new();
        let cid = store.put_block(codes::RAW, HashCode::Sha2_256, b"x").unwrap();
        let options = FetchOptions::default();
        options.cancel.cancel();

        assert!(matches!(
            store.fetch(&cid, &options).await,
            Err(StoreError::Cancelled)
        ));
    }

    #[test]
    fn test_remove() {
        let store = MemoryBlockStore::new();
        let cid = store.put_block(codes::RAW, HashCode::Blake3, b"x").unwrap();
        assert!(store.remove(&cid));
        assert!(!store.remove(&cid));
    }
}
