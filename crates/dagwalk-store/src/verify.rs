//! Digest-on-read verification.
//!
//! The resolver trusts whatever bytes its fetcher returns. Wrapping a fetcher
//! in [`VerifyingFetcher`] closes that gap: every block is re-hashed with the
//! CID's own hash function before it is handed on.

use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;
use dagwalk_core::verify_cid;

use crate::error::{Result, StoreError};
use crate::traits::{BlockFetcher, BlockStore, FetchOptions};

/// A fetcher that rejects blocks whose bytes do not match their CID.
pub struct VerifyingFetcher<F> {
    inner: F,
}

impl<F> VerifyingFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

#[async_trait]
impl<F: BlockFetcher> BlockFetcher for VerifyingFetcher<F> {
    async fn fetch(&self, cid: &Cid, options: &FetchOptions) -> Result<Bytes> {
        let bytes = self.inner.fetch(cid, options).await?;
        if !verify_cid(cid, &bytes)? {
            tracing::warn!("block {} failed digest verification", cid);
            return Err(StoreError::HashMismatch(*cid));
        }
        Ok(bytes)
    }
}

#[async_trait]
impl<S: BlockStore> BlockStore for VerifyingFetcher<S> {
    async fn put(&self, cid: Cid, bytes: Bytes) -> Result<bool> {
        if !verify_cid(&cid, &bytes)? {
            return Err(StoreError::HashMismatch(cid));
        }
        self.inner.put(cid, bytes).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool> {
        self.inner.has(cid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBlockStore;
    use dagwalk_core::ident::codes;
    use dagwalk_core::{compute_cid, CoreError, HashCode};

    #[tokio::test]
    async fn test_valid_block_passes() {
        let store = MemoryBlockStore::new();
        let cid = store.put_block(codes::RAW, HashCode::Blake3, b"ok").unwrap();
        let fetcher = VerifyingFetcher::new(store);

        let bytes = fetcher.fetch(&cid, &FetchOptions::default()).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_tampered_block_rejected() {
        let store = MemoryBlockStore::new();
        let cid = compute_cid(codes::RAW, HashCode::Sha2_256, b"original").unwrap();
        store.insert(cid, Bytes::from_static(b"tampered"));
        let fetcher = VerifyingFetcher::new(store);

        let err = fetcher.fetch(&cid, &FetchOptions::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch(c) if c == cid));
    }

    #[tokio::test]
    async fn test_put_checks_digest() {
        let fetcher = VerifyingFetcher::new(MemoryBlockStore::new());
        let cid = compute_cid(codes::RAW, HashCode::Sha2_256, b"a").unwrap();

        assert!(fetcher.put(cid, Bytes::from_static(b"a")).await.unwrap());
        assert!(matches!(
            fetcher.put(cid, Bytes::from_static(b"b")).await,
            Err(StoreError::HashMismatch(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_hash() {
        use cid::multihash::Multihash;

        let store = MemoryBlockStore::new();
        // sha2-512 is not a supported verification hash
        let mh = Multihash::<64>::wrap(0x13, &[0u8; 64]).unwrap();
        let cid = Cid::new_v1(codes::RAW, mh);
        store.insert(cid, Bytes::from_static(b"x"));
        let fetcher = VerifyingFetcher::new(store);

        let err = fetcher.fetch(&cid, &FetchOptions::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::UnsupportedHash(0x13))));
    }
}
