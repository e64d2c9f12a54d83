//! Block access traits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Per-call parameters passed through to the fetcher.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Upper bound on a single fetch.
    pub timeout: Option<Duration>,
    /// Fires when the caller abandons the operation.
    pub cancel: CancellationToken,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Read access to blocks by CID.
///
/// Implementations must return exactly the bytes the CID was computed over,
/// or [`StoreError::NotFound`](crate::StoreError::NotFound) if the block is
/// unknown. Transport failures are reported as other variants and passed
/// through the resolver untouched.
#[async_trait]
pub trait BlockFetcher: Send + Sync {
    async fn fetch(&self, cid: &Cid, options: &FetchOptions) -> Result<Bytes>;
}

/// A fetcher that also stores blocks.
#[async_trait]
pub trait BlockStore: BlockFetcher {
    /// Store a block under `cid`.
    ///
    /// Returns `true` if the block was new, `false` if it already existed.
    async fn put(&self, cid: Cid, bytes: Bytes) -> Result<bool>;

    /// Check whether a block exists.
    async fn has(&self, cid: &Cid) -> Result<bool>;
}

#[async_trait]
impl<F: BlockFetcher + ?Sized> BlockFetcher for Arc<F> {
    async fn fetch(&self, cid: &Cid, options: &FetchOptions) -> Result<Bytes> {
        (**self).fetch(cid, options).await
    }
}

#[async_trait]
impl<S: BlockStore + ?Sized> BlockStore for Arc<S> {
    async fn put(&self, cid: Cid, bytes: Bytes) -> Result<bool> {
        (**self).put(cid, bytes).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool> {
        (**self).has(cid).await
    }
}
