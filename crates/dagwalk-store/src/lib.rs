//! # dagwalk Store
//!
//! Block access for dagwalk. The resolver only ever reads blocks, through the
//! [`BlockFetcher`] trait; writers additionally use [`BlockStore`].
//!
//! ## Key Types
//!
//! - [`BlockFetcher`] - Async `fetch(cid, options) -> bytes`
//! - [`BlockStore`] - A fetcher that also accepts new blocks
//! - [`FetchOptions`] - Per-call timeout and cancellation token
//! - [`MemoryBlockStore`] - In-memory store for tests and embedders
//! - [`VerifyingFetcher`] - Wrapper that checks each block against its CID
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dagwalk_core::{ident::codes, HashCode};
//! use dagwalk_store::{BlockFetcher, FetchOptions, MemoryBlockStore};
//!
//! async fn example() {
//!     let store = MemoryBlockStore::new();
//!     let cid = store.put_block(codes::RAW, HashCode::Sha2_256, b"hello").unwrap();
//!     let bytes = store.fetch(&cid, &FetchOptions::default()).await.unwrap();
//!     assert_eq!(&bytes[..], b"hello");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Blocks are immutable**: putting the same CID twice is a no-op
//! - **Identity CIDs** are served from the CID itself without a lookup
//! - **Verification is opt-in**: wrap any fetcher in [`VerifyingFetcher`]

pub mod error;
pub mod memory;
pub mod traits;
pub mod verify;

pub use error::{Result, StoreError};
pub use memory::MemoryBlockStore;
pub use traits::{BlockFetcher, BlockStore, FetchOptions};
pub use verify::VerifyingFetcher;
