//! # dagwalk Testkit
//!
//! Testing utilities for dagwalk.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known blocks with their expected CIDs
//! - **Generators**: Proptest strategies producing IPLD values each codec can carry
//! - **Fixtures**: A memory store plus helpers for building multi-block DAGs
//!
//! ## Golden Vectors
//!
//! ```rust
//! use dagwalk_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, cid) in verify_all_vectors() {
//!     assert!(ok, "{}: {}", name, cid);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use dagwalk_testkit::generators::cbor_value;
//!
//! proptest! {
//!     #[test]
//!     fn encoding_is_deterministic(value in cbor_value()) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use dagwalk_testkit::fixtures::DagFixture;
//!
//! let fixture = DagFixture::new();
//! let chain = fixture.cross_codec_chain();
//! assert_eq!(fixture.store.len(), 3);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{CrossCodecChain, DagFixture};
pub use generators::{cbor_value, json_value, pb_node};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
