//! # dagwalk
//!
//! Path resolution over merkle-DAGs whose blocks may each use a different
//! codec.
//!
//! ## Overview
//!
//! A path such as `/ipfs/<cid>/a/b/c` names a value somewhere below a root
//! block. Resolving it means decoding the root with the codec its CID names,
//! walking segments through the decoded value, and crossing into a new block
//! every time a segment lands on a link. Each block along the way may be
//! DAG-PB, DAG-CBOR, DAG-JSON or anything else registered in the
//! [`CodecRegistry`].
//!
//! - **Local resolution** stops at the first step: at most one link is
//!   crossed, and only when it is the final segment.
//! - **Full resolution** follows links until the path is exhausted.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dagwalk::{Dag, DagConfig, GetOptions, Ipld, PutOptions};
//! use dagwalk::store::MemoryBlockStore;
//!
//! async fn example() {
//!     let dag = Dag::new(MemoryBlockStore::new(), DagConfig::default());
//!
//!     let leaf = dag
//!         .put(&[("c", "value")].into_iter().collect(), PutOptions::default())
//!         .await
//!         .unwrap();
//!     let root = dag
//!         .put(&[("b", Ipld::Link(leaf))].into_iter().collect(), PutOptions::default())
//!         .await
//!         .unwrap();
//!
//!     let step = dag.get(root, "b/c", &GetOptions::default()).await.unwrap();
//!     assert_eq!(step.value, Ipld::from("value"));
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `dagwalk::core` - Data model, codecs, registry, paths
//! - `dagwalk::store` - Block fetcher and store traits, in-memory store

pub mod dag;
pub mod error;
pub mod resolver;

pub use dagwalk_core as core;
pub use dagwalk_store as store;

pub use dag::{Dag, DagConfig, GetOptions, PutOptions, ResolveResult};
pub use error::{DagError, Result};
pub use resolver::{PathResolver, Resolution, ResolutionStep, ResolveOptions};

pub use dagwalk_core::{Cid, Codec, CodecLoader, CodecRegistry, DagPath, HashCode, IpfsPath, Ipld};
pub use dagwalk_store::{BlockFetcher, BlockStore};
