//! # dagwalk Core
//!
//! Pure primitives for walking merkle-DAGs: the IPLD value model, CID helpers,
//! path parsing, the [`Codec`] trait with its built-in implementations, and the
//! [`CodecRegistry`] that dispatches on a CID's codec code.
//!
//! This crate does no block I/O. The only suspension point is the optional
//! [`CodecLoader`] consulted when the registry misses.
//!
//! ## Key Types
//!
//! - [`Ipld`] - Decoded block value; links are the [`Ipld::Link`] variant
//! - [`Codec`] - Encode/decode pair identified by a multicodec code
//! - [`CodecRegistry`] - Code-to-codec table with on-demand loading
//! - [`DagPath`] / [`IpfsPath`] - Parsed resolution paths
//!
//! ## Codecs
//!
//! DAG-PB, DAG-CBOR, DAG-JSON, JSON, raw and identity ship by default. See the
//! [`codecs`] module.

pub mod codec;
pub mod codecs;
pub mod error;
pub mod ident;
pub mod ipld;
pub mod path;
pub mod registry;

pub use codec::Codec;
pub use codecs::{DagCbor, DagJson, DagPb, Identity, Json, Raw};
pub use error::{CoreError, Result};
pub use ident::{codec_name, compute_cid, verify_cid, HashCode};
pub use ipld::Ipld;
pub use path::{DagPath, IpfsPath};
pub use registry::{CodecLoader, CodecRegistry, CodecRegistryBuilder};

/// Re-export of the CID type used throughout the workspace.
pub use cid::Cid;
