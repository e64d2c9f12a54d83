//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use bytes::Bytes;
use cid::Cid;
use dagwalk::{Dag, DagConfig, PathResolver};
use dagwalk_core::codecs::dag_pb::{PbLink, PbNode};
use dagwalk_core::ident::codes;
use dagwalk_core::{compute_cid, CodecRegistry, HashCode, Ipld};
use dagwalk_store::MemoryBlockStore;

/// A memory store and the registry used to encode blocks into it.
pub struct DagFixture {
    pub store: Arc<MemoryBlockStore>,
    pub registry: Arc<CodecRegistry>,
}

/// Three blocks, three codecs: `root/a/b/c` crosses DAG-PB, DAG-CBOR and DAG-JSON.
///
/// ```text
/// root (dag-pb)  --"a"-->  middle (dag-cbor) {"b": link}
///                          --"b"-->  leaf (dag-json) {"c": "leaf value"}
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CrossCodecChain {
    pub root: Cid,
    pub middle: Cid,
    pub leaf: Cid,
}

impl DagFixture {
    /// Create a fixture with the default codecs.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(CodecRegistry::new()))
    }

    pub fn with_registry(registry: Arc<CodecRegistry>) -> Self {
        Self {
            store: Arc::new(MemoryBlockStore::new()),
            registry,
        }
    }

    /// Encode `value` with `codec`, store it under a sha2-256 CID.
    ///
    /// Panics if the codec is unknown or rejects the value.
    pub fn put(&self, codec: u64, value: &Ipld) -> Cid {
        let bytes = self
            .registry
            .get(codec)
            .unwrap_or_else(|| panic!("codec 0x{:x} not registered", codec))
            .encode(value)
            .unwrap_or_else(|e| panic!("encode failed: {}", e));
        self.put_bytes(codec, &bytes)
    }

    pub fn put_cbor(&self, value: &Ipld) -> Cid {
        self.put(codes::DAG_CBOR, value)
    }

    /// Store already-encoded bytes.
    pub fn put_bytes(&self, codec: u64, bytes: &[u8]) -> Cid {
        self.store
            .put_block(codec, HashCode::Sha2_256, bytes)
            .unwrap_or_else(|e| panic!("put failed: {}", e))
    }

    /// Store a DAG-PB node with the given named links and data.
    pub fn put_pb(&self, links: &[(&str, Cid)], data: Option<&[u8]>) -> Cid {
        let node = PbNode {
            links: links
                .iter()
                .map(|(name, hash)| PbLink {
                    hash: *hash,
                    name: Some(name.to_string()),
                    tsize: None,
                })
                .collect(),
            data: data.map(<[u8]>::to_vec),
        };
        self.put_bytes(codes::DAG_PB, &node.to_bytes())
    }

    /// Store `stored` under the CID of `claimed`.
    pub fn put_tampered(&self, codec: u64, claimed: &[u8], stored: &[u8]) -> Cid {
        let cid = compute_cid(codec, HashCode::Sha2_256, claimed)
            .unwrap_or_else(|e| panic!("cid failed: {}", e));
        self.store.insert(cid, Bytes::copy_from_slice(stored));
        cid
    }

    /// A CID whose block was never stored.
    pub fn absent(&self, codec: u64) -> Cid {
        compute_cid(codec, HashCode::Sha2_256, b"never stored")
            .unwrap_or_else(|e| panic!("cid failed: {}", e))
    }

    /// Build the [`CrossCodecChain`].
    pub fn cross_codec_chain(&self) -> CrossCodecChain {
        let leaf = self.put(
            codes::DAG_JSON,
            &[("c", "leaf value")].into_iter().collect(),
        );
        let middle = self.put_cbor(&[("b", Ipld::Link(leaf))].into_iter().collect());
        let root = self.put_pb(&[("a", middle)], None);
        CrossCodecChain { root, middle, leaf }
    }

    /// A linear chain of `depth` DAG-CBOR blocks, each linking to the next
    /// under `next`. Returns the CIDs root first.
    pub fn linked_list(&self, depth: usize) -> Vec<Cid> {
        let mut cids = Vec::with_capacity(depth);
        let mut next: Option<Cid> = None;
        for i in (0..depth).rev() {
            let mut entries = vec![("index", Ipld::from(i as u64))];
            if let Some(cid) = next {
                entries.push(("next", Ipld::Link(cid)));
            }
            let cid = self.put_cbor(&entries.into_iter().collect());
            cids.push(cid);
            next = Some(cid);
        }
        cids.reverse();
        cids
    }

    /// A resolver reading straight from the store.
    pub fn resolver(&self) -> PathResolver<MemoryBlockStore> {
        PathResolver::new(Arc::clone(&self.store), Arc::clone(&self.registry))
    }

    /// A [`Dag`] sharing this fixture's store and registry.
    pub fn dag(&self, config: DagConfig) -> Dag<Arc<MemoryBlockStore>> {
        Dag::with_registry(Arc::clone(&self.store), Arc::clone(&self.registry), config)
    }
}

impl Default for DagFixture {
    fn default() -> Self {
        Self::new()
    }
}
