//! The Dag: read and write IPLD nodes in a block store.
//!
//! Wraps a [`BlockStore`] and a [`PathResolver`] into the usual `put` / `get` /
//! `resolve` / `tree` operations.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use cid::Cid;
use dagwalk_core::ident::codes;
use dagwalk_core::{compute_cid, CodecRegistry, CoreError, DagPath, HashCode, IpfsPath, Ipld};
use dagwalk_store::{BlockFetcher, BlockStore, VerifyingFetcher};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::resolver::{PathResolver, ResolutionStep, ResolveOptions};

/// Configuration for a [`Dag`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DagConfig {
    /// Per-fetch timeout in milliseconds, used when a call sets none.
    pub timeout_ms: Option<u64>,
    /// Check every fetched block against its CID.
    pub verify_blocks: bool,
    /// Multicodec code used by `put` when the caller names none.
    pub default_codec: u64,
    /// Multihash code used by `put` when the caller names none.
    pub default_hash: u64,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            verify_blocks: true,
            default_codec: codes::DAG_CBOR,
            default_hash: HashCode::Sha2_256.code(),
        }
    }
}

/// Options for [`Dag::put`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PutOptions {
    pub codec: Option<u64>,
    pub hash: Option<HashCode>,
}

/// Options for [`Dag::get`], [`Dag::resolve`] and [`Dag::tree`].
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Stop after the first step instead of resolving the whole path.
    pub local_resolve: bool,
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl GetOptions {
    pub fn local() -> Self {
        Self {
            local_resolve: true,
            ..Self::default()
        }
    }
}

/// Result of [`Dag::resolve`]: the deepest block reached and the path left
/// to walk inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveResult {
    pub cid: Cid,
    pub remainder_path: String,
}

/// IPLD node access over a block store.
pub struct Dag<S> {
    store: Arc<S>,
    resolver: PathResolver<dyn BlockFetcher>,
    config: DagConfig,
}

impl<S: BlockStore + 'static> Dag<S> {
    /// Create a Dag with the default codecs.
    pub fn new(store: S, config: DagConfig) -> Self {
        Self::with_registry(store, Arc::new(CodecRegistry::new()), config)
    }

    /// Create a Dag that decodes with `registry`.
    pub fn with_registry(store: S, registry: Arc<CodecRegistry>, config: DagConfig) -> Self {
        let store = Arc::new(store);
        let fetcher: Arc<dyn BlockFetcher> = if config.verify_blocks {
            Arc::new(VerifyingFetcher::new(Arc::clone(&store)))
        } else {
            store.clone()
        };
        Self {
            store,
            resolver: PathResolver::new(fetcher, registry),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DagConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PathResolver<dyn BlockFetcher> {
        &self.resolver
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        self.resolver.registry()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode `value`, store it and return its CID.
    pub async fn put(&self, value: &Ipld, options: PutOptions) -> Result<Cid> {
        let code = options.codec.unwrap_or(self.config.default_codec);
        let hash = match options.hash {
            Some(hash) => hash,
            None => HashCode::from_code(self.config.default_hash)
                .ok_or(CoreError::UnsupportedHash(self.config.default_hash))?,
        };

        let codec = self.registry().get_codec(code).await?;
        let bytes = codec.encode(value)?;
        let cid = compute_cid(code, hash, &bytes)?;
        let new = self.store.put(cid, Bytes::from(bytes)).await?;
        tracing::debug!("put {} ({}, new: {})", cid, codec.name(), new);
        Ok(cid)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve `path` under `cid` and return the step reached.
    pub async fn get(&self, cid: Cid, path: &str, options: &GetOptions) -> Result<ResolutionStep> {
        let path = DagPath::parse(path)?;
        self.step(cid, path, options).await
    }

    /// [`Dag::get`] taking a single `/ipfs/<cid>/...` string.
    pub async fn get_path(&self, path: &str, options: &GetOptions) -> Result<ResolutionStep> {
        let IpfsPath { root, path } = IpfsPath::parse(path)?;
        self.step(root, path, options).await
    }

    /// Find the deepest block `path` reaches and the path left inside it.
    pub async fn resolve(&self, cid: Cid, path: &str, options: &GetOptions) -> Result<ResolveResult> {
        let path = DagPath::parse(path)?;
        let mut last = ResolveResult {
            cid,
            remainder_path: path.to_string(),
        };

        let mut steps = self.resolver.steps(cid, path, self.resolve_options(options));
        while let Some(step) = steps.next_step().await {
            let step = step?;
            if step.remainder_path.is_empty() {
                // a final link was followed into its block; the block's own
                // value may be a link, which is not walked
                if step.cid != last.cid {
                    last = ResolveResult {
                        cid: step.cid,
                        remainder_path: String::new(),
                    };
                }
            } else if let Ipld::Link(link) = step.value {
                last = ResolveResult {
                    cid: link,
                    remainder_path: step.remainder_path,
                };
            }
        }
        Ok(last)
    }

    /// List every path inside the node at `path`.
    ///
    /// With `recursive`, links are followed and the paths of each linked block
    /// are listed under the link's path. Blocks are visited breadth-first.
    pub async fn tree(
        &self,
        cid: Cid,
        path: &str,
        recursive: bool,
        options: &GetOptions,
    ) -> Result<Vec<String>> {
        let full = GetOptions {
            local_resolve: false,
            ..options.clone()
        };
        let start = self.get(cid, path, &full).await?;
        let resolve_options = self.resolve_options(options);

        let mut out = Vec::new();
        let mut pending = VecDeque::from([(String::new(), start.value)]);
        while let Some((prefix, value)) = pending.pop_front() {
            for (path, child) in value.entries() {
                let path = if prefix.is_empty() {
                    path
                } else {
                    format!("{}/{}", prefix, path)
                };
                if recursive {
                    if let Ipld::Link(link) = child {
                        let block = self.resolver.resolve_full(*link, "", &resolve_options).await?;
                        pending.push_back((path.clone(), block.value));
                    }
                }
                out.push(path);
            }
        }
        Ok(out)
    }

    async fn step(&self, cid: Cid, path: DagPath, options: &GetOptions) -> Result<ResolutionStep> {
        let steps = self.resolver.steps(cid, path, self.resolve_options(options));
        if options.local_resolve {
            steps.first().await
        } else {
            steps.last().await
        }
    }

    fn resolve_options(&self, options: &GetOptions) -> ResolveOptions {
        let timeout = options
            .timeout
            .or_else(|| self.config.timeout_ms.map(Duration::from_millis));
        ResolveOptions {
            timeout,
            cancel: options.cancel.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DagError;
    use dagwalk_store::{MemoryBlockStore, StoreError};

    fn dag() -> Dag<MemoryBlockStore> {
        Dag::new(MemoryBlockStore::new(), DagConfig::default())
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dag = dag();
        let value: Ipld = [("hello", "world")].into_iter().collect();

        let cid = dag.put(&value, PutOptions::default()).await.unwrap();
        assert_eq!(cid.codec(), codes::DAG_CBOR);
        assert_eq!(cid.hash().code(), HashCode::Sha2_256.code());

        let step = dag.get(cid, "", &GetOptions::default()).await.unwrap();
        assert_eq!(step.value, value);
    }

    #[tokio::test]
    async fn test_put_is_deterministic() {
        let dag = dag();
        let value: Ipld = [("b", 2i64), ("a", 1i64)].into_iter().collect();

        let first = dag.put(&value, PutOptions::default()).await.unwrap();
        let second = dag.put(&value, PutOptions::default()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(dag.store().len(), 1);
    }

    #[tokio::test]
    async fn test_put_with_codec_and_hash() {
        let dag = dag();
        let options = PutOptions {
            codec: Some(codes::DAG_JSON),
            hash: Some(HashCode::Blake3),
        };
        let cid = dag.put(&Ipld::from("x"), options).await.unwrap();
        assert_eq!(cid.codec(), codes::DAG_JSON);
        assert_eq!(cid.hash().code(), HashCode::Blake3.code());
    }

    #[tokio::test]
    async fn test_put_unknown_codec() {
        let dag = dag();
        let options = PutOptions {
            codec: Some(0x9999),
            hash: None,
        };
        let err = dag.put(&Ipld::Null, options).await.unwrap_err();
        assert!(matches!(err, DagError::CodecNotFound(0x9999)));
    }

    #[tokio::test]
    async fn test_get_local_and_full() {
        let dag = dag();
        let leaf = dag
            .put(&[("y", 7i64)].into_iter().collect(), PutOptions::default())
            .await
            .unwrap();
        let root = dag
            .put(&[("x", Ipld::Link(leaf))].into_iter().collect(), PutOptions::default())
            .await
            .unwrap();

        let local = dag.get(root, "x/y", &GetOptions::local()).await.unwrap();
        assert_eq!(local.value, Ipld::Link(leaf));
        assert_eq!(local.remainder_path, "y");

        let full = dag.get(root, "x/y", &GetOptions::default()).await.unwrap();
        assert_eq!(full.value, Ipld::from(7i64));

        let via_path = dag
            .get_path(&format!("/ipfs/{}/x/y", root), &GetOptions::default())
            .await
            .unwrap();
        assert_eq!(via_path, full);
    }

    #[tokio::test]
    async fn test_resolve_reports_deepest_block() {
        let dag = dag();
        let leaf = dag
            .put(&[("y", Ipld::from_iter([("z", 1i64)]))].into_iter().collect(), PutOptions::default())
            .await
            .unwrap();
        let root = dag
            .put(
                &[("x", Ipld::Link(leaf)), ("n", Ipld::from_iter([("m", 2i64)]))]
                    .into_iter()
                    .collect(),
                PutOptions::default(),
            )
            .await
            .unwrap();
        let options = GetOptions::default();

        let r = dag.resolve(root, "x/y/z", &options).await.unwrap();
        assert_eq!(r, ResolveResult { cid: leaf, remainder_path: "y/z".into() });

        let r = dag.resolve(root, "x", &options).await.unwrap();
        assert_eq!(r, ResolveResult { cid: leaf, remainder_path: String::new() });

        let r = dag.resolve(root, "n/m", &options).await.unwrap();
        assert_eq!(r, ResolveResult { cid: root, remainder_path: "n/m".into() });

        let r = dag.resolve(root, "", &options).await.unwrap();
        assert_eq!(r, ResolveResult { cid: root, remainder_path: String::new() });

        assert!(matches!(
            dag.resolve(root, "x/nope", &options).await,
            Err(DagError::NoLink { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_stops_at_block_whose_root_is_a_link() {
        let dag = dag();
        // never stored
        let missing = compute_cid(codes::RAW, HashCode::Sha2_256, b"elsewhere").unwrap();
        let target = dag.put(&Ipld::Link(missing), PutOptions::default()).await.unwrap();
        let root = dag
            .put(&[("x", Ipld::Link(target))].into_iter().collect(), PutOptions::default())
            .await
            .unwrap();

        let r = dag.resolve(root, "x", &GetOptions::default()).await.unwrap();
        assert_eq!(r, ResolveResult { cid: target, remainder_path: String::new() });

        // the same holds for a link-valued block reached as the root
        let r = dag.resolve(target, "", &GetOptions::default()).await.unwrap();
        assert_eq!(r, ResolveResult { cid: target, remainder_path: String::new() });
    }

    #[tokio::test]
    async fn test_tree() {
        let dag = dag();
        let leaf = dag
            .put(&[("y", Ipld::List(vec![Ipld::Null]))].into_iter().collect(), PutOptions::default())
            .await
            .unwrap();
        let root = dag
            .put(
                &[("a", Ipld::from(1i64)), ("x", Ipld::Link(leaf))].into_iter().collect(),
                PutOptions::default(),
            )
            .await
            .unwrap();
        let options = GetOptions::default();

        let flat = dag.tree(root, "", false, &options).await.unwrap();
        assert_eq!(flat, vec!["a", "x"]);

        let deep = dag.tree(root, "", true, &options).await.unwrap();
        assert_eq!(deep, vec!["a", "x", "x/y", "x/y/0"]);

        let sub = dag.tree(root, "x", false, &options).await.unwrap();
        assert_eq!(sub, vec!["y", "y/0"]);
    }

    #[tokio::test]
    async fn test_verification_rejects_tampered_block() {
        let dag = dag();
        let cid = compute_cid(codes::RAW, HashCode::Sha2_256, b"real").unwrap();
        dag.store().insert(cid, Bytes::from_static(b"fake"));

        let err = dag.get(cid, "", &GetOptions::default()).await.unwrap_err();
        assert!(matches!(err, DagError::Store(StoreError::HashMismatch(_))));

        let trusting = Dag::new(
            MemoryBlockStore::new(),
            DagConfig {
                verify_blocks: false,
                ..DagConfig::default()
            },
        );
        trusting.store().insert(cid, Bytes::from_static(b"fake"));
        let step = trusting.get(cid, "", &GetOptions::default()).await.unwrap();
        assert_eq!(step.value, Ipld::Bytes(b"fake".to_vec()));
    }

    #[test]
    fn test_config_serde() {
        let config: DagConfig = serde_json::from_str(r#"{"timeout_ms": 250}"#).unwrap();
        assert_eq!(config.timeout_ms, Some(250));
        assert!(config.verify_blocks);
        assert_eq!(config.default_codec, codes::DAG_CBOR);

        let json = serde_json::to_string(&config).unwrap();
        let back: DagConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
