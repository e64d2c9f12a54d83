//! Path resolution over blocks of mixed codecs.
//!
//! A [`Resolution`] is a lazy, pull-based sequence of [`ResolutionStep`]s.
//! Each pull either walks one segment inside an already-decoded value or, when
//! the previous step ended on a link, fetches and decodes the linked block and
//! then walks one segment inside it. Nothing is fetched until it is pulled, so
//! a consumer that stops after the first step pays for at most one block.
//!
//! - [`PathResolver::resolve_local`] returns the first step.
//! - [`PathResolver::resolve_full`] drains the sequence and returns the last.
//!
//! ```text
//!   Start ──load root──▶ Walking ──segment──▶ Walking ... ──▶ Done
//!                           │                    ▲
//!                           └─link, more path──▶ Follow ──load──┘
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use cid::Cid;
use dagwalk_core::{Codec, CodecRegistry, DagPath, Ipld};
use dagwalk_store::{BlockFetcher, FetchOptions};

use crate::error::{DagError, Result};

/// Per-call resolution options: cancellation token and fetch timeout.
pub type ResolveOptions = FetchOptions;

/// One step of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionStep {
    /// The value reached. A link here means resolution paused at a block
    /// boundary with more path left to walk.
    pub value: Ipld,
    /// Segments not yet consumed, joined with `/`.
    pub remainder_path: String,
    /// The block `value` was read out of. For a link followed by the final
    /// segment, this is the linked block.
    pub cid: Cid,
}

impl ResolutionStep {
    pub fn is_link(&self) -> bool {
        self.value.is_link()
    }
}

/// A decoded block.
struct Node {
    cid: Cid,
    value: Ipld,
    codec: Arc<dyn Codec>,
}

/// Resolves paths by fetching blocks and dispatching on each CID's codec.
///
/// Holds no per-call state and caches nothing between calls.
pub struct PathResolver<F: ?Sized> {
    fetcher: Arc<F>,
    registry: Arc<CodecRegistry>,
}

impl<F: ?Sized> Clone for PathResolver<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<F: BlockFetcher + ?Sized> PathResolver<F> {
    pub fn new(fetcher: Arc<F>, registry: Arc<CodecRegistry>) -> Self {
        Self { fetcher, registry }
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    /// Start a lazy resolution of `path` from `root`.
    pub fn steps(&self, root: Cid, path: DagPath, options: ResolveOptions) -> Resolution<'_, F> {
        Resolution {
            resolver: self,
            root,
            segments: path.into_queue(),
            options,
            state: State::Start,
        }
    }

    /// Resolve at most one segment past the root: the first step.
    pub async fn resolve_local(
        &self,
        root: Cid,
        path: &str,
        options: &ResolveOptions,
    ) -> Result<ResolutionStep> {
        let path = DagPath::parse(path)?;
        self.steps(root, path, options.clone()).first().await
    }

    /// Resolve the whole path: the last step.
    pub async fn resolve_full(
        &self,
        root: Cid,
        path: &str,
        options: &ResolveOptions,
    ) -> Result<ResolutionStep> {
        let path = DagPath::parse(path)?;
        self.steps(root, path, options.clone()).last().await
    }

    /// Fetch and decode one block.
    ///
    /// The codec is looked up before the fetch, so an unknown codec fails
    /// without touching the fetcher.
    async fn load(&self, cid: &Cid, options: &ResolveOptions) -> Result<Node> {
        let codec = self
            .guarded(cid, options, async {
                self.registry.get_codec(cid.codec()).await.map_err(DagError::from)
            })
            .await?;
        let bytes = self
            .guarded(cid, options, async {
                self.fetcher.fetch(cid, options).await.map_err(DagError::from)
            })
            .await?;
        let value = codec.decode(&bytes)?;
        tracing::debug!("decoded {} ({}, {} bytes)", cid, codec.name(), bytes.len());
        Ok(Node {
            cid: *cid,
            value,
            codec,
        })
    }

    /// Run one suspension point of loading `cid` (codec load or fetch), raced
    /// against cancellation and bounded by the timeout.
    async fn guarded<T>(
        &self,
        cid: &Cid,
        options: &ResolveOptions,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        if options.is_cancelled() {
            return Err(DagError::Cancelled);
        }

        let bounded = async {
            match options.timeout {
                Some(after) => match tokio::time::timeout(after, work).await {
                    Ok(result) => result,
                    Err(_) => Err(DagError::Timeout(after)),
                },
                None => work.await,
            }
        };

        tokio::select! {
            biased;
            _ = options.cancel.cancelled() => {
                tracing::debug!("load of {} cancelled", cid);
                Err(DagError::Cancelled)
            }
            result = bounded => result,
        }
    }
}

enum State {
    /// Root not loaded yet.
    Start,
    /// Walking inside a decoded value. `codec` is set only at a block root.
    Walking {
        cid: Cid,
        value: Ipld,
        codec: Option<Arc<dyn Codec>>,
    },
    /// The last step ended on a link that must be loaded before walking on.
    Follow { link: Cid },
    Done,
}

/// A lazy, finite, forward-only sequence of resolution steps.
pub struct Resolution<'r, F: ?Sized> {
    resolver: &'r PathResolver<F>,
    root: Cid,
    segments: VecDeque<String>,
    options: ResolveOptions,
    state: State,
}

impl<F: BlockFetcher + ?Sized> Resolution<'_, F> {
    /// Pull the next step. `None` once the sequence is exhausted.
    ///
    /// After an error the sequence is exhausted.
    pub async fn next_step(&mut self) -> Option<Result<ResolutionStep>> {
        match self.advance().await {
            Ok(step) => step.map(Ok),
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }

    /// The first step, or `NotFound` if there is none.
    pub async fn first(mut self) -> Result<ResolutionStep> {
        match self.next_step().await {
            Some(step) => step,
            None => Err(self.empty()),
        }
    }

    /// Drain the sequence and return the last step, or `NotFound` if there is none.
    pub async fn last(mut self) -> Result<ResolutionStep> {
        let mut last = None;
        while let Some(step) = self.next_step().await {
            last = Some(step?);
        }
        last.ok_or_else(|| self.empty())
    }

    /// Drain the sequence into a vector.
    pub async fn collect_steps(mut self) -> Result<Vec<ResolutionStep>> {
        let mut steps = Vec::new();
        while let Some(step) = self.next_step().await {
            steps.push(step?);
        }
        Ok(steps)
    }

    fn empty(&self) -> DagError {
        DagError::NotFound(format!("no resolution steps from {}", self.root))
    }

    fn remainder(&self) -> String {
        self.segments
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }

    async fn advance(&mut self) -> Result<Option<ResolutionStep>> {
        let (cid, value, codec) = match std::mem::replace(&mut self.state, State::Done) {
            State::Done => return Ok(None),
            State::Start => {
                let node = self.resolver.load(&self.root, &self.options).await?;
                if self.segments.is_empty() {
                    return Ok(Some(ResolutionStep {
                        value: node.value,
                        remainder_path: String::new(),
                        cid: node.cid,
                    }));
                }
                (node.cid, node.value, Some(node.codec))
            }
            State::Follow { link } => {
                let node = self.resolver.load(&link, &self.options).await?;
                (node.cid, node.value, Some(node.codec))
            }
            State::Walking { cid, value, codec } => (cid, value, codec),
        };

        let Some(segment) = self.segments.pop_front() else {
            return Ok(None);
        };

        let found = match &codec {
            Some(codec) => codec.resolve_segment(&value, &segment),
            None => value.get(&segment),
        };
        let found = match found {
            Some(found) => found.clone(),
            None => {
                tracing::trace!("no {:?} in {} value of {}", segment, value.kind(), cid);
                return Err(DagError::NoLink { segment, cid });
            }
        };
        tracing::trace!("walked {:?} in {}", segment, cid);

        let last_segment = self.segments.is_empty();
        let step = match found {
            Ipld::Link(link) if last_segment => {
                let node = self.resolver.load(&link, &self.options).await?;
                ResolutionStep {
                    value: node.value,
                    remainder_path: String::new(),
                    cid: node.cid,
                }
            }
            Ipld::Link(link) => {
                self.state = State::Follow { link };
                ResolutionStep {
                    value: Ipld::Link(link),
                    remainder_path: self.remainder(),
                    cid,
                }
            }
            value if last_segment => ResolutionStep {
                value,
                remainder_path: String::new(),
                cid,
            },
            value => {
                self.state = State::Walking {
                    cid,
                    value: value.clone(),
                    codec: None,
                };
                ResolutionStep {
                    value,
                    remainder_path: self.remainder(),
                    cid,
                }
            }
        };

        Ok(Some(step))
    }
}
