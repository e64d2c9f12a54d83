//! Codec registry: maps multicodec codes to codec implementations.
//!
//! The table is seeded once, at construction, with the built-in codecs plus
//! any codecs handed to the builder. A later registration for the same code
//! replaces the earlier one. Codes missing from the table are offered to an
//! optional [`CodecLoader`]; whatever it returns is cached.
//!
//! Lookups that hit the table never suspend. Two concurrent misses for the
//! same code may both invoke the loader; the last insert wins, which is fine
//! because a code always maps to an equivalent codec.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::codec::Codec;
use crate::codecs;
use crate::error::{CoreError, Result};

/// Supplies codecs that were not registered up front.
#[async_trait]
pub trait CodecLoader: Send + Sync {
    /// Produce a codec for `code`.
    ///
    /// Any error is reported to callers as [`CoreError::CodecNotFound`].
    async fn load(&self, code: u64) -> Result<Arc<dyn Codec>>;
}

/// Code-to-codec lookup table.
pub struct CodecRegistry {
    codecs: RwLock<HashMap<u64, Arc<dyn Codec>>>,
    loader: Option<Arc<dyn CodecLoader>>,
}

impl CodecRegistry {
    /// A registry holding the built-in codecs and no loader.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::new()
    }

    /// Synchronous table lookup. Never consults the loader.
    pub fn get(&self, code: u64) -> Option<Arc<dyn Codec>> {
        self.codecs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&code)
            .cloned()
    }

    /// Look up a codec, falling back to the loader on a miss.
    pub async fn get_codec(&self, code: u64) -> Result<Arc<dyn Codec>> {
        if let Some(codec) = self.get(code) {
            return Ok(codec);
        }

        let loader = self.loader.as_ref().ok_or(CoreError::CodecNotFound(code))?;

        tracing::debug!("loading codec 0x{:x} on demand", code);
        let codec = match loader.load(code).await {
            Ok(codec) => codec,
            Err(e) => {
                tracing::debug!("codec loader failed for 0x{:x}: {}", code, e);
                return Err(CoreError::CodecNotFound(code));
            }
        };

        if codec.code() != code {
            tracing::warn!(
                "codec loader returned code 0x{:x} when asked for 0x{:x}",
                codec.code(),
                code
            );
        }

        self.codecs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(code, Arc::clone(&codec));

        Ok(codec)
    }

    /// Whether a codec is currently in the table.
    pub fn contains(&self, code: u64) -> bool {
        self.codecs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&code)
    }

    /// All codes currently in the table, ascending.
    pub fn codes(&self) -> Vec<u64> {
        let mut codes: Vec<u64> = self
            .codecs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect();
        codes.sort_unstable();
        codes
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codes", &self.codes())
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

/// Builder for [`CodecRegistry`].
pub struct CodecRegistryBuilder {
    with_defaults: bool,
    extra: Vec<Arc<dyn Codec>>,
    loader: Option<Arc<dyn CodecLoader>>,
}

impl CodecRegistryBuilder {
    pub fn new() -> Self {
        Self {
            with_defaults: true,
            extra: Vec::new(),
            loader: None,
        }
    }

    /// Start from an empty table instead of the built-in codecs.
    pub fn without_defaults(mut self) -> Self {
        self.with_defaults = false;
        self
    }

    /// Register an additional codec. Replaces any earlier codec with the same code.
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.extra.push(codec);
        self
    }

    /// Install a loader for codes missing from the table.
    pub fn loader(mut self, loader: Arc<dyn CodecLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn build(self) -> CodecRegistry {
        let mut table: HashMap<u64, Arc<dyn Codec>> = HashMap::new();
        let seed = if self.with_defaults {
            codecs::defaults()
        } else {
            Vec::new()
        };

        for codec in seed.into_iter().chain(self.extra) {
            if let Some(previous) = table.insert(codec.code(), Arc::clone(&codec)) {
                tracing::debug!(
                    "codec 0x{:x}: {} replaced by {}",
                    codec.code(),
                    previous.name(),
                    codec.name()
                );
            }
        }

        CodecRegistry {
            codecs: RwLock::new(table),
            loader: self.loader,
        }
    }
}

impl Default for CodecRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
