//! The codec trait.

use std::fmt;

use crate::error::Result;
use crate::ipld::Ipld;

/// An encode/decode pair for one block serialization format.
///
/// Codecs are stateless and identified by their multicodec code. For every
/// value a codec supports, `decode(&encode(v)?)? == v`.
pub trait Codec: Send + Sync + fmt::Debug {
    /// Multicodec code, as found in a CID's codec field.
    fn code(&self) -> u64;

    /// Human-readable name ("dag-cbor", "raw", ...).
    fn name(&self) -> &'static str;

    fn encode(&self, value: &Ipld) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<Ipld>;

    /// Look up `segment` on the root value of a block this codec decoded.
    ///
    /// Most formats path structurally. Formats with their own naming scheme
    /// (DAG-PB named links) override this; nested values below the block root
    /// always use [`Ipld::get`].
    fn resolve_segment<'a>(&self, node: &'a Ipld, segment: &str) -> Option<&'a Ipld> {
        node.get(segment)
    }
}
