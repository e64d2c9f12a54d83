//! Byte pass-through codecs.

use crate::codec::Codec;
use crate::error::{CoreError, Result};
use crate::ident::codes;
use crate::ipld::Ipld;

/// Raw binary blocks (`0x55`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

/// Identity codec (`0x00`): the block bytes are the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

fn encode_bytes(codec: &'static str, value: &Ipld) -> Result<Vec<u8>> {
    match value {
        Ipld::Bytes(bytes) => Ok(bytes.clone()),
        other => Err(CoreError::encode(
            codec,
            format!("expected bytes, got {}", other.kind()),
        )),
    }
}

impl Codec for Raw {
    fn code(&self) -> u64 {
        codes::RAW
    }

    fn name(&self) -> &'static str {
        "raw"
    }

    fn encode(&self, value: &Ipld) -> Result<Vec<u8>> {
        encode_bytes(self.name(), value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld> {
        Ok(Ipld::Bytes(bytes.to_vec()))
    }
}

impl Codec for Identity {
    fn code(&self) -> u64 {
        codes::IDENTITY
    }

    fn name(&self) -> &'static str {
        "identity"
    }

    fn encode(&self, value: &Ipld) -> Result<Vec<u8>> {
        encode_bytes(self.name(), value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld> {
        Ok(Ipld::Bytes(bytes.to_vec()))
    }
}
