//! DAG-CBOR: deterministic CBOR with tag 42 links.
//!
//! Encoding follows RFC 8949 core deterministic rules as narrowed by DAG-CBOR:
//! - Map keys are strings, sorted by encoded byte comparison (length first)
//! - Integers use the smallest valid encoding
//! - Definite lengths only
//! - Floats are always 64-bit; NaN and infinities are rejected
//! - Links are tag 42 over a byte string `0x00 || cid bytes`
//!
//! Decoding parses with `ciborium` and then maps the generic CBOR value onto
//! [`Ipld`], rejecting anything DAG-CBOR does not allow.

use std::collections::BTreeMap;

use ciborium::value::Value;
use cid::Cid;

use crate::codec::Codec;
use crate::error::{CoreError, Result};
use crate::ident::codes;
use crate::ipld::Ipld;

/// CBOR tag for IPLD links.
pub const LINK_TAG: u64 = 42;

const NAME: &str = "dag-cbor";

/// The DAG-CBOR codec (`0x71`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DagCbor;

impl Codec for DagCbor {
    fn code(&self) -> u64 {
        codes::DAG_CBOR
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn encode(&self, value: &Ipld) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        encode_value_to(&mut buf, value)?;
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld> {
        let mut rest = bytes;
        let value: Value = ciborium::de::from_reader(&mut rest)
            .map_err(|e| CoreError::decode(NAME, e.to_string()))?;

        if !rest.is_empty() {
            return Err(CoreError::decode(
                NAME,
                format!("{} trailing bytes", rest.len()),
            ));
        }

        cbor_to_ipld(value)
    }
}

/// Recursively encode an IPLD value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Ipld) -> Result<()> {
    match value {
        Ipld::Null => buf.push(0xf6),
        Ipld::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Ipld::Integer(i) => encode_integer(buf, *i)?,
        Ipld::Float(f) => {
            if !f.is_finite() {
                return Err(CoreError::encode(NAME, format!("non-finite float {}", f)));
            }
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Ipld::String(s) => encode_text(buf, s),
        Ipld::Bytes(b) => encode_bytes(buf, b),
        Ipld::List(list) => {
            encode_uint(buf, 4, list.len() as u64);
            for item in list {
                encode_value_to(buf, item)?;
            }
        }
        Ipld::Map(map) => encode_map_canonical(buf, map)?,
        Ipld::Link(cid) => encode_link(buf, cid),
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, n: i128) -> Result<()> {
    if n >= 0 {
        let n = u64::try_from(n)
            .map_err(|_| CoreError::encode(NAME, format!("integer {} out of range", n)))?;
        encode_uint(buf, 0, n);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = u64::try_from(-1 - n)
            .map_err(|_| CoreError::encode(NAME, format!("integer {} out of range", n)))?;
        encode_uint(buf, 1, abs);
    }
    Ok(())
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Tag 42 wrapping the multibase-identity prefix and the binary CID.
fn encode_link(buf: &mut Vec<u8>, cid: &Cid) {
    encode_uint(buf, 6, LINK_TAG);
    let cid_bytes = cid.to_bytes();
    encode_uint(buf, 2, cid_bytes.len() as u64 + 1);
    buf.push(0x00);
    buf.extend_from_slice(&cid_bytes);
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded bytes, which for text keys is length
/// first and then bytewise.
fn encode_map_canonical(buf: &mut Vec<u8>, map: &BTreeMap<String, Ipld>) -> Result<()> {
    let mut entries: Vec<(Vec<u8>, &Ipld)> = map
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::with_capacity(k.len() + 1);
            encode_text(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    entries.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, entries.len() as u64);
    for (key_bytes, value) in entries {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

/// Map a generic CBOR value onto the IPLD data model.
fn cbor_to_ipld(value: Value) -> Result<Ipld> {
    Ok(match value {
        Value::Null => Ipld::Null,
        Value::Bool(b) => Ipld::Bool(b),
        Value::Integer(i) => Ipld::Integer(i.into()),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(CoreError::decode(NAME, format!("non-finite float {}", f)));
            }
            Ipld::Float(f)
        }
        Value::Text(s) => Ipld::String(s),
        Value::Bytes(b) => Ipld::Bytes(b),
        Value::Array(items) => Ipld::List(
            items
                .into_iter()
                .map(cbor_to_ipld)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Map(entries) => {
            let mut map = BTreeMap::new();
            for (k, v) in entries {
                let key = match k {
                    Value::Text(s) => s,
                    _ => return Err(CoreError::decode(NAME, "map keys must be strings")),
                };
                if map.insert(key.clone(), cbor_to_ipld(v)?).is_some() {
                    return Err(CoreError::decode(NAME, format!("duplicate map key {:?}", key)));
                }
            }
            Ipld::Map(map)
        }
        Value::Tag(LINK_TAG, inner) => match *inner {
            Value::Bytes(b) => Ipld::Link(decode_link(&b)?),
            _ => return Err(CoreError::decode(NAME, "tag 42 must wrap a byte string")),
        },
        Value::Tag(tag, _) => {
            return Err(CoreError::decode(NAME, format!("unsupported tag {}", tag)));
        }
        _ => return Err(CoreError::decode(NAME, "unsupported CBOR value")),
    })
}

fn decode_link(bytes: &[u8]) -> Result<Cid> {
    match bytes.split_first() {
        Some((0x00, cid_bytes)) => {
            Cid::try_from(cid_bytes).map_err(|e| CoreError::decode(NAME, format!("bad link: {}", e)))
        }
        _ => Err(CoreError::decode(NAME, "link missing 0x00 multibase prefix")),
    }
}
