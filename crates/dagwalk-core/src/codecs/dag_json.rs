//! DAG-JSON and plain JSON.
//!
//! DAG-JSON reserves single-entry objects keyed `"/"`:
//! - `{"/": "<cid>"}` is a link
//! - `{"/": {"bytes": "<base64>"}}` is a byte string (standard alphabet, unpadded)
//!
//! Object keys are emitted sorted. Plain JSON has neither links nor bytes.

use std::collections::BTreeMap;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use cid::Cid;
use serde_json::{Map, Number, Value};

use crate::codec::Codec;
use crate::error::{CoreError, Result};
use crate::ident::codes;
use crate::ipld::Ipld;

const RESERVED_KEY: &str = "/";

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The DAG-JSON codec (`0x0129`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DagJson;

/// Plain JSON (`0x0200`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Codec for DagJson {
    fn code(&self) -> u64 {
        codes::DAG_JSON
    }

    fn name(&self) -> &'static str {
        "dag-json"
    }

    fn encode(&self, value: &Ipld) -> Result<Vec<u8>> {
        let json = to_json(self.name(), value, true)?;
        serde_json::to_vec(&json).map_err(|e| CoreError::encode(self.name(), e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld> {
        let json: Value = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::decode(self.name(), e.to_string()))?;
        from_json(self.name(), json, true)
    }
}

impl Codec for Json {
    fn code(&self) -> u64 {
        codes::JSON
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Ipld) -> Result<Vec<u8>> {
        let json = to_json(self.name(), value, false)?;
        serde_json::to_vec(&json).map_err(|e| CoreError::encode(self.name(), e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld> {
        let json: Value = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::decode(self.name(), e.to_string()))?;
        from_json(self.name(), json, false)
    }
}

fn to_json(codec: &'static str, value: &Ipld, dag: bool) -> Result<Value> {
    Ok(match value {
        Ipld::Null => Value::Null,
        Ipld::Bool(b) => Value::Bool(*b),
        Ipld::Integer(i) => {
            if let Ok(n) = i64::try_from(*i) {
                Value::Number(n.into())
            } else if let Ok(n) = u64::try_from(*i) {
                Value::Number(n.into())
            } else {
                return Err(CoreError::encode(codec, format!("integer {} out of range", i)));
            }
        }
        Ipld::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| CoreError::encode(codec, format!("non-finite float {}", f)))?,
        Ipld::String(s) => Value::String(s.clone()),
        Ipld::List(list) => Value::Array(
            list.iter()
                .map(|v| to_json(codec, v, dag))
                .collect::<Result<Vec<_>>>()?,
        ),
        Ipld::Map(map) => {
            if dag && map.len() == 1 && map.contains_key(RESERVED_KEY) {
                return Err(CoreError::encode(
                    codec,
                    "single-entry map keyed \"/\" is reserved",
                ));
            }
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), to_json(codec, v, dag)?);
            }
            Value::Object(out)
        }
        Ipld::Bytes(b) if dag => reserved(Value::Object(Map::from_iter([(
            "bytes".to_string(),
            Value::String(BASE64.encode(b)),
        )]))),
        Ipld::Link(cid) if dag => reserved(Value::String(cid.to_string())),
        other => {
            return Err(CoreError::encode(
                codec,
                format!("{} values are not representable", other.kind()),
            ))
        }
    })
}

fn reserved(inner: Value) -> Value {
    Value::Object(Map::from_iter([(RESERVED_KEY.to_string(), inner)]))
}

fn from_json(codec: &'static str, value: Value, dag: bool) -> Result<Ipld> {
    Ok(match value {
        Value::Null => Ipld::Null,
        Value::Bool(b) => Ipld::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ipld::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                Ipld::Integer(u.into())
            } else {
                let f = n
                    .as_f64()
                    .ok_or_else(|| CoreError::decode(codec, format!("bad number {}", n)))?;
                Ipld::Float(f)
            }
        }
        Value::String(s) => Ipld::String(s),
        Value::Array(items) => Ipld::List(
            items
                .into_iter()
                .map(|v| from_json(codec, v, dag))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(obj) => {
            if dag && obj.len() == 1 {
                if let Some(inner) = obj.get(RESERVED_KEY) {
                    return decode_reserved(codec, inner);
                }
            }
            let mut map = BTreeMap::new();
            for (k, v) in obj {
                map.insert(k, from_json(codec, v, dag)?);
            }
            Ipld::Map(map)
        }
    })
}

fn decode_reserved(codec: &'static str, inner: &Value) -> Result<Ipld> {
    match inner {
        Value::String(s) => Cid::try_from(s.as_str())
            .map(Ipld::Link)
            .map_err(|e| CoreError::decode(codec, format!("bad link {:?}: {}", s, e))),
        Value::Object(obj) if obj.len() == 1 => match obj.get("bytes") {
            Some(Value::String(b64)) => BASE64
                .decode(b64)
                .map(Ipld::Bytes)
                .map_err(|e| CoreError::decode(codec, format!("bad bytes: {}", e))),
            _ => Err(CoreError::decode(codec, "malformed bytes object")),
        },
        _ => Err(CoreError::decode(codec, "malformed \"/\" object")),
    }
}
