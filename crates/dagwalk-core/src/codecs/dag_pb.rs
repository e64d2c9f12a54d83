//! DAG-PB: the protobuf node format of UnixFS.
//!
//! Wire schema:
//!
//! ```text
//! message PBLink { optional bytes Hash = 1; optional string Name = 2; optional uint64 Tsize = 3; }
//! message PBNode { repeated PBLink Links = 2; optional bytes Data = 1; }
//! ```
//!
//! Decoded shape:
//!
//! ```text
//! { "Data"?: bytes, "Links": [ { "Hash": link, "Name"?: string, "Tsize"?: int } ] }
//! ```
//!
//! Links are written before Data and sorted by name. At the root of a block a
//! path segment other than `Data`/`Links` names a link, so `a/b` walks through
//! links called `a` and then `b` just as a UnixFS directory does.

use std::collections::BTreeMap;

use cid::Cid;

use crate::codec::Codec;
use crate::error::{CoreError, Result};
use crate::ident::codes;
use crate::ipld::Ipld;

const NAME: &str = "dag-pb";

const WIRE_VARINT: u64 = 0;
const WIRE_LEN: u64 = 2;

/// The DAG-PB codec (`0x70`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DagPb;

/// A link in a DAG-PB node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbLink {
    pub hash: Cid,
    pub name: Option<String>,
    pub tsize: Option<u64>,
}

/// A DAG-PB node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PbNode {
    pub links: Vec<PbLink>,
    pub data: Option<Vec<u8>>,
}

impl PbNode {
    /// Convert to the IPLD data model.
    pub fn into_ipld(self) -> Ipld {
        let mut map = BTreeMap::new();
        let links = self
            .links
            .into_iter()
            .map(|link| {
                let mut entry = BTreeMap::new();
                entry.insert("Hash".to_string(), Ipld::Link(link.hash));
                if let Some(name) = link.name {
                    entry.insert("Name".to_string(), Ipld::String(name));
                }
                if let Some(tsize) = link.tsize {
                    entry.insert("Tsize".to_string(), Ipld::Integer(tsize.into()));
                }
                Ipld::Map(entry)
            })
            .collect();
        map.insert("Links".to_string(), Ipld::List(links));
        if let Some(data) = self.data {
            map.insert("Data".to_string(), Ipld::Bytes(data));
        }
        Ipld::Map(map)
    }

    /// Read a node out of the IPLD data model.
    pub fn from_ipld(value: &Ipld) -> Result<Self> {
        let map = match value {
            Ipld::Map(map) => map,
            other => return Err(CoreError::encode(NAME, format!("expected map, got {}", other.kind()))),
        };

        if let Some(key) = map.keys().find(|k| *k != "Data" && *k != "Links") {
            return Err(CoreError::encode(NAME, format!("unexpected node field {:?}", key)));
        }

        let data = match map.get("Data") {
            None => None,
            Some(Ipld::Bytes(b)) => Some(b.clone()),
            Some(other) => {
                return Err(CoreError::encode(NAME, format!("Data must be bytes, got {}", other.kind())))
            }
        };

        let links = match map.get("Links") {
            None => Vec::new(),
            Some(Ipld::List(items)) => items.iter().map(link_from_ipld).collect::<Result<_>>()?,
            Some(other) => {
                return Err(CoreError::encode(NAME, format!("Links must be a list, got {}", other.kind())))
            }
        };

        Ok(Self { links, data })
    }

    /// Serialize to protobuf bytes. Links are sorted by name first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut links: Vec<&PbLink> = self.links.iter().collect();
        links.sort_by(|a, b| {
            let a = a.name.as_deref().unwrap_or("").as_bytes();
            let b = b.name.as_deref().unwrap_or("").as_bytes();
            a.cmp(b)
        });

        let mut buf = Vec::new();
        for link in links {
            let encoded = encode_link(link);
            write_key(&mut buf, 2, WIRE_LEN);
            write_varint(&mut buf, encoded.len() as u64);
            buf.extend_from_slice(&encoded);
        }
        if let Some(data) = &self.data {
            write_key(&mut buf, 1, WIRE_LEN);
            write_varint(&mut buf, data.len() as u64);
            buf.extend_from_slice(data);
        }
        buf
    }

    /// Parse protobuf bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let mut node = PbNode::default();

        while !reader.is_empty() {
            let (field, wire) = reader.key()?;
            match (field, wire) {
                (1, WIRE_LEN) => {
                    if node.data.is_some() {
                        return Err(CoreError::decode(NAME, "duplicate Data field"));
                    }
                    node.data = Some(reader.len_delimited()?.to_vec());
                }
                (2, WIRE_LEN) => {
                    let link_bytes = reader.len_delimited()?;
                    node.links.push(decode_link(link_bytes)?);
                }
                _ => {
                    return Err(CoreError::decode(
                        NAME,
                        format!("unexpected field {} (wire type {}) in PBNode", field, wire),
                    ))
                }
            }
        }

        Ok(node)
    }
}

fn link_from_ipld(value: &Ipld) -> Result<PbLink> {
    let map = match value {
        Ipld::Map(map) => map,
        other => return Err(CoreError::encode(NAME, format!("link must be a map, got {}", other.kind()))),
    };

    if let Some(key) = map.keys().find(|k| !matches!(k.as_str(), "Hash" | "Name" | "Tsize")) {
        return Err(CoreError::encode(NAME, format!("unexpected link field {:?}", key)));
    }

    let hash = match map.get("Hash") {
        Some(Ipld::Link(cid)) => *cid,
        _ => return Err(CoreError::encode(NAME, "link Hash must be a link")),
    };
    let name = match map.get("Name") {
        None => None,
        Some(Ipld::String(s)) => Some(s.clone()),
        Some(_) => return Err(CoreError::encode(NAME, "link Name must be a string")),
    };
    let tsize = match map.get("Tsize") {
        None => None,
        Some(Ipld::Integer(n)) => Some(
            u64::try_from(*n).map_err(|_| CoreError::encode(NAME, format!("Tsize {} out of range", n)))?,
        ),
        Some(_) => return Err(CoreError::encode(NAME, "link Tsize must be an integer")),
    };

    Ok(PbLink { hash, name, tsize })
}

fn encode_link(link: &PbLink) -> Vec<u8> {
    let mut buf = Vec::new();
    let hash = link.hash.to_bytes();
    write_key(&mut buf, 1, WIRE_LEN);
    write_varint(&mut buf, hash.len() as u64);
    buf.extend_from_slice(&hash);
    if let Some(name) = &link.name {
        write_key(&mut buf, 2, WIRE_LEN);
        write_varint(&mut buf, name.len() as u64);
        buf.extend_from_slice(name.as_bytes());
    }
    if let Some(tsize) = link.tsize {
        write_key(&mut buf, 3, WIRE_VARINT);
        write_varint(&mut buf, tsize);
    }
    buf
}

fn decode_link(bytes: &[u8]) -> Result<PbLink> {
    let mut reader = Reader::new(bytes);
    let mut hash = None;
    let mut name = None;
    let mut tsize = None;

    while !reader.is_empty() {
        let (field, wire) = reader.key()?;
        match (field, wire) {
            (1, WIRE_LEN) if hash.is_none() => {
                let cid_bytes = reader.len_delimited()?;
                hash = Some(
                    Cid::try_from(cid_bytes)
                        .map_err(|e| CoreError::decode(NAME, format!("bad link hash: {}", e)))?,
                );
            }
            (2, WIRE_LEN) if name.is_none() => {
                let raw = reader.len_delimited()?;
                name = Some(
                    String::from_utf8(raw.to_vec())
                        .map_err(|_| CoreError::decode(NAME, "link name is not utf-8"))?,
                );
            }
            (3, WIRE_VARINT) if tsize.is_none() => {
                tsize = Some(reader.varint()?);
            }
            _ => {
                return Err(CoreError::decode(
                    NAME,
                    format!("unexpected or duplicate field {} in PBLink", field),
                ))
            }
        }
    }

    let hash = hash.ok_or_else(|| CoreError::decode(NAME, "link without Hash"))?;
    Ok(PbLink { hash, name, tsize })
}

fn write_key(buf: &mut Vec<u8>, field: u64, wire: u64) {
    write_varint(buf, (field << 3) | wire);
}

fn write_varint(buf: &mut Vec<u8>, mut n: u64) {
    while n >= 0x80 {
        buf.push((n as u8) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
}

/// Cursor over protobuf bytes.
struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn varint(&mut self) -> Result<u64> {
        let mut n: u64 = 0;
        for (i, byte) in self.bytes.iter().enumerate().take(10) {
            n |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                self.bytes = &self.bytes[i + 1..];
                return Ok(n);
            }
        }
        Err(CoreError::decode(NAME, "truncated or overlong varint"))
    }

    fn key(&mut self) -> Result<(u64, u64)> {
        let key = self.varint()?;
        Ok((key >> 3, key & 0x7))
    }

    fn len_delimited(&mut self) -> Result<&'a [u8]> {
        let len = usize::try_from(self.varint()?)
            .map_err(|_| CoreError::decode(NAME, "length overflow"))?;
        if len > self.bytes.len() {
            return Err(CoreError::decode(
                NAME,
                format!("length {} exceeds remaining {} bytes", len, self.bytes.len()),
            ));
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }
}

impl Codec for DagPb {
    fn code(&self) -> u64 {
        codes::DAG_PB
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn encode(&self, value: &Ipld) -> Result<Vec<u8>> {
        Ok(PbNode::from_ipld(value)?.to_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Ipld> {
        Ok(PbNode::from_bytes(bytes)?.into_ipld())
    }

    fn resolve_segment<'a>(&self, node: &'a Ipld, segment: &str) -> Option<&'a Ipld> {
        if segment == "Data" || segment == "Links" {
            return node.get(segment);
        }
        match node.get("Links") {
            Some(Ipld::List(links)) => links
                .iter()
                .find(|link| matches!(link.get("Name"), Some(Ipld::String(name)) if name == segment))
                .and_then(|link| link.get("Hash")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{compute_cid, HashCode};

    fn cid(data: &[u8]) -> Cid {
        compute_cid(codes::RAW, HashCode::Sha2_256, data).unwrap()
    }

    fn node_with_links(names: &[&str]) -> PbNode {
        PbNode {
            links: names
                .iter()
                .map(|n| PbLink {
                    hash: cid(n.as_bytes()),
                    name: Some(n.to_string()),
                    tsize: Some(n.len() as u64),
                })
                .collect(),
            data: Some(vec![0x08, 0x01]),
        }
    }

    #[test]
    fn test_empty_node() {
        assert_eq!(PbNode::default().to_bytes(), Vec::<u8>::new());
        let decoded = DagPb.decode(&[]).unwrap();
        assert_eq!(decoded.get("Links"), Some(&Ipld::List(vec![])));
        assert_eq!(decoded.get("Data"), None);
    }

    #[test]
    fn test_unixfs_directory_data() {
        // The empty UnixFS directory: Data = 08 01
        let node = PbNode {
            links: vec![],
            data: Some(vec![0x08, 0x01]),
        };
        assert_eq!(node.to_bytes(), vec![0x0a, 0x02, 0x08, 0x01]);
    }

    #[test]
    fn test_roundtrip() {
        let value = node_with_links(&["a", "b"]).into_ipld();
        let bytes = DagPb.encode(&value).unwrap();
        assert_eq!(DagPb.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_links_sorted_and_before_data() {
        let node = node_with_links(&["zeta", "alpha"]);
        let bytes = node.to_bytes();
        assert_eq!(bytes[0], 0x12);
        let decoded = PbNode::from_bytes(&bytes).unwrap();
        let names: Vec<_> = decoded.links.iter().map(|l| l.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(decoded.data, Some(vec![0x08, 0x01]));
    }

    #[test]
    fn test_named_link_lookup() {
        let node = node_with_links(&["a", "b"]);
        let target = node.links[1].hash;
        let value = node.into_ipld();

        assert_eq!(DagPb.resolve_segment(&value, "b"), Some(&Ipld::Link(target)));
        assert_eq!(DagPb.resolve_segment(&value, "missing"), None);
        assert!(matches!(DagPb.resolve_segment(&value, "Data"), Some(Ipld::Bytes(_))));
        assert!(matches!(DagPb.resolve_segment(&value, "Links"), Some(Ipld::List(_))));
    }

    #[test]
    fn test_encode_rejects_unknown_fields() {
        let value: Ipld = [("Extra", Ipld::Null)].into_iter().collect();
        assert!(DagPb.encode(&value).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        // field 3, wire type 2
        assert!(DagPb.decode(&[0x1a, 0x00]).is_err());
        // truncated length
        assert!(DagPb.decode(&[0x0a, 0x05, 0x00]).is_err());
        // link without hash
        assert!(DagPb.decode(&[0x12, 0x00]).is_err());
    }

    #[test]
    fn test_varint() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 300);
        assert_eq!(buf, vec![0xac, 0x02]);
        assert_eq!(Reader::new(&buf).varint().unwrap(), 300);
    }
}
