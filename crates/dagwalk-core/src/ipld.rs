//! The IPLD data model: what every codec decodes into.
//!
//! Links are a dedicated variant. A decoder that meets a link in its wire
//! format produces [`Ipld::Link`], so the resolver never has to guess whether a
//! map or byte string "looks like" a CID.

use std::collections::BTreeMap;

use cid::Cid;

/// A decoded block value.
#[derive(Debug, Clone, PartialEq)]
pub enum Ipld {
    Null,
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Ipld>),
    Map(BTreeMap<String, Ipld>),
    /// A link to another block.
    Link(Cid),
}

impl Ipld {
    /// Data model kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Ipld::Null => "null",
            Ipld::Bool(_) => "bool",
            Ipld::Integer(_) => "integer",
            Ipld::Float(_) => "float",
            Ipld::String(_) => "string",
            Ipld::Bytes(_) => "bytes",
            Ipld::List(_) => "list",
            Ipld::Map(_) => "map",
            Ipld::Link(_) => "link",
        }
    }

    /// Look up one path segment: a key in a map or a decimal index in a list.
    ///
    /// Scalars, bytes and links have no children.
    pub fn get(&self, segment: &str) -> Option<&Ipld> {
        match self {
            Ipld::Map(map) => map.get(segment),
            Ipld::List(list) => parse_index(segment).and_then(|i| list.get(i)),
            _ => None,
        }
    }

    /// The CID if this value is a link.
    pub fn as_link(&self) -> Option<&Cid> {
        match self {
            Ipld::Link(cid) => Some(cid),
            _ => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Ipld::Link(_))
    }

    /// Every link embedded in this value, depth-first in key order.
    pub fn links(&self) -> Vec<Cid> {
        let mut out = Vec::new();
        self.collect_links(&mut out);
        out
    }

    fn collect_links(&self, out: &mut Vec<Cid>) {
        match self {
            Ipld::Link(cid) => out.push(*cid),
            Ipld::List(list) => list.iter().for_each(|v| v.collect_links(out)),
            Ipld::Map(map) => map.values().for_each(|v| v.collect_links(out)),
            _ => {}
        }
    }

    /// Every path reachable inside this value without following links.
    ///
    /// Paths are slash-joined and listed depth-first; a container's own path
    /// precedes its children.
    pub fn paths(&self) -> Vec<String> {
        self.entries().into_iter().map(|(path, _)| path).collect()
    }

    /// Every `(path, value)` pair reachable without following links, in the
    /// same order as [`Ipld::paths`].
    pub fn entries(&self) -> Vec<(String, &Ipld)> {
        let mut out = Vec::new();
        self.collect_entries("", &mut out);
        out
    }

    fn collect_entries<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Ipld)>) {
        let join = |segment: &str| {
            if prefix.is_empty() {
                segment.to_string()
            } else {
                format!("{}/{}", prefix, segment)
            }
        };
        match self {
            Ipld::Map(map) => {
                for (key, value) in map {
                    let path = join(key);
                    out.push((path.clone(), value));
                    value.collect_entries(&path, out);
                }
            }
            Ipld::List(list) => {
                for (i, value) in list.iter().enumerate() {
                    let path = join(&i.to_string());
                    out.push((path.clone(), value));
                    value.collect_entries(&path, out);
                }
            }
            _ => {}
        }
    }
}

/// Parse a canonical decimal list index ("0", "17"; not "+1" or "01").
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}

impl From<bool> for Ipld {
    fn from(b: bool) -> Self {
        Ipld::Bool(b)
    }
}

impl From<i64> for Ipld {
    fn from(n: i64) -> Self {
        Ipld::Integer(n.into())
    }
}

impl From<u64> for Ipld {
    fn from(n: u64) -> Self {
        Ipld::Integer(n.into())
    }
}

impl From<f64> for Ipld {
    fn from(f: f64) -> Self {
        Ipld::Float(f)
    }
}

impl From<&str> for Ipld {
    fn from(s: &str) -> Self {
        Ipld::String(s.to_string())
    }
}

impl From<String> for Ipld {
    fn from(s: String) -> Self {
        Ipld::String(s)
    }
}

impl From<Vec<u8>> for Ipld {
    fn from(b: Vec<u8>) -> Self {
        Ipld::Bytes(b)
    }
}

impl From<Vec<Ipld>> for Ipld {
    fn from(list: Vec<Ipld>) -> Self {
        Ipld::List(list)
    }
}

impl From<BTreeMap<String, Ipld>> for Ipld {
    fn from(map: BTreeMap<String, Ipld>) -> Self {
        Ipld::Map(map)
    }
}

impl From<Cid> for Ipld {
    fn from(cid: Cid) -> Self {
        Ipld::Link(cid)
    }
}

impl<K: Into<String>, V: Into<Ipld>> FromIterator<(K, V)> for Ipld {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Ipld::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{codes, compute_cid, HashCode};

    fn link(data: &[u8]) -> Cid {
        compute_cid(codes::RAW, HashCode::Sha2_256, data).unwrap()
    }

    #[test]
    fn test_get_map_and_list() {
        let value: Ipld = [
            ("a", Ipld::List(vec![Ipld::from(1i64), Ipld::from(2i64)])),
            ("b", Ipld::from("text")),
        ]
        .into_iter()
        .collect();

        assert_eq!(value.get("b"), Some(&Ipld::from("text")));
        assert_eq!(value.get("a").and_then(|a| a.get("1")), Some(&Ipld::from(2i64)));
        assert_eq!(value.get("a").and_then(|a| a.get("2")), None);
        assert_eq!(value.get("missing"), None);
    }

    #[test]
    fn test_get_rejects_non_canonical_index() {
        let list = Ipld::List(vec![Ipld::Null, Ipld::Bool(true)]);
        assert_eq!(list.get("01"), None);
        assert_eq!(list.get("+1"), None);
        assert_eq!(list.get("-1"), None);
        assert_eq!(list.get("1"), Some(&Ipld::Bool(true)));
    }

    #[test]
    fn test_scalars_have_no_children() {
        assert_eq!(Ipld::from("abc").get("0"), None);
        assert_eq!(Ipld::Bytes(vec![1, 2]).get("0"), None);
        assert_eq!(Ipld::Link(link(b"x")).get("0"), None);
    }

    #[test]
    fn test_links_collected_depth_first() {
        let a = link(b"a");
        let b = link(b"b");
        let value: Ipld = [
            ("x", Ipld::Link(a)),
            ("y", Ipld::List(vec![Ipld::Null, Ipld::Link(b)])),
        ]
        .into_iter()
        .collect();

        assert_eq!(value.links(), vec![a, b]);
        assert!(value.get("x").unwrap().is_link());
        assert_eq!(value.get("x").unwrap().as_link(), Some(&a));
    }

    #[test]
    fn test_paths() {
        let value: Ipld = [
            ("a", Ipld::from_iter([("b", Ipld::from(1i64))])),
            ("c", Ipld::List(vec![Ipld::Null])),
        ]
        .into_iter()
        .collect();

        assert_eq!(value.paths(), vec!["a", "a/b", "c", "c/0"]);
        assert!(Ipld::from(5i64).paths().is_empty());

        let entries = value.entries();
        assert_eq!(entries[1], ("a/b".to_string(), &Ipld::from(1i64)));
        assert_eq!(entries[3], ("c/0".to_string(), &Ipld::Null));
    }
}
