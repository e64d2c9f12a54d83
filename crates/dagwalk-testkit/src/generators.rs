//! Proptest generators for property-based testing.
//!
//! Each codec carries a slightly different slice of the data model, so there
//! is one value strategy per family:
//!
//! - [`cbor_value`]: everything, including links and bytes
//! - [`json_value`]: no links, no bytes, no floats (plain JSON)
//! - [`pb_node`]: DAG-PB shaped maps

use cid::Cid;
use proptest::prelude::*;

use dagwalk_core::codecs::dag_pb::{PbLink, PbNode};
use dagwalk_core::ident::codes;
use dagwalk_core::{compute_cid, HashCode, Ipld};

/// Generate a CID for random raw bytes.
pub fn cid() -> impl Strategy<Value = Cid> {
    (
        prop::collection::vec(any::<u8>(), 0..64),
        prop_oneof![Just(HashCode::Sha2_256), Just(HashCode::Blake3)],
        prop_oneof![
            Just(codes::RAW),
            Just(codes::DAG_CBOR),
            Just(codes::DAG_PB),
            Just(codes::DAG_JSON),
        ],
    )
        .prop_map(|(data, hash, codec)| {
            compute_cid(codec, hash, &data).unwrap_or_else(|e| panic!("cid: {}", e))
        })
}

/// Generate a map key. Never starts with `/`, so DAG-JSON never reads a
/// generated map as a link or bytes.
pub fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_-]{0,11}".prop_map(String::from)
}

/// Floats with an exact short decimal form.
pub fn float() -> impl Strategy<Value = f64> {
    (-1_000_000i32..1_000_000).prop_map(|n| n as f64 / 4.0)
}

fn scalar(floats: bool, bytes: bool) -> BoxedStrategy<Ipld> {
    let mut options: Vec<BoxedStrategy<Ipld>> = vec![
        Just(Ipld::Null).boxed(),
        any::<bool>().prop_map(Ipld::Bool).boxed(),
        any::<i64>().prop_map(Ipld::from).boxed(),
        any::<u64>().prop_map(Ipld::from).boxed(),
        "\\PC{0,24}".prop_map(Ipld::String).boxed(),
    ];
    if floats {
        options.push(float().prop_map(Ipld::Float).boxed());
    }
    if bytes {
        options.push(
            prop::collection::vec(any::<u8>(), 0..32)
                .prop_map(Ipld::Bytes)
                .boxed(),
        );
    }
    proptest::strategy::Union::new(options).boxed()
}

fn nested(leaf: BoxedStrategy<Ipld>) -> impl Strategy<Value = Ipld> {
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Ipld::List),
            prop::collection::btree_map(key(), inner, 0..6).prop_map(Ipld::Map),
        ]
    })
}

/// Any value DAG-CBOR and DAG-JSON can both carry.
pub fn cbor_value() -> impl Strategy<Value = Ipld> {
    let leaf = prop_oneof![4 => scalar(true, true), 1 => cid().prop_map(Ipld::Link)].boxed();
    nested(leaf)
}

/// Any value plain JSON can carry.
pub fn json_value() -> impl Strategy<Value = Ipld> {
    nested(scalar(false, false))
}

/// Generate a DAG-PB node with uniquely named links.
pub fn pb_node() -> impl Strategy<Value = PbNode> {
    (
        prop::collection::btree_map(key(), (cid(), any::<Option<u32>>()), 0..6),
        any::<Option<Vec<u8>>>(),
    )
        .prop_map(|(links, data)| PbNode {
            links: links
                .into_iter()
                .map(|(name, (hash, tsize))| PbLink {
                    hash,
                    name: Some(name),
                    tsize: tsize.map(u64::from),
                })
                .collect(),
            data,
        })
}
