//! Built-in codecs.
//!
//! | codec      | code     | notes                                   |
//! |------------|----------|-----------------------------------------|
//! | `identity` | `0x00`   | bytes pass through                      |
//! | `raw`      | `0x55`   | bytes pass through                      |
//! | `dag-pb`   | `0x70`   | protobuf nodes, named links             |
//! | `dag-cbor` | `0x71`   | deterministic CBOR, tag 42 links        |
//! | `dag-json` | `0x0129` | JSON with `{"/": ...}` links and bytes  |
//! | `json`     | `0x0200` | plain JSON, no links                    |

use std::sync::Arc;

use crate::codec::Codec;

pub mod dag_cbor;
pub mod dag_json;
pub mod dag_pb;
pub mod raw;

pub use dag_cbor::DagCbor;
pub use dag_json::{DagJson, Json};
pub use dag_pb::DagPb;
pub use raw::{Identity, Raw};

/// The codecs every registry is seeded with.
pub fn defaults() -> Vec<Arc<dyn Codec>> {
    vec![
        Arc::new(Identity),
        Arc::new(Raw),
        Arc::new(DagPb),
        Arc::new(DagCbor),
        Arc::new(DagJson),
        Arc::new(Json),
    ]
}
