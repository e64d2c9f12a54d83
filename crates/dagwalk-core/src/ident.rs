//! CID helpers: multicodec codes, multihash computation and digest checks.
//!
//! A CID is `(version, codec, multihash)`. The resolver never builds one from
//! scratch; these helpers exist for writers (`Dag::put`, test fixtures) and for
//! the optional digest-on-read check in the store layer.

use cid::multihash::Multihash;
use cid::Cid;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};

/// Multicodec codes for the codecs shipped with this crate.
pub mod codes {
    pub const IDENTITY: u64 = 0x00;
    pub const RAW: u64 = 0x55;
    pub const DAG_PB: u64 = 0x70;
    pub const DAG_CBOR: u64 = 0x71;
    pub const DAG_JSON: u64 = 0x0129;
    pub const JSON: u64 = 0x0200;
}

/// Largest digest an identity multihash may carry.
pub const MAX_IDENTITY_DIGEST: usize = 64;

/// Supported multihash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashCode {
    /// Digest is the data itself.
    Identity,
    Sha2_256,
    Blake3,
}

impl HashCode {
    /// The multihash code.
    pub const fn code(self) -> u64 {
        match self {
            HashCode::Identity => 0x00,
            HashCode::Sha2_256 => 0x12,
            HashCode::Blake3 => 0x1e,
        }
    }

    /// Look up a hash function by multihash code.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0x00 => Some(HashCode::Identity),
            0x12 => Some(HashCode::Sha2_256),
            0x1e => Some(HashCode::Blake3),
            _ => None,
        }
    }

    /// Hash `data`, returning the raw digest.
    pub fn digest(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            HashCode::Identity => {
                if data.len() > MAX_IDENTITY_DIGEST {
                    return Err(CoreError::InvalidCid(format!(
                        "identity digest of {} bytes exceeds {}",
                        data.len(),
                        MAX_IDENTITY_DIGEST
                    )));
                }
                Ok(data.to_vec())
            }
            HashCode::Sha2_256 => Ok(Sha256::digest(data).to_vec()),
            HashCode::Blake3 => Ok(blake3::hash(data).as_bytes().to_vec()),
        }
    }

    /// Hash `data` into a multihash.
    pub fn multihash(self, data: &[u8]) -> Result<Multihash<64>> {
        let digest = self.digest(data)?;
        Multihash::wrap(self.code(), &digest).map_err(|e| CoreError::InvalidCid(e.to_string()))
    }
}

/// Build a CIDv1 for `bytes` encoded with `codec`.
pub fn compute_cid(codec: u64, hash: HashCode, bytes: &[u8]) -> Result<Cid> {
    Ok(Cid::new_v1(codec, hash.multihash(bytes)?))
}

/// Recompute the digest of `bytes` with the CID's own hash function.
///
/// Returns `Ok(true)` when it matches the CID's multihash.
pub fn verify_cid(cid: &Cid, bytes: &[u8]) -> Result<bool> {
    let code = cid.hash().code();
    let hash = HashCode::from_code(code).ok_or(CoreError::UnsupportedHash(code))?;
    let digest = hash.digest(bytes)?;
    Ok(digest.as_slice() == cid.hash().digest())
}

/// Human-readable name of a multicodec code, if known.
pub fn codec_name(code: u64) -> Option<&'static str> {
    match code {
        codes::IDENTITY => Some("identity"),
        codes::RAW => Some("raw"),
        codes::DAG_PB => Some("dag-pb"),
        codes::DAG_CBOR => Some("dag-cbor"),
        codes::DAG_JSON => Some("dag-json"),
        codes::JSON => Some("json"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_raw_cid() {
        let cid = compute_cid(codes::RAW, HashCode::Sha2_256, b"").unwrap();
        assert_eq!(
            cid.to_string(),
            "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku"
        );
    }

    #[test]
    fn test_identity_cid() {
        let cid = compute_cid(codes::RAW, HashCode::Identity, b"").unwrap();
        assert_eq!(cid.to_string(), "bafkqaaa");
        assert!(verify_cid(&cid, b"").unwrap());
    }

    #[test]
    fn test_identity_digest_too_large() {
        let data = vec![0u8; MAX_IDENTITY_DIGEST + 1];
        assert!(matches!(
            compute_cid(codes::RAW, HashCode::Identity, &data),
            Err(CoreError::InvalidCid(_))
        ));
    }

    #[test]
    fn test_verify_detects_tampering() {
        for hash in [HashCode::Sha2_256, HashCode::Blake3] {
            let cid = compute_cid(codes::DAG_CBOR, hash, b"block").unwrap();
            assert!(verify_cid(&cid, b"block").unwrap());
            assert!(!verify_cid(&cid, b"blocc").unwrap());
        }
    }

    #[test]
    fn test_hash_code_roundtrip() {
        for hash in [HashCode::Identity, HashCode::Sha2_256, HashCode::Blake3] {
            assert_eq!(HashCode::from_code(hash.code()), Some(hash));
        }
        assert_eq!(HashCode::from_code(0x13), None);
    }

    #[test]
    fn test_codec_names() {
        assert_eq!(codec_name(codes::DAG_PB), Some("dag-pb"));
        assert_eq!(codec_name(0x0129), Some("dag-json"));
        assert_eq!(codec_name(0x9999), None);
    }
}
