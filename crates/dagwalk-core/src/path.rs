//! Resolution paths.
//!
//! A [`DagPath`] is a `/`-delimited list of segment names. Leading and trailing
//! slashes and empty segments are ignored, so `"/a//b/"` is `["a", "b"]`.
//! `""` is the empty path. Any non-empty string made only of slashes has no
//! usable segment and is rejected.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use cid::Cid;

use crate::error::{CoreError, Result};

/// A parsed path inside a DAG.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DagPath {
    segments: Vec<String>,
}

impl DagPath {
    /// The empty path (resolves to the root value).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path.
    ///
    /// Fails with [`CoreError::InvalidPath`] when `path` is non-empty but made
    /// only of `/` characters.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() && !path.is_empty() {
            return Err(CoreError::InvalidPath(format!(
                "could not resolve path {:?}: no segments",
                path
            )));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Consume the path into a queue of segments for walking.
    pub fn into_queue(self) -> VecDeque<String> {
        self.segments.into()
    }

    /// Append `segment`. A segment holding `/` is split the way
    /// [`DagPath::parse`] would split it, so the display form always parses
    /// back to the same path.
    pub fn join(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        self.segments.extend(
            segment
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        self
    }
}

impl fmt::Display for DagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for DagPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<S: Into<String>> FromIterator<S> for DagPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(DagPath::root(), |path, s| path.join(s))
    }
}

/// A CID followed by a path: `/ipfs/<cid>/a/b`, `/ipld/<cid>/a`, or `<cid>/a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IpfsPath {
    pub root: Cid,
    pub path: DagPath,
}

impl IpfsPath {
    pub fn new(root: Cid, path: DagPath) -> Self {
        Self { root, path }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim_start_matches('/');
        let rest = trimmed
            .strip_prefix("ipfs/")
            .or_else(|| trimmed.strip_prefix("ipld/"))
            .unwrap_or(trimmed);

        let (cid_str, path_str) = match rest.split_once('/') {
            Some((cid, path)) => (cid, path),
            None => (rest, ""),
        };

        if cid_str.is_empty() {
            return Err(CoreError::InvalidPath(format!("no cid in path {:?}", s)));
        }

        let root = Cid::try_from(cid_str)
            .map_err(|e| CoreError::InvalidPath(format!("invalid cid {:?}: {}", cid_str, e)))?;

        Ok(Self {
            root,
            path: DagPath::parse(path_str)?,
        })
    }
}

impl fmt::Display for IpfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "/ipfs/{}", self.root)
        } else {
            write!(f, "/ipfs/{}/{}", self.root, self.path)
        }
    }
}

impl FromStr for IpfsPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{codes, compute_cid, HashCode};

    #[test]
    fn test_parse_ignores_empty_segments() {
        let path = DagPath::parse("/a//b/").unwrap();
        assert_eq!(path.segments(), &["a".to_string(), "b".to_string()]);
        assert_eq!(path.to_string(), "a/b");
    }

    #[test]
    fn test_empty_path() {
        assert!(DagPath::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_only_separators_is_invalid() {
        for input in ["/", "//", "///"] {
            assert!(
                matches!(DagPath::parse(input), Err(CoreError::InvalidPath(_))),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_from_iter_and_join() {
        let path: DagPath = ["x", "", "y"].into_iter().collect();
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "x/y");
    }

    #[test]
    fn test_join_splits_nested_segments() {
        let path = DagPath::root().join("a/b").join("/c/");
        assert_eq!(path.len(), 3);
        assert_eq!(DagPath::parse(&path.to_string()).unwrap(), path);

        let collected: DagPath = ["a/b", "c"].into_iter().collect();
        assert_eq!(collected, path);
    }

    #[test]
    fn test_ipfs_path_trailing_separators() {
        let cid = compute_cid(codes::DAG_CBOR, HashCode::Sha2_256, b"root").unwrap();
        assert!(IpfsPath::parse(&format!("/ipfs/{}/", cid)).unwrap().path.is_empty());
        for extra in ["//", "///"] {
            assert!(matches!(
                IpfsPath::parse(&format!("/ipfs/{}{}", cid, extra)),
                Err(CoreError::InvalidPath(_))
            ));
        }
    }

    #[test]
    fn test_ipfs_path_forms() {
        let cid = compute_cid(codes::DAG_CBOR, HashCode::Sha2_256, b"root").unwrap();

        for input in [
            format!("/ipfs/{}/a/b", cid),
            format!("/ipld/{}/a/b", cid),
            format!("{}/a/b", cid),
        ] {
            let parsed = IpfsPath::parse(&input).unwrap();
            assert_eq!(parsed.root, cid);
            assert_eq!(parsed.path.to_string(), "a/b");
        }

        let bare = IpfsPath::parse(&format!("/ipfs/{}", cid)).unwrap();
        assert!(bare.path.is_empty());
        assert_eq!(bare.to_string(), format!("/ipfs/{}", cid));
    }

    #[test]
    fn test_ipfs_path_rejects_bad_cid() {
        assert!(matches!(
            IpfsPath::parse("/ipfs/not-a-cid/a"),
            Err(CoreError::InvalidPath(_))
        ));
        assert!(matches!(IpfsPath::parse("/ipfs/"), Err(CoreError::InvalidPath(_))));
    }
}
