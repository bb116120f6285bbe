//! Content hashes returned by the pinning service and their `ipfs://` form.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const IPFS_SCHEME: &str = "ipfs://";

/// Content hash (an IPFS CID) as reported by the pinning service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical `ipfs://<hash>` address of this content.
    pub fn to_uri(&self) -> ContentUri {
        ContentUri(format!("{IPFS_SCHEME}{}", self.0))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value side of a result mapping.
///
/// Pins always produce `ipfs://` URIs, but mappings read from disk are
/// accepted as-is so hand-edited entries survive a load/save cycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentUri(String);

impl ContentUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The content hash, if this is an `ipfs://` URI.
    pub fn ipfs_hash(&self) -> Option<ContentHash> {
        self.0
            .strip_prefix(IPFS_SCHEME)
            .filter(|h| !h.is_empty())
            .map(ContentHash::new)
    }
}

impl From<ContentHash> for ContentUri {
    fn from(hash: ContentHash) -> Self {
        hash.to_uri()
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_round_trips_hash() {
        let hash = ContentHash::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG");
        let uri = hash.to_uri();
        assert_eq!(
            uri.as_str(),
            "ipfs://QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
        );
        assert_eq!(uri.ipfs_hash(), Some(hash));
        assert_eq!(ContentUri::new("https://example.com/a.png").ipfs_hash(), None);
        assert_eq!(ContentUri::new("ipfs://").ipfs_hash(), None);
    }
}
