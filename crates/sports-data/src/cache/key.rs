use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::Operation;

/// Deterministic cache key: hex SHA-256 of the operation name and its
/// normalized arguments, sorted by argument name.
///
/// The same key addresses the entry in memory and names its file on disk.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_operation(operation: &Operation) -> Self {
        Self::from_parts(operation.name(), operation.args())
    }

    /// Build a key from an operation name and `(name, value)` pairs in any
    /// order.
    pub fn from_parts<K, V>(operation: &str, args: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let args: BTreeMap<String, String> = args
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        // serde_json cannot fail on a string map
        let canonical = serde_json::to_string(&(operation, &args)).unwrap_or_default();
        let digest = Sha256::digest(canonical.as_bytes());
        Self(hex::encode(digest))
    }

    /// Recover a key from a cache file stem. Rejects anything that is not a
    /// 64-character lowercase hex digest.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        let valid = stem.len() == 64
            && stem
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(stem.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
