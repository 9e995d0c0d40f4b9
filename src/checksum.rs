//! Source fingerprints
//!
//! A SHA-256 digest over the schema source text a schema was built from. Two
//! builds from identical files carry identical fingerprints.

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA-256 fingerprint of schema source content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from source text
    pub fn of_text(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incremental fingerprint over several named source files.
///
/// File names take part in the digest so moving a definition between files
/// changes the fingerprint.
#[derive(Default)]
pub struct SourceHasher {
    hasher: Sha256,
    files: usize,
}

impl SourceHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, name: &str, content: &str) {
        self.hasher.update(name.as_bytes());
        self.hasher.update([0u8]);
        self.hasher.update(content.as_bytes());
        self.hasher.update([0u8]);
        self.files += 1;
    }

    pub fn files(&self) -> usize {
        self.files
    }

    pub fn finish(self) -> Checksum {
        Checksum(format!("{:x}", self.hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"{"aggregates": [{"name": "営業所"}]}"#;
        assert_eq!(Checksum::of_text(content), Checksum::of_text(content));
    }

    #[test]
    fn test_checksum_is_hex_sha256() {
        let checksum = Checksum::of_text(r#"{"aggregates": []}"#);
        assert_eq!(checksum.as_str().len(), 64);
        assert!(checksum.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(checksum, Checksum::of_text("different content"));
    }

    #[test]
    fn test_file_names_are_part_of_the_digest() {
        let mut first = SourceHasher::new();
        first.update("a.json", "{}");
        first.update("b.json", "[]");

        let mut swapped = SourceHasher::new();
        swapped.update("a.json", "[]");
        swapped.update("b.json", "{}");

        assert_eq!(first.files(), 2);
        assert_ne!(first.finish(), swapped.finish());
    }
}
