//! Content hashing for cache keys.
//!
//! Cache file names must not change between builds of the linker, so this
//! uses SHA-256 rather than an in-process hasher.

use std::fmt;

use sha2::{Digest, Sha256};

/// A SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Lowercase hex, 64 characters. Safe as a file name.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Hash a string.
#[must_use]
pub fn hash_string(s: &str) -> ContentHash {
    hash_bytes(s.as_bytes())
}

/// Hash raw bytes.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    ContentHash(Sha256::digest(data).into())
}

#[cfg(test)]
mod tests;
