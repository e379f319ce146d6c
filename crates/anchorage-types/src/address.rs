use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifies a stored block by its content.
///
/// An address is a 32-byte BLAKE3 digest; the chunking layer applies a
/// per-kind domain tag before hashing, so a data block and a manifest can
/// never collide. Equal content means equal address, which is what makes
/// the blob store deduplicating and every read verifiable: recompute the
/// digest, compare, done.
///
/// Addresses travel as 64-char hex on the CLI and in listings; logs use
/// the 8-char short form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentAddress([u8; 32]);

impl ContentAddress {
    /// Wrap a digest the hashing layer already computed.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// Hash raw bytes directly, without a domain tag.
    ///
    /// Block addressing goes through the chunking layer's domain-separated
    /// hasher; this is for addressing things that are not blocks (test
    /// fixtures, ad-hoc roots).
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Parse the 64-char hex form back into an address.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| TypeError::InvalidLength {
            expected: 32,
            actual: v.len(),
        })?;
        Ok(Self(arr))
    }

    /// The raw digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full hex form, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.short_hex())
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ContentAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
