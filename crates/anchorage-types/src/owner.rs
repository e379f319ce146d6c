use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// External account identity used as the ledger's partition key.
///
/// The textual form is `0x` followed by 40 hex characters. Mixed-case
/// strings carry a checksum in their casing (derived from a BLAKE3 hash of
/// the lowercase hex) and are rejected when the casing does not match;
/// all-lowercase and all-uppercase strings are accepted as checksum-less.
///
/// An `OwnerAddress` value is always well-formed: parsing is the only way
/// to obtain one from a string, so downstream code never re-validates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerAddress([u8; 20]);

impl OwnerAddress {
    /// Parse and validate an owner address from its textual form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| TypeError::MalformedOwner("missing 0x prefix".into()))?;

        if hex_part.len() != 40 {
            return Err(TypeError::InvalidLength {
                expected: 20,
                actual: hex_part.len() / 2,
            });
        }

        let bytes = hex::decode(hex_part).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        let owner = Self(arr);

        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        if has_upper && has_lower && s != owner.to_checksum_string() {
            return Err(TypeError::ChecksumMismatch);
        }

        Ok(owner)
    }

    /// Create an owner address from raw bytes.
    pub const fn from_raw(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// A random owner address, for tests and demos.
    pub fn random() -> Self {
        let mut bytes = [0u8; 20];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// The raw 20-byte account identifier.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Checksummed textual form: `0x` + 40 hex chars with checksum casing.
    ///
    /// A hex digit is uppercased when the corresponding nibble of
    /// `BLAKE3("anchorage-owner-v1:" + lowercase_hex)` is >= 8.
    pub fn to_checksum_string(&self) -> String {
        let lower = hex::encode(self.0);
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"anchorage-owner-v1:");
        hasher.update(lower.as_bytes());
        let digest = *hasher.finalize().as_bytes();

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, ch) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                digest[i / 2] >> 4
            } else {
                digest[i / 2] & 0x0f
            };
            if ch.is_ascii_alphabetic() && nibble >= 8 {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Short identifier (first 8 hex characters), for logs.
    pub fn short_id(&self) -> String {
        format!("0x{}…", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for OwnerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerAddress({})", self.short_id())
    }
}

impl fmt::Display for OwnerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum_string())
    }
}

impl std::str::FromStr for OwnerAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
