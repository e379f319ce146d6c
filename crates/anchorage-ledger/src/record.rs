use serde::{Deserialize, Serialize};

use anchorage_types::{ContentAddress, OwnerAddress};

use crate::error::LedgerError;

/// Confirmation of a committed anchor.
///
/// `receipt_hash` covers the whole record (with this field zeroed), and
/// `prev_hash` links to the owner's previous record, forming a per-owner
/// hash chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationReceipt {
    /// BLAKE3 hash of the canonical record.
    pub receipt_hash: [u8; 32],
    /// Receipt hash of the owner's previous record, if any.
    pub prev_hash: Option<[u8; 32]>,
    /// Wall-clock confirmation time, milliseconds since the Unix epoch.
    /// Non-decreasing within an owner's stream.
    pub confirmed_at_ms: u64,
}

/// A confirmed entry binding an owner address to an object root.
///
/// Records are immutable once confirmed. `seq` starts at 1 and increases by
/// exactly 1 per record within an owner's stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// The ledger partition this record belongs to.
    pub owner: OwnerAddress,
    /// The anchored object root.
    pub object_root: ContentAddress,
    /// Position in the owner's stream, assigned by the ledger.
    pub seq: u64,
    /// Confirmation receipt.
    pub receipt: ConfirmationReceipt,
}

impl AnchorRecord {
    /// Recompute the receipt hash from the canonical record form (receipt
    /// hash zeroed, everything else as stored).
    pub fn compute_receipt_hash(&self) -> Result<[u8; 32], LedgerError> {
        let mut canonical = self.clone();
        canonical.receipt.receipt_hash = [0; 32];

        let encoded = serde_json::to_vec(&canonical)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"anchorage-anchor-v1:");
        hasher.update(&encoded);
        Ok(*hasher.finalize().as_bytes())
    }

    /// Verify the stored receipt hash against the record contents.
    pub fn verify_receipt(&self) -> Result<bool, LedgerError> {
        Ok(self.compute_receipt_hash()? == self.receipt.receipt_hash)
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
