use std::collections::HashMap;
use std::sync::RwLock;

use anchorage_types::{ContentAddress, OwnerAddress};

use crate::error::LedgerError;
use crate::record::{now_ms, AnchorRecord, ConfirmationReceipt};
use crate::traits::AnchorLedger;

/// In-memory anchor ledger for tests, local demos, and embedding.
pub struct InMemoryAnchorLedger {
    inner: RwLock<HashMap<OwnerAddress, Vec<AnchorRecord>>>,
}

impl InMemoryAnchorLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Validate hash chain, sequence contiguity, and receipt integrity for
    /// one owner's stream.
    pub fn validate_stream(&self, owner: &OwnerAddress) -> Result<(), LedgerError> {
        let records = self.list_from(owner, 0)?;
        validate_records(&records)
    }

    /// Owners with at least one record, in unspecified order.
    pub fn owners(&self) -> Result<Vec<OwnerAddress>, LedgerError> {
        let map = self.inner.read().map_err(|_| LedgerError::IntegrityViolation {
            seq: 0,
            reason: "ledger read lock poisoned".into(),
        })?;
        Ok(map.keys().copied().collect())
    }
}

impl Default for InMemoryAnchorLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AnchorLedger for InMemoryAnchorLedger {
    fn append(
        &self,
        owner: &OwnerAddress,
        object_root: ContentAddress,
    ) -> Result<AnchorRecord, LedgerError> {
        let mut map = self.inner.write().map_err(|_| LedgerError::IntegrityViolation {
            seq: 0,
            reason: "ledger write lock poisoned".into(),
        })?;

        let stream = map.entry(*owner).or_default();
        let record = build_confirmed_record(stream, owner, object_root)?;
        stream.push(record.clone());
        Ok(record)
    }

    fn list_from(
        &self,
        owner: &OwnerAddress,
        from_seq: u64,
    ) -> Result<Vec<AnchorRecord>, LedgerError> {
        let map = self.inner.read().map_err(|_| LedgerError::IntegrityViolation {
            seq: 0,
            reason: "ledger read lock poisoned".into(),
        })?;

        let Some(stream) = map.get(owner) else {
            return Ok(vec![]);
        };

        let start = (from_seq.saturating_sub(1) as usize).min(stream.len());
        Ok(stream[start..].to_vec())
    }

    fn count(&self, owner: &OwnerAddress) -> Result<u64, LedgerError> {
        let map = self.inner.read().map_err(|_| LedgerError::IntegrityViolation {
            seq: 0,
            reason: "ledger read lock poisoned".into(),
        })?;
        Ok(map.get(owner).map(|s| s.len() as u64).unwrap_or(0))
    }
}

/// Build the next confirmed record for a stream. Shared by the in-memory
/// and file backends; the caller holds the stream's write lock.
pub(crate) fn build_confirmed_record(
    stream: &[AnchorRecord],
    owner: &OwnerAddress,
    object_root: ContentAddress,
) -> Result<AnchorRecord, LedgerError> {
    let seq = stream.len() as u64 + 1;
    let prev = stream.last();
    let prev_hash = prev.map(|r| r.receipt.receipt_hash);
    // Keep confirmation times non-decreasing within a stream even if the
    // wall clock steps backwards.
    let confirmed_at_ms = prev
        .map(|r| r.receipt.confirmed_at_ms)
        .unwrap_or(0)
        .max(now_ms());

    let mut record = AnchorRecord {
        owner: *owner,
        object_root,
        seq,
        receipt: ConfirmationReceipt {
            receipt_hash: [0; 32],
            prev_hash,
            confirmed_at_ms,
        },
    };
    record.receipt.receipt_hash = record.compute_receipt_hash()?;
    Ok(record)
}

/// Validate an owner stream: contiguous sequences from 1, intact prev-hash
/// links, and receipt hashes matching record contents.
pub(crate) fn validate_records(records: &[AnchorRecord]) -> Result<(), LedgerError> {
    for (index, record) in records.iter().enumerate() {
        let expected_seq = (index + 1) as u64;
        if record.seq != expected_seq {
            return Err(LedgerError::IntegrityViolation {
                seq: record.seq,
                reason: format!("expected seq {expected_seq}, found {}", record.seq),
            });
        }

        let expected_prev = if index == 0 {
            None
        } else {
            Some(records[index - 1].receipt.receipt_hash)
        };
        if record.receipt.prev_hash != expected_prev {
            return Err(LedgerError::IntegrityViolation {
                seq: record.seq,
                reason: "previous hash link mismatch".into(),
            });
        }

        if !record.verify_receipt()? {
            return Err(LedgerError::IntegrityViolation {
                seq: record.seq,
                reason: "receipt hash mismatch".into(),
            });
        }
    }
    Ok(())
}
