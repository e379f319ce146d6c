use anchorage_types::{ContentAddress, OwnerAddress};

use crate::error::LedgerError;
use crate::record::AnchorRecord;

/// Append-only, per-owner anchor ledger.
///
/// Implementations must serialize sequence assignment within an owner's
/// stream: concurrent appends never collide on a `seq` value, and the
/// bundled backends never consume a slot on a failed attempt (a backend
/// where failed transactions burn a slot must say so in its docs).
///
/// A record becomes visible to readers only once its append has been
/// confirmed — readers never observe an in-flight append.
pub trait AnchorLedger: Send + Sync {
    /// Transactionally append an object root to the owner's stream.
    ///
    /// On success the returned record is confirmed, with
    /// `seq = prior max + 1`. On failure no record is created; the error
    /// carries the backend's reason and is never retried at this layer.
    fn append(
        &self,
        owner: &OwnerAddress,
        object_root: ContentAddress,
    ) -> Result<AnchorRecord, LedgerError>;

    /// Read the owner's records in ascending order, inclusive of `from_seq`.
    ///
    /// `0` and `1` both mean "from the start". The result is finite and the
    /// query is restartable. An unknown owner yields an empty list.
    fn list_from(
        &self,
        owner: &OwnerAddress,
        from_seq: u64,
    ) -> Result<Vec<AnchorRecord>, LedgerError>;

    /// Number of records in the owner's stream.
    fn count(&self, owner: &OwnerAddress) -> Result<u64, LedgerError>;
}
