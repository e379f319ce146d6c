use thiserror::Error;

use anchorage_chunk::ChunkError;
use anchorage_ledger::LedgerError;
use anchorage_store::StoreError;
use anchorage_types::{ContentAddress, TypeError};

/// Errors surfaced by the orchestration layer.
///
/// Each variant names the phase that failed, so callers can distinguish
/// "nothing happened" (`InvalidInput`, `InvalidOwner`) from "content is
/// persisted but unanchored" (`Anchor`, which carries the computed object
/// root so the caller can retry the anchor step alone).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The request was rejected before any work started.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The owner string is not a valid owner address.
    #[error("invalid owner address {address:?}")]
    InvalidOwner {
        address: String,
        #[source]
        source: TypeError,
    },

    /// Reading or splitting the source failed; the object may be partially
    /// persisted but was not anchored.
    #[error("chunking failed")]
    Chunk(#[source] ChunkError),

    /// The blob store rejected a read or write.
    #[error("store operation failed")]
    Store(#[from] StoreError),

    /// Content is durably stored but the anchor append failed. `object_root`
    /// is the computed root; re-anchoring it later needs no re-upload.
    #[error("anchoring failed for object {object_root}")]
    Anchor {
        object_root: ContentAddress,
        #[source]
        source: LedgerError,
    },

    /// A ledger read failed.
    #[error("ledger query failed")]
    Ledger(#[from] LedgerError),
}
