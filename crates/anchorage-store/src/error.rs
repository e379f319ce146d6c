use anchorage_types::ContentAddress;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(ContentAddress),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {address}: computed {computed}")]
    HashMismatch {
        address: ContentAddress,
        computed: ContentAddress,
    },

    /// The store cannot hold the block without exceeding its capacity.
    #[error("storage full: {needed} more bytes needed, capacity {capacity}")]
    StorageFull { needed: u64, capacity: u64 },

    /// The block data on disk is malformed or cannot be decoded.
    #[error("corrupt block {address}: {reason}")]
    CorruptBlock {
        address: ContentAddress,
        reason: String,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
