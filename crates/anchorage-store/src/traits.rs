use anchorage_chunk::Block;
use anchorage_types::ContentAddress;

use crate::error::StoreResult;

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written; the same payload always produces
///   the same address.
/// - `put` is idempotent: storing an already-present block is a no-op and
///   never an error (deduplication).
/// - Concurrent reads are always safe; concurrent `put`s with different
///   addresses are safe.
/// - All I/O errors are propagated, never silently ignored. No retries at
///   this layer — retry policy belongs to the caller.
pub trait BlobStore: Send + Sync {
    /// Persist a block and return its content address.
    fn put(&self, block: &Block) -> StoreResult<ContentAddress>;

    /// Read a block by its content address.
    ///
    /// Returns `StoreError::NotFound` for unknown addresses.
    fn get(&self, address: &ContentAddress) -> StoreResult<Block>;

    /// Check whether a block exists in the store.
    fn contains(&self, address: &ContentAddress) -> StoreResult<bool>;

    /// Persist multiple blocks and return their addresses.
    ///
    /// Default implementation calls `put()` for each block. Backends may
    /// override for better performance (e.g., fewer I/O round-trips).
    fn put_batch(&self, blocks: &[Block]) -> StoreResult<Vec<ContentAddress>> {
        blocks.iter().map(|block| self.put(block)).collect()
    }
}
