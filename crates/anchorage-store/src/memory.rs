use std::collections::HashMap;
use std::sync::RwLock;

use anchorage_chunk::Block;
use anchorage_types::ContentAddress;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. All blocks are held in memory behind a
/// `RwLock`; blocks are cloned on read. An optional byte capacity makes
/// `StorageFull` reachable without filling a real disk.
pub struct InMemoryBlobStore {
    blocks: RwLock<HashMap<ContentAddress, Block>>,
    capacity: Option<u64>,
}

impl InMemoryBlobStore {
    /// Create a new empty store with unbounded capacity.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            capacity: None,
        }
    }

    /// Create a store that holds at most `capacity` payload bytes.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|block| block.len() as u64)
            .sum()
    }

    /// Remove all blocks from the store.
    pub fn clear(&self) {
        self.blocks.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all addresses in the store.
    pub fn all_addresses(&self) -> Vec<ContentAddress> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut addresses: Vec<ContentAddress> = map.keys().copied().collect();
        addresses.sort();
        addresses
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, block: &Block) -> StoreResult<ContentAddress> {
        let address = block.address();
        let mut map = self.blocks.write().expect("lock poisoned");

        // Idempotent: if already present, skip (content-addressing
        // guarantees the same address always maps to the same payload).
        if map.contains_key(&address) {
            return Ok(address);
        }

        if let Some(capacity) = self.capacity {
            let used: u64 = map.values().map(|b| b.len() as u64).sum();
            let needed = block.len() as u64;
            if used + needed > capacity {
                return Err(StoreError::StorageFull { needed, capacity });
            }
        }

        map.insert(address, block.clone());
        Ok(address)
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<Block> {
        let map = self.blocks.read().expect("lock poisoned");
        map.get(address)
            .cloned()
            .ok_or(StoreError::NotFound(*address))
    }

    fn contains(&self, address: &ContentAddress) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(address))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("block_count", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
