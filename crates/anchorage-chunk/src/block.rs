use serde::{Deserialize, Serialize};

use anchorage_types::ContentAddress;

use crate::error::ChunkError;
use crate::hasher::ContentHasher;

/// The kind of block stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Raw content bytes.
    Data,
    /// Serialized manifest listing the child blocks of a multi-block object.
    Manifest,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Data => write!(f, "data"),
            Self::Manifest => write!(f, "manifest"),
        }
    }
}

/// A bounded-size byte sequence plus its kind tag.
///
/// `Block` is the unit of storage. The blob store never interprets block
/// contents; the kind tag only selects the hashing domain and tells readers
/// whether the payload is raw data or a serialized [`Manifest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// The kind of this block.
    pub kind: BlockKind,
    /// The payload bytes.
    pub data: Vec<u8>,
}

impl Block {
    /// Create a data block from raw bytes.
    pub fn data(data: Vec<u8>) -> Self {
        Self {
            kind: BlockKind::Data,
            data,
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Compute the content address of this block.
    ///
    /// Uses the domain-separated hasher for the block's kind, so identical
    /// payloads of different kinds never share an address.
    pub fn address(&self) -> ContentAddress {
        let hasher = match self.kind {
            BlockKind::Data => &ContentHasher::BLOCK,
            BlockKind::Manifest => &ContentHasher::MANIFEST,
        };
        hasher.hash(&self.data)
    }
}

/// Ordered description of a multi-block object.
///
/// The manifest's own block address is the object root for any object that
/// spans more than one data block. Retrieval is recursive: read the
/// manifest, then read each child in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Child block addresses, in object order.
    pub children: Vec<ContentAddress>,
    /// Total object length in bytes, across all children.
    pub total_len: u64,
}

impl Manifest {
    /// Create a manifest over the given children.
    pub fn new(children: Vec<ContentAddress>, total_len: u64) -> Self {
        Self {
            children,
            total_len,
        }
    }

    /// Number of child blocks.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the manifest has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Serialize into a `Manifest`-kind block.
    pub fn to_block(&self) -> Result<Block, ChunkError> {
        let data =
            serde_json::to_vec(self).map_err(|e| ChunkError::Serialization(e.to_string()))?;
        Ok(Block {
            kind: BlockKind::Manifest,
            data,
        })
    }

    /// Decode from a block.
    pub fn from_block(block: &Block) -> Result<Self, ChunkError> {
        if block.kind != BlockKind::Manifest {
            return Err(ChunkError::Serialization(format!(
                "expected manifest block, got {}",
                block.kind
            )));
        }
        serde_json::from_slice(&block.data).map_err(|e| ChunkError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_block_address_is_deterministic() {
        let b1 = Block::data(b"hello".to_vec());
        let b2 = Block::data(b"hello".to_vec());
        assert_eq!(b1.address(), b2.address());
    }

    #[test]
    fn kind_selects_hash_domain() {
        let data = Block::data(b"payload".to_vec());
        let manifest = Block {
            kind: BlockKind::Manifest,
            data: b"payload".to_vec(),
        };
        assert_ne!(data.address(), manifest.address());
    }

    #[test]
    fn manifest_roundtrip() {
        let manifest = Manifest::new(
            vec![
                ContentAddress::from_bytes(b"a"),
                ContentAddress::from_bytes(b"b"),
            ],
            2048,
        );
        let block = manifest.to_block().unwrap();
        assert_eq!(block.kind, BlockKind::Manifest);
        let decoded = Manifest::from_block(&block).unwrap();
        assert_eq!(manifest, decoded);
    }

    #[test]
    fn manifest_from_data_block_is_rejected() {
        let block = Block::data(b"not a manifest".to_vec());
        let err = Manifest::from_block(&block).unwrap_err();
        assert!(matches!(err, ChunkError::Serialization(_)));
    }

    #[test]
    fn manifest_preserves_child_order() {
        let children: Vec<ContentAddress> = (0u8..5)
            .map(|i| ContentAddress::from_bytes(&[i]))
            .collect();
        let manifest = Manifest::new(children.clone(), 5);
        let decoded = Manifest::from_block(&manifest.to_block().unwrap()).unwrap();
        assert_eq!(decoded.children, children);
    }

    #[test]
    fn empty_block() {
        let block = Block::data(Vec::new());
        assert!(block.is_empty());
        assert_eq!(block.len(), 0);
        // The empty block still has a well-defined address.
        assert_eq!(block.address(), ContentHasher::BLOCK.hash(b""));
    }
}
