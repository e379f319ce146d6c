use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use anchorage_chunk::{Block, BlockKind};
use anchorage_types::ContentAddress;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

/// On-disk kind tag: one byte prefixed to every block file.
const TAG_DATA: u8 = b'D';
const TAG_MANIFEST: u8 = b'M';

/// Disk-backed blob store: one file per block.
///
/// Blocks live under `<root>/<first two hex chars>/<remaining hex chars>`,
/// prefixed with a one-byte kind tag. Writes go to a temporary file and are
/// renamed into place, so a partially-written block is never visible under
/// its final name. The content hash is recomputed on every read; a mismatch
/// (bit rot, external tampering) surfaces as `HashMismatch`.
pub struct DiskBlobStore {
    root: PathBuf,
}

impl DiskBlobStore {
    /// Open (or create) a store rooted at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Count the block files currently on disk.
    pub fn block_count(&self) -> StoreResult<usize> {
        let mut count = 0;
        for shard in fs::read_dir(&self.root)? {
            let shard = shard?;
            if shard.file_type()?.is_dir() {
                count += fs::read_dir(shard.path())?.count();
            }
        }
        Ok(count)
    }

    fn block_path(&self, address: &ContentAddress) -> PathBuf {
        let hex = address.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn decode(address: &ContentAddress, raw: &[u8]) -> StoreResult<Block> {
        let Some((&tag, payload)) = raw.split_first() else {
            return Err(StoreError::CorruptBlock {
                address: *address,
                reason: "empty block file".into(),
            });
        };
        let kind = match tag {
            TAG_DATA => BlockKind::Data,
            TAG_MANIFEST => BlockKind::Manifest,
            other => {
                return Err(StoreError::CorruptBlock {
                    address: *address,
                    reason: format!("unknown kind tag 0x{other:02x}"),
                })
            }
        };
        Ok(Block {
            kind,
            data: payload.to_vec(),
        })
    }
}

impl BlobStore for DiskBlobStore {
    fn put(&self, block: &Block) -> StoreResult<ContentAddress> {
        let address = block.address();
        let path = self.block_path(&address);

        // Idempotent: an existing file already holds this exact content.
        if path.exists() {
            debug!(address = %address.short_hex(), "block already present, skipping write");
            return Ok(address);
        }

        let parent = path.parent().expect("block path always has a shard dir");
        fs::create_dir_all(parent)?;

        // Write-then-rename so a torn write never occupies the final name.
        let tmp = parent.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            address.short_hex()
        ));
        let mut file = fs::File::create(&tmp)?;
        let tag = match block.kind {
            BlockKind::Data => TAG_DATA,
            BlockKind::Manifest => TAG_MANIFEST,
        };
        file.write_all(&[tag])?;
        file.write_all(&block.data)?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        debug!(
            address = %address.short_hex(),
            kind = %block.kind,
            size = block.len(),
            "block written"
        );
        Ok(address)
    }

    fn get(&self, address: &ContentAddress) -> StoreResult<Block> {
        let path = self.block_path(address);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*address))
            }
            Err(e) => return Err(e.into()),
        };

        let block = Self::decode(address, &raw)?;
        let computed = block.address();
        if computed != *address {
            return Err(StoreError::HashMismatch {
                address: *address,
                computed,
            });
        }
        Ok(block)
    }

    fn contains(&self, address: &ContentAddress) -> StoreResult<bool> {
        Ok(self.block_path(address).exists())
    }
}

impl std::fmt::Debug for DiskBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskBlobStore")
            .field("root", &self.root)
            .finish()
    }
}
