use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use anchorage_types::{ContentAddress, OwnerAddress};

use crate::error::LedgerError;
use crate::memory::{build_confirmed_record, validate_records};
use crate::record::AnchorRecord;
use crate::traits::AnchorLedger;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

struct FileLedgerState {
    writer: BufWriter<File>,
    index: HashMap<OwnerAddress, Vec<AnchorRecord>>,
}

/// Crash-recoverable, file-backed anchor ledger.
///
/// Records are serialized with bincode, framed with a length prefix and a
/// CRC32 checksum, and appended to a single log file:
///
/// ```text
/// [4 bytes: record length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized AnchorRecord)]
/// ```
///
/// On open the file is read front-to-back into a per-owner index; a trailing
/// entry that fails the length or CRC check is treated as a torn write from
/// a crash and dropped. A record is pushed to the index only after its bytes
/// are durably on disk, so readers never observe an unconfirmed append and a
/// failed append never consumes a sequence slot.
pub struct FileAnchorLedger {
    path: PathBuf,
    state: Mutex<FileLedgerState>,
}

impl FileAnchorLedger {
    /// Open (or create) a ledger log at the given path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let (index, clean_len) = if path.exists() {
            Self::replay(&path)?
        } else {
            (HashMap::new(), 0)
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        // A torn tail must not stay in the file: the writer appends at the
        // end, and garbage between the last clean record and a new one would
        // stop the next replay early, losing confirmed records.
        let disk_len = file.metadata()?.len();
        if disk_len > clean_len {
            warn!(dropped = disk_len - clean_len, "truncating torn log tail");
            file.set_len(clean_len)?;
            file.sync_data()?;
        }

        let loaded: usize = index.values().map(Vec::len).sum();
        debug!(path = %path.display(), records = loaded, "anchor ledger opened");

        Ok(Self {
            path,
            state: Mutex::new(FileLedgerState {
                writer: BufWriter::new(file),
                index,
            }),
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate one owner's stream against its chain invariants.
    pub fn validate_stream(&self, owner: &OwnerAddress) -> Result<(), LedgerError> {
        let records = self.list_from(owner, 0)?;
        validate_records(&records)
    }

    /// Rebuild the per-owner index from the log, returning it together with
    /// the byte offset of the last cleanly-framed record's end.
    fn replay(
        path: &Path,
    ) -> Result<(HashMap<OwnerAddress, Vec<AnchorRecord>>, u64), LedgerError> {
        let raw = fs::read(path)?;
        let mut index: HashMap<OwnerAddress, Vec<AnchorRecord>> = HashMap::new();
        let mut offset = 0usize;

        while offset < raw.len() {
            if raw.len() - offset < HEADER_SIZE {
                warn!(offset, "truncated header at log tail, dropping");
                break;
            }
            let len = u32::from_le_bytes(raw[offset..offset + 4].try_into().expect("4 bytes"))
                as usize;
            let crc = u32::from_le_bytes(raw[offset + 4..offset + 8].try_into().expect("4 bytes"));
            let start = offset + HEADER_SIZE;

            if raw.len() - start < len {
                warn!(offset, "truncated payload at log tail, dropping");
                break;
            }
            let payload = &raw[start..start + len];
            if crc32fast::hash(payload) != crc {
                warn!(offset, "CRC mismatch at log tail, dropping");
                break;
            }

            let record: AnchorRecord = bincode::deserialize(payload)
                .map_err(|e| LedgerError::Serialization(e.to_string()))?;
            index.entry(record.owner).or_default().push(record);
            offset = start + len;
        }

        // A CRC-clean log must still form valid chains.
        for records in index.values() {
            validate_records(records)?;
        }
        Ok((index, offset as u64))
    }
}

impl AnchorLedger for FileAnchorLedger {
    fn append(
        &self,
        owner: &OwnerAddress,
        object_root: ContentAddress,
    ) -> Result<AnchorRecord, LedgerError> {
        let mut state = self.state.lock().map_err(|_| LedgerError::IntegrityViolation {
            seq: 0,
            reason: "ledger lock poisoned".into(),
        })?;

        let stream = state.index.entry(*owner).or_default();
        let record = build_confirmed_record(stream, owner, object_root)?;

        let payload =
            bincode::serialize(&record).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let len = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        state.writer.write_all(&len.to_le_bytes())?;
        state.writer.write_all(&crc.to_le_bytes())?;
        state.writer.write_all(&payload)?;
        state.writer.flush()?;
        state.writer.get_ref().sync_data()?;

        // Durable on disk; only now does the record become visible.
        let stream = state.index.entry(*owner).or_default();
        stream.push(record.clone());

        debug!(
            owner = %owner.short_id(),
            seq = record.seq,
            root = %record.object_root.short_hex(),
            "anchor confirmed"
        );
        Ok(record)
    }

    fn list_from(
        &self,
        owner: &OwnerAddress,
        from_seq: u64,
    ) -> Result<Vec<AnchorRecord>, LedgerError> {
        let state = self.state.lock().map_err(|_| LedgerError::IntegrityViolation {
            seq: 0,
            reason: "ledger lock poisoned".into(),
        })?;

        let Some(stream) = state.index.get(owner) else {
            return Ok(vec![]);
        };
        let start = (from_seq.saturating_sub(1) as usize).min(stream.len());
        Ok(stream[start..].to_vec())
    }

    fn count(&self, owner: &OwnerAddress) -> Result<u64, LedgerError> {
        let state = self.state.lock().map_err(|_| LedgerError::IntegrityViolation {
            seq: 0,
            reason: "ledger lock poisoned".into(),
        })?;
        Ok(state.index.get(owner).map(|s| s.len() as u64).unwrap_or(0))
    }
}

impl std::fmt::Debug for FileAnchorLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAnchorLedger")
            .field("path", &self.path)
            .finish()
    }
}
