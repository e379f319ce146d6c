use std::io::Read;

use tracing::{debug, info};

use anchorage_chunk::{BlockKind, Chunker, Manifest, DEFAULT_MAX_BLOCK_SIZE};
use anchorage_ledger::{AnchorLedger, AnchorRecord};
use anchorage_store::{BlobStore, StoreError};
use anchorage_types::{ContentAddress, OwnerAddress};

use crate::error::OrchestratorError;
use crate::source::StoreRequest;

/// The result of a successful store-and-anchor run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOutcome {
    /// Content address identifying the whole object.
    pub object_root: ContentAddress,
    /// The confirmed ledger record.
    pub record: AnchorRecord,
}

/// The orchestration facade: chunk, persist, then anchor.
///
/// `Anchorage` is generic over its two backends and owns neither policy
/// beyond ordering: content is durably stored before the ledger sees it, so
/// a listed root is always retrievable from the paired store. If anchoring
/// fails the content stays put and the error carries the computed root, so
/// a retry (same bytes or [`anchor_existing`](Self::anchor_existing)) pays
/// no second upload thanks to store dedup.
pub struct Anchorage<S, L> {
    store: S,
    ledger: L,
    max_block_size: usize,
}

impl<S: BlobStore, L: AnchorLedger> Anchorage<S, L> {
    /// Build an orchestrator over the given backends, using the default
    /// block size.
    pub fn new(store: S, ledger: L) -> Self {
        Self {
            store,
            ledger,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }

    /// Override the default maximum data block size. Per-request overrides
    /// still win. Zero is rejected when a request is processed.
    pub fn with_max_block_size(mut self, size: usize) -> Self {
        self.max_block_size = size;
        self
    }

    /// The paired blob store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The paired anchor ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Store the request's content and anchor its root under `owner`.
    ///
    /// Phases run in order: validate the owner string and the request,
    /// chunk the source while persisting each block, then append the object
    /// root to the owner's ledger stream. Identical content always yields
    /// the identical root, and re-storing present blocks is a no-op.
    pub fn store_and_anchor(
        &self,
        request: StoreRequest,
        owner: &str,
    ) -> Result<StoreOutcome, OrchestratorError> {
        let owner = parse_owner(owner)?;
        let (source, block_size) = request.resolve()?;
        let chunker = Chunker::new(block_size.unwrap_or(self.max_block_size))
            .map_err(|e| OrchestratorError::InvalidInput(e.to_string()))?;

        let reader = source.open()?;
        let object_root = self.persist_blocks(&chunker, reader)?;
        debug!(root = %object_root.short_hex(), "content persisted");

        let record = self
            .ledger
            .append(&owner, object_root)
            .map_err(|source| OrchestratorError::Anchor {
                object_root,
                source,
            })?;

        info!(
            owner = %owner.short_id(),
            root = %object_root.short_hex(),
            seq = record.seq,
            "object stored and anchored"
        );
        Ok(StoreOutcome {
            object_root,
            record,
        })
    }

    /// Anchor an object root that is already present in the store.
    ///
    /// This is the retry path after an [`Anchor`](OrchestratorError::Anchor)
    /// failure: no bytes move, only the ledger append runs. The root must
    /// exist in the paired store, otherwise listings would advertise
    /// unretrievable content.
    pub fn anchor_existing(
        &self,
        owner: &str,
        object_root: ContentAddress,
    ) -> Result<AnchorRecord, OrchestratorError> {
        let owner = parse_owner(owner)?;
        if !self.store.contains(&object_root)? {
            return Err(OrchestratorError::Store(StoreError::NotFound(object_root)));
        }

        let record = self
            .ledger
            .append(&owner, object_root)
            .map_err(|source| OrchestratorError::Anchor {
                object_root,
                source,
            })?;
        info!(
            owner = %owner.short_id(),
            root = %object_root.short_hex(),
            seq = record.seq,
            "existing object anchored"
        );
        Ok(record)
    }

    /// List every anchored record for `owner`, oldest first.
    ///
    /// An owner with no records gets an empty list, not an error.
    pub fn list_anchored(&self, owner: &str) -> Result<Vec<AnchorRecord>, OrchestratorError> {
        self.list_anchored_from(owner, 0)
    }

    /// List the owner's records starting at `from_seq`, inclusive.
    ///
    /// `0` and `1` both mean the start of the stream.
    pub fn list_anchored_from(
        &self,
        owner: &str,
        from_seq: u64,
    ) -> Result<Vec<AnchorRecord>, OrchestratorError> {
        let owner = parse_owner(owner)?;
        Ok(self.ledger.list_from(&owner, from_seq)?)
    }

    /// Reassemble an object's bytes from its root address.
    ///
    /// A data root is returned as-is; a manifest root is expanded by reading
    /// each child in order. The reassembled length must match the manifest's
    /// recorded total.
    pub fn retrieve(&self, object_root: &ContentAddress) -> Result<Vec<u8>, OrchestratorError> {
        let block = self.store.get(object_root)?;
        match block.kind {
            BlockKind::Data => Ok(block.data),
            BlockKind::Manifest => {
                let manifest = Manifest::from_block(&block).map_err(OrchestratorError::Chunk)?;
                let mut out = Vec::with_capacity(manifest.total_len as usize);
                for child in &manifest.children {
                    let child_block = self.store.get(child)?;
                    if child_block.kind != BlockKind::Data {
                        return Err(OrchestratorError::Store(StoreError::CorruptBlock {
                            address: *child,
                            reason: "manifest child is not a data block".into(),
                        }));
                    }
                    out.extend_from_slice(&child_block.data);
                }
                if out.len() as u64 != manifest.total_len {
                    return Err(OrchestratorError::Store(StoreError::CorruptBlock {
                        address: *object_root,
                        reason: format!(
                            "reassembled {} bytes, manifest records {}",
                            out.len(),
                            manifest.total_len
                        ),
                    }));
                }
                Ok(out)
            }
        }
    }

    /// Drive the block stream, persisting every block, and return the root.
    fn persist_blocks(
        &self,
        chunker: &Chunker,
        reader: Box<dyn Read>,
    ) -> Result<ContentAddress, OrchestratorError> {
        let mut stream = chunker.chunk(reader);
        let mut stored = 0usize;
        for block in stream.by_ref() {
            let block = block.map_err(OrchestratorError::Chunk)?;
            self.store.put(&block)?;
            stored += 1;
        }
        let root = stream
            .object_root()
            .expect("drained stream always has a root");
        debug!(blocks = stored, bytes = stream.bytes_read(), "chunking finished");
        Ok(root)
    }
}

fn parse_owner(address: &str) -> Result<OwnerAddress, OrchestratorError> {
    OwnerAddress::parse(address).map_err(|source| OrchestratorError::InvalidOwner {
        address: address.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorage_chunk::ContentHasher;
    use anchorage_ledger::{InMemoryAnchorLedger, LedgerError};
    use anchorage_store::InMemoryBlobStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn valid_owner() -> String {
        OwnerAddress::from_raw([0x42; 20]).to_string()
    }

    fn orchestrator() -> Anchorage<InMemoryBlobStore, InMemoryAnchorLedger> {
        Anchorage::new(InMemoryBlobStore::new(), InMemoryAnchorLedger::new())
    }

    #[test]
    fn hello_world_single_block_end_to_end() {
        let anchorage = orchestrator();
        let owner = valid_owner();

        let outcome = anchorage
            .store_and_anchor(StoreRequest::from_bytes(b"hello world".to_vec()), &owner)
            .unwrap();

        // One data block, no manifest, root is the block's hash.
        assert_eq!(outcome.object_root, ContentHasher::BLOCK.hash(b"hello world"));
        assert_eq!(anchorage.store().len(), 1);
        assert_eq!(outcome.record.seq, 1);

        let records = anchorage.list_anchored(&owner).unwrap();
        assert_eq!(records, vec![outcome.record]);
        assert_eq!(
            anchorage.retrieve(&outcome.object_root).unwrap(),
            b"hello world"
        );
    }

    #[test]
    fn multi_block_object_round_trips() {
        let anchorage = orchestrator();
        let input = vec![0u8; 3000];

        let outcome = anchorage
            .store_and_anchor(
                StoreRequest::from_bytes(input.clone()).max_block_size(1024),
                &valid_owner(),
            )
            .unwrap();

        // 3 data blocks + 1 manifest.
        assert_eq!(anchorage.store().len(), 4);
        assert_eq!(anchorage.retrieve(&outcome.object_root).unwrap(), input);
    }

    #[test]
    fn empty_input_round_trips() {
        let anchorage = orchestrator();
        let outcome = anchorage
            .store_and_anchor(StoreRequest::from_bytes(Vec::new()), &valid_owner())
            .unwrap();
        assert_eq!(outcome.object_root, ContentHasher::BLOCK.hash(b""));
        assert!(anchorage.retrieve(&outcome.object_root).unwrap().is_empty());
    }

    #[test]
    fn file_source_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        std::fs::write(&path, b"from a file").unwrap();

        let anchorage = orchestrator();
        let outcome = anchorage
            .store_and_anchor(StoreRequest::from_path(&path), &valid_owner())
            .unwrap();
        assert_eq!(
            anchorage.retrieve(&outcome.object_root).unwrap(),
            b"from a file"
        );
    }

    #[test]
    fn repeat_store_is_idempotent() {
        let anchorage = orchestrator();
        let owner = valid_owner();
        let request = StoreRequest::from_bytes(b"same bytes".to_vec());

        let first = anchorage.store_and_anchor(request.clone(), &owner).unwrap();
        let blocks_after_first = anchorage.store().len();
        let second = anchorage.store_and_anchor(request, &owner).unwrap();

        // Same root, no new blocks, but a fresh ledger record.
        assert_eq!(first.object_root, second.object_root);
        assert_eq!(anchorage.store().len(), blocks_after_first);
        assert_eq!(second.record.seq, 2);
    }

    #[test]
    fn malformed_owner_is_rejected_before_any_work() {
        let anchorage = orchestrator();
        let err = anchorage
            .store_and_anchor(StoreRequest::from_bytes(b"data".to_vec()), "not-an-address")
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidOwner { .. }));
        assert!(anchorage.store().is_empty());
    }

    #[test]
    fn list_rejects_malformed_owner() {
        let anchorage = orchestrator();
        let err = anchorage.list_anchored("0x123").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidOwner { .. }));
    }

    #[test]
    fn missing_source_is_rejected() {
        let anchorage = orchestrator();
        let err = anchorage
            .store_and_anchor(StoreRequest::new(), &valid_owner())
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let anchorage = orchestrator();
        let err = anchorage
            .store_and_anchor(
                StoreRequest::from_bytes(b"data".to_vec()).max_block_size(0),
                &valid_owner(),
            )
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));
    }

    #[test]
    fn list_from_seq_delegates_to_ledger_range() {
        let anchorage = orchestrator();
        let owner = valid_owner();
        for i in 0u8..4 {
            anchorage
                .store_and_anchor(StoreRequest::from_bytes(vec![i; 10]), &owner)
                .unwrap();
        }

        let records = anchorage.list_anchored_from(&owner, 3).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].seq, 3);

        // 0 and 1 both mean the start.
        assert_eq!(anchorage.list_anchored_from(&owner, 0).unwrap().len(), 4);
        assert_eq!(anchorage.list_anchored_from(&owner, 1).unwrap().len(), 4);
    }

    #[test]
    fn list_for_unknown_owner_is_empty() {
        let anchorage = orchestrator();
        assert!(anchorage.list_anchored(&valid_owner()).unwrap().is_empty());
    }

    #[test]
    fn retrieve_unknown_root_is_not_found() {
        let anchorage = orchestrator();
        let err = anchorage
            .retrieve(&ContentAddress::from_bytes(b"never stored"))
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Store(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn full_store_surfaces_storage_error() {
        let anchorage = Anchorage::new(
            InMemoryBlobStore::with_capacity(8),
            InMemoryAnchorLedger::new(),
        );
        let err = anchorage
            .store_and_anchor(
                StoreRequest::from_bytes(vec![1u8; 64]),
                &valid_owner(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Store(StoreError::StorageFull { .. })
        ));
        // Nothing was anchored.
        assert!(anchorage.list_anchored(&valid_owner()).unwrap().is_empty());
    }

    /// Ledger double that rejects the first `fail_count` appends.
    struct FlakyLedger {
        inner: InMemoryAnchorLedger,
        failures_left: AtomicUsize,
    }

    impl FlakyLedger {
        fn failing(count: usize) -> Self {
            Self {
                inner: InMemoryAnchorLedger::new(),
                failures_left: AtomicUsize::new(count),
            }
        }
    }

    impl AnchorLedger for FlakyLedger {
        fn append(
            &self,
            owner: &OwnerAddress,
            object_root: ContentAddress,
        ) -> Result<AnchorRecord, LedgerError> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(LedgerError::Rejected {
                    reason: "backend unavailable".into(),
                });
            }
            self.inner.append(owner, object_root)
        }

        fn list_from(
            &self,
            owner: &OwnerAddress,
            from_seq: u64,
        ) -> Result<Vec<AnchorRecord>, LedgerError> {
            self.inner.list_from(owner, from_seq)
        }

        fn count(&self, owner: &OwnerAddress) -> Result<u64, LedgerError> {
            self.inner.count(owner)
        }
    }

    #[test]
    fn failed_anchor_keeps_content_and_reports_root() {
        let anchorage = Anchorage::new(InMemoryBlobStore::new(), FlakyLedger::failing(1));
        let owner = valid_owner();
        let request = StoreRequest::from_bytes(b"persist me".to_vec());

        let err = anchorage
            .store_and_anchor(request.clone(), &owner)
            .unwrap_err();
        let OrchestratorError::Anchor { object_root, .. } = err else {
            panic!("expected anchor failure, got {err:?}");
        };

        // Content survived the failed anchor.
        assert!(anchorage.store().contains(&object_root).unwrap());
        assert!(anchorage.list_anchored(&owner).unwrap().is_empty());

        // Retrying the same request succeeds without re-uploading.
        let blocks_before = anchorage.store().len();
        let outcome = anchorage.store_and_anchor(request, &owner).unwrap();
        assert_eq!(outcome.object_root, object_root);
        assert_eq!(anchorage.store().len(), blocks_before);
        assert_eq!(outcome.record.seq, 1);
    }

    #[test]
    fn anchor_existing_retries_without_moving_bytes() {
        let anchorage = Anchorage::new(InMemoryBlobStore::new(), FlakyLedger::failing(1));
        let owner = valid_owner();

        let err = anchorage
            .store_and_anchor(StoreRequest::from_bytes(b"retry me".to_vec()), &owner)
            .unwrap_err();
        let OrchestratorError::Anchor { object_root, .. } = err else {
            panic!("expected anchor failure, got {err:?}");
        };

        let record = anchorage.anchor_existing(&owner, object_root).unwrap();
        assert_eq!(record.object_root, object_root);
        assert_eq!(record.seq, 1);
    }

    #[test]
    fn anchor_existing_rejects_unknown_root() {
        let anchorage = orchestrator();
        let err = anchorage
            .anchor_existing(&valid_owner(), ContentAddress::from_bytes(b"phantom"))
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Store(StoreError::NotFound(_))
        ));
        // The ledger never saw it.
        assert!(anchorage.list_anchored(&valid_owner()).unwrap().is_empty());
    }

    #[test]
    fn owners_streams_stay_separate() {
        let anchorage = orchestrator();
        let alice = OwnerAddress::from_raw([1; 20]).to_string();
        let bob = OwnerAddress::from_raw([2; 20]).to_string();

        anchorage
            .store_and_anchor(StoreRequest::from_bytes(b"alice's".to_vec()), &alice)
            .unwrap();
        anchorage
            .store_and_anchor(StoreRequest::from_bytes(b"bob's".to_vec()), &bob)
            .unwrap();

        assert_eq!(anchorage.list_anchored(&alice).unwrap().len(), 1);
        assert_eq!(anchorage.list_anchored(&bob).unwrap().len(), 1);
        assert_eq!(anchorage.list_anchored(&alice).unwrap()[0].seq, 1);
        assert_eq!(anchorage.list_anchored(&bob).unwrap()[0].seq, 1);
    }

    #[test]
    fn records_list_in_anchor_order() {
        let anchorage = orchestrator();
        let owner = valid_owner();
        let mut roots = Vec::new();
        for i in 0u8..4 {
            let outcome = anchorage
                .store_and_anchor(StoreRequest::from_bytes(vec![i; 10]), &owner)
                .unwrap();
            roots.push(outcome.object_root);
        }

        let records = anchorage.list_anchored(&owner).unwrap();
        assert_eq!(records.len(), 4);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.seq, (i + 1) as u64);
            assert_eq!(record.object_root, roots[i]);
        }
    }
}
