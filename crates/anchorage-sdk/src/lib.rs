//! High-level Anchorage API.
//!
//! [`Anchorage`] wires a [`BlobStore`](anchorage_store::BlobStore) and an
//! [`AnchorLedger`](anchorage_ledger::AnchorLedger) into the
//! store-and-anchor pipeline:
//!
//! 1. Validate the owner address and the [`StoreRequest`]
//! 2. Chunk the source into content-addressed blocks, persisting each one
//! 3. Append the object root to the owner's ledger stream
//!
//! Content is always durable before it is anchored, so anything listed via
//! [`Anchorage::list_anchored`] can be read back with
//! [`Anchorage::retrieve`]. A failed anchor leaves the content stored and
//! reports the computed root for a cheap retry.
//!
//! ```no_run
//! use anchorage_ledger::InMemoryAnchorLedger;
//! use anchorage_sdk::{Anchorage, StoreRequest};
//! use anchorage_store::InMemoryBlobStore;
//!
//! # fn main() -> Result<(), anchorage_sdk::OrchestratorError> {
//! let anchorage = Anchorage::new(InMemoryBlobStore::new(), InMemoryAnchorLedger::new());
//! let owner = "0x00a329c0648769a73afac7f9381e08fb43dbea72";
//!
//! let outcome = anchorage.store_and_anchor(StoreRequest::from_bytes(b"hello world".to_vec()), owner)?;
//! let records = anchorage.list_anchored(owner)?;
//! assert_eq!(records[0].object_root, outcome.object_root);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod orchestrator;
pub mod source;

pub use error::OrchestratorError;
pub use orchestrator::{Anchorage, StoreOutcome};
pub use source::StoreRequest;
