//! Append-only anchor ledger for Anchorage.
//!
//! The ledger binds owner addresses to object roots. Each successful
//! `append` produces a confirmed [`AnchorRecord`] with a sequence index
//! assigned under the ledger's write lock, so records for one owner never
//! collide or skip a slot. Receipts are hash-chained per owner, which makes
//! a stream tamper-evident.
//!
//! Backends implement the [`AnchorLedger`] trait:
//!
//! - [`InMemoryAnchorLedger`] — for tests and embedding
//! - [`FileAnchorLedger`] — append-only log file with CRC-framed records,
//!   tolerant of a torn tail on recovery

pub mod error;
pub mod file;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::LedgerError;
pub use file::FileAnchorLedger;
pub use memory::InMemoryAnchorLedger;
pub use record::{AnchorRecord, ConfirmationReceipt};
pub use traits::AnchorLedger;
