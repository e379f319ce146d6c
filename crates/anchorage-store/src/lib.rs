//! Content-addressed blob storage for Anchorage.
//!
//! Every block produced by the chunker is persisted here, keyed by its
//! content address. The store is a pure key-value layer: it never interprets
//! block payloads.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] — `HashMap`-based store for tests and embedding,
//!   with an optional byte capacity
//! - [`DiskBlobStore`] — one file per block under sharded directories, hash
//!   verified on read
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content-addressing guarantees this).
//! 2. `put` is idempotent: re-storing a present block is a no-op, never an
//!    error.
//! 3. Concurrent reads are always safe; concurrent `put`s of different
//!    addresses are safe.
//! 4. All I/O errors are propagated, never silently ignored. Retry policy
//!    belongs to the caller.

pub mod disk;
pub mod error;
pub mod memory;
pub mod traits;

pub use disk::DiskBlobStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
