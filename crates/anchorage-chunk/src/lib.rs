//! Content-addressed chunking for Anchorage.
//!
//! This crate turns an arbitrary byte stream into a sequence of
//! content-addressed [`Block`]s:
//!
//! - [`ContentHasher`] — domain-separated BLAKE3 hashing, one domain per
//!   block kind
//! - [`Block`] / [`Manifest`] — the unit of storage and the multi-block
//!   object descriptor
//! - [`Chunker`] / [`BlockStream`] — lazy splitting of a reader into blocks
//!   of bounded size, with the manifest block emitted last
//!
//! The chunker never touches storage: callers drive the [`BlockStream`] and
//! persist each yielded block themselves, then read the object root off the
//! exhausted stream.

pub mod block;
pub mod chunker;
pub mod error;
pub mod hasher;

pub use block::{Block, BlockKind, Manifest};
pub use chunker::{BlockStream, Chunker, DEFAULT_MAX_BLOCK_SIZE};
pub use error::ChunkError;
pub use hasher::ContentHasher;
