//! Foundation types for Anchorage.
//!
//! This crate provides the identity types shared by every other Anchorage
//! crate.
//!
//! # Key Types
//!
//! - [`ContentAddress`] — Content-addressed block identifier (BLAKE3 hash)
//! - [`OwnerAddress`] — External account identity used as the ledger's
//!   partition key, checksummed hex on the wire

pub mod address;
pub mod error;
pub mod owner;

pub use address::ContentAddress;
pub use error::TypeError;
pub use owner::OwnerAddress;
