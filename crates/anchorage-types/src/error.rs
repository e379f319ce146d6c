/// Errors from parsing or constructing foundation types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("malformed owner address: {0}")]
    MalformedOwner(String),

    #[error("owner address checksum mismatch")]
    ChecksumMismatch,
}
