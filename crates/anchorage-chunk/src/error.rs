/// Errors from chunking a byte source.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// The chunker was configured with an unusable parameter.
    #[error("invalid chunker config: {0}")]
    InvalidConfig(String),

    /// The source stream failed mid-read.
    #[error("read failure: {0}")]
    Read(#[from] std::io::Error),

    /// Manifest serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}
