use anchorage_types::ContentAddress;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"anchorage-block-v1"`) that is
/// prepended to every hash computation. This prevents cross-kind hash
/// collisions: a data block and a manifest with identical bytes produce
/// different addresses.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for data blocks.
    pub const BLOCK: Self = Self {
        domain: "anchorage-block-v1",
    };
    /// Hasher for manifest blocks.
    pub const MANIFEST: Self = Self {
        domain: "anchorage-manifest-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentAddress {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentAddress::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected address.
    pub fn verify(&self, data: &[u8], expected: &ContentAddress) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
