use std::io::{self, Cursor, Read};

use anchorage_types::ContentAddress;

use crate::block::{Block, Manifest};
use crate::error::ChunkError;

/// Default maximum block size: 256 KiB.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 256 * 1024;

/// Splits a byte source into content-addressed blocks.
///
/// The split is purely size-based: every yielded data block holds at most
/// `max_block_size` bytes. When an object spans more than one data block a
/// [`Manifest`] block is emitted last, and its address becomes the object
/// root; a single-block object's root is the sole block's address.
#[derive(Clone, Copy, Debug)]
pub struct Chunker {
    max_block_size: usize,
}

impl Chunker {
    /// Create a chunker. `max_block_size` must be greater than zero.
    pub fn new(max_block_size: usize) -> Result<Self, ChunkError> {
        if max_block_size == 0 {
            return Err(ChunkError::InvalidConfig(
                "max_block_size must be greater than zero".into(),
            ));
        }
        Ok(Self { max_block_size })
    }

    /// The configured maximum data block size.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Chunk a reader into a lazy stream of blocks.
    ///
    /// The stream is finite and not restartable: the source is consumed as
    /// blocks are pulled. The object root is available from
    /// [`BlockStream::object_root`] once the stream is exhausted.
    pub fn chunk<R: Read>(&self, reader: R) -> BlockStream<R> {
        BlockStream {
            reader,
            max_block_size: self.max_block_size,
            children: Vec::new(),
            total_len: 0,
            state: StreamState::Reading,
            root: None,
        }
    }

    /// Chunk an in-memory buffer, collecting all blocks eagerly.
    pub fn chunk_bytes(&self, data: &[u8]) -> Result<(ContentAddress, Vec<Block>), ChunkError> {
        let mut stream = self.chunk(Cursor::new(data));
        let mut blocks = Vec::new();
        for block in stream.by_ref() {
            blocks.push(block?);
        }
        let root = stream
            .object_root()
            .expect("drained stream always has a root");
        Ok((root, blocks))
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StreamState {
    Reading,
    EmitManifest,
    Done,
}

/// Lazy block iterator over a byte source.
///
/// Yields data blocks in object order, then the manifest block (if any).
/// After the iterator returns `None`, [`object_root`](Self::object_root)
/// reports the address that identifies the whole object. Empty input is
/// valid: it yields a single empty data block whose address is the root.
pub struct BlockStream<R> {
    reader: R,
    max_block_size: usize,
    children: Vec<ContentAddress>,
    total_len: u64,
    state: StreamState,
    root: Option<ContentAddress>,
}

impl<R> BlockStream<R> {
    /// The object root. `None` until the stream has been fully drained.
    pub fn object_root(&self) -> Option<ContentAddress> {
        self.root
    }

    /// Data bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.total_len
    }
}

impl<R: Read> BlockStream<R> {
    /// Read up to one full block from the source, retrying on interruption.
    fn read_block(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.max_block_size];
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

impl<R: Read> Iterator for BlockStream<R> {
    type Item = Result<Block, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                StreamState::Done => return None,
                StreamState::Reading => {
                    let data = match self.read_block() {
                        Ok(data) => data,
                        Err(e) => {
                            self.state = StreamState::Done;
                            return Some(Err(ChunkError::Read(e)));
                        }
                    };

                    if data.is_empty() {
                        // Source exhausted; decide how the object ends.
                        if self.children.is_empty() {
                            // Empty input: one empty block, its address is
                            // the root.
                            let block = Block::data(Vec::new());
                            let addr = block.address();
                            self.children.push(addr);
                            self.root = Some(addr);
                            self.state = StreamState::Done;
                            return Some(Ok(block));
                        }
                        if self.children.len() == 1 {
                            self.root = Some(self.children[0]);
                            self.state = StreamState::Done;
                            return None;
                        }
                        self.state = StreamState::EmitManifest;
                        continue;
                    }

                    self.total_len += data.len() as u64;
                    let block = Block::data(data);
                    self.children.push(block.address());
                    return Some(Ok(block));
                }
                StreamState::EmitManifest => {
                    let manifest = Manifest::new(self.children.clone(), self.total_len);
                    let block = match manifest.to_block() {
                        Ok(block) => block,
                        Err(e) => {
                            self.state = StreamState::Done;
                            return Some(Err(e));
                        }
                    };
                    self.root = Some(block.address());
                    self.state = StreamState::Done;
                    return Some(Ok(block));
                }
            }
        }
    }
}
