/// A contiguous slice of the upload source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset of `data[0]` within the source.
    pub offset: u64,
    /// Raw chunk bytes.
    pub data: Vec<u8>,
    /// Base64 SHA-1 of exactly `data`.
    pub checksum: String,
}

impl Chunk {
    /// Wraps `data` read at `offset`, computing its checksum.
    pub fn new(offset: u64, data: Vec<u8>) -> Self {
        let checksum = crate::checksum_bytes(&data);
        Self {
            offset,
            data,
            checksum,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Offset one past the last byte of this chunk.
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }
}
