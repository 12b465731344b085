use std::io::SeekFrom;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tus_protocol::DEFAULT_CHUNK_SIZE;

use crate::TransferError;
use crate::types::Chunk;

/// Computes SHA-1 of `data` and returns the base64-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    STANDARD.encode(hasher.finalize())
}

/// Reads an async seekable source in bounded chunks at arbitrary offsets.
///
/// The reader never closes the source. Pass `&mut source` to keep
/// ownership with the caller.
pub struct ChunkReader<R> {
    source: R,
    chunk_size: usize,
    len: u64,
}

impl<R> ChunkReader<R>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    /// Wraps `source`, discovering its total length by seeking to the end.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] (3 MiB) is used.
    pub async fn new(mut source: R, chunk_size: usize) -> Result<Self, TransferError> {
        let len = source.seek(SeekFrom::End(0)).await?;
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Ok(Self {
            source,
            chunk_size,
            len,
        })
    }

    /// Total source length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Reads the chunk starting at `offset`.
    ///
    /// The chunk holds `min(chunk_size, len - offset)` bytes unless the
    /// source ends early, in which case whatever was read is returned.
    /// Reading at `len` yields an empty chunk.
    pub async fn read_at(&mut self, offset: u64) -> Result<Chunk, TransferError> {
        if offset > self.len {
            return Err(TransferError::OffsetOutOfRange {
                offset,
                length: self.len,
            });
        }

        self.source.seek(SeekFrom::Start(offset)).await?;

        let want = (self.len - offset).min(self.chunk_size as u64) as usize;
        let mut buf = vec![0u8; want];
        let mut filled = 0;
        // A single read may return fewer bytes than requested.
        while filled < want {
            let n = self.source.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 && want > 0 {
            return Err(TransferError::UnexpectedEof {
                offset,
                length: self.len,
            });
        }
        buf.truncate(filled);

        Ok(Chunk::new(offset, buf))
    }

    /// Releases the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}
