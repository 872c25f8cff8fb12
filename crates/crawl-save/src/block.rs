//! Block chains
//!
//! A chunk's compressed bytes are stored as a linked list of blocks that may
//! sit anywhere in the file. Each block is an 8-byte little-endian header
//! followed directly by its payload:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00   | 4    | Payload length |
//! | 0x04   | 4    | Offset of the next block (0 = end of chain) |

use std::collections::HashSet;

use binrw::BinRead;
use binrw::io::{Cursor, Read, Seek, SeekFrom};
use tracing::trace;

use crate::error::{FormatError, FormatResult};

/// Size of a block header in bytes
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Block header
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct BlockHeader {
    /// Payload bytes following the header
    pub length: u32,
    /// Offset of the next block, 0 if this is the last one
    pub next: u32,
}

impl BlockHeader {
    /// Read the header of the block at `offset`.
    ///
    /// Both the header and the payload it declares must fit inside
    /// `file_len`, otherwise the block is reported as truncated.
    pub fn read_at<R: Read + Seek>(
        source: &mut R,
        offset: u64,
        file_len: u64,
    ) -> FormatResult<Self> {
        let payload_start = offset + BLOCK_HEADER_SIZE as u64;
        if payload_start > file_len {
            return Err(FormatError::Truncated(format!(
                "block header at {offset:#x} past end of file ({file_len} bytes)"
            )));
        }

        let mut buf = [0u8; BLOCK_HEADER_SIZE];
        source.seek(SeekFrom::Start(offset))?;
        source.read_exact(&mut buf).map_err(|e| eof_as_truncated(e, offset))?;
        let header = Self::read(&mut Cursor::new(&buf[..]))?;

        if payload_start + u64::from(header.length) > file_len {
            return Err(FormatError::Truncated(format!(
                "block at {offset:#x} declares {} payload bytes past end of file ({file_len} bytes)",
                header.length
            )));
        }

        Ok(header)
    }

    /// Whether this block terminates its chain
    pub const fn is_last(&self) -> bool {
        self.next == 0
    }
}

/// Cursor over the raw (still compressed) bytes of one block chain
#[derive(Debug, Clone)]
pub struct BlockChain {
    head: u32,
    next_block: u32,
    /// File position of the next unread payload byte
    offset: u64,
    block_left: u32,
    visited: HashSet<u32>,
}

impl BlockChain {
    /// Start a chain at `head`. A head of 0 is an empty chain.
    pub fn new(head: u32) -> Self {
        Self {
            head,
            next_block: head,
            offset: 0,
            block_left: 0,
            visited: HashSet::new(),
        }
    }

    /// Offset of the first block
    pub const fn head(&self) -> u32 {
        self.head
    }

    /// Whether every payload byte of the chain has been consumed
    pub const fn is_exhausted(&self) -> bool {
        self.block_left == 0 && self.next_block == 0
    }

    /// Go back to the first block
    pub fn reset(&mut self) {
        *self = Self::new(self.head);
    }

    /// Read up to `len` raw bytes, following block links as needed.
    ///
    /// Returns fewer than `len` bytes only when the chain has ended.
    pub fn read<R: Read + Seek>(
        &mut self,
        source: &mut R,
        file_len: u64,
        len: usize,
    ) -> FormatResult<Vec<u8>> {
        let mut data = Vec::with_capacity(len.min(64 * 1024));
        let mut remaining = len;

        while remaining > 0 {
            if self.block_left == 0 {
                if self.next_block == 0 {
                    break;
                }
                self.enter_next_block(source, file_len)?;
                continue;
            }

            let take = remaining.min(self.block_left as usize);
            let start = data.len();
            data.resize(start + take, 0);

            source.seek(SeekFrom::Start(self.offset))?;
            source
                .read_exact(&mut data[start..])
                .map_err(|e| eof_as_truncated(e, self.offset))?;

            self.offset += take as u64;
            self.block_left -= take as u32;
            remaining -= take;
        }

        Ok(data)
    }

    fn enter_next_block<R: Read + Seek>(
        &mut self,
        source: &mut R,
        file_len: u64,
    ) -> FormatResult<()> {
        let block = self.next_block;
        if !self.visited.insert(block) {
            return Err(FormatError::Corrupt(format!(
                "block chain starting at {:#x} loops back to {block:#x}",
                self.head
            )));
        }

        let offset = u64::from(block);
        let header = BlockHeader::read_at(source, offset, file_len)?;
        trace!(
            "Block at {:#x}: {} bytes, next {:#x}",
            block, header.length, header.next
        );

        self.offset = offset + BLOCK_HEADER_SIZE as u64;
        self.block_left = header.length;
        self.next_block = header.next;
        Ok(())
    }
}

fn eof_as_truncated(err: std::io::Error, offset: u64) -> FormatError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        FormatError::Truncated(format!("block data at {offset:#x} past end of file"))
    } else {
        FormatError::Io(err)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn block(length: u32, next: u32, payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&length.to_le_bytes());
        data.extend_from_slice(&next.to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    /// Two blocks stored out of order: the head at 16 links back to 4.
    fn scattered_chain() -> Vec<u8> {
        let mut file = vec![0xEE; 4];
        file.extend(block(3, 0, b"def")); // 4..15
        file.push(0xEE); // 15
        file.extend(block(3, 4, b"abc")); // 16..27
        file
    }

    #[test]
    fn test_read_across_blocks() {
        let file = scattered_chain();
        let len = file.len() as u64;
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(16);

        let data = chain.read(&mut source, len, 6).expect("chain read");
        assert_eq!(data, b"abcdef");
        assert!(chain.is_exhausted());
    }

    #[test]
    fn test_short_read_at_chain_end() {
        let file = scattered_chain();
        let len = file.len() as u64;
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(16);

        assert_eq!(chain.read(&mut source, len, 2).unwrap(), b"ab");
        assert_eq!(chain.read(&mut source, len, 100).unwrap(), b"cdef");
        assert!(chain.read(&mut source, len, 100).unwrap().is_empty());
    }

    #[test]
    fn test_interleaved_seeks_do_not_disturb_cursor() {
        let file = scattered_chain();
        let len = file.len() as u64;
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(16);

        assert_eq!(chain.read(&mut source, len, 1).unwrap(), b"a");
        source.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(chain.read(&mut source, len, 1).unwrap(), b"b");
    }

    #[test]
    fn test_zero_head_is_empty_chain() {
        let mut source = Cursor::new(Vec::new());
        let mut chain = BlockChain::new(0);
        assert!(chain.is_exhausted());
        assert!(chain.read(&mut source, 0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_empty_block_links_to_next() {
        // Offset 0 means "no chain", so the first block sits one byte in
        let mut file = vec![0u8];
        file.extend(block(0, 9, b""));
        file.extend(block(2, 0, b"xy"));
        let len = file.len() as u64;
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(1);

        assert_eq!(chain.read(&mut source, len, 10).unwrap(), b"xy");
    }

    #[test]
    fn test_header_past_eof_is_truncated() {
        let file = vec![0u8; 10];
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(6);

        let err = chain.read(&mut source, 10, 1).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_payload_past_eof_is_truncated() {
        let mut file = vec![0u8; 4];
        file.extend(block(100, 0, b"short"));
        let len = file.len() as u64;
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(4);

        let err = chain.read(&mut source, len, 1).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_looping_chain_is_corrupt() {
        let mut file = vec![0u8; 4];
        file.extend(block(0, 4, b""));
        let len = file.len() as u64;
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(4);

        let err = chain.read(&mut source, len, 1).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_reset_restarts_at_head() {
        let file = scattered_chain();
        let len = file.len() as u64;
        let mut source = Cursor::new(file);
        let mut chain = BlockChain::new(16);

        assert_eq!(chain.read(&mut source, len, 6).unwrap(), b"abcdef");
        chain.reset();
        assert_eq!(chain.read(&mut source, len, 6).unwrap(), b"abcdef");
    }
}
