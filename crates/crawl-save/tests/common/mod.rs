//! Synthetic save package writer shared by the integration tests.
//!
//! Blocks are written in reverse order with a gap byte between them, so
//! every chain link points backwards and no two blocks are adjacent.

#![allow(dead_code)]

use std::io::Write;

use crawl_save::header::PACKAGE_MAGIC;
use flate2::Compression;
use flate2::write::ZlibEncoder;

pub const GAP: u8 = 0xEE;

pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Deterministic payload that compresses poorly enough to span many blocks
pub fn payload(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

pub fn string_field(data: &mut Vec<u8>, value: &[u8]) {
    let len = i16::try_from(value.len()).unwrap();
    data.extend_from_slice(&len.to_be_bytes());
    data.extend_from_slice(value);
}

/// Uncompressed `chr` chunk contents
pub fn chr_payload(major: u8, minor: u8, name: &str, version: &str) -> Vec<u8> {
    let mut data = vec![major, minor];
    data.extend_from_slice(&0x0102_0304u32.to_le_bytes());
    if (major, minor) >= (32, 13) {
        // Format tag, chosen so a skipped or extra byte shifts the string lengths
        data.push(0x07);
    }
    string_field(&mut data, name.as_bytes());
    string_field(&mut data, version.as_bytes());
    // Trailing character data the reader never touches
    data.extend_from_slice(&payload(64, 99));
    data
}

pub fn header(magic: u32, version: u8, directory: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&magic.to_le_bytes());
    data.push(version);
    data.extend_from_slice(&[0, 0, 0]);
    data.extend_from_slice(&directory.to_le_bytes());
    data
}

pub struct PackageWriter {
    data: Vec<u8>,
    block_size: usize,
    entries: Vec<(Vec<u8>, u32)>,
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageWriter {
    pub fn new() -> Self {
        Self {
            data: vec![0; 12],
            block_size: 7,
            entries: Vec::new(),
        }
    }

    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Compress `payload` into a new chain and list it in the directory
    pub fn add_chunk(&mut self, name: &str, payload: &[u8]) -> u32 {
        let head = self.write_compressed(payload);
        self.add_entry(name.as_bytes(), head);
        head
    }

    pub fn add_entry(&mut self, name: &[u8], head: u32) {
        self.entries.push((name.to_vec(), head));
    }

    pub fn write_compressed(&mut self, payload: &[u8]) -> u32 {
        let compressed = compress(payload);
        self.write_chain(&compressed)
    }

    /// Write `raw` as a block chain and return its head offset
    pub fn write_chain(&mut self, raw: &[u8]) -> u32 {
        if raw.is_empty() {
            return self.write_block(&[], 0);
        }

        let pieces: Vec<&[u8]> = raw.chunks(self.block_size).collect();
        let mut next = 0;
        for piece in pieces.iter().rev() {
            next = self.write_block(piece, next);
        }
        next
    }

    fn write_block(&mut self, payload: &[u8], next: u32) -> u32 {
        self.data.push(GAP);
        let offset = u32::try_from(self.data.len()).unwrap();
        self.data
            .extend_from_slice(&u32::try_from(payload.len()).unwrap().to_le_bytes());
        self.data.extend_from_slice(&next.to_le_bytes());
        self.data.extend_from_slice(payload);
        offset
    }

    /// Uncompressed directory bytes for the entries added so far
    pub fn directory_bytes(&self) -> Vec<u8> {
        let mut directory = Vec::new();
        for (name, head) in &self.entries {
            directory.push(u8::try_from(name.len()).unwrap());
            directory.extend_from_slice(name);
            directory.extend_from_slice(&head.to_le_bytes());
        }
        directory
    }

    pub fn finish(self) -> Vec<u8> {
        let directory = self.directory_bytes();
        self.finish_with_directory(&directory)
    }

    /// Finish with arbitrary uncompressed directory contents
    pub fn finish_with_directory(mut self, directory: &[u8]) -> Vec<u8> {
        let head = self.write_compressed(directory);
        self.finish_with_directory_head(head)
    }

    /// Finish with the directory chain at `head`, already written
    pub fn finish_with_directory_head(mut self, head: u32) -> Vec<u8> {
        self.data[..12].copy_from_slice(&header(PACKAGE_MAGIC, 1, head));
        self.data
    }
}
