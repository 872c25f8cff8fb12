//! Package directory
//!
//! The directory is an ordinary compressed chunk whose decompressed bytes are
//! a sequence of entries, read until the stream ends:
//!
//! | Size | Field |
//! |------|-------|
//! | 1    | Name length |
//! | n    | Name |
//! | 4    | Head block offset (LE) |

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use binrw::io::{Read, Seek};
use tracing::{debug, warn};

use crate::chunk::ChunkReader;
use crate::error::{FormatError, FormatResult};

/// Mapping from chunk name to the offset of its first block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    entries: HashMap<Vec<u8>, u32>,
}

impl Directory {
    /// Decode every entry from a reader positioned at the directory chunk
    pub fn decode<R: Read + Seek>(reader: &mut ChunkReader<'_, R>) -> FormatResult<Self> {
        let mut directory = Self::default();

        loop {
            let len = reader.read(1)?;
            let Some(&len) = len.first() else {
                break;
            };
            let len = usize::from(len);

            let name = reader.read(len)?;
            if name.len() < len {
                return Err(FormatError::Corrupt(format!(
                    "truncated directory: name of {len} bytes, {} available",
                    name.len()
                )));
            }

            let offset = reader.read(4)?;
            let offset: [u8; 4] = offset.as_slice().try_into().map_err(|_| {
                FormatError::Corrupt(format!(
                    "truncated directory: no offset for chunk {:?}",
                    String::from_utf8_lossy(&name)
                ))
            })?;

            directory.insert(name, u32::from_le_bytes(offset));
        }

        debug!("Decoded directory with {} entries", directory.len());
        Ok(directory)
    }

    /// Insert an entry; a repeated name replaces the earlier offset
    pub fn insert(&mut self, name: Vec<u8>, offset: u32) {
        match self.entries.entry(name) {
            Entry::Occupied(mut slot) => {
                warn!(
                    "Duplicate directory entry {:?}: {:#x} replaces {:#x}",
                    String::from_utf8_lossy(slot.key()),
                    offset,
                    slot.get()
                );
                slot.insert(offset);
            }
            Entry::Vacant(slot) => {
                slot.insert(offset);
            }
        }
    }

    /// Head block offset of the named chunk
    pub fn get(&self, name: &[u8]) -> Option<u32> {
        self.entries.get(name).copied()
    }

    /// Whether the named chunk exists
    pub fn contains(&self, name: &[u8]) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the package has no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chunk names in byte order
    pub fn names(&self) -> Vec<&[u8]> {
        let mut names: Vec<&[u8]> = self.entries.keys().map(Vec::as_slice).collect();
        names.sort_unstable();
        names
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u32)> {
        let mut entries: Vec<(&[u8], u32)> = self
            .entries
            .iter()
            .map(|(name, offset)| (name.as_slice(), *offset))
            .collect();
        entries.sort_unstable();
        entries.into_iter()
    }
}
