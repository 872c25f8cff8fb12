//! Package file header
//!
//! Layout (12 bytes, little-endian):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00   | 4    | Magic (`0x53534344`, "DCSS" on disk) |
//! | 0x04   | 1    | Format version |
//! | 0x05   | 3    | Reserved |
//! | 0x08   | 4    | Directory chunk offset |

use binrw::BinRead;
use binrw::io::{Cursor, Read};
use tracing::debug;

use crate::error::{FormatError, FormatResult};

/// Package magic number
pub const PACKAGE_MAGIC: u32 = 0x5353_4344;

/// The only package format version this crate decodes
pub const PACKAGE_VERSION: u8 = 1;

/// Size of the file header in bytes
pub const FILE_HEADER_SIZE: usize = 12;

/// Package file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct FileHeader {
    /// Magic number
    pub magic: u32,

    /// Format version
    #[br(pad_after = 3)]
    pub version: u8,

    /// Offset of the directory chunk's first block
    pub directory_offset: u32,
}

impl FileHeader {
    /// Read and validate the header from the current position of `reader`.
    ///
    /// A short read or wrong magic is reported as `NotAPackage`, any version
    /// other than 1 as `UnsupportedVersion`.
    pub fn read_from<R: Read>(reader: &mut R) -> FormatResult<Self> {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                FormatError::NotAPackage
            } else {
                FormatError::Io(e)
            }
        })?;

        let header = Self::read(&mut Cursor::new(&buf[..]))?;
        header.validate()?;
        debug!(
            "Package header: version {}, directory at {:#x}",
            header.version, header.directory_offset
        );
        Ok(header)
    }

    /// Check magic and version
    pub fn validate(&self) -> FormatResult<()> {
        if self.magic != PACKAGE_MAGIC {
            return Err(FormatError::NotAPackage);
        }
        if self.version != PACKAGE_VERSION {
            return Err(FormatError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}
