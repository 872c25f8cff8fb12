//! Character header chunk (`chr`)
//!
//! Only the leading fields are decoded: the save's format version, the
//! player name, and the version string of the game build that wrote it.

use binrw::BinRead;
use binrw::io::{Read, Seek};
use tracing::debug;

use crate::error::{FormatError, FormatResult};
use crate::fields::FixedLayout;
use crate::package::Package;

/// Name of the character header chunk
pub const CHR_CHUNK: &str = "chr";

/// First save version that stores a format tag byte after the length field
pub const FORMAT_TAG_VERSION: SaveVersion = SaveVersion::new(32, 13);

/// Save format version stored at the start of `chr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BinRead)]
#[br(little)]
pub struct SaveVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

impl SaveVersion {
    /// Create a version pair
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether a format tag byte follows the length field
    pub fn has_format_tag(self) -> bool {
        self >= FORMAT_TAG_VERSION
    }
}

impl FixedLayout for SaveVersion {
    const SIZE: usize = 2;
}

impl std::fmt::Display for SaveVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Decoded leading fields of the `chr` chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterInfo {
    /// Save format version
    pub version: SaveVersion,
    /// Character name
    pub player_name: String,
    /// Version string of the game build that wrote the save
    pub engine_version: String,
}

impl<R: Read + Seek> Package<R> {
    /// Decode the leading fields of the `chr` chunk
    pub fn read_chr_chunk(&self) -> FormatResult<CharacterInfo> {
        let mut chunk = self
            .chunk(CHR_CHUNK)
            .ok_or_else(|| FormatError::MissingChunk(CHR_CHUNK.to_string()))?;

        let version: SaveVersion = chunk.read_fixed()?;
        // Length of the remaining data, unused
        chunk.read_fixed::<[u8; 4]>()?;
        if version.has_format_tag() {
            chunk.read_fixed::<u8>()?;
        }

        let player_name = chunk.read_length_prefixed_string()?;
        let engine_version = chunk.read_length_prefixed_string()?;

        let info = CharacterInfo {
            version,
            player_name: String::from_utf8_lossy(&player_name).into_owned(),
            engine_version: String::from_utf8_lossy(&engine_version).into_owned(),
        };
        debug!(
            "chr: save version {}, player {:?}, game {:?}",
            info.version, info.player_name, info.engine_version
        );
        Ok(info)
    }

    /// Player name and game version string from the `chr` chunk
    pub fn read_header_metadata(&self) -> FormatResult<(String, String)> {
        let info = self.read_chr_chunk()?;
        Ok((info.player_name, info.engine_version))
    }
}
