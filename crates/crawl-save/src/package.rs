//! Save package
//!
//! Opening a package reads the file header and decodes the directory up
//! front. Chunks are then read lazily through [`ChunkReader`]s that borrow
//! the package.

use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::block::BlockChain;
use crate::chunk::ChunkReader;
use crate::config::PackageConfig;
use crate::directory::Directory;
use crate::error::FormatResult;
use crate::header::FileHeader;

/// An open save package
///
/// The package owns its source. A failed open drops the source before the
/// error is returned, and dropping the package releases it.
#[derive(Debug)]
pub struct Package<R = File> {
    source: RefCell<R>,
    len: u64,
    header: FileHeader,
    directory: Directory,
    config: PackageConfig,
}

impl Package<File> {
    /// Open a package file with the default configuration
    pub fn open(path: impl AsRef<Path>) -> FormatResult<Self> {
        Self::open_with_config(path, PackageConfig::default())
    }

    /// Open a package file
    pub fn open_with_config(path: impl AsRef<Path>, config: PackageConfig) -> FormatResult<Self> {
        let path = path.as_ref();
        debug!("Opening package {}", path.display());
        Self::from_reader_with_config(File::open(path)?, config)
    }
}

impl<R: Read + Seek> Package<R> {
    /// Read a package from any seekable source with the default configuration
    pub fn from_reader(source: R) -> FormatResult<Self> {
        Self::from_reader_with_config(source, PackageConfig::default())
    }

    /// Read a package from any seekable source
    pub fn from_reader_with_config(mut source: R, config: PackageConfig) -> FormatResult<Self> {
        let len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        let header = FileHeader::read_from(&mut source)?;

        let mut package = Self {
            source: RefCell::new(source),
            len,
            header,
            directory: Directory::default(),
            config,
        };

        let directory = {
            let mut reader = ChunkReader::new(&package, header.directory_offset);
            Directory::decode(&mut reader)?
        };
        package.directory = directory;

        debug!(
            "Package loaded: {} bytes, version {}, {} chunks",
            package.len,
            package.header.version,
            package.directory.len()
        );
        Ok(package)
    }

    /// Reader over the named chunk, or `None` if the directory has no such entry
    pub fn chunk(&self, name: impl AsRef<[u8]>) -> Option<ChunkReader<'_, R>> {
        self.directory
            .get(name.as_ref())
            .map(|head| ChunkReader::new(self, head))
    }

    /// Read up to `len` raw bytes from `chain` through the shared source
    pub(crate) fn read_raw(&self, chain: &mut BlockChain, len: usize) -> FormatResult<Vec<u8>> {
        let mut source = self.source.borrow_mut();
        chain.read(&mut *source, self.len, len)
    }
}

impl<R> Package<R> {
    /// Package format version
    pub const fn version(&self) -> u8 {
        self.header.version
    }

    /// Decoded file header
    pub const fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Package directory
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Reader configuration
    pub const fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Size of the underlying file in bytes
    pub const fn file_len(&self) -> u64 {
        self.len
    }

    /// Number of chunks in the directory
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Whether the named chunk exists
    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        self.directory.contains(name.as_ref())
    }

    /// Head block offset of the named chunk
    pub fn chunk_offset(&self, name: impl AsRef<[u8]>) -> Option<u32> {
        self.directory.get(name.as_ref())
    }

    /// Chunk names in byte order
    pub fn chunk_names(&self) -> Vec<&[u8]> {
        self.directory.names()
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }
}
