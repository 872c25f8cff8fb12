//! Configuration for package reading

use serde::{Deserialize, Serialize};

/// Default number of compressed bytes pulled from a block chain per refill
pub const DEFAULT_RAW_READ_SIZE: usize = 1024;

/// Default cap on a single `read_all` (1 GiB)
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1024 * 1024 * 1024;

/// Configuration for package reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Compressed bytes requested from the block chain per refill
    pub raw_read_size: usize,

    /// Maximum decompressed size accepted by `read_all`
    pub max_chunk_size: usize,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            raw_read_size: DEFAULT_RAW_READ_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl PackageConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw read size (zero is raised to one)
    #[must_use]
    pub const fn with_raw_read_size(mut self, size: usize) -> Self {
        self.raw_read_size = if size == 0 { 1 } else { size };
        self
    }

    /// Set the `read_all` size limit
    #[must_use]
    pub const fn with_max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Raw read size actually used by chunk readers
    pub(crate) fn effective_raw_read_size(&self) -> usize {
        self.raw_read_size.max(1)
    }
}
