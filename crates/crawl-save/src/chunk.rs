//! Chunk stream reader
//!
//! A [`ChunkReader`] walks one block chain and inflates the zlib stream it
//! carries. Raw reads are bounded by [`PackageConfig::raw_read_size`], so a
//! chunk of any size decodes with a fixed amount of buffered input.
//!
//! [`PackageConfig::raw_read_size`]: crate::PackageConfig::raw_read_size

use std::io::{self, Read, Seek};

use flate2::{Decompress, FlushDecompress, Status};
use tracing::trace;

use crate::block::BlockChain;
use crate::error::{FormatError, FormatResult};
use crate::package::Package;

/// Step size used by [`ChunkReader::read_all`]
pub const READ_ALL_STEP: usize = 1024;

/// Incremental zlib decoder with the raw input it has not consumed yet
struct Inflater {
    decompress: Decompress,
    pending: Vec<u8>,
    consumed: usize,
    stream_end: bool,
}

impl Inflater {
    fn new() -> Self {
        Self {
            decompress: Decompress::new(true),
            pending: Vec::new(),
            consumed: 0,
            stream_end: false,
        }
    }

    fn is_drained(&self) -> bool {
        self.consumed >= self.pending.len()
    }

    fn refill(&mut self, raw: Vec<u8>) {
        self.pending = raw;
        self.consumed = 0;
    }

    /// Inflate buffered input into `output`, returning the bytes produced.
    fn inflate(&mut self, output: &mut [u8]) -> FormatResult<usize> {
        let before_in = self.decompress.total_in();
        let before_out = self.decompress.total_out();

        let status = self
            .decompress
            .decompress(
                &self.pending[self.consumed..],
                output,
                FlushDecompress::None,
            )
            .map_err(|e| FormatError::Corrupt(format!("invalid compressed data: {e}")))?;

        let consumed = (self.decompress.total_in() - before_in) as usize;
        let produced = (self.decompress.total_out() - before_out) as usize;
        self.consumed += consumed;

        if status == Status::StreamEnd {
            self.stream_end = true;
        } else if consumed == 0 && produced == 0 && !self.is_drained() {
            return Err(FormatError::Corrupt(
                "compressed stream stopped making progress".to_string(),
            ));
        }

        Ok(produced)
    }
}

impl std::fmt::Debug for Inflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inflater")
            .field("total_in", &self.decompress.total_in())
            .field("total_out", &self.decompress.total_out())
            .field("buffered", &(self.pending.len() - self.consumed))
            .field("stream_end", &self.stream_end)
            .finish()
    }
}

/// Decompressing cursor over one chunk of a [`Package`]
///
/// Readers borrow the package and share its file handle. Every raw read
/// seeks first, so any number of readers may be used in turn on one thread.
#[derive(Debug)]
pub struct ChunkReader<'a, R> {
    package: &'a Package<R>,
    chain: BlockChain,
    inflater: Inflater,
    raw_read_size: usize,
    chain_done: bool,
    finished: bool,
}

impl<'a, R: Read + Seek> ChunkReader<'a, R> {
    pub(crate) fn new(package: &'a Package<R>, head: u32) -> Self {
        Self {
            package,
            chain: BlockChain::new(head),
            inflater: Inflater::new(),
            raw_read_size: package.config().effective_raw_read_size(),
            chain_done: false,
            finished: false,
        }
    }

    /// Offset of the chunk's first block
    pub fn head(&self) -> u32 {
        self.chain.head()
    }

    /// Whether a read has already come up short
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Restart from the first block with a fresh decompressor
    pub fn rewind(&mut self) {
        self.chain.reset();
        self.inflater = Inflater::new();
        self.chain_done = false;
        self.finished = false;
    }

    /// Read `len` decompressed bytes.
    ///
    /// Fewer bytes are returned only when the chunk has ended; a short read
    /// is not an error.
    pub fn read(&mut self, len: usize) -> FormatResult<Vec<u8>> {
        // Output grows one step at a time, so a large `len` costs only what
        // the chunk actually yields
        let mut out = Vec::with_capacity(len.min(READ_ALL_STEP));

        while out.len() < len {
            let start = out.len();
            let step = (len - start).min(READ_ALL_STEP);
            out.resize(start + step, 0);

            let filled = self.fill(&mut out[start..])?;
            out.truncate(start + filled);
            if filled < step {
                break;
            }
        }

        Ok(out)
    }

    /// Read the rest of the chunk
    pub fn read_all(&mut self) -> FormatResult<Vec<u8>> {
        let limit = self.package.config().max_chunk_size;
        let mut data = Vec::new();

        loop {
            let piece = self.read(READ_ALL_STEP)?;
            if data.len() + piece.len() > limit {
                return Err(FormatError::ChunkTooLarge { limit });
            }
            let short = piece.len() < READ_ALL_STEP;
            data.extend_from_slice(&piece);
            if short {
                return Ok(data);
            }
        }
    }

    /// Inflate into `out` until it is full or the chunk ends.
    fn fill(&mut self, out: &mut [u8]) -> FormatResult<usize> {
        let mut filled = 0;

        while filled < out.len() && !self.inflater.stream_end {
            if self.inflater.is_drained() && !self.chain_done {
                let raw = self.package.read_raw(&mut self.chain, self.raw_read_size)?;
                if raw.len() < self.raw_read_size {
                    trace!("Chain at {:#x} ended", self.chain.head());
                    self.chain_done = true;
                }
                self.inflater.refill(raw);
            }

            let produced = self.inflater.inflate(&mut out[filled..])?;
            filled += produced;

            if produced == 0 && self.inflater.is_drained() && self.chain_done {
                break;
            }
        }

        if filled < out.len() {
            self.finished = true;
        }
        Ok(filled)
    }
}

impl<R: Read + Seek> Read for ChunkReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill(buf).map_err(io::Error::from)
    }
}
