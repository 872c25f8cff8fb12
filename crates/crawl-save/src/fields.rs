//! Typed field decoders on top of [`ChunkReader::read`]

use binrw::io::{Cursor, Read, Seek};
use binrw::{BinRead, Endian};

use crate::chunk::ChunkReader;
use crate::error::{FormatError, FormatResult};

/// A value with a fixed encoded size.
///
/// Layouts are decoded little-endian unless the type carries its own
/// `#[br(big)]`/`#[br(little)]` attribute.
pub trait FixedLayout: for<'a> BinRead<Args<'a> = ()> {
    /// Encoded size in bytes
    const SIZE: usize;
}

macro_rules! fixed_primitive {
    ($($ty:ty),*) => {
        $(impl FixedLayout for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
        })*
    };
}

fixed_primitive!(u8, u16, u32, u64, i8, i16, i32, i64);

impl<const N: usize> FixedLayout for [u8; N] {
    const SIZE: usize = N;
}

/// Length prefix of a byte string: signed 16-bit, big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big)]
pub struct StringLength(
    /// Declared length in bytes
    pub i16,
);

impl FixedLayout for StringLength {
    const SIZE: usize = 2;
}

impl<R: Read + Seek> ChunkReader<'_, R> {
    /// Read exactly `T::SIZE` bytes and decode them as `T`
    pub fn read_fixed<T: FixedLayout>(&mut self) -> FormatResult<T> {
        let data = self.read(T::SIZE)?;
        if data.len() < T::SIZE {
            return Err(FormatError::Truncated(format!(
                "needed {} bytes, chunk ended after {}",
                T::SIZE,
                data.len()
            )));
        }
        Ok(T::read_options(&mut Cursor::new(&data[..]), Endian::Little, ())?)
    }

    /// Read a byte string with a big-endian `i16` length prefix
    pub fn read_length_prefixed_string(&mut self) -> FormatResult<Vec<u8>> {
        let StringLength(len) = self.read_fixed::<StringLength>()?;
        let len = usize::try_from(len)
            .map_err(|_| FormatError::Corrupt(format!("negative string length {len}")))?;

        let data = self.read(len)?;
        if data.len() < len {
            return Err(FormatError::Truncated(format!(
                "string of {len} bytes beyond end of chunk ({} available)",
                data.len()
            )));
        }
        Ok(data)
    }
}
