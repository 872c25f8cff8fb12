//! Reader for Dungeon Crawl Stone Soup save packages
//!
#![allow(clippy::cast_possible_truncation)] // Offsets and lengths are bounded by the file size
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! A save package (`.cs`) is a single file holding several independently
//! zlib-compressed named chunks. Each chunk's compressed bytes are spread over
//! a linked chain of blocks that can sit anywhere in the file, and a
//! directory chunk maps chunk names to the first block of their chain.
//!
//! # Layers
//!
//! - **Header**: magic, format version, and directory offset
//! - **Blocks**: raw block-chain traversal with bounds checking
//! - **Chunks**: incremental decompression over a block chain
//! - **Package**: directory decoding, named chunk lookup, `chr` metadata
//!
//! # Example
//!
//! ```no_run
//! use crawl_save::Package;
//!
//! # fn example() -> Result<(), crawl_save::FormatError> {
//! let package = Package::open("saves/Alice.cs")?;
//! let (player, version) = package.read_header_metadata()?;
//! println!("{player} was saved by {version}");
//!
//! if let Some(mut chunk) = package.chunk("you") {
//!     let data = chunk.read_all()?;
//!     println!("you: {} bytes", data.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod chr;
pub mod chunk;
pub mod config;
pub mod directory;
mod error;
pub mod fields;
pub mod header;
mod package;

pub use chr::{CharacterInfo, SaveVersion};
pub use chunk::ChunkReader;
pub use config::PackageConfig;
pub use directory::Directory;
pub use error::{FormatError, FormatResult};
pub use fields::FixedLayout;
pub use header::FileHeader;
pub use package::Package;
