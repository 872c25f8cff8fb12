//! Print information from a Crawl save package.
//!
//! By default prints the version string of the game build that wrote the
//! save, which is what launcher scripts use to pick a matching binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crawl_save::{Package, PackageConfig};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(
    name = "crawl-save-info",
    about = "Inspect Dungeon Crawl Stone Soup save packages",
    version
)]
struct Args {
    /// Save package to read
    save: PathBuf,

    /// Also print the player name
    #[arg(long)]
    name: bool,

    /// List directory entries instead of reading the chr chunk
    #[arg(long)]
    list: bool,

    /// Compressed bytes read per refill
    #[arg(long, env = "CRAWL_SAVE_RAW_READ_SIZE", default_value_t = 1024)]
    raw_read_size: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = PackageConfig::new().with_raw_read_size(args.raw_read_size);
    let package = Package::open_with_config(&args.save, config)
        .with_context(|| format!("failed to open {}", args.save.display()))?;

    if args.list {
        for (name, offset) in package.directory().iter() {
            println!("{:<16} {offset:#010x}", String::from_utf8_lossy(name));
        }
        return Ok(());
    }

    let info = package
        .read_chr_chunk()
        .with_context(|| format!("failed to read chr chunk of {}", args.save.display()))?;

    if args.name {
        println!("{}", info.player_name);
    }
    println!("{}", info.engine_version);

    Ok(())
}
