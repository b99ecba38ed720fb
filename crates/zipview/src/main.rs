//! zipview - browse the images inside a local or remote zip archive

mod entry;
mod input;
mod picture;
mod render;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use remotezip::{ArchiveOptions, RemoteArchive};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use zipcache::{CacheStats, Entry, Navigator, Sequence, ViewerConfig};

use crate::entry::ArchiveImage;
use crate::render::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Zip archive: http(s) URL or local path
    location: String,

    /// Delay before neighbours of the current image are prefetched
    #[arg(long, default_value_t = 100)]
    prefetch_delay_ms: u64,

    /// Neighbours prefetched on each side of the current image
    #[arg(long, default_value_t = 1)]
    prefetch_radius: usize,

    /// Cached images kept on each side of the current image
    #[arg(long, default_value_t = 2)]
    retain_radius: usize,

    /// Bytes per ranged read
    #[arg(long, default_value_t = 262_144)]
    chunk_size: usize,

    /// Ranged reads kept in memory
    #[arg(long, default_value_t = 64)]
    chunk_count: usize,

    /// Print the ordered member names and exit
    #[arg(long)]
    list: bool,

    /// With --list, print JSON
    #[arg(long)]
    json: bool,

    /// Print cache statistics on exit
    #[arg(long)]
    stats: bool,
}

impl Args {
    fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            prefetch_delay: Duration::from_millis(self.prefetch_delay_ms),
            prefetch_radius: self.prefetch_radius,
            retain_radius: self.retain_radius,
        }
    }

    fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            chunk_size: self.chunk_size,
            chunk_count: self.chunk_count,
        }
    }
}

#[derive(Serialize)]
struct Listing<'a> {
    index: usize,
    name: &'a str,
    size: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the viewer
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let mut renderer = TerminalRenderer::new(std::io::stdout());

    // Listings are machine-readable; keep stdout to the listing alone
    if !args.list {
        renderer.opening(&args.location);
    }
    let archive = match open_archive(&args).await {
        Ok(archive) => Arc::new(archive),
        Err(e) => {
            renderer.fatal(&args.location, &format!("{:#}", e));
            std::process::exit(1);
        }
    };
    let sequence = Arc::new(entry::sequence(archive));

    if args.list {
        return list(&mut std::io::stdout().lock(), &sequence, args.json);
    }

    let mut navigator = Navigator::new(Arc::clone(&sequence), renderer, args.viewer_config())
        .context("couldn't start viewer")?;
    let stats = navigator.cache().stats_handle();

    let (tx, rx) = mpsc::channel(16);
    input::spawn_stdin(tx).context("couldn't read stdin")?;

    navigator.start();
    navigator.run(rx).await;
    info!(current = navigator.state().current(), "viewer closed");

    if args.stats {
        print_stats(&stats);
    }
    Ok(())
}

async fn open_archive(args: &Args) -> Result<RemoteArchive> {
    let location = args.location.clone();
    let options = args.archive_options();
    if options.chunk_count == 0 || options.chunk_size == 0 {
        warn!(
            chunk_size = options.chunk_size,
            chunk_count = options.chunk_count,
            "chunk cache settings of 0 are raised to 1"
        );
    }

    let archive = tokio::task::spawn_blocking(move || RemoteArchive::open(&location, options))
        .await
        .context("archive worker failed")??;
    Ok(archive)
}

fn list<W: Write>(out: &mut W, sequence: &Sequence<ArchiveImage>, json: bool) -> Result<()> {
    if json {
        let listing: Vec<Listing<'_>> = sequence
            .iter()
            .enumerate()
            .map(|(index, entry)| Listing {
                index,
                name: entry.filename(),
                size: entry.member().size,
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &listing)?;
        writeln!(out)?;
    } else {
        for entry in sequence.iter() {
            writeln!(out, "{}", entry.filename())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn print_stats(stats: &CacheStats) {
    println!("Cache statistics:");
    println!("   Requests:    {}", stats.requests());
    println!("   Hits:        {}", stats.hits());
    println!("   Joins:       {}", stats.joins());
    println!("   Fetches:     {}", stats.misses());
    println!("   Evictions:   {}", stats.evictions());
    println!("   Discarded:   {}", stats.discards());
    println!("   Hit ratio:   {:.1}%", stats.hit_ratio() * 100.0);
}
