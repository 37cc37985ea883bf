use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use log::LevelFilter;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use tunebridge_lib::audio::HttpSource;
use tunebridge_lib::{CatalogConfig, ProviderKind, ProviderManager, Track};

const ARGS_GROUP_LOGGING: &str = "logging";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the per-user config directory)
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Comma-separated providers to query, overriding the config
    #[arg(short, long, value_delimiter = ',')]
    providers: Option<Vec<ProviderKind>>,

    /// Suppresses all output except warnings and errors
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enables verbose logging (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every enabled catalog
    Search {
        query: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Trending tracks from every enabled catalog
    Trending {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Resolve a qualified track id (e.g. `ytm:dQw4w9WgXcQ`) to a stream URL
    Resolve { track_id: String },
    /// Tracks related to a qualified track id
    Related {
        track_id: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Tracks of a playlist on one provider
    Playlist {
        provider: ProviderKind,
        playlist_id: String,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Resolve a track and read the start of its stream
    Fetch {
        track_id: String,
        #[arg(short, long, default_value_t = 65536)]
        bytes: u64,
    },
}

fn init_logger(args: &Args) {
    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if args.quiet || args.verbose > 0 {
        let level = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Only our own crates, not reqwest and friends.
        logger.filter_module(module_path!(), level);
        logger.filter_module("tunebridge_lib", level);
    }

    logger.init();
}

fn load_config(args: &Args) -> Result<CatalogConfig> {
    let mut config = match &args.config {
        Some(path) => CatalogConfig::load(path)?,
        None => CatalogConfig::load_or_default()?,
    };
    if let Some(providers) = &args.providers {
        config.enabled = providers.clone();
    }
    Ok(config)
}

fn qualified_kind(track_id: &str) -> Result<ProviderKind> {
    ProviderKind::from_qualified_id(track_id)
        .map(|(kind, _)| kind)
        .ok_or_else(|| {
            anyhow!(
                "'{}' has no provider prefix (expected e.g. ytm:, saavn:, piped:, spotify:)",
                track_id
            )
        })
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        println!("No results.");
        return;
    }
    for track in tracks {
        let secs = track.duration_ms / 1000;
        println!(
            "{:<28} {} - {}{} [{}:{:02}]",
            track.id,
            track.artist,
            track.title,
            track
                .album
                .as_deref()
                .map(|a| format!(" ({})", a))
                .unwrap_or_default(),
            secs / 60,
            secs % 60
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args);

    let config = load_config(&args)?;
    let stream_timeout = Duration::from_secs(config.stream.timeout_secs);
    let manager = ProviderManager::from_config(&config).await;

    match args.command {
        Command::Search { query, limit } => {
            print_tracks(&manager.search(&query, limit).await);
        }
        Command::Trending { limit } => {
            print_tracks(&manager.get_trending(limit).await);
        }
        Command::Resolve { track_id } => {
            let kind = qualified_kind(&track_id)?;
            let info = manager
                .resolve_stream(kind, &track_id)
                .await
                .with_context(|| format!("Could not resolve {}", track_id))?;
            println!("{}", info.url);
            if let Some(mime) = info.mime_type {
                println!("mime: {}", mime);
            }
            if let Some(bitrate) = info.bitrate {
                println!("bitrate: {}", bitrate);
            }
        }
        Command::Related { track_id, limit } => {
            let kind = qualified_kind(&track_id)?;
            let seed = Track {
                id: track_id,
                title: String::new(),
                artist: String::new(),
                album: None,
                duration_ms: 0,
                thumbnail_url: None,
                provider: kind,
                external_url: None,
            };
            print_tracks(&manager.get_related(&seed, limit).await);
        }
        Command::Playlist {
            provider,
            playlist_id,
            limit,
        } => {
            print_tracks(&manager.get_playlist(provider, &playlist_id, limit).await);
        }
        Command::Fetch { track_id, bytes } => {
            let kind = qualified_kind(&track_id)?;
            let info = manager
                .resolve_stream(kind, &track_id)
                .await
                .with_context(|| format!("Could not resolve {}", track_id))?;

            // The reader is blocking, keep it off the runtime threads.
            let (read, total) = tokio::task::spawn_blocking(move || -> Result<(u64, Option<u64>)> {
                let mut source = HttpSource::with_timeout(&info.url, stream_timeout)?;
                source.open(0, Some(bytes))?;
                let mut buf = vec![0u8; 16 * 1024];
                let mut read = 0u64;
                loop {
                    let n = source.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    read += n as u64;
                }
                let total = source.total_size();
                source.close();
                Ok((read, total))
            })
            .await??;

            println!(
                "Read {} bytes (total size: {})",
                read,
                total.map(|t| t.to_string()).unwrap_or_else(|| "unknown".into())
            );
        }
    }

    Ok(())
}
