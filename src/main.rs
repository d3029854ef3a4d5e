use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use moodtrail::config::Config;
use moodtrail::store::{FsStore, TimelineStore};
use moodtrail::summary::Summary;
use moodtrail::Normalizer;

#[derive(Parser)]
#[command(name = "moodtrail", about = "Normalize and inspect emotion timelines")]
struct Cli {
    /// Write debug logs to $TMPDIR/moodtrail-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Config file to use instead of ~/.config/moodtrail/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a raw timeline payload and print it as JSON.
    Normalize {
        /// Payload file; reads stdin when omitted or `-`.
        file: Option<PathBuf>,
        /// Also print the correction trail to stderr.
        #[arg(long)]
        trail: bool,
    },
    /// Show the normalized timeline for one device and day.
    Show {
        #[arg(long)]
        device: String,
        #[arg(long)]
        date: String,
        /// Data store root; defaults to `[store] root` from the config.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// List devices and the days stored for each.
    Devices {
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "config unavailable, using defaults");
            Config::defaults()
        }),
    };
    let normalizer = Normalizer::new(config.normalizer.clone());

    match cli.command {
        Command::Normalize { file, trail } => {
            let raw = read_payload(file.as_deref())?;
            let outcome = normalizer.normalize(&raw);
            if trail {
                eprintln!("{}", serde_json::to_string_pretty(outcome.corrections())?);
            }
            match outcome.into_timeline() {
                Some(timeline) => {
                    println!("{}", serde_json::to_string_pretty(&timeline)?);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("null");
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Show { device, date, store } => {
            let store = FsStore::new(store.unwrap_or(config.store.root));
            let Some(raw) = store.load(&device, &date)? else {
                println!("no measurement data for {device} on {date}");
                return Ok(ExitCode::from(2));
            };
            let outcome = normalizer.normalize(&raw);
            let corrections = outcome.corrections().to_vec();
            let degraded = outcome.is_fallback();
            match outcome.into_timeline() {
                Some(timeline) => {
                    let summary = Summary::from_timeline(&timeline, &config.summary);
                    print!(
                        "{}",
                        moodtrail::report::render(&device, &timeline, &summary, &corrections)?
                    );
                    if degraded {
                        println!("(payload unreadable, showing fallback)");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("no measurement data for {device} on {date}");
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Devices { store } => {
            let store = FsStore::new(store.unwrap_or(config.store.root));
            for device in store.devices()? {
                let dates = store.dates(&device)?;
                println!("{device}\t{}", dates.join(" "));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_payload(file: Option<&std::path::Path>) -> anyhow::Result<serde_json::Value> {
    let body = match file {
        Some(path) if path != std::path::Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        _ => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
    };
    serde_json::from_str(&body).context("payload is not valid JSON")
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    if debug {
        let path = std::env::temp_dir().join("moodtrail-debug.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("moodtrail debug log started, tail -f {}", path.display());
    }
    Ok(())
}
