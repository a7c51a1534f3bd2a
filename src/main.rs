//! # misty
//!
//! Command-line front end for the Misty client.
//!
//! ```bash
//! # list stored audio
//! misty --base-url http://192.168.0.111 list
//!
//! # capture speech, wait until the file is listed, then download it
//! misty record --file x.wav --max-length-ms 10000 --silence-timeout-ms 5000 --poll --fetch ./x.wav
//!
//! # fetch everything into ./downloads
//! misty download-all -d downloads
//! ```

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use misty_client::MistyClient;
use misty_client::assets::AssetKind;
use misty_client::config::ClientConfig;
use misty_client::defaults::{capture, http, output};
use misty_client::recording::{CaptureOutcome, CaptureRequest, CompletionPolicy};
use misty_client::telemetry::{self, SubscriberConfig};

/// Misty robot client
#[derive(Parser, Debug)]
#[command(name = "misty")]
#[command(about = "Capture, list and download recordings from a Misty robot", long_about = None)]
#[command(version)]
struct Cli {
    /// Robot base address
    #[arg(long, env = "MISTY_BASE_URL", default_value = http::BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in seconds (none by default)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MISTY_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Log format (text, json, json-compact)
    #[arg(long, env = "MISTY_LOG_FORMAT", default_value = "text", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List stored assets
    List {
        /// Images instead of audio
        #[arg(long)]
        images: bool,
    },

    /// Download one asset
    Fetch {
        name: String,
        /// Destination path (default: ./<name>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        images: bool,
    },

    /// Download every stored asset
    DownloadAll {
        #[arg(short, long, default_value = output::DOWNLOAD_DIR)]
        dir: PathBuf,
        #[arg(long)]
        images: bool,
    },

    /// Delete one asset from the robot
    Delete {
        name: String,
        #[arg(long)]
        images: bool,
    },

    /// Start a speech capture and wait for it to finish
    Record {
        #[command(flatten)]
        args: RecordArgs,
    },

    /// Stop any running recording
    Stop,
}

#[derive(Args, Debug)]
struct RecordArgs {
    /// File name stored on the robot
    #[arg(long, default_value = capture::FILE_NAME)]
    file: String,

    #[arg(long, default_value_t = capture::MAX_SPEECH_LENGTH_MS)]
    max_length_ms: u64,

    #[arg(long, default_value_t = capture::SILENCE_TIMEOUT_MS)]
    silence_timeout_ms: u64,

    /// Fail instead of replacing an existing file
    #[arg(long)]
    no_overwrite: bool,

    /// Fixed wait after starting (default: max length plus one second)
    #[arg(long, conflicts_with = "poll")]
    wait_ms: Option<u64>,

    /// Poll the audio listing until the file appears
    #[arg(long)]
    poll: bool,

    /// Download the capture here once it is done
    #[arg(long)]
    fetch: Option<PathBuf>,
}

fn kind(images: bool) -> AssetKind {
    if images {
        AssetKind::Image
    } else {
        AssetKind::Audio
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = SubscriberConfig::builder()
        .log_level_str(&cli.log_level)?
        .output_format(cli.log_format.parse()?)
        .build();
    let _guard = telemetry::init_subscriber(subscriber)?;

    let mut config = ClientConfig::new(&cli.base_url)?;
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let client = MistyClient::with_config(config)?;

    match cli.command {
        Commands::List { images } => {
            let listing = client.assets(kind(images)).list().await?;
            for name in listing.names() {
                println!("{name}");
            }
        }
        Commands::Fetch {
            name,
            output,
            images,
        } => {
            let saved = client
                .assets(kind(images))
                .fetch(&name, output.as_deref())
                .await
                .with_context(|| format!("failed to download {name}"))?;
            println!("{} ({} bytes)", saved.path.display(), saved.bytes_written);
        }
        Commands::DownloadAll { dir, images } => {
            let report = client.assets(kind(images)).download_all(&dir).await?;
            println!(
                "Downloaded {}/{} files to {}",
                report.success_count(),
                report.attempted(),
                dir.display()
            );
            if let Some(e) = &report.listing_error {
                bail!("asset listing failed: {e}");
            }
            for failure in report.failures() {
                if let Err(e) = &failure.result {
                    eprintln!("  {}: {e}", failure.name);
                }
            }
            if !report.is_complete() {
                bail!(
                    "{} of {} downloads failed",
                    report.attempted() - report.success_count(),
                    report.attempted()
                );
            }
        }
        Commands::Delete { name, images } => {
            client.assets(kind(images)).delete(&name).await?;
            println!("deleted {name}");
        }
        Commands::Record { args } => record(&client, args).await?,
        Commands::Stop => {
            let response = client.recording().stop().await?;
            println!("{response}");
        }
    }
    Ok(())
}

async fn record(client: &MistyClient, args: RecordArgs) -> Result<()> {
    let request = CaptureRequest::new(args.file)
        .with_max_speech_length_ms(args.max_length_ms)
        .with_silence_timeout_ms(args.silence_timeout_ms)
        .with_overwrite(!args.no_overwrite);
    let policy = match (args.wait_ms, args.poll) {
        (Some(ms), _) => CompletionPolicy::FixedDelay(Duration::from_millis(ms)),
        (None, true) => CompletionPolicy::poll_for(&request),
        (None, false) => CompletionPolicy::fixed_for(&request),
    };

    let outcome = client.recording().record(&request, policy).await?;
    match outcome {
        CaptureOutcome::Elapsed(d) => println!("waited {} ms", d.as_millis()),
        CaptureOutcome::Appeared { polls } => {
            println!("{} available after {polls} polls", request.file_name)
        }
        CaptureOutcome::Replaced { polls } => {
            println!("{} replaced after {polls} polls", request.file_name)
        }
        CaptureOutcome::Unverified(d) => eprintln!(
            "{} was already on the robot and never changed; waited {} ms",
            request.file_name,
            d.as_millis()
        ),
        CaptureOutcome::TimedOut { polls } => {
            bail!("{} not listed after {polls} polls", request.file_name)
        }
    }

    if let Some(path) = args.fetch {
        let saved = client
            .audio()
            .fetch(&request.file_name, Some(&path))
            .await
            .with_context(|| format!("failed to download {}", request.file_name))?;
        println!("{} ({} bytes)", saved.path.display(), saved.bytes_written);
    }
    Ok(())
}
