mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bot_client::{BotApiClient, ChatTarget};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use transfer::{BatchRequest, BatchRunner, UploadExecutor};

/// Sequential uploads to a Telegram chat with live, throttled progress
/// status messages.
#[derive(Parser)]
#[command(name = "tg-upload", version)]
struct CliArgs {
    /// Target chat id or @username.
    chat_id: String,

    /// File or directory to upload (directories are walked recursively).
    path: PathBuf,

    /// Caption applied to every uploaded file.
    #[clap(long)]
    caption: Option<String>,

    /// Send video/audio files as plain documents.
    #[clap(long)]
    force_document: bool,

    /// Delete each source file after its upload is confirmed.
    #[clap(long)]
    delete: bool,

    /// Topic (forum thread) id to post into.
    #[clap(long)]
    topic: Option<i64>,

    /// Minimum seconds between progress-message edits.
    #[clap(long, default_value_t = 3.0)]
    interval: f64,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = CliArgs::parse();

    let credentials = config::load_or_prompt()?;
    let chat = ChatTarget::from_user_input(&args.chat_id);

    let transport = Arc::new(BotApiClient::new(&credentials)?);
    let executor = UploadExecutor::new(transport)
        .with_report_interval(Duration::from_secs_f64(args.interval.max(0.0)));
    let runner = BatchRunner::new(executor);

    let request = BatchRequest {
        chat,
        root: args.path,
        caption: args.caption,
        force_document: args.force_document,
        topic: args.topic,
        delete_on_success: args.delete,
    };

    let summary = runner.run(&request).await?;

    println!(
        "Uploaded {}/{} files ({} failed).",
        summary.succeeded(),
        summary.total(),
        summary.failed()
    );

    // Per-file failures were reported on their status messages; the batch
    // completing at all is a normal exit.
    Ok(())
}
