//! # AirScribe
//!
//! Command-line host for the AirScribe air-drawing pipeline.

use airscribe_cli::{run_replay, CliArgs, Command};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing.
///
/// Set `RUST_LOG` to control log levels
/// (default: `airscribe_cli=info,airscribe_core=info,airscribe_renderer=info`).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("airscribe_cli=info,airscribe_core=info,airscribe_renderer=info")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Replay(replay) => {
            let summary = run_replay(&replay).await?;
            for file in &summary.files {
                println!("{}", file.display());
            }
            tracing::info!(
                pages = summary.pages,
                strokes = summary.strokes,
                gallery_index = summary.gallery_index,
                "Replay complete"
            );
        }
    }

    Ok(())
}
