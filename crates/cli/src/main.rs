//! `scriptsync` -- change plans for automation scripts.
//!
//! Reads annotated scripts, fetches the scripts already published in the
//! registry, and prints what has to change by hand for each file.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default                         |
//! |--------------------------|----------|---------------------------------|
//! | `NINJAONE_INSTANCE_URL`  | yes      | --                              |
//! | `NINJAONE_CLIENT_ID`     | yes      | --                              |
//! | `NINJAONE_CLIENT_SECRET` | yes      | --                              |
//! | `NINJAONE_SCOPE`         | no       | `monitoring management control` |
//! | `RUST_LOG`               | no       | `scriptsync=info`               |

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scriptsync_cli::report::{self, OutputFormat};
use scriptsync_registry::{RegistryClient, RegistryConfig};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str =
    "scriptsync=info,scriptsync_cli=info,scriptsync_registry=info,scriptsync_core=warn";

#[derive(Parser)]
#[command(name = "scriptsync", about = "Plan registry changes for automation scripts", version)]
struct Cli {
    /// Only consider paths starting with this prefix. Pass "" to accept all.
    #[arg(long, default_value = "scripts/")]
    prefix: String,

    /// Output format for the change plans.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Script files to plan, typically the files changed in a commit.
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "scriptsync failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RegistryConfig::from_env()?;

    if cli.files.is_empty() {
        println!("No files to sync.");
        return Ok(());
    }

    let client = RegistryClient::new(config);
    let remote_records = client
        .fetch_remote_records()
        .await
        .context("Failed to fetch remote scripts")?;

    let run = scriptsync_cli::plan_paths(&cli.files, &cli.prefix, &remote_records);
    if run.is_empty() {
        println!("No files to sync.");
        return Ok(());
    }

    let rendered = report::render(&run, cli.format).context("Failed to render reports")?;
    println!("{rendered}");
    Ok(())
}
