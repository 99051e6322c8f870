//! CLI for the postinstall setup tool.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use postinstall_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_demo, run_fetch, DemoSettings, FetchSettings};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "postinstall")]
#[command(about = "Download and verify installers for a fresh Windows setup", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one or more installers, one progress row each.
    Fetch {
        /// Direct HTTP/HTTPS URLs, downloaded in order.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Directory to save into (default: config `download_dir`, else the current directory).
        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Expected SHA-256 of the file (only with a single URL).
        #[arg(long, value_name = "HEX")]
        sha256: Option<String>,
    },

    /// Drive simulated operations to preview the progress display.
    Demo {
        /// Number of concurrent rows.
        #[arg(long, default_value = "3", value_name = "N")]
        rows: usize,

        /// Total units per row.
        #[arg(long, default_value = "100", value_name = "N")]
        total: u64,

        /// Delay between update rounds in milliseconds.
        #[arg(long, default_value = "50", value_name = "MS")]
        step_ms: u64,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                urls,
                output_dir,
                sha256,
            } => {
                let settings = FetchSettings {
                    urls,
                    output_dir,
                    sha256,
                };
                run_fetch(&cfg, settings).await?;
            }
            CliCommand::Demo {
                rows,
                total,
                step_ms,
            } => {
                let settings = DemoSettings {
                    rows,
                    total,
                    step_ms,
                };
                run_demo(&cfg.progress, settings).await?;
            }
            CliCommand::Checksum { path } => run_checksum(&path).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
