use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod run;

use config::Settings;
use run::RunOptions;

/// Load a Payline settlement CSV and add invoice/payment records to the
/// membership directory.
#[derive(Debug, Parser)]
#[command(name = "payline-sync", version)]
struct Cli {
    /// Turn on debug logging and transaction tables
    #[arg(long)]
    debug: bool,

    /// Do everything except post invoices and payments
    #[arg(long, alias = "dryrun")]
    dry_run: bool,

    /// Configuration file (default: etc/payline-sync.toml under the working
    /// directory or the install prefix)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Settlement CSV file to read
    input_file: PathBuf,
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    debug!(?cli, "starting");

    let settings = Settings::load(cli.config.as_deref())?;
    let opts = RunOptions {
        input_file: cli.input_file,
        dry_run: cli.dry_run,
    };

    if let Some(report) = run::run(&settings, &opts).await? {
        if report.dry_run {
            info!(
                "dry run: {} invoice/payment pair(s) would be posted, {} skipped",
                report.submitted.len(),
                report.skipped
            );
        } else {
            info!(
                "posted {} invoice/payment pair(s), {} skipped",
                report.submitted.len(),
                report.skipped
            );
        }
    }
    Ok(())
}
