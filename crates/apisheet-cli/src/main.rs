//! apisheet — entry point.

use std::path::{Path, PathBuf};

use clap::Parser;

use apisheet_cli::config::{load_dispatch_config, DEFAULT_WORKBOOK, LOG_FILE};
use apisheet_cli::{interrupted, logging, run, RunOptions};

#[derive(Parser)]
#[command(
    name = "apisheet",
    about = "Run the HTTP calls described in a workbook and save the results per application",
    version
)]
struct Cli {
    /// Path to the workbook of call descriptions.
    #[arg(long, default_value = DEFAULT_WORKBOOK)]
    excel: PathBuf,

    /// Only run jobs whose application label equals this value.
    #[arg(long)]
    filter: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(Path::new(LOG_FILE));

    tracing::info!("Starting application...");

    let options = RunOptions {
        workbook: cli.excel,
        label_filter: cli.filter,
        dispatch: load_dispatch_config(),
        output_dir: None,
    };

    tokio::select! {
        result = run(options) => {
            if let Err(e) = &result {
                tracing::error!("Unexpected error: {e:#}");
            }
            result?;
            tracing::info!("Application completed successfully.");
        }
        _ = interrupted(tokio::signal::ctrl_c()) => {
            tracing::info!("Application stopped by user.");
        }
    }

    Ok(())
}
