//! One complete run: load the workbook, process every job, export results.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use anyhow::Context;

use apisheet::{BatchProcessor, BatchSummary, DispatchConfig, JobRunner, RequestDispatcher};

use crate::workbook::{load_jobs, XlsxExporter};

/// Inputs of a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub workbook: PathBuf,
    /// An empty filter selects every job.
    pub label_filter: Option<String>,
    pub dispatch: DispatchConfig,
    /// Where result workbooks go; the working directory when unset.
    pub output_dir: Option<PathBuf>,
}

/// Execute a run. Only setup failures are returned as errors; per-job
/// failures are logged and counted in the summary.
pub async fn run(options: RunOptions) -> anyhow::Result<BatchSummary> {
    let dispatcher =
        RequestDispatcher::new(&options.dispatch).context("failed to set up HTTP dispatch")?;

    tracing::info!("Loading jobs from '{}'...", options.workbook.display());
    let jobs = load_jobs(&options.workbook);

    let mut batch = BatchProcessor::new(JobRunner::new(dispatcher), XlsxExporter);
    if let Some(dir) = options.output_dir {
        batch = batch.with_output_dir(dir);
    }

    let label_filter = options.label_filter.as_deref().filter(|f| !f.is_empty());
    let summary = batch.run(&jobs, label_filter).await;
    tracing::info!(
        "Processed {} job(s): {} exported, {} skipped",
        summary.selected,
        summary.exported,
        summary.skipped
    );

    Ok(summary)
}

/// Resolve when `signal` reports an interruption.
///
/// If the handler could not be installed this never resolves, so the run
/// carries on instead of being cancelled.
pub async fn interrupted(signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => {}
        Err(e) => {
            tracing::warn!("Could not listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
