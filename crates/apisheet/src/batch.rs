//! Sequential processing of all jobs in a run.

use std::path::PathBuf;

use crate::export::Exporter;
use crate::runner::JobRunner;
use crate::types::JobRecord;

/// Counts reported at the end of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Jobs left after the label filter.
    pub selected: usize,
    /// Jobs whose rows were written.
    pub exported: usize,
    /// Jobs that failed or whose export was refused.
    pub skipped: usize,
}

/// Runs jobs one after another and hands each result to the exporter.
pub struct BatchProcessor<E: Exporter> {
    runner: JobRunner,
    exporter: E,
    output_dir: Option<PathBuf>,
}

impl<E: Exporter> BatchProcessor<E> {
    pub fn new(runner: JobRunner, exporter: E) -> Self {
        Self {
            runner,
            exporter,
            output_dir: None,
        }
    }

    /// Write tables under `dir` instead of the working directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// Export target for a label: `<label>.<ext>`.
    pub fn target_for(&self, label: &str) -> PathBuf {
        let file_name = format!("{label}.{}", self.exporter.extension());
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Process `jobs`, restricted to `label_filter` when set (exact match).
    ///
    /// A failing job is skipped; it never stops the jobs after it.
    pub async fn run(&self, jobs: &[JobRecord], label_filter: Option<&str>) -> BatchSummary {
        let selected: Vec<&JobRecord> = match label_filter {
            Some(filter) => {
                let matching: Vec<&JobRecord> =
                    jobs.iter().filter(|job| job.label == filter).collect();
                tracing::info!("Found {} job(s) matching filter '{filter}'", matching.len());
                matching
            }
            None => jobs.iter().collect(),
        };

        tracing::info!("Sending requests for {} job(s)...", selected.len());

        let mut summary = BatchSummary {
            selected: selected.len(),
            ..BatchSummary::default()
        };

        for job in selected {
            let Some(records) = self.runner.run(job).await else {
                tracing::warn!("No results for {}, continuing...", job.label);
                summary.skipped += 1;
                continue;
            };

            let target = self.target_for(&job.label);
            if self.exporter.export(&records, &target, &job.label) {
                summary.exported += 1;
            } else {
                summary.skipped += 1;
            }
        }

        summary
    }
}
