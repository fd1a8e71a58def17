//! apisheet — dispatch spreadsheet-described HTTP calls and flatten the
//! request/response pairs into exportable rows.

pub mod batch;
pub mod config;
pub mod dispatch;
pub mod export;
pub mod normalize;
pub mod runner;
pub mod types;

pub use batch::{BatchProcessor, BatchSummary};
pub use config::DispatchConfig;
pub use dispatch::{parse_payload_items, RawResponse, RequestDispatcher};
pub use export::Exporter;
pub use normalize::normalize;
pub use runner::{flatten, JobRun, JobRunner, JobState};
pub use types::*;
