//! apisheet CLI — workbook adapters, logging, and the run entry point.

pub mod app;
pub mod config;
pub mod logging;
pub mod workbook;

pub use app::{interrupted, run, RunOptions};
pub use workbook::{load_jobs, XlsxExporter};
