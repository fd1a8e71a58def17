//! Configuration loading and resolution.

use apisheet::DispatchConfig;

/// Workbook read when `--excel` is not given.
pub const DEFAULT_WORKBOOK: &str = "datas.xlsx";

/// Plain-text log file appended to on every run.
pub const LOG_FILE: &str = "request_app.log";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolve dispatch settings once at startup: environment, then defaults.
pub fn load_dispatch_config() -> DispatchConfig {
    let config = DispatchConfig::from_env();
    tracing::debug!(
        "Dispatch config: timeout={}s content-type={} workers={}",
        config.request_timeout.as_secs(),
        config.content_type,
        config.effective_workers()
    );
    config
}
