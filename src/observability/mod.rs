//! 可观测性
//!
//! 默认 info，可通过 RUST_LOG 覆盖。TUI 占用终端时日志写入 data_dir 下的文件。

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE: &str = "kiosk.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 日志输出到 stderr（非交互工具用）
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// 日志追加到 `<data_dir>/kiosk.log`，返回日志文件路径
pub fn init_file(data_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let log_path = data_dir.join(LOG_FILE);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    let fmt_layer = fmt::layer()
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false);
    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
    {
        tracing::warn!(error = %err, "tracing already initialized; keeping existing subscriber");
    }
    Ok(log_path)
}
