//! Configuration management for the Orrery gateway
//! Orrery网关的配置管理
//!
//! This module holds the configuration pieces shared by every binary:
//! - Server bind settings / 服务器绑定设置
//! - Logging settings and tracing initialization / 日志设置与跟踪初始化
//!
//! Service-specific configuration (provider endpoint, polling budget) lives in
//! `crate::server::config` and builds on the types defined here.
//! 服务特定配置（提供方端点、轮询预算）位于 `crate::server::config`。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::{layer::Layered, EnvFilter, Layer, Registry};

/// Base configuration shared by all applications / 所有应用程序共享的基础配置
pub mod base;
pub use base::*;

/// Common logging configuration / 通用日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) / 日志级别
    pub level: String,
    /// Log format (json, compact, pretty) / 日志格式
    pub format: String,
    /// Enable file logging / 启用文件日志
    pub file_enabled: bool,
    /// Log file path / 日志文件路径
    pub file_path: Option<PathBuf>,
}

static FILE_LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_enabled: false,
            file_path: None,
        }
    }
}

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

fn stdout_layer(format: &str) -> BoxedLayer {
    let base = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);
    match format {
        "json" => base.json().boxed(),
        "compact" => base.compact().boxed(),
        _ => base.pretty().boxed(),
    }
}

fn file_layer(format: &str, writer: tracing_appender::non_blocking::NonBlocking) -> BoxedLayer {
    let base = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true)
        .with_ansi(false)
        .with_writer(writer);
    // Pretty output is unreadable in files, compact is used instead.
    // 文件中不使用pretty格式，改用compact。
    match format {
        "json" => base.json().boxed(),
        _ => base.compact().boxed(),
    }
}

fn open_log_file(path: &Path) -> Result<tracing_appender::non_blocking::NonBlocking> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create log dir: {}", parent.display()))?;
        }
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = FILE_LOG_GUARD.set(guard);
    Ok(writer)
}

/// Initialize tracing based on logging configuration
/// 基于日志配置初始化跟踪
///
/// `RUST_LOG` takes precedence over the configured level.
/// `RUST_LOG` 优先于配置的日志级别。
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.level.trim().is_empty() {
            EnvFilter::new("info")
        } else {
            EnvFilter::new(config.level.clone())
        }
    });

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer(config.format.as_str())];
    if config.file_enabled {
        if let Some(path) = config.file_path.as_ref() {
            let writer = open_log_file(path)?;
            layers.push(file_layer(config.format.as_str(), writer));
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
