//! Orrery gateway configuration
//! Orrery网关配置

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::config::base::{LogConfig, ServerConfig};
use crate::predict::{ApiToken, PollPolicy, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};

/// Environment variable prefix / 环境变量前缀
pub const ENV_PREFIX: &str = "ORRERY_";

/// Orrery command line arguments / Orrery命令行参数
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "orrery",
    version = "0.1.0",
    about = "Orrery - planet question gateway\nOrrery - 行星问答网关",
    long_about = "Orrery forwards questions about planets to a hosted language model and returns the answer.\nOrrery将关于行星的问题转发给托管语言模型并返回答案。"
)]
pub struct CliArgs {
    /// Configuration file path / 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path / 配置文件路径"
    )]
    pub config: Option<String>,

    /// HTTP gateway address / HTTP网关地址
    #[arg(
        long,
        value_name = "ADDR",
        help = "HTTP gateway address (e.g., 0.0.0.0:3001) / HTTP网关地址"
    )]
    pub http_addr: Option<String>,

    /// Log level / 日志级别
    #[arg(
        long,
        value_name = "LEVEL",
        help = "Log level (trace, debug, info, warn, error) / 日志级别"
    )]
    pub log_level: Option<String>,

    /// Log format / 日志格式
    #[arg(
        long,
        value_name = "FORMAT",
        help = "Log format (json, compact, pretty) / 日志格式"
    )]
    pub log_format: Option<String>,

    /// Provider base URL / 提供方基础URL
    #[arg(
        long,
        value_name = "URL",
        help = "Prediction provider base URL / 预测提供方基础URL"
    )]
    pub provider_base_url: Option<String>,

    /// Model identifier / 模型标识
    #[arg(long, value_name = "MODEL", help = "Model identifier / 模型标识")]
    pub model: Option<String>,
}

/// Prediction provider configuration / 预测提供方配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider API base URL / 提供方API基础URL
    pub base_url: String,
    /// Model identifier sent with each job / 每个任务发送的模型标识
    pub model: String,
    /// Persona sent with each job / 每个任务发送的角色设定
    pub system_prompt: String,
    /// Environment variable holding the API token / 保存API令牌的环境变量
    pub api_token_env: String,
    /// Per-call HTTP timeout in milliseconds / 单次调用HTTP超时（毫秒）
    pub request_timeout_ms: u64,
    /// Wait between polls in milliseconds / 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// Maximum follow-up polls / 最大后续轮询次数
    pub max_poll_attempts: u32,
    /// Consecutive poll failures absorbed / 可容忍的连续轮询失败次数
    pub poll_failure_tolerance: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.replicate.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_token_env: "REPLICATE_API_TOKEN".to_string(),
            request_timeout_ms: 30_000,
            poll_interval_ms: 1000,
            max_poll_attempts: 60,
            poll_failure_tolerance: 0,
        }
    }
}

impl ProviderConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
            failure_tolerance: self.poll_failure_tolerance,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Orrery gateway configuration / Orrery网关配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP gateway configuration / HTTP网关配置
    pub http: ServerConfig,
    /// Logging configuration / 日志配置
    pub log: LogConfig,
    /// Prediction provider configuration / 预测提供方配置
    pub provider: ProviderConfig,
}

impl GatewayConfig {
    /// Load configuration with CLI arguments override / 使用CLI参数覆盖加载配置
    ///
    /// Precedence (highest to lowest) / 优先级（从高到低）:
    /// 1. Command line arguments / 命令行参数
    /// 2. `PORT` environment variable (port only) / `PORT`环境变量（仅端口）
    /// 3. `ORRERY_*` environment variables / `ORRERY_*`环境变量
    /// 4. Configuration file / 配置文件
    /// 5. Default values / 默认值
    pub fn load_with_cli(args: &CliArgs) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match &args.config {
            Some(path) if Path::new(path).exists() => {
                figment = figment.merge(Toml::file(path));
            }
            Some(_) => {}
            None => {
                figment = figment.merge(Toml::file("config.toml"));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Self = figment.extract().context("Failed to load configuration")?;
        config.apply_port(std::env::var("PORT").ok().as_deref())?;
        config.apply_cli(args)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit `--config` path that does not exist / 不存在的显式`--config`路径
    ///
    /// Loading falls back to defaults for such a path. Callers report it once
    /// tracing is up.
    pub fn missing_config_path(args: &CliArgs) -> Option<&str> {
        args.config
            .as_deref()
            .filter(|path| !Path::new(path).exists())
    }

    /// Override only the port of the HTTP address / 仅覆盖HTTP地址的端口
    pub fn apply_port(&mut self, port: Option<&str>) -> anyhow::Result<()> {
        if let Some(p) = port.map(str::trim).filter(|p| !p.is_empty()) {
            let port: u16 = p
                .parse()
                .with_context(|| format!("invalid PORT value: {}", p))?;
            self.http.addr.set_port(port);
        }
        Ok(())
    }

    fn apply_cli(&mut self, args: &CliArgs) -> anyhow::Result<()> {
        if let Some(http_addr) = &args.http_addr {
            self.http.addr = http_addr
                .parse()
                .with_context(|| format!("invalid --http-addr: {}", http_addr))?;
        }
        if let Some(level) = &args.log_level {
            self.log.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            self.log.format = format.clone();
        }
        if let Some(base_url) = &args.provider_base_url {
            self.provider.base_url = base_url.clone();
        }
        if let Some(model) = &args.model {
            self.provider.model = model.clone();
        }
        Ok(())
    }

    /// Validate the configuration / 验证配置
    pub fn validate(&self) -> anyhow::Result<()> {
        let p = &self.provider;
        if p.poll_interval_ms == 0 {
            bail!("provider.poll_interval_ms must be greater than zero");
        }
        if p.max_poll_attempts == 0 {
            bail!("provider.max_poll_attempts must be greater than zero");
        }
        if p.model.trim().is_empty() {
            bail!("provider.model must not be empty");
        }
        if p.api_token_env.trim().is_empty() {
            bail!("provider.api_token_env must not be empty");
        }
        let url = url::Url::parse(p.base_url.trim())
            .map_err(|e| anyhow!("invalid provider.base_url '{}': {}", p.base_url, e))?;
        if url.cannot_be_a_base() {
            bail!("provider.base_url '{}' cannot be a base URL", p.base_url);
        }
        Ok(())
    }

    /// Read the provider credential from the environment / 从环境变量读取提供方凭证
    pub fn resolve_api_token(&self) -> Option<ApiToken> {
        ApiToken::from_env(self.provider.api_token_env.trim())
    }
}
