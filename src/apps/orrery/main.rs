//! Orrery gateway main entry point
//! Orrery网关主入口点

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use orrery_gateway::config::init_tracing;
use orrery_gateway::predict::{HttpJobProvider, PredictService};
use orrery_gateway::server::{CliArgs, GatewayConfig, GatewayState, HttpGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments / 解析命令行参数
    let args = CliArgs::parse();

    // Load configuration / 加载配置
    let config = GatewayConfig::load_with_cli(&args)?;

    // Initialize logging with configuration / 使用配置初始化日志
    init_tracing(&config.log.to_logging_config())?;

    if let Some(path) = GatewayConfig::missing_config_path(&args) {
        tracing::warn!("Config file '{}' not found, using defaults", path);
    }

    tracing::info!("Orrery gateway starting with:");
    tracing::info!("  - HTTP gateway on: {}", config.http.addr);
    tracing::info!("  - Provider: {}", config.provider.base_url);
    tracing::info!("  - Model: {}", config.provider.model);
    tracing::info!(
        "  - Polling: every {}ms, up to {} attempts",
        config.provider.poll_interval_ms,
        config.provider.max_poll_attempts
    );

    // The credential is read once here and injected into the provider.
    // 凭证仅在此处读取一次并注入提供方。
    let token = config.resolve_api_token();
    if token.is_none() {
        tracing::warn!(
            env = %config.provider.api_token_env,
            "API token is not set, every prediction request will fail with a configuration error"
        );
    }

    let provider = HttpJobProvider::new(
        &config.provider.base_url,
        config.provider.request_timeout(),
        token,
    )
    .context("Failed to build provider client")?;

    let service = PredictService::new(Arc::new(provider), config.provider.poll_policy())
        .with_model(config.provider.model.clone())
        .with_system_prompt(config.provider.system_prompt.clone());

    let gateway = HttpGateway::new(config.http.addr, GatewayState::new(service));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut http_handle = tokio::spawn(async move {
        gateway
            .start_with_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut http_handle => {
            // Server stopped on its own, e.g. it failed to bind.
            return res.context("HTTP gateway task failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
        }
    }

    tracing::info!("Orrery gateway shutting down");
    let _ = shutdown_tx.send(());
    http_handle.await.context("HTTP gateway task failed")??;

    Ok(())
}
