//! HTTP gateway server
//! HTTP网关服务器

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use super::gateway::{create_gateway_router, GatewayState};

/// Orrery HTTP gateway / Orrery HTTP网关
pub struct HttpGateway {
    addr: SocketAddr,
    state: GatewayState,
}

impl HttpGateway {
    /// Create a new HTTP gateway / 创建新的HTTP网关
    pub fn new(addr: SocketAddr, state: GatewayState) -> Self {
        Self { addr, state }
    }

    /// Get the HTTP address / 获取HTTP地址
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the HTTP gateway / 启动HTTP网关
    pub async fn start(self) -> Result<()> {
        let (listener, app) = self.prepare().await?;
        axum::serve(listener, app).await.context("HTTP gateway error")?;
        Ok(())
    }

    /// Start HTTP gateway with shutdown signal / 使用关闭信号启动HTTP网关
    ///
    /// In-flight predictions finish on their own poll budget before the
    /// server returns.
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (listener, app) = self.prepare().await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP gateway error")?;
        Ok(())
    }

    async fn prepare(self) -> Result<(tokio::net::TcpListener, Router)> {
        info!("Starting Orrery HTTP gateway on {}", self.addr);
        let app = create_gateway_router(self.state);
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("bind HTTP gateway on {}", self.addr))?;
        info!("Orrery HTTP gateway listening on {}", listener.local_addr()?);
        Ok((listener, app))
    }
}
