//! Server module - hosting adapters for the prediction service
//! 服务器模块 - 预测服务的托管适配器
//!
//! The prediction pipeline is exposed two ways:
//! 预测流水线以两种方式对外提供：
//!
//! - `routes` / `gateway`: axum router with CORS, served by `HttpGateway`
//!   axum路由器（含CORS），由`HttpGateway`提供服务
//! - `function_handler`: plain `(method, body) -> response` function
//!   普通的`(method, body) -> response`函数
//!
//! ## Module Structure / 模块结构
//!
//! - `config`: CLI arguments and layered configuration / 命令行参数与分层配置
//! - `gateway`: shared state and router assembly / 共享状态与路由组装
//! - `routes`: HTTP routes and handlers / HTTP路由与处理器
//! - `function_handler`: framework-neutral adapter / 与框架无关的适配器
//! - `http_gateway`: listener and server lifecycle / 监听器与服务器生命周期

pub mod config;
pub mod function_handler;
pub mod gateway;
pub mod http_gateway;
pub mod routes;

#[cfg(test)]
mod config_test;

// Re-export commonly used types / 重新导出常用类型
pub use config::{CliArgs, GatewayConfig, ProviderConfig};
pub use function_handler::{handle, HandlerResponse};
pub use gateway::{create_gateway_router, GatewayState};
pub use http_gateway::HttpGateway;
pub use routes::PredictResponse;
