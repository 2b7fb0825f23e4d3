//! Orrery gateway: answers planet questions through a hosted language model
//! Orrery网关：通过托管语言模型回答行星问题

// Shared modules / 共享模块
pub mod config;

// Service-specific modules / 服务特定模块
pub mod predict;
pub mod server;

// Re-exports / 重新导出
pub use config::*;
