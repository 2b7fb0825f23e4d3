//! Prediction module - job submission and polling against a hosted model
//! 预测模块 - 面向托管模型的任务提交与轮询
//!
//! A single request flows through four steps:
//! 单个请求依次经过四个步骤：
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │  Validator  │──▶│  Submitter  │──▶│  Poll loop  │──▶│ Classifier  │
//! │  请求验证   │   │  任务提交   │   │  状态轮询   │   │  结果分类   │
//! └─────────────┘   └─────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! Requests share nothing but the read-only provider handle and policy.
//! 请求之间仅共享只读的提供方句柄和策略。

pub mod classify;
pub mod error;
pub mod poller;
pub mod provider;
pub mod secret;
pub mod service;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types / 重新导出常用类型
pub use classify::classify;
pub use error::{ErrorBody, PredictError, PredictResult};
pub use poller::{poll_until_terminal, PollOutcome};
pub use provider::{HttpJobProvider, JobProvider};
pub use secret::ApiToken;
pub use service::{validate_request, PredictService, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use types::{CreateJob, Job, JobOutput, JobStatus, PollPolicy, PredictRequest};
