//! Error types for the prediction pipeline
//! 预测流水线的错误类型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Prediction pipeline error types / 预测流水线错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// Missing or empty prompt, or unparseable body / 提示缺失、为空或请求体无法解析
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Provider credential not configured / 未配置提供方凭证
    #[error("provider credential is not configured")]
    Configuration,

    /// Provider rejected the create-job call / 提供方拒绝了创建任务调用
    #[error("provider returned status {status}")]
    Provider { status: u16, details: Value },

    /// Provider answered but broke the response contract / 提供方响应违反约定
    #[error("protocol error: {message}")]
    Protocol {
        message: String,
        details: Option<Value>,
    },

    /// Network or parse failure talking to the provider / 与提供方通信时的网络或解析失败
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Provider marked the job failed / 提供方将任务标记为失败
    #[error("job failed: {details}")]
    JobFailed { details: Value },

    /// Poll budget exhausted while the job was still running / 轮询预算耗尽而任务仍在运行
    #[error("job did not finish within the polling budget")]
    Timeout { details: Value },

    #[error("method not allowed")]
    MethodNotAllowed,
}

/// Result type alias for prediction operations / 预测操作的结果类型别名
pub type PredictResult<T> = Result<T, PredictError>;

/// Outward error body / 对外错误响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl PredictError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        PredictError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn protocol(message: impl Into<String>, details: Option<Value>) -> Self {
        PredictError::Protocol {
            message: message.into(),
            details,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        PredictError::Transport {
            message: message.into(),
        }
    }

    /// Short machine-friendly kind, used in logs / 简短的错误种类，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::InvalidRequest { .. } => "invalid_request",
            PredictError::Configuration => "configuration",
            PredictError::Provider { .. } => "provider",
            PredictError::Protocol { .. } => "protocol",
            PredictError::Transport { .. } => "transport",
            PredictError::JobFailed { .. } => "job_failed",
            PredictError::Timeout { .. } => "timeout",
            PredictError::MethodNotAllowed => "method_not_allowed",
        }
    }

    /// HTTP status for this error / 此错误对应的HTTP状态码
    ///
    /// Provider statuses are echoed; one that is not a valid HTTP status
    /// becomes 502.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            PredictError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            PredictError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            PredictError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            PredictError::Configuration
            | PredictError::Protocol { .. }
            | PredictError::Transport { .. }
            | PredictError::JobFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        match self {
            PredictError::InvalidRequest { reason } => ErrorBody {
                error: "Prompt is required.".to_string(),
                details: Some(Value::String(reason.clone())),
            },
            PredictError::Configuration => ErrorBody {
                error: "Server configuration error: AI API token is missing.".to_string(),
                details: None,
            },
            PredictError::Provider { status, details } => ErrorBody {
                error: format!("Prediction provider error: {}", status),
                details: Some(details.clone()),
            },
            PredictError::Protocol { message, details } => ErrorBody {
                error: message.clone(),
                details: details.clone(),
            },
            PredictError::Transport { message } => ErrorBody {
                error: "Failed to communicate with the prediction provider.".to_string(),
                details: Some(Value::String(message.clone())),
            },
            PredictError::JobFailed { details } => ErrorBody {
                error: "AI prediction failed.".to_string(),
                details: Some(details.clone()),
            },
            PredictError::Timeout { details } => ErrorBody {
                error: "AI prediction timed out.".to_string(),
                details: Some(details.clone()),
            },
            PredictError::MethodNotAllowed => ErrorBody {
                error: "Method not allowed.".to_string(),
                details: None,
            },
        }
    }
}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        PredictError::transport(err.to_string())
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}
