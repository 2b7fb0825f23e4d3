//! Core data types for prediction jobs
//! 预测任务的核心数据类型

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Validated inbound question / 已验证的入站问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictRequest {
    pub prompt: String,
}

/// Payload for the create-job call / 创建任务调用的负载
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateJob {
    pub prompt: String,
    pub system_prompt: String,
    pub model: String,
}

/// Remote job lifecycle status / 远程任务生命周期状态
///
/// Values the provider sends that are not known here land in `Unrecognized`
/// and are treated as terminal so the poll loop never spins on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Unrecognized(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "starting" => JobStatus::Starting,
            "processing" => JobStatus::Processing,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            "canceled" | "cancelled" => JobStatus::Canceled,
            other => JobStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Unrecognized(s) => s.as_str(),
        }
    }

    /// Whether polling should stop at this status / 是否应在此状态停止轮询
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Starting | JobStatus::Processing)
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Unrecognized(String::new())
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Unrecognized(s) if s.is_empty() => f.write_str("<missing>"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => JobStatus::parse(&s),
            Some(Value::Null) | None => JobStatus::default(),
            Some(other) => JobStatus::Unrecognized(other.to_string()),
        })
    }
}

/// Job output: a single string or a stream of fragments / 任务输出：单个字符串或片段序列
///
/// `null` fragments are kept and skipped when joining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobOutput {
    Text(String),
    Fragments(Vec<Option<String>>),
}

impl JobOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            JobOutput::Text(s) => s.is_empty(),
            JobOutput::Fragments(parts) => parts.iter().flatten().all(|p| p.is_empty()),
        }
    }

    /// Join fragments in order with no separator / 按顺序无分隔符拼接片段
    pub fn into_text(self) -> String {
        match self {
            JobOutput::Text(s) => s,
            JobOutput::Fragments(parts) => parts.into_iter().flatten().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobWire {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    status: JobStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Last observed state of a remote job / 远程任务最近一次观测到的状态
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: Option<String>,
    pub status: JobStatus,
    pub output: Option<JobOutput>,
    pub error: Option<Value>,
    /// Full provider document, kept for diagnostics / 完整的提供方文档，用于诊断
    pub raw: Value,
}

impl Job {
    /// Build a job from a provider JSON document.
    ///
    /// Fails only when the document is not a JSON object. An `output` of an
    /// unexpected shape is dropped rather than failing the whole document.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        if !raw.is_object() {
            return Err(serde::de::Error::custom("job document is not a JSON object"));
        }
        let wire: JobWire = serde_json::from_value(raw.clone())?;
        let id = match wire.id {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let output = wire
            .output
            .and_then(|v| serde_json::from_value::<JobOutput>(v).ok());
        let error = wire.error.filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });
        Ok(Self {
            id,
            status: wire.status,
            output,
            error,
            raw,
        })
    }
}

/// Polling cadence and budget / 轮询节奏与预算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between fetches / 两次获取之间的等待
    pub interval: Duration,
    /// Maximum number of follow-up fetches / 最大后续获取次数
    pub max_attempts: u32,
    /// Consecutive fetch failures absorbed before giving up / 放弃前可容忍的连续获取失败次数
    pub failure_tolerance: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 60,
            failure_tolerance: 0,
        }
    }
}
