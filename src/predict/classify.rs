//! Terminal job classification
//! 终止任务分类

use serde_json::Value;

use super::error::{PredictError, PredictResult};
use super::types::{Job, JobStatus};

/// Map the last observed job onto the outward result.
/// 将最后观测到的任务映射为对外结果。
///
/// Only a succeeded job with non-empty output yields text. A job still in a
/// non-terminal status means the poll budget ran out.
pub fn classify(job: Job) -> PredictResult<String> {
    match job.status {
        JobStatus::Succeeded => match job.output {
            Some(output) if !output.is_empty() => Ok(output.into_text()),
            _ => Err(PredictError::protocol(
                "Prediction provider response missing valid 'output' field after success.",
                Some(job.raw),
            )),
        },
        JobStatus::Failed => Err(PredictError::JobFailed {
            details: job
                .error
                .unwrap_or_else(|| Value::String("Unknown error".to_string())),
        }),
        JobStatus::Canceled => Err(PredictError::JobFailed {
            details: job
                .error
                .unwrap_or_else(|| Value::String("Prediction was canceled".to_string())),
        }),
        JobStatus::Unrecognized(ref raw) => Err(PredictError::protocol(
            format!("Prediction provider returned an unrecognized job status '{}'.", raw),
            Some(job.raw),
        )),
        JobStatus::Starting | JobStatus::Processing => {
            Err(PredictError::Timeout { details: job.raw })
        }
    }
}
