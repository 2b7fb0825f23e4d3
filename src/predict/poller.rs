//! Job status poll loop
//! 任务状态轮询循环

use tracing::{debug, warn};

use super::error::{PredictError, PredictResult};
use super::provider::JobProvider;
use super::types::{Job, PollPolicy};

/// Result of a finished poll loop / 轮询循环结束后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// Last observed job state / 最后观测到的任务状态
    pub job: Job,
    /// Follow-up fetches issued / 发出的后续获取次数
    pub attempts: u32,
}

impl PollOutcome {
    /// Budget ran out before a terminal status / 在终止状态前预算耗尽
    pub fn exhausted(&self) -> bool {
        !self.job.status.is_terminal()
    }
}

struct PollState {
    attempts: u32,
    max_attempts: u32,
    consecutive_failures: u32,
}

impl PollState {
    fn has_budget(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

/// Re-fetch `initial` until it reaches a terminal status or the budget runs out.
/// 重新获取任务直到终止状态或预算耗尽。
///
/// A job that is already terminal is returned without any fetch. Every
/// iteration waits `policy.interval` before fetching, and only one fetch is
/// in flight at a time. A failed fetch ends the loop with that error once
/// more than `policy.failure_tolerance` failures happen in a row.
pub async fn poll_until_terminal(
    provider: &dyn JobProvider,
    initial: Job,
    policy: &PollPolicy,
) -> PredictResult<PollOutcome> {
    let id = initial.id.clone().ok_or_else(|| {
        PredictError::protocol("Cannot poll a job without an ID.", Some(initial.raw.clone()))
    })?;

    let mut state = PollState {
        attempts: 0,
        max_attempts: policy.max_attempts,
        consecutive_failures: 0,
    };
    let mut job = initial;

    while !job.status.is_terminal() && state.has_budget() {
        state.attempts += 1;
        tokio::time::sleep(policy.interval).await;

        match provider.get_job(&id).await {
            Ok(next) => {
                state.consecutive_failures = 0;
                debug!(
                    job_id = %id,
                    attempt = state.attempts,
                    status = %next.status,
                    "polled prediction job"
                );
                job = next;
            }
            Err(err) => {
                state.consecutive_failures += 1;
                if state.consecutive_failures > policy.failure_tolerance {
                    return Err(err);
                }
                warn!(
                    job_id = %id,
                    attempt = state.attempts,
                    failures = state.consecutive_failures,
                    error = %err,
                    "poll fetch failed, retrying on next attempt"
                );
            }
        }
    }

    Ok(PollOutcome {
        job,
        attempts: state.attempts,
    })
}
