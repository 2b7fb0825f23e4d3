//! Test utilities for the prediction pipeline
//! 预测流水线的测试工具

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Instant;

use super::error::{PredictError, PredictResult};
use super::provider::JobProvider;
use super::types::{CreateJob, Job};

pub(crate) fn job(v: Value) -> Job {
    Job::from_value(v).expect("test job document must be an object")
}

pub(crate) fn job_with_status(status: &str) -> Job {
    job(json!({"id": "job-1", "status": status}))
}

/// In-memory provider that replays scripted responses / 回放预设响应的内存提供方
pub(crate) struct ScriptedProvider {
    configured: bool,
    create: Mutex<Option<PredictResult<Job>>>,
    polls: Mutex<VecDeque<PredictResult<Job>>>,
    repeat: Option<Job>,
    create_calls: AtomicUsize,
    poll_times: Mutex<Vec<Instant>>,
    last_create: Mutex<Option<CreateJob>>,
}

impl ScriptedProvider {
    pub(crate) fn new(create: PredictResult<Job>) -> Self {
        Self {
            configured: true,
            create: Mutex::new(Some(create)),
            polls: Mutex::new(VecDeque::new()),
            repeat: None,
            create_calls: AtomicUsize::new(0),
            poll_times: Mutex::new(Vec::new()),
            last_create: Mutex::new(None),
        }
    }

    pub(crate) fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Queue one poll response / 排入一个轮询响应
    pub(crate) fn then(self, poll: PredictResult<Job>) -> Self {
        self.polls.lock().unwrap().push_back(poll);
        self
    }

    /// Answer every poll past the queue with `job` / 队列耗尽后始终返回该任务
    pub(crate) fn repeat(mut self, job: Job) -> Self {
        self.repeat = Some(job);
        self
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn poll_count(&self) -> usize {
        self.poll_times.lock().unwrap().len()
    }

    pub(crate) fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().unwrap().clone()
    }

    pub(crate) fn last_create(&self) -> Option<CreateJob> {
        self.last_create.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobProvider for ScriptedProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_job(&self, req: &CreateJob) -> PredictResult<Job> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_create.lock().unwrap() = Some(req.clone());
        self.create
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(PredictError::transport("create_job called twice")))
    }

    async fn get_job(&self, _id: &str) -> PredictResult<Job> {
        self.poll_times.lock().unwrap().push(Instant::now());
        if let Some(next) = self.polls.lock().unwrap().pop_front() {
            return next;
        }
        match &self.repeat {
            Some(job) => Ok(job.clone()),
            None => Err(PredictError::transport("no scripted poll response")),
        }
    }
}
