//! Prediction service: validate, submit, poll, classify
//! 预测服务：验证、提交、轮询、分类

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use super::classify::classify;
use super::error::{PredictError, PredictResult};
use super::poller::poll_until_terminal;
use super::provider::JobProvider;
use super::types::{CreateJob, PollPolicy, PredictRequest};

/// Persona sent alongside every prompt / 随每个提示一起发送的角色设定
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in astronomy, planetary science, and the solar system. You can answer questions eloquently and provide factual information about planets, stars, and celestial phenomena.";

/// Model identifier sent with every job / 每个任务发送的模型标识
pub const DEFAULT_MODEL: &str = "ibm-granite/granite-3.3-8b-instruct";

/// Parse and validate an inbound request body / 解析并验证入站请求体
pub fn validate_request(body: &[u8]) -> PredictResult<PredictRequest> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        PredictError::invalid_request(format!("request body is not valid JSON: {}", e))
    })?;
    let obj = value
        .as_object()
        .ok_or_else(|| PredictError::invalid_request("request body must be a JSON object"))?;
    match obj.get("prompt") {
        Some(Value::String(prompt)) if !prompt.trim().is_empty() => Ok(PredictRequest {
            prompt: prompt.clone(),
        }),
        Some(Value::String(_)) => Err(PredictError::invalid_request("prompt is empty")),
        Some(Value::Null) | None => Err(PredictError::invalid_request("prompt is missing")),
        Some(_) => Err(PredictError::invalid_request("prompt must be a string")),
    }
}

/// Prediction service / 预测服务
#[derive(Clone)]
pub struct PredictService {
    provider: Arc<dyn JobProvider>,
    policy: PollPolicy,
    model: String,
    system_prompt: String,
}

impl PredictService {
    pub fn new(provider: Arc<dyn JobProvider>, policy: PollPolicy) -> Self {
        Self {
            provider,
            policy,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Validate a raw body and answer it / 验证原始请求体并给出答案
    pub async fn handle_body(&self, body: &[u8]) -> PredictResult<String> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("predict", %request_id);
        async move {
            let request = validate_request(body).map_err(|e| {
                warn!(kind = e.kind(), error = %e, "rejected prediction request");
                e
            })?;
            self.predict(&request.prompt).await
        }
        .instrument(span)
        .await
    }

    /// Run one prompt through the provider / 通过提供方处理一个提示
    pub async fn predict(&self, prompt: &str) -> PredictResult<String> {
        info!(prompt_len = prompt.len(), "received prompt");
        debug!(prompt, "prompt text");

        let result = self.run(prompt).await;
        match &result {
            Ok(output) => info!(output_len = output.len(), "prediction succeeded"),
            Err(PredictError::Configuration) => {
                error!(kind = "configuration", "provider credential is not configured")
            }
            Err(e) => error!(
                kind = e.kind(),
                status = e.status_code().as_u16(),
                error = %e,
                "prediction failed"
            ),
        }
        result
    }

    async fn run(&self, prompt: &str) -> PredictResult<String> {
        if !self.provider.is_configured() {
            return Err(PredictError::Configuration);
        }

        let job = self
            .provider
            .create_job(&CreateJob {
                prompt: prompt.to_string(),
                system_prompt: self.system_prompt.clone(),
                model: self.model.clone(),
            })
            .await?;
        info!(
            job_id = job.id.as_deref().unwrap_or_default(),
            status = %job.status,
            "prediction job created"
        );

        let outcome = poll_until_terminal(self.provider.as_ref(), job, &self.policy).await?;
        if outcome.exhausted() {
            warn!(
                attempts = outcome.attempts,
                status = %outcome.job.status,
                "poll budget exhausted"
            );
        } else {
            debug!(
                attempts = outcome.attempts,
                status = %outcome.job.status,
                "job reached terminal status"
            );
        }
        classify(outcome.job)
    }
}
