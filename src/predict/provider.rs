//! Remote prediction provider client
//! 远程预测提供方客户端
//!
//! `JobProvider` is the seam between the prediction pipeline and the hosted
//! inference service. `HttpJobProvider` speaks the Replicate-style
//! predictions API: `POST {base}/predictions` creates a job and
//! `GET {base}/predictions/{id}` re-fetches it.

use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::error::{PredictError, PredictResult};
use super::secret::ApiToken;
use super::types::{CreateJob, Job};

/// Job provider abstraction / 任务提供方抽象
#[async_trait]
pub trait JobProvider: Send + Sync {
    /// Whether a credential is available / 是否有可用凭证
    fn is_configured(&self) -> bool;

    /// Create a job, returning its initial state / 创建任务并返回其初始状态
    async fn create_job(&self, req: &CreateJob) -> PredictResult<Job>;

    /// Re-fetch a job by id / 按ID重新获取任务
    async fn get_job(&self, id: &str) -> PredictResult<Job>;
}

/// HTTP implementation of [`JobProvider`] / [`JobProvider`]的HTTP实现
pub struct HttpJobProvider {
    client: reqwest::Client,
    base_url: Url,
    token: Option<ApiToken>,
}

impl HttpJobProvider {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        token: Option<ApiToken>,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid provider base_url: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("provider base_url cannot be a base: {}", base_url));
        }
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("build provider http client")?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> PredictResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| PredictError::transport("provider base_url cannot be a base"))?;
            path.pop_if_empty();
            for s in segments {
                path.push(s);
            }
        }
        Ok(url)
    }

    fn auth_header(&self) -> PredictResult<String> {
        let token = self.token.as_ref().ok_or(PredictError::Configuration)?;
        Ok(format!("Token {}", token.expose_secret()))
    }

    fn create_body(req: &CreateJob) -> Value {
        json!({
            "version": req.model,
            "input": {
                "prompt": req.prompt,
                "system_prompt": req.system_prompt,
            },
        })
    }
}

#[async_trait]
impl JobProvider for HttpJobProvider {
    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn create_job(&self, req: &CreateJob) -> PredictResult<Job> {
        let url = self.endpoint(&["predictions"])?;
        debug!(%url, model = %req.model, "creating prediction job");

        let resp = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("authorization", self.auth_header()?)
            .json(&Self::create_body(req))
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(PredictError::Provider {
                status: status.as_u16(),
                details,
            });
        }

        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            PredictError::transport(format!("invalid JSON from provider: {}", e))
        })?;
        let job = Job::from_value(parsed.clone()).map_err(|_| {
            PredictError::protocol(
                "Prediction provider returned an unexpected job document.",
                Some(parsed),
            )
        })?;
        if job.id.is_none() {
            return Err(PredictError::protocol(
                "Prediction provider did not return a job ID.",
                Some(job.raw),
            ));
        }
        Ok(job)
    }

    async fn get_job(&self, id: &str) -> PredictResult<Job> {
        let url = self.endpoint(&["predictions", id])?;

        let resp = self
            .client
            .get(url)
            .header("authorization", self.auth_header()?)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(PredictError::transport(format!(
                "poll for job {} returned status {}: {}",
                id,
                status.as_u16(),
                text
            )));
        }

        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            PredictError::transport(format!("invalid JSON from provider: {}", e))
        })?;
        Job::from_value(parsed)
            .map_err(|e| PredictError::transport(format!("invalid job document: {}", e)))
    }
}
