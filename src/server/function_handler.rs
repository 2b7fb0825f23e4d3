//! Framework-neutral request handler
//! 与框架无关的请求处理器
//!
//! For hosts that hand over a method and a raw body (serverless style)
//! instead of running the axum router. Behaves like `POST/OPTIONS /predict`.

use axum::http::{HeaderName, HeaderValue, Method, Response, StatusCode};
use serde_json::Value;

use super::routes::PredictResponse;
use crate::predict::{PredictError, PredictService};

/// Cross-origin headers attached to every reply / 附加到每个响应的跨域头
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "POST, OPTIONS"),
    ("access-control-allow-headers", "Content-Type, Authorization"),
];

/// Reply produced by [`handle`] / [`handle`]生成的响应
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, &'static str)>,
    /// JSON body, `None` for an empty body / JSON响应体，空响应体为`None`
    pub body: Option<Value>,
}

impl HandlerResponse {
    fn new(status: StatusCode, body: Option<Value>) -> Self {
        let mut headers = CORS_HEADERS.to_vec();
        if body.is_some() {
            headers.push(("content-type", "application/json"));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    fn from_error(err: &PredictError) -> Self {
        let body = serde_json::to_value(err.to_body()).unwrap_or(Value::Null);
        Self::new(err.status_code(), Some(body))
    }

    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            Some(v) => v.to_string().into_bytes(),
            None => Vec::new(),
        }
    }

    /// Convert into an `http` response / 转换为`http`响应
    pub fn into_http(self) -> Response<Vec<u8>> {
        let mut resp = Response::new(self.body_bytes());
        *resp.status_mut() = self.status;
        for (name, value) in self.headers {
            resp.headers_mut().insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        resp
    }
}

/// Handle one request / 处理单个请求
pub async fn handle(service: &PredictService, method: &Method, body: &[u8]) -> HandlerResponse {
    match method {
        &Method::OPTIONS => HandlerResponse::new(StatusCode::OK, None),
        &Method::POST => match service.handle_body(body).await {
            Ok(output) => {
                let body = serde_json::to_value(PredictResponse { output }).unwrap_or(Value::Null);
                HandlerResponse::new(StatusCode::OK, Some(body))
            }
            Err(err) => HandlerResponse::from_error(&err),
        },
        _ => HandlerResponse::from_error(&PredictError::MethodNotAllowed),
    }
}
