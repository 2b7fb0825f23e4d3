//! HTTP routes for the Orrery gateway
//! Orrery网关的HTTP路由

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::gateway::GatewayState;
use crate::predict::PredictError;

/// Successful prediction reply / 预测成功响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub output: String,
}

/// Create HTTP routes / 创建HTTP路由
pub fn create_routes(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route(
            "/predict",
            post(predict).options(preflight).fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn predict(State(state): State<GatewayState>, body: Bytes) -> Response {
    match state.service.handle_body(&body).await {
        Ok(output) => (StatusCode::OK, Json(PredictResponse { output })).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> PredictError {
    PredictError::MethodNotAllowed
}

async fn root() -> &'static str {
    "API is running!"
}

/// Health check endpoint / 健康检查端点
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "orrery"
    }))
}
