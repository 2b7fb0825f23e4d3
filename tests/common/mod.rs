//! Shared helpers for integration tests
//! 集成测试的共享工具
//!
//! `MockProvider` is a small axum server that speaks the predictions API.
//! Poll responses are served in order and the last one repeats.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_test::TestServer;
use orrery_gateway::predict::{ApiToken, HttpJobProvider, PollPolicy, PredictService};
use orrery_gateway::server::{create_gateway_router, GatewayState};
use serde_json::Value;
use tokio::net::TcpListener;

pub type Reply = (StatusCode, Value);

#[derive(Default)]
pub struct Recorded {
    pub create_bodies: Vec<Value>,
    pub auth_headers: Vec<String>,
    pub polled_ids: Vec<String>,
}

struct Script {
    create: Reply,
    polls: VecDeque<Reply>,
}

#[derive(Clone)]
struct MockState {
    script: Arc<Mutex<Script>>,
    recorded: Arc<Mutex<Recorded>>,
}

fn record_auth(recorded: &Mutex<Recorded>, headers: &HeaderMap) {
    if let Some(v) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        recorded.lock().unwrap().auth_headers.push(v.to_string());
    }
}

async fn create_prediction(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state.recorded, &headers);
    state.recorded.lock().unwrap().create_bodies.push(body);
    let (status, body) = state.script.lock().unwrap().create.clone();
    (status, Json(body))
}

async fn get_prediction(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    record_auth(&state.recorded, &headers);
    state.recorded.lock().unwrap().polled_ids.push(id);
    let mut script = state.script.lock().unwrap();
    let reply = if script.polls.len() > 1 {
        script.polls.pop_front()
    } else {
        script.polls.front().cloned()
    };
    let (status, body) =
        reply.unwrap_or((StatusCode::NOT_FOUND, serde_json::json!({"detail": "not found"})));
    (status, Json(body))
}

/// Scripted predictions API / 脚本化的预测API
pub struct MockProvider {
    pub base_url: String,
    recorded: Arc<Mutex<Recorded>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockProvider {
    pub async fn start(create: Reply, polls: Vec<Reply>) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            script: Arc::new(Mutex::new(Script {
                create,
                polls: polls.into(),
            })),
            recorded: recorded.clone(),
        };
        let app = Router::new()
            .route("/v1/predictions", post(create_prediction))
            .route("/v1/predictions/{id}", get(get_prediction))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            recorded,
            _handle: handle,
        }
    }

    pub fn recorded<R>(&self, f: impl FnOnce(&Recorded) -> R) -> R {
        f(&self.recorded.lock().unwrap())
    }
}

/// Fast polling for tests / 测试用的快速轮询
pub fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        max_attempts,
        failure_tolerance: 0,
    }
}

/// Build a gateway test server wired to the mock / 构建连接到模拟服务的网关测试服务器
pub fn gateway_for(mock: &MockProvider, token: Option<&str>, policy: PollPolicy) -> TestServer {
    let provider = HttpJobProvider::new(
        &mock.base_url,
        Duration::from_secs(5),
        token.and_then(ApiToken::new),
    )
    .unwrap();
    let service = PredictService::new(Arc::new(provider), policy);
    TestServer::new(create_gateway_router(GatewayState::new(service))).unwrap()
}
