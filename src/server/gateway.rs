//! HTTP gateway router and shared state
//! HTTP网关路由器与共享状态

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use super::routes::create_routes;
use crate::predict::PredictService;

/// HTTP gateway state / HTTP网关状态
#[derive(Clone)]
pub struct GatewayState {
    pub service: PredictService,
}

impl GatewayState {
    pub fn new(service: PredictService) -> Self {
        Self { service }
    }
}

/// Cross-origin policy for the viewer / 面向查看器的跨域策略
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create HTTP gateway router / 创建HTTP网关路由器
pub fn create_gateway_router(state: GatewayState) -> Router {
    create_routes(state).layer(cors_layer())
}
