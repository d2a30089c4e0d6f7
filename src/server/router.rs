use std::any::Any;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;
use crate::config::CorsConfig;
use crate::infrastructure::error::ReviewError;

/// 创建路由
pub fn create_router(state: AppState) -> Result<Router, ReviewError> {
    let cors = cors_layer(&state.config().cors)?;
    let max_body_bytes = state.config().server.max_body_bytes;

    let api = Router::new()
        .route("/api/review", post(handlers::review))
        .layer(cors);

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// `/api/*` 的跨域策略
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ReviewError> {
    let allow_origin = if config.allowed_origins.is_empty()
        || config.allowed_origins.iter().any(|o| o == "*")
    {
        AllowOrigin::any()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ReviewError::config(format!("invalid CORS origin: {}", origin)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "请求处理过程中发生 panic");
    ReviewError::internal("unexpected failure while handling the request").into_response()
}
