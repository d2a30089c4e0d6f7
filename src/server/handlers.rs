use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::infrastructure::error::ReviewError;
use crate::review::result::{ReviewRequest, ReviewResponse};
use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthServices {
    pub code_review: &'static str,
    pub ollama_integration: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub services: HealthServices,
}

/// GET /health - 静态状态，不探测推理服务
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "operational",
        services: HealthServices {
            code_review: "fully functional",
            ollama_integration: "connected",
        },
    })
}

/// POST /api/review - 提交代码审查
pub async fn review(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ReviewError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "请求体无效");
        ReviewError::validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let response = state.service().review(request).await.map_err(|err| {
        if !matches!(err, ReviewError::Validation { .. }) {
            tracing::error!(kind = err.kind(), error = %err, "审查请求处理失败");
        }
        err
    })?;

    Ok(Json(response))
}
