use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::error::Error as StdError;
use thiserror::Error;

/// 审查服务错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{provider} API Request Failed: {message}")]
    Upstream { provider: String, message: String },

    #[error("{provider} API Request Timed Out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal Server Error: {message}")]
    Internal { message: String },
}

impl ReviewError {
    /// 创建请求校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        ReviewError::Validation {
            message: message.into(),
        }
    }

    /// 创建上游推理服务错误
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ReviewError::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// 创建超时错误
    pub fn timeout(provider: impl Into<String>, timeout_ms: u64) -> Self {
        ReviewError::Timeout {
            provider: provider.into(),
            timeout_ms,
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        ReviewError::Configuration {
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        ReviewError::Internal {
            message: message.into(),
        }
    }

    /// 错误类别标识，写入响应体的 `error_kind`
    pub fn kind(&self) -> &'static str {
        match self {
            ReviewError::Validation { .. } => "validation",
            ReviewError::Upstream { .. } => "upstream",
            ReviewError::Timeout { .. } => "timeout",
            ReviewError::Configuration { .. } => "configuration",
            ReviewError::Internal { .. } => "internal",
        }
    }

    /// 上游错误不会变成 HTTP 错误，而是嵌入到 200 响应的 `reviewResults` 中
    pub fn is_upstream(&self) -> bool {
        matches!(self, ReviewError::Upstream { .. } | ReviewError::Timeout { .. })
    }

    /// 对外暴露时使用的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::Validation { .. } => StatusCode::BAD_REQUEST,
            ReviewError::Upstream { .. } | ReviewError::Timeout { .. } => StatusCode::OK,
            ReviewError::Configuration { .. } | ReviewError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 将 reqwest 错误归类为超时或普通上游错误
    ///
    /// 连接阶段超时报告连接超时时长，其余超时报告整体请求超时时长。
    pub fn from_reqwest(
        provider: &str,
        error: &reqwest::Error,
        timeout_ms: u64,
        connect_timeout_ms: u64,
    ) -> Self {
        if error.is_connect() && error.is_timeout() {
            ReviewError::timeout(provider, connect_timeout_ms)
        } else if error.is_timeout() {
            ReviewError::timeout(provider, timeout_ms)
        } else {
            ReviewError::upstream(provider, error_chain(error))
        }
    }
}

/// 将错误及其 source 链拼接成一行，保留底层原因（如 Connection refused）
pub fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }

    message
}

/// HTTP 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: &'static str,
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            status: "error",
        };
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(error: serde_json::Error) -> Self {
        ReviewError::Upstream {
            provider: "Ollama".to_string(),
            message: format!("invalid response body: {}", error),
        }
    }
}
