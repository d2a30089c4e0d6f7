use reqwest::Client;
use std::time::Duration;

use crate::infrastructure::error::ReviewError;

/// 构建推理服务使用的 HTTP 客户端
///
/// 连接超时和整体请求超时都必须显式给出，避免推理服务无响应时请求无限挂起。
pub fn build_client(timeout: Duration, connect_timeout: Duration) -> Result<Client, ReviewError> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .user_agent(format!("code-review-server/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ReviewError::config(format!("Failed to create HTTP client: {}", e)))
}
