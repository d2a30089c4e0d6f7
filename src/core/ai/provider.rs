use async_trait::async_trait;
use std::time::Duration;

use crate::infrastructure::error::ReviewError;

/// AI 提供商配置
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub model: String,
    pub api_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: String::from("llama3.2:latest"),
            api_url: String::from("http://localhost:11434/api/generate"),
            temperature: 0.7,
            max_tokens: 4000,
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// AI 提供商接口
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// 提供商名称，用于错误信息
    fn name(&self) -> &'static str;

    /// 生成响应（非流式）
    ///
    /// 返回 `Ok(None)` 表示服务端成功响应但没有给出 `response` 字段。
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ReviewError>;
}
