use crate::core::ai::http::build_client;
use crate::core::ai::provider::{AIProvider, ProviderConfig};
use crate::infrastructure::error::ReviewError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const PROVIDER_NAME: &str = "Ollama";

/// Ollama 请求结构
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama 选项
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    max_tokens: u32,
}

/// Ollama 响应结构
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Ollama AI 提供商
pub struct OllamaProvider {
    client: Client,
    config: ProviderConfig,
}

impl OllamaProvider {
    /// 创建新的 Ollama 提供商
    pub fn new(config: ProviderConfig) -> Result<Self, ReviewError> {
        let client = build_client(config.timeout, config.connect_timeout)?;
        Ok(Self { client, config })
    }

    fn classify(&self, error: &reqwest::Error) -> ReviewError {
        ReviewError::from_reqwest(
            PROVIDER_NAME,
            error,
            self.config.timeout.as_millis() as u64,
            self.config.connect_timeout.as_millis() as u64,
        )
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> OllamaRequest<'a> {
        OllamaRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
            },
        }
    }
}

#[async_trait]
impl AIProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn generate(&self, prompt: &str) -> Result<Option<String>, ReviewError> {
        let request = self.build_request(prompt);

        tracing::debug!(
            url = %self.config.api_url,
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "发送 Ollama 请求"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {} - {}", status, text.trim())
            };
            return Err(ReviewError::upstream(PROVIDER_NAME, message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify(&e))?;
        let ollama_response: OllamaResponse = serde_json::from_str(&body)?;

        Ok(ollama_response.response)
    }
}
