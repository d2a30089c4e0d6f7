use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::ai::prompt::PromptTemplate;
use crate::core::ai::provider::ProviderConfig;
use crate::infrastructure::error::ReviewError;
use crate::infrastructure::logging::{LogFormat, LogOutput, LoggingConfig as TracingConfig};
use crate::review::service::ReviewProfile;

/// 服务配置，进程启动时加载一次，之后只读
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub review: ReviewConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

/// 推理服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub ollama_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// 审查配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub profile: ReviewProfile,
    /// 内联自定义模板，优先于 `prompt_template_file`
    pub prompt_template: Option<String>,
    pub prompt_template_file: Option<PathBuf>,
}

/// 跨域配置，只作用于 `/api/*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// stdout、stderr 或文件路径
    pub output: String,
    pub include_file_location: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.2:latest".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            include_file_location: false,
        }
    }
}

/// 加载 .env 文件（用户目录优先，其次当前目录），不覆盖已存在的环境变量
pub fn load_env_files() {
    if let Ok(home) = env::var("HOME") {
        let user_env_path = PathBuf::from(home).join(".code-review").join(".env");
        if user_env_path.exists() {
            dotenvy::from_path(user_env_path).ok();
        }
    }

    dotenvy::dotenv().ok();
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ReviewError> {
    value
        .trim()
        .parse()
        .map_err(|_| ReviewError::config(format!("invalid value for {}: {}", name, value)))
}

impl Config {
    /// 默认值 → 配置文件 → 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ReviewError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.load_from_env()?;
        Ok(config)
    }

    /// 从文件加载配置，格式由扩展名决定
    pub fn from_file(path: &Path) -> Result<Self, ReviewError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReviewError::config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ReviewError::config(format!("TOML 解析错误: {}", e))),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| ReviewError::config(format!("YAML 解析错误: {}", e))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ReviewError::config(format!("JSON 解析错误: {}", e))),
            _ => Err(ReviewError::config(format!(
                "不支持的配置文件格式: {}",
                path.display()
            ))),
        }
    }

    /// 从环境变量加载配置，覆盖文件中的值
    pub fn load_from_env(&mut self) -> Result<(), ReviewError> {
        if let Ok(host) = env::var("REVIEW_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("REVIEW_PORT") {
            self.server.port = parse_env("REVIEW_PORT", &port)?;
        }
        if let Ok(limit) = env::var("REVIEW_MAX_BODY_BYTES") {
            self.server.max_body_bytes = parse_env("REVIEW_MAX_BODY_BYTES", &limit)?;
        }

        // REVIEW_OLLAMA_URL 优先于 OLLAMA_API_BASE_URL
        if let Ok(url) = env::var("OLLAMA_API_BASE_URL") {
            self.inference.ollama_url = url;
        }
        if let Ok(url) = env::var("REVIEW_OLLAMA_URL") {
            self.inference.ollama_url = url;
        }
        if let Ok(model) = env::var("REVIEW_MODEL") {
            self.inference.model = model;
        }
        if let Ok(temperature) = env::var("REVIEW_TEMPERATURE") {
            self.inference.temperature = parse_env("REVIEW_TEMPERATURE", &temperature)?;
        }
        if let Ok(max_tokens) = env::var("REVIEW_MAX_TOKENS") {
            self.inference.max_tokens = parse_env("REVIEW_MAX_TOKENS", &max_tokens)?;
        }
        if let Ok(timeout) = env::var("REVIEW_TIMEOUT_SECS") {
            self.inference.timeout_secs = parse_env("REVIEW_TIMEOUT_SECS", &timeout)?;
        }
        if let Ok(timeout) = env::var("REVIEW_CONNECT_TIMEOUT_SECS") {
            self.inference.connect_timeout_secs =
                parse_env("REVIEW_CONNECT_TIMEOUT_SECS", &timeout)?;
        }

        if let Ok(profile) = env::var("REVIEW_PROFILE") {
            self.review.profile = profile.parse()?;
        }
        if let Ok(path) = env::var("REVIEW_PROMPT_TEMPLATE_FILE") {
            self.review.prompt_template_file = Some(PathBuf::from(path));
        }

        if let Ok(origins) = env::var("REVIEW_CORS_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(level) = env::var("REVIEW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("REVIEW_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// 命令行参数优先级最高
    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(profile) = args.profile {
            self.review.profile = profile;
        }
        if let Some(model) = &args.model {
            self.inference.model = model.clone();
        }
        if let Some(url) = &args.ollama_url {
            self.inference.ollama_url = url.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ReviewError> {
        let url = url::Url::parse(&self.inference.ollama_url).map_err(|e| {
            ReviewError::config(format!(
                "invalid Ollama URL '{}': {}",
                self.inference.ollama_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ReviewError::config(format!(
                "Ollama URL must use http or https: {}",
                self.inference.ollama_url
            )));
        }

        if self.inference.model.trim().is_empty() {
            return Err(ReviewError::config("model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(ReviewError::config(format!(
                "temperature must be between 0 and 2, got {}",
                self.inference.temperature
            )));
        }
        if self.inference.max_tokens == 0 {
            return Err(ReviewError::config("max_tokens must be greater than 0"));
        }
        if self.inference.timeout_secs == 0 || self.inference.connect_timeout_secs == 0 {
            return Err(ReviewError::config("timeouts must be greater than 0"));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ReviewError::config("max_body_bytes must be greater than 0"));
        }

        for origin in &self.cors.allowed_origins {
            if origin != "*" && axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ReviewError::config(format!("invalid CORS origin: {}", origin)));
            }
        }

        self.tracing_config()?;

        let template = self.prompt_template()?;
        if !template.has_variable("code") {
            return Err(ReviewError::config(format!(
                "prompt template '{}' must reference {{{{code}}}}",
                template.name
            )));
        }

        Ok(())
    }

    /// 监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 推理提供商配置
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            model: self.inference.model.clone(),
            api_url: self.inference.ollama_url.clone(),
            temperature: self.inference.temperature,
            max_tokens: self.inference.max_tokens,
            timeout: Duration::from_secs(self.inference.timeout_secs),
            connect_timeout: Duration::from_secs(self.inference.connect_timeout_secs),
        }
    }

    /// 解析最终使用的提示词模板：内联 → 文件 → 配置档内置模板
    pub fn prompt_template(&self) -> Result<PromptTemplate, ReviewError> {
        if let Some(template) = &self.review.prompt_template {
            return Ok(PromptTemplate::new("custom", template.clone()));
        }

        if let Some(path) = &self.review.prompt_template_file {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ReviewError::config(format!("无法读取提示词模板 {}: {}", path.display(), e))
            })?;
            return Ok(PromptTemplate::new(path.display().to_string(), content));
        }

        Ok(self.review.profile.template())
    }

    /// 转换为 tracing 日志配置
    pub fn tracing_config(&self) -> Result<TracingConfig, ReviewError> {
        let level = tracing::Level::from_str(self.logging.level.trim()).map_err(|_| {
            ReviewError::config(format!("invalid log level: {}", self.logging.level))
        })?;
        let format = LogFormat::from_str(&self.logging.format).map_err(ReviewError::config)?;
        let output = match self.logging.output.trim().to_lowercase().as_str() {
            "" | "stdout" => LogOutput::Stdout,
            "stderr" => LogOutput::Stderr,
            _ => LogOutput::File(PathBuf::from(self.logging.output.trim())),
        };

        Ok(TracingConfig {
            level,
            format,
            output,
            include_file_location: self.logging.include_file_location,
        })
    }
}
