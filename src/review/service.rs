use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::core::ai::prompt::PromptTemplate;
use crate::core::ai::provider::AIProvider;
use crate::core::ai::providers::OllamaProvider;
use crate::infrastructure::error::ReviewError;
use crate::infrastructure::logging::ReviewTracker;
use crate::review::result::{ReviewRequest, ReviewResponse, ReviewResult};
use crate::review::sections::parse_sections;

/// 推理服务未返回 `response` 字段时的占位文本
pub const NO_ANALYSIS_TEXT: &str = "No analysis generated";

/// 审查配置档：决定默认提示词模板和响应整形方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewProfile {
    /// 全面分析，返回完整文本
    #[default]
    Comprehensive,
    /// 分节输出，返回 小节名 → 内容
    Structured,
}

impl ReviewProfile {
    pub fn template(&self) -> PromptTemplate {
        match self {
            ReviewProfile::Comprehensive => PromptTemplate::comprehensive(),
            ReviewProfile::Structured => PromptTemplate::structured(),
        }
    }

    pub fn shaping(&self) -> ResponseShaping {
        match self {
            ReviewProfile::Comprehensive => ResponseShaping::Comprehensive,
            ReviewProfile::Structured => ResponseShaping::Sections,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewProfile::Comprehensive => "comprehensive",
            ReviewProfile::Structured => "structured",
        }
    }
}

impl FromStr for ReviewProfile {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comprehensive" => Ok(ReviewProfile::Comprehensive),
            "structured" => Ok(ReviewProfile::Structured),
            other => Err(ReviewError::config(format!("Unknown review profile: {}", other))),
        }
    }
}

/// 响应整形策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShaping {
    Comprehensive,
    Sections,
}

impl ResponseShaping {
    /// 将模型输出转换为审查结果
    pub fn shape(&self, text: Option<String>) -> ReviewResult {
        match self {
            ResponseShaping::Comprehensive => {
                ReviewResult::comprehensive(text.unwrap_or_else(|| NO_ANALYSIS_TEXT.to_string()))
            }
            ResponseShaping::Sections => {
                ReviewResult::sectioned(parse_sections(text.as_deref().unwrap_or("")))
            }
        }
    }
}

/// 代码审查服务
pub struct ReviewService {
    provider: Arc<dyn AIProvider>,
    template: PromptTemplate,
    shaping: ResponseShaping,
}

impl ReviewService {
    /// 创建新的审查服务
    pub fn new(
        provider: Arc<dyn AIProvider>,
        template: PromptTemplate,
        shaping: ResponseShaping,
    ) -> Result<Self, ReviewError> {
        if !template.has_variable("code") {
            return Err(ReviewError::config(format!(
                "prompt template '{}' must reference {{{{code}}}}",
                template.name
            )));
        }

        Ok(Self {
            provider,
            template,
            shaping,
        })
    }

    /// 按配置组装 Ollama 提供商、模板和整形策略
    pub fn from_config(config: &Config) -> Result<Self, ReviewError> {
        let provider = OllamaProvider::new(config.provider_config())?;
        let template = config.prompt_template()?;
        Self::new(Arc::new(provider), template, config.review.profile.shaping())
    }

    pub fn shaping(&self) -> ResponseShaping {
        self.shaping
    }

    /// 提交审查
    ///
    /// 只有请求校验失败或内部错误会返回 `Err`；推理服务的失败嵌入到结果中。
    pub async fn review(&self, request: ReviewRequest) -> Result<ReviewResponse, ReviewError> {
        let code = request.validated_code()?;
        let file_name = request.file_name_or_default().to_string();
        let code_length = code.chars().count();

        let tracker = ReviewTracker::new(file_name.as_str(), code_length);
        let review_results = match self.analyze(code).await {
            Ok(results) => results,
            Err(err) => {
                tracker.complete(false, Some(&err.to_string()));
                return Err(err);
            }
        };

        tracker.complete(review_results.is_success(), review_results.error.as_deref());

        Ok(ReviewResponse {
            file_name,
            code_length,
            review_results,
        })
    }

    /// 渲染提示词并调用推理服务
    pub async fn analyze(&self, code: &str) -> Result<ReviewResult, ReviewError> {
        let prompt = self.template.render_code(code)?;

        match self.provider.generate(&prompt).await {
            Ok(text) => Ok(self.shaping.shape(text)),
            Err(err) if err.is_upstream() => {
                tracing::warn!(
                    provider = self.provider.name(),
                    kind = err.kind(),
                    error = %err,
                    "推理服务调用失败"
                );
                Ok(ReviewResult::failed(&err))
            }
            Err(err) => Err(err),
        }
    }
}
