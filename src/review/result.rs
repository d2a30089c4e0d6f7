use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::infrastructure::error::ReviewError;

/// 未提供文件名时使用的占位名称
pub const DEFAULT_FILE_NAME: &str = "Unnamed";

/// 审查请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "fileName")]
    pub file_name: Option<String>,
}

impl ReviewRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// 校验请求，返回非空的代码内容
    pub fn validated_code(&self) -> Result<&str, ReviewError> {
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(ReviewError::validation("No code provided for analysis")),
        }
    }

    pub fn file_name_or_default(&self) -> &str {
        self.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
    }
}

/// 审查状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Success,
    Error,
}

/// 审查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comprehensive_review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl ReviewResult {
    /// 完整文本形式的成功结果
    pub fn comprehensive(review: impl Into<String>) -> Self {
        Self {
            status: ReviewStatus::Success,
            comprehensive_review: Some(review.into()),
            sections: None,
            error: None,
            error_kind: None,
        }
    }

    /// 分节形式的成功结果
    pub fn sectioned(sections: IndexMap<String, String>) -> Self {
        Self {
            status: ReviewStatus::Success,
            comprehensive_review: None,
            sections: Some(sections),
            error: None,
            error_kind: None,
        }
    }

    /// 失败结果，错误信息嵌入到响应体中
    pub fn failed(error: &ReviewError) -> Self {
        Self {
            status: ReviewStatus::Error,
            comprehensive_review: None,
            sections: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReviewStatus::Success
    }
}

/// 审查响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "codeLength")]
    pub code_length: usize,
    #[serde(rename = "reviewResults")]
    pub review_results: ReviewResult,
}
