use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::infrastructure::error::ReviewError;

static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(\w+)\}\}").expect("Failed to compile template variable regex")
});

/// 全面代码分析模板
pub const COMPREHENSIVE_TEMPLATE: &str = include_str!("../../../prompts/comprehensive-review.txt");

/// 分节输出的审查模板
pub const STRUCTURED_TEMPLATE: &str = include_str!("../../../prompts/structured-review.txt");

/// 提示词模板
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
    pub variables: Vec<String>,
}

impl PromptTemplate {
    /// 创建新的模板
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        let template_str = template.into();
        let variables = Self::extract_variables(&template_str);

        Self {
            name: name.into(),
            template: template_str,
            variables,
        }
    }

    /// 内置全面分析模板
    pub fn comprehensive() -> Self {
        Self::new("comprehensive", COMPREHENSIVE_TEMPLATE)
    }

    /// 内置分节模板
    pub fn structured() -> Self {
        Self::new("structured", STRUCTURED_TEMPLATE)
    }

    /// 从模板中提取变量（去重，保持首次出现顺序）
    fn extract_variables(template: &str) -> Vec<String> {
        let mut variables: Vec<String> = Vec::new();
        for cap in VARIABLE_PATTERN.captures_iter(template) {
            let name = cap[1].to_string();
            if !variables.contains(&name) {
                variables.push(name);
            }
        }
        variables
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// 渲染模板
    ///
    /// 单次替换：代入的值中即使包含 `{{...}}` 也不会被再次展开。
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, ReviewError> {
        if let Some(missing) = self.variables.iter().find(|v| !values.contains_key(*v)) {
            return Err(ReviewError::internal(format!(
                "prompt template '{}' is missing variable: {}",
                self.name, missing
            )));
        }

        let rendered = VARIABLE_PATTERN.replace_all(&self.template, |caps: &Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        });

        Ok(rendered.into_owned())
    }

    /// 渲染审查提示词
    pub fn render_code(&self, code: &str) -> Result<String, ReviewError> {
        let mut values = HashMap::new();
        values.insert("code".to_string(), code.to_string());
        self.render(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_variables_dedup() {
        let template = PromptTemplate::new("t", "{{code}} and {{lang}} and {{code}}");
        assert_eq!(template.variables, vec!["code".to_string(), "lang".to_string()]);
    }

    #[test]
    fn test_render_code_verbatim() {
        let template = PromptTemplate::new("t", "Review:\n```\n{{code}}\n```");
        let prompt = template.render_code("fn main() { println!(\"{}\", 1); }").unwrap();
        assert_eq!(
            prompt,
            "Review:\n```\nfn main() { println!(\"{}\", 1); }\n```"
        );
    }

    #[test]
    fn test_render_does_not_expand_placeholders_in_values() {
        let template = PromptTemplate::new("t", "A {{code}} B {{code}}");
        let prompt = template.render_code("x = \"{{code}}\"").unwrap();
        assert_eq!(prompt, "A x = \"{{code}}\" B x = \"{{code}}\"");
    }

    #[test]
    fn test_render_missing_variable() {
        let template = PromptTemplate::new("t", "{{code}} in {{language}}");
        let err = template.render_code("x").unwrap_err();
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn test_builtin_templates_reference_code() {
        assert!(PromptTemplate::comprehensive().has_variable("code"));
        assert!(PromptTemplate::structured().has_variable("code"));
        assert_eq!(PromptTemplate::structured().variables, vec!["code".to_string()]);
    }
}
