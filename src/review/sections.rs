//! 模型输出的分节解析。
//!
//! 一行非缩进、以冒号结尾的文本（`^\S.*:$`）开启新的小节，其余行归入当前小节。
//! 第一个小节标题之前的内容归入 [`PREAMBLE_SECTION`]。模型不遵守该约定时，
//! 结果可能只有一个 `General` 小节、出现空小节或同名小节被合并。

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// 第一个标题之前的内容所属的小节
pub const PREAMBLE_SECTION: &str = "General";

static HEADER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S.*:$").expect("Failed to compile section header regex"));

/// 行级状态机
#[derive(Debug, Default)]
pub struct SectionParser<'a> {
    sections: IndexMap<String, String>,
    current: Option<(String, Vec<&'a str>)>,
}

impl<'a> SectionParser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输入一行文本
    pub fn feed(&mut self, line: &'a str) {
        match header_name(line) {
            Some(name) => {
                self.flush();
                self.current = Some((name, Vec::new()));
            }
            None => {
                if let Some((_, lines)) = self.current.as_mut() {
                    lines.push(line);
                } else if !line.trim().is_empty() {
                    self.current = Some((PREAMBLE_SECTION.to_string(), vec![line]));
                }
            }
        }
    }

    /// 结束解析并返回按出现顺序排列的小节
    pub fn finish(mut self) -> IndexMap<String, String> {
        self.flush();
        self.sections
    }

    fn flush(&mut self) {
        let Some((name, lines)) = self.current.take() else {
            return;
        };

        let body = lines.join("\n").trim().to_string();

        match self.sections.get_mut(&name) {
            Some(existing) if existing.is_empty() => *existing = body,
            Some(existing) => {
                if !body.is_empty() {
                    existing.push_str("\n\n");
                    existing.push_str(&body);
                }
            }
            None => {
                self.sections.insert(name, body);
            }
        }
    }
}

/// 若该行是小节标题，返回清理后的标题名
fn header_name(line: &str) -> Option<String> {
    let line = line.trim_end();
    if !HEADER_PATTERN.is_match(line) {
        return None;
    }

    let name = line[..line.len() - 1]
        .trim_start_matches(|c: char| c == '#' || c == '*' || c.is_whitespace())
        .trim_end_matches(|c: char| c == '*' || c.is_whitespace());

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// 将模型输出拆分为 小节名 → 内容
pub fn parse_sections(text: &str) -> IndexMap<String, String> {
    let mut parser = SectionParser::new();
    for line in text.lines() {
        parser.feed(line);
    }
    parser.finish()
}
