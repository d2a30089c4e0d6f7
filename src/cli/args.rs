use clap::Parser;
use std::path::PathBuf;

use crate::review::service::ReviewProfile;

#[derive(Parser, Debug, Default)]
#[command(
    name = "code-review-server",
    version,
    about = "代码审查 HTTP 服务 - 将代码片段转发给本地 Ollama 模型并返回审查结果"
)]
pub struct Args {
    /// 配置文件路径（.toml / .yaml / .json）
    #[arg(short, long, env = "REVIEW_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 监听地址
    #[arg(long)]
    pub host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    pub port: Option<u16>,

    /// 审查配置档 (comprehensive 或 structured)
    #[arg(long, value_parser = parse_profile)]
    pub profile: Option<ReviewProfile>,

    /// 使用的模型
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama generate 接口地址
    #[arg(long, value_name = "URL")]
    pub ollama_url: Option<String>,

    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

fn parse_profile(value: &str) -> Result<ReviewProfile, String> {
    value.parse().map_err(|e: crate::infrastructure::error::ReviewError| e.to_string())
}
