use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    pub include_file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            output: LogOutput::Stdout,
            include_file_location: false,
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// 人类可读的格式
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// 日志输出目标
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File(PathBuf),
}

/// 构建日志过滤器
///
/// `RUST_LOG` 非空且可解析时整体生效，否则使用配置中的级别。
pub fn build_env_filter(level: Level) -> anyhow::Result<EnvFilter> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok());

    match from_env {
        Some(filter) => Ok(filter),
        None => Ok(EnvFilter::try_new(format!(
            "code_review_server={level},tower_http={level}"
        ))?),
    }
}

/// 设置日志系统
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = build_env_filter(config.level)?;

    let fmt_layer = match &config.output {
        LogOutput::Stdout => create_fmt_layer(&config, io::stdout, true),
        LogOutput::Stderr => create_fmt_layer(&config, io::stderr, true),
        LogOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            create_fmt_layer(&config, Mutex::new(file), false)
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .try_init()?;

    Ok(())
}

fn create_fmt_layer<W>(
    config: &LoggingConfig,
    make_writer: W,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Send + Sync + 'static>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(make_writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_file(config.include_file_location)
        .with_line_number(config.include_file_location);

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// 单次审查请求跟踪
pub struct ReviewTracker {
    operation_id: String,
    file_name: String,
    start_time: Instant,
}

impl ReviewTracker {
    pub fn new(file_name: impl Into<String>, code_length: usize) -> Self {
        let operation_id = uuid::Uuid::new_v4().to_string();
        let file_name = file_name.into();

        tracing::info!(
            operation_id = %operation_id,
            file_name = %file_name,
            code_length,
            "开始代码审查"
        );

        Self {
            operation_id,
            file_name,
            start_time: Instant::now(),
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn complete(self, success: bool, detail: Option<&str>) {
        let duration_ms = self.start_time.elapsed().as_millis() as u64;

        if success {
            tracing::info!(
                operation_id = %self.operation_id,
                file_name = %self.file_name,
                duration_ms,
                "代码审查完成"
            );
        } else {
            tracing::warn!(
                operation_id = %self.operation_id,
                file_name = %self.file_name,
                duration_ms,
                error = detail.unwrap_or(""),
                "代码审查失败"
            );
        }
    }
}
