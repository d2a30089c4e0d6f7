use clap::Parser;
use code_review_server::cli::args::Args;
use code_review_server::config::{self, Config};
use code_review_server::infrastructure::setup_logging;
use code_review_server::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 需要在解析参数之前加载，REVIEW_CONFIG 可能来自其中
    config::load_env_files();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    config.update_from_args(&args);
    config.validate()?;

    setup_logging(config.tracing_config()?)?;

    tracing::info!(
        model = %config.inference.model,
        ollama_url = %config.inference.ollama_url,
        profile = config.review.profile.as_str(),
        timeout_secs = config.inference.timeout_secs,
        "配置加载完成"
    );

    server::run(config).await
}
