mod handlers;
mod router;
mod state;

pub use handlers::{Health, HealthServices};
pub use router::{cors_layer, create_router};
pub use state::AppState;

use crate::config::Config;

/// 启动 HTTP 服务，收到 Ctrl-C 或 SIGTERM 后优雅退出
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.server_addr();
    let state = AppState::from_config(config)?;
    let router = create_router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Code review server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Code review server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "无法监听 Ctrl-C 信号");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "无法监听 SIGTERM 信号");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("收到退出信号，开始关闭服务");
}
