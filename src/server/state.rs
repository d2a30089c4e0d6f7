use std::sync::Arc;

use crate::config::Config;
use crate::infrastructure::error::ReviewError;
use crate::review::service::ReviewService;

/// HTTP 服务共享状态
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    service: ReviewService,
}

impl AppState {
    pub fn new(config: Config, service: ReviewService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, service }),
        }
    }

    /// 按配置构建审查服务
    pub fn from_config(config: Config) -> Result<Self, ReviewError> {
        let service = ReviewService::from_config(&config)?;
        Ok(Self::new(config, service))
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn service(&self) -> &ReviewService {
        &self.inner.service
    }
}
