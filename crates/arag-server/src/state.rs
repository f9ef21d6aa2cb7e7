//! Shared application state

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use arag_core::Result;
use arag_workflow::{AgenticRag, Settings};

use crate::config::ServerSettings;
use crate::metrics::Metrics;
use crate::rate_limit::RateLimiter;

/// Builds a ready system; called at startup and on every refresh
#[async_trait]
pub trait RagFactory: Send + Sync {
    async fn build(&self) -> Result<AgenticRag>;
}

/// Factory backed by Azure OpenAI and the configured knowledge-base URLs
pub struct SettingsFactory {
    settings: Settings,
}

impl SettingsFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl RagFactory for SettingsFactory {
    async fn build(&self) -> Result<AgenticRag> {
        AgenticRag::from_settings(&self.settings).await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ServerSettings>,
    pub metrics: Arc<Metrics>,
    pub limiter: Option<Arc<RateLimiter>>,
    rag: Arc<RwLock<Option<Arc<AgenticRag>>>>,
    factory: Arc<dyn RagFactory>,
}

impl AppState {
    pub fn new(settings: ServerSettings, factory: Arc<dyn RagFactory>) -> Self {
        let limiter = settings
            .rate_limit_enabled
            .then(|| Arc::new(RateLimiter::new(settings.rate_limit.clone())));

        Self {
            settings: Arc::new(settings),
            metrics: Arc::new(Metrics::default()),
            limiter,
            rag: Arc::new(RwLock::new(None)),
            factory,
        }
    }

    /// The current system, if one has been built
    pub async fn rag(&self) -> Option<Arc<AgenticRag>> {
        self.rag.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        self.rag.read().await.is_some()
    }

    pub async fn install(&self, rag: AgenticRag) {
        *self.rag.write().await = Some(Arc::new(rag));
    }

    /// Build the system and install it, returning how long the build took
    pub async fn initialize(&self) -> Result<Duration> {
        let started = Instant::now();
        let rag = self.factory.build().await?;
        self.install(rag).await;
        Ok(started.elapsed())
    }
}
