use std::sync::Arc;

use tracing::info;

use crate::app::error::Result;
use crate::config::Config;
use crate::domain::{ContentRequest, ExtractedContent};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::resolver::LinkResolver;
use crate::speech::{self, EventSender, SpeechEngine};

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher>,
    pub resolver: LinkResolver,
    pub normalizer: Normalizer,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.http)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let resolver = LinkResolver::new(fetcher.clone(), &config.resolver);

        Self {
            config,
            fetcher,
            resolver,
            normalizer: Normalizer::new(),
        }
    }

    pub async fn resolve(&self, input: &str) -> Result<ContentRequest> {
        self.resolver.resolve(input).await
    }

    /// Resolve `input`, download the post and extract its content.
    pub async fn load(&self, input: &str) -> Result<ExtractedContent> {
        let request = self.resolve(input).await?;
        info!("Fetching {}", request.endpoint);

        let page = self.fetcher.fetch(&request.endpoint, &request.headers).await?;
        self.normalizer.normalize(&page.body)
    }

    pub fn speech_engine(&self, events: EventSender) -> Arc<dyn SpeechEngine> {
        speech::detect(&self.config.speech, events)
    }
}
