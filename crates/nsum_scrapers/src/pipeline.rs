use nsum_core::{ArticleRecord, ContentSource, MetadataSource, Result, UrlResolver};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::browser::{BrowserOptions, RenderedFetcher};
use crate::fetch::HttpFetcher;
use crate::proxy::ProxyConfig;
use crate::retry::RetryPolicy;
use crate::scrapers::{ContentExtractor, GoogleNewsResolver, MetadataExtractor, ResolverOptions};

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub browser: BrowserOptions,
    pub resolver: ResolverOptions,
    pub proxy: Option<ProxyConfig>,
    pub metadata_timeout: Duration,
    pub download_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            browser: BrowserOptions::default(),
            resolver: ResolverOptions::default(),
            proxy: None,
            metadata_timeout: Duration::from_secs(60),
            download_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Resolve, then read metadata, then read content.
pub struct ArticlePipeline {
    resolver: Arc<dyn UrlResolver>,
    metadata: Arc<dyn MetadataSource>,
    content: Arc<dyn ContentSource>,
}

impl ArticlePipeline {
    pub fn new(
        resolver: Arc<dyn UrlResolver>,
        metadata: Arc<dyn MetadataSource>,
        content: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            resolver,
            metadata,
            content,
        }
    }

    /// Wires the production collaborators. Resolution and downloads use
    /// the proxy; metadata rendering connects directly.
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        let resolver_browser = BrowserOptions {
            proxy: config.proxy.clone(),
            ..config.browser.clone()
        };
        let metadata_browser = BrowserOptions {
            proxy: None,
            ..config.browser.clone()
        };

        let resolver = GoogleNewsResolver::new(resolver_browser, config.resolver.clone());
        let renderer = RenderedFetcher::new(metadata_browser, config.metadata_timeout);
        let downloader = HttpFetcher::new(config.proxy.as_ref(), config.download_timeout)?;

        Ok(Self::new(
            Arc::new(resolver),
            Arc::new(MetadataExtractor::new(Arc::new(renderer))),
            Arc::new(ContentExtractor::new(Arc::new(downloader), config.retry.clone())),
        ))
    }

    #[instrument(level = "info", skip(self))]
    pub async fn build_article(&self, topic: &str) -> Result<ArticleRecord> {
        let reference = self.resolver.resolve(topic).await?;
        let metadata = self.metadata.extract_metadata(&reference.canonical_url).await;
        let content = self.content.extract_content(&reference.canonical_url).await?;

        info!(
            url = %reference.canonical_url,
            site_name = ?metadata.site_name,
            author = ?metadata.author,
            "Assembled article"
        );
        Ok(ArticleRecord::assemble(reference, metadata, content))
    }
}
