pub mod browser;
pub mod fetch;
pub mod pipeline;
pub mod proxy;
pub mod retry;
pub mod scrapers;

pub use browser::{with_session, BrowserOptions, BrowserSession, RenderedFetcher};
pub use fetch::{HttpFetcher, PageFetcher};
pub use pipeline::{ArticlePipeline, ScraperConfig};
pub use proxy::ProxyConfig;
pub use retry::RetryPolicy;
pub use scrapers::{ContentExtractor, GoogleNewsResolver, MetadataExtractor, ResolverOptions};

pub mod prelude {
    pub use super::pipeline::ArticlePipeline;
    pub use nsum_core::{ArticleRecord, Error, Result};
}
