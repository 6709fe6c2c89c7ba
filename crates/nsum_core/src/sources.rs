use async_trait::async_trait;
use crate::types::{ArticleContent, ArticleMetadata, ArticleReference};
use crate::Result;

#[async_trait]
pub trait UrlResolver: Send + Sync {
    /// Finds an article for the topic and returns its canonical URL
    async fn resolve(&self, topic: &str) -> Result<ArticleReference>;
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Reads publisher metadata. Never fails: missing data is `None`.
    async fn extract_metadata(&self, url: &str) -> ArticleMetadata;
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Downloads and extracts the title and body of an article
    async fn extract_content(&self, url: &str) -> Result<ArticleContent>;
}
