use async_trait::async_trait;
use nsum_core::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::browser::DESKTOP_USER_AGENT;
use crate::proxy::ProxyConfig;

/// Something that turns a URL into an HTML document.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP download, optionally through the outbound proxy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(proxy: Option<&ProxyConfig>, timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(DESKTOP_USER_AGENT);
        if let Some(proxy) = proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;
        debug!(%url, bytes = html.len(), "Downloaded page");
        Ok(html)
    }
}
