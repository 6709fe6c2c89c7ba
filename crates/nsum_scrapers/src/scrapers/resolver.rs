use async_trait::async_trait;
use chromiumoxide::Page;
use nsum_core::{ArticleReference, Error, Result, UrlResolver};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};
use url::Url;

use super::utils::parse_url;
use crate::browser::{self, with_session, BrowserOptions};
use crate::retry::random_between;

pub const SEARCH_BASE: &str = "https://news.google.com/";
const SEARCH_HOST: &str = "news.google.com";

const RESULT_SELECTOR: &str = "article";
const RESULT_LINK_SELECTOR: &str = "a";
const CANONICAL_SELECTOR: &str = "link[rel=\"canonical\"]";

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub search_timeout: Duration,
    pub result_timeout: Duration,
    pub article_timeout: Duration,
    /// Pause before the first navigation
    pub warmup_delay: (Duration, Duration),
    /// Pause after the search page loads
    pub settle_delay: (Duration, Duration),
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            search_timeout: Duration::from_secs(60),
            result_timeout: Duration::from_secs(50),
            article_timeout: Duration::from_secs(50),
            warmup_delay: (Duration::from_secs(1), Duration::from_secs(3)),
            settle_delay: (Duration::from_secs(2), Duration::from_secs(4)),
        }
    }
}

pub fn search_url(topic: &str) -> Result<Url> {
    let base = parse_url(SEARCH_BASE)?;
    let mut url = base.join("search")?;
    url.query_pairs_mut()
        .append_pair("q", topic)
        .append_pair("hl", "en-US");
    Ok(url)
}

/// Resolves a result link (usually `./read/...`) against the aggregator.
pub fn result_url(href: &str) -> Result<Url> {
    Ok(parse_url(SEARCH_BASE)?.join(href)?)
}

/// Prefers the page's declared canonical URL over where the browser landed.
pub fn choose_canonical(canonical: Option<&str>, page_url: &str) -> Result<String> {
    let landed = parse_url(page_url)?;
    match canonical.map(str::trim).filter(|c| !c.is_empty()) {
        Some(href) => Ok(landed.join(href)?.to_string()),
        None => Ok(landed.to_string()),
    }
}

/// True once `url` is an http(s) page outside the aggregator.
pub fn has_left_aggregator(url: &str) -> bool {
    match Url::parse(url) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.eq_ignore_ascii_case(SEARCH_HOST))
        }
        Err(_) => false,
    }
}

/// The canonical candidate for the current page, or `None` while the page
/// is still the aggregator's redirect interstitial.
pub fn landing_choice(canonical: Option<&str>, page_url: &str) -> Option<String> {
    let candidate = choose_canonical(canonical, page_url).ok()?;
    has_left_aggregator(&candidate).then_some(candidate)
}

async fn current_landing(page: &Page, fallback: &str) -> Option<String> {
    let canonical = match page.find_element(CANONICAL_SELECTOR).await {
        Ok(element) => browser::attribute(&element, "href").await,
        Err(_) => None,
    };
    let landed = page
        .url()
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| fallback.to_string());
    landing_choice(canonical.as_deref(), &landed)
}

/// Finds the first Google News result for a topic and follows it to the
/// publisher's canonical URL. Single-shot: any failure is terminal.
#[derive(Debug, Clone)]
pub struct GoogleNewsResolver {
    browser: BrowserOptions,
    options: ResolverOptions,
}

impl GoogleNewsResolver {
    pub fn new(browser: BrowserOptions, options: ResolverOptions) -> Self {
        Self { browser, options }
    }

    async fn resolve_on_page(&self, page: Page, topic: &str) -> Result<String> {
        let search = search_url(topic)?;

        sleep(random_between(self.options.warmup_delay.0, self.options.warmup_delay.1)).await;
        browser::goto(&page, search.as_str(), self.options.search_timeout).await?;
        sleep(random_between(self.options.settle_delay.0, self.options.settle_delay.1)).await;

        let first = browser::wait_for_visible(&page, RESULT_SELECTOR, self.options.result_timeout).await?;
        let link = first
            .find_element(RESULT_LINK_SELECTOR)
            .await
            .map_err(|_| Error::Resolution("No article link found".to_string()))?;
        let href = browser::attribute(&link, "href")
            .await
            .ok_or_else(|| Error::Resolution("No article link found".to_string()))?;

        let target = result_url(&href)?;
        debug!(%target, "Following first search result");
        browser::goto(&page, target.as_str(), self.options.article_timeout).await?;

        // The result page forwards to the publisher by script after load.
        let fallback = target.to_string();
        browser::poll_until(self.options.article_timeout, "publisher page did not load", || {
            current_landing(&page, &fallback)
        })
        .await
    }
}

fn into_resolution(e: Error) -> Error {
    match e {
        Error::Resolution(_) => e,
        Error::Timeout(msg) => Error::Resolution(format!("Failed to load page - timeout ({})", msg)),
        other => Error::Resolution(other.to_string()),
    }
}

#[async_trait]
impl UrlResolver for GoogleNewsResolver {
    #[instrument(level = "info", skip(self))]
    async fn resolve(&self, topic: &str) -> Result<ArticleReference> {
        let result = with_session(&self.browser, |page| self.resolve_on_page(page, topic)).await;
        match result {
            Ok(canonical_url) => {
                info!(%topic, %canonical_url, "Resolved article URL");
                Ok(ArticleReference {
                    topic: topic.to_string(),
                    canonical_url,
                })
            }
            Err(e) => {
                error!(%topic, error = %e, "Failed to resolve article URL");
                Err(into_resolution(e))
            }
        }
    }
}
