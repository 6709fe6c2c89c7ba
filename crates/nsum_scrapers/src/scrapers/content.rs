use async_trait::async_trait;
use dom_smoothie::Readability;
use nsum_core::{ArticleContent, ContentSource, Error, Result};
use scraper::Html;
use std::sync::Arc;
use tracing::{info, instrument};

use super::utils::{extract_text, normalize_text};
use crate::fetch::PageFetcher;
use crate::retry::RetryPolicy;

/// Runs readability over a downloaded page.
///
/// The title falls back to the first `<h1>`, then `<title>`, when
/// readability cannot find one. A page without body text is an error.
pub fn extract_readable(html: &str, url: &str) -> Result<ArticleContent> {
    let mut readability = Readability::new(html, Some(url), None)
        .map_err(|e| Error::Extraction(format!("Failed to parse {}: {}", url, e)))?;
    let article = readability
        .parse()
        .map_err(|e| Error::Extraction(format!("Readability failed on {}: {}", url, e)))?;

    let body = normalize_text(&article.text_content.to_string());
    let mut title = article.title.to_string().trim().to_string();
    if title.is_empty() {
        let document = Html::parse_document(html);
        title = extract_text(&document, "h1")
            .or_else(|| extract_text(&document, "title"))
            .unwrap_or_default();
    }

    ArticleContent::new(title, body)
        .ok_or_else(|| Error::Extraction(format!("No article text found at {}", url)))
}

/// Downloads and extracts article text, retrying on failure.
pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
}

impl ContentExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, retry: RetryPolicy) -> Self {
        Self { fetcher, retry }
    }

    async fn attempt(&self, url: &str) -> Result<ArticleContent> {
        let html = self.fetcher.fetch(url).await?;
        extract_readable(&html, url)
    }
}

#[async_trait]
impl ContentSource for ContentExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract_content(&self, url: &str) -> Result<ArticleContent> {
        let content = self
            .retry
            .run("extract_content", |_attempt| self.attempt(url))
            .await
            .map_err(|e| {
                Error::Extraction(format!(
                    "Failed to scrape article content after {} attempts: {}",
                    self.retry.max_attempts, e
                ))
            })?;
        info!(%url, title = %content.title, chars = content.body.len(), "Extracted article content");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ARTICLE: &str = r#"<!DOCTYPE html>
        <html><head><title>Rivers Rise | Daily Planet</title></head>
        <body>
          <nav><a href="/">Home</a> <a href="/world">World</a></nav>
          <article>
            <h1>Rivers rise across the valley</h1>
            <p>Heavy rainfall over the weekend pushed rivers across the valley to their highest levels in a decade, officials said on Monday, as emergency crews worked through the night to reinforce levees.</p>
            <p>Residents in low-lying neighbourhoods were told to move valuables to upper floors and to prepare for possible evacuation orders if the water continued to climb through Tuesday morning.</p>
            <p>The regional water authority said pumping stations were operating at full capacity and that additional portable pumps had been requested from neighbouring districts to protect the main water treatment plant.</p>
            <p>Local schools announced closures for the rest of the week, and several bridges were shut to traffic after inspectors found debris piling up against their supports during the overnight surge.</p>
            <p>Forecasters expect the rain to ease by midweek, but warned that runoff from the surrounding hills could keep water levels elevated for several more days before they begin to fall.</p>
          </article>
          <footer>Copyright Daily Planet</footer>
        </body></html>"#;

    struct CountingFetcher {
        calls: AtomicUsize,
        fail_first: usize,
        html: &'static str,
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.fail_first {
                return Err(Error::Extraction(format!("connection reset on call {}", call)));
            }
            Ok(self.html.to_string())
        }
    }

    fn fetcher(fail_first: usize, html: &'static str) -> Arc<CountingFetcher> {
        Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            fail_first,
            html,
        })
    }

    #[test]
    fn test_extract_readable_finds_body() {
        let content = extract_readable(ARTICLE, "https://dailyplanet.example/rivers").unwrap();
        assert!(content.body.contains("Heavy rainfall over the weekend"));
        assert!(content.body.contains("Forecasters expect the rain"));
        assert!(!content.title.is_empty());
    }

    #[test]
    fn test_extract_readable_rejects_empty_page() {
        let result = extract_readable("<html><body></body></html>", "https://example.com/empty");
        assert!(matches!(result, Err(Error::Extraction(_))));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let fetcher = fetcher(2, ARTICLE);
        let extractor = ContentExtractor::new(fetcher.clone(), RetryPolicy::immediate(3));

        let content = extractor.extract_content("https://dailyplanet.example/rivers").await.unwrap();
        assert!(!content.body.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_one_extraction_error() {
        let fetcher = fetcher(usize::MAX, ARTICLE);
        let extractor = ContentExtractor::new(fetcher.clone(), RetryPolicy::immediate(3));

        let err = extractor.extract_content("https://dailyplanet.example/rivers").await.unwrap_err();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        match err {
            Error::Extraction(msg) => {
                assert!(msg.contains("after 3 attempts"));
                assert!(msg.contains("connection reset on call 3"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_counts_as_failed_attempt() {
        let fetcher = fetcher(0, "<html><body><div></div></body></html>");
        let extractor = ContentExtractor::new(fetcher.clone(), RetryPolicy::immediate(3));

        let result = extractor.extract_content("https://example.com/empty").await;
        assert!(matches!(result, Err(Error::Extraction(_))));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }
}
