use async_trait::async_trait;
use nsum_core::{ArticleMetadata, MetadataSource};
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::jsonld;
use super::utils::{clean_text, looks_like_url};
use crate::fetch::PageFetcher;

const SITE_NAME_META_KEYS: &[&str] = &["og:site_name", "al:ios:app_name", "al:android:app_name"];

const AUTHOR_META_KEYS: &[(&str, &str)] = &[
    ("name", "author"),
    ("property", "article:author"),
    ("property", "og:article:author"),
    ("property", "og:author"),
];

/// Where a site name came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteNameHit {
    MetaTag(String),
    Publisher(String),
    Organization(String),
    WebSite(String),
    Miss,
}

impl SiteNameHit {
    pub fn is_hit(&self) -> bool {
        !matches!(self, SiteNameHit::Miss)
    }

    pub fn or_else(self, next: impl FnOnce() -> Self) -> Self {
        if self.is_hit() {
            self
        } else {
            next()
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            SiteNameHit::MetaTag(v)
            | SiteNameHit::Publisher(v)
            | SiteNameHit::Organization(v)
            | SiteNameHit::WebSite(v) => Some(v),
            SiteNameHit::Miss => None,
        }
    }
}

/// Where an author came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorHit {
    MetaTag(String),
    ListEntry(String),
    Object(String),
    Name(String),
    Miss,
}

impl AuthorHit {
    pub fn is_hit(&self) -> bool {
        !matches!(self, AuthorHit::Miss)
    }

    pub fn or_else(self, next: impl FnOnce() -> Self) -> Self {
        if self.is_hit() {
            self
        } else {
            next()
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            AuthorHit::MetaTag(v) | AuthorHit::ListEntry(v) | AuthorHit::Object(v) | AuthorHit::Name(v) => {
                Some(v)
            }
            AuthorHit::Miss => None,
        }
    }
}

fn meta_contents(document: &Html, attr: &str, key: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(&format!("meta[{}=\"{}\"]", attr, key)) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .filter_map(clean_text)
        .collect()
}

pub fn site_name_from_meta(document: &Html) -> SiteNameHit {
    SITE_NAME_META_KEYS
        .iter()
        .find_map(|key| {
            meta_contents(document, "property", key)
                .into_iter()
                .chain(meta_contents(document, "name", key))
                .next()
        })
        .map(SiteNameHit::MetaTag)
        .unwrap_or(SiteNameHit::Miss)
}

pub fn site_name_from_json_ld(document: &Html) -> SiteNameHit {
    jsonld::extract_nodes(document)
        .iter()
        .map(jsonld::site_name)
        .find(SiteNameHit::is_hit)
        .unwrap_or(SiteNameHit::Miss)
}

pub fn author_from_meta(document: &Html) -> AuthorHit {
    AUTHOR_META_KEYS
        .iter()
        .find_map(|(attr, key)| {
            meta_contents(document, attr, key)
                .into_iter()
                .find(|value| !looks_like_url(value))
        })
        .map(AuthorHit::MetaTag)
        .unwrap_or(AuthorHit::Miss)
}

pub fn author_from_json_ld(document: &Html) -> AuthorHit {
    jsonld::extract_nodes(document)
        .iter()
        .map(jsonld::author)
        .find(AuthorHit::is_hit)
        .unwrap_or(AuthorHit::Miss)
}

pub fn find_site_name(document: &Html) -> SiteNameHit {
    site_name_from_meta(document).or_else(|| site_name_from_json_ld(document))
}

pub fn find_author(document: &Html) -> AuthorHit {
    author_from_meta(document).or_else(|| author_from_json_ld(document))
}

pub fn extract_metadata(html: &str) -> ArticleMetadata {
    let document = Html::parse_document(html);
    let site_name = find_site_name(&document);
    let author = find_author(&document);
    debug!(?site_name, ?author, "Metadata candidates");
    ArticleMetadata {
        site_name: site_name.into_value(),
        author: author.into_value(),
    }
}

/// Best-effort publisher metadata from the rendered page.
pub struct MetadataExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl MetadataExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl MetadataSource for MetadataExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract_metadata(&self, url: &str) -> ArticleMetadata {
        match self.fetcher.fetch(url).await {
            Ok(html) => extract_metadata(&html),
            Err(e) => {
                warn!(%url, error = %e, "Metadata unavailable; continuing without it");
                ArticleMetadata::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsum_core::{Error, Result};

    const FULL_PAGE: &str = r#"
        <html><head>
            <meta property="al:ios:app_name" content="Planet App">
            <meta property="og:site_name" content="The Daily Planet &amp;amp; Sons">
            <meta name="author" content="https://dailyplanet.example/staff/clark">
            <meta property="article:author" content="Clark Kent">
            <script type="application/ld+json">{"publisher": {"name": "JSON Publisher"}, "author": "JSON Author"}</script>
        </head><body></body></html>
    "#;

    #[test]
    fn test_meta_tags_win_over_json_ld() {
        let document = Html::parse_document(FULL_PAGE);
        assert_eq!(
            find_site_name(&document),
            SiteNameHit::MetaTag("The Daily Planet & Sons".to_string())
        );
        assert_eq!(find_author(&document), AuthorHit::MetaTag("Clark Kent".to_string()));
    }

    #[test]
    fn test_site_name_meta_key_order() {
        let document = Html::parse_document(
            r#"<html><head>
                <meta property="al:android:app_name" content="Android Name">
                <meta property="al:ios:app_name" content="iOS Name">
            </head></html>"#,
        );
        assert_eq!(site_name_from_meta(&document), SiteNameHit::MetaTag("iOS Name".to_string()));
    }

    #[test]
    fn test_site_name_meta_by_name_attribute() {
        let document = Html::parse_document(r#"<html><head><meta name="og:site_name" content="Named"></head></html>"#);
        assert_eq!(site_name_from_meta(&document), SiteNameHit::MetaTag("Named".to_string()));
    }

    #[test]
    fn test_falls_back_to_json_ld() {
        let document = Html::parse_document(
            r#"<html><head>
                <meta property="og:author" content="http://example.com/profile">
                <script type="application/ld+json">not json at all</script>
                <script type="application/ld+json">{"@type": "WebSite", "name": "Site From LD"}</script>
                <script type="application/ld+json">{"author": [{"name": "Lois Lane"}]}</script>
            </head></html>"#,
        );
        assert_eq!(find_site_name(&document), SiteNameHit::WebSite("Site From LD".to_string()));
        assert_eq!(find_author(&document), AuthorHit::ListEntry("Lois Lane".to_string()));
    }

    #[test]
    fn test_absent_metadata_is_none() {
        let metadata = extract_metadata("<html><head><title>x</title></head><body>Hello</body></html>");
        assert_eq!(metadata, ArticleMetadata::default());
    }

    #[test]
    fn test_empty_meta_content_is_a_miss() {
        let document = Html::parse_document(r#"<html><head><meta property="og:site_name" content="  "></head></html>"#);
        assert_eq!(site_name_from_meta(&document), SiteNameHit::Miss);
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Err(Error::Browser("renderer crashed".to_string()))
        }
    }

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_absent_fields() {
        let extractor = MetadataExtractor::new(Arc::new(FailingFetcher));
        let metadata = extractor.extract_metadata("https://example.com/a").await;
        assert_eq!(metadata.site_name, None);
        assert_eq!(metadata.author, None);
    }

    #[tokio::test]
    async fn test_extractor_reads_fetched_page() {
        let extractor = MetadataExtractor::new(Arc::new(StaticFetcher(FULL_PAGE)));
        let metadata = extractor.extract_metadata("https://example.com/a").await;
        assert_eq!(metadata.site_name.as_deref(), Some("The Daily Planet & Sons"));
        assert_eq!(metadata.author.as_deref(), Some("Clark Kent"));
    }
}
