pub mod content;
pub mod jsonld;
pub mod metadata;
pub mod resolver;

pub use content::ContentExtractor;
pub use metadata::{extract_metadata, AuthorHit, MetadataExtractor, SiteNameHit};
pub use resolver::{GoogleNewsResolver, ResolverOptions};

/// Common utilities for scrapers
pub(crate) mod utils {
    use nsum_core::{Error, Result};
    use scraper::{Html, Selector};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Text of the first element matching `selector`, if non-blank
    pub fn extract_text(document: &Html, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .and_then(|text| clean_text(&text))
    }

    /// Unescapes HTML entities, collapses whitespace, rejects blanks.
    pub fn clean_text(raw: &str) -> Option<String> {
        let decoded = html_escape::decode_html_entities(raw);
        let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(collapsed)
        }
    }

    pub fn looks_like_url(value: &str) -> bool {
        let lower = value.trim().to_ascii_lowercase();
        lower.starts_with("http") || lower.starts_with("//") || lower.starts_with("www.")
    }

    /// Reflows extracted text into paragraphs separated by a blank line.
    pub fn normalize_text(content: &str) -> String {
        content
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
