use serde::{Deserialize, Serialize};
use std::fmt;

/// A topic query paired with the publisher URL it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleReference {
    pub topic: String,
    pub canonical_url: String,
}

/// Publisher metadata. Both fields are best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub site_name: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub title: String,
    pub body: String,
}

impl ArticleContent {
    /// Builds content, refusing an empty body.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Option<Self> {
        let body = body.into();
        if body.trim().is_empty() {
            return None;
        }
        Some(Self {
            title: title.into(),
            body,
        })
    }
}

/// Everything the pipeline knows about one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub topic: String,
    pub url: String,
    pub title: String,
    pub body: String,
    pub site_name: Option<String>,
    pub author: Option<String>,
}

impl ArticleRecord {
    pub fn assemble(
        reference: ArticleReference,
        metadata: ArticleMetadata,
        content: ArticleContent,
    ) -> Self {
        Self {
            topic: reference.topic,
            url: reference.canonical_url,
            title: content.title,
            body: content.body,
            site_name: metadata.site_name,
            author: metadata.author,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const POSITIVE_THRESHOLD: f64 = 0.05;
    pub const NEGATIVE_THRESHOLD: f64 = -0.05;

    /// Classifies an aggregate compound score.
    pub fn from_compound(score: f64) -> Self {
        if score >= Self::POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if score <= Self::NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

/// The body returned by `POST /process-news`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedArticle {
    pub original_url: String,
    pub title: String,
    pub summary: String,
    pub sentiment: Sentiment,
    pub site_name: Option<String>,
    pub author: Option<String>,
    pub topic: String,
}

impl ProcessedArticle {
    pub fn new(record: ArticleRecord, summary: String, sentiment: Sentiment) -> Self {
        Self {
            original_url: record.url,
            title: record.title,
            summary,
            sentiment,
            site_name: record.site_name,
            author: record.author,
            topic: record.topic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_rejects_blank_body() {
        assert!(ArticleContent::new("Title", "").is_none());
        assert!(ArticleContent::new("Title", "  \n\t ").is_none());
        assert!(ArticleContent::new("Title", "Body.").is_some());
    }

    #[test]
    fn test_sentiment_thresholds() {
        assert_eq!(Sentiment::from_compound(0.05), Sentiment::Positive);
        assert_eq!(Sentiment::from_compound(0.8), Sentiment::Positive);
        assert_eq!(Sentiment::from_compound(-0.05), Sentiment::Negative);
        assert_eq!(Sentiment::from_compound(0.049), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(-0.049), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(0.0), Sentiment::Neutral);
    }

    #[test]
    fn test_processed_article_serializes_nulls() {
        let record = ArticleRecord::assemble(
            ArticleReference {
                topic: "climate change".to_string(),
                canonical_url: "https://example.com/a".to_string(),
            },
            ArticleMetadata::default(),
            ArticleContent::new("Title", "Body text.").unwrap(),
        );
        let processed = ProcessedArticle::new(record, "Summary".to_string(), Sentiment::Neutral);
        let json = serde_json::to_value(&processed).unwrap();

        assert_eq!(json["original_url"], "https://example.com/a");
        assert_eq!(json["sentiment"], "Neutral");
        assert!(json["site_name"].is_null());
        assert!(json["author"].is_null());
        assert_eq!(json["topic"], "climate change");
    }
}
