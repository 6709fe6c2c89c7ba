use nsum_core::{ProcessedArticle, Result};
use nsum_inference::{SentimentAnalyzer, Summarizer};
use nsum_scrapers::ArticlePipeline;
use tracing::{info, instrument};

/// Topic in, summarized article out. Every stage runs in sequence and any
/// stage failure fails the whole request.
pub struct NewsService {
    pipeline: ArticlePipeline,
    summarizer: Summarizer,
    sentiment: SentimentAnalyzer,
}

impl NewsService {
    pub fn new(pipeline: ArticlePipeline, summarizer: Summarizer, sentiment: SentimentAnalyzer) -> Self {
        Self {
            pipeline,
            summarizer,
            sentiment,
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn process(&self, topic: &str) -> Result<ProcessedArticle> {
        let record = self.pipeline.build_article(topic).await?;

        let summary = self.summarizer.summarize(&record.body).await?;
        info!(
            model = self.summarizer.model_name(),
            body_words = record.body.split_whitespace().count(),
            summary_words = summary.split_whitespace().count(),
            "📝 Summary generated"
        );

        let sentiment = self.sentiment.analyze(&record.body);
        info!(%sentiment, url = %record.url, "✨ Article processed");

        Ok(ProcessedArticle::new(record, summary, sentiment))
    }
}
