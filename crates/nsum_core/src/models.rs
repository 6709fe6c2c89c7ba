use async_trait::async_trait;
use std::fmt;
use crate::Result;

#[async_trait]
pub trait SummarizationModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Abstractive summary of `text`, bounded in words by the two lengths
    async fn summarize(&self, text: &str, max_length: usize, min_length: usize) -> Result<String>;
}

pub trait SentimentModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Compound polarity of one sentence, in [-1, 1]
    fn compound(&self, sentence: &str) -> f64;
}
