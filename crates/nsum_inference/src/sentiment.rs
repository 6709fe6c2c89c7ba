use nsum_core::{Sentiment, SentimentModel};
use std::sync::Arc;
use tracing::debug;

/// Length-weighted sentence sentiment over a whole article body.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    model: Arc<dyn SentimentModel>,
}

impl SentimentAnalyzer {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Average compound score of the '.'-separated sentences, each weighted
    /// by its character count. `None` when no sentence could be scored.
    pub fn weighted_score(&self, text: &str) -> Option<f64> {
        let mut weighted = 0.0;
        let mut total_weight = 0usize;

        for sentence in text.split('.').map(str::trim).filter(|s| !s.is_empty()) {
            let score = self.model.compound(sentence);
            if !score.is_finite() {
                debug!(sentence, "Skipping sentence with non-finite score");
                continue;
            }
            let weight = sentence.chars().count();
            weighted += score.clamp(-1.0, 1.0) * weight as f64;
            total_weight += weight;
        }

        (total_weight > 0).then(|| weighted / total_weight as f64)
    }

    pub fn analyze(&self, text: &str) -> Sentiment {
        match self.weighted_score(text) {
            Some(score) => {
                debug!(score, "Weighted sentiment score");
                Sentiment::from_compound(score)
            }
            None => Sentiment::Neutral,
        }
    }
}
