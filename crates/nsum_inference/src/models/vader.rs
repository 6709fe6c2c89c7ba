use std::fmt;
use nsum_core::SentimentModel;
use vader_sentiment::SentimentIntensityAnalyzer;

/// VADER lexicon scores.
pub struct VaderModel {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderModel {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VaderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaderModel").finish()
    }
}

impl SentimentModel for VaderModel {
    fn name(&self) -> &str {
        "VADER"
    }

    fn compound(&self, sentence: &str) -> f64 {
        self.analyzer
            .polarity_scores(sentence)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_direction() {
        let model = VaderModel::new();
        assert!(model.compound("This is a wonderful, happy day") > 0.05);
        assert!(model.compound("This is a terrible, horrible disaster") < -0.05);
        let neutral = model.compound("The meeting is on Tuesday");
        assert!(neutral > -0.05 && neutral < 0.05);
    }
}
