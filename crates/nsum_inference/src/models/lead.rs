use std::fmt;
use nsum_core::{Result, SummarizationModel};

/// Extractive stand-in: keeps leading sentences up to `max_length` words.
pub struct LeadModel;

impl fmt::Debug for LeadModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeadModel").finish()
    }
}

impl LeadModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LeadModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SummarizationModel for LeadModel {
    fn name(&self) -> &str {
        "Lead"
    }

    async fn summarize(&self, text: &str, max_length: usize, _min_length: usize) -> Result<String> {
        let mut kept: Vec<&str> = Vec::new();
        let mut words = 0;

        for sentence in text.split_inclusive(|c: char| c == '.' || c == '!' || c == '?') {
            let count = sentence.split_whitespace().count();
            if count == 0 {
                continue;
            }
            if words + count > max_length {
                break;
            }
            words += count;
            kept.push(sentence.trim());
        }

        if kept.is_empty() {
            // First sentence alone is too long: cut it at the word limit.
            return Ok(text.split_whitespace().take(max_length).collect::<Vec<_>>().join(" "));
        }
        Ok(kept.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lead_model() {
        let model = LeadModel::new();
        let text = "This is a test article. It has multiple sentences. This is the third sentence.";

        let summary = model.summarize(text, 9, 1).await.unwrap();
        assert_eq!(summary, "This is a test article. It has multiple sentences.");

        let summary = model.summarize(text, 100, 1).await.unwrap();
        assert_eq!(summary, text);
    }

    #[tokio::test]
    async fn test_lead_model_truncates_long_sentence() {
        let model = LeadModel::new();
        let summary = model.summarize("one two three four five six", 3, 1).await.unwrap();
        assert_eq!(summary, "one two three");
    }
}
