use std::time::Duration;

pub mod models;
pub mod sentiment;
pub mod summarizer;

pub use models::create_model;
pub use sentiment::SentimentAnalyzer;
pub use summarizer::Summarizer;

/// Which summarization backend to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Hugging Face style inference endpoint
    #[value(name = "huggingface")]
    HuggingFace,
    /// Offline leading-sentences summary
    Lead,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub model_name: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    /// Caps simultaneous requests to the backend; `Some(1)` serialises it
    pub max_concurrency: Option<usize>,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::HuggingFace,
            model_name: "facebook/bart-large-cnn".to_string(),
            api_key: None,
            endpoint: None,
            max_concurrency: None,
            timeout: Duration::from_secs(120),
        }
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{Backend, Config, SentimentAnalyzer, Summarizer};
    pub use nsum_core::{Error, Result, Sentiment};
}
