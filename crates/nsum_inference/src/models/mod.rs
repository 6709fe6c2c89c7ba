use async_trait::async_trait;
use nsum_core::{Error, Result, SummarizationModel};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

use crate::{Backend, Config};

pub mod huggingface;
pub mod lead;
pub mod vader;

pub use huggingface::HuggingFaceModel;
pub use lead::LeadModel;
pub use vader::VaderModel;

/// Builds the configured summarization backend. Called once at startup;
/// the returned handle is shared by every request.
pub fn create_model(config: &Config) -> Result<Arc<dyn SummarizationModel>> {
    let model: Arc<dyn SummarizationModel> = match config.backend {
        Backend::HuggingFace => Arc::new(HuggingFaceModel::new(config)?),
        Backend::Lead => Arc::new(LeadModel::new()),
    };

    let model = match config.max_concurrency {
        Some(0) => {
            return Err(Error::Config("inference concurrency must be at least 1".to_string()));
        }
        Some(permits) => Arc::new(Throttled::new(model, permits)) as Arc<dyn SummarizationModel>,
        None => model,
    };

    info!(model = model.name(), "Summarization model ready");
    Ok(model)
}

/// Limits how many summaries a backend computes at once.
pub struct Throttled {
    inner: Arc<dyn SummarizationModel>,
    permits: Semaphore,
    limit: usize,
}

impl Throttled {
    pub fn new(inner: Arc<dyn SummarizationModel>, limit: usize) -> Self {
        Self {
            inner,
            permits: Semaphore::new(limit),
            limit,
        }
    }
}

impl fmt::Debug for Throttled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("inner", &self.inner)
            .field("limit", &self.limit)
            .finish()
    }
}

#[async_trait]
impl SummarizationModel for Throttled {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn summarize(&self, text: &str, max_length: usize, min_length: usize) -> Result<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| Error::Inference(format!("model unavailable: {}", e)))?;
        self.inner.summarize(text, max_length, min_length).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct SlowModel {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl SummarizationModel for SlowModel {
        fn name(&self) -> &str {
            "Slow"
        }

        async fn summarize(&self, text: &str, _max_length: usize, _min_length: usize) -> Result<String> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(text.to_string())
        }
    }

    #[tokio::test]
    async fn test_throttled_serialises_when_limit_is_one() {
        let inner = Arc::new(SlowModel::default());
        let model = Arc::new(Throttled::new(inner.clone(), 1));

        let mut handles = Vec::new();
        for i in 0..4 {
            let model = model.clone();
            handles.push(tokio::spawn(async move {
                model.summarize(&format!("text {}", i), 130, 30).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(inner.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_create_model_variants() {
        let lead = create_model(&Config {
            backend: Backend::Lead,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(lead.name(), "Lead");

        let hf = create_model(&Config::default()).unwrap();
        assert_eq!(hf.name(), "HuggingFace");

        let throttled = create_model(&Config {
            backend: Backend::Lead,
            max_concurrency: Some(1),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(throttled.name(), "Lead");
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let result = create_model(&Config {
            backend: Backend::Lead,
            max_concurrency: Some(0),
            ..Config::default()
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
