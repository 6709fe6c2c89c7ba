use async_trait::async_trait;
use nsum_core::{Error, Result, SummarizationModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::Config;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models/";

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
    options: Options,
}

#[derive(Serialize)]
struct Parameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SummarizationResponse {
    Summaries(Vec<Summary>),
    Failure { error: String },
}

#[derive(Deserialize)]
struct Summary {
    summary_text: String,
}

/// Text-to-text summarization over a Hugging Face inference endpoint.
pub struct HuggingFaceModel {
    client: Client,
    api_key: Option<String>,
    url: String,
}

impl HuggingFaceModel {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build inference client: {}", e)))?;
        let url = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("{}{}", DEFAULT_ENDPOINT, config.model_name),
        };
        url::Url::parse(&url)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for HuggingFaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("url", &self.url)
            .finish()
    }
}

pub(crate) fn parse_response(body: &str) -> Result<String> {
    match serde_json::from_str::<SummarizationResponse>(body)? {
        SummarizationResponse::Summaries(summaries) => summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text.trim().to_string())
            .ok_or_else(|| Error::Inference("Model returned no summary".to_string())),
        SummarizationResponse::Failure { error } => Err(Error::Inference(error)),
    }
}

#[async_trait]
impl SummarizationModel for HuggingFaceModel {
    fn name(&self) -> &str {
        "HuggingFace"
    }

    async fn summarize(&self, text: &str, max_length: usize, min_length: usize) -> Result<String> {
        let request = SummarizationRequest {
            inputs: text,
            parameters: Parameters {
                max_length,
                min_length,
                do_sample: false,
            },
            options: Options {
                wait_for_model: true,
            },
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Inference response");

        if !status.is_success() {
            let detail = parse_response(&body).err().map(|e| e.to_string()).unwrap_or(body);
            return Err(Error::Inference(format!("{} returned {}: {}", self.url, status, detail)));
        }
        parse_response(&body)
    }
}
