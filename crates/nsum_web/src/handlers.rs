use axum::{body::Bytes, extract::State, Json};
use nsum_core::ProcessedArticle;
use serde_json::Value;
use tracing::{error, info};

use crate::error::ApiError;
use crate::AppState;

/// Pulls a non-blank `topic` string out of a JSON body, exactly as sent.
/// Anything else, including a body that is not JSON at all, counts as a
/// missing topic.
pub fn topic_from_body(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let topic = value.get("topic")?.as_str()?;
    (!topic.trim().is_empty()).then(|| topic.to_string())
}

pub async fn process_news(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProcessedArticle>, ApiError> {
    let topic = topic_from_body(&body).ok_or(ApiError::MissingTopic)?;
    info!(topic = %topic, "Processing news for topic");

    let article = state.service.process(&topic).await.map_err(|e| {
        error!(topic = %topic, error = %e, "Error processing news");
        ApiError::from(e)
    })?;
    Ok(Json(article))
}
