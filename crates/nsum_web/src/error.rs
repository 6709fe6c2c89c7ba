use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Topic is required")]
    MissingTopic,

    #[error("Failed to process news article")]
    Processing(#[from] nsum_core::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingTopic => {
                warn!("Rejected request without a topic");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "Topic is required" }))).into_response()
            }
            ApiError::Processing(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to process news article",
                    "details": e.to_string(),
                })),
            )
                .into_response(),
        }
    }
}
