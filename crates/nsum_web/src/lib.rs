use axum::{http::HeaderValue, routing::post, Router};
use nsum_core::{Error, Result};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod service;
pub mod state;

pub use error::ApiError;
pub use service::NewsService;
pub use state::AppState;

pub fn create_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/process-news", post(handlers::process_news))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive when no origin is configured, otherwise locked to that origin.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    match origin {
        None => Ok(CorsLayer::permissive()),
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .map_err(|e| Error::Config(format!("Invalid CORS origin {:?}: {}", origin, e)))?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any))
        }
    }
}

pub mod prelude {
    pub use crate::{create_app, cors_layer, AppState, NewsService};
    pub use nsum_core::{Error, ProcessedArticle, Result};
}
