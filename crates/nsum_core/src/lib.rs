pub mod error;
pub mod models;
pub mod sources;
pub mod types;

pub use error::{Error, Result};
pub use models::{SentimentModel, SummarizationModel};
pub use sources::{ContentSource, MetadataSource, UrlResolver};
pub use types::{
    ArticleContent, ArticleMetadata, ArticleRecord, ArticleReference, ProcessedArticle, Sentiment,
};

pub mod prelude {
    pub use super::{Error, Result};
    pub use super::types::*;
}
