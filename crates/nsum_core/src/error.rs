use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}

impl Error {
    /// Terminal pipeline errors abort the request; everything else is
    /// either recovered locally or mapped into one of these before it
    /// leaves a pipeline stage.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::Resolution(_) | Error::Extraction(_) | Error::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
