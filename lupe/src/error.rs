use thiserror::Error;

#[derive(Error, Debug)]
pub enum LupeError {
    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Analyzer error: {0}")]
    Analyzer(String),

    #[error("Analyzer unavailable: {0}")]
    AnalyzerUnavailable(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LupeError>;
