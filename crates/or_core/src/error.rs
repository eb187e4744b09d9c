use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to fetch {url} (last status: {}): {message}", last_status.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string()))]
    Fetch {
        url: String,
        last_status: Option<u16>,
        message: String,
    },

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Keyword extraction failed: {0}")]
    KeywordExtraction(String),

    #[error("Outline parse error: {0}")]
    OutlineParse(String),

    #[error("Batch analysis failed: {0}")]
    BatchAnalysis(Box<Error>),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Outline edit error: {0}")]
    Outline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn fetch(url: impl Into<String>, last_status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Fetch {
            url: url.into(),
            last_status,
            message: message.into(),
        }
    }

    /// Stable machine-readable name, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Fetch { .. } => "fetch",
            Error::InvalidSource(_) => "invalid_source",
            Error::KeywordExtraction(_) => "keyword_extraction",
            Error::OutlineParse(_) => "outline_parse",
            Error::BatchAnalysis(_) => "batch_analysis",
            Error::Inference(_) => "inference",
            Error::Storage(_) => "storage",
            Error::Outline(_) => "outline",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Http(_) => "http",
            Error::External(_) => "external",
        }
    }

    /// Innermost error of a `BatchAnalysis` chain.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::BatchAnalysis(inner) => inner.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
