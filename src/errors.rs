use thiserror::Error;

/// A fetch that did not produce a body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },
    #[error("failed to fetch {url}: {message}")]
    Transport { url: String, message: String },
    #[error("fetch of {url} was cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Cancelled { url } => url,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query is empty")]
    Empty,
    #[error("query is {len} characters, at most {max} allowed")]
    TooLong { max: usize, len: usize },
}

/// Failure of one site's pipeline. Never escapes the aggregator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("concurrency limiter closed")]
    LimiterClosed(#[from] tokio::sync::AcquireError),
}

#[derive(Debug, Error)]
#[error("unknown source {0:?}")]
pub struct UnknownSource(pub String);

/// Errors the retry wrapper can classify.
pub trait Retryable {
    fn is_cancelled(&self) -> bool;

    /// The error reported when cancellation interrupts a backoff sleep.
    fn cancelled() -> Self;
}

impl Retryable for FetchError {
    fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled { .. })
    }

    fn cancelled() -> Self {
        FetchError::Cancelled { url: String::new() }
    }
}
