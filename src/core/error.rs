use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("text detection failed for s3://{bucket}/{key}: {source}")]
    Provider {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not encode model request: {0}")]
    Request(#[from] serde_json::Error),
    #[error("model invocation failed: {0}")]
    Provider(#[source] BoxError),
    #[error("unexpected model response: {0}")]
    Envelope(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to reach transaction endpoint: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to send payment info: {status} {reason}. Response: {body}")]
    Rejected {
        status: u16,
        reason: String,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("notification contains no records")]
    EmptyEvent,
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("model reply for s3://{bucket}/{key} was not a payment record")]
    UnparseableReply { bucket: String, key: String },
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("{failed} of {total} records failed; first error: {first}")]
    RecordsFailed {
        failed: usize,
        total: usize,
        first: String,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
