use std::path::PathBuf;

use thiserror::Error;

/// Rejection of caller-supplied feature input. Raised before any model call.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("field '{field}' has non-numeric value {value:?}")]
    NotNumeric { field: String, value: String },

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("unexpected field '{0}'")]
    UnexpectedField(String),

    #[error("field '{0}' was supplied more than once")]
    DuplicateField(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Request-scoped failures of the prediction pipeline.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("model is not available")]
    ModelUnavailable,

    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("internal failure: {0}")]
    Internal(String),
}

impl PredictError {
    /// Text safe to show to the caller. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            PredictError::InvalidInput(e) => format!("Invalid input: {e}"),
            PredictError::ModelUnavailable => "Model is not available".to_string(),
            PredictError::Inference(_) | PredictError::Internal(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }
}

/// Audit log failures. Operator-visible only.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to serialize features: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Weather enrichment failures. Operator-visible only; the caller sees "absent".
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("no weather API key configured")]
    MissingApiKey,

    #[error("weather provider request failed: {0}")]
    Provider(#[from] anyhow::Error),

    #[error("weather response is missing '{0}'")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("cannot read model artifact '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model was trained on features {found:?}, expected {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("model has {found} coefficients, expected {expected}")]
    CoefficientCount { expected: usize, found: usize },
}
