use thiserror::Error;

/// Classification of a failed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// The source needs a credential that is not configured.
    MissingCredential,
    /// Network failure or non-2xx HTTP status.
    TransportFailure,
    /// The response parsed but had none of the expected price fields.
    PayloadShapeMismatch,
    /// No price element or currency amount on the page.
    SelectorNotFound,
    /// A price candidate was found but is not a usable number.
    NumberParseFailure,
    /// The descriptor's type has no registered adapter.
    UnknownSourceType,
    /// A param the adapter needs is missing from the descriptor.
    InvalidDescriptor,
    /// The observation was extracted but could not be persisted.
    RecordFailure,
}

impl std::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorReason::MissingCredential => "missing credential",
            ErrorReason::TransportFailure => "transport failure",
            ErrorReason::PayloadShapeMismatch => "payload shape mismatch",
            ErrorReason::SelectorNotFound => "selector not found",
            ErrorReason::NumberParseFailure => "number parse failure",
            ErrorReason::UnknownSourceType => "unknown source type",
            ErrorReason::InvalidDescriptor => "invalid descriptor",
            ErrorReason::RecordFailure => "record failure",
        };
        f.write_str(s)
    }
}

/// Failure raised inside an adapter, before it is attributed to a product.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: {detail}")]
pub struct AdapterError {
    pub reason: ErrorReason,
    pub detail: String,
}

impl AdapterError {
    pub fn new(reason: ErrorReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    pub fn missing_credential(name: &str) -> Self {
        Self::new(ErrorReason::MissingCredential, format!("{name} is not set"))
    }

    pub fn missing_param(key: &str) -> Self {
        Self::new(
            ErrorReason::InvalidDescriptor,
            format!("descriptor has no '{key}' param"),
        )
    }

    pub fn shape(detail: impl Into<String>) -> Self {
        Self::new(ErrorReason::PayloadShapeMismatch, detail)
    }
}

impl From<NumberParseError> for AdapterError {
    fn from(err: NumberParseError) -> Self {
        Self::new(ErrorReason::NumberParseFailure, err.to_string())
    }
}

/// A classified failure for one product. Every failure the engine reports
/// carries the product it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{product_name}: {reason}: {detail}")]
pub struct ExtractionError {
    pub product_name: String,
    pub reason: ErrorReason,
    pub detail: String,
}

impl ExtractionError {
    #[must_use]
    pub fn from_adapter(product_name: &str, err: AdapterError) -> Self {
        Self {
            product_name: product_name.to_owned(),
            reason: err.reason,
            detail: err.detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberParseError {
    #[error("no digits in \"{0}\"")]
    NoDigits(String),

    #[error("\"{candidate}\" is not a valid price: {reason}")]
    Invalid { candidate: String, reason: String },
}

/// Errors from persisting an observation.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to open observation log {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write observation row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush observation log: {0}")]
    Flush(#[source] std::io::Error),
}

/// Errors building the HTTP transport.
#[derive(Debug, Error)]
pub enum TransportBuildError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
