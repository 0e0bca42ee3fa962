//! Common error types for shelfsync

use thiserror::Error;

/// Common result type for shelfsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across shelfsync services
#[derive(Error, Debug)]
pub enum Error {
    /// Network/HTTP failure or malformed response from an upstream feed
    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    /// Expected column or field missing from materialized data
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Any other failure during normalization or key-set construction
    #[error("Comparison error: {0}")]
    Comparison(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular artifact read/write error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Aggregate failure of one pipeline run
    #[error("{stage} stage failed: {source}")]
    Pipeline {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap `self` as the failure of a named pipeline stage
    pub fn in_stage(self, stage: &'static str) -> Self {
        Error::Pipeline {
            stage,
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code, used in HTTP error envelopes.
    ///
    /// For [`Error::Pipeline`] this is the code of the underlying cause.
    pub fn kind_code(&self) -> &'static str {
        match self {
            Error::UpstreamFetch(_) => "UPSTREAM_FETCH_ERROR",
            Error::MalformedInput(_) => "MALFORMED_INPUT",
            Error::Comparison(_) => "COMPARISON_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Csv(_) => "CSV_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Pipeline { source, .. } => source.kind_code(),
        }
    }
}
