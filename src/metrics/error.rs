use thiserror::Error;

/// Errors from decoding push frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Not JSON, or JSON of the wrong shape
    #[error("malformed push frame: {0}")]
    Malformed(String),
}
