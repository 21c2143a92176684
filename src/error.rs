// src/error.rs
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion errors.
///
/// The variants matter to callers: `Fetch`/`Timeout` are transient source
/// trouble (nothing was written, rerun later), `Schema` and `Parse` mean
/// the source changed shape and a human has to look before anyone retries,
/// `Consistency` means a pipeline invariant broke and the run must halt.
#[derive(Debug, Error)]
pub enum Error {
    /// Source unreachable or returned a non-success status.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Source did not answer within the configured deadline.
    #[error("source timed out: {0}")]
    Timeout(String),

    /// Raw data carried columns outside the jurisdiction's allow-list.
    #[error("unexpected source columns: {0}")]
    Schema(String),

    /// An extraction pattern no longer matches the page or payload.
    #[error("extraction failed: {0}")]
    Parse(String),

    /// Bad injected configuration, e.g. an unparsable authorization date.
    #[error("bad configuration: {0}")]
    Config(String),

    /// A snapshot invariant was violated. Always fatal, never corrected.
    #[error("snapshot invariant violated: {0}")]
    Consistency(String),

    /// Store I/O.
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Payload decoding.
    #[error("json decode: {0}")]
    Json(#[from] serde_json::Error),
}
