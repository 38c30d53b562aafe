use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange answered with a non-success status; `reason` carries the
    /// response body verbatim.
    #[error("exchange rejected request (HTTP {status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("exchange response missing {0}")]
    MissingData(&'static str),

    #[error("malformed exchange response: {0}")]
    Malformed(String),
}
