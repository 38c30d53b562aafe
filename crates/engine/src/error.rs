use thiserror::Error;

/// Terminal outcomes of one signal's processing. Nothing here crashes a
/// worker; each kind maps to a single user-visible notification.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unparsable signal: {0}")]
    UnparsableSignal(String),

    /// Balance, mark price or leverage could not be fetched; no orders were
    /// placed.
    #[error("preconditions unavailable for {symbol}: {reason}")]
    PreconditionUnavailable { symbol: String, reason: String },

    /// A placement or cancel call inside the critical chain (or the fill
    /// watch) was rejected.
    #[error("exchange rejected {symbol}: {reason}")]
    ExchangeRejected { symbol: String, reason: String },

    /// Non-fatal: the protective chain stands and monitoring continues.
    #[error("trailing stop placement failed for {symbol}: {reason}")]
    TrailingPlacementFailed { symbol: String, reason: String },
}

/// The one place engine errors become user-visible text. Applied at the
/// worker boundary for terminal errors and inline for the non-fatal
/// trailing case.
pub fn error_notification(err: &EngineError) -> String {
    match err {
        EngineError::UnparsableSignal(reason) => {
            format!("Signal could not be parsed: {reason}")
        }
        EngineError::PreconditionUnavailable { symbol, reason } => {
            format!("{symbol}: balance/price/leverage unavailable, no orders placed ({reason})")
        }
        EngineError::ExchangeRejected { symbol, reason } => {
            format!("{symbol}: order flow aborted: {reason}")
        }
        EngineError::TrailingPlacementFailed { symbol, reason } => {
            format!("{symbol}: trailing stop failed, continuing without it ({reason})")
        }
    }
}
