use thiserror::Error;

/// Error taxonomy for the scan/execute/monitor pipeline.
///
/// None of these are fatal to the process. The orchestrator decides
/// recovery per variant: `DataFetch` skips the symbol for the tick,
/// `Classification` degrades to a WAIT signal, `OrderRejected` aborts
/// that symbol's trade, `Monitoring` terminates the affected monitor
/// with a high-severity log.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("data fetch failed: {0}")]
    DataFetch(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("order rejected by exchange (code {code}): {msg}")]
    OrderRejected { code: i64, msg: String },

    #[error("position monitoring failed: {0}")]
    Monitoring(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
