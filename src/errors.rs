/// Domain-specific error types for the staking engine.
///
/// Degenerate market input (odds <= 1, empty lists, zero bankroll) is NOT an
/// error: those paths return a neutral value (`false`, `0.0`, `None`).
/// Only caller mistakes and ambient failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
