use thiserror::Error;

#[derive(Debug, Error)]
pub enum TierError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("server error: {0}")]
    Serve(String),

    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, TierError>;
