use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetPackerError {
    #[error("Invalid sheet dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid frame '{key}': {reason}")]
    InvalidFrame { key: String, reason: String },
    #[error("Duplicate frame key: {0}")]
    DuplicateKey(String),
}

pub type Result<T> = std::result::Result<T, SheetPackerError>;
