use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("ZIP error: {0}")]
    Zip(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt package: {0}")]
    CorruptPackage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown metadata field: {0}")]
    UnknownField(String),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MetaError>;
