use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Unable to calculate totals")]
    PreviewUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Payment error: {0}")]
    PaymentError(String),
    #[error("Order error: {0}")]
    OrderError(String),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
