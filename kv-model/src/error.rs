#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(feature = "tikv")]
    #[error("TiKV error: {0}")]
    TikvError(#[from] tikv_client::Error),
    #[error("Prost error: {0}")]
    SerializationError(#[from] prost::EncodeError),
    #[error("Prost error: {0}")]
    DeserializationError(#[from] prost::DecodeError),
    #[error("Invalid utf8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid parameters for operation: {0}")]
    InvalidOperationParameters(&'static str),
    #[error("Item has no persisted identity")]
    UnpersistedItem,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    StorageFailure(String),
    #[error("Unsupported record version: {0}")]
    UnsupportedRecordVersion(u8),
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
    #[error("Stream already failed: {0}")]
    StreamFailed(String),
}
