use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store command failed: {0}")]
    Command(String),

    #[error("corrupt cache entry '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            StorageError::Connection(err.to_string())
        } else {
            StorageError::Command(err.to_string())
        }
    }
}
