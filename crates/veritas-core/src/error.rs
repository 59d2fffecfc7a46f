/// Core type errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid timestamp {value}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}
