use thiserror::Error;

#[derive(Error, Debug)]
pub enum WrapperError {
    #[error("Zenoh error {0:?}")]
    ZenohError(zenoh::Error),
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Failed to encode message")]
    EncodingError(#[from] serde_json::Error),
}

impl From<zenoh::Error> for WrapperError {
    fn from(error: zenoh::Error) -> Self {
        WrapperError::ZenohError(error)
    }
}
