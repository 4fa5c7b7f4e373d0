/// Failures surfaced to the user as a one-line status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Transport failure: connectivity, DNS, TLS.
    #[error("Network error: {0}")]
    Network(String),

    /// Body was not valid JSON, missed a required field, or was not text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Sign-in, restore or scope grant failed.
    #[error("Sign-in error: {0}")]
    Auth(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}
