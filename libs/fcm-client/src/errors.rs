use thiserror::Error;

/// Result type for FCM client operations
pub type FcmResult<T> = Result<T, FcmError>;

/// FCM Client Error Types
///
/// Remote 4xx/5xx statuses are not errors: they come back as an
/// [`FcmResponse`](crate::FcmResponse) carrying the status code.
#[derive(Error, Debug)]
pub enum FcmError {
    /// Missing or unusable client configuration (API key, project name, credential kind)
    #[error("FCM configuration error: {0}")]
    Config(String),

    /// Service account source could not be read or parsed
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    /// OAuth2 access token could not be obtained
    #[error("Failed to get access token: {0}")]
    Token(String),

    /// Topic name rejected before sending; no request was issued
    #[error("Invalid topic name: {0}")]
    InvalidTopic(String),

    /// Topic condition rejected before sending; no request was issued
    #[error("Invalid topic condition: {0}")]
    InvalidCondition(String),

    /// Configured endpoint is not a valid URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Failed to serialize FCM payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FcmError {
    /// True when the call was rejected locally by topic/condition validation
    pub fn is_rejected(&self) -> bool {
        matches!(self, FcmError::InvalidTopic(_) | FcmError::InvalidCondition(_))
    }
}

impl From<FcmError> for String {
    fn from(err: FcmError) -> Self {
        err.to_string()
    }
}
