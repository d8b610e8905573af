use thiserror::Error;
use validator::ValidationErrors;

/// Message shown when the backend cannot be reached at all.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// Single error type every API call is normalized into.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Rejected client-side before any request was sent.
    #[error("Bad request: {0}")]
    Validation(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The session token was refused; the session has been signed out.
    #[error("Your session has expired. Please sign in again.")]
    Unauthenticated,

    /// The selected security mode has no token to send.
    #[error("You need to sign in to continue.")]
    MissingCredentials,

    /// The request never produced a response.
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Network { details: String },

    /// The response body was not the expected JSON.
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP-status-like code describing the failure.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Http { status, .. } => *status,
            ApiError::Unauthenticated | ApiError::MissingCredentials => 401,
            ApiError::Network { .. } => 503,
            ApiError::Decode(_) => 502,
        }
    }

    /// True when the user has been signed out and must log in again.
    pub fn is_signed_out(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
