use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors surfaced by the OAuth routes.
///
/// Returned straight to axum; the [`IntoResponse`] impl is the only error
/// rendering there is.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Callback arrived without an authorization code.
    #[error("Missing authorization code")]
    MissingCode,

    /// The provider rejected the code or the access token.
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    /// Missing or invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport, sealing or signing failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingCode => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::UpstreamAuth(ref detail) => {
                tracing::warn!(detail = %detail, "OAuth callback rejected by provider");
                (StatusCode::UNAUTHORIZED, "Authentication failed").into_response()
            }
            Self::Config(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "OAuth callback internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<crate::error::Error> for AuthError {
    fn from(e: crate::error::Error) -> Self {
        use crate::error::Error;

        match e {
            Error::MissingCode => Self::MissingCode,
            Error::UpstreamAuth { .. } => Self::UpstreamAuth(e.to_string()),
            Error::Config(msg) => Self::Config(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
