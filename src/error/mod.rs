use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Error taxonomy for the authentication layer.
///
/// Every failure path in the authenticators resolves to one of these
/// variants before a response is sent. The carried string is the
/// client-facing message; detailed reasons (specific JWT failure, mismatch
/// details, etc.) are logged at the rejection site and never serialized.
#[derive(Debug)]
pub enum AppError {
    /// No credential, or a credential not in the expected header form (401).
    MissingCredential(String),
    /// Credential presented but failed verification (403). The message is
    /// deliberately generic so responses do not act as a validation oracle.
    InvalidCredential(String),
    /// A verification secret is not available at request time (500).
    /// Fail-closed: an unset secret is never treated as "no auth required".
    ServerMisconfigured(String),
    /// Startup configuration failure (500).
    Configuration(String),
    Internal(String),
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingCredential(e) => write!(f, "Missing credential: {}", e),
            AppError::InvalidCredential(e) => write!(f, "Invalid credential: {}", e),
            AppError::ServerMisconfigured(e) => write!(f, "Server misconfigured: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl StdError for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::MissingCredential(e) | AppError::InvalidCredential(e) => e.clone(),
            // Never echo configuration details back to the caller
            AppError::ServerMisconfigured(_) | AppError::Configuration(_) => {
                "Server configuration error".to_string()
            }
            AppError::Internal(_) => "Internal server error".to_string(),
        };

        let error_response = ErrorResponse {
            success: false,
            error: message,
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredential(_) => StatusCode::FORBIDDEN,
            AppError::ServerMisconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Define AppResult type alias for Result<T, AppError>
pub type AppResult<T> = Result<T, AppError>;
