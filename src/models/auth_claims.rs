use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure decoded from a verified bearer token.
///
/// A `Claims` value is only ever produced by `JwtVerifier::verify`, i.e.
/// after signature, expiry and issuer checks have passed. It is never
/// constructed from unverified input outside of tests.
///
/// The platform has two historical token-issuing paths: one writes the user
/// identifier into a `userId` claim, the other into the standard `sub`
/// claim. Both are accepted; `userId` is preferred when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier (primary encoding)
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Subject / user identifier (fallback encoding)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// User email
    pub email: String,
    /// Optional first name
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Optional last name
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Resolves the user identifier from the `userId` claim, falling back
    /// to `sub`. If both are present and disagree, that is a possible
    /// inconsistency in token issuance: it is flagged for operators and the
    /// primary claim wins, never silently resolved.
    pub fn resolve_user_id(&self) -> Result<&str, AppError> {
        if let (Some(user_id), Some(sub)) = (&self.user_id, &self.sub) {
            if user_id != sub {
                warn!(
                    "Token carries disagreeing identity claims (userId: {}, sub: {}); preferring userId",
                    user_id, sub
                );
            }
        }

        self.user_id
            .as_deref()
            .or(self.sub.as_deref())
            .ok_or_else(|| {
                AppError::InvalidCredential("Invalid or expired token".to_string())
            })
    }
}

/// Resolved caller context attached to a request after successful token
/// verification. Request-scoped and immutable: created by the auth
/// middleware, read by handlers through `web::ReqData`, discarded when the
/// request completes.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let id = claims.resolve_user_id()?.to_string();

        // Unset optional fields stay absent, never defaulted to ""
        Ok(Self {
            id,
            email: claims.email.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
        })
    }
}

/// Marker attached to requests that authenticated with the service-to-service
/// shared secret. No per-user identity is synthesized for these calls.
#[derive(Debug, Clone, Copy)]
pub struct TrustedService;
