use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error};

use crate::error::AppError;
use crate::models::Claims;

/// Issuer name for platform JWT tokens
pub const JWT_ISSUER: &str = "ai2-platform";

/// Verifies bearer tokens against the shared platform signing secret.
///
/// Built once at startup from non-optional configuration and installed as
/// app data; read-only afterwards, so concurrent requests share it without
/// locking. Verification is purely cryptographic against the in-memory
/// secret and performs no I/O.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Pin the algorithm to HS256: "none" and every other algorithm are
        // rejected at the header, closing off algorithm-confusion attacks.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify a JWT token and extract the claims.
    ///
    /// The returned error always carries the same generic client message;
    /// the specific failure reason goes to the operator log only.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
                let reason = match err.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => "token has expired",
                    jsonwebtoken::errors::ErrorKind::InvalidToken => "invalid token format",
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        "invalid signature (secret mismatch between issuer and verifier?)"
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => "invalid token issuer",
                    jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                        "token algorithm does not match the configured HS256"
                    }
                    jsonwebtoken::errors::ErrorKind::ImmatureSignature => "token not yet valid",
                    jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                        "token missing a required claim"
                    }
                    _ => "token validation failed",
                };
                error!("JWT validation failed: {} ({})", reason, err);
                AppError::InvalidCredential("Invalid or expired token".to_string())
            })?;

        debug!("JWT token verified successfully");
        Ok(token_data.claims)
    }
}

/// Encode an arbitrary claims payload with HS256. The platform issuing path
/// and test fixtures both go through here.
pub fn sign_claims(secret: &str, claims: &Claims) -> Result<String, AppError> {
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &encoding_key).map_err(|e| {
        error!("Failed to sign JWT token: {}", e);
        AppError::Internal(format!("Token signing failed: {}", e))
    })
}

/// Issue a platform token for a user. Writes the identifier into both the
/// `userId` and `sub` claims so either resolution path accepts it.
pub fn issue_token(
    secret: &str,
    user_id: &str,
    email: &str,
    ttl: Duration,
) -> Result<String, AppError> {
    let iat = Utc::now();
    let exp = iat
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal("Failed to calculate JWT expiration time".to_string()))?;

    let claims = Claims {
        user_id: Some(user_id.to_string()),
        sub: Some(user_id.to_string()),
        email: email.to_string(),
        first_name: None,
        last_name: None,
        exp: exp.timestamp() as usize,
        iat: Some(iat.timestamp() as usize),
        iss: Some(JWT_ISSUER.to_string()),
    };

    sign_claims(secret, &claims)
}
