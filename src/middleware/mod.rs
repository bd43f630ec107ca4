pub mod optional_auth;
pub mod require_auth;
pub mod service_auth;

pub use optional_auth::OptionalAuth;
pub use require_auth::RequireAuth;
pub use service_auth::ServiceAuth;

use actix_web::dev::ServiceRequest;

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if auth_str.starts_with("Bearer ") {
                return Some(auth_str[7..].trim().to_string());
            }
        }
    }

    None
}
