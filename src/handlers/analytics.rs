use actix_web::{web, HttpResponse, Responder};

use crate::models::AuthenticatedUser;

/// Service status document for the analytics surface.
///
/// Behind `OptionalAuth`: anonymous callers get the generic document,
/// authenticated callers see which identity the response was personalized
/// for. Never rejects.
pub async fn service_status(user: Option<web::ReqData<AuthenticatedUser>>) -> impl Responder {
    let mut status = serde_json::json!({
        "service": "Analytics",
        "status": "active",
        "capabilities": [
            "advanced-reporting",
            "exports",
            "insights",
        ],
        "version": env!("CARGO_PKG_VERSION"),
    });

    if let Some(user) = user {
        status["authenticatedAs"] = serde_json::json!(user.email);
    }

    HttpResponse::Ok().json(status)
}
