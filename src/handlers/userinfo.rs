use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::models::AuthenticatedUser;

/// Handler for getting user information from a validated JWT token.
///
/// Runs behind `RequireAuth`; the identity was attached by the middleware
/// and is not re-verified here.
pub async fn get_user_info(user: web::ReqData<AuthenticatedUser>) -> AppResult<HttpResponse> {
    let user = user.into_inner();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user,
    })))
}
