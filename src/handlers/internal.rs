use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::info;

use crate::error::AppResult;
use crate::models::TrustedService;

/// Internal notification trigger, reachable only through `ServiceAuth`.
/// The extractor makes the trusted-service tag a hard requirement: if the
/// middleware did not run, this handler fails rather than execute untagged.
pub async fn trigger_notification(
    _trusted: web::ReqData<TrustedService>,
) -> AppResult<HttpResponse> {
    info!("Internal notification trigger accepted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "status": "queued",
            "triggeredAt": Utc::now().to_rfc3339(),
        }
    })))
}
