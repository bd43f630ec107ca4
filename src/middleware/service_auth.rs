use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{error, info, warn};
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::error::AppError;
use crate::models::TrustedService;
use crate::security::ServiceSecret;

/// Header carrying the service-to-service shared secret
pub const SERVICE_TOKEN_HEADER: &str = "x-service-token";

/// Service-to-service authentication for trusted internal callers (e.g. one
/// service triggering an action in another).
///
/// Validates the static pre-shared secret in `X-Service-Token` with a
/// constant-time comparison. On match the request is tagged as a
/// trusted-service call; no per-user identity is synthesized because the
/// caller is a service, not a user.
pub struct ServiceAuth;

fn authenticate_service(req: &ServiceRequest) -> Result<(), AppError> {
    // Fail closed before looking at the header: an unset secret must never
    // degrade into an open internal endpoint.
    let expected = req
        .app_data::<web::Data<ServiceSecret>>()
        .ok_or_else(|| {
            error!("CRITICAL: service secret not configured; rejecting internal call");
            AppError::ServerMisconfigured("Service secret not installed in app data".to_string())
        })?;

    let presented = req
        .headers()
        .get(SERVICE_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    match presented {
        Some(value) if expected.matches(value) => Ok(()),
        _ => Err(AppError::InvalidCredential(
            "Invalid service credentials".to_string(),
        )),
    }
}

impl<S, B> Transform<S, ServiceRequest> for ServiceAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ServiceAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ServiceAuthMiddleware {
            service: Rc::new(service),
        })
    }
}

pub struct ServiceAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ServiceAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                return service.call(req).await;
            }

            let method = req.method().clone();
            let path = req.path().to_string();

            match authenticate_service(&req) {
                Ok(()) => {
                    info!("Service call: {} {}", method, path);
                    req.extensions_mut().insert(TrustedService);
                    service.call(req).await
                }
                Err(e) => {
                    let request_id = format!(
                        "service_auth_{}_{}",
                        chrono::Utc::now().timestamp_millis(),
                        uuid::Uuid::new_v4()
                    );
                    warn!(
                        "Service authentication failed for {} {} (request: {}): {}",
                        method, path, request_id, e
                    );
                    Err(Error::from(e))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpResponse};

    async fn internal_ok(_trusted: web::ReqData<TrustedService>) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "success": true }))
    }

    fn configured_secret() -> web::Data<ServiceSecret> {
        web::Data::new(ServiceSecret::new("secretA"))
    }

    #[actix_web::test]
    async fn test_matching_secret_proceeds_as_trusted_service() {
        let app = test::init_service(
            App::new()
                .app_data(configured_secret())
                .wrap(ServiceAuth)
                .route("/internal/trigger", web::post().to(internal_ok)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/internal/trigger")
            .insert_header(("X-Service-Token", "secretA"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_wrong_secret_is_403() {
        let app = test::init_service(
            App::new()
                .app_data(configured_secret())
                .wrap(ServiceAuth)
                .route("/internal/trigger", web::post().to(internal_ok)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/internal/trigger")
            .insert_header(("X-Service-Token", "secretB"))
            .to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_prefix_variant_is_403() {
        let app = test::init_service(
            App::new()
                .app_data(configured_secret())
                .wrap(ServiceAuth)
                .route("/internal/trigger", web::post().to(internal_ok)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/internal/trigger")
            .insert_header(("X-Service-Token", "secret"))
            .to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_header_is_403() {
        let app = test::init_service(
            App::new()
                .app_data(configured_secret())
                .wrap(ServiceAuth)
                .route("/internal/trigger", web::post().to(internal_ok)),
        )
        .await;

        let req = test::TestRequest::post().uri("/internal/trigger").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_secret_config_is_500() {
        let app = test::init_service(
            App::new()
                .wrap(ServiceAuth)
                .route("/internal/trigger", web::post().to(internal_ok)),
        )
        .await;

        // Even a would-be-valid credential cannot be admitted without
        // configuration to check it against
        let req = test::TestRequest::post()
            .uri("/internal/trigger")
            .insert_header(("X-Service-Token", "secretA"))
            .to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
