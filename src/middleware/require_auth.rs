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
use crate::models::AuthenticatedUser;
use crate::services::auth::jwt::JwtVerifier;

/// Mandatory bearer-token authentication.
///
/// Verifies `Authorization: Bearer <token>` against the shared platform
/// secret and attaches the resolved [`AuthenticatedUser`] to the request.
/// Any failure short-circuits with a structured error response; handlers
/// behind this middleware never see an unauthenticated request and must not
/// re-verify.
pub struct RequireAuth;

/// Runs the full admission check for one request. Stateless: a pure
/// function of the request headers and the process-wide verifier.
fn authenticate_request(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .ok_or_else(|| AppError::MissingCredential("Access token required".to_string()))?;

    let auth_str = auth_header.to_str().map_err(|_| {
        AppError::MissingCredential("Invalid Authorization header".to_string())
    })?;

    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::MissingCredential(
            "Invalid Authorization format, expected Bearer token".to_string(),
        )
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::MissingCredential(
            "Empty Bearer token".to_string(),
        ));
    }

    // Fail closed: no verifier installed means no request is admitted,
    // regardless of what credential was presented.
    let verifier = req
        .app_data::<web::Data<JwtVerifier>>()
        .ok_or_else(|| {
            error!("CRITICAL: JWT verifier not configured; rejecting request");
            AppError::ServerMisconfigured("JWT verifier not installed in app data".to_string())
        })?;

    let claims = verifier.verify(token)?;
    AuthenticatedUser::from_claims(&claims)
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequireAuthMiddleware {
            service: Rc::new(service),
        })
    }
}

pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
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
            // Skip auth check for OPTIONS requests (CORS pre-flight)
            if req.method() == Method::OPTIONS {
                return service.call(req).await;
            }

            let method = req.method().clone();
            let path = req.path().to_string();

            match authenticate_request(&req) {
                Ok(user) => {
                    // Access-audit trail: resolved identity correlated with
                    // the request it admitted
                    info!("Authenticated access: {} - {} {}", user.email, method, path);
                    req.extensions_mut().insert(user);
                    service.call(req).await
                }
                Err(e) => {
                    // Correlation id for matching this rejection with the
                    // verifier's operator log lines
                    let request_id = format!(
                        "auth_{}_{}",
                        chrono::Utc::now().timestamp_millis(),
                        uuid::Uuid::new_v4()
                    );
                    warn!(
                        "Bearer authentication failed for {} {} (request: {}): {}",
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
    use crate::services::auth::jwt::sign_claims;
    use crate::models::Claims;
    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpResponse};
    use chrono::{Duration, Utc};

    async fn echo_user(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
        HttpResponse::Ok().json(user.into_inner())
    }

    fn token_claims() -> Claims {
        Claims {
            user_id: None,
            sub: Some("u1".to_string()),
            email: "a@b.com".to_string(),
            first_name: None,
            last_name: None,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            iat: Some(Utc::now().timestamp() as usize),
            iss: Some("ai2-platform".to_string()),
        }
    }

    #[actix_web::test]
    async fn test_valid_token_attaches_identity() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(JwtVerifier::new("S")))
                .wrap(RequireAuth)
                .route("/api/me", web::get().to(echo_user)),
        )
        .await;

        let token = sign_claims("S", &token_claims()).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], "u1");
        assert_eq!(body["email"], "a@b.com");
    }

    #[actix_web::test]
    async fn test_missing_header_is_401() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(JwtVerifier::new("S")))
                .wrap(RequireAuth)
                .route("/api/me", web::get().to(echo_user)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_non_bearer_scheme_is_401() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(JwtVerifier::new("S")))
                .wrap(RequireAuth)
                .route("/api/me", web::get().to(echo_user)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_wrong_secret_is_403() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(JwtVerifier::new("S")))
                .wrap(RequireAuth)
                .route("/api/me", web::get().to(echo_user)),
        )
        .await;

        let token = sign_claims("WRONG", &token_claims()).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_verifier_is_500_even_with_valid_token() {
        // No JwtVerifier in app data: fail closed
        let app = test::init_service(
            App::new()
                .wrap(RequireAuth)
                .route("/api/me", web::get().to(echo_user)),
        )
        .await;

        let token = sign_claims("S", &token_claims()).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
