use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, warn};
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::middleware::extract_bearer_token;
use crate::models::AuthenticatedUser;
use crate::services::auth::jwt::JwtVerifier;

/// Lenient variant of [`RequireAuth`](crate::middleware::RequireAuth) for
/// routes that personalize behavior for authenticated callers but must stay
/// usable anonymously.
///
/// Runs the same verification chain, but never rejects: every failure mode
/// (missing header, missing verifier, invalid token) lets the request
/// proceed without an attached identity. Failures are intentionally silent
/// to the caller and only surface in operator logs.
pub struct OptionalAuth;

/// Best-effort identity resolution; `None` means anonymous.
fn resolve_identity(req: &ServiceRequest) -> Option<AuthenticatedUser> {
    let token = match extract_bearer_token(req) {
        Some(t) if !t.is_empty() => t,
        _ => {
            debug!("No bearer credential presented, continuing anonymously");
            return None;
        }
    };

    let verifier = match req.app_data::<web::Data<JwtVerifier>>() {
        Some(v) => v,
        None => {
            // Does not block handling here, but an unconfigured verifier is
            // still worth an operator's attention
            warn!("JWT verifier not configured, skipping optional auth");
            return None;
        }
    };

    let claims = match verifier.verify(&token) {
        Ok(c) => c,
        Err(_) => {
            debug!("Optional auth failed, continuing as anonymous");
            return None;
        }
    };

    match AuthenticatedUser::from_claims(&claims) {
        Ok(user) => Some(user),
        Err(_) => {
            debug!("Token verified but identity claims unusable, continuing as anonymous");
            None
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OptionalAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = OptionalAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(OptionalAuthMiddleware {
            service: Rc::new(service),
        })
    }
}

pub struct OptionalAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for OptionalAuthMiddleware<S>
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
            if let Some(user) = resolve_identity(&req) {
                debug!(
                    "Optional auth resolved {} for {} {}",
                    user.email,
                    req.method(),
                    req.path()
                );
                req.extensions_mut().insert(user);
            }

            service.call(req).await
        })
    }
}
