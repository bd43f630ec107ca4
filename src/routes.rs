use actix_web::web;

use crate::handlers;

/// Configures routes that REQUIRE JWT authentication.
/// Mounted under the "/api/auth" scope and wrapped with RequireAuth in main.rs.
pub fn configure_protected_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/userinfo",
        web::get().to(handlers::userinfo::get_user_info),
    );
}

/// Configures routes where authentication is optional.
/// Mounted under the "/api/analytics" scope and wrapped with OptionalAuth in main.rs.
pub fn configure_optional_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/status",
        web::get().to(handlers::analytics::service_status),
    );
}

/// Configures internal trigger routes for trusted services only.
/// Mounted under the "/internal" scope and wrapped with ServiceAuth in main.rs.
pub fn configure_internal_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/notifications/trigger",
        web::post().to(handlers::internal::trigger_notification),
    );
}
