use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod security;
mod services;

use crate::config::AppSettings;
use crate::middleware::{OptionalAuth, RequireAuth, ServiceAuth};
use crate::security::ServiceSecret;
use crate::services::auth::jwt::JwtVerifier;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings. Both auth secrets are required here: a
    // deployment without them never gets far enough to serve a request.
    let app_settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    // Build the verification state once; read-only for the process lifetime
    let jwt_verifier = web::Data::new(JwtVerifier::new(&app_settings.auth.jwt_secret));
    let service_secret = web::Data::new(ServiceSecret::new(
        app_settings.auth.service_secret.clone(),
    ));

    let host = app_settings.server.host.clone();
    let port = app_settings.server.port;

    log::info!(
        "Starting {} ({}) at http://{}:{}",
        app_settings.app.name,
        app_settings.app.environment,
        host,
        port
    );

    let listener = TcpListener::bind(format!("{}:{}", host, port))?;

    HttpServer::new(move || {
        let app_settings = app_settings.clone();

        // Configure CORS using actix-cors
        let mut cors = Cors::default().supports_credentials();

        if app_settings.server.cors_origins.contains(&"*".to_string()) {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        cors = cors.allow_any_method().allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(jwt_verifier.clone())
            .app_data(service_secret.clone())
            // Public health check, no authentication
            .service(
                web::resource("/health").route(web::get().to(handlers::health::health_check)),
            )
            // End-user routes requiring a valid bearer token
            .service(
                web::scope("/api/auth")
                    .wrap(RequireAuth)
                    .configure(routes::configure_protected_routes),
            )
            // End-user routes that personalize when a token is present
            .service(
                web::scope("/api/analytics")
                    .wrap(OptionalAuth)
                    .configure(routes::configure_optional_routes),
            )
            // Internal trigger routes for trusted services
            .service(
                web::scope("/internal")
                    .wrap(ServiceAuth)
                    .configure(routes::configure_internal_routes),
            )
    })
    .listen(listener)?
    .run()
    .await
}
