use actix_web::web;

pub mod health;
pub mod realtime;

/// Configure application routes for tests and non-HttpServer contexts.
///
/// In production, `main.rs` wraps the realtime scope with the upgrade rate
/// limiter. Tests register the same paths without that wrapper.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Realtime routes: /ws
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
