//! HTTP handlers and route configuration.

mod frontend;
mod health;
mod stats;
mod subscribe;

use actix_web::{error, web};

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::resource("/subscribe")
                        .route(
                            web::post()
                                .to(subscribe::subscribe)
                                .wrap(RateLimitMiddleware),
                        )
                        .default_service(web::to(frontend::fallback)),
                )
                .route("/stats", web::get().to(stats::stats))
                .default_service(web::to(frontend::fallback)),
        )
        .default_service(web::to(frontend::fallback));
}

/// Malformed or missing JSON bodies are reported like an invalid email.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        error::Error::from(AppError::BadRequest(detail))
    })
}
