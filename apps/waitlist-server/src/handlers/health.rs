//! Health check endpoint.

use actix_web::{HttpResponse, web};
use chrono::{SecondsFormat, Utc};
use waitlist_shared::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - reports whether the store is connected.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = if state.subscriptions.is_connected() {
        "connected"
    } else {
        "disconnected"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
