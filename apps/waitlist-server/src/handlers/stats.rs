//! Signup statistics endpoint.

use actix_web::{HttpResponse, web};
use waitlist_core::Stats;
use waitlist_shared::StatsResponse;

use crate::state::AppState;

/// GET /api/stats
///
/// Never fails: store errors are logged and reported as disconnected.
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let stats = state.subscriptions.stats().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to read signup stats");
        Stats::disconnected()
    });

    HttpResponse::Ok().json(StatsResponse {
        total_signups: stats.total_signups,
        connected: stats.connected,
    })
}
