//! Waitlist signup endpoint.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use waitlist_core::domain::RequestMetadata;
use waitlist_shared::{SubscribeRequest, SubscribeResponse};

use crate::middleware::client::client_ip;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/subscribe
pub async fn subscribe(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SubscribeRequest>,
) -> AppResult<HttpResponse> {
    let email = body.into_inner().email.unwrap_or_default();

    let metadata = RequestMetadata {
        ip_address: client_ip(&req, state.trust_proxy),
        user_agent: req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let outcome = state.subscriptions.subscribe(&email, metadata).await?;

    tracing::info!(
        email = %outcome.subscriber.email.masked(),
        total_signups = outcome.total_signups,
        "New waitlist signup"
    );

    Ok(HttpResponse::Created().json(SubscribeResponse::created(outcome.total_signups)))
}
