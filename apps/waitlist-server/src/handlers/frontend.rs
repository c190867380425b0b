//! Landing page fallback.

use actix_web::{HttpRequest, HttpResponse, http::Method, http::header::ContentType, web};
use waitlist_shared::SubscribeResponse;

use crate::state::AppState;

/// Any unmatched path: `GET` serves `<static_dir>/index.html`, other
/// methods get 404.
pub async fn fallback(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if req.method() != Method::GET {
        return not_found();
    }

    let path = state.static_dir.join("index.html");

    match tokio::fs::read(&path).await {
        Ok(page) => HttpResponse::Ok().content_type(ContentType::html()).body(page),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Landing page not found");
            not_found()
        }
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(SubscribeResponse::failure("Not found"))
}
