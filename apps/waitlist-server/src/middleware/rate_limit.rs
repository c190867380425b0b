//! Rate limiting middleware.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{self, HeaderName, HeaderValue},
    web,
};
use waitlist_shared::SubscribeResponse;

use super::client::client_ip;
use crate::state::AppState;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Rate limiting middleware factory.
///
/// Counts requests per client address with the limiter held in
/// [`AppState`]. Limiter failures let the request through.
pub struct RateLimitMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::warn!("Rate limiter state missing, skipping check");
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            };

            let key = client_ip(req.request(), state.trust_proxy)
                .unwrap_or_else(|| "unknown".to_string());

            match state.limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(client = %key, "Rate limit exceeded");

                    let response = HttpResponse::TooManyRequests()
                        .insert_header((
                            header::RETRY_AFTER,
                            result.reset_after.as_secs().max(1).to_string(),
                        ))
                        .insert_header((LIMIT_HEADER, result.limit.to_string()))
                        .insert_header((REMAINING_HEADER, "0"))
                        .json(SubscribeResponse::failure(RATE_LIMITED_MESSAGE));

                    Ok(req.into_response(response).map_into_right_body())
                }
                Ok(result) => {
                    let mut res = service.call(req).await?;
                    let headers = res.headers_mut();
                    headers.insert(
                        HeaderName::from_static(LIMIT_HEADER),
                        HeaderValue::from(result.limit),
                    );
                    headers.insert(
                        HeaderName::from_static(REMAINING_HEADER),
                        HeaderValue::from(result.remaining),
                    );
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
            }
        })
    }
}
