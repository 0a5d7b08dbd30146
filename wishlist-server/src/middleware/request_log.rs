use std::future::{ready, Ready};
use std::sync::atomic::{AtomicU64, Ordering};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use futures::future::LocalBoxFuture;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Logs the start and finish of every request, tagged with a process-wide request ID.
#[derive(Clone, Copy, Default)]
pub struct RequestLog;

impl<S, B> Transform<S, ServiceRequest> for RequestLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddleware { service }))
    }
}

pub struct RequestLogMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = next_request_id();

        let peer = req
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|| String::from("<unknown>"));
        let method = req.method().clone();
        let path = String::from(req.path());

        log::info!("{request_id} {peer} {method} {path} START");

        let req_fut = self.service.call(req);

        Box::pin(async move {
            let res = req_fut.await;

            match &res {
                Ok(resp) => log::info!(
                    "{request_id} {peer} {method} {path} FINISH {}",
                    resp.status().as_u16()
                ),
                Err(e) => log::info!(
                    "{request_id} {peer} {method} {path} FINISH {}",
                    e.as_response_error().status_code().as_u16()
                ),
            }

            res
        })
    }
}

fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}
