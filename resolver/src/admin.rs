use crate::cache::CacheStore;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use shared::http::{make_boxed_error_response, make_text_response};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

/// Health and readiness endpoints. Ready means the cache backend answers.
pub struct AdminService<E> {
    cache: Arc<dyn CacheStore>,
    _error: PhantomData<E>,
}

impl<E> AdminService<E> {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            _error: PhantomData,
        }
    }
}

async fn handle<B, E: 'static>(
    cache: &dyn CacheStore,
    req: Request<B>,
) -> Response<BoxBody<Bytes, E>> {
    match req.uri().path() {
        "/health" => make_text_response(StatusCode::OK, "ok\n"),
        "/ready" => match cache.ping().await {
            Ok(()) => make_text_response(StatusCode::OK, "ok\n"),
            Err(e) => {
                tracing::warn!(cache = cache.name(), "Readiness check failed: {e}");
                make_boxed_error_response(StatusCode::SERVICE_UNAVAILABLE)
            }
        },
        _ => make_boxed_error_response(StatusCode::NOT_FOUND),
    }
}

impl<E> Service<Request<Incoming>> for AdminService<E>
where
    E: Send + 'static,
{
    type Response = Response<BoxBody<Bytes, E>>;
    type Error = E;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let cache = self.cache.clone();
        Box::pin(async move { Ok(handle(cache.as_ref(), req).await) })
    }
}
