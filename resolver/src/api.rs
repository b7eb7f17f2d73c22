use crate::config::ResolverConfig;
use crate::id_resolver::IdResolver;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::header::HOST;
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use shared::http::{make_boxed_error_response, make_text_response};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Public endpoint: `GET /<address>[?timeout=<seconds>]` answers with the
/// resolved name as plain text.
pub struct ResolveService {
    resolver: IdResolver,
    config: ResolverConfig,
}

impl ResolveService {
    pub fn new(resolver: IdResolver, config: ResolverConfig) -> Self {
        ResolveService { resolver, config }
    }
}

impl Service<Request<Incoming>> for ResolveService {
    type Response = Response<BoxBody<Bytes, Self::Error>>;
    type Error = ApiError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let resolver = self.resolver.clone();
        let config = self.config.clone();
        Box::pin(async move { Ok(handle(&resolver, &config, req).await) })
    }
}

async fn handle<B, E: 'static>(
    resolver: &IdResolver,
    config: &ResolverConfig,
    req: Request<B>,
) -> Response<BoxBody<Bytes, E>> {
    if req.method() != Method::GET {
        return make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    let address = req.uri().path().trim_start_matches('/');
    if address.is_empty() {
        return make_text_response(StatusCode::OK, help_text(&req));
    }
    if address.contains('/') {
        return make_boxed_error_response(StatusCode::NOT_FOUND);
    }

    let timeout = match parse_timeout(req.uri().query(), config) {
        Ok(timeout) => timeout,
        Err(value) => {
            tracing::debug!(value = %value, "Rejecting invalid timeout");
            return make_boxed_error_response(StatusCode::BAD_REQUEST);
        }
    };

    let name = resolver.resolve(address, timeout).await;
    make_text_response(StatusCode::OK, name)
}

fn help_text<B>(req: &Request<B>) -> String {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("Info: https://github.com/miracle2k/ripple-id\n\nhttp://{host}/<address>[?timeout=<seconds>]")
}

/// Reads the `timeout` query parameter, falling back to the configured
/// default and clamping to the configured maximum. Returns the offending
/// value if it is not a non-negative finite number, or if the clamped
/// value does not fit a `Duration`.
fn parse_timeout(query: Option<&str>, config: &ResolverConfig) -> Result<Duration, String> {
    let requested = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(key, _)| key == "timeout")
        .map(|(_, value)| value.into_owned());

    let secs = match requested {
        None => config.default_timeout_secs,
        Some(value) => match value.trim().parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= 0.0 => secs,
            _ => return Err(value),
        },
    };

    Duration::try_from_secs_f64(secs.min(config.max_timeout_secs))
        .map_err(|_| format!("{secs} (max {})", config.max_timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeadlinePolicy;
    use crate::overrides::Overrides;
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use std::convert::Infallible;

    fn resolver() -> IdResolver {
        let overrides = Overrides::new(HashMap::from([(
            "rOverride".to_string(),
            "Local Name".to_string(),
        )]));
        IdResolver::new(overrides, vec![], DeadlinePolicy::Detach)
    }

    async fn send(req: Request<()>) -> (StatusCode, String) {
        let response = handle::<_, Infallible>(&resolver(), &ResolverConfig::default(), req).await;
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_parse_timeout() {
        let config = ResolverConfig::default();
        assert_eq!(parse_timeout(None, &config), Ok(Duration::from_secs(2)));
        assert_eq!(
            parse_timeout(Some("foo=bar"), &config),
            Ok(Duration::from_secs(2))
        );
        assert_eq!(
            parse_timeout(Some("timeout=0.5"), &config),
            Ok(Duration::from_millis(500))
        );
        assert_eq!(parse_timeout(Some("timeout=3"), &config), Ok(Duration::from_secs(3)));
        assert_eq!(parse_timeout(Some("timeout=0"), &config), Ok(Duration::ZERO));
        // Clamped
        assert_eq!(
            parse_timeout(Some("timeout=60"), &config),
            Ok(Duration::from_secs(10))
        );

        assert_eq!(parse_timeout(Some("timeout=abc"), &config), Err("abc".into()));
        assert_eq!(parse_timeout(Some("timeout=-1"), &config), Err("-1".into()));
        assert_eq!(parse_timeout(Some("timeout=inf"), &config), Err("inf".into()));
        assert_eq!(parse_timeout(Some("timeout=NaN"), &config), Err("NaN".into()));
        // Huge values are clamped before conversion
        assert_eq!(
            parse_timeout(Some("timeout=1e20"), &config),
            Ok(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_parse_timeout_unrepresentable_max() {
        // Rejected by validation, but must not take the connection down
        let config = ResolverConfig {
            max_timeout_secs: 1e20,
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(parse_timeout(Some("timeout=1e20"), &config).is_err());
        assert_eq!(
            parse_timeout(Some("timeout=3"), &config),
            Ok(Duration::from_secs(3))
        );

        let config = ResolverConfig {
            default_timeout_secs: 1e20,
            max_timeout_secs: 1e20,
            ..ResolverConfig::default()
        };
        assert!(parse_timeout(None, &config).is_err());
    }

    #[tokio::test]
    async fn test_huge_timeout_is_clamped() {
        let req = Request::get("/rOverride?timeout=1e20").body(()).unwrap();
        assert_eq!(send(req).await, (StatusCode::OK, "Local Name".to_string()));
    }

    #[tokio::test]
    async fn test_help() {
        let req = Request::get("/")
            .header(HOST, "ids.example.com")
            .body(())
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("http://ids.example.com/<address>[?timeout=<seconds>]"));
    }

    #[tokio::test]
    async fn test_resolve() {
        let req = Request::get("/rOverride").body(()).unwrap();
        assert_eq!(send(req).await, (StatusCode::OK, "Local Name".to_string()));

        // Nothing known: empty body, still 200
        let req = Request::get("/rUnknown?timeout=0.1").body(()).unwrap();
        assert_eq!(send(req).await, (StatusCode::OK, String::new()));
    }

    #[tokio::test]
    async fn test_request_errors() {
        let req = Request::get("/rOverride?timeout=soon").body(()).unwrap();
        assert_eq!(send(req).await.0, StatusCode::BAD_REQUEST);

        let req = Request::get("/rOverride/extra").body(()).unwrap();
        assert_eq!(send(req).await.0, StatusCode::NOT_FOUND);

        let req = Request::post("/rOverride").body(()).unwrap();
        assert_eq!(send(req).await.0, StatusCode::METHOD_NOT_ALLOWED);
    }
}
