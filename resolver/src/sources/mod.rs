//! External data sources that can name an account.
use crate::types::{FieldRecord, ResolverOutcome};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub mod domain;
pub mod nickname;
pub mod ripple_txt;

pub use domain::{DomainRecord, DomainResolver};
pub use nickname::{NicknameRecord, NicknameResolver};

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: StatusCode, url: Url },
    #[error("upstream reported failure")]
    UpstreamFailure,
}

/// Settings for the HTTP client owned by a source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl ClientOptions {
    fn build(self) -> Result<reqwest::Client, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;
        Ok(client)
    }
}

/// A single external data source.
///
/// Errors returned from `resolve` are treated exactly like
/// `ResolverOutcome::Unknown` by the caller: nothing is cached and the source
/// is asked again on the next request.
#[async_trait]
pub trait SourceResolver: Send + Sync + 'static {
    type Record: FieldRecord;

    fn name(&self) -> &'static str;

    async fn resolve(
        &self,
        identifier: &str,
    ) -> Result<ResolverOutcome<Self::Record>, SourceError>;
}

#[async_trait]
impl<T: SourceResolver> SourceResolver for Arc<T> {
    type Record = T::Record;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn resolve(
        &self,
        identifier: &str,
    ) -> Result<ResolverOutcome<Self::Record>, SourceError> {
        (**self).resolve(identifier).await
    }
}

/// Appends path segments to `base`, escaping each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SourceError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
