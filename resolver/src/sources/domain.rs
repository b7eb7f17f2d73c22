use super::ripple_txt::RippleTxt;
use super::{ClientOptions, SourceError, SourceResolver, endpoint};
use crate::config::SourcesConfig;
use crate::types::{Field, FieldRecord, ResolverOutcome};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

/// A domain that vouches for the account, plus the alternate name the
/// domain publishes for it. Both are empty for a definitive negative.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainRecord {
    pub domain: String,
    pub x_name: String,
}

impl DomainRecord {
    pub fn none() -> Self {
        Self::default()
    }
}

impl FieldRecord for DomainRecord {
    const FIELDS: &'static [Field] = &[Field::Domain, Field::AltName];

    fn into_values(self) -> Vec<(Field, String)> {
        vec![(Field::Domain, self.domain), (Field::AltName, self.x_name)]
    }
}

#[derive(Deserialize)]
struct AccountSettingsResponse {
    success: bool,
    settings: AccountSettings,
}

#[derive(Deserialize)]
struct AccountSettings {
    #[serde(default)]
    domain: Option<String>,
}

#[derive(Debug, PartialEq)]
enum VerificationFetch {
    Found(String),
    // Every candidate answered 404
    Missing,
    // At least one candidate failed in a way that may go away
    PossiblyTransient,
}

/// Resolves the domain configured in the account settings, trusting it only
/// if the domain's ripple.txt lists the account back.
pub struct DomainResolver {
    client: reqwest::Client,
    settings_url: Url,
    verification_urls: Vec<String>,
}

impl DomainResolver {
    /// Certificate checks for the settings server and the verification
    /// documents follow `disable_ssl_verify`.
    pub fn client_options(config: &SourcesConfig) -> ClientOptions {
        ClientOptions {
            connect_timeout: config.connect_timeout(),
            accept_invalid_certs: config.disable_ssl_verify,
        }
    }

    pub fn new(config: &SourcesConfig) -> Result<Self, SourceError> {
        Ok(DomainResolver {
            client: Self::client_options(config).build()?,
            settings_url: config.account_settings_url.clone(),
            verification_urls: config.verification_urls.clone(),
        })
    }

    /// The domain configured for the account, if any.
    async fn account_domain(&self, identifier: &str) -> Result<Option<String>, SourceError> {
        let url = endpoint(
            &self.settings_url,
            &["v1", "accounts", identifier, "settings"],
        )?;
        let response = self.client.get(url.clone()).send().await?;

        if response.status() != StatusCode::OK {
            return Err(SourceError::UnexpectedStatus {
                status: response.status(),
                url,
            });
        }

        let body = response.json::<AccountSettingsResponse>().await?;
        if !body.success {
            return Err(SourceError::UpstreamFailure);
        }

        Ok(body.settings.domain.filter(|d| !d.is_empty()))
    }

    fn candidate_urls(&self, domain: &str) -> Vec<String> {
        self.verification_urls
            .iter()
            .map(|template| template.replace("{domain}", domain))
            .collect()
    }

    async fn fetch_verification_document(&self, domain: &str) -> VerificationFetch {
        let mut possibly_transient = false;

        for url in self.candidate_urls(domain) {
            match self.client.get(&url).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    match response.text().await {
                        Ok(body) => return VerificationFetch::Found(body),
                        Err(e) => {
                            tracing::debug!(url = %url, "Failed to read ripple.txt body: {e}");
                            possibly_transient = true;
                        }
                    }
                }
                Ok(response) => {
                    tracing::debug!(url = %url, status = %response.status(), "No ripple.txt");
                    if response.status() != StatusCode::NOT_FOUND {
                        possibly_transient = true;
                    }
                }
                Err(e) => {
                    tracing::debug!(url = %url, "ripple.txt request failed: {e}");
                    possibly_transient = true;
                }
            }
        }

        if possibly_transient {
            VerificationFetch::PossiblyTransient
        } else {
            VerificationFetch::Missing
        }
    }
}

#[async_trait]
impl SourceResolver for DomainResolver {
    type Record = DomainRecord;

    fn name(&self) -> &'static str {
        "domain"
    }

    async fn resolve(&self, identifier: &str) -> Result<ResolverOutcome<DomainRecord>, SourceError> {
        let Some(domain) = self.account_domain(identifier).await? else {
            tracing::debug!("Account has no domain");
            return Ok(ResolverOutcome::Values(DomainRecord::none()));
        };

        let document = match self.fetch_verification_document(&domain).await {
            VerificationFetch::Found(body) => RippleTxt::parse(&body),
            VerificationFetch::Missing => {
                tracing::debug!(domain = %domain, "Domain publishes no ripple.txt");
                return Ok(ResolverOutcome::Values(DomainRecord::none()));
            }
            VerificationFetch::PossiblyTransient => {
                tracing::debug!(domain = %domain, "ripple.txt unavailable, will retry later");
                return Ok(ResolverOutcome::Unknown);
            }
        };

        if !document.lists_account(identifier) {
            tracing::debug!(domain = %domain, "ripple.txt does not list the account");
            return Ok(ResolverOutcome::Values(DomainRecord::none()));
        }

        let x_name = document.alt_name().unwrap_or_default().to_string();
        Ok(ResolverOutcome::Values(DomainRecord { domain, x_name }))
    }
}
