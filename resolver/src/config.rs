use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Timeout must be a positive number of seconds: {0}")]
    InvalidTimeout(f64),

    #[error("Timeout of {0} seconds exceeds the limit of {TIMEOUT_LIMIT_SECS}")]
    TimeoutAboveLimit(f64),

    #[error("Default timeout {default} exceeds the maximum of {max}")]
    DefaultTimeoutAboveMax { default: f64, max: f64 },

    #[error("Verification URL template is missing the {{domain}} placeholder: {0}")]
    MissingDomainPlaceholder(String),

    #[error("No verification URL templates configured")]
    NoVerificationUrls,

    #[error("Cache TTL cannot be 0")]
    InvalidTtl,
}

/// Upper bound for every configurable timeout, in seconds.
pub const TIMEOUT_LIMIT_SECS: f64 = 3600.0;

fn validate_timeout(timeout: f64) -> Result<(), ValidationError> {
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(ValidationError::InvalidTimeout(timeout));
    }
    if timeout > TIMEOUT_LIMIT_SECS {
        return Err(ValidationError::TimeoutAboveLimit(timeout));
    }
    Ok(())
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

fn default_admin_listener() -> Listener {
    Listener {
        host: "127.0.0.1".into(),
        port: 8081,
    }
}

/// What happens to lookups still running when the deadline passes.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeadlinePolicy {
    /// Keep running in the background. Their results are not part of the
    /// response but still land in the cache for the next request.
    #[default]
    Detach,
    /// Cancel them.
    Abort,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Timeout used when a request does not specify one
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: f64,
    /// Requested timeouts are clamped to this value
    #[serde(default = "max_timeout_secs")]
    pub max_timeout_secs: f64,
    #[serde(default)]
    pub on_deadline: DeadlinePolicy,
}

fn default_timeout_secs() -> f64 {
    2.0
}

fn max_timeout_secs() -> f64 {
    10.0
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            default_timeout_secs: default_timeout_secs(),
            max_timeout_secs: max_timeout_secs(),
            on_deadline: DeadlinePolicy::default(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_timeout(self.default_timeout_secs)?;
        validate_timeout(self.max_timeout_secs)?;
        if self.default_timeout_secs > self.max_timeout_secs {
            return Err(ValidationError::DefaultTimeoutAboveMax {
                default: self.default_timeout_secs,
                max: self.max_timeout_secs,
            });
        }
        Ok(())
    }
}

/// Upstream services queried by the sources
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SourcesConfig {
    /// Base URL of the ripple-rest server holding account settings
    #[serde(default = "default_account_settings_url")]
    pub account_settings_url: Url,
    /// Base URL of the nickname directory
    #[serde(default = "default_nickname_directory_url")]
    pub nickname_directory_url: Url,
    /// Candidate locations of the verification document, tried in order.
    /// `{domain}` is replaced with the domain found in the account settings.
    #[serde(default = "default_verification_urls")]
    pub verification_urls: Vec<String>,
    /// Skip TLS certificate checks for the account settings and verification
    /// document requests.
    #[serde(default)]
    pub disable_ssl_verify: bool,
    /// Bounds connection setup to every upstream. Lookups left running
    /// after a deadline cannot hang on a dead host past this.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: f64,
}

fn default_connect_timeout_secs() -> f64 {
    5.0
}

fn default_account_settings_url() -> Url {
    Url::parse("https://rippled.undulous.com").expect("valid default URL")
}

fn default_nickname_directory_url() -> Url {
    Url::parse("https://id.ripple.com").expect("valid default URL")
}

fn default_verification_urls() -> Vec<String> {
    vec![
        "https://{domain}/ripple.txt".into(),
        "https://www.{domain}/ripple.txt".into(),
        "https://ripple.{domain}/ripple.txt".into(),
    ]
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            account_settings_url: default_account_settings_url(),
            nickname_directory_url: default_nickname_directory_url(),
            verification_urls: default_verification_urls(),
            disable_ssl_verify: false,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl SourcesConfig {
    /// Falls back to the limit for values `validate` would reject.
    pub fn connect_timeout(&self) -> Duration {
        match validate_timeout(self.connect_timeout_secs) {
            Ok(()) => Duration::from_secs_f64(self.connect_timeout_secs),
            Err(_) => Duration::from_secs_f64(TIMEOUT_LIMIT_SECS),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_timeout(self.connect_timeout_secs)?;
        if self.verification_urls.is_empty() {
            return Err(ValidationError::NoVerificationUrls);
        }
        for template in &self.verification_urls {
            if !template.contains("{domain}") {
                return Err(ValidationError::MissingDomainPlaceholder(template.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum CacheBackend {
    Redis {
        url: String,
    },
    Memory {
        #[serde(default = "default_memory_capacity")]
        max_capacity: u64,
    },
    #[default]
    Noop,
}

fn default_memory_capacity() -> u64 {
    100_000
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(flatten)]
    pub backend: CacheBackend,
    /// How long source results are kept
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600 * 12
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            backend: CacheBackend::default(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    #[serde(default = "default_admin_listener")]
    pub admin_listener: Listener,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Additional locally known names, merged over the built-in table
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: default_admin_listener(),
            resolver: ResolverConfig::default(),
            sources: SourcesConfig::default(),
            cache: CacheConfig::default(),
            overrides: HashMap::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.resolver.validate()?;
        self.sources.validate()?;
        if self.cache.ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl);
        }
        Ok(())
    }
}
