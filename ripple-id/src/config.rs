use serde::Deserialize;
use std::fs::File;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    #[serde(default = "default_level")]
    pub level: String,
    pub sentry_dsn: Option<String>,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            sentry_dsn: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CommonConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub metrics: Option<MetricsConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(flatten)]
    pub resolver: resolver::config::Config,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver::config::{CacheBackend, DeadlinePolicy};
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            listener:
                host: 0.0.0.0
                port: 8080
            resolver:
                default_timeout_secs: 1
                on_deadline: abort
            cache:
                type: memory
                max_capacity: 500
                ttl_secs: 120
            overrides:
                rCustom: Custom Name
            logging:
                level: debug
                sentry_dsn: https://key@sentry.example.com/1
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        config.resolver.validate().expect("valid config");

        assert_eq!(config.common.logging.level, "debug");
        assert_eq!(
            config.common.logging.sentry_dsn.as_deref(),
            Some("https://key@sentry.example.com/1")
        );
        assert_eq!(
            config.common.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125,
            })
        );

        assert_eq!(config.resolver.listener.host, "0.0.0.0");
        assert_eq!(config.resolver.resolver.default_timeout_secs, 1.0);
        assert_eq!(config.resolver.resolver.on_deadline, DeadlinePolicy::Abort);
        assert_eq!(
            config.resolver.cache.backend,
            CacheBackend::Memory { max_capacity: 500 }
        );
        assert_eq!(config.resolver.cache.ttl_secs, 120);
        assert_eq!(
            config.resolver.overrides.get("rCustom").map(String::as_str),
            Some("Custom Name")
        );
    }

    #[test]
    fn minimal_config() {
        let tmp = write_tmp_file("{}");
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.common, CommonConfig::default());
        assert_eq!(config.resolver, resolver::config::Config::default());
    }

    #[test]
    fn config_errors() {
        let missing = Config::from_file(std::path::Path::new("/nonexistent/ripple-id.yaml"));
        assert!(matches!(missing, Err(ConfigError::LoadError(_))));

        let tmp = write_tmp_file("cache:\n    type: memcached\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
