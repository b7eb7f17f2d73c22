use super::{ClientOptions, SourceError, SourceResolver, endpoint};
use crate::config::SourcesConfig;
use crate::types::{Field, FieldRecord, ResolverOutcome};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

/// Marks a nickname so it cannot be mistaken for a domain.
pub const NICKNAME_PREFIX: char = '~';

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NicknameRecord {
    pub nickname: String,
}

impl FieldRecord for NicknameRecord {
    const FIELDS: &'static [Field] = &[Field::Nickname];

    fn into_values(self) -> Vec<(Field, String)> {
        vec![(Field::Nickname, self.nickname)]
    }
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(default)]
    username: Option<String>,
}

/// Looks the account up in the nickname directory.
pub struct NicknameResolver {
    client: reqwest::Client,
    directory_url: Url,
}

impl NicknameResolver {
    /// The directory is always reached with certificate checks on.
    pub fn client_options(config: &SourcesConfig) -> ClientOptions {
        ClientOptions {
            connect_timeout: config.connect_timeout(),
            accept_invalid_certs: false,
        }
    }

    pub fn new(config: &SourcesConfig) -> Result<Self, SourceError> {
        Ok(NicknameResolver {
            client: Self::client_options(config).build()?,
            directory_url: config.nickname_directory_url.clone(),
        })
    }
}

#[async_trait]
impl SourceResolver for NicknameResolver {
    type Record = NicknameRecord;

    fn name(&self) -> &'static str {
        "nickname"
    }

    async fn resolve(
        &self,
        identifier: &str,
    ) -> Result<ResolverOutcome<NicknameRecord>, SourceError> {
        let url = endpoint(&self.directory_url, &["v1", "user", identifier])?;
        let response = self.client.get(url.clone()).send().await?;

        if response.status() != StatusCode::OK {
            return Err(SourceError::UnexpectedStatus {
                status: response.status(),
                url,
            });
        }

        let nickname = match response.json::<UserResponse>().await?.username {
            Some(username) if !username.is_empty() => format!("{NICKNAME_PREFIX}{username}"),
            _ => String::new(),
        };

        Ok(ResolverOutcome::Values(NicknameRecord { nickname }))
    }
}
