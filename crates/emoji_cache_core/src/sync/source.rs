//! Remote source contract and its HTTP implementation.
//!
//! # Responsibility
//! - Resolve partitions to fetchable resources.
//! - Perform one conditional GET per call and report the raw outcome.
//!
//! # Invariants
//! - Sources never interpret status codes; the importer does.
//! - No retries happen here.

use crate::config::{CacheConfig, ConfigError};
use crate::model::locale::Locale;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use reqwest::{StatusCode, Url};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Status, validator and body of one conditional fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub etag: Option<String>,
    pub body: Vec<u8>,
}

impl RemoteResponse {
    pub fn not_modified() -> Self {
        Self {
            status: StatusCode::NOT_MODIFIED.as_u16(),
            etag: None,
            body: Vec::new(),
        }
    }

    pub fn ok(etag: Option<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            etag,
            body: body.into(),
        }
    }
}

/// The request never produced a response (DNS, TLS, connection reset, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self(value.to_string())
    }
}

/// Where partition data comes from.
pub trait RemoteSource {
    /// Resource for `locale`, or `None` when no data set is published for it.
    fn locale_resource(&self, locale: Locale) -> Option<String>;
    fn custom_resource(&self) -> String;
    /// Issues a GET presenting `if_none_match` as the validator.
    fn fetch(
        &self,
        resource: &str,
        if_none_match: Option<&str>,
    ) -> Result<RemoteResponse, TransportError>;
}

/// Blocking HTTP source resolving resources against one base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
    custom_resource: String,
    locale_template: String,
    bundled: BTreeSet<Locale>,
}

impl HttpSource {
    pub fn from_config(config: &CacheConfig) -> Result<Self, HttpSourceError> {
        config.validate()?;
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|_| ConfigError::InvalidBaseUrl(config.base_url.clone()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            client,
            base_url,
            custom_resource: config.custom_resource_path.clone(),
            locale_template: config.locale_resource_template.clone(),
            bundled: config.bundled_locale_set()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, resource: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(resource.trim_start_matches('/'))
            .map_err(|err| TransportError(format!("invalid resource `{resource}`: {err}")))
    }
}

impl RemoteSource for HttpSource {
    fn locale_resource(&self, locale: Locale) -> Option<String> {
        self.bundled
            .contains(&locale)
            .then(|| self.locale_template.replace("{locale}", locale.as_str()))
    }

    fn custom_resource(&self) -> String {
        self.custom_resource.clone()
    }

    fn fetch(
        &self,
        resource: &str,
        if_none_match: Option<&str>,
    ) -> Result<RemoteResponse, TransportError> {
        let url = self.resolve(resource)?;
        let response = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header(IF_NONE_MATCH, if_none_match.unwrap_or(""))
            .send()?;

        let status = response.status();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let body = if status == StatusCode::NOT_MODIFIED {
            Vec::new()
        } else {
            response.bytes()?.to_vec()
        };

        Ok(RemoteResponse {
            status: status.as_u16(),
            etag,
            body,
        })
    }
}

/// Failure to build an [`HttpSource`].
#[derive(Debug)]
pub enum HttpSourceError {
    Config(ConfigError),
    Client(TransportError),
}

impl Display for HttpSourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Client(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HttpSourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Client(err) => Some(err),
        }
    }
}

impl From<ConfigError> for HttpSourceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TransportError> for HttpSourceError {
    fn from(value: TransportError) -> Self {
        Self::Client(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpSource, RemoteSource};
    use crate::config::CacheConfig;
    use crate::model::locale::Locale;

    #[test]
    fn resolves_resources_against_base_path() {
        let config = CacheConfig {
            base_url: "https://social.example/assets".to_string(),
            bundled_locales: Some(vec!["en".to_string()]),
            ..CacheConfig::default()
        };
        let source = HttpSource::from_config(&config).unwrap();

        assert_eq!(
            source.resolve("/api/v1/custom_emojis").unwrap().as_str(),
            "https://social.example/assets/api/v1/custom_emojis"
        );
        assert_eq!(
            source.locale_resource(Locale::En).as_deref(),
            Some("emoji/en/compact.json")
        );
        assert_eq!(source.locale_resource(Locale::Fr), None);
    }
}
