//! Runtime configuration for the cache and its remote source.
//!
//! # Responsibility
//! - Describe where the store lives and where partition data is fetched from.
//! - Validate configuration before any storage or network work starts.
//!
//! # Invariants
//! - `locale_resource_template` contains the `{locale}` placeholder.
//! - Every configured bundled locale is a supported locale.

use crate::db::DbLocation;
use crate::model::locale::Locale;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOCALE_PLACEHOLDER: &str = "{locale}";
const DEFAULT_BASE_URL: &str = "http://localhost:3000/";
const DEFAULT_CUSTOM_RESOURCE: &str = "api/v1/custom_emojis";
const DEFAULT_LOCALE_TEMPLATE: &str = "emoji/{locale}/compact.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidJson(String),
    InvalidBaseUrl(String),
    MissingLocalePlaceholder(String),
    UnknownLocale(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(message) => write!(f, "invalid cache config: {message}"),
            Self::InvalidBaseUrl(value) => write!(f, "invalid base url `{value}`"),
            Self::MissingLocalePlaceholder(value) => {
                write!(f, "locale resource template `{value}` lacks `{LOCALE_PLACEHOLDER}`")
            }
            Self::UnknownLocale(value) => write!(f, "unsupported bundled locale `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Cache configuration, usually deserialized from the host application's
/// settings file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Database file; `None` keeps the cache in memory.
    pub db_path: Option<PathBuf>,
    /// Origin that resource paths are resolved against.
    pub base_url: String,
    pub custom_resource_path: String,
    /// Per-locale resource path, with `{locale}` replaced by e.g. `en-gb`.
    pub locale_resource_template: String,
    pub request_timeout_secs: u64,
    /// Locales with a published resource; `None` means all supported locales.
    pub bundled_locales: Option<Vec<String>>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            custom_resource_path: DEFAULT_CUSTOM_RESOURCE.to_string(),
            locale_resource_template: DEFAULT_LOCALE_TEMPLATE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            bundled_locales: None,
        }
    }
}

impl CacheConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(value).map_err(|err| ConfigError::InvalidJson(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        if !self.locale_resource_template.contains(LOCALE_PLACEHOLDER) {
            return Err(ConfigError::MissingLocalePlaceholder(
                self.locale_resource_template.clone(),
            ));
        }
        self.bundled_locale_set().map(|_| ())
    }

    pub fn db_location(&self) -> DbLocation {
        match &self.db_path {
            Some(path) => DbLocation::File(path.clone()),
            None => DbLocation::Memory,
        }
    }

    /// Resource path for `locale`, relative to `base_url`.
    pub fn locale_resource(&self, locale: Locale) -> String {
        self.locale_resource_template
            .replace(LOCALE_PLACEHOLDER, locale.as_str())
    }

    /// Locales that have a published resource.
    pub fn bundled_locale_set(&self) -> Result<BTreeSet<Locale>, ConfigError> {
        let Some(configured) = &self.bundled_locales else {
            return Ok(Locale::ALL.into_iter().collect());
        };
        configured
            .iter()
            .map(|value| {
                Locale::parse(value.trim()).ok_or_else(|| ConfigError::UnknownLocale(value.clone()))
            })
            .collect()
    }
}
