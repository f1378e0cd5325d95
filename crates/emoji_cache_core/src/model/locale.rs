//! Supported locales and partition identifiers.
//!
//! # Responsibility
//! - Define the closed set of locales that own a unicode partition.
//! - Normalize arbitrary locale strings onto that set.
//!
//! # Invariants
//! - `Locale::ALL` lists every supported locale exactly once.
//! - Normalization never fails; unknown input falls back to `en`.
//! - `custom` is never a `Locale`, only a `PartitionId`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

const CUSTOM_PARTITION: &str = "custom";

static LOCALE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]{2,3})(?:-[a-z0-9]+)*$").expect("valid locale regex"));

/// Locale with a bundled unicode data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Locale {
    Bn,
    Da,
    De,
    En,
    EnGb,
    Es,
    EsMx,
    Et,
    Fi,
    Fr,
    Hi,
    Hu,
    It,
    Ja,
    Ko,
    Lt,
    Ms,
    Nb,
    Nl,
    Pl,
    Pt,
    Ru,
    Sv,
    Th,
    Uk,
    Zh,
    ZhHant,
}

impl Locale {
    pub const ALL: [Locale; 27] = [
        Locale::Bn,
        Locale::Da,
        Locale::De,
        Locale::En,
        Locale::EnGb,
        Locale::Es,
        Locale::EsMx,
        Locale::Et,
        Locale::Fi,
        Locale::Fr,
        Locale::Hi,
        Locale::Hu,
        Locale::It,
        Locale::Ja,
        Locale::Ko,
        Locale::Lt,
        Locale::Ms,
        Locale::Nb,
        Locale::Nl,
        Locale::Pl,
        Locale::Pt,
        Locale::Ru,
        Locale::Sv,
        Locale::Th,
        Locale::Uk,
        Locale::Zh,
        Locale::ZhHant,
    ];

    /// Canonical lowercase identifier, e.g. `en-gb`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bn => "bn",
            Self::Da => "da",
            Self::De => "de",
            Self::En => "en",
            Self::EnGb => "en-gb",
            Self::Es => "es",
            Self::EsMx => "es-mx",
            Self::Et => "et",
            Self::Fi => "fi",
            Self::Fr => "fr",
            Self::Hi => "hi",
            Self::Hu => "hu",
            Self::It => "it",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Lt => "lt",
            Self::Ms => "ms",
            Self::Nb => "nb",
            Self::Nl => "nl",
            Self::Pl => "pl",
            Self::Pt => "pt",
            Self::Ru => "ru",
            Self::Sv => "sv",
            Self::Th => "th",
            Self::Uk => "uk",
            Self::Zh => "zh",
            Self::ZhHant => "zh-hant",
        }
    }

    /// Exact match against canonical identifiers.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|locale| locale.as_str() == value)
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key space shared by the etag table and partition addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartitionId {
    Locale(Locale),
    Custom,
}

impl PartitionId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locale(locale) => locale.as_str(),
            Self::Custom => CUSTOM_PARTITION,
        }
    }
}

impl From<Locale> for PartitionId {
    fn from(value: Locale) -> Self {
        Self::Locale(value)
    }
}

impl Display for PartitionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps any locale string onto a supported locale.
///
/// Matching order: exact (after lowercasing and `_` -> `-`), then the base
/// language subtag, then `en`.
pub fn to_supported_locale(value: &str) -> Locale {
    let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
    if let Some(locale) = Locale::parse(&normalized) {
        return locale;
    }

    LOCALE_SHAPE_RE
        .captures(&normalized)
        .and_then(|captures| captures.get(1))
        .and_then(|language| Locale::parse(language.as_str()))
        .unwrap_or(Locale::En)
}

/// Like [`to_supported_locale`], but recognizes the custom partition.
pub fn to_supported_locale_or_custom(value: &str) -> PartitionId {
    if value.trim().eq_ignore_ascii_case(CUSTOM_PARTITION) {
        return PartitionId::Custom;
    }
    PartitionId::Locale(to_supported_locale(value))
}
