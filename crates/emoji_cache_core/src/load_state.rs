//! Process-local record of which locale partitions hold data.
//!
//! # Responsibility
//! - Gate read queries so an empty partition is never mistaken for a miss.
//! - Normalize caller locale strings before the gate check.
//!
//! # Invariants
//! - Membership is best-effort and rebuilt from row counts when storage opens.
//! - `custom` is never tracked here.
//! - Mutations are single set/remove operations; no cross-operation locking.

use crate::model::locale::{to_supported_locale, Locale};
use log::debug;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{PoisonError, RwLock};

/// A read query targeted a locale whose data has not been imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleNotLoaded(pub Locale);

impl Display for LocaleNotLoaded {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "locale {} is not loaded in emoji database", self.0)
    }
}

impl Error for LocaleNotLoaded {}

/// Shared set of locales known to have at least one stored entry.
#[derive(Debug, Default)]
pub struct LoadedLocales {
    locales: RwLock<BTreeSet<Locale>>,
}

impl LoadedLocales {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_loaded(&self, locale: Locale) {
        self.write().insert(locale);
    }

    pub fn mark_unloaded(&self, locale: Locale) {
        self.write().remove(&locale);
    }

    pub fn is_loaded(&self, locale: Locale) -> bool {
        self.locales
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&locale)
    }

    /// Returns a sorted snapshot of loaded locales.
    pub fn snapshot(&self) -> Vec<Locale> {
        self.locales
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// Replaces membership entirely.
    pub fn replace_all(&self, locales: impl IntoIterator<Item = Locale>) {
        let mut guard = self.write();
        guard.clear();
        guard.extend(locales);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Normalizes `locale` and returns it only if its partition is loaded.
    ///
    /// # Errors
    /// - `LocaleNotLoaded` when the normalized locale has no imported data.
    ///   Callers should treat this as an ordering bug, not an empty result.
    pub fn resolve_loaded(&self, locale: &str) -> Result<Locale, LocaleNotLoaded> {
        let resolved = to_supported_locale(locale);
        if resolved.as_str() != locale {
            debug!(
                "event=locale_normalized module=load_state status=ok input={} locale={}",
                locale, resolved
            );
        }
        if !self.is_loaded(resolved) {
            return Err(LocaleNotLoaded(resolved));
        }
        Ok(resolved)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeSet<Locale>> {
        self.locales.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadedLocales, LocaleNotLoaded};
    use crate::model::locale::Locale;

    #[test]
    fn mark_and_unmark_round_trip() {
        let loaded = LoadedLocales::new();
        assert!(!loaded.is_loaded(Locale::En));
        loaded.mark_loaded(Locale::En);
        assert!(loaded.is_loaded(Locale::En));
        loaded.mark_unloaded(Locale::En);
        assert!(!loaded.is_loaded(Locale::En));
    }

    #[test]
    fn resolve_loaded_normalizes_before_checking() {
        let loaded = LoadedLocales::new();
        loaded.mark_loaded(Locale::EnGb);
        assert_eq!(loaded.resolve_loaded("en_GB"), Ok(Locale::EnGb));
    }

    #[test]
    fn resolve_loaded_rejects_unloaded_locale() {
        let loaded = LoadedLocales::new();
        loaded.mark_loaded(Locale::De);
        assert_eq!(
            loaded.resolve_loaded("fr"),
            Err(LocaleNotLoaded(Locale::Fr))
        );
    }

    #[test]
    fn replace_all_drops_previous_membership() {
        let loaded = LoadedLocales::new();
        loaded.mark_loaded(Locale::Ja);
        loaded.replace_all([Locale::Ko, Locale::Zh]);
        assert_eq!(loaded.snapshot(), vec![Locale::Ko, Locale::Zh]);
    }
}
