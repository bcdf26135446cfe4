//! Per-language translation catalogs.
//!
//! Catalogs live in a process-wide registry keyed by language code. They are
//! filled programmatically or from a JSON document:
//!
//! ```json
//! {
//!   "messages": {
//!     "Name is required.": "Nama diperlukan."
//!   },
//!   "plurals": {
//!     "{count} hour ago": { "singular": "{count} jam lalu", "plural": "{count} jam lalu" }
//!   }
//! }
//! ```
//!
//! Plural entries are keyed by their singular msgid.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::PortalError;

/// The two translated forms of a pluralized message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluralForms {
    pub singular: String,
    pub plural: String,
}

impl PluralForms {
    /// Picks the form for `count`.
    pub fn select(&self, count: u64) -> &str {
        if count == 1 {
            &self.singular
        } else {
            &self.plural
        }
    }
}

/// Translations for one language.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationCatalog {
    #[serde(default, deserialize_with = "string_entries")]
    messages: HashMap<String, String>,
    #[serde(default)]
    plurals: HashMap<String, PluralForms>,
}

impl TranslationCatalog {
    fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
        self.plurals.extend(other.plurals);
    }
}

/// Keeps the string-valued message entries and drops the rest.
fn string_entries<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = HashMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(msgid, value)| value.as_str().map(|t| (msgid, t.to_string())))
        .collect())
}

static CATALOGS: Lazy<RwLock<HashMap<String, TranslationCatalog>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn update(language: &str, f: impl FnOnce(&mut TranslationCatalog)) {
    let mut catalogs = CATALOGS.write().unwrap_or_else(PoisonError::into_inner);
    f(catalogs.entry(language.to_string()).or_default());
}

fn lookup<R>(language: &str, f: impl FnOnce(&TranslationCatalog) -> Option<R>) -> Option<R> {
    CATALOGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(language)
        .and_then(f)
}

// ── Registration ─────────────────────────────────────────────────────────

/// Adds `(msgid, translated)` pairs to a language, overwriting duplicates.
pub fn register_translations(language: &str, entries: Vec<(&str, &str)>) {
    update(language, |catalog| {
        catalog.messages.extend(
            entries
                .into_iter()
                .map(|(msgid, translated)| (msgid.to_string(), translated.to_string())),
        );
    });
}

/// Adds plural entries to a language.
///
/// Each entry is `(singular_msgid, plural_msgid, translated_singular, translated_plural)`.
pub fn register_plural_translations(language: &str, entries: Vec<(&str, &str, &str, &str)>) {
    update(language, |catalog| {
        for (singular, _plural, translated_singular, translated_plural) in entries {
            catalog.plurals.insert(
                singular.to_string(),
                PluralForms {
                    singular: translated_singular.to_string(),
                    plural: translated_plural.to_string(),
                },
            );
        }
    });
}

/// Merges a JSON catalog into a language.
///
/// Both top-level keys are optional; messages with non-string values are
/// skipped.
pub fn load_from_json(language: &str, json_str: &str) -> Result<(), PortalError> {
    let loaded: TranslationCatalog = serde_json::from_str(json_str)
        .map_err(|e| PortalError::SerializationError(format!("Invalid catalog JSON: {e}")))?;
    tracing::debug!(
        language,
        messages = loaded.messages.len(),
        plurals = loaded.plurals.len(),
        "translation catalog loaded"
    );
    update(language, |catalog| catalog.merge(loaded));
    Ok(())
}

// ── Lookup ───────────────────────────────────────────────────────────────

pub fn translate(language: &str, msgid: &str) -> Option<String> {
    lookup(language, |catalog| catalog.messages.get(msgid).cloned())
}

/// Looks up the translated form of a pluralized message for `count`.
pub fn translate_plural(language: &str, singular: &str, count: u64) -> Option<String> {
    lookup(language, |catalog| {
        catalog
            .plurals
            .get(singular)
            .map(|forms| forms.select(count).to_string())
    })
}

/// Returns `true` if anything is registered for `language`.
pub fn has_language(language: &str) -> bool {
    CATALOGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(language)
}

/// Drops every translation registered for `language`.
pub fn clear_language(language: &str) {
    CATALOGS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(language);
}
