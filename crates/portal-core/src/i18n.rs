//! Display-string translation.
//!
//! Every message a behavior shows to the user goes through [`gettext`] or
//! [`ngettext`]. Strings without a registered translation are returned
//! unchanged, so the portal works with no catalog loaded at all.
//!
//! ```
//! use portal_core::i18n;
//!
//! i18n::catalog::register_translations("ms", vec![("Name is required.", "Nama diperlukan.")]);
//!
//! i18n::activate("ms");
//! assert_eq!(i18n::gettext("Name is required."), "Nama diperlukan.");
//! i18n::deactivate();
//! assert_eq!(i18n::gettext("Name is required."), "Name is required.");
//! ```

pub mod catalog;

use std::cell::RefCell;

// ── Thread-local language state ──────────────────────────────────────────

thread_local! {
    static CURRENT_LANGUAGE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Activates the given language code for the current thread.
pub fn activate(language_code: &str) {
    CURRENT_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = Some(language_code.to_string());
    });
}

/// Deactivates the current thread's language setting, reverting to the default.
///
/// After deactivation, `get_language()` returns `"en"`.
pub fn deactivate() {
    CURRENT_LANGUAGE.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Returns the language code active on the current thread.
pub fn get_language() -> String {
    CURRENT_LANGUAGE.with(|cell| cell.borrow().clone().unwrap_or_else(|| "en".to_string()))
}

/// Translates a message using the current thread's active language.
///
/// If no translation is found, returns the original `msgid`.
pub fn gettext(msgid: &str) -> String {
    catalog::translate(&get_language(), msgid).unwrap_or_else(|| msgid.to_string())
}

/// Translates a message with plural support.
///
/// Returns the singular form if `count == 1`, otherwise the plural form.
/// If no translation is found, returns the appropriate English form.
pub fn ngettext(singular: &str, plural: &str, count: u64) -> String {
    catalog::translate_plural(&get_language(), singular, count).unwrap_or_else(|| {
        let english = if count == 1 { singular } else { plural };
        english.to_string()
    })
}

/// Like [`ngettext`], then substitutes `{count}` with the count.
///
/// ```
/// use portal_core::i18n::ngettext_count;
///
/// assert_eq!(ngettext_count("{count} book", "{count} books", 1), "1 book");
/// assert_eq!(ngettext_count("{count} book", "{count} books", 2), "2 books");
/// ```
pub fn ngettext_count(singular: &str, plural: &str, count: u64) -> String {
    ngettext(singular, plural, count).replace("{count}", &count.to_string())
}
