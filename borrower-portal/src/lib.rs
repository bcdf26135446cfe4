//! # borrower-portal
//!
//! Page behaviors for a library borrower portal.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `borrower-portal` to get everything, or depend on
//! individual crates for finer-grained control.

/// Core types, settings, logging, i18n, and date handling.
pub use portal_core as core;

/// In-memory document tree, selectors, and HTML rendering.
#[cfg(feature = "dom")]
pub use portal_dom as dom;

/// View behaviors and the page runtime.
#[cfg(feature = "widgets")]
pub use portal_widgets as widgets;

/// Page fixtures and assertion helpers.
#[cfg(feature = "testing")]
pub use portal_test as test;

pub use chrono;
pub use serde;
pub use serde_json;
pub use tracing;

/// Starts the portal on a rendered document.
///
/// Activates the configured language, installs the log subscriber, and mounts
/// every default behavior on the current system clock.
///
/// ```
/// use borrower_portal::core::settings::PortalSettings;
/// use borrower_portal::dom::{el, Document};
///
/// let mut doc = Document::new();
/// let body = doc.root();
/// doc.append_built(body, el("div").class("auto-refresh-pending").data("has-pending", "true"));
///
/// let page = borrower_portal::boot(doc, PortalSettings::default());
/// assert_eq!(page.behaviors().len(), 1);
/// assert_eq!(page.scheduler().pending(), 1);
/// ```
#[cfg(feature = "widgets")]
pub fn boot(doc: portal_dom::Document, settings: portal_core::settings::PortalSettings) -> portal_widgets::Page {
    portal_core::i18n::activate(&settings.language_code);
    portal_core::logging::setup_logging(&settings);
    let mut page = portal_widgets::Page::new(doc).with_settings(settings);
    let attached = page.mount(&portal_widgets::Registry::default_portal());
    tracing::info!(attached, "borrower portal started");
    page
}
