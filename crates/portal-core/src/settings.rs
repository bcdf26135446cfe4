//! Settings for the borrower portal.
//!
//! This module provides [`PortalSettings`], which holds every tunable the page
//! behaviors read (extension limits, counter sizes, timer delays, urgency
//! windows), and [`LazySettings`], a globally-accessible, lazily-initialized
//! settings instance for binaries that prefer a process-wide configuration.
//!
//! Behaviors always receive settings explicitly through their page, so tests
//! can run with different settings side by side.

use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The complete set of portal settings.
///
/// # Examples
///
/// ```
/// use portal_core::settings::PortalSettings;
///
/// let settings = PortalSettings::default();
/// assert_eq!(settings.max_extension_days, 30);
/// assert_eq!(settings.reason_max_length, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log filter directive (e.g. "info", "`portal_widgets=debug`").
    pub log_level: String,
    /// The language activated for display strings.
    pub language_code: String,

    // ── Extension requests ───────────────────────────────────────────

    /// The longest extension, in days past the current due date.
    pub max_extension_days: i64,
    /// The longest accepted request reason, in characters.
    pub reason_max_length: usize,
    /// Delay between showing the busy indicator and submitting the form.
    pub submit_delay_ms: u64,

    // ── Pending requests ─────────────────────────────────────────────

    /// Delay before a page with pending requests reloads itself.
    pub refresh_delay_secs: u64,

    // ── Urgency windows ──────────────────────────────────────────────

    /// Largest number of days until due that still counts as "Due Soon".
    pub due_soon_days: i64,
    /// Largest number of days until due that still counts as "Due This Week".
    pub due_this_week_days: i64,
}

impl PortalSettings {
    /// Returns the submit delay as a [`Duration`].
    pub const fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// Returns the pending-request reload delay as a [`Duration`].
    pub const fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_delay_secs)
    }
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,
            log_level: "info".to_string(),
            language_code: "en".to_string(),

            // Extension requests
            max_extension_days: 30,
            reason_max_length: 500,
            submit_delay_ms: 500,

            // Pending requests
            refresh_delay_secs: 30,

            // Urgency windows
            due_soon_days: 2,
            due_this_week_days: 7,
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<PortalSettings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: PortalSettings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns the configured settings, or the defaults if none were configured.
    pub fn get(&self) -> &PortalSettings {
        self.inner.get_or_init(PortalSettings::default)
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
