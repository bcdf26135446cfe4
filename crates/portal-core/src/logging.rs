//! Logging integration for the borrower portal.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`PortalSettings`](crate::settings::PortalSettings) and for creating
//! per-behavior spans.

use crate::settings::PortalSettings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info",
/// "`portal_widgets=trace`"). In debug mode a pretty, human-readable format is
/// used; otherwise a structured JSON format is used. Calling this more than
/// once keeps the first subscriber.
pub fn setup_logging(settings: &PortalSettings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one page behavior bound to a root element.
///
/// Enter this span while a behavior starts or handles an event so that every
/// log entry it emits carries the behavior name and root node.
///
/// # Examples
///
/// ```
/// use portal_core::logging::behavior_span;
///
/// let span = behavior_span("book_table", 3);
/// let _guard = span.enter();
/// tracing::debug!("decorating rows");
/// ```
pub fn behavior_span(behavior: &str, root: usize) -> tracing::Span {
    tracing::info_span!("behavior", name = behavior, root)
}
