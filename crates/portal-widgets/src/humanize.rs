//! Human-friendly elapsed-time strings.

use chrono::Duration;
use portal_core::i18n::{gettext, ngettext_count};

/// Formats an elapsed time as "N day(s) ago", "N hour(s) ago" or "Just now".
///
/// Whole days win over hours; anything under an hour is "Just now". The sign
/// of `elapsed` is ignored, so a timestamp slightly in the future reads the
/// same as one slightly in the past.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use portal_widgets::humanize::time_ago;
///
/// assert_eq!(time_ago(Duration::days(3)), "3 days ago");
/// assert_eq!(time_ago(Duration::hours(1)), "1 hour ago");
/// assert_eq!(time_ago(Duration::minutes(59)), "Just now");
/// ```
pub fn time_ago(elapsed: Duration) -> String {
    let days = elapsed.num_days().unsigned_abs();
    let hours = elapsed.num_hours().unsigned_abs();

    if days > 0 {
        ngettext_count("{count} day ago", "{count} days ago", days)
    } else if hours > 0 {
        ngettext_count("{count} hour ago", "{count} hours ago", hours)
    } else {
        gettext("Just now")
    }
}
