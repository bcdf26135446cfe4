//! Reloads the page while extension requests are pending.

use std::any::Any;

use portal_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::timers::{TimerAction, TimerId};

/// Interprets a `data-*` flag the way the portal templates render booleans.
///
/// Absent, empty, `false`, `0`, `none` and `null` are false; anything else
/// is true.
///
/// ```
/// use portal_widgets::pending_poller::is_truthy_flag;
///
/// assert!(is_truthy_flag(Some("True")));
/// assert!(is_truthy_flag(Some("3")));
/// assert!(!is_truthy_flag(Some("False")));
/// assert!(!is_truthy_flag(None));
/// ```
pub fn is_truthy_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim().to_ascii_lowercase();
        !matches!(v.as_str(), "" | "false" | "0" | "none" | "null")
    })
}

/// Schedules one page reload when the root says requests are pending.
#[derive(Debug)]
pub struct PendingPoller {
    root: NodeId,
    reload: Option<TimerId>,
}

impl PendingPoller {
    pub const fn new(root: NodeId) -> Self {
        Self { root, reload: None }
    }

    /// The scheduled reload, if any.
    pub const fn reload_timer(&self) -> Option<TimerId> {
        self.reload
    }
}

impl Behavior for PendingPoller {
    fn name(&self) -> &'static str {
        "pending_poller"
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn start(&mut self, ctx: &mut PageContext<'_>) {
        if !is_truthy_flag(ctx.doc.data(self.root, "has-pending")) {
            tracing::debug!("nothing pending, no reload scheduled");
            return;
        }
        let delay = ctx.settings.refresh_delay();
        self.reload = Some(ctx.scheduler.schedule_once(delay, TimerAction::ReloadPage));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_flags() {
        for value in ["", "false", "FALSE", "0", "none", "None", "null", " 0 "] {
            assert!(!is_truthy_flag(Some(value)), "{value:?}");
        }
    }

    #[test]
    fn test_truthy_flags() {
        for value in ["true", "1", "yes", "pending"] {
            assert!(is_truthy_flag(Some(value)), "{value:?}");
        }
    }
}
