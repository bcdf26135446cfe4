//! Summary banners derived from decorated tables.
//!
//! [`NotificationBanner`] counts the markers the table decorators leave
//! behind (row urgency classes, pending badges) and renders dismissible
//! alerts above its root:
//!
//! - overdue rows (`.table-danger`) produce a danger banner; failing that,
//!   rows due soon (`.table-warning`) produce a warning banner;
//! - independently, pending extension badges produce an info banner.

use std::any::Any;
use std::fmt;

use portal_core::i18n::ngettext_count;
use portal_dom::{el, Document, NodeId};
use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, PageContext};

/// The severity of a banner. Maps onto the Bootstrap `alert-*` classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotificationLevel {
    Info,
    Warning,
    Danger,
}

impl NotificationLevel {
    /// Returns the CSS tag for this level.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Returns the Font Awesome icon shown in the banner.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Info => "fa-hourglass-half",
            Self::Warning => "fa-clock-o",
            Self::Danger => "fa-exclamation-triangle",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One banner's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn overdue(count: u64) -> Self {
        Self::new(
            NotificationLevel::Danger,
            ngettext_count(
                "You have {count} overdue book. Please return them to avoid additional fines.",
                "You have {count} overdue books. Please return them to avoid additional fines.",
                count,
            ),
        )
    }

    pub fn due_today(count: u64) -> Self {
        Self::new(
            NotificationLevel::Warning,
            ngettext_count(
                "You have {count} book due today. Consider returning or requesting an extension.",
                "You have {count} books due today. Consider returning or requesting an extension.",
                count,
            ),
        )
    }

    pub fn pending_extensions(count: u64) -> Self {
        Self::new(
            NotificationLevel::Info,
            ngettext_count(
                "You have {count} pending extension request. We'll notify you once reviewed.",
                "You have {count} pending extension requests. We'll notify you once reviewed.",
                count,
            ),
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Marker counts read from a decorated root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerCounts {
    pub overdue: u64,
    pub due_today: u64,
    pub pending: u64,
}

impl MarkerCounts {
    /// Counts the markers inside `root`.
    ///
    /// Pending badges only count inside an extension-request table, since
    /// book tables use `badge-warning` for due dates.
    pub fn read(doc: &Document, root: NodeId) -> Self {
        let count = |selector: &str| doc.query_all(root, selector).len() as u64;
        Self {
            overdue: count(".table-danger"),
            due_today: count(".table-warning"),
            pending: if doc.has_class(root, "extension-request-table") {
                count(".badge-warning")
            } else {
                0
            },
        }
    }

    /// Returns the banners these counts call for, most severe first.
    pub fn notifications(self) -> Vec<Notification> {
        let mut banners = Vec::new();
        if self.overdue > 0 {
            banners.push(Notification::overdue(self.overdue));
        } else if self.due_today > 0 {
            banners.push(Notification::due_today(self.due_today));
        }
        if self.pending > 0 {
            banners.push(Notification::pending_extensions(self.pending));
        }
        banners
    }
}

/// Renders `notification` as a dismissible alert right before `anchor`.
pub fn render_notification(doc: &mut Document, anchor: NodeId, notification: &Notification) -> NodeId {
    let level = notification.level;
    doc.insert_built_before(
        anchor,
        el("div")
            .class("alert")
            .class(&format!("alert-{}", level.tag()))
            .class("alert-dismissible fade show smart-notification")
            .attr("role", "alert")
            .child(el("i").class("fa").class(level.icon()).class("me-2"))
            .text(&format!(" {} ", notification.text))
            .child(
                el("button")
                    .attr("type", "button")
                    .class("btn-close")
                    .data("bs-dismiss", "alert")
                    .attr("aria-label", "Close"),
            ),
    )
}

/// Removes the alert a `data-bs-dismiss="alert"` control belongs to.
///
/// Returns `true` if `target` was such a control inside an alert.
pub fn dismiss_alert(doc: &mut Document, target: NodeId) -> bool {
    let is_dismiss = std::iter::once(target)
        .chain(doc.ancestors(target))
        .any(|node| doc.data(node, "bs-dismiss") == Some("alert"));
    if !is_dismiss {
        return false;
    }
    let alert = std::iter::once(target)
        .chain(doc.ancestors(target))
        .find(|&node| doc.has_class(node, "alert"));
    match alert {
        Some(alert) => {
            doc.detach(alert);
            tracing::debug!(alert = alert.index(), "alert dismissed");
            true
        }
        None => false,
    }
}

/// Shows summary banners for a book or extension-request table.
#[derive(Debug)]
pub struct NotificationBanner {
    root: NodeId,
    banners: Vec<NodeId>,
}

impl NotificationBanner {
    pub const fn new(root: NodeId) -> Self {
        Self {
            root,
            banners: Vec::new(),
        }
    }

    /// The banner elements rendered at start.
    pub fn banners(&self) -> &[NodeId] {
        &self.banners
    }

    /// Reads the markers and renders the banners they call for.
    pub fn show_smart_notifications(&mut self, doc: &mut Document) -> usize {
        let counts = MarkerCounts::read(doc, self.root);
        tracing::debug!(?counts, "marker counts");
        for notification in counts.notifications() {
            let banner = render_notification(doc, self.root, &notification);
            self.banners.push(banner);
        }
        self.banners.len()
    }
}

impl Behavior for NotificationBanner {
    fn name(&self) -> &'static str {
        "notification_banner"
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn start(&mut self, ctx: &mut PageContext<'_>) {
        self.show_smart_notifications(ctx.doc);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralization() {
        assert_eq!(
            Notification::overdue(1).text,
            "You have 1 overdue book. Please return them to avoid additional fines."
        );
        assert_eq!(
            Notification::overdue(2).text,
            "You have 2 overdue books. Please return them to avoid additional fines."
        );
        assert_eq!(
            Notification::due_today(3).text,
            "You have 3 books due today. Consider returning or requesting an extension."
        );
        assert_eq!(
            Notification::pending_extensions(1).text,
            "You have 1 pending extension request. We'll notify you once reviewed."
        );
    }

    #[test]
    fn test_danger_wins_over_warning() {
        let counts = MarkerCounts {
            overdue: 1,
            due_today: 4,
            pending: 2,
        };
        let levels: Vec<NotificationLevel> =
            counts.notifications().iter().map(|n| n.level).collect();
        assert_eq!(levels, [NotificationLevel::Danger, NotificationLevel::Info]);
    }

    #[test]
    fn test_warning_without_danger() {
        let counts = MarkerCounts {
            due_today: 2,
            ..MarkerCounts::default()
        };
        assert_eq!(counts.notifications(), vec![Notification::due_today(2)]);
        assert!(MarkerCounts::default().notifications().is_empty());
    }

    #[test]
    fn test_pending_only_counted_in_extension_tables() {
        let mut doc = Document::new();
        let body = doc.root();
        let books = doc.append_built(
            body,
            el("table")
                .class("o_portal_my_doc_table")
                .child(el("tr").child(el("span").class("badge badge-warning"))),
        );
        let requests = doc.append_built(
            body,
            el("table")
                .class("extension-request-table")
                .child(el("tr").child(el("span").class("badge badge-warning"))),
        );
        assert_eq!(MarkerCounts::read(&doc, books).pending, 0);
        assert_eq!(MarkerCounts::read(&doc, requests).pending, 1);
    }

    #[test]
    fn test_render_and_dismiss() {
        let mut doc = Document::new();
        let body = doc.root();
        let table = doc.append_built(body, el("table"));
        let banner = render_notification(&mut doc, table, &Notification::overdue(2));

        assert_eq!(doc.element_children(body), vec![banner, table]);
        assert_eq!(
            doc.attr(banner, "class"),
            Some("alert alert-danger alert-dismissible fade show smart-notification")
        );
        assert_eq!(doc.attr(banner, "role"), Some("alert"));
        assert!(doc.query(banner, "i.fa.fa-exclamation-triangle.me-2").is_some());
        assert!(doc.text_content(banner).contains("You have 2 overdue books."));

        let close = doc.query(banner, "button.btn-close").unwrap();
        assert!(dismiss_alert(&mut doc, close));
        assert!(!doc.is_attached(banner));
        assert!(!dismiss_alert(&mut doc, table));
    }
}
