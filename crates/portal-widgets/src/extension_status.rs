//! Decoration of the extension-requests table.

use std::any::Any;

use chrono::NaiveDateTime;
use portal_core::dates::{first_line, parse_datetime};
use portal_dom::{el, Document, NodeId};

use crate::behavior::{Behavior, PageContext};
use crate::humanize::time_ago;

const STATUS_ICON: &str = "status-icon";
const REQUEST_AGE: &str = "request-age";
const REQUEST_AGE_BREAK: &str = "request-age-break";

/// Badge class to icon class. The first matching badge class wins.
const STATUS_ICONS: &[(&str, &str)] = &[
    ("badge-warning", "fa-clock-o"),
    ("badge-success", "fa-check-circle"),
    ("badge-danger", "fa-times-circle"),
];

/// One extension request, read from a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRequestRow {
    pub node: NodeId,
    pub badge: Option<NodeId>,
    pub requested_at: Option<NaiveDateTime>,
}

impl ExtensionRequestRow {
    pub fn hydrate(doc: &Document, row: NodeId) -> Self {
        Self {
            node: row,
            badge: doc.query(row, ".badge"),
            requested_at: doc
                .query(row, "td:nth-child(3)")
                .and_then(|cell| parse_datetime(first_line(&doc.text_content(cell)))),
        }
    }
}

/// Adds status icons and relative request ages to an extension-requests table.
#[derive(Debug)]
pub struct ExtensionStatusDecorator {
    root: NodeId,
}

impl ExtensionStatusDecorator {
    pub const fn new(root: NodeId) -> Self {
        Self { root }
    }

    /// Prepends the status icon to every pending, approved or rejected badge
    /// that does not have one yet. Returns the number of icons added.
    pub fn add_status_icons(&self, doc: &mut Document) -> usize {
        let mut added = 0;
        for badge in doc.query_all(self.root, ".badge") {
            if doc.query(badge, &format!(".{STATUS_ICON}")).is_some() {
                continue;
            }
            let Some((_, icon)) = STATUS_ICONS.iter().find(|(class, _)| doc.has_class(badge, class)) else {
                continue;
            };
            doc.prepend_built(
                badge,
                el("i").class("fa").class(icon).class("me-1").class(STATUS_ICON),
            );
            added += 1;
        }
        tracing::debug!(added, "status icons added");
        added
    }

    /// Appends how long ago each request was made under its date, replacing
    /// any age left by an earlier call. Rows without a parseable date are
    /// skipped. Returns the number of ages rendered.
    pub fn add_timestamps(&self, doc: &mut Document, now: NaiveDateTime) -> usize {
        let mut added = 0;
        for row in doc.query_all(self.root, "tr") {
            let request = ExtensionRequestRow::hydrate(doc, row);
            let Some(cell) = doc.query(row, "td:nth-child(3)") else {
                continue;
            };
            for stale in doc.query_all(cell, &format!(".{REQUEST_AGE}, .{REQUEST_AGE_BREAK}")) {
                doc.detach(stale);
            }
            let Some(requested_at) = request.requested_at else {
                tracing::trace!(row = row.index(), "no parseable request date");
                continue;
            };
            doc.append_built(cell, el("br").class(REQUEST_AGE_BREAK));
            doc.append_built(
                cell,
                el("small")
                    .class("text-muted")
                    .class(REQUEST_AGE)
                    .text(&time_ago(now - requested_at)),
            );
            added += 1;
        }
        tracing::debug!(added, "request ages added");
        added
    }
}

impl Behavior for ExtensionStatusDecorator {
    fn name(&self) -> &'static str {
        "extension_status"
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn start(&mut self, ctx: &mut PageContext<'_>) {
        self.add_status_icons(ctx.doc);
        self.add_timestamps(ctx.doc, ctx.clock.now());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
