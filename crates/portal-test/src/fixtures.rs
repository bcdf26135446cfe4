//! Markup fixtures shaped like the portal's server-rendered pages.
//!
//! Each function returns an [`ElementBuilder`] for one root element, ready
//! to be appended to a document (usually through
//! [`PageBuilder::with`](crate::page_builder::PageBuilder::with)).
//! Book fixtures can also be loaded from JSON.

use portal_core::error::{PortalError, PortalResult};
use portal_dom::{el, ElementBuilder};
use serde::{Deserialize, Serialize};

/// One row of the borrowed-books table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFixture {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub status: String,
    #[serde(default)]
    pub due: String,
    /// Extra line rendered under the due date, like an extension notice.
    #[serde(default)]
    pub note: Option<String>,
}

impl BookFixture {
    pub fn new(title: &str, author: &str, status: &str, due: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            status: status.to_string(),
            due: due.to_string(),
            note: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// The badge class the portal renders for this status.
    pub fn badge_class(&self) -> &'static str {
        let status = self.status.to_lowercase();
        if status.contains("overdue") {
            "badge-danger"
        } else if status.contains("due") {
            "badge-warning"
        } else {
            "badge-success"
        }
    }

    fn row(&self) -> ElementBuilder {
        let mut due_cell = el("td").text(&self.due);
        if let Some(note) = &self.note {
            due_cell = due_cell.child(el("br")).child(el("small").text(note));
        }
        el("tr")
            .child(
                el("td")
                    .text(&self.title)
                    .child(el("br"))
                    .child(el("small").class("text-muted").text(&self.author)),
            )
            .child(
                el("td").child(
                    el("span")
                        .class("badge")
                        .class(self.badge_class())
                        .text(&self.status),
                ),
            )
            .child(due_cell)
    }
}

/// Parses a JSON array of book fixtures.
///
/// ```
/// use portal_test::fixtures::load_books_json;
///
/// let books = load_books_json(r#"[{"title": "Dune", "status": "Borrowed", "due": "2024-01-20"}]"#).unwrap();
/// assert_eq!(books[0].title, "Dune");
/// assert_eq!(books[0].author, "");
/// ```
pub fn load_books_json(json: &str) -> PortalResult<Vec<BookFixture>> {
    serde_json::from_str(json)
        .map_err(|e| PortalError::SerializationError(format!("Failed to parse book fixtures: {e}")))
}

/// The borrowed-books table, with status filter buttons and a sort control
/// in its caption.
pub fn book_table(books: &[BookFixture]) -> ElementBuilder {
    let filter = |status: &str, label: &str| {
        el("button")
            .attr("type", "button")
            .class("btn btn-outline-secondary filter-status")
            .data("status", status)
            .text(label)
    };
    let option = |value: &str, label: &str| el("option").attr("value", value).text(label);

    el("table")
        .class("table o_portal_my_doc_table")
        .child(
            el("caption")
                .child(el("div").class("btn-group").children([
                    filter("all", "All"),
                    filter("overdue", "Overdue"),
                    filter("due", "Due"),
                    filter("borrowed", "Borrowed"),
                ]))
                .child(el("select").class("form-select sort-books").children([
                    option("title", "Title"),
                    option("due_date", "Due date"),
                    option("status", "Status"),
                ])),
        )
        .child(
            el("thead").child(
                el("tr")
                    .child(el("th").text("Book"))
                    .child(el("th").text("Status"))
                    .child(el("th").text("Due Date")),
            ),
        )
        .child(el("tbody").children(books.iter().map(BookFixture::row)))
}

/// One row of the extension-requests table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFixture {
    pub book: String,
    /// `pending`, `approved` or `rejected`.
    pub state: String,
    pub requested_at: String,
}

impl RequestFixture {
    pub fn new(book: &str, state: &str, requested_at: &str) -> Self {
        Self {
            book: book.to_string(),
            state: state.to_string(),
            requested_at: requested_at.to_string(),
        }
    }

    fn badge(&self) -> ElementBuilder {
        let (class, label) = match self.state.as_str() {
            "pending" => ("badge-warning", "Pending Review"),
            "approved" => ("badge-success", "Approved"),
            "rejected" => ("badge-danger", "Rejected"),
            _ => ("badge-secondary", "Unknown"),
        };
        el("span").class("badge").class(class).text(label)
    }
}

/// The extension-requests table.
pub fn extension_request_table(requests: &[RequestFixture]) -> ElementBuilder {
    el("table")
        .class("table extension-request-table")
        .child(
            el("thead").child(
                el("tr")
                    .child(el("th").text("Book"))
                    .child(el("th").text("Status"))
                    .child(el("th").text("Requested")),
            ),
        )
        .child(el("tbody").children(requests.iter().map(|request| {
            el("tr")
                .child(el("td").text(&request.book))
                .child(el("td").child(request.badge()))
                .child(el("td").text(&request.requested_at))
        })))
}

/// The extension-request form. `current_due` fills `data-current-due-date`.
pub fn extension_form(current_due: Option<&str>) -> ElementBuilder {
    let mut date_input = el("input")
        .attr("type", "date")
        .class("form-control")
        .attr("name", "requested_expiry_date");
    if let Some(due) = current_due {
        date_input = date_input.data("current-due-date", due);
    }
    el("form")
        .id("extension_request_form")
        .class("s_website_form")
        .attr("action", "/my/extension/request")
        .attr("method", "post")
        .child(el("input").attr("type", "hidden").attr("name", "book_id").attr("value", "42"))
        .child(el("div").class("mb-3").child(date_input))
        .child(
            el("p")
                .text("Extension: ")
                .child(el("span").class("extension-days-display").text("0"))
                .text(" days"),
        )
        .child(
            el("div")
                .class("mb-3")
                .child(el("textarea").class("form-control").attr("name", "request_reason"))
                .child(el("small").class("char-count").text("0/500")),
        )
        .child(
            el("button")
                .attr("type", "submit")
                .class("btn btn-primary")
                .text("Request Extension"),
        )
}

/// The profile form, pre-filled with the given values.
pub fn profile_form(name: &str, email: &str, phone: &str) -> ElementBuilder {
    let input = |field: &str, kind: &str, value: &str| {
        el("input")
            .attr("type", kind)
            .class("form-control")
            .attr("name", field)
            .attr("value", value)
    };
    el("form")
        .class("s_website_form")
        .attr("action", "/my/profile/update")
        .attr("method", "post")
        .child(el("div").class("mb-3").child(input("name", "text", name)))
        .child(el("div").class("mb-3").child(input("email", "email", email)))
        .child(el("div").class("mb-3").child(input("phone", "tel", phone)))
        .child(el("button").attr("type", "submit").class("btn btn-primary").text("Save"))
}

/// The pending-requests container. `None` omits the flag.
pub fn pending_container(has_pending: Option<&str>) -> ElementBuilder {
    let container = el("div").class("auto-refresh-pending");
    match has_pending {
        Some(flag) => container.data("has-pending", flag),
        None => container,
    }
}
