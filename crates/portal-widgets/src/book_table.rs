//! Decoration, filtering, searching and sorting of the borrowed-books table.
//!
//! Each operation hydrates a [`BookRow`] per `tbody tr` from the current
//! markup, works on those records, and writes the outcome back to the rows.
//! The filter and search operations each re-evaluate every row on their own:
//! whichever ran last decides which rows are shown.
//!
//! Expected row layout:
//!
//! | column | content |
//! |---|---|
//! | 1 | title, with the author in a `<small>` |
//! | 2 | status `.badge` |
//! | 3 | due date on the first line, optional notes after a `<br>` |

use std::any::Any;
use std::cmp::Ordering;

use chrono::NaiveDate;
use portal_core::dates::{first_line, parse_date};
use portal_core::i18n::gettext;
use portal_core::settings::PortalSettings;
use portal_dom::{el, Document, NodeId};
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::behavior::{Behavior, Event, EventBinding, EventKind, EventResult, PageContext};

const URGENCY_INDICATOR: &str = "urgency-indicator";
const URGENCY_BREAK: &str = "urgency-break";
const URGENCY_ROW_CLASSES: [&str; 3] = ["table-danger", "table-warning", "table-info"];

/// One borrowed book, read from a table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRow {
    #[serde(skip)]
    pub node: NodeId,
    pub title: String,
    pub author: String,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub visible: bool,
}

impl BookRow {
    /// Reads a row's fields from its cells.
    pub fn hydrate(doc: &Document, row: NodeId) -> Self {
        let title_cell = doc.query(row, "td:first-child");
        let title = title_cell
            .map(|cell| collapse_whitespace(&text_without(doc, cell, "small")))
            .unwrap_or_default();
        let author = title_cell
            .and_then(|cell| doc.query(cell, "small"))
            .map(|small| collapse_whitespace(&doc.text_content(small)))
            .unwrap_or_default();
        let status = doc
            .query(row, ".badge")
            .map(|badge| doc.text_content(badge).trim().to_string())
            .unwrap_or_default();
        let due_date = doc
            .query(row, "td:nth-child(3)")
            .and_then(|cell| parse_date(first_line(&doc.text_content(cell))));

        Self {
            node: row,
            title,
            author,
            status,
            due_date,
            visible: doc.is_displayed(row),
        }
    }
}

/// Reads every body row of the table under `root`, in document order.
pub fn hydrate_rows(doc: &Document, root: NodeId) -> Vec<BookRow> {
    doc.query_all(root, "tbody tr")
        .into_iter()
        .map(|row| BookRow::hydrate(doc, row))
        .collect()
}

/// How close a due date is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Urgency {
    Overdue,
    DueToday,
    DueSoon,
    DueThisWeek,
}

impl Urgency {
    /// The untranslated indicator label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::DueToday => "Due Today",
            Self::DueSoon => "Due Soon",
            Self::DueThisWeek => "Due This Week",
        }
    }

    /// Icon classes of the indicator.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Overdue => "fa-exclamation-triangle text-danger",
            Self::DueToday | Self::DueSoon => "fa-clock-o text-warning",
            Self::DueThisWeek => "fa-calendar text-info",
        }
    }

    /// The class added to the row.
    pub const fn row_class(self) -> &'static str {
        match self {
            Self::Overdue => "table-danger",
            Self::DueToday | Self::DueSoon => "table-warning",
            Self::DueThisWeek => "table-info",
        }
    }
}

/// Classifies a due date relative to `today`.
///
/// ```
/// use chrono::NaiveDate;
/// use portal_core::settings::PortalSettings;
/// use portal_widgets::book_table::{classify_urgency, Urgency};
///
/// let settings = PortalSettings::default();
/// let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let due = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
/// assert_eq!(classify_urgency(due, today, &settings), Some(Urgency::DueSoon));
/// ```
pub fn classify_urgency(due: NaiveDate, today: NaiveDate, settings: &PortalSettings) -> Option<Urgency> {
    let days = (due - today).num_days();
    match days {
        d if d < 0 => Some(Urgency::Overdue),
        0 => Some(Urgency::DueToday),
        d if d <= settings.due_soon_days => Some(Urgency::DueSoon),
        d if d <= settings.due_this_week_days => Some(Urgency::DueThisWeek),
        _ => None,
    }
}

/// Returns `true` if the row passes the status filter.
///
/// `"all"` passes every row; any other status is a case-insensitive
/// substring of the badge text.
pub fn matches_status(row: &BookRow, status: &str) -> bool {
    status == "all" || row.status.to_lowercase().contains(&status.to_lowercase())
}

/// Returns `true` if the title or author contains `term`, ignoring case.
pub fn matches_search(row: &BookRow, term: &str) -> bool {
    let term = term.to_lowercase();
    row.title.to_lowercase().contains(&term) || row.author.to_lowercase().contains(&term)
}

/// The columns the table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortKey {
    Title,
    DueDate,
    Status,
}

impl SortKey {
    /// Parses the value of the sort control. Unknown keys yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "due_date" => Some(Self::DueDate),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Sorts rows in place. The sort is stable.
///
/// Text columns collate ignoring case and accents, so "Éclair" sorts among
/// the E's; dates compare chronologically with unparseable dates last.
/// Title sorting keys on the title alone, so equal titles keep their
/// current order rather than falling back to the author.
pub fn sort_rows(rows: &mut [BookRow], key: SortKey) {
    match key {
        SortKey::Title => rows.sort_by(|a, b| collate(&a.title, &b.title)),
        SortKey::Status => rows.sort_by(|a, b| collate(&a.status, &b.status)),
        SortKey::DueDate => rows.sort_by_key(|row| (row.due_date.is_none(), row.due_date)),
    }
}

fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

/// Lowercased text with diacritics stripped.
fn collation_key(text: &str) -> String {
    text.nfd()
        .filter(|&c| !is_combining_mark(c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn badge_says_overdue(doc: &Document, row: NodeId) -> bool {
    doc.query(row, ".badge")
        .is_some_and(|badge| doc.text_content(badge).trim().to_lowercase().contains("overdue"))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of `node`, skipping subtrees rooted at `skip_tag` elements.
fn text_without(doc: &Document, node: NodeId, skip_tag: &str) -> String {
    if let Some(text) = doc.text(node) {
        return text.to_string();
    }
    match doc.tag(node) {
        Some(tag) if tag == skip_tag => String::new(),
        Some("br") => "\n".to_string(),
        _ => doc
            .children(node)
            .iter()
            .map(|&child| text_without(doc, child, skip_tag))
            .collect(),
    }
}

/// Enhances a borrowed-books table.
#[derive(Debug)]
pub struct BookTableEnhancer {
    root: NodeId,
    search_box: Option<NodeId>,
}

const EVENTS: &[EventBinding] = &[
    EventBinding::delegated(EventKind::Click, ".filter-status", "filter_status"),
    EventBinding::delegated(EventKind::Input, ".search-books", "search_books"),
    EventBinding::delegated(EventKind::Change, ".sort-books", "sort_books"),
];

impl BookTableEnhancer {
    pub const fn new(root: NodeId) -> Self {
        Self {
            root,
            search_box: None,
        }
    }

    /// The search box inserted by [`initialize_search_box`](Self::initialize_search_box).
    pub const fn search_box(&self) -> Option<NodeId> {
        self.search_box
    }

    /// Inserts a search input above the table unless one already exists.
    ///
    /// A search box left above the table by an earlier enhancer is adopted
    /// instead of duplicated.
    pub fn initialize_search_box(&mut self, doc: &mut Document) {
        let inserted = self.search_box.is_some_and(|group| doc.parent(group).is_some());
        if inserted || doc.query(self.root, ".search-books").is_some() {
            return;
        }
        if let Some(existing) = Self::existing_search_box(doc, self.root) {
            self.search_box = Some(existing);
            return;
        }
        let placeholder = gettext("Search books...");
        let group = doc.insert_built_before(
            self.root,
            el("div")
                .class("input-group mb-3")
                .child(
                    el("input")
                        .attr("type", "text")
                        .class("form-control search-books")
                        .attr("placeholder", &placeholder),
                )
                .child(
                    el("div")
                        .class("input-group-append")
                        .child(el("span").class("input-group-text").child(el("i").class("fa fa-search"))),
                ),
        );
        if doc.parent(group).is_some() {
            self.search_box = Some(group);
        }
    }

    /// Searches the siblings above `root`, up to the previous table.
    fn existing_search_box(doc: &Document, root: NodeId) -> Option<NodeId> {
        doc.previous_element_siblings(root)
            .into_iter()
            .take_while(|&sibling| doc.tag(sibling) != Some("table"))
            .find(|&sibling| doc.has_class(sibling, "input-group") && doc.query(sibling, ".search-books").is_some())
    }

    /// Marks rows whose status badge says "overdue". Returns the number marked.
    pub fn highlight_overdue(&self, doc: &mut Document) -> usize {
        let mut marked = 0;
        for row in doc.query_all(self.root, "tr") {
            if badge_says_overdue(doc, row) {
                doc.add_class(row, "table-danger");
                marked += 1;
            }
        }
        tracing::debug!(marked, "overdue rows highlighted");
        marked
    }

    /// Appends an urgency indicator to each due-date cell, replacing any
    /// indicator left by an earlier call. Returns the number of indicators.
    ///
    /// Row urgency classes are recomputed too. A row keeps `table-danger`
    /// while its badge says "overdue".
    pub fn add_urgency_indicators(
        &self,
        doc: &mut Document,
        today: NaiveDate,
        settings: &PortalSettings,
    ) -> usize {
        let mut added = 0;
        for row in hydrate_rows(doc, self.root) {
            let Some(cell) = doc.query(row.node, "td:nth-child(3)") else {
                continue;
            };
            for stale in doc.query_all(cell, &format!(".{URGENCY_INDICATOR}, .{URGENCY_BREAK}")) {
                doc.detach(stale);
            }
            for class in URGENCY_ROW_CLASSES {
                doc.remove_class(row.node, class);
            }
            if badge_says_overdue(doc, row.node) {
                doc.add_class(row.node, "table-danger");
            }
            let Some(due) = row.due_date else {
                tracing::trace!(row = row.node.index(), "no parseable due date");
                continue;
            };
            let Some(urgency) = classify_urgency(due, today, settings) else {
                continue;
            };
            doc.add_class(row.node, urgency.row_class());
            doc.append_built(cell, el("br").class(URGENCY_BREAK));
            doc.append_built(
                cell,
                el("small")
                    .class(URGENCY_INDICATOR)
                    .child(el("i").class("fa").class(urgency.icon()))
                    .text(&format!(" {}", gettext(urgency.label()))),
            );
            added += 1;
        }
        tracing::debug!(added, "urgency indicators added");
        added
    }

    /// Shows the rows whose status matches and hides the rest, then moves the
    /// `active` marker to the filter button for `status`.
    pub fn filter_by_status(&self, doc: &mut Document, status: &str) {
        for row in hydrate_rows(doc, self.root) {
            doc.set_displayed(row.node, matches_status(&row, status));
        }
        for button in doc.query_all(self.root, ".filter-status") {
            let active = doc.data(button, "status") == Some(status);
            doc.toggle_class(button, "active", active);
        }
    }

    /// Shows the rows whose title or author contains `term` and hides the rest.
    pub fn search_books(&self, doc: &mut Document, term: &str) {
        for row in hydrate_rows(doc, self.root) {
            doc.set_displayed(row.node, matches_search(&row, term));
        }
    }

    /// Reorders the body rows by `key`. Unknown keys leave the order alone.
    pub fn sort_books(&self, doc: &mut Document, key: &str) {
        let Some(sort_key) = SortKey::from_name(key) else {
            tracing::debug!(key, "unknown sort key");
            return;
        };
        let Some(tbody) = doc.query(self.root, "tbody") else {
            return;
        };
        let mut rows = hydrate_rows(doc, self.root);
        sort_rows(&mut rows, sort_key);
        for row in rows {
            doc.append_child(tbody, row.node);
        }
    }
}

impl Behavior for BookTableEnhancer {
    fn name(&self) -> &'static str {
        "book_table"
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn scopes(&self) -> Vec<NodeId> {
        std::iter::once(self.root).chain(self.search_box).collect()
    }

    fn start(&mut self, ctx: &mut PageContext<'_>) {
        self.initialize_search_box(ctx.doc);
        self.highlight_overdue(ctx.doc);
        self.add_urgency_indicators(ctx.doc, ctx.clock.today(), ctx.settings);
    }

    fn events(&self) -> &'static [EventBinding] {
        EVENTS
    }

    fn handle(&mut self, ctx: &mut PageContext<'_>, binding: &EventBinding, event: &Event) -> EventResult {
        let control = event.current_target;
        match binding.handler {
            "filter_status" => {
                let status = ctx.doc.data(control, "status").unwrap_or_default().to_string();
                self.filter_by_status(ctx.doc, &status);
            }
            "search_books" => {
                let term = ctx.doc.value(control).to_lowercase();
                self.search_books(ctx.doc, &term);
            }
            "sort_books" => {
                let key = ctx.doc.value(control);
                self.sort_books(ctx.doc, &key);
            }
            _ => {}
        }
        EventResult::proceed()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use portal_dom::ElementBuilder;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn row(title: &str, status: &str, due: Option<&str>) -> BookRow {
        BookRow {
            node: Document::new().root(),
            title: title.to_string(),
            author: String::new(),
            status: status.to_string(),
            due_date: due.map(date),
            visible: true,
        }
    }

    #[test]
    fn test_classify_urgency() {
        let settings = PortalSettings::default();
        let today = date("2024-01-10");
        let classify = |due: &str| classify_urgency(date(due), today, &settings);
        assert_eq!(classify("2024-01-09"), Some(Urgency::Overdue));
        assert_eq!(classify("2024-01-10"), Some(Urgency::DueToday));
        assert_eq!(classify("2024-01-11"), Some(Urgency::DueSoon));
        assert_eq!(classify("2024-01-12"), Some(Urgency::DueSoon));
        assert_eq!(classify("2024-01-13"), Some(Urgency::DueThisWeek));
        assert_eq!(classify("2024-01-17"), Some(Urgency::DueThisWeek));
        assert_eq!(classify("2024-01-18"), None);
    }

    #[test]
    fn test_classify_respects_settings() {
        let settings = PortalSettings {
            due_soon_days: 4,
            ..PortalSettings::default()
        };
        let today = date("2024-01-10");
        assert_eq!(
            classify_urgency(date("2024-01-14"), today, &settings),
            Some(Urgency::DueSoon)
        );
    }

    #[test]
    fn test_matches_status() {
        let overdue = row("Dune", "Overdue", None);
        assert!(matches_status(&overdue, "all"));
        assert!(matches_status(&overdue, "overdue"));
        assert!(matches_status(&overdue, "OVER"));
        assert!(!matches_status(&overdue, "borrowed"));
    }

    #[test]
    fn test_matches_search() {
        let mut byron = row("Don Juan", "Borrowed", None);
        byron.author = "Lord Byron".to_string();
        assert!(matches_search(&byron, "lord"));
        assert!(matches_search(&byron, "juan"));
        assert!(matches_search(&byron, ""));
        assert!(!matches_search(&byron, "rings"));
    }

    #[test]
    fn test_sort_title_is_case_insensitive_and_stable() {
        let mut rows = vec![
            row("Zoo", "", None),
            row("Apple", "", None),
            row("apple", "", None),
        ];
        sort_rows(&mut rows, SortKey::Title);
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Apple", "apple", "Zoo"]);
    }

    #[test]
    fn test_sort_title_ignores_accents() {
        let mut rows = vec![
            row("Zoo", "", None),
            row("Éclair", "", None),
            row("apple", "", None),
            row("Eclair", "", None),
        ];
        sort_rows(&mut rows, SortKey::Title);
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["apple", "Eclair", "Éclair", "Zoo"]);
    }

    #[test]
    fn test_sort_status_ignores_accents() {
        let mut rows = vec![
            row("a", "Renouvelé", None),
            row("b", "Échu", None),
            row("c", "Emprunté", None),
        ];
        sort_rows(&mut rows, SortKey::Status);
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["b", "c", "a"]);
    }

    #[test]
    fn test_sort_due_date_puts_unparseable_last() {
        let mut rows = vec![
            row("a", "", None),
            row("b", "", Some("2024-03-01")),
            row("c", "", Some("2024-01-01")),
        ];
        sort_rows(&mut rows, SortKey::DueDate);
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["c", "b", "a"]);
    }

    #[test]
    fn test_sort_key_names() {
        assert_eq!(SortKey::from_name("due_date"), Some(SortKey::DueDate));
        assert_eq!(SortKey::from_name("author"), None);
    }

    #[test]
    fn test_hydrate_row() {
        let mut doc = Document::new();
        let tr = doc.build(
            el("tr")
                .child(el("td").text(" The Lord of the Rings ").child(el("br")).child(el("small").text("J. R. R. Tolkien")))
                .child(el("td").child(el("span").class("badge badge-danger").text(" Overdue ")))
                .child(el("td").text("2024-01-09").child(el("br")).child(el("small").text("Extended once"))),
        );
        let book = BookRow::hydrate(&doc, tr);
        assert_eq!(book.title, "The Lord of the Rings");
        assert_eq!(book.author, "J. R. R. Tolkien");
        assert_eq!(book.status, "Overdue");
        assert_eq!(book.due_date, Some(date("2024-01-09")));
        assert!(book.visible);
    }

    #[test]
    fn test_hydrate_tolerates_missing_cells() {
        let mut doc = Document::new();
        let tr = doc.build(el("tr").child(el("td").text("Only a title")));
        let book = BookRow::hydrate(&doc, tr);
        assert_eq!(book.title, "Only a title");
        assert_eq!(book.status, "");
        assert_eq!(book.due_date, None);
    }

    fn book_tr(status: &str, due: &str) -> ElementBuilder {
        el("tr").children([
            el("td").text("Dune"),
            el("td").child(el("span").class("badge").text(status)),
            el("td").text(due),
        ])
    }

    #[test]
    fn test_urgency_row_classes_follow_latest_run() {
        let mut doc = Document::new();
        let table = doc.build(el("table").child(el("tbody").children([
            book_tr("Borrowed", "2024-01-12"),
            book_tr("Overdue", "2024-01-20"),
        ])));
        let rows = doc.query_all(table, "tbody tr");
        let settings = PortalSettings::default();
        let enhancer = BookTableEnhancer::new(table);

        enhancer.highlight_overdue(&mut doc);
        enhancer.add_urgency_indicators(&mut doc, date("2024-01-10"), &settings);
        assert!(doc.has_class(rows[0], "table-warning"));
        assert!(doc.has_class(rows[1], "table-danger"));

        enhancer.add_urgency_indicators(&mut doc, date("2024-01-15"), &settings);
        assert!(doc.has_class(rows[0], "table-danger"));
        assert!(!doc.has_class(rows[0], "table-warning"));
        assert!(doc.has_class(rows[1], "table-danger"));
        assert!(doc.has_class(rows[1], "table-info"));

        enhancer.add_urgency_indicators(&mut doc, date("2024-01-01"), &settings);
        assert!(!doc.has_class(rows[0], "table-danger"));
        assert!(!doc.has_class(rows[1], "table-info"));
        assert!(doc.has_class(rows[1], "table-danger"));
        assert_eq!(doc.query_all(table, ".urgency-indicator").len(), 0);
    }
}
