//! Integration tests for the borrowed-books table: urgency markers, the
//! status filter, search, sort, and the summary banner above the table.

use portal_core::dates::parse_date;
use portal_test::assertions::{
    assert_count, assert_has_class, assert_lacks_class, row_titles, visible_titles,
};
use portal_test::fixtures::{book_table, BookFixture};
use portal_test::{PageBuilder, TestPage};
use portal_widgets::book_table::{BookTableEnhancer, Urgency};

// ── Helpers ─────────────────────────────────────────────────────────

fn library() -> Vec<BookFixture> {
    vec![
        BookFixture::new("The Lord of the Rings", "J.R.R. Tolkien", "Overdue", "2024-01-09"),
        BookFixture::new("Don Juan", "Lord Byron", "Borrowed", "2024-01-10"),
        BookFixture::new("Dune", "Frank Herbert", "Borrowed", "2024-01-12"),
        BookFixture::new("emma", "Jane Austen", "Borrowed", "2024-01-16")
            .with_note("Extended once"),
        BookFixture::new("Anathem", "Neal Stephenson", "Borrowed", "2024-01-20"),
    ]
}

fn mounted() -> TestPage {
    PageBuilder::new().today("2024-01-10").with(book_table(&library())).build()
}

fn row_of(page: &TestPage, title: &str) -> portal_dom::NodeId {
    page.find_all("tbody tr")
        .into_iter()
        .find(|&row| page.doc().text_content(row).contains(title))
        .unwrap_or_else(|| panic!("no row for {title}"))
}

fn indicator_text(page: &TestPage, title: &str) -> Option<String> {
    let row = row_of(page, title);
    page.doc()
        .query(row, ".urgency-indicator")
        .map(|node| page.doc().text_content(node).trim().to_string())
}

// ═════════════════════════════════════════════════════════════════════
// 1. Urgency classification on mount
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_urgency_indicators_by_due_date() {
    let page = mounted();

    assert_eq!(indicator_text(&page, "The Lord of the Rings").as_deref(), Some("Overdue"));
    assert_eq!(indicator_text(&page, "Don Juan").as_deref(), Some("Due Today"));
    assert_eq!(indicator_text(&page, "Dune").as_deref(), Some("Due Soon"));
    assert_eq!(indicator_text(&page, "emma").as_deref(), Some("Due This Week"));
    assert_eq!(indicator_text(&page, "Anathem"), None);
}

#[test]
fn test_urgency_row_classes() {
    let page = mounted();
    let doc = page.doc();

    assert_has_class(doc, row_of(&page, "The Lord of the Rings"), Urgency::Overdue.row_class());
    assert_has_class(doc, row_of(&page, "Don Juan"), "table-warning");
    assert_has_class(doc, row_of(&page, "Dune"), "table-warning");
    assert_has_class(doc, row_of(&page, "emma"), "table-info");
    let quiet = row_of(&page, "Anathem");
    for class in ["table-danger", "table-warning", "table-info"] {
        assert_lacks_class(doc, quiet, class);
    }
}

#[test]
fn test_due_date_with_note_reads_first_line() {
    let page = mounted();
    let row = row_of(&page, "emma");
    let text = page.doc().text_content(row);
    assert!(text.contains("Extended once"));
    assert_eq!(indicator_text(&page, "emma").as_deref(), Some("Due This Week"));
}

#[test]
fn test_unparseable_due_date_gets_no_indicator() {
    let books = [BookFixture::new("Mystery", "", "Borrowed", "soon-ish")];
    let page = PageBuilder::new().today("2024-01-10").with(book_table(&books)).build();
    let table = page.root(0);
    assert_count(page.doc(), table, ".urgency-indicator", 0);
}

// ═════════════════════════════════════════════════════════════════════
// 2. Idempotent decoration
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_repeated_decoration_adds_nothing() {
    let mut page = mounted();
    let table = page.root(0);
    let today = parse_date("2024-01-10").unwrap();
    let settings = page.settings().clone();

    let mut enhancer = BookTableEnhancer::new(table);
    let doc = page.document_mut();
    enhancer.initialize_search_box(doc);
    enhancer.initialize_search_box(doc);
    enhancer.add_urgency_indicators(doc, today, &settings);
    enhancer.add_urgency_indicators(doc, today, &settings);

    let body = page.doc().root();
    assert_count(page.doc(), body, ".search-books", 1);
    assert_count(page.doc(), table, ".urgency-indicator", 4);
    assert_count(page.doc(), table, ".urgency-break", 4);
}

#[test]
fn test_search_box_inserted_above_table() {
    let page = mounted();
    let enhancer = page.behavior::<BookTableEnhancer>().unwrap();
    let group = enhancer.search_box().unwrap();
    let doc = page.doc();
    assert!(!doc.contains(page.root(0), group));
    let input = doc.query(group, ".search-books").unwrap();
    assert_eq!(doc.attr(input, "placeholder"), Some("Search books..."));
}

// ═════════════════════════════════════════════════════════════════════
// 3. Filter, search, sort
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_filter_by_status_click() {
    let mut page = mounted();
    let table = page.root(0);
    let overdue = page.find(r#".filter-status[data-status="overdue"]"#);
    let all = page.find(r#".filter-status[data-status="all"]"#);

    assert!(page.click(overdue));
    assert_eq!(visible_titles(page.doc(), table), vec!["The Lord of the Rings"]);
    assert_has_class(page.doc(), overdue, "active");
    assert_lacks_class(page.doc(), all, "active");

    page.click(all);
    assert_eq!(visible_titles(page.doc(), table).len(), 5);
    assert_has_class(page.doc(), all, "active");
    assert_lacks_class(page.doc(), overdue, "active");
}

#[test]
fn test_filter_borrowed_is_case_insensitive() {
    let mut page = mounted();
    let table = page.root(0);
    let borrowed = page.find(r#".filter-status[data-status="borrowed"]"#);
    page.click(borrowed);
    assert_eq!(
        visible_titles(page.doc(), table),
        vec!["Don Juan", "Dune", "emma", "Anathem"]
    );
}

#[test]
fn test_search_matches_title_or_author() {
    let mut page = mounted();
    let table = page.root(0);
    let search = page.find(".search-books");

    page.input(search, "LORD");
    assert_eq!(
        visible_titles(page.doc(), table),
        vec!["The Lord of the Rings", "Don Juan"]
    );

    page.input(search, "");
    assert_eq!(visible_titles(page.doc(), table).len(), 5);
}

#[test]
fn test_filter_after_search_replaces_visibility() {
    let mut page = mounted();
    let table = page.root(0);
    let search = page.find(".search-books");
    let overdue = page.find(r#".filter-status[data-status="overdue"]"#);

    page.input(search, "dune");
    assert_eq!(visible_titles(page.doc(), table), vec!["Dune"]);

    page.click(overdue);
    assert_eq!(visible_titles(page.doc(), table), vec!["The Lord of the Rings"]);
}

#[test]
fn test_search_after_filter_replaces_visibility() {
    let mut page = mounted();
    let table = page.root(0);
    let search = page.find(".search-books");
    let overdue = page.find(r#".filter-status[data-status="overdue"]"#);

    page.click(overdue);
    assert_eq!(visible_titles(page.doc(), table), vec!["The Lord of the Rings"]);

    page.input(search, "lord");
    assert_eq!(
        visible_titles(page.doc(), table),
        vec!["The Lord of the Rings", "Don Juan"]
    );
    assert_has_class(page.doc(), overdue, "active");
}

#[test]
fn test_sort_by_title_ignores_accents() {
    let books = [
        BookFixture::new("Zazie dans le métro", "Raymond Queneau", "Borrowed", "2024-01-20"),
        BookFixture::new("Émile", "Rousseau", "Borrowed", "2024-01-20"),
        BookFixture::new("Candide", "Voltaire", "Borrowed", "2024-01-20"),
    ];
    let mut page = PageBuilder::new().today("2024-01-10").with(book_table(&books)).build();
    let table = page.root(0);
    let sort = page.find(".sort-books");

    page.change(sort, "title");
    assert_eq!(
        row_titles(page.doc(), table),
        vec!["Candide", "Émile", "Zazie dans le métro"]
    );
}

#[test]
fn test_search_without_match_hides_all() {
    let mut page = mounted();
    let table = page.root(0);
    let search = page.find(".search-books");
    page.input(search, "zzz");
    assert!(visible_titles(page.doc(), table).is_empty());
}

#[test]
fn test_sort_by_title_and_due_date() {
    let mut page = mounted();
    let table = page.root(0);
    let sort = page.find(".sort-books");

    page.change(sort, "title");
    assert_eq!(
        row_titles(page.doc(), table),
        vec!["Anathem", "Don Juan", "Dune", "emma", "The Lord of the Rings"]
    );

    page.change(sort, "due_date");
    assert_eq!(
        row_titles(page.doc(), table),
        vec!["The Lord of the Rings", "Don Juan", "Dune", "emma", "Anathem"]
    );
}

#[test]
fn test_sort_unknown_key_keeps_order() {
    let mut page = mounted();
    let table = page.root(0);
    let before = row_titles(page.doc(), table);
    let sort = page.find(".sort-books");
    page.change(sort, "popularity");
    assert_eq!(row_titles(page.doc(), table), before);
}

#[test]
fn test_sort_keeps_hidden_rows_hidden() {
    let mut page = mounted();
    let table = page.root(0);
    let overdue = page.find(r#".filter-status[data-status="overdue"]"#);
    page.click(overdue);
    let sort = page.find(".sort-books");
    page.change(sort, "title");
    assert_eq!(visible_titles(page.doc(), table), vec!["The Lord of the Rings"]);
}

// ═════════════════════════════════════════════════════════════════════
// 4. Summary banner
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_overdue_banner_wins_over_due_today() {
    let page = mounted();
    let alerts = page.find_all(".smart-notification");
    assert_eq!(alerts.len(), 1);
    let doc = page.doc();
    assert_has_class(doc, alerts[0], "alert-danger");
    assert!(doc
        .text_content(alerts[0])
        .contains("You have 1 overdue book. Please return them to avoid additional fines."));
}

#[test]
fn test_due_today_banner_without_overdue() {
    let books = [
        BookFixture::new("Dune", "", "Borrowed", "2024-01-10"),
        BookFixture::new("Emma", "", "Borrowed", "2024-01-11"),
    ];
    let page = PageBuilder::new().today("2024-01-10").with(book_table(&books)).build();
    let alert = page.find(".smart-notification");
    assert_has_class(page.doc(), alert, "alert-warning");
    assert!(page
        .doc()
        .text_content(alert)
        .contains("You have 2 books due today. Consider returning or requesting an extension."));
}

#[test]
fn test_quiet_table_has_no_banner() {
    let books = [BookFixture::new("Anathem", "", "Borrowed", "2024-03-01")];
    let page = PageBuilder::new().today("2024-01-10").with(book_table(&books)).build();
    assert!(page.find_all(".smart-notification").is_empty());
}

#[test]
fn test_dismiss_banner() {
    let mut page = mounted();
    let close = page.find(".smart-notification .btn-close");
    assert!(page.click(close));
    assert!(page.find_all(".smart-notification").is_empty());
}
