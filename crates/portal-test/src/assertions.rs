//! Assertion helpers for page state.
//!
//! - [`assert_has_class`] / [`assert_lacks_class`] - class markers
//! - [`assert_displayed`] / [`assert_hidden`] - show/hide state
//! - [`assert_field_error`] / [`assert_no_field_error`] - inline form errors
//! - [`assert_count`] - number of matching elements

use portal_dom::{Document, NodeId};
use portal_widgets::book_table::hydrate_rows;
use portal_widgets::field_errors::field_error;

/// Asserts that `node` carries `class`.
///
/// # Panics
///
/// Panics if the class is missing.
pub fn assert_has_class(doc: &Document, node: NodeId, class: &str) {
    assert!(
        doc.has_class(node, class),
        "expected class '{class}' on {}",
        doc.to_html(node)
    );
}

/// Asserts that `node` does not carry `class`.
///
/// # Panics
///
/// Panics if the class is present.
pub fn assert_lacks_class(doc: &Document, node: NodeId, class: &str) {
    assert!(
        !doc.has_class(node, class),
        "unexpected class '{class}' on {}",
        doc.to_html(node)
    );
}

/// Asserts that `node` is shown.
///
/// # Panics
///
/// Panics if the node is hidden.
pub fn assert_displayed(doc: &Document, node: NodeId) {
    assert!(doc.is_displayed(node), "expected visible: {}", doc.to_html(node));
}

/// Asserts that `node` is hidden.
///
/// # Panics
///
/// Panics if the node is shown.
pub fn assert_hidden(doc: &Document, node: NodeId) {
    assert!(!doc.is_displayed(node), "expected hidden: {}", doc.to_html(node));
}

/// Asserts that `field` shows an error containing `expected`.
///
/// # Panics
///
/// Panics if no error is rendered or its text differs.
pub fn assert_field_error(doc: &Document, field: NodeId, expected: &str) {
    let Some(message) = field_error(doc, field) else {
        panic!("expected error '{expected}' after {}", doc.to_html(field));
    };
    assert!(
        message.contains(expected),
        "expected error containing '{expected}', got '{message}'"
    );
    assert!(doc.has_class(field, "is-invalid"), "field not marked is-invalid");
}

/// Asserts that `field` shows no error.
///
/// # Panics
///
/// Panics if an error is rendered.
pub fn assert_no_field_error(doc: &Document, field: NodeId) {
    if let Some(message) = field_error(doc, field) {
        panic!("unexpected error '{message}' after {}", doc.to_html(field));
    }
    assert!(!doc.has_class(field, "is-invalid"), "field still marked is-invalid");
}

/// Asserts the number of elements under `scope` matching `selector`.
///
/// # Panics
///
/// Panics if the count differs.
pub fn assert_count(doc: &Document, scope: NodeId, selector: &str, expected: usize) {
    let actual = doc.query_all(scope, selector).len();
    assert_eq!(actual, expected, "count of '{selector}'");
}

/// Titles of the book rows under `root`, in current row order.
pub fn row_titles(doc: &Document, root: NodeId) -> Vec<String> {
    hydrate_rows(doc, root).into_iter().map(|row| row.title).collect()
}

/// Titles of the book rows under `root` that are currently shown.
pub fn visible_titles(doc: &Document, root: NodeId) -> Vec<String> {
    hydrate_rows(doc, root)
        .into_iter()
        .filter(|row| row.visible)
        .map(|row| row.title)
        .collect()
}
