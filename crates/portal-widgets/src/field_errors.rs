//! Inline rendering of per-field validation errors.
//!
//! An error is shown by marking the field `is-invalid` and inserting
//! `<div class="text-danger error-message"><small>…</small></div>` right after
//! it. A field carries at most one rendered error: showing a new one replaces
//! the previous.

use portal_core::error::ValidationError;
use portal_dom::{el, Document, NodeId};

const ERROR_SELECTOR: &str = ".text-danger.error-message";
const INVALID_CLASS: &str = "is-invalid";

/// Marks `field` invalid and renders `error` after it.
pub fn show_field_error(doc: &mut Document, field: NodeId, error: &ValidationError) {
    doc.add_class(field, INVALID_CLASS);
    remove_rendered_error(doc, field);
    doc.insert_built_after(
        field,
        el("div")
            .class("text-danger error-message")
            .data("error-code", &error.code)
            .child(el("small").text(&error.message)),
    );
    tracing::trace!(field = field.index(), code = %error.code, "field error shown");
}

/// Clears the invalid marker and rendered error of `field`.
pub fn clear_field_error(doc: &mut Document, field: NodeId) {
    doc.remove_class(field, INVALID_CLASS);
    remove_rendered_error(doc, field);
}

/// Shows `result`'s error on `field`, or clears the field when it passed.
/// Returns whether the field passed.
pub fn apply_result(doc: &mut Document, field: NodeId, result: &Result<(), ValidationError>) -> bool {
    match result {
        Ok(()) => {
            clear_field_error(doc, field);
            true
        }
        Err(error) => {
            show_field_error(doc, field, error);
            false
        }
    }
}

/// Removes every rendered error and invalid marker inside `scope`.
pub fn clear_all_errors(doc: &mut Document, scope: NodeId) {
    for message in doc.query_all(scope, ERROR_SELECTOR) {
        doc.detach(message);
    }
    for field in doc.query_all(scope, ".is-invalid") {
        doc.remove_class(field, INVALID_CLASS);
    }
}

/// Returns the message currently rendered for `field`.
pub fn field_error(doc: &Document, field: NodeId) -> Option<String> {
    doc.next_element_sibling(field)
        .filter(|&next| doc.is(next, ERROR_SELECTOR))
        .map(|next| doc.text_content(next).trim().to_string())
}

fn remove_rendered_error(doc: &mut Document, field: NodeId) {
    while let Some(next) = doc
        .next_element_sibling(field)
        .filter(|&next| doc.is(next, ERROR_SELECTOR))
    {
        doc.detach(next);
    }
}
