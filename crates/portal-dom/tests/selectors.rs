//! Selector matching against portal-shaped markup.

use portal_dom::{el, Document, NodeId, Selector};

fn portal_page() -> (Document, NodeId) {
    let mut doc = Document::new();
    let body = doc.root();
    doc.append_built(
        body,
        el("div").class("container").children([
            el("table").class("table o_portal_my_doc_table").child(
                el("tbody").children([
                    el("tr").class("table-danger").children([
                        el("td").text("Dune"),
                        el("td").child(el("span").class("badge badge-danger").text("Overdue")),
                        el("td").text("2024-01-09"),
                    ]),
                    el("tr").children([
                        el("td").text("Emma"),
                        el("td").child(el("span").class("badge badge-success").text("Borrowed")),
                        el("td").text("2024-01-20"),
                    ]),
                ]),
            ),
            el("form")
                .id("extension_request_form")
                .class("s_website_form")
                .attr("action", "/my/extension/request")
                .child(el("input").attr("name", "requested_expiry_date").attr("type", "date")),
            el("form")
                .class("s_website_form")
                .attr("action", "/my/profile/update")
                .child(el("input").attr("name", "email")),
        ]),
    );
    (doc, body)
}

fn tags(doc: &Document, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|&id| doc.tag(id).unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_descendant_and_position() {
    let (doc, body) = portal_page();
    let cells = doc.query_all(body, "tbody tr td:nth-child(3)");
    assert_eq!(cells.len(), 2);
    assert_eq!(doc.text_content(cells[0]), "2024-01-09");

    let titles = doc.query_all(body, "tr > td:first-child");
    let texts: Vec<_> = titles.iter().map(|&td| doc.text_content(td)).collect();
    assert_eq!(texts, vec!["Dune", "Emma"]);
}

#[test]
fn test_child_combinator_is_strict() {
    let (doc, body) = portal_page();
    assert!(doc.query_all(body, "table > tr").is_empty());
    assert_eq!(doc.query_all(body, "table > tbody > tr").len(), 2);
}

#[test]
fn test_form_routing_selectors() {
    let (doc, body) = portal_page();
    let extension = doc.query_all(
        body,
        r#"#extension_request_form, form.s_website_form:not([action*="profile"])"#,
    );
    assert_eq!(extension.len(), 1);
    assert_eq!(doc.attr(extension[0], "action"), Some("/my/extension/request"));

    let profile = doc.query_all(body, r#"form.s_website_form[action*="profile"]"#);
    assert_eq!(profile.len(), 1);
    assert_eq!(doc.attr(profile[0], "action"), Some("/my/profile/update"));
}

#[test]
fn test_attribute_equality() {
    let (doc, body) = portal_page();
    let found = doc.query_all(body, r#"input[name="email"]"#);
    assert_eq!(tags(&doc, &found), vec!["input"]);
    assert!(doc.query(body, "input[name=email]").is_some());
    assert!(doc.query(body, r#"input[name="mail"]"#).is_none());
    assert_eq!(doc.query_all(body, "input[type]").len(), 1);
}

#[test]
fn test_class_compound_and_groups() {
    let (doc, body) = portal_page();
    assert_eq!(doc.query_all(body, "tr.table-danger").len(), 1);
    assert_eq!(doc.query_all(body, ".badge-danger, .badge-success").len(), 2);
    assert_eq!(doc.query_all(body, "span.badge:not(.badge-danger)").len(), 1);
}

#[test]
fn test_closest_within_stops_at_boundary() {
    let (doc, body) = portal_page();
    let table = doc.query(body, "table").unwrap();
    let badge = doc.query(table, ".badge").unwrap();

    let row = Selector::parse("tr").unwrap();
    let found = doc.closest_within(badge, &row, table).unwrap();
    assert_eq!(doc.tag(found), Some("tr"));

    let container = Selector::parse(".container").unwrap();
    assert_eq!(doc.closest_within(badge, &container, table), None);
}

#[test]
fn test_invalid_selectors() {
    for bad in ["", "tr[", "td:nth-child(x)", "a >", ":hover", "a,,b"] {
        assert!(Selector::parse(bad).is_err(), "{bad:?}");
    }
}
