//! # portal-dom
//!
//! The document model the portal behaviors operate on. A [`Document`] is an
//! arena of element and text nodes addressed by [`NodeId`]; behaviors find
//! elements with a subset of CSS selectors ([`Selector`]), mutate classes,
//! attributes and text, and insert fragments built with [`ElementBuilder`].
//!
//! ```
//! use portal_dom::{el, Document};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let table = doc.append_built(
//!     root,
//!     el("table").class("o_portal_my_doc_table").child(
//!         el("tbody").child(el("tr").child(el("td").text("Dune"))),
//!     ),
//! );
//!
//! let rows = doc.query_all(table, "tbody tr");
//! assert_eq!(rows.len(), 1);
//! assert_eq!(doc.text_content(rows[0]), "Dune");
//! ```

pub mod builder;
pub mod document;
pub mod render;
pub mod selector;

pub use builder::{el, ElementBuilder, Fragment};
pub use document::{Document, NodeId};
pub use render::escape_html;
pub use selector::Selector;
