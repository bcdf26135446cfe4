//! A subset of CSS selectors.
//!
//! Supported syntax:
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `tr`, `*` | type / universal |
//! | `.badge` | class |
//! | `#extension_request_form` | id |
//! | `[name]`, `[name="email"]`, `[action*="profile"]` | attribute presence, equality, substring |
//! | `:first-child`, `:nth-child(3)` | position among element siblings |
//! | `:not(.active)` | negation of a compound selector |
//! | `a b`, `a > b` | descendant and child combinators |
//! | `a, b` | selector groups |

use std::fmt;

use portal_core::error::{PortalError, PortalResult};

use crate::document::{Document, NodeId};

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// The rightmost compound first, each paired with the combinator that
    /// links it to the next compound on its left.
    compounds: Vec<(Compound, Combinator)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    /// Marks the leftmost compound.
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    NthChild(usize),
    Not(Box<Compound>),
}

impl Selector {
    /// Parses a selector list.
    ///
    /// ```
    /// use portal_dom::Selector;
    ///
    /// assert!(Selector::parse("tbody tr td:nth-child(3)").is_ok());
    /// assert!(Selector::parse("form.s_website_form[action*=\"profile\"]").is_ok());
    /// assert!(Selector::parse("tr[").is_err());
    /// ```
    pub fn parse(source: &str) -> PortalResult<Self> {
        let mut parser = Parser::new(source);
        let groups = parser.selector_list()?;
        Ok(Self {
            source: source.to_string(),
            groups,
        })
    }

    /// Returns the selector text this was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the element matches any group of this selector.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.is_element(id) && self.groups.iter().any(|g| g.matches(doc, id))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Complex {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.matches_from(doc, id, 0)
    }

    fn matches_from(&self, doc: &Document, id: NodeId, index: usize) -> bool {
        let Some((compound, combinator)) = self.compounds.get(index) else {
            return true;
        };
        if !compound.matches(doc, id) {
            return false;
        }
        match combinator {
            Combinator::None => true,
            Combinator::Child => doc
                .parent(id)
                .is_some_and(|parent| self.matches_from(doc, parent, index + 1)),
            Combinator::Descendant => doc
                .ancestors(id)
                .into_iter()
                .any(|ancestor| self.matches_from(doc, ancestor, index + 1)),
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudos.is_empty()
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(tag) = doc.tag(id) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != "*" && t != tag) {
            return false;
        }
        if let Some(wanted) = &self.id {
            if doc.attr(id, "id") != Some(wanted.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| doc.has_class(id, c)) {
            return false;
        }
        let attrs_match = self.attrs.iter().all(|a| {
            let value = doc.attr(id, &a.name);
            match &a.op {
                AttrOp::Exists => value.is_some(),
                AttrOp::Equals(expected) => value == Some(expected.as_str()),
                AttrOp::Contains(needle) => {
                    !needle.is_empty() && value.is_some_and(|v| v.contains(needle.as_str()))
                }
            }
        });
        attrs_match
            && self.pseudos.iter().all(|p| match p {
                Pseudo::NthChild(n) => element_index(doc, id) == Some(*n),
                Pseudo::Not(inner) => !inner.matches(doc, id),
            })
    }
}

/// Returns the 1-based position of `id` among its parent's element children.
fn element_index(doc: &Document, id: NodeId) -> Option<usize> {
    let parent = doc.parent(id)?;
    doc.element_children(parent)
        .iter()
        .position(|&c| c == id)
        .map(|p| p + 1)
}

// ── Parser ───────────────────────────────────────────────────────────────

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> PortalError {
        PortalError::InvalidSelector(format!("{} ({reason} at {})", self.source, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> PortalResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{expected}'")))
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn selector_list(&mut self) -> PortalResult<Vec<Complex>> {
        let mut groups = vec![self.complex()?];
        while self.eat(',') {
            groups.push(self.complex()?);
        }
        if self.peek().is_some() {
            return Err(self.error("unexpected character"));
        }
        Ok(groups)
    }

    fn complex(&mut self) -> PortalResult<Complex> {
        self.skip_whitespace();
        let mut left_to_right = vec![(Combinator::None, self.compound()?)];
        loop {
            let had_space = self.skip_whitespace();
            let combinator = if self.eat('>') {
                self.skip_whitespace();
                Combinator::Child
            } else if had_space && !matches!(self.peek(), None | Some(',')) {
                Combinator::Descendant
            } else {
                break;
            };
            left_to_right.push((combinator, self.compound()?));
        }

        // Store right-to-left: each compound carries the combinator leading
        // to its left neighbour.
        let mut compounds = Vec::with_capacity(left_to_right.len());
        let combinators: Vec<Combinator> = left_to_right.iter().map(|(c, _)| *c).collect();
        for (index, (_, compound)) in left_to_right.into_iter().enumerate().rev() {
            compounds.push((compound, combinators[index]));
        }
        Ok(Complex { compounds })
    }

    fn compound(&mut self) -> PortalResult<Compound> {
        let mut compound = Compound::default();
        if self.eat('*') {
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    compound.pseudos.push(self.pseudo()?);
                }
                _ => break,
            }
        }
        if compound.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> PortalResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> PortalResult<AttrSelector> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        let op = if self.eat(']') {
            return Ok(AttrSelector {
                name,
                op: AttrOp::Exists,
            });
        } else if self.eat('=') {
            AttrOp::Equals(self.attr_value()?)
        } else if self.eat('*') {
            self.expect('=')?;
            AttrOp::Contains(self.attr_value()?)
        } else {
            return Err(self.error("expected ']', '=' or '*='"));
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(AttrSelector { name, op })
    }

    fn attr_value(&mut self) -> PortalResult<String> {
        self.skip_whitespace();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            _ => self.ident(),
        }
    }

    fn pseudo(&mut self) -> PortalResult<Pseudo> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(Pseudo::NthChild(1)),
            "nth-child" => {
                self.expect('(')?;
                self.skip_whitespace();
                let digits = self.ident()?;
                let n = digits
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| self.error("expected a positive index"))?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(Pseudo::NthChild(n))
            }
            "not" => {
                self.expect('(')?;
                self.skip_whitespace();
                let inner = self.compound()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(Pseudo::Not(Box::new(inner)))
            }
            _ => Err(self.error("unsupported pseudo-class")),
        }
    }
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::el;

    fn table() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let table = doc.append_built(
            root,
            el("table").class("o_portal_my_doc_table").child(
                el("tbody")
                    .child(
                        el("tr")
                            .child(el("td").text("Dune").child(el("small").text("Herbert")))
                            .child(el("td").child(el("span").class("badge badge-danger").text("Overdue")))
                            .child(el("td").text("2024-01-09")),
                    )
                    .child(
                        el("tr")
                            .class("active")
                            .child(el("td").text("Emma"))
                            .child(el("td").child(el("span").class("badge badge-success").text("Borrowed")))
                            .child(el("td").text("2024-02-01")),
                    ),
            ),
        );
        (doc, table)
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "tr[", "td:nth-child(0)", "td:hover", "a >", ".", "a,,b", "[x*y]"] {
            assert!(Selector::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_descendant_and_nth_child() {
        let (doc, table) = table();
        let cells = doc.query_all(table, "tbody tr td:nth-child(3)");
        let texts: Vec<String> = cells.iter().map(|&c| doc.text_content(c)).collect();
        assert_eq!(texts, ["2024-01-09", "2024-02-01"]);
    }

    #[test]
    fn test_first_child_and_child_combinator() {
        let (doc, table) = table();
        let firsts = doc.query_all(table, "tr > td:first-child");
        assert_eq!(firsts.len(), 2);
        assert!(doc.query_all(table, "table > tr").is_empty());
        assert!(doc.query_all(table, "tr > td small").len() == 1);
    }

    #[test]
    fn test_multiple_classes() {
        let (doc, table) = table();
        assert_eq!(doc.query_all(table, ".badge.badge-danger").len(), 1);
        assert_eq!(doc.query_all(table, ".badge").len(), 2);
    }

    #[test]
    fn test_groups_in_document_order() {
        let (doc, table) = table();
        let found = doc.query_all(table, ".badge-success, .badge-danger");
        assert_eq!(doc.text_content(found[0]), "Overdue");
        assert_eq!(doc.text_content(found[1]), "Borrowed");
    }

    #[test]
    fn test_not() {
        let (doc, table) = table();
        assert_eq!(doc.query_all(table, "tr:not(.active)").len(), 1);
    }

    #[test]
    fn test_attribute_operators() {
        let mut doc = Document::new();
        let form = doc.build(
            el("form")
                .class("s_website_form")
                .attr("action", "/my/profile/update")
                .child(el("input").attr("name", "email"))
                .child(el("input").attr("name", "phone").attr("type", "tel")),
        );
        assert!(doc.is(form, r#"form.s_website_form[action*="profile"]"#));
        assert!(!doc.is(form, r#"form[action*="extension"]"#));
        assert!(!doc.is(form, r#"form.s_website_form:not([action*="profile"])"#));
        assert_eq!(doc.query_all(form, "input[type]").len(), 1);
        assert_eq!(doc.query_all(form, "input[name='email']").len(), 1);
        assert_eq!(doc.query_all(form, "input[name=phone]").len(), 1);
    }

    #[test]
    fn test_id_and_universal() {
        let mut doc = Document::new();
        let form = doc.build(el("form").id("extension_request_form").child(el("p")));
        assert!(doc.is(form, "#extension_request_form"));
        assert!(doc.is(form, "form#extension_request_form"));
        assert_eq!(doc.query_all(form, "*").len(), 1);
    }

    #[test]
    fn test_text_nodes_never_match() {
        let (doc, table) = table();
        let sel = Selector::parse("*").unwrap();
        let all = doc.descendants(table);
        let elements = doc.select(table, &sel);
        assert!(elements.len() < all.len());
    }

    #[test]
    fn test_display() {
        let sel = Selector::parse("tbody tr").unwrap();
        assert_eq!(sel.to_string(), "tbody tr");
        assert_eq!(sel.as_str(), "tbody tr");
    }
}
