//! Declarative construction of element fragments.
//!
//! Behaviors insert small pieces of markup (indicators, icons, banners,
//! error messages). Instead of parsing HTML strings they describe the
//! fragment with [`ElementBuilder`] and hand it to the document.

/// A piece of content inside an [`ElementBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A nested element.
    Element(ElementBuilder),
    /// A text node.
    Text(String),
}

/// Describes an element, its attributes, and its content.
///
/// ```
/// use portal_dom::{el, Document};
///
/// let mut doc = Document::new();
/// let badge = doc.build(
///     el("span")
///         .class("badge")
///         .class("badge-warning")
///         .child(el("i").class("fa").class("fa-clock-o"))
///         .text("Pending Review"),
/// );
/// assert_eq!(doc.attr(badge, "class"), Some("badge badge-warning"));
/// assert_eq!(doc.text_content(badge), "Pending Review");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBuilder {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<Fragment>,
}

/// Starts describing an element with the given tag.
pub fn el(tag: &str) -> ElementBuilder {
    ElementBuilder {
        tag: tag.to_ascii_lowercase(),
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

impl ElementBuilder {
    /// Sets an attribute, replacing an earlier value.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Adds one or more space-separated classes.
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        let joined = match self.attrs.iter().find(|(k, _)| k == "class") {
            Some((_, existing)) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attr("class", &joined)
    }

    /// Sets the `id` attribute.
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Sets a `data-*` attribute.
    #[must_use]
    pub fn data(self, key: &str, value: &str) -> Self {
        self.attr(&format!("data-{key}"), value)
    }

    /// Appends a text node.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Fragment::Text(text.to_string()));
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(Fragment::Element(child));
        self
    }

    /// Appends several child elements.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children
            .extend(children.into_iter().map(Fragment::Element));
        self
    }

    /// Returns the tag name being built.
    pub fn tag_name(&self) -> &str {
        &self.tag
    }
}
