//! HTML serialization of document nodes.

use crate::document::{Document, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Escapes HTML special characters in a string.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their HTML entity equivalents.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

impl Document {
    /// Renders a node and its subtree as HTML.
    ///
    /// ```
    /// use portal_dom::{el, Document};
    ///
    /// let mut doc = Document::new();
    /// let small = doc.build(el("small").class("text-muted").text("2 days ago"));
    /// assert_eq!(doc.to_html(small), r#"<small class="text-muted">2 days ago</small>"#);
    /// ```
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Renders only the children of a node.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text(id) {
            out.push_str(&escape_html(text));
            return;
        }
        let Some(tag) = self.tag(id) else {
            return;
        };
        out.push('<');
        out.push_str(tag);
        for (name, value) in self.attributes(id) {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&tag) {
            return;
        }
        for &child in self.children(id) {
            self.write_html(child, out);
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::el;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_void_and_nested() {
        let mut doc = Document::new();
        let td = doc.build(
            el("td")
                .text("2024-01-10")
                .child(el("br"))
                .child(el("small").child(el("i").class("fa fa-calendar")).text(" Due This Week")),
        );
        assert_eq!(
            doc.to_html(td),
            r#"<td>2024-01-10<br><small><i class="fa fa-calendar"></i> Due This Week</small></td>"#
        );
    }

    #[test]
    fn test_render_escapes_text_and_attrs() {
        let mut doc = Document::new();
        let p = doc.build(el("p").attr("title", "a\"b").text("<script>"));
        assert_eq!(doc.to_html(p), r#"<p title="a&quot;b">&lt;script&gt;</p>"#);
    }

    #[test]
    fn test_inner_html() {
        let mut doc = Document::new();
        let div = doc.build(el("div").child(el("span").text("a")).text("b"));
        assert_eq!(doc.inner_html(div), "<span>a</span>b");
    }
}
