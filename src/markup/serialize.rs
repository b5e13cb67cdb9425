//! Markup serialization for parsed elements.
//!
//! Follows the HTML fragment serialization rules: void elements have no end
//! tag, raw-text elements are written verbatim, text and attribute values are
//! escaped. Every stored fragment (block markup, vault entries) goes through
//! this writer so encoded and original markup stay byte-comparable.

use scraper::node::Element;
use scraper::{ElementRef, Node};

const VOID_ELEMENTS: [&str; 18] = [
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 7] = [
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Hook that may take over serialization of an element.
pub(crate) trait ElementRewriter {
    /// Write a replacement for `element` into `out` and return true, or return
    /// false to serialize the element normally.
    fn rewrite(&mut self, element: ElementRef<'_>, out: &mut String) -> bool;
}

struct Verbatim;

impl ElementRewriter for Verbatim {
    fn rewrite(&mut self, _element: ElementRef<'_>, _out: &mut String) -> bool {
        false
    }
}

/// Serialized outer markup of `element`.
pub fn outer_html(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    write_element(element, &mut out, &mut Verbatim);
    out
}

/// Serialized inner markup of `element`.
pub fn inner_html(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    write_children(element, &mut out, &mut Verbatim);
    out
}

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// `<name attr="value" ...>`
pub fn start_tag(element: &Element) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(element.name());
    for (name, value) in element.attrs.iter() {
        out.push(' ');
        // Foreign content keeps its prefix (`xlink:href`, `xmlns:xlink`).
        if let Some(prefix) = &name.prefix {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(&name.local);
        out.push_str("=\"");
        escape_attr_into(value, &mut out);
        out.push('"');
    }
    out.push('>');
    out
}

/// `</name>`, or `None` for void elements.
pub fn end_tag(element: &Element) -> Option<String> {
    if is_void(element.name()) {
        None
    } else {
        Some(format!("</{}>", element.name()))
    }
}

pub(crate) fn write_element(
    element: ElementRef<'_>,
    out: &mut String,
    rewriter: &mut dyn ElementRewriter,
) {
    if rewriter.rewrite(element, out) {
        return;
    }
    let value = element.value();
    out.push_str(&start_tag(value));
    if let Some(end) = end_tag(value) {
        write_children(element, out, rewriter);
        out.push_str(&end);
    }
}

pub(crate) fn write_children(
    parent: ElementRef<'_>,
    out: &mut String,
    rewriter: &mut dyn ElementRewriter,
) {
    let raw_text = RAW_TEXT_ELEMENTS.contains(&parent.value().name());
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => {
                if raw_text {
                    out.push_str(text);
                } else {
                    escape_text_into(text, out);
                }
            }
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    write_element(element, out, rewriter);
                }
            }
            _ => {}
        }
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_text_into(text, &mut out);
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    escape_attr_into(value, &mut out);
    out
}

fn escape_text_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr_into(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Reverse of the escaping above, for values read back out of placeholders.
pub fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_element(html: &Html) -> ElementRef<'_> {
        html.root_element()
            .children()
            .find_map(ElementRef::wrap)
            .unwrap()
    }

    #[test]
    fn test_outer_html_roundtrip() {
        let markup = r#"<p id="mwAQ" class="lead">Fish &amp; chips <b>now</b><br>later</p>"#;
        let html = Html::parse_fragment(markup);
        assert_eq!(outer_html(first_element(&html)), markup);
    }

    #[test]
    fn test_raw_text_is_not_escaped() {
        let markup = "<style>.a > .b { color: red; }</style>";
        let html = Html::parse_fragment(markup);
        assert_eq!(outer_html(first_element(&html)), markup);
    }

    #[test]
    fn test_attribute_escaping() {
        let html = Html::parse_fragment(r#"<span data-mw='{"a":"b&amp;c"}'>x</span>"#);
        assert_eq!(
            outer_html(first_element(&html)),
            r#"<span data-mw="{&quot;a&quot;:&quot;b&amp;c&quot;}">x</span>"#
        );
    }

    #[test]
    fn test_comments_are_kept() {
        let markup = "<div><!-- note -->text</div>";
        let html = Html::parse_fragment(markup);
        assert_eq!(outer_html(first_element(&html)), markup);
        assert_eq!(inner_html(first_element(&html)), "<!-- note -->text");
    }

    #[test]
    fn test_namespaced_attributes_keep_prefix() {
        let markup = concat!(
            r#"<span typeof="mw:Extension/math">"#,
            r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"></use></svg>"##,
            "</span>"
        );
        let html = Html::parse_fragment(markup);
        assert_eq!(outer_html(first_element(&html)), markup);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("AT&amp;T &quot;x&quot;"), "AT&T \"x\"");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
        assert_eq!(unescape("plain"), "plain");
    }
}
