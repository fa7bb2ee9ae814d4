//! Typed document tree access and content container lookup
//!
//! The extractor never touches `scraper` types directly. It is written
//! against [`DomNode`], which [`ScraperNode`] implements over the
//! html5ever tree built by `scraper`.

use scraper::{Html, Node};

/// Tags whose subtree is never content
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Phrasing tags that continue the surrounding text run
pub const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "big", "br", "cite", "code", "data", "del", "dfn", "em",
    "font", "i", "ins", "kbd", "label", "mark", "nobr", "q", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "time", "tt", "u", "var", "wbr",
];

/// Read-only view of one node of a parsed document
pub trait DomNode: Sized {
    /// Lowercase tag name for elements, None for any other node kind
    fn tag_name(&self) -> Option<&str>;

    /// Attribute value on an element
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Child nodes in document order
    fn children(&self) -> Vec<Self>;

    /// Raw text of a text node, None for any other node kind
    fn text(&self) -> Option<&str>;

    /// Concatenated descendant text, skipping non-content subtrees
    ///
    /// `br` and the edges of non-inline elements contribute a space so
    /// adjacent cells or lines do not run together.
    fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out, &[]);
        out
    }

    /// True if the `class` attribute lists `class` as one of its tokens
    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map_or(false, |value| value.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Appends descendant text of `node` to `out`, skipping `excluded` tags
pub fn collect_text<N: DomNode>(node: &N, out: &mut String, excluded: &[&str]) {
    for child in node.children() {
        if let Some(text) = child.text() {
            out.push_str(text);
            continue;
        }

        let Some(tag) = child.tag_name() else {
            continue;
        };

        if NON_CONTENT_TAGS.contains(&tag) || excluded.contains(&tag) {
            continue;
        }

        if tag == "br" {
            out.push(' ');
        } else if is_inline(tag) {
            collect_text(&child, out, excluded);
        } else {
            out.push(' ');
            collect_text(&child, out, excluded);
            out.push(' ');
        }
    }
}

/// True for phrasing tags
pub fn is_inline(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// Node handle into a `scraper` document
#[derive(Debug, Clone, Copy)]
pub struct ScraperNode<'a>(ego_tree::NodeRef<'a, Node>);

impl<'a> DomNode for ScraperNode<'a> {
    fn tag_name(&self) -> Option<&str> {
        match self.0.value() {
            Node::Element(element) => Some(element.name()),
            _ => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match self.0.value() {
            Node::Element(element) => element.attr(name),
            _ => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        self.0.children().map(ScraperNode).collect()
    }

    fn text(&self) -> Option<&str> {
        match self.0.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        }
    }
}

/// A parsed HTML document
pub struct ParsedPage {
    html: Html,
}

impl ParsedPage {
    /// Parses a full HTML document; malformed markup is repaired, never rejected
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// The document root
    pub fn root(&self) -> ScraperNode<'_> {
        ScraperNode(self.html.tree.root())
    }
}

/// Finds the first `div` (in document order) whose class list has `class`
///
/// There is no fallback: a page without a matching `div` yields None.
///
/// # Example
///
/// ```
/// use legaldoc_crawler::crawler::{locate_container, DomNode, ParsedPage};
///
/// let page = ParsedPage::parse(r#"<div class="nav">x</div><div class="main content1">Body</div>"#);
/// let container = locate_container(&page.root(), "content1").unwrap();
/// assert_eq!(container.text_content(), "Body");
/// ```
pub fn locate_container<N: DomNode>(root: &N, class: &str) -> Option<N> {
    let mut stack = root.children();
    stack.reverse();

    while let Some(node) = stack.pop() {
        if node.tag_name() == Some("div") && node.has_class(class) {
            return Some(node);
        }

        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }

    None
}
