//! Content block extraction
//!
//! Walks a content container depth-first and emits [`ContentBlock`]s in
//! document order:
//!
//! | Node | Block |
//! |------|-------|
//! | `h1`..`h6` | `Heading` |
//! | `p` | `Paragraph` (dropped when its text is empty) |
//! | `li` | `ListItem`, ordered when the nearest list ancestor is `ol`, tagged with that list's index |
//! | text and phrasing elements between blocks | `PlainText` |
//! | `script`, `style`, comments | nothing |
//!
//! Other elements (`div`, `table`, `td`, ...) are descended into and
//! split surrounding text into separate runs. Blocks never carry empty text.

use crate::crawler::parser::{collect_text, is_inline, DomNode, NON_CONTENT_TAGS};
use crate::output::ContentBlock;

const LIST_TAGS: &[&str] = &["ul", "ol"];

/// Collapses whitespace runs to single spaces and trims both ends
///
/// # Example
///
/// ```
/// use legaldoc_crawler::crawler::normalize_text;
///
/// assert_eq!(normalize_text("  Điều 1.\n\t Phạm vi  "), "Điều 1. Phạm vi");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stateless block extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the block sequence under `container`
    pub fn extract<N: DomNode>(&self, container: &N) -> Vec<ContentBlock> {
        let mut walker = Walker {
            blocks: Vec::new(),
            lists: 0,
        };
        walker.walk(container, None);
        tracing::trace!("Extracted {} blocks", walker.blocks.len());
        walker.blocks
    }
}

/// The nearest enclosing `ul`/`ol`
#[derive(Debug, Clone, Copy)]
struct ListScope {
    ordered: bool,
    index: usize,
}

struct Walker {
    blocks: Vec<ContentBlock>,

    /// Lists opened so far
    lists: usize,
}

impl Walker {
    fn walk<N: DomNode>(&mut self, node: &N, list: Option<ListScope>) {
        let mut run = String::new();

        for child in node.children() {
            if let Some(text) = child.text() {
                run.push_str(text);
                continue;
            }

            let Some(tag) = child.tag_name() else {
                continue;
            };

            if NON_CONTENT_TAGS.contains(&tag) {
                continue;
            }

            if let Some(level) = heading_level(tag) {
                self.flush(&mut run);
                let text = normalize_text(&child.text_content());
                if !text.is_empty() {
                    self.blocks.push(ContentBlock::Heading { level, text });
                }
                continue;
            }

            match tag {
                "p" => {
                    self.flush(&mut run);
                    let text = normalize_text(&child.text_content());
                    if !text.is_empty() {
                        self.blocks.push(ContentBlock::Paragraph(text));
                    }
                }
                "ul" | "ol" => {
                    self.flush(&mut run);
                    let scope = self.open_list(tag == "ol");
                    self.walk(&child, Some(scope));
                }
                "li" => {
                    self.flush(&mut run);
                    // A stray `li` outside any list is its own unordered list
                    let scope = match list {
                        Some(scope) => scope,
                        None => self.open_list(false),
                    };
                    self.list_item(&child, scope);
                }
                "br" => run.push(' '),
                _ if is_inline(tag) && !has_block_descendant(&child) => {
                    collect_text(&child, &mut run, &[]);
                }
                _ => {
                    self.flush(&mut run);
                    self.walk(&child, list);
                }
            }
        }

        self.flush(&mut run);
    }

    /// Emits the item's own text, then any lists nested inside it
    fn list_item<N: DomNode>(&mut self, item: &N, scope: ListScope) {
        let mut own = String::new();
        collect_text(item, &mut own, LIST_TAGS);

        let text = normalize_text(&own);
        if !text.is_empty() {
            self.blocks.push(ContentBlock::ListItem {
                ordered: scope.ordered,
                list: scope.index,
                text,
            });
        }

        for nested in nested_lists(item) {
            let nested_scope = self.open_list(nested.tag_name() == Some("ol"));
            self.walk(&nested, Some(nested_scope));
        }
    }

    fn open_list(&mut self, ordered: bool) -> ListScope {
        let scope = ListScope {
            ordered,
            index: self.lists,
        };
        self.lists += 1;
        scope
    }

    fn flush(&mut self, run: &mut String) {
        let text = normalize_text(run);
        if !text.is_empty() {
            self.blocks.push(ContentBlock::PlainText(text));
        }
        run.clear();
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// True if any element below `node` is neither inline nor non-content
fn has_block_descendant<N: DomNode>(node: &N) -> bool {
    node.children().iter().any(|child| match child.tag_name() {
        Some(tag) if NON_CONTENT_TAGS.contains(&tag) => false,
        Some(tag) if !is_inline(tag) => true,
        Some(_) => has_block_descendant(child),
        None => false,
    })
}

/// Outermost `ul`/`ol` elements below `node`
fn nested_lists<N: DomNode>(node: &N) -> Vec<N> {
    let mut lists = Vec::new();
    for child in node.children() {
        let (is_list, is_content) = match child.tag_name() {
            Some(tag) => (LIST_TAGS.contains(&tag), !NON_CONTENT_TAGS.contains(&tag)),
            None => (false, false),
        };

        if is_list {
            lists.push(child);
        } else if is_content {
            lists.extend(nested_lists(&child));
        }
    }
    lists
}
