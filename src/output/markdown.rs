//! Markdown rendering of extracted content blocks
//!
//! Every block becomes one Markdown line followed by a blank line, so each
//! block is a distinct paragraph for Markdown consumers.

use crate::config::RenderConfig;
use crate::output::types::ContentBlock;
use std::collections::HashMap;

/// Characters backslash-escaped when escaping is enabled
const MARKDOWN_SPECIAL: &[char] = &['\\', '`', '*', '_', '#', '|', '[', ']', '<', '>'];

/// Maps content blocks to Markdown text
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    options: RenderConfig,
}

impl MarkdownRenderer {
    /// Creates a renderer with the given options
    pub fn new(options: RenderConfig) -> Self {
        Self { options }
    }

    /// Renders blocks in order into a Markdown body
    ///
    /// # Example
    ///
    /// ```
    /// use legaldoc_crawler::output::{ContentBlock, MarkdownRenderer};
    ///
    /// let body = MarkdownRenderer::default().render(&[
    ///     ContentBlock::Heading { level: 1, text: "Title".to_string() },
    ///     ContentBlock::Paragraph("Para one.".to_string()),
    /// ]);
    /// assert_eq!(body, "# Title\n\nPara one.\n\n");
    /// ```
    pub fn render(&self, blocks: &[ContentBlock]) -> String {
        let mut md = String::new();
        // Items rendered so far per ordered list
        let mut numbering: HashMap<usize, usize> = HashMap::new();

        for block in blocks {
            let text = self.text(block.text());

            match block {
                ContentBlock::Heading { level, .. } => {
                    let level = (*level).clamp(1, 6) as usize;
                    md.push_str(&"#".repeat(level));
                    md.push(' ');
                    md.push_str(&text);
                }
                ContentBlock::Paragraph(_) | ContentBlock::PlainText(_) => {
                    md.push_str(&text);
                }
                ContentBlock::ListItem { ordered: false, .. } => {
                    md.push_str("- ");
                    md.push_str(&text);
                }
                ContentBlock::ListItem {
                    ordered: true,
                    list,
                    ..
                } => {
                    let count = numbering.entry(*list).or_insert(0);
                    *count += 1;
                    let number = if self.options.number_ordered_lists {
                        *count
                    } else {
                        1
                    };
                    md.push_str(&format!("{}. {}", number, text));
                }
            }

            md.push_str("\n\n");
        }

        md
    }

    fn text(&self, raw: &str) -> String {
        if self.options.escape_markdown {
            escape_markdown(raw)
        } else {
            raw.to_string()
        }
    }
}

/// Backslash-escapes characters that carry Markdown meaning
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
