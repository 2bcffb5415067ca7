// SPDX-License-Identifier: AGPL-3.0-or-later
//! Block tree → Markdown rendering
//!
//! [`BlockRenderer`] walks the implicit tree of a [`BlockIndex`] depth-first
//! and dispatches on block type. It owns the image-token list and the
//! warnings for one conversion and is not meant to be reused.

pub mod inline;
pub mod numbering;
pub mod table;

use crate::ast::{Block, BlockContent, TextPayload};
use crate::index::{BlockIndex, NodeId};
use crate::traits::{ConversionError, RenderConfig, RenderWarning, Result};
use inline::InlineRenderer;
use numbering::ListCounter;

pub use inline::{StyleKind, STYLE_PRECEDENCE};

/// Deepest block nesting rendered before giving up with [`ConversionError::TooDeep`]
pub const MAX_DEPTH: usize = 128;

/// Result of rendering a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub markdown: String,
    /// Image tokens in the order their placeholders appear
    pub image_tokens: Vec<String>,
    pub warnings: Vec<RenderWarning>,
}

/// Render the block tree below `root_id`
pub fn render_document(
    index: &BlockIndex,
    root_id: &str,
    config: &RenderConfig,
) -> Result<RenderOutput> {
    let root = index.resolve(root_id)?;
    let mut renderer = BlockRenderer::new(index, config);
    let markdown = renderer.render(root, 0)?;
    Ok(renderer.into_output(markdown))
}

/// Single-use recursive renderer over one block index
pub struct BlockRenderer<'a> {
    index: &'a BlockIndex,
    config: &'a RenderConfig,
    inline: InlineRenderer,
    image_tokens: Vec<String>,
    warnings: Vec<RenderWarning>,
    on_path: Vec<bool>,
    depth: usize,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(index: &'a BlockIndex, config: &'a RenderConfig) -> Self {
        Self {
            index,
            config,
            inline: InlineRenderer::new(config),
            image_tokens: Vec::new(),
            warnings: Vec::new(),
            on_path: vec![false; index.len()],
            depth: 0,
        }
    }

    /// Render one block and its subtree at the given indent level
    pub fn render(&mut self, node: NodeId, indent_level: usize) -> Result<String> {
        self.render_block(node, indent_level, None)
    }

    pub fn image_tokens(&self) -> &[String] {
        &self.image_tokens
    }

    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    pub fn into_output(self, markdown: String) -> RenderOutput {
        RenderOutput {
            markdown,
            image_tokens: self.image_tokens,
            warnings: self.warnings,
        }
    }

    fn render_block(
        &mut self,
        node: NodeId,
        indent_level: usize,
        ordinal: Option<usize>,
    ) -> Result<String> {
        if self.on_path[node.index()] {
            return Err(ConversionError::Cycle {
                id: self.index.block(node).id.clone(),
            });
        }
        if self.depth == MAX_DEPTH {
            return Err(ConversionError::TooDeep {
                id: self.index.block(node).id.clone(),
                depth: MAX_DEPTH,
            });
        }
        self.on_path[node.index()] = true;
        self.depth += 1;
        let rendered = self.render_content(node, indent_level, ordinal);
        self.depth -= 1;
        self.on_path[node.index()] = false;
        rendered
    }

    fn render_content(
        &mut self,
        node: NodeId,
        indent_level: usize,
        ordinal: Option<usize>,
    ) -> Result<String> {
        let index = self.index;
        let block = index.block(node);

        if let BlockContent::Unsupported { block_type } = &block.content {
            tracing::debug!(block_id = %block.id, ?block_type, "skipping unsupported block");
            return Ok(String::new());
        }

        let mut output = self.config.indent.repeat(indent_level);

        match &block.content {
            BlockContent::Page { text } => {
                output.push_str("# ");
                output.push_str(&self.text(block, text.as_ref()));
                output.push_str(&self.render_children(index.children(node), 0, "", "\n")?);
            }

            BlockContent::Text { text } => {
                output.push_str(&self.text(block, text.as_ref()));
            }

            BlockContent::Heading { level, text } => {
                let level = if (1..=9).contains(level) {
                    *level
                } else {
                    self.warn(block, &format!("heading level {level} out of range"));
                    (*level).clamp(1, 9)
                };
                output.push_str(&"#".repeat(level as usize));
                output.push(' ');
                output.push_str(&self.text(block, text.as_ref()));
            }

            BlockContent::Bullet { text } => {
                output.push_str("- ");
                output.push_str(&self.text(block, text.as_ref()));
                output.push_str(&self.render_children(
                    index.children(node),
                    indent_level + 1,
                    "",
                    "",
                )?);
            }

            BlockContent::Ordered { text } => {
                let ordinal = ordinal.unwrap_or_else(|| numbering::ordinal(index, node));
                output.push_str(&format!("{ordinal}. "));
                output.push_str(&self.text(block, text.as_ref()));
                output.push_str(&self.render_children(
                    index.children(node),
                    indent_level + 1,
                    "",
                    "",
                )?);
            }

            BlockContent::Code { language, text } => {
                let tag = language.map(|l| l.fence_tag()).unwrap_or_default();
                output.push_str("```");
                output.push_str(tag);
                output.push('\n');
                output.push_str(self.text(block, text.as_ref()).trim());
                output.push_str("\n```\n");
            }

            BlockContent::Quote { text } => {
                output.push_str("> ");
                output.push_str(&self.text(block, text.as_ref()));
            }

            BlockContent::Equation { text } => {
                output.push_str("$$\n");
                output.push_str(&self.text(block, text.as_ref()));
                output.push_str("\n$$\n");
            }

            BlockContent::Todo { done, text } => {
                output.push_str(if *done { "- [x] " } else { "- [ ] " });
                output.push_str(&self.text(block, text.as_ref()));
            }

            BlockContent::Divider => output.push_str("---\n"),

            BlockContent::Image { token } => match token {
                Some(token) => {
                    output.push_str(&format!("![]({token})\n"));
                    self.image_tokens.push(token.clone());
                }
                None => self.warn(block, "image without token"),
            },

            BlockContent::Table { column_count, .. } => match column_count {
                Some(0) => {}
                Some(column_count) => {
                    output.push_str(&self.render_table(node, *column_count)?);
                }
                None => self.warn(block, "table without column count"),
            },

            BlockContent::TableCell => {
                output.push_str(&self.render_children(index.children(node), 0, "", "")?);
            }

            BlockContent::QuoteContainer => {
                output.push_str(&self.render_children(index.children(node), 0, "> ", "")?);
            }

            BlockContent::Unsupported { .. } => {}
        }

        Ok(output)
    }

    /// Render a sibling list, numbering ordered runs as it goes
    fn render_children(
        &mut self,
        children: &[NodeId],
        indent_level: usize,
        prefix: &str,
        suffix: &str,
    ) -> Result<String> {
        let mut output = String::new();
        let mut counter = ListCounter::new();
        for &child in children {
            let ordinal = counter.advance(self.index.block(child));
            output.push_str(prefix);
            output.push_str(&self.render_block(child, indent_level, ordinal)?);
            output.push_str(suffix);
        }
        Ok(output)
    }

    fn render_table(&mut self, node: NodeId, column_count: usize) -> Result<String> {
        let index = self.index;
        let mut counter = ListCounter::new();
        let mut cells = Vec::with_capacity(index.table_cells(node).len());
        for &cell in index.table_cells(node) {
            let ordinal = counter.advance(index.block(cell));
            let content = self.render_block(cell, 0, ordinal)?;
            cells.push(content.replace('\n', ""));
        }

        let rows = table::layout_rows(cells, column_count);
        let mut output = table::render_table(&rows);
        if !output.is_empty() {
            output.push('\n');
        }
        Ok(output)
    }

    fn text(&mut self, block: &Block, text: Option<&TextPayload>) -> String {
        match text {
            Some(payload) => {
                let unstyled = inline::unstyled_runs(payload);
                if unstyled > 0 {
                    self.warn(block, &format!("{unstyled} text run(s) without style"));
                }
                self.inline.render_text(payload)
            }
            None => {
                self.warn(block, "missing text payload");
                "\n".to_string()
            }
        }
    }

    fn warn(&mut self, block: &Block, message: &str) {
        tracing::warn!(block_id = %block.id, block_type = ?block.block_type(), "{message}");
        self.warnings.push(RenderWarning {
            block_id: block.id.clone(),
            message: message.to_string(),
        });
    }
}
