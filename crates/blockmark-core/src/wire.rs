// SPDX-License-Identifier: AGPL-3.0-or-later
//! Decoding of document API payloads into the block model
//!
//! The API sends every block as one object with a numeric `block_type` and
//! a payload key named after the type (`text`, `heading3`, `table`, ...).
//! Only the fields the renderer uses are modelled; everything else is
//! ignored by serde.

use crate::ast::{
    Block, BlockContent, BlockType, CodeLanguage, Document, TextElement, TextPayload, TextRun,
    TextStyle,
};
use crate::traits::Result;
use serde::Deserialize;
use std::io::Read;

/// Decode a block list: either a bare JSON array or a page object with `items`
pub fn blocks_from_json(json: &str) -> Result<Vec<Block>> {
    let blocks: WireBlocks = serde_json::from_str(json)?;
    Ok(blocks.into_blocks())
}

pub fn blocks_from_reader<R: Read>(reader: R) -> Result<Vec<Block>> {
    let blocks: WireBlocks = serde_json::from_reader(reader)?;
    Ok(blocks.into_blocks())
}

/// Decode a document header, bare or wrapped in `{"document": ...}`
pub fn document_from_json(json: &str) -> Result<Document> {
    let document: WireDocumentEnvelope = serde_json::from_str(json)?;
    let document = match document {
        WireDocumentEnvelope::Wrapped { document } => document,
        WireDocumentEnvelope::Bare(document) => document,
    };
    Ok(Document::new(
        document.document_id,
        document.title.unwrap_or_default(),
    ))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireBlocks {
    List(Vec<WireBlock>),
    Page { items: Vec<WireBlock> },
}

impl WireBlocks {
    fn into_blocks(self) -> Vec<Block> {
        let items = match self {
            Self::List(items) | Self::Page { items } => items,
        };
        items.into_iter().map(WireBlock::into_block).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireDocumentEnvelope {
    Wrapped { document: WireDocument },
    Bare(WireDocument),
}

#[derive(Deserialize)]
struct WireDocument {
    document_id: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
struct WireBlock {
    block_id: String,
    #[serde(default)]
    block_type: i64,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    children: Vec<String>,
    page: Option<WireText>,
    text: Option<WireText>,
    heading1: Option<WireText>,
    heading2: Option<WireText>,
    heading3: Option<WireText>,
    heading4: Option<WireText>,
    heading5: Option<WireText>,
    heading6: Option<WireText>,
    heading7: Option<WireText>,
    heading8: Option<WireText>,
    heading9: Option<WireText>,
    bullet: Option<WireText>,
    ordered: Option<WireText>,
    code: Option<WireText>,
    quote: Option<WireText>,
    equation: Option<WireText>,
    todo: Option<WireText>,
    image: Option<WireImage>,
    table: Option<WireTable>,
}

impl WireBlock {
    fn into_block(mut self) -> Block {
        let block_type = BlockType::from_code(self.block_type);
        if block_type == BlockType::Undefined && self.block_type != BlockType::Undefined.code() {
            tracing::debug!(block_id = %self.block_id, code = self.block_type, "unknown block type code");
        }

        let content = match block_type {
            BlockType::Page => BlockContent::Page {
                text: payload(self.page),
            },
            BlockType::Text => BlockContent::Text {
                text: payload(self.text),
            },
            BlockType::Bullet => BlockContent::Bullet {
                text: payload(self.bullet),
            },
            BlockType::Ordered => BlockContent::Ordered {
                text: payload(self.ordered),
            },
            BlockType::Quote => BlockContent::Quote {
                text: payload(self.quote),
            },
            BlockType::Equation => BlockContent::Equation {
                text: payload(self.equation),
            },
            BlockType::Code => {
                let language = self
                    .code
                    .as_ref()
                    .and_then(|code| code.style.as_ref())
                    .and_then(|style| style.language)
                    .and_then(CodeLanguage::from_code);
                BlockContent::Code {
                    language,
                    text: payload(self.code),
                }
            }
            BlockType::Todo => {
                let done = self
                    .todo
                    .as_ref()
                    .and_then(|todo| todo.style.as_ref())
                    .and_then(|style| style.done)
                    .unwrap_or(false);
                BlockContent::Todo {
                    done,
                    text: payload(self.todo),
                }
            }
            BlockType::Divider => BlockContent::Divider,
            BlockType::Image => BlockContent::Image {
                token: self.image.and_then(|image| image.token),
            },
            BlockType::Table => {
                let table = self.table.unwrap_or_default();
                BlockContent::Table {
                    column_count: table.property.and_then(|p| p.column_size),
                    cells: table.cells,
                }
            }
            BlockType::TableCell => BlockContent::TableCell,
            BlockType::QuoteContainer => BlockContent::QuoteContainer,
            other => match other.heading_level() {
                Some(level) => BlockContent::Heading {
                    level,
                    text: payload(self.take_heading(level)),
                },
                None => BlockContent::Unsupported { block_type: other },
            },
        };

        Block {
            id: self.block_id,
            parent_id: self.parent_id.filter(|id| !id.is_empty()),
            children: self.children,
            content,
        }
    }

    fn take_heading(&mut self, level: u8) -> Option<WireText> {
        match level {
            1 => self.heading1.take(),
            2 => self.heading2.take(),
            3 => self.heading3.take(),
            4 => self.heading4.take(),
            5 => self.heading5.take(),
            6 => self.heading6.take(),
            7 => self.heading7.take(),
            8 => self.heading8.take(),
            9 => self.heading9.take(),
            _ => None,
        }
    }
}

fn payload(text: Option<WireText>) -> Option<TextPayload> {
    text.map(|text| TextPayload::new(text.elements.into_iter().map(element).collect()))
}

fn element(element: WireElement) -> TextElement {
    if let Some(run) = element.text_run {
        let style = run.text_element_style.map(|style| TextStyle {
            bold: style.bold.unwrap_or(false),
            italic: style.italic.unwrap_or(false),
            strikethrough: style.strikethrough.unwrap_or(false),
            underline: style.underline.unwrap_or(false),
            inline_code: style.inline_code.unwrap_or(false),
            link: style.link.map(|link| link.url.unwrap_or_default()),
        });
        return TextElement::TextRun(TextRun {
            content: run.content.unwrap_or_default(),
            style,
        });
    }
    if let Some(mention) = element.mention_user {
        if mention.user_id.is_none() {
            tracing::warn!("user mention without user_id");
        }
        return TextElement::MentionUser {
            user_id: mention.user_id.unwrap_or_default(),
        };
    }
    if let Some(mention) = element.mention_doc {
        return TextElement::MentionDoc {
            title: mention.title.unwrap_or_default(),
            url: mention.url.unwrap_or_default(),
        };
    }
    if let Some(equation) = element.equation {
        return TextElement::Equation {
            content: equation.content.unwrap_or_default(),
        };
    }
    TextElement::Unsupported
}

#[derive(Deserialize)]
struct WireText {
    #[serde(default)]
    elements: Vec<WireElement>,
    #[serde(default)]
    style: Option<WireTextBlockStyle>,
}

#[derive(Deserialize)]
struct WireTextBlockStyle {
    language: Option<i64>,
    done: Option<bool>,
}

#[derive(Deserialize)]
struct WireElement {
    text_run: Option<WireTextRun>,
    mention_user: Option<WireMentionUser>,
    mention_doc: Option<WireMentionDoc>,
    equation: Option<WireEquation>,
}

#[derive(Deserialize)]
struct WireTextRun {
    content: Option<String>,
    text_element_style: Option<WireTextElementStyle>,
}

#[derive(Deserialize)]
struct WireTextElementStyle {
    bold: Option<bool>,
    italic: Option<bool>,
    strikethrough: Option<bool>,
    underline: Option<bool>,
    inline_code: Option<bool>,
    link: Option<WireLink>,
}

#[derive(Deserialize)]
struct WireLink {
    url: Option<String>,
}

#[derive(Deserialize)]
struct WireMentionUser {
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct WireMentionDoc {
    title: Option<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct WireEquation {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireImage {
    token: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireTable {
    #[serde(default)]
    cells: Vec<String>,
    property: Option<WireTableProperty>,
}

#[derive(Deserialize)]
struct WireTableProperty {
    column_size: Option<usize>,
}
