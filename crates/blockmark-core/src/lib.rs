// SPDX-License-Identifier: AGPL-3.0-or-later
//! Blockmark Core - Block tree model and Markdown renderer
//!
//! This crate provides:
//! - A typed model of the flat block lists returned by a document API
//! - An arena index that reconstructs the implicit block tree
//! - A recursive Markdown renderer with list numbering, tables and images
//! - Decoding of API payloads and a conversion pipeline around the renderer

pub mod ast;
pub mod convert;
pub mod index;
pub mod render;
pub mod traits;
pub mod wire;

pub use ast::{Block, BlockContent, BlockType, CodeLanguage, Document, TextElement, TextPayload};
pub use convert::{convert, Conversion, ConvertConfig, DocumentUrl};
pub use index::{BlockIndex, NodeId};
pub use render::{render_document, BlockRenderer, RenderOutput, MAX_DEPTH};
pub use traits::{ConversionError, ImageResolver, RenderConfig, RenderWarning, Result};
