// SPDX-License-Identifier: AGPL-3.0-or-later
//! Arena index over a flat block list
//!
//! Blocks are stored in a `Vec` and addressed by [`NodeId`]. Child, parent
//! and table-cell references are resolved once at build time, so every
//! dangling identifier is reported before rendering starts.

use crate::ast::{Block, BlockContent};
use crate::traits::{ConversionError, Result};
use std::collections::HashMap;

/// Position of a block inside a [`BlockIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Read-only identifier → block mapping with resolved tree links
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    blocks: Vec<Block>,
    ids: HashMap<String, NodeId>,
    children: Vec<Vec<NodeId>>,
    parents: Vec<Option<NodeId>>,
    cells: Vec<Vec<NodeId>>,
}

impl BlockIndex {
    /// Build the index, failing on the first dangling reference
    ///
    /// When an identifier occurs twice the later block replaces the earlier
    /// one in place.
    pub fn build(blocks: impl IntoIterator<Item = Block>) -> Result<Self> {
        let mut index = Self::default();

        for block in blocks {
            match index.ids.get(&block.id) {
                Some(&existing) => {
                    tracing::warn!(block_id = %block.id, "duplicate block identifier, keeping the later block");
                    index.blocks[existing.0] = block;
                }
                None => {
                    let node = NodeId(index.blocks.len());
                    index.ids.insert(block.id.clone(), node);
                    index.blocks.push(block);
                }
            }
        }

        let mut children = Vec::with_capacity(index.blocks.len());
        let mut parents = Vec::with_capacity(index.blocks.len());
        let mut cells = Vec::with_capacity(index.blocks.len());

        for block in &index.blocks {
            children.push(index.resolve_all(&block.children, &block.id)?);

            let parent = match &block.parent_id {
                Some(parent_id) => Some(index.resolve_from(parent_id, &block.id)?),
                None => None,
            };
            parents.push(parent);

            cells.push(match &block.content {
                BlockContent::Table { cells, .. } => index.resolve_all(cells, &block.id)?,
                _ => Vec::new(),
            });
        }

        index.children = children;
        index.parents = parents;
        index.cells = cells;

        tracing::debug!(blocks = index.blocks.len(), "built block index");
        Ok(index)
    }

    /// Look up a block by identifier
    pub fn get(&self, id: &str) -> Result<&Block> {
        self.resolve(id).map(|node| self.block(node))
    }

    /// Arena position of an identifier
    pub fn resolve(&self, id: &str) -> Result<NodeId> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| ConversionError::Integrity {
                missing: id.to_string(),
                referenced_by: None,
            })
    }

    fn resolve_from(&self, id: &str, owner: &str) -> Result<NodeId> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| ConversionError::Integrity {
                missing: id.to_string(),
                referenced_by: Some(owner.to_string()),
            })
    }

    fn resolve_all(&self, ids: &[String], owner: &str) -> Result<Vec<NodeId>> {
        ids.iter().map(|id| self.resolve_from(id, owner)).collect()
    }

    pub fn block(&self, node: NodeId) -> &Block {
        &self.blocks[node.0]
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.children[node.0]
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents[node.0]
    }

    /// Resolved cells of a table block; empty for other blocks
    pub fn table_cells(&self, node: NodeId) -> &[NodeId] {
        &self.cells[node.0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockContent, TextPayload};

    fn text(id: &str, parent: &str) -> Block {
        Block::new(
            id,
            BlockContent::Text {
                text: Some(TextPayload::plain(id)),
            },
        )
        .with_parent(parent)
    }

    #[test]
    fn test_build_and_navigate() {
        let index = BlockIndex::build(vec![
            Block::new("root", BlockContent::Page { text: None }).with_children(["a", "b"]),
            text("a", "root"),
            text("b", "root"),
        ])
        .unwrap();

        assert_eq!(index.len(), 3);
        let root = index.resolve("root").unwrap();
        let kids: Vec<&str> = index
            .children(root)
            .iter()
            .map(|&n| index.block(n).id.as_str())
            .collect();
        assert_eq!(kids, vec!["a", "b"]);

        let a = index.resolve("a").unwrap();
        assert_eq!(index.parent(a), Some(root));
        assert_eq!(index.parent(root), None);
    }

    #[test]
    fn test_get_missing_is_integrity_error() {
        let index = BlockIndex::build(Vec::new()).unwrap();
        assert!(index.is_empty());
        let err = index.get("nope").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Integrity { ref missing, referenced_by: None } if missing == "nope"
        ));
    }

    #[test]
    fn test_dangling_child_fails_build() {
        let err = BlockIndex::build(vec![
            Block::new("root", BlockContent::Page { text: None }).with_children(["a", "ghost"]),
            text("a", "root"),
        ])
        .unwrap_err();

        match err {
            ConversionError::Integrity {
                missing,
                referenced_by,
            } => {
                assert_eq!(missing, "ghost");
                assert_eq!(referenced_by.as_deref(), Some("root"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_parent_fails_build() {
        let err = BlockIndex::build(vec![text("a", "elsewhere")]).unwrap_err();
        assert!(matches!(err, ConversionError::Integrity { .. }));
    }

    #[test]
    fn test_dangling_table_cell_fails_build() {
        let err = BlockIndex::build(vec![Block::new(
            "t",
            BlockContent::Table {
                column_count: Some(1),
                cells: vec!["missing-cell".to_string()],
            },
        )])
        .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Integrity { ref missing, .. } if missing == "missing-cell"
        ));
    }

    #[test]
    fn test_table_cells_resolved() {
        let index = BlockIndex::build(vec![
            Block::new(
                "t",
                BlockContent::Table {
                    column_count: Some(2),
                    cells: vec!["c1".to_string(), "c2".to_string()],
                },
            ),
            Block::new("c1", BlockContent::TableCell).with_parent("t"),
            Block::new("c2", BlockContent::TableCell).with_parent("t"),
        ])
        .unwrap();

        let table = index.resolve("t").unwrap();
        assert_eq!(index.table_cells(table).len(), 2);
        assert!(index.table_cells(index.resolve("c1").unwrap()).is_empty());
    }

    #[test]
    fn test_duplicate_id_keeps_later_block() {
        let index = BlockIndex::build(vec![
            Block::new("x", BlockContent::Divider),
            Block::new("x", BlockContent::TableCell),
        ])
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("x").unwrap().content, BlockContent::TableCell);
    }
}
