// SPDX-License-Identifier: AGPL-3.0-or-later
//! Ordinals for ordered-list blocks
//!
//! An ordered block's number is one plus the count of ordered blocks
//! immediately preceding it among its siblings. Any other block type breaks
//! the run and the next ordered block starts again at 1.

use crate::ast::Block;
use crate::index::{BlockIndex, NodeId};

/// Ordinal of a block by scanning its preceding siblings
///
/// Used when a block is rendered on its own. Sibling traversals use
/// [`ListCounter`] instead, which yields the same numbers in one pass.
pub fn ordinal(index: &BlockIndex, node: NodeId) -> usize {
    let Some(parent) = index.parent(node) else {
        return 1;
    };
    let siblings = index.children(parent);
    let Some(position) = siblings.iter().position(|&sibling| sibling == node) else {
        return 1;
    };

    1 + siblings[..position]
        .iter()
        .rev()
        .take_while(|&&sibling| index.block(sibling).content.is_ordered())
        .count()
}

/// Running ordinal for one sibling list
#[derive(Debug, Clone, Default)]
pub struct ListCounter {
    run: usize,
}

impl ListCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance past `block`, returning its ordinal if it is ordered
    pub fn advance(&mut self, block: &Block) -> Option<usize> {
        if block.content.is_ordered() {
            self.run += 1;
            Some(self.run)
        } else {
            self.run = 0;
            None
        }
    }
}
