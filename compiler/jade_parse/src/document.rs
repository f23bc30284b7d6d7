//! A document: text plus its incrementally maintained parse tree.

use crate::diagnostics::{DiagnosticMode, ParseIssue};
use crate::incremental::{EditError, ParsedTree, ReparseConfig, ReparseStats};
use crate::tree::{NodeAndPosition, TreeError};

/// Owner of the text of one Java source file and of its [`ParsedTree`].
///
/// Edits are applied to the text and reported to the tree in one step.
/// Damaged nodes are repaired lazily, before the next query.
#[derive(Clone, Debug)]
pub struct Document {
    text: String,
    tree: ParsedTree,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_config(text, ReparseConfig::default())
    }

    pub fn with_config(text: impl Into<String>, config: ReparseConfig) -> Self {
        let text = text.into();
        let tree = ParsedTree::parse_with_config(&text, config);
        Document { text, tree }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The tree as of the last reparse. May carry pending damage.
    #[inline]
    pub fn tree(&self) -> &ParsedTree {
        &self.tree
    }

    /// Replace `removed` bytes at `offset` with `inserted`.
    pub fn edit(&mut self, offset: u32, removed: u32, inserted: &str) -> Result<(), EditError> {
        let len = self.tree.len();
        let out_of_bounds = EditError::OutOfBounds {
            offset,
            removed,
            len,
        };
        let end = offset
            .checked_add(removed)
            .filter(|&end| end <= len)
            .ok_or(out_of_bounds)?;
        for at in [offset, end] {
            if !self.text.is_char_boundary(at as usize) {
                return Err(EditError::NotCharBoundary { offset: at });
            }
        }
        let inserted_len = u32::try_from(inserted.len()).map_err(|_| EditError::TooLarge)?;

        self.tree.notify_edit(offset, removed, inserted_len)?;
        self.text.replace_range(offset as usize..end as usize, inserted);
        Ok(())
    }

    /// Repair pending damage.
    pub fn reparse(&mut self) -> Result<ReparseStats, TreeError> {
        if !self.tree.is_damaged() {
            return Ok(ReparseStats::default());
        }
        self.tree.reparse(&self.text)
    }

    /// Problems in the up-to-date tree.
    pub fn diagnostics(&mut self, mode: DiagnosticMode) -> Result<Vec<ParseIssue>, TreeError> {
        self.reparse()?;
        Ok(self.tree.diagnostics(mode))
    }

    /// Innermost node at `offset` in the up-to-date tree.
    pub fn find_innermost_node_at(
        &mut self,
        offset: u32,
    ) -> Result<Option<NodeAndPosition>, TreeError> {
        self.reparse()?;
        Ok(self.tree.find_innermost_node_at(offset))
    }
}
