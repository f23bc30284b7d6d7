//! Incremental Parsing Support
//!
//! A [`ParsedTree`] keeps the node tree of one document in step with its
//! text. Edits are reported through [`ParsedTree::notify_edit`], which only
//! adjusts positions and marks the innermost affected node as damaged.
//! [`ParsedTree::reparse`] later repairs every damaged node, reusing as
//! much of the old tree as the edit allows.
//!
//! # Reparse of one node
//!
//! 1. **Restart** - choose the end of the last unit the edit cannot have
//!    influenced (see [`RestartPolicy`])
//! 2. **Detach** - units, children and issues after the restart point are
//!    set aside
//! 3. **Unit loop** - units are parsed from the restart point; as soon as
//!    the next unit would start where an old unit behind the damage started,
//!    the rest of the old contents is re-attached instead
//! 4. **Settle** - the node becomes valid or unterminated, or, when its end
//!    marker moved, is discarded and its parent is damaged (escalation)

mod edit;
mod reparse;

use jade_ir::{Span, TextChange};
use jade_lexer::Lexer;

use crate::diagnostics::{DiagnosticMode, IssueKind, ParseIssue};
use crate::kinds::NodeKind;
use crate::parser::EditorParser;
use crate::tree::{NodeAndPosition, NodeId, NodeStatus, NodeTree, ParsedNode, TreeError};

/// Where a damaged node restarts parsing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RestartPolicy {
    /// After the last unit whose tokens and lookahead end before the
    /// damage. Earlier units, and their child nodes, are kept.
    #[default]
    UnitBoundary,
    /// At the start of the node's contents: every unit is reparsed.
    NodeStart,
}

/// Options of a [`ParsedTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReparseConfig {
    pub restart: RestartPolicy,
    /// Validate the whole tree after every reparse.
    pub verify_invariants: bool,
}

impl Default for ReparseConfig {
    fn default() -> Self {
        ReparseConfig {
            restart: RestartPolicy::default(),
            verify_invariants: cfg!(debug_assertions),
        }
    }
}

/// Statistics of one [`ParsedTree::reparse`] call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReparseStats {
    /// Damaged nodes that were reparsed in place.
    pub nodes_reparsed: usize,
    /// Units parsed, including units of newly created child nodes.
    pub units_parsed: usize,
    /// Old units re-attached behind the damage.
    pub units_reused: usize,
    /// Old child subtrees re-attached behind the damage.
    pub subtrees_reused: usize,
    /// Nodes discarded in favour of reparsing their parent.
    pub escalations: usize,
}

impl ReparseStats {
    /// Share of units that were reused rather than parsed, as a percentage.
    #[allow(
        clippy::cast_precision_loss,
        reason = "counts won't approach 2^52; precision loss irrelevant for display"
    )]
    pub fn reuse_rate(&self) -> f64 {
        let total = self.units_reused + self.units_parsed;
        if total == 0 {
            0.0
        } else {
            (self.units_reused as f64 / total as f64) * 100.0
        }
    }
}

/// Invalid edit notifications.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The removed range extends past the end of the document.
    #[error("edit at {offset} removing {removed} bytes is outside a document of {len} bytes")]
    OutOfBounds { offset: u32, removed: u32, len: u32 },
    /// The offset splits a UTF-8 character.
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: u32 },
    /// The document would exceed the addressable size.
    #[error("document would grow past {max} bytes", max = u32::MAX)]
    TooLarge,
}

/// The parse tree of one document, kept up to date incrementally.
///
/// The tree never stores the text. Callers report each change with
/// [`ParsedTree::notify_edit`] and hand the current text to
/// [`ParsedTree::reparse`].
#[derive(Clone, Debug)]
pub struct ParsedTree {
    tree: NodeTree,
    root: NodeId,
    config: ReparseConfig,
    damaged: Vec<NodeId>,
    last_edit: Option<TextChange>,
}

impl ParsedTree {
    /// Parse `source` from scratch with the default configuration.
    pub fn parse(source: &str) -> Self {
        Self::parse_with_config(source, ReparseConfig::default())
    }

    /// Parse `source` from scratch.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn parse_with_config(source: &str, config: ReparseConfig) -> Self {
        let mut tree = NodeTree::new();
        let root = tree.alloc(ParsedNode::new(NodeKind::CompilationUnit));
        let mut parsed = ParsedTree {
            tree,
            root,
            config,
            damaged: Vec::new(),
            last_edit: None,
        };
        parsed.parse_root(source);
        parsed
    }

    /// Rebuild the root's contents from the whole text.
    fn parse_root(&mut self, source: &str) -> usize {
        let root = self.root;
        let children: Vec<NodeId> = self.tree[root].children.iter().map(|e| e.node).collect();
        for child in children {
            self.tree.free_subtree(child);
        }
        let len = document_len(source);
        let node = &mut self.tree[root];
        node.children.clear();
        node.units.clear();
        node.issues.clear();
        node.damage = None;
        node.size = len;

        let mut parser = EditorParser::new(
            &mut self.tree,
            source,
            Lexer::new(source),
            root,
            NodeKind::CompilationUnit,
            0,
        );
        parser.run();
        let units = match parser.finish() {
            Ok((report, _)) => report.units_parsed,
            Err(error) => {
                tracing::error!(%error, "full parse produced an inconsistent tree");
                0
            }
        };
        let node = &mut self.tree[root];
        node.status = NodeStatus::Valid;
        node.unterminated = false;
        units
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The underlying node arena.
    #[inline]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    #[inline]
    pub fn config(&self) -> ReparseConfig {
        self.config
    }

    /// Length of the document the tree describes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.tree[self.root].size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a node; `None` for stale handles.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&ParsedNode> {
        self.tree.get(id)
    }

    /// Absolute span of a live node.
    pub fn span_of(&self, id: NodeId) -> Option<Span> {
        let position = self.tree.absolute_position(id)?;
        Some(Span::new(position, position + self.tree.get(id)?.size))
    }

    /// True while edits are waiting for [`ParsedTree::reparse`].
    pub fn is_damaged(&self) -> bool {
        self.damaged.iter().any(|&id| self.tree.contains(id))
    }

    /// Innermost node whose span contains `offset`. Offsets in gaps between
    /// children resolve to the enclosing node; `None` past the end.
    pub fn find_innermost_node_at(&self, offset: u32) -> Option<NodeAndPosition> {
        let len = self.len();
        if offset >= len {
            return None;
        }
        self.tree.find_node_at_offset(self.root, offset).or(Some(NodeAndPosition {
            node: self.root,
            position: 0,
            size: len,
        }))
    }

    /// The innermost node containing `offset`, or else the first node that
    /// starts after it at the innermost level containing the offset.
    pub fn find_node_at_or_after(&self, offset: u32) -> Option<NodeAndPosition> {
        let mut current: Option<NodeAndPosition> = None;
        let mut parent = self.root;
        loop {
            match self.tree.find_node_at_or_after(parent, offset) {
                Some(hit) if hit.position <= offset => {
                    parent = hit.node;
                    current = Some(hit);
                }
                Some(hit) => return Some(hit),
                None => return current,
            }
        }
    }

    /// Problems in the current tree, in document order.
    ///
    /// [`DiagnosticMode::Typing`] hides what is likely to be resolved by the
    /// next keystrokes: unterminated constructs, and issues touching the
    /// most recent edit.
    pub fn diagnostics(&self, mode: DiagnosticMode) -> Vec<ParseIssue> {
        let edited = self.last_edit.map(|change| change.new_span());
        let mut out = Vec::new();
        for at in self.tree.descendants(self.root) {
            let Some(node) = self.tree.get(at.node) else {
                continue;
            };
            for issue in node.issues() {
                let span = Span::new(at.position + issue.span.start, at.position + issue.span.end);
                let transient = edited
                    .is_some_and(|edit| span.start <= edit.end && edit.start <= span.end);
                if mode == DiagnosticMode::Typing && transient {
                    continue;
                }
                out.push(ParseIssue {
                    span,
                    message: issue.message.clone(),
                    kind: IssueKind::Syntax,
                });
            }
            if node.is_unterminated() && mode == DiagnosticMode::Settled {
                let opener = u32::from(node.kind().is_body());
                out.push(ParseIssue {
                    span: Span::new(at.position, at.position + opener.min(at.size)),
                    message: format!("unclosed {}", node.kind()),
                    kind: IssueKind::Unterminated,
                });
            }
        }
        out.sort_by_key(|issue| (issue.span.start, issue.span.end));
        out
    }

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), TreeError> {
        self.tree.validate(self.root)
    }
}

/// Document length as a tree position. Documents are limited to 4 GiB.
pub(crate) fn document_len(source: &str) -> u32 {
    u32::try_from(source.len()).unwrap_or(u32::MAX)
}
