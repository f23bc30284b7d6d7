//! Repair of damaged nodes.

use jade_ir::Span;
use jade_lexer::Lexer;

use super::{document_len, ParsedTree, ReparseStats, RestartPolicy};
use crate::kinds::{NodeKind, NodePolicy};
use crate::parser::{Contents, EditorParser, TailReuse};
use crate::tree::{ChildEntry, NodeId, NodeStatus, ParsedNode, TreeError, UnitIssue};

/// Bytes the lexer may read past the end of a token before emitting it.
const LEXER_LOOKAHEAD: u32 = 2;

impl ParsedTree {
    /// Repair every damaged node against the current `source`.
    ///
    /// Nodes are processed deepest first. A node whose end marker moved, or
    /// whose text no longer parses as its kind, is discarded and its parent
    /// is repaired instead. So is a node that runs out of text before its
    /// end marker, unless the edit reached its end: only then is the missing
    /// end marker the edit's doing, and the node is kept unterminated.
    #[tracing::instrument(level = "debug", skip_all, fields(damaged = self.damaged.len()))]
    pub fn reparse(&mut self, source: &str) -> Result<ReparseStats, TreeError> {
        let len = self.len();
        if document_len(source) != len {
            return Err(TreeError::Corrupt {
                node: self.root,
                reason: format!(
                    "source has {} bytes but the tree spans {len}",
                    source.len()
                ),
            });
        }

        let mut stats = ReparseStats::default();
        while let Some(id) = self.pop_deepest() {
            if self.tree.get(id).is_some_and(|node| node.status == NodeStatus::Damaged) {
                self.reparse_node(id, source, &mut stats)?;
            }
        }

        if self.config.verify_invariants {
            if let Err(error) = self.tree.validate(self.root) {
                tracing::error!(%error, "tree invariant violated after reparse");
                return Err(error);
            }
        }
        Ok(stats)
    }

    /// Remove and return the deepest live damaged node.
    fn pop_deepest(&mut self) -> Option<NodeId> {
        self.damaged.retain(|&id| self.tree.contains(id));
        let (at, _) = self
            .damaged
            .iter()
            .enumerate()
            .max_by_key(|&(_, &id)| self.tree.depth(id))?;
        Some(self.damaged.swap_remove(at))
    }

    #[tracing::instrument(level = "debug", skip(self, source, stats))]
    fn reparse_node(
        &mut self,
        id: NodeId,
        source: &str,
        stats: &mut ReparseStats,
    ) -> Result<(), TreeError> {
        let node = self.tree.try_get(id)?;
        let kind = node.kind;
        let policy = kind.policy();
        let size = node.size;
        let damage = node.damage.unwrap_or(Span::new(0, size));

        let reaches_end = damage.end >= size;
        if id != self.root
            && (!policy.reparses_in_place()
                || damage.start < policy.opener_len()
                || (node.unterminated && !reaches_end))
        {
            return self.escalate(id, stats);
        }

        let start = self
            .tree
            .absolute_position(id)
            .ok_or(TreeError::StaleNode(id))?;
        let restart = self.restart_point(node, policy, damage);
        let tail = self.detach_tail(id, restart, damage)?;
        tracing::trace!(%kind, restart, %damage, "restarting node");

        let lexer = Lexer::bounded(source, start + restart, start + size);
        let mut parser = EditorParser::new(&mut self.tree, source, lexer, id, kind, start)
            .with_tail(tail);
        let contents = parser.run();
        let (report, leftover) = parser.finish()?;
        if let Some(leftover) = leftover {
            leftover.discard(&mut self.tree);
        }
        stats.units_parsed += report.units_parsed;
        stats.units_reused += report.units_reused;
        stats.subtrees_reused += report.subtrees_reused;

        let unterminated = match contents {
            Contents::Terminated { end } if end == start + size => false,
            Contents::Reused => false,
            Contents::EndOfStream if !policy.expects_end_marker() => false,
            Contents::EndOfStream if id == self.root || reaches_end => true,
            Contents::Terminated { .. } | Contents::Abandon if id == self.root => {
                tracing::debug!("reparsing the whole document");
                stats.units_parsed += self.parse_root(source);
                stats.nodes_reparsed += 1;
                return Ok(());
            }
            Contents::Terminated { .. } | Contents::EndOfStream | Contents::Abandon => {
                return self.escalate(id, stats);
            }
        };

        let node = self.tree.try_get_mut(id)?;
        node.damage = None;
        node.unterminated = unterminated;
        node.status = if unterminated {
            NodeStatus::Unterminated
        } else {
            NodeStatus::Valid
        };
        stats.nodes_reparsed += 1;
        Ok(())
    }

    /// Relative offset at which parsing of `node` restarts.
    fn restart_point(&self, node: &ParsedNode, policy: &dyn NodePolicy, damage: Span) -> u32 {
        let content_start = policy.opener_len();
        if self.config.restart == RestartPolicy::NodeStart {
            return content_start;
        }
        let mut restart = content_start;
        let mut reach = 0;
        for unit in &node.units {
            reach = reach.max(unit.lookahead);
            if reach.saturating_add(LEXER_LOOKAHEAD) > damage.start {
                break;
            }
            restart = restart.max(unit.end);
        }
        restart
    }

    /// Split off the units, children and issues at or after `restart`.
    fn detach_tail(&mut self, id: NodeId, restart: u32, damage: Span) -> Result<TailReuse, TreeError> {
        let node = self.tree.try_get_mut(id)?;
        let units_at = node.units.partition_point(|unit| unit.start < restart);
        let units = node.units.split_off(units_at);
        let children_at = node.children.partition_point(|entry| entry.offset < restart);
        let children = node.children.split_off(children_at);
        let (issues, kept): (Vec<UnitIssue>, Vec<UnitIssue>) = std::mem::take(&mut node.issues)
            .into_iter()
            .partition(|issue| issue.span.start >= restart);
        node.issues = kept;

        let node = self.tree.try_get(id)?;
        let comment_at = |offset: u32, entries: &[ChildEntry]| {
            entries.iter().any(|entry| {
                entry.offset == offset
                    && self.tree.get(entry.node).is_some_and(|c| c.kind == NodeKind::Comment)
            })
        };
        let kept_items = node
            .units
            .iter()
            .filter(|unit| !comment_at(unit.start, &node.children))
            .count();
        let comment_starts = units
            .iter()
            .map(|unit| unit.start)
            .filter(|&start| comment_at(start, &children))
            .collect();

        Ok(TailReuse {
            clean_from: damage.end,
            units,
            children,
            issues,
            comment_starts,
            kept_items,
        })
    }

    /// Discard `id` and damage its parent over the node's span.
    fn escalate(&mut self, id: NodeId, stats: &mut ReparseStats) -> Result<(), TreeError> {
        stats.escalations += 1;
        let Some(parent) = self.tree.parent(id) else {
            return Err(TreeError::Corrupt {
                node: id,
                reason: "escalated node has no parent".to_string(),
            });
        };
        let entry = self.tree.remove_node(parent, id)?;
        let size = self.tree.try_get(id)?.size;
        tracing::debug!(kind = %self.tree[id].kind, offset = entry.offset, size, "escalating");
        self.tree.free_subtree(id);

        let parent_node = self.tree.try_get_mut(parent)?;
        let span = Span::new(entry.offset, entry.offset + size);
        parent_node.damage = Some(parent_node.damage.map_or(span, |damage| damage.merge(span)));
        parent_node.status = NodeStatus::Damaged;
        if !self.damaged.contains(&parent) {
            self.damaged.push(parent);
        }
        Ok(())
    }
}
