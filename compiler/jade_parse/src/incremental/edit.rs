//! Edit attribution: position shifting and damage marking.

use smallvec::SmallVec;

use jade_ir::{shift, Span, TextChange};

use super::{EditError, ParsedTree};
use crate::tree::{NodeId, NodeStatus, NodeTree, UnitMark};

impl ParsedTree {
    /// Record that `removed` bytes at `offset` were replaced by `inserted`
    /// bytes.
    ///
    /// Must be called once per change, in document order. Positions are
    /// shifted immediately; the innermost node containing the change is
    /// marked damaged and repaired by the next [`ParsedTree::reparse`].
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn notify_edit(&mut self, offset: u32, removed: u32, inserted: u32) -> Result<(), EditError> {
        let len = self.len();
        offset
            .checked_add(removed)
            .filter(|&end| end <= len)
            .ok_or(EditError::OutOfBounds {
                offset,
                removed,
                len,
            })?;
        if (len - removed).checked_add(inserted).is_none() {
            return Err(EditError::TooLarge);
        }

        let change = TextChange::replace(offset, removed, inserted);
        let delta = change.delta();
        let path = self.edit_path(&change);
        let Some(&(target, target_start)) = path.last() else {
            return Ok(());
        };

        for window in path.windows(2) {
            let (parent, parent_start) = window[0];
            let (child, child_start) = window[1];
            let child_end = child_start - parent_start + self.tree[child].size;
            if let Some(node) = self.tree.get_mut(parent) {
                node.size = shift(node.size, delta);
            }
            // Threshold is the child's old end: the child itself stays put.
            if let Err(error) = self.tree.shift_positions_after(parent, child_end, delta) {
                tracing::error!(%error, "edit path changed while shifting");
            }
        }

        damage_target(&mut self.tree, target, change.relative_to(target_start));
        tracing::debug!(?target, kind = %self.tree[target].kind, "node damaged");
        if !self.damaged.contains(&target) {
            self.damaged.push(target);
        }
        self.last_edit = Some(change);
        Ok(())
    }

    /// Nodes from the root down to the innermost node containing `change`,
    /// with their absolute starts.
    fn edit_path(&self, change: &TextChange) -> SmallVec<[(NodeId, u32); 16]> {
        let mut path = SmallVec::new();
        let mut current = self.root;
        let mut start = 0;
        loop {
            path.push((current, start));
            let Some(node) = self.tree.get(current) else {
                return path;
            };
            let mut open_ended_hit = None;
            let mut hit = None;
            for entry in node.children() {
                let Some(child) = self.tree.get(entry.node) else {
                    continue;
                };
                let child_start = start + entry.offset;
                let child_end = child_start + child.size;
                if change.is_insertion() {
                    if child_start <= change.start && change.start < child_end {
                        hit = Some((entry.node, child_start));
                        break;
                    }
                    if change.start == child_end && is_open_ended(&self.tree, entry.node) {
                        open_ended_hit = Some((entry.node, child_start));
                    }
                } else if child_start <= change.start && change.old_end <= child_end {
                    hit = Some((entry.node, child_start));
                    break;
                }
            }
            match hit.or(open_ended_hit) {
                Some((child, child_start)) => {
                    current = child;
                    start = child_start;
                }
                None => return path,
            }
        }
    }
}

/// A node accepts text appended at its end when it is unterminated, or
/// when its last child reaches its end and accepts it.
fn is_open_ended(tree: &NodeTree, mut id: NodeId) -> bool {
    loop {
        let Some(node) = tree.get(id) else {
            return false;
        };
        if node.is_unterminated() {
            return true;
        }
        match node.children().last() {
            Some(last) if tree.get(last.node).is_some_and(|c| last.offset + c.size == node.size) => {
                id = last.node;
            }
            _ => return false,
        }
    }
}

/// Apply `change` (relative to the node) to the node that contains it.
fn damage_target(tree: &mut NodeTree, target: NodeId, change: TextChange) {
    let delta = change.delta();
    let removed = change.old_span();
    let removal = !change.is_insertion();

    // An exclusive end at the removal start stays; ends inside it collapse.
    let map_end = |pos: u32| {
        if pos <= removed.start {
            pos
        } else if pos >= removed.end {
            shift(pos, delta)
        } else {
            removed.start
        }
    };
    let map_start = |pos: u32| {
        if pos >= removed.end {
            shift(pos, delta)
        } else {
            pos
        }
    };

    let Some(node) = tree.get(target) else {
        return;
    };
    let doomed: SmallVec<[NodeId; 4]> = node
        .children()
        .iter()
        .filter(|entry| {
            let size = tree.get(entry.node).map_or(0, |c| c.size());
            removal && entry.offset < removed.end && removed.start < entry.offset + size
        })
        .map(|entry| entry.node)
        .collect();
    for child in doomed {
        if tree.remove_node(target, child).is_ok() {
            tree.free_subtree(child);
        }
    }

    let Some(node) = tree.get_mut(target) else {
        return;
    };
    node.size = shift(node.size, delta);
    for entry in &mut node.children {
        entry.offset = map_start(entry.offset);
    }
    node.units.retain(|unit| !(removal && removed.start <= unit.start && unit.start < removed.end));
    for unit in &mut node.units {
        *unit = UnitMark {
            start: map_start(unit.start),
            end: map_end(unit.end),
            lookahead: map_end(unit.lookahead),
        };
    }
    node.issues.retain(|issue| !(removal && removed.intersects(issue.span)));
    for issue in &mut node.issues {
        issue.span = Span::new(map_end(issue.span.start), map_end(issue.span.end));
    }

    let inserted = change.new_span();
    node.damage = Some(match node.damage {
        Some(old) => Span::new(map_end(old.start), map_end(old.end)).merge(inserted),
        None => inserted,
    });
    node.status = NodeStatus::Damaged;
}
