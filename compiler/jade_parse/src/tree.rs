//! Node arena with parent-relative positions.
//!
//! Every node stores its children as `(offset, node)` entries relative to
//! its own start, so an edit only has to touch the entries that follow it
//! on the path from the root. Absolute positions are recovered by summing
//! offsets on the way down.
//!
//! # Identity
//!
//! Nodes are addressed by [`NodeId`], a generational index. Freed slots are
//! recycled with a bumped generation, so a handle kept across a reparse can
//! be checked for staleness instead of silently aliasing a new node.

use std::fmt;
use std::ops::{Index, IndexMut};

use jade_ir::{shift, Span};

use crate::kinds::{Modifiers, NodeKind};

/// Generational handle to a node in a [`NodeTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index in the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

/// A child reference: the child's start relative to the parent's start.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChildEntry {
    pub offset: u32,
    pub node: NodeId,
}

/// Parse state of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Created but not yet parsed to completion.
    Unparsed,
    /// Parsed and consistent with the text.
    Valid,
    /// An edit landed inside the node; a reparse is pending.
    Damaged,
    /// Parsed, but the closing delimiter is missing.
    Unterminated,
}

/// One unit parsed directly in a node, relative to the node's start.
///
/// `end` is the end of the unit's last token; `lookahead` is the end of the
/// furthest token the parser examined while parsing it. Reparsing may
/// restart after a unit only if everything up to its lookahead is unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnitMark {
    pub start: u32,
    pub end: u32,
    pub lookahead: u32,
}

impl UnitMark {
    #[inline]
    #[must_use]
    pub(crate) fn map(self, f: impl Fn(u32) -> u32) -> UnitMark {
        UnitMark {
            start: f(self.start),
            end: f(self.end),
            lookahead: f(self.lookahead),
        }
    }
}

/// A syntax problem inside a unit, relative to the node's start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitIssue {
    pub span: Span,
    pub message: String,
}

/// A node of the parse tree.
#[derive(Clone, Debug)]
pub struct ParsedNode {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<ChildEntry>,
    pub(crate) size: u32,
    pub(crate) status: NodeStatus,
    pub(crate) unterminated: bool,
    pub(crate) damage: Option<Span>,
    pub(crate) units: Vec<UnitMark>,
    pub(crate) issues: Vec<UnitIssue>,
    pub(crate) name: Option<String>,
    pub(crate) modifiers: Modifiers,
}

impl ParsedNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        ParsedNode {
            kind,
            parent: None,
            children: Vec::new(),
            size: 0,
            status: NodeStatus::Unparsed,
            unterminated: false,
            damage: None,
            units: Vec::new(),
            issues: Vec::new(),
            name: None,
            modifiers: Modifiers::empty(),
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Parent handle. A lookup only: parents own children, not the reverse.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[ChildEntry] {
        &self.children
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// True when the last parse ran out of input before the closing
    /// delimiter. Survives while the node is damaged.
    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.unterminated
    }

    /// Pending damage, relative to the node's start, in current coordinates.
    #[inline]
    pub fn damage(&self) -> Option<Span> {
        self.damage
    }

    #[inline]
    pub fn units(&self) -> &[UnitMark] {
        &self.units
    }

    #[inline]
    pub fn issues(&self) -> &[UnitIssue] {
        &self.issues
    }

    /// Declared name for type and method declarations.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// End of the child region, relative to this node.
    fn child_end(&self, entry: ChildEntry, tree: &NodeTree) -> u32 {
        entry.offset + tree.get(entry.node).map_or(0, ParsedNode::size)
    }
}

/// A node together with its absolute position, computed on demand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeAndPosition {
    pub node: NodeId,
    pub position: u32,
    pub size: u32,
}

impl NodeAndPosition {
    #[inline]
    pub fn end(&self) -> u32 {
        self.position + self.size
    }

    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.position, self.end())
    }
}

/// Structural errors of the node tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The child interval overlaps a sibling or lies outside the parent.
    #[error("child at {offset}..{end} overlaps a sibling or exceeds its parent of size {parent_size}")]
    OutOfOrder {
        offset: u32,
        end: u32,
        parent_size: u32,
    },
    /// The handle refers to a freed slot.
    #[error("stale node handle {0:?}")]
    StaleNode(NodeId),
    /// A structural invariant does not hold.
    #[error("tree invariant violated at {node:?}: {reason}")]
    Corrupt { node: NodeId, reason: String },
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<ParsedNode>,
}

/// Arena of [`ParsedNode`]s.
#[derive(Clone, Debug, Default)]
pub struct NodeTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl NodeTree {
    pub fn new() -> Self {
        NodeTree::default()
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "node counts are far below u32::MAX"
    )]
    pub(crate) fn alloc(&mut self, node: ParsedNode) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Look up a node; `None` for stale handles.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&ParsedNode> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut ParsedNode> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    #[inline]
    pub(crate) fn try_get_mut(&mut self, id: NodeId) -> Result<&mut ParsedNode, TreeError> {
        self.get_mut(id).ok_or(TreeError::StaleNode(id))
    }

    #[inline]
    pub(crate) fn try_get(&self, id: NodeId) -> Result<&ParsedNode, TreeError> {
        self.get(id).ok_or(TreeError::StaleNode(id))
    }

    /// True if the handle refers to a live node.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Children of a node; empty for stale handles.
    pub fn children(&self, id: NodeId) -> &[ChildEntry] {
        self.get(id).map_or(&[], ParsedNode::children)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(ParsedNode::parent)
    }

    /// Number of ancestors.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Offset of `child` inside `parent`.
    pub fn offset_in_parent(&self, parent: NodeId, child: NodeId) -> Option<u32> {
        self.get(parent)?
            .children
            .iter()
            .find(|entry| entry.node == child)
            .map(|entry| entry.offset)
    }

    /// Absolute position, by summing offsets up to the root.
    pub fn absolute_position(&self, id: NodeId) -> Option<u32> {
        self.get(id)?;
        let mut position = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            position += self.offset_in_parent(parent, current)?;
            current = parent;
        }
        Some(position)
    }

    /// Insert `node` as a child of `parent` at `offset`, keeping children
    /// sorted. Fails if the interval overlaps a sibling or leaves the parent.
    pub fn insert_node(
        &mut self,
        parent: NodeId,
        offset: u32,
        node: NodeId,
    ) -> Result<(), TreeError> {
        let size = self.try_get(node)?.size;
        let parent_node = self.try_get(parent)?;
        let Some(end) = offset.checked_add(size) else {
            return Err(TreeError::OutOfOrder {
                offset,
                end: u32::MAX,
                parent_size: parent_node.size,
            });
        };
        let out_of_order = TreeError::OutOfOrder {
            offset,
            end,
            parent_size: parent_node.size,
        };
        if end > parent_node.size {
            return Err(out_of_order);
        }
        let at = parent_node
            .children
            .partition_point(|entry| entry.offset < offset);
        if let Some(prev) = at.checked_sub(1).map(|i| parent_node.children[i]) {
            if parent_node.child_end(prev, self) > offset {
                return Err(out_of_order);
            }
        }
        if let Some(next) = parent_node.children.get(at) {
            if next.offset < end || (next.offset == offset && size == 0) {
                return Err(out_of_order);
            }
        }

        self.try_get_mut(parent)?
            .children
            .insert(at, ChildEntry { offset, node });
        self.try_get_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Detach `node` from `parent`. Does not touch the node's descendants.
    pub fn remove_node(&mut self, parent: NodeId, node: NodeId) -> Result<ChildEntry, TreeError> {
        let parent_node = self.try_get_mut(parent)?;
        let at = parent_node
            .children
            .iter()
            .position(|entry| entry.node == node)
            .ok_or(TreeError::StaleNode(node))?;
        let entry = parent_node.children.remove(at);
        if let Some(child) = self.get_mut(node) {
            child.parent = None;
        }
        Ok(entry)
    }

    /// Release a detached subtree back to the arena.
    pub fn free_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(id.index())
                .filter(|slot| slot.generation == id.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.live -= 1;
                stack.extend(node.children.iter().map(|entry| entry.node));
            }
        }
    }

    /// Innermost descendant of `node` whose span contains the absolute
    /// `offset` (`start <= offset < end`). `None` if the offset falls in a
    /// gap between `node`'s children.
    pub fn find_node_at_offset(&self, node: NodeId, offset: u32) -> Option<NodeAndPosition> {
        let base = self.absolute_position(node)?;
        let mut found = None;
        let mut current = node;
        let mut current_pos = base;
        loop {
            let parent = self.get(current)?;
            let hit = parent.children.iter().find_map(|entry| {
                let child = self.get(entry.node)?;
                let start = current_pos + entry.offset;
                (start <= offset && offset < start + child.size).then_some(NodeAndPosition {
                    node: entry.node,
                    position: start,
                    size: child.size,
                })
            });
            match hit {
                Some(at) => {
                    found = Some(at);
                    current = at.node;
                    current_pos = at.position;
                }
                None => return found,
            }
        }
    }

    /// The child of `node` covering the absolute `offset`, or else the
    /// first child starting after it.
    pub fn find_node_at_or_after(&self, node: NodeId, offset: u32) -> Option<NodeAndPosition> {
        let base = self.absolute_position(node)?;
        self.get(node)?.children.iter().find_map(|entry| {
            let child = self.get(entry.node)?;
            let position = base + entry.offset;
            (position + child.size > offset).then_some(NodeAndPosition {
                node: entry.node,
                position,
                size: child.size,
            })
        })
    }

    /// Move every child entry, unit mark, issue and damage bound of `node`
    /// that lies at or after `threshold` (relative) by `delta`.
    pub fn shift_positions_after(
        &mut self,
        node: NodeId,
        threshold: u32,
        delta: i64,
    ) -> Result<(), TreeError> {
        let moved = |pos: u32| {
            if pos >= threshold {
                shift(pos, delta)
            } else {
                pos
            }
        };
        let target = self.try_get_mut(node)?;
        for entry in &mut target.children {
            entry.offset = moved(entry.offset);
        }
        for unit in &mut target.units {
            *unit = unit.map(moved);
        }
        for issue in &mut target.issues {
            issue.span = Span::new(moved(issue.span.start), moved(issue.span.end));
        }
        if let Some(damage) = target.damage {
            target.damage = Some(Span::new(moved(damage.start), moved(damage.end)));
        }
        Ok(())
    }

    /// All live nodes under `root` (inclusive) in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeAndPosition> {
        let mut out = Vec::new();
        let Some(position) = self.absolute_position(root) else {
            return out;
        };
        let mut stack = vec![(root, position)];
        while let Some((id, position)) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            out.push(NodeAndPosition {
                node: id,
                position,
                size: node.size,
            });
            for entry in node.children.iter().rev() {
                stack.push((entry.node, position + entry.offset));
            }
        }
        out
    }

    /// Check every structural invariant below `root`.
    pub fn validate(&self, root: NodeId) -> Result<(), TreeError> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.try_get(id)?;
            let corrupt = |reason: String| TreeError::Corrupt { node: id, reason };

            let mut prev_end = 0;
            for entry in &node.children {
                let child = self.try_get(entry.node)?;
                if child.parent != Some(id) {
                    return Err(corrupt(format!("child {:?} has wrong parent", entry.node)));
                }
                if entry.offset < prev_end {
                    return Err(corrupt(format!(
                        "child {:?} at {} overlaps previous sibling ending at {prev_end}",
                        entry.node, entry.offset
                    )));
                }
                prev_end = entry.offset + child.size;
                if prev_end > node.size {
                    return Err(corrupt(format!(
                        "child {:?} ends at {prev_end}, past size {}",
                        entry.node, node.size
                    )));
                }
                stack.push(entry.node);
            }

            let mut prev_start = None;
            for unit in &node.units {
                if prev_start.is_some_and(|prev| unit.start <= prev) {
                    return Err(corrupt(format!("unit marks out of order at {}", unit.start)));
                }
                if unit.start > unit.end || unit.end > node.size {
                    return Err(corrupt(format!(
                        "unit {}..{} outside size {}",
                        unit.start, unit.end, node.size
                    )));
                }
                prev_start = Some(unit.start);
            }

            for issue in &node.issues {
                if issue.span.start > issue.span.end || issue.span.end > node.size {
                    return Err(corrupt(format!("issue {} outside size {}", issue.span, node.size)));
                }
            }
        }
        Ok(())
    }
}

impl Index<NodeId> for NodeTree {
    type Output = ParsedNode;

    fn index(&self, id: NodeId) -> &ParsedNode {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }
}

impl IndexMut<NodeId> for NodeTree {
    fn index_mut(&mut self, id: NodeId) -> &mut ParsedNode {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }
}
