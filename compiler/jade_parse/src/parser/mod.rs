//! Structural Java parser driving the node tree.
//!
//! The parser does not build an AST. It walks declarations and statements
//! just far enough to find unit boundaries and the nested bodies that become
//! child nodes. Expressions are skipped as balanced token runs.
//!
//! # Frames
//!
//! Every construct that could become a node opens a [`Frame`]. Whether a
//! node is actually created is decided by the nearest enclosing frame that
//! owns a node, through [`NodePolicy::is_delimiting_node`]. Rejected
//! constructs get a suppressed frame and are parsed into the enclosing unit.

mod item;
mod stmt;

use smallvec::SmallVec;

use jade_ir::{Span, Token, TokenKind};
use jade_lexer::Lexer;
use jade_stack::ensure_sufficient_stack;

use crate::cursor::TokenCursor;
use crate::kinds::{Modifiers, NodeKind, NodePolicy, PartialParse, UnitContext};
use crate::recovery::TokenSet;
use crate::tree::{ChildEntry, NodeId, NodeStatus, NodeTree, ParsedNode, TreeError, UnitIssue, UnitMark};

/// A construct being parsed.
#[derive(Copy, Clone, Debug)]
struct Frame {
    /// `None` when the enclosing node flattens this construct.
    node: Option<NodeId>,
    kind: NodeKind,
    /// Absolute start.
    start: u32,
}

/// How the contents of a node ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Contents {
    /// The end marker was consumed; `end` is its absolute end.
    Terminated { end: u32 },
    /// The token stream ran out first.
    EndOfStream,
    /// The rest of the old contents, up to the old end marker, was
    /// re-attached unchanged.
    Reused,
    /// The text no longer parses as the node's kind.
    Abandon,
}

/// Old units, children and issues of a node being reparsed, detached at the
/// restart point and offered back to the unit loop.
#[derive(Debug, Default)]
pub(crate) struct TailReuse {
    /// Units at or after this relative offset are unaffected by the edit.
    pub clean_from: u32,
    pub units: Vec<UnitMark>,
    pub children: Vec<ChildEntry>,
    pub issues: Vec<UnitIssue>,
    /// Relative starts of the detached comment units.
    pub comment_starts: Vec<u32>,
    /// Number of non-comment units kept before the restart point.
    pub kept_items: usize,
}

impl TailReuse {
    /// Whether the old unit starting at `rel` was the first non-comment unit.
    fn was_first_item(&self, rel: u32) -> bool {
        self.kept_items == 0
            && self
                .units
                .iter()
                .take_while(|unit| unit.start < rel)
                .all(|unit| self.comment_starts.contains(&unit.start))
    }

    /// Release whatever was not re-attached.
    pub(crate) fn discard(self, tree: &mut NodeTree) {
        for entry in self.children {
            tree.free_subtree(entry.node);
        }
    }
}

/// Counters reported back to the reparse driver.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct ParserReport {
    pub units_parsed: usize,
    pub units_reused: usize,
    pub subtrees_reused: usize,
}

/// Parser over a token stream that records units and child nodes into a
/// [`NodeTree`].
pub struct EditorParser<'t, 'src> {
    tree: &'t mut NodeTree,
    source: &'src str,
    cursor: TokenCursor<Lexer<'src>>,
    limit: u32,
    frames: SmallVec<[Frame; 16]>,
    /// Absolute start of the unit being parsed in the nearest real node.
    unit_start: u32,
    tail: Option<TailReuse>,
    report: ParserReport,
    abandoned: bool,
    failure: Option<TreeError>,
}

impl<'t, 'src> EditorParser<'t, 'src> {
    /// Create a parser that fills `node`, which starts at absolute `start`.
    /// Tokens come from `lexer`, which must be positioned inside the node.
    pub(crate) fn new(
        tree: &'t mut NodeTree,
        source: &'src str,
        lexer: Lexer<'src>,
        node: NodeId,
        kind: NodeKind,
        start: u32,
    ) -> Self {
        let limit = lexer.limit();
        let mut frames = SmallVec::new();
        frames.push(Frame {
            node: Some(node),
            kind,
            start,
        });
        EditorParser {
            tree,
            source,
            cursor: TokenCursor::new(lexer),
            limit,
            frames,
            unit_start: start,
            tail: None,
            report: ParserReport::default(),
            abandoned: false,
            failure: None,
        }
    }

    /// Offer old units to the unit loop of the parser's own node.
    pub(crate) fn with_tail(mut self, tail: TailReuse) -> Self {
        self.tail = Some(tail);
        self
    }

    /// Parse the contents of the parser's own node.
    pub(crate) fn run(&mut self) -> Contents {
        let Some(root) = self.frames.first().copied() else {
            return Contents::Abandon;
        };
        match root.node {
            Some(node) => self.parse_contents(Some(node), root.kind.policy(), root.start),
            None => Contents::Abandon,
        }
    }

    /// Finish parsing: return counters and the unused part of the tail.
    pub(crate) fn finish(self) -> Result<(ParserReport, Option<TailReuse>), TreeError> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok((self.report, self.tail)),
        }
    }

    // === Token access ===

    #[inline]
    pub(crate) fn current(&mut self) -> Token {
        self.cursor.current()
    }

    #[inline]
    pub(crate) fn current_kind(&mut self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    pub(crate) fn nth_kind(&mut self, n: usize) -> TokenKind {
        self.cursor.nth_kind(n)
    }

    #[inline]
    pub(crate) fn at(&mut self, kind: TokenKind) -> bool {
        self.cursor.at(kind)
    }

    #[inline]
    pub(crate) fn bump(&mut self) -> Token {
        self.cursor.bump()
    }

    #[inline]
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    /// Text of a token.
    #[inline]
    pub(crate) fn text(&self, token: Token) -> &'src str {
        token.text(self.source)
    }

    /// True if the `n`-th significant token is an identifier spelled `word`.
    pub(crate) fn nth_is_word(&mut self, n: usize, word: &str) -> bool {
        let token = self.cursor.nth(n);
        token.kind == TokenKind::Ident && self.text(token) == word
    }

    // === Issues ===

    /// Record a problem on the nearest real node.
    pub(crate) fn error_at(&mut self, span: Span, message: impl Into<String>) {
        let Some(frame) = self.nearest_real() else {
            return;
        };
        let Some(node) = frame.node.and_then(|id| self.tree.get_mut(id)) else {
            return;
        };
        let start = span.start.max(frame.start);
        let end = span.end.max(start);
        node.issues.push(UnitIssue {
            span: Span::new(start - frame.start, end - frame.start),
            message: message.into(),
        });
    }

    /// Report a missing construct right after the last token of the unit,
    /// or at the current token when the unit has consumed nothing yet.
    pub(crate) fn expected(&mut self, what: &str) {
        let span = match self.cursor.previous() {
            Some(token) if token.span.start >= self.unit_start => token.span,
            _ => self.current().span,
        };
        self.error_at(span, format!("expected {what}"));
    }

    /// Report the current token as unexpected and consume it.
    pub(crate) fn unexpected(&mut self) {
        let token = self.bump();
        let name = token.kind.display_name();
        self.error_at(token.span, format!("unexpected {name}"));
    }

    // === Frames ===

    fn nearest_real(&self) -> Option<Frame> {
        self.frames.iter().rev().find(|frame| frame.node.is_some()).copied()
    }

    /// Open a construct of `kind` starting at absolute `start`.
    pub(crate) fn begin_node(&mut self, kind: NodeKind, start: u32) {
        let delimited = self
            .nearest_real()
            .is_some_and(|frame| frame.kind.policy().is_delimiting_node(kind));
        let node = delimited.then(|| {
            let mut node = ParsedNode::new(kind);
            // Provisional: children are inserted before the end is known.
            node.size = self.limit.saturating_sub(start);
            self.tree.alloc(node)
        });
        self.frames.push(Frame { node, kind, start });
    }

    /// Attach a name and modifiers to the innermost open construct.
    pub(crate) fn describe(&mut self, name: Option<String>, modifiers: Modifiers) {
        let Some(id) = self.frames.last().and_then(|frame| frame.node) else {
            return;
        };
        if let Some(node) = self.tree.get_mut(id) {
            node.name = name;
            node.modifiers = modifiers;
        }
    }

    /// Close the innermost construct at absolute `end` and insert it into
    /// the nearest real ancestor.
    pub(crate) fn end_node(&mut self, end: u32, unterminated: bool) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let Some(id) = frame.node else {
            return;
        };
        let size = end.saturating_sub(frame.start);
        if let Some(node) = self.tree.get_mut(id) {
            node.size = size;
            node.unterminated = unterminated;
            node.status = if unterminated {
                NodeStatus::Unterminated
            } else {
                NodeStatus::Valid
            };
            for issue in &mut node.issues {
                issue.span = Span::new(issue.span.start.min(size), issue.span.end.min(size));
            }
        }
        let Some(parent) = self.nearest_real() else {
            return;
        };
        let Some(parent_id) = parent.node else {
            return;
        };
        if let Err(error) = self.tree.insert_node(parent_id, frame.start - parent.start, id) {
            self.tree.free_subtree(id);
            self.fail(error);
        }
    }

    fn fail(&mut self, error: TreeError) {
        if self.failure.is_none() {
            tracing::error!(%error, "node insertion failed");
            self.failure = Some(error);
        }
    }

    // === Unit loop ===

    /// Parse units of a node until its end marker or the end of the stream.
    ///
    /// `node` is `None` for a flattened construct: units are parsed with
    /// the same policy but not recorded.
    fn parse_contents(
        &mut self,
        node: Option<NodeId>,
        policy: &'static dyn NodePolicy,
        base: u32,
    ) -> Contents {
        let outer_unit_start = self.unit_start;
        let owns_tail = node.is_some() && node == self.frames.first().and_then(|frame| frame.node);
        let mut first = match (node, &self.tail) {
            (Some(_), Some(tail)) if owns_tail => tail.kept_items == 0,
            _ => true,
        };

        let contents = loop {
            let raw = self.cursor.current_raw();
            if owns_tail && self.try_reuse_tail(node, base, raw.span.start, first) {
                break Contents::Reused;
            }
            if policy.is_node_end_marker(raw.kind) {
                self.cursor.bump_raw();
                break Contents::Terminated { end: raw.span.end };
            }
            if raw.kind == TokenKind::Eof {
                if owns_tail && self.ran_past_limit() {
                    break Contents::Abandon;
                }
                break Contents::EndOfStream;
            }
            if node.is_none() && raw.kind.is_trivia() {
                self.cursor.bump_raw();
                continue;
            }

            self.unit_start = raw.span.start;
            let consumed = self.cursor.consumed();
            let outcome = if raw.kind.is_comment()
                && policy.is_delimiting_node(NodeKind::Comment)
                && NodeKind::Comment.policy().is_node_end_marker(raw.kind)
            {
                self.comment_unit(raw);
                PartialParse::Unit
            } else if raw.kind == TokenKind::UnterminatedComment {
                self.cursor.bump_raw();
                first = false;
                PartialParse::Error {
                    span: raw.span,
                    message: "unterminated comment".to_string(),
                }
            } else {
                let ctx = UnitContext { first };
                first = false;
                policy.do_partial_parse(self, ctx)
            };
            self.report.units_parsed += 1;
            tracing::trace!(kind = %policy.kind(), start = raw.span.start, ?outcome, "unit");

            let reported = match outcome {
                PartialParse::Unit => false,
                PartialParse::Error { span, message } => {
                    self.error_at(span, message);
                    true
                }
                PartialParse::Abandon => break Contents::Abandon,
            };
            if self.cursor.consumed() == consumed {
                if reported {
                    self.bump();
                } else {
                    self.unexpected();
                }
            }
            if self.abandoned || self.failure.is_some() {
                break Contents::Abandon;
            }

            if let Some(id) = node {
                let end = self.cursor.last_end();
                let lookahead = self.cursor.lexed_end().max(end);
                if let Some(target) = self.tree.get_mut(id) {
                    target.units.push(UnitMark {
                        start: raw.span.start - base,
                        end: end - base,
                        lookahead: lookahead - base,
                    });
                }
            }
        };

        self.unit_start = outer_unit_start;
        contents
    }

    /// A standalone comment becomes its own node.
    fn comment_unit(&mut self, token: Token) {
        self.begin_node(NodeKind::Comment, token.span.start);
        self.cursor.bump_raw();
        self.end_node(token.span.end, false);
    }

    /// The stream is bounded inside the document and its last comment or
    /// literal ran into the bound: it may really end further on. A line
    /// comment cut right before a line break ends there anyway.
    fn ran_past_limit(&self) -> bool {
        let Some(token) = self.cursor.open_ended() else {
            return false;
        };
        let Some(&next) = self.source.as_bytes().get(self.limit as usize) else {
            return false;
        };
        token.span.end == self.limit
            && !(token.kind == TokenKind::LineComment && matches!(next, b'\n' | b'\r'))
    }

    /// Re-attach the old tail if the next unit would start where an old,
    /// unaffected unit started.
    fn try_reuse_tail(&mut self, node: Option<NodeId>, base: u32, at: u32, first: bool) -> bool {
        let Some(id) = node else {
            return false;
        };
        let rel = at - base;
        let Some(tail) = self.tail.as_mut() else {
            return false;
        };
        if rel < tail.clean_from
            || tail.units.binary_search_by_key(&rel, |unit| unit.start).is_err()
            || tail.was_first_item(rel) != first
        {
            return false;
        }

        let units_at = tail.units.partition_point(|unit| unit.start < rel);
        let units = tail.units.split_off(units_at);
        let children_at = tail.children.partition_point(|entry| entry.offset < rel);
        let children = tail.children.split_off(children_at);
        let issues: Vec<UnitIssue> = tail
            .issues
            .iter()
            .filter(|issue| issue.span.start >= rel)
            .cloned()
            .collect();

        self.report.units_reused += units.len();
        self.report.subtrees_reused += children.len();
        tracing::debug!(offset = at, units = units.len(), children = children.len(), "reusing tail");

        if let Some(target) = self.tree.get_mut(id) {
            target.units.extend(units);
            target.children.extend(children);
            target.issues.extend(issues);
        }
        true
    }

    // === Nested bodies ===

    /// Parse a `{ ... }` body of `kind` at the current `{`. Returns the
    /// absolute end of the body.
    pub(crate) fn parse_body(&mut self, kind: NodeKind) -> u32 {
        ensure_sufficient_stack(|| self.parse_body_at_brace(kind))
    }

    fn parse_body_at_brace(&mut self, kind: NodeKind) -> u32 {
        let open = self.current();
        self.begin_node(kind, open.span.start);
        self.bump();
        let node = self.frames.last().and_then(|frame| frame.node);
        let contents = self.parse_contents(node, kind.policy(), open.span.start);
        let (end, unterminated) = match contents {
            Contents::Terminated { end } => (end, false),
            Contents::EndOfStream => (self.limit, true),
            Contents::Reused | Contents::Abandon => {
                self.abandoned = true;
                (self.limit, true)
            }
        };
        self.end_node(end, unterminated);
        end
    }

    // === Skipping ===

    /// Skip tokens up to (not including) one in `stop` outside any bracket
    /// group. Stops at an unmatched `}` without consuming it.
    ///
    /// Returns `true` if a token in `stop` was reached.
    pub(crate) fn skip_balanced_until(&mut self, stop: TokenSet) -> bool {
        self.skip_tokens(stop, SmallVec::new())
    }

    /// Skip the bracket group opening at the current token.
    ///
    /// Returns `false` if the group is not closed.
    pub(crate) fn skip_group(&mut self) -> bool {
        let kind = self.current_kind();
        if !matches!(kind, TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace) {
            return false;
        }
        self.bump();
        let mut open = SmallVec::new();
        open.push(kind);
        self.skip_tokens(TokenSet::new(), open)
    }

    fn skip_tokens(&mut self, stop: TokenSet, mut open: SmallVec<[TokenKind; 16]>) -> bool {
        let group = !open.is_empty();
        loop {
            let kind = self.current_kind();
            if kind == TokenKind::Eof {
                return false;
            }
            if open.is_empty() && stop.contains(kind) {
                return true;
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => open.push(kind),
                TokenKind::RBrace => {
                    let Some(at) = open.iter().rposition(|&k| k == TokenKind::LBrace) else {
                        return false;
                    };
                    open.truncate(at);
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    let opener = if kind == TokenKind::RParen {
                        TokenKind::LParen
                    } else {
                        TokenKind::LBracket
                    };
                    if open.last() == Some(&opener) {
                        open.pop();
                    }
                }
                _ => {}
            }
            self.bump();
            if group && open.is_empty() {
                return true;
            }
        }
    }

    /// Skip `<...>` at the current `<`, counting nested angle brackets.
    /// Stops early at tokens that cannot appear inside type arguments.
    pub(crate) fn skip_angles(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.current_kind() {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                TokenKind::Eof
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::Semi
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::Eq => return,
                _ => {}
            }
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests;
