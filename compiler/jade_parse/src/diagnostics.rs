//! Syntax problems reported to the editor.

use std::fmt;

use jade_ir::Span;

/// How eagerly problems are reported.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum DiagnosticMode {
    /// The user is typing: hide unclosed constructs and issues touching
    /// the last edit.
    #[default]
    Typing,
    /// Report everything.
    Settled,
}

/// Category of a [`ParseIssue`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IssueKind {
    /// A unit did not parse cleanly.
    Syntax,
    /// A body or declaration is missing its closing delimiter.
    Unterminated,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Syntax => write!(f, "syntax error"),
            IssueKind::Unterminated => write!(f, "unterminated"),
        }
    }
}

/// A problem at an absolute span of the document.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseIssue {
    pub span: Span,
    pub message: String,
    pub kind: IssueKind,
}

impl ParseIssue {
    #[inline]
    pub fn is_unterminated(&self) -> bool {
        self.kind == IssueKind::Unterminated
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.span, self.message)
    }
}
