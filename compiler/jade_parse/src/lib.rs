//! Incremental, position-tracking parse tree for Java source.
//!
//! The tree records where declarations, bodies and comments are, not what
//! they mean. Each node stores its children at offsets relative to its own
//! start, so an edit only shifts entries on the path from the root, and a
//! reparse only touches the innermost damaged node.
//!
//! ```
//! use jade_parse::{NodeKind, ParsedTree};
//!
//! let mut source = String::from("class C { void m() { int x = 1; } }");
//! let mut tree = ParsedTree::parse(&source);
//!
//! source.insert(30, '2');
//! tree.notify_edit(30, 0, 1).unwrap();
//! let stats = tree.reparse(&source).unwrap();
//! assert_eq!(stats.units_parsed, 1);
//!
//! let at = tree.find_innermost_node_at(25).unwrap();
//! assert_eq!(tree.node(at.node).unwrap().kind(), NodeKind::MethodBody);
//! ```
//!
//! # Layers
//!
//! - [`tree`]: the node arena and its structural invariants
//! - [`kinds`]: node kinds and the [`NodePolicy`] hooks of each
//! - [`EditorParser`]: the structural Java parser driving the unit loop
//! - [`ParsedTree`]: edit attribution, damage and reparse
//! - [`Document`]: text and tree kept together

mod cursor;
mod diagnostics;
mod document;
mod incremental;
pub mod kinds;
mod parser;
pub mod recovery;
pub mod tree;

pub use cursor::TokenCursor;
pub use diagnostics::{DiagnosticMode, IssueKind, ParseIssue};
pub use document::Document;
pub use incremental::{EditError, ParsedTree, ReparseConfig, ReparseStats, RestartPolicy};
pub use kinds::{Modifiers, NodeKind, NodePolicy, PartialParse, UnitContext};
pub use parser::EditorParser;
pub use tree::{
    ChildEntry, NodeAndPosition, NodeId, NodeStatus, NodeTree, ParsedNode, TreeError, UnitIssue,
    UnitMark,
};
