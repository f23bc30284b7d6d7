//! Command handlers for the `jade` binary.
//!
//! Each submodule implements one command. Shared helpers for reading input
//! and printing trees live here.

use std::io::Write;

use jade_parse::{NodeStatus, ParsedTree};

use crate::CliError;

mod check;
mod edit;
mod lex;
mod sig;
mod tree;

pub use check::check_files;
pub use edit::{edit_file, unescape};
pub use lex::lex_file;
pub use sig::describe_signature;
pub use tree::tree_file;

/// Read a Java source file.
pub fn read_file(path: &str) -> Result<String, CliError> {
    let text = std::fs::read_to_string(path).map_err(|error| CliError::read(path, error))?;
    if u32::try_from(text.len()).is_err() {
        return Err(CliError::TooLarge {
            path: path.to_string(),
        });
    }
    Ok(text)
}

/// One line per node, indented by depth.
pub(crate) fn write_tree(out: &mut dyn Write, parsed: &ParsedTree) -> Result<(), CliError> {
    let tree = parsed.tree();
    for at in tree.descendants(parsed.root()) {
        let Some(node) = tree.get(at.node) else {
            continue;
        };
        let indent = "  ".repeat(tree.depth(at.node));
        let name = node.name().map(|name| format!(" {name}")).unwrap_or_default();
        let status = match node.status() {
            NodeStatus::Valid => "",
            NodeStatus::Unterminated => " [unterminated]",
            NodeStatus::Damaged => " [damaged]",
            NodeStatus::Unparsed => " [unparsed]",
        };
        writeln!(
            out,
            "{indent}{}{name} @ {}{status} ({} units)",
            node.kind(),
            at.span(),
            node.units().len()
        )?;
    }
    Ok(())
}
