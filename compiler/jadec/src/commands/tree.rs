//! `jade tree`: parse a file and print its node tree.

use std::io::Write;

use jade_parse::ParsedTree;

use super::{read_file, write_tree};
use crate::{CliError, Options};

pub fn tree_file(path: &str, options: &Options, out: &mut dyn Write) -> Result<(), CliError> {
    let source = read_file(path)?;
    let parsed = ParsedTree::parse_with_config(&source, options.config);
    if options.config.verify_invariants {
        parsed.validate()?;
    }
    writeln!(out, "Tree for '{path}' ({} bytes):", parsed.len())?;
    write_tree(out, &parsed)
}
