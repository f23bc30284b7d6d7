//! `jade edit`: apply one edit and reparse incrementally.

use std::io::Write;

use jade_parse::Document;

use super::{read_file, write_tree};
use crate::{CliError, Options};

/// Parse `path`, replace `removed` bytes at `offset` with `text`, reparse,
/// and report what the reparse did.
pub fn edit_file(
    path: &str,
    offset: u32,
    removed: u32,
    text: &str,
    options: &Options,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let source = read_file(path)?;
    let mut doc = Document::with_config(source, options.config);
    doc.edit(offset, removed, text)?;
    let stats = doc.reparse()?;
    tracing::debug!(?stats, "edit applied");

    writeln!(
        out,
        "Reparsed {} node(s): {} unit(s) parsed, {} reused ({:.0}%), {} subtree(s) kept, {} escalation(s)",
        stats.nodes_reparsed,
        stats.units_parsed,
        stats.units_reused,
        stats.reuse_rate(),
        stats.subtrees_reused,
        stats.escalations
    )?;
    write_tree(out, doc.tree())?;

    let issues = doc.diagnostics(options.mode)?;
    if !issues.is_empty() {
        writeln!(out)?;
        writeln!(out, "Problems:")?;
        for issue in &issues {
            writeln!(out, "  {issue}")?;
        }
    }
    Ok(())
}

/// Expand `\n`, `\t` and `\\` in an edit text typed on the command line.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::unescape;

    #[test]
    fn unescape_expands_known_sequences() {
        assert_eq!(unescape(r"a\nb\tc\\d"), "a\nb\tc\\d");
        assert_eq!(unescape(r"\q"), r"\q");
        assert_eq!(unescape("tail\\"), "tail\\");
    }
}
