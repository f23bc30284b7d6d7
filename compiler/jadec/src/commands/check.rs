//! `jade check`: report settled syntax problems for a set of files.

use std::io::Write;
use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use jade_parse::{DiagnosticMode, ParseIssue, ParsedTree};
use rayon::prelude::*;

use super::read_file;
use crate::CliError;

struct Checked {
    path: String,
    source: String,
    issues: Vec<ParseIssue>,
}

/// Parse every file in parallel and render its problems.
///
/// Returns the total number of problems.
pub fn check_files(paths: &[String], out: &mut dyn Write) -> Result<usize, CliError> {
    let checked: Vec<Checked> = paths
        .par_iter()
        .map(|path| {
            let source = read_file(path)?;
            let issues = ParsedTree::parse(&source).diagnostics(DiagnosticMode::Settled);
            Ok(Checked {
                path: path.clone(),
                source,
                issues,
            })
        })
        .collect::<Result<_, CliError>>()?;

    let mut total = 0;
    for file in &checked {
        tracing::debug!(path = %file.path, issues = file.issues.len(), "checked");
        for issue in &file.issues {
            render(out, file, issue)?;
        }
        total += file.issues.len();
    }
    writeln!(out, "{total} problem(s) in {} file(s)", checked.len())?;
    Ok(total)
}

fn render(out: &mut dyn Write, file: &Checked, issue: &ParseIssue) -> Result<(), CliError> {
    let id = file.path.as_str();
    let range = char_range(&file.source, issue.span.to_range());
    Report::build(ReportKind::Error, id, range.start)
        .with_config(Config::default().with_color(false))
        .with_message(issue.kind.to_string())
        .with_label(Label::new((id, range)).with_message(&issue.message))
        .finish()
        .write((id, Source::from(file.source.clone())), &mut *out)?;
    Ok(())
}

/// Reports index characters, issues carry byte offsets.
fn char_range(source: &str, bytes: Range<usize>) -> Range<usize> {
    let to_chars = |offset: usize| {
        let offset = offset.min(source.len());
        source
            .char_indices()
            .take_while(|(index, _)| *index < offset)
            .count()
    };
    to_chars(bytes.start)..to_chars(bytes.end)
}
