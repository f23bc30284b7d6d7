//! `jade lex`: dump the token stream.

use std::io::Write;

use super::read_file;
use crate::CliError;

/// Lex a file and write one token per line.
pub fn lex_file(path: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let source = read_file(path)?;
    let tokens = jade_lexer::lex(&source);

    writeln!(out, "Tokens for '{path}' ({} tokens):", tokens.len())?;
    for token in &tokens {
        writeln!(
            out,
            "  {:?} @ {} {:?}",
            token.kind,
            token.span,
            token.text(&source)
        )?;
    }
    Ok(())
}
