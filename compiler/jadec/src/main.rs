//! Jade CLI
//!
//! Inspect the incremental Java parse tree and decode JVM signatures.

use std::io::Write;

use jadec::commands::{check_files, describe_signature, edit_file, lex_file, tree_file, unescape};
use jadec::{init_tracing, CliError, Options};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = run(&args[1], &args[2..], &mut out);
    let _ = out.flush();

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

/// Run one command. `Ok(false)` means the command ran but found problems.
fn run(command: &str, rest: &[String], out: &mut dyn Write) -> Result<bool, CliError> {
    match command {
        "lex" => {
            let [path] = rest else {
                return Err(CliError::Usage("jade lex <file.java>"));
            };
            lex_file(path, out)?;
        }
        "tree" => {
            let (options, positional) = Options::parse(rest)?;
            let [path] = positional.as_slice() else {
                return Err(CliError::Usage(
                    "jade tree <file.java> [--restart=unit|node] [--verify]",
                ));
            };
            tree_file(path, &options, out)?;
        }
        "edit" => {
            let (options, positional) = Options::parse(rest)?;
            let [path, offset, removed, text] = positional.as_slice() else {
                return Err(CliError::Usage(
                    "jade edit <file.java> <offset> <removed> <text> [--restart=unit|node] [--verify] [--settled]",
                ));
            };
            let offset = parse_u32("offset", offset)?;
            let removed = parse_u32("removed length", removed)?;
            edit_file(path, offset, removed, &unescape(text), &options, out)?;
        }
        "check" => {
            if rest.is_empty() {
                return Err(CliError::Usage("jade check <file.java>..."));
            }
            let problems = check_files(rest, out)?;
            return Ok(problems == 0);
        }
        "sig" => {
            let [signature] = rest else {
                return Err(CliError::Usage("jade sig <signature>"));
            };
            describe_signature(signature, out)?;
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            writeln!(out, "jade {}", env!("CARGO_PKG_VERSION"))?;
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            return Ok(false);
        }
    }
    Ok(true)
}

fn parse_u32(what: &'static str, value: &str) -> Result<u32, CliError> {
    value.parse().map_err(|_| CliError::InvalidArgument {
        what,
        value: value.to_string(),
    })
}

fn print_usage() {
    println!("Jade: incremental Java parse trees and JVM signatures");
    println!();
    println!("Usage: jade <command> [options]");
    println!();
    println!("Commands:");
    println!("  lex <file.java>                     Tokenize and display tokens");
    println!("  tree <file.java>                    Parse and display the node tree");
    println!("  edit <file> <at> <len> <text>       Apply one edit and reparse incrementally");
    println!("  check <file.java>...                Report syntax problems");
    println!("  sig <signature>                     Decode a generic signature");
    println!("  help                                Show this help message");
    println!("  version                             Show version information");
    println!();
    println!("Options:");
    println!("  --restart=unit|node   Restart damaged nodes at a unit boundary (default) or at the start");
    println!("  --verify              Validate the tree after every reparse");
    println!("  --settled             Report problems near the edit and unclosed constructs");
    println!();
    println!("Edit text accepts \\n, \\t and \\\\ escapes.");
    println!("Set {}=<filter> for logs, e.g. {}=jade_parse=debug", jadec::LOG_ENV, jadec::LOG_ENV);
    println!();
    println!("Examples:");
    println!("  jade tree Main.java");
    println!("  jade edit Main.java 42 0 'int y = 2;\\n'");
    println!("  jade sig 'Ljava/util/Map<Ljava/lang/String;[I>;'");
}
