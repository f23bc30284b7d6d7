//! Command behaviour, through the library entry points and the binary.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::process::Command;

use jadec::commands::{check_files, describe_signature, edit_file, lex_file, tree_file};
use jadec::{CliError, Options};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const METHOD: &str = "class C { void m() { int x = 1; } }";

fn java_file(dir: &TempDir, name: &str, text: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

fn output(run: impl FnOnce(&mut Vec<u8>) -> Result<(), CliError>) -> String {
    let mut out = Vec::new();
    run(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn lex_lists_every_token() {
    let dir = TempDir::new().unwrap();
    let path = java_file(&dir, "A.java", "int x;");
    let text = output(|out| lex_file(&path, out));
    assert!(text.contains("(3 tokens):"), "{text}");
    assert!(text.contains("@ 0..3 \"int\""), "{text}");
    assert!(text.contains("@ 5..6 \";\""), "{text}");
}

#[test]
fn tree_prints_nested_nodes() {
    let dir = TempDir::new().unwrap();
    let path = java_file(&dir, "C.java", METHOD);
    let text = output(|out| tree_file(&path, &Options::default(), out));
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].ends_with("(35 bytes):"), "{text}");
    assert!(lines.iter().any(|l| l.starts_with("  type declaration C @ 0..35")));
    assert!(lines.iter().any(|l| l.contains("method declaration m @ 10..33")));
    assert!(lines.iter().any(|l| l.contains("method body @ 19..33 (1 units)")));
}

#[test]
fn edit_reports_reuse_and_new_spans() {
    let dir = TempDir::new().unwrap();
    let path = java_file(&dir, "C.java", METHOD);
    let text = output(|out| edit_file(&path, 30, 0, "2", &Options::default(), out));
    assert!(
        text.starts_with("Reparsed 1 node(s): 1 unit(s) parsed"),
        "{text}"
    );
    assert!(text.contains("method body @ 19..34"), "{text}");
    assert!(!text.contains("Problems:"), "{text}");
}

#[test]
fn edit_hides_unclosed_bodies_while_typing() {
    let dir = TempDir::new().unwrap();
    let path = java_file(&dir, "C.java", METHOD);
    let typing = output(|out| edit_file(&path, 32, 1, "", &Options::default(), out));
    assert!(!typing.contains("Problems:"), "{typing}");

    let (settled, _) = Options::parse(&["--settled".to_string()]).unwrap();
    let text = output(|out| edit_file(&path, 32, 1, "", &settled, out));
    assert!(text.contains("[unterminated]"), "{text}");
    assert!(text.contains("unclosed method body"), "{text}");
}

#[test]
fn edit_rejects_offsets_past_the_end() {
    let dir = TempDir::new().unwrap();
    let path = java_file(&dir, "C.java", METHOD);
    let mut out = Vec::new();
    let result = edit_file(&path, 99, 0, "x", &Options::default(), &mut out);
    assert!(matches!(result, Err(CliError::Edit(_))));
}

#[test]
fn check_counts_problems_across_files() {
    let dir = TempDir::new().unwrap();
    let good = java_file(&dir, "Good.java", METHOD);
    let bad = java_file(&dir, "Bad.java", "class B { void m() { int x = 1 } }");
    let mut out = Vec::new();
    let problems = check_files(&[good, bad], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(problems >= 1);
    assert!(text.contains("Bad.java"), "{text}");
    assert!(!text.contains("Good.java"), "{text}");
    assert!(text.ends_with(&format!("{problems} problem(s) in 2 file(s)\n")), "{text}");
}

#[test]
fn check_fails_on_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("Missing.java").to_string_lossy().into_owned();
    let mut out = Vec::new();
    assert!(matches!(
        check_files(&[missing], &mut out),
        Err(CliError::NotFound { .. })
    ));
}

#[test]
fn sig_prints_java_form_and_structure() {
    let text = output(|out| describe_signature("Ljava/util/Map<Ljava/lang/String;[I>;", out));
    assert_eq!(
        text,
        "java.util.Map<java.lang.String, int[]>\n\
         \x20 class java.util.Map\n\
         \x20   class java.lang.String\n\
         \x20   array\n\
         \x20     primitive int\n"
    );
}

#[test]
fn sig_reads_class_signatures() {
    let text = output(|out| {
        describe_signature("<T:Ljava/lang/Object;>Ljava/util/ArrayList<TT;>;", out)
    });
    assert!(text.starts_with("type parameter T extends java.lang.Object\n"), "{text}");
    assert!(text.contains("supertype java.util.ArrayList<T>"), "{text}");
}

#[test]
fn sig_reports_malformed_input() {
    let mut out = Vec::new();
    assert!(matches!(
        describe_signature("Ljava/util/List<", &mut out),
        Err(CliError::Signature(_))
    ));
}

fn jade(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_jade"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn binary_exit_codes() {
    let dir = TempDir::new().unwrap();
    let good = java_file(&dir, "Good.java", METHOD);
    let bad = java_file(&dir, "Bad.java", "class B { void m() { int x = 1 } }");

    assert!(jade(&["check", good.as_str()]).status.success());
    assert_eq!(jade(&["check", bad.as_str()]).status.code(), Some(1));

    let missing = jade(&["tree", "does-not-exist.java"]);
    assert_eq!(missing.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&missing.stderr);
    assert!(stderr.contains("error: cannot find file"), "{stderr}");

    let usage = jade(&["edit", good.as_str(), "not-a-number", "0", "x"]);
    assert_eq!(usage.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&usage.stderr).contains("invalid offset"));
}

#[test]
fn binary_decodes_signatures() {
    let run = jade(&["sig", "Ljava/util/List<*>;"]);
    assert!(run.status.success());
    let stdout = String::from_utf8_lossy(&run.stdout);
    assert!(stdout.starts_with("java.util.List<?>\n"), "{stdout}");
}
