//! Property tests: incremental reparse agrees with a parse from scratch.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use jade_parse::{DiagnosticMode, NodeStatus, ParsedTree, ReparseConfig};
use proptest::prelude::*;

/// Documents without comments or literals whose lexing could depend on
/// text far away.
const DOCUMENTS: &[&str] = &[
    "class C { void m() { int x = 1; } }",
    "class A { int f; void a() { one(); two(); } void b(int k) { if (k > 0) { k--; } } }",
    "interface I { int K = 1; void f(); default int g() { return K; } }",
    "enum E { A, B(2), C; int n; E() { n = 0; } }",
    "class O { class In { void i() { } } static { init(); } void o() { class L { } } }",
    "record R(int a) { R { check(a); } int twice() { return a + a; } }",
    "void top() { go(); } class T { }",
];

/// Documents whose comments and literals hide braces.
const LEXICAL_DOCUMENTS: &[&str] = &[
    "class S { String s = \"{ not a body }\"; /* } */ char c = '{'; // }\n void m() { say(\"}\"); } }",
    "/** doc */ class D { // first\n int a; /* two\n lines */ void f() { g('x'); } }",
    "class C { void m() { // x\n go(); } }",
];

/// An edit: `at` and `len` are fractions of the document resolved against
/// its current text.
#[derive(Clone, Debug)]
struct Edit {
    at: prop::sample::Index,
    len: usize,
    inserted: String,
}

fn words() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("x"),
        Just("int"),
        Just("1"),
        Just(" "),
        Just("\n"),
        Just(";"),
        Just("="),
        Just("("),
        Just(")"),
        Just(","),
        Just("+"),
        Just("."),
        Just("return"),
        Just("void"),
        Just("static"),
    ]
}

fn delimiters() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("{"),
        Just("}"),
        Just("/*"),
        Just("*/"),
        Just("//"),
        Just("\""),
        Just("'"),
        Just("class K "),
        Just("void n() "),
    ]
}

fn inserted_text(parts: impl Strategy<Value = &'static str>) -> impl Strategy<Value = String> {
    prop::collection::vec(parts, 0..5).prop_map(|parts| parts.concat())
}

fn edit() -> impl Strategy<Value = Edit> {
    (any::<prop::sample::Index>(), 0..6usize, inserted_text(words()))
        .prop_map(|(at, len, inserted)| Edit { at, len, inserted })
}

fn structural_edit() -> impl Strategy<Value = Edit> {
    let parts = prop_oneof![3 => words(), 2 => delimiters()];
    (any::<prop::sample::Index>(), 0..4usize, inserted_text(parts))
        .prop_map(|(at, len, inserted)| Edit { at, len, inserted })
}

/// Resolve `edit` against `text`. With `keep_braces`, the removal stops
/// before the first brace.
fn resolve(text: &str, edit: &Edit, keep_braces: bool) -> (u32, u32) {
    let offset = edit.at.index(text.len() + 1);
    let removed = text.as_bytes()[offset..]
        .iter()
        .take(edit.len)
        .take_while(|&&b| !keep_braces || (b != b'{' && b != b'}'))
        .count();
    (
        u32::try_from(offset).unwrap(),
        u32::try_from(removed).unwrap(),
    )
}

fn apply(text: &mut String, tree: &mut ParsedTree, edit: &Edit, keep_braces: bool) -> (u32, u32, u32) {
    let (offset, removed) = resolve(text, edit, keep_braces);
    let start = offset as usize;
    text.replace_range(start..start + removed as usize, &edit.inserted);
    let inserted = u32::try_from(edit.inserted.len()).unwrap();
    tree.notify_edit(offset, removed, inserted).unwrap();
    (offset, removed, inserted)
}

/// Offsets where an edit ended, carried forward through later edits.
#[derive(Debug, Default)]
struct EditEnds(Vec<u32>);

impl EditEnds {
    fn record(&mut self, offset: u32, removed: u32, inserted: u32) {
        let old_end = offset + removed;
        let new_end = offset + inserted;
        let mut moved = vec![new_end];
        for &end in &self.0 {
            if end < offset {
                moved.push(end);
            } else if end >= old_end && end > offset {
                moved.push(end - removed + inserted);
            } else {
                moved.extend([offset, new_end]);
            }
        }
        moved.sort_unstable();
        moved.dedup();
        self.0 = moved;
    }
}

/// A body whose closing brace was cut by an edit stays unterminated at the
/// cut instead of running on into its parent's closing brace, which is
/// where a parse from scratch would take it.
fn holds_a_cut_body(tree: &ParsedTree, ends: &EditEnds) -> bool {
    let nodes = tree.tree();
    nodes.descendants(tree.root()).into_iter().any(|at| {
        nodes[at.node].status() == NodeStatus::Unterminated && ends.0.contains(&at.end())
    })
}

fn verified(text: &str) -> ParsedTree {
    ParsedTree::parse_with_config(
        text,
        ReparseConfig {
            verify_invariants: true,
            ..ReparseConfig::default()
        },
    )
}

fn outline(tree: &ParsedTree) -> Vec<String> {
    let nodes = tree.tree();
    nodes
        .descendants(tree.root())
        .into_iter()
        .map(|at| {
            let node = &nodes[at.node];
            let units: Vec<_> = node.units().iter().map(|u| (u.start, u.end)).collect();
            format!(
                "{} {} {:?} {} {:?} {units:?}",
                nodes.depth(at.node),
                node.kind(),
                node.name(),
                at.span(),
                node.status()
            )
        })
        .collect()
}

fn settled(tree: &ParsedTree) -> Vec<String> {
    let mut issues: Vec<_> = tree
        .diagnostics(DiagnosticMode::Settled)
        .iter()
        .map(ToString::to_string)
        .collect();
    issues.sort();
    issues
}

proptest! {
    /// Reparsing after every edit yields the tree a fresh parse would.
    #[test]
    fn reparse_after_each_edit_matches_full_parse(
        document in prop::sample::select(DOCUMENTS),
        edits in prop::collection::vec(edit(), 1..8),
    ) {
        let mut text = document.to_string();
        let mut tree = verified(&text);
        for edit in &edits {
            apply(&mut text, &mut tree, edit, true);
            tree.reparse(&text).unwrap();
            let full = ParsedTree::parse(&text);
            prop_assert_eq!(outline(&tree), outline(&full), "text: {:?}", text);
            prop_assert_eq!(settled(&tree), settled(&full), "text: {:?}", text);
        }
    }

    /// Edits that add and remove braces, comment delimiters and quotes.
    /// After every edit the tree matches a fresh parse, unless it holds a
    /// body cut at an edit.
    #[test]
    fn structural_edits_match_full_parse(
        document in prop::sample::select(
            DOCUMENTS.iter().chain(LEXICAL_DOCUMENTS).copied().collect::<Vec<_>>()
        ),
        edits in prop::collection::vec(structural_edit(), 1..8),
    ) {
        let mut text = document.to_string();
        let mut tree = verified(&text);
        let mut ends = EditEnds::default();
        for edit in &edits {
            let (offset, removed, inserted) = apply(&mut text, &mut tree, edit, false);
            ends.record(offset, removed, inserted);
            tree.reparse(&text).unwrap();
            let full = ParsedTree::parse(&text);
            if outline(&tree) != outline(&full) {
                prop_assert!(
                    holds_a_cut_body(&tree, &ends),
                    "text: {:?}\nincremental: {:#?}\nfull: {:#?}",
                    text,
                    outline(&tree),
                    outline(&full)
                );
                continue;
            }
            prop_assert_eq!(settled(&tree), settled(&full), "text: {:?}", text);
        }
    }

    /// Undoing a run of structural edits brings back the original tree,
    /// unless a body was left cut at an edit.
    #[test]
    fn undoing_structural_edits_restores_the_tree(
        document in prop::sample::select(LEXICAL_DOCUMENTS),
        edits in prop::collection::vec(structural_edit(), 1..5),
    ) {
        let mut text = document.to_string();
        let mut tree = verified(&text);
        let mut ends = EditEnds::default();
        let mut undo = Vec::new();
        for edit in &edits {
            let before = text.clone();
            let (offset, removed, inserted) = apply(&mut text, &mut tree, edit, false);
            ends.record(offset, removed, inserted);
            let start = offset as usize;
            undo.push((offset, inserted, before[start..start + removed as usize].to_string()));
            tree.reparse(&text).unwrap();
        }
        while let Some((offset, removed, restored)) = undo.pop() {
            let start = offset as usize;
            text.replace_range(start..start + removed as usize, &restored);
            let inserted = u32::try_from(restored.len()).unwrap();
            tree.notify_edit(offset, removed, inserted).unwrap();
            ends.record(offset, removed, inserted);
            tree.reparse(&text).unwrap();
        }
        prop_assert_eq!(text.as_str(), document);
        let full = ParsedTree::parse(&text);
        prop_assert!(
            outline(&tree) == outline(&full) || holds_a_cut_body(&tree, &ends),
            "incremental: {:#?}\nfull: {:#?}",
            outline(&tree),
            outline(&full)
        );
    }

    /// Several edits reported before a single reparse.
    #[test]
    fn batched_edits_match_full_parse(
        document in prop::sample::select(DOCUMENTS),
        edits in prop::collection::vec(edit(), 1..5),
    ) {
        let mut text = document.to_string();
        let mut tree = verified(&text);
        for edit in &edits {
            apply(&mut text, &mut tree, edit, true);
        }
        prop_assert_eq!(tree.len() as usize, text.len());
        tree.reparse(&text).unwrap();
        tree.validate().unwrap();
        let full = ParsedTree::parse(&text);
        prop_assert_eq!(outline(&tree), outline(&full), "text: {:?}", text);
        prop_assert_eq!(settled(&tree), settled(&full), "text: {:?}", text);
    }

    /// Every node found by a lookup contains the queried offset, and its
    /// absolute position agrees with the offsets on its path.
    #[test]
    fn lookups_stay_consistent_with_positions(
        document in prop::sample::select(DOCUMENTS),
        edit in structural_edit(),
        point in any::<prop::sample::Index>(),
    ) {
        let mut text = document.to_string();
        let mut tree = verified(&text);
        apply(&mut text, &mut tree, &edit, false);
        tree.reparse(&text).unwrap();

        let offset = u32::try_from(point.index(text.len() + 1)).unwrap();
        if let Some(at) = tree.find_innermost_node_at(offset) {
            prop_assert!(at.position <= offset && offset < at.end());
            prop_assert_eq!(tree.tree().absolute_position(at.node), Some(at.position));
            prop_assert_eq!(tree.span_of(at.node), Some(at.span()));
        }
    }
}
