#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use crate::{DiagnosticMode, Modifiers, NodeKind, NodeStatus, ParsedTree};

/// One line per node: depth, kind, name, absolute span and status.
fn outline(source: &str) -> Vec<String> {
    let parsed = ParsedTree::parse(source);
    parsed.validate().unwrap();
    let tree = parsed.tree();
    tree.descendants(parsed.root())
        .into_iter()
        .map(|at| {
            let node = &tree[at.node];
            let indent = "  ".repeat(tree.depth(at.node));
            let name = node.name().map(|n| format!(" {n}")).unwrap_or_default();
            let status = match node.status() {
                NodeStatus::Unterminated => " unterminated",
                _ => "",
            };
            format!("{indent}{}{name} {}{status}", node.kind(), at.span())
        })
        .collect()
}

fn issues(source: &str) -> Vec<(u32, u32, String)> {
    ParsedTree::parse(source)
        .diagnostics(DiagnosticMode::Settled)
        .into_iter()
        .map(|issue| (issue.span.start, issue.span.end, issue.message))
        .collect()
}

fn find(parsed: &ParsedTree, kind: NodeKind, name: &str) -> crate::NodeId {
    let tree = parsed.tree();
    tree.descendants(parsed.root())
        .into_iter()
        .map(|at| at.node)
        .find(|&id| tree[id].kind() == kind && tree[id].name() == Some(name))
        .unwrap()
}

#[test]
fn class_with_method() {
    let source = "class C { void m() { int x = 1; } }";
    let spans: Vec<String> = outline(source);
    assert_eq!(spans.len(), 5);
    assert!(spans[0].starts_with("compilation unit "));
    assert!(spans[1].starts_with("  type declaration C "));
    assert!(spans[2].starts_with("    type body "));
    assert!(spans[3].starts_with("      method declaration m "));
    assert!(spans[4].starts_with("        method body "));

    let parsed = ParsedTree::parse(source);
    let body = parsed.find_innermost_node_at(25).unwrap();
    assert_eq!((body.position, body.size), (19, 14));
    let method = find(&parsed, NodeKind::MethodDecl, "m");
    assert_eq!(parsed.span_of(method).unwrap().to_range(), 10..33);
    assert!(issues(source).is_empty());
}

#[test]
fn body_units_are_recorded_relative_to_the_body() {
    let parsed = ParsedTree::parse("class A { int x; int y; }");
    let body = parsed.find_innermost_node_at(10).unwrap();
    let units = parsed.node(body.node).unwrap().units();
    let extents: Vec<_> = units.iter().map(|u| (u.start, u.end)).collect();
    assert_eq!(extents, vec![(2, 8), (9, 15)]);
    assert!(units.iter().all(|u| u.lookahead >= u.end));
}

#[test]
fn enum_constants_then_members() {
    let source = "enum E { A, B(1) { int k; }, C; void f() { } }";
    let parsed = ParsedTree::parse(source);
    let body = parsed.find_innermost_node_at(9).unwrap();
    let node = parsed.node(body.node).unwrap();
    assert_eq!(node.kind(), NodeKind::EnumBody);
    // The constant list is one unit; the constant body is not a node.
    assert_eq!(node.units().len(), 2);
    assert_eq!(node.children().len(), 1);
    find(&parsed, NodeKind::MethodDecl, "f");
    assert!(issues(source).is_empty());
}

#[test]
fn enum_without_members() {
    let source = "enum E { A, B }";
    let parsed = ParsedTree::parse(source);
    let body = parsed.find_innermost_node_at(9).unwrap();
    assert_eq!(parsed.node(body.node).unwrap().units().len(), 1);
    assert_eq!(body.span().to_range(), 7..15);
    assert!(issues(source).is_empty());
}

#[test]
fn local_class_in_method_body() {
    let source = "class A { void m() { class L { int z; } L l; } }";
    let parsed = ParsedTree::parse(source);
    let local = find(&parsed, NodeKind::TypeDecl, "L");
    let parent = parsed.tree().parent(local).unwrap();
    assert_eq!(parsed.node(parent).unwrap().kind(), NodeKind::MethodBody);
    assert_eq!(parsed.node(parent).unwrap().units().len(), 2);
}

#[test]
fn nested_blocks_are_not_nodes() {
    let source = "class A { void m() { if (a) { b(); } else { c(); } } }";
    let lines = outline(source);
    assert_eq!(lines.len(), 5);
    assert!(issues(source).is_empty());
}

#[test]
fn top_level_members_are_flattened() {
    let source = "void f() { g(); } int x;";
    let parsed = ParsedTree::parse(source);
    let root = parsed.node(parsed.root()).unwrap();
    assert!(root.children().is_empty());
    assert_eq!(root.units().len(), 2);
    assert!(issues(source).is_empty());
}

#[test]
fn standalone_comments_become_nodes() {
    let source = "/** doc */ class A { // note\n int y; /* inline */ }";
    let parsed = ParsedTree::parse(source);
    let comments: Vec<_> = parsed
        .tree()
        .descendants(parsed.root())
        .into_iter()
        .filter(|at| parsed.tree()[at.node].kind() == NodeKind::Comment)
        .map(|at| at.position)
        .collect();
    assert_eq!(comments, vec![0, 21, 37]);
}

#[test]
fn comments_inside_a_unit_are_trivia() {
    let source = "class A { int /* c */ y; }";
    let lines = outline(source);
    assert_eq!(lines.len(), 3);
}

#[test]
fn interface_default_method_and_constant() {
    let source = "interface I { int K = 1; default void f() { } void g(); }";
    let parsed = ParsedTree::parse(source);
    let f = find(&parsed, NodeKind::MethodDecl, "f");
    assert!(parsed.node(f).unwrap().modifiers().contains(Modifiers::DEFAULT));
    let g = find(&parsed, NodeKind::MethodDecl, "g");
    assert!(parsed.node(g).unwrap().children().is_empty());
    assert!(issues(source).is_empty());
}

#[test]
fn record_with_compact_constructor() {
    let source = "record R(int a) { R { } static int twice(int v) { return v; } }";
    let parsed = ParsedTree::parse(source);
    find(&parsed, NodeKind::TypeDecl, "R");
    let ctor = find(&parsed, NodeKind::MethodDecl, "R");
    assert_eq!(parsed.tree().children(ctor).len(), 1);
    let twice = find(&parsed, NodeKind::MethodDecl, "twice");
    assert!(parsed.node(twice).unwrap().modifiers().contains(Modifiers::STATIC));
    assert!(issues(source).is_empty());
}

#[test]
fn annotation_type_with_default_value() {
    let source = "@interface Ann { int value() default 1; String[] names(); }";
    let parsed = ParsedTree::parse(source);
    find(&parsed, NodeKind::TypeDecl, "Ann");
    let value = find(&parsed, NodeKind::MethodDecl, "value");
    assert_eq!(parsed.span_of(value).unwrap().to_range(), 17..39);
    assert!(issues(source).is_empty());
}

#[test]
fn annotated_and_sealed_declarations() {
    let source = "@Deprecated sealed interface S permits A { } non-sealed class A implements S { }";
    let parsed = ParsedTree::parse(source);
    let s = parsed.node(find(&parsed, NodeKind::TypeDecl, "S")).unwrap();
    assert!(s.modifiers().contains(Modifiers::SEALED | Modifiers::ANNOTATED));
    assert_eq!(parsed.span_of(find(&parsed, NodeKind::TypeDecl, "S")).unwrap().start, 0);
    let a = parsed.node(find(&parsed, NodeKind::TypeDecl, "A")).unwrap();
    assert!(a.modifiers().contains(Modifiers::NON_SEALED));
    assert!(issues(source).is_empty());
}

#[test]
fn generic_methods_and_constructors() {
    let source = "class Box<T> { <U> Box(U u) { } public <R extends T> java.util.List<R> map() { return null; } }";
    let parsed = ParsedTree::parse(source);
    find(&parsed, NodeKind::MethodDecl, "Box");
    find(&parsed, NodeKind::MethodDecl, "map");
    assert!(issues(source).is_empty());
}

#[test]
fn initializers_become_method_bodies() {
    let source = "class A { static { init(); } { x = 1; } }";
    let parsed = ParsedTree::parse(source);
    let type_body = parsed.find_innermost_node_at(8).unwrap();
    let kinds: Vec<_> = parsed
        .node(type_body.node)
        .unwrap()
        .children()
        .iter()
        .map(|entry| parsed.tree()[entry.node].kind())
        .collect();
    assert_eq!(kinds, vec![NodeKind::MethodBody, NodeKind::MethodBody]);
}

#[test]
fn statements_with_nested_structure() {
    let source = "class A { void m(int k) { \
        switch (k) { case 1: break; default -> { k++; } } \
        try (R r = open()) { use(r); } catch (E e) { } finally { } \
        do { k--; } while (k > 0); \
        outer: for (;;) { break outer; } \
        synchronized (this) { k = 0; } \
        Runnable r = () -> { run(); }; \
    } }";
    assert!(issues(source).is_empty(), "{:?}", issues(source));
    let parsed = ParsedTree::parse(source);
    let body = parsed.tree()[find(&parsed, NodeKind::MethodDecl, "m")].children()[0];
    assert_eq!(parsed.tree()[body.node].units().len(), 6);
}

#[test]
fn missing_semicolon_is_reported_after_the_last_token() {
    let source = "class A { void m() { int x = 1 } }";
    assert_eq!(issues(source), vec![(29, 30, "expected `;`".to_string())]);
}

#[test]
fn case_outside_switch() {
    let source = "class A { void m() { case 1: go(); } }";
    let found = issues(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].2, "case label outside of a switch");
    assert_eq!((found[0].0, found[0].1), (21, 25));
}

#[test]
fn bad_member_recovers_at_the_next_one() {
    let source = "class A { 123; int y; void f() { } }";
    let found = issues(source);
    assert_eq!(found, vec![(10, 13, "expected a member declaration".to_string())]);
    let parsed = ParsedTree::parse(source);
    find(&parsed, NodeKind::MethodDecl, "f");
}

#[test]
fn stray_close_brace_at_top_level() {
    let source = "class A { } }";
    assert_eq!(issues(source), vec![(12, 13, "unexpected `}`".to_string())]);
}

#[test]
fn unclosed_bodies_extend_to_the_end() {
    let source = "class A { void m() { int x;";
    let parsed = ParsedTree::parse(source);
    let body = parsed.find_innermost_node_at(25).unwrap();
    assert_eq!(body.span().to_range(), 19..27);
    assert_eq!(parsed.node(body.node).unwrap().status(), NodeStatus::Unterminated);

    let settled = issues(source);
    assert_eq!(
        settled.iter().map(|i| i.2.as_str()).collect::<Vec<_>>(),
        vec!["unclosed type body", "unclosed method body"]
    );
    assert!(parsed.diagnostics(DiagnosticMode::Typing).is_empty());
}

#[test]
fn unterminated_comment_is_an_issue() {
    let source = "class A { int x; } /* open";
    let found = issues(source);
    assert_eq!(found, vec![(19, 26, "unterminated comment".to_string())]);
}

#[test]
fn missing_type_body() {
    let source = "class A extends B int x;";
    let found = issues(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].2, "expected `{`");
}

#[test]
fn empty_document() {
    let parsed = ParsedTree::parse("");
    assert!(parsed.is_empty());
    assert_eq!(parsed.find_innermost_node_at(0), None);
    parsed.validate().unwrap();
}

#[test]
fn deeply_nested_classes() {
    let depth = 2000;
    let source = format!("{}{}", "class A { ".repeat(depth), "}".repeat(depth));
    let parsed = ParsedTree::parse(&source);
    parsed.validate().unwrap();
    assert!(parsed.diagnostics(DiagnosticMode::Settled).is_empty());

    let first_close = u32::try_from(source.find('}').unwrap()).unwrap();
    let innermost = parsed.find_innermost_node_at(first_close).unwrap();
    let tree = parsed.tree();
    assert_eq!(tree[innermost.node].kind(), NodeKind::TypeBody);
    assert_eq!(tree.depth(innermost.node), 2 * depth);
}

#[test]
fn deeply_nested_blocks() {
    let depth = 20_000;
    let source = format!(
        "class B {{ void m() {{ {}{} }} }}",
        "{ ".repeat(depth),
        "}".repeat(depth)
    );
    let parsed = ParsedTree::parse(&source);
    parsed.validate().unwrap();
    assert!(parsed.diagnostics(DiagnosticMode::Settled).is_empty());
    let method = find(&parsed, NodeKind::MethodDecl, "m");
    let body = parsed.tree().children(method)[0].node;
    assert_eq!(parsed.tree()[body].units().len(), 1);
}
