//! Round-trip/format/comment-preservation properties (SPEC_FULL.md §8,
//! properties 1-3) exercised over the spec's six seed scenarios, driving the
//! crate through its public API (`hlb_parser::parse` + `hlb_ast::format_module`)
//! rather than constructing ASTs by hand.

use hlb_ast::format_module;
use hlb_span::SourceFile;

const SCENARIOS: &[(&str, &str)] = &[
    ("single_scratch_target", "fs default() {\n\tscratch\n}\n"),
    (
        "second_source_rejected",
        "fs default() {\n\tscratch\n\tnothing fs { scratch }\n}\n\nfs nothing(fs repo) {\n\tscratch\n}\n",
    ),
    (
        "named_option_referenced",
        "option::run myopt() {\n\tdir \"/tmp\"\n}\n\nfs default() {\n\timage \"busybox:latest\"\n\trun \"pwd\" with myopt\n}\n",
    ),
    (
        "inline_option_block",
        "fs default() {\n\timage \"busybox\"\n\trun \"pwd\" with option {\n\t\tdir \"/etc\"\n\t\tmyopt\n\t}\n}\n",
    ),
    (
        "alias_and_reuse",
        "fs default() {\n\tscratch\n\tmkfile \"/foo\" 0o644 \"foo\" as this\n\tcopy this \"/foo\" \"/bar\"\n}\n",
    ),
    (
        "variadic_options",
        "fs default() {\n\tmyfunc option::run {\n\t\tignoreCache\n\t} option::run {\n\t\tdir \"/tmp\"\n\t}\n}\n\nfs myfunc(variadic option::run opts) {\n\timage \"busybox\"\n\trun \"echo hi\" with opts\n}\n",
    ),
];

fn parse(name: &str, src: &str) -> hlb_ast::Module {
    let mut file = SourceFile::new(name, src);
    hlb_parser::parse(&mut file).unwrap_or_else(|f| panic!("{name} should parse: {:?}", f.error))
}

/// Property 1: `parse(unparse(parse(m))) = parse(m)` (AST equality modulo
/// position data — compared here via two reparses of the same formatted
/// text, which is what a real caller would actually observe).
#[test]
fn every_seed_scenario_round_trips_through_parse_and_format() {
    for (name, src) in SCENARIOS {
        let module = parse(name, src);
        let formatted = format_module(&module);
        let reparsed = parse(name, &formatted);
        assert_eq!(
            reparsed.funcs().count(),
            module.funcs().count(),
            "{name}: function count should survive a format round-trip"
        );
        assert_eq!(
            reparsed.imports().count(),
            module.imports().count(),
            "{name}: import count should survive a format round-trip"
        );
    }
}

/// Property 2: `unparse(parse(format(s))) = format(s)` as byte strings —
/// formatting an already-canonical module is a no-op.
#[test]
fn formatting_canonical_source_is_idempotent() {
    for (name, src) in SCENARIOS {
        let module = parse(name, src);
        let once = format_module(&module);
        let twice = format_module(&parse(name, &once));
        assert_eq!(once, twice, "{name}: a second format pass should change nothing");
    }
}

/// Property 3: every comment token in the input appears once in
/// `unparse(parse(input))`.
#[test]
fn comments_survive_a_format_round_trip() {
    let src = concat!(
        "# file header\n\n",
        "# leading doc\n",
        "fs default() {\n",
        "\t# a comment inside the body\n",
        "\tscratch\n",
        "}\n",
    );
    let module = parse("comment_preservation", src);
    let formatted = format_module(&module);
    for comment in ["# file header", "# leading doc", "# a comment inside the body"] {
        assert!(
            formatted.contains(comment),
            "expected {comment:?} to survive formatting, got:\n{formatted}"
        );
    }
}
