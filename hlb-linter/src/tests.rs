use hlb_span::SourceFile;

use crate::{fix, lint, LintRule};

fn checked(src: &str) -> (hlb_ast::Module, hlb_checker::CheckedModule) {
    let mut file = SourceFile::new("t.hlb", src);
    let module = hlb_parser::parse(&mut file).expect("test source should parse");
    let (checked, errors) = hlb_checker::check_module(&module);
    assert!(errors.is_empty(), "unexpected check errors: {errors:?}");
    (module, checked)
}

#[test]
fn flags_a_non_camel_case_function_name() {
    let (module, checked) = checked("fs build_image() {\n\tscratch\n}\n");
    let diags = lint(&module, &checked);
    let found = diags.iter().find(|d| d.rule == LintRule::NonCamelCaseFunc).unwrap();
    assert!(found.message.contains("buildImage"));
}

#[test]
fn camel_case_names_are_not_flagged() {
    let (module, checked) = checked("fs buildImage() {\n\tscratch\n}\n");
    let diags = lint(&module, &checked);
    assert!(!diags.iter().any(|d| d.rule == LintRule::NonCamelCaseFunc));
}

#[test]
fn flags_a_function_missing_a_doc_comment() {
    let (module, checked) = checked("fs default() {\n\tscratch\n}\n");
    let diags = lint(&module, &checked);
    assert!(diags.iter().any(|d| d.rule == LintRule::MissingDoc));
}

#[test]
fn a_leading_comment_satisfies_the_doc_rule() {
    let (module, checked) = checked("# builds the base image\nfs default() {\n\tscratch\n}\n");
    let diags = lint(&module, &checked);
    assert!(!diags.iter().any(|d| d.rule == LintRule::MissingDoc));
}

#[test]
fn flags_an_import_never_referenced_anywhere() {
    let (module, checked) = checked(concat!(
        "fs base_src() {\n\tscratch\n}\n\n",
        "import base base_src\n",
        "fs default() {\n\tscratch\n}\n",
    ));
    let diags = lint(&module, &checked);
    let found = diags.iter().find(|d| d.rule == LintRule::UnusedImport).unwrap();
    assert!(found.message.contains("base"));
}

#[test]
fn an_import_referenced_in_a_call_argument_is_not_flagged() {
    let (module, checked) = checked(concat!(
        "fs base_src() {\n\tscratch\n}\n\n",
        "import base base_src\n",
        "fs default() {\n\trun base\n}\n",
    ));
    let diags = lint(&module, &checked);
    assert!(!diags.iter().any(|d| d.rule == LintRule::UnusedImport));
}

#[test]
fn flags_an_alias_that_shadows_a_builtin() {
    let (module, checked) = checked(concat!(
        "fs default() {\n\tscratch as local image\n\trun image\n}\n",
    ));
    let diags = lint(&module, &checked);
    let found = diags.iter().find(|d| d.rule == LintRule::AliasShadowsBuiltin).unwrap();
    assert!(found.message.contains("image"));
    assert!(found.fix.is_none());
}

#[test]
fn fix_renames_the_function_and_drops_the_unused_import() {
    let (module, checked) = checked(concat!(
        "fs unused_src() {\n\tscratch\n}\n\n",
        "import side unused_src\n\n",
        "fs build_image() {\n\tscratch\n}\n",
    ));
    let diags = lint(&module, &checked);
    let fixed = fix(&module, &diags);
    assert!(fixed.contains("buildImage"));
    assert!(!fixed.contains("import side"));

    let mut refile = SourceFile::new("t.hlb", &fixed);
    let reparsed = hlb_parser::parse(&mut refile).expect("fixed output should still parse");
    assert!(reparsed.funcs().any(|f| f.name == "buildImage"));
    assert_eq!(reparsed.imports().count(), 0);
}
