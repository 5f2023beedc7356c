//! Style diagnostics over an already-checked module (§4.7). Never fatal —
//! `lint` always returns, and `fix` only ever rewrites or drops individual
//! top-level declarations, never the checker's verdict on them.

mod rule;
#[cfg(test)]
mod tests;

use std::collections::HashSet;

use hlb_ast::{Decl, Module, Node, WithOpt};
use hlb_checker::CheckedModule;

pub use rule::{Fix, LintDiagnostic, LintRule};

/// Runs every rule over `module` using the scope information `checked`
/// recorded while checking it. Order of the returned diagnostics follows
/// declaration order, not rule order, so a caller rendering them inline
/// doesn't have to re-sort by position.
pub fn lint(module: &Module, checked: &CheckedModule) -> Vec<LintDiagnostic> {
    let mut out = Vec::new();
    let used_imports = mentioned_idents(module);

    for (index, decl) in module.decls.iter().enumerate() {
        match decl {
            Decl::Func(f) => {
                if !is_camel_case(&f.name) {
                    let mut renamed = f.clone();
                    renamed.name = to_camel_case(&f.name);
                    out.push(LintDiagnostic {
                        rule: LintRule::NonCamelCaseFunc,
                        message: format!("function '{}' should be named '{}'", f.name, renamed.name),
                        pos: f.name_range.start.clone(),
                        fix: Some(Fix {
                            index,
                            decl: Some(Decl::Func(renamed)),
                        }),
                    });
                }
                if f.doc.is_none() {
                    let mut documented = f.clone();
                    documented.doc = Some(format!("TODO: document `{}`.", f.name));
                    out.push(LintDiagnostic {
                        rule: LintRule::MissingDoc,
                        message: format!("function '{}' has no doc comment", f.name),
                        pos: f.name_range.start.clone(),
                        fix: Some(Fix {
                            index,
                            decl: Some(Decl::Func(documented)),
                        }),
                    });
                }
                for call in f.body.calls() {
                    let Some(alias) = &call.alias else { continue };
                    if let Some(scope) = f.scope.get() {
                        if let Some(obj) = checked.arena.resolve(scope, &alias.name) {
                            if hlb_checker::shadows_builtin(obj.ty, &alias.name) {
                                out.push(LintDiagnostic {
                                    rule: LintRule::AliasShadowsBuiltin,
                                    message: format!(
                                        "alias '{}' shadows a built-in '{}' operation",
                                        alias.name, obj.ty
                                    ),
                                    pos: alias.range.start.clone(),
                                    fix: None,
                                });
                            }
                        }
                    }
                }
            }
            Decl::Import(i) => {
                if !used_imports.contains(i.name.as_str()) {
                    out.push(LintDiagnostic {
                        rule: LintRule::UnusedImport,
                        message: format!("import '{}' is never used", i.name),
                        pos: i.name_range.start.clone(),
                        fix: Some(Fix { index, decl: None }),
                    });
                }
            }
            _ => {}
        }
    }

    out
}

/// Splices each diagnostic's fix into `module`'s declaration list and
/// re-emits the file through the unparser. Fixes are applied back-to-front
/// by declaration index so earlier indices stay valid as later ones are
/// removed or replaced.
pub fn fix(module: &Module, diagnostics: &[LintDiagnostic]) -> String {
    let mut decls = module.decls.clone();
    let mut fixes: Vec<&Fix> = diagnostics.iter().filter_map(|d| d.fix.as_ref()).collect();
    fixes.sort_by_key(|f| f.index);
    for f in fixes.into_iter().rev() {
        match &f.decl {
            Some(decl) => decls[f.index] = decl.clone(),
            None => {
                decls.remove(f.index);
            }
        }
    }
    hlb_ast::format_module(&Module::new(module.file.clone(), decls))
}

fn is_camel_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    !name.contains('_') && name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if i == 0 {
            out.extend(c.to_lowercase());
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Every identifier mentioned anywhere in `module` — call names, bare
/// `Ident` arguments, and `with` references — used to approximate "imported
/// module is used somewhere" without a full reachability analysis (the same
/// shallow-mention approach `hlb-resolver` uses to narrow import resolution).
fn mentioned_idents(module: &Module) -> HashSet<String> {
    let mut names = HashSet::new();
    hlb_ast::inspect(module, |node| match node {
        Node::Call(call) => {
            names.insert(call.func.clone());
        }
        Node::Ident(id) => {
            names.insert(id.name.clone());
        }
        Node::WithOpt(WithOpt::Ident(id)) => {
            names.insert(id.name.clone());
        }
        _ => {}
    });
    names
}
