use hlb_diagnostics::{DiagnosticCtx, Span, SpanError};
use hlb_span::Position;

use hlb_ast::Decl;

/// Which style rule produced a [`LintDiagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    NonCamelCaseFunc,
    MissingDoc,
    UnusedImport,
    AliasShadowsBuiltin,
}

impl LintRule {
    pub fn name(&self) -> &'static str {
        match self {
            LintRule::NonCamelCaseFunc => "non-camel-case-func",
            LintRule::MissingDoc => "missing-doc",
            LintRule::UnusedImport => "unused-import",
            LintRule::AliasShadowsBuiltin => "alias-shadows-builtin",
        }
    }
}

/// A style violation found in a checked module. `fix` is the owned
/// replacement for `module.decls[index]` — `Some(decl)` to splice a rewritten
/// declaration in, `None` to drop the declaration entirely (the
/// unused-import rule's only fix). A `None` fix field on the diagnostic
/// itself (not to be confused with `Fix::decl`) means the rule has no
/// mechanical remedy at all, e.g. shadowed-builtin aliases, which the linter
/// can report but can't safely rename.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    pub rule: LintRule,
    pub message: String,
    pub pos: Position,
    pub fix: Option<Fix>,
}

#[derive(Debug, Clone)]
pub struct Fix {
    pub index: usize,
    pub decl: Option<Decl>,
}

impl LintDiagnostic {
    pub fn to_span_error(&self, _ctx: &DiagnosticCtx) -> SpanError {
        let pos = self.pos.clone();
        SpanError::warning(
            format!("[{}] {}", self.rule.name(), self.message),
            Span::primary(pos.clone(), pos, self.message.clone()),
        )
    }
}
