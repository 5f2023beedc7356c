use hlb_ast::{CallStmt, Decl, Expr, FuncDecl, Module, OptionSubtype, Type, WithOpt};
use hlb_ast::{CallId, FuncId, ScopeId};
use hlb_diagnostics::suggest;

use crate::builtins::{self, Signature};
use crate::error::CheckError;
use crate::scope::{Object, ObjectKind, ScopeArena};

/// One function's signature as seen by callers — derived from its `FuncDecl`
/// during Pass A so Pass B never has to re-walk the declaration list.
struct FuncSig {
    return_type: Type,
    params: Vec<Type>,
    variadic: bool,
}

impl FuncSig {
    fn of(f: &FuncDecl) -> Self {
        Self {
            return_type: f.return_type,
            params: f.params.iter().map(|p| p.ty).collect(),
            variadic: f.last_variadic().is_some(),
        }
    }

    fn as_signature(&self) -> Signature {
        Signature {
            params: self.params.clone(),
            variadic: self.variadic,
        }
    }
}

#[derive(Clone, Copy)]
enum CallKind {
    Builtin(&'static Signature),
    Func(usize),
    /// A bare reference to a param/alias already bound in scope.
    Value(Type),
    Unknown,
}

pub struct CheckedModule {
    pub arena: ScopeArena,
    pub root: ScopeId,
}

/// Runs both checker passes over one parsed file and returns the scope arena
/// (so the resolver can later splice imported modules in) plus every error
/// found. Errors are collected, never abort-on-first (§4.6).
pub fn check_module(module: &Module) -> (CheckedModule, Vec<CheckError>) {
    let mut c = Checker {
        arena: ScopeArena::new(),
        root: ScopeId(0),
        funcs: Vec::new(),
        errors: Vec::new(),
        next_call_id: 0,
    };
    c.root = c.arena.push(None);
    c.declare_functions(module);
    c.check_functions(module);

    let checked = CheckedModule {
        arena: c.arena,
        root: c.root,
    };
    (checked, c.errors)
}

struct Checker {
    arena: ScopeArena,
    root: ScopeId,
    funcs: Vec<FuncSig>,
    errors: Vec<CheckError>,
    next_call_id: u32,
}

impl Checker {
    fn declare_functions(&mut self, module: &Module) {
        for (i, f) in module.funcs().enumerate() {
            debug_assert_eq!(i, self.funcs.len());
            self.funcs.push(FuncSig::of(f));

            let prev = self.arena.declare(
                self.root,
                f.name.clone(),
                Object {
                    kind: ObjectKind::Func(FuncId(i as u32)),
                    ty: f.return_type,
                    range: f.range.clone(),
                },
            );
            if let Some(prev) = prev {
                self.errors.push(CheckError::DuplicateDecl {
                    name: f.name.clone(),
                    pos: f.name_range.start.clone(),
                    first: prev.range.start,
                });
            }

            let scope = self.arena.push(Some(self.root));
            f.scope.set(Some(scope));
            for p in &f.params {
                let prev = self.arena.declare(
                    scope,
                    p.name.clone(),
                    Object {
                        kind: ObjectKind::Param,
                        ty: p.ty,
                        range: p.range.clone(),
                    },
                );
                if let Some(prev) = prev {
                    self.errors.push(CheckError::DuplicateField {
                        name: p.name.clone(),
                        pos: p.range.start.clone(),
                        first: prev.range.start,
                    });
                }
            }
        }
    }

    fn check_functions(&mut self, module: &Module) {
        for d in &module.decls {
            let Decl::Func(f) = d else { continue };
            let Some(scope) = f.scope.get() else { continue };
            self.check_block(&f.body, scope, f.return_type);
        }
    }

    fn check_block(&mut self, block: &hlb_ast::Block, scope: ScopeId, t: Type) {
        if let Type::Option(Some(sub)) = t {
            for call in block.calls() {
                if call.alias.is_some() {
                    self.errors.push(CheckError::InvalidTarget {
                        pos: call.range.start.clone(),
                    });
                }
                self.check_call(call, Type::Option(Some(sub)), scope);
            }
            return;
        }

        let calls: Vec<&CallStmt> = block.calls().collect();
        if calls.is_empty() {
            self.errors.push(CheckError::EmptyBlock {
                pos: block.range.start.clone(),
            });
            return;
        }

        for (i, call) in calls.iter().enumerate() {
            let kind = self.lookup_call(scope, t, &call.func);
            let is_source = matches!(&kind, CallKind::Func(_) | CallKind::Value(_))
                || matches!(&kind, CallKind::Builtin(_) if builtins::is_source(t, &call.func));

            if i == 0 {
                // An unresolved name already gets `UnknownFunc` below; piling
                // `ExpectedSource` on top would just be noise.
                if !is_source && !matches!(kind, CallKind::Unknown) {
                    self.errors.push(CheckError::ExpectedSource {
                        ty: t.to_string(),
                        pos: call.func_range.start.clone(),
                    });
                }
            } else if is_source {
                self.errors.push(CheckError::UnexpectedSource {
                    name: call.func.clone(),
                    pos: call.func_range.start.clone(),
                });
            }

            self.check_call_kind(call, kind, t, scope);
        }
    }

    fn lookup_call(&self, scope: ScopeId, t: Type, name: &str) -> CallKind {
        if let Some(sig) = builtins::lookup(t, name) {
            return CallKind::Builtin(sig);
        }
        if let Some(obj) = self.arena.resolve(scope, name) {
            match obj.kind {
                ObjectKind::Func(fid) => {
                    let f = &self.funcs[fid.0 as usize];
                    if f.return_type == t {
                        return CallKind::Func(fid.0 as usize);
                    }
                }
                ObjectKind::Param | ObjectKind::Alias(_) => {
                    if obj.ty == t {
                        return CallKind::Value(obj.ty);
                    }
                }
            }
        }
        CallKind::Unknown
    }

    fn check_call(&mut self, call: &CallStmt, t: Type, scope: ScopeId) {
        let kind = self.lookup_call(scope, t, &call.func);
        self.check_call_kind(call, kind, t, scope);
    }

    fn check_call_kind(&mut self, call: &CallStmt, kind: CallKind, t: Type, scope: ScopeId) {
        match kind {
            CallKind::Builtin(sig) => {
                self.check_args(call, &sig.params, sig.variadic, scope);
                self.check_with_opt(call, &call.func, scope);
            }
            CallKind::Func(fid) => {
                let sig = self.funcs[fid].as_signature();
                self.check_args(call, &sig.params, sig.variadic, scope);
            }
            CallKind::Value(_) => {
                if !call.args.is_empty() {
                    self.errors.push(CheckError::ArgCount {
                        name: call.func.clone(),
                        expected: 0,
                        got: call.args.len(),
                        pos: call.func_range.start.clone(),
                    });
                }
            }
            CallKind::Unknown => {
                let candidates = builtins::names_for(t);
                let suggestion = suggest(&call.func, candidates.into_iter()).map(str::to_string);
                self.errors.push(CheckError::UnknownFunc {
                    name: call.func.clone(),
                    ty: t.to_string(),
                    pos: call.func_range.start.clone(),
                    suggestion,
                });
            }
        }

        self.bind_alias(call, t, scope);
    }

    fn check_args(&mut self, call: &CallStmt, params: &[Type], variadic: bool, scope: ScopeId) {
        let prefix_len = if variadic {
            params.len().saturating_sub(1)
        } else {
            params.len()
        };

        if call.args.len() < prefix_len || (!variadic && call.args.len() != params.len()) {
            self.errors.push(CheckError::ArgCount {
                name: call.func.clone(),
                expected: params.len(),
                got: call.args.len(),
                pos: call.func_range.start.clone(),
            });
            return;
        }

        for (i, arg) in call.args.iter().enumerate() {
            let want = if i < prefix_len {
                params[i]
            } else {
                *params.last().expect("variadic call has at least one param")
            };
            self.check_arg(arg, want, call.func.as_str(), i, scope);
        }
    }

    fn check_arg(&mut self, arg: &Expr, want: Type, func: &str, index: usize, scope: ScopeId) {
        match arg {
            Expr::Ident(id) => match self.arena.resolve(scope, &id.name) {
                Some(obj) => match obj.kind {
                    ObjectKind::Func(fid) => {
                        let f = &self.funcs[fid.0 as usize];
                        if !f.params.is_empty() {
                            self.errors.push(CheckError::FuncArg {
                                name: id.name.clone(),
                                pos: id.range.start.clone(),
                            });
                        } else if !f.return_type.satisfies(&want) {
                            self.errors.push(CheckError::WrongReturnType {
                                declared: f.return_type.to_string(),
                                got: want.to_string(),
                                pos: id.range.start.clone(),
                            });
                        }
                    }
                    ObjectKind::Param | ObjectKind::Alias(_) => {
                        if !obj.ty.satisfies(&want) {
                            self.errors.push(CheckError::ArgType {
                                name: func.to_string(),
                                index,
                                expected: want.to_string(),
                                got: obj.ty.to_string(),
                                pos: id.range.start.clone(),
                            });
                        }
                    }
                },
                None => {
                    let candidates = self.arena.visible_names(scope);
                    let suggestion = suggest(&id.name, candidates.into_iter()).map(str::to_string);
                    self.errors.push(CheckError::IdentNotDefined {
                        name: id.name.clone(),
                        pos: id.range.start.clone(),
                        suggestion,
                    });
                }
            },
            Expr::BasicLit(lit) => {
                let got = Type::parse(lit.value.type_name()).expect("literal type names always parse");
                if !got.satisfies(&want) {
                    self.errors.push(CheckError::ArgType {
                        name: func.to_string(),
                        index,
                        expected: want.to_string(),
                        got: got.to_string(),
                        pos: lit.range.start.clone(),
                    });
                }
            }
            Expr::BlockLit(b) => {
                if !b.ty.satisfies(&want) {
                    self.errors.push(CheckError::ArgType {
                        name: func.to_string(),
                        index,
                        expected: want.to_string(),
                        got: b.ty.to_string(),
                        pos: b.range.start.clone(),
                    });
                }
                self.check_block(&b.block, scope, b.ty);
            }
        }
    }

    fn check_with_opt(&mut self, call: &CallStmt, op_name: &str, scope: ScopeId) {
        let Some(with_opt) = &call.with_opt else {
            return;
        };
        let want = Type::Option(OptionSubtype::from_str(op_name));
        match with_opt {
            WithOpt::Ident(id) => match self.arena.resolve(scope, &id.name) {
                Some(obj) if obj.ty.satisfies(&want) => {}
                Some(obj) => self.errors.push(CheckError::ArgType {
                    name: op_name.to_string(),
                    index: 0,
                    expected: want.to_string(),
                    got: obj.ty.to_string(),
                    pos: id.range.start.clone(),
                }),
                None => {
                    let candidates = self.arena.visible_names(scope);
                    let suggestion = suggest(&id.name, candidates.into_iter()).map(str::to_string);
                    self.errors.push(CheckError::IdentNotDefined {
                        name: id.name.clone(),
                        pos: id.range.start.clone(),
                        suggestion,
                    });
                }
            },
            WithOpt::Inline(b) => {
                if !b.ty.satisfies(&want) {
                    self.errors.push(CheckError::ArgType {
                        name: op_name.to_string(),
                        index: 0,
                        expected: want.to_string(),
                        got: b.ty.to_string(),
                        pos: b.range.start.clone(),
                    });
                }
                self.check_block(&b.block, scope, b.ty);
            }
        }
    }

    fn bind_alias(&mut self, call: &CallStmt, t: Type, scope: ScopeId) {
        let Some(alias) = &call.alias else { return };
        let id = CallId(self.next_call_id);
        self.next_call_id += 1;
        alias.call_id.set(Some(id));

        let target = if alias.local { scope } else { self.root };
        let prev = self.arena.declare(
            target,
            alias.name.clone(),
            Object {
                kind: ObjectKind::Alias(id),
                ty: t,
                range: alias.range.clone(),
            },
        );
        if let Some(prev) = prev {
            self.errors.push(CheckError::DuplicateDecl {
                name: alias.name.clone(),
                pos: alias.range.start.clone(),
                first: prev.range.start,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlb_span::SourceFile;

    fn check(src: &str) -> Vec<CheckError> {
        let mut file = SourceFile::new("t.hlb", src);
        let module = hlb_parser::parse(&mut file).expect("parses");
        check_module(&module).1
    }

    #[test]
    fn accepts_a_minimal_scratch_function() {
        let errs = check("fs build() {\n\tscratch\n}\n");
        assert!(errs.is_empty(), "{errs:?}");
    }

    #[test]
    fn rejects_second_source_in_a_block() {
        let errs = check("fs build() {\n\tscratch\n\timage \"alpine\"\n}\n");
        assert!(matches!(errs[0], CheckError::UnexpectedSource { .. }));
    }

    #[test]
    fn rejects_empty_block() {
        let errs = check("fs build() {\n}\n");
        assert!(matches!(errs[0], CheckError::EmptyBlock { .. }));
    }

    #[test]
    fn rejects_non_source_first_statement() {
        let errs = check("fs build() {\n\trun \"echo\"\n}\n");
        assert!(matches!(errs[0], CheckError::ExpectedSource { .. }));
    }

    #[test]
    fn suggests_close_builtin_name() {
        let errs = check("fs build() {\n\tscrach\n}\n");
        match &errs[0] {
            CheckError::UnknownFunc { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("scratch"));
            }
            other => panic!("expected UnknownFunc, got {other:?}"),
        }
    }

    #[test]
    fn allows_alias_reuse_across_functions() {
        let errs = check(
            "fs base() {\n\tscratch as b\n}\n\nfs build() {\n\tb\n\trun \"echo\"\n}\n",
        );
        assert!(errs.is_empty(), "{errs:?}");
    }

    #[test]
    fn rejects_duplicate_function_names() {
        let errs = check("fs build() {\n\tscratch\n}\n\nfs build() {\n\tscratch\n}\n");
        assert!(matches!(errs[0], CheckError::DuplicateDecl { .. }));
    }

    #[test]
    fn checks_variadic_run_options() {
        let errs = check(
            "fs build() {\n\tscratch\n\trun \"echo hi\" with option::run {\n\t\tdir \"/tmp\"\n\t}\n}\n",
        );
        assert!(errs.is_empty(), "{errs:?}");
    }

    #[test]
    fn accepts_a_single_statement_string_function() {
        let errs = check("string tag() {\n\tformat \"v%d\" \"1\"\n}\n");
        assert!(errs.is_empty(), "{errs:?}");
    }

    #[test]
    fn rejects_second_statement_in_a_string_block() {
        let errs = check("string tag() {\n\tlocalCwd\n\tlocalOs\n}\n");
        assert!(matches!(errs[0], CheckError::UnexpectedSource { .. }));
    }

    #[test]
    fn rejects_alias_inside_option_block() {
        let errs = check(
            "fs build() {\n\tscratch\n\trun \"echo\" with option::run {\n\t\tdir \"/tmp\" as d\n\t}\n}\n",
        );
        assert!(matches!(errs[0], CheckError::InvalidTarget { .. }));
    }
}
