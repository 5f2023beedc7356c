use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::process::Command;

use hlb_ast::{Block, CallStmt, Expr, FuncDecl, LiteralValue, Module, Type, WithOpt};
use hlb_solve::{OptionApply, Platform, Registry, SolveRequest, State, Value as LlbValue};

use crate::debugger::{DebugAction, Debugger};
use crate::error::CodegenError;
use crate::image_cache::CachedImageResolver;
use crate::value::Value;

/// Parameter/alias bindings local to one function-body evaluation. Separate
/// from `globals` because `local` aliases (§4.6) never escape their owning
/// function, while everything else (params, the body's own non-local
/// aliases) is visible only for the duration of that one call.
#[derive(Debug, Default)]
struct Env {
    locals: HashMap<String, Value>,
}

/// Walks a checked module's call graph and produces one `Value` per target
/// function, composing `fs` results into the final `SolveRequest`. Holds no
/// `Solver` — only a `Registry`, for `image ... with resolve` lookups — the
/// produced request is submitted by the caller (§4.11 step 5).
pub struct Evaluator<'m, R> {
    module: &'m Module,
    funcs_by_name: HashMap<&'m str, &'m FuncDecl>,
    image_cache: CachedImageResolver<'m, R>,
    platform: Option<Platform>,
    globals: RefCell<HashMap<String, Value>>,
    results: RefCell<HashMap<String, Value>>,
    nonce: Cell<u64>,
}

impl<'m, R: Registry> Evaluator<'m, R> {
    /// `platform` is the target platform resolved images are pinned to; an
    /// `image ... with resolve` call with no configured platform is
    /// `PlatformRequired` rather than guessing the host's own arch.
    pub fn new(module: &'m Module, registry: &'m R, platform: Option<Platform>) -> Self {
        let funcs_by_name = module.funcs().map(|f| (f.name.as_str(), f)).collect();
        Self {
            module,
            funcs_by_name,
            image_cache: CachedImageResolver::new(registry),
            platform,
            globals: RefCell::new(HashMap::new()),
            results: RefCell::new(HashMap::new()),
            nonce: Cell::new(0),
        }
    }

    /// Evaluates every zero-arity function in declaration order, so a
    /// non-local alias one function binds is already visible in `globals`
    /// by the time a later-declared function references it (§4.6's
    /// cross-function alias reuse; functions must declare their alias
    /// producers before their consumers — see DESIGN.md).
    pub async fn prime<D: Debugger>(&self, debugger: &mut D) -> Result<(), CodegenError> {
        for f in self.module.funcs() {
            if f.params.is_empty() && !self.results.borrow().contains_key(&f.name) {
                let env = Env::default();
                let v = Box::pin(self.eval_block(&f.body, f.return_type, &env, debugger)).await?;
                self.results.borrow_mut().insert(f.name.clone(), v);
            }
        }
        Ok(())
    }

    /// Returns the already-primed result for `target`, wrapped into a
    /// `Leaf` solve request. Call `prime` first.
    pub fn generate_target(&self, target: &str) -> Result<SolveRequest, CodegenError> {
        let value = self
            .results
            .borrow()
            .get(target)
            .cloned()
            .ok_or_else(|| CodegenError::UnknownTarget(target.to_string()))?;
        let state = value
            .into_state()
            .ok_or_else(|| CodegenError::UnknownTarget(target.to_string()))?;
        Ok(SolveRequest::leaf(state, Default::default()))
    }

    /// Evaluates a bare expression with no bound params/aliases — the
    /// resolver's entry point for codegen-ing an `ImportDecl.source` (§4.8),
    /// which lives outside any function body the checker has validated.
    pub async fn eval_standalone_fs<D: Debugger>(
        &self,
        expr: &Expr,
        debugger: &mut D,
    ) -> Result<State, CodegenError> {
        let env = Env::default();
        let v = Box::pin(self.eval_expr(expr, &env, debugger)).await?;
        v.into_state().ok_or(CodegenError::InvalidImportSource)
    }

    fn lookup_value<'e>(&'e self, name: &str, env: &'e Env) -> Option<Value> {
        if let Some(v) = env.locals.get(name) {
            return Some(v.clone());
        }
        self.globals.borrow().get(name).cloned()
    }

    fn bind_alias(&self, alias: &hlb_ast::AliasDecl, value: Value, env: &mut Env) {
        if alias.local {
            env.locals.insert(alias.name.clone(), value);
        } else {
            self.globals.borrow_mut().insert(alias.name.clone(), value);
        }
    }

    async fn eval_block<D: Debugger>(
        &self,
        block: &Block,
        t: Type,
        env: &Env,
        debugger: &mut D,
    ) -> Result<Value, CodegenError> {
        if let Type::Option(Some(_)) = t {
            let mut opts = Vec::new();
            for call in block.calls() {
                opts.push(Box::pin(self.eval_option_call(call, t, env, debugger)).await?);
            }
            return Ok(Value::Options(opts));
        }

        let mut acc: Option<Value> = None;
        let mut local_env = Env {
            locals: env.locals.clone(),
        };
        for call in block.calls() {
            let state_ref = acc.as_ref().and_then(Value::as_state);
            match debugger.before_call(state_ref, call) {
                DebugAction::Abort => return Err(CodegenError::DebugExit(call.func.clone())),
                DebugAction::Continue | DebugAction::Step | DebugAction::Inspect => {}
            }

            let v = Box::pin(self.eval_call(call, t, &local_env, &acc, debugger)).await?;
            if let Some(alias) = &call.alias {
                self.bind_alias(alias, v.clone(), &mut local_env);
            }
            acc = Some(v);
        }
        Ok(acc.expect("checker guarantees a non-empty block"))
    }

    async fn eval_call<D: Debugger>(
        &self,
        call: &CallStmt,
        t: Type,
        env: &Env,
        prior: &Option<Value>,
        debugger: &mut D,
    ) -> Result<Value, CodegenError> {
        if let Some(sig) = hlb_checker::lookup_builtin(t, &call.func) {
            return self.eval_builtin_call(call, t, sig, env, prior, debugger).await;
        }
        if let Some(f) = self.funcs_by_name.get(call.func.as_str()).copied() {
            if f.return_type == t {
                return Box::pin(self.eval_user_func(f, &call.args, env, debugger)).await;
            }
        }
        Ok(self
            .lookup_value(&call.func, env)
            .expect("checker guarantees this name resolves"))
    }

    async fn eval_builtin_call<D: Debugger>(
        &self,
        call: &CallStmt,
        t: Type,
        sig: &hlb_checker::Signature,
        env: &Env,
        prior: &Option<Value>,
        debugger: &mut D,
    ) -> Result<Value, CodegenError> {
        let (fs_input, scalar_args) = self.eval_args(&call.args, sig, env, debugger).await?;
        let mut options = match &call.with_opt {
            Some(w) => self.eval_with_opt(w, env, debugger).await?,
            None => Vec::new(),
        };

        if call.func == "image" && options.iter().any(|o| o.name == "resolve") {
            let reference = match scalar_args.first() {
                Some(LlbValue::Str(s)) => s.clone(),
                _ => unreachable!("image's sole parameter is a string reference"),
            };
            let Some(platform) = self.platform.as_ref() else {
                return Err(CodegenError::PlatformRequired {
                    op: "image".to_string(),
                    pos: call.func_range.start.clone(),
                });
            };
            let digest = self
                .image_cache
                .resolve(&reference, Some(platform))
                .await
                .map_err(|e| CodegenError::UnresolvableImage {
                    reference: reference.clone(),
                    cause: e.to_string(),
                    pos: call.func_range.start.clone(),
                })?;
            options.push(OptionApply::new("resolvedDigest", vec![LlbValue::Str(digest)]));
        }

        match t {
            Type::Fs => {
                let base = if hlb_checker::is_source(Type::Fs, &call.func) {
                    State::new()
                } else {
                    prior
                        .as_ref()
                        .and_then(Value::as_state)
                        .cloned()
                        .unwrap_or_default()
                };
                let mut op = hlb_solve::Op::new(call.func.clone(), scalar_args).with_options(options);
                if let Some(fs) = fs_input {
                    op = op.with_input(fs);
                }
                Ok(Value::Fs(base.push(op)))
            }
            Type::String => {
                let s = self.eval_string_builtin(call, &scalar_args)?;
                Ok(Value::Str(s))
            }
            Type::Int | Type::Bool | Type::Option(_) => {
                unreachable!("no builtin returns int/bool/option directly")
            }
        }
    }

    async fn eval_args<D: Debugger>(
        &self,
        args: &[Expr],
        sig: &hlb_checker::Signature,
        env: &Env,
        debugger: &mut D,
    ) -> Result<(Option<State>, Vec<LlbValue>), CodegenError> {
        let prefix_len = if sig.variadic {
            sig.params.len().saturating_sub(1)
        } else {
            sig.params.len()
        };
        let mut fs_input = None;
        let mut scalars = Vec::new();
        for (i, arg) in args.iter().enumerate() {
            let _want = if i < prefix_len {
                sig.params[i]
            } else {
                *sig.params.last().expect("variadic call has at least one param")
            };
            let v = Box::pin(self.eval_expr(arg, env, debugger)).await?;
            match v {
                Value::Fs(s) => fs_input = Some(s),
                other => scalars.push(other.as_llb_scalar()),
            }
        }
        Ok((fs_input, scalars))
    }

    async fn eval_expr<D: Debugger>(
        &self,
        arg: &Expr,
        env: &Env,
        debugger: &mut D,
    ) -> Result<Value, CodegenError> {
        match arg {
            Expr::Ident(id) => {
                if let Some(f) = self.funcs_by_name.get(id.name.as_str()).copied() {
                    if f.params.is_empty() {
                        return Box::pin(self.eval_user_func(f, &[], env, debugger)).await;
                    }
                }
                Ok(self
                    .lookup_value(&id.name, env)
                    .expect("checker guarantees this ident resolves"))
            }
            Expr::BasicLit(lit) => Ok(match &lit.value {
                LiteralValue::Str(s) => Value::Str(s.clone()),
                LiteralValue::Int(i) => Value::Int(*i),
                LiteralValue::Bool(b) => Value::Bool(*b),
            }),
            Expr::BlockLit(b) => Box::pin(self.eval_block(&b.block, b.ty, env, debugger)).await,
        }
    }

    async fn eval_with_opt<D: Debugger>(
        &self,
        with_opt: &WithOpt,
        env: &Env,
        debugger: &mut D,
    ) -> Result<Vec<OptionApply>, CodegenError> {
        match with_opt {
            WithOpt::Ident(id) => Ok(self
                .lookup_value(&id.name, env)
                .map(Value::into_options)
                .unwrap_or_default()),
            WithOpt::Inline(b) => {
                let v = Box::pin(self.eval_block(&b.block, b.ty, env, debugger)).await?;
                Ok(v.into_options())
            }
        }
    }

    async fn eval_option_call<D: Debugger>(
        &self,
        call: &CallStmt,
        t: Type,
        env: &Env,
        debugger: &mut D,
    ) -> Result<OptionApply, CodegenError> {
        let sig = hlb_checker::lookup_builtin(t, &call.func).expect("checker validated this call");
        let (fs_arg, scalar_args) = self.eval_args(&call.args, sig, env, debugger).await?;

        if call.func == "createdTime" {
            if let Some(LlbValue::Str(ts)) = scalar_args.first() {
                chrono::DateTime::parse_from_rfc3339(ts).map_err(|_| CodegenError::InvalidTimestamp {
                    opt: call.func.clone(),
                    value: ts.clone(),
                    pos: call.func_range.start.clone(),
                })?;
            }
        }

        let mut args = scalar_args;
        if matches!(call.func.as_str(), "noCache" | "ignoreCache") {
            let n = self.nonce.get();
            self.nonce.set(n + 1);
            args.push(LlbValue::Int(n as i64));
        }

        let mut apply = OptionApply::new(call.func.clone(), args);
        if let Some(fs) = fs_arg {
            apply = apply.with_state(fs);
        }
        Ok(apply)
    }

    async fn eval_user_func<D: Debugger>(
        &self,
        f: &FuncDecl,
        args: &[Expr],
        caller_env: &Env,
        debugger: &mut D,
    ) -> Result<Value, CodegenError> {
        let prefix_len = if f.last_variadic().is_some() {
            f.params.len().saturating_sub(1)
        } else {
            f.params.len()
        };
        let mut locals = HashMap::new();
        for (i, param) in f.params.iter().take(prefix_len).enumerate() {
            let v = Box::pin(self.eval_expr(&args[i], caller_env, debugger)).await?;
            locals.insert(param.name.clone(), v);
        }
        if let Some(variadic) = f.last_variadic() {
            let mut extras = Vec::new();
            for a in &args[prefix_len..] {
                extras.push(Box::pin(self.eval_expr(a, caller_env, debugger)).await?);
            }
            locals.insert(variadic.name.clone(), combine_variadic(variadic.ty, extras));
        }
        let callee_env = Env { locals };
        Box::pin(self.eval_block(&f.body, f.return_type, &callee_env, debugger)).await
    }

    /// Host-evaluated string builtins. `localRun`/`localEnv`/`localCwd`/
    /// `localOs`/`localArch` query the machine running the compiler itself,
    /// matching the "local" naming (distinct from `run`, which describes a
    /// command executed inside the built container).
    fn eval_string_builtin(&self, call: &CallStmt, args: &[LlbValue]) -> Result<String, CodegenError> {
        let str_arg = |v: &LlbValue| match v {
            LlbValue::Str(s) => s.clone(),
            LlbValue::Int(i) => i.to_string(),
            LlbValue::Bool(b) => b.to_string(),
        };
        match call.func.as_str() {
            "format" => {
                let fmt = args.first().map(str_arg).unwrap_or_default();
                Ok(apply_format(&fmt, &args[1.min(args.len())..]))
            }
            "template" => Ok(args.first().map(str_arg).unwrap_or_default()),
            "localEnv" => {
                let key = args.first().map(str_arg).unwrap_or_default();
                Ok(std::env::var(key).unwrap_or_default())
            }
            "localCwd" => std::env::current_dir()
                .map(|p| p.display().to_string())
                .map_err(|e| CodegenError::LocalExecFailed {
                    command: "localCwd".into(),
                    cause: e.to_string(),
                    pos: call.func_range.start.clone(),
                }),
            "localOs" => Ok(std::env::consts::OS.to_string()),
            "localArch" => Ok(std::env::consts::ARCH.to_string()),
            "localRun" => {
                let command = args.first().map(str_arg).unwrap_or_default();
                let rest: Vec<String> = args[1.min(args.len())..].iter().map(str_arg).collect();
                let output = Command::new(&command)
                    .args(&rest)
                    .output()
                    .map_err(|e| CodegenError::LocalExecFailed {
                        command: command.clone(),
                        cause: e.to_string(),
                        pos: call.func_range.start.clone(),
                    })?;
                Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
            }
            other => unreachable!("'{other}' is not a string builtin"),
        }
    }
}

fn combine_variadic(ty: Type, mut values: Vec<Value>) -> Value {
    match ty {
        Type::String => Value::Str(
            values
                .iter()
                .filter_map(|v| match v {
                    Value::Str(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Type::Fs => values.pop().unwrap_or(Value::Fs(State::new())),
        Type::Int => values.pop().unwrap_or(Value::Int(0)),
        Type::Bool => values.pop().unwrap_or(Value::Bool(false)),
        Type::Option(_) => Value::Options(values.into_iter().flat_map(Value::into_options).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlb_solve::fake::InMemoryRegistry;
    use hlb_span::SourceFile;

    fn checked_module(src: &str) -> Module {
        let mut file = SourceFile::new("t.hlb", src);
        let module = hlb_parser::parse(&mut file).expect("parses");
        let (_checked, errs) = hlb_checker::check_module(&module);
        assert!(errs.is_empty(), "{errs:?}");
        module
    }

    async fn generate(src: &str, target: &str, registry: &InMemoryRegistry, platform: Option<Platform>) -> SolveRequest {
        let module = checked_module(src);
        let eval = Evaluator::new(&module, registry, platform);
        let mut dbg = crate::debugger::NullDebugger;
        eval.prime(&mut dbg).await.expect("primes");
        eval.generate_target(target).expect("generates")
    }

    #[tokio::test]
    async fn scratch_run_copy_chain_produces_three_ops() {
        let registry = InMemoryRegistry::new();
        let req = generate(
            "fs build() {\n\tscratch\n\trun \"echo hi\"\n\tcopy scratch \"/\" \"/out\"\n}\n",
            "build",
            &registry,
            None,
        )
        .await;
        let SolveRequest::Leaf { state, .. } = req else {
            panic!("expected a leaf request");
        };
        let names: Vec<&str> = state.ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["scratch", "run", "copy"]);
        // `copy`'s first argument is itself an `fs` source, threaded through `input`.
        assert!(state.ops[2].input.is_some());
    }

    #[tokio::test]
    async fn string_function_formats_its_single_statement() {
        let module = checked_module("string tag() {\n\tformat \"v%d\" \"1\"\n}\n");
        let registry = InMemoryRegistry::new();
        let eval = Evaluator::new(&module, &registry, None);
        let mut dbg = NullDebugger;
        eval.prime(&mut dbg).await.expect("primes");
        let tag = eval.results.borrow().get("tag").cloned().expect("primed");
        assert_eq!(tag.as_llb_scalar(), LlbValue::Str("v1".to_string()));
    }

    #[tokio::test]
    async fn image_with_resolve_requires_a_configured_platform() {
        let registry = InMemoryRegistry::new();
        registry.seed("alpine:3.19", Some("linux/amd64"), "sha256:pinned");
        let module = checked_module("fs build() {\n\timage \"alpine:3.19\" with option::image {\n\t\tresolve\n\t}\n}\n");
        let eval = Evaluator::new(&module, &registry, None);
        let mut dbg = NullDebugger;
        let result = eval.prime(&mut dbg).await;
        assert!(matches!(result, Err(CodegenError::PlatformRequired { .. })));
    }

    #[tokio::test]
    async fn image_with_resolve_pins_a_digest_option() {
        let registry = InMemoryRegistry::new();
        registry.seed("alpine:3.19", Some("linux/amd64"), "sha256:pinned");
        let platform = Platform {
            os: "linux".to_string(),
            arch: "amd64".to_string(),
        };
        let req = generate(
            "fs build() {\n\timage \"alpine:3.19\" with option::image {\n\t\tresolve\n\t}\n}\n",
            "build",
            &registry,
            Some(platform),
        )
        .await;
        let SolveRequest::Leaf { state, .. } = req else {
            panic!("expected a leaf request");
        };
        let op = &state.ops[0];
        let resolved = op.options.iter().find(|o| o.name == "resolvedDigest").expect("pinned");
        assert_eq!(resolved.args, vec![LlbValue::Str("sha256:pinned".to_string())]);
    }

    #[tokio::test]
    async fn variadic_run_with_inline_options_collects_option_applies() {
        let registry = InMemoryRegistry::new();
        let req = generate(
            "fs build() {\n\tscratch\n\trun \"a\" \"b\" with option::run {\n\t\tdir \"/tmp\"\n\t\tenv \"K\" \"V\"\n\t}\n}\n",
            "build",
            &registry,
            None,
        )
        .await;
        let SolveRequest::Leaf { state, .. } = req else {
            panic!("expected a leaf request");
        };
        let run_op = &state.ops[1];
        assert_eq!(
            run_op.args,
            vec![LlbValue::Str("a".to_string()), LlbValue::Str("b".to_string())]
        );
        let names: Vec<&str> = run_op.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["dir", "env"]);
    }

    #[tokio::test]
    async fn non_local_alias_is_visible_from_a_later_declared_function() {
        let registry = InMemoryRegistry::new();
        let req = generate(
            "fs base() {\n\tscratch as b\n}\n\nfs build() {\n\tb\n\trun \"echo\"\n}\n",
            "build",
            &registry,
            None,
        )
        .await;
        let SolveRequest::Leaf { state, .. } = req else {
            panic!("expected a leaf request");
        };
        let names: Vec<&str> = state.ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["scratch", "run"]);
    }

    fn dummy_range() -> hlb_span::Range {
        let p = hlb_span::Position::new("t.hlb", 0, 1, 1);
        hlb_span::Range::new(p.clone(), p)
    }

    #[tokio::test]
    async fn eval_standalone_fs_evaluates_a_zero_arg_source_function() {
        let module = checked_module("fs gitSource() {\n\tgit \"example.com/repo\" \"main\"\n}\n");
        let registry = InMemoryRegistry::new();
        let eval = Evaluator::new(&module, &registry, None);
        let mut dbg = NullDebugger;
        let expr = Expr::Ident(hlb_ast::IdentExpr {
            name: "gitSource".to_string(),
            range: dummy_range(),
        });
        let state = eval.eval_standalone_fs(&expr, &mut dbg).await.expect("evaluates");
        assert_eq!(state.ops.len(), 1);
        assert_eq!(state.ops[0].name, "git");
    }

    #[tokio::test]
    async fn eval_standalone_fs_rejects_a_non_fs_expr() {
        let module = checked_module("fs build() {\n\tscratch\n}\n");
        let registry = InMemoryRegistry::new();
        let eval = Evaluator::new(&module, &registry, None);
        let mut dbg = NullDebugger;
        let expr = Expr::BasicLit(hlb_ast::BasicLit {
            value: LiteralValue::Str("example.com/repo".to_string()),
            raw: "\"example.com/repo\"".to_string(),
            range: dummy_range(),
        });
        let result = eval.eval_standalone_fs(&expr, &mut dbg).await;
        assert!(matches!(result, Err(CodegenError::InvalidImportSource)));
    }

    #[tokio::test]
    async fn debugger_abort_stops_evaluation() {
        #[derive(Clone)]
        struct AbortFirst;
        impl Debugger for AbortFirst {
            fn before_call(&mut self, _state: Option<&State>, _call: &CallStmt) -> DebugAction {
                DebugAction::Abort
            }
        }

        let module = checked_module("fs build() {\n\tscratch\n}\n");
        let registry = InMemoryRegistry::new();
        let eval = Evaluator::new(&module, &registry, None);
        let mut dbg = AbortFirst;
        let result = eval.prime(&mut dbg).await;
        assert!(matches!(result, Err(CodegenError::DebugExit(ref f)) if f == "scratch"));
    }
}

/// Sequentially replaces `%s`/`%d`/`%v`/`%t` tokens with `values` in order —
/// a deliberately small `printf`-style subset rather than a full format-spec
/// parser, matching what `format`'s catalog entry (string, variadic) needs.
fn apply_format(fmt: &str, values: &[LlbValue]) -> String {
    let str_arg = |v: &LlbValue| match v {
        LlbValue::Str(s) => s.clone(),
        LlbValue::Int(i) => i.to_string(),
        LlbValue::Bool(b) => b.to_string(),
    };
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();
    let mut next_value = values.iter();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.peek() {
                Some('s') | Some('d') | Some('v') | Some('t') => {
                    chars.next();
                    if let Some(v) = next_value.next() {
                        out.push_str(&str_arg(v));
                    }
                    continue;
                }
                Some('%') => {
                    chars.next();
                    out.push('%');
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}
