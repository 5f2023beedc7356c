//! Parse → check → resolve → lint → codegen glue for one HLB entry module
//! (§4.11). Each stage's errors are flattened into a uniform `SpanError`
//! list rather than aborting the whole call early — a caller rendering a
//! report wants every problem this source has, not just the first one.
//!
//! CLI wiring (`run`/`format`/`lint`/`module vendor|tidy|tree`/...) is
//! explicitly out of scope (§6) — this crate exposes only the library entry
//! points a separate binary would compose.

mod config;
mod logging;
mod outcome;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result as AnyResult};
use hlb_ast::Module;
use hlb_codegen::{Evaluator, NullDebugger};
use hlb_diagnostics::DiagnosticCtx;
use hlb_resolver::{Resolver, TidyVisitor, VendorVisitor};
use hlb_solve::{peer, Registry, Solver};
use hlb_span::SourceFile;
use tracing::{info, instrument, warn};

pub use config::CompileConfig;
pub use outcome::CompileOutcome;

// Re-exported so a caller driving `compile` never has to depend on the
// sub-crates directly just to name its own arguments.
pub use hlb_diagnostics::ColorMode;
pub use hlb_resolver::ResolveError;
pub use hlb_solve::SolveRequest;

pub use logging::init_from_env;

/// Parses `entry_src` (registered in `ctx.sources` under `entry_name`),
/// checks it, resolves and vendors its reachable imports, lints it, and
/// generates a `SolveRequest` for every name in `targets`.
///
/// 1. Parse entry source, registering it in `ctx.sources`.
/// 2. Declaration pass + type pass (`hlb-checker`).
/// 3. Resolve the import graph reachable from `targets` (`hlb-resolver`),
///    using `solver` to fetch and `config` to vendor/tidy.
/// 4. Lint (non-fatal) — findings flow into `CompileOutcome::lints`
///    regardless of what step 2 or 3 found.
/// 5. Generate code for each target (`hlb-codegen`, using `registry`),
///    composed into one `SolveRequest` via `hlb_solve::peer` — independent
///    targets may be codegen'd concurrently by the caller, so they're
///    combined as parallel siblings rather than a sequence.
///
/// `solver`/`registry` are taken pre-wrapped in `Arc` so this driver and
/// `hlb-resolver`'s own `'static` fetch tasks share one instance instead of
/// each constructing their own (see DESIGN.md).
#[instrument(skip_all, fields(entry = %entry_name, targets = targets.len()))]
pub async fn compile<S, R>(
    ctx: &mut DiagnosticCtx,
    config: &CompileConfig,
    entry_name: &str,
    entry_src: &str,
    targets: &[String],
    solver: Arc<S>,
    registry: Arc<R>,
) -> CompileOutcome
where
    S: Solver + 'static,
    R: Registry + 'static,
{
    let mut diagnostics = Vec::new();

    let mut file = SourceFile::new(entry_name, entry_src);
    let module = match hlb_parser::parse(&mut file) {
        Ok(module) => {
            ctx.sources.insert(file);
            module
        }
        Err(failure) => {
            diagnostics.push(failure.error.to_span_error(ctx));
            ctx.sources.insert(file);
            return CompileOutcome { request: None, diagnostics, lints: Vec::new() };
        }
    };

    let (checked, check_errors) = hlb_checker::check_module(&module);
    info!(errors = check_errors.len(), "type pass complete");
    let ctx_ref: &DiagnosticCtx = &*ctx;
    diagnostics.extend(check_errors.iter().map(|e| e.to_span_error(ctx_ref)));

    let lints = hlb_linter::lint(&module, &checked)
        .iter()
        .map(|d| d.to_span_error(ctx_ref))
        .collect();

    if !check_errors.is_empty() {
        return CompileOutcome { request: None, diagnostics, lints };
    }

    let module = Arc::new(module);
    if let Err(err) = resolve_imports(config, module.clone(), targets, solver.clone(), registry.clone()).await {
        warn!(error = %err, "import resolution failed");
        if let Some(span_err) = err.to_span_error(ctx) {
            diagnostics.push(span_err);
        }
        return CompileOutcome { request: None, diagnostics, lints };
    }

    let evaluator = Evaluator::new(module.as_ref(), registry.as_ref(), None);
    let mut debugger = NullDebugger;
    if let Err(err) = evaluator.prime(&mut debugger).await {
        if let Some(span_err) = err.to_span_error(ctx) {
            diagnostics.push(span_err);
        }
        return CompileOutcome { request: None, diagnostics, lints };
    }

    let mut request = None;
    for target in targets {
        match evaluator.generate_target(target) {
            Ok(r) => request = Some(peer(request, r)),
            Err(err) => {
                warn!(target = %target, error = %err, "codegen failed for target");
                if let Some(span_err) = err.to_span_error(ctx) {
                    diagnostics.push(span_err);
                }
            }
        }
    }

    if request.is_none() && !targets.is_empty() {
        // Every target failed to generate; nothing left worth submitting.
        return CompileOutcome { request: None, diagnostics, lints };
    }

    CompileOutcome { request, diagnostics, lints }
}

/// Reads `path` off disk and runs [`compile`] with it as the entry module,
/// using the file's own name (relative to nothing in particular — just
/// whatever `path` renders as) as the source name diagnostics anchor to.
///
/// Unlike `compile`, failure to even read the entry file is an `anyhow`
/// error rather than a `CompileOutcome` diagnostic — there's no source
/// position to attach a missing/unreadable file to, and a caller driving a
/// CLI wants the exit-code/`main` ergonomics `anyhow` gives it at this
/// outermost layer, the same split the teacher draws between its per-crate
/// `thiserror` enums and `codegraph_prep::run`'s `anyhow::Result` glue.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn compile_file<S, R>(
    ctx: &mut DiagnosticCtx,
    config: &CompileConfig,
    path: &Path,
    targets: &[String],
    solver: Arc<S>,
    registry: Arc<R>,
) -> AnyResult<CompileOutcome>
where
    S: Solver + 'static,
    R: Registry + 'static,
{
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("reading entry module '{}'", path.display()))?;
    let name = path.to_string_lossy().into_owned();
    Ok(compile(ctx, config, &name, &src, targets, solver, registry).await)
}

/// Resolves and vendors every import reachable from `targets`, picking a
/// concrete [`hlb_resolver::Visitor`] for `config.tidy` rather than taking
/// one generically — `Visitor` is deliberately never `dyn` (§9), so the two
/// cases are just two monomorphized call sites instead of one dynamic one.
async fn resolve_imports<S, R>(
    config: &CompileConfig,
    module: Arc<Module>,
    targets: &[String],
    solver: Arc<S>,
    registry: Arc<R>,
) -> Result<(), ResolveError>
where
    S: Solver + 'static,
    R: Registry + 'static,
{
    let resolver = Resolver::new(config.vendor_root.clone(), config.max_resolve_concurrency, solver, registry);

    if config.tidy {
        let visitor = Arc::new(TidyVisitor::new(config.vendor_root.clone(), "module.hlb"));
        resolver.resolve_graph(module, targets, visitor.clone()).await?;
        match visitor.sweep(&config.vendor_root) {
            Ok(removed) => info!(removed, "vendor tree swept"),
            Err(e) => warn!(error = %e, "vendor tidy sweep failed"),
        }
    } else {
        let visitor = Arc::new(VendorVisitor::new(config.vendor_root.clone(), "module.hlb"));
        resolver.resolve_graph(module, targets, visitor).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlb_diagnostics::{ColorMode, DiagnosticCtx};
    use hlb_solve::fake::{InMemoryRegistry, InMemorySolver};
    use hlb_span::Sources;

    fn ctx() -> DiagnosticCtx {
        DiagnosticCtx::new(Sources::new(), ColorMode::Never, 2)
    }

    #[tokio::test]
    async fn a_syntax_error_reports_a_diagnostic_and_no_request() {
        let mut ctx = ctx();
        let config = CompileConfig { vendor_root: std::env::temp_dir().join("hlb-test-vendor"), ..Default::default() };
        let outcome = compile(
            &mut ctx,
            &config,
            "t.hlb",
            "fs default( {\n\tscratch\n}\n",
            &["default".to_string()],
            Arc::new(InMemorySolver::default()),
            Arc::new(InMemoryRegistry::default()),
        )
        .await;
        assert!(outcome.request.is_none());
        assert!(!outcome.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn a_clean_module_with_no_imports_produces_a_request_and_no_diagnostics() {
        let mut ctx = ctx();
        let config = CompileConfig { vendor_root: std::env::temp_dir().join("hlb-test-vendor-2"), ..Default::default() };
        let outcome = compile(
            &mut ctx,
            &config,
            "t.hlb",
            "fs default() {\n\tscratch\n}\n",
            &["default".to_string()],
            Arc::new(InMemorySolver::default()),
            Arc::new(InMemoryRegistry::default()),
        )
        .await;
        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        assert!(outcome.request.is_some());
    }

    #[tokio::test]
    async fn a_function_missing_a_doc_comment_is_a_lint_not_a_fatal_diagnostic() {
        let mut ctx = ctx();
        let config = CompileConfig { vendor_root: std::env::temp_dir().join("hlb-test-vendor-3"), ..Default::default() };
        let outcome = compile(
            &mut ctx,
            &config,
            "t.hlb",
            "fs default() {\n\tscratch\n}\n",
            &["default".to_string()],
            Arc::new(InMemorySolver::default()),
            Arc::new(InMemoryRegistry::default()),
        )
        .await;
        assert!(outcome.request.is_some());
        assert!(!outcome.lints.is_empty());
    }

    #[tokio::test]
    async fn a_check_error_blocks_codegen_but_still_runs_the_linter() {
        let mut ctx = ctx();
        let config = CompileConfig { vendor_root: std::env::temp_dir().join("hlb-test-vendor-4"), ..Default::default() };
        let outcome = compile(
            &mut ctx,
            &config,
            "t.hlb",
            "fs default() {\n\tnotABuiltin\n}\n",
            &["default".to_string()],
            Arc::new(InMemorySolver::default()),
            Arc::new(InMemoryRegistry::default()),
        )
        .await;
        assert!(outcome.request.is_none());
        assert!(!outcome.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn compile_file_reports_an_anyhow_error_for_a_missing_path() {
        let mut ctx = ctx();
        let config = CompileConfig { vendor_root: std::env::temp_dir().join("hlb-test-vendor-5"), ..Default::default() };
        let result = compile_file(
            &mut ctx,
            &config,
            std::path::Path::new("/no/such/entry.hlb"),
            &["default".to_string()],
            Arc::new(InMemorySolver::default()),
            Arc::new(InMemoryRegistry::default()),
        )
        .await;
        assert!(result.is_err());
    }
}
