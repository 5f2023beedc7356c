use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use hlb_ast::{ImportDecl, Module};
use hlb_codegen::{Evaluator, NullDebugger};
use hlb_solve::{LlbDefinition, Registry, SolveOptions, Solver, State};
use hlb_span::SourceFile;
use petgraph::graphmap::DiGraphMap;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::digest::VertexDigest;
use crate::error::ResolveError;
use crate::visitor::Visitor;

type ResolveCell = OnceCell<Result<Arc<Module>, ResolveError>>;

/// Every module reached while walking the import graph from a set of root
/// targets, keyed by the vertex digest the resolver assigned it, plus the
/// edges actually traversed — the checker splices a module's exports into
/// an importing scope by looking up `imports[(importer_file, name)]` here.
#[derive(Debug, Default)]
pub struct ResolvedGraph {
    pub modules: HashMap<VertexDigest, Arc<Module>>,
    pub imports: HashMap<(String, String), VertexDigest>,
}

/// Turns `ImportDecl.source` expressions into fetched, parsed, cached
/// `Module`s. Holds no checker state of its own — splicing a resolved
/// module's exports into the importing scope is the caller's job once
/// `resolve_graph` returns (§4.8's scope-splicing step is driven by the
/// result, not performed inside the resolver).
pub struct Resolver<S, R> {
    vendor_root: PathBuf,
    vendor_filename: String,
    max_concurrency: usize,
    solver: Arc<S>,
    registry: Arc<R>,
    seen: Arc<Mutex<HashMap<VertexDigest, Arc<ResolveCell>>>>,
    graph: Arc<Mutex<DiGraphMap<u64, ()>>>,
}

impl<S: Solver + 'static, R: Registry + 'static> Resolver<S, R> {
    /// Takes `solver`/`registry` already behind an `Arc` so a caller that
    /// also hands them to `hlb-codegen::Evaluator` (which borrows `&R`) shares
    /// one instance instead of constructing a second for the resolver alone.
    pub fn new(vendor_root: impl Into<PathBuf>, max_concurrency: usize, solver: Arc<S>, registry: Arc<R>) -> Self {
        Self {
            vendor_root: vendor_root.into(),
            vendor_filename: "module.hlb".to_string(),
            max_concurrency: max_concurrency.max(1),
            solver,
            registry,
            seen: Arc::new(Mutex::new(HashMap::new())),
            graph: Arc::new(Mutex::new(DiGraphMap::new())),
        }
    }

    /// Breadth-first (by recursion level) traversal of every import reachable
    /// from `entry`. `targets` narrows the roots to function bodies that
    /// actually reference an import name; an empty slice treats every
    /// declaration in `entry` as a root (§4.8 step 1).
    pub async fn resolve_graph<V: Visitor + 'static>(
        &self,
        entry: Arc<Module>,
        targets: &[String],
        visitor: Arc<V>,
    ) -> Result<ResolvedGraph, ResolveError> {
        let reachable = reachable_import_names(&entry, targets);
        let sem = Arc::new(Semaphore::new(self.max_concurrency));
        let mut graph = ResolvedGraph::default();

        let mut join_set: JoinSet<Result<(String, ImportOutcome), ResolveError>> = JoinSet::new();
        for decl in entry.imports() {
            if !reachable.is_empty() && !reachable.contains(decl.name.as_str()) {
                continue;
            }
            let permit = sem.clone().acquire_owned().await.expect("semaphore never closes");
            let this_module = entry.clone();
            let decl = decl.clone();
            let resolver = self.clone_handles();
            let visitor = visitor.clone();
            join_set.spawn(async move {
                let _permit = permit;
                resolver.resolve_import(this_module, decl, Vec::new(), visitor).await
            });
        }

        while let Some(res) = join_set.join_next().await {
            let (name, outcome) = res.expect("resolver task panicked")?;
            graph.imports.insert((entry.file.clone(), name), outcome.digest.clone());
            graph.modules.extend(outcome.modules);
        }

        Ok(graph)
    }

    fn clone_handles(&self) -> ResolverHandles<S, R> {
        ResolverHandles {
            vendor_root: self.vendor_root.clone(),
            vendor_filename: self.vendor_filename.clone(),
            max_concurrency: self.max_concurrency,
            solver: self.solver.clone(),
            registry: self.registry.clone(),
            seen: self.seen.clone(),
            graph: self.graph.clone(),
        }
    }
}

/// The state a recursive resolution step needs, cheaply `Clone`-able so each
/// spawned task owns its own copy (no lifetime tied back to `Resolver`,
/// which is what lets `JoinSet::spawn`'s `'static` bound hold).
struct ResolverHandles<S, R> {
    vendor_root: PathBuf,
    vendor_filename: String,
    max_concurrency: usize,
    solver: Arc<S>,
    registry: Arc<R>,
    seen: Arc<Mutex<HashMap<VertexDigest, Arc<ResolveCell>>>>,
    graph: Arc<Mutex<DiGraphMap<u64, ()>>>,
}

struct ImportOutcome {
    digest: VertexDigest,
    modules: HashMap<VertexDigest, Arc<Module>>,
}

fn digest_node_id(digest: &VertexDigest) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    digest.hash(&mut hasher);
    hasher.finish()
}

impl<S: Solver + 'static, R: Registry + 'static> ResolverHandles<S, R> {
    #[instrument(skip_all, fields(import = %decl.name))]
    fn resolve_import<'a, V: Visitor + 'static>(
        &'a self,
        owner: Arc<Module>,
        decl: ImportDecl,
        mut ancestors: Vec<VertexDigest>,
        visitor: Arc<V>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(String, ImportOutcome), ResolveError>> + Send + 'a>>
    {
        Box::pin(async move {
            let eval = Evaluator::new(&owner, self.registry.as_ref(), None);
            let mut debugger = NullDebugger;
            let state = eval
                .eval_standalone_fs(&decl.source, &mut debugger)
                .await
                .map_err(|e| ResolveError::ImportFailed {
                    name: decl.name.clone(),
                    cause: e.to_string(),
                    pos: Some(decl.name_range.start.clone()),
                })?;
            let digest = VertexDigest::of_state(&state);

            if ancestors.contains(&digest) {
                let mut path: Vec<String> = ancestors.iter().map(VertexDigest::to_string).collect();
                path.push(digest.to_string());
                return Err(ResolveError::ImportCycle {
                    path,
                    pos: decl.name_range.start.clone(),
                });
            }

            {
                let mut graph = self.graph.lock().unwrap();
                let from = ancestors.last().map(digest_node_id).unwrap_or(0);
                let to = digest_node_id(&digest);
                graph.add_edge(from, to, ());
            }

            let cell = {
                let mut seen = self.seen.lock().unwrap();
                seen.entry(digest.clone()).or_insert_with(|| Arc::new(OnceCell::new())).clone()
            };
            let module = cell
                .get_or_try_init(|| self.fetch_or_read(&digest, &state, decl.name.clone(), visitor.as_ref()))
                .await
                .cloned()?;

            let mut modules = HashMap::new();
            modules.insert(digest.clone(), module.clone());

            ancestors.push(digest.clone());
            let sem = Arc::new(Semaphore::new(self.max_concurrency));
            let mut join_set: JoinSet<Result<(String, ImportOutcome), ResolveError>> = JoinSet::new();
            for child_decl in module.imports() {
                let permit = sem.clone().acquire_owned().await.expect("semaphore never closes");
                let handles = self.clone_self();
                let child_owner = module.clone();
                let child_decl = child_decl.clone();
                let child_ancestors = ancestors.clone();
                let visitor = visitor.clone();
                join_set.spawn(async move {
                    let _permit = permit;
                    handles.resolve_import(child_owner, child_decl, child_ancestors, visitor).await
                });
            }
            while let Some(res) = join_set.join_next().await {
                let (name, outcome) = res.expect("resolver task panicked")?;
                modules.extend(outcome.modules);
                let _ = name;
            }

            Ok((decl.name, ImportOutcome { digest, modules }))
        })
    }

    fn clone_self(&self) -> Self {
        Self {
            vendor_root: self.vendor_root.clone(),
            vendor_filename: self.vendor_filename.clone(),
            max_concurrency: self.max_concurrency,
            solver: self.solver.clone(),
            registry: self.registry.clone(),
            seen: self.seen.clone(),
            graph: self.graph.clone(),
        }
    }

    /// Reads the vendored copy if present, else submits to the `Solver`,
    /// reads the result back, and hands the source to `visitor` before
    /// parsing — vendoring happens exactly once per digest thanks to the
    /// single-flight cell this is only ever called from.
    async fn fetch_or_read<V: Visitor>(
        &self,
        digest: &VertexDigest,
        state: &State,
        name: String,
        visitor: &V,
    ) -> Result<Arc<Module>, ResolveError> {
        let (algo, head, tail) = digest.path_parts();
        let path = self
            .vendor_root
            .join(algo)
            .join(head)
            .join(tail)
            .join(&self.vendor_filename);

        let text = if let Ok(text) = fs::read_to_string(&path) {
            info!(digest = %digest, "vendor hit");
            text
        } else {
            let def = LlbDefinition { state: state.clone() };
            let result = self
                .solver
                .solve(&def, &SolveOptions::default())
                .await
                .map_err(|e| ResolveError::ImportFailed {
                    name: name.clone(),
                    cause: e.to_string(),
                    pos: None,
                })?;
            let bytes = self
                .solver
                .read(&result, &self.vendor_filename)
                .await
                .map_err(|e| ResolveError::ImportFailed {
                    name: name.clone(),
                    cause: e.to_string(),
                    pos: None,
                })?;
            let text = String::from_utf8(bytes).map_err(|e| ResolveError::ImportFailed {
                name: name.clone(),
                cause: e.to_string(),
                pos: None,
            })?;
            warn!(digest = %digest, "fetched fresh module");
            text
        };

        // Runs on both the hit and miss paths — `visit` is how a `TidyVisitor`
        // marks a digest as still reachable, not just how `VendorVisitor`
        // persists one, so skipping it on a cache hit would make every
        // subsequent tidy pass over an already-vendored tree delete
        // everything in it.
        visitor.visit(digest, &text).await?;
        parse_module(&name, &text, digest)
    }
}

fn parse_module(name: &str, text: &str, digest: &VertexDigest) -> Result<Arc<Module>, ResolveError> {
    let mut file = SourceFile::new(name, text);
    let module = hlb_parser::parse(&mut file).map_err(|e| ResolveError::ModuleParseFailed {
        digest: digest.clone(),
        cause: e.error.to_string(),
    })?;
    Ok(Arc::new(module))
}

/// Every import name an identifier inside one of `targets`' function bodies
/// mentions, approximating "reachable from the targets" without a full
/// call-graph walk (§4.8 step 1 narrowed to a concrete function subset).
/// Empty `targets` means every import is a root.
fn reachable_import_names(module: &Module, targets: &[String]) -> std::collections::HashSet<String> {
    use hlb_ast::{Expr, WithOpt};

    let mut mentioned = std::collections::HashSet::new();
    if targets.is_empty() {
        return mentioned;
    }

    fn walk_expr(expr: &Expr, out: &mut std::collections::HashSet<String>) {
        match expr {
            Expr::Ident(id) => {
                out.insert(id.name.clone());
            }
            Expr::BlockLit(b) => walk_block(&b.block, out),
            Expr::BasicLit(_) => {}
        }
    }

    fn walk_block(block: &hlb_ast::Block, out: &mut std::collections::HashSet<String>) {
        for call in block.calls() {
            out.insert(call.func.clone());
            for arg in &call.args {
                walk_expr(arg, out);
            }
            match &call.with_opt {
                Some(WithOpt::Ident(id)) => {
                    out.insert(id.name.clone());
                }
                Some(WithOpt::Inline(b)) => walk_block(&b.block, out),
                None => {}
            }
        }
    }

    for f in module.funcs() {
        if targets.contains(&f.name) {
            walk_block(&f.body, &mut mentioned);
        }
    }

    let import_names: std::collections::HashSet<&str> = module.imports().map(|i| i.name.as_str()).collect();
    mentioned.into_iter().filter(|n| import_names.contains(n.as_str())).collect()
}
