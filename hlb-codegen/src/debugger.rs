use hlb_ast::CallStmt;
use hlb_solve::State;

/// What the evaluator does next after a debugger inspects a pending call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    Continue,
    Step,
    Inspect,
    Abort,
}

/// Hooked in before every call statement is evaluated. Generic, never `dyn`
/// (§9) — callers pass a concrete `D: Debugger` and pay nothing when it's the
/// no-op `NullDebugger`.
pub trait Debugger {
    fn before_call(&mut self, state: Option<&State>, call: &CallStmt) -> DebugAction;
}

/// The default: never pauses, never aborts. Every `Evaluator` is generic over
/// `D: Debugger` so an attached debugger is just a different type parameter,
/// not an `Option<Box<dyn Debugger>>` runtime branch.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDebugger;

impl Debugger for NullDebugger {
    fn before_call(&mut self, _state: Option<&State>, _call: &CallStmt) -> DebugAction {
        DebugAction::Continue
    }
}
