//! A minimal LLB-shaped intermediate representation. Marshaling to the real
//! BuildKit wire protocol is the executor's job (out of scope, §1
//! Non-goals); codegen only needs a tree it can build up op-by-op and hand
//! to a `Solver`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// One applied option (`dir "/src"`, `env "K" "V"`, `noCache`, ...). A handful
/// of options (`run`'s `mount`, `generate`'s `frontendInput`) carry an `fs`
/// argument alongside their scalar ones — `state` holds that, kept separate
/// from `args` since `Value` has no `fs` variant of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionApply {
    pub name: String,
    pub args: Vec<Value>,
    pub state: Option<Box<State>>,
}

impl OptionApply {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            state: None,
        }
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(Box::new(state));
        self
    }
}

/// One op in a `State`'s op chain — a built-in name plus its evaluated
/// arguments, any accumulated option applies, and (for ops like `copy` or a
/// `mount` option that merge in another tree) the input state that feeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
    pub name: String,
    pub args: Vec<Value>,
    pub options: Vec<OptionApply>,
    pub input: Option<Box<State>>,
}

impl Op {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            options: Vec::new(),
            input: None,
        }
    }

    pub fn with_input(mut self, input: State) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn with_options(mut self, options: Vec<OptionApply>) -> Self {
        self.options = options;
        self
    }
}

/// An `fs` value: the ordered chain of ops built up while evaluating a call
/// graph. Each call appends one `Op` to its receiver's `ops`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub ops: Vec<Op>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, op: Op) -> Self {
        self.ops.push(op);
        self
    }

    pub fn last_op(&self) -> Option<&Op> {
        self.ops.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

pub type ImageDigest = String;

/// A fully-built graph ready to submit — the executor's actual wire format
/// is opaque to this crate; `state` is everything codegen produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlbDefinition {
    pub state: State,
}

/// Handle to a completed solve, opaque beyond the digest the executor
/// assigns it — used as the key for subsequent `Solver::read` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    pub digest: String,
}
