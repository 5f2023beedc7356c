use hlb_solve::{OptionApply, State, Value as LlbValue};

/// The typed runtime value every expression evaluates to, mirroring
/// `hlb_ast::Type`'s four-way split: `fs` carries a whole LLB `State`;
/// `option::<sub>` carries the apply list an enclosing op will fold in.
#[derive(Debug, Clone)]
pub enum Value {
    Fs(State),
    Str(String),
    Int(i64),
    Bool(bool),
    Options(Vec<OptionApply>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Fs(_) => "fs",
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Options(_) => "option",
        }
    }

    pub fn into_state(self) -> Option<State> {
        match self {
            Value::Fs(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_state(&self) -> Option<&State> {
        match self {
            Value::Fs(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_options(self) -> Vec<OptionApply> {
        match self {
            Value::Options(opts) => opts,
            _ => Vec::new(),
        }
    }

    /// The `hlb-solve` scalar this value reduces to when passed as an
    /// argument to an op (an op never receives an `fs`/`option` value as a
    /// plain argument — those are threaded through `input`/`options`).
    pub fn as_llb_scalar(&self) -> LlbValue {
        match self {
            Value::Str(s) => LlbValue::Str(s.clone()),
            Value::Int(i) => LlbValue::Int(*i),
            Value::Bool(b) => LlbValue::Bool(*b),
            Value::Fs(_) | Value::Options(_) => {
                unreachable!("fs/option values never flatten to an LLB scalar argument")
            }
        }
    }
}
