use serde::{Deserialize, Serialize};

/// A decoded `BasicLit` value. `raw` on the owning node keeps the exact source
/// text (quotes, escapes, numeric base) so the unparser can reproduce
/// unmodified input byte-for-byte instead of re-serializing the decoded form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl LiteralValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Str(_) => "string",
            LiteralValue::Int(_) => "int",
            LiteralValue::Bool(_) => "bool",
        }
    }
}
