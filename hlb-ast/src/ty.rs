use std::fmt;

use serde::{Deserialize, Serialize};

/// Option subtype flavors. Kept as a closed enum (rather than a bare string)
/// so an unknown subtype is a parse-time error, not something that silently
/// flows all the way to codegen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionSubtype {
    Image,
    Http,
    Git,
    Local,
    Run,
    Ssh,
    Secret,
    Mount,
    Mkdir,
    Mkfile,
    Rm,
    Copy,
    Generate,
}

impl OptionSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSubtype::Image => "image",
            OptionSubtype::Http => "http",
            OptionSubtype::Git => "git",
            OptionSubtype::Local => "local",
            OptionSubtype::Run => "run",
            OptionSubtype::Ssh => "ssh",
            OptionSubtype::Secret => "secret",
            OptionSubtype::Mount => "mount",
            OptionSubtype::Mkdir => "mkdir",
            OptionSubtype::Mkfile => "mkfile",
            OptionSubtype::Rm => "rm",
            OptionSubtype::Copy => "copy",
            OptionSubtype::Generate => "generate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "image" => OptionSubtype::Image,
            "http" => OptionSubtype::Http,
            "git" => OptionSubtype::Git,
            "local" => OptionSubtype::Local,
            "run" => OptionSubtype::Run,
            "ssh" => OptionSubtype::Ssh,
            "secret" => OptionSubtype::Secret,
            "mount" => OptionSubtype::Mount,
            "mkdir" => OptionSubtype::Mkdir,
            "mkfile" => OptionSubtype::Mkfile,
            "rm" => OptionSubtype::Rm,
            "copy" => OptionSubtype::Copy,
            "generate" => OptionSubtype::Generate,
            _ => return None,
        })
    }
}

impl fmt::Display for OptionSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The flat type grammar: `string | int | bool | fs | option | option::<subtype>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    String,
    Int,
    Bool,
    Fs,
    Option(Option<OptionSubtype>),
}

impl Type {
    pub fn parse(s: &str) -> Option<Self> {
        if let Some((base, sub)) = s.split_once("::") {
            if base != "option" {
                return None;
            }
            return OptionSubtype::from_str(sub).map(|s| Type::Option(Some(s)));
        }
        Some(match s {
            "string" => Type::String,
            "int" => Type::Int,
            "bool" => Type::Bool,
            "fs" => Type::Fs,
            "option" => Type::Option(None),
            _ => return None,
        })
    }

    /// Whether `self` (an argument's or block's type) satisfies a declared
    /// parameter/return type `want`. A bare `option` parameter accepts any
    /// option subtype; a subtyped `option::<x>` only accepts an exact match.
    pub fn satisfies(&self, want: &Type) -> bool {
        match (self, want) {
            (Type::Option(Some(_)), Type::Option(None)) => true,
            _ => self == want,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::String => f.write_str("string"),
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
            Type::Fs => f.write_str("fs"),
            Type::Option(None) => f.write_str("option"),
            Type::Option(Some(sub)) => write!(f, "option::{sub}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_and_subtyped_option() {
        assert_eq!(Type::parse("fs"), Some(Type::Fs));
        assert_eq!(Type::parse("option"), Some(Type::Option(None)));
        assert_eq!(
            Type::parse("option::run"),
            Some(Type::Option(Some(OptionSubtype::Run)))
        );
        assert_eq!(Type::parse("option::bogus"), None);
        assert_eq!(Type::parse("option::"), None);
    }

    #[test]
    fn bare_option_param_accepts_any_subtype() {
        let param = Type::Option(None);
        let arg = Type::Option(Some(OptionSubtype::Run));
        assert!(arg.satisfies(&param));
        assert!(!param.satisfies(&arg));
    }
}
