//! The built-in catalog: `(returnType, name) -> Signature`. Built once behind
//! a `Lazy`, the way the teacher's own static lookup tables are built.

use std::collections::HashMap;

use hlb_ast::{OptionSubtype, Type};
use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct Signature {
    pub params: Vec<Type>,
    /// When true, the last entry in `params` is the type every argument past
    /// `params.len() - 1` binds to (§4.6 variadic expansion).
    pub variadic: bool,
}

fn sig(params: &[Type], variadic: bool) -> Signature {
    Signature {
        params: params.to_vec(),
        variadic,
    }
}

pub static TABLE: Lazy<HashMap<(Type, &'static str), Signature>> = Lazy::new(|| {
    use Type::{Bool, Fs, Int, Option as Opt, String as Str};
    let mut m = HashMap::new();

    // Source ops.
    m.insert((Fs, "scratch"), sig(&[], false));
    m.insert((Fs, "image"), sig(&[Str], false));
    m.insert((Fs, "http"), sig(&[Str], false));
    m.insert((Fs, "git"), sig(&[Str, Str], false));
    m.insert((Fs, "local"), sig(&[Str], false));
    m.insert((Fs, "generate"), sig(&[Fs], false));

    // Filesystem ops.
    m.insert((Fs, "run"), sig(&[Str], true));
    m.insert((Fs, "env"), sig(&[Str, Str], false));
    m.insert((Fs, "dir"), sig(&[Str], false));
    m.insert((Fs, "user"), sig(&[Str], false));
    m.insert((Fs, "mkdir"), sig(&[Str, Int], false));
    m.insert((Fs, "mkfile"), sig(&[Str, Int, Str], false));
    m.insert((Fs, "rm"), sig(&[Str], false));
    m.insert((Fs, "copy"), sig(&[Fs, Str, Str], false));
    m.insert((Fs, "shell"), sig(&[Str], true));
    m.insert((Fs, "download"), sig(&[Str], false));
    m.insert((Fs, "dockerLoad"), sig(&[Str], false));
    m.insert((Fs, "dockerPush"), sig(&[Str], false));

    // String ops.
    m.insert((Str, "format"), sig(&[Str, Str], true));
    m.insert((Str, "template"), sig(&[Str], false));
    m.insert((Str, "localRun"), sig(&[Str, Str], true));
    m.insert((Str, "localEnv"), sig(&[Str], false));
    m.insert((Str, "localCwd"), sig(&[], false));
    m.insert((Str, "localOs"), sig(&[], false));
    m.insert((Str, "localArch"), sig(&[], false));

    let image = Opt(Some(OptionSubtype::Image));
    m.insert((image, "resolve"), sig(&[], false));
    // The catalog's "no-cache" can't lex as a single identifier (hyphens
    // aren't part of the `Ident` token class); spelled `noCache` here and
    // everywhere else it recurs, matching `ignoreCache`'s camelCase.
    m.insert((image, "noCache"), sig(&[], false));

    let http = Opt(Some(OptionSubtype::Http));
    m.insert((http, "checksum"), sig(&[Str], false));
    m.insert((http, "chmod"), sig(&[Int], false));
    m.insert((http, "filename"), sig(&[Str], false));
    m.insert((http, "noCache"), sig(&[], false));

    let git = Opt(Some(OptionSubtype::Git));
    m.insert((git, "keepGitDir"), sig(&[], false));
    m.insert((git, "noCache"), sig(&[], false));

    let local = Opt(Some(OptionSubtype::Local));
    m.insert((local, "includePatterns"), sig(&[Str], true));
    m.insert((local, "excludePatterns"), sig(&[Str], true));
    m.insert((local, "followPaths"), sig(&[Str], true));

    let generate = Opt(Some(OptionSubtype::Generate));
    m.insert((generate, "frontendInput"), sig(&[Str, Fs], false));
    m.insert((generate, "frontendOpt"), sig(&[Str, Str], false));

    let run = Opt(Some(OptionSubtype::Run));
    m.insert((run, "readonlyRootfs"), sig(&[], false));
    m.insert((run, "env"), sig(&[Str, Str], false));
    m.insert((run, "dir"), sig(&[Str], false));
    m.insert((run, "user"), sig(&[Str], false));
    m.insert((run, "network"), sig(&[Str], false));
    m.insert((run, "security"), sig(&[Str], false));
    m.insert((run, "host"), sig(&[Str, Str], false));
    m.insert((run, "ssh"), sig(&[], false));
    m.insert((run, "secret"), sig(&[Str], false));
    m.insert((run, "mount"), sig(&[Fs, Str], false));
    m.insert((run, "ignoreCache"), sig(&[], false));
    m.insert((run, "shlex"), sig(&[], false));
    m.insert((run, "forward"), sig(&[Str, Str], false));
    m.insert((run, "capture"), sig(&[], false));

    let mkdir = Opt(Some(OptionSubtype::Mkdir));
    m.insert((mkdir, "createParents"), sig(&[], false));
    m.insert((mkdir, "chown"), sig(&[Str], false));
    m.insert((mkdir, "createdTime"), sig(&[Str], false));

    let mkfile = Opt(Some(OptionSubtype::Mkfile));
    m.insert((mkfile, "chown"), sig(&[Str], false));
    m.insert((mkfile, "createdTime"), sig(&[Str], false));

    let rm = Opt(Some(OptionSubtype::Rm));
    m.insert((rm, "allowNotFound"), sig(&[], false));
    m.insert((rm, "allowWildcard"), sig(&[], false));

    let copy = Opt(Some(OptionSubtype::Copy));
    m.insert((copy, "followSymlinks"), sig(&[], false));
    m.insert((copy, "contentsOnly"), sig(&[], false));
    m.insert((copy, "unpack"), sig(&[], false));
    m.insert((copy, "createDestPath"), sig(&[], false));
    m.insert((copy, "allowWildcard"), sig(&[], false));
    m.insert((copy, "allowEmptyWildcard"), sig(&[], false));
    m.insert((copy, "chmod"), sig(&[Int], false));
    m.insert((copy, "chown"), sig(&[Str], false));
    m.insert((copy, "createdTime"), sig(&[Str], false));

    let _ = Bool; // reserved: no built-in currently returns bool directly
    m
});

/// Sources that may legally open a block of type `fs` (§4.6 rule 3).
pub const SOURCE_OPS: &[&str] = &["scratch", "image", "http", "git", "local", "generate"];

pub fn lookup(return_type: Type, name: &str) -> Option<&'static Signature> {
    TABLE.get(&(return_type, name))
}

/// Whether a builtin call may legally open a block of `return_type`. `fs`
/// blocks chain state through a designated source followed by filesystem
/// ops; every other return type has no such continuation notion (string/int
/// builtins take their inputs explicitly, never an implicit "self"), so any
/// builtin there counts as a source and a second statement is always
/// `UnexpectedSource`.
pub fn is_source(return_type: Type, name: &str) -> bool {
    match return_type {
        Type::Fs => SOURCE_OPS.contains(&name),
        _ => true,
    }
}

/// Every built-in name with the given return type — the candidate set for
/// `UnknownFunc` suggestions.
pub fn names_for(return_type: Type) -> Vec<&'static str> {
    TABLE
        .keys()
        .filter(|(ty, _)| *ty == return_type)
        .map(|(_, name)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_is_nullary_fs_source() {
        let sig = lookup(Type::Fs, "scratch").unwrap();
        assert!(sig.params.is_empty());
        assert!(is_source(Type::Fs, "scratch"));
    }

    #[test]
    fn run_is_variadic_on_its_last_param() {
        let sig = lookup(Type::Fs, "run").unwrap();
        assert!(sig.variadic);
        assert_eq!(sig.params, vec![Type::String]);
    }

    #[test]
    fn option_run_exposes_mount() {
        let sig = lookup(Type::Option(Some(OptionSubtype::Run)), "mount").unwrap();
        assert_eq!(sig.params, vec![Type::Fs, Type::String]);
    }

    #[test]
    fn copy_is_not_a_source() {
        assert!(!is_source(Type::Fs, "copy"));
    }

    #[test]
    fn string_builtins_have_no_continuation_notion() {
        // None of the string ops take an implicit "self" input, so every one
        // of them is a source — a second statement in a `string` block is
        // always `UnexpectedSource`.
        assert!(is_source(Type::String, "format"));
        assert!(is_source(Type::String, "localCwd"));
    }
}
