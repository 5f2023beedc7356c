use serde::{Deserialize, Serialize};

use crate::decl::Decl;

/// One parsed file: an ordered list of declarations plus whatever file-level
/// comment group precedes the first real declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub file: String,
    pub decls: Vec<Decl>,
}

impl Module {
    pub fn new(file: impl Into<String>, decls: Vec<Decl>) -> Self {
        Self {
            file: file.into(),
            decls,
        }
    }

    pub fn funcs(&self) -> impl Iterator<Item = &crate::decl::FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &crate::decl::ImportDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Import(i) => Some(i),
            _ => None,
        })
    }

    pub fn exports(&self) -> impl Iterator<Item = &crate::decl::ExportDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Export(e) => Some(e),
            _ => None,
        })
    }

    /// The leading comment group, when it did *not* get consumed as a doc
    /// comment by the first declaration (i.e. a blank line separates it from
    /// what follows). Returns `None` for an empty module or one whose first
    /// comment run glues directly onto `decls[0]`.
    pub fn header(&self) -> Option<String> {
        let mut lines = Vec::new();
        let mut iter = self.decls.iter().peekable();
        while let Some(Decl::Comment(c)) = iter.peek() {
            lines.push(c.text.trim_start_matches('#').trim().to_string());
            iter.next();
        }
        if lines.is_empty() {
            return None;
        }
        // A blank line right after the comment run means it stands alone as
        // a file header; anything else means the next declaration's own
        // doc-assignment pass claims it instead.
        match iter.next() {
            Some(Decl::Newline(_)) | None => Some(lines.join("\n")),
            Some(_) => None,
        }
    }
}
