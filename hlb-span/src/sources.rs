use indexmap::IndexMap;

use crate::position::Position;
use crate::source_file::SourceFile;

/// Registry of every file participating in a compile, keyed by filename.
///
/// Iteration order matches insertion order (the entry file first, then each
/// import as it is resolved) so diagnostics and `module tree` output are
/// deterministic without re-sorting, except where the diagnostic engine
/// explicitly reorders the primary file to the front (see `hlb-diagnostics`).
#[derive(Debug, Default, Clone)]
pub struct Sources {
    files: IndexMap<String, SourceFile>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: SourceFile) {
        self.files.insert(file.name().to_string(), file);
    }

    pub fn get(&self, name: &str) -> Option<&SourceFile> {
        self.files.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SourceFile> {
        self.files.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceFile)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolve a byte offset in a known file into a [`Position`]. Returns
    /// `None` if the file was never registered.
    pub fn position(&self, file: &str, offset: usize) -> Option<Position> {
        self.files.get(file).map(|f| f.position(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut sources = Sources::new();
        sources.insert(SourceFile::new("b.hlb", "fs b() { scratch }"));
        sources.insert(SourceFile::new("a.hlb", "fs a() { scratch }"));
        let names: Vec<_> = sources.names().collect();
        assert_eq!(names, vec!["b.hlb", "a.hlb"]);
    }

    #[test]
    fn position_looks_up_through_the_registry() {
        let mut sources = Sources::new();
        sources.insert(SourceFile::new("a.hlb", "ab\ncd\n"));
        let pos = sources.position("a.hlb", 4).unwrap();
        assert_eq!(pos.line, 2);
        assert!(sources.position("missing.hlb", 0).is_none());
    }
}
