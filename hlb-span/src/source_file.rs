use crate::position::Position;

/// The bytes of one file plus an incrementally-maintained newline index.
///
/// `line_starts[0]` is always `0`; `line_starts[n]` is the byte offset just past
/// the `n`-th newline. Appending bytes only ever pushes new entries onto the end,
/// so a [`SourceFile`] can be grown as a lexer/parser streams a file in without
/// re-scanning what came before.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    /// Append bytes to the buffer, extending the newline index incrementally.
    pub fn append(&mut self, more: &str) {
        let base = self.text.len();
        for (idx, _) in more.match_indices('\n') {
            self.line_starts.push(base + idx + 1);
        }
        self.text.push_str(more);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line containing `offset`.
    fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact + 1,
            Err(insert_at) => insert_at,
        }
    }

    /// The bytes of the line containing `offset`, without its trailing newline.
    pub fn segment(&self, offset: usize) -> &str {
        let line = self.line_index(offset).saturating_sub(1);
        self.line(line + 1)
    }

    /// The bytes of 1-based line `n`, without its trailing newline. Returns an
    /// empty string for an out-of-range line rather than panicking, since
    /// diagnostic context windows routinely probe one line past EOF.
    pub fn line(&self, n: usize) -> &str {
        if n == 0 || n > self.line_starts.len() {
            return "";
        }
        let start = self.line_starts[n - 1];
        let end = self
            .line_starts
            .get(n)
            .copied()
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }

    /// Build a [`Position`] for a byte offset into this file.
    pub fn position(&self, offset: usize) -> Position {
        let line = self.line_index(offset);
        let line_start = self.line_starts[line - 1];
        let column = self.text[line_start..offset.min(self.text.len())]
            .chars()
            .count()
            + 1;
        Position::new(self.name.clone(), offset, line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_returns_line_without_newline() {
        let f = SourceFile::new("f.hlb", "fs a() {\n  scratch\n}\n");
        assert_eq!(f.segment(0), "fs a() {");
        assert_eq!(f.segment(9), "  scratch");
    }

    #[test]
    fn position_tracks_line_and_column() {
        let f = SourceFile::new("f.hlb", "ab\ncd\n");
        let p = f.position(4);
        assert_eq!(p.line, 2);
        assert_eq!(p.column, 2);
    }

    #[test]
    fn append_extends_line_index_incrementally() {
        let mut f = SourceFile::new("f.hlb", "ab\n");
        f.append("cd\nef");
        assert_eq!(f.line(1), "ab");
        assert_eq!(f.line(2), "cd");
        assert_eq!(f.line(3), "ef");
    }

    #[test]
    fn line_out_of_range_is_empty() {
        let f = SourceFile::new("f.hlb", "ab\n");
        assert_eq!(f.line(0), "");
        assert_eq!(f.line(99), "");
    }
}
