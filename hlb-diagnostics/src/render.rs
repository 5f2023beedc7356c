use colored::Colorize;

use crate::ctx::DiagnosticCtx;
use crate::span::{ErrorKind, Span, SpanError, SpanSeverity};

/// Compiler-style report: a headline, then one context block per file
/// touched by the diagnostic's spans (primary file first, the rest
/// lexicographic), each with leading/trailing context lines and a caret
/// underline per span. Adjacent windows within a file are joined; a gap
/// is marked with a `⫶`.
pub fn render(err: &SpanError, ctx: &DiagnosticCtx) -> String {
    let color = ctx.color.use_color();
    let label = match err.kind {
        ErrorKind::Error => "error",
        ErrorKind::Warning => "warning",
    };
    let headline = format!("{label}: {}", err.message);
    let headline = if color {
        match err.kind {
            ErrorKind::Error => headline.red().bold().to_string(),
            ErrorKind::Warning => headline.yellow().bold().to_string(),
        }
    } else {
        headline
    };

    let primary_file = err.primary.file().to_string();
    let mut files: Vec<String> = err
        .secondary
        .iter()
        .map(|s| s.file().to_string())
        .collect();
    files.push(primary_file.clone());
    files.sort();
    files.dedup();

    let mut ordered = vec![primary_file.clone()];
    ordered.extend(files.into_iter().filter(|f| *f != primary_file));

    let mut out = String::new();
    out.push_str(&headline);
    out.push('\n');
    out.push_str(&format!(
        "  --> {}:{}:{}\n",
        primary_file, err.primary.start.line, err.primary.start.column
    ));

    for file in ordered {
        let spans: Vec<&Span> = std::iter::once(&err.primary)
            .chain(err.secondary.iter())
            .filter(|s| s.file() == file)
            .collect();
        out.push_str(&render_file(&file, &spans, ctx, color));
    }
    out
}

fn render_file(file: &str, spans: &[&Span], ctx: &DiagnosticCtx, color: bool) -> String {
    let mut out = String::new();
    let Some(source) = ctx.sources.get(file) else {
        return out;
    };

    let mut spans = spans.to_vec();
    spans.sort_by_key(|s| s.start.line);

    let mut last_end: Option<usize> = None;
    for span in spans {
        let start_line = span.start.line.saturating_sub(ctx.num_context).max(1);
        let end_line = (span.end.line + ctx.num_context).min(source.line_count());

        if let Some(prev_end) = last_end {
            if start_line > prev_end + 1 {
                out.push_str("⫶\n");
            } else if start_line <= prev_end {
                // Overlapping window with the previous span; nothing more
                // to print for the shared lines.
            }
        }

        let from = last_end.map(|p| (p + 1).max(start_line)).unwrap_or(start_line);
        for line in from..=end_line {
            out.push_str(&format!("{line:>4} | {}\n", source.line(line)));
            if line >= span.start.line && line <= span.end.line {
                out.push_str(&caret_line(span, line, color));
            }
        }
        last_end = Some(end_line);
    }
    out
}

fn caret_line(span: &Span, line: usize, color: bool) -> String {
    let (start_col, end_col) = if line == span.start.line && line == span.end.line {
        (span.start.column, span.end.column.max(span.start.column + 1))
    } else if line == span.start.line {
        (span.start.column, span.start.column + 1)
    } else {
        (1, 2)
    };
    let pad = " ".repeat(start_col.saturating_sub(1));
    let width = end_col.saturating_sub(start_col).max(1);
    let carets = "^".repeat(width);
    let carets = if color {
        match span.severity {
            SpanSeverity::Primary => carets.red().to_string(),
            SpanSeverity::Secondary => carets.yellow().to_string(),
        }
    } else {
        carets
    };
    match &span.message {
        Some(msg) => format!("     | {pad}{carets} {msg}\n"),
        None => format!("     | {pad}{carets}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::ColorMode;
    use hlb_span::{Position, Sources};

    fn ctx(num_context: usize) -> DiagnosticCtx {
        let mut sources = Sources::new();
        sources.insert(hlb_span::SourceFile::new(
            "t.hlb",
            "fs default() {\n\tscratch\n\tunknwn\n}\n",
        ));
        DiagnosticCtx::new(sources, ColorMode::Never, num_context)
    }

    #[test]
    fn renders_header_and_caret() {
        let ctx = ctx(1);
        let pos = Position::new("t.hlb", 0, 3, 2);
        let end = Position::new("t.hlb", 0, 3, 9);
        let span = Span::primary(pos, end, "unknown function `unknwn`");
        let err = SpanError::error("unknown function `unknwn`", span);
        let rendered = render(&err, &ctx);
        assert!(rendered.contains("error: unknown function `unknwn`"));
        assert!(rendered.contains("t.hlb:3:2"));
        assert!(rendered.contains("unknwn"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn strips_color_when_never() {
        let ctx = ctx(0);
        let pos = Position::new("t.hlb", 0, 3, 2);
        let span = Span::primary(pos.clone(), pos, "x");
        let err = SpanError::error("x", span);
        let rendered = render(&err, &ctx);
        assert!(!rendered.contains("\u{1b}["));
    }
}
