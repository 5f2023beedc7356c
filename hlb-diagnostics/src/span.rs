use hlb_span::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanSeverity {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Warning,
}

/// One labeled region of source pointed to by a diagnostic. A `SpanError`
/// carries exactly one `Primary` span and any number of `Secondary` ones.
#[derive(Debug, Clone)]
pub struct Span {
    pub severity: SpanSeverity,
    pub start: Position,
    pub end: Position,
    pub message: Option<String>,
}

impl Span {
    pub fn primary(start: Position, end: Position, message: impl Into<String>) -> Self {
        Self {
            severity: SpanSeverity::Primary,
            start,
            end,
            message: Some(message.into()),
        }
    }

    pub fn secondary(start: Position, end: Position, message: impl Into<String>) -> Self {
        Self {
            severity: SpanSeverity::Secondary,
            start,
            end,
            message: Some(message.into()),
        }
    }

    pub fn file(&self) -> &str {
        &self.start.file
    }
}

/// A complete, self-contained diagnostic: a headline `message`, the primary
/// span it's anchored to, and any secondary spans providing extra context.
#[derive(Debug, Clone)]
pub struct SpanError {
    pub kind: ErrorKind,
    pub message: String,
    pub primary: Span,
    pub secondary: Vec<Span>,
}

impl SpanError {
    pub fn error(message: impl Into<String>, primary: Span) -> Self {
        Self {
            kind: ErrorKind::Error,
            message: message.into(),
            primary,
            secondary: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>, primary: Span) -> Self {
        Self {
            kind: ErrorKind::Warning,
            message: message.into(),
            primary,
            secondary: Vec::new(),
        }
    }

    pub fn with_secondary(mut self, span: Span) -> Self {
        self.secondary.push(span);
        self
    }

    pub fn primary_file(&self) -> &str {
        self.primary.file()
    }
}
