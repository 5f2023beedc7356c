use hlb_span::Range;

/// The set of keywords recognized by the grammar. Anything else matching the
/// identifier pattern is an [`TokenKind::Ident`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    With,
    As,
    Variadic,
    Import,
    Export,
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "with" => Keyword::With,
            "as" => Keyword::As,
            "variadic" => Keyword::Variadic,
            "import" => Keyword::Import,
            "export" => Keyword::Export,
            _ => return None,
        })
    }
}

/// Punctuation characters used by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Semicolon,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Type,
    Keyword(Keyword),
    String,
    Int,
    Bool,
    Newline,
    Comment,
    Punct(Punct),
    Eof,
}

/// One lexical token: its kind, the exact source text it covers, and its span.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub range: Range,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, range: Range) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            range,
        }
    }

    pub fn is_stmt_end(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Punct(Punct::Semicolon) | TokenKind::Newline | TokenKind::Comment
        )
    }
}
