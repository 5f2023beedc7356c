use hlb_span::{Range, SourceFile};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LexError;
use crate::token::{Keyword, Punct, Token, TokenKind};

/// Single compiled regex with one named group per token class, tried in the
/// order the spec lists them (`\A`-anchored so every alternative is only
/// considered at the current cursor position, never further ahead).
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\A(?P<ws>[\r\t ]+)",
        r"|\A(?P<keyword>\b(?:with|as|variadic|import|export)\b)",
        r"|\A(?P<ty>\b(?:string|int|bool|fs|option)(?:::[a-z][a-z]*)?\b)",
        r"|\A(?P<numeric>\b0(?:b|B|o|O|x|X)[a-fA-F0-9]+\b)",
        r"|\A(?P<decimal>\b(?:0|[1-9][0-9]*)\b)",
        r#"|\A(?P<string>"(?:\\.|[^"])*"|'[^']*')"#,
        r"|\A(?P<boolean>\b(?:true|false)\b)",
        r"|\A(?P<ident>\b[A-Za-z_][A-Za-z0-9_]*\b)",
        r"|\A(?P<newline>\n)",
        r"|\A(?P<comment>#[^\n]*\n)",
        r"|\A(?P<punct>[{}(),;])",
    ))
    .expect("token regex is a compile-time constant")
});

/// Valid single-character string escapes; anything else after a `\` is rejected.
const VALID_ESCAPES: [char; 4] = ['"', '\\', 'n', 't'];

/// Lex an entire file into a flat token stream, including `Comment`/`Newline`
/// tokens (needed downstream for round-trip formatting and doc-comment
/// assignment) and a trailing `Eof` sentinel so the parser's cursor never has
/// to special-case running off the end.
pub fn tokenize(file: &mut SourceFile) -> Result<Vec<Token>, LexError> {
    let text = file.contents().to_string();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some(caps) = TOKEN_RE.captures(rest) {
            if let Some(m) = caps.name("ws") {
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("keyword") {
                let kw = Keyword::from_str(m.as_str()).expect("matched keyword alternation");
                tokens.push(make_token(file, TokenKind::Keyword(kw), m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("ty") {
                tokens.push(make_token(file, TokenKind::Type, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("numeric") {
                tokens.push(make_token(file, TokenKind::Int, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("decimal") {
                tokens.push(make_token(file, TokenKind::Int, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("string") {
                if m.as_str().starts_with('"') {
                    check_escapes(file, m.as_str(), pos)?;
                }
                tokens.push(make_token(file, TokenKind::String, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("boolean") {
                tokens.push(make_token(file, TokenKind::Bool, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("ident") {
                tokens.push(make_token(file, TokenKind::Ident, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("newline") {
                tokens.push(make_token(file, TokenKind::Newline, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("comment") {
                tokens.push(make_token(file, TokenKind::Comment, m.as_str(), pos));
                pos += m.len();
                continue;
            }
            if let Some(m) = caps.name("punct") {
                let kind = punct_kind(m.as_str()).expect("matched punct alternation");
                tokens.push(make_token(file, TokenKind::Punct(kind), m.as_str(), pos));
                pos += m.len();
                continue;
            }
            unreachable!("token regex matched without a known named group");
        }

        if rest.starts_with('"') || rest.starts_with('\'') {
            let start_pos = file.position(pos);
            return Err(LexError::LiteralNotTerminated(start_pos));
        }

        return Err(LexError::InvalidToken(file.position(pos)));
    }

    let eof_pos = file.position(text.len());
    tokens.push(Token::new(
        TokenKind::Eof,
        "",
        Range::new(eof_pos.clone(), eof_pos),
    ));
    Ok(tokens)
}

fn make_token(file: &SourceFile, kind: TokenKind, lexeme: &str, start: usize) -> Token {
    let start_pos = file.position(start);
    let end_pos = file.position(start + lexeme.len());
    Token::new(kind, lexeme, Range::new(start_pos, end_pos))
}

fn punct_kind(s: &str) -> Option<Punct> {
    Some(match s {
        "{" => Punct::LBrace,
        "}" => Punct::RBrace,
        "(" => Punct::LParen,
        ")" => Punct::RParen,
        "," => Punct::Comma,
        ";" => Punct::Semicolon,
        _ => return None,
    })
}

/// Conservative backslash-only escapes: `\"`, `\\`, `\n`, `\t`. Anything else
/// is rejected rather than silently passed through, per the spec's resolved
/// open question on string-escape semantics.
fn check_escapes(file: &SourceFile, lexeme: &str, start: usize) -> Result<(), LexError> {
    let mut chars = lexeme.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            match chars.peek().copied() {
                Some((_, next)) if VALID_ESCAPES.contains(&next) => {
                    chars.next();
                }
                Some((next_idx, next)) => {
                    return Err(LexError::InvalidEscape(file.position(start + next_idx), next));
                }
                None => {
                    return Err(LexError::LiteralNotTerminated(file.position(start + idx)));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        let mut f = SourceFile::new("t.hlb", src);
        tokenize(&mut f).expect("lex should succeed")
    }

    #[test]
    fn lexes_a_minimal_function() {
        let toks = lex("fs default() { scratch }");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Type,
                TokenKind::Ident,
                TokenKind::Punct(Punct::LParen),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Punct(Punct::LBrace),
                TokenKind::Ident,
                TokenKind::Punct(Punct::RBrace),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keeps_comments_and_newlines() {
        let toks = lex("# doc\nfs a() { scratch }\n");
        assert!(matches!(toks[0].kind, TokenKind::Comment));
        assert_eq!(toks[0].lexeme, "# doc\n");
    }

    #[test]
    fn distinguishes_option_subtype() {
        let toks = lex("option::run");
        assert_eq!(toks[0].kind, TokenKind::Type);
        assert_eq!(toks[0].lexeme, "option::run");
    }

    #[test]
    fn recognizes_hex_and_decimal_ints() {
        let toks = lex("0x1F 0o17 42");
        assert_eq!(toks[0].lexeme, "0x1F");
        assert_eq!(toks[1].lexeme, "0o17");
        assert_eq!(toks[2].lexeme, "42");
    }

    #[test]
    fn unterminated_string_is_reported() {
        let mut f = SourceFile::new("t.hlb", "fs a() { mkfile \"unterminated }");
        let err = tokenize(&mut f).unwrap_err();
        assert!(matches!(err, LexError::LiteralNotTerminated(_)));
    }

    #[test]
    fn invalid_escape_is_rejected() {
        let mut f = SourceFile::new("t.hlb", "\"bad \\q escape\"");
        let err = tokenize(&mut f).unwrap_err();
        assert!(matches!(err, LexError::InvalidEscape(_, 'q')));
    }

    #[test]
    fn invalid_token_is_reported() {
        let mut f = SourceFile::new("t.hlb", "fs a() { @ }");
        let err = tokenize(&mut f).unwrap_err();
        assert!(matches!(err, LexError::InvalidToken(_)));
    }
}
