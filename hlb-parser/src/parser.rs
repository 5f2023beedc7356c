use hlb_ast::{
    AliasDecl, BasicLit, Block, BlockLit, CallStmt, CommentNode, Decl, Expr, ExportDecl, FuncDecl,
    IdentExpr, ImportDecl, LiteralValue, Module, NewlineNode, Param, Stmt, Type, WithOpt,
};
use hlb_lexer::{tokenize, Cursor, Keyword, Punct, Token, TokenKind};
use hlb_span::{Range, SourceFile};

use crate::doc_assign;
use crate::error::{ParseError, ParseFailure};

/// Parse one file into a [`Module`]. On a syntax error, the failure carries
/// the partial declaration list built up to the point of failure — the
/// parser never tries to resynchronize and keep going.
pub fn parse(file: &mut SourceFile) -> Result<Module, ParseFailure> {
    let name = file.name().to_string();
    let tokens = match tokenize(file) {
        Ok(tokens) => tokens,
        Err(e) => {
            return Err(ParseFailure {
                error: ParseError::Lex(e),
                partial: Module::new(name, Vec::new()),
            });
        }
    };

    let mut parser = Parser {
        cursor: Cursor::new(tokens),
        decls: Vec::new(),
    };

    match parser.parse_module() {
        Ok(()) => {
            let mut module = Module::new(name, parser.decls);
            doc_assign::assign_docs(&mut module);
            Ok(module)
        }
        Err(error) => Err(ParseFailure {
            error,
            partial: Module::new(name, parser.decls),
        }),
    }
}

struct Parser {
    cursor: Cursor,
    decls: Vec<Decl>,
}

impl Parser {
    fn parse_module(&mut self) -> Result<(), ParseError> {
        while !self.cursor.at_eof() {
            let decl = self.parse_decl()?;
            self.decls.push(decl);
        }
        Ok(())
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        match self.peek_kind() {
            TokenKind::Comment => Ok(Decl::Comment(self.bump_comment())),
            TokenKind::Newline => Ok(Decl::Newline(self.bump_newline())),
            TokenKind::Keyword(Keyword::Import) => self.parse_import(),
            TokenKind::Keyword(Keyword::Export) => self.parse_export(),
            TokenKind::Type => self.parse_func(),
            _ => Err(self.unexpected("a declaration")),
        }
    }

    fn parse_func(&mut self) -> Result<Decl, ParseError> {
        let (return_type, ty_range) = self.expect_type()?;
        let (name, name_range) = self.expect_ident()?;
        self.expect_punct(Punct::LParen, "(")?;

        let mut params = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::Punct(Punct::RParen)) {
            params.push(self.parse_param()?);
            while matches!(self.peek_kind(), TokenKind::Punct(Punct::Comma)) {
                self.bump();
                params.push(self.parse_param()?);
            }
        }
        self.expect_punct(Punct::RParen, ")")?;
        let body = self.parse_block()?;
        let range = ty_range.merge(&body.range);
        Ok(Decl::Func(FuncDecl::new(
            None, return_type, name, name_range, params, body, range,
        )))
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let variadic = if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Variadic)) {
            self.bump();
            true
        } else {
            false
        };
        let (ty, ty_range) = self.expect_type()?;
        let (name, name_range) = self.expect_ident()?;
        Ok(Param {
            variadic,
            ty,
            name,
            range: ty_range.merge(&name_range),
        })
    }

    fn parse_import(&mut self) -> Result<Decl, ParseError> {
        let import_range = self.bump().range;
        let (name, name_range) = self.expect_ident()?;
        let source = self.parse_expr()?;
        let range = import_range.merge(&source.range());
        Ok(Decl::Import(ImportDecl {
            name,
            name_range,
            source,
            range,
        }))
    }

    fn parse_export(&mut self) -> Result<Decl, ParseError> {
        let export_range = self.bump().range;
        let (name, name_range) = self.expect_ident()?;
        let range = export_range.merge(&name_range);
        Ok(Decl::Export(ExportDecl {
            name,
            name_range,
            range,
        }))
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect_punct(Punct::LBrace, "{")?;
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Punct(Punct::RBrace) => break,
                TokenKind::Eof => return Err(ParseError::UnmatchedBrace(open.end)),
                _ => stmts.push(self.parse_stmt()?),
            }
        }
        let close = self.bump().range;
        Ok(Block {
            stmts,
            range: open.merge(&close),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::Comment => Ok(Stmt::Comment(self.bump_comment())),
            TokenKind::Newline => Ok(Stmt::Newline(self.bump_newline())),
            TokenKind::Ident => self.parse_call_stmt(),
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn parse_call_stmt(&mut self) -> Result<Stmt, ParseError> {
        let (func, func_range) = self.expect_ident()?;

        let mut args = Vec::new();
        while self.at_expr_start() {
            args.push(self.parse_expr()?);
        }

        let with_opt = if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::With)) {
            self.bump();
            Some(self.parse_with_opt()?)
        } else {
            None
        };

        let alias = if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::As)) {
            let as_range = self.bump().range;
            let local = self.peek().lexeme == "local"
                && matches!(self.peek_kind(), TokenKind::Ident)
                && matches!(self.cursor.peek2().kind, TokenKind::Ident);
            if local {
                self.bump();
            }
            let (name, name_range) = self.expect_ident()?;
            Some(AliasDecl::new(name, local, as_range.merge(&name_range)))
        } else {
            None
        };

        let mut end_range = alias
            .as_ref()
            .map(|a| a.range.clone())
            .or_else(|| with_opt.as_ref().map(|w| w.range()))
            .or_else(|| args.last().map(|a| a.range()))
            .unwrap_or_else(|| func_range.clone());

        if matches!(self.peek_kind(), TokenKind::Punct(Punct::Semicolon)) {
            end_range = end_range.merge(&self.bump().range);
        } else if !self.peek().is_stmt_end() {
            return Err(self.unexpected("';', a newline, or a comment"));
        }

        Ok(Stmt::Call(CallStmt {
            doc: None,
            func,
            func_range: func_range.clone(),
            args,
            with_opt,
            alias,
            range: func_range.merge(&end_range),
        }))
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Type => Ok(Expr::BlockLit(self.parse_block_lit()?)),
            TokenKind::Ident => {
                let (name, range) = self.expect_ident()?;
                Ok(Expr::Ident(IdentExpr { name, range }))
            }
            TokenKind::String | TokenKind::Int | TokenKind::Bool => {
                Ok(Expr::BasicLit(self.parse_basic_lit()?))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_with_opt(&mut self) -> Result<WithOpt, ParseError> {
        match self.peek_kind() {
            TokenKind::Type => Ok(WithOpt::Inline(self.parse_block_lit()?)),
            TokenKind::Ident => {
                let (name, range) = self.expect_ident()?;
                Ok(WithOpt::Ident(IdentExpr { name, range }))
            }
            _ => Err(self.unexpected("an option name or an option block")),
        }
    }

    fn parse_block_lit(&mut self) -> Result<BlockLit, ParseError> {
        let (ty, ty_range) = self.expect_type()?;
        let block = self.parse_block()?;
        let range = ty_range.merge(&block.range);
        Ok(BlockLit { ty, block, range })
    }

    fn parse_basic_lit(&mut self) -> Result<BasicLit, ParseError> {
        let tok = self.bump();
        let value = match tok.kind {
            TokenKind::String => LiteralValue::Str(decode_string(&tok.lexeme)),
            TokenKind::Int => {
                let n = decode_int(&tok.lexeme).ok_or_else(|| ParseError::UnexpectedToken {
                    expected: "a representable integer literal".to_string(),
                    got: format!("'{}'", tok.lexeme),
                    pos: tok.range.start.clone(),
                })?;
                LiteralValue::Int(n)
            }
            TokenKind::Bool => LiteralValue::Bool(tok.lexeme == "true"),
            _ => unreachable!("parse_basic_lit only called on String/Int/Bool tokens"),
        };
        Ok(BasicLit {
            value,
            raw: tok.lexeme,
            range: tok.range,
        })
    }

    fn at_expr_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident | TokenKind::Type | TokenKind::String | TokenKind::Int | TokenKind::Bool
        )
    }

    fn peek(&self) -> &Token {
        self.cursor.peek()
    }

    fn peek_kind(&self) -> TokenKind {
        self.cursor.peek().kind.clone()
    }

    fn bump(&mut self) -> Token {
        self.cursor.bump()
    }

    fn bump_comment(&mut self) -> CommentNode {
        let tok = self.bump();
        CommentNode {
            text: tok.lexeme,
            range: tok.range,
        }
    }

    fn bump_newline(&mut self) -> NewlineNode {
        let tok = self.bump();
        NewlineNode { range: tok.range }
    }

    fn expect_ident(&mut self) -> Result<(String, Range), ParseError> {
        let tok = self.bump();
        match tok.kind {
            TokenKind::Ident => Ok((tok.lexeme, tok.range)),
            other => Err(ParseError::UnexpectedToken {
                expected: "an identifier".to_string(),
                got: describe(&other, &tok.lexeme),
                pos: tok.range.start,
            }),
        }
    }

    fn expect_type(&mut self) -> Result<(Type, Range), ParseError> {
        let tok = self.bump();
        match tok.kind {
            TokenKind::Type => {
                let ty = Type::parse(&tok.lexeme).ok_or_else(|| ParseError::UnexpectedToken {
                    expected: "a known type".to_string(),
                    got: format!("'{}'", tok.lexeme),
                    pos: tok.range.start.clone(),
                })?;
                Ok((ty, tok.range))
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "a type".to_string(),
                got: describe(&other, &tok.lexeme),
                pos: tok.range.start,
            }),
        }
    }

    fn expect_punct(&mut self, want: Punct, label: &str) -> Result<Range, ParseError> {
        let tok = self.bump();
        match tok.kind {
            TokenKind::Punct(p) if p == want => Ok(tok.range),
            other => Err(ParseError::UnexpectedToken {
                expected: format!("'{label}'"),
                got: describe(&other, &tok.lexeme),
                pos: tok.range.start,
            }),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.peek();
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            got: describe(&tok.kind, &tok.lexeme),
            pos: tok.range.start.clone(),
        }
    }
}

fn describe(kind: &TokenKind, lexeme: &str) -> String {
    match kind {
        TokenKind::Eof => "end of file".to_string(),
        TokenKind::Newline => "a newline".to_string(),
        TokenKind::Comment => "a comment".to_string(),
        _ => format!("'{lexeme}'"),
    }
}

fn decode_string(lexeme: &str) -> String {
    let quote = lexeme.chars().next().expect("string lexeme is non-empty");
    let inner = &lexeme[1..lexeme.len() - 1];
    if quote == '\'' {
        return inner.to_string();
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(escaped) => out.push(escaped),
            None => {}
        }
    }
    out
}

fn decode_int(lexeme: &str) -> Option<i64> {
    if let Some(rest) = lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
        return i64::from_str_radix(rest, 16).ok();
    }
    if let Some(rest) = lexeme.strip_prefix("0o").or_else(|| lexeme.strip_prefix("0O")) {
        return i64::from_str_radix(rest, 8).ok();
    }
    if let Some(rest) = lexeme.strip_prefix("0b").or_else(|| lexeme.strip_prefix("0B")) {
        return i64::from_str_radix(rest, 2).ok();
    }
    lexeme.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_src(src: &str) -> Module {
        let mut f = SourceFile::new("t.hlb", src);
        parse(&mut f).expect("parse should succeed")
    }

    #[test]
    fn parses_minimal_function() {
        let module = parse_src("fs default() {\n\tscratch\n}\n");
        assert_eq!(module.funcs().count(), 1);
        let f = module.funcs().next().unwrap();
        assert_eq!(f.name, "default");
        assert_eq!(f.body.calls().count(), 1);
        assert_eq!(f.body.calls().next().unwrap().func, "scratch");
    }

    #[test]
    fn parses_params_and_args() {
        let module = parse_src("fs build(string tag, variadic string flags) {\n\trun build with option::run { env tag; }\n}\n");
        let f = module.funcs().next().unwrap();
        assert_eq!(f.params.len(), 2);
        assert!(f.params[1].variadic);
        let call = f.body.calls().next().unwrap();
        assert_eq!(call.args.len(), 1);
        assert!(call.with_opt.is_some());
    }

    #[test]
    fn parses_alias_with_local_marker() {
        let module = parse_src("fs default() {\n\tscratch as local base\n\trun something with base\n}\n");
        let f = module.funcs().next().unwrap();
        let first = f.body.calls().next().unwrap();
        let alias = first.alias.as_ref().unwrap();
        assert_eq!(alias.name, "base");
        assert!(alias.local);
    }

    #[test]
    fn parses_import_and_export() {
        let module = parse_src("import base git \"example.com/repo\"\nexport default\n");
        assert_eq!(module.imports().count(), 1);
        assert_eq!(module.exports().count(), 1);
        assert_eq!(module.imports().next().unwrap().name, "base");
    }

    #[test]
    fn reports_unmatched_brace_with_partial_ast() {
        let mut f = SourceFile::new("t.hlb", "fs default() {\n\tscratch\n");
        let failure = parse(&mut f).unwrap_err();
        assert!(matches!(failure.error, ParseError::UnmatchedBrace(_)));
        assert!(failure.partial().decls.is_empty());
    }

    #[test]
    fn reports_unexpected_token() {
        let mut f = SourceFile::new("t.hlb", "fs default() { ; }\n");
        let failure = parse(&mut f).unwrap_err();
        assert!(matches!(failure.error, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn decodes_hex_and_escaped_strings() {
        let module = parse_src("fs f() {\n\trun x with option::run { env \"a\\nb\" 0x1F; }\n}\n");
        let f = module.funcs().next().unwrap();
        let opt = f.body.calls().next().unwrap().with_opt.as_ref().unwrap();
        if let hlb_ast::WithOpt::Inline(b) = opt {
            let inner = b.block.calls().next().unwrap();
            assert_eq!(inner.args.len(), 2);
            if let hlb_ast::Expr::BasicLit(l) = &inner.args[0] {
                assert_eq!(l.value, hlb_ast::LiteralValue::Str("a\nb".to_string()));
            } else {
                panic!("expected a BasicLit");
            }
            if let hlb_ast::Expr::BasicLit(l) = &inner.args[1] {
                assert_eq!(l.value, hlb_ast::LiteralValue::Int(31));
            } else {
                panic!("expected a BasicLit");
            }
        } else {
            panic!("expected an inline option block");
        }
    }

    #[test]
    fn empty_decl_list_on_blank_file() {
        let module = parse_src("");
        assert!(module.decls.is_empty());
    }
}
