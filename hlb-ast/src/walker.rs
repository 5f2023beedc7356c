//! Deterministic pre-order traversal over the AST.
//!
//! Nodes are matched by tag rather than dispatched through a visitor trait —
//! see DESIGN.md's note on closed-enum node representation. `Node::None`
//! is emitted after a subtree's children to let a stack-based visitor pop
//! without needing its own recursion.

use crate::decl::{Decl, ExportDecl, FuncDecl, ImportDecl, Param};
use crate::expr::{BasicLit, BlockLit, Expr, IdentExpr, WithOpt};
use crate::module::Module;
use crate::stmt::{AliasDecl, Block, CallStmt, CommentNode, NewlineNode, Stmt};

/// A borrowed view of one AST node, handed to the visitor in pre-order.
/// `End` closes out the subtree opened by the immediately preceding node.
#[derive(Debug)]
pub enum Node<'a> {
    Module(&'a Module),
    Decl(&'a Decl),
    Func(&'a FuncDecl),
    Param(&'a Param),
    Import(&'a ImportDecl),
    Export(&'a ExportDecl),
    Block(&'a Block),
    Stmt(&'a Stmt),
    Call(&'a CallStmt),
    Alias(&'a AliasDecl),
    Expr(&'a Expr),
    WithOpt(&'a WithOpt),
    Ident(&'a IdentExpr),
    BasicLit(&'a BasicLit),
    BlockLit(&'a BlockLit),
    Comment(&'a CommentNode),
    Newline(&'a NewlineNode),
    End,
}

/// Walk `module` in source order, calling `visitor` once per node and once
/// more with [`Node::End`] after each node's children have been visited.
pub fn walk<'a>(module: &'a Module, visitor: &mut impl FnMut(Node<'a>)) {
    visitor(Node::Module(module));
    for decl in &module.decls {
        walk_decl(decl, visitor);
    }
    visitor(Node::End);
}

fn walk_decl<'a>(decl: &'a Decl, visitor: &mut impl FnMut(Node<'a>)) {
    visitor(Node::Decl(decl));
    match decl {
        Decl::Func(f) => {
            visitor(Node::Func(f));
            for p in &f.params {
                visitor(Node::Param(p));
                visitor(Node::End);
            }
            walk_block(&f.body, visitor);
            visitor(Node::End);
        }
        Decl::Import(i) => {
            visitor(Node::Import(i));
            walk_expr(&i.source, visitor);
            visitor(Node::End);
        }
        Decl::Export(e) => {
            visitor(Node::Export(e));
            visitor(Node::End);
        }
        Decl::Comment(c) => visitor(Node::Comment(c)),
        Decl::Newline(n) => visitor(Node::Newline(n)),
    }
    visitor(Node::End);
}

fn walk_block<'a>(block: &'a Block, visitor: &mut impl FnMut(Node<'a>)) {
    visitor(Node::Block(block));
    for stmt in &block.stmts {
        walk_stmt(stmt, visitor);
    }
    visitor(Node::End);
}

fn walk_stmt<'a>(stmt: &'a Stmt, visitor: &mut impl FnMut(Node<'a>)) {
    visitor(Node::Stmt(stmt));
    match stmt {
        Stmt::Call(c) => {
            visitor(Node::Call(c));
            for arg in &c.args {
                walk_expr(arg, visitor);
            }
            if let Some(opt) = &c.with_opt {
                visitor(Node::WithOpt(opt));
                match opt {
                    WithOpt::Ident(_) => {}
                    WithOpt::Inline(b) => walk_block(&b.block, visitor),
                }
                visitor(Node::End);
            }
            if let Some(alias) = &c.alias {
                visitor(Node::Alias(alias));
                visitor(Node::End);
            }
            visitor(Node::End);
        }
        Stmt::Comment(c) => visitor(Node::Comment(c)),
        Stmt::Newline(n) => visitor(Node::Newline(n)),
    }
    visitor(Node::End);
}

fn walk_expr<'a>(expr: &'a Expr, visitor: &mut impl FnMut(Node<'a>)) {
    visitor(Node::Expr(expr));
    match expr {
        Expr::Ident(i) => visitor(Node::Ident(i)),
        Expr::BasicLit(l) => visitor(Node::BasicLit(l)),
        Expr::BlockLit(b) => {
            visitor(Node::BlockLit(b));
            walk_block(&b.block, visitor);
            visitor(Node::End);
        }
    }
    visitor(Node::End);
}

/// Convenience form of [`walk`] for callers that don't care about the `End`
/// markers and just want every node in source order.
pub fn inspect<'a>(module: &'a Module, mut f: impl FnMut(&Node<'a>)) {
    walk(module, &mut |node| {
        if !matches!(node, Node::End) {
            f(&node)
        }
    });
}
