//! Post-pass that promotes a leading contiguous comment run into `.doc` on
//! the `FuncDecl`/`CallStmt` it immediately precedes.
//!
//! The parser never does this inline — it always emits `Comment`/`Newline`
//! as their own nodes, matching the grammar literally. This pass then walks
//! the freshly built tree once and folds adjacent comment groups in.

use hlb_ast::{CommentNode, Decl, Expr, Module, Stmt, WithOpt};

pub fn assign_docs(module: &mut Module) {
    assign_decls(&mut module.decls);
}

fn assign_decls(decls: &mut Vec<Decl>) {
    let mut out = Vec::with_capacity(decls.len());
    let mut pending: Vec<CommentNode> = Vec::new();

    for decl in decls.drain(..) {
        match decl {
            Decl::Comment(c) => pending.push(c),
            Decl::Newline(n) => {
                flush_decls(&mut out, &mut pending);
                out.push(Decl::Newline(n));
            }
            Decl::Func(mut f) => {
                if let Some(doc) = take_doc(&mut pending, f.range.start.line) {
                    f.doc = Some(doc);
                } else {
                    flush_decls(&mut out, &mut pending);
                }
                assign_stmts(&mut f.body.stmts);
                out.push(Decl::Func(f));
            }
            other => {
                flush_decls(&mut out, &mut pending);
                out.push(other);
            }
        }
    }
    flush_decls(&mut out, &mut pending);
    *decls = out;
}

fn assign_stmts(stmts: &mut Vec<Stmt>) {
    let mut out = Vec::with_capacity(stmts.len());
    let mut pending: Vec<CommentNode> = Vec::new();

    for stmt in stmts.drain(..) {
        match stmt {
            Stmt::Comment(c) => pending.push(c),
            Stmt::Newline(n) => {
                flush_stmts(&mut out, &mut pending);
                out.push(Stmt::Newline(n));
            }
            Stmt::Call(mut call) => {
                if let Some(doc) = take_doc(&mut pending, call.range.start.line) {
                    call.doc = Some(doc);
                } else {
                    flush_stmts(&mut out, &mut pending);
                }
                for arg in &mut call.args {
                    if let Expr::BlockLit(b) = arg {
                        assign_stmts(&mut b.block.stmts);
                    }
                }
                if let Some(WithOpt::Inline(b)) = &mut call.with_opt {
                    assign_stmts(&mut b.block.stmts);
                }
                out.push(Stmt::Call(call));
            }
        }
    }
    flush_stmts(&mut out, &mut pending);
    *stmts = out;
}

/// `pending` is a contiguous run of comments with no intervening blank line.
/// It qualifies as a doc group for something starting on `target_line` when
/// its last line's trailing newline lands exactly on that line — i.e. no
/// blank line separates the comment from what follows.
fn take_doc(pending: &mut Vec<CommentNode>, target_line: usize) -> Option<String> {
    let qualifies = pending
        .last()
        .is_some_and(|last| last.range.end.line == target_line);
    if !qualifies {
        return None;
    }
    let doc = join_comments(pending);
    pending.clear();
    Some(doc)
}

fn join_comments(pending: &[CommentNode]) -> String {
    pending
        .iter()
        .map(|c| {
            c.text
                .trim_end_matches('\n')
                .trim_start_matches('#')
                .trim_start()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn flush_decls(out: &mut Vec<Decl>, pending: &mut Vec<CommentNode>) {
    out.extend(pending.drain(..).map(Decl::Comment));
}

fn flush_stmts(out: &mut Vec<Stmt>, pending: &mut Vec<CommentNode>) {
    out.extend(pending.drain(..).map(Stmt::Comment));
}
