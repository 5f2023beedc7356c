//! Round-trip printer. Reproduces unmodified, canonically-formatted input
//! byte-for-byte; a modified AST is reprinted under the three rules in
//! SPEC_FULL.md §4.4 (blank line between top-level decls, block inlining,
//! exact trailing-comment preservation).

use crate::decl::{Decl, ExportDecl, FuncDecl, ImportDecl, Param};
use crate::expr::{Expr, WithOpt};
use crate::module::Module;
use crate::stmt::{Block, CallStmt, CommentNode, Stmt};

pub fn format_module(module: &Module) -> String {
    let mut parts = Vec::new();
    for decl in &module.decls {
        match decl {
            Decl::Newline(_) => continue,
            Decl::Comment(c) => parts.push(format_comment(c)),
            Decl::Func(f) => parts.push(format_func(f)),
            Decl::Import(i) => parts.push(format_import(i)),
            Decl::Export(e) => parts.push(format_export(e)),
        }
    }
    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

fn format_comment(c: &CommentNode) -> String {
    c.text.trim_end_matches('\n').to_string()
}

fn format_func(f: &FuncDecl) -> String {
    let mut s = String::new();
    if let Some(doc) = &f.doc {
        for line in doc.lines() {
            s.push_str("# ");
            s.push_str(line);
            s.push('\n');
        }
    }
    let params = f
        .params
        .iter()
        .map(format_param)
        .collect::<Vec<_>>()
        .join(", ");
    s.push_str(&format!(
        "{} {}({}) {}",
        f.return_type,
        f.name,
        params,
        format_block(&f.body, 0)
    ));
    s
}

fn format_param(p: &Param) -> String {
    if p.variadic {
        format!("variadic {} {}", p.ty, p.name)
    } else {
        format!("{} {}", p.ty, p.name)
    }
}

fn format_import(i: &ImportDecl) -> String {
    format!("import {} {}", i.name, format_expr(&i.source))
}

fn format_export(e: &ExportDecl) -> String {
    format!("export {}", e.name)
}

/// `depth` is the indent level of the block's *contents*, in tabs.
fn format_block(block: &Block, depth: usize) -> String {
    if block.stmts.is_empty() {
        return "{}".to_string();
    }
    if block.fits_one_line() {
        let inline = block
            .calls()
            .map(|c| format_call(c, depth))
            .collect::<Vec<_>>()
            .join("; ");
        return format!("{{ {}; }}", inline);
    }

    let indent = "\t".repeat(depth + 1);
    let mut out = String::from("{\n");
    let mut stmts = block.stmts.iter().peekable();
    while let Some(stmt) = stmts.next() {
        match stmt {
            Stmt::Newline(_) => out.push('\n'),
            Stmt::Comment(c) => {
                out.push_str(&indent);
                out.push_str(&format_comment(c));
                out.push('\n');
            }
            Stmt::Call(call) => {
                if let Some(doc) = &call.doc {
                    for line in doc.lines() {
                        out.push_str(&indent);
                        out.push_str("# ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                out.push_str(&indent);
                out.push_str(&format_call(call, depth + 1));
                out.push(';');
                if let Some(Stmt::Comment(trailing)) = stmts.peek() {
                    if trailing.range.start.line == call.range.end.line {
                        out.push(' ');
                        out.push_str(format_comment(trailing).trim_start_matches('#').trim_start());
                        stmts.next();
                    }
                }
                out.push('\n');
            }
        }
    }
    out.push_str(&"\t".repeat(depth));
    out.push('}');
    out
}

fn format_call(call: &CallStmt, depth: usize) -> String {
    let mut s = call.func.clone();
    for arg in &call.args {
        s.push(' ');
        s.push_str(&format_expr_at(arg, depth));
    }
    if let Some(opt) = &call.with_opt {
        s.push_str(" with ");
        s.push_str(&format_with_opt(opt, depth));
    }
    if let Some(alias) = &call.alias {
        s.push_str(" as ");
        if alias.local {
            s.push_str("local ");
        }
        s.push_str(&alias.name);
    }
    s
}

fn format_expr(expr: &Expr) -> String {
    format_expr_at(expr, 0)
}

fn format_expr_at(expr: &Expr, depth: usize) -> String {
    match expr {
        Expr::Ident(i) => i.name.clone(),
        Expr::BasicLit(l) => l.raw.clone(),
        Expr::BlockLit(b) => format!("{} {}", b.ty, format_block(&b.block, depth)),
    }
}

fn format_with_opt(opt: &WithOpt, depth: usize) -> String {
    match opt {
        WithOpt::Ident(i) => i.name.clone(),
        WithOpt::Inline(b) => format!("{} {}", b.ty, format_block(&b.block, depth)),
    }
}
