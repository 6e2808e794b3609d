//! Printing visitor: walks a package tree and renders target-language
//! source text into an output buffer.
//!
//! Two uniform shields keep the output parse-clean regardless of context:
//! every composite literal is parenthesized (header-position ambiguity),
//! and nested operator expressions are parenthesized (precedence).

use crate::config::EmitConfig;
use microsmith_ast::{
    Block, Constraint, Decl, Expr, FuncDecl, Package, Stmt, UnaryOp, VarSpec,
};

pub struct Printer<'a> {
    config: &'a EmitConfig,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    pub fn new(config: &'a EmitConfig) -> Printer<'a> {
        Printer {
            config,
            out: String::new(),
            indent: 0,
        }
    }

    pub fn output(self) -> String {
        self.out
    }

    fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(&self.config.indent);
        }
    }

    fn write_line(&mut self, s: &str) {
        self.write_indent();
        self.out.push_str(s);
        self.out.push('\n');
    }

    // ---- packages and declarations ----

    pub fn visit_package(&mut self, pkg: &Package) {
        self.write(&format!("package {}\n\n", pkg.name));
        if !pkg.imports.is_empty() {
            self.write("import (\n");
            for imp in &pkg.imports {
                self.write(&format!("{}\"{}\"\n", self.config.indent, imp.path));
            }
            self.write(")\n\n");
        }
        for (i, decl) in pkg.decls.iter().enumerate() {
            self.visit_decl(decl);
            if i < pkg.decls.len() - 1 {
                self.write("\n");
            }
        }
    }

    fn visit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Var(spec) => {
                self.write_indent();
                self.visit_var_spec(spec);
                self.write("\n");
            }
            Decl::Constraint(c) => self.visit_constraint(c),
            Decl::Func(f) => self.visit_func_decl(f),
        }
    }

    fn visit_constraint(&mut self, c: &Constraint) {
        self.write(&format!("type {} interface {{\n", c.name));
        let alts: Vec<String> = c.elems.iter().map(|e| e.to_string()).collect();
        self.write(&format!("{}{}\n", self.config.indent, alts.join(" | ")));
        self.write("}\n");
    }

    fn visit_func_decl(&mut self, f: &FuncDecl) {
        self.write(&format!("func {}", f.name));
        if !f.type_params.is_empty() {
            self.write("[");
            for (i, tp) in f.type_params.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write(&format!("{} {}", tp.name, tp.constraint.name));
            }
            self.write("]");
        }
        self.write("()");
        match f.ret.len() {
            0 => {}
            1 => self.write(&format!(" {}", f.ret[0])),
            _ => {
                let rets: Vec<String> = f.ret.iter().map(|t| t.to_string()).collect();
                self.write(&format!(" ({})", rets.join(", ")));
            }
        }
        self.write(" {\n");
        self.visit_block_body(&f.body);
        self.write("}\n");
    }

    fn visit_var_spec(&mut self, spec: &VarSpec) {
        self.write(&format!("var {}", spec.names.join(", ")));
        if let Some(t) = &spec.typ {
            self.write(&format!(" {}", t));
        }
        if !spec.values.is_empty() {
            self.write(" = ");
            for (i, v) in spec.values.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.visit_expr(v);
            }
        }
    }

    // ---- statements ----

    fn visit_block_body(&mut self, b: &Block) {
        self.indent += 1;
        for s in &b.stmts {
            self.visit_stmt(s);
        }
        self.indent -= 1;
    }

    fn visit_stmt(&mut self, s: &Stmt) {
        match s {
            Stmt::Assign { .. } => {
                self.write_indent();
                self.visit_simple_stmt(s);
                self.write("\n");
            }
            Stmt::VarDecl(spec) => {
                self.write_indent();
                self.visit_var_spec(spec);
                self.write("\n");
            }
            Stmt::Block(b) => {
                self.write_line("{");
                self.visit_block_body(b);
                self.write_line("}");
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.write_indent();
                self.write("for ");
                if init.is_none() && post.is_none() {
                    if let Some(c) = cond {
                        self.visit_expr(c);
                        self.write(" ");
                    }
                } else {
                    if let Some(i) = init {
                        self.visit_simple_stmt(i);
                    }
                    self.write("; ");
                    if let Some(c) = cond {
                        self.visit_expr(c);
                    }
                    self.write("; ");
                    if let Some(p) = post {
                        self.visit_simple_stmt(p);
                    }
                    self.write(" ");
                }
                self.write("{\n");
                self.visit_block_body(body);
                self.write_line("}");
            }
            Stmt::Range {
                key,
                value,
                expr,
                body,
            } => {
                self.write_indent();
                self.write(&format!("for {}", key));
                if let Some(v) = value {
                    self.write(&format!(", {}", v));
                }
                self.write(" := range ");
                self.visit_expr(expr);
                self.write(" {\n");
                self.visit_block_body(body);
                self.write_line("}");
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                self.write_indent();
                self.write("if ");
                self.visit_expr(cond);
                self.write(" {\n");
                self.visit_block_body(then_block);
                match else_block {
                    Some(e) => {
                        self.write_line("} else {");
                        self.visit_block_body(e);
                        self.write_line("}");
                    }
                    None => self.write_line("}"),
                }
            }
            Stmt::Switch {
                tag,
                cases,
                default_body,
            } => {
                self.write_indent();
                self.write("switch ");
                self.visit_expr(tag);
                self.write(" {\n");
                for case in cases {
                    self.write_indent();
                    self.write("case ");
                    for (i, e) in case.exprs.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.visit_expr(e);
                    }
                    self.write(":\n");
                    self.indent += 1;
                    for s in &case.body {
                        self.visit_stmt(s);
                    }
                    self.indent -= 1;
                }
                self.write_line("default:");
                self.indent += 1;
                for s in default_body {
                    self.visit_stmt(s);
                }
                self.indent -= 1;
                self.write_line("}");
            }
            Stmt::Send { chan, value } => {
                self.write_indent();
                self.visit_expr(chan);
                self.write(" <- ");
                self.visit_expr(value);
                self.write("\n");
            }
            Stmt::Select {
                cases,
                default_body,
            } => {
                self.write_line("select {");
                for case in cases {
                    self.write_indent();
                    self.write("case <-");
                    self.visit_operand(&case.chan);
                    self.write(":\n");
                    self.indent += 1;
                    for s in &case.body {
                        self.visit_stmt(s);
                    }
                    self.indent -= 1;
                }
                self.write_line("default:");
                self.indent += 1;
                for s in default_body {
                    self.visit_stmt(s);
                }
                self.indent -= 1;
                self.write_line("}");
            }
            Stmt::Branch { tok, label } => {
                self.write_indent();
                self.write(tok.keyword());
                if let Some(l) = label {
                    self.write(&format!(" {}", l));
                }
                self.write("\n");
            }
            Stmt::Labeled { label, stmt } => {
                self.write_line(&format!("{}:", label));
                self.visit_stmt(stmt);
            }
            Stmt::Defer(call) => {
                self.write_indent();
                self.write("defer ");
                self.visit_expr(call);
                self.write("\n");
            }
            Stmt::Return(values) => {
                self.write_indent();
                self.write("return");
                for (i, v) in values.iter().enumerate() {
                    self.write(if i == 0 { " " } else { ", " });
                    self.visit_expr(v);
                }
                self.write("\n");
            }
            Stmt::Expr(e) => {
                self.write_indent();
                self.visit_expr(e);
                self.write("\n");
            }
        }
    }

    /// A statement rendered inline without indentation or newline; only
    /// assignments appear in `for` clauses.
    fn visit_simple_stmt(&mut self, s: &Stmt) {
        match s {
            Stmt::Assign { lhs, rhs } => {
                for (i, e) in lhs.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.visit_expr(e);
                }
                self.write(" = ");
                for (i, e) in rhs.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.visit_expr(e);
                }
            }
            other => unreachable!("non-assignment in simple position: {:?}", other),
        }
    }

    // ---- expressions ----

    fn visit_expr(&mut self, e: &Expr) {
        match e {
            Expr::Ident(name) => self.write(name),
            Expr::IntLit(v) => self.write(&v.to_string()),
            Expr::FloatLit(v) => self.write(&format!("{:?}", v)),
            Expr::ImagLit(v) => self.write(&format!("{:?}i", v)),
            Expr::BoolLit(v) => self.write(if *v { "true" } else { "false" }),
            Expr::StringLit(s) => self.write(&format!("\"{}\"", s)),
            Expr::RuneLit(body) => self.write(&format!("'{}'", body)),
            Expr::Nil => self.write("nil"),
            Expr::Unary { op, expr } => {
                self.write(op.symbol());
                if *op == UnaryOp::Recv {
                    self.write(" ");
                }
                self.visit_operand(expr);
            }
            Expr::Binary { op, left, right } => {
                self.visit_operand(left);
                self.write(&format!(" {} ", op.symbol()));
                self.visit_operand(right);
            }
            Expr::Star(inner) => {
                self.write("*");
                self.visit_operand(inner);
            }
            Expr::Paren(inner) => {
                self.write("(");
                self.visit_expr(inner);
                self.write(")");
            }
            Expr::Selector { expr, sel } => {
                self.visit_operand(expr);
                self.write(&format!(".{}", sel));
            }
            Expr::Index { expr, index } => {
                self.visit_operand(expr);
                self.write("[");
                self.visit_expr(index);
                self.write("]");
            }
            Expr::Call {
                func,
                type_args,
                args,
                ellipsis,
            } => {
                self.visit_operand(func);
                if !type_args.is_empty() {
                    let ts: Vec<String> = type_args.iter().map(|t| t.to_string()).collect();
                    self.write(&format!("[{}]", ts.join(", ")));
                }
                self.write("(");
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.visit_expr(a);
                }
                if *ellipsis {
                    self.write("...");
                }
                self.write(")");
            }
            Expr::Conversion { typ, expr } => {
                self.write(&typ.to_string());
                self.write("(");
                self.visit_expr(expr);
                self.write(")");
            }
            Expr::TypeAssert { expr, typ } => {
                self.visit_operand(expr);
                self.write(&format!(".({})", typ));
            }
            Expr::CompositeLit { typ, elems } => {
                self.write("(");
                self.write(&typ.to_string());
                self.write("{");
                for (i, el) in elems.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(k) = &el.key {
                        self.visit_expr(k);
                        self.write(": ");
                    }
                    self.visit_expr(&el.value);
                }
                self.write("})");
            }
            Expr::FuncLit { params, ret, body } => {
                self.write("func(");
                for (i, (name, typ)) in params.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(&format!("{} {}", name, typ));
                }
                self.write(")");
                match ret.len() {
                    0 => {}
                    1 => self.write(&format!(" {}", ret[0])),
                    _ => {
                        let rets: Vec<String> = ret.iter().map(|t| t.to_string()).collect();
                        self.write(&format!(" ({})", rets.join(", ")));
                    }
                }
                self.write(" {\n");
                self.visit_block_body(body);
                self.write_indent();
                self.write("}");
            }
            Expr::Make(t) => self.write(&format!("make({})", t)),
            Expr::New(t) => self.write(&format!("new({})", t)),
        }
    }

    /// Operand position: parenthesize nested operator expressions so the
    /// tree's grouping survives the printer.
    fn visit_operand(&mut self, e: &Expr) {
        if matches!(e, Expr::Binary { .. } | Expr::Unary { .. } | Expr::Star(_)) {
            self.write("(");
            self.visit_expr(e);
            self.write(")");
        } else {
            self.visit_expr(e);
        }
    }
}
