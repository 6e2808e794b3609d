//! Statement and block builder.
//!
//! Tracks block-nesting depth, loop state (for `break`/`continue`
//! validity), the active label list, and the parameter-name counter. At
//! [`MAX_STMT_DEPTH`] only assignments are emitted, which bounds statement
//! recursion; function-literal bodies enter one level deeper with a fresh
//! frame (`inloop` off, labels cleared) since labels do not cross function
//! boundaries.

use crate::config::MAX_STMT_DEPTH;
use crate::expr::CallPlan;
use crate::pkg::PackageBuilder;
use microsmith_ast::{
    BasicType, Block, BranchTok, Expr, FuncType, SelectCase, Stmt, SwitchCase, Type, VarSpec,
    Variable,
};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
enum StmtKind {
    Assign,
    Block,
    For,
    If,
    Switch,
    Send,
    Select,
    Branch,
    Defer,
    // increment/decrement statements are deliberately not generated
}

impl PackageBuilder {
    /// Top-level statement dispatch. `Branch` is only offered inside a
    /// loop; at the depth bound everything collapses to an assignment.
    pub(crate) fn stmt(&mut self) -> Stmt {
        if self.stmt_depth >= MAX_STMT_DEPTH {
            return self.assign_stmt();
        }
        let mut kinds = vec![
            StmtKind::Assign,
            StmtKind::Block,
            StmtKind::For,
            StmtKind::If,
            StmtKind::Switch,
            StmtKind::Send,
            StmtKind::Select,
            StmtKind::Defer,
        ];
        if self.inloop {
            kinds.push(StmtKind::Branch);
        }
        match kinds[self.rng.gen_range(0..kinds.len())] {
            StmtKind::Assign => self.assign_stmt(),
            StmtKind::Block => Stmt::Block(self.block()),
            StmtKind::For => self.for_stmt(),
            StmtKind::If => self.if_stmt(),
            StmtKind::Switch => self.switch_stmt(),
            StmtKind::Send => self.send_stmt(),
            StmtKind::Select => self.select_stmt(),
            StmtKind::Branch => self.branch_stmt(),
            StmtKind::Defer => self.defer_stmt(),
        }
    }

    /// A block: fresh declarations, statements, then one use-all
    /// assignment so nothing is reported unused. The scope is restored to
    /// its entry shape before returning.
    pub(crate) fn block(&mut self) -> Block {
        self.stmt_depth += 1;
        let mark = self.scope.len();
        let mut stmts = Vec::new();
        let mut declared: Vec<Variable> = Vec::new();

        let groups = 3 + self.rng.gen_range(0..6);
        for _ in 0..groups {
            let (s, vars) = self.decl_group();
            stmts.push(s);
            declared.extend(vars);
        }

        let count = 6 + self.rng.gen_range(0..5);
        for _ in 0..count {
            stmts.push(self.stmt());
        }

        if !declared.is_empty() {
            stmts.push(Stmt::Assign {
                lhs: declared.iter().map(|_| Expr::Ident("_".into())).collect(),
                rhs: declared
                    .iter()
                    .map(|v| Expr::Ident(v.name.clone()))
                    .collect(),
            });
        }
        for v in declared.iter().rev() {
            self.scope.delete_by_name(&v.name);
        }
        debug_assert_eq!(self.scope.len(), mark, "scope not restored at block exit");
        self.stmt_depth -= 1;
        Block { stmts }
    }

    /// One declaration group: 1-3 fresh variables of a single type, or
    /// (shallow nesting only) a function-typed local with a literal body.
    fn decl_group(&mut self) -> (Stmt, Vec<Variable>) {
        if self.stmt_depth < MAX_STMT_DEPTH && self.rng.gen_bool(0.15) {
            return self.func_decl_group();
        }
        let t = self.random_type();
        let n = 1 + self.rng.gen_range(0..3);
        let vars: Vec<Variable> = (0..n).map(|_| self.scope.new_ident(&t)).collect();
        let stmt = Stmt::VarDecl(VarSpec {
            names: vars.iter().map(|v| v.name.clone()).collect(),
            typ: Some(t),
            values: vec![],
        });
        (stmt, vars)
    }

    /// `var FNC<k> func(...) ... = func(...) ... { ... }`; the literal is
    /// omitted with probability 0.1, leaving a nil function value.
    fn func_decl_group(&mut self) -> (Stmt, Vec<Variable>) {
        let n_args = self.rng.gen_range(0..3);
        let n_ret = self.rng.gen_range(0..3);
        let ft = FuncType {
            pkg: None,
            name: String::new(),
            args: (0..n_args).map(|_| self.random_type()).collect(),
            ret: (0..n_ret).map(|_| self.random_type()).collect(),
            local: true,
            variadic: false,
        };
        let t = Type::Func(ft.clone());
        let name = format!("FNC{}", self.local_func_count);
        self.local_func_count += 1;
        self.scope.add_variable(name.clone(), t.clone());
        let var = Variable::new(name.clone(), t.clone());

        let values = if self.rng.gen_bool(0.9) {
            vec![self.func_lit(&ft)]
        } else {
            vec![]
        };
        let stmt = Stmt::VarDecl(VarSpec {
            names: vec![name],
            typ: Some(t),
            values,
        });
        (stmt, vec![var])
    }

    /// A function literal. Labels do not cross function boundaries: the
    /// active list is cleared for the body and restored on exit, as is the
    /// loop flag. Parameters are pushed for the body and popped after.
    fn func_lit(&mut self, ft: &FuncType) -> Expr {
        let saved_labels = std::mem::take(&mut self.labels);
        let saved_inloop = std::mem::replace(&mut self.inloop, false);
        self.stmt_depth += 1;

        let mut params = Vec::new();
        for a in &ft.args {
            let name = format!("p{}", self.param_count);
            self.param_count += 1;
            self.scope.add_variable(name.clone(), a.clone());
            params.push((name, a.clone()));
        }

        let mut body = self.block();
        if !ft.ret.is_empty() {
            let values = ft.ret.iter().cloned().collect::<Vec<_>>();
            let values = values.iter().map(|t| self.expr(t)).collect();
            body.stmts.push(Stmt::Return(values));
        }

        for (name, _) in params.iter().rev() {
            self.scope.delete_by_name(name);
        }
        self.stmt_depth -= 1;
        self.inloop = saved_inloop;
        self.labels = saved_labels;

        Expr::FuncLit {
            params,
            ret: ft.ret.clone(),
            body,
        }
    }

    /// Assignment to a random assignable variable, respecting its shape:
    /// whole value, element, field, or pointer target. With nothing
    /// assignable in scope, a blank assignment is emitted.
    pub(crate) fn assign_stmt(&mut self) -> Stmt {
        let v = match self.scope.random_assignable(&mut self.rng) {
            Some(v) => v,
            None => {
                let rhs = self.expr(&Type::Basic(BasicType::Int));
                return Stmt::Assign {
                    lhs: vec![Expr::Ident("_".into())],
                    rhs: vec![rhs],
                };
            }
        };
        let whole = self.rng.gen_bool(0.5);
        let (lhs, value_type) = match &v.typ {
            Type::Struct(st) if !whole && !st.fields.is_empty() => {
                let f = st.fields[self.rng.gen_range(0..st.fields.len())].clone();
                (
                    Expr::Selector {
                        expr: Box::new(Expr::Ident(v.name.clone())),
                        sel: f.name,
                    },
                    f.typ,
                )
            }
            Type::Slice(e) if !whole => {
                let idx = Expr::IntLit(self.rng.gen_range(0..4));
                (
                    Expr::Index {
                        expr: Box::new(Expr::Ident(v.name.clone())),
                        index: Box::new(idx),
                    },
                    e.as_ref().clone(),
                )
            }
            Type::Array { len, elem } if !whole => {
                let idx = Expr::IntLit(self.rng.gen_range(0..*len as u64));
                (
                    Expr::Index {
                        expr: Box::new(Expr::Ident(v.name.clone())),
                        index: Box::new(idx),
                    },
                    elem.as_ref().clone(),
                )
            }
            Type::Map { key, value } if !whole => {
                let key = key.as_ref().clone();
                let k = self.expr(&key);
                (
                    Expr::Index {
                        expr: Box::new(Expr::Ident(v.name.clone())),
                        index: Box::new(k),
                    },
                    value.as_ref().clone(),
                )
            }
            Type::Pointer(e) if !whole => (
                Expr::Star(Box::new(Expr::Ident(v.name.clone()))),
                e.as_ref().clone(),
            ),
            other => (Expr::Ident(v.name.clone()), other.clone()),
        };
        let rhs = self.expr(&value_type);
        Stmt::Assign {
            lhs: vec![lhs],
            rhs: vec![rhs],
        }
    }

    /// Plain or range `for`. A plain loop may be labeled; any labels left
    /// unconsumed when the loop closes get dummy branch statements at the
    /// end of the body (where all three branch forms are legal) and are
    /// then cleared.
    fn for_stmt(&mut self) -> Stmt {
        let rangeable: Vec<Variable> = self
            .scope
            .iter()
            .filter(|v| {
                matches!(
                    v.typ,
                    Type::Slice(_) | Type::Array { .. } | Type::Basic(BasicType::String)
                )
            })
            .cloned()
            .collect();
        if !rangeable.is_empty() && self.rng.gen_bool(0.4) {
            let v = rangeable[self.rng.gen_range(0..rangeable.len())].clone();
            return self.range_stmt(v);
        }

        let init = if self.rng.gen_bool(0.5) {
            Some(Box::new(self.assign_stmt()))
        } else {
            None
        };
        let cond = if self.rng.gen_bool(0.94) {
            Some(self.expr(&Type::Basic(BasicType::Bool)))
        } else {
            None
        };
        let post = if self.rng.gen_bool(0.5) {
            Some(Box::new(self.assign_stmt()))
        } else {
            None
        };

        let label = if self.rng.gen_bool(0.25) {
            let l = format!("L{}", self.label_count);
            self.label_count += 1;
            self.labels.push(l.clone());
            Some(l)
        } else {
            None
        };

        let saved_inloop = std::mem::replace(&mut self.inloop, true);
        let mut body = if self.rng.gen_bool(0.97) {
            self.block()
        } else {
            Block::default()
        };
        self.inloop = saved_inloop;

        for l in std::mem::take(&mut self.labels) {
            let tok = match self.rng.gen_range(0..3u32) {
                0 => BranchTok::Break,
                1 => BranchTok::Continue,
                _ => BranchTok::Goto,
            };
            body.stmts.push(Stmt::Branch {
                tok,
                label: Some(l),
            });
        }

        let for_stmt = Stmt::For {
            init,
            cond,
            post,
            body,
        };
        match label {
            Some(l) => Stmt::Labeled {
                label: l,
                stmt: Box::new(for_stmt),
            },
            None => for_stmt,
        }
    }

    /// Range over a slice, array or string variable. The key/value
    /// identifiers are minted fresh and consumed by a use-mark at the end
    /// of the body, then removed from scope.
    fn range_stmt(&mut self, v: Variable) -> Stmt {
        let elem = match &v.typ {
            Type::Slice(e) => e.as_ref().clone(),
            Type::Array { elem, .. } => elem.as_ref().clone(),
            Type::Basic(BasicType::String) => Type::Basic(BasicType::Rune),
            _ => unreachable!("range over non-rangeable variable"),
        };
        let key = self.scope.new_ident(&Type::Basic(BasicType::Int));
        let value = self.scope.new_ident(&elem);

        let saved_inloop = std::mem::replace(&mut self.inloop, true);
        let mut body = self.block();
        self.inloop = saved_inloop;

        body.stmts.push(Stmt::Assign {
            lhs: vec![Expr::Ident("_".into()), Expr::Ident("_".into())],
            rhs: vec![
                Expr::Ident(key.name.clone()),
                Expr::Ident(value.name.clone()),
            ],
        });
        self.scope.delete_by_name(&value.name);
        self.scope.delete_by_name(&key.name);

        Stmt::Range {
            key: key.name,
            value: Some(value.name),
            expr: Expr::Ident(v.name),
            body,
        }
    }

    fn if_stmt(&mut self) -> Stmt {
        let cond = self.expr(&Type::Basic(BasicType::Bool));
        let then_block = self.block();
        let else_block = if self.rng.gen_bool(0.5) {
            Some(self.block())
        } else {
            None
        };
        Stmt::If {
            cond,
            then_block,
            else_block,
        }
    }

    /// One concrete case plus a default, which can never produce a
    /// duplicate-case error. The scrutinee type is comparable; with a
    /// pointer to it in scope, the tag may be a dereference instead.
    fn switch_stmt(&mut self) -> Stmt {
        let t = self.random_comparable_type(1);
        let tag = if self.rng.gen_bool(0.5) {
            match self.scope.random_var(&mut self.rng, &Type::pointer(t.clone())) {
                Some(p) => Expr::Star(Box::new(Expr::Ident(p.name))),
                None => self.expr(&t),
            }
        } else {
            self.expr(&t)
        };

        self.stmt_depth += 1;
        let case_expr = self.expr(&t);
        let n = 1 + self.rng.gen_range(0..2);
        let case_body: Vec<Stmt> = (0..n).map(|_| self.stmt()).collect();
        let n = 1 + self.rng.gen_range(0..2);
        let default_body: Vec<Stmt> = (0..n).map(|_| self.stmt()).collect();
        self.stmt_depth -= 1;

        Stmt::Switch {
            tag,
            cases: vec![SwitchCase {
                exprs: vec![case_expr],
                body: case_body,
            }],
            default_body,
        }
    }

    /// Send on a channel in scope, or on a freshly made one if none exists.
    fn send_stmt(&mut self) -> Stmt {
        match self.scope.random_chan(&mut self.rng) {
            Some(ch) => {
                let elem = match &ch.typ {
                    Type::Chan(e) => e.as_ref().clone(),
                    _ => unreachable!("random_chan returned a non-channel"),
                };
                let value = self.expr(&elem);
                Stmt::Send {
                    chan: Expr::Ident(ch.name),
                    value,
                }
            }
            None => {
                let elem = self.random_type();
                let value = self.expr(&elem);
                Stmt::Send {
                    chan: Expr::Make(Type::chan(elem)),
                    value,
                }
            }
        }
    }

    /// Exactly two receive clauses and a default, two statements each.
    fn select_stmt(&mut self) -> Stmt {
        self.stmt_depth += 1;
        let mut cases = Vec::new();
        for _ in 0..2 {
            let chan = match self.scope.random_chan(&mut self.rng) {
                Some(ch) => Expr::Ident(ch.name),
                None => Expr::Make(Type::chan(self.random_type())),
            };
            let body = vec![self.stmt(), self.stmt()];
            cases.push(SelectCase { chan, body });
        }
        let default_body = vec![self.stmt(), self.stmt()];
        self.stmt_depth -= 1;
        Stmt::Select {
            cases,
            default_body,
        }
    }

    /// `break`/`continue`, or any branch form with a label when one is
    /// consumed from the active list (probability 0.25).
    fn branch_stmt(&mut self) -> Stmt {
        if !self.labels.is_empty() && self.rng.gen_bool(0.25) {
            let i = self.rng.gen_range(0..self.labels.len());
            let label = self.labels.remove(i);
            let tok = match self.rng.gen_range(0..3u32) {
                0 => BranchTok::Break,
                1 => BranchTok::Continue,
                _ => BranchTok::Goto,
            };
            return Stmt::Branch {
                tok,
                label: Some(label),
            };
        }
        let tok = if self.rng.gen_bool(0.5) {
            BranchTok::Break
        } else {
            BranchTok::Continue
        };
        Stmt::Branch { tok, label: None }
    }

    /// A deferred call to a function or method returning some random type.
    /// Builtins are not legal defer targets, so the plan set is filtered.
    fn defer_stmt(&mut self) -> Stmt {
        let t = self.random_type();
        let plans: Vec<CallPlan> = self
            .call_plans(&t)
            .into_iter()
            .filter(|p| matches!(p, CallPlan::Scoped(_) | CallPlan::Method(_, _)))
            .collect();
        let call = if plans.is_empty() {
            match self.scope.random_func(&mut self.rng) {
                Some(f) => self.build_scoped_call(&f),
                None => panic!("scope invariant: predeclared function set is missing"),
            }
        } else {
            let plan = plans[self.rng.gen_range(0..plans.len())].clone();
            self.build_call(&plan, &t)
        };
        Stmt::Defer(call)
    }
}
