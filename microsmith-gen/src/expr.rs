//! Type-directed expression builder.
//!
//! Given a requested type and the current scope, produce an expression of
//! exactly that type. The builder never widens, narrows or infers. An
//! explicit depth counter bounds recursion; at the bound every request
//! collapses to variable-or-literal.
//!
//! Constant handling: the target language folds constant subexpressions,
//! so all-constant arithmetic can overflow a narrow type and a constant
//! zero divisor is a compile error. Wherever that could happen the builder
//! rewrites one operand through [`PackageBuilder::nonconst`], which routes
//! it through a variable or a one-element slice-literal index (never a
//! constant).

use crate::config::{LITERAL_CHANCE, MAX_EXPR_DEPTH};
use crate::pkg::PackageBuilder;
use microsmith_ast::{
    BasicType, BinaryOp, CompositeElem, Expr, ExternalCtor, Method, Type, UnaryOp, Variable,
};
use rand::Rng;

/// Fixed bank of short string literals.
const STR_BANK: [&str; 16] = [
    "", "a", "ab", "xyz", "go", "fuzz", "seed", "q", "zz", "0", "aA", "b c", "neg", "unit", "lhs",
    "rhs",
];

#[derive(Debug, Clone)]
enum ExprKind {
    VarOrLit,
    Unary,
    Binary,
    Call,
    Index,
    Composite,
    Conversion,
    Assert,
    Deref,
    Recv,
    Addr,
    MakeChan,
}

/// How a call of the requested type can be materialized.
#[derive(Debug, Clone)]
pub(crate) enum CallPlan {
    /// A function variable in scope whose single return type matches.
    Scoped(Variable),
    /// A method on an external-typed variable in scope.
    Method(Variable, Method),
    /// `len(...)` (target `int`).
    Len,
    /// `copy(dst, src)` (target `int`).
    Copy,
    /// `min`/`max` over an ordered basic target.
    MinMax,
    /// `append(slice, elems...)` (target slice).
    Append,
    /// `unsafe.SliceData(slice)` (target pointer to element).
    SliceData,
}

impl PackageBuilder {
    /// Main entry: an expression of type `t` under the current scope.
    pub(crate) fn expr(&mut self, t: &Type) -> Expr {
        self.expr_depth += 1;
        let e = if self.expr_depth >= MAX_EXPR_DEPTH {
            self.var_or_lit(t)
        } else {
            self.expr_dispatch(t)
        };
        self.expr_depth -= 1;
        e
    }

    fn expr_dispatch(&mut self, t: &Type) -> Expr {
        let mut kinds = vec![ExprKind::VarOrLit];
        if let Type::Basic(b) = t {
            if b.is_numeric() || *b == BasicType::Bool {
                kinds.push(ExprKind::Unary);
            }
            if b.is_numeric() || *b == BasicType::Bool || *b == BasicType::String {
                kinds.push(ExprKind::Binary);
            }
        }
        if !self.call_plans(t).is_empty() {
            kinds.push(ExprKind::Call);
        }
        if !self.index_candidates(t).is_empty() {
            kinds.push(ExprKind::Index);
        }
        if matches!(
            t,
            Type::Slice(_) | Type::Array { .. } | Type::Map { .. } | Type::Struct(_)
        ) {
            kinds.push(ExprKind::Composite);
        }
        if !self.conversion_sources(t).is_empty() {
            kinds.push(ExprKind::Conversion);
        }
        if self.scope.has(&Type::Basic(BasicType::Any)) && !t.contains_type_param() {
            kinds.push(ExprKind::Assert);
        }
        if self.scope.has(&Type::pointer(t.clone())) {
            kinds.push(ExprKind::Deref);
        }
        if self.scope.has(&Type::chan(t.clone())) {
            kinds.push(ExprKind::Recv);
        }
        if matches!(t, Type::Pointer(_)) {
            kinds.push(ExprKind::Addr);
        }
        if matches!(t, Type::Chan(_)) {
            kinds.push(ExprKind::MakeChan);
        }

        let kind = kinds[self.rng.gen_range(0..kinds.len())].clone();
        match kind {
            ExprKind::VarOrLit => self.var_or_lit(t),
            ExprKind::Unary => self.unary(t),
            ExprKind::Binary => self.binary(t),
            ExprKind::Call => self.call(t),
            ExprKind::Index => self.index(t),
            ExprKind::Composite => self.composite_lit(t),
            ExprKind::Conversion => self.conversion(t),
            ExprKind::Assert => self.assert_from_any(t),
            ExprKind::Deref => self.deref(t),
            ExprKind::Recv => self.recv(t),
            ExprKind::Addr => match t {
                Type::Pointer(elem) => self.addr_of(elem),
                _ => unreachable!("addr kind offered for non-pointer type"),
            },
            ExprKind::MakeChan => Expr::Make(t.clone()),
        }
    }

    /// With probability [`LITERAL_CHANCE`] a literal of `t`, otherwise a
    /// scope variable of `t` (literal again if none exists).
    pub(crate) fn var_or_lit(&mut self, t: &Type) -> Expr {
        if self.rng.gen_bool(LITERAL_CHANCE) {
            return self.lit(t);
        }
        match self.scope.random_var(&mut self.rng, t) {
            Some(v) => Expr::Ident(v.name),
            None => self.lit(t),
        }
    }

    /// A literal (or synthesized zero-cost value) of `t`. Every type the
    /// generator can request has one; hitting the final panic means the
    /// type algebra was extended without updating this table.
    pub(crate) fn lit(&mut self, t: &Type) -> Expr {
        match t {
            Type::Basic(b) => self.basic_lit(*b),
            Type::Pointer(elem) => self.addr_of(elem),
            Type::Slice(_) | Type::Array { .. } | Type::Map { .. } | Type::Struct(_) => {
                self.composite_lit(t)
            }
            Type::Chan(_) => Expr::Make(t.clone()),
            Type::Func(_) => Expr::Nil,
            Type::TypeParam(_) => Expr::Star(Box::new(Expr::New(t.clone()))),
            Type::External(x) => match x.ctor {
                Some(ExternalCtor::BigIntLit) => Expr::Star(Box::new(Expr::Call {
                    func: Box::new(Expr::Ident("big.NewInt".into())),
                    type_args: vec![],
                    args: vec![self.int_lit()],
                    ellipsis: false,
                })),
                Some(ExternalCtor::SimdUint32x4Lit) => Expr::Call {
                    func: Box::new(Expr::Ident("simd.LoadUint32x4FromSlice".into())),
                    type_args: vec![],
                    args: vec![Expr::CompositeLit {
                        typ: Type::slice(Type::Basic(BasicType::Uint32)),
                        elems: (0..4)
                            .map(|_| CompositeElem {
                                key: None,
                                value: self.int_lit(),
                            })
                            .collect(),
                    }],
                    ellipsis: false,
                },
                None => panic!("external type {} has no literal constructor", x.qualified()),
            },
        }
    }

    fn basic_lit(&mut self, b: BasicType) -> Expr {
        match b {
            _ if b.is_integer() && b != BasicType::Rune => self.int_lit(),
            BasicType::Rune => self.rune_lit(),
            BasicType::Float32 | BasicType::Float64 => self.float_lit(),
            BasicType::Complex128 => self.complex_lit(false),
            BasicType::Bool => Expr::BoolLit(self.rng.gen_bool(0.5)),
            BasicType::String => {
                let i = self.rng.gen_range(0..STR_BANK.len());
                Expr::StringLit(STR_BANK[i].to_string())
            }
            // a literal of the empty interface is a literal of any basic
            BasicType::Any => {
                let inner = self.random_basic_filtered(|x| x != BasicType::Any);
                match inner {
                    Type::Basic(ib) => self.basic_lit(ib),
                    _ => unreachable!("basic filter returned a composite"),
                }
            }
            _ => unreachable!("unhandled basic literal"),
        }
    }

    pub(crate) fn int_lit(&mut self) -> Expr {
        Expr::IntLit(self.rng.gen_range(0..100))
    }

    fn nonzero_int_lit(&mut self) -> Expr {
        Expr::IntLit(self.rng.gen_range(1..100))
    }

    fn float_lit(&mut self) -> Expr {
        let v: f64 = self.rng.gen_range(0.0..100.0);
        Expr::FloatLit((v * 100.0).round() / 100.0)
    }

    fn nonzero_float_lit(&mut self) -> Expr {
        let v: f64 = self.rng.gen_range(1.0..100.0);
        Expr::FloatLit((v * 100.0).round() / 100.0)
    }

    /// Two floats joined, `(re + imi)`. With `nonzero` both parts are >= 1.
    fn complex_lit(&mut self, nonzero: bool) -> Expr {
        let re = if nonzero {
            self.nonzero_float_lit()
        } else {
            self.float_lit()
        };
        let raw: f64 = if nonzero {
            self.rng.gen_range(1.0..100.0)
        } else {
            self.rng.gen_range(0.0..100.0)
        };
        let im = (raw * 100.0).round() / 100.0;
        Expr::Paren(Box::new(Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(re),
            right: Box::new(Expr::ImagLit(im)),
        }))
    }

    /// One of three rune shapes: plain ASCII, `\xNN`, `\uNNNN`.
    fn rune_lit(&mut self) -> Expr {
        let body = match self.rng.gen_range(0..3u32) {
            0 => {
                let c = (b'a' + self.rng.gen_range(0..26u8)) as char;
                c.to_string()
            }
            1 => format!("\\x{:02x}", self.rng.gen_range(0x20..0x7fu32)),
            _ => format!("\\u{:04x}", self.rng.gen_range(0x00a1..0x0400u32)),
        };
        Expr::RuneLit(body)
    }

    /// Rewrite a constant expression into a guaranteed non-constant one of
    /// the same type: an in-scope variable, or the expression routed
    /// through a one-element slice-literal index.
    fn nonconst(&mut self, t: &Type, e: Expr) -> Expr {
        if !e.is_constant() {
            return e;
        }
        if let Some(v) = self.scope.random_var(&mut self.rng, t) {
            return Expr::Ident(v.name);
        }
        Expr::Index {
            expr: Box::new(Expr::CompositeLit {
                typ: Type::slice(t.clone()),
                elems: vec![CompositeElem {
                    key: None,
                    value: e,
                }],
            }),
            index: Box::new(Expr::IntLit(0)),
        }
    }

    /// Address of an addressable expression of `elem`; pointers have no
    /// literal form. Falls back to `&[]T{x}[0]` when nothing in scope is
    /// addressable.
    pub(crate) fn addr_of(&mut self, elem: &Type) -> Expr {
        if let Some(v) = self.scope.random_addressable(&mut self.rng, elem) {
            return Expr::Unary {
                op: UnaryOp::Addr,
                expr: Box::new(Expr::Ident(v.name)),
            };
        }
        let value = self.lit(elem);
        Expr::Unary {
            op: UnaryOp::Addr,
            expr: Box::new(Expr::Index {
                expr: Box::new(Expr::CompositeLit {
                    typ: Type::slice(elem.clone()),
                    elems: vec![CompositeElem { key: None, value }],
                }),
                index: Box::new(Expr::IntLit(0)),
            }),
        }
    }

    fn unary(&mut self, t: &Type) -> Expr {
        let b = match t {
            Type::Basic(b) => *b,
            _ => unreachable!("unary kind offered for non-basic type"),
        };
        if b == BasicType::Bool {
            return Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(self.expr(t)),
            };
        }
        let ops: &[UnaryOp] = if b.is_integer() {
            &[UnaryOp::Plus, UnaryOp::Neg, UnaryOp::BitNot]
        } else {
            &[UnaryOp::Plus, UnaryOp::Neg]
        };
        let op = ops[self.rng.gen_range(0..ops.len())];
        let mut operand = self.expr(t);
        // a folded `-c` or `^c` is out of range for every unsigned type
        if b.is_unsigned() && op != UnaryOp::Plus {
            operand = self.nonconst(t, operand);
        }
        Expr::Unary {
            op,
            expr: Box::new(operand),
        }
    }

    fn binary(&mut self, t: &Type) -> Expr {
        let b = match t {
            Type::Basic(b) => *b,
            _ => unreachable!("binary kind offered for non-basic type"),
        };
        if b == BasicType::Bool {
            if self.rng.gen_bool(0.5) {
                let op = if self.rng.gen_bool(0.5) {
                    BinaryOp::LAnd
                } else {
                    BinaryOp::LOr
                };
                return Expr::Binary {
                    op,
                    left: Box::new(self.expr(t)),
                    right: Box::new(self.expr(t)),
                };
            }
            return self.comparison();
        }
        if b == BasicType::String {
            return Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(self.expr(t)),
                right: Box::new(self.expr(t)),
            };
        }
        if b.is_integer() {
            const OPS: [BinaryOp; 11] = [
                BinaryOp::Add,
                BinaryOp::Sub,
                BinaryOp::Mul,
                BinaryOp::Div,
                BinaryOp::Rem,
                BinaryOp::And,
                BinaryOp::Or,
                BinaryOp::Xor,
                BinaryOp::AndNot,
                BinaryOp::Shl,
                BinaryOp::Shr,
            ];
            let op = OPS[self.rng.gen_range(0..OPS.len())];
            return self.int_binary(t, op);
        }
        // float or complex arithmetic
        const FOPS: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];
        let op = FOPS[self.rng.gen_range(0..FOPS.len())];
        let left = self.expr(t);
        let mut right = self.expr(t);
        if op == BinaryOp::Div && right.is_constant() {
            right = if b == BasicType::Complex128 {
                self.complex_lit(true)
            } else {
                self.nonzero_float_lit()
            };
        }
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn int_binary(&mut self, t: &Type, op: BinaryOp) -> Expr {
        match op {
            BinaryOp::Shl | BinaryOp::Shr => {
                let left = self.expr(t);
                let left = self.nonconst(t, left);
                let right = self.expr(&Type::Basic(BasicType::Uint8));
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            BinaryOp::Div | BinaryOp::Rem => {
                let left = self.expr(t);
                let mut right = self.expr(t);
                if right.is_constant() {
                    right = self.nonzero_int_lit();
                }
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            _ => {
                let mut left = self.expr(t);
                let right = self.expr(t);
                if left.is_constant() && right.is_constant() {
                    left = self.nonconst(t, left);
                }
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        }
    }

    /// A boolean produced by comparing two operands of some basic type.
    fn comparison(&mut self) -> Expr {
        let u = self.random_basic_filtered(|b| b != BasicType::Any);
        let ub = match u {
            Type::Basic(b) => b,
            _ => unreachable!("basic filter returned a composite"),
        };
        let ops: &[BinaryOp] = if ub.is_ordered() {
            &[
                BinaryOp::Eq,
                BinaryOp::Ne,
                BinaryOp::Lt,
                BinaryOp::Le,
                BinaryOp::Gt,
                BinaryOp::Ge,
            ]
        } else {
            &[BinaryOp::Eq, BinaryOp::Ne]
        };
        let op = ops[self.rng.gen_range(0..ops.len())];
        Expr::Binary {
            op,
            left: Box::new(self.expr(&u)),
            right: Box::new(self.expr(&u)),
        }
    }

    // ---- calls ----

    pub(crate) fn call_plans(&self, t: &Type) -> Vec<CallPlan> {
        let mut plans = Vec::new();
        for v in self.scope.iter() {
            match &v.typ {
                Type::Func(ft) => {
                    let sentinel = ft.args.is_empty() && ft.ret.is_empty();
                    if !sentinel && ft.ret.len() == 1 && &ft.ret[0] == t {
                        plans.push(CallPlan::Scoped(v.clone()));
                    }
                }
                Type::External(x) => collect_methods(x, v, t, &mut plans),
                Type::Pointer(inner) => {
                    if let Type::External(x) = inner.as_ref() {
                        collect_methods(x, v, t, &mut plans);
                    }
                }
                _ => {}
            }
        }
        match t {
            Type::Basic(BasicType::Int) => {
                plans.push(CallPlan::Len);
                plans.push(CallPlan::Copy);
                plans.push(CallPlan::MinMax);
            }
            Type::Basic(b) if b.is_ordered() => plans.push(CallPlan::MinMax),
            Type::Slice(_) => plans.push(CallPlan::Append),
            Type::Pointer(_) => plans.push(CallPlan::SliceData),
            _ => {}
        }
        plans
    }

    fn call(&mut self, t: &Type) -> Expr {
        let plans = self.call_plans(t);
        let plan = plans[self.rng.gen_range(0..plans.len())].clone();
        self.build_call(&plan, t)
    }

    pub(crate) fn build_call(&mut self, plan: &CallPlan, t: &Type) -> Expr {
        match plan {
            CallPlan::Scoped(v) => self.build_scoped_call(v),
            CallPlan::Method(recv, m) => {
                let args = m.args.iter().map(|a| self.expr(a)).collect();
                Expr::Call {
                    func: Box::new(Expr::Selector {
                        expr: Box::new(Expr::Ident(recv.name.clone())),
                        sel: m.name.clone(),
                    }),
                    type_args: vec![],
                    args,
                    ellipsis: false,
                }
            }
            CallPlan::Len => {
                let arg = if self.rng.gen_bool(0.3) {
                    self.expr(&Type::Basic(BasicType::String))
                } else {
                    let elem = self.random_basic();
                    self.expr(&Type::slice(elem))
                };
                Expr::Call {
                    func: Box::new(Expr::Ident("len".into())),
                    type_args: vec![],
                    args: vec![arg],
                    ellipsis: false,
                }
            }
            CallPlan::Copy => {
                let elem = self.random_basic();
                let st = Type::slice(elem);
                let dst = self.expr(&st);
                let src = self.expr(&st);
                Expr::Call {
                    func: Box::new(Expr::Ident("copy".into())),
                    type_args: vec![],
                    args: vec![dst, src],
                    ellipsis: false,
                }
            }
            CallPlan::MinMax => {
                let name = if self.rng.gen_bool(0.5) { "min" } else { "max" };
                let n = 2 + self.rng.gen_range(0..2);
                let args = (0..n).map(|_| self.expr(t)).collect();
                Expr::Call {
                    func: Box::new(Expr::Ident(name.into())),
                    type_args: vec![],
                    args,
                    ellipsis: false,
                }
            }
            CallPlan::Append => {
                let elem = match t {
                    Type::Slice(e) => e.as_ref().clone(),
                    _ => unreachable!("append plan for non-slice target"),
                };
                let mut args = vec![self.expr(t)];
                let n = 1 + self.rng.gen_range(0..2);
                for _ in 0..n {
                    args.push(self.expr(&elem));
                }
                Expr::Call {
                    func: Box::new(Expr::Ident("append".into())),
                    type_args: vec![],
                    args,
                    ellipsis: false,
                }
            }
            CallPlan::SliceData => {
                let elem = match t {
                    Type::Pointer(e) => e.as_ref().clone(),
                    _ => unreachable!("SliceData plan for non-pointer target"),
                };
                let arg = self.expr(&Type::slice(elem));
                Expr::Call {
                    func: Box::new(Expr::Ident("unsafe.SliceData".into())),
                    type_args: vec![],
                    args: vec![arg],
                    ellipsis: false,
                }
            }
        }
    }

    /// Call a function variable, materializing each declared argument; a
    /// variadic final parameter receives a slice expression forwarded with
    /// `...`.
    pub(crate) fn build_scoped_call(&mut self, v: &Variable) -> Expr {
        let ft = match &v.typ {
            Type::Func(ft) => ft.clone(),
            _ => unreachable!("scoped call on non-function variable"),
        };
        let mut args = Vec::new();
        let mut ellipsis = false;
        for (i, a) in ft.args.iter().enumerate() {
            args.push(self.expr(a));
            if ft.variadic && i + 1 == ft.args.len() {
                ellipsis = true;
            }
        }
        Expr::Call {
            func: Box::new(Expr::Ident(v.name.clone())),
            type_args: vec![],
            args,
            ellipsis,
        }
    }

    // ---- indexing ----

    fn index_candidates(&self, t: &Type) -> Vec<Variable> {
        self.scope
            .iter()
            .filter(|v| match &v.typ {
                Type::Slice(e) => e.as_ref() == t,
                Type::Array { elem, .. } => elem.as_ref() == t,
                Type::Map { value, .. } => value.as_ref() == t,
                Type::Basic(BasicType::String) => t == &Type::Basic(BasicType::Byte),
                _ => false,
            })
            .cloned()
            .collect()
    }

    fn index(&mut self, t: &Type) -> Expr {
        let candidates = self.index_candidates(t);
        let v = candidates[self.rng.gen_range(0..candidates.len())].clone();
        let index = match &v.typ {
            Type::Array { len, .. } => Expr::IntLit(self.rng.gen_range(0..*len as u64)),
            Type::Map { key, .. } => {
                let key = key.as_ref().clone();
                self.expr(&key)
            }
            _ => {
                // slice or string: a constant index must not be negative
                let idx = self.expr(&Type::Basic(BasicType::Int));
                if idx.is_constant() {
                    Expr::IntLit(self.rng.gen_range(0..4))
                } else {
                    idx
                }
            }
        };
        Expr::Index {
            expr: Box::new(Expr::Ident(v.name)),
            index: Box::new(index),
        }
    }

    // ---- composite literals ----

    pub(crate) fn composite_lit(&mut self, t: &Type) -> Expr {
        let elems = match t {
            Type::Slice(e) => {
                let n = self.rng.gen_range(0..5);
                let elem = e.as_ref().clone();
                (0..n)
                    .map(|_| CompositeElem {
                        key: None,
                        value: self.expr(&elem),
                    })
                    .collect()
            }
            Type::Array { len, elem } => {
                let n = self.rng.gen_range(0..=(*len).min(4));
                let elem = elem.as_ref().clone();
                (0..n)
                    .map(|_| CompositeElem {
                        key: None,
                        value: self.expr(&elem),
                    })
                    .collect()
            }
            Type::Map { key, value } => {
                let n = self.rng.gen_range(0..3);
                let (kt, vt) = (key.as_ref().clone(), value.as_ref().clone());
                let mut elems: Vec<CompositeElem> = Vec::new();
                for _ in 0..n {
                    let k = self.expr(&kt);
                    // duplicate constant keys are a compile error
                    let dup = k.is_constant()
                        && elems
                            .iter()
                            .any(|e| e.key.as_ref().is_some_and(|p| p == &k));
                    if dup {
                        continue;
                    }
                    let v = self.expr(&vt);
                    elems.push(CompositeElem {
                        key: Some(k),
                        value: v,
                    });
                }
                elems
            }
            Type::Struct(st) => {
                let fields = st.fields.clone();
                let mut elems = Vec::new();
                for f in &fields {
                    if self.rng.gen_bool(0.8) {
                        elems.push(CompositeElem {
                            key: Some(Expr::Ident(f.name.clone())),
                            value: self.expr(&f.typ),
                        });
                    }
                }
                elems
            }
            _ => unreachable!("composite literal for non-composite type"),
        };
        Expr::CompositeLit {
            typ: t.clone(),
            elems,
        }
    }

    // ---- conversions ----

    /// Compatible conversion source types that are actually present in
    /// scope. Sources are always variables, never literals, so constant
    /// conversions cannot be emitted.
    fn conversion_sources(&self, t: &Type) -> Vec<Type> {
        let mut sources = Vec::new();
        match t {
            Type::Basic(b) if b.is_integer() || b.is_float() => {
                for cand in self.catalog.base_types() {
                    if let Type::Basic(cb) = cand {
                        if cb.is_integer() || cb.is_float() {
                            sources.push(cand.clone());
                        }
                    }
                }
            }
            Type::Basic(BasicType::String) => {
                sources.push(Type::Basic(BasicType::Rune));
                sources.push(Type::slice(Type::Basic(BasicType::Byte)));
                sources.push(Type::slice(Type::Basic(BasicType::Rune)));
            }
            Type::Slice(e) => match e.as_ref() {
                Type::Basic(BasicType::Byte) | Type::Basic(BasicType::Rune) => {
                    sources.push(Type::Basic(BasicType::String));
                }
                _ => {}
            },
            _ => {}
        }
        sources.retain(|s| self.scope.has(s));
        sources
    }

    fn conversion(&mut self, t: &Type) -> Expr {
        let sources = self.conversion_sources(t);
        let src = sources[self.rng.gen_range(0..sources.len())].clone();
        let v = match self.scope.random_var(&mut self.rng, &src) {
            Some(v) => v,
            None => unreachable!("conversion source vanished from scope"),
        };
        Expr::Conversion {
            typ: t.clone(),
            expr: Box::new(Expr::Ident(v.name)),
        }
    }

    // ---- the remaining single-step kinds ----

    fn assert_from_any(&mut self, t: &Type) -> Expr {
        let v = match self
            .scope
            .random_var(&mut self.rng, &Type::Basic(BasicType::Any))
        {
            Some(v) => v,
            None => unreachable!("assert kind offered without an any variable"),
        };
        Expr::TypeAssert {
            expr: Box::new(Expr::Ident(v.name)),
            typ: t.clone(),
        }
    }

    fn deref(&mut self, t: &Type) -> Expr {
        let v = match self.scope.random_var(&mut self.rng, &Type::pointer(t.clone())) {
            Some(v) => v,
            None => unreachable!("deref kind offered without a pointer variable"),
        };
        Expr::Star(Box::new(Expr::Ident(v.name)))
    }

    fn recv(&mut self, t: &Type) -> Expr {
        let v = match self.scope.random_var(&mut self.rng, &Type::chan(t.clone())) {
            Some(v) => v,
            None => unreachable!("recv kind offered without a channel variable"),
        };
        Expr::Unary {
            op: UnaryOp::Recv,
            expr: Box::new(Expr::Ident(v.name)),
        }
    }
}

fn collect_methods(
    x: &microsmith_ast::ExternalType,
    v: &Variable,
    t: &Type,
    plans: &mut Vec<CallPlan>,
) {
    for m in &x.methods {
        if m.ret.len() == 1 && &m.ret[0] == t {
            plans.push(CallPlan::Method(v.clone(), m.clone()));
        }
    }
}
