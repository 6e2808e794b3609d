//! Structural properties that must hold for every generated program:
//! package layout, label and import hygiene, map-key comparability,
//! generic instantiation, and statement-kind coverage.

use microsmith_ast::{
    Block, Constraint, Decl, Expr, FuncDecl, Package, Program, Stmt, Type, VarSpec,
};
use microsmith_gen::{generate, GenConfig};

// ---- tree walkers ----

#[derive(Default)]
struct Collected<'a> {
    stmts: Vec<&'a Stmt>,
    exprs: Vec<&'a Expr>,
    types: Vec<&'a Type>,
}

fn collect_package<'a>(pkg: &'a Package, out: &mut Collected<'a>) {
    for d in &pkg.decls {
        match d {
            Decl::Var(spec) => collect_var_spec(spec, out),
            Decl::Constraint(c) => collect_constraint(c, out),
            Decl::Func(f) => collect_func(f, out),
        }
    }
}

fn collect_var_spec<'a>(spec: &'a VarSpec, out: &mut Collected<'a>) {
    if let Some(t) = &spec.typ {
        collect_type(t, out);
    }
    for v in &spec.values {
        collect_expr(v, out);
    }
}

fn collect_constraint<'a>(c: &'a Constraint, out: &mut Collected<'a>) {
    for e in &c.elems {
        collect_type(&e.typ, out);
    }
}

fn collect_func<'a>(f: &'a FuncDecl, out: &mut Collected<'a>) {
    for t in &f.ret {
        collect_type(t, out);
    }
    for tp in &f.type_params {
        collect_constraint(&tp.constraint, out);
    }
    collect_block(&f.body, out);
}

fn collect_block<'a>(b: &'a Block, out: &mut Collected<'a>) {
    for s in &b.stmts {
        collect_stmt(s, out);
    }
}

fn collect_stmt<'a>(s: &'a Stmt, out: &mut Collected<'a>) {
    out.stmts.push(s);
    match s {
        Stmt::Assign { lhs, rhs } => {
            for e in lhs.iter().chain(rhs) {
                collect_expr(e, out);
            }
        }
        Stmt::VarDecl(spec) => collect_var_spec(spec, out),
        Stmt::Block(b) => collect_block(b, out),
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(i) = init {
                collect_stmt(i, out);
            }
            if let Some(c) = cond {
                collect_expr(c, out);
            }
            if let Some(p) = post {
                collect_stmt(p, out);
            }
            collect_block(body, out);
        }
        Stmt::Range { expr, body, .. } => {
            collect_expr(expr, out);
            collect_block(body, out);
        }
        Stmt::If {
            cond,
            then_block,
            else_block,
        } => {
            collect_expr(cond, out);
            collect_block(then_block, out);
            if let Some(e) = else_block {
                collect_block(e, out);
            }
        }
        Stmt::Switch {
            tag,
            cases,
            default_body,
        } => {
            collect_expr(tag, out);
            for c in cases {
                for e in &c.exprs {
                    collect_expr(e, out);
                }
                for s in &c.body {
                    collect_stmt(s, out);
                }
            }
            for s in default_body {
                collect_stmt(s, out);
            }
        }
        Stmt::Send { chan, value } => {
            collect_expr(chan, out);
            collect_expr(value, out);
        }
        Stmt::Select {
            cases,
            default_body,
        } => {
            for c in cases {
                collect_expr(&c.chan, out);
                for s in &c.body {
                    collect_stmt(s, out);
                }
            }
            for s in default_body {
                collect_stmt(s, out);
            }
        }
        Stmt::Branch { .. } => {}
        Stmt::Labeled { stmt, .. } => collect_stmt(stmt, out),
        Stmt::Defer(e) => collect_expr(e, out),
        Stmt::Return(values) => {
            for e in values {
                collect_expr(e, out);
            }
        }
        Stmt::Expr(e) => collect_expr(e, out),
    }
}

fn collect_expr<'a>(e: &'a Expr, out: &mut Collected<'a>) {
    out.exprs.push(e);
    match e {
        Expr::Unary { expr, .. } | Expr::Star(expr) | Expr::Paren(expr) => {
            collect_expr(expr, out)
        }
        Expr::Binary { left, right, .. } => {
            collect_expr(left, out);
            collect_expr(right, out);
        }
        Expr::Selector { expr, .. } => collect_expr(expr, out),
        Expr::Index { expr, index } => {
            collect_expr(expr, out);
            collect_expr(index, out);
        }
        Expr::Call {
            func,
            type_args,
            args,
            ..
        } => {
            collect_expr(func, out);
            for t in type_args {
                collect_type(t, out);
            }
            for a in args {
                collect_expr(a, out);
            }
        }
        Expr::Conversion { typ, expr } => {
            collect_type(typ, out);
            collect_expr(expr, out);
        }
        Expr::TypeAssert { expr, typ } => {
            collect_expr(expr, out);
            collect_type(typ, out);
        }
        Expr::CompositeLit { typ, elems } => {
            collect_type(typ, out);
            for el in elems {
                if let Some(k) = &el.key {
                    collect_expr(k, out);
                }
                collect_expr(&el.value, out);
            }
        }
        Expr::FuncLit { params, ret, body } => {
            for (_, t) in params {
                collect_type(t, out);
            }
            for t in ret {
                collect_type(t, out);
            }
            collect_block(body, out);
        }
        Expr::Make(t) | Expr::New(t) => collect_type(t, out),
        _ => {}
    }
}

fn collect_type<'a>(t: &'a Type, out: &mut Collected<'a>) {
    out.types.push(t);
    match t {
        Type::Pointer(e) | Type::Slice(e) | Type::Chan(e) => collect_type(e, out),
        Type::Array { elem, .. } => collect_type(elem, out),
        Type::Map { key, value } => {
            collect_type(key, out);
            collect_type(value, out);
        }
        Type::Struct(st) => {
            for f in &st.fields {
                collect_type(&f.typ, out);
            }
        }
        Type::Func(ft) => {
            for a in ft.args.iter().chain(&ft.ret) {
                collect_type(a, out);
            }
        }
        Type::TypeParam(tp) => {
            for e in &tp.constraint.elems {
                collect_type(&e.typ, out);
            }
        }
        _ => {}
    }
}

fn funcs_of(pkg: &Package) -> Vec<&FuncDecl> {
    pkg.decls
        .iter()
        .filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            _ => None,
        })
        .collect()
}

fn main_func(pkg: &Package) -> &FuncDecl {
    match funcs_of(pkg).into_iter().find(|f| f.name == "main") {
        Some(f) => f,
        None => panic!("main package has no main function"),
    }
}

// ---- properties ----

#[test]
fn single_package_layout() {
    let prog = generate(&GenConfig {
        seed: 1,
        multi_pkg: false,
        type_params: false,
    });
    assert_eq!(prog.packages.len(), 1);
    let pkg = &prog.packages[0];
    assert_eq!(pkg.name, "main");

    let var_names: Vec<&str> = pkg
        .decls
        .iter()
        .filter_map(|d| match d {
            Decl::Var(spec) => spec.names.first().map(String::as_str),
            _ => None,
        })
        .collect();
    assert!(var_names.contains(&"i"));
    for k in 1..=6 {
        let name = format!("V{}", k);
        assert!(var_names.iter().any(|n| **n == *name), "missing {}", name);
    }

    let funcs = funcs_of(pkg);
    let tops: Vec<&&FuncDecl> = funcs.iter().filter(|f| f.name.starts_with('F')).collect();
    assert!((4..=8).contains(&tops.len()), "got {} functions", tops.len());
    for (idx, f) in tops.iter().enumerate() {
        assert_eq!(f.name, format!("F{}", idx));
    }

    // main calls every top-level function
    let m = main_func(pkg);
    for f in &tops {
        let called = m.body.stmts.iter().any(|s| match s {
            Stmt::Expr(Expr::Call { func, .. }) => {
                matches!(func.as_ref(), Expr::Ident(n) if *n == f.name)
            }
            _ => false,
        });
        assert!(called, "main does not call {}", f.name);
    }
}

#[test]
fn every_import_has_a_use_anchor() {
    for seed in [0, 1, 7, 42] {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: true,
            type_params: false,
        });
        for pkg in &prog.packages {
            let anchors = pkg
                .decls
                .iter()
                .filter(|d| matches!(d, Decl::Var(spec) if spec.names == ["_"]))
                .count();
            let std_imports = pkg
                .imports
                .iter()
                .filter(|i| !i.path.starts_with("prog/"))
                .count();
            assert_eq!(anchors, pkg.imports.len());
            assert!(std_imports >= 8);
        }
    }
}

#[test]
fn statement_kinds_all_appear() {
    for seed in 1..=10u64 {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: false,
            type_params: false,
        });
        let mut out = Collected::default();
        collect_package(&prog.packages[0], &mut out);
        let has = |pred: &dyn Fn(&&&Stmt) -> bool| out.stmts.iter().filter(pred).count() > 0;
        assert!(has(&|s| matches!(***s, Stmt::Assign { .. })), "seed {}", seed);
        assert!(has(&|s| matches!(***s, Stmt::Block(_))), "seed {}", seed);
        assert!(has(&|s| matches!(***s, Stmt::For { .. })), "seed {}", seed);
        assert!(has(&|s| matches!(***s, Stmt::If { .. })), "seed {}", seed);
        assert!(has(&|s| matches!(***s, Stmt::Switch { .. })), "seed {}", seed);
        assert!(has(&|s| matches!(***s, Stmt::Send { .. })), "seed {}", seed);
        assert!(has(&|s| matches!(***s, Stmt::Select { .. })), "seed {}", seed);
        assert!(has(&|s| matches!(***s, Stmt::Defer(_))), "seed {}", seed);
    }
}

#[test]
fn labels_are_always_branch_targets() {
    for seed in 0..40u64 {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: false,
            type_params: seed % 2 == 0,
        });
        for pkg in &prog.packages {
            let mut out = Collected::default();
            collect_package(pkg, &mut out);
            let declared: Vec<&str> = out
                .stmts
                .iter()
                .filter_map(|s| match s {
                    Stmt::Labeled { label, .. } => Some(label.as_str()),
                    _ => None,
                })
                .collect();
            let targets: Vec<&str> = out
                .stmts
                .iter()
                .filter_map(|s| match s {
                    Stmt::Branch {
                        label: Some(l), ..
                    } => Some(l.as_str()),
                    _ => None,
                })
                .collect();
            for l in declared {
                assert!(
                    targets.contains(&l),
                    "label {} unused at seed {}",
                    l,
                    seed
                );
            }
        }
    }
}

#[test]
fn map_keys_are_comparable_everywhere() {
    for seed in 0..40u64 {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: seed % 3 == 0,
            type_params: seed % 2 == 1,
        });
        for pkg in &prog.packages {
            let mut out = Collected::default();
            collect_package(pkg, &mut out);
            for t in &out.types {
                if let Type::Map { key, .. } = t {
                    assert!(
                        key.comparable(),
                        "non-comparable map key {} at seed {}",
                        key,
                        seed
                    );
                    assert!(!key.contains_any());
                }
            }
        }
    }
}

#[test]
fn generic_calls_instantiate_from_constraints() {
    let mut saw_tilde = false;
    let mut saw_multi_param = false;
    for seed in 0..20u64 {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: false,
            type_params: true,
        });
        let pkg = &prog.packages[0];
        let funcs = funcs_of(pkg);
        let by_name = |n: &str| funcs.iter().find(|f| f.name == n).copied();

        for d in &pkg.decls {
            if let Decl::Constraint(c) = d {
                assert!(!c.elems.is_empty());
                assert!(c.elems.len() <= 8);
                if c.elems.iter().any(|e| e.tilde) {
                    saw_tilde = true;
                }
                // alternatives are distinct modulo alias spelling
                for (i, a) in c.elems.iter().enumerate() {
                    for b in &c.elems[i + 1..] {
                        assert!(!a.typ.alias_eq(&b.typ));
                    }
                }
            }
        }

        for f in &funcs {
            if f.type_params.len() >= 2 {
                saw_multi_param = true;
            }
            if f.name == "main" {
                continue;
            }
            // witnesses: one `var g<k> G<k>` per type parameter, plus a use mark
            for (k, _) in f.type_params.iter().enumerate() {
                let witness = format!("g{}", k);
                let found = f.body.stmts.iter().any(|s| {
                    matches!(s, Stmt::VarDecl(spec) if spec.names == [witness.clone()])
                });
                assert!(found, "missing witness {} in {} at seed {}", witness, f.name, seed);
            }
        }

        let m = main_func(pkg);
        for s in &m.body.stmts {
            if let Stmt::Expr(Expr::Call {
                func, type_args, ..
            }) = s
            {
                let name = match func.as_ref() {
                    Expr::Ident(n) => n.clone(),
                    _ => continue,
                };
                let decl = match by_name(&name) {
                    Some(d) => d,
                    None => continue,
                };
                assert_eq!(
                    type_args.len(),
                    decl.type_params.len(),
                    "arity mismatch calling {} at seed {}",
                    name,
                    seed
                );
                for (arg, tp) in type_args.iter().zip(&decl.type_params) {
                    assert!(
                        tp.constraint.elems.iter().any(|e| &e.typ == arg),
                        "type argument {} not in constraint {} at seed {}",
                        arg,
                        tp.constraint.name,
                        seed
                    );
                }
            }
        }
    }
    assert!(saw_tilde, "no tilde alternative in 20 programs");
    assert!(saw_multi_param, "no multi-parameter generic in 20 programs");
}

#[test]
fn multi_package_main_calls_qualified() {
    let prog = generate(&GenConfig {
        seed: 7,
        multi_pkg: true,
        type_params: false,
    });
    assert_eq!(prog.packages.len(), 2);
    let main_pkg = &prog.packages[0];
    let aux = &prog.packages[1];
    assert_eq!(aux.name, "a");
    assert_eq!(aux.import_path, "prog/a");
    assert!(main_pkg.imports.iter().any(|i| i.path == "prog/a"));
    assert!(funcs_of(aux).iter().all(|f| f.name != "main"));

    let m = main_func(main_pkg);
    let qualified_calls = m
        .body
        .stmts
        .iter()
        .filter(|s| match s {
            Stmt::Expr(Expr::Call { func, .. }) => {
                matches!(func.as_ref(), Expr::Ident(n) if n.starts_with("a.F"))
            }
            _ => false,
        })
        .count();
    assert_eq!(qualified_calls, funcs_of(aux).len());
}

#[test]
fn top_level_initializers_are_not_all_literals() {
    for seed in 0..6u64 {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: false,
            type_params: false,
        });
        let pkg = &prog.packages[0];
        let inits: Vec<&Expr> = pkg
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Var(spec) if spec.names.first().is_some_and(|n| n.starts_with('V')) => {
                    spec.values.first()
                }
                _ => None,
            })
            .collect();
        assert_eq!(inits.len(), 6);
        let bare_literal = |e: &Expr| {
            matches!(
                e,
                Expr::IntLit(_)
                    | Expr::FloatLit(_)
                    | Expr::BoolLit(_)
                    | Expr::StringLit(_)
                    | Expr::RuneLit(_)
                    | Expr::Nil
            )
        };
        assert!(
            inits.iter().any(|e| !bare_literal(e)),
            "all V initializers are bare literals at seed {}",
            seed
        );
    }
}

#[test]
fn top_level_var_shapes_are_restricted() {
    for seed in 0..20u64 {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: false,
            type_params: false,
        });
        let pkg = &prog.packages[0];
        for d in &pkg.decls {
            if let Decl::Var(spec) = d {
                if !spec.names.first().is_some_and(|n| n.starts_with('V')) {
                    continue;
                }
                let t = match &spec.typ {
                    Some(t) => t,
                    None => panic!("V declaration without a type"),
                };
                assert!(!matches!(t, Type::Func(_) | Type::TypeParam(_)));
                assert!(spec.values.len() == 1, "V must carry an initializer");
            }
        }
    }
}

#[test]
fn generation_terminates_over_a_seed_sweep() {
    for seed in 1000..1100u64 {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: false,
            type_params: seed % 2 == 0,
        });
        assert!(!prog.packages.is_empty());
    }
}

fn program_stmt_count(prog: &Program) -> usize {
    let mut out = Collected::default();
    for p in &prog.packages {
        collect_package(p, &mut out);
    }
    out.stmts.len()
}

#[test]
fn programs_have_substance() {
    for seed in [0u64, 1, 42, 123] {
        let prog = generate(&GenConfig {
            seed,
            multi_pkg: false,
            type_params: true,
        });
        assert!(
            program_stmt_count(&prog) > 50,
            "suspiciously small program at seed {}",
            seed
        );
    }
}
