//! Package builder: drives the catalog, scope, statement and expression
//! builders to produce one package, and assembles the `main` entry point
//! for the main package.

use crate::catalog::Catalog;
use crate::config::{GenConfig, MAX_ARRAY_LEN, MAX_STRUCT_FIELDS, MAX_TYPE_NESTING};
use crate::scope::Scope;
use microsmith_ast::{
    BasicType, Block, Constraint, Decl, Expr, FuncDecl, ImportDecl, Package, Stmt, StructField,
    StructType, Type, TypeParamDecl, TypeParamRef, VarSpec,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One package-generation unit: an owned random source, the scope, and the
/// builder state shared by the expression and statement layers (their
/// `impl` blocks live in `expr.rs` and `stmt.rs`).
pub struct PackageBuilder {
    pub(crate) conf: GenConfig,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) catalog: Catalog,
    pub(crate) scope: Scope,
    pub(crate) pkg_name: String,
    pub(crate) import_path: String,
    pub(crate) constraints: Vec<Constraint>,

    // statement/expression frame state
    pub(crate) expr_depth: usize,
    pub(crate) stmt_depth: usize,
    pub(crate) inloop: bool,
    pub(crate) labels: Vec<String>,
    /// Monotonic per package, so nested function literals never mint
    /// colliding label or parameter names.
    pub(crate) label_count: usize,
    pub(crate) param_count: usize,
    pub(crate) local_func_count: usize,
    /// Type parameters of the function currently being built.
    pub(crate) cur_type_params: Vec<Type>,
}

impl PackageBuilder {
    pub fn new(conf: GenConfig, seed: u64, name: &str, import_path: &str) -> PackageBuilder {
        let catalog = Catalog::new();
        let mut scope = Scope::new();
        for v in catalog.builtins() {
            scope.add_variable(v.name.clone(), v.typ.clone());
        }
        for v in catalog.std_functions() {
            scope.add_variable(v.name.clone(), v.typ.clone());
        }
        PackageBuilder {
            conf,
            rng: ChaCha8Rng::seed_from_u64(seed),
            catalog,
            scope,
            pkg_name: name.to_string(),
            import_path: import_path.to_string(),
            constraints: Vec::new(),
            expr_depth: 0,
            stmt_depth: 0,
            inloop: false,
            labels: Vec::new(),
            label_count: 0,
            param_count: 0,
            local_func_count: 0,
            cur_type_params: Vec::new(),
        }
    }

    /// Build the whole package. For the main package (`is_main`), a `main`
    /// function is appended that calls every top-level function of this
    /// package and of `aux`, instantiating generic functions from their
    /// constraints.
    pub fn build_package(&mut self, is_main: bool, aux: Option<&Package>) -> Package {
        log::debug!("building package {}", self.pkg_name);

        let mut imports: Vec<ImportDecl> = self
            .catalog
            .imports()
            .iter()
            .map(|s| ImportDecl {
                path: s.path.clone(),
            })
            .collect();
        let mut decls: Vec<Decl> = self
            .catalog
            .imports()
            .iter()
            .map(|s| {
                Decl::Var(VarSpec {
                    names: vec!["_".into()],
                    typ: None,
                    values: vec![s.anchor.clone()],
                })
            })
            .collect();

        if is_main {
            if let Some(a) = aux {
                imports.push(ImportDecl {
                    path: a.import_path.clone(),
                });
                decls.push(Decl::Var(VarSpec {
                    names: vec!["_".into()],
                    typ: None,
                    values: vec![Expr::Ident(format!("{}.V1", a.name))],
                }));
            }
        }

        if self.conf.type_params {
            self.synth_constraints();
            for c in &self.constraints {
                decls.push(Decl::Constraint(c.clone()));
            }
        }

        let int = Type::basic(BasicType::Int);
        self.scope.add_variable("i", int.clone());
        decls.push(Decl::Var(VarSpec {
            names: vec!["i".into()],
            typ: Some(int),
            values: vec![],
        }));

        for k in 1..=6u32 {
            let t = self.top_var_type();
            let value = self.expr(&t);
            let name = format!("V{}", k);
            self.scope.add_variable(name.clone(), t.clone());
            decls.push(Decl::Var(VarSpec {
                names: vec![name],
                typ: Some(t),
                values: vec![value],
            }));
        }

        let n_funcs = 4 + self.rng.gen_range(0..5);
        let mut funcs = Vec::new();
        for idx in 0..n_funcs {
            let f = self.top_func(idx);
            decls.push(Decl::Func(f.clone()));
            funcs.push(f);
        }

        if is_main {
            let main_fn = self.main_func(&funcs, aux);
            decls.push(Decl::Func(main_fn));
        }

        Package {
            name: self.pkg_name.clone(),
            import_path: self.import_path.clone(),
            imports,
            decls,
        }
    }

    /// One top-level function `F<idx>`: optional type parameters with
    /// addressable zero-value witnesses, a generated body, a closing return.
    fn top_func(&mut self, idx: usize) -> FuncDecl {
        let name = format!("F{}", idx);
        let mut type_params = Vec::new();
        if self.conf.type_params && !self.constraints.is_empty() {
            let n = 1 + self.rng.gen_range(0..8);
            for k in 0..n {
                let ci = self.rng.gen_range(0..self.constraints.len());
                type_params.push(TypeParamDecl {
                    name: format!("G{}", k),
                    constraint: self.constraints[ci].clone(),
                });
            }
        }
        self.cur_type_params = type_params
            .iter()
            .enumerate()
            .map(|(k, tp)| {
                Type::TypeParam(TypeParamRef {
                    index: k,
                    constraint: tp.constraint.clone(),
                })
            })
            .collect();

        let n_ret = self.rng.gen_range(0..6);
        let ret: Vec<Type> = (0..n_ret).map(|_| self.random_type()).collect();

        let witnesses = self.cur_type_params.clone();
        for (k, t) in witnesses.iter().enumerate() {
            self.scope.add_variable(format!("g{}", k), t.clone());
        }

        let mut body = self.block();

        for (k, t) in witnesses.iter().enumerate().rev() {
            body.stmts.insert(
                0,
                Stmt::VarDecl(VarSpec {
                    names: vec![format!("g{}", k)],
                    typ: Some(t.clone()),
                    values: vec![],
                }),
            );
        }
        if !witnesses.is_empty() {
            body.stmts.push(Stmt::Assign {
                lhs: witnesses.iter().map(|_| Expr::Ident("_".into())).collect(),
                rhs: (0..witnesses.len())
                    .map(|k| Expr::Ident(format!("g{}", k)))
                    .collect(),
            });
        }
        if !ret.is_empty() {
            let values = ret.iter().cloned().collect::<Vec<_>>();
            let values = values.iter().map(|t| self.expr(t)).collect();
            body.stmts.push(Stmt::Return(values));
        }

        for k in (0..witnesses.len()).rev() {
            self.scope.delete_by_name(&format!("g{}", k));
        }
        self.cur_type_params.clear();
        debug_assert!(self.labels.is_empty(), "labels must not outlive a function");

        FuncDecl {
            name,
            type_params,
            ret,
            body,
        }
    }

    /// The `main` entry point: one call statement per top-level function,
    /// auxiliary calls qualified by their package name.
    fn main_func(&mut self, own: &[FuncDecl], aux: Option<&Package>) -> FuncDecl {
        let mut stmts = Vec::new();
        for f in own {
            let call = self.instantiated_call(f, None);
            stmts.push(Stmt::Expr(call));
        }
        if let Some(a) = aux {
            for d in &a.decls {
                if let Decl::Func(f) = d {
                    let call = self.instantiated_call(f, Some(&a.name));
                    stmts.push(Stmt::Expr(call));
                }
            }
        }
        FuncDecl {
            name: "main".into(),
            type_params: vec![],
            ret: vec![],
            body: Block { stmts },
        }
    }

    /// A call to a top-level function, supplying exactly one type argument
    /// per type parameter, each drawn from that parameter's constraint
    /// (tilde markers stripped).
    fn instantiated_call(&mut self, f: &FuncDecl, qualifier: Option<&str>) -> Expr {
        let name = match qualifier {
            Some(q) => format!("{}.{}", q, f.name),
            None => f.name.clone(),
        };
        let type_args = f
            .type_params
            .iter()
            .map(|tp| {
                let i = self.rng.gen_range(0..tp.constraint.elems.len());
                tp.constraint.elems[i].typ.clone()
            })
            .collect();
        Expr::Call {
            func: Box::new(Expr::Ident(name)),
            type_args,
            args: vec![],
            ellipsis: false,
        }
    }

    // ---- random type composition ----

    pub(crate) fn random_type(&mut self) -> Type {
        self.random_type_depth(MAX_TYPE_NESTING)
    }

    pub(crate) fn random_type_depth(&mut self, budget: usize) -> Type {
        if !self.cur_type_params.is_empty() && self.rng.gen_bool(0.15) {
            let i = self.rng.gen_range(0..self.cur_type_params.len());
            return self.cur_type_params[i].clone();
        }
        if budget == 0 {
            if self.rng.gen_bool(0.08) {
                return self.random_external();
            }
            return self.random_basic();
        }
        match self.rng.gen_range(0..100u32) {
            0..=44 => self.random_basic(),
            45..=52 => self.random_external(),
            53..=61 => Type::pointer(self.random_type_depth(budget - 1)),
            62..=71 => Type::slice(self.random_type_depth(budget - 1)),
            72..=77 => Type::Array {
                len: 1 + self.rng.gen_range(0..MAX_ARRAY_LEN),
                elem: Box::new(self.random_type_depth(budget - 1)),
            },
            78..=83 => {
                let key = self.random_comparable_type(budget - 1);
                let value = self.random_type_depth(budget - 1);
                Type::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            84..=89 => Type::chan(self.random_type_depth(budget - 1)),
            _ => Type::Struct(self.random_struct_type(budget - 1)),
        }
    }

    pub(crate) fn random_basic(&mut self) -> Type {
        let base = self.catalog.base_types();
        let i = self.rng.gen_range(0..base.len());
        base[i].clone()
    }

    pub(crate) fn random_basic_filtered<F>(&mut self, pred: F) -> Type
    where
        F: Fn(BasicType) -> bool,
    {
        let candidates: Vec<Type> = self
            .catalog
            .base_types()
            .iter()
            .filter(|t| match t {
                Type::Basic(b) => pred(*b),
                _ => false,
            })
            .cloned()
            .collect();
        let i = self.rng.gen_range(0..candidates.len());
        candidates[i].clone()
    }

    fn random_external(&mut self) -> Type {
        let ext = self.catalog.std_types();
        let i = self.rng.gen_range(0..ext.len());
        ext[i].clone()
    }

    /// A concrete comparable type: legal as a map key, a switch scrutinee,
    /// or a `==` operand. The empty interface is excluded so comparisons
    /// cannot panic on incomparable dynamic values.
    pub(crate) fn random_comparable_type(&mut self, budget: usize) -> Type {
        if budget == 0 {
            return self.random_basic_filtered(|b| b != BasicType::Any);
        }
        match self.rng.gen_range(0..10u32) {
            0..=5 => self.random_basic_filtered(|b| b != BasicType::Any),
            6 => Type::pointer(self.random_interface_free_type(budget - 1)),
            7 => Type::chan(self.random_interface_free_type(budget - 1)),
            8 => Type::Array {
                len: 1 + self.rng.gen_range(0..MAX_ARRAY_LEN),
                elem: Box::new(self.random_comparable_type(budget - 1)),
            },
            _ => {
                let n = 1 + self.rng.gen_range(0..3);
                let mut fields = Vec::new();
                for idx in 0..n {
                    let typ = self.random_comparable_type(budget - 1);
                    fields.push(StructField {
                        name: field_name(&typ, idx),
                        typ,
                    });
                }
                Type::Struct(StructType { fields })
            }
        }
    }

    /// Like `random_type_depth`, with empty-interface mentions swapped for
    /// a plain basic type. Keeps comparable composites interface-free.
    fn random_interface_free_type(&mut self, budget: usize) -> Type {
        let t = self.random_type_depth(budget);
        if t.contains_any() {
            return self.random_basic_filtered(|b| b != BasicType::Any);
        }
        t
    }

    pub(crate) fn random_struct_type(&mut self, budget: usize) -> StructType {
        let n = 1 + self.rng.gen_range(0..MAX_STRUCT_FIELDS);
        let mut fields = Vec::new();
        for idx in 0..n {
            let typ = self.random_type_depth(budget);
            fields.push(StructField {
                name: field_name(&typ, idx),
                typ,
            });
        }
        StructType { fields }
    }

    /// Top-level variables keep the shapes `T`, `*T`, `[]T` and `[]*T`.
    fn top_var_type(&mut self) -> Type {
        let base = self.random_type();
        match self.rng.gen_range(0..4u32) {
            0 => base,
            1 => Type::pointer(base),
            2 => Type::slice(base),
            _ => Type::slice(Type::pointer(base)),
        }
    }
}

/// Struct field names are the (uppercased) type prefix plus the field's
/// position, so they are unique within the struct and exported.
fn field_name(typ: &Type, idx: usize) -> String {
    format!("{}{}", typ.ident_prefix().to_uppercase(), idx)
}
