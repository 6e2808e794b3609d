//! The built-in universe generation draws from: basic types, external
//! package types with their method tables, intrinsic functions, and the
//! imported standard-library function set.
//!
//! Built once per generator instance and immutable afterwards, so sharing
//! across parallel instances needs no synchronization.

use microsmith_ast::{
    BasicType, Expr, ExternalCtor, ExternalType, FuncType, Method, Type, Variable,
};

/// An import path paired with the use-anchor expression emitted as
/// `var _ = <anchor>` so the import cannot be reported unused.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub path: String,
    pub anchor: Expr,
}

#[derive(Debug)]
pub struct Catalog {
    base: Vec<Type>,
    externals: Vec<Type>,
    builtins: Vec<Variable>,
    std_funcs: Vec<Variable>,
    imports: Vec<ImportSpec>,
}

impl Catalog {
    pub fn new() -> Catalog {
        let base = vec![
            Type::basic(BasicType::Int),
            Type::basic(BasicType::Int8),
            Type::basic(BasicType::Int16),
            Type::basic(BasicType::Int32),
            Type::basic(BasicType::Int64),
            Type::basic(BasicType::Uint),
            Type::basic(BasicType::Uint8),
            Type::basic(BasicType::Uint16),
            Type::basic(BasicType::Uint32),
            Type::basic(BasicType::Uint64),
            Type::basic(BasicType::Uintptr),
            Type::basic(BasicType::Float32),
            Type::basic(BasicType::Float64),
            Type::basic(BasicType::Complex128),
            Type::basic(BasicType::Bool),
            Type::basic(BasicType::Rune),
            Type::basic(BasicType::Byte),
            Type::basic(BasicType::String),
            Type::basic(BasicType::Any),
        ];

        let externals = vec![Type::External(big_int()), Type::External(simd_vec())];

        let mut std_funcs = Vec::new();
        math_funcs(&mut std_funcs);
        strings_funcs(&mut std_funcs);
        fmt_funcs(&mut std_funcs);
        reflect_funcs(&mut std_funcs);
        unsafe_funcs(&mut std_funcs);
        std_funcs.extend(make_atomic_funcs());

        Catalog {
            base,
            externals,
            builtins: builtins(),
            std_funcs,
            imports: imports(),
        }
    }

    pub fn base_types(&self) -> &[Type] {
        &self.base
    }

    pub fn std_types(&self) -> &[Type] {
        &self.externals
    }

    pub fn builtins(&self) -> &[Variable] {
        &self.builtins
    }

    pub fn std_functions(&self) -> &[Variable] {
        &self.std_funcs
    }

    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new()
    }
}

/// A reference to `big.Int` without its method table; nominal equality
/// makes it interchangeable with the full type.
fn big_int_ref() -> Type {
    Type::External(ExternalType {
        pkg: "big".into(),
        name: "Int".into(),
        methods: vec![],
        ctor: Some(ExternalCtor::BigIntLit),
    })
}

fn simd_vec_ref() -> Type {
    Type::External(ExternalType {
        pkg: "simd".into(),
        name: "Uint32x4".into(),
        methods: vec![],
        ctor: Some(ExternalCtor::SimdUint32x4Lit),
    })
}

fn method(name: &str, args: Vec<Type>, ret: Vec<Type>) -> Method {
    Method {
        name: name.into(),
        args,
        ret,
    }
}

/// The big-integer external type. The method table is specified by hand;
/// only methods whose argument and return types are representable in the
/// type algebra are listed.
fn big_int() -> ExternalType {
    let int = Type::basic(BasicType::Int);
    let ptr = Type::pointer(big_int_ref());
    ExternalType {
        pkg: "big".into(),
        name: "Int".into(),
        methods: vec![
            method("Int64", vec![], vec![Type::basic(BasicType::Int64)]),
            method("IsInt64", vec![], vec![Type::basic(BasicType::Bool)]),
            method("Uint64", vec![], vec![Type::basic(BasicType::Uint64)]),
            method("IsUint64", vec![], vec![Type::basic(BasicType::Bool)]),
            method("Sign", vec![], vec![int.clone()]),
            method("BitLen", vec![], vec![int.clone()]),
            method(
                "TrailingZeroBits",
                vec![],
                vec![Type::basic(BasicType::Uint)],
            ),
            method("String", vec![], vec![Type::basic(BasicType::String)]),
            method(
                "Bytes",
                vec![],
                vec![Type::slice(Type::basic(BasicType::Byte))],
            ),
            method("Bit", vec![int.clone()], vec![Type::basic(BasicType::Uint)]),
            method("Cmp", vec![ptr.clone()], vec![int.clone()]),
            method("CmpAbs", vec![ptr], vec![int]),
        ],
        ctor: Some(ExternalCtor::BigIntLit),
    }
}

/// The SIMD vector external type. The hand-written table matches what a
/// reflective derivation over the host package would keep.
fn simd_vec() -> ExternalType {
    let v = simd_vec_ref();
    let bin = |name: &str| method(name, vec![v.clone()], vec![v.clone()]);
    ExternalType {
        pkg: "simd".into(),
        name: "Uint32x4".into(),
        methods: vec![bin("Add"), bin("Sub"), bin("And"), bin("Or"), bin("Xor")],
        ctor: Some(ExternalCtor::SimdUint32x4Lit),
    }
}

fn func_var(
    pkg: &str,
    name: &str,
    args: Vec<Type>,
    ret: Vec<Type>,
    variadic: bool,
) -> Variable {
    Variable::new(
        format!("{}.{}", pkg, name),
        Type::Func(FuncType {
            pkg: Some(pkg.into()),
            name: name.into(),
            args,
            ret,
            local: false,
            variadic,
        }),
    )
}

/// Intrinsic functions. The shapes are sentinels (empty argument and
/// return lists); the call builder dispatches on them structurally.
fn builtins() -> Vec<Variable> {
    let sentinel = |name: &str, pkg: Option<&str>| {
        Variable::new(
            match pkg {
                Some(p) => format!("{}.{}", p, name),
                None => name.to_string(),
            },
            Type::Func(FuncType {
                pkg: pkg.map(String::from),
                name: name.into(),
                args: vec![],
                ret: vec![],
                local: false,
                variadic: false,
            }),
        )
    };
    vec![
        sentinel("append", None),
        sentinel("copy", None),
        sentinel("len", None),
        sentinel("min", None),
        sentinel("max", None),
        sentinel("SliceData", Some("unsafe")),
    ]
}

fn math_funcs(out: &mut Vec<Variable>) {
    let f64t = Type::basic(BasicType::Float64);
    for name in [
        "Sqrt", "Abs", "Floor", "Ceil", "Sin", "Cos", "Trunc", "Exp", "Log",
    ] {
        out.push(func_var(
            "math",
            name,
            vec![f64t.clone()],
            vec![f64t.clone()],
            false,
        ));
    }
    for name in ["Mod", "Pow", "Hypot", "Max", "Min"] {
        out.push(func_var(
            "math",
            name,
            vec![f64t.clone(), f64t.clone()],
            vec![f64t.clone()],
            false,
        ));
    }
}

fn strings_funcs(out: &mut Vec<Variable>) {
    let s = Type::basic(BasicType::String);
    let b = Type::basic(BasicType::Bool);
    let int = Type::basic(BasicType::Int);
    for name in ["Contains", "HasPrefix", "HasSuffix", "EqualFold"] {
        out.push(func_var(
            "strings",
            name,
            vec![s.clone(), s.clone()],
            vec![b.clone()],
            false,
        ));
    }
    for name in ["Index", "LastIndex", "Count", "Compare"] {
        out.push(func_var(
            "strings",
            name,
            vec![s.clone(), s.clone()],
            vec![int.clone()],
            false,
        ));
    }
    for name in ["ToUpper", "ToLower", "TrimSpace"] {
        out.push(func_var("strings", name, vec![s.clone()], vec![s.clone()], false));
    }
    out.push(func_var(
        "strings",
        "Repeat",
        vec![s.clone(), int.clone()],
        vec![s.clone()],
        false,
    ));
    out.push(func_var(
        "strings",
        "ReplaceAll",
        vec![s.clone(), s.clone(), s.clone()],
        vec![s.clone()],
        false,
    ));
    out.push(func_var(
        "strings",
        "Join",
        vec![Type::slice(s.clone()), s.clone()],
        vec![s.clone()],
        false,
    ));
    out.push(func_var(
        "strings",
        "Split",
        vec![s.clone(), s.clone()],
        vec![Type::slice(s.clone())],
        false,
    ));
    out.push(func_var(
        "strings",
        "Fields",
        vec![s.clone()],
        vec![Type::slice(s)],
        false,
    ));
}

fn fmt_funcs(out: &mut Vec<Variable>) {
    let s = Type::basic(BasicType::String);
    let any_slice = Type::slice(Type::basic(BasicType::Any));
    out.push(func_var("fmt", "Sprint", vec![any_slice.clone()], vec![s.clone()], true));
    out.push(func_var(
        "fmt",
        "Sprintln",
        vec![any_slice.clone()],
        vec![s.clone()],
        true,
    ));
    out.push(func_var(
        "fmt",
        "Sprintf",
        vec![s.clone(), any_slice],
        vec![s],
        true,
    ));
}

fn reflect_funcs(out: &mut Vec<Variable>) {
    let any = Type::basic(BasicType::Any);
    out.push(func_var(
        "reflect",
        "DeepEqual",
        vec![any.clone(), any],
        vec![Type::basic(BasicType::Bool)],
        false,
    ));
}

fn unsafe_funcs(out: &mut Vec<Variable>) {
    let any = Type::basic(BasicType::Any);
    let up = Type::basic(BasicType::Uintptr);
    out.push(func_var("unsafe", "Sizeof", vec![any.clone()], vec![up.clone()], false));
    out.push(func_var("unsafe", "Alignof", vec![any], vec![up], false));
}

/// The `Add`/`Swap`/`Load` family over the three unsigned widths.
pub fn make_atomic_funcs() -> Vec<Variable> {
    let mut out = Vec::new();
    for (suffix, b) in [
        ("Uint32", BasicType::Uint32),
        ("Uint64", BasicType::Uint64),
        ("Uintptr", BasicType::Uintptr),
    ] {
        let t = Type::basic(b);
        let p = Type::pointer(t.clone());
        for op in ["Add", "Swap"] {
            out.push(func_var(
                "atomic",
                &format!("{}{}", op, suffix),
                vec![p.clone(), t.clone()],
                vec![t.clone()],
                false,
            ));
        }
        out.push(func_var(
            "atomic",
            &format!("Load{}", suffix),
            vec![p],
            vec![t],
            false,
        ));
    }
    out
}

fn imports() -> Vec<ImportSpec> {
    let ident = |s: &str| Expr::Ident(s.into());
    vec![
        ImportSpec {
            path: "fmt".into(),
            anchor: ident("fmt.Sprint"),
        },
        ImportSpec {
            path: "math".into(),
            anchor: ident("math.Sqrt"),
        },
        ImportSpec {
            path: "math/big".into(),
            anchor: ident("big.NewInt"),
        },
        ImportSpec {
            path: "reflect".into(),
            anchor: ident("reflect.DeepEqual"),
        },
        ImportSpec {
            path: "simd".into(),
            anchor: ident("simd.LoadUint32x4FromSlice"),
        },
        ImportSpec {
            path: "strings".into(),
            anchor: ident("strings.Contains"),
        },
        ImportSpec {
            path: "sync/atomic".into(),
            anchor: ident("atomic.AddUint32"),
        },
        ImportSpec {
            path: "unsafe".into(),
            anchor: Expr::Call {
                func: Box::new(ident("unsafe.Sizeof")),
                type_args: vec![],
                args: vec![Expr::IntLit(0)],
                ellipsis: false,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_shape() {
        let c = Catalog::new();
        assert_eq!(c.base_types().len(), 19);
        assert_eq!(c.std_types().len(), 2);
        assert_eq!(c.builtins().len(), 6);
        assert_eq!(c.imports().len(), 8);
        // every import has an anchor expression
        for imp in c.imports() {
            assert!(!imp.path.is_empty());
        }
    }

    #[test]
    fn atomic_family_is_complete() {
        let funcs = make_atomic_funcs();
        assert_eq!(funcs.len(), 9);
        assert!(funcs.iter().any(|v| v.name == "atomic.SwapUintptr"));
        assert!(funcs.iter().all(|v| match &v.typ {
            Type::Func(ft) => ft.ret.len() == 1 && !ft.local,
            _ => false,
        }));
    }

    #[test]
    fn external_identity_is_nominal() {
        let full = Type::External(big_int());
        assert_eq!(full, big_int_ref());
        let c = Catalog::new();
        assert!(c.std_types().contains(&big_int_ref()));
    }

    #[test]
    fn big_int_methods_reference_pointer_receiver_args() {
        let bi = big_int();
        let cmp = bi.methods.iter().find(|m| m.name == "Cmp").map(Clone::clone);
        let cmp = match cmp {
            Some(m) => m,
            None => panic!("Cmp missing from big.Int method table"),
        };
        assert_eq!(cmp.args, vec![Type::pointer(big_int_ref())]);
        assert_eq!(cmp.ret, vec![Type::basic(BasicType::Int)]);
    }
}
