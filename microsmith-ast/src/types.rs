use serde::{Deserialize, Serialize};
use std::fmt;

/// Predeclared scalar types of the target language.
///
/// `Rune` is an alias of `Int32` and `Byte` an alias of `Uint8`; the two
/// spellings are distinct generation-time types but denote the same
/// target-language type (see [`BasicType::canonical`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicType {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex128,
    Bool,
    Rune,
    Byte,
    String,
    /// The empty interface ("any").
    Any,
}

impl BasicType {
    /// Source-level name.
    pub fn name(self) -> &'static str {
        match self {
            BasicType::Int => "int",
            BasicType::Int8 => "int8",
            BasicType::Int16 => "int16",
            BasicType::Int32 => "int32",
            BasicType::Int64 => "int64",
            BasicType::Uint => "uint",
            BasicType::Uint8 => "uint8",
            BasicType::Uint16 => "uint16",
            BasicType::Uint32 => "uint32",
            BasicType::Uint64 => "uint64",
            BasicType::Uintptr => "uintptr",
            BasicType::Float32 => "float32",
            BasicType::Float64 => "float64",
            BasicType::Complex128 => "complex128",
            BasicType::Bool => "bool",
            BasicType::Rune => "rune",
            BasicType::Byte => "byte",
            BasicType::String => "string",
            BasicType::Any => "any",
        }
    }

    /// Resolve alias spellings to their canonical type.
    pub fn canonical(self) -> BasicType {
        match self {
            BasicType::Rune => BasicType::Int32,
            BasicType::Byte => BasicType::Uint8,
            other => other,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicType::Int
                | BasicType::Int8
                | BasicType::Int16
                | BasicType::Int32
                | BasicType::Int64
                | BasicType::Uint
                | BasicType::Uint8
                | BasicType::Uint16
                | BasicType::Uint32
                | BasicType::Uint64
                | BasicType::Uintptr
                | BasicType::Rune
                | BasicType::Byte
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BasicType::Uint
                | BasicType::Uint8
                | BasicType::Uint16
                | BasicType::Uint32
                | BasicType::Uint64
                | BasicType::Uintptr
                | BasicType::Byte
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, BasicType::Float32 | BasicType::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self == BasicType::Complex128
    }

    /// Types supporting `<` `<=` `>` `>=` (and `min`/`max`).
    pub fn is_ordered(self) -> bool {
        self.is_integer() || self.is_float() || self == BasicType::String
    }
}

/// A synthesized struct field. Names are exported so structurally identical
/// struct types spelled in different packages denote a single type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub typ: Type,
}

/// An anonymous struct type, up to 6 fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructType {
    pub fields: Vec<StructField>,
}

/// A function type. `local` distinguishes locally defined function values
/// (assignable) from predeclared and imported ones (not assignable).
/// A variadic final parameter is modeled as a `Slice` argument and realized
/// at call sites as a slice expression followed by `...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncType {
    pub pkg: Option<String>,
    pub name: String,
    pub args: Vec<Type>,
    pub ret: Vec<Type>,
    pub local: bool,
    pub variadic: bool,
}

/// A method in an external type's method table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub args: Vec<Type>,
    pub ret: Vec<Type>,
}

/// Literal constructor for an external type, described as data so the tree
/// stays comparable and serializable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalCtor {
    /// `*big.NewInt(<int literal>)`
    BigIntLit,
    /// `simd.LoadUint32x4FromSlice(<[]uint32 literal>)`
    SimdUint32x4Lit,
}

/// A named type from an imported package, with a method table and an
/// optional literal constructor.
///
/// Identity is nominal: two `ExternalType` values compare equal when their
/// package and name match, regardless of how much of the method table a
/// given reference carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalType {
    pub pkg: String,
    pub name: String,
    pub methods: Vec<Method>,
    pub ctor: Option<ExternalCtor>,
}

impl PartialEq for ExternalType {
    fn eq(&self, other: &Self) -> bool {
        self.pkg == other.pkg && self.name == other.name
    }
}

impl ExternalType {
    /// Qualified source-level name, e.g. `big.Int`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.pkg, self.name)
    }
}

/// A function-scoped generic type parameter `G<index>` bound by a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParamRef {
    pub index: usize,
    pub constraint: Constraint,
}

/// Closed sum of all types the generator can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Basic(BasicType),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { len: usize, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan(Box<Type>),
    Struct(StructType),
    Func(FuncType),
    TypeParam(TypeParamRef),
    External(ExternalType),
}

impl Type {
    pub fn basic(b: BasicType) -> Type {
        Type::Basic(b)
    }

    pub fn pointer(elem: Type) -> Type {
        Type::Pointer(Box::new(elem))
    }

    pub fn slice(elem: Type) -> Type {
        Type::Slice(Box::new(elem))
    }

    pub fn chan(elem: Type) -> Type {
        Type::Chan(Box::new(elem))
    }

    /// May this type be used where comparability is required (map keys,
    /// `==`, switch cases)? Slices, maps, functions and type parameters are
    /// not comparable; externals are treated as opaque and excluded.
    pub fn comparable(&self) -> bool {
        match self {
            Type::Basic(_) => true,
            Type::Pointer(_) | Type::Chan(_) => true,
            Type::Array { elem, .. } => elem.comparable(),
            Type::Struct(st) => st.fields.iter().all(|f| f.typ.comparable()),
            Type::Slice(_) | Type::Map { .. } | Type::Func(_) => false,
            Type::TypeParam(_) | Type::External(_) => false,
        }
    }

    /// Does the type mention the empty interface anywhere?
    pub fn contains_any(&self) -> bool {
        match self {
            Type::Basic(b) => *b == BasicType::Any,
            Type::Pointer(t) | Type::Slice(t) | Type::Chan(t) => t.contains_any(),
            Type::Array { elem, .. } => elem.contains_any(),
            Type::Map { key, value } => key.contains_any() || value.contains_any(),
            Type::Struct(st) => st.fields.iter().any(|f| f.typ.contains_any()),
            Type::Func(f) => {
                f.args.iter().any(Type::contains_any) || f.ret.iter().any(Type::contains_any)
            }
            Type::TypeParam(_) => false,
            Type::External(_) => false,
        }
    }

    /// Does the type mention a type parameter anywhere?
    pub fn contains_type_param(&self) -> bool {
        match self {
            Type::TypeParam(_) => true,
            Type::Pointer(t) | Type::Slice(t) | Type::Chan(t) => t.contains_type_param(),
            Type::Array { elem, .. } => elem.contains_type_param(),
            Type::Map { key, value } => {
                key.contains_type_param() || value.contains_type_param()
            }
            Type::Struct(st) => st.fields.iter().any(|f| f.typ.contains_type_param()),
            Type::Func(f) => {
                f.args.iter().any(Type::contains_type_param)
                    || f.ret.iter().any(Type::contains_type_param)
            }
            _ => false,
        }
    }

    /// Is the type its own underlying type? Only such types may carry a `~`
    /// in a constraint alternative.
    pub fn is_underlying_self(&self) -> bool {
        !matches!(
            self,
            Type::Basic(BasicType::Any) | Type::External(_) | Type::TypeParam(_)
        )
    }

    /// Structural identity with alias spellings resolved
    /// (`rune`≡`int32`, `byte`≡`uint8`).
    pub fn alias_eq(&self, other: &Type) -> bool {
        self.canon() == other.canon()
    }

    fn canon(&self) -> Type {
        match self {
            Type::Basic(b) => Type::Basic(b.canonical()),
            Type::Pointer(t) => Type::pointer(t.canon()),
            Type::Slice(t) => Type::slice(t.canon()),
            Type::Array { len, elem } => Type::Array {
                len: *len,
                elem: Box::new(elem.canon()),
            },
            Type::Map { key, value } => Type::Map {
                key: Box::new(key.canon()),
                value: Box::new(value.canon()),
            },
            Type::Chan(t) => Type::chan(t.canon()),
            Type::Struct(st) => Type::Struct(StructType {
                fields: st
                    .fields
                    .iter()
                    .map(|f| StructField {
                        name: f.name.clone(),
                        typ: f.typ.canon(),
                    })
                    .collect(),
            }),
            other => other.clone(),
        }
    }

    /// Short identifier prefix used when minting variable names of this
    /// type, e.g. `I` for `int`, `PI` for `*int`, `ST` for structs.
    pub fn ident_prefix(&self) -> String {
        match self {
            Type::Basic(b) => match b {
                BasicType::Int => "I".into(),
                BasicType::Int8 => "I8".into(),
                BasicType::Int16 => "I16".into(),
                BasicType::Int32 => "I32".into(),
                BasicType::Int64 => "I64".into(),
                BasicType::Uint => "U".into(),
                BasicType::Uint8 => "U8".into(),
                BasicType::Uint16 => "U16".into(),
                BasicType::Uint32 => "U32".into(),
                BasicType::Uint64 => "U64".into(),
                BasicType::Uintptr => "UP".into(),
                BasicType::Float32 => "F32".into(),
                BasicType::Float64 => "F64".into(),
                BasicType::Complex128 => "C".into(),
                BasicType::Bool => "B".into(),
                BasicType::Rune => "R".into(),
                BasicType::Byte => "BY".into(),
                BasicType::String => "S".into(),
                BasicType::Any => "AN".into(),
            },
            Type::Pointer(t) => format!("P{}", t.ident_prefix()),
            Type::Slice(t) => format!("SL{}", t.ident_prefix()),
            Type::Array { elem, .. } => format!("AR{}", elem.ident_prefix()),
            Type::Map { .. } => "M".into(),
            Type::Chan(t) => format!("CH{}", t.ident_prefix()),
            Type::Struct(_) => "ST".into(),
            Type::Func(_) => "FNC".into(),
            Type::TypeParam(_) => "g".into(),
            Type::External(x) => {
                let p = x.pkg.chars().next().unwrap_or('X').to_ascii_uppercase();
                let n = x.name.chars().next().unwrap_or('X').to_ascii_uppercase();
                format!("{}{}", p, n)
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(b) => write!(f, "{}", b.name()),
            Type::Pointer(t) => write!(f, "*{}", t),
            Type::Slice(t) => write!(f, "[]{}", t),
            Type::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Chan(t) => write!(f, "chan {}", t),
            Type::Struct(st) => {
                if st.fields.is_empty() {
                    return write!(f, "struct{{}}");
                }
                write!(f, "struct{{ ")?;
                for (i, field) in st.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} {}", field.name, field.typ)?;
                }
                write!(f, " }}")
            }
            Type::Func(ft) => {
                write!(f, "func(")?;
                for (i, a) in ft.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")?;
                match ft.ret.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", ft.ret[0]),
                    _ => {
                        write!(f, " (")?;
                        for (i, r) in ft.ret.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{}", r)?;
                        }
                        write!(f, ")")
                    }
                }
            }
            Type::TypeParam(tp) => write!(f, "G{}", tp.index),
            Type::External(x) => write!(f, "{}", x.qualified()),
        }
    }
}

/// One alternative of a constraint interface; `tilde` marks an
/// underlying-type match (`~int`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintElem {
    pub typ: Type,
    pub tilde: bool,
}

impl fmt::Display for ConstraintElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tilde {
            write!(f, "~{}", self.typ)
        } else {
            write!(f, "{}", self.typ)
        }
    }
}

/// A named union-of-types interface serving as a type-parameter bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub elems: Vec<ConstraintElem>,
}

/// A scoped variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub typ: Type,
}

impl Variable {
    pub fn new(name: impl Into<String>, typ: Type) -> Variable {
        Variable {
            name: name.into(),
            typ,
        }
    }

    /// May this variable appear on the left of an assignment? Predeclared
    /// and imported function names may not.
    pub fn assignable(&self) -> bool {
        match &self.typ {
            Type::Func(ft) => ft.local,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_names_and_families() {
        assert_eq!(BasicType::Uintptr.name(), "uintptr");
        assert!(BasicType::Byte.is_integer());
        assert!(BasicType::Byte.is_unsigned());
        assert!(!BasicType::Complex128.is_ordered());
        assert!(BasicType::String.is_ordered());
        assert_eq!(BasicType::Rune.canonical(), BasicType::Int32);
    }

    #[test]
    fn comparability() {
        let int = Type::basic(BasicType::Int);
        assert!(int.comparable());
        assert!(Type::pointer(Type::slice(int.clone())).comparable());
        assert!(!Type::slice(int.clone()).comparable());
        let st = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "I0".into(),
                    typ: int.clone(),
                },
                StructField {
                    name: "SLI1".into(),
                    typ: Type::slice(int.clone()),
                },
            ],
        });
        assert!(!st.comparable());
        assert!(Type::Array {
            len: 4,
            elem: Box::new(int)
        }
        .comparable());
    }

    #[test]
    fn alias_identity() {
        let rune = Type::basic(BasicType::Rune);
        let int32 = Type::basic(BasicType::Int32);
        assert!(rune.alias_eq(&int32));
        assert_ne!(rune, int32);
        assert!(Type::slice(Type::basic(BasicType::Byte))
            .alias_eq(&Type::slice(Type::basic(BasicType::Uint8))));
    }

    #[test]
    fn display_forms() {
        let t = Type::Map {
            key: Box::new(Type::basic(BasicType::String)),
            value: Box::new(Type::slice(Type::pointer(Type::basic(BasicType::Int)))),
        };
        assert_eq!(t.to_string(), "map[string][]*int");
        let st = Type::Struct(StructType {
            fields: vec![StructField {
                name: "B0".into(),
                typ: Type::basic(BasicType::Bool),
            }],
        });
        assert_eq!(st.to_string(), "struct{ B0 bool }");
        let ft = Type::Func(FuncType {
            pkg: None,
            name: String::new(),
            args: vec![Type::basic(BasicType::Int)],
            ret: vec![Type::basic(BasicType::Bool), Type::basic(BasicType::Int)],
            local: true,
            variadic: false,
        });
        assert_eq!(ft.to_string(), "func(int) (bool, int)");
    }

    #[test]
    fn ident_prefixes() {
        assert_eq!(Type::basic(BasicType::Int).ident_prefix(), "I");
        assert_eq!(Type::pointer(Type::basic(BasicType::Int)).ident_prefix(), "PI");
        assert_eq!(
            Type::slice(Type::basic(BasicType::String)).ident_prefix(),
            "SLS"
        );
    }

    #[test]
    fn tilde_eligibility() {
        assert!(Type::basic(BasicType::Int).is_underlying_self());
        assert!(!Type::basic(BasicType::Any).is_underlying_self());
        let ext = Type::External(ExternalType {
            pkg: "big".into(),
            name: "Int".into(),
            methods: vec![],
            ctor: Some(ExternalCtor::BigIntLit),
        });
        assert!(!ext.is_underlying_self());
    }
}
