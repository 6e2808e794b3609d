//! Program tree handed to the emitter.
//!
//! The generator guarantees every tree it produces is well-typed; the
//! emitter only needs to print it faithfully.

use crate::types::{Constraint, Type};
use serde::{Deserialize, Serialize};

/// Unary operators. Pointer dereference is [`Expr::Star`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `^` (bitwise complement)
    BitNot,
    /// `<-` (channel receive)
    Recv,
    /// `&` (address-of)
    Addr,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Recv => "<-",
            UnaryOp::Addr => "&",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
    LAnd,
    LOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::AndNot => "&^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// One element of a composite literal; `key` is a field name for structs or
/// a key expression for maps, absent for positional slice/array elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeElem {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Identifier; predeclared and imported names carry their qualifier
    /// (`math.Sqrt`).
    Ident(String),
    IntLit(u64),
    FloatLit(f64),
    /// Imaginary literal, printed as `<float>i`.
    ImagLit(f64),
    BoolLit(bool),
    StringLit(String),
    /// Rune literal body, stored pre-escaped (`a`, `\x41`, `é`).
    RuneLit(String),
    Nil,
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Pointer dereference `*p`.
    Star(Box<Expr>),
    Paren(Box<Expr>),
    /// Field or method selection `x.Sel`.
    Selector {
        expr: Box<Expr>,
        sel: String,
    },
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        type_args: Vec<Type>,
        args: Vec<Expr>,
        /// `...` after the final argument (variadic forwarding).
        ellipsis: bool,
    },
    /// `T(x)`
    Conversion {
        typ: Type,
        expr: Box<Expr>,
    },
    /// `x.(T)`
    TypeAssert {
        expr: Box<Expr>,
        typ: Type,
    },
    CompositeLit {
        typ: Type,
        elems: Vec<CompositeElem>,
    },
    FuncLit {
        params: Vec<(String, Type)>,
        ret: Vec<Type>,
        body: Block,
    },
    /// `make(chan T)`
    Make(Type),
    /// `new(T)`
    New(Type),
}

impl Expr {
    /// Is this a constant expression of the target language? The expression
    /// builder uses this to keep folded constants out of positions where
    /// overflow or a zero divisor would be a compile error.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::IntLit(_)
            | Expr::FloatLit(_)
            | Expr::ImagLit(_)
            | Expr::BoolLit(_)
            | Expr::StringLit(_)
            | Expr::RuneLit(_) => true,
            Expr::Paren(e) => e.is_constant(),
            Expr::Unary { op, expr } => match op {
                UnaryOp::Plus | UnaryOp::Neg | UnaryOp::Not | UnaryOp::BitNot => expr.is_constant(),
                UnaryOp::Recv | UnaryOp::Addr => false,
            },
            Expr::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            Expr::Conversion { expr, .. } => expr.is_constant(),
            // intrinsics that fold when their operands do
            Expr::Call { func, args, .. } => match func.as_ref() {
                Expr::Ident(name) => match name.as_str() {
                    "min" | "max" => !args.is_empty() && args.iter().all(Expr::is_constant),
                    "len" => matches!(args.as_slice(), [Expr::StringLit(_)]),
                    "unsafe.Sizeof" | "unsafe.Alignof" => args.iter().all(Expr::is_constant),
                    _ => false,
                },
                _ => false,
            },
            _ => false,
        }
    }
}

/// Block of statements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchTok {
    Break,
    Continue,
    Goto,
}

impl BranchTok {
    pub fn keyword(self) -> &'static str {
        match self {
            BranchTok::Break => "break",
            BranchTok::Continue => "continue",
            BranchTok::Goto => "goto",
        }
    }
}

/// A `var` declaration, usable both as a statement and at top level.
/// `typ` is absent for inferred use-anchors (`var _ = math.Sqrt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
    pub names: Vec<String>,
    pub typ: Option<Type>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub exprs: Vec<Expr>,
    pub body: Vec<Stmt>,
}

/// A receive clause of a `select` statement (`case <-ch:`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectCase {
    pub chan: Expr,
    pub body: Vec<Stmt>,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Assign {
        lhs: Vec<Expr>,
        rhs: Vec<Expr>,
    },
    VarDecl(VarSpec),
    Block(Block),
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: String,
        value: Option<String>,
        expr: Expr,
        body: Block,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    Switch {
        tag: Expr,
        cases: Vec<SwitchCase>,
        default_body: Vec<Stmt>,
    },
    Send {
        chan: Expr,
        value: Expr,
    },
    Select {
        cases: Vec<SelectCase>,
        default_body: Vec<Stmt>,
    },
    Branch {
        tok: BranchTok,
        label: Option<String>,
    },
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
    Defer(Expr),
    Return(Vec<Expr>),
    Expr(Expr),
}

/// Generic type parameter of a function declaration; the constraint is
/// carried whole so callers can instantiate from its alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParamDecl {
    pub name: String,
    pub constraint: Constraint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    pub type_params: Vec<TypeParamDecl>,
    pub ret: Vec<Type>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub path: String,
}

/// Top-level declarations, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Var(VarSpec),
    Constraint(Constraint),
    Func(FuncDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub import_path: String,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
}

/// Root of a generated program; the main package comes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub packages: Vec<Package>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BasicType;

    #[test]
    fn constantness() {
        let c = Expr::Binary {
            op: BinaryOp::Mul,
            left: Box::new(Expr::IntLit(3)),
            right: Box::new(Expr::Paren(Box::new(Expr::IntLit(4)))),
        };
        assert!(c.is_constant());
        let v = Expr::Binary {
            op: BinaryOp::Mul,
            left: Box::new(Expr::IntLit(3)),
            right: Box::new(Expr::Ident("I0".into())),
        };
        assert!(!v.is_constant());
        assert!(!Expr::Index {
            expr: Box::new(Expr::CompositeLit {
                typ: Type::slice(Type::basic(BasicType::Int)),
                elems: vec![CompositeElem {
                    key: None,
                    value: Expr::IntLit(7)
                }],
            }),
            index: Box::new(Expr::IntLit(0)),
        }
        .is_constant());
        assert!(Expr::Conversion {
            typ: Type::basic(BasicType::Int8),
            expr: Box::new(Expr::IntLit(5)),
        }
        .is_constant());
        assert!(!Expr::Unary {
            op: UnaryOp::Addr,
            expr: Box::new(Expr::Ident("I0".into())),
        }
        .is_constant());
    }

    #[test]
    fn intrinsic_calls_fold_with_constant_operands() {
        let call = |name: &str, args: Vec<Expr>| Expr::Call {
            func: Box::new(Expr::Ident(name.into())),
            type_args: vec![],
            args,
            ellipsis: false,
        };
        assert!(call("min", vec![Expr::IntLit(3), Expr::IntLit(9)]).is_constant());
        assert!(!call("min", vec![Expr::IntLit(3), Expr::Ident("I0".into())]).is_constant());
        assert!(call("len", vec![Expr::StringLit("abc".into())]).is_constant());
        assert!(!call("len", vec![Expr::Ident("S0".into())]).is_constant());
        assert!(call("unsafe.Sizeof", vec![Expr::IntLit(0)]).is_constant());
        assert!(!call("append", vec![Expr::IntLit(0)]).is_constant());
    }

    #[test]
    fn op_symbols() {
        assert_eq!(BinaryOp::AndNot.symbol(), "&^");
        assert_eq!(UnaryOp::BitNot.symbol(), "^");
        assert_eq!(BranchTok::Goto.keyword(), "goto");
    }
}
