// microsmith-ast - Type algebra and program tree for the microsmith generator
// The generator builds these trees; the emitter prints them.

pub mod ast;
pub mod types;

pub use ast::{
    BinaryOp, Block, BranchTok, CompositeElem, Decl, Expr, FuncDecl, ImportDecl, Package, Program,
    SelectCase, Stmt, SwitchCase, TypeParamDecl, UnaryOp, VarSpec,
};
pub use types::{
    BasicType, Constraint, ConstraintElem, ExternalCtor, ExternalType, FuncType, Method,
    StructField, StructType, Type, TypeParamRef, Variable,
};
