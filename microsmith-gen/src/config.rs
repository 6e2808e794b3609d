use serde::{Deserialize, Serialize};

/// Generator configuration. Everything else about a program follows
/// deterministically from these three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Seed for the per-program random source.
    pub seed: u64,
    /// Emit an auxiliary package in addition to the main one.
    pub multi_pkg: bool,
    /// Enable generics: constraint synthesis and generic function
    /// declarations.
    pub type_params: bool,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            seed: 0,
            multi_pkg: false,
            type_params: false,
        }
    }
}

/// Expression recursion bound; at this depth the builder collapses to
/// variable-or-literal.
pub const MAX_EXPR_DEPTH: usize = 5;

/// Statement nesting bound; at this depth only assignments are emitted.
pub const MAX_STMT_DEPTH: usize = 3;

pub const MAX_STRUCT_FIELDS: usize = 6;

pub const MAX_ARRAY_LEN: usize = 8;

/// Composite-type nesting budget for `random_type`.
pub const MAX_TYPE_NESTING: usize = 2;

/// Chance that `var_or_lit` produces a literal rather than a scope lookup.
pub const LITERAL_CHANCE: f64 = 0.25;
