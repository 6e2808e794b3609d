// microsmith-gen - Type-directed random program generator
// Produces random but type-correct program trees from a seed and a
// configuration; the emitter crate prints them.

pub mod catalog;
pub mod config;
pub mod constraints;
pub mod expr;
pub mod pkg;
pub mod program;
pub mod scope;
pub mod stmt;

pub use catalog::{Catalog, ImportSpec};
pub use config::GenConfig;
pub use pkg::PackageBuilder;
pub use program::{generate, ProgramBuilder};
pub use scope::Scope;
