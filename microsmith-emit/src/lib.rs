// microsmith-emit - Source emitter for generated program trees
// Renders a program tree to target-language source text and writes the
// per-package file layout to disk.

pub mod config;
pub mod printer;

pub use config::EmitConfig;
pub use printer::Printer;

use anyhow::Result;
use microsmith_ast::{Package, Program};
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Render one package with the default configuration.
pub fn emit_package(pkg: &Package) -> String {
    emit_package_with(pkg, &EmitConfig::default())
}

pub fn emit_package_with(pkg: &Package, config: &EmitConfig) -> String {
    let mut p = Printer::new(config);
    p.visit_package(pkg);
    p.output()
}

/// Render a whole program as its on-disk file set: relative path plus
/// contents, one entry per package (main package first) and one for the
/// module stanza.
pub fn render_program(prog: &Program) -> Vec<(String, String)> {
    render_program_with(prog, &EmitConfig::default())
}

pub fn render_program_with(prog: &Program, config: &EmitConfig) -> Vec<(String, String)> {
    let mut files = Vec::new();
    files.push((
        "go.mod".to_string(),
        format!("module {}\n\ngo 1.24\n", config.module),
    ));
    for (i, pkg) in prog.packages.iter().enumerate() {
        let path = if i == 0 {
            "main.go".to_string()
        } else {
            format!("{}/{}.go", pkg.name, pkg.name)
        };
        files.push((path, emit_package_with(pkg, config)));
    }
    files
}

/// Write a program's file set under `dir`, creating directories as needed.
pub fn write_program<P: AsRef<Path>>(prog: &Program, dir: P) -> Result<()> {
    write_program_with(prog, dir, &EmitConfig::default())?;
    Ok(())
}

pub fn write_program_with<P: AsRef<Path>>(
    prog: &Program,
    dir: P,
    config: &EmitConfig,
) -> Result<(), EmitError> {
    let dir = dir.as_ref();
    for (rel, contents) in render_program_with(prog, config) {
        let path = dir.join(&rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| EmitError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
        std::fs::write(&path, contents).map_err(|source| EmitError::Write {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}
