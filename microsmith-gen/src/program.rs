//! Program assembly: one or two packages plus the `main` entry point.

use crate::config::GenConfig;
use crate::pkg::PackageBuilder;
use microsmith_ast::Program;

/// Splits the program seed into an independent stream for the auxiliary
/// package, so single- and multi-package runs with the same seed still
/// produce an identical main package body.
fn aux_seed(seed: u64) -> u64 {
    seed.wrapping_add(0x9E37_79B9_7F4A_7C15)
}

pub struct ProgramBuilder {
    conf: GenConfig,
}

impl ProgramBuilder {
    pub fn new(conf: GenConfig) -> ProgramBuilder {
        ProgramBuilder { conf }
    }

    pub fn build(&self) -> Program {
        log::info!(
            "generating program: seed={} multi_pkg={} type_params={}",
            self.conf.seed,
            self.conf.multi_pkg,
            self.conf.type_params
        );
        let aux = if self.conf.multi_pkg {
            let mut b = PackageBuilder::new(self.conf, aux_seed(self.conf.seed), "a", "prog/a");
            Some(b.build_package(false, None))
        } else {
            None
        };
        let mut b = PackageBuilder::new(self.conf, self.conf.seed, "main", "prog");
        let main = b.build_package(true, aux.as_ref());

        let mut packages = vec![main];
        packages.extend(aux);
        Program { packages }
    }
}

/// Generate one program tree from a configuration. Deterministic: the same
/// configuration always yields the same tree.
pub fn generate(conf: &GenConfig) -> Program {
    ProgramBuilder::new(*conf).build()
}
