//! Synthesis of named constraint interfaces (`type I0 interface { ... }`).
//!
//! Alternatives are deduplicated alias-aware, so a union can never carry
//! both `int32` and `rune` (or `uint8` and `byte`), and a plain and a `~`
//! form of one type can never overlap. Interface-containing types are
//! rejected outright, and `~` is only applied to types that are their own
//! underlying type.

use crate::pkg::PackageBuilder;
use microsmith_ast::{BasicType, Constraint, ConstraintElem, Type};
use rand::Rng;

impl PackageBuilder {
    /// Synthesize `1+Intn(6)` package-level constraints `I0, I1, …`, each a
    /// union of up to 8 distinct alternatives.
    pub(crate) fn synth_constraints(&mut self) {
        let count = 1 + self.rng.gen_range(0..6);
        for k in 0..count {
            let c = self.synth_constraint(format!("I{}", k));
            self.constraints.push(c);
        }
    }

    fn synth_constraint(&mut self, name: String) -> Constraint {
        let target = 1 + self.rng.gen_range(0..8);
        let mut elems: Vec<ConstraintElem> = Vec::new();
        let mut attempts = 0;
        while elems.len() < target && attempts < 24 {
            attempts += 1;
            let typ = self.random_type();
            if !valid_alternative(&typ) {
                continue;
            }
            if elems.iter().any(|e| e.typ.alias_eq(&typ)) {
                continue;
            }
            let tilde = typ.is_underlying_self() && self.rng.gen_bool(1.0 / 3.0);
            elems.push(ConstraintElem { typ, tilde });
        }
        if elems.is_empty() {
            elems.push(ConstraintElem {
                typ: Type::basic(BasicType::Int),
                tilde: false,
            });
        }
        Constraint { name, elems }
    }
}

fn valid_alternative(typ: &Type) -> bool {
    if typ.contains_any() {
        return false;
    }
    !matches!(typ, Type::Func(_) | Type::TypeParam(_) | Type::Basic(BasicType::Any))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;
    use crate::pkg::PackageBuilder;

    fn synth(seed: u64) -> Vec<Constraint> {
        let conf = GenConfig {
            seed,
            multi_pkg: false,
            type_params: true,
        };
        let mut b = PackageBuilder::new(conf, seed, "main", "prog");
        b.synth_constraints();
        b.constraints.clone()
    }

    #[test]
    fn counts_and_names() {
        for seed in 0..20 {
            let cs = synth(seed);
            assert!((1..=6).contains(&cs.len()), "seed {}", seed);
            for (k, c) in cs.iter().enumerate() {
                assert_eq!(c.name, format!("I{}", k));
                assert!((1..=8).contains(&c.elems.len()));
            }
        }
    }

    #[test]
    fn alternatives_are_interface_free_and_distinct() {
        for seed in 0..30 {
            for c in synth(seed) {
                for (i, a) in c.elems.iter().enumerate() {
                    assert!(!a.typ.contains_any(), "seed {}", seed);
                    assert!(valid_alternative(&a.typ));
                    for b in &c.elems[i + 1..] {
                        assert!(
                            !a.typ.alias_eq(&b.typ),
                            "overlapping alternatives {} and {} at seed {}",
                            a.typ,
                            b.typ,
                            seed
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn tilde_only_on_underlying_self_types() {
        for seed in 0..30 {
            for c in synth(seed) {
                for e in &c.elems {
                    if e.tilde {
                        assert!(e.typ.is_underlying_self(), "~{} at seed {}", e.typ, seed);
                    }
                }
            }
        }
    }
}
