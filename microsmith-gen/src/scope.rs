//! Ordered list of in-scope variables with predicate-based random lookup.
//!
//! All high-level lookups are thin predicates over [`Scope::random_by_predicate`],
//! which samples uniformly (in insertion order) from the filtered list.

use microsmith_ast::{BasicType, Method, Type, Variable};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Default)]
pub struct Scope {
    vars: Vec<Variable>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope { vars: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }

    /// Append a fresh variable of type `typ` under a synthesized
    /// collision-free name and return it.
    ///
    /// Function-typed locals are declared through their own path with
    /// caller-supplied names; asking for one here is a programmer error.
    pub fn new_ident(&mut self, typ: &Type) -> Variable {
        if matches!(typ, Type::Func(_)) {
            panic!("scope: new_ident called with a function type");
        }
        let prefix = typ.ident_prefix();
        let mut n = self
            .vars
            .iter()
            .filter(|v| v.name.starts_with(&prefix))
            .count();
        while self.find_by_name(&format!("{}{}", prefix, n)).is_some() {
            n += 1;
        }
        let var = Variable::new(format!("{}{}", prefix, n), typ.clone());
        self.vars.push(var.clone());
        var
    }

    /// Append an existing name. The caller is responsible for uniqueness
    /// (function parameters, package-level names, witnesses).
    pub fn add_variable(&mut self, name: impl Into<String>, typ: Type) {
        self.vars.push(Variable::new(name, typ));
    }

    /// Remove the first entry matching `name`.
    pub fn delete_by_name(&mut self, name: &str) {
        if let Some(pos) = self.vars.iter().position(|v| v.name == name) {
            self.vars.remove(pos);
        }
    }

    pub fn has(&self, typ: &Type) -> bool {
        self.vars.iter().any(|v| &v.typ == typ)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == name)
    }

    /// Collect all variables satisfying `pred` and pick one uniformly.
    pub fn random_by_predicate<F>(&self, rng: &mut ChaCha8Rng, pred: F) -> Option<Variable>
    where
        F: Fn(&Variable) -> bool,
    {
        let matches: Vec<&Variable> = self.vars.iter().filter(|v| pred(v)).collect();
        matches.choose(rng).map(|v| (*v).clone())
    }

    /// A variable that may appear on the left of an assignment: not a
    /// predeclared or imported function, not a channel.
    pub fn random_assignable(&self, rng: &mut ChaCha8Rng) -> Option<Variable> {
        self.random_by_predicate(rng, |v| v.assignable() && !matches!(v.typ, Type::Chan(_)))
    }

    /// A variable addressable with `&`: anything but a predeclared or
    /// imported function name.
    pub fn random_addressable(&self, rng: &mut ChaCha8Rng, typ: &Type) -> Option<Variable> {
        self.random_by_predicate(rng, |v| v.assignable() && &v.typ == typ)
    }

    pub fn random_var(&self, rng: &mut ChaCha8Rng, typ: &Type) -> Option<Variable> {
        self.random_by_predicate(rng, |v| &v.typ == typ)
    }

    /// A variable whose type *yields* `typ` through one access step:
    /// indexing a slice or array, reading a map value, receiving from a
    /// channel, dereferencing a pointer, or indexing a string for bytes.
    pub fn random_var_subtype(&self, rng: &mut ChaCha8Rng, typ: &Type) -> Option<Variable> {
        self.random_by_predicate(rng, |v| match &v.typ {
            Type::Slice(e) | Type::Chan(e) | Type::Pointer(e) => e.as_ref() == typ,
            Type::Array { elem, .. } => elem.as_ref() == typ,
            Type::Map { value, .. } => value.as_ref() == typ,
            Type::Basic(BasicType::String) => typ == &Type::Basic(BasicType::Byte),
            _ => false,
        })
    }

    pub fn random_chan(&self, rng: &mut ChaCha8Rng) -> Option<Variable> {
        self.random_by_predicate(rng, |v| matches!(v.typ, Type::Chan(_)))
    }

    pub fn random_struct(&self, rng: &mut ChaCha8Rng) -> Option<Variable> {
        self.random_by_predicate(rng, |v| matches!(v.typ, Type::Struct(_)))
    }

    /// A map or slice variable (a legal `clear` operand).
    pub fn random_clearable(&self, rng: &mut ChaCha8Rng) -> Option<Variable> {
        self.random_by_predicate(rng, |v| {
            matches!(v.typ, Type::Map { .. } | Type::Slice(_))
        })
    }

    /// Any callable function variable. Builtin sentinels (imported entries
    /// with empty argument and return shapes) are excluded; they are
    /// dispatched structurally. A local `func()` value stays callable.
    pub fn random_func(&self, rng: &mut ChaCha8Rng) -> Option<Variable> {
        self.random_by_predicate(rng, |v| match &v.typ {
            Type::Func(ft) => ft.local || !(ft.args.is_empty() && ft.ret.is_empty()),
            _ => false,
        })
    }

    pub fn random_func_returning(&self, rng: &mut ChaCha8Rng, typ: &Type) -> Option<Variable> {
        self.random_by_predicate(rng, |v| match &v.typ {
            Type::Func(ft) => ft.ret.len() == 1 && &ft.ret[0] == typ,
            _ => false,
        })
    }

    /// A `(receiver, method)` pair where some external-typed variable's
    /// method returns exactly `typ`.
    pub fn random_method_returning(
        &self,
        rng: &mut ChaCha8Rng,
        typ: &Type,
    ) -> Option<(Variable, Method)> {
        let mut candidates: Vec<(Variable, Method)> = Vec::new();
        for v in &self.vars {
            let ext = match &v.typ {
                Type::External(x) => Some(x),
                Type::Pointer(inner) => match inner.as_ref() {
                    Type::External(x) => Some(x),
                    _ => None,
                },
                _ => None,
            };
            if let Some(x) = ext {
                for m in &x.methods {
                    if m.ret.len() == 1 && &m.ret[0] == typ {
                        candidates.push((v.clone(), m.clone()));
                    }
                }
            }
        }
        candidates.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microsmith_ast::{FuncType, StructType};
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1)
    }

    #[test]
    fn new_ident_names_are_unique() {
        let mut s = Scope::new();
        let int = Type::basic(BasicType::Int);
        let a = s.new_ident(&int);
        let b = s.new_ident(&int);
        let c = s.new_ident(&int);
        assert_eq!(a.name, "I0");
        assert_eq!(b.name, "I1");
        assert_eq!(c.name, "I2");
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn new_ident_skips_taken_names() {
        let mut s = Scope::new();
        let int = Type::basic(BasicType::Int);
        s.add_variable("I0", int.clone());
        let v = s.new_ident(&int);
        assert_ne!(v.name, "I0");
        assert!(s.find_by_name(&v.name).is_some());
    }

    #[test]
    #[should_panic(expected = "function type")]
    fn new_ident_refuses_function_types() {
        let mut s = Scope::new();
        s.new_ident(&Type::Func(FuncType {
            pkg: None,
            name: String::new(),
            args: vec![],
            ret: vec![Type::basic(BasicType::Int)],
            local: true,
            variadic: false,
        }));
    }

    #[test]
    fn delete_restores_shape() {
        let mut s = Scope::new();
        let int = Type::basic(BasicType::Int);
        s.add_variable("i", int.clone());
        let before = s.len();
        let v = s.new_ident(&int);
        let w = s.new_ident(&Type::slice(int.clone()));
        s.delete_by_name(&w.name);
        s.delete_by_name(&v.name);
        assert_eq!(s.len(), before);
        assert!(s.find_by_name(&v.name).is_none());
    }

    #[test]
    fn predicate_lookup_misses_return_none() {
        let s = Scope::new();
        assert!(s.random_var(&mut rng(), &Type::basic(BasicType::Int)).is_none());
        assert!(s.random_chan(&mut rng()).is_none());
    }

    #[test]
    fn lookups_filter_by_shape() {
        let mut s = Scope::new();
        let int = Type::basic(BasicType::Int);
        s.add_variable("I0", int.clone());
        s.add_variable("CHI0", Type::chan(int.clone()));
        s.add_variable("SLI0", Type::slice(int.clone()));
        s.add_variable(
            "ST0",
            Type::Struct(StructType { fields: vec![] }),
        );
        s.add_variable(
            "math.Sqrt",
            Type::Func(FuncType {
                pkg: Some("math".into()),
                name: "Sqrt".into(),
                args: vec![Type::basic(BasicType::Float64)],
                ret: vec![Type::basic(BasicType::Float64)],
                local: false,
                variadic: false,
            }),
        );

        let mut r = rng();
        assert_eq!(s.random_chan(&mut r).map(|v| v.name), Some("CHI0".into()));
        assert_eq!(s.random_struct(&mut r).map(|v| v.name), Some("ST0".into()));
        assert_eq!(
            s.random_clearable(&mut r).map(|v| v.name),
            Some("SLI0".into())
        );
        // subtype lookup: both the chan and the slice yield int
        let sub = s.random_var_subtype(&mut r, &int);
        assert!(matches!(
            sub.as_deref_name(),
            Some("CHI0") | Some("SLI0")
        ));
        // imported functions are not assignable
        for _ in 0..20 {
            let a = s.random_assignable(&mut r);
            assert_ne!(a.map(|v| v.name), Some("math.Sqrt".into()));
        }
        assert_eq!(
            s.random_func_returning(&mut r, &Type::basic(BasicType::Float64))
                .map(|v| v.name),
            Some("math.Sqrt".into())
        );
    }

    trait DerefName {
        fn as_deref_name(&self) -> Option<&str>;
    }

    impl DerefName for Option<Variable> {
        fn as_deref_name(&self) -> Option<&str> {
            self.as_ref().map(|v| v.name.as_str())
        }
    }
}
