use std::fmt;

use crate::{
    CaptureType, ClassDef, ClassId, ClassType, MethodDef, MethodId, SymbolTable, Type,
    TypeParamDef, TypeVarId, VarDef, VarId, WellKnownTypes, WildcardBound,
};

/// Read access to the symbols a type refers to.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn method(&self, id: MethodId) -> Option<&MethodDef>;
    fn var(&self, id: VarId) -> Option<&VarDef>;
    /// Look up a class by binary (`java.util.Map$Entry`) or canonical
    /// (`java.util.Map.Entry`) name.
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> Option<&WellKnownTypes>;
}

impl TypeEnv for SymbolTable {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.class_def(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_param_def(id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.method_def(id)
    }

    fn var(&self, id: VarId) -> Option<&VarDef> {
        self.var_def(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> Option<&WellKnownTypes> {
        self.well_known_types()
    }
}

/// Per-unit typing context used by attribution.
///
/// Capture conversion allocates fresh capture variables here instead of in
/// the shared [`SymbolTable`], so repeated conversions of the same unit get
/// the same capture ids.
pub struct TyContext<'env> {
    base: &'env dyn TypeEnv,
    next_capture: u32,
}

impl fmt::Debug for TyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TyContext")
            .field("next_capture", &self.next_capture)
            .finish_non_exhaustive()
    }
}

impl<'env> TyContext<'env> {
    pub fn new(base: &'env dyn TypeEnv) -> Self {
        Self {
            base,
            next_capture: 0,
        }
    }

    /// Capture conversion for parameterized types containing wildcards (JLS 5.1.10).
    ///
    /// `site` is the source offset of the expression being captured; two
    /// conversions of the same type at different sites yield distinct captures.
    pub fn capture_conversion(&mut self, ty: &Type, site: u32) -> Type {
        let Type::Class(ClassType {
            def,
            args,
            annotations,
        }) = ty
        else {
            return ty.clone();
        };

        if args.iter().all(|a| !matches!(a, Type::Wildcard(..))) {
            return ty.clone();
        }

        let Some(class_def) = self.base.class(*def) else {
            return ty.clone();
        };
        let formals = class_def.type_params.clone();

        let mut new_args = Vec::with_capacity(args.len());
        for (rank, arg) in args.iter().enumerate() {
            match (arg, formals.get(rank)) {
                (Type::Wildcard(bound, _), Some(formal)) => {
                    let id = self.next_capture;
                    self.next_capture += 1;
                    new_args.push(Type::Capture(Box::new(CaptureType {
                        generic: *def,
                        rank,
                        type_param: *formal,
                        wildcard: bound.clone(),
                        site,
                        id,
                    })));
                }
                (other, _) => new_args.push(other.clone()),
            }
        }

        Type::Class(ClassType {
            def: *def,
            args: new_args,
            annotations: annotations.clone(),
        })
    }
}

impl TypeEnv for TyContext<'_> {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.base.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.base.type_param(id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.base.method(id)
    }

    fn var(&self, id: VarId) -> Option<&VarDef> {
        self.base.var(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.base.lookup_class(name)
    }

    fn well_known(&self) -> Option<&WellKnownTypes> {
        self.base.well_known()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_are_distinct_per_site() {
        let table = SymbolTable::with_minimal_jdk();
        let list = table.class_id("java.util.List").unwrap();
        let wildcard = Type::class(
            list,
            vec![Type::Wildcard(WildcardBound::Unbounded, Vec::new())],
        );

        let mut ctx = TyContext::new(&table);
        let a = ctx.capture_conversion(&wildcard, 10);
        let b = ctx.capture_conversion(&wildcard, 20);
        assert_ne!(a, b);

        let Type::Class(ClassType { args, .. }) = a else {
            panic!("expected class type");
        };
        let Type::Capture(cap) = &args[0] else {
            panic!("expected capture, got {:?}", args[0]);
        };
        assert_eq!(cap.site, 10);
        assert_eq!(cap.rank, 0);
    }

    #[test]
    fn non_wildcard_types_are_left_alone() {
        let table = SymbolTable::with_minimal_jdk();
        let string = Type::class(table.well_known_types().unwrap().string, vec![]);
        let mut ctx = TyContext::new(&table);
        assert_eq!(ctx.capture_conversion(&string, 0), string);
    }
}
