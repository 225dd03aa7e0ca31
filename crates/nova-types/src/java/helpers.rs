use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    AnnotationInstance, CaptureType, ClassId, ClassKind, ClassType, MethodId, PrimitiveType, Type,
    TypeEnv, TypeVarId, WildcardBound,
};

/// Replace type variables according to `subst`.
///
/// Annotations on a replaced type variable use (`@A T`) are carried over to
/// the replacement.
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    if subst.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::TypeVar(id, annotations) => match subst.get(id) {
            Some(replacement) if annotations.is_empty() => replacement.clone(),
            Some(replacement) => {
                let mut merged = annotations.clone();
                merged.extend(type_annotations(replacement).iter().cloned());
                with_annotations(replacement, merged)
            }
            None => ty.clone(),
        },
        Type::Class(ClassType {
            def,
            args,
            annotations,
        }) => Type::Class(ClassType {
            def: *def,
            args: args.iter().map(|arg| substitute(arg, subst)).collect(),
            annotations: annotations.clone(),
        }),
        Type::Array(component, annotations) => {
            Type::Array(Box::new(substitute(component, subst)), annotations.clone())
        }
        Type::Wildcard(bound, annotations) => {
            Type::Wildcard(substitute_bound(bound, subst), annotations.clone())
        }
        Type::Capture(cap) => Type::Capture(Box::new(CaptureType {
            wildcard: substitute_bound(&cap.wildcard, subst),
            ..(**cap).clone()
        })),
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| substitute(p, subst)).collect())
        }
        Type::Union(parts) => Type::Union(parts.iter().map(|p| substitute(p, subst)).collect()),
        Type::Void | Type::Null | Type::Unknown | Type::Named(_) | Type::Primitive(..) => {
            ty.clone()
        }
    }
}

fn substitute_bound(bound: &WildcardBound, subst: &HashMap<TypeVarId, Type>) -> WildcardBound {
    match bound {
        WildcardBound::Unbounded => WildcardBound::Unbounded,
        WildcardBound::Extends(upper) => WildcardBound::Extends(Box::new(substitute(upper, subst))),
        WildcardBound::Super(lower) => WildcardBound::Super(Box::new(substitute(lower, subst))),
    }
}

/// Substitution mapping a class's formals to the arguments of `ty`.
///
/// Raw uses map every formal to its erasure.
pub fn class_substitution(env: &dyn TypeEnv, ty: &ClassType) -> HashMap<TypeVarId, Type> {
    let Some(def) = env.class(ty.def) else {
        return HashMap::new();
    };
    let raw = ty.args.is_empty();
    def.type_params
        .iter()
        .enumerate()
        .map(|(idx, formal)| {
            let actual = if raw {
                erasure(env, &Type::type_var(*formal))
            } else {
                ty.args.get(idx).cloned().unwrap_or(Type::Unknown)
            };
            (*formal, actual)
        })
        .collect()
}

/// Type-use annotations on the outermost level of `ty`.
pub fn type_annotations(ty: &Type) -> &[AnnotationInstance] {
    match ty {
        Type::Primitive(_, annotations)
        | Type::TypeVar(_, annotations)
        | Type::Array(_, annotations)
        | Type::Wildcard(_, annotations)
        | Type::Class(ClassType { annotations, .. }) => annotations,
        _ => &[],
    }
}

/// `ty` with its outermost annotations replaced.
pub fn with_annotations(ty: &Type, annotations: Vec<AnnotationInstance>) -> Type {
    match ty {
        Type::Primitive(prim, _) => Type::Primitive(*prim, annotations),
        Type::TypeVar(id, _) => Type::TypeVar(*id, annotations),
        Type::Array(component, _) => Type::Array(component.clone(), annotations),
        Type::Wildcard(bound, _) => Type::Wildcard(bound.clone(), annotations),
        Type::Class(class) => Type::Class(ClassType {
            annotations,
            ..class.clone()
        }),
        other => other.clone(),
    }
}

/// Whether any level of `ty` carries a type-use annotation.
pub fn has_type_annotations(ty: &Type) -> bool {
    if !type_annotations(ty).is_empty() {
        return true;
    }
    match ty {
        Type::Class(ClassType { args, .. }) => args.iter().any(has_type_annotations),
        Type::Array(component, _) => has_type_annotations(component),
        Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound), _) => {
            has_type_annotations(bound)
        }
        Type::Capture(cap) => match &cap.wildcard {
            WildcardBound::Extends(bound) | WildcardBound::Super(bound) => {
                has_type_annotations(bound)
            }
            WildcardBound::Unbounded => false,
        },
        Type::Intersection(parts) | Type::Union(parts) => parts.iter().any(has_type_annotations),
        _ => false,
    }
}

/// `ty` with every type-use annotation removed, at every level.
pub fn strip_annotations(ty: &Type) -> Type {
    match ty {
        Type::Primitive(prim, _) => Type::primitive(*prim),
        Type::TypeVar(id, _) => Type::type_var(*id),
        Type::Array(component, _) => Type::array(strip_annotations(component)),
        Type::Wildcard(bound, _) => Type::Wildcard(strip_bound(bound), Vec::new()),
        Type::Class(ClassType { def, args, .. }) => {
            Type::class(*def, args.iter().map(strip_annotations).collect())
        }
        Type::Capture(cap) => Type::Capture(Box::new(CaptureType {
            wildcard: strip_bound(&cap.wildcard),
            ..(**cap).clone()
        })),
        Type::Intersection(parts) => Type::Intersection(parts.iter().map(strip_annotations).collect()),
        Type::Union(parts) => Type::Union(parts.iter().map(strip_annotations).collect()),
        other => other.clone(),
    }
}

fn strip_bound(bound: &WildcardBound) -> WildcardBound {
    match bound {
        WildcardBound::Unbounded => WildcardBound::Unbounded,
        WildcardBound::Extends(upper) => WildcardBound::Extends(Box::new(strip_annotations(upper))),
        WildcardBound::Super(lower) => WildcardBound::Super(Box::new(strip_annotations(lower))),
    }
}

fn object_type(env: &dyn TypeEnv) -> Type {
    env.well_known()
        .map(|wk| Type::class(wk.object, vec![]))
        .unwrap_or(Type::Unknown)
}

/// Type erasure (JLS 4.6). Annotations are dropped.
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    fn inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
        match ty {
            Type::Class(ClassType { def, .. }) => Type::class(*def, vec![]),
            Type::TypeVar(id, _) => {
                if !seen.insert(*id) {
                    return object_type(env);
                }
                let erased = env
                    .type_param(*id)
                    .and_then(|tp| tp.upper_bounds.first())
                    .map(|bound| inner(env, bound, seen))
                    .unwrap_or_else(|| object_type(env));
                seen.remove(id);
                erased
            }
            Type::Array(component, _) => Type::array(inner(env, component, seen)),
            Type::Capture(cap) => inner(env, &capture_upper_bound(env, cap), seen),
            Type::Wildcard(WildcardBound::Extends(upper), _) => inner(env, upper, seen),
            Type::Wildcard(..) => object_type(env),
            Type::Intersection(parts) => parts
                .first()
                .map(|first| inner(env, first, seen))
                .unwrap_or_else(|| object_type(env)),
            Type::Primitive(prim, _) => Type::primitive(*prim),
            other => other.clone(),
        }
    }

    inner(env, ty, &mut HashSet::new())
}

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// This is a best-effort helper. It never panics: missing class metadata simply returns `None`.
///
/// Example: `ArrayList<String>` instantiated as `List` returns `List<String>`.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<Type> {
        match ty {
            Type::Array(..) => {
                let wk = env.well_known()?;
                if target == wk.object || target == wk.cloneable || target == wk.serializable {
                    return Some(Type::class(target, vec![]));
                }
                return None;
            }
            Type::Intersection(parts) => {
                return parts
                    .iter()
                    .find_map(|part| inner(env, part, target, seen_type_vars));
            }
            Type::TypeVar(id, _) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }
                let out = env.type_param(*id).and_then(|tp| {
                    tp.upper_bounds
                        .iter()
                        .find_map(|bound| inner(env, bound, target, seen_type_vars))
                });
                seen_type_vars.remove(id);
                return out;
            }
            Type::Capture(cap) => {
                return inner(env, &capture_upper_bound(env, cap), target, seen_type_vars);
            }
            _ => {}
        }

        let Type::Class(start) = ty else {
            return None;
        };

        let mut queue: VecDeque<ClassType> = VecDeque::new();
        let mut seen: HashSet<ClassId> = HashSet::new();
        queue.push_back(start.clone());

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.def) {
                continue;
            }
            if current.def == target {
                return Some(Type::Class(current));
            }

            let Some(class_def) = env.class(current.def) else {
                continue;
            };

            // If the current instantiation is raw we can't recover meaningful
            // type arguments for supertypes. Preserve rawness when walking.
            let raw = current.args.is_empty() && class_def.is_generic();
            let subst = if raw {
                HashMap::new()
            } else {
                class_substitution(env, &current)
            };

            let supertypes = class_def
                .super_class
                .iter()
                .chain(class_def.interfaces.iter());
            for sup in supertypes {
                let sup = substitute(sup, &subst);
                if let Type::Class(mut sup) = sup {
                    if raw {
                        sup.args.clear();
                    }
                    sup.annotations.clear();
                    queue.push_back(sup);
                }
            }

            // Every interface implicitly has `Object` as a supertype (JLS 4.10.2).
            if class_def.kind.is_interface_like() {
                if let Some(wk) = env.well_known() {
                    queue.push_back(ClassType {
                        def: wk.object,
                        args: Vec::new(),
                        annotations: Vec::new(),
                    });
                }
            }
        }

        None
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}

/// Best-effort subtype check, ignoring type-use annotations.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let sub_plain = strip_annotations(sub);
    let sup_plain = strip_annotations(sup);
    if sub_plain == sup_plain {
        return true;
    }

    match (&sub_plain, &sup_plain) {
        (Type::Unknown | Type::Named(_), _) | (_, Type::Unknown | Type::Named(_)) => false,
        (Type::Null, sup) => sup.is_reference(),
        (Type::Primitive(a, _), Type::Primitive(b, _)) => {
            a == b
                || (a.is_numeric()
                    && b.is_numeric()
                    && *a != PrimitiveType::Char
                    && *b != PrimitiveType::Char
                    && a.numeric_rank() < b.numeric_rank())
                || (*a == PrimitiveType::Char && b.numeric_rank() > PrimitiveType::Short.numeric_rank())
        }
        (Type::Primitive(..), _) | (_, Type::Primitive(..)) => false,
        (_, Type::Intersection(parts)) => parts.iter().all(|part| is_subtype(env, sub, part)),
        (Type::Intersection(parts), _) => parts.iter().any(|part| is_subtype(env, part, sup)),
        (Type::Union(parts), _) => parts.iter().all(|part| is_subtype(env, part, sup)),
        (Type::TypeVar(id, _), _) => env.type_param(*id).is_some_and(|tp| {
            let bounds = if tp.upper_bounds.is_empty() {
                vec![object_type(env)]
            } else {
                tp.upper_bounds.clone()
            };
            bounds.iter().any(|bound| is_subtype(env, bound, sup))
        }),
        (Type::Capture(cap), _) => is_subtype(env, &capture_upper_bound(env, cap), sup),
        (_, Type::Capture(cap)) => capture_lower_bound(cap)
            .is_some_and(|lower| is_subtype(env, sub, &lower)),
        (Type::Array(a, _), Type::Array(b, _)) => {
            if a.is_primitive() || b.is_primitive() {
                strip_annotations(a) == strip_annotations(b)
            } else {
                is_subtype(env, a, b)
            }
        }
        (Type::Array(..), Type::Class(sup)) => {
            instantiate_as_supertype(env, &sub_plain, sup.def).is_some()
        }
        (Type::Class(_), Type::Class(sup_class)) => {
            let Some(Type::Class(viewed)) = instantiate_as_supertype(env, &sub_plain, sup_class.def)
            else {
                return false;
            };
            if sup_class.args.is_empty() || viewed.args.is_empty() {
                return true;
            }
            viewed.args.len() == sup_class.args.len()
                && viewed
                    .args
                    .iter()
                    .zip(&sup_class.args)
                    .all(|(actual, formal)| contains(env, formal, actual))
        }
        _ => false,
    }
}

/// Type argument containment (JLS 4.5.1).
fn contains(env: &dyn TypeEnv, container: &Type, arg: &Type) -> bool {
    match container {
        Type::Wildcard(WildcardBound::Unbounded, _) => true,
        Type::Wildcard(WildcardBound::Extends(upper), _) => match arg {
            Type::Wildcard(WildcardBound::Extends(inner), _) => is_subtype(env, inner, upper),
            Type::Wildcard(..) => false,
            other => is_subtype(env, other, upper),
        },
        Type::Wildcard(WildcardBound::Super(lower), _) => match arg {
            Type::Wildcard(WildcardBound::Super(inner), _) => is_subtype(env, lower, inner),
            Type::Wildcard(..) => false,
            other => is_subtype(env, lower, other),
        },
        other => strip_annotations(other) == strip_annotations(arg),
    }
}

/// Greatest lower bound of two reference types.
pub fn glb(env: &dyn TypeEnv, a: &Type, b: &Type) -> Type {
    if is_subtype(env, a, b) {
        return a.clone();
    }
    if is_subtype(env, b, a) {
        return b.clone();
    }
    let mut parts = Vec::new();
    for ty in [a, b] {
        match ty {
            Type::Intersection(inner) => parts.extend(inner.iter().cloned()),
            other => parts.push(other.clone()),
        }
    }
    Type::Intersection(parts)
}

/// Upper bound of a capture variable: the glb of the wildcard's upper bound
/// and the declared bound of the captured type parameter.
pub fn capture_upper_bound(env: &dyn TypeEnv, cap: &CaptureType) -> Type {
    let declared = env
        .type_param(cap.type_param)
        .and_then(|tp| {
            let bounds: Vec<Type> = tp
                .upper_bounds
                .iter()
                .filter(|bound| !mentions_type_var(bound, cap.type_param))
                .cloned()
                .collect();
            match bounds.len() {
                0 => None,
                1 => bounds.into_iter().next(),
                _ => Some(Type::Intersection(bounds)),
            }
        })
        .unwrap_or_else(|| object_type(env));

    match &cap.wildcard {
        WildcardBound::Extends(upper) => glb(env, upper, &declared),
        WildcardBound::Unbounded | WildcardBound::Super(_) => declared,
    }
}

/// Lower bound of a capture variable (only `? super` wildcards have one).
pub fn capture_lower_bound(cap: &CaptureType) -> Option<Type> {
    match &cap.wildcard {
        WildcardBound::Super(lower) => Some((**lower).clone()),
        _ => None,
    }
}

fn mentions_type_var(ty: &Type, var: TypeVarId) -> bool {
    match ty {
        Type::TypeVar(id, _) => *id == var,
        Type::Class(ClassType { args, .. }) => args.iter().any(|arg| mentions_type_var(arg, var)),
        Type::Array(component, _) => mentions_type_var(component, var),
        Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound), _) => {
            mentions_type_var(bound, var)
        }
        Type::Intersection(parts) | Type::Union(parts) => {
            parts.iter().any(|part| mentions_type_var(part, var))
        }
        _ => false,
    }
}

/// The single abstract method of a functional interface, viewed through a
/// particular parameterization of that interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamMethod {
    pub method: MethodId,
    /// The (substituted) interface type declaring `method`.
    pub declaring_type: Type,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub thrown: Vec<Type>,
}

/// Find the functional interface method of `ty` (JLS 9.8).
///
/// Superinterfaces are walked closest-first with type argument substitution.
/// Methods are keyed by name and erased parameter types; the closest
/// declaration of a signature decides whether it is abstract, so a default
/// method overriding an inherited abstract one removes it, and the same
/// abstract signature inherited along several paths counts once. Public
/// `Object` methods are ignored. Exactly one abstract signature must remain.
pub fn functional_interface_method(env: &dyn TypeEnv, ty: &Type) -> Option<SamMethod> {
    let Type::Class(root) = ty else {
        return None;
    };
    if env.class(root.def)?.kind != ClassKind::Interface {
        return None;
    }

    let mut queue: VecDeque<ClassType> = VecDeque::new();
    let mut seen: HashSet<ClassId> = HashSet::new();
    queue.push_back(root.clone());

    let mut decided: HashMap<(String, Vec<Type>), Option<SamMethod>> = HashMap::new();
    let mut order: Vec<(String, Vec<Type>)> = Vec::new();

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.def) {
            continue;
        }
        let Some(class_def) = env.class(current.def) else {
            continue;
        };
        let subst = class_substitution(env, &current);
        let declaring_type = Type::Class(ClassType {
            annotations: Vec::new(),
            ..current.clone()
        });

        for &method_id in &class_def.methods {
            let Some(method) = env.method(method_id) else {
                continue;
            };
            if method.is_static() || method.is_constructor {
                continue;
            }

            let params: Vec<Type> = method.params.iter().map(|p| substitute(p, &subst)).collect();
            let return_type = substitute(&method.return_type, &subst);
            let signature = (
                method.name.clone(),
                params.iter().map(|p| erasure(env, p)).collect::<Vec<_>>(),
            );
            if decided.contains_key(&signature) {
                continue;
            }

            if !method.is_abstract() {
                decided.insert(signature, None);
                continue;
            }
            if is_object_method(env, &method.name, &params) {
                continue;
            }

            order.push(signature.clone());
            decided.insert(
                signature,
                Some(SamMethod {
                    method: method_id,
                    declaring_type: declaring_type.clone(),
                    params,
                    return_type,
                    thrown: method.thrown.iter().map(|t| substitute(t, &subst)).collect(),
                }),
            );
        }

        for iface in &class_def.interfaces {
            if let Type::Class(mut iface) = substitute(iface, &subst) {
                if current.args.is_empty() && class_def.is_generic() {
                    iface.args.clear();
                }
                queue.push_back(iface);
            }
        }
    }

    let mut abstract_methods = order
        .into_iter()
        .filter_map(|signature| decided.remove(&signature).flatten());
    let sam = abstract_methods.next()?;
    if abstract_methods.next().is_some() {
        return None;
    }
    Some(sam)
}

fn is_object_method(env: &dyn TypeEnv, name: &str, params: &[Type]) -> bool {
    match name {
        "equals" => {
            params.len() == 1
                && env
                    .well_known()
                    .is_some_and(|wk| erasure(env, &params[0]) == Type::class(wk.object, vec![]))
        }
        "hashCode" | "toString" => params.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, MethodDef, Modifiers, SymbolTable, TypeParamDef, TypeParamOwner};

    #[test]
    fn instantiate_as_supertype_recovers_type_arguments() {
        let table = SymbolTable::with_minimal_jdk();
        let string = Type::class(table.class_id("java.lang.String").unwrap(), vec![]);
        let list = table.class_id("java.util.List").unwrap();
        let array_list = table.class_id("java.util.ArrayList").unwrap();

        let ty = Type::class(array_list, vec![string.clone()]);
        assert_eq!(
            instantiate_as_supertype(&table, &ty, list),
            Some(Type::class(list, vec![string]))
        );
    }

    #[test]
    fn wildcard_containment_drives_subtyping() {
        let table = SymbolTable::with_minimal_jdk();
        let integer = Type::class(table.class_id("java.lang.Integer").unwrap(), vec![]);
        let number = Type::class(table.class_id("java.lang.Number").unwrap(), vec![]);
        let list = table.class_id("java.util.List").unwrap();

        let list_of_integer = Type::class(list, vec![integer]);
        let list_of_extends_number = Type::class(
            list,
            vec![Type::Wildcard(
                WildcardBound::Extends(Box::new(number.clone())),
                Vec::new(),
            )],
        );
        assert!(is_subtype(&table, &list_of_integer, &list_of_extends_number));
        assert!(!is_subtype(
            &table,
            &list_of_integer,
            &Type::class(list, vec![number])
        ));
    }

    #[test]
    fn function_sam_is_substituted() {
        let table = SymbolTable::with_minimal_jdk();
        let string = Type::class(table.class_id("java.lang.String").unwrap(), vec![]);
        let integer = Type::class(table.class_id("java.lang.Integer").unwrap(), vec![]);
        let function = table.class_id("java.util.function.Function").unwrap();

        let sam = functional_interface_method(
            &table,
            &Type::class(function, vec![string.clone(), integer.clone()]),
        )
        .expect("Function is functional");
        assert_eq!(table.method_def(sam.method).unwrap().name, "apply");
        assert_eq!(sam.params, vec![string]);
        assert_eq!(sam.return_type, integer);
    }

    #[test]
    fn comparator_like_interfaces_ignore_object_methods() {
        let mut table = SymbolTable::with_minimal_jdk();
        let object = Type::class(table.well_known_types().unwrap().object, vec![]);
        let cmp = table.add_class(ClassDef::new("Cmp", "p.Cmp", ClassKind::Interface));
        let t = table.add_type_param(TypeParamDef {
            name: "T".into(),
            owner: TypeParamOwner::Class(cmp),
            upper_bounds: vec![object.clone()],
            lower_bound: None,
            annotations: Vec::new(),
        });
        let mut compare = MethodDef::new("compare", cmp, Type::primitive(PrimitiveType::Int));
        compare.modifiers |= Modifiers::ABSTRACT;
        compare.params = vec![Type::type_var(t), Type::type_var(t)];
        table.add_method(compare);
        let mut equals = MethodDef::new("equals", cmp, Type::primitive(PrimitiveType::Boolean));
        equals.modifiers |= Modifiers::ABSTRACT;
        equals.params = vec![object];
        table.add_method(equals);

        let sam = functional_interface_method(&table, &Type::class(cmp, vec![]));
        assert_eq!(
            sam.map(|sam| table.method_def(sam.method).unwrap().name.clone()),
            Some("compare".to_string())
        );
    }

    #[test]
    fn two_unrelated_abstract_methods_are_not_functional() {
        let mut table = SymbolTable::with_minimal_jdk();
        let iface = table.add_class(ClassDef::new("Two", "p.Two", ClassKind::Interface));
        for name in ["a", "b"] {
            let mut method = MethodDef::new(name, iface, Type::Void);
            method.modifiers |= Modifiers::ABSTRACT;
            table.add_method(method);
        }
        assert_eq!(
            functional_interface_method(&table, &Type::class(iface, vec![])),
            None
        );
    }
}
