//! Binding keys.
//!
//! A key names a symbol independently of the binding instance that stands
//! for it: two bindings denote the same symbol exactly when their keys are
//! equal. Keys are built from the symbol table alone, so they are stable
//! across conversion passes of the same unit.
//!
//! | binding                  | key                                           |
//! |--------------------------|-----------------------------------------------|
//! | package `p.q`            | `p/q`                                         |
//! | class `p.q.Outer.Inner`  | `Lp/q/Outer$Inner;`                           |
//! | parameterized            | `Ljava/util/List<Ljava/lang/String;>;`        |
//! | generic declaration      | `Ljava/util/List<TE;>;`                       |
//! | primitive / void / null  | descriptor (`I`, `Z`, ...) / `V` / `N`        |
//! | array                    | `[` + element key                             |
//! | class type variable      | `Lp/X;:TT;`                                   |
//! | method type variable     | method key + `:TT;`                           |
//! | wildcard                 | `*`, `+` bound, `-` bound                     |
//! | capture                  | `!` generic + rank + wildcard + `@` site `;`  |
//! | intersection / union     | member keys joined by `&` / `\|`              |
//! | method                   | declaring type `.` name `(` params `)` return |
//! | field                    | declaring class `.` name `)` type             |
//! | local                    | method key `#` name (`#k` for shadowed names) |
//! | lambda                   | class `.lambda$` site `(` params `)` return   |
//! | module                   | `"` name                                      |
//!
//! Type-use annotations never contribute to a key.

use std::fmt::Write as _;

use nova_types::{
    ClassDef, ClassId, MethodId, SymbolTable, Type, TypeParamOwner, TypeVarId, VarId,
    WildcardBound,
};

fn class_prefix(def: &ClassDef) -> String {
    format!("L{}", def.binary_name.replace('.', "/"))
}

/// Key of a class used without type arguments.
pub(crate) fn class_key(symbols: &SymbolTable, class: ClassId) -> Option<String> {
    Some(format!("{};", class_prefix(symbols.class_def(class)?)))
}

/// Key of a class as declared: generic classes list their parameters.
pub(crate) fn declaration_key(symbols: &SymbolTable, class: ClassId) -> Option<String> {
    let def = symbols.class_def(class)?;
    if !def.is_generic() {
        return Some(format!("{};", class_prefix(def)));
    }
    let mut out = class_prefix(def);
    out.push('<');
    for &param in &def.type_params {
        let name = symbols.type_param_def(param).map_or("?", |tp| tp.name.as_str());
        let _ = write!(out, "T{name};");
    }
    out.push_str(">;");
    Some(out)
}

/// Key of `ty`; `None` for types the front-end could not resolve.
pub(crate) fn type_key(symbols: &SymbolTable, ty: &Type) -> Option<String> {
    match ty {
        Type::TypeVar(id, _) => type_var_key(symbols, *id),
        _ => {
            let mut out = String::new();
            write_type(symbols, ty, &mut out)?;
            Some(out)
        }
    }
}

/// Full key of a type variable, qualified by its declaring element.
pub(crate) fn type_var_key(symbols: &SymbolTable, id: TypeVarId) -> Option<String> {
    let def = symbols.type_param_def(id)?;
    let owner = match def.owner {
        TypeParamOwner::Class(class) => class_key(symbols, class)?,
        TypeParamOwner::Method(method) => {
            let owner = symbols.method_def(method)?.owner;
            method_key(symbols, method, &declaration_key(symbols, owner)?)?
        }
    };
    Some(format!("{owner}:T{};", def.name))
}

fn write_type(symbols: &SymbolTable, ty: &Type, out: &mut String) -> Option<()> {
    match ty {
        Type::Void => out.push('V'),
        Type::Null => out.push('N'),
        Type::Unknown | Type::Named(_) => return None,
        Type::Primitive(prim, _) => out.push(prim.descriptor()),
        Type::Class(class) => {
            out.push_str(&class_prefix(symbols.class_def(class.def)?));
            if !class.args.is_empty() {
                out.push('<');
                for arg in &class.args {
                    write_type(symbols, arg, out)?;
                }
                out.push('>');
            }
            out.push(';');
        }
        Type::TypeVar(id, _) => {
            let _ = write!(out, "T{};", symbols.type_param_def(*id)?.name);
        }
        Type::Array(component, _) => {
            out.push('[');
            write_type(symbols, component, out)?;
        }
        Type::Wildcard(bound, _) => write_wildcard(symbols, bound, out)?,
        Type::Capture(capture) => {
            out.push('!');
            out.push_str(&class_key(symbols, capture.generic)?);
            let _ = write!(out, "{}", capture.rank);
            write_wildcard(symbols, &capture.wildcard, out)?;
            let _ = write!(out, "@{};", capture.site);
        }
        Type::Intersection(parts) => write_joined(symbols, parts, '&', out)?,
        Type::Union(parts) => write_joined(symbols, parts, '|', out)?,
    }
    Some(())
}

fn write_wildcard(symbols: &SymbolTable, bound: &WildcardBound, out: &mut String) -> Option<()> {
    match bound {
        WildcardBound::Unbounded => out.push('*'),
        WildcardBound::Extends(ty) => {
            out.push('+');
            write_type(symbols, ty, out)?;
        }
        WildcardBound::Super(ty) => {
            out.push('-');
            write_type(symbols, ty, out)?;
        }
    }
    Some(())
}

fn write_joined(symbols: &SymbolTable, parts: &[Type], sep: char, out: &mut String) -> Option<()> {
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            out.push(sep);
        }
        write_type(symbols, part, out)?;
    }
    Some(())
}

/// Key of `method` as a member of the type keyed `declaring`. Parameter and
/// return keys use the declared (unsubstituted) signature.
pub(crate) fn method_key(symbols: &SymbolTable, method: MethodId, declaring: &str) -> Option<String> {
    let def = symbols.method_def(method)?;
    let name = if def.is_constructor { "" } else { def.name.as_str() };
    let mut out = format!("{declaring}.{name}(");
    for param in &def.params {
        write_type(symbols, param, &mut out)?;
    }
    out.push(')');
    write_type(symbols, &def.return_type, &mut out)?;
    Some(out)
}

/// Key of a lambda at `site` in the class keyed `owner`.
pub(crate) fn lambda_key(symbols: &SymbolTable, owner: &str, site: u32, params: &[Type], ret: &Type) -> Option<String> {
    let mut out = format!("{owner}.lambda${site}(");
    for param in params {
        write_type(symbols, param, &mut out)?;
    }
    out.push(')');
    write_type(symbols, ret, &mut out)?;
    Some(out)
}

/// Key of a field, enum constant or record component.
pub(crate) fn field_key(symbols: &SymbolTable, var: VarId) -> Option<String> {
    let def = symbols.var_def(var)?;
    let mut out = declaration_key(symbols, def.declaring_class?)?;
    let _ = write!(out, ".{})", def.name);
    write_type(symbols, &def.ty, &mut out)?;
    Some(out)
}

pub(crate) fn package_key(name: &str) -> String {
    name.replace('.', "/")
}

pub(crate) fn module_key(name: &str) -> String {
    format!("\"{name}")
}

#[cfg(test)]
mod tests {
    use nova_types::{ClassKind, PrimitiveType, TypeParamDef, WildcardBound};

    use super::*;

    fn table() -> (SymbolTable, ClassId, ClassId) {
        let mut symbols = SymbolTable::with_minimal_jdk();
        let list = symbols.class_id("java.util.List").expect("minimal jdk has List");
        let outer = symbols.add_class(ClassDef::new("Outer", "p.q.Outer", ClassKind::Class));
        let mut inner = ClassDef::new("Inner", "p.q.Outer$Inner", ClassKind::Class);
        inner.enclosing = Some(outer);
        let inner = symbols.add_class(inner);
        (symbols, list, inner)
    }

    #[test]
    fn class_keys_use_binary_names() {
        let (symbols, _, inner) = table();
        assert_eq!(class_key(&symbols, inner).as_deref(), Some("Lp/q/Outer$Inner;"));
    }

    #[test]
    fn parameterized_and_generic_keys_differ() {
        let (symbols, list, _) = table();
        let string = symbols.class_id("java.lang.String").expect("String");
        let ty = Type::class(list, vec![Type::class(string, Vec::new())]);
        assert_eq!(
            type_key(&symbols, &ty).as_deref(),
            Some("Ljava/util/List<Ljava/lang/String;>;")
        );
        assert_eq!(
            declaration_key(&symbols, list).as_deref(),
            Some("Ljava/util/List<TE;>;")
        );
        assert_eq!(
            type_key(&symbols, &Type::class(list, Vec::new())).as_deref(),
            Some("Ljava/util/List;")
        );
    }

    #[test]
    fn annotations_do_not_change_keys() {
        let (symbols, _, inner) = table();
        let annotated = Type::Array(
            Box::new(Type::Primitive(PrimitiveType::Int, Vec::new())),
            vec![nova_types::AnnotationInstance::marker(inner)],
        );
        assert_eq!(
            type_key(&symbols, &annotated),
            type_key(&symbols, &Type::array(Type::primitive(PrimitiveType::Int)))
        );
        assert_eq!(type_key(&symbols, &annotated).as_deref(), Some("[I"));
    }

    #[test]
    fn wildcards_and_unresolved_types() {
        let (mut symbols, list, _) = table();
        let tv = symbols.add_type_param(TypeParamDef {
            name: "T".to_string(),
            owner: TypeParamOwner::Class(list),
            upper_bounds: Vec::new(),
            lower_bound: None,
            annotations: Vec::new(),
        });
        let ty = Type::Wildcard(WildcardBound::Extends(Box::new(Type::type_var(tv))), Vec::new());
        assert_eq!(type_key(&symbols, &ty).as_deref(), Some("+TT;"));
        assert_eq!(
            type_var_key(&symbols, tv).as_deref(),
            Some("Ljava/util/List;:TT;")
        );
        assert_eq!(type_key(&symbols, &Type::Named("Missing".into())), None);
        assert_eq!(type_key(&symbols, &Type::Unknown), None);
    }
}
