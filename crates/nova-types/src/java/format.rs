use std::fmt::Write as _;

use crate::{ClassType, ConstValue, Type, TypeEnv, WildcardBound};

/// Options for [`format_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeFormat {
    /// `java.util.List` instead of `List`.
    pub qualified: bool,
    /// Render type-use annotations (`@NonNull String`).
    pub annotations: bool,
}

impl TypeFormat {
    pub const SIMPLE: TypeFormat = TypeFormat {
        qualified: false,
        annotations: false,
    };
    pub const QUALIFIED: TypeFormat = TypeFormat {
        qualified: true,
        annotations: false,
    };
}

/// Render `ty` in Java source syntax.
pub fn format_type(env: &dyn TypeEnv, ty: &Type, format: TypeFormat) -> String {
    let mut out = String::new();
    write_type(env, ty, format, &mut out);
    out
}

fn write_annotations(
    env: &dyn TypeEnv,
    annotations: &[crate::AnnotationInstance],
    format: TypeFormat,
    out: &mut String,
) {
    if !format.annotations {
        return;
    }
    for annotation in annotations {
        out.push('@');
        out.push_str(&class_name(env, annotation.ty, format));
        if !annotation.values.is_empty() {
            out.push('(');
            for (idx, (name, value)) in annotation.values.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{name}=");
                write_const(env, value, format, out);
            }
            out.push(')');
        }
        out.push(' ');
    }
}

fn write_const(env: &dyn TypeEnv, value: &ConstValue, format: TypeFormat, out: &mut String) {
    match value {
        ConstValue::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        ConstValue::Int(i) => {
            let _ = write!(out, "{i}");
        }
        ConstValue::Long(l) => {
            let _ = write!(out, "{l}L");
        }
        ConstValue::Char(c) => {
            let _ = write!(out, "'{c}'");
        }
        ConstValue::Float(_) | ConstValue::Double(_) => {
            let _ = write!(out, "{}", value.as_f64().unwrap_or_default());
        }
        ConstValue::String(s) => {
            let _ = write!(out, "{s:?}");
        }
        ConstValue::Class(ty) => {
            write_type(env, ty, format, out);
            out.push_str(".class");
        }
        ConstValue::Enum { ty, name } => {
            out.push_str(&class_name(env, *ty, format));
            out.push('.');
            out.push_str(name);
        }
        ConstValue::Annotation(annotation) => {
            write_annotations(env, std::slice::from_ref(&**annotation), format, out);
            out.pop();
        }
        ConstValue::Array(values) => {
            out.push('{');
            for (idx, value) in values.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_const(env, value, format, out);
            }
            out.push('}');
        }
    }
}

fn class_name(env: &dyn TypeEnv, id: crate::ClassId, format: TypeFormat) -> String {
    let Some(def) = env.class(id) else {
        return "<unknown>".to_string();
    };
    if format.qualified {
        def.qualified_name()
    } else {
        def.name.clone()
    }
}

fn write_type(env: &dyn TypeEnv, ty: &Type, format: TypeFormat, out: &mut String) {
    match ty {
        Type::Void => out.push_str("void"),
        Type::Null => out.push_str("null"),
        Type::Unknown => out.push_str("<unknown>"),
        Type::Named(name) => out.push_str(name),
        Type::Primitive(prim, annotations) => {
            write_annotations(env, annotations, format, out);
            out.push_str(prim.keyword());
        }
        Type::Class(ClassType {
            def,
            args,
            annotations,
        }) => {
            write_annotations(env, annotations, format, out);
            out.push_str(&class_name(env, *def, format));
            if !args.is_empty() {
                out.push('<');
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    write_type(env, arg, format, out);
                }
                out.push('>');
            }
        }
        Type::TypeVar(id, annotations) => {
            write_annotations(env, annotations, format, out);
            match env.type_param(*id) {
                Some(tp) => out.push_str(&tp.name),
                None => out.push_str("<unknown>"),
            }
        }
        Type::Array(..) => {
            write_type(env, ty.element_type(), format, out);
            let mut level = ty;
            while let Type::Array(component, annotations) = level {
                if format.annotations && !annotations.is_empty() {
                    out.push(' ');
                    write_annotations(env, annotations, format, out);
                }
                out.push_str("[]");
                level = component;
            }
        }
        Type::Wildcard(bound, annotations) => {
            write_annotations(env, annotations, format, out);
            write_wildcard(env, bound, format, out);
        }
        Type::Capture(cap) => {
            let _ = write!(out, "capture#{}-of ", cap.id);
            write_wildcard(env, &cap.wildcard, format, out);
        }
        Type::Intersection(parts) => write_joined(env, parts, " & ", format, out),
        Type::Union(parts) => write_joined(env, parts, " | ", format, out),
    }
}

fn write_wildcard(env: &dyn TypeEnv, bound: &WildcardBound, format: TypeFormat, out: &mut String) {
    out.push('?');
    match bound {
        WildcardBound::Unbounded => {}
        WildcardBound::Extends(upper) => {
            out.push_str(" extends ");
            write_type(env, upper, format, out);
        }
        WildcardBound::Super(lower) => {
            out.push_str(" super ");
            write_type(env, lower, format, out);
        }
    }
}

fn write_joined(env: &dyn TypeEnv, parts: &[Type], sep: &str, format: TypeFormat, out: &mut String) {
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            out.push_str(sep);
        }
        write_type(env, part, format, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnnotationInstance, PrimitiveType, SymbolTable};

    #[test]
    fn formats_generic_and_array_types() {
        let table = SymbolTable::with_minimal_jdk();
        let string = Type::class(table.class_id("java.lang.String").unwrap(), vec![]);
        let map = table.class_id("java.util.Map").unwrap();
        let ty = Type::class(map, vec![string.clone(), Type::array(string)]);

        assert_eq!(format_type(&table, &ty, TypeFormat::SIMPLE), "Map<String,String[]>");
        assert_eq!(
            format_type(&table, &ty, TypeFormat::QUALIFIED),
            "java.util.Map<java.lang.String,java.lang.String[]>"
        );
    }

    #[test]
    fn annotated_dimensions_render_outer_to_inner() {
        let table = SymbolTable::with_minimal_jdk();
        let deprecated = table.well_known_types().unwrap().deprecated;
        let ty = Type::Array(
            Box::new(Type::array(Type::primitive(PrimitiveType::Int))),
            vec![AnnotationInstance::marker(deprecated)],
        );
        let format = TypeFormat {
            qualified: false,
            annotations: true,
        };
        assert_eq!(format_type(&table, &ty, format), "int @Deprecated [][]");
        assert_eq!(format_type(&table, &ty, TypeFormat::SIMPLE), "int[][]");
    }
}
