use std::sync::Arc;

use nova_types::{
    capture_lower_bound, capture_upper_bound, class_substitution, erasure,
    functional_interface_method, is_subtype, substitute, type_annotations, ClassDef, ClassKind,
    ClassNesting, ClassType, Modifiers, SymbolTable, Type, TypeFormat, WildcardBound,
};

use super::{binding_handle, AnnotationBinding, BindingData, BindingId, MethodBinding, PackageBinding, TypeData, VariableBinding};
use crate::Dom;

/// A resolved type: a class or interface (possibly parameterized), a type
/// variable, a wildcard or capture, an array, a primitive, or `null`.
#[derive(Clone)]
pub struct TypeBinding<'dom> {
    pub(crate) dom: &'dom Dom,
    pub(crate) id: BindingId,
    pub(crate) data: Arc<TypeData>,
}

binding_handle!(TypeBinding, Type);

impl<'dom> TypeBinding<'dom> {
    pub(crate) fn new(dom: &'dom Dom, id: BindingId) -> Self {
        match dom.bindings.get(id) {
            BindingData::Type(data) => TypeBinding { dom, id, data },
            other => panic!("{id:?} is not a type binding: {other:?}"),
        }
    }

    fn symbols(&self) -> &'dom SymbolTable {
        self.dom.symbols()
    }

    fn class_type(&self) -> Option<&ClassType> {
        match &self.data.ty {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    fn class_def(&self) -> Option<&'dom ClassDef> {
        self.symbols().class_def(self.class_type()?.def)
    }

    fn binding_of(&self, ty: &Type) -> Option<TypeBinding<'dom>> {
        self.dom.type_binding(ty)
    }

    pub fn key(&self) -> &str {
        &self.data.key
    }

    /// The resolved type, type-use annotations included.
    pub fn ty(&self) -> &Type {
        &self.data.ty
    }

    /// Simple name with type arguments: `Map.Entry<K,V>` prints as
    /// `Entry<K,V>`, anonymous classes have an empty name.
    pub fn name(&self) -> String {
        if self.is_anonymous() {
            return String::new();
        }
        nova_types::format_type(self.symbols(), &self.data.ty, TypeFormat::SIMPLE)
    }

    /// Fully qualified source name; empty for local and anonymous classes
    /// and for captures.
    pub fn qualified_name(&self) -> String {
        if self.is_local() || self.is_anonymous() || self.is_capture() {
            return String::new();
        }
        nova_types::format_type(self.symbols(), &self.data.ty, TypeFormat::QUALIFIED)
    }

    /// `java.util.Map$Entry`, `I`, `[Ljava.lang.String;`. `None` for types
    /// without a binary form.
    pub fn binary_name(&self) -> Option<String> {
        fn descriptor(symbols: &SymbolTable, ty: &Type, out: &mut String) -> Option<()> {
            match ty {
                Type::Primitive(prim, _) => out.push(prim.descriptor()),
                Type::Class(class) => {
                    out.push('L');
                    out.push_str(&symbols.class_def(class.def)?.binary_name);
                    out.push(';');
                }
                Type::Array(component, _) => {
                    out.push('[');
                    descriptor(symbols, component, out)?;
                }
                _ => return None,
            }
            Some(())
        }

        match &self.data.ty {
            Type::Void => Some("V".to_string()),
            Type::Primitive(prim, _) => Some(prim.descriptor().to_string()),
            Type::Class(_) => Some(self.class_def()?.binary_name.clone()),
            ty @ Type::Array(..) => {
                let mut out = String::new();
                descriptor(self.symbols(), ty, &mut out)?;
                Some(out)
            }
            _ => None,
        }
    }

    fn class_kind(&self) -> Option<ClassKind> {
        Some(self.class_def()?.kind)
    }

    fn nesting(&self) -> Option<ClassNesting> {
        Some(self.class_def()?.nesting)
    }

    pub fn is_class(&self) -> bool {
        self.class_kind() == Some(ClassKind::Class)
    }

    /// Annotation types are interfaces too.
    pub fn is_interface(&self) -> bool {
        self.class_kind().is_some_and(ClassKind::is_interface_like)
    }

    pub fn is_enum(&self) -> bool {
        self.class_kind() == Some(ClassKind::Enum)
    }

    pub fn is_record(&self) -> bool {
        self.class_kind() == Some(ClassKind::Record)
    }

    pub fn is_annotation(&self) -> bool {
        self.class_kind() == Some(ClassKind::Annotation)
    }

    /// Primitive types and `void`.
    pub fn is_primitive(&self) -> bool {
        matches!(self.data.ty, Type::Primitive(..) | Type::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data.ty, Type::Array(..))
    }

    pub fn is_type_variable(&self) -> bool {
        matches!(self.data.ty, Type::TypeVar(..))
    }

    pub fn is_wildcard_type(&self) -> bool {
        matches!(self.data.ty, Type::Wildcard(..))
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.data.ty, Type::Capture(_))
    }

    pub fn is_intersection_type(&self) -> bool {
        matches!(self.data.ty, Type::Intersection(_))
    }

    pub fn is_union_type(&self) -> bool {
        matches!(self.data.ty, Type::Union(_))
    }

    pub fn is_null_type(&self) -> bool {
        matches!(self.data.ty, Type::Null)
    }

    pub fn is_parameterized_type(&self) -> bool {
        !self.data.declaration && self.class_type().is_some_and(|class| !class.args.is_empty())
    }

    /// A generic class used without type arguments.
    pub fn is_raw_type(&self) -> bool {
        !self.data.declaration
            && self.class_type().is_some_and(|class| class.args.is_empty())
            && self.class_def().is_some_and(ClassDef::is_generic)
    }

    /// A generic class as declared, parameterized by its own type variables.
    pub fn is_generic_type(&self) -> bool {
        self.data.declaration
    }

    pub fn is_nested(&self) -> bool {
        self.nesting().is_some_and(|nesting| nesting != ClassNesting::TopLevel)
    }

    pub fn is_member(&self) -> bool {
        self.nesting() == Some(ClassNesting::Member)
    }

    pub fn is_local(&self) -> bool {
        self.nesting() == Some(ClassNesting::Local)
    }

    pub fn is_anonymous(&self) -> bool {
        self.nesting() == Some(ClassNesting::Anonymous)
    }

    pub fn is_top_level(&self) -> bool {
        self.nesting() == Some(ClassNesting::TopLevel)
    }

    pub fn is_from_source(&self) -> bool {
        self.class_def().is_some_and(|def| def.from_source)
    }

    /// Deprecation of this type itself; enclosing types do not contribute.
    pub fn is_deprecated(&self) -> bool {
        self.class_def().is_some_and(|def| def.deprecated)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.class_def().map_or(Modifiers::empty(), |def| def.modifiers)
    }

    pub fn dimensions(&self) -> usize {
        self.data.ty.dimensions()
    }

    /// Innermost non-array type of an array; `None` otherwise.
    pub fn element_type(&self) -> Option<TypeBinding<'dom>> {
        if !self.is_array() {
            return None;
        }
        self.binding_of(self.data.ty.element_type())
    }

    /// This array type with its outermost dimension, and that dimension's
    /// annotations, removed.
    pub fn component_type(&self) -> Option<TypeBinding<'dom>> {
        match &self.data.ty {
            Type::Array(component, _) => self.binding_of(component),
            _ => None,
        }
    }

    pub fn declaring_class(&self) -> Option<TypeBinding<'dom>> {
        let outer = self.class_def()?.enclosing?;
        self.dom.class_declaration_binding(outer)
    }

    pub fn package(&self) -> Option<PackageBinding<'dom>> {
        match &self.data.ty {
            Type::Class(_) => self.dom.package_binding(self.class_def()?.package),
            Type::Array(..) => self.element_type()?.package(),
            _ => None,
        }
    }

    fn substitute_members(&self, ty: &Type) -> Type {
        match self.class_type() {
            Some(class) if !self.data.declaration => {
                substitute(ty, &class_substitution(self.symbols(), class))
            }
            _ => ty.clone(),
        }
    }

    /// The direct superclass, viewed through this type's arguments. `None`
    /// for interfaces and `java.lang.Object`.
    pub fn superclass(&self) -> Option<TypeBinding<'dom>> {
        let def = self.class_def()?;
        if def.kind.is_interface_like() {
            return None;
        }
        let superclass = def.super_class.as_ref()?;
        self.binding_of(&self.substitute_members(superclass))
    }

    pub fn interfaces(&self) -> Vec<TypeBinding<'dom>> {
        let Some(def) = self.class_def() else {
            return Vec::new();
        };
        def.interfaces
            .iter()
            .filter_map(|iface| self.binding_of(&self.substitute_members(iface)))
            .collect()
    }

    /// Methods and constructors declared by this class, as members of this
    /// parameterization.
    pub fn declared_methods(&self) -> Vec<MethodBinding<'dom>> {
        let Some(def) = self.class_def() else {
            return Vec::new();
        };
        let receiver = (!self.data.declaration).then_some(&self.data.ty);
        def.methods
            .iter()
            .filter_map(|method| self.dom.method_binding(*method, receiver))
            .collect()
    }

    pub fn declared_fields(&self) -> Vec<VariableBinding<'dom>> {
        let Some(def) = self.class_def() else {
            return Vec::new();
        };
        def.fields
            .iter()
            .filter_map(|field| self.dom.variable_binding(*field))
            .collect()
    }

    pub fn declared_types(&self) -> Vec<TypeBinding<'dom>> {
        let Some(def) = self.class_def() else {
            return Vec::new();
        };
        def.member_types
            .iter()
            .filter_map(|class| self.dom.class_declaration_binding(*class))
            .collect()
    }

    /// Arguments of a parameterized type; empty otherwise.
    pub fn type_arguments(&self) -> Vec<TypeBinding<'dom>> {
        match self.class_type() {
            Some(class) if !self.data.declaration => {
                class.args.iter().filter_map(|arg| self.binding_of(arg)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Type parameters of a generic type; empty for its parameterizations.
    pub fn type_parameters(&self) -> Vec<TypeBinding<'dom>> {
        if !self.data.declaration {
            return Vec::new();
        }
        let Some(def) = self.class_def() else {
            return Vec::new();
        };
        def.type_params
            .iter()
            .filter_map(|tv| self.binding_of(&Type::type_var(*tv)))
            .collect()
    }

    /// Declared bounds of a type variable, or the upper bound of a capture.
    pub fn type_bounds(&self) -> Vec<TypeBinding<'dom>> {
        match &self.data.ty {
            Type::TypeVar(id, _) => self
                .symbols()
                .type_param_def(*id)
                .map(|tp| tp.upper_bounds.iter().filter_map(|b| self.binding_of(b)).collect())
                .unwrap_or_default(),
            Type::Capture(capture) => match capture_upper_bound(self.symbols(), capture) {
                Type::Intersection(parts) => parts.iter().filter_map(|b| self.binding_of(b)).collect(),
                bound => self.binding_of(&bound).into_iter().collect(),
            },
            _ => Vec::new(),
        }
    }

    /// Bound of a wildcard, or the bound of the wildcard a capture stands
    /// for. `None` for `?`.
    pub fn bound(&self) -> Option<TypeBinding<'dom>> {
        let bound = match &self.data.ty {
            Type::Wildcard(bound, _) => bound,
            Type::Capture(capture) => &capture.wildcard,
            _ => return None,
        };
        match bound {
            WildcardBound::Unbounded => None,
            WildcardBound::Extends(ty) | WildcardBound::Super(ty) => self.binding_of(ty),
        }
    }

    /// Whether [`bound`](Self::bound) is an `extends` bound.
    pub fn is_upper_bound(&self) -> bool {
        match &self.data.ty {
            Type::Wildcard(bound, _) => matches!(bound, WildcardBound::Extends(_)),
            Type::Capture(capture) => matches!(capture.wildcard, WildcardBound::Extends(_)),
            _ => false,
        }
    }

    /// The wildcard a capture was created for.
    pub fn wildcard(&self) -> Option<TypeBinding<'dom>> {
        match &self.data.ty {
            Type::Capture(capture) => {
                self.binding_of(&Type::Wildcard(capture.wildcard.clone(), Vec::new()))
            }
            _ => None,
        }
    }

    pub fn capture_lower_bound(&self) -> Option<TypeBinding<'dom>> {
        match &self.data.ty {
            Type::Capture(capture) => self.binding_of(&capture_lower_bound(capture)?),
            _ => None,
        }
    }

    /// The generic declaration of a parameterized or raw type; the type
    /// itself otherwise.
    pub fn type_declaration(&self) -> TypeBinding<'dom> {
        match self.class_type() {
            Some(class) if !self.data.declaration => self
                .dom
                .class_declaration_binding(class.def)
                .unwrap_or_else(|| self.clone()),
            _ => self.clone(),
        }
    }

    pub fn erasure(&self) -> Option<TypeBinding<'dom>> {
        self.binding_of(&erasure(self.symbols(), &self.data.ty))
    }

    /// Type-use annotations on the outermost level of this type.
    pub fn type_annotations(&self) -> Vec<AnnotationBinding<'dom>> {
        let element = format!("@{}", self.data.key);
        type_annotations(&self.data.ty)
            .iter()
            .filter_map(|instance| self.dom.annotation_binding(instance, &element))
            .collect()
    }

    /// The single abstract method of a functional interface, as a member of
    /// this parameterization.
    pub fn functional_interface_method(&self) -> Option<MethodBinding<'dom>> {
        let sam = functional_interface_method(self.symbols(), &self.data.ty)?;
        self.dom.method_binding(sam.method, Some(&sam.declaring_type))
    }

    /// Best-effort subtype check that ignores type-use annotations.
    pub fn is_subtype_compatible(&self, other: &TypeBinding<'_>) -> bool {
        is_subtype(self.symbols(), &self.data.ty, &other.data.ty)
    }
}
