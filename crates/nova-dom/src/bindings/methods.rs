use std::sync::Arc;

use nova_hir::{ExprId, ExprKind};
use nova_types::{
    class_substitution, functional_interface_method, instantiate_as_supertype, substitute,
    ClassId, MethodDef, MethodId, Modifiers, Type, VarId,
};

use super::{
    binding_handle, key, AnnotationBinding, BindingData, BindingId, BindingKind, MethodData,
    MethodOrigin, TypeBinding, VariableBinding, VariableData,
};
use crate::Dom;

/// A method, constructor, or the method implemented by a lambda.
#[derive(Clone)]
pub struct MethodBinding<'dom> {
    pub(crate) dom: &'dom Dom,
    pub(crate) id: BindingId,
    pub(crate) data: Arc<MethodData>,
}

binding_handle!(MethodBinding, Method);

impl<'dom> MethodBinding<'dom> {
    fn new(dom: &'dom Dom, id: BindingId) -> Self {
        match dom.bindings.get(id) {
            BindingData::Method(data) => MethodBinding { dom, id, data },
            other => panic!("{id:?} is not a method binding: {other:?}"),
        }
    }

    /// The declared method behind this binding; for a lambda, its
    /// functional interface method.
    fn method_id(&self) -> MethodId {
        match &self.data.origin {
            MethodOrigin::Declared(method) => *method,
            MethodOrigin::Lambda { sam, .. } => *sam,
        }
    }

    fn def(&self) -> Option<&'dom MethodDef> {
        self.dom.symbols().method_def(self.method_id())
    }

    pub fn key(&self) -> &str {
        &self.data.key
    }

    /// Constructors are named after their class; lambdas are
    /// `lambda$<offset>`.
    pub fn name(&self) -> String {
        if let MethodOrigin::Lambda { site, .. } = &self.data.origin {
            return format!("lambda${site}");
        }
        let Some(def) = self.def() else {
            return String::new();
        };
        if def.is_constructor {
            return self
                .dom
                .symbols()
                .class_def(def.owner)
                .map_or_else(String::new, |class| class.name.clone());
        }
        def.name.clone()
    }

    pub fn is_constructor(&self) -> bool {
        !self.is_lambda() && self.def().is_some_and(|def| def.is_constructor)
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self.data.origin, MethodOrigin::Lambda { .. })
    }

    /// The declaring type, parameterized as seen from the receiver. For a
    /// lambda, the class whose body contains it.
    pub fn declaring_class(&self) -> Option<TypeBinding<'dom>> {
        let declaring = &self.data.declaring;
        let class = declaring.class_id()?;
        match self.dom.declaration_type(class) {
            Some((as_declared, _)) if as_declared == *declaring => {
                self.dom.class_declaration_binding(class)
            }
            _ => self.dom.type_binding(declaring),
        }
    }

    pub fn parameter_types(&self) -> Vec<TypeBinding<'dom>> {
        self.data
            .params
            .iter()
            .filter_map(|ty| self.dom.type_binding(ty))
            .collect()
    }

    pub fn return_type(&self) -> Option<TypeBinding<'dom>> {
        self.dom.type_binding(&self.data.ret)
    }

    pub fn exception_types(&self) -> Vec<TypeBinding<'dom>> {
        self.data
            .thrown
            .iter()
            .filter_map(|ty| self.dom.type_binding(ty))
            .collect()
    }

    pub fn type_parameters(&self) -> Vec<TypeBinding<'dom>> {
        if self.is_lambda() {
            return Vec::new();
        }
        self.def()
            .map(|def| {
                def.type_params
                    .iter()
                    .filter_map(|tv| self.dom.type_binding(&Type::type_var(*tv)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Lambdas carry no modifiers.
    pub fn modifiers(&self) -> Modifiers {
        if self.is_lambda() {
            return Modifiers::empty();
        }
        self.def().map_or(Modifiers::empty(), |def| def.modifiers)
    }

    pub fn is_varargs(&self) -> bool {
        !self.is_lambda() && self.def().is_some_and(|def| def.is_varargs)
    }

    pub fn is_default(&self) -> bool {
        self.modifiers().contains(Modifiers::DEFAULT)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers().contains(Modifiers::ABSTRACT)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers().contains(Modifiers::STATIC)
    }

    pub fn is_deprecated(&self) -> bool {
        !self.is_lambda() && self.def().is_some_and(|def| def.deprecated)
    }

    pub fn annotations(&self) -> Vec<AnnotationBinding<'dom>> {
        if self.is_lambda() {
            return Vec::new();
        }
        let Some(def) = self.def() else {
            return Vec::new();
        };
        let element = self.method_declaration().key().to_string();
        def.annotations
            .iter()
            .filter_map(|instance| self.dom.annotation_binding(instance, &element))
            .collect()
    }

    /// Declaration annotations of parameter `index`.
    pub fn parameter_annotations(&self, index: usize) -> Vec<AnnotationBinding<'dom>> {
        if self.is_lambda() {
            return Vec::new();
        }
        let Some(annotations) = self.def().and_then(|def| def.param_annotations.get(index)) else {
            return Vec::new();
        };
        let element = format!("{}#{index}", self.method_declaration().key());
        annotations
            .iter()
            .filter_map(|instance| self.dom.annotation_binding(instance, &element))
            .collect()
    }

    /// Default value of an annotation type member.
    pub fn default_value(&self) -> Option<&'dom nova_types::ConstValue> {
        self.def()?.default_value.as_ref()
    }

    /// The generic method as declared, independent of the receiver.
    pub fn method_declaration(&self) -> MethodBinding<'dom> {
        match &self.data.origin {
            MethodOrigin::Declared(method) => self
                .dom
                .method_binding(*method, None)
                .unwrap_or_else(|| self.clone()),
            MethodOrigin::Lambda { .. } => self.clone(),
        }
    }

    /// Captured locals of the enclosing scopes, in order of first reference
    /// inside the lambda. Each carries a synthetic `val$<name>` name.
    pub fn synthetic_outer_locals(&self) -> Vec<VariableBinding<'dom>> {
        let MethodOrigin::Lambda { outer_locals, .. } = &self.data.origin else {
            return Vec::new();
        };
        outer_locals
            .iter()
            .filter_map(|var| self.dom.synthetic_outer_local(*var, &self.data.key))
            .collect()
    }
}

impl Dom {
    /// Type of `class` as seen from its own body, with its key.
    fn declaration_type(&self, class: ClassId) -> Option<(Type, String)> {
        let def = self.symbols().class_def(class)?;
        let args = def.type_params.iter().map(|tv| Type::type_var(*tv)).collect();
        Some((Type::class(class, args), key::declaration_key(self.symbols(), class)?))
    }

    /// Binding of `method` as a member of `receiver`'s type. Without a
    /// receiver, or when the receiver does not see the declaring class as a
    /// parameterized supertype, the method is taken as declared.
    pub(crate) fn method_binding(&self, method: MethodId, receiver: Option<&Type>) -> Option<MethodBinding<'_>> {
        let symbols = self.symbols();
        let def = symbols.method_def(method)?;
        let seen = receiver
            .and_then(|receiver| instantiate_as_supertype(symbols, receiver, def.owner))
            .and_then(|ty| match ty {
                Type::Class(class) if !class.args.is_empty() && !def.is_static() => Some(class),
                _ => None,
            });
        let (declaring, declaring_key, subst) = match seen {
            Some(class) => {
                let subst = class_substitution(symbols, &class);
                let declaring = Type::Class(class);
                let declaring_key = key::type_key(symbols, &declaring)?;
                (declaring, declaring_key, Some(subst))
            }
            None => {
                let (declaring, declaring_key) = self.declaration_type(def.owner)?;
                (declaring, declaring_key, None)
            }
        };
        let key = key::method_key(symbols, method, &declaring_key)?;
        let apply = |ty: &Type| match &subst {
            Some(subst) => substitute(ty, subst),
            None => ty.clone(),
        };
        let interned = key.clone();
        let id = self.bindings.intern(BindingKind::Method, &interned, || {
            Some(BindingData::Method(Arc::new(MethodData {
                origin: MethodOrigin::Declared(method),
                params: def.params.iter().map(apply).collect(),
                ret: apply(&def.return_type),
                thrown: def.thrown.iter().map(apply).collect(),
                declaring,
                key,
            })))
        })?;
        Some(MethodBinding::new(self, id))
    }

    /// The method implemented by lambda `expr`. `None` when the target type
    /// is unknown or not a functional interface, or the parameter count
    /// does not match its method.
    pub(crate) fn lambda_binding(&self, expr: ExprId) -> Option<MethodBinding<'_>> {
        let symbols = self.symbols();
        let lambda = self.unit().exprs.get(expr)?;
        let ExprKind::Lambda { params, .. } = &lambda.kind else {
            return None;
        };
        let sam = functional_interface_method(symbols, lambda.ty.as_ref()?)?;
        if sam.params.len() != params.len() {
            return None;
        }
        let param_types = params
            .iter()
            .zip(&sam.params)
            .map(|(param, fallback)| {
                self.unit()
                    .vars
                    .get(*param)
                    .and_then(|decl| decl.symbol)
                    .and_then(|var| symbols.var_def(var))
                    .map(|var| &var.ty)
                    .filter(|ty| !ty.is_errorish())
                    .unwrap_or(fallback)
                    .clone()
            })
            .collect::<Vec<_>>();

        let site = lambda.span.start as u32;
        let owner = self.enclosing_class_at(lambda.span.start)?;
        let (declaring, owner_key) = self.declaration_type(owner)?;
        let key = key::lambda_key(symbols, &owner_key, site, &param_types, &sam.return_type)?;
        let interned = key.clone();
        let id = self.bindings.intern(BindingKind::Method, &interned, || {
            Some(BindingData::Method(Arc::new(MethodData {
                origin: MethodOrigin::Lambda {
                    expr,
                    sam: sam.method,
                    site,
                    outer_locals: self.captured_locals(expr),
                },
                declaring,
                params: param_types,
                ret: sam.return_type,
                thrown: sam.thrown,
                key,
            })))
        })?;
        Some(MethodBinding::new(self, id))
    }

    /// Innermost class declared in this unit whose source contains `offset`.
    fn enclosing_class_at(&self, offset: usize) -> Option<ClassId> {
        self.unit()
            .classes
            .iter()
            .filter(|(_, class)| class.span.contains(offset))
            .min_by_key(|(_, class)| class.span.len())
            .and_then(|(_, class)| class.symbol)
    }

    /// Locals declared outside lambda `expr` and referenced inside it,
    /// ordered by first reference.
    pub(crate) fn captured_locals(&self, expr: ExprId) -> Vec<VarId> {
        let unit = self.unit();
        let Some(lambda) = unit.exprs.get(expr) else {
            return Vec::new();
        };
        let inside = |offset: usize| lambda.span.start <= offset && offset < lambda.span.end;
        let mut references: Vec<(usize, VarId)> = unit
            .exprs
            .iter()
            .filter(|(_, e)| inside(e.span.start))
            .filter_map(|(_, e)| match &e.kind {
                ExprKind::Name(name) => {
                    let first = name.segments.first()?;
                    match first.resolution {
                        nova_hir::Resolution::Var(var) => Some((first.span.start, var)),
                        _ => None,
                    }
                }
                _ => None,
            })
            .filter(|(_, var)| {
                self.symbols().var_def(*var).is_some_and(|def| {
                    def.kind.is_local_like()
                        && def.decl_offset.is_some_and(|at| !inside(at as usize))
                })
            })
            .collect();
        references.sort_by_key(|(offset, _)| *offset);
        let mut captured: Vec<VarId> = Vec::new();
        for (_, var) in references {
            if !captured.contains(&var) {
                captured.push(var);
            }
        }
        captured
    }

    fn synthetic_outer_local(&self, var: VarId, lambda_key: &str) -> Option<VariableBinding<'_>> {
        let def = self.symbols().var_def(var)?;
        let name = format!("val${}", def.name);
        let key = format!("{lambda_key}#{name}");
        let interned = key.clone();
        let id = self.bindings.intern(BindingKind::Variable, &interned, || {
            Some(BindingData::Variable(Arc::new(VariableData {
                var,
                ty: def.ty.clone(),
                key,
                synthetic_name: Some(name),
            })))
        })?;
        Some(VariableBinding::new(self, id))
    }
}
