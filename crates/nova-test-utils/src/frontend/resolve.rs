//! Entering declarations: classes, members, imports, type references and
//! annotations.

use std::collections::{HashMap, HashSet};

use nova_hir::{
    AnnotationId, AnnotationKind, ClassDeclId, Member, MethodDeclId, ModuleDirectiveKind, NameRef,
    Resolution, TypeParamDecl, TypeRefId, TypeRefKind, VarDeclId, WildcardBoundKind,
};
use nova_types::{
    with_annotations, AnnotationInstance, ClassDef, ClassId, ClassKind, ClassNesting, MethodDef,
    MethodId, ModuleDef, Modifiers, PrimitiveType, Type, TypeParamDef, TypeParamOwner, TypeVarId,
    VarDef, VarId, VarKind, WildcardBound,
};

use super::{AnnotationSlot, Attributor, Scope};

impl Attributor {
    // --- context ------------------------------------------------------------

    pub(super) fn current_class(&self) -> Option<ClassId> {
        self.cx.classes.last().map(|(_, class)| *class)
    }

    /// Run `f` inside the body of class `decl`. Type variables of the class
    /// come into scope; method and lambda context is reset.
    pub(super) fn in_class<R>(&mut self, decl: ClassDeclId, f: impl FnOnce(&mut Self) -> R) -> R {
        let Some(class) = self.unit.classes[decl].symbol else {
            return f(self);
        };
        let type_vars = self.type_var_names(
            self.symbols
                .class_def(class)
                .map(|def| def.type_params.clone())
                .unwrap_or_default(),
        );
        let saved = self.cx.clone();
        self.cx.classes.push((decl, class));
        self.cx.method = None;
        self.cx.lambdas.clear();
        self.cx.returns.clear();
        self.cx.type_vars.push(type_vars);
        let result = f(self);
        self.cx = saved;
        result
    }

    pub(super) fn type_var_names(&self, vars: Vec<TypeVarId>) -> HashMap<String, TypeVarId> {
        vars.into_iter()
            .filter_map(|tv| Some((self.symbols.type_param_def(tv)?.name.clone(), tv)))
            .collect()
    }

    pub(super) fn object_type(&self) -> Type {
        self.symbols
            .well_known_types()
            .map_or(Type::Unknown, |wk| Type::class(wk.object, Vec::new()))
    }

    pub(super) fn jdk_type(&self, name: &str) -> Type {
        self.symbols
            .class_id(name)
            .map_or_else(|| Type::Named(name.to_string()), |id| Type::class(id, Vec::new()))
    }

    /// The class as seen from inside its own body: parameterized by its own
    /// type variables.
    pub(super) fn declared_type(&self, class: ClassId) -> Type {
        let args = self
            .symbols
            .class_def(class)
            .map(|def| def.type_params.iter().map(|tv| Type::type_var(*tv)).collect())
            .unwrap_or_default();
        Type::class(class, args)
    }

    fn outermost(&self, mut class: ClassId) -> ClassId {
        while let Some(outer) = self.symbols.class_def(class).and_then(|def| def.enclosing) {
            class = outer;
        }
        class
    }

    // --- package, module, imports -------------------------------------------

    pub(super) fn enter_package_and_module(&mut self) {
        if let Some(mut package) = self.unit.package.take() {
            let mut prefix = String::new();
            for segment in &mut package.name.segments {
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(segment.name.as_str());
                segment.resolution = Resolution::Package(self.symbols.intern_package(&prefix));
            }
            self.package = prefix;
            package.symbol = Some(self.symbols.intern_package(&self.package));
            self.unit.package = Some(package);
        }

        if let Some(mut module) = self.unit.module.take() {
            let id = self.symbols.add_module(ModuleDef {
                name: module.name.to_dotted(),
                open: module.open,
            });
            module.symbol = Some(id);
            if let Some(last) = module.name.segments.last_mut() {
                last.resolution = Resolution::Module(id);
            }
            for directive in &mut module.directives {
                match &mut directive.kind {
                    ModuleDirectiveKind::Exports { package, .. }
                    | ModuleDirectiveKind::Opens { package, .. } => self.resolve_package_name(package),
                    ModuleDirectiveKind::Uses { service } => self.resolve_type_name(service),
                    ModuleDirectiveKind::Provides { service, with } => {
                        self.resolve_type_name(service);
                        for name in with {
                            self.resolve_type_name(name);
                        }
                    }
                    ModuleDirectiveKind::Requires { .. } => {}
                }
            }
            self.unit.module = Some(module);
        }
    }

    fn resolve_package_name(&mut self, name: &mut NameRef) {
        let mut prefix = String::new();
        for segment in &mut name.segments {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment.name.as_str());
            if self.symbols.package_exists(&prefix) {
                segment.resolution = Resolution::Package(self.symbols.intern_package(&prefix));
            }
        }
    }

    /// Resolve a dotted name that denotes a type, filling in every segment.
    pub(super) fn resolve_type_name(&mut self, name: &mut NameRef) {
        let names: Vec<String> = name
            .segments
            .iter()
            .map(|segment| segment.name.as_str().to_string())
            .collect();
        let (resolutions, _) = self.resolve_type_path(&names);
        for (segment, resolution) in name.segments.iter_mut().zip(resolutions) {
            segment.resolution = resolution;
        }
    }

    pub(super) fn enter_imports(&mut self) {
        let mut imports = std::mem::take(&mut self.unit.imports);
        for import in &mut imports {
            let names: Vec<String> = import
                .name
                .segments
                .iter()
                .map(|segment| segment.name.as_str().to_string())
                .collect();
            let dotted = names.join(".");
            if import.is_static {
                let (type_names, member) = if import.is_star {
                    (&names[..], None)
                } else {
                    let (last, rest) = names.split_last().map_or((None, &names[..0]), |(l, r)| (Some(l), r));
                    (rest, last)
                };
                let (mut resolutions, ty) = self.resolve_type_path(type_names);
                let class = ty.as_ref().and_then(Type::class_id);
                match (class, member) {
                    (Some(class), Some(member)) => {
                        let resolution = self
                            .find_field(class, member)
                            .map(Resolution::Var)
                            .or_else(|| {
                                self.methods_named(class, member)
                                    .first()
                                    .copied()
                                    .map(Resolution::Method)
                            })
                            .or_else(|| {
                                self.find_member_type(class, member)
                                    .map(|ty| Resolution::Type(Type::class(ty, Vec::new())))
                            })
                            .unwrap_or_default();
                        resolutions.push(resolution);
                        self.imports.static_single.push((class, member.clone()));
                    }
                    (Some(class), None) => self.imports.static_on_demand.push(class),
                    (None, Some(_)) => resolutions.push(Resolution::Unresolved),
                    (None, None) => {}
                }
                for (segment, resolution) in import.name.segments.iter_mut().zip(resolutions) {
                    segment.resolution = resolution;
                }
            } else if import.is_star {
                let (resolutions, ty) = self.resolve_type_path(&names);
                let resolved_package = self.symbols.package_exists(&dotted);
                for (segment, resolution) in import.name.segments.iter_mut().zip(resolutions) {
                    segment.resolution = resolution;
                }
                if ty.is_some() || resolved_package {
                    self.imports.on_demand.push(dotted);
                }
            } else {
                let (resolutions, ty) = self.resolve_type_path(&names);
                for (segment, resolution) in import.name.segments.iter_mut().zip(resolutions) {
                    segment.resolution = resolution;
                }
                if let (Some(class), Some(simple)) = (ty.as_ref().and_then(Type::class_id), names.last()) {
                    self.imports.single.push((simple.clone(), class));
                }
            }
        }
        self.unit.imports = imports;
    }

    // --- type lookup --------------------------------------------------------

    /// A class or type variable named `name` in the current scope.
    pub(super) fn lookup_type(&self, name: &str) -> Option<Type> {
        for scope in self.scopes.iter().rev() {
            if let Some(class) = scope.classes.get(name) {
                return Some(Type::class(*class, Vec::new()));
            }
        }
        for vars in self.cx.type_vars.iter().rev() {
            if let Some(tv) = vars.get(name) {
                return Some(Type::type_var(*tv));
            }
        }
        for (_, class) in self.cx.classes.iter().rev() {
            if self.symbols.class_def(*class).is_some_and(|def| def.name == name) {
                return Some(Type::class(*class, Vec::new()));
            }
            if let Some(member) = self.find_member_type(*class, name) {
                return Some(Type::class(member, Vec::new()));
            }
        }
        if let Some((_, class)) = self.imports.single.iter().find(|(simple, _)| simple == name) {
            return Some(Type::class(*class, Vec::new()));
        }
        let in_package = if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.package)
        };
        let top_level = |id: ClassId| {
            self.symbols
                .class_def(id)
                .is_some_and(|def| def.nesting == ClassNesting::TopLevel)
        };
        if let Some(class) = self.symbols.class_id(&in_package).filter(|id| top_level(*id)) {
            return Some(Type::class(class, Vec::new()));
        }
        for prefix in &self.imports.on_demand {
            if let Some(class) = self.symbols.class_id(&format!("{prefix}.{name}")) {
                return Some(Type::class(class, Vec::new()));
            }
        }
        self.symbols
            .class_id(&format!("java.lang.{name}"))
            .map(|class| Type::class(class, Vec::new()))
    }

    /// Member type `name` of `class` or one of its supertypes.
    pub(super) fn find_member_type(&self, class: ClassId, name: &str) -> Option<ClassId> {
        let mut seen = HashSet::new();
        let mut queue = vec![class];
        while let Some(current) = queue.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(member) = self.symbols.member_type(current, name) {
                return Some(member);
            }
            queue.extend(self.direct_supertypes(current));
        }
        None
    }

    pub(super) fn direct_supertypes(&self, class: ClassId) -> Vec<ClassId> {
        let Some(def) = self.symbols.class_def(class) else {
            return Vec::new();
        };
        def.super_class
            .iter()
            .chain(&def.interfaces)
            .filter_map(Type::class_id)
            .collect()
    }

    /// Resolve `a.b.C.D` as a type: a leading type in scope, or a package
    /// prefix followed by a top-level class, then member types.
    pub(super) fn resolve_type_path(&mut self, names: &[String]) -> (Vec<Resolution>, Option<Type>) {
        let mut resolutions = Vec::with_capacity(names.len());
        let mut current: Option<Type> = None;
        let mut rest = names;

        if let Some((first, tail)) = names.split_first() {
            if let Some(ty) = self.lookup_type(first) {
                resolutions.push(Resolution::Type(ty.clone()));
                current = Some(ty);
                rest = tail;
            } else {
                let mut prefix = String::new();
                let mut consumed = 0;
                for name in names {
                    let candidate = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}.{name}")
                    };
                    consumed += 1;
                    if !prefix.is_empty() {
                        let top_level = self.symbols.class_id(&candidate).filter(|id| {
                            self.symbols
                                .class_def(*id)
                                .is_some_and(|def| def.nesting == ClassNesting::TopLevel)
                        });
                        if let Some(class) = top_level {
                            resolutions.push(Resolution::Type(Type::class(class, Vec::new())));
                            current = Some(Type::class(class, Vec::new()));
                            break;
                        }
                    }
                    if self.symbols.package_exists(&candidate) {
                        resolutions.push(Resolution::Package(self.symbols.intern_package(&candidate)));
                    } else {
                        resolutions.push(Resolution::Unresolved);
                    }
                    prefix = candidate;
                }
                rest = &names[consumed..];
                if current.is_none() {
                    return (resolutions, None);
                }
            }
        }

        for name in rest {
            let member = current
                .as_ref()
                .and_then(Type::class_id)
                .and_then(|class| self.find_member_type(class, name));
            match member {
                Some(member) => {
                    let ty = Type::class(member, Vec::new());
                    resolutions.push(Resolution::Type(ty.clone()));
                    current = Some(ty);
                }
                None => {
                    resolutions.push(Resolution::Unresolved);
                    current = None;
                }
            }
        }
        (resolutions, current)
    }

    // --- type references ----------------------------------------------------

    /// Resolved annotations of `annotations` written at `slot`.
    fn annotations_at(&mut self, annotations: &[AnnotationId], slot: AnnotationSlot) -> Vec<AnnotationInstance> {
        annotations
            .iter()
            .filter(|id| self.slots.get(*id) == Some(&slot))
            .copied()
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|id| self.resolve_annotation(id))
            .collect()
    }

    /// Resolve type reference `id`, record the result on it and return it.
    /// The varargs level is not part of the result.
    pub(super) fn resolve_type_ref(&mut self, id: TypeRefId) -> Type {
        let type_ref = self.unit.type_refs[id].clone();
        let element = match &type_ref.kind {
            TypeRefKind::Primitive(prim) => Type::Primitive(
                *prim,
                self.annotations_at(&type_ref.annotations, AnnotationSlot::Segment(0)),
            ),
            TypeRefKind::Void => Type::Void,
            TypeRefKind::Var | TypeRefKind::Missing => Type::Unknown,
            TypeRefKind::Named(segments) => {
                let names: Vec<String> = segments
                    .iter()
                    .map(|segment| segment.name.as_str().to_string())
                    .collect();
                let (resolutions, raw) = self.resolve_type_path(&names);
                let mut args = Vec::new();
                for (idx, segment) in segments.iter().enumerate() {
                    if let Some(segment_args) = &segment.args {
                        let resolved: Vec<Type> =
                            segment_args.iter().map(|arg| self.resolve_type_ref(*arg)).collect();
                        if idx + 1 == segments.len() {
                            args = resolved;
                        }
                    }
                }
                if let TypeRefKind::Named(segments) = &mut self.unit.type_refs[id].kind {
                    for (segment, resolution) in segments.iter_mut().zip(resolutions) {
                        segment.resolution = resolution;
                    }
                }
                let annotations: Vec<AnnotationInstance> = (0..segments.len())
                    .flat_map(|idx| self.annotations_at(&type_ref.annotations, AnnotationSlot::Segment(idx)))
                    .collect();
                let base = match raw {
                    Some(Type::Class(class)) => Type::class(class.def, args),
                    Some(other) => other,
                    None => Type::Named(names.join(".")),
                };
                if annotations.is_empty() {
                    base
                } else {
                    with_annotations(&base, annotations)
                }
            }
            TypeRefKind::Wildcard(bound) => {
                let bound = match bound {
                    None => WildcardBound::Unbounded,
                    Some((WildcardBoundKind::Extends, ty)) => {
                        WildcardBound::Extends(Box::new(self.resolve_type_ref(*ty)))
                    }
                    Some((WildcardBoundKind::Super, ty)) => {
                        WildcardBound::Super(Box::new(self.resolve_type_ref(*ty)))
                    }
                };
                Type::Wildcard(
                    bound,
                    self.annotations_at(&type_ref.annotations, AnnotationSlot::Segment(0)),
                )
            }
            TypeRefKind::Intersection(parts) => {
                Type::Intersection(parts.iter().map(|part| self.resolve_type_ref(*part)).collect())
            }
            TypeRefKind::Union(parts) => {
                Type::Union(parts.iter().map(|part| self.resolve_type_ref(*part)).collect())
            }
        };
        let mut ty = element;
        for dim in (0..type_ref.dims).rev() {
            let annotations = self.annotations_at(&type_ref.annotations, AnnotationSlot::Dimension(dim));
            ty = Type::Array(Box::new(ty), annotations);
        }
        if !matches!(type_ref.kind, TypeRefKind::Var) {
            self.unit.type_refs[id].ty = Some(ty.clone());
        }
        ty
    }

    /// Wrap `base` in the extra dimensions written after a declarator; the
    /// extra dimensions are the outermost levels.
    pub(super) fn with_extra_dims(&mut self, base: Type, dims: usize, annotations: &[AnnotationId]) -> Type {
        let mut ty = base;
        for dim in (0..dims).rev() {
            let level = self.annotations_at(annotations, AnnotationSlot::Dimension(dim));
            ty = Type::Array(Box::new(ty), level);
        }
        ty
    }

    /// Declared type of a variable: its type reference, the varargs level
    /// and extra dimensions.
    pub(super) fn declared_var_type(&mut self, var: VarDeclId, base: Option<Type>) -> Type {
        let decl = self.unit.vars[var].clone();
        let mut ty = match (base, decl.ty) {
            (Some(base), _) => base,
            (None, Some(ty)) => self.resolve_type_ref(ty),
            (None, None) => Type::Unknown,
        };
        if let Some(type_ref) = decl.ty.map(|ty| self.unit.type_refs[ty].clone()) {
            if type_ref.varargs {
                let annotations = self.annotations_at(&type_ref.annotations, AnnotationSlot::Varargs);
                ty = Type::Array(Box::new(ty), annotations);
            }
        }
        self.with_extra_dims(ty, decl.extra_dims, &decl.extra_dim_annotations)
    }

    // --- annotations --------------------------------------------------------

    pub(super) fn resolve_annotations(&mut self, ids: &[AnnotationId]) -> Vec<AnnotationInstance> {
        ids.iter().filter_map(|id| self.resolve_annotation(*id)).collect()
    }

    pub(super) fn is_deprecated(&self, annotations: &[AnnotationInstance]) -> bool {
        let Some(deprecated) = self.symbols.well_known_types().map(|wk| wk.deprecated) else {
            return false;
        };
        annotations.iter().any(|annotation| annotation.ty == deprecated)
    }

    /// Resolve annotation `id`, attributing its member values. `None` when
    /// the annotation type is unknown.
    pub(super) fn resolve_annotation(&mut self, id: AnnotationId) -> Option<AnnotationInstance> {
        if let Some(resolved) = &self.unit.annotations[id].resolved {
            return Some(resolved.clone());
        }
        let mut name = self.unit.annotations[id].name.clone();
        self.resolve_type_name(&mut name);
        let ty = match name.resolution() {
            Resolution::Type(Type::Class(class)) => Some(class.def),
            _ => None,
        };
        self.unit.annotations[id].name = name;
        let ty = ty?;

        let mut values = Vec::new();
        let kind = self.unit.annotations[id].kind.clone();
        match kind {
            AnnotationKind::Marker => {}
            AnnotationKind::SingleMember(value) => {
                let expected = self.annotation_element(ty, "value").map(|(_, ty)| ty);
                self.attribute_expr(value, expected.as_ref());
                if let Some(value) = self.const_value(value, expected.as_ref()) {
                    values.push(("value".to_string(), value));
                }
            }
            AnnotationKind::Normal(mut pairs) => {
                for pair in &mut pairs {
                    let element = self.annotation_element(ty, pair.name.as_str());
                    pair.method = element.as_ref().map(|(method, _)| *method);
                    let expected = element.map(|(_, ty)| ty);
                    self.attribute_expr(pair.value, expected.as_ref());
                    if let Some(value) = self.const_value(pair.value, expected.as_ref()) {
                        values.push((pair.name.as_str().to_string(), value));
                    }
                }
                self.unit.annotations[id].kind = AnnotationKind::Normal(pairs);
            }
        }
        let instance = AnnotationInstance { ty, values };
        self.unit.annotations[id].resolved = Some(instance.clone());
        Some(instance)
    }

    fn annotation_element(&self, annotation: ClassId, name: &str) -> Option<(MethodId, Type)> {
        let def = self.symbols.class_def(annotation)?;
        def.methods.iter().find_map(|method| {
            let method_def = self.symbols.method_def(*method)?;
            (method_def.name == name && method_def.params.is_empty())
                .then(|| (*method, method_def.return_type.clone()))
        })
    }

    // --- classes ------------------------------------------------------------

    /// Create the symbol of class `decl` and of the member classes nested
    /// in it. `enclosing` is `None` for top-level classes.
    pub(super) fn declare_class(&mut self, decl: ClassDeclId, enclosing: Option<ClassId>) -> ClassId {
        let class = self.unit.classes[decl].clone();
        let nesting = match enclosing {
            None => ClassNesting::TopLevel,
            Some(_) if class.is_anonymous => ClassNesting::Anonymous,
            Some(_) if self.cx.method.is_some() || !self.scopes.is_empty() => ClassNesting::Local,
            Some(_) => ClassNesting::Member,
        };
        let name = class.name.as_str().to_string();
        let binary_name = match (nesting, enclosing) {
            (ClassNesting::TopLevel, _) | (_, None) => {
                if self.package.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{name}", self.package)
                }
            }
            (ClassNesting::Member, Some(outer)) => format!("{}${name}", self.binary_name(outer)),
            (_, Some(outer)) => {
                let top = self.outermost(outer);
                let counter = self.class_counters.entry((top, name.clone())).or_insert(0);
                *counter += 1;
                let index = *counter;
                format!("{}${index}{name}", self.binary_name(outer))
            }
        };

        let mut def = ClassDef::new(name, binary_name, class.kind);
        def.modifiers = class.modifiers.flags;
        if class.kind.is_interface_like() {
            def.modifiers |= Modifiers::ABSTRACT;
        }
        def.nesting = nesting;
        def.enclosing = enclosing;
        if matches!(nesting, ClassNesting::Local | ClassNesting::Anonymous) {
            def.enclosing_method = self.cx.method;
        }
        def.from_source = true;
        let id = self.symbols.add_class(def);
        self.unit.classes[decl].symbol = Some(id);
        tracing::trace!(binary_name = %self.binary_name(id), "declared class");

        let saved = std::mem::take(&mut self.scopes);
        let saved_method = self.cx.method.take();
        for member in &class.members {
            if let Member::Class(member) = member {
                self.declare_class(*member, Some(id));
            }
        }
        self.scopes = saved;
        self.cx.method = saved_method;
        id
    }

    fn binary_name(&self, class: ClassId) -> String {
        self.symbols
            .class_def(class)
            .map(|def| def.binary_name.clone())
            .unwrap_or_default()
    }

    /// Create type variables for `params`; bounds are resolved separately
    /// once the variables are in scope.
    fn declare_type_params(&mut self, params: &[TypeParamDecl], owner: TypeParamOwner) -> Vec<TypeVarId> {
        params
            .iter()
            .map(|param| {
                self.symbols.add_type_param(TypeParamDef {
                    name: param.name.as_str().to_string(),
                    owner,
                    upper_bounds: Vec::new(),
                    lower_bound: None,
                    annotations: Vec::new(),
                })
            })
            .collect()
    }

    fn resolve_type_param_bounds(&mut self, params: &[TypeParamDecl], vars: &[TypeVarId]) {
        for (param, tv) in params.iter().zip(vars) {
            let mut bounds: Vec<Type> = param
                .bounds
                .iter()
                .map(|bound| self.resolve_type_ref(*bound))
                .collect();
            if bounds.is_empty() {
                bounds.push(self.object_type());
            }
            let annotations = self.resolve_annotations(&param.annotations);
            let def = self.symbols.type_param_mut(*tv);
            def.upper_bounds = bounds;
            def.annotations = annotations;
        }
    }

    fn set_type_param_symbols(&mut self, params: &mut [TypeParamDecl], vars: &[TypeVarId]) {
        for (param, tv) in params.iter_mut().zip(vars) {
            param.symbol = Some(*tv);
        }
    }

    /// Type parameters, supertypes and annotations of class `decl` and its
    /// member classes.
    pub(super) fn enter_class_header(&mut self, decl: ClassDeclId) {
        let Some(class) = self.unit.classes[decl].symbol else {
            return;
        };
        let mut type_params = std::mem::take(&mut self.unit.classes[decl].type_params);
        let vars = self.declare_type_params(&type_params, TypeParamOwner::Class(class));
        self.set_type_param_symbols(&mut type_params, &vars);
        self.unit.classes[decl].type_params = type_params.clone();

        let header = self.unit.classes[decl].clone();
        self.in_class(decl, |this| {
            this.resolve_type_param_bounds(&type_params, &vars);
            let extends: Vec<Type> = header.extends.iter().map(|ty| this.resolve_type_ref(*ty)).collect();
            let implements: Vec<Type> =
                header.implements.iter().map(|ty| this.resolve_type_ref(*ty)).collect();
            for permitted in &header.permits {
                this.resolve_type_ref(*permitted);
            }
            let (super_class, interfaces) = match header.kind {
                ClassKind::Interface | ClassKind::Annotation => (None, extends),
                ClassKind::Enum => (
                    this.symbols
                        .class_id("java.lang.Enum")
                        .map(|def| Type::class(def, vec![Type::class(class, Vec::new())])),
                    implements,
                ),
                ClassKind::Record => (Some(this.jdk_type("java.lang.Record")), implements),
                ClassKind::Class => (
                    Some(extends.into_iter().next().unwrap_or_else(|| this.object_type())),
                    implements,
                ),
            };
            let annotations = this.resolve_annotations(&header.modifiers.annotations);
            let deprecated = this.is_deprecated(&annotations);
            let def = this.symbols.class_mut(class);
            def.super_class = super_class;
            def.interfaces = interfaces;
            def.annotations = annotations;
            def.deprecated = deprecated;

            for member in &header.members {
                if let Member::Class(member) = member {
                    this.enter_class_header(*member);
                }
            }
        });
    }

    /// Fields, methods, enum constants, record components and implicit
    /// members of class `decl` and its member classes.
    pub(super) fn enter_class_members(&mut self, decl: ClassDeclId) {
        let Some(class) = self.unit.classes[decl].symbol else {
            return;
        };
        let header = self.unit.classes[decl].clone();
        self.in_class(decl, |this| {
            let interface = header.kind.is_interface_like();
            let mut components = Vec::new();
            for component in &header.record_components {
                let ty = this.declared_var_type(*component, None);
                let decl_var = this.unit.vars[*component].clone();
                let annotations = match &decl_var.modifiers {
                    Some(modifiers) => this.resolve_annotations(&modifiers.annotations),
                    None => Vec::new(),
                };
                let name = decl_var.name.as_str().to_string();
                let mut def = VarDef::new(name.clone(), ty.clone(), VarKind::RecordComponent);
                def.declaring_class = Some(class);
                def.decl_offset = Some(decl_var.name.span.start as u32);
                def.deprecated = this.is_deprecated(&annotations);
                def.annotations = annotations;
                let var = this.symbols.add_var(def);
                this.unit.vars[*component].symbol = Some(var);

                let mut field = VarDef::new(name.clone(), ty.clone(), VarKind::Field);
                field.modifiers = Modifiers::PRIVATE | Modifiers::FINAL;
                field.declaring_class = Some(class);
                this.symbols.add_var(field);
                components.push((name, ty));
            }

            for (idx, constant) in header.enum_constants.iter().enumerate() {
                let annotations = this.resolve_annotations(&constant.modifiers.annotations);
                let mut def = VarDef::new(
                    constant.name.as_str(),
                    Type::class(class, Vec::new()),
                    VarKind::EnumConstant,
                );
                def.modifiers = Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
                def.declaring_class = Some(class);
                def.decl_offset = Some(constant.name.span.start as u32);
                def.deprecated = this.is_deprecated(&annotations);
                def.annotations = annotations;
                let var = this.symbols.add_var(def);
                this.unit.classes[decl].enum_constants[idx].symbol = Some(var);
            }

            let mut has_ctor = false;
            for member in &header.members {
                match member {
                    Member::Field(field) => this.enter_field(*field, class, interface),
                    Member::Method(method) => {
                        has_ctor |= this.unit.methods[*method].is_constructor;
                        this.enter_method(*method, class, header.kind);
                    }
                    Member::Class(_) | Member::Initializer { .. } => {}
                }
            }
            this.enter_implicit_members(class, &header.kind, has_ctor, &components);

            for member in &header.members {
                if let Member::Class(member) = member {
                    this.enter_class_members(*member);
                }
            }
        });
    }

    fn enter_field(&mut self, field: nova_hir::FieldDeclId, class: ClassId, interface: bool) {
        let field_decl = self.unit.fields[field].clone();
        let base = self.resolve_type_ref(field_decl.ty);
        let annotations = self.resolve_annotations(&field_decl.modifiers.annotations);
        let deprecated = self.is_deprecated(&annotations);
        let mut modifiers = field_decl.modifiers.flags;
        if interface {
            modifiers |= Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
        }
        for declarator in &field_decl.declarators {
            let ty = self.declared_var_type(*declarator, Some(base.clone()));
            let decl = &self.unit.vars[*declarator];
            let mut def = VarDef::new(decl.name.as_str(), ty, VarKind::Field);
            def.modifiers = modifiers;
            def.declaring_class = Some(class);
            def.decl_offset = Some(decl.name.span.start as u32);
            def.annotations = annotations.clone();
            def.deprecated = deprecated;
            let var = self.symbols.add_var(def);
            self.unit.vars[*declarator].symbol = Some(var);
        }
    }

    fn enter_method(&mut self, decl: MethodDeclId, class: ClassId, kind: ClassKind) -> MethodId {
        let method = self.unit.methods[decl].clone();
        let name = if method.is_constructor {
            "<init>".to_string()
        } else {
            method.name.as_str().to_string()
        };
        let id = self.symbols.add_method(MethodDef::new(name, class, Type::Void));
        self.unit.methods[decl].symbol = Some(id);

        let mut type_params = method.type_params.clone();
        let vars = self.declare_type_params(&type_params, TypeParamOwner::Method(id));
        self.set_type_param_symbols(&mut type_params, &vars);
        self.unit.methods[decl].type_params = type_params.clone();
        let names = self.type_var_names(vars.clone());
        self.cx.type_vars.push(names);
        self.resolve_type_param_bounds(&type_params, &vars);

        let return_type = match method.return_type {
            Some(ty) => {
                let base = self.resolve_type_ref(ty);
                self.with_extra_dims(base, method.extra_dims, &method.extra_dim_annotations)
            }
            None => Type::Void,
        };
        let mut params = Vec::new();
        let mut param_names = Vec::new();
        let mut param_annotations = Vec::new();
        let mut is_varargs = false;
        if let Some(receiver) = &method.receiver {
            self.resolve_type_ref(receiver.ty);
        }
        for param in &method.params {
            let ty = self.declared_var_type(*param, None);
            let decl_var = self.unit.vars[*param].clone();
            is_varargs = decl_var
                .ty
                .is_some_and(|ty| self.unit.type_refs[ty].varargs);
            let (flags, annotations) = match &decl_var.modifiers {
                Some(modifiers) => (modifiers.flags, self.resolve_annotations(&modifiers.annotations)),
                None => (Modifiers::empty(), Vec::new()),
            };
            let mut def = VarDef::new(decl_var.name.as_str(), ty.clone(), VarKind::Parameter);
            def.modifiers = flags;
            def.declaring_class = Some(class);
            def.declaring_method = Some(id);
            def.decl_offset = Some(decl_var.name.span.start as u32);
            def.annotations = annotations.clone();
            let var = self.symbols.add_var(def);
            self.unit.vars[*param].symbol = Some(var);
            params.push(ty);
            param_names.push(decl_var.name.as_str().to_string());
            param_annotations.push(annotations);
        }
        if method.is_compact_ctor {
            for (name, ty) in self.record_components(class) {
                params.push(ty);
                param_names.push(name);
                param_annotations.push(Vec::new());
            }
        }
        let thrown: Vec<Type> = method.throws.iter().map(|ty| self.resolve_type_ref(*ty)).collect();
        let annotations = self.resolve_annotations(&method.modifiers.annotations);
        self.cx.type_vars.pop();

        let mut modifiers = method.modifiers.flags;
        match kind {
            ClassKind::Interface => {
                if !modifiers.intersects(Modifiers::DEFAULT | Modifiers::STATIC | Modifiers::PRIVATE) {
                    modifiers |= Modifiers::PUBLIC | Modifiers::ABSTRACT;
                } else if !modifiers.contains(Modifiers::PRIVATE) {
                    modifiers |= Modifiers::PUBLIC;
                }
            }
            ClassKind::Annotation => modifiers |= Modifiers::PUBLIC | Modifiers::ABSTRACT,
            ClassKind::Enum if method.is_constructor => modifiers |= Modifiers::PRIVATE,
            _ => {}
        }

        let deprecated = self.is_deprecated(&annotations);
        let def = self.symbols.method_mut(id);
        def.modifiers = modifiers;
        def.return_type = return_type;
        def.params = params;
        def.param_names = param_names;
        def.param_annotations = param_annotations;
        def.thrown = thrown;
        def.is_constructor = method.is_constructor;
        def.is_varargs = is_varargs;
        def.annotations = annotations;
        def.deprecated = deprecated;
        def.from_source = true;
        id
    }

    fn record_components(&self, class: ClassId) -> Vec<(String, Type)> {
        self.symbols
            .vars()
            .filter(|(_, def)| def.kind == VarKind::RecordComponent && def.declaring_class == Some(class))
            .map(|(_, def)| (def.name.clone(), def.ty.clone()))
            .collect()
    }

    fn enter_implicit_members(
        &mut self,
        class: ClassId,
        kind: &ClassKind,
        has_ctor: bool,
        components: &[(String, Type)],
    ) {
        let declared: Vec<(String, Vec<Type>)> = self
            .symbols
            .class_def(class)
            .map(|def| def.methods.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|method| {
                let def = self.symbols.method_def(method)?;
                Some((def.name.clone(), def.params.clone()))
            })
            .collect();
        let visibility = self
            .symbols
            .class_def(class)
            .map_or(Modifiers::empty(), |def| def.modifiers & Modifiers::VISIBILITY);

        match kind {
            ClassKind::Class if !has_ctor => {
                self.add_implicit_method(class, "<init>", Vec::new(), Type::Void, visibility, true);
            }
            ClassKind::Enum => {
                if !has_ctor {
                    self.add_implicit_method(class, "<init>", Vec::new(), Type::Void, Modifiers::PRIVATE, true);
                }
                let this_type = Type::class(class, Vec::new());
                let string = self.jdk_type("java.lang.String");
                self.add_implicit_method(
                    class,
                    "values",
                    Vec::new(),
                    Type::array(this_type.clone()),
                    Modifiers::PUBLIC | Modifiers::STATIC,
                    false,
                );
                self.add_implicit_method(
                    class,
                    "valueOf",
                    vec![("name".to_string(), string)],
                    this_type,
                    Modifiers::PUBLIC | Modifiers::STATIC,
                    false,
                );
            }
            ClassKind::Record => {
                let canonical: Vec<Type> = components.iter().map(|(_, ty)| ty.clone()).collect();
                let has_canonical = declared
                    .iter()
                    .any(|(name, params)| name == "<init>" && *params == canonical);
                if !has_canonical {
                    self.add_implicit_method(
                        class,
                        "<init>",
                        components.to_vec(),
                        Type::Void,
                        visibility,
                        true,
                    );
                }
                for (name, ty) in components {
                    let has_accessor = declared
                        .iter()
                        .any(|(method, params)| method == name && params.is_empty());
                    if !has_accessor {
                        self.add_implicit_method(class, name, Vec::new(), ty.clone(), Modifiers::PUBLIC, false);
                    }
                }
            }
            _ => {}
        }
    }

    fn add_implicit_method(
        &mut self,
        class: ClassId,
        name: &str,
        params: Vec<(String, Type)>,
        return_type: Type,
        modifiers: Modifiers,
        is_constructor: bool,
    ) -> MethodId {
        let mut def = MethodDef::new(name, class, return_type);
        def.modifiers = modifiers;
        def.is_constructor = is_constructor;
        def.param_annotations = vec![Vec::new(); params.len()];
        let (names, types): (Vec<String>, Vec<Type>) = params.into_iter().unzip();
        def.param_names = names;
        def.params = types;
        def.from_source = true;
        self.symbols.add_method(def)
    }

    /// Declare a local or anonymous class met inside a body and enter all
    /// of it. Local classes become visible in the current block.
    pub(super) fn declare_body_class(&mut self, decl: ClassDeclId, supertype: Option<Type>) -> Option<ClassId> {
        let outer = self.current_class()?;
        let class = self.declare_class(decl, Some(outer));
        let name = self.unit.classes[decl].name.as_str().to_string();
        if !name.is_empty() {
            if let Some(scope) = self.scopes.last_mut() {
                scope.classes.insert(name, class);
            }
        }
        self.enter_class_header(decl);
        if let Some(supertype) = supertype {
            let is_interface = supertype
                .class_id()
                .and_then(|id| self.symbols.class_def(id))
                .is_some_and(|def| def.kind == ClassKind::Interface);
            let object = self.object_type();
            let def = self.symbols.class_mut(class);
            if is_interface {
                def.super_class = Some(object);
                def.interfaces = vec![supertype];
            } else {
                def.super_class = Some(supertype);
            }
        }
        self.enter_class_members(decl);
        Some(class)
    }

    /// Push a block scope for the duration of `f`.
    pub(super) fn in_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push(Scope::default());
        let result = f(self);
        self.scopes.pop();
        result
    }

    pub(super) fn bind_local(&mut self, name: &str, var: VarId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(name.to_string(), var);
        }
    }

    pub(super) fn primitive_class(&self, prim: PrimitiveType) -> Type {
        let name = match prim {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        };
        self.symbols
            .class_id(name)
            .map_or_else(|| self.object_type(), |id| Type::class(id, Vec::new()))
    }
}
