//! The unit header, type declarations and their members.

use nova_hir::{
    ClassDeclId, EnumConstantDecl, FieldDeclId, ImportDecl, Member, MethodDecl, MethodDeclId,
    ModuleDecl, ModuleDirectiveKind, PackageDecl, StmtId, TypeParamDecl, VarDeclId,
};
use nova_syntax::{JavaFeature, TokenKind};
use nova_types::{ClassId, ClassKind, Modifiers as Flags};

use super::{AnnotationOwner, Converter, Declared, Origin, Result};
use crate::ast::{
    AnnotationTypeDeclaration, AnnotationTypeMemberDeclaration, AnonymousClassDeclaration, Block,
    CompilationUnit, EnumConstantDeclaration, EnumDeclaration, ExportsDirective, FieldDeclaration,
    ImportDeclaration, Initializer, MethodDeclaration, ModuleDeclaration, ModuleModifier,
    ModuleModifierKeyword, NodeId, OpensDirective, PackageDeclaration, ProvidesDirective,
    RecordDeclaration, RequiresDirective, SimpleType, SingleVariableDeclaration, TypeDeclaration,
    TypeParameter, UsesDirective, VariableDeclarationFragment,
};
use crate::position::{end_offset, offset, text_range};

impl Converter<'_> {
    pub(super) fn convert_compilation_unit(&mut self) -> Result<NodeId> {
        let unit = self.unit;
        let package = match &unit.package {
            Some(package) => Some(self.convert_package(package)?),
            None => None,
        };
        let mut imports = Vec::with_capacity(unit.imports.len());
        for import in &unit.imports {
            imports.push(self.convert_import(import));
        }
        let module = match &unit.module {
            Some(module) => Some(self.convert_module(module)?),
            None => None,
        };
        let types = self.convert_all(&unit.types, |this, id| this.convert_class_declaration(id))?;

        let len = self.tracker.len();
        let root = self.alloc_range(
            CompilationUnit {
                package,
                imports,
                module,
                types,
            },
            text_range(unit.span.start, len),
        );
        self.mark_recovered(root, unit.recovered);
        Ok(root)
    }

    fn convert_package(&mut self, package: &PackageDecl) -> Result<NodeId> {
        let owner = package
            .symbol
            .map_or(AnnotationOwner::Unknown, AnnotationOwner::Package);
        let annotations = self.convert_annotations(&package.annotations, owner)?;
        let name = self.convert_name_ref(&package.name, None);
        let node = self.alloc(PackageDeclaration { annotations, name }, package.span);
        if let Some(symbol) = package.symbol {
            self.record(node, Origin::Package(symbol));
            self.declare(Declared::Package(symbol), node);
        }
        Ok(node)
    }

    fn convert_import(&mut self, import: &ImportDecl) -> NodeId {
        let name = self.convert_name_ref(&import.name, None);
        let node = self.alloc(
            ImportDeclaration {
                is_static: import.is_static,
                name,
                on_demand: import.is_star,
            },
            import.span,
        );
        self.record(
            node,
            Origin::Name {
                resolution: import.name.resolution().clone(),
                expr: None,
            },
        );
        if import.is_static {
            self.gate(node, JavaFeature::StaticImports);
        }
        node
    }

    fn convert_module(&mut self, module: &ModuleDecl) -> Result<NodeId> {
        let owner = module
            .symbol
            .map_or(AnnotationOwner::Unknown, AnnotationOwner::Module);
        let annotations = self.convert_annotations(&module.annotations, owner)?;
        let name = self.convert_name_ref(&module.name, None);

        let mut directives = Vec::with_capacity(module.directives.len());
        for directive in &module.directives {
            let node = match &directive.kind {
                ModuleDirectiveKind::Requires { modifiers, module } => {
                    let mut nodes = Vec::with_capacity(modifiers.len());
                    let mut unknown = Vec::new();
                    for modifier in modifiers {
                        let keyword = match modifier.as_str() {
                            "transitive" => ModuleModifierKeyword::Transitive,
                            "static" => ModuleModifierKeyword::Static,
                            other => {
                                unknown.push(other.to_string());
                                continue;
                            }
                        };
                        nodes.push(self.alloc(ModuleModifier { keyword }, modifier.span));
                    }
                    let name = self.convert_name_ref(module, None);
                    let node = self.alloc(
                        RequiresDirective {
                            modifiers: nodes,
                            name,
                        },
                        directive.span,
                    );
                    for word in unknown {
                        self.mark_malformed(node, format!("`{word}` is not a requires modifier"));
                    }
                    node
                }
                ModuleDirectiveKind::Exports { package, to } => {
                    let name = self.convert_name_ref(package, None);
                    let modules = to.iter().map(|m| self.convert_name_ref(m, None)).collect();
                    self.alloc(ExportsDirective { name, modules }, directive.span)
                }
                ModuleDirectiveKind::Opens { package, to } => {
                    let name = self.convert_name_ref(package, None);
                    let modules = to.iter().map(|m| self.convert_name_ref(m, None)).collect();
                    self.alloc(OpensDirective { name, modules }, directive.span)
                }
                ModuleDirectiveKind::Uses { service } => {
                    let name = self.convert_name_ref(service, None);
                    self.alloc(UsesDirective { name }, directive.span)
                }
                ModuleDirectiveKind::Provides { service, with } => {
                    let name = self.convert_name_ref(service, None);
                    let implementations = with.iter().map(|i| self.convert_name_ref(i, None)).collect();
                    self.alloc(
                        ProvidesDirective {
                            name,
                            implementations,
                        },
                        directive.span,
                    )
                }
            };
            directives.push(node);
        }

        let node = self.alloc(
            ModuleDeclaration {
                annotations,
                open: module.open,
                name,
                directives,
            },
            module.span,
        );
        if let Some(symbol) = module.symbol {
            self.record(node, Origin::Module(symbol));
            self.declare(Declared::Module(symbol), node);
        }
        self.gate(node, JavaFeature::Modules);
        Ok(node)
    }

    /// A named class, interface, enum, record or annotation type.
    pub(super) fn convert_class_declaration(&mut self, id: ClassDeclId) -> Result<NodeId> {
        self.classes.push(id);
        let node = self.convert_class_in_scope(id);
        self.classes.pop();
        node
    }

    fn convert_class_in_scope(&mut self, id: ClassDeclId) -> Result<NodeId> {
        let class = self.class(id)?;
        let owner = AnnotationOwner::class(class.symbol);
        let origin = class.symbol.map_or(Origin::Unresolved, Origin::Class);

        let modifiers = self.convert_modifiers(&class.modifiers, owner)?;
        let name = self.simple_name(&class.name, origin.clone());
        let type_parameters = self.convert_type_parameters(&class.type_params)?;
        let mut problems = Vec::new();

        let node = match class.kind {
            ClassKind::Class | ClassKind::Interface => {
                let is_interface = class.kind == ClassKind::Interface;
                let extends = self.convert_all(&class.extends, |this, ty| this.convert_type(ty))?;
                let implements = self.convert_all(&class.implements, |this, ty| this.convert_type(ty))?;
                let (superclass, mut super_interfaces) = if is_interface {
                    if !implements.is_empty() {
                        problems.push("an interface cannot implement other interfaces");
                    }
                    (None, extends)
                } else {
                    if extends.len() > 1 {
                        problems.push("a class extends at most one class");
                    }
                    let mut extends = extends.into_iter();
                    (extends.next(), extends.collect())
                };
                super_interfaces.extend(implements);
                let permitted_types = self.convert_all(&class.permits, |this, ty| this.convert_type(ty))?;
                let body = self.convert_members(&class.members)?;
                self.alloc(
                    TypeDeclaration {
                        modifiers,
                        is_interface,
                        name,
                        type_parameters,
                        superclass,
                        super_interfaces,
                        permitted_types,
                        body,
                    },
                    class.span,
                )
            }
            ClassKind::Enum => {
                if !type_parameters.is_empty() {
                    problems.push("an enum cannot declare type parameters");
                }
                let super_interfaces = self.convert_all(&class.implements, |this, ty| this.convert_type(ty))?;
                let mut constants = Vec::with_capacity(class.enum_constants.len());
                for constant in &class.enum_constants {
                    constants.push(self.convert_enum_constant(constant)?);
                }
                let body = self.convert_members(&class.members)?;
                self.alloc(
                    EnumDeclaration {
                        modifiers,
                        name,
                        super_interfaces,
                        constants,
                        body,
                    },
                    class.span,
                )
            }
            ClassKind::Record => {
                let components = self.convert_all(&class.record_components, |this, var| {
                    this.convert_single_var(var, false)
                })?;
                let super_interfaces = self.convert_all(&class.implements, |this, ty| this.convert_type(ty))?;
                let body = self.convert_members(&class.members)?;
                let node = self.alloc(
                    RecordDeclaration {
                        modifiers,
                        name,
                        type_parameters,
                        components,
                        super_interfaces,
                        body,
                    },
                    class.span,
                );
                self.gate(node, JavaFeature::Records);
                node
            }
            ClassKind::Annotation => {
                if !type_parameters.is_empty() {
                    problems.push("an annotation type cannot declare type parameters");
                }
                let body = self.convert_members(&class.members)?;
                let node = self.alloc(
                    AnnotationTypeDeclaration {
                        modifiers,
                        name,
                        body,
                    },
                    class.span,
                );
                self.gate(node, JavaFeature::Annotations);
                node
            }
        };

        self.record(node, origin);
        if let Some(symbol) = class.symbol {
            self.declare(Declared::Class(symbol), node);
        }
        for problem in problems {
            self.mark_malformed(node, problem);
        }
        let flags = class.modifiers.flags;
        if flags.intersects(Flags::SEALED | Flags::NON_SEALED) || !class.permits.is_empty() {
            self.gate(node, JavaFeature::SealedClasses);
        }
        if flags.contains(Flags::SEALED) && flags.contains(Flags::NON_SEALED) {
            self.mark_malformed(node, "both `sealed` and `non-sealed`");
        }
        self.mark_recovered(node, class.recovered);
        Ok(node)
    }

    /// The body of an anonymous class.
    pub(super) fn convert_anonymous_class(&mut self, id: ClassDeclId) -> Result<NodeId> {
        let class = self.class(id)?;
        self.classes.push(id);
        let body = self.convert_members(&class.members);
        self.classes.pop();

        let node = self.alloc(AnonymousClassDeclaration { body: body? }, class.body_span);
        if let Some(symbol) = class.symbol {
            self.record(node, Origin::Class(symbol));
            self.declare(Declared::Class(symbol), node);
        }
        self.mark_recovered(node, class.recovered);
        Ok(node)
    }

    fn convert_type_parameters(&mut self, params: &[TypeParamDecl]) -> Result<Vec<NodeId>> {
        params.iter().map(|param| self.convert_type_parameter(param)).collect()
    }

    fn convert_type_parameter(&mut self, param: &TypeParamDecl) -> Result<NodeId> {
        let owner = param
            .symbol
            .map_or(AnnotationOwner::Unknown, AnnotationOwner::TypeParam);
        let modifiers = self.convert_annotations(&param.annotations, owner)?;
        let origin = param.symbol.map_or(Origin::Unresolved, Origin::TypeParam);
        let name = self.simple_name(&param.name, origin.clone());
        let bounds = self.convert_all(&param.bounds, |this, ty| this.convert_type(ty))?;
        let node = self.alloc(
            TypeParameter {
                modifiers,
                name,
                bounds,
            },
            param.span,
        );
        self.record(node, origin);
        if let Some(symbol) = param.symbol {
            self.declare(Declared::TypeParam(symbol), node);
        }
        self.gate(node, JavaFeature::Generics);
        if !param.annotations.is_empty() {
            self.gate(node, JavaFeature::TypeAnnotations);
        }
        Ok(node)
    }

    fn convert_enum_constant(&mut self, constant: &EnumConstantDecl) -> Result<NodeId> {
        let modifiers = self.convert_modifiers(&constant.modifiers, AnnotationOwner::var(constant.symbol))?;
        let name = self.simple_name(
            &constant.name,
            constant.symbol.map_or(Origin::Unresolved, Origin::Var),
        );
        let arguments = match &constant.args {
            Some(args) => self.convert_all(args, |this, arg| this.convert_expr(arg))?,
            None => Vec::new(),
        };
        let anonymous_class = match constant.body {
            Some(body) => Some(self.convert_anonymous_class(body)?),
            None => None,
        };
        let node = self.alloc(
            EnumConstantDeclaration {
                modifiers,
                name,
                arguments,
                anonymous_class,
            },
            constant.span,
        );
        self.record(
            node,
            Origin::EnumConstant {
                var: constant.symbol,
                ctor: constant.ctor,
            },
        );
        if let Some(symbol) = constant.symbol {
            self.declare(Declared::Var(symbol), node);
        }
        Ok(node)
    }

    fn convert_members(&mut self, members: &[Member]) -> Result<Vec<NodeId>> {
        let in_annotation_type = self.current_class_kind() == Some(ClassKind::Annotation);
        let mut out = Vec::with_capacity(members.len());
        for member in members {
            let node = match member {
                Member::Field(id) => self.convert_field(*id)?,
                Member::Method(id) if in_annotation_type => self.convert_annotation_member(*id)?,
                Member::Method(id) => self.convert_method(*id)?,
                Member::Class(id) => self.convert_class_declaration(*id)?,
                Member::Initializer {
                    is_static: _,
                    modifiers,
                    body,
                    span,
                } => {
                    let owner = AnnotationOwner::class(self.current_class_symbol());
                    let modifiers = self.convert_modifiers(modifiers, owner)?;
                    let body = self.convert_body(*body)?;
                    self.alloc(Initializer { modifiers, body }, *span)
                }
            };
            out.push(node);
        }
        Ok(out)
    }

    fn current_class_kind(&self) -> Option<ClassKind> {
        let id = *self.classes.last()?;
        self.class(id).ok().map(|class| class.kind)
    }

    fn current_class_symbol(&self) -> Option<ClassId> {
        let id = *self.classes.last()?;
        self.class(id).ok().and_then(|class| class.symbol)
    }

    fn convert_field(&mut self, id: FieldDeclId) -> Result<NodeId> {
        let field = self.field(id)?;
        let first = match field.declarators.first() {
            Some(var) => self.var(*var)?.symbol,
            None => None,
        };
        let modifiers = self.convert_modifiers(&field.modifiers, AnnotationOwner::var(first))?;
        let ty = self.convert_type(field.ty)?;
        let fragments = self.convert_all(&field.declarators, |this, var| this.convert_fragment(var))?;
        let node = self.alloc(
            FieldDeclaration {
                modifiers,
                ty,
                fragments,
            },
            field.span,
        );
        if field.declarators.is_empty() {
            self.mark_malformed(node, "field declaration without declarators");
        }
        self.mark_recovered(node, field.recovered);
        Ok(node)
    }

    /// A declarator of a multi-variable declaration (field, local variable,
    /// `for` init) or an untyped lambda parameter.
    pub(super) fn convert_fragment(&mut self, id: VarDeclId) -> Result<NodeId> {
        let var = self.var(id)?;
        let origin = var.symbol.map_or(Origin::Unresolved, Origin::Var);
        let name = self.simple_name(&var.name, origin.clone());
        let (extra_dimensions, problem) = self.declarator_dimensions(id, name)?;
        let initializer = match var.initializer {
            Some(init) => Some(self.convert_expr(init)?),
            None => None,
        };
        let node = self.alloc(
            VariableDeclarationFragment {
                name,
                extra_dimensions,
                initializer,
            },
            var.span,
        );
        self.record(node, origin);
        if let Some(symbol) = var.symbol {
            self.declare(Declared::Var(symbol), node);
        }
        if let Some(problem) = problem {
            self.mark_malformed(node, problem);
        }
        self.mark_recovered(node, var.recovered);
        Ok(node)
    }

    /// A parameter, record component, catch parameter, resource,
    /// enhanced-for variable or typed lambda parameter.
    pub(super) fn convert_single_var(&mut self, id: VarDeclId, allow_union: bool) -> Result<NodeId> {
        let var = self.var(id)?;
        let origin = var.symbol.map_or(Origin::Unresolved, Origin::Var);
        let modifiers = match &var.modifiers {
            Some(modifiers) => self.convert_modifiers(modifiers, AnnotationOwner::var(var.symbol))?,
            None => Vec::new(),
        };
        let (ty, varargs, varargs_annotations) = match var.ty {
            Some(ty) => {
                let converted = self.convert_type_ref(ty, allow_union)?;
                (converted.node, converted.varargs, converted.varargs_annotations)
            }
            None => (self.missing_type(var.name.span.start), false, Vec::new()),
        };
        let name = self.simple_name(&var.name, origin.clone());
        let (extra_dimensions, problem) = self.declarator_dimensions(id, name)?;
        let initializer = match var.initializer {
            Some(init) => Some(self.convert_expr(init)?),
            None => None,
        };
        let node = self.alloc(
            SingleVariableDeclaration {
                modifiers,
                ty,
                varargs_annotations,
                varargs,
                name,
                extra_dimensions,
                initializer,
            },
            var.span,
        );
        self.record(node, origin);
        if let Some(symbol) = var.symbol {
            self.declare(Declared::Var(symbol), node);
        }
        if let Some(problem) = problem {
            self.mark_malformed(node, problem);
        }
        if varargs {
            self.gate(node, JavaFeature::Varargs);
        }
        self.mark_recovered(node, var.recovered);
        Ok(node)
    }

    fn declarator_dimensions(&mut self, id: VarDeclId, name: NodeId) -> Result<(Vec<NodeId>, Option<String>)> {
        let var = self.var(id)?;
        let after = end_offset(self.ast.range(name));
        let until = match var.initializer {
            Some(init) => offset(self.range_of(self.expr(init)?.span)),
            None => end_offset(self.range_of(var.span)),
        };
        self.convert_extra_dimensions(after, until.max(after), var.extra_dims, &var.extra_dim_annotations)
    }

    fn missing_type(&mut self, at: usize) -> NodeId {
        let name = self.missing_name(at);
        let range = self.ast.range(name);
        let node = self.alloc_range(
            SimpleType {
                annotations: Vec::new(),
                name,
            },
            range,
        );
        self.record(
            node,
            Origin::Type {
                ty: None,
                generic_declaration: false,
            },
        );
        self.mark_malformed(node, "missing type");
        node
    }

    /// A method or constructor body; an empty block in signatures-only mode.
    pub(super) fn convert_body(&mut self, body: StmtId) -> Result<NodeId> {
        if self.options.ignore_method_bodies {
            let span = self.stmt(body)?.span;
            return Ok(self.alloc(Block::default(), span));
        }
        self.convert_stmt(body)
    }

    fn convert_method(&mut self, id: MethodDeclId) -> Result<NodeId> {
        let method = self.method(id)?;
        let origin = method.symbol.map_or(Origin::Unresolved, Origin::Method);
        let modifiers = self.convert_modifiers(&method.modifiers, AnnotationOwner::method(method.symbol))?;
        let type_parameters = self.convert_type_parameters(&method.type_params)?;
        let return_type = match method.return_type {
            Some(ty) => Some(self.convert_type(ty)?),
            None => None,
        };
        let name = self.simple_name(&method.name, origin.clone());
        let (receiver_type, receiver_qualifier) = match &method.receiver {
            Some(receiver) => {
                let ty = self.convert_type(receiver.ty)?;
                let qualifier = receiver
                    .qualifier
                    .as_ref()
                    .map(|qualifier| self.convert_name_ref(qualifier, None));
                (Some(ty), qualifier)
            }
            None => (None, None),
        };
        let parameters = self.convert_all(&method.params, |this, param| this.convert_single_var(param, false))?;

        let span_end = end_offset(self.range_of(method.span));
        let params_end = parameters
            .iter()
            .chain(receiver_type.iter())
            .chain(receiver_qualifier.iter())
            .map(|node| end_offset(self.ast.range(*node)))
            .fold(end_offset(self.ast.range(name)), usize::max);
        let after = self
            .tracker
            .find_token(TokenKind::RParen, params_end, span_end)
            .map_or(params_end, |token| token.end());
        let (extra_dimensions, dims_problem) = self.convert_extra_dimensions(
            after,
            span_end.max(after),
            method.extra_dims,
            &method.extra_dim_annotations,
        )?;

        let thrown_exception_types = self.convert_all(&method.throws, |this, ty| this.convert_type(ty))?;
        let body = match method.body {
            Some(body) => Some(self.convert_body(body)?),
            None => None,
        };
        let node = self.alloc(
            MethodDeclaration {
                modifiers,
                constructor: method.is_constructor,
                compact_constructor: method.is_compact_ctor,
                type_parameters,
                return_type,
                name,
                receiver_type,
                receiver_qualifier,
                parameters,
                extra_dimensions,
                thrown_exception_types,
                body,
            },
            method.span,
        );
        self.record(node, origin);
        if let Some(symbol) = method.symbol {
            self.declare(Declared::Method(symbol), node);
        }
        if let Some(problem) = dims_problem {
            self.mark_malformed(node, problem);
        }
        self.check_method(node, method);
        self.mark_recovered(node, method.recovered);
        Ok(node)
    }

    fn check_method(&mut self, node: NodeId, method: &MethodDecl) {
        let flags = method.modifiers.flags;
        let has_body = method.body.is_some();
        let kind = self.current_class_kind();
        let in_interface = kind.is_some_and(ClassKind::is_interface_like);

        if has_body && flags.contains(Flags::NATIVE) {
            self.mark_malformed(node, "native method with a body");
        }
        if has_body && flags.contains(Flags::ABSTRACT) {
            self.mark_malformed(node, "abstract method with a body");
        }
        if !has_body
            && !in_interface
            && !method.is_constructor
            && !flags.intersects(Flags::ABSTRACT | Flags::NATIVE)
        {
            self.mark_malformed(node, "missing method body");
        }
        if has_body
            && in_interface
            && !flags.intersects(Flags::DEFAULT | Flags::STATIC | Flags::PRIVATE)
        {
            self.mark_malformed(node, "interface method with a body");
        }
        if (flags & Flags::VISIBILITY).bits().count_ones() > 1 {
            self.mark_malformed(node, "conflicting visibility modifiers");
        }
        if flags.contains(Flags::FINAL | Flags::ABSTRACT) {
            self.mark_malformed(node, "method is both final and abstract");
        }

        if method.receiver.is_some() {
            if flags.contains(Flags::STATIC) {
                self.mark_malformed(node, "receiver parameter on a static method");
            }
            if method.is_constructor && self.enclosing_class_is_static_context() {
                self.mark_malformed(node, "receiver parameter on a constructor of a top-level or static class");
            }
            self.gate(node, JavaFeature::ReceiverParameters);
        }
        if in_interface {
            if flags.contains(Flags::DEFAULT) {
                self.gate(node, JavaFeature::DefaultMethods);
            }
            if flags.contains(Flags::STATIC) {
                self.gate(node, JavaFeature::StaticInterfaceMethods);
            }
            if flags.contains(Flags::PRIVATE) {
                self.gate(node, JavaFeature::PrivateInterfaceMethods);
            }
        }
        if !method.type_params.is_empty() {
            self.gate(node, JavaFeature::Generics);
        }
    }

    /// The innermost class is top-level or static. Nested interfaces,
    /// enums, records and annotation types are implicitly static.
    fn enclosing_class_is_static_context(&self) -> bool {
        let Some(&id) = self.classes.last() else {
            return true;
        };
        self.classes.len() == 1
            || self.class(id).is_ok_and(|class| {
                class.kind != ClassKind::Class || class.modifiers.flags.contains(Flags::STATIC)
            })
    }

    fn convert_annotation_member(&mut self, id: MethodDeclId) -> Result<NodeId> {
        let method = self.method(id)?;
        let origin = method.symbol.map_or(Origin::Unresolved, Origin::Method);
        let modifiers = self.convert_modifiers(&method.modifiers, AnnotationOwner::method(method.symbol))?;
        let ty = match method.return_type {
            Some(ty) => self.convert_type(ty)?,
            None => self.missing_type(method.name.span.start),
        };
        let name = self.simple_name(&method.name, origin.clone());
        let default = match method.default_value {
            Some(value) => Some(self.convert_expr(value)?),
            None => None,
        };
        let node = self.alloc(
            AnnotationTypeMemberDeclaration {
                modifiers,
                ty,
                name,
                default,
            },
            method.span,
        );
        self.record(node, origin);
        if let Some(symbol) = method.symbol {
            self.declare(Declared::Method(symbol), node);
        }
        if !method.params.is_empty() || method.body.is_some() {
            self.mark_malformed(node, "annotation type element with parameters or a body");
        }
        self.mark_recovered(node, method.recovered);
        Ok(node)
    }
}
