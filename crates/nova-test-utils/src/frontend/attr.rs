//! Attribution of bodies: statements, expressions, invocations and
//! functional expressions.

use std::collections::{HashMap, HashSet};

use nova_hir::{
    AssignOp, BinaryOp, ClassDeclId, ExprId, ExprKind, LambdaBody, LiteralKind, Member,
    MethodDeclId, MethodRefKind, Modifiers as HirModifiers, NameRef, Resolution, StmtId, StmtKind,
    TypeRefId, TypeRefKind, UnaryOp, VarDeclId,
};
use nova_types::{
    capture_upper_bound, class_substitution, erasure, functional_interface_method,
    instantiate_as_supertype, is_subtype, substitute, ClassId, ClassKind, ClassType, ConstValue,
    MethodId, Modifiers, PrimitiveType, TyContext, Type, TypeVarId, VarDef, VarId, VarKind,
    WildcardBound,
};

use super::Attributor;

/// What overload resolution knows about an argument before the invoked
/// method is chosen.
#[derive(Debug, Clone)]
enum ArgShape {
    Typed(Type),
    /// A lambda with this many parameters; typed once the target is known.
    Lambda(usize),
    MethodRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Strict,
    Loose,
    Varargs,
}

/// The receiver of a method reference.
enum RefReceiver {
    Value(Type),
    Type(Type),
    New(Type),
}

impl Attributor {
    // --- declarations with bodies -------------------------------------------

    pub(super) fn attribute_class(&mut self, decl: ClassDeclId) {
        let class = self.unit.classes[decl].clone();
        self.in_class(decl, |this| {
            for idx in 0..class.enum_constants.len() {
                this.attribute_enum_constant(decl, idx);
            }
            for member in &class.members {
                match member {
                    Member::Field(field) => this.attribute_field(*field),
                    Member::Method(method) => this.attribute_method(*method),
                    Member::Class(member) => this.attribute_class(*member),
                    Member::Initializer { body, .. } => {
                        this.in_scope(|this| this.attribute_stmt(*body));
                    }
                }
            }
        });
    }

    fn attribute_enum_constant(&mut self, decl: ClassDeclId, idx: usize) {
        let constant = self.unit.classes[decl].enum_constants[idx].clone();
        let Some(class) = self.current_class() else {
            return;
        };
        let enum_type = Type::class(class, Vec::new());
        let args = constant.args.clone().unwrap_or_default();
        let candidates = self.constructors(class);
        let ctor = self
            .invoke(candidates, Some(&enum_type), &[], &args, None)
            .map(|(ctor, _)| ctor);
        self.unit.classes[decl].enum_constants[idx].ctor = ctor;
        if let Some(body) = constant.body {
            if self.declare_body_class(body, Some(enum_type)).is_some() {
                self.attribute_class(body);
            }
        }
    }

    fn attribute_field(&mut self, field: nova_hir::FieldDeclId) {
        let declarators = self.unit.fields[field].declarators.clone();
        for declarator in declarators {
            let decl = self.unit.vars[declarator].clone();
            let (Some(var), Some(init)) = (decl.symbol, decl.initializer) else {
                continue;
            };
            let Some(def) = self.symbols.var_def(var).cloned() else {
                continue;
            };
            self.in_scope(|this| this.attribute_expr(init, Some(&def.ty)));
            let constant_type = def.ty.is_primitive() || self.is_string(&def.ty);
            if def.modifiers.contains(Modifiers::FINAL) && constant_type {
                let constant = self.const_value(init, Some(&def.ty));
                self.symbols.var_mut(var).constant = constant;
            }
        }
    }

    fn attribute_method(&mut self, decl: MethodDeclId) {
        let method = self.unit.methods[decl].clone();
        let Some(id) = method.symbol else {
            return;
        };
        let Some(def) = self.symbols.method_def(id).cloned() else {
            return;
        };
        let saved = self.cx.clone();
        self.cx.method = Some(id);
        let type_vars = self.type_var_names(def.type_params.clone());
        self.cx.type_vars.push(type_vars);
        let return_type = (def.return_type != Type::Void).then(|| def.return_type.clone());
        self.cx.returns.push(return_type);
        self.in_scope(|this| {
            for param in &method.params {
                let decl = &this.unit.vars[*param];
                if let Some(var) = decl.symbol {
                    let name = decl.name.as_str().to_string();
                    this.bind_local(&name, var);
                }
            }
            if let Some(body) = method.body {
                this.attribute_stmt(body);
            }
        });
        if let Some(default) = method.default_value {
            self.attribute_expr(default, Some(&def.return_type));
            let value = self.const_value(default, Some(&def.return_type));
            self.symbols.method_mut(id).default_value = value;
        }
        self.cx = saved;
    }

    // --- statements ---------------------------------------------------------

    pub(super) fn attribute_stmt(&mut self, id: StmtId) {
        let stmt = self.unit.stmts[id].clone();
        let boolean = Type::primitive(PrimitiveType::Boolean);
        match stmt.kind {
            StmtKind::Block(stmts) => self.in_scope(|this| {
                for stmt in stmts {
                    this.attribute_stmt(stmt);
                }
            }),
            StmtKind::LocalVar {
                modifiers,
                ty,
                declarators,
            } => self.declare_locals(&modifiers, ty, &declarators, VarKind::Local),
            StmtKind::LocalClass(decl) => {
                if self.declare_body_class(decl, None).is_some() {
                    self.attribute_class(decl);
                }
            }
            StmtKind::Expr(expr) | StmtKind::Throw(expr) => {
                self.attribute_expr(expr, None);
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.attribute_expr(cond, Some(&boolean));
                self.attribute_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.attribute_stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } | StmtKind::Do { body, cond } => {
                self.attribute_expr(cond, Some(&boolean));
                self.attribute_stmt(body);
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => self.in_scope(|this| {
                for expr in init {
                    this.attribute_expr(expr, None);
                }
                if let Some(cond) = cond {
                    this.attribute_expr(cond, Some(&boolean));
                }
                for expr in update {
                    this.attribute_expr(expr, None);
                }
                this.attribute_stmt(body);
            }),
            StmtKind::ForEach {
                param,
                iterable,
                body,
            } => self.in_scope(|this| {
                let iterable = this.attribute_expr(iterable, None);
                let element = this.iteration_element(&iterable);
                this.declare_inferred_local(param, element, VarKind::ForEach);
                this.attribute_stmt(body);
            }),
            StmtKind::Try {
                resources,
                body,
                catches,
                finally,
            } => self.in_scope(|this| {
                for resource in resources {
                    match this.unit.exprs[resource].kind.clone() {
                        ExprKind::VarDeclExpr {
                            modifiers,
                            ty,
                            declarators,
                        } => {
                            this.declare_locals(&modifiers, ty, &declarators, VarKind::Resource);
                            let ty = this.unit.type_refs[ty].ty.clone();
                            this.unit.exprs[resource].ty = ty;
                        }
                        _ => {
                            this.attribute_expr(resource, None);
                        }
                    }
                }
                this.attribute_stmt(body);
                for catch in catches {
                    this.in_scope(|this| {
                        this.declare_inferred_local(catch.param, Type::Unknown, VarKind::CatchParameter);
                        this.attribute_stmt(catch.body);
                    });
                }
                if let Some(finally) = finally {
                    this.attribute_stmt(finally);
                }
            }),
            StmtKind::Switch { selector, cases } => {
                let selector = self.attribute_expr(selector, None);
                let enum_class = selector.class_id().filter(|class| {
                    self.symbols
                        .class_def(*class)
                        .is_some_and(|def| def.kind == ClassKind::Enum)
                });
                self.in_scope(|this| {
                    for case in cases {
                        for label in case.labels {
                            match enum_class {
                                Some(class) if this.resolve_enum_label(label, class) => {}
                                _ => {
                                    this.attribute_expr(label, Some(&selector));
                                }
                            }
                        }
                        for stmt in case.body {
                            this.attribute_stmt(stmt);
                        }
                    }
                });
            }
            StmtKind::Return(expr) => {
                if let Some(expr) = expr {
                    let expected = self.cx.returns.last().cloned().flatten();
                    self.attribute_expr(expr, expected.as_ref());
                }
            }
            StmtKind::Labeled { body, .. } => self.attribute_stmt(body),
            StmtKind::Synchronized { lock, body } => {
                self.attribute_expr(lock, None);
                self.attribute_stmt(body);
            }
            StmtKind::Assert { cond, message } => {
                self.attribute_expr(cond, Some(&boolean));
                if let Some(message) = message {
                    self.attribute_expr(message, None);
                }
            }
            StmtKind::ConstructorCall {
                is_super,
                qualifier,
                type_args,
                args,
                ..
            } => {
                if let Some(qualifier) = qualifier {
                    self.attribute_expr(qualifier, None);
                }
                let explicit: Vec<Type> = type_args.iter().map(|ty| self.resolve_type_ref(*ty)).collect();
                let ctor = self.current_class().and_then(|class| {
                    let target = if is_super {
                        self.symbols.class_def(class)?.super_class.clone()?
                    } else {
                        self.declared_type(class)
                    };
                    let candidates = self.constructors(target.class_id()?);
                    self.invoke(candidates, Some(&target), &explicit, &args, None)
                        .map(|(ctor, _)| ctor)
                });
                if let StmtKind::ConstructorCall { ctor: slot, .. } = &mut self.unit.stmts[id].kind {
                    *slot = ctor;
                }
            }
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty | StmtKind::Error => {}
        }
    }

    /// Resolve `case RED:` against the constants of the switched-on enum.
    fn resolve_enum_label(&mut self, label: ExprId, class: ClassId) -> bool {
        let ExprKind::Name(mut name) = self.unit.exprs[label].kind.clone() else {
            return false;
        };
        if name.segments.len() != 1 {
            return false;
        }
        let Some(constant) = self.find_field(class, name.segments[0].name.as_str()) else {
            return false;
        };
        name.segments[0].resolution = Resolution::Var(constant);
        self.unit.exprs[label].kind = ExprKind::Name(name);
        self.unit.exprs[label].ty = Some(Type::class(class, Vec::new()));
        true
    }

    fn iteration_element(&self, iterable: &Type) -> Type {
        if let Type::Array(component, _) = iterable {
            return (**component).clone();
        }
        let Some(iterable_class) = self.symbols.class_id("java.lang.Iterable") else {
            return Type::Unknown;
        };
        let Some(class) = self.class_of(iterable) else {
            return Type::Unknown;
        };
        match instantiate_as_supertype(&self.symbols, &Type::Class(class), iterable_class) {
            Some(Type::Class(ClassType { args, .. })) => match args.into_iter().next() {
                Some(arg) => self.upper_bound(&arg),
                None => self.object_type(),
            },
            _ => Type::Unknown,
        }
    }

    // --- locals -------------------------------------------------------------

    fn declare_locals(
        &mut self,
        modifiers: &HirModifiers,
        ty: TypeRefId,
        declarators: &[VarDeclId],
        kind: VarKind,
    ) {
        let inferred = matches!(self.unit.type_refs[ty].kind, TypeRefKind::Var);
        let base = (!inferred).then(|| self.resolve_type_ref(ty));
        let annotations = self.resolve_annotations(&modifiers.annotations);
        for &declarator in declarators {
            let initializer = self.unit.vars[declarator].initializer;
            match &base {
                Some(base) => {
                    let var_ty = self.declared_var_type(declarator, Some(base.clone()));
                    self.declare_local(declarator, var_ty.clone(), kind, modifiers.flags, annotations.clone());
                    if let Some(init) = initializer {
                        self.attribute_expr(init, Some(&var_ty));
                    }
                }
                None => {
                    let init_ty = initializer
                        .map(|init| self.attribute_expr(init, None))
                        .map_or(Type::Unknown, |ty| self.project_upward(&ty));
                    self.unit.type_refs[ty].ty = Some(init_ty.clone());
                    self.declare_local(declarator, init_ty, kind, modifiers.flags, annotations.clone());
                }
            }
        }
    }

    /// Declare a variable whose type comes from its own type reference, or
    /// from `inferred` for `var`.
    fn declare_inferred_local(&mut self, decl: VarDeclId, inferred: Type, kind: VarKind) {
        let var = self.unit.vars[decl].clone();
        let is_var = var
            .ty
            .is_some_and(|ty| matches!(self.unit.type_refs[ty].kind, TypeRefKind::Var));
        let ty = if is_var || var.ty.is_none() {
            if let Some(ty) = var.ty {
                self.unit.type_refs[ty].ty = Some(inferred.clone());
            }
            inferred
        } else {
            self.declared_var_type(decl, None)
        };
        let (flags, annotations) = match &var.modifiers {
            Some(modifiers) => (modifiers.flags, self.resolve_annotations(&modifiers.annotations)),
            None => (Modifiers::empty(), Vec::new()),
        };
        self.declare_local(decl, ty, kind, flags, annotations);
    }

    fn declare_local(
        &mut self,
        decl: VarDeclId,
        ty: Type,
        kind: VarKind,
        modifiers: Modifiers,
        annotations: Vec<nova_types::AnnotationInstance>,
    ) -> VarId {
        let name = self.unit.vars[decl].name.clone();
        let mut def = VarDef::new(name.as_str(), ty, kind);
        def.modifiers = modifiers;
        def.declaring_class = self.current_class();
        def.declaring_method = self.cx.method;
        def.lambda_site = self.cx.lambdas.last().copied();
        def.decl_offset = Some(name.span.start as u32);
        def.deprecated = self.is_deprecated(&annotations);
        def.annotations = annotations;
        let var = self.symbols.add_var(def);
        self.unit.vars[decl].symbol = Some(var);
        self.bind_local(name.as_str(), var);
        var
    }

    // --- expressions --------------------------------------------------------

    /// Attribute `id` against `expected` and return its type. Lambdas and
    /// method references without a functional target keep no type.
    pub(super) fn attribute_expr(&mut self, id: ExprId, expected: Option<&Type>) -> Type {
        let expr = self.unit.exprs[id].clone();
        let site = expr.span.start;
        let ty = match expr.kind {
            ExprKind::Lambda { .. } | ExprKind::MethodRef { .. } => {
                self.attribute_functional(id, expected);
                return self.unit.exprs[id].ty.clone().unwrap_or(Type::Unknown);
            }
            ExprKind::Paren(inner) => {
                let ty = self.attribute_expr(inner, expected);
                self.unit.exprs[id].ty = self.unit.exprs[inner].ty.clone();
                return ty;
            }
            ExprKind::Literal { kind, .. } => self.literal_type(kind),
            ExprKind::Name(name) => self.attribute_name(id, name),
            ExprKind::FieldAccess { receiver, name, .. } => {
                let receiver_ty = self.attribute_expr(receiver, None);
                let (field, ty) = self.select_field(&receiver_ty, name.as_str());
                if let ExprKind::FieldAccess { field: slot, .. } = &mut self.unit.exprs[id].kind {
                    *slot = field;
                }
                self.capture(ty, site)
            }
            ExprKind::SuperFieldAccess { qualifier, name, .. } => {
                let (qualifier, super_ty) = self.super_of(qualifier);
                let (field, ty) = super_ty.map_or((None, Type::Unknown), |ty| self.select_field(&ty, name.as_str()));
                if let ExprKind::SuperFieldAccess {
                    qualifier: q,
                    field: slot,
                    ..
                } = &mut self.unit.exprs[id].kind
                {
                    *q = qualifier;
                    *slot = field;
                }
                self.capture(ty, site)
            }
            ExprKind::This { qualifier } => match qualifier {
                None => self.current_class().map_or(Type::Unknown, |class| self.declared_type(class)),
                Some(mut name) => {
                    self.resolve_type_name(&mut name);
                    let ty = match name.resolution() {
                        Resolution::Type(ty) => ty.class_id().map_or(Type::Unknown, |c| self.declared_type(c)),
                        _ => Type::Unknown,
                    };
                    self.unit.exprs[id].kind = ExprKind::This { qualifier: Some(name) };
                    ty
                }
            },
            ExprKind::MethodCall {
                receiver,
                type_args,
                name,
                args,
                ..
            } => {
                let explicit: Vec<Type> = type_args.iter().map(|ty| self.resolve_type_ref(*ty)).collect();
                let (receiver_ty, candidates) = match receiver {
                    Some(receiver) => {
                        let receiver_ty = self.attribute_expr(receiver, None);
                        let candidates = self
                            .class_of(&receiver_ty)
                            .map(|class| self.methods_named(class.def, name.as_str()))
                            .unwrap_or_default();
                        let receiver_ty = (!self.is_type_name(receiver)).then_some(receiver_ty);
                        (receiver_ty, candidates)
                    }
                    None => self.unqualified_candidates(name.as_str()),
                };
                let call = self.invoke(candidates, receiver_ty.as_ref(), &explicit, &args, expected);
                if let ExprKind::MethodCall { method, .. } = &mut self.unit.exprs[id].kind {
                    *method = call.as_ref().map(|(method, _)| *method);
                }
                let ty = call.map_or(Type::Unknown, |(_, ty)| ty);
                self.capture(ty, site)
            }
            ExprKind::SuperMethodCall {
                qualifier,
                type_args,
                name,
                args,
                ..
            } => {
                let explicit: Vec<Type> = type_args.iter().map(|ty| self.resolve_type_ref(*ty)).collect();
                let (qualifier, super_ty) = self.super_of(qualifier);
                let candidates = super_ty
                    .as_ref()
                    .and_then(|ty| self.class_of(ty))
                    .map(|class| self.methods_named(class.def, name.as_str()))
                    .unwrap_or_default();
                let call = self.invoke(candidates, super_ty.as_ref(), &explicit, &args, expected);
                if let ExprKind::SuperMethodCall {
                    qualifier: q,
                    method,
                    ..
                } = &mut self.unit.exprs[id].kind
                {
                    *q = qualifier;
                    *method = call.as_ref().map(|(method, _)| *method);
                }
                let ty = call.map_or(Type::Unknown, |(_, ty)| ty);
                self.capture(ty, site)
            }
            ExprKind::New {
                outer,
                type_args,
                ty,
                args,
                body,
                ..
            } => self.attribute_new(id, outer, &type_args, ty, &args, body, expected),
            ExprKind::NewArray {
                ty,
                dim_exprs,
                initializer,
            } => {
                let array = self.resolve_type_ref(ty);
                let int = Type::primitive(PrimitiveType::Int);
                for dim in dim_exprs {
                    self.attribute_expr(dim, Some(&int));
                }
                if let Some(initializer) = initializer {
                    self.attribute_expr(initializer, Some(&array));
                }
                array
            }
            ExprKind::ArrayInit(elements) => {
                let array = match expected {
                    Some(ty @ Type::Array(..)) => ty.clone(),
                    Some(other) => Type::array(other.clone()),
                    None => Type::Unknown,
                };
                let component = match &array {
                    Type::Array(component, _) => Some((**component).clone()),
                    _ => None,
                };
                for element in elements {
                    self.attribute_expr(element, component.as_ref());
                }
                array
            }
            ExprKind::ArrayAccess { array, index } => {
                let array = self.attribute_expr(array, None);
                self.attribute_expr(index, Some(&Type::primitive(PrimitiveType::Int)));
                match self.upper_bound(&array) {
                    Type::Array(component, _) => *component,
                    _ => Type::Unknown,
                }
            }
            ExprKind::Assign { op, lhs, rhs } => {
                let target = self.attribute_expr(lhs, None);
                let expected = (op == AssignOp::Assign).then_some(&target);
                self.attribute_expr(rhs, expected);
                target
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.attribute_expr(lhs, None);
                let rhs = self.attribute_expr(rhs, None);
                self.binary_type(op, &lhs, &rhs)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.attribute_expr(operand, None);
                match op {
                    UnaryOp::Not => Type::primitive(PrimitiveType::Boolean),
                    UnaryOp::PreInc | UnaryOp::PreDec => operand,
                    UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => self
                        .unboxed(&operand)
                        .map_or(Type::Unknown, |prim| Type::primitive(unary_promotion(prim))),
                }
            }
            ExprKind::Postfix { operand, .. } => self.attribute_expr(operand, None),
            ExprKind::Cast { ty, expr } => {
                let target = self.resolve_type_ref(ty);
                self.attribute_expr(expr, Some(&target));
                target
            }
            ExprKind::InstanceOf { expr, ty } => {
                self.attribute_expr(expr, None);
                self.resolve_type_ref(ty);
                Type::primitive(PrimitiveType::Boolean)
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.attribute_expr(cond, Some(&Type::primitive(PrimitiveType::Boolean)));
                let then_ty = self.attribute_expr(then_expr, expected);
                let else_ty = self.attribute_expr(else_expr, expected);
                self.conditional_type(&then_ty, &else_ty, expected)
            }
            ExprKind::ClassLit(ty) => {
                let operand = self.resolve_type_ref(ty);
                match self.symbols.class_id("java.lang.Class") {
                    Some(class) if operand == Type::Void => Type::class(class, Vec::new()),
                    Some(class) => Type::class(class, vec![self.boxed(&operand)]),
                    None => Type::Unknown,
                }
            }
            ExprKind::VarDeclExpr {
                modifiers,
                ty,
                declarators,
            } => {
                self.declare_locals(&modifiers, ty, &declarators, VarKind::Local);
                self.unit.type_refs[ty].ty.clone().unwrap_or(Type::Unknown)
            }
            ExprKind::Annotation(annotation) => self
                .resolve_annotation(annotation)
                .map_or(Type::Unknown, |instance| Type::class(instance.ty, Vec::new())),
            ExprKind::Error => Type::Unknown,
        };
        self.unit.exprs[id].ty = Some(ty.clone());
        ty
    }

    fn literal_type(&self, kind: LiteralKind) -> Type {
        match kind {
            LiteralKind::Int => Type::primitive(PrimitiveType::Int),
            LiteralKind::Long => Type::primitive(PrimitiveType::Long),
            LiteralKind::Float => Type::primitive(PrimitiveType::Float),
            LiteralKind::Double => Type::primitive(PrimitiveType::Double),
            LiteralKind::Char => Type::primitive(PrimitiveType::Char),
            LiteralKind::Bool => Type::primitive(PrimitiveType::Boolean),
            LiteralKind::String | LiteralKind::TextBlock => self.jdk_type("java.lang.String"),
            LiteralKind::Null => Type::Null,
        }
    }

    /// Resolve every segment of a name expression. Leading segments may be
    /// packages or types; the rest select fields or member types.
    fn attribute_name(&mut self, id: ExprId, mut name: NameRef) -> Type {
        let site = self.unit.exprs[id].span.start;
        let mut current = (Resolution::Unresolved, Type::Unknown);
        for idx in 0..name.segments.len() {
            let segment = name.segments[idx].name.as_str().to_string();
            current = if idx == 0 {
                self.resolve_simple_name(&segment)
            } else {
                self.select_in_name(&current, &segment)
            };
            name.segments[idx].resolution = current.0.clone();
        }
        let value = matches!(current.0, Resolution::Var(_) | Resolution::Unresolved);
        self.unit.exprs[id].kind = ExprKind::Name(name);
        let (_, ty) = current;
        if value {
            self.capture(ty, site)
        } else {
            ty
        }
    }

    fn resolve_simple_name(&mut self, name: &str) -> (Resolution, Type) {
        for scope in self.scopes.iter().rev() {
            if let Some(var) = scope.vars.get(name) {
                let ty = self.symbols.var_def(*var).map_or(Type::Unknown, |def| def.ty.clone());
                return (Resolution::Var(*var), ty);
            }
        }
        for (_, class) in self.cx.classes.iter().rev() {
            if let Some(field) = self.find_field(*class, name) {
                let receiver = self.declared_type(*class);
                return (Resolution::Var(field), self.field_type(field, Some(&receiver)));
            }
        }
        let static_owner = self
            .imports
            .static_single
            .iter()
            .filter(|(_, member)| member == name)
            .map(|(class, _)| *class)
            .chain(self.imports.static_on_demand.iter().copied())
            .find_map(|class| self.find_field(class, name));
        if let Some(field) = static_owner {
            return (Resolution::Var(field), self.field_type(field, None));
        }
        if let Some(ty) = self.lookup_type(name) {
            return (Resolution::Type(ty.clone()), ty);
        }
        if self.symbols.package_exists(name) {
            return (Resolution::Package(self.symbols.intern_package(name)), Type::Unknown);
        }
        (Resolution::Unresolved, Type::Unknown)
    }

    fn select_in_name(&mut self, current: &(Resolution, Type), name: &str) -> (Resolution, Type) {
        match current {
            (Resolution::Package(package), _) => {
                let prefix = self
                    .symbols
                    .package(*package)
                    .map(|def| def.name.clone())
                    .unwrap_or_default();
                let dotted = format!("{prefix}.{name}");
                if let Some(class) = self.symbols.class_id(&dotted) {
                    let ty = Type::class(class, Vec::new());
                    return (Resolution::Type(ty.clone()), ty);
                }
                if self.symbols.package_exists(&dotted) {
                    return (Resolution::Package(self.symbols.intern_package(&dotted)), Type::Unknown);
                }
                (Resolution::Unresolved, Type::Unknown)
            }
            (Resolution::Type(ty), _) => {
                let Some(class) = ty.class_id() else {
                    return (Resolution::Unresolved, Type::Unknown);
                };
                if let Some(field) = self.find_field(class, name) {
                    return (Resolution::Var(field), self.field_type(field, None));
                }
                match self.find_member_type(class, name) {
                    Some(member) => {
                        let ty = Type::class(member, Vec::new());
                        (Resolution::Type(ty.clone()), ty)
                    }
                    None => (Resolution::Unresolved, Type::Unknown),
                }
            }
            (Resolution::Var(_), receiver) => {
                let (field, ty) = self.select_field(receiver, name);
                (field.map_or(Resolution::Unresolved, Resolution::Var), ty)
            }
            _ => (Resolution::Unresolved, Type::Unknown),
        }
    }

    /// Field `name` of a value of type `receiver`; `array.length` has no
    /// field symbol.
    fn select_field(&self, receiver: &Type, name: &str) -> (Option<VarId>, Type) {
        if matches!(self.upper_bound(receiver), Type::Array(..)) && name == "length" {
            return (None, Type::primitive(PrimitiveType::Int));
        }
        let Some(class) = self.class_of(receiver) else {
            return (None, Type::Unknown);
        };
        match self.find_field(class.def, name) {
            Some(field) => (Some(field), self.field_type(field, Some(receiver))),
            None => (None, Type::Unknown),
        }
    }

    /// `super` (or `Outer.super`/`Interface.super`) as a type.
    fn super_of(&mut self, qualifier: Option<NameRef>) -> (Option<NameRef>, Option<Type>) {
        let Some(current) = self.current_class() else {
            return (qualifier, None);
        };
        let Some(mut name) = qualifier else {
            let super_ty = self.symbols.class_def(current).and_then(|def| def.super_class.clone());
            return (None, super_ty);
        };
        self.resolve_type_name(&mut name);
        let named = match name.resolution() {
            Resolution::Type(ty) => ty.class_id(),
            _ => None,
        };
        let super_ty = named.and_then(|named| {
            let def = self.symbols.class_def(current)?;
            if let Some(interface) = def.interfaces.iter().find(|ty| ty.class_id() == Some(named)) {
                return Some(interface.clone());
            }
            self.symbols.class_def(named)?.super_class.clone()
        });
        (Some(name), super_ty)
    }

    fn field_type(&self, field: VarId, receiver: Option<&Type>) -> Type {
        let Some(def) = self.symbols.var_def(field) else {
            return Type::Unknown;
        };
        match (receiver, def.declaring_class) {
            (Some(receiver), Some(owner)) if !def.modifiers.contains(Modifiers::STATIC) => {
                self.member_type_of(&def.ty, receiver, owner)
            }
            _ => def.ty.clone(),
        }
    }

    /// `ty`, declared in `owner`, as seen through `receiver`. Members of a
    /// raw receiver are erased.
    fn member_type_of(&self, ty: &Type, receiver: &Type, owner: ClassId) -> Type {
        match self.receiver_view(receiver, owner) {
            Some(view) if view.args.is_empty() => {
                if self.symbols.class_def(owner).is_some_and(|def| def.is_generic()) {
                    erasure(&self.symbols, ty)
                } else {
                    ty.clone()
                }
            }
            Some(view) => substitute(ty, &class_substitution(&self.symbols, &view)),
            None => ty.clone(),
        }
    }

    fn receiver_view(&self, receiver: &Type, owner: ClassId) -> Option<ClassType> {
        let class = self.class_of(receiver)?;
        match instantiate_as_supertype(&self.symbols, &Type::Class(class), owner)? {
            Type::Class(view) => Some(view),
            _ => None,
        }
    }

    fn member_subst(&self, receiver: Option<&Type>, owner: ClassId) -> HashMap<TypeVarId, Type> {
        receiver
            .and_then(|receiver| self.receiver_view(receiver, owner))
            .filter(|view| !view.args.is_empty())
            .map(|view| class_substitution(&self.symbols, &view))
            .unwrap_or_default()
    }

    fn is_raw_view(&self, receiver: Option<&Type>, owner: ClassId) -> bool {
        let generic = self.symbols.class_def(owner).is_some_and(|def| def.is_generic());
        generic
            && receiver
                .and_then(|receiver| self.receiver_view(receiver, owner))
                .is_some_and(|view| view.args.is_empty())
    }

    #[allow(clippy::too_many_arguments)]
    fn attribute_new(
        &mut self,
        id: ExprId,
        outer: Option<ExprId>,
        type_args: &[TypeRefId],
        ty: TypeRefId,
        args: &[ExprId],
        body: Option<ClassDeclId>,
        expected: Option<&Type>,
    ) -> Type {
        let outer_ty = outer.map(|outer| self.attribute_expr(outer, None));
        let mut created = self.resolve_type_ref(ty);
        if let (true, Some(outer_ty)) = (created.is_errorish(), &outer_ty) {
            let simple = match &self.unit.type_refs[ty].kind {
                TypeRefKind::Named(segments) => segments.last().map(|s| s.name.as_str().to_string()),
                _ => None,
            };
            let member = simple.zip(self.class_of(outer_ty)).and_then(|(simple, outer)| {
                self.find_member_type(outer.def, &simple)
            });
            if let Some(member) = member {
                created = Type::class(member, Vec::new());
                self.unit.type_refs[ty].ty = Some(created.clone());
            }
        }
        let diamond = match &self.unit.type_refs[ty].kind {
            TypeRefKind::Named(segments) => segments
                .last()
                .is_some_and(|segment| segment.args.as_ref().is_some_and(Vec::is_empty)),
            _ => false,
        };
        if diamond {
            created = self.infer_diamond(&created, expected);
        }
        let explicit: Vec<Type> = type_args.iter().map(|ty| self.resolve_type_ref(*ty)).collect();
        let class = created.class_id();
        let candidates = match class {
            Some(class) if self.is_interface(class) => self
                .symbols
                .well_known_types()
                .map(|wk| self.constructors(wk.object))
                .unwrap_or_default(),
            Some(class) => self.constructors(class),
            None => Vec::new(),
        };
        let receiver = if self.is_interface_type(&created) {
            self.object_type()
        } else {
            created.clone()
        };
        let ctor = self
            .invoke(candidates, Some(&receiver), &explicit, args, None)
            .map(|(ctor, _)| ctor);
        if let ExprKind::New { ctor: slot, .. } = &mut self.unit.exprs[id].kind {
            *slot = ctor;
        }
        match body {
            Some(body) => match self.declare_body_class(body, Some(created)) {
                Some(anonymous) => {
                    self.unit.exprs[id].ty = Some(Type::class(anonymous, Vec::new()));
                    self.attribute_class(body);
                    Type::class(anonymous, Vec::new())
                }
                None => Type::Unknown,
            },
            None => created,
        }
    }

    /// Type arguments of `new C<>()` from the expected type; parameters the
    /// expected type does not determine default to their bound.
    fn infer_diamond(&self, created: &Type, expected: Option<&Type>) -> Type {
        let Some(class) = created.class_id() else {
            return created.clone();
        };
        let vars = self
            .symbols
            .class_def(class)
            .map(|def| def.type_params.clone())
            .unwrap_or_default();
        let declared = self.declared_type(class);
        let mut subst = HashMap::new();
        if let Some(expected) = expected {
            if let Some(target) = self.class_of(expected) {
                if let Some(Type::Class(view)) = instantiate_as_supertype(&self.symbols, &declared, target.def) {
                    for (formal, actual) in view.args.iter().zip(&target.args) {
                        self.infer(formal, actual, &vars, &mut subst);
                    }
                }
            }
        }
        self.default_unbound(&vars, &mut subst);
        substitute(&declared, &subst)
    }

    // --- invocations --------------------------------------------------------

    /// Methods visible without a receiver: those of the innermost enclosing
    /// class declaring the name, then static imports.
    fn unqualified_candidates(&self, name: &str) -> (Option<Type>, Vec<MethodId>) {
        for (_, class) in self.cx.classes.iter().rev() {
            let candidates = self.methods_named(*class, name);
            if !candidates.is_empty() {
                return (Some(self.declared_type(*class)), candidates);
            }
        }
        let imported: Vec<MethodId> = self
            .imports
            .static_single
            .iter()
            .filter(|(_, member)| member == name)
            .map(|(class, _)| *class)
            .chain(self.imports.static_on_demand.iter().copied())
            .flat_map(|class| self.methods_named(class, name))
            .filter(|method| self.symbols.method_def(*method).is_some_and(|def| def.is_static()))
            .collect();
        (None, imported)
    }

    pub(super) fn constructors(&self, class: ClassId) -> Vec<MethodId> {
        self.symbols
            .class_def(class)
            .map(|def| {
                def.methods
                    .iter()
                    .copied()
                    .filter(|method| self.symbols.method_def(*method).is_some_and(|m| m.is_constructor))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn arg_shape(&mut self, arg: ExprId) -> ArgShape {
        match &self.unit.exprs[arg].kind {
            ExprKind::Lambda { params, .. } => ArgShape::Lambda(params.len()),
            ExprKind::MethodRef { .. } => ArgShape::MethodRef,
            _ => ArgShape::Typed(self.attribute_expr(arg, None)),
        }
    }

    /// Pick among `candidates` for `args`, attribute the arguments and
    /// return the chosen method with its instantiated return type.
    fn invoke(
        &mut self,
        candidates: Vec<MethodId>,
        receiver: Option<&Type>,
        explicit: &[Type],
        args: &[ExprId],
        expected: Option<&Type>,
    ) -> Option<(MethodId, Type)> {
        let shapes: Vec<ArgShape> = args.iter().map(|arg| self.arg_shape(*arg)).collect();
        let Some(method) = self.select_method(&candidates, receiver, &shapes) else {
            for (arg, shape) in args.iter().zip(&shapes) {
                if !matches!(shape, ArgShape::Typed(_)) {
                    self.attribute_expr(*arg, None);
                }
            }
            tracing::trace!(candidates = candidates.len(), "no applicable method");
            return None;
        };
        let def = self.symbols.method_def(method)?.clone();
        let vars = def.type_params.clone();
        let mut subst = self.member_subst(receiver, def.owner);
        let inferring = explicit.len() != vars.len() || vars.is_empty();
        if !inferring {
            subst.extend(vars.iter().copied().zip(explicit.iter().cloned()));
        }
        let param_for = |idx: usize| -> Type { formal_for_arg(&def, idx, shapes.len()) };
        if inferring {
            for (idx, shape) in shapes.iter().enumerate() {
                if let ArgShape::Typed(arg) = shape {
                    let formal = substitute(&param_for(idx), &subst);
                    self.infer(&formal, arg, &vars, &mut subst);
                }
            }
            if let Some(expected) = expected {
                let result = substitute(&def.return_type, &subst);
                self.infer(&result, expected, &vars, &mut subst);
            }
        }

        let deferred: Vec<(usize, ExprId)> = shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| !matches!(shape, ArgShape::Typed(_)))
            .map(|(idx, _)| (idx, args[idx]))
            .collect();
        for &(idx, arg) in &deferred {
            let formal = substitute(&param_for(idx), &subst);
            if let Some(sam) = functional_interface_method(&self.symbols, &self.ground(&formal)) {
                for param in &sam.params {
                    for tv in type_vars_in(param) {
                        if vars.contains(&tv) && !subst.contains_key(&tv) {
                            let default = self.default_for(tv, &subst);
                            subst.insert(tv, default);
                        }
                    }
                }
            }
            let target = substitute(&param_for(idx), &subst);
            let result = self.attribute_functional(arg, Some(&target));
            let sam = functional_interface_method(&self.symbols, &self.ground(&target));
            if let (Some(result), Some(sam)) = (result, sam) {
                self.infer(&sam.return_type, &result, &vars, &mut subst);
            }
        }
        self.default_unbound(&vars, &mut subst);
        for &(idx, arg) in &deferred {
            if self.unit.exprs[arg].ty.is_some() {
                let target = self.ground(&substitute(&param_for(idx), &subst));
                self.unit.exprs[arg].ty = Some(target);
            }
        }

        let mut result = substitute(&def.return_type, &subst);
        if self.is_raw_view(receiver, def.owner) {
            result = erasure(&self.symbols, &result);
        }
        if def.is_constructor {
            result = Type::Void;
        }
        Some((method, result))
    }

    fn select_method(
        &self,
        candidates: &[MethodId],
        receiver: Option<&Type>,
        shapes: &[ArgShape],
    ) -> Option<MethodId> {
        for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
            let applicable: Vec<MethodId> = candidates
                .iter()
                .copied()
                .filter(|method| self.is_applicable(*method, receiver, shapes, phase))
                .collect();
            if !applicable.is_empty() {
                return Some(self.most_specific(&applicable));
            }
        }
        None
    }

    fn is_applicable(&self, method: MethodId, receiver: Option<&Type>, shapes: &[ArgShape], phase: Phase) -> bool {
        let Some(def) = self.symbols.method_def(method) else {
            return false;
        };
        let variable_arity = phase == Phase::Varargs && def.is_varargs;
        if variable_arity {
            if shapes.len() + 1 < def.params.len() {
                return false;
            }
        } else if shapes.len() != def.params.len() {
            return false;
        }
        let subst = self.member_subst(receiver, def.owner);
        shapes.iter().enumerate().all(|(idx, shape)| {
            let formal = if variable_arity {
                formal_for_arg(def, idx, usize::MAX)
            } else {
                def.params[idx].clone()
            };
            let formal = substitute(&formal, &subst);
            match shape {
                ArgShape::Typed(arg) => self.assignable(arg, &formal, phase != Phase::Strict),
                ArgShape::Lambda(arity) => match formal {
                    Type::TypeVar(..) => true,
                    formal => functional_interface_method(&self.symbols, &self.ground(&formal))
                        .is_some_and(|sam| sam.params.len() == *arity),
                },
                ArgShape::MethodRef => !formal.is_primitive(),
            }
        })
    }

    fn most_specific(&self, applicable: &[MethodId]) -> MethodId {
        let erased = |method: MethodId| -> Vec<Type> {
            self.symbols
                .method_def(method)
                .map(|def| def.params.iter().map(|p| erasure(&self.symbols, p)).collect())
                .unwrap_or_default()
        };
        let at_least_as_specific = |a: MethodId, b: MethodId| {
            let (a, b) = (erased(a), erased(b));
            a.len() == b.len() && a.iter().zip(&b).all(|(a, b)| self.assignable(a, b, false))
        };
        applicable
            .iter()
            .copied()
            .find(|candidate| {
                applicable
                    .iter()
                    .all(|other| other == candidate || at_least_as_specific(*candidate, *other))
            })
            .unwrap_or(applicable[0])
    }

    /// Method conversion from `from` to `to`, judged on erasures. Loose
    /// conversion also boxes and unboxes.
    fn assignable(&self, from: &Type, to: &Type, loose: bool) -> bool {
        if from.is_errorish() || to.is_errorish() {
            return true;
        }
        let from = erasure(&self.symbols, &self.upper_bound(from));
        let to = erasure(&self.symbols, &self.upper_bound(to));
        match (&from, &to) {
            (Type::Primitive(..), Type::Primitive(..)) => is_subtype(&self.symbols, &from, &to),
            (Type::Primitive(..), _) => loose && is_subtype(&self.symbols, &self.boxed(&from), &to),
            (_, Type::Primitive(prim, _)) => {
                loose
                    && self
                        .unboxed(&from)
                        .is_some_and(|unboxed| is_subtype(&self.symbols, &Type::primitive(unboxed), &Type::primitive(*prim)))
            }
            _ => is_subtype(&self.symbols, &from, &to),
        }
    }

    /// Bind method type variables `vars` occurring in `formal` from the
    /// corresponding parts of `actual`. Existing bindings win.
    fn infer(&self, formal: &Type, actual: &Type, vars: &[TypeVarId], out: &mut HashMap<TypeVarId, Type>) {
        match formal {
            Type::TypeVar(tv, _) if vars.contains(tv) => {
                let actual = match actual {
                    Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound), _) => {
                        (**bound).clone()
                    }
                    other => other.clone(),
                };
                if !out.contains_key(tv) && !actual.is_errorish() && !matches!(actual, Type::Null | Type::Void | Type::Wildcard(..)) {
                    out.insert(*tv, self.boxed(&actual));
                }
            }
            Type::Array(formal, _) => {
                if let Type::Array(actual, _) = actual {
                    self.infer(formal, actual, vars, out);
                }
            }
            Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound), _) => {
                self.infer(bound, actual, vars, out);
            }
            Type::Class(formal) if !formal.args.is_empty() => {
                let Some(actual) = self.class_of(actual) else {
                    return;
                };
                if let Some(Type::Class(view)) = instantiate_as_supertype(&self.symbols, &Type::Class(actual), formal.def) {
                    for (formal, actual) in formal.args.iter().zip(&view.args) {
                        self.infer(formal, actual, vars, out);
                    }
                }
            }
            _ => {}
        }
    }

    fn default_for(&self, tv: TypeVarId, subst: &HashMap<TypeVarId, Type>) -> Type {
        self.symbols
            .type_param_def(tv)
            .and_then(|def| def.upper_bounds.first())
            .filter(|bound| !type_vars_in(bound).contains(&tv))
            .map_or_else(|| self.object_type(), |bound| substitute(bound, subst))
    }

    fn default_unbound(&self, vars: &[TypeVarId], subst: &mut HashMap<TypeVarId, Type>) {
        for tv in vars {
            if !subst.contains_key(tv) {
                let default = self.default_for(*tv, subst);
                subst.insert(*tv, default);
            }
        }
    }

    // --- lambdas and method references --------------------------------------

    /// Attribute a lambda or method reference against `expected`. Returns
    /// the type its body or referenced method produces, when known.
    fn attribute_functional(&mut self, id: ExprId, expected: Option<&Type>) -> Option<Type> {
        let expr = self.unit.exprs[id].clone();
        let target = expected.map(|ty| self.ground(ty));
        let sam = target
            .as_ref()
            .and_then(|ty| functional_interface_method(&self.symbols, ty));
        match expr.kind {
            ExprKind::Lambda { params, body, .. } => {
                let sam = sam.filter(|sam| sam.params.len() == params.len());
                self.unit.exprs[id].ty = sam.as_ref().and(target);
                let site = expr.span.start as u32;
                self.in_scope(|this| {
                    for (idx, param) in params.iter().enumerate() {
                        let inferred = sam
                            .as_ref()
                            .and_then(|sam| sam.params.get(idx))
                            .map_or(Type::Unknown, |ty| this.ground(ty));
                        this.declare_inferred_local(*param, inferred, VarKind::LambdaParameter);
                        if let Some(var) = this.unit.vars[*param].symbol {
                            this.symbols.var_mut(var).lambda_site = Some(site);
                        }
                    }
                    let returns = sam
                        .as_ref()
                        .map(|sam| sam.return_type.clone())
                        .filter(|ty| *ty != Type::Void);
                    this.cx.lambdas.push(site);
                    this.cx.returns.push(returns.clone());
                    let result = match body {
                        LambdaBody::Expr(body) => Some(this.attribute_expr(body, returns.as_ref())),
                        LambdaBody::Block(body) => {
                            this.attribute_stmt(body);
                            None
                        }
                    };
                    this.cx.returns.pop();
                    this.cx.lambdas.pop();
                    result
                })
            }
            ExprKind::MethodRef {
                kind,
                type_args,
                name,
                ..
            } => {
                let receiver = match &kind {
                    MethodRefKind::Expr(receiver) => {
                        let ty = self.attribute_expr(*receiver, None);
                        if self.is_type_name(*receiver) {
                            RefReceiver::Type(ty)
                        } else {
                            RefReceiver::Value(ty)
                        }
                    }
                    MethodRefKind::Super(qualifier) => {
                        let (qualifier, super_ty) = self.super_of(qualifier.clone());
                        if let ExprKind::MethodRef {
                            kind: MethodRefKind::Super(slot),
                            ..
                        } = &mut self.unit.exprs[id].kind
                        {
                            *slot = qualifier;
                        }
                        RefReceiver::Value(super_ty.unwrap_or(Type::Unknown))
                    }
                    MethodRefKind::Type(ty) => RefReceiver::Type(self.resolve_type_ref(*ty)),
                    MethodRefKind::New(ty) => RefReceiver::New(self.resolve_type_ref(*ty)),
                };
                let explicit: Vec<Type> = type_args.iter().map(|ty| self.resolve_type_ref(*ty)).collect();
                let Some(sam) = sam else {
                    self.unit.exprs[id].ty = None;
                    return None;
                };
                self.unit.exprs[id].ty = target;
                let name = name.map(|name| name.as_str().to_string());
                let resolved = self.resolve_method_ref(receiver, name.as_deref(), &explicit, &sam.params, &sam.return_type);
                if let ExprKind::MethodRef { method, .. } = &mut self.unit.exprs[id].kind {
                    *method = resolved.as_ref().and_then(|(method, _)| *method);
                }
                resolved.map(|(_, result)| result)
            }
            _ => Some(self.attribute_expr(id, expected)),
        }
    }

    fn resolve_method_ref(
        &self,
        receiver: RefReceiver,
        name: Option<&str>,
        explicit: &[Type],
        params: &[Type],
        returns: &Type,
    ) -> Option<(Option<MethodId>, Type)> {
        let typed = |types: &[Type]| -> Vec<ArgShape> { types.iter().cloned().map(ArgShape::Typed).collect() };
        match receiver {
            RefReceiver::New(created) => {
                if let Type::Array(..) = created {
                    return Some((None, created));
                }
                let class = created.class_id()?;
                let ctors = self.constructors(class);
                let ctor = self.select_method(&ctors, Some(&created), &typed(params))?;
                Some((Some(ctor), created))
            }
            RefReceiver::Value(receiver) => {
                let class = self.class_of(&receiver)?;
                let candidates = self.methods_named(class.def, name?);
                let method = self.select_method(&candidates, Some(&receiver), &typed(params))?;
                Some((Some(method), self.instantiate(method, Some(&receiver), explicit, params, returns)))
            }
            RefReceiver::Type(ty) => {
                let class = self.class_of(&ty)?;
                let candidates = self.methods_named(class.def, name?);
                let statics: Vec<MethodId> = candidates
                    .iter()
                    .copied()
                    .filter(|m| self.symbols.method_def(*m).is_some_and(|def| def.is_static()))
                    .collect();
                if let Some(method) = self.select_method(&statics, Some(&ty), &typed(params)) {
                    return Some((Some(method), self.instantiate(method, Some(&ty), explicit, params, returns)));
                }
                let (first, rest) = params.split_first()?;
                let instance: Vec<MethodId> = candidates
                    .iter()
                    .copied()
                    .filter(|m| self.symbols.method_def(*m).is_some_and(|def| !def.is_static()))
                    .collect();
                let receiver = if self.class_of(first).is_some_and(|c| c.def == class.def) {
                    first.clone()
                } else {
                    ty
                };
                let method = self.select_method(&instance, Some(&receiver), &typed(rest))?;
                Some((Some(method), self.instantiate(method, Some(&receiver), explicit, rest, returns)))
            }
        }
    }

    /// Return type of `method` invoked with `args` in a context expecting
    /// `expected`.
    fn instantiate(&self, method: MethodId, receiver: Option<&Type>, explicit: &[Type], args: &[Type], expected: &Type) -> Type {
        let Some(def) = self.symbols.method_def(method) else {
            return Type::Unknown;
        };
        let vars = def.type_params.clone();
        let mut subst = self.member_subst(receiver, def.owner);
        if explicit.len() == vars.len() && !vars.is_empty() {
            subst.extend(vars.iter().copied().zip(explicit.iter().cloned()));
        } else {
            for (idx, arg) in args.iter().enumerate() {
                let formal = substitute(&formal_for_arg(def, idx, args.len()), &subst);
                self.infer(&formal, arg, &vars, &mut subst);
            }
            if *expected != Type::Void {
                let result = substitute(&def.return_type, &subst);
                self.infer(&result, expected, &vars, &mut subst);
            }
            self.default_unbound(&vars, &mut subst);
        }
        let result = substitute(&def.return_type, &subst);
        if self.is_raw_view(receiver, def.owner) {
            erasure(&self.symbols, &result)
        } else {
            result
        }
    }

    fn is_type_name(&self, expr: ExprId) -> bool {
        matches!(
            &self.unit.exprs[expr].kind,
            ExprKind::Name(name) if matches!(name.resolution(), Resolution::Type(_))
        )
    }

    // --- types --------------------------------------------------------------

    /// The non-wildcard parameterization of a functional interface type.
    fn ground(&self, ty: &Type) -> Type {
        let Type::Class(class) = ty else {
            return ty.clone();
        };
        if !class.args.iter().any(|arg| matches!(arg, Type::Wildcard(..) | Type::Capture(_))) {
            return ty.clone();
        }
        let formals = self
            .symbols
            .class_def(class.def)
            .map(|def| def.type_params.clone())
            .unwrap_or_default();
        let args = class
            .args
            .iter()
            .enumerate()
            .map(|(idx, arg)| {
                let wildcard = match arg {
                    Type::Wildcard(bound, _) => bound.clone(),
                    Type::Capture(capture) => capture.wildcard.clone(),
                    other => return other.clone(),
                };
                match wildcard {
                    WildcardBound::Extends(bound) | WildcardBound::Super(bound) => *bound,
                    WildcardBound::Unbounded => formals
                        .get(idx)
                        .and_then(|tv| self.symbols.type_param_def(*tv))
                        .and_then(|def| def.upper_bounds.first())
                        .filter(|bound| type_vars_in(bound).is_empty())
                        .cloned()
                        .unwrap_or_else(|| self.object_type()),
                }
            })
            .collect();
        Type::Class(ClassType {
            def: class.def,
            args,
            annotations: class.annotations.clone(),
        })
    }

    fn capture(&self, ty: Type, site: usize) -> Type {
        match &ty {
            Type::Class(class) if class.args.iter().any(|arg| matches!(arg, Type::Wildcard(..))) => {
                TyContext::new(&self.symbols).capture_conversion(&ty, site as u32)
            }
            _ => ty,
        }
    }

    /// Replace a top-level capture variable by its upper bound.
    fn project_upward(&self, ty: &Type) -> Type {
        match ty {
            Type::Capture(capture) => capture_upper_bound(&self.symbols, capture),
            Type::Null => self.object_type(),
            other => other.clone(),
        }
    }

    /// Strip type variables, captures and wildcards down to a type with
    /// members.
    pub(super) fn upper_bound(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        for _ in 0..16 {
            current = match current {
                Type::Capture(capture) => capture_upper_bound(&self.symbols, &capture),
                Type::TypeVar(tv, _) => self
                    .symbols
                    .type_param_def(tv)
                    .and_then(|def| def.upper_bounds.first().cloned())
                    .unwrap_or_else(|| self.object_type()),
                Type::Wildcard(WildcardBound::Extends(bound), _) => *bound,
                Type::Wildcard(..) => self.object_type(),
                other => return other,
            };
        }
        current
    }

    fn class_of(&self, ty: &Type) -> Option<ClassType> {
        match self.upper_bound(ty) {
            Type::Class(class) => Some(class),
            Type::Intersection(parts) => parts.iter().find_map(|part| self.class_of(part)),
            Type::Array(..) => match self.object_type() {
                Type::Class(object) => Some(object),
                _ => None,
            },
            _ => None,
        }
    }

    fn is_interface(&self, class: ClassId) -> bool {
        self.symbols
            .class_def(class)
            .is_some_and(|def| def.kind == ClassKind::Interface)
    }

    fn is_interface_type(&self, ty: &Type) -> bool {
        ty.class_id().is_some_and(|class| self.is_interface(class))
    }

    fn is_string(&self, ty: &Type) -> bool {
        match (ty.class_id(), self.symbols.well_known_types()) {
            (Some(class), Some(wk)) => class == wk.string,
            _ => false,
        }
    }

    pub(super) fn boxed(&self, ty: &Type) -> Type {
        match ty {
            Type::Primitive(prim, _) => self.primitive_class(*prim),
            other => other.clone(),
        }
    }

    fn unboxed(&self, ty: &Type) -> Option<PrimitiveType> {
        if let Type::Primitive(prim, _) = ty {
            return Some(*prim);
        }
        let class = self.class_of(ty)?;
        let name = &self.symbols.class_def(class.def)?.binary_name;
        Some(match name.as_str() {
            "java.lang.Boolean" => PrimitiveType::Boolean,
            "java.lang.Byte" => PrimitiveType::Byte,
            "java.lang.Short" => PrimitiveType::Short,
            "java.lang.Character" => PrimitiveType::Char,
            "java.lang.Integer" => PrimitiveType::Int,
            "java.lang.Long" => PrimitiveType::Long,
            "java.lang.Float" => PrimitiveType::Float,
            "java.lang.Double" => PrimitiveType::Double,
            _ => return None,
        })
    }

    fn binary_type(&self, op: BinaryOp, lhs: &Type, rhs: &Type) -> Type {
        let boolean = Type::primitive(PrimitiveType::Boolean);
        match op {
            BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::And
            | BinaryOp::Or => boolean,
            BinaryOp::Add if self.is_string(lhs) || self.is_string(rhs) => self.jdk_type("java.lang.String"),
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => self
                .unboxed(lhs)
                .map_or(Type::Unknown, |prim| Type::primitive(unary_promotion(prim))),
            _ => match (self.unboxed(lhs), self.unboxed(rhs)) {
                (Some(PrimitiveType::Boolean), Some(PrimitiveType::Boolean)) => boolean,
                (Some(a), Some(b)) => Type::primitive(binary_promotion(a, b)),
                _ => Type::Unknown,
            },
        }
    }

    fn conditional_type(&self, then_ty: &Type, else_ty: &Type, expected: Option<&Type>) -> Type {
        if then_ty == else_ty {
            return then_ty.clone();
        }
        match (then_ty, else_ty) {
            (Type::Null, other) | (other, Type::Null) => return self.boxed(other),
            _ => {}
        }
        if let (Some(a), Some(b)) = (self.unboxed(then_ty), self.unboxed(else_ty)) {
            if a.is_numeric() && b.is_numeric() {
                return Type::primitive(binary_promotion(a, b));
            }
        }
        if is_subtype(&self.symbols, then_ty, else_ty) {
            return else_ty.clone();
        }
        if is_subtype(&self.symbols, else_ty, then_ty) {
            return then_ty.clone();
        }
        expected.cloned().unwrap_or_else(|| self.object_type())
    }

    // --- members ------------------------------------------------------------

    /// Field `name` of `class` or its supertypes, closest first.
    pub(super) fn find_field(&self, class: ClassId, name: &str) -> Option<VarId> {
        self.supertype_closure(class).into_iter().find_map(|class| {
            self.symbols.class_def(class)?.fields.iter().copied().find(|field| {
                self.symbols.var_def(*field).is_some_and(|def| def.name == name)
            })
        })
    }

    /// Methods named `name` in `class` and its supertypes; an override hides
    /// the methods with the same erased signature further up.
    pub(super) fn methods_named(&self, class: ClassId, name: &str) -> Vec<MethodId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut classes = self.supertype_closure(class);
        if self.symbols.class_def(class).is_some_and(|def| def.kind.is_interface_like()) {
            if let Some(wk) = self.symbols.well_known_types() {
                classes.push(wk.object);
            }
        }
        for current in classes {
            let Some(def) = self.symbols.class_def(current) else {
                continue;
            };
            for method in &def.methods {
                let Some(method_def) = self.symbols.method_def(*method) else {
                    continue;
                };
                if method_def.name != name || method_def.is_constructor {
                    continue;
                }
                let signature: Vec<Type> = method_def
                    .params
                    .iter()
                    .map(|param| erasure(&self.symbols, param))
                    .collect();
                if seen.insert(signature) {
                    out.push(*method);
                }
            }
        }
        out
    }

    /// `class` followed by its supertypes in breadth-first order.
    fn supertype_closure(&self, class: ClassId) -> Vec<ClassId> {
        let mut order = vec![class];
        let mut seen: HashSet<ClassId> = order.iter().copied().collect();
        let mut idx = 0;
        while idx < order.len() {
            for parent in self.direct_supertypes(order[idx]) {
                if seen.insert(parent) {
                    order.push(parent);
                }
            }
            idx += 1;
        }
        order
    }

    // --- constants ----------------------------------------------------------

    /// Constant value of `id`, converted to `expected` when that is a
    /// primitive type.
    pub(super) fn const_value(&mut self, id: ExprId, expected: Option<&Type>) -> Option<ConstValue> {
        let value = self.fold_const(id, expected)?;
        Some(match expected {
            Some(Type::Primitive(prim, _)) => convert_const(value, *prim),
            // A single element value of an array-typed annotation member.
            Some(Type::Array(..)) if !matches!(value, ConstValue::Array(_)) => {
                ConstValue::Array(vec![value])
            }
            _ => value,
        })
    }

    fn fold_const(&mut self, id: ExprId, expected: Option<&Type>) -> Option<ConstValue> {
        let expr = self.unit.exprs[id].clone();
        match expr.kind {
            ExprKind::Literal { value, .. } => value,
            ExprKind::Paren(inner) | ExprKind::Cast { expr: inner, .. } => self.fold_const(inner, expected),
            ExprKind::Unary { op, operand } => {
                let value = self.fold_const(operand, None)?;
                match (op, value) {
                    (UnaryOp::Plus, value) => Some(value),
                    (UnaryOp::Minus, ConstValue::Int(v)) => Some(ConstValue::Int(i64::from((v as i32).wrapping_neg()))),
                    (UnaryOp::Minus, ConstValue::Long(v)) => Some(ConstValue::Long(v.wrapping_neg())),
                    (UnaryOp::Minus, ConstValue::Double(bits)) => Some(ConstValue::double(-f64::from_bits(bits))),
                    (UnaryOp::Minus, ConstValue::Float(bits)) => Some(ConstValue::Float((-f64::from_bits(bits)).to_bits())),
                    (UnaryOp::Not, ConstValue::Bool(v)) => Some(ConstValue::Bool(!v)),
                    (UnaryOp::BitNot, ConstValue::Int(v)) => Some(ConstValue::Int(!v)),
                    (UnaryOp::BitNot, ConstValue::Long(v)) => Some(ConstValue::Long(!v)),
                    _ => None,
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.fold_const(lhs, None)?;
                let rhs = self.fold_const(rhs, None)?;
                fold_binary(op, lhs, rhs)
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => match self.fold_const(cond, None)? {
                ConstValue::Bool(true) => self.fold_const(then_expr, expected),
                ConstValue::Bool(false) => self.fold_const(else_expr, expected),
                _ => None,
            },
            ExprKind::Name(name) => match name.resolution() {
                Resolution::Var(var) => self.var_const(*var),
                _ => None,
            },
            ExprKind::FieldAccess { field, .. } => self.var_const(field?),
            ExprKind::ClassLit(ty) => Some(ConstValue::Class(self.unit.type_refs[ty].ty.clone()?)),
            ExprKind::ArrayInit(elements) => {
                let component = match expected {
                    Some(Type::Array(component, _)) => Some((**component).clone()),
                    _ => None,
                };
                let values = elements
                    .iter()
                    .map(|element| self.const_value(*element, component.as_ref()))
                    .collect::<Option<Vec<_>>>()?;
                Some(ConstValue::Array(values))
            }
            ExprKind::Annotation(annotation) => {
                Some(ConstValue::Annotation(Box::new(self.resolve_annotation(annotation)?)))
            }
            _ => None,
        }
    }

    fn var_const(&self, var: VarId) -> Option<ConstValue> {
        let def = self.symbols.var_def(var)?;
        match def.kind {
            VarKind::EnumConstant => Some(ConstValue::Enum {
                ty: def.declaring_class?,
                name: def.name.clone(),
            }),
            _ => def.constant.clone(),
        }
    }
}

/// The formal parameter type an argument at `idx` is matched against; with
/// `arity` beyond the declared count, trailing arguments match the varargs
/// component.
fn formal_for_arg(def: &nova_types::MethodDef, idx: usize, arity: usize) -> Type {
    let count = def.params.len();
    let spread = def.is_varargs && (arity != count || arity == usize::MAX);
    if spread && idx + 1 >= count {
        if let Some(Type::Array(component, _)) = def.params.last() {
            return (**component).clone();
        }
    }
    def.params
        .get(idx)
        .or_else(|| def.params.last())
        .cloned()
        .unwrap_or(Type::Unknown)
}

fn type_vars_in(ty: &Type) -> Vec<TypeVarId> {
    let mut out = Vec::new();
    collect_type_vars(ty, &mut out);
    out
}

fn collect_type_vars(ty: &Type, out: &mut Vec<TypeVarId>) {
    match ty {
        Type::TypeVar(tv, _) => out.push(*tv),
        Type::Class(class) => class.args.iter().for_each(|arg| collect_type_vars(arg, out)),
        Type::Array(component, _) => collect_type_vars(component, out),
        Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound), _) => {
            collect_type_vars(bound, out)
        }
        Type::Intersection(parts) | Type::Union(parts) => {
            parts.iter().for_each(|part| collect_type_vars(part, out))
        }
        _ => {}
    }
}

fn unary_promotion(prim: PrimitiveType) -> PrimitiveType {
    if prim.numeric_rank() < PrimitiveType::Int.numeric_rank() {
        PrimitiveType::Int
    } else {
        prim
    }
}

fn binary_promotion(a: PrimitiveType, b: PrimitiveType) -> PrimitiveType {
    let wider = if a.numeric_rank() >= b.numeric_rank() { a } else { b };
    unary_promotion(wider)
}

fn convert_const(value: ConstValue, target: PrimitiveType) -> ConstValue {
    let integral = match &value {
        ConstValue::Int(v) | ConstValue::Long(v) => Some(*v),
        ConstValue::Char(c) => Some(i64::from(u32::from(*c))),
        _ => None,
    };
    match (target, integral) {
        (PrimitiveType::Long, Some(v)) => ConstValue::Long(v),
        (PrimitiveType::Int | PrimitiveType::Short | PrimitiveType::Byte, Some(v)) => ConstValue::Int(v),
        (PrimitiveType::Char, Some(v)) => char::from_u32(v as u32).map_or(value, ConstValue::Char),
        (PrimitiveType::Double, Some(v)) => ConstValue::double(v as f64),
        (PrimitiveType::Float, Some(v)) => ConstValue::Float((v as f32 as f64).to_bits()),
        (PrimitiveType::Double, None) => match value {
            ConstValue::Float(bits) => ConstValue::Double(bits),
            other => other,
        },
        _ => value,
    }
}

fn const_to_string(value: &ConstValue) -> Option<String> {
    Some(match value {
        ConstValue::String(s) => s.clone(),
        ConstValue::Int(v) | ConstValue::Long(v) => v.to_string(),
        ConstValue::Char(c) => c.to_string(),
        ConstValue::Bool(b) => b.to_string(),
        ConstValue::Float(bits) | ConstValue::Double(bits) => {
            let v = f64::from_bits(*bits);
            if v.fract() == 0.0 && v.abs() < 1e7 {
                format!("{v:.1}")
            } else {
                v.to_string()
            }
        }
        _ => return None,
    })
}

fn fold_binary(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
    use ConstValue::{Bool, Double, Float, Int, Long};

    if op == BinaryOp::Add && (matches!(lhs, ConstValue::String(_)) || matches!(rhs, ConstValue::String(_))) {
        return Some(ConstValue::String(format!("{}{}", const_to_string(&lhs)?, const_to_string(&rhs)?)));
    }
    if let (Bool(a), Bool(b)) = (&lhs, &rhs) {
        let (a, b) = (*a, *b);
        return Some(Bool(match op {
            BinaryOp::And | BinaryOp::BitAnd => a && b,
            BinaryOp::Or | BinaryOp::BitOr => a || b,
            BinaryOp::BitXor | BinaryOp::Ne => a != b,
            BinaryOp::Eq => a == b,
            _ => return None,
        }));
    }
    let integral = |value: &ConstValue| match value {
        Int(v) | Long(v) => Some(*v),
        ConstValue::Char(c) => Some(i64::from(u32::from(*c))),
        _ => None,
    };
    let floating = |value: &ConstValue| match value {
        Float(bits) | Double(bits) => Some(f64::from_bits(*bits)),
        other => integral(other).map(|v| v as f64),
    };
    let is_floating = matches!(lhs, Float(_) | Double(_)) || matches!(rhs, Float(_) | Double(_));
    if is_floating {
        let (a, b) = (floating(&lhs)?, floating(&rhs)?);
        let wrap = |v: f64| {
            if matches!(lhs, Double(_)) || matches!(rhs, Double(_)) {
                ConstValue::double(v)
            } else {
                Float((v as f32 as f64).to_bits())
            }
        };
        return Some(match op {
            BinaryOp::Add => wrap(a + b),
            BinaryOp::Sub => wrap(a - b),
            BinaryOp::Mul => wrap(a * b),
            BinaryOp::Div => wrap(a / b),
            BinaryOp::Rem => wrap(a % b),
            BinaryOp::Lt => Bool(a < b),
            BinaryOp::Gt => Bool(a > b),
            BinaryOp::Le => Bool(a <= b),
            BinaryOp::Ge => Bool(a >= b),
            BinaryOp::Eq => Bool(a == b),
            BinaryOp::Ne => Bool(a != b),
            _ => return None,
        });
    }
    let (a, b) = (integral(&lhs)?, integral(&rhs)?);
    let long = matches!(lhs, Long(_)) || matches!(rhs, Long(_));
    let wrap = |v: i64| if long { Long(v) } else { Int(i64::from(v as i32)) };
    let shift = if long { (b & 63) as u32 } else { (b & 31) as u32 };
    Some(match op {
        BinaryOp::Add => wrap(a.wrapping_add(b)),
        BinaryOp::Sub => wrap(a.wrapping_sub(b)),
        BinaryOp::Mul => wrap(a.wrapping_mul(b)),
        BinaryOp::Div if b != 0 => wrap(a.wrapping_div(b)),
        BinaryOp::Rem if b != 0 => wrap(a.wrapping_rem(b)),
        BinaryOp::Shl => wrap(a.wrapping_shl(shift)),
        BinaryOp::Shr if long => Long(a >> shift),
        BinaryOp::Shr => Int(i64::from((a as i32) >> shift)),
        BinaryOp::UShr if long => Long(((a as u64) >> shift) as i64),
        BinaryOp::UShr => Int(i64::from(((a as i32 as u32) >> shift) as i32)),
        BinaryOp::BitAnd => wrap(a & b),
        BinaryOp::BitOr => wrap(a | b),
        BinaryOp::BitXor => wrap(a ^ b),
        BinaryOp::Lt => Bool(a < b),
        BinaryOp::Gt => Bool(a > b),
        BinaryOp::Le => Bool(a <= b),
        BinaryOp::Ge => Bool(a >= b),
        BinaryOp::Eq => Bool(a == b),
        BinaryOp::Ne => Bool(a != b),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn folds_int_arithmetic_with_wrapping() {
        assert_eq!(
            fold_binary(BinaryOp::Add, ConstValue::Int(i64::from(i32::MAX)), ConstValue::Int(1)),
            Some(ConstValue::Int(i64::from(i32::MIN)))
        );
        assert_eq!(
            fold_binary(BinaryOp::Shl, ConstValue::Long(1), ConstValue::Int(40)),
            Some(ConstValue::Long(1 << 40))
        );
        assert_eq!(fold_binary(BinaryOp::Div, ConstValue::Int(1), ConstValue::Int(0)), None);
    }

    #[test]
    fn folds_string_concatenation() {
        assert_eq!(
            fold_binary(
                BinaryOp::Add,
                ConstValue::String("v".into()),
                ConstValue::double(2.0)
            ),
            Some(ConstValue::String("v2.0".into()))
        );
    }

    #[test]
    fn promotes_small_integral_types_to_int() {
        assert_eq!(binary_promotion(PrimitiveType::Byte, PrimitiveType::Char), PrimitiveType::Int);
        assert_eq!(binary_promotion(PrimitiveType::Int, PrimitiveType::Float), PrimitiveType::Float);
        assert_eq!(
            convert_const(ConstValue::Int(1), PrimitiveType::Long),
            ConstValue::Long(1)
        );
    }
}
