//! Node → binding queries and their inverse.

use std::ptr;

use nova_hir::{AnnotationId, ExprId, ExprKind, MethodRefKind, Resolution, StmtKind};
use nova_types::{MethodId, Type};

use super::{
    key, AnnotationBinding, Binding, MemberValuePairBinding, MethodBinding, MethodOrigin, Query,
    TypeBinding, VariableBinding,
};
use crate::ast::{Node, NodeId, NodeKind};
use crate::convert::{AnnotationOwner, Declared, Origin};
use crate::Dom;

impl Dom {
    /// The binding of whatever `node` denotes, or `None` when it denotes
    /// nothing or did not resolve.
    ///
    /// Results are memoized per node, so asking twice yields the same
    /// instance.
    ///
    /// # Panics
    ///
    /// If `node` belongs to another tree.
    pub fn resolve_binding(&self, node: NodeId) -> Option<Binding<'_>> {
        self.ast.get(node);
        if !self.options.resolve_bindings {
            return None;
        }
        let id = self
            .bindings
            .memo(node, Query::Binding, || Some(self.compute_binding(node)?.id()))?;
        Some(Binding::from_id(self, id))
    }

    /// The type of an expression, declaration or type node.
    pub fn resolve_type_binding(&self, node: NodeId) -> Option<TypeBinding<'_>> {
        self.ast.get(node);
        if !self.options.resolve_bindings {
            return None;
        }
        let id = self
            .bindings
            .memo(node, Query::Type, || Some(self.compute_type(node)?.id))?;
        Some(TypeBinding::new(self, id))
    }

    /// Methods, method invocations, method references and lambdas.
    pub fn resolve_method_binding(&self, node: NodeId) -> Option<MethodBinding<'_>> {
        if is_constructor_site(self.kind(node)) {
            return None;
        }
        match self.resolve_binding(node)? {
            Binding::Method(method) => Some(method),
            _ => None,
        }
    }

    /// The constructor invoked by an instance creation, an explicit
    /// constructor call or an enum constant.
    pub fn resolve_constructor_binding(&self, node: NodeId) -> Option<MethodBinding<'_>> {
        if !is_constructor_site(self.kind(node)) {
            return None;
        }
        if let Some(Origin::EnumConstant { ctor, .. }) = self.origins.get(&node) {
            if !self.options.resolve_bindings {
                return None;
            }
            return self.method_binding((*ctor)?, None);
        }
        match self.resolve_binding(node)? {
            Binding::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Variable declarations, and names or field accesses denoting a variable.
    pub fn resolve_variable_binding(&self, node: NodeId) -> Option<VariableBinding<'_>> {
        match self.resolve_binding(node)? {
            Binding::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Only defined on `SimpleName` and `QualifiedName`.
    pub fn resolve_name(&self, node: NodeId) -> Option<Binding<'_>> {
        if !self.kind(node).is_name() {
            return None;
        }
        self.resolve_binding(node)
    }

    pub fn resolve_annotation_binding(&self, node: NodeId) -> Option<AnnotationBinding<'_>> {
        if !self.kind(node).is_annotation() {
            return None;
        }
        match self.resolve_binding(node)? {
            Binding::Annotation(annotation) => Some(annotation),
            _ => None,
        }
    }

    /// The node of this tree declaring the symbol `binding` denotes: a type,
    /// type parameter, method, lambda, variable, package or module
    /// declaration. `None` for symbols declared elsewhere and for bindings
    /// of another tree.
    pub fn find_declaring_node(&self, binding: &Binding<'_>) -> Option<NodeId> {
        if !ptr::eq(binding.dom(), self) {
            return None;
        }
        let declared = match binding {
            Binding::Type(ty) => match ty.ty() {
                Type::TypeVar(tv, _) => Declared::TypeParam(*tv),
                other => Declared::Class(other.class_id()?),
            },
            Binding::Method(method) => match &method.data.origin {
                MethodOrigin::Declared(method) => Declared::Method(*method),
                MethodOrigin::Lambda { expr, .. } => Declared::Lambda(*expr),
            },
            Binding::Variable(variable) if variable.is_synthetic() => return None,
            Binding::Variable(variable) => Declared::Var(variable.data.var),
            Binding::Package(package) => Declared::Package(package.package),
            Binding::Module(module) => Declared::Module(module.module),
            Binding::Annotation(_) | Binding::MemberValuePair(_) => return None,
        };
        self.declarations.get(&declared).copied()
    }

    /// Like [`Dom::find_declaring_node`], looking the symbol up by key.
    pub fn find_declaring_node_by_key(&self, key: &str) -> Option<NodeId> {
        if !self.options.resolve_bindings {
            return None;
        }
        self.declarations
            .iter()
            .filter(|(declared, _)| {
                self.declared_binding(**declared)
                    .is_some_and(|binding| binding.key() == key)
            })
            .map(|(_, node)| *node)
            .min()
    }

    fn declared_binding(&self, declared: Declared) -> Option<Binding<'_>> {
        Some(match declared {
            Declared::Class(class) => self.class_declaration_binding(class)?.into(),
            Declared::Method(method) => self.method_binding(method, None)?.into(),
            Declared::Var(var) => self.variable_binding(var)?.into(),
            Declared::TypeParam(tv) => self.type_binding(&Type::type_var(tv))?.into(),
            Declared::Package(package) => self.package_binding(package)?.into(),
            Declared::Module(module) => self.module_binding(module)?.into(),
            Declared::Lambda(expr) => self.lambda_binding(expr)?.into(),
        })
    }

    fn compute_binding(&self, node: NodeId) -> Option<Binding<'_>> {
        let origin = self.origins.get(&node)?;
        tracing::trace!(?node, ?origin, "resolving binding");
        Some(match origin {
            Origin::Type {
                ty,
                generic_declaration,
            } => {
                let ty = ty.as_ref()?;
                match ty.class_id() {
                    Some(class) if *generic_declaration => {
                        self.class_declaration_binding(class)?.into()
                    }
                    _ => self.type_occurrence_binding(ty)?.into(),
                }
            }
            Origin::Name { resolution, expr } => {
                if let Some(owner) = self.type_owning_name(node) {
                    return self.resolve_binding(owner);
                }
                if let Some(binding) = expr.and_then(|expr| self.expr_member_binding(expr)) {
                    return Some(binding);
                }
                self.resolution_binding(resolution)?
            }
            Origin::Expr(expr) => self.expr_binding(*expr)?,
            Origin::Stmt(stmt) => match &self.unit().stmts.get(*stmt)?.kind {
                StmtKind::ConstructorCall { ctor, .. } => self.method_binding((*ctor)?, None)?.into(),
                _ => return None,
            },
            Origin::Class(class) => self.class_declaration_binding(*class)?.into(),
            Origin::Method(method) => self.method_binding(*method, None)?.into(),
            Origin::Var(var) => self.variable_binding(*var)?.into(),
            Origin::EnumConstant { var, .. } => self.variable_binding((*var)?)?.into(),
            Origin::TypeParam(tv) => self.type_binding(&Type::type_var(*tv))?.into(),
            Origin::Package(package) => self.package_binding(*package)?.into(),
            Origin::Module(module) => self.module_binding(*module)?.into(),
            Origin::Annotation { id, owner } => self.annotation_node_binding(*id, *owner)?.into(),
            Origin::MemberValuePair {
                annotation,
                owner,
                name,
            } => {
                let annotation = self.annotation_node_binding(*annotation, *owner)?;
                let value = annotation
                    .instance()
                    .values
                    .iter()
                    .find(|(member, _)| name == member.as_str())
                    .map(|(_, value)| value.clone());
                let pair: MemberValuePairBinding<'_> =
                    self.member_value_pair_binding(&annotation.data, name.as_str(), value)?;
                pair.into()
            }
            Origin::Unresolved => return None,
        })
    }

    fn compute_type(&self, node: NodeId) -> Option<TypeBinding<'_>> {
        let origin = self.origins.get(&node)?;
        let ty = match origin {
            Origin::Type { .. } | Origin::Class(_) | Origin::TypeParam(_) => {
                return match self.resolve_binding(node)? {
                    Binding::Type(ty) => Some(ty),
                    _ => None,
                };
            }
            Origin::Annotation { .. } => {
                return self.resolve_annotation_binding(node)?.annotation_type();
            }
            Origin::Expr(expr)
            | Origin::Name {
                expr: Some(expr), ..
            } => self.unit().exprs.get(*expr)?.ty.as_ref()?,
            Origin::Name { resolution, .. } => match resolution {
                Resolution::Var(var) => &self.symbols().var_def(*var)?.ty,
                Resolution::Type(ty) => ty,
                _ => return None,
            },
            Origin::Var(var)
            | Origin::EnumConstant {
                var: Some(var), ..
            } => &self.symbols().var_def(*var)?.ty,
            _ => return None,
        };
        self.type_binding(ty)
    }

    /// The type node whose `name` child is `node`; such names resolve like
    /// the type they spell.
    fn type_owning_name(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let name = match self.node(parent) {
            Node::SimpleType(ty) => ty.name,
            Node::QualifiedType(ty) => ty.name,
            Node::NameQualifiedType(ty) => ty.name,
            _ => return None,
        };
        (name == node).then_some(parent)
    }

    fn resolution_binding(&self, resolution: &Resolution) -> Option<Binding<'_>> {
        Some(match resolution {
            Resolution::Package(package) => self.package_binding(*package)?.into(),
            Resolution::Type(ty) => self.type_binding(ty)?.into(),
            Resolution::Var(var) => self.variable_binding(*var)?.into(),
            Resolution::Method(method) => self.method_binding(*method, None)?.into(),
            Resolution::Module(module) => self.module_binding(*module)?.into(),
            Resolution::Unresolved => return None,
        })
    }

    /// Binding of the member an invocation, reference or field access names.
    fn expr_member_binding(&self, expr: ExprId) -> Option<Binding<'_>> {
        let unit = self.unit();
        let receiver_ty = |receiver: ExprId| unit.exprs.get(receiver).and_then(|e| e.ty.as_ref());
        Some(match &unit.exprs.get(expr)?.kind {
            ExprKind::MethodCall {
                receiver, method, ..
            } => self
                .method_binding((*method)?, receiver.and_then(receiver_ty))?
                .into(),
            ExprKind::SuperMethodCall { method, .. } => self.method_binding((*method)?, None)?.into(),
            ExprKind::MethodRef { kind, method, .. } => {
                self.method_binding((*method)?, self.reference_receiver(kind))?.into()
            }
            ExprKind::FieldAccess { field, .. } | ExprKind::SuperFieldAccess { field, .. } => {
                self.variable_binding((*field)?)?.into()
            }
            _ => return None,
        })
    }

    fn expr_binding(&self, expr: ExprId) -> Option<Binding<'_>> {
        let hir = self.unit().exprs.get(expr)?;
        match &hir.kind {
            ExprKind::Lambda { .. } => Some(self.lambda_binding(expr)?.into()),
            ExprKind::New { ctor, .. } => Some(self.constructor(*ctor, hir.ty.as_ref())?.into()),
            ExprKind::MethodCall { .. }
            | ExprKind::SuperMethodCall { .. }
            | ExprKind::MethodRef { .. }
            | ExprKind::FieldAccess { .. }
            | ExprKind::SuperFieldAccess { .. } => self.expr_member_binding(expr),
            _ => None,
        }
    }

    fn constructor(&self, ctor: Option<MethodId>, created: Option<&Type>) -> Option<MethodBinding<'_>> {
        self.method_binding(ctor?, created)
    }

    fn reference_receiver(&self, kind: &MethodRefKind) -> Option<&Type> {
        match kind {
            MethodRefKind::Expr(receiver) => self.unit().exprs.get(*receiver)?.ty.as_ref(),
            MethodRefKind::Type(ty) | MethodRefKind::New(ty) => {
                self.unit().type_refs.get(*ty)?.ty.as_ref()
            }
            MethodRefKind::Super(_) => None,
        }
    }

    /// Binding of the annotation `id` as found on its owner.
    fn annotation_node_binding(
        &self,
        id: AnnotationId,
        owner: AnnotationOwner,
    ) -> Option<AnnotationBinding<'_>> {
        let annotation = self.unit().annotations.get(id)?;
        let instance = annotation.resolved.as_ref()?;
        let symbols = self.symbols();
        let element = match owner {
            AnnotationOwner::Class(class) => key::declaration_key(symbols, class)?,
            AnnotationOwner::Method(method) => self.method_binding(method, None)?.key().to_string(),
            AnnotationOwner::Var(var) => self.variable_binding(var)?.key().to_string(),
            AnnotationOwner::TypeParam(tv) => key::type_var_key(symbols, tv)?,
            AnnotationOwner::Package(package) => {
                key::package_key(&symbols.package(package)?.name)
            }
            AnnotationOwner::Module(module) => key::module_key(&symbols.module(module)?.name),
            // Occurrence-scoped: keyed by where the annotation is written.
            AnnotationOwner::TypeUse | AnnotationOwner::Value | AnnotationOwner::Unknown => {
                format!("@{}", annotation.span.start)
            }
        };
        self.annotation_binding(instance, &element)
    }
}

fn is_constructor_site(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ClassInstanceCreation
            | NodeKind::ConstructorInvocation
            | NodeKind::SuperConstructorInvocation
            | NodeKind::EnumConstantDeclaration
    )
}
