//! Bindings: resolved symbols, handed out lazily per node.
//!
//! A binding is a small handle (`XBinding<'dom>`) into the [`BindingDb`] of
//! the [`Dom`] that produced it. The database lives exactly as long as the
//! tree, so nothing is remembered across conversion passes.
//!
//! Identity has two levels:
//! * `==` compares binding *instances*;
//! * `is_equal_to` compares [keys](key), i.e. the symbols denoted.
//!
//! Unannotated types, methods, variables and packages are interned by key,
//! so every request for them yields the same instance. An annotated type
//! occurrence gets its own instance, which is why two `@A String` uses are
//! `is_equal_to` but not `==`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use nova_hir::ExprId;
use nova_types::{
    has_type_annotations, AnnotationInstance, ConstValue, MethodId, ModuleId, PackageId, Type,
    VarId,
};

use crate::ast::NodeId;
use crate::Dom;

mod annotations;
pub(crate) mod key;
mod methods;
mod resolver;
mod types;
mod variables;

pub use annotations::{AnnotationBinding, MemberValuePairBinding, ModuleBinding, PackageBinding};
pub use methods::MethodBinding;
pub use types::TypeBinding;
pub use variables::VariableBinding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct BindingId(u32);

#[derive(Debug)]
pub(crate) struct TypeData {
    pub ty: Type,
    /// The generic declaration itself (`List<E>` as declared) rather than a
    /// use of it.
    pub declaration: bool,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MethodOrigin {
    Declared(MethodId),
    /// The method a lambda expression implements: its functional interface
    /// method with the lambda's own parameter types.
    Lambda {
        expr: ExprId,
        sam: MethodId,
        site: u32,
        outer_locals: Vec<VarId>,
    },
}

#[derive(Debug)]
pub(crate) struct MethodData {
    pub origin: MethodOrigin,
    pub declaring: Type,
    pub params: Vec<Type>,
    pub ret: Type,
    pub thrown: Vec<Type>,
    pub key: String,
}

#[derive(Debug)]
pub(crate) struct VariableData {
    pub var: VarId,
    pub ty: Type,
    pub key: String,
    /// Set for the synthetic copy of a captured local (`val$name`).
    pub synthetic_name: Option<String>,
}

#[derive(Debug)]
pub(crate) struct AnnotationData {
    pub instance: AnnotationInstance,
    pub key: String,
}

#[derive(Debug)]
pub(crate) struct MemberValuePairData {
    pub name: String,
    pub value: Option<ConstValue>,
    pub method: Option<MethodId>,
    pub key: String,
}

#[derive(Debug, Clone)]
pub(crate) enum BindingData {
    Type(Arc<TypeData>),
    Method(Arc<MethodData>),
    Variable(Arc<VariableData>),
    Annotation(Arc<AnnotationData>),
    MemberValuePair(Arc<MemberValuePairData>),
    Package(PackageId, Arc<str>),
    Module(ModuleId, Arc<str>),
}

impl BindingData {
    fn key(&self) -> &str {
        match self {
            BindingData::Type(data) => &data.key,
            BindingData::Method(data) => &data.key,
            BindingData::Variable(data) => &data.key,
            BindingData::Annotation(data) => &data.key,
            BindingData::MemberValuePair(data) => &data.key,
            BindingData::Package(_, key) | BindingData::Module(_, key) => key,
        }
    }
}

/// Per-pass binding storage.
#[derive(Debug, Default)]
pub(crate) struct BindingDb {
    data: RefCell<Vec<BindingData>>,
    by_key: RefCell<HashMap<(BindingKind, String), BindingId>>,
    /// Memo of node resolutions, including failed ones.
    by_node: RefCell<HashMap<(NodeId, Query), Option<BindingId>>>,
}

/// The two questions a node can be asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Query {
    Binding,
    Type,
}

impl BindingDb {
    pub(crate) fn get(&self, id: BindingId) -> BindingData {
        match self.data.borrow().get(id.0 as usize) {
            Some(data) => data.clone(),
            None => panic!("{id:?} was not allocated by this binding database"),
        }
    }

    /// The binding of `kind` interned under `key`, created by `make` on
    /// first request.
    pub(crate) fn intern(
        &self,
        kind: BindingKind,
        key: &str,
        make: impl FnOnce() -> Option<BindingData>,
    ) -> Option<BindingId> {
        let slot = (kind, key.to_string());
        if let Some(id) = self.by_key.borrow().get(&slot) {
            return Some(*id);
        }
        tracing::trace!(?kind, key, "binding cache miss");
        let id = self.fresh(make()?);
        self.by_key.borrow_mut().insert(slot, id);
        Some(id)
    }

    /// The memoized answer of `query` on `node`, computed by `resolve` once.
    pub(crate) fn memo(
        &self,
        node: NodeId,
        query: Query,
        resolve: impl FnOnce() -> Option<BindingId>,
    ) -> Option<BindingId> {
        if let Some(known) = self.by_node.borrow().get(&(node, query)) {
            return *known;
        }
        let resolved = resolve();
        self.by_node.borrow_mut().insert((node, query), resolved);
        resolved
    }

    /// A new instance that is never shared through the key table.
    pub(crate) fn fresh(&self, data: BindingData) -> BindingId {
        let mut all = self.data.borrow_mut();
        let id = BindingId(all.len() as u32);
        all.push(data);
        id
    }
}

/// What a [`Binding`] denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Type,
    Method,
    Variable,
    Annotation,
    MemberValuePair,
    Package,
    Module,
}

/// Any binding.
#[derive(Clone, PartialEq)]
pub enum Binding<'dom> {
    Type(TypeBinding<'dom>),
    Method(MethodBinding<'dom>),
    Variable(VariableBinding<'dom>),
    Annotation(AnnotationBinding<'dom>),
    MemberValuePair(MemberValuePairBinding<'dom>),
    Package(PackageBinding<'dom>),
    Module(ModuleBinding<'dom>),
}

impl<'dom> Binding<'dom> {
    pub(crate) fn from_id(dom: &'dom Dom, id: BindingId) -> Self {
        match dom.bindings.get(id) {
            BindingData::Type(data) => Binding::Type(TypeBinding { dom, id, data }),
            BindingData::Method(data) => Binding::Method(MethodBinding { dom, id, data }),
            BindingData::Variable(data) => Binding::Variable(VariableBinding { dom, id, data }),
            BindingData::Annotation(data) => Binding::Annotation(AnnotationBinding { dom, id, data }),
            BindingData::MemberValuePair(data) => {
                Binding::MemberValuePair(MemberValuePairBinding { dom, id, data })
            }
            BindingData::Package(package, key) => Binding::Package(PackageBinding {
                dom,
                id,
                package,
                key,
            }),
            BindingData::Module(module, key) => Binding::Module(ModuleBinding {
                dom,
                id,
                module,
                key,
            }),
        }
    }

    pub(crate) fn id(&self) -> BindingId {
        match self {
            Binding::Type(b) => b.id,
            Binding::Method(b) => b.id,
            Binding::Variable(b) => b.id,
            Binding::Annotation(b) => b.id,
            Binding::MemberValuePair(b) => b.id,
            Binding::Package(b) => b.id,
            Binding::Module(b) => b.id,
        }
    }

    fn dom(&self) -> &'dom Dom {
        match self {
            Binding::Type(b) => b.dom,
            Binding::Method(b) => b.dom,
            Binding::Variable(b) => b.dom,
            Binding::Annotation(b) => b.dom,
            Binding::MemberValuePair(b) => b.dom,
            Binding::Package(b) => b.dom,
            Binding::Module(b) => b.dom,
        }
    }

    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Type(_) => BindingKind::Type,
            Binding::Method(_) => BindingKind::Method,
            Binding::Variable(_) => BindingKind::Variable,
            Binding::Annotation(_) => BindingKind::Annotation,
            Binding::MemberValuePair(_) => BindingKind::MemberValuePair,
            Binding::Package(_) => BindingKind::Package,
            Binding::Module(_) => BindingKind::Module,
        }
    }

    pub fn key(&self) -> String {
        self.dom().bindings.get(self.id()).key().to_string()
    }

    pub fn name(&self) -> String {
        match self {
            Binding::Type(b) => b.name(),
            Binding::Method(b) => b.name(),
            Binding::Variable(b) => b.name(),
            Binding::Annotation(b) => b.name(),
            Binding::MemberValuePair(b) => b.name().to_string(),
            Binding::Package(b) => b.name().to_string(),
            Binding::Module(b) => b.name().to_string(),
        }
    }

    /// Whether both bindings denote the same symbol.
    pub fn is_equal_to(&self, other: &Binding<'_>) -> bool {
        self.key() == other.key()
    }

    pub fn is_deprecated(&self) -> bool {
        match self {
            Binding::Type(b) => b.is_deprecated(),
            Binding::Method(b) => b.is_deprecated(),
            Binding::Variable(b) => b.is_deprecated(),
            _ => false,
        }
    }

    pub fn as_type(&self) -> Option<&TypeBinding<'dom>> {
        match self {
            Binding::Type(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodBinding<'dom>> {
        match self {
            Binding::Method(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableBinding<'dom>> {
        match self {
            Binding::Variable(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationBinding<'dom>> {
        match self {
            Binding::Annotation(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind(), self.key())
    }
}

/// `PartialEq` by instance and `Debug` by key for one handle type.
macro_rules! binding_handle {
    ($name:ident, $variant:ident) => {
        impl PartialEq for $name<'_> {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::eq(self.dom, other.dom) && self.id == other.id
            }
        }

        impl Eq for $name<'_> {}

        impl std::fmt::Debug for $name<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.key())
            }
        }

        impl<'dom> $name<'dom> {
            /// Whether both bindings denote the same symbol.
            pub fn is_equal_to(&self, other: &$name<'_>) -> bool {
                self.key() == other.key()
            }
        }

        impl<'dom> From<$name<'dom>> for $crate::bindings::Binding<'dom> {
            fn from(value: $name<'dom>) -> Self {
                $crate::bindings::Binding::$variant(value)
            }
        }
    };
}

pub(crate) use binding_handle;

impl Dom {
    /// Binding of `ty` as a use of that type. Annotated types are interned
    /// per distinct annotation set; `None` for unresolved types.
    pub(crate) fn type_binding(&self, ty: &Type) -> Option<TypeBinding<'_>> {
        let key = key::type_key(self.symbols(), ty)?;
        let interned = if has_type_annotations(ty) {
            format!("{key}|{ty:?}")
        } else {
            key.clone()
        };
        let id = self.bindings.intern(BindingKind::Type, &interned, || {
            Some(BindingData::Type(Arc::new(TypeData {
                ty: ty.clone(),
                declaration: false,
                key,
            })))
        })?;
        Some(TypeBinding::new(self, id))
    }

    /// A fresh binding for one annotated occurrence of `ty`.
    pub(crate) fn type_occurrence_binding(&self, ty: &Type) -> Option<TypeBinding<'_>> {
        if !has_type_annotations(ty) {
            return self.type_binding(ty);
        }
        let key = key::type_key(self.symbols(), ty)?;
        let id = self.bindings.fresh(BindingData::Type(Arc::new(TypeData {
            ty: ty.clone(),
            declaration: false,
            key,
        })));
        Some(TypeBinding::new(self, id))
    }

    /// Binding of a class as declared; generic classes are parameterized by
    /// their own type variables.
    pub(crate) fn class_declaration_binding(&self, class: nova_types::ClassId) -> Option<TypeBinding<'_>> {
        let def = self.symbols().class_def(class)?;
        if !def.is_generic() {
            return self.type_binding(&Type::class(class, Vec::new()));
        }
        let key = key::declaration_key(self.symbols(), class)?;
        let ty = Type::class(class, def.type_params.iter().map(|tv| Type::type_var(*tv)).collect());
        let interned = key.clone();
        let id = self.bindings.intern(BindingKind::Type, &interned, || {
            Some(BindingData::Type(Arc::new(TypeData {
                ty,
                declaration: true,
                key,
            })))
        })?;
        Some(TypeBinding::new(self, id))
    }

    pub(crate) fn package_binding(&self, package: PackageId) -> Option<PackageBinding<'_>> {
        let name = &self.symbols().package(package)?.name;
        let key = key::package_key(name);
        let id = self.bindings.intern(BindingKind::Package, &key, || {
            Some(BindingData::Package(package, Arc::from(key.as_str())))
        })?;
        match Binding::from_id(self, id) {
            Binding::Package(binding) => Some(binding),
            _ => None,
        }
    }

    pub(crate) fn module_binding(&self, module: ModuleId) -> Option<ModuleBinding<'_>> {
        let name = &self.symbols().module(module)?.name;
        let key = key::module_key(name);
        let id = self.bindings.intern(BindingKind::Module, &key, || {
            Some(BindingData::Module(module, Arc::from(key.as_str())))
        })?;
        match Binding::from_id(self, id) {
            Binding::Module(binding) => Some(binding),
            _ => None,
        }
    }
}
