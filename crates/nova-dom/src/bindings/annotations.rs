//! Annotation, member value pair, package and module bindings.

use std::sync::Arc;

use nova_types::{AnnotationInstance, ConstValue, ModuleId, PackageId, Type};

use super::{
    binding_handle, key, AnnotationData, BindingData, BindingId, BindingKind, MemberValuePairData,
    MethodBinding, TypeBinding,
};
use crate::Dom;

/// A resolved annotation on a declaration or a type use.
#[derive(Clone)]
pub struct AnnotationBinding<'dom> {
    pub(crate) dom: &'dom Dom,
    pub(crate) id: BindingId,
    pub(crate) data: Arc<AnnotationData>,
}

binding_handle!(AnnotationBinding, Annotation);

impl<'dom> AnnotationBinding<'dom> {
    fn new(dom: &'dom Dom, id: BindingId) -> Self {
        match dom.bindings.get(id) {
            BindingData::Annotation(data) => AnnotationBinding { dom, id, data },
            other => panic!("{id:?} is not an annotation binding: {other:?}"),
        }
    }

    pub fn key(&self) -> &str {
        &self.data.key
    }

    /// Simple name of the annotation type.
    pub fn name(&self) -> String {
        self.dom
            .symbols()
            .class_def(self.data.instance.ty)
            .map_or_else(String::new, |def| def.name.clone())
    }

    pub fn annotation_type(&self) -> Option<TypeBinding<'dom>> {
        self.dom.type_binding(&Type::class(self.data.instance.ty, Vec::new()))
    }

    pub fn instance(&self) -> &AnnotationInstance {
        &self.data.instance
    }

    /// Pairs written in source, in source order.
    pub fn declared_member_value_pairs(&self) -> Vec<MemberValuePairBinding<'dom>> {
        self.data
            .instance
            .values
            .iter()
            .filter_map(|(name, value)| {
                self.dom
                    .member_value_pair_binding(&self.data, name, Some(value.clone()))
            })
            .collect()
    }

    /// Written pairs followed by the defaults of every member that was not
    /// written, in declaration order of the annotation type.
    pub fn all_member_value_pairs(&self) -> Vec<MemberValuePairBinding<'dom>> {
        let mut pairs = self.declared_member_value_pairs();
        let Some(def) = self.dom.symbols().class_def(self.data.instance.ty) else {
            return pairs;
        };
        for method in &def.methods {
            let Some(member) = self.dom.symbols().method_def(*method) else {
                continue;
            };
            let written = self
                .data
                .instance
                .values
                .iter()
                .any(|(name, _)| *name == member.name);
            if written || member.default_value.is_none() {
                continue;
            }
            pairs.extend(self.dom.member_value_pair_binding(
                &self.data,
                &member.name,
                member.default_value.clone(),
            ));
        }
        pairs
    }
}

/// One `name = value` of an annotation, written or defaulted.
#[derive(Clone)]
pub struct MemberValuePairBinding<'dom> {
    pub(crate) dom: &'dom Dom,
    pub(crate) id: BindingId,
    pub(crate) data: Arc<MemberValuePairData>,
}

binding_handle!(MemberValuePairBinding, MemberValuePair);

impl<'dom> MemberValuePairBinding<'dom> {
    pub fn key(&self) -> &str {
        &self.data.key
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn value(&self) -> Option<&ConstValue> {
        self.data.value.as_ref()
    }

    /// The annotation type member this pair sets.
    pub fn method_binding(&self) -> Option<MethodBinding<'dom>> {
        self.dom.method_binding(self.data.method?, None)
    }

    /// Whether the value comes from the member's `default`.
    pub fn is_default(&self) -> bool {
        let Some(method) = self.data.method.and_then(|m| self.dom.symbols().method_def(m)) else {
            return false;
        };
        method.default_value.is_some() && method.default_value == self.data.value
    }
}

#[derive(Clone)]
pub struct PackageBinding<'dom> {
    pub(crate) dom: &'dom Dom,
    pub(crate) id: BindingId,
    pub(crate) package: PackageId,
    pub(crate) key: Arc<str>,
}

binding_handle!(PackageBinding, Package);

impl<'dom> PackageBinding<'dom> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Dotted name; empty for the unnamed package.
    pub fn name(&self) -> &'dom str {
        self.dom
            .symbols()
            .package(self.package)
            .map_or("", |package| package.name.as_str())
    }

    pub fn name_components(&self) -> Vec<&'dom str> {
        let name = self.name();
        if name.is_empty() {
            return Vec::new();
        }
        name.split('.').collect()
    }

    pub fn is_unnamed(&self) -> bool {
        self.name().is_empty()
    }
}

#[derive(Clone)]
pub struct ModuleBinding<'dom> {
    pub(crate) dom: &'dom Dom,
    pub(crate) id: BindingId,
    pub(crate) module: ModuleId,
    pub(crate) key: Arc<str>,
}

binding_handle!(ModuleBinding, Module);

impl<'dom> ModuleBinding<'dom> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &'dom str {
        self.dom
            .symbols()
            .module(self.module)
            .map_or("", |module| module.name.as_str())
    }

    pub fn is_open(&self) -> bool {
        self.dom
            .symbols()
            .module(self.module)
            .is_some_and(|module| module.open)
    }
}

impl Dom {
    /// Binding of `instance` annotating the element keyed `element`.
    pub(crate) fn annotation_binding(
        &self,
        instance: &AnnotationInstance,
        element: &str,
    ) -> Option<AnnotationBinding<'_>> {
        let annotation_type = key::class_key(self.symbols(), instance.ty)?;
        let key = format!("{element}@{annotation_type}");
        let interned = key.clone();
        let id = self.bindings.intern(BindingKind::Annotation, &interned, || {
            Some(BindingData::Annotation(Arc::new(AnnotationData {
                instance: instance.clone(),
                key,
            })))
        })?;
        Some(AnnotationBinding::new(self, id))
    }

    pub(crate) fn member_value_pair_binding(
        &self,
        annotation: &AnnotationData,
        name: &str,
        value: Option<ConstValue>,
    ) -> Option<MemberValuePairBinding<'_>> {
        let symbols = self.symbols();
        let method = symbols.class_def(annotation.instance.ty).and_then(|def| {
            def.methods
                .iter()
                .copied()
                .find(|m| symbols.method_def(*m).is_some_and(|m| m.name == name))
        });
        let key = format!("{}.{name}", annotation.key);
        let interned = key.clone();
        let id = self.bindings.intern(BindingKind::MemberValuePair, &interned, || {
            Some(BindingData::MemberValuePair(Arc::new(MemberValuePairData {
                name: name.to_string(),
                value,
                method,
                key,
            })))
        })?;
        match self.bindings.get(id) {
            BindingData::MemberValuePair(data) => Some(MemberValuePairBinding { dom: self, id, data }),
            _ => None,
        }
    }
}
