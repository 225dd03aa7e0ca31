//! Names, type references and annotations.

use nova_core::Name;
use nova_types::{
    AnnotationInstance, MethodId, ModuleId, PackageId, PrimitiveType, Span, Type, VarId,
};

use crate::{AnnotationId, ExprId, Ident, TypeRefId};

/// What a name segment was resolved to by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Resolution {
    Package(PackageId),
    /// A class (raw, without arguments) or a type variable.
    Type(Type),
    Var(VarId),
    Method(MethodId),
    Module(ModuleId),
    #[default]
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSegment {
    pub name: Name,
    pub span: Span,
    pub resolution: Resolution,
}

/// A possibly qualified name, `a.b.C`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    pub segments: Vec<NameSegment>,
    pub span: Span,
}

impl NameRef {
    pub fn from_ident(ident: &Ident, resolution: Resolution) -> Self {
        NameRef {
            segments: vec![NameSegment {
                name: ident.name.clone(),
                span: ident.span,
                resolution,
            }],
            span: ident.span,
        }
    }

    pub fn to_dotted(&self) -> String {
        let mut out = String::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('.');
            }
            out.push_str(segment.name.as_str());
        }
        out
    }

    /// Resolution of the whole name.
    pub fn resolution(&self) -> &Resolution {
        static UNRESOLVED: Resolution = Resolution::Unresolved;
        self.segments
            .last()
            .map(|segment| &segment.resolution)
            .unwrap_or(&UNRESOLVED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSegment {
    pub name: Name,
    pub span: Span,
    /// `Some(vec![])` is a diamond.
    pub args: Option<Vec<TypeRefId>>,
    /// `Package` or `Type` (raw), or `Unresolved`.
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WildcardBoundKind {
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRefKind {
    Primitive(PrimitiveType),
    Void,
    /// `var` in a local or lambda parameter declaration.
    Var,
    Named(Vec<TypeSegment>),
    Wildcard(Option<(WildcardBoundKind, TypeRefId)>),
    Intersection(Vec<TypeRefId>),
    Union(Vec<TypeRefId>),
    /// Nothing usable was written; the parser recovered.
    Missing,
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    /// Every type-use annotation written inside this reference, in source
    /// order, excluding those of nested type arguments and bounds.
    pub annotations: Vec<AnnotationId>,
    /// Array dimensions, not counting a trailing `...`.
    pub dims: usize,
    pub varargs: bool,
    pub span: Span,
    /// Resolved type of the reference, without the varargs level.
    pub ty: Option<Type>,
    pub recovered: bool,
}

impl TypeRef {
    pub fn missing(span: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::Missing,
            annotations: Vec::new(),
            dims: 0,
            varargs: false,
            span,
            ty: None,
            recovered: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberValuePair {
    pub name: Ident,
    pub value: ExprId,
    pub span: Span,
    /// The annotation type element named by `name`.
    pub method: Option<MethodId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    Marker,
    SingleMember(ExprId),
    Normal(Vec<MemberValuePair>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: NameRef,
    pub kind: AnnotationKind,
    pub span: Span,
    pub resolved: Option<AnnotationInstance>,
    pub recovered: bool,
}
