//! Declarations: the unit header, classes and their members.

use nova_core::Name;
use nova_types::{ClassId, ClassKind, MethodId, ModuleId, PackageId, Span, TypeVarId, VarId};

use crate::{AnnotationId, ClassDeclId, ExprId, FieldDeclId, MethodDeclId, NameRef, StmtId, TypeRefId, VarDeclId};

/// A name token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl AsRef<str>, span: Span) -> Self {
        Self {
            name: Name::new(name),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

/// Modifier keywords and declaration annotations of one declaration.
///
/// Only the flag set is recorded; keyword positions are recovered from the
/// source inside `span`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub flags: nova_types::Modifiers,
    pub annotations: Vec<AnnotationId>,
    /// Covers every keyword and annotation; `None` when nothing was written.
    pub span: Option<Span>,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.annotations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    pub annotations: Vec<AnnotationId>,
    pub name: NameRef,
    pub span: Span,
    pub symbol: Option<PackageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// For `import a.b.*;` this is `a.b`.
    pub name: NameRef,
    pub is_static: bool,
    pub is_star: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub annotations: Vec<AnnotationId>,
    pub open: bool,
    pub name: NameRef,
    pub directives: Vec<ModuleDirective>,
    pub span: Span,
    pub symbol: Option<ModuleId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDirective {
    pub kind: ModuleDirectiveKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleDirectiveKind {
    Requires {
        /// `transitive` / `static`.
        modifiers: Vec<Ident>,
        module: NameRef,
    },
    Exports {
        package: NameRef,
        to: Vec<NameRef>,
    },
    Opens {
        package: NameRef,
        to: Vec<NameRef>,
    },
    Uses {
        service: NameRef,
    },
    Provides {
        service: NameRef,
        with: Vec<NameRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDecl {
    pub annotations: Vec<AnnotationId>,
    pub name: Ident,
    pub bounds: Vec<TypeRefId>,
    pub span: Span,
    pub symbol: Option<TypeVarId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstantDecl {
    pub modifiers: Modifiers,
    pub name: Ident,
    /// `None` when no argument list was written.
    pub args: Option<Vec<ExprId>>,
    pub body: Option<ClassDeclId>,
    pub span: Span,
    pub symbol: Option<VarId>,
    pub ctor: Option<MethodId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(FieldDeclId),
    Method(MethodDeclId),
    Class(ClassDeclId),
    Initializer {
        is_static: bool,
        modifiers: Modifiers,
        body: StmtId,
        span: Span,
    },
}

/// A class, interface, enum, record, annotation type or anonymous class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    /// Empty for anonymous classes.
    pub name: Ident,
    pub type_params: Vec<TypeParamDecl>,
    /// The superclass of a class, or the superinterfaces of an interface.
    pub extends: Vec<TypeRefId>,
    pub implements: Vec<TypeRefId>,
    pub permits: Vec<TypeRefId>,
    pub record_components: Vec<VarDeclId>,
    pub enum_constants: Vec<EnumConstantDecl>,
    pub members: Vec<Member>,
    pub span: Span,
    /// `{ ... }` including the braces.
    pub body_span: Span,
    pub is_anonymous: bool,
    pub symbol: Option<ClassId>,
    pub recovered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRefId,
    pub declarators: Vec<VarDeclId>,
    pub span: Span,
    pub recovered: bool,
}

/// A variable declarator or a single variable declaration (parameter,
/// record component, catch parameter, resource, enhanced-for variable,
/// lambda parameter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    /// `None` for declarators of a multi-variable declaration.
    pub modifiers: Option<Modifiers>,
    /// `None` for declarators and for lambda parameters without a type.
    pub ty: Option<TypeRefId>,
    pub name: Ident,
    /// `[]` pairs written after the name.
    pub extra_dims: usize,
    /// Annotations on the extra dimensions, in source order.
    pub extra_dim_annotations: Vec<AnnotationId>,
    pub initializer: Option<ExprId>,
    pub span: Span,
    pub symbol: Option<VarId>,
    pub recovered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverParam {
    pub ty: TypeRefId,
    /// `Outer` in `Outer.this`.
    pub qualifier: Option<NameRef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParamDecl>,
    /// `None` for constructors.
    pub return_type: Option<TypeRefId>,
    pub name: Ident,
    pub receiver: Option<ReceiverParam>,
    pub params: Vec<VarDeclId>,
    pub extra_dims: usize,
    pub extra_dim_annotations: Vec<AnnotationId>,
    pub throws: Vec<TypeRefId>,
    pub body: Option<StmtId>,
    /// `default` value of an annotation type member.
    pub default_value: Option<ExprId>,
    pub is_constructor: bool,
    /// Record constructor written without a parameter list.
    pub is_compact_ctor: bool,
    pub span: Span,
    pub symbol: Option<MethodId>,
    pub recovered: bool,
}
