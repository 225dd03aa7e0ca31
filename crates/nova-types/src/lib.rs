//! Resolved Java types and the symbol table produced by a front-end.
//!
//! Everything in here is plain data: a front-end (parser + attribution)
//! fills a [`SymbolTable`] and annotates its tree with [`Type`]s, and
//! consumers such as the DOM converter only read them.

use std::fmt;

mod ids;
pub mod java;
mod jdk;
mod symbols;

pub use ids::{ClassId, MethodId, ModuleId, PackageId, TypeVarId, VarId};
pub use java::env::{TyContext, TypeEnv};
pub use java::format::{format_type, TypeFormat};
pub use java::helpers::{
    capture_lower_bound, capture_upper_bound, class_substitution, erasure,
    functional_interface_method, glb, has_type_annotations, instantiate_as_supertype, is_subtype,
    strip_annotations, substitute, type_annotations, with_annotations, SamMethod,
};
pub use symbols::{
    ClassDef, ClassKind, ClassNesting, MethodDef, ModuleDef, Modifiers, PackageDef, SymbolTable,
    TypeParamDef, TypeParamOwner, VarDef, VarKind, WellKnownTypes,
};

/// A byte-span into a source string.
///
/// Spans coming from a front-end are not trusted: they may include trailing
/// trivia, be inverted, or point past the end of the buffer after recovery.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn from_keyword(text: &str) -> Option<Self> {
        Some(match text {
            "boolean" => PrimitiveType::Boolean,
            "byte" => PrimitiveType::Byte,
            "short" => PrimitiveType::Short,
            "char" => PrimitiveType::Char,
            "int" => PrimitiveType::Int,
            "long" => PrimitiveType::Long,
            "float" => PrimitiveType::Float,
            "double" => PrimitiveType::Double,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// JVM descriptor character (`I`, `J`, `Z`, …).
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Char => 'C',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean)
    }

    /// Rank used for binary numeric promotion.
    pub fn numeric_rank(self) -> u8 {
        match self {
            PrimitiveType::Boolean => 0,
            PrimitiveType::Byte => 1,
            PrimitiveType::Short | PrimitiveType::Char => 2,
            PrimitiveType::Int => 3,
            PrimitiveType::Long => 4,
            PrimitiveType::Float => 5,
            PrimitiveType::Double => 6,
        }
    }
}

/// Compile-time constant, as found in field initializers and annotation values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    Long(i64),
    Char(char),
    /// IEEE bits of a `float`/`double` constant.
    Float(u64),
    Double(u64),
    String(String),
    Class(Type),
    Enum { ty: ClassId, name: String },
    Annotation(Box<AnnotationInstance>),
    Array(Vec<ConstValue>),
}

impl ConstValue {
    pub fn double(value: f64) -> Self {
        ConstValue::Double(value.to_bits())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Float(bits) | ConstValue::Double(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }
}

/// A resolved annotation: its type plus explicitly written member values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationInstance {
    pub ty: ClassId,
    pub values: Vec<(String, ConstValue)>,
}

impl AnnotationInstance {
    pub fn marker(ty: ClassId) -> Self {
        Self {
            ty,
            values: Vec::new(),
        }
    }
}

/// Type-use annotations attached to one level of a type.
pub type TypeAnnotations = Vec<AnnotationInstance>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    /// Empty for a non-generic class *and* for a raw use of a generic one.
    pub args: Vec<Type>,
    pub annotations: TypeAnnotations,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

/// A capture variable (JLS 5.1.10) created for one wildcard argument at one
/// use site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CaptureType {
    /// The generic class whose type argument was captured.
    pub generic: ClassId,
    /// Index of the captured argument in `generic`'s parameter list.
    pub rank: usize,
    /// The formal type parameter at `rank`.
    pub type_param: TypeVarId,
    /// The captured wildcard.
    pub wildcard: WildcardBound,
    /// Source offset of the expression whose type was captured.
    pub site: u32,
    /// Unique per typing context; distinguishes captures at the same site.
    pub id: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Null,
    /// Unknown type produced by error recovery.
    Unknown,
    /// A reference the front-end could not resolve, kept by its source name.
    Named(String),
    Primitive(PrimitiveType, TypeAnnotations),
    Class(ClassType),
    TypeVar(TypeVarId, TypeAnnotations),
    /// `Array(component, annotations)`: the annotations apply to this array
    /// level, so `String @A [] @B []` is `Array(Array(String, [@B]), [@A])`.
    Array(Box<Type>, TypeAnnotations),
    Wildcard(WildcardBound, TypeAnnotations),
    Capture(Box<CaptureType>),
    Intersection(Vec<Type>),
    Union(Vec<Type>),
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType {
            def,
            args,
            annotations: Vec::new(),
        })
    }

    pub fn primitive(prim: PrimitiveType) -> Self {
        Type::Primitive(prim, Vec::new())
    }

    pub fn type_var(id: TypeVarId) -> Self {
        Type::TypeVar(id, Vec::new())
    }

    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component), Vec::new())
    }

    pub fn is_errorish(&self) -> bool {
        matches!(self, Type::Unknown | Type::Named(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(..))
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::TypeVar(..)
                | Type::Array(..)
                | Type::Capture(_)
                | Type::Intersection(_)
                | Type::Null
        )
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(ClassType { def, .. }) => Some(*def),
            _ => None,
        }
    }

    /// Number of array dimensions.
    pub fn dimensions(&self) -> usize {
        let mut dims = 0;
        let mut ty = self;
        while let Type::Array(component, _) = ty {
            dims += 1;
            ty = component;
        }
        dims
    }

    /// Innermost non-array type.
    pub fn element_type(&self) -> &Type {
        let mut ty = self;
        while let Type::Array(component, _) = ty {
            ty = component;
        }
        ty
    }
}
