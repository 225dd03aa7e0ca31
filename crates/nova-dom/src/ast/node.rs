//! Node payloads.
//!
//! Every node kind is a struct holding its children as [`NodeId`]s plus its
//! scalar properties. [`Node`] is the closed union over all of them; adding a
//! kind makes every exhaustive `match` in the crate fail to compile until it
//! is handled.

use nova_core::Name;
use nova_hir::{AssignOp, BinaryOp, PostfixOp, UnaryOp};
use nova_types::Modifiers;

use super::NodeId;

macro_rules! nodes {
    ($($kind:ident),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Node {
            $($kind($kind),)*
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($kind,)*
        }

        impl Node {
            pub fn kind(&self) -> NodeKind {
                match self {
                    $(Node::$kind(_) => NodeKind::$kind,)*
                }
            }
        }

        impl NodeKind {
            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$kind => stringify!($kind),)*
                }
            }
        }

        $(
            impl From<$kind> for Node {
                fn from(value: $kind) -> Node {
                    Node::$kind(value)
                }
            }
        )*
    };
}

nodes!(
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    ModuleDeclaration,
    RequiresDirective,
    ExportsDirective,
    OpensDirective,
    UsesDirective,
    ProvidesDirective,
    ModuleModifier,
    TypeDeclaration,
    EnumDeclaration,
    RecordDeclaration,
    AnnotationTypeDeclaration,
    AnonymousClassDeclaration,
    EnumConstantDeclaration,
    AnnotationTypeMemberDeclaration,
    FieldDeclaration,
    MethodDeclaration,
    Initializer,
    VariableDeclarationFragment,
    SingleVariableDeclaration,
    TypeParameter,
    Modifier,
    Dimension,
    MarkerAnnotation,
    SingleMemberAnnotation,
    NormalAnnotation,
    MemberValuePair,
    PrimitiveType,
    SimpleType,
    QualifiedType,
    NameQualifiedType,
    ParameterizedType,
    ArrayType,
    WildcardType,
    UnionType,
    IntersectionType,
    SimpleName,
    QualifiedName,
    Block,
    VariableDeclarationStatement,
    TypeDeclarationStatement,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    EnhancedForStatement,
    TryStatement,
    CatchClause,
    SwitchStatement,
    SwitchCase,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    LabeledStatement,
    SynchronizedStatement,
    AssertStatement,
    ConstructorInvocation,
    SuperConstructorInvocation,
    EmptyStatement,
    NumberLiteral,
    StringLiteral,
    TextBlock,
    CharacterLiteral,
    BooleanLiteral,
    NullLiteral,
    FieldAccess,
    SuperFieldAccess,
    ThisExpression,
    MethodInvocation,
    SuperMethodInvocation,
    ClassInstanceCreation,
    ArrayCreation,
    ArrayInitializer,
    ArrayAccess,
    Assignment,
    InfixExpression,
    PrefixExpression,
    PostfixExpression,
    CastExpression,
    InstanceofExpression,
    ConditionalExpression,
    ParenthesizedExpression,
    TypeLiteral,
    LambdaExpression,
    ExpressionMethodReference,
    SuperMethodReference,
    TypeMethodReference,
    CreationReference,
    VariableDeclarationExpression,
);

impl NodeKind {
    pub fn is_type(self) -> bool {
        matches!(
            self,
            NodeKind::PrimitiveType
                | NodeKind::SimpleType
                | NodeKind::QualifiedType
                | NodeKind::NameQualifiedType
                | NodeKind::ParameterizedType
                | NodeKind::ArrayType
                | NodeKind::WildcardType
                | NodeKind::UnionType
                | NodeKind::IntersectionType
        )
    }

    pub fn is_name(self) -> bool {
        matches!(self, NodeKind::SimpleName | NodeKind::QualifiedName)
    }

    pub fn is_annotation(self) -> bool {
        matches!(
            self,
            NodeKind::MarkerAnnotation | NodeKind::SingleMemberAnnotation | NodeKind::NormalAnnotation
        )
    }

    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::TypeDeclaration
                | NodeKind::EnumDeclaration
                | NodeKind::RecordDeclaration
                | NodeKind::AnnotationTypeDeclaration
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::Block
                | NodeKind::VariableDeclarationStatement
                | NodeKind::TypeDeclarationStatement
                | NodeKind::ExpressionStatement
                | NodeKind::IfStatement
                | NodeKind::WhileStatement
                | NodeKind::DoStatement
                | NodeKind::ForStatement
                | NodeKind::EnhancedForStatement
                | NodeKind::TryStatement
                | NodeKind::SwitchStatement
                | NodeKind::SwitchCase
                | NodeKind::ReturnStatement
                | NodeKind::ThrowStatement
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
                | NodeKind::LabeledStatement
                | NodeKind::SynchronizedStatement
                | NodeKind::AssertStatement
                | NodeKind::ConstructorInvocation
                | NodeKind::SuperConstructorInvocation
                | NodeKind::EmptyStatement
        )
    }

    /// Expressions, including names and annotations used as values.
    pub fn is_expression(self) -> bool {
        self.is_name()
            || self.is_annotation()
            || matches!(
                self,
                NodeKind::NumberLiteral
                    | NodeKind::StringLiteral
                    | NodeKind::TextBlock
                    | NodeKind::CharacterLiteral
                    | NodeKind::BooleanLiteral
                    | NodeKind::NullLiteral
                    | NodeKind::FieldAccess
                    | NodeKind::SuperFieldAccess
                    | NodeKind::ThisExpression
                    | NodeKind::MethodInvocation
                    | NodeKind::SuperMethodInvocation
                    | NodeKind::ClassInstanceCreation
                    | NodeKind::ArrayCreation
                    | NodeKind::ArrayInitializer
                    | NodeKind::ArrayAccess
                    | NodeKind::Assignment
                    | NodeKind::InfixExpression
                    | NodeKind::PrefixExpression
                    | NodeKind::PostfixExpression
                    | NodeKind::CastExpression
                    | NodeKind::InstanceofExpression
                    | NodeKind::ConditionalExpression
                    | NodeKind::ParenthesizedExpression
                    | NodeKind::TypeLiteral
                    | NodeKind::LambdaExpression
                    | NodeKind::ExpressionMethodReference
                    | NodeKind::SuperMethodReference
                    | NodeKind::TypeMethodReference
                    | NodeKind::CreationReference
                    | NodeKind::VariableDeclarationExpression
            )
    }
}

// Unit and modules.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompilationUnit {
    pub package: Option<NodeId>,
    pub imports: Vec<NodeId>,
    pub module: Option<NodeId>,
    pub types: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDeclaration {
    pub annotations: Vec<NodeId>,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub is_static: bool,
    pub name: NodeId,
    pub on_demand: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDeclaration {
    pub annotations: Vec<NodeId>,
    pub open: bool,
    pub name: NodeId,
    pub directives: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequiresDirective {
    pub modifiers: Vec<NodeId>,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportsDirective {
    pub name: NodeId,
    pub modules: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpensDirective {
    pub name: NodeId,
    pub modules: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsesDirective {
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvidesDirective {
    pub name: NodeId,
    pub implementations: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleModifierKeyword {
    Transitive,
    Static,
}

impl ModuleModifierKeyword {
    pub fn keyword(self) -> &'static str {
        match self {
            ModuleModifierKeyword::Transitive => "transitive",
            ModuleModifierKeyword::Static => "static",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleModifier {
    pub keyword: ModuleModifierKeyword,
}

// Declarations.

/// A class or interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    /// Modifiers and annotations, interleaved in source order.
    pub modifiers: Vec<NodeId>,
    pub is_interface: bool,
    pub name: NodeId,
    pub type_parameters: Vec<NodeId>,
    pub superclass: Option<NodeId>,
    pub super_interfaces: Vec<NodeId>,
    pub permitted_types: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub modifiers: Vec<NodeId>,
    pub name: NodeId,
    pub super_interfaces: Vec<NodeId>,
    pub constants: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDeclaration {
    pub modifiers: Vec<NodeId>,
    pub name: NodeId,
    pub type_parameters: Vec<NodeId>,
    pub components: Vec<NodeId>,
    pub super_interfaces: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTypeDeclaration {
    pub modifiers: Vec<NodeId>,
    pub name: NodeId,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousClassDeclaration {
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstantDeclaration {
    pub modifiers: Vec<NodeId>,
    pub name: NodeId,
    pub arguments: Vec<NodeId>,
    pub anonymous_class: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTypeMemberDeclaration {
    pub modifiers: Vec<NodeId>,
    pub ty: NodeId,
    pub name: NodeId,
    pub default: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub modifiers: Vec<NodeId>,
    pub ty: NodeId,
    pub fragments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub modifiers: Vec<NodeId>,
    pub constructor: bool,
    pub compact_constructor: bool,
    pub type_parameters: Vec<NodeId>,
    /// `None` for constructors.
    pub return_type: Option<NodeId>,
    pub name: NodeId,
    pub receiver_type: Option<NodeId>,
    pub receiver_qualifier: Option<NodeId>,
    pub parameters: Vec<NodeId>,
    pub extra_dimensions: Vec<NodeId>,
    pub thrown_exception_types: Vec<NodeId>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
    pub modifiers: Vec<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationFragment {
    pub name: NodeId,
    pub extra_dimensions: Vec<NodeId>,
    pub initializer: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleVariableDeclaration {
    pub modifiers: Vec<NodeId>,
    pub ty: NodeId,
    /// Annotations written before `...`.
    pub varargs_annotations: Vec<NodeId>,
    pub varargs: bool,
    pub name: NodeId,
    pub extra_dimensions: Vec<NodeId>,
    pub initializer: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    /// Type-use annotations on the parameter.
    pub modifiers: Vec<NodeId>,
    pub name: NodeId,
    pub bounds: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    /// A single flag.
    pub keyword: Modifiers,
}

/// One `[]` of an array type or of extra dimensions, with its annotations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dimension {
    pub annotations: Vec<NodeId>,
}

// Annotations.

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAnnotation {
    pub type_name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleMemberAnnotation {
    pub type_name: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalAnnotation {
    pub type_name: NodeId,
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberValuePair {
    pub name: NodeId,
    pub value: NodeId,
}

// Types.

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveType {
    pub annotations: Vec<NodeId>,
    /// `None` is `void`.
    pub primitive: Option<nova_types::PrimitiveType>,
}

impl PrimitiveType {
    pub fn keyword(&self) -> &'static str {
        self.primitive.map_or("void", |p| p.keyword())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleType {
    pub annotations: Vec<NodeId>,
    pub name: NodeId,
}

/// `Outer<T>.@A Inner`: a type qualifier.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedType {
    pub qualifier: NodeId,
    pub annotations: Vec<NodeId>,
    pub name: NodeId,
}

/// `java.util.@A List`: a name qualifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NameQualifiedType {
    pub qualifier: NodeId,
    pub annotations: Vec<NodeId>,
    pub name: NodeId,
}

/// Annotations of the written type live on `ty`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedType {
    pub ty: NodeId,
    pub type_arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub element_type: NodeId,
    /// Outermost first.
    pub dimensions: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WildcardType {
    pub annotations: Vec<NodeId>,
    pub bound: Option<NodeId>,
    pub upper_bound: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub types: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionType {
    pub types: Vec<NodeId>,
}

// Names.

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleName {
    pub identifier: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub qualifier: NodeId,
    pub name: NodeId,
}

// Statements.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationStatement {
    pub modifiers: Vec<NodeId>,
    pub ty: NodeId,
    pub fragments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclarationStatement {
    pub declaration: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub expression: NodeId,
    pub then_statement: NodeId,
    pub else_statement: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub expression: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoStatement {
    pub body: NodeId,
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub initializers: Vec<NodeId>,
    pub expression: Option<NodeId>,
    pub updaters: Vec<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedForStatement {
    pub parameter: NodeId,
    pub expression: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    pub resources: Vec<NodeId>,
    pub body: NodeId,
    pub catch_clauses: Vec<NodeId>,
    pub finally: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub exception: NodeId,
    pub body: NodeId,
}

/// `statements` interleaves [`SwitchCase`] labels with the statements that
/// follow them.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub expression: NodeId,
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Empty for `default`.
    pub expressions: Vec<NodeId>,
    pub is_default: bool,
    pub arrow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub expression: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub label: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStatement {
    pub label: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    pub label: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynchronizedStatement {
    pub expression: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStatement {
    pub expression: NodeId,
    pub message: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorInvocation {
    pub type_arguments: Vec<NodeId>,
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperConstructorInvocation {
    pub expression: Option<NodeId>,
    pub type_arguments: Vec<NodeId>,
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStatement;

// Expressions.

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub token: String,
}

/// `escaped` is the literal as written, quotes included.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub escaped: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub escaped: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterLiteral {
    pub escaped: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullLiteral;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    pub expression: NodeId,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperFieldAccess {
    pub qualifier: Option<NodeId>,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpression {
    pub qualifier: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocation {
    pub expression: Option<NodeId>,
    pub type_arguments: Vec<NodeId>,
    pub name: NodeId,
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperMethodInvocation {
    pub qualifier: Option<NodeId>,
    pub type_arguments: Vec<NodeId>,
    pub name: NodeId,
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassInstanceCreation {
    pub expression: Option<NodeId>,
    pub type_arguments: Vec<NodeId>,
    pub ty: NodeId,
    pub arguments: Vec<NodeId>,
    pub anonymous_class: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayCreation {
    pub ty: NodeId,
    pub dimensions: Vec<NodeId>,
    pub initializer: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInitializer {
    pub expressions: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub array: NodeId,
    pub index: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub lhs: NodeId,
    pub operator: AssignOp,
    pub rhs: NodeId,
}

/// `a + b + c` is one node with `c` as an extended operand.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub lhs: NodeId,
    pub operator: BinaryOp,
    pub rhs: NodeId,
    pub extended_operands: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub operator: UnaryOp,
    pub operand: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostfixExpression {
    pub operand: NodeId,
    pub operator: PostfixOp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    pub ty: NodeId,
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceofExpression {
    pub expression: NodeId,
    pub ty: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub expression: NodeId,
    pub then_expression: NodeId,
    pub else_expression: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenthesizedExpression {
    pub expression: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeLiteral {
    pub ty: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub parentheses: bool,
    /// `VariableDeclarationFragment`s for untyped parameters,
    /// `SingleVariableDeclaration`s otherwise.
    pub parameters: Vec<NodeId>,
    /// An expression or a `Block`.
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMethodReference {
    pub expression: NodeId,
    pub type_arguments: Vec<NodeId>,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperMethodReference {
    pub qualifier: Option<NodeId>,
    pub type_arguments: Vec<NodeId>,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMethodReference {
    pub ty: NodeId,
    pub type_arguments: Vec<NodeId>,
    pub name: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreationReference {
    pub ty: NodeId,
    pub type_arguments: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationExpression {
    pub modifiers: Vec<NodeId>,
    pub ty: NodeId,
    pub fragments: Vec<NodeId>,
}

impl Node {
    /// Child nodes in source order.
    pub fn children(&self) -> Vec<NodeId> {
        fn opt(out: &mut Vec<NodeId>, id: Option<NodeId>) {
            out.extend(id);
        }
        fn all(out: &mut Vec<NodeId>, ids: &[NodeId]) {
            out.extend_from_slice(ids);
        }

        let mut out = Vec::new();
        match self {
            Node::CompilationUnit(n) => {
                opt(&mut out, n.package);
                all(&mut out, &n.imports);
                opt(&mut out, n.module);
                all(&mut out, &n.types);
            }
            Node::PackageDeclaration(n) => {
                all(&mut out, &n.annotations);
                out.push(n.name);
            }
            Node::ImportDeclaration(n) => out.push(n.name),
            Node::ModuleDeclaration(n) => {
                all(&mut out, &n.annotations);
                out.push(n.name);
                all(&mut out, &n.directives);
            }
            Node::RequiresDirective(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.name);
            }
            Node::ExportsDirective(n) => {
                out.push(n.name);
                all(&mut out, &n.modules);
            }
            Node::OpensDirective(n) => {
                out.push(n.name);
                all(&mut out, &n.modules);
            }
            Node::UsesDirective(n) => out.push(n.name),
            Node::ProvidesDirective(n) => {
                out.push(n.name);
                all(&mut out, &n.implementations);
            }
            Node::ModuleModifier(_) => {}
            Node::TypeDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.name);
                all(&mut out, &n.type_parameters);
                opt(&mut out, n.superclass);
                all(&mut out, &n.super_interfaces);
                all(&mut out, &n.permitted_types);
                all(&mut out, &n.body);
            }
            Node::EnumDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.name);
                all(&mut out, &n.super_interfaces);
                all(&mut out, &n.constants);
                all(&mut out, &n.body);
            }
            Node::RecordDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.name);
                all(&mut out, &n.type_parameters);
                all(&mut out, &n.components);
                all(&mut out, &n.super_interfaces);
                all(&mut out, &n.body);
            }
            Node::AnnotationTypeDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.name);
                all(&mut out, &n.body);
            }
            Node::AnonymousClassDeclaration(n) => all(&mut out, &n.body),
            Node::EnumConstantDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.name);
                all(&mut out, &n.arguments);
                opt(&mut out, n.anonymous_class);
            }
            Node::AnnotationTypeMemberDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.ty);
                out.push(n.name);
                opt(&mut out, n.default);
            }
            Node::FieldDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.ty);
                all(&mut out, &n.fragments);
            }
            Node::MethodDeclaration(n) => {
                all(&mut out, &n.modifiers);
                all(&mut out, &n.type_parameters);
                opt(&mut out, n.return_type);
                out.push(n.name);
                opt(&mut out, n.receiver_type);
                opt(&mut out, n.receiver_qualifier);
                all(&mut out, &n.parameters);
                all(&mut out, &n.extra_dimensions);
                all(&mut out, &n.thrown_exception_types);
                opt(&mut out, n.body);
            }
            Node::Initializer(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.body);
            }
            Node::VariableDeclarationFragment(n) => {
                out.push(n.name);
                all(&mut out, &n.extra_dimensions);
                opt(&mut out, n.initializer);
            }
            Node::SingleVariableDeclaration(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.ty);
                all(&mut out, &n.varargs_annotations);
                out.push(n.name);
                all(&mut out, &n.extra_dimensions);
                opt(&mut out, n.initializer);
            }
            Node::TypeParameter(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.name);
                all(&mut out, &n.bounds);
            }
            Node::Modifier(_) => {}
            Node::Dimension(n) => all(&mut out, &n.annotations),
            Node::MarkerAnnotation(n) => out.push(n.type_name),
            Node::SingleMemberAnnotation(n) => {
                out.push(n.type_name);
                out.push(n.value);
            }
            Node::NormalAnnotation(n) => {
                out.push(n.type_name);
                all(&mut out, &n.values);
            }
            Node::MemberValuePair(n) => {
                out.push(n.name);
                out.push(n.value);
            }
            Node::PrimitiveType(n) => all(&mut out, &n.annotations),
            Node::SimpleType(n) => {
                all(&mut out, &n.annotations);
                out.push(n.name);
            }
            Node::QualifiedType(n) => {
                out.push(n.qualifier);
                all(&mut out, &n.annotations);
                out.push(n.name);
            }
            Node::NameQualifiedType(n) => {
                out.push(n.qualifier);
                all(&mut out, &n.annotations);
                out.push(n.name);
            }
            Node::ParameterizedType(n) => {
                out.push(n.ty);
                all(&mut out, &n.type_arguments);
            }
            Node::ArrayType(n) => {
                out.push(n.element_type);
                all(&mut out, &n.dimensions);
            }
            Node::WildcardType(n) => {
                all(&mut out, &n.annotations);
                opt(&mut out, n.bound);
            }
            Node::UnionType(n) => all(&mut out, &n.types),
            Node::IntersectionType(n) => all(&mut out, &n.types),
            Node::SimpleName(_) => {}
            Node::QualifiedName(n) => {
                out.push(n.qualifier);
                out.push(n.name);
            }
            Node::Block(n) => all(&mut out, &n.statements),
            Node::VariableDeclarationStatement(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.ty);
                all(&mut out, &n.fragments);
            }
            Node::TypeDeclarationStatement(n) => out.push(n.declaration),
            Node::ExpressionStatement(n) => out.push(n.expression),
            Node::IfStatement(n) => {
                out.push(n.expression);
                out.push(n.then_statement);
                opt(&mut out, n.else_statement);
            }
            Node::WhileStatement(n) => {
                out.push(n.expression);
                out.push(n.body);
            }
            Node::DoStatement(n) => {
                out.push(n.body);
                out.push(n.expression);
            }
            Node::ForStatement(n) => {
                all(&mut out, &n.initializers);
                opt(&mut out, n.expression);
                all(&mut out, &n.updaters);
                out.push(n.body);
            }
            Node::EnhancedForStatement(n) => {
                out.push(n.parameter);
                out.push(n.expression);
                out.push(n.body);
            }
            Node::TryStatement(n) => {
                all(&mut out, &n.resources);
                out.push(n.body);
                all(&mut out, &n.catch_clauses);
                opt(&mut out, n.finally);
            }
            Node::CatchClause(n) => {
                out.push(n.exception);
                out.push(n.body);
            }
            Node::SwitchStatement(n) => {
                out.push(n.expression);
                all(&mut out, &n.statements);
            }
            Node::SwitchCase(n) => all(&mut out, &n.expressions),
            Node::ReturnStatement(n) => opt(&mut out, n.expression),
            Node::ThrowStatement(n) => out.push(n.expression),
            Node::BreakStatement(n) => opt(&mut out, n.label),
            Node::ContinueStatement(n) => opt(&mut out, n.label),
            Node::LabeledStatement(n) => {
                out.push(n.label);
                out.push(n.body);
            }
            Node::SynchronizedStatement(n) => {
                out.push(n.expression);
                out.push(n.body);
            }
            Node::AssertStatement(n) => {
                out.push(n.expression);
                opt(&mut out, n.message);
            }
            Node::ConstructorInvocation(n) => {
                all(&mut out, &n.type_arguments);
                all(&mut out, &n.arguments);
            }
            Node::SuperConstructorInvocation(n) => {
                opt(&mut out, n.expression);
                all(&mut out, &n.type_arguments);
                all(&mut out, &n.arguments);
            }
            Node::EmptyStatement(_) => {}
            Node::NumberLiteral(_)
            | Node::StringLiteral(_)
            | Node::TextBlock(_)
            | Node::CharacterLiteral(_)
            | Node::BooleanLiteral(_)
            | Node::NullLiteral(_) => {}
            Node::FieldAccess(n) => {
                out.push(n.expression);
                out.push(n.name);
            }
            Node::SuperFieldAccess(n) => {
                opt(&mut out, n.qualifier);
                out.push(n.name);
            }
            Node::ThisExpression(n) => opt(&mut out, n.qualifier),
            Node::MethodInvocation(n) => {
                opt(&mut out, n.expression);
                all(&mut out, &n.type_arguments);
                out.push(n.name);
                all(&mut out, &n.arguments);
            }
            Node::SuperMethodInvocation(n) => {
                opt(&mut out, n.qualifier);
                all(&mut out, &n.type_arguments);
                out.push(n.name);
                all(&mut out, &n.arguments);
            }
            Node::ClassInstanceCreation(n) => {
                opt(&mut out, n.expression);
                all(&mut out, &n.type_arguments);
                out.push(n.ty);
                all(&mut out, &n.arguments);
                opt(&mut out, n.anonymous_class);
            }
            Node::ArrayCreation(n) => {
                out.push(n.ty);
                all(&mut out, &n.dimensions);
                opt(&mut out, n.initializer);
            }
            Node::ArrayInitializer(n) => all(&mut out, &n.expressions),
            Node::ArrayAccess(n) => {
                out.push(n.array);
                out.push(n.index);
            }
            Node::Assignment(n) => {
                out.push(n.lhs);
                out.push(n.rhs);
            }
            Node::InfixExpression(n) => {
                out.push(n.lhs);
                out.push(n.rhs);
                all(&mut out, &n.extended_operands);
            }
            Node::PrefixExpression(n) => out.push(n.operand),
            Node::PostfixExpression(n) => out.push(n.operand),
            Node::CastExpression(n) => {
                out.push(n.ty);
                out.push(n.expression);
            }
            Node::InstanceofExpression(n) => {
                out.push(n.expression);
                out.push(n.ty);
            }
            Node::ConditionalExpression(n) => {
                out.push(n.expression);
                out.push(n.then_expression);
                out.push(n.else_expression);
            }
            Node::ParenthesizedExpression(n) => out.push(n.expression),
            Node::TypeLiteral(n) => out.push(n.ty),
            Node::LambdaExpression(n) => {
                all(&mut out, &n.parameters);
                out.push(n.body);
            }
            Node::ExpressionMethodReference(n) => {
                out.push(n.expression);
                all(&mut out, &n.type_arguments);
                out.push(n.name);
            }
            Node::SuperMethodReference(n) => {
                opt(&mut out, n.qualifier);
                all(&mut out, &n.type_arguments);
                out.push(n.name);
            }
            Node::TypeMethodReference(n) => {
                out.push(n.ty);
                all(&mut out, &n.type_arguments);
                out.push(n.name);
            }
            Node::CreationReference(n) => {
                out.push(n.ty);
                all(&mut out, &n.type_arguments);
            }
            Node::VariableDeclarationExpression(n) => {
                all(&mut out, &n.modifiers);
                out.push(n.ty);
                all(&mut out, &n.fragments);
            }
        }
        out
    }
}
