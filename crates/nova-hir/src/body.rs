//! Statements and expressions.

use nova_types::{ConstValue, MethodId, Span, Type, VarId};

use crate::{AnnotationId, ClassDeclId, ExprId, Ident, Modifiers, NameRef, StmtId, TypeRefId, VarDeclId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub recovered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchClause {
    pub param: VarDeclId,
    pub body: StmtId,
    pub span: Span,
}

/// One `case ...:` / `default:` label group of a switch statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCase {
    pub labels: Vec<ExprId>,
    pub is_default: bool,
    /// `case X ->` rather than `case X:`.
    pub arrow: bool,
    /// Statements following the label, up to the next label.
    pub body: Vec<StmtId>,
    /// Span of the label only (`case X:`).
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    LocalVar {
        modifiers: Modifiers,
        ty: TypeRefId,
        declarators: Vec<VarDeclId>,
    },
    LocalClass(ClassDeclId),
    Expr(ExprId),
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    Do {
        body: StmtId,
        cond: ExprId,
    },
    For {
        /// Either expressions or a single variable declaration expression.
        init: Vec<ExprId>,
        cond: Option<ExprId>,
        update: Vec<ExprId>,
        body: StmtId,
    },
    ForEach {
        param: VarDeclId,
        iterable: ExprId,
        body: StmtId,
    },
    Try {
        /// Variable declaration expressions or references to existing
        /// variables.
        resources: Vec<ExprId>,
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
    Switch {
        selector: ExprId,
        cases: Vec<SwitchCase>,
    },
    Return(Option<ExprId>),
    Throw(ExprId),
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Labeled {
        label: Ident,
        body: StmtId,
    },
    Synchronized {
        lock: ExprId,
        body: StmtId,
    },
    Assert {
        cond: ExprId,
        message: Option<ExprId>,
    },
    /// `this(...)` / `super(...)` / `outer.super(...)`.
    ConstructorCall {
        is_super: bool,
        qualifier: Option<ExprId>,
        type_args: Vec<TypeRefId>,
        args: Vec<ExprId>,
        ctor: Option<MethodId>,
    },
    Empty,
    /// Unparseable statement.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    TextBlock,
    Bool,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 7,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::BitAnd => 5,
            BinaryOp::BitXor => 4,
            BinaryOp::BitOr => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::UShr => ">>>=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub fn symbol(self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaBody {
    Expr(ExprId),
    Block(StmtId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRefKind {
    /// `expr::name`, including `Name::name` where the qualifier is a plain name.
    Expr(ExprId),
    /// `super::name` / `Outer.super::name`.
    Super(Option<NameRef>),
    /// `Type::name` where the qualifier is only expressible as a type.
    Type(TypeRefId),
    /// `Type::new`.
    New(TypeRefId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Resolved type. For lambdas and method references, the target
    /// functional interface type.
    pub ty: Option<Type>,
    pub recovered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Literal {
        kind: LiteralKind,
        value: Option<ConstValue>,
    },
    Name(NameRef),
    FieldAccess {
        receiver: ExprId,
        name: Ident,
        field: Option<VarId>,
    },
    SuperFieldAccess {
        qualifier: Option<NameRef>,
        name: Ident,
        field: Option<VarId>,
    },
    This {
        qualifier: Option<NameRef>,
    },
    MethodCall {
        receiver: Option<ExprId>,
        type_args: Vec<TypeRefId>,
        name: Ident,
        args: Vec<ExprId>,
        method: Option<MethodId>,
    },
    SuperMethodCall {
        qualifier: Option<NameRef>,
        type_args: Vec<TypeRefId>,
        name: Ident,
        args: Vec<ExprId>,
        method: Option<MethodId>,
    },
    New {
        outer: Option<ExprId>,
        type_args: Vec<TypeRefId>,
        ty: TypeRefId,
        args: Vec<ExprId>,
        body: Option<ClassDeclId>,
        ctor: Option<MethodId>,
    },
    NewArray {
        /// The array type; its span covers dimension expressions too.
        ty: TypeRefId,
        dim_exprs: Vec<ExprId>,
        initializer: Option<ExprId>,
    },
    ArrayInit(Vec<ExprId>),
    ArrayAccess {
        array: ExprId,
        index: ExprId,
    },
    Assign {
        op: AssignOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Postfix {
        op: PostfixOp,
        operand: ExprId,
    },
    Cast {
        ty: TypeRefId,
        expr: ExprId,
    },
    InstanceOf {
        expr: ExprId,
        ty: TypeRefId,
    },
    Conditional {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Paren(ExprId),
    ClassLit(TypeRefId),
    Lambda {
        params: Vec<VarDeclId>,
        parenthesized: bool,
        body: LambdaBody,
    },
    MethodRef {
        kind: MethodRefKind,
        type_args: Vec<TypeRefId>,
        /// `None` for `::new`.
        name: Option<Ident>,
        method: Option<MethodId>,
    },
    VarDeclExpr {
        modifiers: Modifiers,
        ty: TypeRefId,
        declarators: Vec<VarDeclId>,
    },
    /// An annotation used as an annotation member value.
    Annotation(AnnotationId),
    /// Unparseable expression.
    Error,
}
