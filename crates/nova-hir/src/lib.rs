//! High-level intermediate representation (HIR) for one Java compilation unit.
//!
//! The HIR is what a front-end hands to the DOM converter: every declaration,
//! statement, expression, type reference and annotation lives in an arena on
//! [`CompilationUnit`], carries the raw (untrusted) span the parser saw, and
//! links into a [`nova_types::SymbolTable`] for whatever attribution resolved.
//!
//! Spans may be sloppy. They can include trailing trivia, be inverted, or
//! reach past the end of the buffer after error recovery; consumers clamp.

use std::sync::Arc;

use nova_types::{Span, SymbolTable};

mod arena;
mod body;
mod item;
mod type_ref;

pub use arena::{
    AnnotationId, Arena, ArenaId, ClassDeclId, ExprId, FieldDeclId, MethodDeclId, StmtId,
    TypeRefId, VarDeclId,
};
pub use body::{
    AssignOp, BinaryOp, CatchClause, Expr, ExprKind, LambdaBody, LiteralKind, MethodRefKind,
    PostfixOp, Stmt, StmtKind, SwitchCase, UnaryOp,
};
pub use item::{
    ClassDecl, EnumConstantDecl, FieldDecl, Ident, ImportDecl, Member, MethodDecl, Modifiers,
    ModuleDecl, ModuleDirective, ModuleDirectiveKind, PackageDecl, ReceiverParam, TypeParamDecl,
    VarDecl,
};
pub use type_ref::{
    Annotation, AnnotationKind, MemberValuePair, NameRef, NameSegment, Resolution, TypeRef,
    TypeRefKind, TypeSegment, WildcardBoundKind,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompilationUnit {
    pub span: Span,
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub module: Option<ModuleDecl>,
    /// Top-level type declarations in source order.
    pub types: Vec<ClassDeclId>,
    pub classes: Arena<ClassDeclId, ClassDecl>,
    pub methods: Arena<MethodDeclId, MethodDecl>,
    pub fields: Arena<FieldDeclId, FieldDecl>,
    pub vars: Arena<VarDeclId, VarDecl>,
    pub stmts: Arena<StmtId, Stmt>,
    pub exprs: Arena<ExprId, Expr>,
    pub type_refs: Arena<TypeRefId, TypeRef>,
    pub annotations: Arena<AnnotationId, Annotation>,
    /// The parser recovered somewhere in the unit.
    pub recovered: bool,
}

impl CompilationUnit {
    pub fn new(span: Span) -> Self {
        CompilationUnit {
            span,
            ..CompilationUnit::default()
        }
    }

    /// The innermost lambda expression whose span contains `offset`.
    pub fn enclosing_lambda(&self, offset: usize) -> Option<ExprId> {
        self.exprs
            .iter()
            .filter(|(_, expr)| {
                matches!(expr.kind, ExprKind::Lambda { .. }) && expr.span.contains(offset)
            })
            .min_by_key(|(_, expr)| expr.span.len())
            .map(|(id, _)| id)
    }
}

/// Everything the DOM converter consumes for one compilation unit.
#[derive(Debug, Clone)]
pub struct ResolvedUnit {
    pub source: Arc<str>,
    pub unit: Arc<CompilationUnit>,
    pub symbols: Arc<SymbolTable>,
}

impl ResolvedUnit {
    pub fn new(source: impl Into<Arc<str>>, unit: CompilationUnit, symbols: SymbolTable) -> Self {
        ResolvedUnit {
            source: source.into(),
            unit: Arc::new(unit),
            symbols: Arc::new(symbols),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(kind: ExprKind, start: usize, end: usize) -> Expr {
        Expr {
            kind,
            span: Span::new(start, end),
            ty: None,
            recovered: false,
        }
    }

    #[test]
    fn innermost_lambda_wins() {
        let mut unit = CompilationUnit::new(Span::new(0, 40));
        let value = unit.exprs.alloc(expr(
            ExprKind::Literal {
                kind: LiteralKind::Int,
                value: None,
            },
            20,
            21,
        ));
        let inner = unit.exprs.alloc(expr(
            ExprKind::Lambda {
                params: Vec::new(),
                parenthesized: true,
                body: LambdaBody::Expr(value),
            },
            14,
            21,
        ));
        let outer = unit.exprs.alloc(expr(
            ExprKind::Lambda {
                params: Vec::new(),
                parenthesized: true,
                body: LambdaBody::Expr(inner),
            },
            8,
            21,
        ));
        assert_eq!(unit.enclosing_lambda(20), Some(inner));
        assert_eq!(unit.enclosing_lambda(9), Some(outer));
        assert_eq!(unit.enclosing_lambda(30), None);
    }
}
