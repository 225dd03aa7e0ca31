//! The tree assembler: HIR in, DOM nodes out.
//!
//! Conversion is a single depth-first walk. Children are converted before
//! their parent is allocated, so every `convert_*` method returns the id of a
//! finished, still parentless node. Alongside the tree the walk records an
//! [`Origin`] per node (what the binding resolver needs to answer queries
//! later) and the declaring node of every symbol declared in the unit.

use std::collections::HashMap;

use nova_core::{Name, TextRange};
use nova_hir::{
    Annotation, AnnotationId, Arena, ArenaId, ClassDecl, ClassDeclId, CompilationUnit, Expr,
    ExprId, FieldDecl, FieldDeclId, Ident, MethodDecl, MethodDeclId, NameRef, Resolution,
    ResolvedUnit, Stmt, StmtId, TypeRef, TypeRefId, VarDecl, VarDeclId,
};
use nova_syntax::JavaFeature;
use nova_types::{
    ClassId, Diagnostic, MethodId, ModuleId, PackageId, Span, SymbolTable, Type, TypeVarId, VarId,
};

use crate::ast::{Ast, Node, NodeFlags, NodeId, QualifiedName, SimpleName};
use crate::position::{end_offset, offset, text_range, PositionTracker};
use crate::{ConvertError, ConvertOptions, Problem};

mod annotations;
mod decls;
mod exprs;
mod modifiers;
mod stmts;
mod types;

pub(crate) use annotations::{distribute, AnnotationOwner, Distribution};

type Result<T> = std::result::Result<T, ConvertError>;

/// What a node was built from, as far as bindings are concerned.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Origin {
    /// A type node. `generic_declaration` marks the base type of a
    /// parameterized type, which resolves to the generic class itself.
    Type {
        ty: Option<Type>,
        generic_declaration: bool,
    },
    /// A name. `expr` is the expression the name spells, when it is one.
    Name {
        resolution: Resolution,
        expr: Option<ExprId>,
    },
    Expr(ExprId),
    /// Explicit constructor invocations.
    Stmt(StmtId),
    Class(ClassId),
    Method(MethodId),
    Var(VarId),
    EnumConstant {
        var: Option<VarId>,
        ctor: Option<MethodId>,
    },
    TypeParam(TypeVarId),
    Package(PackageId),
    Module(ModuleId),
    Annotation {
        id: AnnotationId,
        owner: AnnotationOwner,
    },
    MemberValuePair {
        annotation: AnnotationId,
        owner: AnnotationOwner,
        name: Name,
    },
    Unresolved,
}

/// A symbol declared by some node of the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Declared {
    Class(ClassId),
    Method(MethodId),
    Var(VarId),
    TypeParam(TypeVarId),
    Package(PackageId),
    Module(ModuleId),
    Lambda(ExprId),
}

pub(crate) struct Converted {
    pub ast: Ast,
    pub root: NodeId,
    pub origins: HashMap<NodeId, Origin>,
    pub declarations: HashMap<Declared, NodeId>,
    pub problems: Vec<Problem>,
}

pub(crate) fn convert_unit(input: &ResolvedUnit, options: &ConvertOptions) -> Result<Converted> {
    let source: &str = &input.source;
    let unit: &CompilationUnit = &input.unit;
    if unit.span.start > source.len() {
        return Err(ConvertError::UnitRange {
            start: unit.span.start,
            end: unit.span.end,
            len: source.len(),
        });
    }

    let mut converter = Converter {
        unit,
        symbols: &input.symbols,
        tracker: PositionTracker::new(source),
        options,
        ast: Ast::new(),
        origins: HashMap::new(),
        declarations: HashMap::new(),
        problems: Vec::new(),
        classes: Vec::new(),
    };
    let root = converter.convert_compilation_unit()?;
    Ok(Converted {
        ast: converter.ast,
        root,
        origins: converter.origins,
        declarations: converter.declarations,
        problems: converter.problems,
    })
}

pub(crate) struct Converter<'a> {
    unit: &'a CompilationUnit,
    symbols: &'a SymbolTable,
    tracker: PositionTracker<'a>,
    options: &'a ConvertOptions,
    ast: Ast,
    origins: HashMap<NodeId, Origin>,
    declarations: HashMap<Declared, NodeId>,
    problems: Vec<Problem>,
    /// Enclosing type declarations, innermost last.
    classes: Vec<ClassDeclId>,
}

fn lookup<'u, I: ArenaId, T>(arena: &'u Arena<I, T>, id: I, name: &'static str) -> Result<&'u T> {
    arena.get(id).ok_or(ConvertError::DanglingId {
        arena: name,
        index: id.idx(),
    })
}

impl<'a> Converter<'a> {
    fn class(&self, id: ClassDeclId) -> Result<&'a ClassDecl> {
        lookup(&self.unit.classes, id, "classes")
    }

    fn method(&self, id: MethodDeclId) -> Result<&'a MethodDecl> {
        lookup(&self.unit.methods, id, "methods")
    }

    fn field(&self, id: FieldDeclId) -> Result<&'a FieldDecl> {
        lookup(&self.unit.fields, id, "fields")
    }

    fn var(&self, id: VarDeclId) -> Result<&'a VarDecl> {
        lookup(&self.unit.vars, id, "vars")
    }

    fn stmt(&self, id: StmtId) -> Result<&'a Stmt> {
        lookup(&self.unit.stmts, id, "stmts")
    }

    fn expr(&self, id: ExprId) -> Result<&'a Expr> {
        lookup(&self.unit.exprs, id, "exprs")
    }

    fn type_ref(&self, id: TypeRefId) -> Result<&'a TypeRef> {
        lookup(&self.unit.type_refs, id, "type_refs")
    }

    fn annotation(&self, id: AnnotationId) -> Result<&'a Annotation> {
        lookup(&self.unit.annotations, id, "annotations")
    }

    /// Range of the tokens inside `span`.
    fn range_of(&self, span: Span) -> TextRange {
        self.tracker.range(span).range
    }

    /// Allocate `node` at the token range of `span`, flagging it when the
    /// span had to be clamped into the buffer.
    fn alloc(&mut self, node: impl Into<Node>, span: Span) -> NodeId {
        let tracked = self.tracker.range(span);
        let id = self.ast.alloc(node, tracked.range);
        if tracked.clamped {
            self.mark_malformed(id, format!("source span {span:?} lies outside the buffer"));
        }
        id
    }

    fn alloc_range(&mut self, node: impl Into<Node>, range: TextRange) -> NodeId {
        self.ast.alloc(node, range)
    }

    fn record(&mut self, node: NodeId, origin: Origin) {
        self.origins.insert(node, origin);
    }

    fn declare(&mut self, declared: Declared, node: NodeId) {
        self.declarations.entry(declared).or_insert(node);
    }

    pub(crate) fn mark_malformed(&mut self, node: NodeId, reason: impl Into<String>) {
        self.report(node, "malformed", reason.into());
    }

    fn report(&mut self, node: NodeId, code: &'static str, message: String) {
        let range = self.ast.range(node);
        tracing::debug!(
            node = ?node,
            kind = self.ast.node(node).kind().name(),
            code,
            reason = %message,
            "marked node malformed"
        );
        self.ast.add_flags(node, NodeFlags::MALFORMED);
        self.problems.push(Problem {
            node,
            diagnostic: Diagnostic::warning(
                code,
                message,
                Some(Span::new(offset(range), end_offset(range))),
            ),
        });
    }

    /// Flag `node` when the front-end recovered inside it.
    fn mark_recovered(&mut self, node: NodeId, recovered: bool) {
        if recovered {
            self.ast.add_flags(node, NodeFlags::RECOVERED);
            self.mark_malformed(node, "the front-end recovered from a syntax error here");
        }
    }

    /// Flag `node` when `feature` is unavailable at the requested level.
    fn gate(&mut self, node: NodeId, feature: JavaFeature) {
        let level = self.options.language_level;
        if level.is_enabled(feature) {
            return;
        }
        self.report(
            node,
            "feature-unavailable",
            format!(
                "{} are not available before Java {} (level is {})",
                feature.display_name(),
                feature.stable_since(),
                level
            ),
        );
    }

    fn simple_name(&mut self, ident: &Ident, origin: Origin) -> NodeId {
        let node = self.alloc(
            SimpleName {
                identifier: ident.name.clone(),
            },
            ident.span,
        );
        self.record(node, origin);
        node
    }

    /// A name standing in for something that was not written.
    fn missing_name(&mut self, at: usize) -> NodeId {
        let at = at.min(self.tracker.len());
        let node = self.alloc_range(
            SimpleName {
                identifier: Name::new(""),
            },
            text_range(at, at),
        );
        self.mark_malformed(node, "missing name");
        node
    }

    /// `a.b.c` as nested qualified names. The name for each prefix resolves
    /// like its last segment; `expr` is attached to the whole name only.
    fn convert_name_ref(&mut self, name: &NameRef, expr: Option<ExprId>) -> NodeId {
        let Some((first, rest)) = name.segments.split_first() else {
            return self.missing_name(name.span.start);
        };
        let whole = |idx: usize| if idx == name.segments.len() - 1 { expr } else { None };

        let mut current = self.alloc(
            SimpleName {
                identifier: first.name.clone(),
            },
            first.span,
        );
        self.record(
            current,
            Origin::Name {
                resolution: first.resolution.clone(),
                expr: whole(0),
            },
        );
        for (idx, segment) in rest.iter().enumerate() {
            let simple = self.alloc(
                SimpleName {
                    identifier: segment.name.clone(),
                },
                segment.span,
            );
            let origin = Origin::Name {
                resolution: segment.resolution.clone(),
                expr: whole(idx + 1),
            };
            self.record(simple, origin.clone());
            let range = self.ast.range(current).cover(self.ast.range(simple));
            current = self.alloc_range(
                QualifiedName {
                    qualifier: current,
                    name: simple,
                },
                range,
            );
            self.record(current, origin);
        }
        current
    }

    fn convert_all<I: Copy>(
        &mut self,
        ids: &[I],
        mut f: impl FnMut(&mut Self, I) -> Result<NodeId>,
    ) -> Result<Vec<NodeId>> {
        ids.iter().map(|id| f(self, *id)).collect()
    }
}
