use nova_core::Name;
use nova_hir::{ExprId, ExprKind, Ident, LambdaBody, LiteralKind, MethodRefKind, Resolution, TypeRefKind};
use nova_syntax::JavaFeature;

use super::{AnnotationOwner, Converter, Declared, Origin, Result};
use crate::ast::{
    ArrayAccess, ArrayCreation, ArrayInitializer, Assignment, BooleanLiteral, CastExpression,
    CharacterLiteral, ClassInstanceCreation, ConditionalExpression, CreationReference,
    ExpressionMethodReference, FieldAccess, InfixExpression, InstanceofExpression,
    LambdaExpression, MethodInvocation, Node, NodeId, NullLiteral, NumberLiteral,
    ParenthesizedExpression, PostfixExpression, PrefixExpression, SimpleName, StringLiteral,
    SuperFieldAccess, SuperMethodInvocation, SuperMethodReference, TextBlock, ThisExpression,
    TypeLiteral, TypeMethodReference, VariableDeclarationExpression,
};

impl Converter<'_> {
    pub(crate) fn convert_expr(&mut self, id: ExprId) -> Result<NodeId> {
        let expr = self.expr(id)?;
        let mut features = Vec::new();
        let mut problem = None;

        let node: Node = match &expr.kind {
            ExprKind::Literal { kind, .. } => {
                let text = self.tracker.text(self.range_of(expr.span)).to_string();
                match kind {
                    LiteralKind::Int | LiteralKind::Long | LiteralKind::Float | LiteralKind::Double => {
                        NumberLiteral { token: text }.into()
                    }
                    LiteralKind::Char => CharacterLiteral { escaped: text }.into(),
                    LiteralKind::String => StringLiteral { escaped: text }.into(),
                    LiteralKind::TextBlock => TextBlock { escaped: text }.into(),
                    LiteralKind::Bool => BooleanLiteral {
                        value: text == "true",
                    }
                    .into(),
                    LiteralKind::Null => NullLiteral.into(),
                }
            }
            ExprKind::Name(name) => {
                let node = self.convert_name_ref(name, Some(id));
                self.mark_recovered(node, expr.recovered);
                return Ok(node);
            }
            ExprKind::Annotation(annotation) => {
                return self.convert_annotation(*annotation, AnnotationOwner::Value);
            }
            ExprKind::FieldAccess {
                receiver,
                name,
                field,
            } => {
                let expression = self.convert_expr(*receiver)?;
                let name = self.simple_name(
                    name,
                    Origin::Name {
                        resolution: field.map_or(Resolution::Unresolved, Resolution::Var),
                        expr: Some(id),
                    },
                );
                FieldAccess { expression, name }.into()
            }
            ExprKind::SuperFieldAccess {
                qualifier,
                name,
                field,
            } => {
                let qualifier = qualifier.as_ref().map(|q| self.convert_name_ref(q, None));
                let name = self.simple_name(
                    name,
                    Origin::Name {
                        resolution: field.map_or(Resolution::Unresolved, Resolution::Var),
                        expr: Some(id),
                    },
                );
                SuperFieldAccess { qualifier, name }.into()
            }
            ExprKind::This { qualifier } => ThisExpression {
                qualifier: qualifier.as_ref().map(|q| self.convert_name_ref(q, None)),
            }
            .into(),
            ExprKind::MethodCall {
                receiver,
                type_args,
                name,
                args,
                method,
            } => {
                let expression = match receiver {
                    Some(receiver) => Some(self.convert_expr(*receiver)?),
                    None => None,
                };
                let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                let name = self.simple_name(
                    name,
                    Origin::Name {
                        resolution: method.map_or(Resolution::Unresolved, Resolution::Method),
                        expr: Some(id),
                    },
                );
                let arguments = self.convert_all(args, |this, arg| this.convert_expr(arg))?;
                if !type_arguments.is_empty() {
                    features.push(JavaFeature::Generics);
                }
                MethodInvocation {
                    expression,
                    type_arguments,
                    name,
                    arguments,
                }
                .into()
            }
            ExprKind::SuperMethodCall {
                qualifier,
                type_args,
                name,
                args,
                method,
            } => {
                let qualifier = qualifier.as_ref().map(|q| self.convert_name_ref(q, None));
                let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                let name = self.simple_name(
                    name,
                    Origin::Name {
                        resolution: method.map_or(Resolution::Unresolved, Resolution::Method),
                        expr: Some(id),
                    },
                );
                let arguments = self.convert_all(args, |this, arg| this.convert_expr(arg))?;
                SuperMethodInvocation {
                    qualifier,
                    type_arguments,
                    name,
                    arguments,
                }
                .into()
            }
            ExprKind::New {
                outer,
                type_args,
                ty,
                args,
                body,
                ctor: _,
            } => {
                let expression = match outer {
                    Some(outer) => Some(self.convert_expr(*outer)?),
                    None => None,
                };
                let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                let ty = self.convert_type(*ty)?;
                let arguments = self.convert_all(args, |this, arg| this.convert_expr(arg))?;
                let anonymous_class = match body {
                    Some(body) => Some(self.convert_anonymous_class(*body)?),
                    None => None,
                };
                ClassInstanceCreation {
                    expression,
                    type_arguments,
                    ty,
                    arguments,
                    anonymous_class,
                }
                .into()
            }
            ExprKind::NewArray {
                ty,
                dim_exprs,
                initializer,
            } => {
                let ty = self.convert_type(*ty)?;
                let dimensions = self.convert_all(dim_exprs, |this, dim| this.convert_expr(dim))?;
                let initializer = match initializer {
                    Some(init) => Some(self.convert_expr(*init)?),
                    None => None,
                };
                ArrayCreation {
                    ty,
                    dimensions,
                    initializer,
                }
                .into()
            }
            ExprKind::ArrayInit(exprs) => ArrayInitializer {
                expressions: self.convert_all(exprs, |this, expr| this.convert_expr(expr))?,
            }
            .into(),
            ExprKind::ArrayAccess { array, index } => ArrayAccess {
                array: self.convert_expr(*array)?,
                index: self.convert_expr(*index)?,
            }
            .into(),
            ExprKind::Assign { op, lhs, rhs } => Assignment {
                lhs: self.convert_expr(*lhs)?,
                operator: *op,
                rhs: self.convert_expr(*rhs)?,
            }
            .into(),
            ExprKind::Binary { op, lhs, rhs } => {
                // `a + b + c` parses as `(a + b) + c`; walk down the left spine
                // while the operator repeats.
                let mut operands = vec![*rhs];
                let mut left = *lhs;
                while let ExprKind::Binary {
                    op: inner,
                    lhs: inner_lhs,
                    rhs: inner_rhs,
                } = &self.expr(left)?.kind
                {
                    if inner != op {
                        break;
                    }
                    operands.push(*inner_rhs);
                    left = *inner_lhs;
                }
                operands.reverse();
                let lhs = self.convert_expr(left)?;
                let mut converted = self.convert_all(&operands, |this, operand| this.convert_expr(operand))?;
                let extended_operands = converted.split_off(1);
                InfixExpression {
                    lhs,
                    operator: *op,
                    rhs: converted[0],
                    extended_operands,
                }
                .into()
            }
            ExprKind::Unary { op, operand } => PrefixExpression {
                operator: *op,
                operand: self.convert_expr(*operand)?,
            }
            .into(),
            ExprKind::Postfix { op, operand } => PostfixExpression {
                operand: self.convert_expr(*operand)?,
                operator: *op,
            }
            .into(),
            ExprKind::Cast { ty, expr: inner } => {
                let ty = self.convert_type(*ty)?;
                CastExpression {
                    ty,
                    expression: self.convert_expr(*inner)?,
                }
                .into()
            }
            ExprKind::InstanceOf { expr: inner, ty } => InstanceofExpression {
                expression: self.convert_expr(*inner)?,
                ty: self.convert_type(*ty)?,
            }
            .into(),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => ConditionalExpression {
                expression: self.convert_expr(*cond)?,
                then_expression: self.convert_expr(*then_expr)?,
                else_expression: self.convert_expr(*else_expr)?,
            }
            .into(),
            ExprKind::Paren(inner) => ParenthesizedExpression {
                expression: self.convert_expr(*inner)?,
            }
            .into(),
            ExprKind::ClassLit(ty) => TypeLiteral {
                ty: self.convert_type(*ty)?,
            }
            .into(),
            ExprKind::Lambda {
                params,
                parenthesized,
                body,
            } => {
                features.push(JavaFeature::Lambdas);
                let mut parameters = Vec::with_capacity(params.len());
                for &param in params {
                    let declared = self.var(param)?.ty;
                    let node = match declared {
                        None => self.convert_fragment(param)?,
                        Some(ty) => {
                            if self.type_ref(ty)?.kind == TypeRefKind::Var {
                                features.push(JavaFeature::VarLambdaParameters);
                            }
                            self.convert_single_var(param, false)?
                        }
                    };
                    parameters.push(node);
                }
                let body = match body {
                    LambdaBody::Expr(body) => self.convert_expr(*body)?,
                    LambdaBody::Block(body) => self.convert_stmt(*body)?,
                };
                LambdaExpression {
                    parentheses: *parenthesized,
                    parameters,
                    body,
                }
                .into()
            }
            ExprKind::MethodRef {
                kind,
                type_args,
                name,
                method,
            } => {
                features.push(JavaFeature::MethodReferences);
                let name_origin = Origin::Name {
                    resolution: method.map_or(Resolution::Unresolved, Resolution::Method),
                    expr: Some(id),
                };
                match kind {
                    MethodRefKind::New(ty) => {
                        let ty = self.convert_type(*ty)?;
                        let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                        CreationReference { ty, type_arguments }.into()
                    }
                    MethodRefKind::Expr(receiver) => {
                        let expression = self.convert_expr(*receiver)?;
                        let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                        let name = self.reference_name(name.as_ref(), name_origin, expr.span.end);
                        ExpressionMethodReference {
                            expression,
                            type_arguments,
                            name,
                        }
                        .into()
                    }
                    MethodRefKind::Super(qualifier) => {
                        let qualifier = qualifier.as_ref().map(|q| self.convert_name_ref(q, None));
                        let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                        let name = self.reference_name(name.as_ref(), name_origin, expr.span.end);
                        SuperMethodReference {
                            qualifier,
                            type_arguments,
                            name,
                        }
                        .into()
                    }
                    MethodRefKind::Type(ty) => {
                        let ty = self.convert_type(*ty)?;
                        let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                        let name = self.reference_name(name.as_ref(), name_origin, expr.span.end);
                        TypeMethodReference {
                            ty,
                            type_arguments,
                            name,
                        }
                        .into()
                    }
                }
            }
            ExprKind::VarDeclExpr {
                modifiers,
                ty,
                declarators,
            } => {
                let first = match declarators.first() {
                    Some(var) => self.var(*var)?.symbol,
                    None => None,
                };
                VariableDeclarationExpression {
                    modifiers: self.convert_modifiers(modifiers, AnnotationOwner::var(first))?,
                    ty: self.convert_type(*ty)?,
                    fragments: self.convert_all(declarators, |this, var| this.convert_fragment(var))?,
                }
                .into()
            }
            ExprKind::Error => {
                problem = Some("unparseable expression");
                SimpleName {
                    identifier: Name::new(""),
                }
                .into()
            }
        };

        let is_lambda = matches!(expr.kind, ExprKind::Lambda { .. });
        let node = self.alloc(node, expr.span);
        self.record(node, Origin::Expr(id));
        if is_lambda {
            self.declare(Declared::Lambda(id), node);
        }
        for feature in features {
            self.gate(node, feature);
        }
        if let Some(problem) = problem {
            self.mark_malformed(node, problem);
        }
        self.mark_recovered(node, expr.recovered);
        Ok(node)
    }

    fn reference_name(&mut self, name: Option<&Ident>, origin: Origin, end: usize) -> NodeId {
        match name {
            Some(name) => self.simple_name(name, origin),
            None => self.missing_name(end),
        }
    }
}
