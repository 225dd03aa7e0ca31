use nova_hir::{ExprKind, StmtId, StmtKind};
use nova_syntax::JavaFeature;

use super::{AnnotationOwner, Converter, Origin, Result};
use crate::ast::{
    AssertStatement, Block, BreakStatement, CatchClause, ConstructorInvocation, ContinueStatement,
    DoStatement, EmptyStatement, EnhancedForStatement, ExpressionStatement, ForStatement,
    IfStatement, LabeledStatement, Node, NodeId, ReturnStatement, SuperConstructorInvocation,
    SwitchCase, SwitchStatement, SynchronizedStatement, ThrowStatement, TryStatement,
    TypeDeclarationStatement, VariableDeclarationStatement, WhileStatement,
};

impl Converter<'_> {
    pub(crate) fn convert_stmt(&mut self, id: StmtId) -> Result<NodeId> {
        let stmt = self.stmt(id)?;
        let mut features = Vec::new();
        let mut problem = None;

        let node: Node = match &stmt.kind {
            StmtKind::Block(stmts) => Block {
                statements: self.convert_all(stmts, |this, stmt| this.convert_stmt(stmt))?,
            }
            .into(),
            StmtKind::LocalVar {
                modifiers,
                ty,
                declarators,
            } => {
                let first = match declarators.first() {
                    Some(var) => self.var(*var)?.symbol,
                    None => None,
                };
                VariableDeclarationStatement {
                    modifiers: self.convert_modifiers(modifiers, AnnotationOwner::var(first))?,
                    ty: self.convert_type(*ty)?,
                    fragments: self.convert_all(declarators, |this, var| this.convert_fragment(var))?,
                }
                .into()
            }
            StmtKind::LocalClass(class) => TypeDeclarationStatement {
                declaration: self.convert_class_declaration(*class)?,
            }
            .into(),
            StmtKind::Expr(expr) => ExpressionStatement {
                expression: self.convert_expr(*expr)?,
            }
            .into(),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => IfStatement {
                expression: self.convert_expr(*cond)?,
                then_statement: self.convert_stmt(*then_branch)?,
                else_statement: match else_branch {
                    Some(stmt) => Some(self.convert_stmt(*stmt)?),
                    None => None,
                },
            }
            .into(),
            StmtKind::While { cond, body } => WhileStatement {
                expression: self.convert_expr(*cond)?,
                body: self.convert_stmt(*body)?,
            }
            .into(),
            StmtKind::Do { body, cond } => DoStatement {
                body: self.convert_stmt(*body)?,
                expression: self.convert_expr(*cond)?,
            }
            .into(),
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => ForStatement {
                initializers: self.convert_all(init, |this, expr| this.convert_expr(expr))?,
                expression: match cond {
                    Some(cond) => Some(self.convert_expr(*cond)?),
                    None => None,
                },
                updaters: self.convert_all(update, |this, expr| this.convert_expr(expr))?,
                body: self.convert_stmt(*body)?,
            }
            .into(),
            StmtKind::ForEach {
                param,
                iterable,
                body,
            } => {
                features.push(JavaFeature::EnhancedFor);
                EnhancedForStatement {
                    parameter: self.convert_single_var(*param, false)?,
                    expression: self.convert_expr(*iterable)?,
                    body: self.convert_stmt(*body)?,
                }
                .into()
            }
            StmtKind::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                if !resources.is_empty() {
                    features.push(JavaFeature::TryWithResources);
                }
                let mut references = false;
                for resource in resources {
                    references |= !matches!(self.expr(*resource)?.kind, ExprKind::VarDeclExpr { .. });
                }
                if references {
                    features.push(JavaFeature::ResourceReferences);
                }
                if resources.is_empty() && catches.is_empty() && finally.is_none() {
                    problem = Some("`try` without `catch` or `finally`");
                }
                let resources = self.convert_all(resources, |this, expr| this.convert_expr(expr))?;
                let body = self.convert_stmt(*body)?;
                let mut catch_clauses = Vec::with_capacity(catches.len());
                for clause in catches {
                    let exception = self.convert_single_var(clause.param, true)?;
                    let body = self.convert_stmt(clause.body)?;
                    catch_clauses.push(self.alloc(CatchClause { exception, body }, clause.span));
                }
                let finally = match finally {
                    Some(stmt) => Some(self.convert_stmt(*stmt)?),
                    None => None,
                };
                TryStatement {
                    resources,
                    body,
                    catch_clauses,
                    finally,
                }
                .into()
            }
            StmtKind::Switch { selector, cases } => {
                let expression = self.convert_expr(*selector)?;
                let mut statements = Vec::new();
                for case in cases {
                    let expressions = self.convert_all(&case.labels, |this, expr| this.convert_expr(expr))?;
                    let label = self.alloc(
                        SwitchCase {
                            expressions,
                            is_default: case.is_default,
                            arrow: case.arrow,
                        },
                        case.span,
                    );
                    if case.arrow {
                        self.gate(label, JavaFeature::SwitchExpressions);
                    }
                    if case.is_default != case.labels.is_empty() {
                        self.mark_malformed(label, "`default` label with expressions, or `case` without");
                    }
                    statements.push(label);
                    statements.extend(self.convert_all(&case.body, |this, stmt| this.convert_stmt(stmt))?);
                }
                SwitchStatement {
                    expression,
                    statements,
                }
                .into()
            }
            StmtKind::Return(expr) => ReturnStatement {
                expression: match expr {
                    Some(expr) => Some(self.convert_expr(*expr)?),
                    None => None,
                },
            }
            .into(),
            StmtKind::Throw(expr) => ThrowStatement {
                expression: self.convert_expr(*expr)?,
            }
            .into(),
            StmtKind::Break(label) => BreakStatement {
                label: label
                    .as_ref()
                    .map(|label| self.simple_name(label, Origin::Unresolved)),
            }
            .into(),
            StmtKind::Continue(label) => ContinueStatement {
                label: label
                    .as_ref()
                    .map(|label| self.simple_name(label, Origin::Unresolved)),
            }
            .into(),
            StmtKind::Labeled { label, body } => LabeledStatement {
                label: self.simple_name(label, Origin::Unresolved),
                body: self.convert_stmt(*body)?,
            }
            .into(),
            StmtKind::Synchronized { lock, body } => SynchronizedStatement {
                expression: self.convert_expr(*lock)?,
                body: self.convert_stmt(*body)?,
            }
            .into(),
            StmtKind::Assert { cond, message } => AssertStatement {
                expression: self.convert_expr(*cond)?,
                message: match message {
                    Some(expr) => Some(self.convert_expr(*expr)?),
                    None => None,
                },
            }
            .into(),
            StmtKind::ConstructorCall {
                is_super,
                qualifier,
                type_args,
                args,
                ctor: _,
            } => {
                let expression = match qualifier {
                    Some(expr) if *is_super => Some(self.convert_expr(*expr)?),
                    Some(_) => {
                        problem = Some("qualified `this(...)` invocation");
                        None
                    }
                    None => None,
                };
                let type_arguments = self.convert_all(type_args, |this, ty| this.convert_type(ty))?;
                let arguments = self.convert_all(args, |this, expr| this.convert_expr(expr))?;
                if !type_arguments.is_empty() {
                    features.push(JavaFeature::Generics);
                }
                if *is_super {
                    SuperConstructorInvocation {
                        expression,
                        type_arguments,
                        arguments,
                    }
                    .into()
                } else {
                    ConstructorInvocation {
                        type_arguments,
                        arguments,
                    }
                    .into()
                }
            }
            StmtKind::Empty => EmptyStatement.into(),
            StmtKind::Error => {
                problem = Some("unparseable statement");
                EmptyStatement.into()
            }
        };

        let constructor_call = matches!(stmt.kind, StmtKind::ConstructorCall { .. });
        let node = self.alloc(node, stmt.span);
        if constructor_call {
            self.record(node, Origin::Stmt(id));
        }
        for feature in features {
            self.gate(node, feature);
        }
        if let Some(problem) = problem {
            self.mark_malformed(node, problem);
        }
        self.mark_recovered(node, stmt.recovered);
        Ok(node)
    }
}
