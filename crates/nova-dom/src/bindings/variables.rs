use std::sync::Arc;

use nova_hir::{AssignOp, ExprId, ExprKind, Resolution, StmtId, StmtKind, UnaryOp};
use nova_types::{ConstValue, Modifiers, Span, VarDef, VarId, VarKind};

use super::{
    binding_handle, key, AnnotationBinding, BindingData, BindingId, BindingKind, MethodBinding,
    TypeBinding, VariableData,
};
use crate::Dom;

/// A field, enum constant, record component, parameter or local variable.
#[derive(Clone)]
pub struct VariableBinding<'dom> {
    pub(crate) dom: &'dom Dom,
    pub(crate) id: BindingId,
    pub(crate) data: Arc<VariableData>,
}

binding_handle!(VariableBinding, Variable);

impl<'dom> VariableBinding<'dom> {
    pub(crate) fn new(dom: &'dom Dom, id: BindingId) -> Self {
        match dom.bindings.get(id) {
            BindingData::Variable(data) => VariableBinding { dom, id, data },
            other => panic!("{id:?} is not a variable binding: {other:?}"),
        }
    }

    fn def(&self) -> Option<&'dom VarDef> {
        self.dom.symbols().var_def(self.data.var)
    }

    fn kind(&self) -> Option<VarKind> {
        Some(self.def()?.kind)
    }

    pub fn key(&self) -> &str {
        &self.data.key
    }

    /// The source name, or `val$<name>` for a lambda's copy of a captured
    /// local.
    pub fn name(&self) -> String {
        if let Some(name) = &self.data.synthetic_name {
            return name.clone();
        }
        self.def().map_or_else(String::new, |def| def.name.clone())
    }

    pub fn is_synthetic(&self) -> bool {
        self.data.synthetic_name.is_some()
    }

    /// Fields and enum constants.
    pub fn is_field(&self) -> bool {
        self.kind().is_some_and(VarKind::is_field_like)
    }

    pub fn is_enum_constant(&self) -> bool {
        self.kind() == Some(VarKind::EnumConstant)
    }

    pub fn is_record_component(&self) -> bool {
        self.kind() == Some(VarKind::RecordComponent)
    }

    /// Method, constructor and lambda parameters.
    pub fn is_parameter(&self) -> bool {
        matches!(
            self.kind(),
            Some(VarKind::Parameter | VarKind::LambdaParameter)
        )
    }

    /// The symbol's index in the unit's symbol table.
    pub fn variable_id(&self) -> u32 {
        self.data.var.idx() as u32
    }

    pub fn ty(&self) -> Option<TypeBinding<'dom>> {
        self.dom.type_binding(&self.data.ty)
    }

    /// Declaring class of a field, enum constant or record component.
    pub fn declaring_class(&self) -> Option<TypeBinding<'dom>> {
        let def = self.def()?;
        if def.kind.is_local_like() {
            return None;
        }
        self.dom.class_declaration_binding(def.declaring_class?)
    }

    /// Innermost method or lambda declaring a parameter or local.
    pub fn declaring_method(&self) -> Option<MethodBinding<'dom>> {
        let def = self.def()?;
        if !def.kind.is_local_like() || self.is_synthetic() {
            return None;
        }
        if let Some(site) = def.lambda_site {
            return self.dom.lambda_binding(self.dom.lambda_at(site)?);
        }
        self.dom.method_binding(def.declaring_method?, None)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.def().map_or(Modifiers::empty(), |def| def.modifiers)
    }

    pub fn constant_value(&self) -> Option<&'dom ConstValue> {
        self.def()?.constant.as_ref()
    }

    pub fn is_effectively_final(&self) -> bool {
        self.dom.is_effectively_final(self.data.var)
    }

    pub fn is_deprecated(&self) -> bool {
        self.def().is_some_and(|def| def.deprecated)
    }

    pub fn annotations(&self) -> Vec<AnnotationBinding<'dom>> {
        let Some(def) = self.def() else {
            return Vec::new();
        };
        def.annotations
            .iter()
            .filter_map(|instance| self.dom.annotation_binding(instance, &self.data.key))
            .collect()
    }

    /// The variable as declared; a synthetic copy maps to the captured local.
    pub fn variable_declaration(&self) -> VariableBinding<'dom> {
        if !self.is_synthetic() {
            return self.clone();
        }
        self.dom
            .variable_binding(self.data.var)
            .unwrap_or_else(|| self.clone())
    }
}

impl Dom {
    pub(crate) fn variable_binding(&self, var: VarId) -> Option<VariableBinding<'_>> {
        let def = self.symbols().var_def(var)?;
        let key = self.variable_key(var)?;
        let interned = key.clone();
        let id = self.bindings.intern(BindingKind::Variable, &interned, || {
            Some(BindingData::Variable(Arc::new(VariableData {
                var,
                ty: def.ty.clone(),
                key,
                synthetic_name: None,
            })))
        })?;
        Some(VariableBinding::new(self, id))
    }

    /// Fields are keyed by their class; parameters and locals by the
    /// innermost lambda, method or initializer class declaring them, with a
    /// `#k` suffix for the k-th earlier local of the same name in that scope.
    fn variable_key(&self, var: VarId) -> Option<String> {
        let symbols = self.symbols();
        let def = symbols.var_def(var)?;
        if !def.kind.is_local_like() {
            return key::field_key(symbols, var);
        }
        let scope = if let Some(site) = def.lambda_site {
            let lambda = self.lambda_at(site).and_then(|expr| self.lambda_binding(expr));
            match lambda {
                Some(lambda) => lambda.key().to_string(),
                // Untargeted lambdas still scope their parameters.
                None => format!(
                    "{}.lambda${site}",
                    key::declaration_key(symbols, def.declaring_class?)?
                ),
            }
        } else if let Some(method) = def.declaring_method {
            self.method_binding(method, None)?.key().to_string()
        } else {
            key::declaration_key(symbols, def.declaring_class?)?
        };
        let shadowed = symbols
            .vars()
            .filter(|(other, other_def)| {
                *other != var
                    && other_def.kind.is_local_like()
                    && other_def.name == def.name
                    && other_def.declaring_method == def.declaring_method
                    && other_def.declaring_class == def.declaring_class
                    && other_def.lambda_site == def.lambda_site
                    && other_def.decl_offset < def.decl_offset
            })
            .count();
        Some(if shadowed == 0 {
            format!("{scope}#{}", def.name)
        } else {
            format!("{scope}#{}#{shadowed}", def.name)
        })
    }

    /// The lambda expression starting at `site`.
    pub(crate) fn lambda_at(&self, site: u32) -> Option<ExprId> {
        self.unit()
            .exprs
            .iter()
            .find(|(_, expr)| {
                expr.span.start == site as usize && matches!(expr.kind, ExprKind::Lambda { .. })
            })
            .map(|(id, _)| id)
    }

    /// Whether local `var` is never assigned after its initialization.
    ///
    /// Parameters and the variables of `catch`, enhanced `for` and resource
    /// headers count as initialized, as does a local with an initializer;
    /// any later assignment disqualifies those. A local declared without an
    /// initializer may be assigned with plain `=` at most once on any path:
    /// never inside a loop it was declared outside of, and two assignments
    /// only on exclusive `if`/`else` or `switch` branches. Compound assignment
    /// and `++`/`--` always disqualify. Fields are never effectively final.
    pub(crate) fn is_effectively_final(&self, var: VarId) -> bool {
        let Some(def) = self.symbols().var_def(var) else {
            return false;
        };
        let initialized = match def.kind {
            VarKind::Field | VarKind::EnumConstant | VarKind::RecordComponent => return false,
            VarKind::Parameter
            | VarKind::LambdaParameter
            | VarKind::ForEach
            | VarKind::CatchParameter
            | VarKind::Resource => true,
            VarKind::Local => self
                .unit()
                .vars
                .iter()
                .any(|(_, decl)| decl.symbol == Some(var) && decl.initializer.is_some()),
        };

        let unit = self.unit();
        let names_var = |expr: ExprId| {
            let Some(expr) = unit.exprs.get(expr) else {
                return false;
            };
            match &expr.kind {
                ExprKind::Name(name) => {
                    name.segments.len() == 1 && *name.resolution() == Resolution::Var(var)
                }
                ExprKind::Paren(inner) => matches!(
                    unit.exprs.get(*inner).map(|e| &e.kind),
                    Some(ExprKind::Name(name))
                        if name.segments.len() == 1 && *name.resolution() == Resolution::Var(var)
                ),
                _ => false,
            }
        };

        let mut plain = Vec::new();
        for (_, expr) in unit.exprs.iter() {
            match &expr.kind {
                ExprKind::Assign { op, lhs, .. } if names_var(*lhs) => {
                    if *op != AssignOp::Assign {
                        return false;
                    }
                    plain.push(expr.span.start);
                }
                ExprKind::Unary {
                    op: UnaryOp::PreInc | UnaryOp::PreDec,
                    operand,
                } if names_var(*operand) => return false,
                ExprKind::Postfix { operand, .. } if names_var(*operand) => return false,
                _ => {}
            }
        }
        if initialized {
            return plain.is_empty();
        }

        // A blank local is assigned at most once on every path: no
        // assignment repeats in a loop entered after the declaration, and
        // any two assignments sit on mutually exclusive branches.
        let declared_at = def.decl_offset.map(|offset| offset as usize);
        if plain
            .iter()
            .any(|site| self.repeats_in_loop(*site, declared_at))
        {
            return false;
        }
        plain.iter().enumerate().all(|(idx, first)| {
            plain[idx + 1..]
                .iter()
                .all(|second| self.on_exclusive_paths(*first, *second))
        })
    }

    /// Whether the code at `offset` may run more than once after the
    /// declaration at `declared_at`.
    fn repeats_in_loop(&self, offset: usize, declared_at: Option<usize>) -> bool {
        let unit = self.unit();
        unit.stmts.iter().any(|(_, stmt)| {
            let repeated = match &stmt.kind {
                StmtKind::While { .. } | StmtKind::Do { .. } | StmtKind::ForEach { .. } => {
                    stmt.span.contains(offset)
                }
                // The init clause of a `for` runs once.
                StmtKind::For { init, .. } => {
                    stmt.span.contains(offset)
                        && !init.iter().any(|expr| {
                            unit.exprs
                                .get(*expr)
                                .is_some_and(|expr| expr.span.contains(offset))
                        })
                }
                _ => false,
            };
            repeated && !declared_at.is_some_and(|at| stmt.span.contains(at))
        })
    }

    /// Whether no single execution path reaches both `a` and `b`.
    fn on_exclusive_paths(&self, a: usize, b: usize) -> bool {
        let unit = self.unit();
        let span_of = |stmt: StmtId| unit.stmts.get(stmt).map(|stmt| stmt.span);
        unit.stmts.iter().any(|(_, stmt)| match &stmt.kind {
            StmtKind::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                let (Some(then), Some(other)) = (span_of(*then_branch), span_of(*else_branch)) else {
                    return false;
                };
                (then.contains(a) && other.contains(b)) || (then.contains(b) && other.contains(a))
            }
            StmtKind::Switch { cases, .. } => {
                let arm_of = |offset: usize| {
                    cases.iter().position(|case| {
                        let end = case
                            .body
                            .last()
                            .and_then(|last| span_of(*last))
                            .map_or(case.span.end, |span| span.end);
                        Span::new(case.span.start, end).contains(offset)
                    })
                };
                match (arm_of(a), arm_of(b)) {
                    (Some(x), Some(y)) if x != y => {
                        // Falling through from the earlier arm reaches the later one.
                        cases[x.min(y)..x.max(y)]
                            .iter()
                            .any(|case| case.arrow || self.completes_abruptly(case.body.last().copied()))
                    }
                    _ => false,
                }
            }
            _ => false,
        })
    }

    fn completes_abruptly(&self, stmt: Option<StmtId>) -> bool {
        let Some(stmt) = stmt.and_then(|stmt| self.unit().stmts.get(stmt)) else {
            return false;
        };
        match &stmt.kind {
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Return(_) | StmtKind::Throw(_) => true,
            StmtKind::Block(stmts) => self.completes_abruptly(stmts.last().copied()),
            _ => false,
        }
    }
}
