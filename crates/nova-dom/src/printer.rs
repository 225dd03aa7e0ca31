//! Canonical surface form of a subtree.
//!
//! The output is rebuilt from node payloads only; nothing is copied from the
//! source buffer. Statements and body declarations end with a newline and
//! are indented two spaces per nesting level.

use crate::ast::*;
use crate::Dom;

pub(crate) fn print(dom: &Dom, node: NodeId) -> String {
    let mut printer = Printer {
        dom,
        out: String::new(),
        indent: 0,
    };
    printer.node(node);
    printer.out
}

struct Printer<'a> {
    dom: &'a Dom,
    out: String,
    indent: usize,
}

impl Printer<'_> {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn print_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn list(&mut self, ids: &[NodeId], separator: &str) {
        for (idx, id) in ids.iter().enumerate() {
            if idx > 0 {
                self.push(separator);
            }
            self.node(*id);
        }
    }

    /// Modifiers and annotations, each followed by a space.
    fn modifiers(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.node(*id);
            self.push(" ");
        }
    }

    fn type_arguments(&mut self, ids: &[NodeId]) {
        if !ids.is_empty() {
            self.push("<");
            self.list(ids, ", ");
            self.push(">");
        }
    }

    fn arguments(&mut self, ids: &[NodeId]) {
        self.push("(");
        self.list(ids, ", ");
        self.push(")");
    }

    fn dimensions(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.node(*id);
        }
    }

    /// A statement on its own line(s) at the current indentation.
    fn statement(&mut self, id: NodeId) {
        self.print_indent();
        self.node(id);
    }

    /// The body of `if`, loops and labels: blocks stay on the header line.
    fn nested_statement(&mut self, id: NodeId) {
        if matches!(self.dom.node(id), Node::Block(_)) {
            self.push(" ");
            self.node(id);
        } else {
            self.push("\n");
            self.indent += 1;
            self.statement(id);
            self.indent -= 1;
        }
    }

    fn body_declarations(&mut self, ids: &[NodeId]) {
        self.push("{\n");
        self.indent += 1;
        for id in ids {
            self.statement(*id);
        }
        self.indent -= 1;
        self.print_indent();
        self.push("}\n");
    }

    fn type_parameters(&mut self, ids: &[NodeId]) {
        self.type_arguments(ids);
    }

    fn clause(&mut self, keyword: &str, ids: &[NodeId]) {
        if !ids.is_empty() {
            self.push(keyword);
            self.list(ids, ", ");
        }
    }

    fn annotation_prefixes(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.push(" ");
            self.node(*id);
        }
    }

    fn node(&mut self, id: NodeId) {
        let dom = self.dom;
        match dom.node(id) {
            Node::CompilationUnit(n) => {
                if let Some(package) = n.package {
                    self.node(package);
                }
                for import in &n.imports {
                    self.node(*import);
                }
                if let Some(module) = n.module {
                    self.node(module);
                }
                for ty in &n.types {
                    self.node(*ty);
                }
            }
            Node::PackageDeclaration(n) => {
                self.modifiers(&n.annotations);
                self.push("package ");
                self.node(n.name);
                self.push(";\n");
            }
            Node::ImportDeclaration(n) => {
                self.push("import ");
                if n.is_static {
                    self.push("static ");
                }
                self.node(n.name);
                if n.on_demand {
                    self.push(".*");
                }
                self.push(";\n");
            }
            Node::ModuleDeclaration(n) => {
                self.modifiers(&n.annotations);
                if n.open {
                    self.push("open ");
                }
                self.push("module ");
                self.node(n.name);
                self.push(" ");
                self.body_declarations(&n.directives);
            }
            Node::RequiresDirective(n) => {
                self.push("requires ");
                self.modifiers(&n.modifiers);
                self.node(n.name);
                self.push(";\n");
            }
            Node::ExportsDirective(n) => {
                self.push("exports ");
                self.node(n.name);
                self.clause(" to ", &n.modules);
                self.push(";\n");
            }
            Node::OpensDirective(n) => {
                self.push("opens ");
                self.node(n.name);
                self.clause(" to ", &n.modules);
                self.push(";\n");
            }
            Node::UsesDirective(n) => {
                self.push("uses ");
                self.node(n.name);
                self.push(";\n");
            }
            Node::ProvidesDirective(n) => {
                self.push("provides ");
                self.node(n.name);
                self.clause(" with ", &n.implementations);
                self.push(";\n");
            }
            Node::ModuleModifier(n) => self.push(n.keyword.keyword()),
            Node::TypeDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.push(if n.is_interface { "interface " } else { "class " });
                self.node(n.name);
                self.type_parameters(&n.type_parameters);
                if let Some(superclass) = n.superclass {
                    self.push(" extends ");
                    self.node(superclass);
                }
                let keyword = if n.is_interface { " extends " } else { " implements " };
                self.clause(keyword, &n.super_interfaces);
                self.clause(" permits ", &n.permitted_types);
                self.push(" ");
                self.body_declarations(&n.body);
            }
            Node::EnumDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.push("enum ");
                self.node(n.name);
                self.clause(" implements ", &n.super_interfaces);
                self.push(" {\n");
                self.indent += 1;
                for (idx, constant) in n.constants.iter().enumerate() {
                    if idx > 0 {
                        self.push(",\n");
                    }
                    self.print_indent();
                    self.node(*constant);
                }
                if !n.constants.is_empty() {
                    self.push(if n.body.is_empty() { "\n" } else { ";\n" });
                }
                for member in &n.body {
                    self.statement(*member);
                }
                self.indent -= 1;
                self.print_indent();
                self.push("}\n");
            }
            Node::RecordDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.push("record ");
                self.node(n.name);
                self.type_parameters(&n.type_parameters);
                self.arguments(&n.components);
                self.clause(" implements ", &n.super_interfaces);
                self.push(" ");
                self.body_declarations(&n.body);
            }
            Node::AnnotationTypeDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.push("@interface ");
                self.node(n.name);
                self.push(" ");
                self.body_declarations(&n.body);
            }
            Node::AnonymousClassDeclaration(n) => self.body_declarations(&n.body),
            Node::EnumConstantDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.name);
                if !n.arguments.is_empty() {
                    self.arguments(&n.arguments);
                }
                if let Some(body) = n.anonymous_class {
                    self.push(" ");
                    self.node(body);
                }
            }
            Node::AnnotationTypeMemberDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.ty);
                self.push(" ");
                self.node(n.name);
                self.push("()");
                if let Some(default) = n.default {
                    self.push(" default ");
                    self.node(default);
                }
                self.push(";\n");
            }
            Node::FieldDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.ty);
                self.push(" ");
                self.list(&n.fragments, ", ");
                self.push(";\n");
            }
            Node::MethodDeclaration(n) => self.method(n),
            Node::Initializer(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.body);
            }
            Node::VariableDeclarationFragment(n) => {
                self.node(n.name);
                self.dimensions(&n.extra_dimensions);
                if let Some(initializer) = n.initializer {
                    self.push(" = ");
                    self.node(initializer);
                }
            }
            Node::SingleVariableDeclaration(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.ty);
                if n.varargs {
                    self.annotation_prefixes(&n.varargs_annotations);
                    self.push("...");
                }
                self.push(" ");
                self.node(n.name);
                self.dimensions(&n.extra_dimensions);
                if let Some(initializer) = n.initializer {
                    self.push(" = ");
                    self.node(initializer);
                }
            }
            Node::TypeParameter(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.name);
                if !n.bounds.is_empty() {
                    self.push(" extends ");
                    self.list(&n.bounds, " & ");
                }
            }
            Node::Modifier(n) => self.push(n.keyword.keyword().unwrap_or_default()),
            Node::Dimension(n) => {
                self.annotation_prefixes(&n.annotations);
                self.push(if n.annotations.is_empty() { "[]" } else { " []" });
            }
            Node::MarkerAnnotation(n) => {
                self.push("@");
                self.node(n.type_name);
            }
            Node::SingleMemberAnnotation(n) => {
                self.push("@");
                self.node(n.type_name);
                self.push("(");
                self.node(n.value);
                self.push(")");
            }
            Node::NormalAnnotation(n) => {
                self.push("@");
                self.node(n.type_name);
                self.arguments(&n.values);
            }
            Node::MemberValuePair(n) => {
                self.node(n.name);
                self.push("=");
                self.node(n.value);
            }
            Node::PrimitiveType(n) => {
                self.modifiers(&n.annotations);
                self.push(n.keyword());
            }
            Node::SimpleType(n) => {
                self.modifiers(&n.annotations);
                self.node(n.name);
            }
            Node::QualifiedType(n) => {
                self.node(n.qualifier);
                self.push(".");
                self.modifiers(&n.annotations);
                self.node(n.name);
            }
            Node::NameQualifiedType(n) => {
                self.node(n.qualifier);
                self.push(".");
                self.modifiers(&n.annotations);
                self.node(n.name);
            }
            Node::ParameterizedType(n) => {
                self.node(n.ty);
                self.push("<");
                self.list(&n.type_arguments, ", ");
                self.push(">");
            }
            Node::ArrayType(n) => {
                self.node(n.element_type);
                self.dimensions(&n.dimensions);
            }
            Node::WildcardType(n) => {
                self.modifiers(&n.annotations);
                self.push("?");
                if let Some(bound) = n.bound {
                    self.push(if n.upper_bound { " extends " } else { " super " });
                    self.node(bound);
                }
            }
            Node::UnionType(n) => self.list(&n.types, " | "),
            Node::IntersectionType(n) => self.list(&n.types, " & "),
            Node::SimpleName(n) => self.push(n.identifier.as_str()),
            Node::QualifiedName(n) => {
                self.node(n.qualifier);
                self.push(".");
                self.node(n.name);
            }
            Node::Block(n) => {
                self.push("{\n");
                self.indent += 1;
                for statement in &n.statements {
                    self.statement(*statement);
                }
                self.indent -= 1;
                self.print_indent();
                self.push("}\n");
            }
            Node::VariableDeclarationStatement(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.ty);
                self.push(" ");
                self.list(&n.fragments, ", ");
                self.push(";\n");
            }
            Node::TypeDeclarationStatement(n) => self.node(n.declaration),
            Node::ExpressionStatement(n) => {
                self.node(n.expression);
                self.push(";\n");
            }
            Node::IfStatement(n) => {
                self.push("if (");
                self.node(n.expression);
                self.push(")");
                self.nested_statement(n.then_statement);
                if let Some(else_statement) = n.else_statement {
                    self.print_indent();
                    self.push("else");
                    self.nested_statement(else_statement);
                }
            }
            Node::WhileStatement(n) => {
                self.push("while (");
                self.node(n.expression);
                self.push(")");
                self.nested_statement(n.body);
            }
            Node::DoStatement(n) => {
                self.push("do");
                self.nested_statement(n.body);
                self.print_indent();
                self.push("while (");
                self.node(n.expression);
                self.push(");\n");
            }
            Node::ForStatement(n) => {
                self.push("for (");
                self.list(&n.initializers, ", ");
                self.push("; ");
                if let Some(expression) = n.expression {
                    self.node(expression);
                }
                self.push("; ");
                self.list(&n.updaters, ", ");
                self.push(")");
                self.nested_statement(n.body);
            }
            Node::EnhancedForStatement(n) => {
                self.push("for (");
                self.node(n.parameter);
                self.push(" : ");
                self.node(n.expression);
                self.push(")");
                self.nested_statement(n.body);
            }
            Node::TryStatement(n) => {
                self.push("try ");
                if !n.resources.is_empty() {
                    self.push("(");
                    self.list(&n.resources, "; ");
                    self.push(") ");
                }
                self.node(n.body);
                for catch in &n.catch_clauses {
                    self.print_indent();
                    self.node(*catch);
                }
                if let Some(finally) = n.finally {
                    self.print_indent();
                    self.push("finally ");
                    self.node(finally);
                }
            }
            Node::CatchClause(n) => {
                self.push("catch (");
                self.node(n.exception);
                self.push(") ");
                self.node(n.body);
            }
            Node::SwitchStatement(n) => {
                self.push("switch (");
                self.node(n.expression);
                self.push(") {\n");
                self.indent += 1;
                for statement in &n.statements {
                    let is_case = matches!(dom.node(*statement), Node::SwitchCase(_));
                    if !is_case {
                        self.indent += 1;
                    }
                    self.statement(*statement);
                    if !is_case {
                        self.indent -= 1;
                    }
                }
                self.indent -= 1;
                self.print_indent();
                self.push("}\n");
            }
            Node::SwitchCase(n) => {
                if n.is_default {
                    self.push("default");
                } else {
                    self.push("case ");
                    self.list(&n.expressions, ", ");
                }
                self.push(if n.arrow { " ->\n" } else { ":\n" });
            }
            Node::ReturnStatement(n) => {
                self.push("return");
                if let Some(expression) = n.expression {
                    self.push(" ");
                    self.node(expression);
                }
                self.push(";\n");
            }
            Node::ThrowStatement(n) => {
                self.push("throw ");
                self.node(n.expression);
                self.push(";\n");
            }
            Node::BreakStatement(n) => self.jump("break", n.label),
            Node::ContinueStatement(n) => self.jump("continue", n.label),
            Node::LabeledStatement(n) => {
                self.node(n.label);
                self.push(":");
                self.nested_statement(n.body);
            }
            Node::SynchronizedStatement(n) => {
                self.push("synchronized (");
                self.node(n.expression);
                self.push(") ");
                self.node(n.body);
            }
            Node::AssertStatement(n) => {
                self.push("assert ");
                self.node(n.expression);
                if let Some(message) = n.message {
                    self.push(" : ");
                    self.node(message);
                }
                self.push(";\n");
            }
            Node::ConstructorInvocation(n) => {
                self.type_arguments(&n.type_arguments);
                self.push("this");
                self.arguments(&n.arguments);
                self.push(";\n");
            }
            Node::SuperConstructorInvocation(n) => {
                if let Some(expression) = n.expression {
                    self.node(expression);
                    self.push(".");
                }
                self.type_arguments(&n.type_arguments);
                self.push("super");
                self.arguments(&n.arguments);
                self.push(";\n");
            }
            Node::EmptyStatement(_) => self.push(";\n"),
            Node::NumberLiteral(n) => self.push(&n.token),
            Node::StringLiteral(n) => self.push(&n.escaped),
            Node::TextBlock(n) => self.push(&n.escaped),
            Node::CharacterLiteral(n) => self.push(&n.escaped),
            Node::BooleanLiteral(n) => self.push(if n.value { "true" } else { "false" }),
            Node::NullLiteral(_) => self.push("null"),
            Node::FieldAccess(n) => {
                self.node(n.expression);
                self.push(".");
                self.node(n.name);
            }
            Node::SuperFieldAccess(n) => {
                self.qualifier(n.qualifier);
                self.push("super.");
                self.node(n.name);
            }
            Node::ThisExpression(n) => {
                self.qualifier(n.qualifier);
                self.push("this");
            }
            Node::MethodInvocation(n) => {
                if let Some(expression) = n.expression {
                    self.node(expression);
                    self.push(".");
                }
                self.type_arguments(&n.type_arguments);
                self.node(n.name);
                self.arguments(&n.arguments);
            }
            Node::SuperMethodInvocation(n) => {
                self.qualifier(n.qualifier);
                self.push("super.");
                self.type_arguments(&n.type_arguments);
                self.node(n.name);
                self.arguments(&n.arguments);
            }
            Node::ClassInstanceCreation(n) => {
                if let Some(expression) = n.expression {
                    self.node(expression);
                    self.push(".");
                }
                self.push("new ");
                if !n.type_arguments.is_empty() {
                    self.type_arguments(&n.type_arguments);
                    self.push(" ");
                }
                self.node(n.ty);
                self.arguments(&n.arguments);
                if let Some(body) = n.anonymous_class {
                    self.push(" ");
                    self.node(body);
                }
            }
            Node::ArrayCreation(n) => {
                self.push("new ");
                match dom.node(n.ty) {
                    Node::ArrayType(array) => {
                        self.node(array.element_type);
                        for (idx, dimension) in array.dimensions.iter().enumerate() {
                            if let Node::Dimension(dim) = dom.node(*dimension) {
                                self.annotation_prefixes(&dim.annotations);
                                if !dim.annotations.is_empty() {
                                    self.push(" ");
                                }
                            }
                            self.push("[");
                            if let Some(size) = n.dimensions.get(idx) {
                                self.node(*size);
                            }
                            self.push("]");
                        }
                    }
                    _ => self.node(n.ty),
                }
                if let Some(initializer) = n.initializer {
                    self.push(" ");
                    self.node(initializer);
                }
            }
            Node::ArrayInitializer(n) => {
                self.push("{");
                self.list(&n.expressions, ", ");
                self.push("}");
            }
            Node::ArrayAccess(n) => {
                self.node(n.array);
                self.push("[");
                self.node(n.index);
                self.push("]");
            }
            Node::Assignment(n) => {
                self.node(n.lhs);
                self.push(" ");
                self.push(n.operator.symbol());
                self.push(" ");
                self.node(n.rhs);
            }
            Node::InfixExpression(n) => {
                let operator = format!(" {} ", n.operator.symbol());
                self.node(n.lhs);
                self.push(&operator);
                self.node(n.rhs);
                for operand in &n.extended_operands {
                    self.push(&operator);
                    self.node(*operand);
                }
            }
            Node::PrefixExpression(n) => {
                self.push(n.operator.symbol());
                self.node(n.operand);
            }
            Node::PostfixExpression(n) => {
                self.node(n.operand);
                self.push(n.operator.symbol());
            }
            Node::CastExpression(n) => {
                self.push("(");
                self.node(n.ty);
                self.push(") ");
                self.node(n.expression);
            }
            Node::InstanceofExpression(n) => {
                self.node(n.expression);
                self.push(" instanceof ");
                self.node(n.ty);
            }
            Node::ConditionalExpression(n) => {
                self.node(n.expression);
                self.push(" ? ");
                self.node(n.then_expression);
                self.push(" : ");
                self.node(n.else_expression);
            }
            Node::ParenthesizedExpression(n) => {
                self.push("(");
                self.node(n.expression);
                self.push(")");
            }
            Node::TypeLiteral(n) => {
                self.node(n.ty);
                self.push(".class");
            }
            Node::LambdaExpression(n) => {
                if n.parentheses {
                    self.arguments(&n.parameters);
                } else {
                    self.list(&n.parameters, ", ");
                }
                self.push(" -> ");
                self.node(n.body);
            }
            Node::ExpressionMethodReference(n) => {
                self.node(n.expression);
                self.push("::");
                self.type_arguments(&n.type_arguments);
                self.node(n.name);
            }
            Node::SuperMethodReference(n) => {
                self.qualifier(n.qualifier);
                self.push("super::");
                self.type_arguments(&n.type_arguments);
                self.node(n.name);
            }
            Node::TypeMethodReference(n) => {
                self.node(n.ty);
                self.push("::");
                self.type_arguments(&n.type_arguments);
                self.node(n.name);
            }
            Node::CreationReference(n) => {
                self.node(n.ty);
                self.push("::");
                self.type_arguments(&n.type_arguments);
                self.push("new");
            }
            Node::VariableDeclarationExpression(n) => {
                self.modifiers(&n.modifiers);
                self.node(n.ty);
                self.push(" ");
                self.list(&n.fragments, ", ");
            }
        }
    }

    fn method(&mut self, n: &MethodDeclaration) {
        self.modifiers(&n.modifiers);
        if !n.type_parameters.is_empty() {
            self.type_parameters(&n.type_parameters);
            self.push(" ");
        }
        if let Some(return_type) = n.return_type {
            self.node(return_type);
            self.push(" ");
        }
        self.node(n.name);
        if !n.compact_constructor {
            self.push("(");
            if let Some(receiver) = n.receiver_type {
                self.node(receiver);
                self.push(" ");
                if let Some(qualifier) = n.receiver_qualifier {
                    self.node(qualifier);
                    self.push(".");
                }
                self.push("this");
                if !n.parameters.is_empty() {
                    self.push(", ");
                }
            }
            self.list(&n.parameters, ", ");
            self.push(")");
        }
        self.dimensions(&n.extra_dimensions);
        self.clause(" throws ", &n.thrown_exception_types);
        match n.body {
            Some(body) => {
                self.push(" ");
                self.node(body);
            }
            None => self.push(";\n"),
        }
    }

    fn qualifier(&mut self, qualifier: Option<NodeId>) {
        if let Some(qualifier) = qualifier {
            self.node(qualifier);
            self.push(".");
        }
    }

    fn jump(&mut self, keyword: &str, label: Option<NodeId>) {
        self.push(keyword);
        if let Some(label) = label {
            self.push(" ");
            self.node(label);
        }
        self.push(";\n");
    }
}
