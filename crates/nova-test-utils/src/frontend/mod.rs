//! A small Java front-end for tests.
//!
//! [`compile`] parses a source string into `nova-hir`, enters its
//! declarations into a [`SymbolTable`] seeded with a minimal JDK and
//! attributes every body: names, fields and methods are resolved,
//! expressions get types, lambdas and method references get their target
//! type and wildcard-parameterized expression types are capture converted.
//!
//! It covers the Java that DOM tests are written in, not the language.
//! Overload resolution picks the most specific applicable method by
//! erased parameter types, and inference only looks at argument types and
//! the expected type.

use std::collections::HashMap;

use nova_hir::{AnnotationId, ClassDeclId, CompilationUnit, ResolvedUnit};
use nova_types::{ClassId, MethodId, SymbolTable, Type, TypeVarId, VarId};

mod attr;
mod literals;
mod parser;
mod resolve;

pub use parser::ParseError;

use parser::AnnotationSlot;

/// Parse `source` without attributing it.
pub fn parse(source: &str) -> (CompilationUnit, Vec<ParseError>) {
    let parsed = parser::parse(source);
    (parsed.unit, parsed.errors)
}

/// Parse and attribute `source` against the minimal JDK.
pub fn compile(source: &str) -> ResolvedUnit {
    compile_with(source, SymbolTable::with_minimal_jdk())
}

/// Parse and attribute `source` against `symbols`.
pub fn compile_with(source: &str, symbols: SymbolTable) -> ResolvedUnit {
    let parsed = parser::parse(source);
    for error in &parsed.errors {
        tracing::debug!(offset = error.offset, message = %error.message, "syntax error");
    }
    let mut attributor = Attributor::new(parsed.unit, parsed.slots, symbols);
    attributor.run();
    tracing::debug!(
        classes = attributor.unit.classes.len(),
        exprs = attributor.unit.exprs.len(),
        "attributed test source"
    );
    ResolvedUnit::new(source, attributor.unit, attributor.symbols)
}

/// Names declared by one block, innermost scope last on the stack.
#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, VarId>,
    classes: HashMap<String, ClassId>,
}

#[derive(Debug, Default)]
struct Imports {
    single: Vec<(String, ClassId)>,
    on_demand: Vec<String>,
    static_single: Vec<(ClassId, String)>,
    static_on_demand: Vec<ClassId>,
}

/// Where attribution currently is.
#[derive(Debug, Default, Clone)]
struct Context {
    /// Enclosing class declarations, innermost last.
    classes: Vec<(ClassDeclId, ClassId)>,
    method: Option<MethodId>,
    /// Start offsets of the enclosing lambdas, innermost last.
    lambdas: Vec<u32>,
    /// Expected type of `return` expressions.
    returns: Vec<Option<Type>>,
    /// Type variables in scope, innermost last.
    type_vars: Vec<HashMap<String, TypeVarId>>,
}

struct Attributor {
    unit: CompilationUnit,
    slots: HashMap<AnnotationId, AnnotationSlot>,
    symbols: SymbolTable,
    package: String,
    imports: Imports,
    cx: Context,
    scopes: Vec<Scope>,
    /// Last local class index per top-level class and simple name; the
    /// empty name counts anonymous classes.
    class_counters: HashMap<(ClassId, String), u32>,
}

impl Attributor {
    fn new(
        unit: CompilationUnit,
        slots: HashMap<AnnotationId, AnnotationSlot>,
        symbols: SymbolTable,
    ) -> Self {
        Attributor {
            unit,
            slots,
            symbols,
            package: String::new(),
            imports: Imports::default(),
            cx: Context::default(),
            scopes: Vec::new(),
            class_counters: HashMap::new(),
        }
    }

    fn run(&mut self) {
        self.enter_package_and_module();
        let types = self.unit.types.clone();
        for &class in &types {
            self.declare_class(class, None);
        }
        self.enter_imports();
        for &class in &types {
            self.enter_class_header(class);
        }
        for &class in &types {
            self.enter_class_members(class);
        }
        for &class in &types {
            self.attribute_class(class);
        }
    }
}

#[cfg(test)]
mod tests;
