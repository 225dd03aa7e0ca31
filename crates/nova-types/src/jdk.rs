//! A tiny slice of the JDK, enough to attribute typical test sources.

use crate::{
    ClassDef, ClassId, ClassKind, ClassNesting, MethodDef, MethodId, Modifiers, PrimitiveType,
    SymbolTable, Type, TypeParamDef, TypeParamOwner, TypeVarId, VarDef, VarKind, WellKnownTypes,
    WildcardBound,
};

struct JdkBuilder<'a> {
    table: &'a mut SymbolTable,
    object: Option<ClassId>,
}

impl JdkBuilder<'_> {
    fn object_type(&self) -> Type {
        self.object
            .map(|object| Type::class(object, vec![]))
            .unwrap_or(Type::Unknown)
    }

    fn class(&mut self, binary_name: &str, kind: ClassKind) -> ClassId {
        let name = binary_name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(binary_name)
            .to_string();
        let mut def = ClassDef::new(name, binary_name, kind);
        if kind == ClassKind::Interface || kind == ClassKind::Annotation {
            def.modifiers |= Modifiers::ABSTRACT;
        }
        if kind != ClassKind::Interface && kind != ClassKind::Annotation {
            def.super_class = self.object.map(|object| Type::class(object, vec![]));
        }
        self.table.add_class(def)
    }

    fn member_class(&mut self, outer: ClassId, name: &str, kind: ClassKind) -> ClassId {
        let binary_name = format!(
            "{}${name}",
            self.table.class_def(outer).map(|d| d.binary_name.as_str()).unwrap_or("")
        );
        let mut def = ClassDef::new(name, binary_name, kind);
        def.nesting = ClassNesting::Member;
        def.enclosing = Some(outer);
        if kind == ClassKind::Interface {
            def.modifiers |= Modifiers::ABSTRACT | Modifiers::STATIC;
        }
        self.table.add_class(def)
    }

    fn type_param(&mut self, owner: ClassId, name: &str) -> TypeVarId {
        let bound = self.object_type();
        self.table.add_type_param(TypeParamDef {
            name: name.to_string(),
            owner: TypeParamOwner::Class(owner),
            upper_bounds: vec![bound],
            lower_bound: None,
            annotations: Vec::new(),
        })
    }

    fn method(
        &mut self,
        owner: ClassId,
        name: &str,
        params: Vec<Type>,
        return_type: Type,
        modifiers: Modifiers,
    ) -> MethodId {
        let mut def = MethodDef::new(name, owner, return_type);
        def.param_names = (0..params.len()).map(|idx| format!("arg{idx}")).collect();
        def.param_annotations = vec![Vec::new(); params.len()];
        def.params = params;
        def.modifiers = modifiers;
        self.table.add_method(def)
    }

    fn abstract_method(&mut self, owner: ClassId, name: &str, params: Vec<Type>, ret: Type) -> MethodId {
        self.method(owner, name, params, ret, Modifiers::PUBLIC | Modifiers::ABSTRACT)
    }

    fn constructor(&mut self, owner: ClassId, params: Vec<Type>) -> MethodId {
        let id = self.method(owner, "<init>", params, Type::Void, Modifiers::PUBLIC);
        self.table.method_mut(id).is_constructor = true;
        id
    }

    fn static_field(&mut self, owner: ClassId, name: &str, ty: Type) {
        let mut def = VarDef::new(name, ty, VarKind::Field);
        def.modifiers = Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
        def.declaring_class = Some(owner);
        self.table.add_var(def);
    }
}

fn prim(p: PrimitiveType) -> Type {
    Type::primitive(p)
}

fn tv(id: TypeVarId) -> Type {
    Type::type_var(id)
}

impl SymbolTable {
    /// A symbol table pre-populated with a minimal JDK: `java.lang` basics,
    /// a few `java.io`/`java.util` types and the common `java.util.function`
    /// interfaces.
    pub fn with_minimal_jdk() -> Self {
        let mut table = SymbolTable::new();
        let mut b = JdkBuilder {
            table: &mut table,
            object: None,
        };

        // java.lang
        let object = b.class("java.lang.Object", ClassKind::Class);
        b.object = Some(object);
        b.table.class_mut(object).super_class = None;
        let object_ty = Type::class(object, vec![]);
        b.constructor(object, vec![]);
        let string = b.class("java.lang.String", ClassKind::Class);
        let string_ty = Type::class(string, vec![]);
        b.method(
            object,
            "equals",
            vec![object_ty.clone()],
            prim(PrimitiveType::Boolean),
            Modifiers::PUBLIC,
        );
        b.method(object, "hashCode", vec![], prim(PrimitiveType::Int), Modifiers::PUBLIC);
        b.method(object, "toString", vec![], string_ty.clone(), Modifiers::PUBLIC);

        let serializable = b.class("java.io.Serializable", ClassKind::Interface);
        let cloneable = b.class("java.lang.Cloneable", ClassKind::Interface);

        let comparable = b.class("java.lang.Comparable", ClassKind::Interface);
        let comparable_t = b.type_param(comparable, "T");
        b.abstract_method(comparable, "compareTo", vec![tv(comparable_t)], prim(PrimitiveType::Int));

        let char_sequence = b.class("java.lang.CharSequence", ClassKind::Interface);
        b.abstract_method(char_sequence, "length", vec![], prim(PrimitiveType::Int));

        {
            let def = b.table.class_mut(string);
            def.modifiers |= Modifiers::FINAL;
            def.interfaces = vec![
                Type::class(serializable, vec![]),
                Type::class(comparable, vec![string_ty.clone()]),
                Type::class(char_sequence, vec![]),
            ];
        }
        b.constructor(string, vec![]);
        b.method(string, "length", vec![], prim(PrimitiveType::Int), Modifiers::PUBLIC);
        b.method(string, "isEmpty", vec![], prim(PrimitiveType::Boolean), Modifiers::PUBLIC);
        b.method(
            string,
            "charAt",
            vec![prim(PrimitiveType::Int)],
            prim(PrimitiveType::Char),
            Modifiers::PUBLIC,
        );
        b.method(
            string,
            "substring",
            vec![prim(PrimitiveType::Int)],
            string_ty.clone(),
            Modifiers::PUBLIC,
        );
        b.method(
            string,
            "concat",
            vec![string_ty.clone()],
            string_ty.clone(),
            Modifiers::PUBLIC,
        );
        b.method(
            string,
            "compareTo",
            vec![string_ty.clone()],
            prim(PrimitiveType::Int),
            Modifiers::PUBLIC,
        );
        b.method(
            string,
            "valueOf",
            vec![object_ty.clone()],
            string_ty.clone(),
            Modifiers::PUBLIC | Modifiers::STATIC,
        );
        b.method(string, "trim", vec![], string_ty.clone(), Modifiers::PUBLIC);

        let number = b.class("java.lang.Number", ClassKind::Class);
        b.table.class_mut(number).modifiers |= Modifiers::ABSTRACT;
        b.table.class_mut(number).interfaces = vec![Type::class(serializable, vec![])];
        b.abstract_method(number, "intValue", vec![], prim(PrimitiveType::Int));
        let integer = b.class("java.lang.Integer", ClassKind::Class);
        let integer_ty = Type::class(integer, vec![]);
        {
            let def = b.table.class_mut(integer);
            def.modifiers |= Modifiers::FINAL;
            def.super_class = Some(Type::class(number, vec![]));
            def.interfaces = vec![Type::class(comparable, vec![integer_ty.clone()])];
        }
        b.method(integer, "intValue", vec![], prim(PrimitiveType::Int), Modifiers::PUBLIC);
        b.method(
            integer,
            "valueOf",
            vec![prim(PrimitiveType::Int)],
            integer_ty.clone(),
            Modifiers::PUBLIC | Modifiers::STATIC,
        );
        b.method(
            integer,
            "parseInt",
            vec![string_ty.clone()],
            prim(PrimitiveType::Int),
            Modifiers::PUBLIC | Modifiers::STATIC,
        );
        b.method(
            integer,
            "compareTo",
            vec![integer_ty.clone()],
            prim(PrimitiveType::Int),
            Modifiers::PUBLIC,
        );
        let long = b.class("java.lang.Long", ClassKind::Class);
        b.table.class_mut(long).super_class = Some(Type::class(number, vec![]));
        let boolean = b.class("java.lang.Boolean", ClassKind::Class);
        b.table.class_mut(boolean).interfaces = vec![Type::class(serializable, vec![])];
        let character = b.class("java.lang.Character", ClassKind::Class);
        b.table.class_mut(character).interfaces = vec![Type::class(serializable, vec![])];
        let double = b.class("java.lang.Double", ClassKind::Class);
        b.table.class_mut(double).super_class = Some(Type::class(number, vec![]));

        let class = b.class("java.lang.Class", ClassKind::Class);
        b.type_param(class, "T");
        b.method(class, "getName", vec![], string_ty.clone(), Modifiers::PUBLIC);
        b.method(
            object,
            "getClass",
            vec![],
            Type::class(
                class,
                vec![Type::Wildcard(WildcardBound::Unbounded, Vec::new())],
            ),
            Modifiers::PUBLIC | Modifiers::FINAL,
        );

        let runnable = b.class("java.lang.Runnable", ClassKind::Interface);
        b.abstract_method(runnable, "run", vec![], Type::Void);

        let iterable = b.class("java.lang.Iterable", ClassKind::Interface);
        let iterable_t = b.type_param(iterable, "T");

        let auto_closeable = b.class("java.lang.AutoCloseable", ClassKind::Interface);
        let throwable = b.class("java.lang.Throwable", ClassKind::Class);
        b.table.class_mut(throwable).interfaces = vec![Type::class(serializable, vec![])];
        b.constructor(throwable, vec![]);
        b.constructor(throwable, vec![string_ty.clone()]);
        b.method(throwable, "getMessage", vec![], string_ty.clone(), Modifiers::PUBLIC);
        let exception = b.class("java.lang.Exception", ClassKind::Class);
        b.table.class_mut(exception).super_class = Some(Type::class(throwable, vec![]));
        b.constructor(exception, vec![]);
        b.constructor(exception, vec![string_ty.clone()]);
        let close = b.abstract_method(auto_closeable, "close", vec![], Type::Void);
        b.table.method_mut(close).thrown = vec![Type::class(exception, vec![])];

        let runtime_exception = b.class("java.lang.RuntimeException", ClassKind::Class);
        b.table.class_mut(runtime_exception).super_class = Some(Type::class(exception, vec![]));
        b.constructor(runtime_exception, vec![]);
        b.constructor(runtime_exception, vec![string_ty.clone()]);
        for name in [
            "java.lang.IllegalStateException",
            "java.lang.IllegalArgumentException",
            "java.lang.UnsupportedOperationException",
        ] {
            let id = b.class(name, ClassKind::Class);
            b.table.class_mut(id).super_class = Some(Type::class(runtime_exception, vec![]));
            b.constructor(id, vec![]);
            b.constructor(id, vec![string_ty.clone()]);
        }

        let enum_class = b.class("java.lang.Enum", ClassKind::Class);
        b.table.class_mut(enum_class).modifiers |= Modifiers::ABSTRACT;
        let enum_e = b.type_param(enum_class, "E");
        b.table.type_param_mut(enum_e).upper_bounds =
            vec![Type::class(enum_class, vec![tv(enum_e)])];
        b.method(enum_class, "name", vec![], string_ty.clone(), Modifiers::PUBLIC | Modifiers::FINAL);
        b.method(
            enum_class,
            "ordinal",
            vec![],
            prim(PrimitiveType::Int),
            Modifiers::PUBLIC | Modifiers::FINAL,
        );
        let record = b.class("java.lang.Record", ClassKind::Class);
        b.table.class_mut(record).modifiers |= Modifiers::ABSTRACT;

        let deprecated = b.class("java.lang.Deprecated", ClassKind::Annotation);
        b.class("java.lang.Override", ClassKind::Annotation);
        b.class("java.lang.FunctionalInterface", ClassKind::Annotation);
        let suppress = b.class("java.lang.SuppressWarnings", ClassKind::Annotation);
        b.abstract_method(suppress, "value", vec![], Type::array(string_ty.clone()));
        b.class("java.lang.SafeVarargs", ClassKind::Annotation);

        // java.io
        let io_exception = b.class("java.io.IOException", ClassKind::Class);
        b.table.class_mut(io_exception).super_class = Some(Type::class(exception, vec![]));
        b.constructor(io_exception, vec![]);
        b.constructor(io_exception, vec![string_ty.clone()]);
        let closeable = b.class("java.io.Closeable", ClassKind::Interface);
        b.table.class_mut(closeable).interfaces = vec![Type::class(auto_closeable, vec![])];
        let close = b.abstract_method(closeable, "close", vec![], Type::Void);
        b.table.method_mut(close).thrown = vec![Type::class(io_exception, vec![])];

        let print_stream = b.class("java.io.PrintStream", ClassKind::Class);
        for param in [
            string_ty.clone(),
            object_ty.clone(),
            prim(PrimitiveType::Int),
            prim(PrimitiveType::Boolean),
        ] {
            b.method(print_stream, "println", vec![param], Type::Void, Modifiers::PUBLIC);
        }
        b.method(print_stream, "println", vec![], Type::Void, Modifiers::PUBLIC);

        let system = b.class("java.lang.System", ClassKind::Class);
        b.table.class_mut(system).modifiers |= Modifiers::FINAL;
        b.static_field(system, "out", Type::class(print_stream, vec![]));
        b.static_field(system, "err", Type::class(print_stream, vec![]));
        b.method(
            system,
            "currentTimeMillis",
            vec![],
            prim(PrimitiveType::Long),
            Modifiers::PUBLIC | Modifiers::STATIC,
        );

        // java.util.function
        let consumer = b.class("java.util.function.Consumer", ClassKind::Interface);
        let consumer_t = b.type_param(consumer, "T");
        b.abstract_method(consumer, "accept", vec![tv(consumer_t)], Type::Void);

        let function = b.class("java.util.function.Function", ClassKind::Interface);
        let function_t = b.type_param(function, "T");
        let function_r = b.type_param(function, "R");
        b.abstract_method(function, "apply", vec![tv(function_t)], tv(function_r));
        b.method(
            function,
            "andThen",
            vec![Type::class(
                function,
                vec![
                    Type::Wildcard(
                        WildcardBound::Super(Box::new(tv(function_r))),
                        Vec::new(),
                    ),
                    Type::Wildcard(WildcardBound::Unbounded, Vec::new()),
                ],
            )],
            Type::class(function, vec![]),
            Modifiers::PUBLIC | Modifiers::DEFAULT,
        );

        let unary_operator = b.class("java.util.function.UnaryOperator", ClassKind::Interface);
        let unary_t = b.type_param(unary_operator, "T");
        b.table.class_mut(unary_operator).interfaces =
            vec![Type::class(function, vec![tv(unary_t), tv(unary_t)])];

        let supplier = b.class("java.util.function.Supplier", ClassKind::Interface);
        let supplier_t = b.type_param(supplier, "T");
        b.abstract_method(supplier, "get", vec![], tv(supplier_t));

        let predicate = b.class("java.util.function.Predicate", ClassKind::Interface);
        let predicate_t = b.type_param(predicate, "T");
        b.abstract_method(
            predicate,
            "test",
            vec![tv(predicate_t)],
            prim(PrimitiveType::Boolean),
        );

        let bi_function = b.class("java.util.function.BiFunction", ClassKind::Interface);
        let bi_t = b.type_param(bi_function, "T");
        let bi_u = b.type_param(bi_function, "U");
        let bi_r = b.type_param(bi_function, "R");
        b.abstract_method(bi_function, "apply", vec![tv(bi_t), tv(bi_u)], tv(bi_r));

        let int_supplier = b.class("java.util.function.IntSupplier", ClassKind::Interface);
        b.abstract_method(int_supplier, "getAsInt", vec![], prim(PrimitiveType::Int));

        // Iterable.forEach needs Consumer.
        b.method(
            iterable,
            "forEach",
            vec![Type::class(
                consumer,
                vec![Type::Wildcard(
                    WildcardBound::Super(Box::new(tv(iterable_t))),
                    Vec::new(),
                )],
            )],
            Type::Void,
            Modifiers::PUBLIC | Modifiers::DEFAULT,
        );

        // java.util
        let iterator = b.class("java.util.Iterator", ClassKind::Interface);
        let iterator_e = b.type_param(iterator, "E");
        b.abstract_method(iterator, "hasNext", vec![], prim(PrimitiveType::Boolean));
        b.abstract_method(iterator, "next", vec![], tv(iterator_e));
        b.abstract_method(
            iterable,
            "iterator",
            vec![],
            Type::class(iterator, vec![tv(iterable_t)]),
        );

        let collection = b.class("java.util.Collection", ClassKind::Interface);
        let collection_e = b.type_param(collection, "E");
        b.table.class_mut(collection).interfaces =
            vec![Type::class(iterable, vec![tv(collection_e)])];
        b.abstract_method(collection, "size", vec![], prim(PrimitiveType::Int));
        b.abstract_method(collection, "isEmpty", vec![], prim(PrimitiveType::Boolean));
        b.abstract_method(
            collection,
            "add",
            vec![tv(collection_e)],
            prim(PrimitiveType::Boolean),
        );

        let list = b.class("java.util.List", ClassKind::Interface);
        let list_e = b.type_param(list, "E");
        b.table.class_mut(list).interfaces = vec![Type::class(collection, vec![tv(list_e)])];
        b.abstract_method(list, "get", vec![prim(PrimitiveType::Int)], tv(list_e));
        b.abstract_method(list, "add", vec![tv(list_e)], prim(PrimitiveType::Boolean));
        b.abstract_method(list, "size", vec![], prim(PrimitiveType::Int));
        b.abstract_method(
            list,
            "set",
            vec![prim(PrimitiveType::Int), tv(list_e)],
            tv(list_e),
        );

        let array_list = b.class("java.util.ArrayList", ClassKind::Class);
        let array_list_e = b.type_param(array_list, "E");
        b.table.class_mut(array_list).interfaces = vec![
            Type::class(list, vec![tv(array_list_e)]),
            Type::class(cloneable, vec![]),
            Type::class(serializable, vec![]),
        ];
        b.constructor(array_list, vec![]);
        b.constructor(array_list, vec![prim(PrimitiveType::Int)]);
        b.method(
            array_list,
            "get",
            vec![prim(PrimitiveType::Int)],
            tv(array_list_e),
            Modifiers::PUBLIC,
        );
        b.method(
            array_list,
            "add",
            vec![tv(array_list_e)],
            prim(PrimitiveType::Boolean),
            Modifiers::PUBLIC,
        );
        b.method(array_list, "size", vec![], prim(PrimitiveType::Int), Modifiers::PUBLIC);

        let map = b.class("java.util.Map", ClassKind::Interface);
        let map_k = b.type_param(map, "K");
        let map_v = b.type_param(map, "V");
        b.abstract_method(map, "get", vec![object_ty.clone()], tv(map_v));
        b.abstract_method(map, "put", vec![tv(map_k), tv(map_v)], tv(map_v));
        let entry = b.member_class(map, "Entry", ClassKind::Interface);
        let entry_k = b.type_param(entry, "K");
        let entry_v = b.type_param(entry, "V");
        b.abstract_method(entry, "getKey", vec![], tv(entry_k));
        b.abstract_method(entry, "getValue", vec![], tv(entry_v));

        let hash_map = b.class("java.util.HashMap", ClassKind::Class);
        let hash_map_k = b.type_param(hash_map, "K");
        let hash_map_v = b.type_param(hash_map, "V");
        b.table.class_mut(hash_map).interfaces =
            vec![Type::class(map, vec![tv(hash_map_k), tv(hash_map_v)])];
        b.constructor(hash_map, vec![]);
        b.method(
            hash_map,
            "get",
            vec![object_ty.clone()],
            tv(hash_map_v),
            Modifiers::PUBLIC,
        );
        b.method(
            hash_map,
            "put",
            vec![tv(hash_map_k), tv(hash_map_v)],
            tv(hash_map_v),
            Modifiers::PUBLIC,
        );

        table.set_well_known(WellKnownTypes {
            object,
            string,
            cloneable,
            serializable,
            deprecated,
        });
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_binary_names_both_resolve() {
        let table = SymbolTable::with_minimal_jdk();
        let entry = table.class_id("java.util.Map$Entry").expect("binary name");
        assert_eq!(table.class_id("java.util.Map.Entry"), Some(entry));
        let def = table.class_def(entry).unwrap();
        assert_eq!(def.nesting, ClassNesting::Member);
        assert_eq!(def.qualified_name(), "java.util.Map.Entry");
        assert_eq!(
            table.package(def.package).map(|p| p.name.as_str()),
            Some("java.util")
        );
    }

    #[test]
    fn well_known_types_are_registered() {
        let table = SymbolTable::with_minimal_jdk();
        let wk = table.well_known_types().unwrap();
        assert_eq!(table.class_id("java.lang.Object"), Some(wk.object));
        assert_eq!(table.class_id("java.lang.Deprecated"), Some(wk.deprecated));
        assert!(table.package_exists("java"));
        assert!(table.package_exists("java.util.function"));
    }
}
