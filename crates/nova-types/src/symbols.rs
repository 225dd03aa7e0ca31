use std::collections::HashMap;

use bitflags::bitflags;

use crate::{
    AnnotationInstance, ClassId, ConstValue, MethodId, ModuleId, PackageId, Type, TypeVarId,
    VarId,
};

bitflags! {
    /// Java modifier set. `DEFAULT` is the interface-method modifier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const ABSTRACT = 1 << 4;
        const FINAL = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;
        const SEALED = 1 << 12;
        const NON_SEALED = 1 << 13;
    }
}

impl Modifiers {
    pub const VISIBILITY: Modifiers = Modifiers::PUBLIC
        .union(Modifiers::PROTECTED)
        .union(Modifiers::PRIVATE);

    pub fn from_keyword(text: &str) -> Option<Modifiers> {
        MODIFIER_KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == text)
            .map(|(flag, _)| *flag)
    }

    /// Keyword of a single-flag modifier set.
    pub fn keyword(self) -> Option<&'static str> {
        MODIFIER_KEYWORDS
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, keyword)| *keyword)
    }
}

const MODIFIER_KEYWORDS: &[(Modifiers, &str)] = &[
    (Modifiers::PUBLIC, "public"),
    (Modifiers::PROTECTED, "protected"),
    (Modifiers::PRIVATE, "private"),
    (Modifiers::STATIC, "static"),
    (Modifiers::ABSTRACT, "abstract"),
    (Modifiers::FINAL, "final"),
    (Modifiers::NATIVE, "native"),
    (Modifiers::SYNCHRONIZED, "synchronized"),
    (Modifiers::TRANSIENT, "transient"),
    (Modifiers::VOLATILE, "volatile"),
    (Modifiers::STRICTFP, "strictfp"),
    (Modifiers::DEFAULT, "default"),
    (Modifiers::SEALED, "sealed"),
    (Modifiers::NON_SEALED, "non-sealed"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl ClassKind {
    pub fn is_interface_like(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::Annotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassNesting {
    TopLevel,
    Member,
    Local,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    /// Simple name; empty for anonymous classes.
    pub name: String,
    /// Binary name with `.` package separators and `$` nesting separators,
    /// e.g. `java.util.Map$Entry` or `p.Outer$1Local`.
    pub binary_name: String,
    pub package: PackageId,
    pub kind: ClassKind,
    pub nesting: ClassNesting,
    pub modifiers: Modifiers,
    pub enclosing: Option<ClassId>,
    /// Method enclosing a local or anonymous class.
    pub enclosing_method: Option<MethodId>,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub methods: Vec<MethodId>,
    pub fields: Vec<VarId>,
    pub member_types: Vec<ClassId>,
    pub annotations: Vec<AnnotationInstance>,
    pub deprecated: bool,
    pub from_source: bool,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, binary_name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            binary_name: binary_name.into(),
            package: PackageId::from_raw(0),
            kind,
            nesting: ClassNesting::TopLevel,
            modifiers: Modifiers::PUBLIC,
            enclosing: None,
            enclosing_method: None,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            member_types: Vec::new(),
            annotations: Vec::new(),
            deprecated: false,
            from_source: false,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Canonical (source) name: `java.util.Map.Entry`.
    pub fn qualified_name(&self) -> String {
        self.binary_name.replace('$', ".")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeParamOwner {
    Class(ClassId),
    Method(MethodId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamDef {
    pub name: String,
    pub owner: TypeParamOwner,
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
    pub annotations: Vec<AnnotationInstance>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// `<init>` for constructors.
    pub name: String,
    pub owner: ClassId,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub param_names: Vec<String>,
    pub param_annotations: Vec<Vec<AnnotationInstance>>,
    pub return_type: Type,
    pub thrown: Vec<Type>,
    pub is_constructor: bool,
    pub is_varargs: bool,
    pub annotations: Vec<AnnotationInstance>,
    /// Default value of an annotation type member.
    pub default_value: Option<ConstValue>,
    pub deprecated: bool,
    pub from_source: bool,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, owner: ClassId, return_type: Type) -> Self {
        Self {
            name: name.into(),
            owner,
            modifiers: Modifiers::PUBLIC,
            type_params: Vec::new(),
            params: Vec::new(),
            param_names: Vec::new(),
            param_annotations: Vec::new(),
            return_type,
            thrown: Vec::new(),
            is_constructor: false,
            is_varargs: false,
            annotations: Vec::new(),
            default_value: None,
            deprecated: false,
            from_source: false,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn is_default(&self) -> bool {
        self.modifiers.contains(Modifiers::DEFAULT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Field,
    EnumConstant,
    RecordComponent,
    Parameter,
    LambdaParameter,
    Local,
    /// A variable declared in a try-with-resources header.
    Resource,
    CatchParameter,
    /// The variable of an enhanced `for`.
    ForEach,
}

impl VarKind {
    pub fn is_field_like(self) -> bool {
        matches!(self, VarKind::Field | VarKind::EnumConstant)
    }

    pub fn is_local_like(self) -> bool {
        !matches!(
            self,
            VarKind::Field | VarKind::EnumConstant | VarKind::RecordComponent
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub ty: Type,
    pub kind: VarKind,
    pub modifiers: Modifiers,
    /// Class declaring a field, or enclosing a local.
    pub declaring_class: Option<ClassId>,
    /// Method (or constructor) enclosing a parameter or local.
    pub declaring_method: Option<MethodId>,
    /// Start offset of the innermost lambda declaring this variable.
    pub lambda_site: Option<u32>,
    pub constant: Option<ConstValue>,
    pub annotations: Vec<AnnotationInstance>,
    pub deprecated: bool,
    /// Offset of the declared name in the source unit, for source symbols.
    pub decl_offset: Option<u32>,
}

impl VarDef {
    pub fn new(name: impl Into<String>, ty: Type, kind: VarKind) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            modifiers: Modifiers::empty(),
            declaring_class: None,
            declaring_method: None,
            lambda_site: None,
            constant: None,
            annotations: Vec::new(),
            deprecated: false,
            decl_offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDef {
    /// Dotted name; empty for the unnamed package.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDef {
    pub name: String,
    pub open: bool,
}

/// Frequently used JDK classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub deprecated: ClassId,
}

/// All symbols visible to one compilation unit.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    classes: Vec<ClassDef>,
    type_params: Vec<TypeParamDef>,
    methods: Vec<MethodDef>,
    vars: Vec<VarDef>,
    packages: Vec<PackageDef>,
    modules: Vec<ModuleDef>,
    by_binary_name: HashMap<String, ClassId>,
    by_package_name: HashMap<String, PackageId>,
    well_known: Option<WellKnownTypes>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        let mut table = SymbolTable {
            classes: Vec::new(),
            type_params: Vec::new(),
            methods: Vec::new(),
            vars: Vec::new(),
            packages: Vec::new(),
            modules: Vec::new(),
            by_binary_name: HashMap::new(),
            by_package_name: HashMap::new(),
            well_known: None,
        };
        table.intern_package("");
        table
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_package(&mut self, name: &str) -> PackageId {
        if let Some(id) = self.by_package_name.get(name) {
            return *id;
        }
        let id = PackageId::from_raw(self.packages.len() as u32);
        self.packages.push(PackageDef {
            name: name.to_string(),
        });
        self.by_package_name.insert(name.to_string(), id);
        id
    }

    /// Add a class. Its package is derived from the binary name unless it is
    /// nested, in which case it inherits the enclosing class's package.
    pub fn add_class(&mut self, mut def: ClassDef) -> ClassId {
        let id = ClassId::from_raw(self.classes.len() as u32);
        def.package = match def.enclosing {
            Some(outer) => self.classes[outer.idx()].package,
            None => {
                let package = def
                    .binary_name
                    .rsplit_once('.')
                    .map(|(pkg, _)| pkg)
                    .unwrap_or("");
                self.intern_package(package)
            }
        };
        if let Some(outer) = def.enclosing {
            if def.nesting == ClassNesting::Member {
                self.classes[outer.idx()].member_types.push(id);
            }
        }
        self.by_binary_name.insert(def.binary_name.clone(), id);
        self.classes.push(def);
        id
    }

    pub fn add_type_param(&mut self, def: TypeParamDef) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        match def.owner {
            TypeParamOwner::Class(class) => self.classes[class.idx()].type_params.push(id),
            TypeParamOwner::Method(method) => self.methods[method.idx()].type_params.push(id),
        }
        self.type_params.push(def);
        id
    }

    pub fn add_method(&mut self, def: MethodDef) -> MethodId {
        let id = MethodId::from_raw(self.methods.len() as u32);
        self.classes[def.owner.idx()].methods.push(id);
        self.methods.push(def);
        id
    }

    /// Add a variable. Fields and enum constants are registered with their
    /// declaring class.
    pub fn add_var(&mut self, def: VarDef) -> VarId {
        let id = VarId::from_raw(self.vars.len() as u32);
        if matches!(
            def.kind,
            VarKind::Field | VarKind::EnumConstant | VarKind::RecordComponent
        ) {
            if let Some(class) = def.declaring_class {
                if def.kind != VarKind::RecordComponent {
                    self.classes[class.idx()].fields.push(id);
                }
            }
        }
        self.vars.push(def);
        id
    }

    pub fn add_module(&mut self, def: ModuleDef) -> ModuleId {
        let id = ModuleId::from_raw(self.modules.len() as u32);
        self.modules.push(def);
        id
    }

    pub fn set_well_known(&mut self, well_known: WellKnownTypes) {
        self.well_known = Some(well_known);
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDef {
        &mut self.classes[id.idx()]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodDef {
        &mut self.methods[id.idx()]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut VarDef {
        &mut self.vars[id.idx()]
    }

    pub fn type_param_mut(&mut self, id: TypeVarId) -> &mut TypeParamDef {
        &mut self.type_params[id.idx()]
    }

    pub fn class_def(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx())
    }

    pub fn type_param_def(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    pub fn method_def(&self, id: MethodId) -> Option<&MethodDef> {
        self.methods.get(id.idx())
    }

    pub fn var_def(&self, id: VarId) -> Option<&VarDef> {
        self.vars.get(id.idx())
    }

    pub fn well_known_types(&self) -> Option<&WellKnownTypes> {
        self.well_known.as_ref()
    }

    /// Look up a class by binary or canonical name.
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.by_binary_name.get(name) {
            return Some(*id);
        }
        // `java.util.Map.Entry` -> `java.util.Map$Entry`, trying the
        // rightmost dots first.
        let mut candidate = name.to_string();
        while let Some(dot) = candidate.rfind('.') {
            candidate.replace_range(dot..dot + 1, "$");
            if let Some(id) = self.by_binary_name.get(&candidate) {
                return Some(*id);
            }
        }
        None
    }

    pub fn package(&self, id: PackageId) -> Option<&PackageDef> {
        self.packages.get(id.idx())
    }

    pub fn module(&self, id: ModuleId) -> Option<&ModuleDef> {
        self.modules.get(id.idx())
    }

    pub fn lookup_package(&self, name: &str) -> Option<PackageId> {
        self.by_package_name.get(name).copied()
    }

    /// Whether some known class lives in package `name` (or a subpackage).
    pub fn package_exists(&self, name: &str) -> bool {
        let prefix = format!("{name}.");
        self.by_package_name
            .keys()
            .any(|pkg| pkg == name || pkg.starts_with(&prefix))
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, def)| (ClassId::from_raw(idx as u32), def))
    }

    pub fn classes_in_package(&self, package: PackageId) -> impl Iterator<Item = ClassId> + '_ {
        self.classes().filter_map(move |(id, def)| {
            (def.package == package && def.nesting == ClassNesting::TopLevel).then_some(id)
        })
    }

    pub fn vars(&self) -> impl Iterator<Item = (VarId, &VarDef)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(idx, def)| (VarId::from_raw(idx as u32), def))
    }

    /// Member type `name` declared directly in `outer`.
    pub fn member_type(&self, outer: ClassId, name: &str) -> Option<ClassId> {
        self.classes
            .get(outer.idx())?
            .member_types
            .iter()
            .copied()
            .find(|id| self.classes[id.idx()].name == name)
    }
}
