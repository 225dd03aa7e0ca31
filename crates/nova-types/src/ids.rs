use std::fmt;

macro_rules! symbol_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[must_use]
            pub fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[must_use]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

symbol_id!(
    /// A class, interface, enum, record or annotation type.
    ClassId
);
symbol_id!(
    /// A type parameter, or a capture variable allocated by a typing context.
    TypeVarId
);
symbol_id!(MethodId);
symbol_id!(
    /// A field, enum constant, record component, parameter or local.
    VarId
);
symbol_id!(PackageId);
symbol_id!(ModuleId);
