use std::fmt;
use std::marker::PhantomData;

/// A typed index into an [`Arena`].
pub trait ArenaId: Copy {
    fn from_raw(raw: u32) -> Self;
    fn idx(self) -> usize;
}

macro_rules! arena_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);

            impl ArenaId for $name {
                fn from_raw(raw: u32) -> Self {
                    $name(raw)
                }

                fn idx(self) -> usize {
                    self.0 as usize
                }
            }

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
        )*
    };
}

arena_id!(
    ClassDeclId,
    MethodDeclId,
    FieldDeclId,
    VarDeclId,
    StmtId,
    ExprId,
    TypeRefId,
    AnnotationId,
);

#[derive(Clone, PartialEq)]
pub struct Arena<I, T> {
    data: Vec<T>,
    _id: PhantomData<fn() -> I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn alloc(&mut self, value: T) -> I {
        let id = I::from_raw(self.data.len() as u32);
        self.data.push(value);
        id
    }

    /// `None` for an id that was not allocated by this arena.
    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.data.get(id.idx())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.data.get_mut(id.idx())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (I::from_raw(i as u32), v))
    }
}

impl<I, T> Default for Arena<I, T> {
    fn default() -> Self {
        Arena {
            data: Vec::new(),
            _id: PhantomData,
        }
    }
}

impl<I, T: fmt::Debug> fmt::Debug for Arena<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.data).finish()
    }
}

impl<I: ArenaId, T> std::ops::Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, index: I) -> &Self::Output {
        &self.data[index.idx()]
    }
}

impl<I: ArenaId, T> std::ops::IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.data[index.idx()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_typed() {
        let mut arena: Arena<ExprId, &str> = Arena::default();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a, ExprId::from_raw(0));
        assert_eq!(arena[b], "b");
        assert_eq!(arena.get(ExprId::from_raw(7)), None);
        assert_eq!(format!("{b:?}"), "ExprId(1)");
    }
}
