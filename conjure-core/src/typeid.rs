use core::any::TypeId;

/// A [`TypeId`] that can be produced in const contexts.
///
/// `TypeId::of` is not const-callable, so shapes store a function pointer
/// that yields it at runtime instead. Equality goes through the resolved
/// `TypeId`, which is what the factory's cycle detection and the erased
/// bridge's identity checks rely on.
#[derive(Clone, Copy, Debug)]
pub struct ConstTypeId {
    type_id_fn: fn() -> TypeId,
}

impl ConstTypeId {
    /// Returns the const type id of `T`.
    pub const fn of<T: 'static>() -> Self {
        Self {
            type_id_fn: || TypeId::of::<T>(),
        }
    }

    /// Resolves to the actual [`TypeId`].
    #[inline]
    pub fn get(&self) -> TypeId {
        (self.type_id_fn)()
    }
}

impl PartialEq for ConstTypeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for ConstTypeId {}

impl core::hash::Hash for ConstTypeId {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}
