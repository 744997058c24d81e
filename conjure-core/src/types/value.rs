use crate::{PtrConst, PtrMut, PtrUninit};

/// Writes the name of the type to a formatter.
pub type TypeNameFn = fn(f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result;

/// Drops the value in place, returning the now-uninitialized location.
///
/// # Safety
///
/// `value` must point to an initialized value of the vtable's type; the
/// memory must not be accessed again until reinitialized.
pub type DropInPlaceFn = for<'mem> unsafe fn(value: PtrMut<'mem>) -> PtrUninit<'mem>;

/// Writes the type's canonical default value into `target`.
///
/// # Safety
///
/// `target` must be aligned for the vtable's type and valid for writes of
/// its size.
pub type DefaultInPlaceFn = for<'mem> unsafe fn(target: PtrUninit<'mem>) -> PtrMut<'mem>;

/// Writes the type's absent representation (e.g. `None`) into `target`.
///
/// # Safety
///
/// Same contract as [`DefaultInPlaceFn`].
pub type NoneInPlaceFn = for<'mem> unsafe fn(target: PtrUninit<'mem>) -> PtrMut<'mem>;

/// Formats the value using its `Debug` implementation.
///
/// # Safety
///
/// `value` must point to an initialized value of the vtable's type.
pub type DebugFn =
    for<'mem> unsafe fn(value: PtrConst<'mem>, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result;

/// Compares two values for equality.
///
/// # Safety
///
/// Both pointers must point to initialized values of the vtable's type.
pub type PartialEqFn = for<'l, 'r> unsafe fn(left: PtrConst<'l>, right: PtrConst<'r>) -> bool;

/// VTable of operations common to all shapes.
///
/// Every function pointer except `type_name` is optional: absence simply
/// means the type does not expose that capability. The factory's field
/// synthesis keys off `default_in_place` (trivially constructible) and
/// `none_in_place` (absent-representable).
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct ValueVTable {
    /// cf. [`TypeNameFn`]
    pub type_name: TypeNameFn,

    /// cf. [`DropInPlaceFn`] — if None, drops without side effects
    pub drop_in_place: Option<DropInPlaceFn>,

    /// cf. [`DefaultInPlaceFn`]
    pub default_in_place: Option<DefaultInPlaceFn>,

    /// cf. [`NoneInPlaceFn`]
    pub none_in_place: Option<NoneInPlaceFn>,

    /// cf. [`DebugFn`]
    pub debug: Option<DebugFn>,

    /// cf. [`PartialEqFn`]
    pub eq: Option<PartialEqFn>,
}

impl ValueVTable {
    /// Returns a builder for `ValueVTable`.
    pub const fn builder() -> ValueVTableBuilder {
        ValueVTableBuilder::new()
    }
}

/// Builder for [`ValueVTable`]
pub struct ValueVTableBuilder {
    type_name: Option<TypeNameFn>,
    drop_in_place: Option<DropInPlaceFn>,
    default_in_place: Option<DefaultInPlaceFn>,
    none_in_place: Option<NoneInPlaceFn>,
    debug: Option<DebugFn>,
    eq: Option<PartialEqFn>,
}

impl ValueVTableBuilder {
    /// Creates a new `ValueVTableBuilder`.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            type_name: None,
            drop_in_place: None,
            default_in_place: None,
            none_in_place: None,
            debug: None,
            eq: None,
        }
    }

    /// Sets the type_name function.
    pub const fn type_name(mut self, f: TypeNameFn) -> Self {
        self.type_name = Some(f);
        self
    }

    /// Sets the drop_in_place function.
    pub const fn drop_in_place(mut self, f: DropInPlaceFn) -> Self {
        self.drop_in_place = Some(f);
        self
    }

    /// Sets the default_in_place function.
    pub const fn default_in_place(mut self, f: DefaultInPlaceFn) -> Self {
        self.default_in_place = Some(f);
        self
    }

    /// Sets the none_in_place function.
    pub const fn none_in_place(mut self, f: NoneInPlaceFn) -> Self {
        self.none_in_place = Some(f);
        self
    }

    /// Sets the debug function.
    pub const fn debug(mut self, f: DebugFn) -> Self {
        self.debug = Some(f);
        self
    }

    /// Sets the eq function.
    pub const fn eq(mut self, f: PartialEqFn) -> Self {
        self.eq = Some(f);
        self
    }

    /// Builds the `ValueVTable`.
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is unset.
    pub const fn build(self) -> ValueVTable {
        ValueVTable {
            type_name: self.type_name.unwrap(),
            drop_in_place: self.drop_in_place,
            default_in_place: self.default_in_place,
            none_in_place: self.none_in_place,
            debug: self.debug,
            eq: self.eq,
        }
    }
}
