//! Shape and vtable definitions consumed by the factory

use core::alloc::Layout;

mod value;
pub use value::*;

mod field;
pub use field::*;

mod struct_;
pub use struct_::*;

mod enum_;
pub use enum_::*;

mod object_;
pub use object_::*;

use crate::ConstTypeId;

/// Schema for reflection of a type.
///
/// A `Shape` is everything the factory knows about a type: identity,
/// layout, classification, and the function pointers needed to operate on
/// values of the type without naming it statically.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct Shape {
    /// Unique type identifier, provided by the compiler.
    pub id: ConstTypeId,

    /// Size and alignment of the type's in-place representation — enough
    /// to allocate a value (but not initialize it). For identity objects
    /// this is the layout of the *handle*, not of the allocated block;
    /// the block layout lives in [`ObjectType::body_layout`].
    pub layout: Layout,

    /// Function pointers to operate on values of this type: print the
    /// type name, drop in place, build a canonical default, represent
    /// absence, compare, debug-print.
    pub vtable: &'static ValueVTable,

    /// Structural classification: which construction strategy applies.
    pub ty: Type,

    /// The type's name, without generic parameters.
    pub type_identifier: &'static str,
}

/// Structural category of a type, determining which builder applies.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum Type {
    /// Plain scalar with no structure to reflect; constructible only
    /// through its default capability.
    Scalar,

    /// Fixed-size byte layout assembled field by field in place.
    Struct(StructType),

    /// Heap-allocated value with a runtime-managed header; instances are
    /// handles, not inline bytes.
    Object(ObjectType),

    /// Fixed set of named variants selected by a discriminant.
    Enum(EnumType),

    /// Not constructible through reflection.
    Opaque,
}

impl Shape {
    /// Returns a builder for a shape.
    pub const fn builder() -> ShapeBuilder {
        ShapeBuilder::new()
    }

    /// Check if this shape describes the same type as `other`.
    pub fn is_shape(&self, other: &Shape) -> bool {
        self == other
    }

    /// Whether this type can produce a canonical default value without
    /// external input.
    pub fn is_default(&self) -> bool {
        self.vtable.default_in_place.is_some()
    }

    /// Whether this type can represent an absent value.
    pub fn has_absent(&self) -> bool {
        self.vtable.none_in_place.is_some()
    }

    /// Heap-allocate room for a value of this shape.
    ///
    /// The returned pointer is uninitialized; for zero-sized layouts it is
    /// dangling but properly aligned.
    #[cfg(feature = "alloc")]
    pub fn allocate(&self) -> crate::PtrUninit<'static> {
        crate::PtrUninit::new(if self.layout.size() == 0 {
            core::ptr::without_provenance_mut::<u8>(self.layout.align())
        } else {
            // SAFETY: size is non-zero
            unsafe { alloc::alloc::alloc(self.layout) }
        })
    }

    /// Deallocate a block obtained from [`Shape::allocate`], without
    /// running any destructor on its contents.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`Shape::allocate`] on this same shape and
    /// must not have been deallocated already.
    #[cfg(feature = "alloc")]
    pub unsafe fn deallocate_uninit(&self, ptr: crate::PtrUninit<'static>) {
        if self.layout.size() == 0 {
            return;
        }
        unsafe { alloc::alloc::dealloc(ptr.as_mut_byte_ptr(), self.layout) }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl core::hash::Hash for Shape {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Display for Shape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        (self.vtable.type_name)(f)
    }
}

impl core::fmt::Debug for Shape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Shape")
            .field("type", &format_args!("{self}"))
            .field("ty", &self.ty)
            .finish()
    }
}

/// Builder for [`Shape`]
pub struct ShapeBuilder {
    id: Option<ConstTypeId>,
    layout: Option<Layout>,
    vtable: Option<&'static ValueVTable>,
    ty: Type,
    type_identifier: Option<&'static str>,
}

impl ShapeBuilder {
    /// Creates a new `ShapeBuilder` with all fields unset.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            id: None,
            layout: None,
            vtable: None,
            ty: Type::Opaque,
            type_identifier: None,
        }
    }

    /// Sets the id field of the `ShapeBuilder`.
    #[inline]
    pub const fn id(mut self, id: ConstTypeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the `layout` field of the `ShapeBuilder`.
    #[inline]
    pub const fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets the `vtable` field of the `ShapeBuilder`.
    #[inline]
    pub const fn vtable(mut self, vtable: &'static ValueVTable) -> Self {
        self.vtable = Some(vtable);
        self
    }

    /// Sets the `ty` field of the `ShapeBuilder`.
    #[inline]
    pub const fn ty(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    /// Sets the `type_identifier` field of the `ShapeBuilder`.
    #[inline]
    pub const fn type_identifier(mut self, type_identifier: &'static str) -> Self {
        self.type_identifier = Some(type_identifier);
        self
    }

    /// Builds the `Shape`.
    ///
    /// # Panics
    ///
    /// Panics if `id`, `layout`, `vtable` or `type_identifier` are unset.
    #[inline]
    pub const fn build(self) -> Shape {
        Shape {
            id: self.id.unwrap(),
            layout: self.layout.unwrap(),
            vtable: self.vtable.unwrap(),
            ty: self.ty,
            type_identifier: self.type_identifier.unwrap(),
        }
    }
}
