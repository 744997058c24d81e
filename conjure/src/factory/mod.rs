//! Instance fabrication.
//!
//! The factory turns a [`Shape`] into a live value without calling any
//! of the type's own constructors. Three strategies exist, keyed off the
//! shape's classification:
//!
//! - **structs** are assembled field by field inside a raw buffer;
//! - **identity objects** are allocated through the injected
//!   [`ObjectAllocator`] and their body fields written in place;
//! - **fieldless enums** get their discriminant written over a zeroed
//!   buffer.
//!
//! Field values come from, in order: the caller's resolver, the field's
//! own default, the field type's default capability, the field type's
//! absent representation, and finally recursive construction.

use alloc::vec::Vec;

use conjure_core::{
    ConstTypeId, EnumType, Field, HeapAllocator, ObjectAllocator, ObjectType, PtrUninit, Reflect,
    Shape, StructType, Type,
};

use crate::{FactoryError, OpaqueValue, RawBuffer};

#[cfg(test)]
mod tests;

/// Supplies values for individual fields during construction.
///
/// Consulted for every field when present; returning `Err` aborts the
/// construction and the error is reported verbatim. The returned value's
/// shape must match the field's registered shape.
pub type FieldResolver<'a> = &'a dyn Fn(&Field) -> Result<OpaqueValue, FactoryError>;

/// Fabricates an instance of `T`, driven entirely by its shape.
///
/// ```
/// use conjure::create_instance;
/// use conjure_core::reflect_struct;
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// reflect_struct!(Point { x: i32, y: i32 });
///
/// let point: Point = create_instance(None)?;
/// assert_eq!(point, Point { x: 0, y: 0 });
/// # Ok::<(), conjure::FactoryError>(())
/// ```
pub fn create_instance<T: Reflect>(resolver: Option<FieldResolver<'_>>) -> Result<T, FactoryError> {
    InstanceFactory::new(&HeapAllocator)
        .create(T::SHAPE, resolver)?
        .materialize()
}

/// Fabricates an instance of a shape known only at runtime, returned as
/// an erased [`OpaqueValue`].
pub fn create_instance_of(
    shape: &'static Shape,
    resolver: Option<FieldResolver<'_>>,
) -> Result<OpaqueValue, FactoryError> {
    InstanceFactory::new(&HeapAllocator).create(shape, resolver)
}

/// Fabricates an instance of a fieldless enum `T`, selecting the variant
/// named `target` (or the first declared variant when `target` is absent
/// or names no variant).
pub fn create_enum_instance<T: Reflect>(target: Option<&str>) -> Result<T, FactoryError> {
    InstanceFactory::new(&HeapAllocator)
        .create_enum(T::SHAPE, target)?
        .materialize()
}

/// Erased counterpart of [`create_enum_instance`].
pub fn create_enum_instance_of(
    shape: &'static Shape,
    target: Option<&str>,
) -> Result<OpaqueValue, FactoryError> {
    InstanceFactory::new(&HeapAllocator).create_enum(shape, target)
}

/// A construction session.
///
/// Carries the injected allocation capability for identity objects and
/// the in-flight type stack used to refuse cyclic synthesis. The free
/// functions above run one-shot sessions over the stock
/// [`HeapAllocator`]; build a factory directly to substitute your own
/// allocator.
pub struct InstanceFactory<'alloc> {
    allocator: &'alloc dyn ObjectAllocator,
    in_flight: Vec<ConstTypeId>,
}

impl<'alloc> InstanceFactory<'alloc> {
    /// Creates a factory that allocates identity objects through
    /// `allocator`.
    pub fn new(allocator: &'alloc dyn ObjectAllocator) -> Self {
        InstanceFactory {
            allocator,
            in_flight: Vec::new(),
        }
    }

    /// Fabricates an instance of `shape`.
    ///
    /// A shape with a default capability short-circuits to it before any
    /// structural strategy is considered; this is what makes bare
    /// scalars constructible.
    pub fn create(
        &mut self,
        shape: &'static Shape,
        resolver: Option<FieldResolver<'_>>,
    ) -> Result<OpaqueValue, FactoryError> {
        if let Some(default_fn) = shape.vtable.default_in_place {
            trace!("{shape}: canonical default");
            let buffer = RawBuffer::acquire(shape);
            // SAFETY: buffer was allocated for this shape's layout
            unsafe {
                default_fn(buffer.data());
            }
            // SAFETY: default_in_place fully initialized the buffer
            return Ok(unsafe { OpaqueValue::from_buffer(buffer) });
        }

        if self.in_flight.contains(&shape.id) {
            return Err(FactoryError::CyclicType { shape });
        }

        self.in_flight.push(shape.id);
        let result = match shape.ty {
            Type::Struct(ty) => self.build_struct(shape, ty, resolver),
            Type::Object(ty) => self.build_object(shape, ty, resolver),
            Type::Enum(ty) => self.build_enum(shape, ty, None),
            _ => Err(FactoryError::UnableToBuild { shape }),
        };
        self.in_flight.pop();
        result
    }

    /// Fabricates an instance of a fieldless enum shape, selecting the
    /// variant named `target` when given.
    pub fn create_enum(
        &mut self,
        shape: &'static Shape,
        target: Option<&str>,
    ) -> Result<OpaqueValue, FactoryError> {
        match shape.ty {
            Type::Enum(ty) => self.build_enum(shape, ty, target),
            _ => Err(FactoryError::UnableToBuild { shape }),
        }
    }

    fn build_struct(
        &mut self,
        shape: &'static Shape,
        ty: StructType,
        resolver: Option<FieldResolver<'_>>,
    ) -> Result<OpaqueValue, FactoryError> {
        trace!("{shape}: building struct, {} field(s)", ty.fields.len());
        let buffer = RawBuffer::acquire(shape);
        self.set_fields(
            buffer.data(),
            shape.layout.size(),
            shape,
            ty.fields,
            resolver,
        )?;
        // SAFETY: set_fields wrote every field, which covers the layout
        Ok(unsafe { OpaqueValue::from_buffer(buffer) })
    }

    fn build_object(
        &mut self,
        shape: &'static Shape,
        ty: ObjectType,
        resolver: Option<FieldResolver<'_>>,
    ) -> Result<OpaqueValue, FactoryError> {
        trace!("{shape}: allocating identity object");
        let block = self
            .allocator
            .allocate(shape)
            .map_err(|source| FactoryError::AllocationFailed { shape, source })?;

        // On error the block drops here, releasing without running any
        // field destructor.
        self.set_fields(
            block.body_uninit(),
            ty.body_layout.size(),
            shape,
            ty.fields,
            resolver,
        )?;

        let handle = block.finish();

        // The handle *is* the instance; object shapes declare the
        // handle's layout, which the erased storage must match.
        debug_assert_eq!(shape.layout, core::alloc::Layout::new::<conjure_core::ObjRef>());
        let buffer = RawBuffer::acquire(shape);
        // SAFETY: buffer was allocated for the handle's layout
        unsafe {
            buffer.data().put(handle);
        }
        // SAFETY: the handle write initialized the buffer
        Ok(unsafe { OpaqueValue::from_buffer(buffer) })
    }

    fn build_enum(
        &mut self,
        shape: &'static Shape,
        ty: EnumType,
        target: Option<&str>,
    ) -> Result<OpaqueValue, FactoryError> {
        if ty.variants.is_empty() || ty.payload_variant_count() > 0 {
            return Err(FactoryError::UnableToBuild { shape });
        }

        // An unknown target name is not an error: fall back to the first
        // declared variant, same as giving no target at all.
        let index = target.and_then(|name| ty.variant_index(name)).unwrap_or(0);
        let variant = &ty.variants[index];
        let tag = variant.discriminant.unwrap_or(index as i64);
        trace!("{shape}: selecting variant {} (tag {tag})", variant.name);

        if ty.enum_repr.size() > shape.layout.size() {
            return Err(FactoryError::InvariantViolation {
                invariant: "enum discriminant representation exceeds the enum's layout",
            });
        }

        let buffer = RawBuffer::acquire(shape);
        // SAFETY: the buffer covers the layout, and the tag fits per the
        // check above
        unsafe {
            buffer.data().write_zeroes(shape.layout.size());
            ty.enum_repr.write_discriminant(buffer.data(), tag);
        }
        // SAFETY: zeroing plus the tag write covers every byte
        Ok(unsafe { OpaqueValue::from_buffer(buffer) })
    }

    /// Writes every field of `fields` into `target`, whose usable size is
    /// `size` bytes. Each write is bounds-checked against `size` before
    /// the slot pointer is even formed.
    fn set_fields(
        &mut self,
        target: PtrUninit<'_>,
        size: usize,
        owner: &'static Shape,
        fields: &'static [Field],
        resolver: Option<FieldResolver<'_>>,
    ) -> Result<(), FactoryError> {
        for field in fields {
            let field_shape = field.shape();

            // checked_add: a hostile offset must not wrap past the check
            let field_end = field.offset.checked_add(field_shape.layout.size());
            if !field_end.is_some_and(|end| end <= size) {
                return Err(FactoryError::FieldOutOfBounds {
                    shape: owner,
                    field_name: field.name,
                });
            }
            // SAFETY: just bounds-checked against the owner's size
            let slot = unsafe { target.field_uninit_at(field.offset) };

            let written = if let Some(resolver) = resolver {
                let value = resolver(field)?;
                if !value.shape().is_shape(field_shape) {
                    return Err(FactoryError::ShapeMismatch {
                        expected: field_shape,
                        actual: value.shape(),
                    });
                }
                // SAFETY: slot is in bounds, aligned per the shape's
                // offset contract, and distinct from the value's storage
                unsafe { value.move_into(slot) }
            } else if let Some(default_fn) = field.vtable.default_fn {
                // SAFETY: same slot contract as above
                unsafe { default_fn(slot) }
            } else if let Some(default_fn) = field_shape.vtable.default_in_place {
                // SAFETY: same slot contract as above
                unsafe { default_fn(slot) }
            } else if let Some(none_fn) = field_shape.vtable.none_in_place {
                // SAFETY: same slot contract as above
                unsafe { none_fn(slot) }
            } else {
                let value = self.create(field_shape, None)?;
                // SAFETY: same slot contract as above
                unsafe { value.move_into(slot) }
            };

            if field.is_sensitive() {
                trace!("  {owner}.{} = <redacted>", field.name);
            } else {
                trace!(
                    "  {owner}.{} = {:?}",
                    field.name,
                    crate::value::ErasedDebug(written.as_const(), field_shape)
                );
            }
            let _ = written;
        }
        Ok(())
    }
}
