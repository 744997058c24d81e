//! The type-erasure bridge.
//!
//! [`OpaqueValue`] is the one place in the engine where a typed value
//! crosses into erased storage and back. Everything the factory returns
//! from its erased entry points is an `OpaqueValue`; every exit — into a
//! concrete `T`, into a field slot, into an object handle — is one of
//! the methods here, each of which checks or documents exactly what it
//! assumes.

use core::mem::ManuallyDrop;

use conjure_core::{ObjRef, PtrConst, PtrMut, PtrUninit, Reflect, Shape, Type};

use crate::{FactoryError, RawBuffer};

/// An owned value of some reflected type, with the type erased.
///
/// Holds its own heap block plus the [`Shape`] describing what lives in
/// it; dropping the value runs the shape's destructor and frees the
/// block.
pub struct OpaqueValue {
    data: PtrMut<'static>,
    shape: &'static Shape,
}

impl OpaqueValue {
    /// Erases a typed value, moving it into owned storage.
    pub fn new<T: Reflect>(value: T) -> Self {
        let data = T::SHAPE.allocate();
        // SAFETY: freshly allocated for T's layout
        let data = unsafe { data.put(value) };
        OpaqueValue {
            data,
            shape: T::SHAPE,
        }
    }

    /// Wraps a fully initialized buffer.
    ///
    /// # Safety
    ///
    /// Every byte of the value `buffer`'s shape describes must have been
    /// initialized.
    pub(crate) unsafe fn from_buffer(buffer: RawBuffer) -> Self {
        let (data, shape) = buffer.into_parts();
        // SAFETY: initialization is the caller's contract
        let data = unsafe { data.assume_init() };
        OpaqueValue { data, shape }
    }

    /// The shape of the contained value.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Read-only pointer to the contained value.
    pub fn as_ptr(&self) -> PtrConst<'_> {
        self.data.as_const()
    }

    /// Recovers the typed value, consuming the erased one.
    ///
    /// Fails with [`FactoryError::ShapeMismatch`] if `T` is not the type
    /// that was erased; the value is dropped normally in that case.
    pub fn materialize<T: Reflect>(self) -> Result<T, FactoryError> {
        if !self.shape.is_shape(T::SHAPE) {
            return Err(FactoryError::ShapeMismatch {
                expected: T::SHAPE,
                actual: self.shape,
            });
        }
        let this = ManuallyDrop::new(self);
        // SAFETY: shape identity was just checked, and the block is not
        // touched again after the move
        let value = unsafe { this.data.read::<T>() };
        unsafe {
            this.shape
                .deallocate_uninit(PtrUninit::new(this.data.as_mut_byte_ptr()));
        }
        Ok(value)
    }

    /// Recovers the identity-object handle behind this value.
    ///
    /// Identity objects are represented as [`ObjRef`] handles, which are
    /// not reflected types themselves, so this is their only typed exit.
    pub fn into_object(self) -> Result<ObjRef, FactoryError> {
        if !matches!(self.shape.ty, Type::Object(_)) {
            return Err(FactoryError::WasNotA {
                expected: "identity object",
                actual: self.shape,
            });
        }
        let this = ManuallyDrop::new(self);
        // SAFETY: object shapes store an ObjRef handle inline
        let handle = unsafe { this.data.read::<ObjRef>() };
        unsafe {
            this.shape
                .deallocate_uninit(PtrUninit::new(this.data.as_mut_byte_ptr()));
        }
        Ok(handle)
    }

    /// Moves the contained value into `dst` and frees this value's own
    /// block without running a destructor (ownership moved with the
    /// bytes).
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of the shape's size, aligned for
    /// the shape's layout, and must not overlap this value's storage.
    pub(crate) unsafe fn move_into<'dst>(self, dst: PtrUninit<'dst>) -> PtrMut<'dst> {
        let this = ManuallyDrop::new(self);
        let out = unsafe { dst.copy_from(this.data.as_const(), this.shape.layout.size()) };
        unsafe {
            this.shape
                .deallocate_uninit(PtrUninit::new(this.data.as_mut_byte_ptr()));
        }
        out
    }
}

impl Drop for OpaqueValue {
    fn drop(&mut self) {
        unsafe {
            if let Some(drop_fn) = self.shape.vtable.drop_in_place {
                drop_fn(self.data);
            }
            self.shape
                .deallocate_uninit(PtrUninit::new(self.data.as_mut_byte_ptr()));
        }
    }
}

impl core::fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.shape.vtable.debug {
            // SAFETY: the pointer holds a value of the vtable's type
            Some(debug_fn) => unsafe { debug_fn(self.as_ptr(), f) },
            None => write!(f, "OpaqueValue<{}>", self.shape),
        }
    }
}

/// Debug adapter over an erased location, for trace output.
#[cfg(feature = "log")]
pub(crate) struct ErasedDebug<'mem>(pub PtrConst<'mem>, pub &'static Shape);

#[cfg(feature = "log")]
impl core::fmt::Debug for ErasedDebug<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.1.vtable.debug {
            // SAFETY: constructed over an initialized value of shape `.1`
            Some(debug_fn) => unsafe { debug_fn(self.0, f) },
            None => write!(f, "<{}>", self.1),
        }
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        if !self.shape.is_shape(other.shape) {
            return false;
        }
        match self.shape.vtable.eq {
            // SAFETY: both pointers hold values of the vtable's type
            Some(eq_fn) => unsafe { eq_fn(self.as_ptr(), other.as_ptr()) },
            None => false,
        }
    }
}
