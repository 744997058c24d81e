//! Identity-object runtime model
//!
//! Identity objects are heap-allocated values with a runtime-managed
//! header (refcount plus shape pointer). The factory never assumes a
//! header format: it goes through the [`ObjectAllocator`] capability,
//! which hands back a zero-initialized, header-valid block ready for
//! field writes. [`HeapAllocator`] is the stock implementation.

use core::alloc::Layout;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering, fence};

use crate::{PtrConst, PtrUninit, Reflect, Shape, Type};

/// Header placed in front of every identity-object body.
#[repr(C)]
struct ObjHeader {
    strong: AtomicUsize,
    shape: &'static Shape,
    block: Layout,
    body_offset: usize,
}

/// The identity-object allocation primitive.
///
/// Contract: [`allocate`](ObjectAllocator::allocate) returns a block of
/// the shape's body size and alignment, zero-initialized, with its header
/// already valid, tagged with the shape's identity. The caller writes the
/// body fields and then either [`finish`](ObjUninit::finish)es the block
/// into a live handle or lets it drop, which releases the memory without
/// running any field destructor.
pub trait ObjectAllocator {
    /// Allocates a zero-initialized block for an instance of `shape`.
    ///
    /// Fails if `shape` is not an identity-object shape, if its layout
    /// cannot be computed, or on resource exhaustion.
    fn allocate(&self, shape: &'static Shape) -> Result<ObjUninit, AllocError>;
}

/// Errors the allocation primitive can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AllocError {
    /// The shape does not describe an identity object.
    NotAnObject,
    /// Header plus body exceeds the representable layout bounds.
    InvalidLayout,
    /// The underlying allocator could not satisfy the request.
    Exhausted,
}

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AllocError::NotAnObject => write!(f, "shape does not describe an identity object"),
            AllocError::InvalidLayout => write!(f, "object layout overflows"),
            AllocError::Exhausted => write!(f, "allocation failed"),
        }
    }
}

impl core::error::Error for AllocError {}

/// The stock [`ObjectAllocator`], backed by the global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl ObjectAllocator for HeapAllocator {
    fn allocate(&self, shape: &'static Shape) -> Result<ObjUninit, AllocError> {
        let Type::Object(ty) = shape.ty else {
            return Err(AllocError::NotAnObject);
        };

        let (block, body_offset) = Layout::new::<ObjHeader>()
            .extend(ty.body_layout)
            .map_err(|_| AllocError::InvalidLayout)?;
        let block = block.pad_to_align();

        // SAFETY: block covers at least an ObjHeader, so it is non-zero sized
        let ptr = unsafe { alloc::alloc::alloc_zeroed(block) };
        let Some(header) = NonNull::new(ptr as *mut ObjHeader) else {
            return Err(AllocError::Exhausted);
        };

        // SAFETY: freshly allocated, aligned for ObjHeader
        unsafe {
            header.as_ptr().write(ObjHeader {
                strong: AtomicUsize::new(1),
                shape,
                block,
                body_offset,
            });
        }

        Ok(ObjUninit { header })
    }
}

/// An allocated identity-object block whose body has not been fully
/// initialized yet.
///
/// Dropping an `ObjUninit` releases the block without running any
/// destruction logic on the body — partially written fields are simply
/// thrown away. Call [`finish`](ObjUninit::finish) once every field has
/// been written to turn it into a live [`ObjRef`].
pub struct ObjUninit {
    header: NonNull<ObjHeader>,
}

impl ObjUninit {
    /// The shape this block was allocated for.
    pub fn shape(&self) -> &'static Shape {
        // SAFETY: header is valid for as long as self lives
        unsafe { self.header.as_ref().shape }
    }

    /// Write target for the object's body. Zero-initialized on
    /// allocation; field offsets from the shape's [`crate::ObjectType`]
    /// apply relative to this pointer.
    pub fn body_uninit(&self) -> PtrUninit<'_> {
        // SAFETY: body_offset stays within the allocated block
        unsafe {
            let header = self.header.as_ref();
            PtrUninit::new(
                self.header
                    .as_ptr()
                    .cast::<u8>()
                    .byte_add(header.body_offset),
            )
        }
    }

    /// Converts the block into a live handle. Ownership of the block
    /// transfers to the returned [`ObjRef`]; the engine never releases it.
    pub fn finish(self) -> ObjRef {
        let header = self.header;
        core::mem::forget(self);
        ObjRef { header }
    }
}

impl core::fmt::Debug for ObjUninit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ObjUninit<{}>", self.shape())
    }
}

impl Drop for ObjUninit {
    fn drop(&mut self) {
        // SAFETY: we own the block; body fields are not dropped because
        // they were never all initialized
        unsafe {
            let block = self.header.as_ref().block;
            alloc::alloc::dealloc(self.header.as_ptr().cast(), block);
        }
    }
}

/// A refcounted handle to a live identity object.
///
/// Cloning bumps the refcount; dropping the last handle drops the body
/// fields through their shape vtables and frees the block.
pub struct ObjRef {
    header: NonNull<ObjHeader>,
}

impl ObjRef {
    /// The shape of the object this handle points to.
    pub fn shape(&self) -> &'static Shape {
        // SAFETY: header is valid while any handle lives
        unsafe { self.header.as_ref().shape }
    }

    /// Number of live handles to this object.
    pub fn strong_count(&self) -> usize {
        // SAFETY: header is valid while any handle lives
        unsafe { self.header.as_ref().strong.load(Ordering::Acquire) }
    }

    /// Read-only pointer to the object's body.
    pub fn body(&self) -> PtrConst<'_> {
        // SAFETY: body_offset stays within the allocated block
        unsafe {
            let header = self.header.as_ref();
            PtrConst::new(
                self.header
                    .as_ptr()
                    .cast::<u8>()
                    .byte_add(header.body_offset),
            )
        }
    }

    /// Borrows a body field by name, checking that `T` matches the
    /// field's registered shape.
    pub fn field<T: Reflect>(&self, name: &str) -> Option<&T> {
        let Type::Object(ty) = self.shape().ty else {
            return None;
        };
        let field = ty.fields.iter().find(|f| f.name == name)?;
        if !field.shape().is_shape(T::SHAPE) {
            return None;
        }
        // SAFETY: offset and type are vouched for by the shape
        unsafe { Some(self.body().field(field.offset).get::<T>()) }
    }
}

impl Clone for ObjRef {
    fn clone(&self) -> Self {
        // SAFETY: header is valid while any handle lives
        unsafe {
            self.header.as_ref().strong.fetch_add(1, Ordering::Relaxed);
        }
        ObjRef {
            header: self.header,
        }
    }
}

impl Drop for ObjRef {
    fn drop(&mut self) {
        // SAFETY: header is valid until the last handle is gone
        unsafe {
            if self.header.as_ref().strong.fetch_sub(1, Ordering::Release) != 1 {
                return;
            }
            fence(Ordering::Acquire);

            let shape = self.header.as_ref().shape;
            if let Type::Object(ty) = shape.ty {
                let body = self
                    .header
                    .as_ptr()
                    .cast::<u8>()
                    .byte_add(self.header.as_ref().body_offset);
                for field in ty.fields {
                    if let Some(drop_fn) = field.shape().vtable.drop_in_place {
                        drop_fn(crate::PtrMut::new(body.byte_add(field.offset)));
                    }
                }
            }

            let block = self.header.as_ref().block;
            alloc::alloc::dealloc(self.header.as_ptr().cast(), block);
        }
    }
}

impl core::fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ObjRef<{}>", self.shape())
    }
}
