//! Type-erased pointers
//!
//! These are the only currency the factory uses to touch memory it cannot
//! name statically: a write target that may not be initialized yet
//! ([`PtrUninit`]), an initialized mutable location ([`PtrMut`]), and an
//! initialized read-only location ([`PtrConst`]).

use core::{marker::PhantomData, ptr::NonNull};

/// A type-erased pointer to a possibly-uninitialized value.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct PtrUninit<'mem>(*mut u8, PhantomData<&'mem mut ()>);

impl<'mem> PtrUninit<'mem> {
    /// Create an opaque pointer from a mutable pointer.
    ///
    /// This is safe because it's generic over T.
    #[inline]
    pub const fn new<T>(ptr: *mut T) -> Self {
        Self(ptr as *mut u8, PhantomData)
    }

    /// Write a value to this location and convert to an initialized pointer.
    ///
    /// # Safety
    ///
    /// The pointer must be properly aligned for T and point to allocated
    /// memory that can be safely written to.
    #[inline]
    pub unsafe fn put<T>(self, value: T) -> PtrMut<'mem> {
        unsafe {
            core::ptr::write(self.0 as *mut T, value);
            self.assume_init()
        }
    }

    /// Assumes the pointed-to memory is initialized.
    ///
    /// # Safety
    ///
    /// The pointer must actually point to initialized memory of the
    /// correct type.
    #[inline]
    pub unsafe fn assume_init(self) -> PtrMut<'mem> {
        let ptr = unsafe { NonNull::new_unchecked(self.0) };
        PtrMut(ptr, PhantomData)
    }

    /// Fill `len` bytes at this location with zeroes.
    ///
    /// # Safety
    ///
    /// The pointer must be valid for writes of `len` bytes.
    #[inline]
    pub unsafe fn write_zeroes(self, len: usize) {
        unsafe { core::ptr::write_bytes(self.0, 0, len) }
    }

    /// Copies `len` bytes from `src` into this location.
    ///
    /// # Safety
    ///
    /// - `src` must be valid for reads of `len` bytes
    /// - this pointer must be valid for writes of `len` bytes and aligned
    ///   for the value being copied
    /// - the regions may not overlap
    #[inline]
    pub unsafe fn copy_from(self, src: PtrConst<'_>, len: usize) -> PtrMut<'mem> {
        unsafe {
            core::ptr::copy_nonoverlapping(src.as_byte_ptr(), self.0, len);
            self.assume_init()
        }
    }

    /// Returns the underlying raw pointer as a byte pointer.
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.0
    }

    /// Returns a pointer with the given offset added.
    ///
    /// # Safety
    ///
    /// The offset must stay within the bounds of the allocated memory.
    #[inline]
    pub unsafe fn field_uninit_at(self, offset: usize) -> PtrUninit<'mem> {
        PtrUninit(unsafe { self.0.byte_add(offset) }, PhantomData)
    }
}

/// A type-erased pointer to an initialized value.
#[derive(Clone, Copy, Debug)]
#[repr(transparent)]
pub struct PtrMut<'mem>(NonNull<u8>, PhantomData<&'mem mut ()>);

impl<'mem> PtrMut<'mem> {
    /// Create an opaque pointer from a raw pointer.
    ///
    /// # Safety
    ///
    /// The pointer must be non-null, aligned, point to initialized memory
    /// of the correct type, and stay valid for `'mem`.
    #[inline]
    pub const fn new<T>(ptr: *mut T) -> Self {
        Self(
            unsafe { NonNull::new_unchecked(ptr as *mut u8) },
            PhantomData,
        )
    }

    /// Gets the underlying raw pointer.
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Borrows the pointed-to value.
    ///
    /// # Safety
    ///
    /// `T` must be the actual underlying type; you're downcasting with no
    /// guardrails. Respect aliasing-xor-mutability for the borrow.
    #[inline]
    pub const unsafe fn get<'borrow: 'mem, T>(self) -> &'borrow T {
        unsafe { &*(self.0.as_ptr() as *const T) }
    }

    /// Make a const pointer out of this mut pointer.
    #[inline]
    pub const fn as_const<'borrow: 'mem>(self) -> PtrConst<'borrow> {
        PtrConst(self.0, PhantomData)
    }

    /// Exposes [`core::ptr::read`]: moves the value out.
    ///
    /// # Safety
    ///
    /// `T` must be the actual underlying type, and the memory must not be
    /// read as an owned value again afterwards.
    #[inline]
    pub const unsafe fn read<T>(self) -> T {
        unsafe { core::ptr::read(self.0.as_ptr() as *const T) }
    }

    /// Exposes [`core::ptr::drop_in_place`].
    ///
    /// # Safety
    ///
    /// `T` must be the actual underlying type, and the memory must not be
    /// accessed again until reinitialized.
    #[inline]
    pub unsafe fn drop_in_place<T>(self) -> PtrUninit<'mem> {
        unsafe { core::ptr::drop_in_place(self.0.as_ptr() as *mut T) }
        PtrUninit(self.0.as_ptr(), PhantomData)
    }
}

/// A type-erased read-only pointer to an initialized value.
///
/// Cannot be null. May be dangling (for ZSTs).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PtrConst<'mem>(NonNull<u8>, PhantomData<&'mem ()>);

impl<'mem> PtrConst<'mem> {
    /// Create an opaque const pointer from a raw pointer.
    ///
    /// # Safety
    ///
    /// The pointer must be non-null, aligned, point to initialized memory
    /// of the correct type, and stay valid for `'mem`.
    #[inline]
    pub const fn new<T>(ptr: *const T) -> Self {
        unsafe { Self(NonNull::new_unchecked(ptr as *mut u8), PhantomData) }
    }

    /// Gets the underlying raw pointer as a byte pointer.
    #[inline]
    pub const fn as_byte_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Borrows the pointed-to value.
    ///
    /// # Safety
    ///
    /// `T` must be the actual underlying type; you're downcasting with no
    /// guardrails.
    #[inline]
    pub const unsafe fn get<'borrow: 'mem, T>(self) -> &'borrow T {
        unsafe { &*(self.0.as_ptr() as *const T) }
    }

    /// Returns a pointer with the given offset added.
    ///
    /// # Safety
    ///
    /// The offset must stay within the bounds of the allocated memory and
    /// the result must be aligned for the field type.
    #[inline]
    pub const unsafe fn field(self, offset: usize) -> PtrConst<'mem> {
        PtrConst(
            unsafe { NonNull::new_unchecked(self.0.as_ptr().byte_add(offset)) },
            PhantomData,
        )
    }
}
