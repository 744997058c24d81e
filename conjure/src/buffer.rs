//! Scoped ownership of an uninitialized allocation.
//!
//! Every inline construction goes through a [`RawBuffer`]: acquire a
//! block sized for the shape, write into it, then either hand the block
//! off to the erased-value bridge or let the guard drop it. The guard
//! releases memory without running any destructor, so abandoning a
//! half-written buffer is always safe (heap values already written into
//! it are leaked, never double-freed).

use conjure_core::{PtrUninit, Shape};

pub(crate) struct RawBuffer {
    data: PtrUninit<'static>,
    shape: &'static Shape,
}

impl RawBuffer {
    /// Acquires an uninitialized block matching `shape`'s layout.
    pub(crate) fn acquire(shape: &'static Shape) -> Self {
        #[cfg(test)]
        counters::ACQUIRED.with(|c| c.set(c.get() + 1));
        RawBuffer {
            data: shape.allocate(),
            shape,
        }
    }

    pub(crate) fn data(&self) -> PtrUninit<'static> {
        self.data
    }

    /// Ends the guard's custody without freeing the block. The caller
    /// takes over the allocation; from the buffer ledger's point of view
    /// this counts as the release.
    pub(crate) fn into_parts(self) -> (PtrUninit<'static>, &'static Shape) {
        #[cfg(test)]
        counters::RELEASED.with(|c| c.set(c.get() + 1));
        let this = core::mem::ManuallyDrop::new(self);
        (this.data, this.shape)
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        #[cfg(test)]
        counters::RELEASED.with(|c| c.set(c.get() + 1));
        // SAFETY: data came from allocate() on this same shape
        unsafe { self.shape.deallocate_uninit(self.data) }
    }
}
