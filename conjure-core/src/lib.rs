#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

#[cfg(feature = "alloc")]
extern crate alloc;

mod macros;

// Type-erased pointer utilities
mod ptr;
pub use ptr::*;

// Const type identity
mod typeid;
pub use typeid::*;

// Shape, field, variant and vtable definitions
mod types;
pub use types::*;

// Shapes for scalars and Option
mod impls;

// Identity-object runtime model
#[cfg(feature = "alloc")]
mod object;
#[cfg(feature = "alloc")]
pub use object::*;

/// Allows querying the [`Shape`] of a type, which is what the runtime
/// factory consumes to fabricate instances without calling any of the
/// type's own constructors.
///
/// # Safety
///
/// The shape must describe the type's actual memory layout: the declared
/// [`core::alloc::Layout`], every field offset, and the discriminant
/// representation must all be accurate, and every vtable function must be
/// sound for this type. Getting any of this wrong turns every consumer of
/// the shape into undefined behavior.
pub unsafe trait Reflect: Sized + 'static {
    /// The shape of this type.
    const SHAPE: &'static Shape;
}
