#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

/// Trace-level logging for construction steps. Compiles to nothing
/// unless the `log` feature is enabled.
#[cfg(feature = "log")]
macro_rules! trace {
    ($($tt:tt)*) => { log::trace!($($tt)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($tt:tt)*) => {{}};
}

mod error;
pub use error::*;

mod buffer;
pub(crate) use buffer::RawBuffer;

mod value;
pub use value::OpaqueValue;

mod factory;
pub use factory::*;

pub use conjure_core::*;
