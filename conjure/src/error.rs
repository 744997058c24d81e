//! The factory's error taxonomy.

use alloc::string::String;

use conjure_core::{AllocError, Shape};
use owo_colors::OwoColorize as _;

/// Any error reported while fabricating an instance.
///
/// Every variant names the shape involved, so a failure deep in a
/// recursive construction still points at the type that caused it.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FactoryError {
    /// No construction strategy applies to this shape: it is opaque, or
    /// an enum with no variants, or an enum with payload-carrying
    /// variants, or a scalar without a default capability.
    UnableToBuild {
        /// The shape that could not be built
        shape: &'static Shape,
    },

    /// Recursive synthesis re-entered a type that is already being
    /// constructed, which could never terminate.
    CyclicType {
        /// The shape whose construction was re-entered
        shape: &'static Shape,
    },

    /// The object allocator refused or failed the allocation.
    AllocationFailed {
        /// The identity-object shape being allocated
        shape: &'static Shape,
        /// What the allocator reported
        source: AllocError,
    },

    /// A value's shape did not match the shape the context required,
    /// e.g. a resolver returned a value of the wrong type or a
    /// materialization asked for the wrong type.
    ShapeMismatch {
        /// The shape the context required
        expected: &'static Shape,
        /// The shape actually provided
        actual: &'static Shape,
    },

    /// A field's declared offset plus its size does not fit inside its
    /// owner's layout. Writing it would corrupt adjacent memory, so the
    /// write is refused up front.
    FieldOutOfBounds {
        /// The owning shape whose metadata is inconsistent
        shape: &'static Shape,
        /// Name of the offending field
        field_name: &'static str,
    },

    /// A value was asked to exit erased storage as something it is not,
    /// e.g. an inline struct asked for its identity-object handle.
    WasNotA {
        /// What the caller asked for
        expected: &'static str,
        /// The shape of the value actually held
        actual: &'static Shape,
    },

    /// A caller-supplied resolver reported a failure for a field.
    Resolver {
        /// Name of the field the resolver was asked about
        field_name: &'static str,
        /// The resolver's own message
        message: String,
    },

    /// An internal consistency check failed; the metadata is not
    /// trustworthy enough to continue.
    InvariantViolation {
        /// Description of the violated invariant
        invariant: &'static str,
    },
}

impl core::fmt::Display for FactoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FactoryError::UnableToBuild { shape } => {
                write!(f, "Unable to build a value of type {}", shape.red())
            }
            FactoryError::CyclicType { shape } => {
                write!(
                    f,
                    "Type {} recursively contains itself and cannot be synthesized",
                    shape.red()
                )
            }
            FactoryError::AllocationFailed { shape, source } => {
                write!(f, "Allocating an instance of {} failed: {source}", shape.red())
            }
            FactoryError::ShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Shape mismatch: expected {}, got {}",
                    expected.green(),
                    actual.red()
                )
            }
            FactoryError::FieldOutOfBounds { shape, field_name } => {
                write!(
                    f,
                    "Field {} of {} lies outside the type's layout",
                    field_name.yellow(),
                    shape.red()
                )
            }
            FactoryError::WasNotA { expected, actual } => {
                write!(f, "Expected {}, but value was a {}", expected.green(), actual.red())
            }
            FactoryError::Resolver {
                field_name,
                message,
            } => {
                write!(f, "Resolver failed for field {}: {message}", field_name.yellow())
            }
            FactoryError::InvariantViolation { invariant } => {
                write!(f, "Invariant violated: {}", invariant.red())
            }
        }
    }
}

impl core::error::Error for FactoryError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            FactoryError::AllocationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
