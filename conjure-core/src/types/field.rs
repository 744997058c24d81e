use super::{DefaultInPlaceFn, Shape};
use bitflags::bitflags;

/// Describes a field in a struct or identity-object body.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct Field {
    /// Name of the field, used for diagnostics and resolver matching.
    pub name: &'static str,

    /// Shape of the field's type. A function pointer so that shapes may
    /// reference each other (including themselves) from const context.
    pub shape: fn() -> &'static Shape,

    /// Byte offset of the field within the owning layout (obtained
    /// through `core::mem::offset_of!` for real Rust types).
    pub offset: usize,

    /// Flags for the field (e.g. sensitive).
    pub flags: FieldFlags,

    /// Per-field overrides consulted during synthesis.
    pub vtable: &'static FieldVTable,
}

impl Field {
    /// Returns the shape of the field's type.
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// Returns a builder for `Field`.
    pub const fn builder() -> FieldBuilder {
        FieldBuilder::new()
    }

    /// Whether the field is marked sensitive; its value is then redacted
    /// from trace output.
    pub fn is_sensitive(&self) -> bool {
        self.flags.contains(FieldFlags::SENSITIVE)
    }
}

impl core::fmt::Debug for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("shape", &format_args!("{}", self.shape()))
            .field("offset", &self.offset)
            .finish()
    }
}

/// Per-field overrides.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct FieldVTable {
    /// A default value for this specific field, taking precedence over
    /// the field type's own default capability.
    pub default_fn: Option<DefaultInPlaceFn>,
}

impl FieldVTable {
    /// Returns a builder for `FieldVTable`.
    pub const fn builder() -> FieldVTableBuilder {
        FieldVTableBuilder::new()
    }
}

/// Builder for [`FieldVTable`]
pub struct FieldVTableBuilder {
    default_fn: Option<DefaultInPlaceFn>,
}

impl FieldVTableBuilder {
    /// Creates a new `FieldVTableBuilder`.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self { default_fn: None }
    }

    /// Sets the default_fn for the field.
    pub const fn default_fn(mut self, f: DefaultInPlaceFn) -> Self {
        self.default_fn = Some(f);
        self
    }

    /// Builds the `FieldVTable`.
    pub const fn build(self) -> FieldVTable {
        FieldVTable {
            default_fn: self.default_fn,
        }
    }
}

/// Builder for [`Field`]
pub struct FieldBuilder {
    name: Option<&'static str>,
    shape: Option<fn() -> &'static Shape>,
    offset: Option<usize>,
    flags: Option<FieldFlags>,
    vtable: &'static FieldVTable,
}

impl FieldBuilder {
    /// Creates a new `FieldBuilder`.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            name: None,
            shape: None,
            offset: None,
            flags: None,
            vtable: &const { FieldVTable { default_fn: None } },
        }
    }

    /// Sets the name for the field.
    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the shape for the field.
    pub const fn shape(mut self, shape: fn() -> &'static Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Sets the offset for the field.
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the flags for the field.
    pub const fn flags(mut self, flags: FieldFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Sets the vtable for the field.
    pub const fn vtable(mut self, vtable: &'static FieldVTable) -> Self {
        self.vtable = vtable;
        self
    }

    /// Builds the `Field`.
    ///
    /// # Panics
    ///
    /// Panics if `name`, `shape` or `offset` are unset.
    pub const fn build(self) -> Field {
        Field {
            name: self.name.unwrap(),
            shape: self.shape.unwrap(),
            offset: self.offset.unwrap(),
            flags: match self.flags {
                Some(flags) => flags,
                None => FieldFlags::EMPTY,
            },
            vtable: self.vtable,
        }
    }
}

bitflags! {
    /// Flags that modify how a field is treated
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u64 {
        /// An empty set of flags
        const EMPTY = 0;

        /// The field contains sensitive data that should not be logged
        const SENSITIVE = 1 << 0;
    }
}

impl Default for FieldFlags {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}
