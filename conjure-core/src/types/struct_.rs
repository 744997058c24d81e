use super::Field;

/// Fields of an inline-value (struct-like) type.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct StructType {
    /// All fields, in declaration order (not necessarily memory order).
    pub fields: &'static [Field],
}

impl StructType {
    /// Returns a builder for `StructType`.
    pub const fn builder() -> StructBuilder {
        StructBuilder::new()
    }
}

/// Builder for [`StructType`]
pub struct StructBuilder {
    fields: &'static [Field],
}

impl StructBuilder {
    /// Creates a new `StructBuilder`.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self { fields: &[] }
    }

    /// Sets the fields for the `StructType`.
    pub const fn fields(mut self, fields: &'static [Field]) -> Self {
        self.fields = fields;
        self
    }

    /// Builds the `StructType`.
    pub const fn build(self) -> StructType {
        StructType {
            fields: self.fields,
        }
    }
}
