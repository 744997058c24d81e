use core::alloc::Layout;

use super::Field;

/// Body layout and fields of an identity-object type.
///
/// Identity objects are never laid out inline: instances live in a
/// heap-allocated block behind a runtime-managed header, and the in-place
/// representation of a value is a handle to that block. Field offsets
/// here are relative to the start of the *body*, not the block.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct ObjectType {
    /// Size and alignment of the object's body (the part after the
    /// header, where fields live).
    pub body_layout: Layout,

    /// All body fields, in declaration order.
    pub fields: &'static [Field],
}

impl ObjectType {
    /// Returns a builder for `ObjectType`.
    pub const fn builder() -> ObjectTypeBuilder {
        ObjectTypeBuilder::new()
    }
}

/// Builder for [`ObjectType`]
pub struct ObjectTypeBuilder {
    body_layout: Option<Layout>,
    fields: &'static [Field],
}

impl ObjectTypeBuilder {
    /// Creates a new `ObjectTypeBuilder`.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            body_layout: None,
            fields: &[],
        }
    }

    /// Sets the body layout.
    pub const fn body_layout(mut self, body_layout: Layout) -> Self {
        self.body_layout = Some(body_layout);
        self
    }

    /// Sets the body fields.
    pub const fn fields(mut self, fields: &'static [Field]) -> Self {
        self.fields = fields;
        self
    }

    /// Builds the `ObjectType`.
    pub const fn build(self) -> ObjectType {
        ObjectType {
            body_layout: self.body_layout.unwrap(),
            fields: self.fields,
        }
    }
}
