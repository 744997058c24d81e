use super::StructType;
use crate::{PtrMut, PtrUninit};

/// Variants and discriminant representation of an enum type.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct EnumType {
    /// Representation of the enum's discriminant (u8, u16, etc.)
    pub enum_repr: EnumRepr,

    /// All variants for this enum, in declaration order.
    pub variants: &'static [Variant],
}

impl EnumType {
    /// Returns a builder for `EnumType`.
    pub const fn builder() -> EnumTypeBuilder {
        EnumTypeBuilder::new()
    }

    /// Number of variants that carry payload data. The factory only
    /// supports enums where this is zero.
    pub fn payload_variant_count(&self) -> usize {
        self.variants.iter().filter(|v| v.has_payload()).count()
    }

    /// Looks up a variant's ordered position by exact name match.
    pub fn variant_index(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == name)
    }
}

/// Builder for [`EnumType`]
pub struct EnumTypeBuilder {
    enum_repr: Option<EnumRepr>,
    variants: Option<&'static [Variant]>,
}

impl EnumTypeBuilder {
    /// Creates a new `EnumTypeBuilder`.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            enum_repr: None,
            variants: None,
        }
    }

    /// Sets the discriminant representation.
    pub const fn enum_repr(mut self, enum_repr: EnumRepr) -> Self {
        self.enum_repr = Some(enum_repr);
        self
    }

    /// Sets the variants.
    pub const fn variants(mut self, variants: &'static [Variant]) -> Self {
        self.variants = Some(variants);
        self
    }

    /// Builds the `EnumType`.
    pub const fn build(self) -> EnumType {
        EnumType {
            enum_repr: self.enum_repr.unwrap(),
            variants: self.variants.unwrap(),
        }
    }
}

/// Describes a variant of an enum.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct Variant {
    /// Name of the variant, e.g. `North` for `enum Direction { North }`.
    pub name: &'static str,

    /// Explicit discriminant value, if the declaration carries one. When
    /// absent, the variant's ordered position is used as the tag.
    pub discriminant: Option<i64>,

    /// Payload fields for this variant; empty for unit variants.
    pub data: StructType,
}

impl Variant {
    /// Returns a builder for `Variant`.
    pub const fn builder() -> VariantBuilder {
        VariantBuilder::new()
    }

    /// Whether this variant carries associated payload data.
    pub fn has_payload(&self) -> bool {
        !self.data.fields.is_empty()
    }
}

/// Builder for [`Variant`]
pub struct VariantBuilder {
    name: Option<&'static str>,
    discriminant: Option<i64>,
    data: Option<StructType>,
}

impl VariantBuilder {
    /// Creates a new `VariantBuilder`.
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            name: None,
            discriminant: None,
            data: None,
        }
    }

    /// Sets the name for the variant.
    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets an explicit discriminant for the variant.
    pub const fn discriminant(mut self, discriminant: i64) -> Self {
        self.discriminant = Some(discriminant);
        self
    }

    /// Sets the payload fields for the variant.
    pub const fn data(mut self, data: StructType) -> Self {
        self.data = Some(data);
        self
    }

    /// Builds the `Variant`.
    pub const fn build(self) -> Variant {
        Variant {
            name: self.name.unwrap(),
            discriminant: self.discriminant,
            data: match self.data {
                Some(data) => data,
                None => StructType { fields: &[] },
            },
        }
    }
}

/// Possible discriminant representations — the type and size of the tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum EnumRepr {
    /// u8 representation (#[repr(u8)])
    U8,
    /// u16 representation (#[repr(u16)])
    U16,
    /// u32 representation (#[repr(u32)])
    U32,
    /// u64 representation (#[repr(u64)])
    U64,
    /// usize representation (#[repr(usize)])
    USize,
    /// i8 representation (#[repr(i8)])
    I8,
    /// i16 representation (#[repr(i16)])
    I16,
    /// i32 representation (#[repr(i32)])
    I32,
    /// i64 representation (#[repr(i64)])
    I64,
    /// isize representation (#[repr(isize)])
    ISize,
}

impl EnumRepr {
    /// Size of the tag in bytes.
    pub const fn size(self) -> usize {
        match self {
            EnumRepr::U8 | EnumRepr::I8 => 1,
            EnumRepr::U16 | EnumRepr::I16 => 2,
            EnumRepr::U32 | EnumRepr::I32 => 4,
            EnumRepr::U64 | EnumRepr::I64 => 8,
            EnumRepr::USize | EnumRepr::ISize => core::mem::size_of::<usize>(),
        }
    }

    /// Encodes `value` as this representation at `target`. This is the
    /// single point where a discriminant becomes bytes.
    ///
    /// # Safety
    ///
    /// `target` must be valid for writes of [`EnumRepr::size`] bytes and
    /// aligned for the tag type.
    pub unsafe fn write_discriminant(self, target: PtrUninit<'_>, value: i64) -> PtrMut<'_> {
        unsafe {
            match self {
                EnumRepr::U8 => target.put(value as u8),
                EnumRepr::U16 => target.put(value as u16),
                EnumRepr::U32 => target.put(value as u32),
                EnumRepr::U64 => target.put(value as u64),
                EnumRepr::USize => target.put(value as usize),
                EnumRepr::I8 => target.put(value as i8),
                EnumRepr::I16 => target.put(value as i16),
                EnumRepr::I32 => target.put(value as i32),
                EnumRepr::I64 => target.put(value),
                EnumRepr::ISize => target.put(value as isize),
            }
        }
    }
}
