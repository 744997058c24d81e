//! Shapes for scalars and `Option`
//!
//! Scalars are trivially constructible (their vtable exposes
//! `default_in_place`) but carry no structure, so they classify as
//! [`Type::Scalar`]. `Option<T>` is absent-representable and nothing
//! else: it classifies as [`Type::Opaque`] and only participates in
//! construction as a field, where the factory falls back to its
//! `none_in_place`.

use core::alloc::Layout;

use crate::{ConstTypeId, Reflect, Shape, Type, ValueVTable};

macro_rules! impl_reflect_scalar {
    ($($t:ty => $name:literal,)*) => {
        $(
            unsafe impl Reflect for $t {
                const SHAPE: &'static Shape = &const {
                    Shape::builder()
                        .id(ConstTypeId::of::<$t>())
                        .layout(Layout::new::<$t>())
                        .type_identifier($name)
                        .vtable(&const {
                            ValueVTable::builder()
                                .type_name(|f| core::write!(f, $name))
                                .default_in_place(|target| unsafe {
                                    target.put(<$t>::default())
                                })
                                .debug(|ptr, f| {
                                    core::fmt::Debug::fmt(unsafe { ptr.get::<$t>() }, f)
                                })
                                .eq(|left, right| unsafe {
                                    left.get::<$t>() == right.get::<$t>()
                                })
                                .build()
                        })
                        .ty(Type::Scalar)
                        .build()
                };
            }
        )*
    };
}

impl_reflect_scalar! {
    () => "()",
    bool => "bool",
    char => "char",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    f32 => "f32",
    f64 => "f64",
}

unsafe impl<T: Reflect> Reflect for Option<T> {
    const SHAPE: &'static Shape = &const {
        Shape::builder()
            .id(ConstTypeId::of::<Option<T>>())
            .layout(Layout::new::<Option<T>>())
            .type_identifier("Option")
            .vtable(&const {
                ValueVTable::builder()
                    .type_name(|f| {
                        core::write!(f, "Option<")?;
                        (T::SHAPE.vtable.type_name)(f)?;
                        core::write!(f, ">")
                    })
                    .drop_in_place(|ptr| unsafe { ptr.drop_in_place::<Option<T>>() })
                    .none_in_place(|target| unsafe { target.put(None::<T>) })
                    .build()
            })
            .ty(Type::Opaque)
            .build()
    };
}

#[cfg(test)]
mod tests {
    use crate::Reflect;

    #[test]
    fn scalars_are_trivially_constructible() {
        assert!(u32::SHAPE.is_default());
        assert!(bool::SHAPE.is_default());
        assert!(!u32::SHAPE.has_absent());
    }

    #[test]
    fn option_is_absent_representable_only() {
        let shape = <Option<u32>>::SHAPE;
        assert!(shape.has_absent());
        assert!(!shape.is_default());
    }

    #[test]
    fn shape_display_uses_type_name() {
        assert_eq!(alloc::format!("{}", <Option<u8>>::SHAPE), "Option<u8>");
        assert_eq!(alloc::format!("{}", i64::SHAPE), "i64");
    }
}
