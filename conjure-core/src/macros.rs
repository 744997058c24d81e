//! Registration macros
//!
//! These are the declarative path for giving a type a [`Shape`]: structs
//! and enums get a `Reflect` implementation, identity objects get a
//! standalone `static` shape (their runtime representation is always an
//! [`ObjRef`] handle, so they implement no trait).
//!
//! Shapes can always be written by hand with the `const` builders when a
//! macro's requirements (notably `Debug` and `PartialEq` on the target
//! type) cannot be met.
//!
//! [`Shape`]: crate::Shape
//! [`ObjRef`]: crate::ObjRef

/// Implements [`Reflect`](crate::Reflect) for a struct, registering it as
/// an inline-value shape.
///
/// The struct must implement `Debug` and `PartialEq` (wired into the
/// vtable), and every field type must implement `Reflect`.
///
/// ```
/// use conjure_core::reflect_struct;
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// reflect_struct!(Point { x: i32, y: i32 });
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($t:ty { $($field:ident : $fty:ty),* $(,)? }) => {
        unsafe impl $crate::Reflect for $t {
            const SHAPE: &'static $crate::Shape = &const {
                $crate::Shape::builder()
                    .id($crate::ConstTypeId::of::<$t>())
                    .layout(core::alloc::Layout::new::<$t>())
                    .type_identifier(stringify!($t))
                    .vtable(&const {
                        $crate::ValueVTable::builder()
                            .type_name(|f| core::write!(f, stringify!($t)))
                            .drop_in_place(|ptr| unsafe { ptr.drop_in_place::<$t>() })
                            .debug(|ptr, f| {
                                core::fmt::Debug::fmt(unsafe { ptr.get::<$t>() }, f)
                            })
                            .eq(|left, right| unsafe {
                                left.get::<$t>() == right.get::<$t>()
                            })
                            .build()
                    })
                    .ty($crate::Type::Struct(
                        $crate::StructType::builder()
                            .fields(&const {
                                [$(
                                    $crate::Field::builder()
                                        .name(stringify!($field))
                                        .shape(|| <$fty as $crate::Reflect>::SHAPE)
                                        .offset(core::mem::offset_of!($t, $field))
                                        .build(),
                                )*]
                            })
                            .build(),
                    ))
                    .build()
            };
        }
    };
}

/// Implements [`Reflect`](crate::Reflect) for a fieldless enum,
/// registering it as a tagged-union shape.
///
/// The second argument names the [`EnumRepr`](crate::EnumRepr) variant
/// matching the enum's `#[repr(..)]`. Explicit discriminants carry over
/// with `= value`.
///
/// ```
/// use conjure_core::reflect_enum;
///
/// #[derive(Debug, PartialEq)]
/// #[repr(u8)]
/// enum Direction {
///     North,
///     South,
///     East,
///     West,
/// }
///
/// reflect_enum!(Direction, U8 { North, South, East, West });
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($t:ty, $repr:ident { $($variant:ident $(= $disc:literal)?),* $(,)? }) => {
        unsafe impl $crate::Reflect for $t {
            const SHAPE: &'static $crate::Shape = &const {
                $crate::Shape::builder()
                    .id($crate::ConstTypeId::of::<$t>())
                    .layout(core::alloc::Layout::new::<$t>())
                    .type_identifier(stringify!($t))
                    .vtable(&const {
                        $crate::ValueVTable::builder()
                            .type_name(|f| core::write!(f, stringify!($t)))
                            .debug(|ptr, f| {
                                core::fmt::Debug::fmt(unsafe { ptr.get::<$t>() }, f)
                            })
                            .eq(|left, right| unsafe {
                                left.get::<$t>() == right.get::<$t>()
                            })
                            .build()
                    })
                    .ty($crate::Type::Enum(
                        $crate::EnumType::builder()
                            .enum_repr($crate::EnumRepr::$repr)
                            .variants(&const {
                                [$(
                                    {
                                        let builder = $crate::Variant::builder()
                                            .name(stringify!($variant));
                                        $(let builder = builder.discriminant($disc);)?
                                        builder.build()
                                    },
                                )*]
                            })
                            .build(),
                    ))
                    .build()
            };
        }
    };
}

/// Declares a `static` shape for an identity-object type.
///
/// The body type provides layout and field offsets; instances are
/// [`ObjRef`](crate::ObjRef) handles to an allocated block, so the shape
/// stands alone rather than implementing `Reflect`.
///
/// ```
/// use conjure_core::reflect_object;
///
/// struct SpriteBody {
///     x: u32,
///     y: u32,
/// }
///
/// reflect_object! {
///     pub static SPRITE: SpriteBody as "Sprite" {
///         x: u32,
///         y: u32,
///     }
/// }
/// ```
#[macro_export]
macro_rules! reflect_object {
    ($vis:vis static $name:ident : $body:ty as $label:literal { $($field:ident : $fty:ty),* $(,)? }) => {
        $vis static $name: $crate::Shape = const {
            $crate::Shape::builder()
                .id($crate::ConstTypeId::of::<$body>())
                .layout(core::alloc::Layout::new::<$crate::ObjRef>())
                .type_identifier($label)
                .vtable(&const {
                    $crate::ValueVTable::builder()
                        .type_name(|f| core::write!(f, $label))
                        .drop_in_place(|ptr| unsafe { ptr.drop_in_place::<$crate::ObjRef>() })
                        .build()
                })
                .ty($crate::Type::Object(
                    $crate::ObjectType::builder()
                        .body_layout(core::alloc::Layout::new::<$body>())
                        .fields(&const {
                            [$(
                                $crate::Field::builder()
                                    .name(stringify!($field))
                                    .shape(|| <$fty as $crate::Reflect>::SHAPE)
                                    .offset(core::mem::offset_of!($body, $field))
                                    .build(),
                            )*]
                        })
                        .build(),
                ))
                .build()
        };
    };
}
