use core::alloc::Layout;

use conjure_core::{
    AllocError, ConstTypeId, EnumRepr, EnumType, Field, FieldFlags, FieldVTable, HeapAllocator,
    ObjUninit, ObjectAllocator, Reflect, Shape, StructType, Type, ValueVTable, Variant,
    reflect_enum, reflect_object, reflect_struct,
};
use eyre::Result;

use crate::{
    FactoryError, InstanceFactory, OpaqueValue, create_enum_instance, create_enum_instance_of,
    create_instance, create_instance_of,
};

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}
reflect_struct!(Point { x: i32, y: i32 });

#[derive(Debug, PartialEq)]
struct Wrapper {
    inner: Point,
    count: u64,
}
reflect_struct!(Wrapper { inner: Point, count: u64 });

#[derive(Debug, PartialEq)]
struct WithOpt {
    tag: u8,
    note: Option<u32>,
}
reflect_struct!(WithOpt { tag: u8, note: Option<u32> });

#[derive(Debug, PartialEq)]
#[repr(u8)]
enum Direction {
    North,
    South,
    East,
    West,
}
reflect_enum!(Direction, U8 { North, South, East, West });

#[derive(Debug, PartialEq)]
#[repr(u8)]
enum Status {
    Idle = 10,
    Busy = 20,
}
reflect_enum!(Status, U8 { Idle = 10, Busy = 20 });

struct SpriteBody {
    x: u32,
    y: u32,
}

reflect_object! {
    static SPRITE: SpriteBody as "Sprite" {
        x: u32,
        y: u32,
    }
}

#[test]
fn struct_fields_default_to_zero() -> Result<()> {
    let point: Point = create_instance(None)?;
    assert_eq!(point, Point { x: 0, y: 0 });
    Ok(())
}

#[test]
fn nested_structs_recurse() -> Result<()> {
    let wrapper: Wrapper = create_instance(None)?;
    assert_eq!(
        wrapper,
        Wrapper {
            inner: Point { x: 0, y: 0 },
            count: 0,
        }
    );
    Ok(())
}

#[test]
fn optional_field_synthesizes_none() -> Result<()> {
    let value: WithOpt = create_instance(None)?;
    assert_eq!(value, WithOpt { tag: 0, note: None });
    Ok(())
}

#[test]
fn bare_scalar_builds_through_default() -> Result<()> {
    let value: u64 = create_instance(None)?;
    assert_eq!(value, 0);
    // Zero-sized scalars go through the same path.
    let _unit: () = create_instance(None)?;
    Ok(())
}

#[test]
fn bare_option_is_not_buildable() {
    let err = create_instance::<Option<u32>>(None).unwrap_err();
    assert_eq!(
        err,
        FactoryError::UnableToBuild {
            shape: <Option<u32>>::SHAPE,
        }
    );
}

#[test]
fn defaults_are_idempotent() -> Result<()> {
    let first: Wrapper = create_instance(None)?;
    let second: Wrapper = create_instance(None)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn enum_defaults_to_first_variant() -> Result<()> {
    let heading: Direction = create_enum_instance(None)?;
    assert_eq!(heading, Direction::North);
    Ok(())
}

#[test]
fn enum_selects_variant_by_name() -> Result<()> {
    let heading: Direction = create_enum_instance(Some("East"))?;
    assert_eq!(heading, Direction::East);
    Ok(())
}

#[test]
fn enum_unknown_name_falls_back_to_first_variant() -> Result<()> {
    let heading: Direction = create_enum_instance(Some("Northwest"))?;
    assert_eq!(heading, Direction::North);
    Ok(())
}

#[test]
fn enum_honors_explicit_discriminants() -> Result<()> {
    let status: Status = create_enum_instance(Some("Busy"))?;
    assert_eq!(status, Status::Busy);
    let status: Status = create_enum_instance(None)?;
    assert_eq!(status, Status::Idle);
    Ok(())
}

#[test]
fn generic_entry_builds_enums_too() -> Result<()> {
    let heading: Direction = create_instance(None)?;
    assert_eq!(heading, Direction::North);
    Ok(())
}

#[test]
fn enum_entry_rejects_structs() {
    let err = create_enum_instance_of(Point::SHAPE, None).unwrap_err();
    assert!(matches!(err, FactoryError::UnableToBuild { shape } if shape.is_shape(Point::SHAPE)));
}

// Payload-carrying variants are registered by hand: the macro path only
// covers fieldless enums.
#[derive(Debug)]
#[repr(u8)]
#[allow(dead_code)]
enum Message {
    Ping,
    Data(u32),
}

unsafe impl Reflect for Message {
    const SHAPE: &'static Shape = &const {
        Shape::builder()
            .id(ConstTypeId::of::<Message>())
            .layout(Layout::new::<Message>())
            .type_identifier("Message")
            .vtable(&const {
                ValueVTable::builder()
                    .type_name(|f| core::write!(f, "Message"))
                    .build()
            })
            .ty(Type::Enum(
                EnumType::builder()
                    .enum_repr(EnumRepr::U8)
                    .variants(&const {
                        [
                            Variant::builder().name("Ping").build(),
                            Variant::builder()
                                .name("Data")
                                .data(
                                    StructType::builder()
                                        .fields(&const {
                                            [Field::builder()
                                                .name("0")
                                                .shape(|| u32::SHAPE)
                                                .offset(4)
                                                .build()]
                                        })
                                        .build(),
                                )
                                .build(),
                        ]
                    })
                    .build(),
            ))
            .build()
    };
}

#[test]
fn payload_enum_is_rejected_everywhere() {
    let err = create_enum_instance::<Message>(Some("Ping")).unwrap_err();
    assert!(matches!(err, FactoryError::UnableToBuild { .. }));

    let err = create_instance::<Message>(None).unwrap_err();
    assert!(matches!(err, FactoryError::UnableToBuild { .. }));
}

#[test]
fn resolver_supplies_every_field() -> Result<()> {
    let resolver = |_field: &Field| Ok(OpaqueValue::new(7i32));
    let point: Point = create_instance(Some(&resolver))?;
    assert_eq!(point, Point { x: 7, y: 7 });
    Ok(())
}

#[test]
fn resolver_failure_propagates_verbatim() {
    let resolver = |field: &Field| -> Result<OpaqueValue, FactoryError> {
        Err(FactoryError::Resolver {
            field_name: field.name,
            message: "no value on hand".into(),
        })
    };
    let err = create_instance::<Point>(Some(&resolver)).unwrap_err();
    assert_eq!(
        err,
        FactoryError::Resolver {
            field_name: "x",
            message: "no value on hand".into(),
        }
    );
}

#[test]
fn resolver_wrong_shape_is_rejected() {
    let resolver = |_field: &Field| Ok(OpaqueValue::new(1u8));
    let err = create_instance::<Point>(Some(&resolver)).unwrap_err();
    assert_eq!(
        err,
        FactoryError::ShapeMismatch {
            expected: i32::SHAPE,
            actual: u8::SHAPE,
        }
    );
}

// Field-level defaults win over the field type's own default, and the
// resolver wins over both.
#[derive(Debug, PartialEq)]
struct Tuned {
    gain: u32,
}

unsafe impl Reflect for Tuned {
    const SHAPE: &'static Shape = &const {
        Shape::builder()
            .id(ConstTypeId::of::<Tuned>())
            .layout(Layout::new::<Tuned>())
            .type_identifier("Tuned")
            .vtable(&const {
                ValueVTable::builder()
                    .type_name(|f| core::write!(f, "Tuned"))
                    .debug(|ptr, f| core::fmt::Debug::fmt(unsafe { ptr.get::<Tuned>() }, f))
                    .eq(|left, right| unsafe { left.get::<Tuned>() == right.get::<Tuned>() })
                    .build()
            })
            .ty(Type::Struct(
                StructType::builder()
                    .fields(&const {
                        [Field::builder()
                            .name("gain")
                            .shape(|| u32::SHAPE)
                            .offset(core::mem::offset_of!(Tuned, gain))
                            .vtable(&const {
                                FieldVTable::builder()
                                    .default_fn(|target| unsafe { target.put(42u32) })
                                    .build()
                            })
                            .build()]
                    })
                    .build(),
            ))
            .build()
    };
}

#[test]
fn field_default_beats_type_default() -> Result<()> {
    let tuned: Tuned = create_instance(None)?;
    assert_eq!(tuned, Tuned { gain: 42 });
    Ok(())
}

#[test]
fn resolver_beats_field_default() -> Result<()> {
    let resolver = |_field: &Field| Ok(OpaqueValue::new(7u32));
    let tuned: Tuned = create_instance(Some(&resolver))?;
    assert_eq!(tuned, Tuned { gain: 7 });
    Ok(())
}

#[derive(Debug, PartialEq)]
struct Credentials {
    user_id: u32,
    pin: u32,
}

unsafe impl Reflect for Credentials {
    const SHAPE: &'static Shape = &const {
        Shape::builder()
            .id(ConstTypeId::of::<Credentials>())
            .layout(Layout::new::<Credentials>())
            .type_identifier("Credentials")
            .vtable(&const {
                ValueVTable::builder()
                    .type_name(|f| core::write!(f, "Credentials"))
                    .debug(|ptr, f| {
                        core::fmt::Debug::fmt(unsafe { ptr.get::<Credentials>() }, f)
                    })
                    .eq(|left, right| unsafe {
                        left.get::<Credentials>() == right.get::<Credentials>()
                    })
                    .build()
            })
            .ty(Type::Struct(
                StructType::builder()
                    .fields(&const {
                        [
                            Field::builder()
                                .name("user_id")
                                .shape(|| u32::SHAPE)
                                .offset(core::mem::offset_of!(Credentials, user_id))
                                .build(),
                            Field::builder()
                                .name("pin")
                                .shape(|| u32::SHAPE)
                                .offset(core::mem::offset_of!(Credentials, pin))
                                .flags(FieldFlags::SENSITIVE)
                                .build(),
                        ]
                    })
                    .build(),
            ))
            .build()
    };
}

#[test]
fn sensitive_fields_build_like_any_other() -> Result<()> {
    let creds: Credentials = create_instance(None)?;
    assert_eq!(creds, Credentials { user_id: 0, pin: 0 });

    let Type::Struct(ty) = Credentials::SHAPE.ty else {
        panic!("Credentials should classify as a struct");
    };
    assert!(!ty.fields[0].is_sensitive());
    assert!(ty.fields[1].is_sensitive());
    Ok(())
}

// A field whose registered shape is its own owner can never terminate;
// the in-flight stack has to catch it.
#[derive(Debug, PartialEq)]
struct Loopy {
    next: u64,
}

unsafe impl Reflect for Loopy {
    const SHAPE: &'static Shape = &const {
        Shape::builder()
            .id(ConstTypeId::of::<Loopy>())
            .layout(Layout::new::<Loopy>())
            .type_identifier("Loopy")
            .vtable(&const {
                ValueVTable::builder()
                    .type_name(|f| core::write!(f, "Loopy"))
                    .build()
            })
            .ty(Type::Struct(
                StructType::builder()
                    .fields(&const {
                        [Field::builder()
                            .name("next")
                            .shape(|| Loopy::SHAPE)
                            .offset(0)
                            .build()]
                    })
                    .build(),
            ))
            .build()
    };
}

#[test]
fn cyclic_types_are_refused() {
    let err = create_instance::<Loopy>(None).unwrap_err();
    assert_eq!(
        err,
        FactoryError::CyclicType {
            shape: Loopy::SHAPE,
        }
    );
}

// Metadata claiming a field outside the owner's layout must be refused
// before any write happens.
struct SkewedMarker;

static SKEWED: Shape = const {
    Shape::builder()
        .id(ConstTypeId::of::<SkewedMarker>())
        .layout(Layout::new::<u16>())
        .type_identifier("Skewed")
        .vtable(&const {
            ValueVTable::builder()
                .type_name(|f| core::write!(f, "Skewed"))
                .build()
        })
        .ty(Type::Struct(
            StructType::builder()
                .fields(&const {
                    [Field::builder()
                        .name("stray")
                        .shape(|| u16::SHAPE)
                        .offset(8)
                        .build()]
                })
                .build(),
        ))
        .build()
};

#[test]
fn out_of_bounds_field_is_refused() {
    let err = create_instance_of(&SKEWED, None).unwrap_err();
    assert_eq!(
        err,
        FactoryError::FieldOutOfBounds {
            shape: &SKEWED,
            field_name: "stray",
        }
    );
}

// An offset so large that adding the field size wraps around must fail
// the same bounds check, never slip past it.
struct WrappedMarker;

static WRAPPED: Shape = const {
    Shape::builder()
        .id(ConstTypeId::of::<WrappedMarker>())
        .layout(Layout::new::<u16>())
        .type_identifier("Wrapped")
        .vtable(&const {
            ValueVTable::builder()
                .type_name(|f| core::write!(f, "Wrapped"))
                .build()
        })
        .ty(Type::Struct(
            StructType::builder()
                .fields(&const {
                    [Field::builder()
                        .name("tail")
                        .shape(|| u16::SHAPE)
                        .offset(usize::MAX - 1)
                        .build()]
                })
                .build(),
        ))
        .build()
};

#[test]
fn overflowing_field_offset_is_refused() {
    let err = create_instance_of(&WRAPPED, None).unwrap_err();
    assert_eq!(
        err,
        FactoryError::FieldOutOfBounds {
            shape: &WRAPPED,
            field_name: "tail",
        }
    );
}

#[test]
fn object_body_fields_default_to_zero() -> Result<()> {
    let handle = create_instance_of(&SPRITE, None)?.into_object()?;
    assert_eq!(*handle.field::<u32>("x").unwrap(), 0);
    assert_eq!(*handle.field::<u32>("y").unwrap(), 0);
    assert_eq!(handle.strong_count(), 1);
    Ok(())
}

#[test]
fn object_fields_come_from_resolver() -> Result<()> {
    let resolver = |_field: &Field| Ok(OpaqueValue::new(9u32));
    let handle = create_instance_of(&SPRITE, Some(&resolver))?.into_object()?;
    assert_eq!(*handle.field::<u32>("x").unwrap(), 9);
    assert_eq!(*handle.field::<u32>("y").unwrap(), 9);
    Ok(())
}

#[test]
fn into_object_rejects_inline_values() -> Result<()> {
    let value = create_instance_of(Point::SHAPE, None)?;
    let err = value.into_object().unwrap_err();
    assert!(matches!(err, FactoryError::WasNotA { actual, .. } if actual.is_shape(Point::SHAPE)));
    Ok(())
}

struct FailingAllocator;

impl ObjectAllocator for FailingAllocator {
    fn allocate(&self, _shape: &'static Shape) -> Result<ObjUninit, AllocError> {
        Err(AllocError::Exhausted)
    }
}

#[test]
fn allocator_failure_is_reported() {
    let err = InstanceFactory::new(&FailingAllocator)
        .create(&SPRITE, None)
        .unwrap_err();
    assert_eq!(
        err,
        FactoryError::AllocationFailed {
            shape: &SPRITE,
            source: AllocError::Exhausted,
        }
    );
}

#[test]
fn object_allocation_aborts_cleanly_on_field_failure() {
    let resolver = |field: &Field| {
        if field.name == "y" {
            Err(FactoryError::Resolver {
                field_name: field.name,
                message: "boom".into(),
            })
        } else {
            Ok(OpaqueValue::new(3u32))
        }
    };
    let err = InstanceFactory::new(&HeapAllocator)
        .create(&SPRITE, Some(&resolver))
        .unwrap_err();
    assert!(matches!(err, FactoryError::Resolver { field_name: "y", .. }));
}

#[test]
fn erased_values_compare_and_debug_through_vtables() -> Result<()> {
    let first = create_instance_of(Point::SHAPE, None)?;
    let second = create_instance_of(Point::SHAPE, None)?;
    assert_eq!(first, second);
    assert_eq!(alloc::format!("{first:?}"), "Point { x: 0, y: 0 }");

    let other = create_instance_of(u64::SHAPE, None)?;
    assert_ne!(first, other);
    Ok(())
}

#[test]
fn materialize_checks_the_requested_type() -> Result<()> {
    let value = create_instance_of(Point::SHAPE, None)?;
    let err = value.materialize::<Direction>().unwrap_err();
    assert_eq!(
        err,
        FactoryError::ShapeMismatch {
            expected: Direction::SHAPE,
            actual: Point::SHAPE,
        }
    );
    Ok(())
}

#[test]
fn buffers_balance_after_failure() {
    let (acquired_before, released_before) = crate::buffer::counters::snapshot();

    let resolver = |field: &Field| {
        if field.name == "count" {
            Err(FactoryError::Resolver {
                field_name: field.name,
                message: "boom".into(),
            })
        } else {
            Ok(OpaqueValue::new(Point { x: 1, y: 2 }))
        }
    };
    create_instance::<Wrapper>(Some(&resolver)).unwrap_err();

    let (acquired_after, released_after) = crate::buffer::counters::snapshot();
    assert_eq!(
        acquired_after - acquired_before,
        released_after - released_before
    );
}

#[test]
fn buffers_balance_after_success() {
    let (acquired_before, released_before) = crate::buffer::counters::snapshot();
    let _wrapper: Wrapper = create_instance(None).unwrap();
    let (acquired_after, released_after) = crate::buffer::counters::snapshot();
    assert_eq!(
        acquired_after - acquired_before,
        released_after - released_before
    );
}
