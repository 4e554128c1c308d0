//! Type-erased values: casts and registry dispatch.

use std::rc::Rc;

use picklejar::{
    Dynamic, PickleError, PickleVTable, Tag, TypeRep, Typeable, to_bytes,
};
use picklejar_integration_test::{
    Expr, Node, Point, Polygon, ladder, registry, square,
};

#[test]
fn cast_of_own_type_succeeds() {
    let point = Point { x: 1, y: 2 };

    assert_eq!(Point::cast(point.make_dynamic()), Some(point));
    assert_eq!(Point::throwing_cast(Dynamic::new(point)).unwrap(), point);
    assert!(Point::has_type(&point.make_dynamic()));
}

#[test]
fn cast_of_other_type_fails() {
    let dynamic = square("s", 1).make_dynamic();

    assert!(!Point::has_type(&dynamic));
    assert!(Point::cast_ref(&dynamic).is_none());

    let failure = Point::throwing_cast(dynamic).unwrap_err();
    assert_eq!(failure.expected, TypeRep::of::<Point>());
    assert_eq!(failure.found, TypeRep::of::<Polygon>());
    assert!(failure.to_string().contains("Polygon"), "{failure}");
}

#[test]
fn registry_dispatches_on_the_leading_tag() {
    let registry = registry().unwrap();

    let inputs = [
        to_bytes(&square("s", 2)).unwrap(),
        to_bytes(&Point { x: 5, y: 6 }).unwrap(),
        to_bytes(&ladder(3)).unwrap(),
        to_bytes(&-1i64).unwrap(),
    ];

    let decoded: Vec<Dynamic> = inputs
        .iter()
        .map(|bytes| registry.from_bytes(bytes).unwrap())
        .collect();

    assert!(Polygon::has_type(&decoded[0]));
    assert!(Point::has_type(&decoded[1]));
    assert!(Rc::<Node>::has_type(&decoded[2]));
    assert!(i64::has_type(&decoded[3]));
}

#[test]
fn registry_output_matches_static_output() {
    let registry = registry().unwrap();
    let program = Expr::add(&Expr::lit(2), &Expr::lit(2));

    let dynamic = Expr::clone(&program).make_dynamic();
    let bytes = registry.to_bytes(&dynamic).unwrap();
    assert_eq!(bytes, to_bytes(&*program).unwrap());

    let back = registry.from_bytes(&bytes).unwrap();
    assert!(registry.dynamic_eq(&back, &dynamic).unwrap());
    assert_eq!(Expr::cast(back).as_ref(), Some(&*program));
}

#[test]
fn unregistered_types_are_reported() {
    let registry = registry().unwrap();

    let bytes = vec![1u8];

    let err = registry.to_bytes(&bytes.clone().make_dynamic()).unwrap_err();
    assert!(matches!(
        err,
        PickleError::Unregistered(name) if name.contains("Vec")
    ));

    let err = registry.from_bytes(&to_bytes(&bytes).unwrap()).unwrap_err();
    assert!(matches!(
        err,
        PickleError::UnknownTag { tag, .. } if tag == Tag::VEC
    ));
}

#[test]
fn conflicting_tags_are_rejected() {
    #[derive(Debug, Clone, PartialEq)]
    struct Impostor;

    picklejar::typeable!(Impostor);

    impl picklejar::Pickle for Impostor {
        const TAG: Tag = Tag::user(3);

        fn pickle_fields<'v>(
            &'v self,
            _: &mut picklejar::WriteState<'v>,
        ) -> Result<(), PickleError> {
            Ok(())
        }

        fn unpickle_fields(
            _: &mut picklejar::ReadState<'_>,
        ) -> Result<Self, PickleError> {
            Ok(Self)
        }
    }

    let mut registry = registry().unwrap();
    let err = registry
        .register_vtable(PickleVTable::of::<Impostor>())
        .unwrap_err();

    match err {
        PickleError::TagConflict { tag, existing, rejected } => {
            assert_eq!(tag, Tag::user(3));
            assert!(existing.ends_with("Polygon"), "{existing}");
            assert!(rejected.ends_with("Impostor"), "{rejected}");
        }
        other => panic!("expected a tag conflict, got {other:?}"),
    }
}
