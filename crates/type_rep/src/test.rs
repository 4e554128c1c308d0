use std::collections::HashSet;

use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Meters(f64);

#[derive(Debug, Clone, PartialEq)]
struct Seconds(f64);

typeable!(Meters, Seconds);

#[test]
fn same_type_same_rep() {
    assert_eq!(TypeRep::of::<Meters>(), TypeRep::of::<Meters>());
    assert_eq!(Meters::type_rep(), TypeRep::of::<Meters>());
    assert_eq!(
        TypeRep::of::<Meters>().cmp(&TypeRep::of::<Meters>()),
        Ordering::Equal
    );
}

#[test]
fn distinct_types_never_collide() {
    let reps = [
        TypeRep::of::<Meters>(),
        TypeRep::of::<Seconds>(),
        TypeRep::of::<f64>(),
        TypeRep::of::<Vec<f64>>(),
        TypeRep::of::<Vec<Meters>>(),
        TypeRep::of::<(f64, f64)>(),
    ];

    let unique: HashSet<_> = reps.iter().copied().collect();
    assert_eq!(unique.len(), reps.len());

    let mut sorted = reps.to_vec();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), reps.len());
}

#[test]
fn registration_is_consistent_across_threads() {
    struct Fresh;

    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(TypeRep::of::<Fresh>))
        .collect();

    let reps: HashSet<_> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(reps.len(), 1);
    assert!(TypeRep::registered_count() >= 1);
}

#[test]
fn name_is_diagnostic_only() {
    let rep = TypeRep::of::<Meters>();
    assert!(rep.name().ends_with("Meters"));
    assert_eq!(rep.to_string(), rep.name());
}

#[test]
fn cast_returns_wrapped_value() {
    let dynamic = Meters(1.5).make_dynamic();

    assert!(Meters::has_type(&dynamic));
    assert!(!Seconds::has_type(&dynamic));
    assert_eq!(Meters::cast_ref(&dynamic), Some(&Meters(1.5)));
    assert_eq!(Meters::cast(dynamic), Some(Meters(1.5)));
}

#[test]
fn cast_at_wrong_type_is_absent() {
    let dynamic = Dynamic::new(Meters(2.0));

    assert_eq!(Seconds::cast_ref(&dynamic), None);
    assert_eq!(Seconds::cast(dynamic), None);
}

#[test]
fn throwing_cast_reports_both_types() {
    let dynamic = Dynamic::new(Meters(2.0));

    let failure = Seconds::throwing_cast(dynamic).unwrap_err();
    assert_eq!(failure.expected, TypeRep::of::<Seconds>());
    assert_eq!(failure.found, TypeRep::of::<Meters>());

    let message = failure.to_string();
    assert!(message.contains("Seconds"), "{message}");
    assert!(message.contains("Meters"), "{message}");
}

#[test]
fn try_cast_hands_the_value_back() {
    let dynamic = Dynamic::new(vec![1u8, 2, 3]);

    let dynamic = dynamic.try_cast::<Vec<u16>>().unwrap_err();
    assert_eq!(dynamic.type_rep(), TypeRep::of::<Vec<u8>>());

    assert_eq!(dynamic.try_cast::<Vec<u8>>().unwrap(), vec![1, 2, 3]);
}

#[test]
fn generic_instances_are_distinct() {
    let dynamic = Some(Meters(0.0)).make_dynamic();

    assert!(Option::<Meters>::has_type(&dynamic));
    assert!(!Option::<Seconds>::has_type(&dynamic));
    assert!(!Meters::has_type(&dynamic));
}

#[test]
fn debug_names_the_payload_type() {
    let rendered = format!("{:?}", Dynamic::new(7u32));
    assert!(rendered.contains("u32"), "{rendered}");
}
