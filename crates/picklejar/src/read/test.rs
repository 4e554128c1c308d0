use tracing_test::traced_test;

use super::*;
use crate::{from_bytes, from_stream, to_bytes};

fn assert_unpickling<T: std::fmt::Debug>(result: Result<T, PickleError>) {
    match result {
        Err(PickleError::Unpickling(_)) => {}
        other => panic!("expected an unpickling error, got {other:?}"),
    }
}

#[test]
fn back_reference_yields_the_earlier_value() {
    #[rustfmt::skip]
    let bytes = [
        0x22, 0x00, 0x00, 0x00, 0x03,
        0x0A, 0x00, 0x00, 0x01, 0x02,
        0x0A, 0x00, 0x00, 0x02, 0x04,
        0x0A, 0x00, 0x01, 0x01,
    ];

    assert_eq!(from_bytes::<Vec<i32>>(&bytes).unwrap(), [1, 2, 1]);
}

#[test]
fn truncated_after_fresh_discriminant() {
    assert_unpickling(from_bytes::<i32>(&[0x0A, 0x00, 0x00]));
}

#[test]
fn truncated_anywhere() {
    let bytes = to_bytes(&vec!["abc".to_string(), "de".to_string()]).unwrap();

    for len in 0..bytes.len() {
        assert_unpickling(from_bytes::<Vec<String>>(&bytes[..len]));
    }
}

#[test]
fn tag_of_another_type_is_unknown() {
    let bytes = to_bytes(&5i64).unwrap();

    match from_bytes::<i32>(&bytes) {
        Err(PickleError::UnknownTag { tag, .. }) => assert_eq!(tag, Tag::I64),
        other => panic!("expected an unknown tag, got {other:?}"),
    }
}

#[test]
fn invalid_discriminant() {
    assert_unpickling(from_bytes::<i32>(&[0x0A, 0x00, 0x07, 0x00, 0x02]));
}

#[test]
fn fresh_id_out_of_order() {
    assert_unpickling(from_bytes::<i32>(&[0x0A, 0x00, 0x00, 0x03, 0x02]));
}

#[test]
fn back_reference_to_unassigned_id() {
    #[rustfmt::skip]
    let bytes = [
        0x22, 0x00, 0x00, 0x00, 0x01,
        0x0A, 0x00, 0x01, 0x05,
    ];

    assert_unpickling(from_bytes::<Vec<i32>>(&bytes));
}

#[test]
fn back_reference_to_open_record() {
    // the inner vector refers to the outer one, which is still open
    #[rustfmt::skip]
    let bytes = [
        0x22, 0x00, 0x00, 0x00, 0x01,
        0x22, 0x00, 0x01, 0x00,
    ];

    let err = from_bytes::<Vec<Vec<i32>>>(&bytes).unwrap_err();
    assert!(err.to_string().contains("still being decoded"), "{err}");
}

#[test]
fn back_reference_of_another_type() {
    // `Vec<i32>` and `Vec<i64>` share a tag but not a type
    #[rustfmt::skip]
    let bytes = [
        0x26, 0x00, 0x00, 0x00,
        0x22, 0x00, 0x00, 0x01, 0x00,
        0x22, 0x00, 0x01, 0x01,
    ];

    let err = from_bytes::<(Vec<i32>, Vec<i64>)>(&bytes).unwrap_err();
    assert!(err.to_string().contains("does not hold"), "{err}");
}

#[test]
fn trailing_input() {
    let mut bytes = to_bytes(&5u8).unwrap();
    bytes.push(0x00);

    assert_unpickling(from_bytes::<u8>(&bytes));
}

#[test]
fn nesting_limit() {
    let value = vec![vec![vec![1u8]]];
    let bytes = to_bytes(&value).unwrap();

    let shallow = Configuration::builder().max_depth(3).build();
    assert_unpickling(shallow.from_bytes::<Vec<Vec<Vec<u8>>>>(&bytes));

    let deep_enough = Configuration::builder().max_depth(4).build();
    let back: Vec<Vec<Vec<u8>>> = deep_enough.from_bytes(&bytes).unwrap();
    assert_eq!(back, value);
}

#[test]
fn huge_length_prefix_fails_cleanly() {
    #[rustfmt::skip]
    let bytes = [
        0x22, 0x00, 0x00, 0x00,
        0xFF, 0xFF, 0xFF, 0xFF, 0x0F,
    ];

    assert_unpickling(from_bytes::<Vec<u64>>(&bytes));
}

#[test]
fn stream_leaves_the_rest_in_place() {
    let mut bytes = to_bytes(&"first".to_string()).unwrap();
    bytes.extend(to_bytes(&"second".to_string()).unwrap());

    let mut source = bytes.into_iter();
    let first: String = from_stream(source.by_ref()).unwrap();
    let second: String = from_stream(source.by_ref()).unwrap();

    assert_eq!(first, "first");
    assert_eq!(second, "second");
    assert_eq!(source.next(), None);
}

#[test]
fn manual_session() {
    let bytes = to_bytes(&vec![(), ()]).unwrap();
    let mut input = &bytes[..];

    let mut reader = ReadState::new(&mut input, Configuration::default());
    let value: Vec<()> = reader.unpickle().unwrap();

    assert_eq!(value, [(), ()]);
    assert_eq!(reader.records(), 2);
}

#[test]
#[traced_test]
fn failures_are_logged() {
    from_bytes::<i32>(&[0x0A, 0x00]).unwrap_err();

    assert!(logs_contain("unpickling failed"));
}
