//! Values survive every pair of entry points unchanged.

use std::{collections::BTreeMap, fmt::Debug, rc::Rc};

use picklejar::{
    Configuration, Pickle, from_bytes, from_channel, from_stream, from_string,
    to_buffer, to_bytes, to_channel, to_string,
};
use picklejar_integration_test::{
    Expr, Node, Point, Polygon, ladder, square, squares,
};

fn assert_roundtrip<T: Pickle + Debug>(value: &T) {
    let bytes = to_bytes(value).unwrap();
    assert_eq!(&from_bytes::<T>(&bytes).unwrap(), value);

    let text = to_string(value).unwrap();
    assert_eq!(&from_string::<T>(&text).unwrap(), value);

    let mut sink = Vec::new();
    to_channel(value, &mut sink).unwrap();
    assert_eq!(sink, bytes);
    assert_eq!(&from_channel::<T, _>(&sink[..]).unwrap(), value);

    assert_eq!(&from_stream::<T, _>(bytes.iter().copied()).unwrap(), value);

    let mut buffer = b"prefix".to_vec();
    to_buffer(value, &mut buffer).unwrap();
    assert_eq!(&buffer[..6], b"prefix");
    assert_eq!(&buffer[6..], &bytes[..]);
}

fn assert_idempotent<T: Pickle + Debug>(value: &T) {
    let bytes = to_bytes(value).unwrap();
    let decoded: T = from_bytes(&bytes).unwrap();

    assert_eq!(to_bytes(&decoded).unwrap(), bytes);
}

#[test]
fn expressions() {
    let x = Expr::var("x");
    let two = Expr::lit(2);
    let program = Expr::bind("y", &Expr::mul(&x, &two), &Expr::add(&x, &x));

    assert_roundtrip(&program);
    assert_roundtrip(&squares(6));
    assert_idempotent(&program);
    assert_idempotent(&squares(6));
}

#[test]
fn dumped_points() {
    assert_roundtrip(&Point { x: i32::MIN, y: i32::MAX });
    assert_roundtrip(&vec![Point { x: 1, y: 1 }; 5]);
}

#[test]
fn polygons() {
    let shapes = vec![square("a", 1), square("b", 2), square("a", 1)];

    assert_roundtrip(&shapes);
    assert_idempotent(&shapes);
}

#[test]
fn graphs() {
    assert_roundtrip(&ladder(8));
    assert_idempotent(&ladder(8));

    let leaf = Rc::new(Node { label: "leaf".to_string(), children: vec![] });
    assert_roundtrip(&Node {
        label: "root".to_string(),
        children: vec![leaf.clone(), leaf],
    });
}

#[test]
fn mixed_containers() {
    let mut index = BTreeMap::new();
    index.insert("unit".to_string(), (square("unit", 1), Some(Expr::lit(1))));
    index.insert("none".to_string(), (square("none", 0), None));

    assert_roundtrip(&index);
    assert_idempotent(&index);
}

#[test]
fn without_sharing() {
    let config = Configuration::builder().sharing(false).build();
    let value = vec![square("same", 3), square("same", 3)];

    let bytes = config.to_bytes(&value).unwrap();
    assert_eq!(config.from_bytes::<Vec<Polygon>>(&bytes).unwrap(), value);

    // a sharing decoder reads unshared input unchanged
    assert_eq!(from_bytes::<Vec<Polygon>>(&bytes).unwrap(), value);
}
