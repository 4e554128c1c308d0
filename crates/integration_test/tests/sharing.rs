//! Equal substructure is written once and decodes to shared values.

use std::rc::Rc;

use picklejar::{Configuration, from_bytes, to_bytes};
use picklejar_integration_test::{
    Expr, Node, Polygon, ladder, square, squares,
};
use tracing_test::traced_test;

#[test]
fn integer_list_scenario() {
    let bytes = to_bytes(&vec![1i32, 2, 1]).unwrap();

    #[rustfmt::skip]
    let expected = [
        0x22, 0x00, 0x00, 0x00, 0x03, // list, fresh #0, length 3
        0x0A, 0x00, 0x00, 0x01, 0x02, // 1, fresh #1
        0x0A, 0x00, 0x00, 0x02, 0x04, // 2, fresh #2
        0x0A, 0x00, 0x01, 0x01,       // back-reference to #1
    ];
    assert_eq!(bytes, expected);
    assert_eq!(from_bytes::<Vec<i32>>(&bytes).unwrap(), [1, 2, 1]);
}

#[test]
fn repeated_substructure_costs_one_back_reference() {
    let shape = square("tile", 4);

    let alone = to_bytes(&shape).unwrap();
    let twice = to_bytes(&(shape.clone(), shape.clone())).unwrap();

    // pair header, one full encoding, one four-byte back-reference
    assert_eq!(twice.len(), 4 + alone.len() + 4);

    let (first, second): (Polygon, Polygon) = from_bytes(&twice).unwrap();
    assert_eq!(first, shape);
    assert_eq!(second, shape);
}

#[test]
fn separately_allocated_equal_values_are_shared() {
    let left = Expr::add(&Expr::var("x"), &Expr::lit(1));
    let right = Expr::add(&Expr::var("x"), &Expr::lit(1));
    assert!(!Rc::ptr_eq(&left, &right));

    let program = Expr::mul(&left, &right);
    let decoded: Rc<Expr> = from_bytes(&to_bytes(&program).unwrap()).unwrap();

    let Expr::Mul(lhs, rhs) = &*decoded else {
        panic!("expected a product, got {decoded:?}");
    };
    assert!(Rc::ptr_eq(lhs, rhs));
}

#[test]
fn dag_stays_linear() {
    let depth = 24;
    let graph = ladder(depth);

    let bytes = to_bytes(&graph).unwrap();
    assert!(bytes.len() < 64 * (depth + 1), "{} bytes", bytes.len());

    let decoded: Rc<Node> = from_bytes(&bytes).unwrap();
    let mut node = &decoded;
    for _ in 0..depth {
        assert!(Rc::ptr_eq(&node.children[0], &node.children[1]));
        node = &node.children[0];
    }
    assert!(node.children.is_empty());
}

#[test]
fn exponential_tree_stays_linear() {
    let expr = squares(20);
    assert_eq!(expr.tree_size(), 3 * (1 << 20) + (1 << 20) - 1);

    let bytes = to_bytes(&expr).unwrap();
    assert!(bytes.len() < 2048, "{} bytes", bytes.len());

    let decoded: Rc<Expr> = from_bytes(&bytes).unwrap();
    assert_eq!(decoded, expr);
}

#[test]
fn disabling_sharing_unfolds_the_graph() {
    let graph = ladder(6);
    let config = Configuration::builder().sharing(false).build();

    let shared = to_bytes(&graph).unwrap();
    let unshared = config.to_bytes(&graph).unwrap();
    assert!(unshared.len() > 4 * shared.len());

    let decoded: Rc<Node> = config.from_bytes(&unshared).unwrap();
    assert_eq!(decoded, graph);
    assert!(!Rc::ptr_eq(&decoded.children[0], &decoded.children[1]));
}

#[test]
#[traced_test]
fn session_summary_is_logged() {
    to_bytes(&vec![square("s", 1), square("s", 1)]).unwrap();

    assert!(logs_contain("back-reference"));
    assert!(logs_contain("pickling session finished"));
}
