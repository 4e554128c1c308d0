//! Shared fixtures for the picklejar integration tests.
//!
//! Every type here carries a hand-assigned user tag, the way an application
//! would declare its own picklable types.

#![allow(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

use std::rc::Rc;

use picklejar::{
    Decoder, Dump, DumpFailure, Encoder, Pickle, PickleError, ReadState,
    Registry, Tag, WriteState, pickle_from_dump, typeable,
};

// ============================================================================
// Expressions
// ============================================================================

/// A small expression language whose subtrees are reference counted, so a
/// program can reuse a subexpression without copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Lit(i64),
    Var(String),
    Add(Rc<Expr>, Rc<Expr>),
    Mul(Rc<Expr>, Rc<Expr>),
    Let { name: String, bound: Rc<Expr>, body: Rc<Expr> },
}

typeable!(Expr);

impl Expr {
    pub fn lit(value: i64) -> Rc<Self> { Rc::new(Self::Lit(value)) }

    pub fn var(name: &str) -> Rc<Self> {
        Rc::new(Self::Var(name.to_string()))
    }

    pub fn add(lhs: &Rc<Self>, rhs: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self::Add(Rc::clone(lhs), Rc::clone(rhs)))
    }

    pub fn mul(lhs: &Rc<Self>, rhs: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self::Mul(Rc::clone(lhs), Rc::clone(rhs)))
    }

    pub fn bind(name: &str, bound: &Rc<Self>, body: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self::Let {
            name: name.to_string(),
            bound: Rc::clone(bound),
            body: Rc::clone(body),
        })
    }

    /// Counts nodes as if no subexpression were shared.
    pub fn tree_size(&self) -> usize {
        match self {
            Self::Lit(_) | Self::Var(_) => 1,
            Self::Add(lhs, rhs) | Self::Mul(lhs, rhs) => {
                1 + lhs.tree_size() + rhs.tree_size()
            }
            Self::Let { bound, body, .. } => {
                1 + bound.tree_size() + body.tree_size()
            }
        }
    }
}

impl Pickle for Expr {
    const TAG: Tag = Tag::user(1);

    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError> {
        match self {
            Self::Lit(value) => {
                writer.dump(&0u8)?;
                writer.pickle(value)?;
            }
            Self::Var(name) => {
                writer.dump(&1u8)?;
                writer.pickle(name)?;
            }
            Self::Add(lhs, rhs) => {
                writer.dump(&2u8)?;
                writer.pickle(lhs)?;
                writer.pickle(rhs)?;
            }
            Self::Mul(lhs, rhs) => {
                writer.dump(&3u8)?;
                writer.pickle(lhs)?;
                writer.pickle(rhs)?;
            }
            Self::Let { name, bound, body } => {
                writer.dump(&4u8)?;
                writer.pickle(name)?;
                writer.pickle(bound)?;
                writer.pickle(body)?;
            }
        }
        Ok(())
    }

    fn unpickle_fields(
        reader: &mut ReadState<'_>,
    ) -> Result<Self, PickleError> {
        match reader.undump::<u8>()? {
            0 => Ok(Self::Lit(reader.unpickle()?)),
            1 => Ok(Self::Var(reader.unpickle()?)),
            2 => Ok(Self::Add(reader.unpickle()?, reader.unpickle()?)),
            3 => Ok(Self::Mul(reader.unpickle()?, reader.unpickle()?)),
            4 => Ok(Self::Let {
                name: reader.unpickle()?,
                bound: reader.unpickle()?,
                body: reader.unpickle()?,
            }),
            other => Err(PickleError::unpickling(format!(
                "invalid `Expr` variant {other}"
            ))),
        }
    }
}

/// `(x + 1) * (x + 1)` nested `depth` times, with each level reusing the
/// level below for both operands.
pub fn squares(depth: usize) -> Rc<Expr> {
    let mut expr = Expr::add(&Expr::var("x"), &Expr::lit(1));
    for _ in 0..depth {
        expr = Expr::mul(&expr, &expr);
    }
    expr
}

// ============================================================================
// Geometry
// ============================================================================

/// A plain value type lifted from its `Dump` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Dump for Point {
    fn dump<E: Encoder + ?Sized>(
        &self,
        encoder: &mut E,
    ) -> Result<(), DumpFailure> {
        self.x.dump(encoder)?;
        self.y.dump(encoder)
    }

    fn undump<D: Decoder + ?Sized>(
        decoder: &mut D,
    ) -> Result<Self, DumpFailure> {
        Ok(Self { x: decoder.undump()?, y: decoder.undump()? })
    }
}

typeable!(Point);
pickle_from_dump!(Point => Tag::user(2));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    pub name: String,
    pub vertices: Vec<Point>,
}

typeable!(Polygon);

impl Pickle for Polygon {
    const TAG: Tag = Tag::user(3);

    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError> {
        writer.pickle(&self.name)?;
        writer.pickle(&self.vertices)?;
        Ok(())
    }

    fn unpickle_fields(
        reader: &mut ReadState<'_>,
    ) -> Result<Self, PickleError> {
        Ok(Self { name: reader.unpickle()?, vertices: reader.unpickle()? })
    }
}

pub fn square(name: &str, side: i32) -> Polygon {
    Polygon {
        name: name.to_string(),
        vertices: vec![
            Point { x: 0, y: 0 },
            Point { x: side, y: 0 },
            Point { x: side, y: side },
            Point { x: 0, y: side },
        ],
    }
}

// ============================================================================
// Graphs
// ============================================================================

/// A node of a directed acyclic graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub label: String,
    pub children: Vec<Rc<Node>>,
}

typeable!(Node);

impl Pickle for Node {
    const TAG: Tag = Tag::user(4);

    fn pickle_fields<'v>(
        &'v self,
        writer: &mut WriteState<'v>,
    ) -> Result<(), PickleError> {
        writer.pickle(&self.label)?;
        writer.pickle(&self.children)?;
        Ok(())
    }

    fn unpickle_fields(
        reader: &mut ReadState<'_>,
    ) -> Result<Self, PickleError> {
        Ok(Self { label: reader.unpickle()?, children: reader.unpickle()? })
    }
}

/// A graph of `depth + 1` nodes in which every node points twice at the
/// node below. Unfolded into a tree it has `2^(depth + 1) - 1` nodes.
pub fn ladder(depth: usize) -> Rc<Node> {
    let mut node =
        Rc::new(Node { label: "rung 0".to_string(), children: Vec::new() });
    for rung in 1..=depth {
        node = Rc::new(Node {
            label: format!("rung {rung}"),
            children: vec![Rc::clone(&node), Rc::clone(&node)],
        });
    }
    node
}

/// Registers every fixture type, plus the wrappers the tests use.
pub fn registry() -> Result<Registry, PickleError> {
    let mut registry = Registry::new();
    registry.register::<Expr>()?;
    registry.register::<Point>()?;
    registry.register::<Polygon>()?;
    registry.register::<Node>()?;
    registry.register::<Rc<Node>>()?;
    registry.register::<i64>()?;
    registry.register::<String>()?;
    Ok(registry)
}
