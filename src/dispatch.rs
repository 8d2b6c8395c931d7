//! Builds numeric trees from dynamically typed values.
//!
//! A host environment hands over loosely typed sequences. The element kind of
//! the first entry picks the `i64` or `f64` specialization, so every combine
//! afterwards runs through a statically dispatched [`CombineOp`].

use crate::combine::{CombineOp, Max, Min, Sum};
use crate::error::Error;
use crate::segtree::SegTree;
use log::debug;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Loosely typed element as received from a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }

    fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            Self::Int(_) => Some(NumericKind::Int),
            Self::Float(_) => Some(NumericKind::Float),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int,
    Float,
}

impl NumericKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

/// The named aggregates with a canonical identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Min,
    Max,
    Sum,
}

impl Aggregate {
    pub const VARIANTS: &'static [&'static str] = &["min", "max", "sum"];
}

impl Display for Aggregate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
        };
        f.write_str(name)
    }
}

impl FromStr for Aggregate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            _ => Err(format!("unknown aggregate '{}'", s)),
        }
    }
}

/// Numeric tree whose element kind was chosen at runtime.
#[derive(Debug, Clone)]
pub enum NumericTree {
    IntMin(SegTree<Min<i64>>),
    IntMax(SegTree<Max<i64>>),
    IntSum(SegTree<Sum<i64>>),
    FloatMin(SegTree<Min<f64>>),
    FloatMax(SegTree<Max<f64>>),
    FloatSum(SegTree<Sum<f64>>),
}

/// Forwards `$body` to the tree inside each variant, binding it to `$tree`.
macro_rules! with_tree {
    ($self:expr, $tree:ident => $body:expr) => {
        match $self {
            NumericTree::IntMin($tree) => $body,
            NumericTree::IntMax($tree) => $body,
            NumericTree::IntSum($tree) => $body,
            NumericTree::FloatMin($tree) => $body,
            NumericTree::FloatMax($tree) => $body,
            NumericTree::FloatSum($tree) => $body,
        }
    };
}

fn unwrap_int(index: usize, value: &Value) -> Result<i64, Error> {
    match value {
        Value::Int(x) => Ok(*x),
        other => Err(Error::MixedTypes {
            index,
            expected: NumericKind::Int.name(),
            found: other.type_name(),
        }),
    }
}

/// Ints widen to floats; the reverse is a type error.
fn unwrap_float(index: usize, value: &Value) -> Result<f64, Error> {
    match value {
        Value::Float(x) => Ok(*x),
        Value::Int(x) => Ok(*x as f64),
        other => Err(Error::MixedTypes {
            index,
            expected: NumericKind::Float.name(),
            found: other.type_name(),
        }),
    }
}

fn collect_as<T>(
    values: &[Value],
    unwrap: fn(usize, &Value) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| unwrap(index, value))
        .collect()
}

fn build_static<O: CombineOp>(
    values: &[Value],
    identity: Option<&Value>,
    op: O,
    unwrap: fn(usize, &Value) -> Result<O::Item, Error>,
) -> Result<SegTree<O>, Error> {
    let items = collect_as(values, unwrap)?;
    // An identity override is reported at index `len`, one past the elements.
    let identity = identity
        .map(|value| unwrap(values.len(), value))
        .transpose()?;
    SegTree::new(items, op, identity)
}

impl NumericTree {
    /// Builds a tree for `aggregate`, picking the element kind from the first
    /// value.
    ///
    /// Every value, and the identity override if given, must share that
    /// kind, except that ints are widened when the kind is float. The
    /// override is not checked against the identity law.
    pub fn build(
        aggregate: Aggregate,
        values: &[Value],
        identity: Option<Value>,
    ) -> Result<Self, Error> {
        let first = values.first().ok_or(Error::EmptyInput)?;
        let kind = first.numeric_kind().ok_or(Error::UnsupportedType {
            found: first.type_name(),
        })?;
        debug!(
            "Selected {} {} tree for {} elements",
            kind.name(),
            aggregate,
            values.len()
        );

        let identity = identity.as_ref();
        let tree = match (kind, aggregate) {
            (NumericKind::Int, Aggregate::Min) => {
                Self::IntMin(build_static(values, identity, Min::default(), unwrap_int)?)
            }
            (NumericKind::Int, Aggregate::Max) => {
                Self::IntMax(build_static(values, identity, Max::default(), unwrap_int)?)
            }
            (NumericKind::Int, Aggregate::Sum) => {
                Self::IntSum(build_static(values, identity, Sum::default(), unwrap_int)?)
            }
            (NumericKind::Float, Aggregate::Min) => {
                Self::FloatMin(build_static(values, identity, Min::default(), unwrap_float)?)
            }
            (NumericKind::Float, Aggregate::Max) => {
                Self::FloatMax(build_static(values, identity, Max::default(), unwrap_float)?)
            }
            (NumericKind::Float, Aggregate::Sum) => {
                Self::FloatSum(build_static(values, identity, Sum::default(), unwrap_float)?)
            }
        };
        Ok(tree)
    }

    pub fn min(values: &[Value], identity: Option<Value>) -> Result<Self, Error> {
        Self::build(Aggregate::Min, values, identity)
    }

    pub fn max(values: &[Value], identity: Option<Value>) -> Result<Self, Error> {
        Self::build(Aggregate::Max, values, identity)
    }

    pub fn sum(values: &[Value], identity: Option<Value>) -> Result<Self, Error> {
        Self::build(Aggregate::Sum, values, identity)
    }

    pub fn kind(&self) -> NumericKind {
        match self {
            Self::IntMin(_) | Self::IntMax(_) | Self::IntSum(_) => NumericKind::Int,
            Self::FloatMin(_) | Self::FloatMax(_) | Self::FloatSum(_) => NumericKind::Float,
        }
    }

    pub fn aggregate(&self) -> Aggregate {
        match self {
            Self::IntMin(_) | Self::FloatMin(_) => Aggregate::Min,
            Self::IntMax(_) | Self::FloatMax(_) => Aggregate::Max,
            Self::IntSum(_) | Self::FloatSum(_) => Aggregate::Sum,
        }
    }

    pub fn len(&self) -> usize {
        with_tree!(self, tree => tree.len())
    }

    pub fn is_empty(&self) -> bool {
        with_tree!(self, tree => tree.is_empty())
    }

    /// Overwrites the element at `index`. The value must match the tree's
    /// element kind; ints are widened for float trees.
    pub fn update(&mut self, index: usize, value: Value) -> Result<(), Error> {
        match self {
            Self::IntMin(tree) => tree.update(index, unwrap_int(index, &value)?),
            Self::IntMax(tree) => tree.update(index, unwrap_int(index, &value)?),
            Self::IntSum(tree) => tree.update(index, unwrap_int(index, &value)?),
            Self::FloatMin(tree) => tree.update(index, unwrap_float(index, &value)?),
            Self::FloatMax(tree) => tree.update(index, unwrap_float(index, &value)?),
            Self::FloatSum(tree) => tree.update(index, unwrap_float(index, &value)?),
        }
    }

    pub fn query(&self, left: usize, right: usize) -> Result<Value, Error> {
        with_tree!(self, tree => tree.query(left, right).map(Value::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::from).collect()
    }

    #[test]
    fn picks_int_specialization() {
        let mut tree = NumericTree::sum(&ints(&[5, 3, 8, 1]), None).unwrap();
        assert_eq!(tree.kind(), NumericKind::Int);
        assert_eq!(tree.aggregate(), Aggregate::Sum);
        assert_eq!(tree.query(0, 4), Ok(Value::Int(17)));
        tree.update(2, Value::Int(10)).unwrap();
        assert_eq!(tree.query(0, 4), Ok(Value::Int(19)));
        assert_eq!(tree.query(1, 3), Ok(Value::Int(13)));
    }

    #[test]
    fn picks_float_specialization() {
        let values: Vec<Value> = vec![2.5.into(), (-1.0).into(), 4.0.into()];
        let tree = NumericTree::min(&values, None).unwrap();
        assert_eq!(tree.kind(), NumericKind::Float);
        assert_eq!(tree.query(0, 3), Ok(Value::Float(-1.0)));
        assert_eq!(tree.query(2, 2), Ok(Value::Float(f64::INFINITY)));
    }

    #[test]
    fn canonical_int_identities() {
        let values = ints(&[1, 2]);
        let min = NumericTree::min(&values, None).unwrap();
        let max = NumericTree::max(&values, None).unwrap();
        assert_eq!(min.query(1, 1), Ok(Value::Int(i64::MAX)));
        assert_eq!(max.query(0, 0), Ok(Value::Int(i64::MIN)));
    }

    #[test]
    fn identity_override() {
        let tree = NumericTree::max(&ints(&[1, 2]), Some(Value::Int(-10))).unwrap();
        assert_eq!(tree.query(0, 0), Ok(Value::Int(-10)));

        let err = NumericTree::max(&ints(&[1, 2]), Some(Value::Float(0.0))).unwrap_err();
        assert_eq!(
            err,
            Error::MixedTypes {
                index: 2,
                expected: "int",
                found: "float"
            }
        );
    }

    #[test]
    fn rejects_empty_and_non_numeric() {
        let err = NumericTree::min(&[], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = NumericTree::min(&[Value::from("a"), Value::from("b")], None).unwrap_err();
        assert_eq!(err, Error::UnsupportedType { found: "text" });
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = NumericTree::sum(&[Value::from(true)], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn rejects_mixed_sequences() {
        let values = vec![Value::Int(1), Value::Float(2.0), Value::Int(3)];
        let err = NumericTree::sum(&values, None).unwrap_err();
        assert_eq!(
            err,
            Error::MixedTypes {
                index: 1,
                expected: "int",
                found: "float"
            }
        );
    }

    #[test]
    fn update_checks_kind_and_range() {
        let mut tree = NumericTree::sum(&ints(&[1, 2, 3]), None).unwrap();
        assert_eq!(
            tree.update(0, Value::Float(1.0)).unwrap_err().kind(),
            ErrorKind::Type
        );
        assert_eq!(
            tree.update(3, Value::Int(1)).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(tree.query(0, 3), Ok(Value::Int(6)));
    }

    #[test]
    fn float_trees_widen_ints() {
        let values = vec![Value::Float(1.5), Value::Float(2.5)];
        let tree = NumericTree::sum(&values, Some(Value::Int(0))).unwrap();
        assert_eq!(tree.kind(), NumericKind::Float);
        assert_eq!(tree.query(0, 0), Ok(Value::Float(0.0)));
        assert_eq!(tree.query(0, 2), Ok(Value::Float(4.0)));

        let mut tree = NumericTree::sum(&[Value::Float(1.5), Value::Int(2)], None).unwrap();
        assert_eq!(tree.query(0, 2), Ok(Value::Float(3.5)));
        tree.update(0, Value::Int(5)).unwrap();
        assert_eq!(tree.query(0, 1), Ok(Value::Float(5.0)));
        assert_eq!(tree.query(0, 2), Ok(Value::Float(7.0)));
    }

    #[test]
    fn int_trees_reject_floats() {
        let mut tree = NumericTree::min(&[Value::Int(4), Value::Int(2)], None).unwrap();
        assert_eq!(
            tree.update(1, Value::Float(1.0)),
            Err(Error::MixedTypes {
                index: 1,
                expected: "int",
                found: "float"
            })
        );
        assert_eq!(tree.query(0, 2), Ok(Value::Int(2)));
        let err = NumericTree::min(&[Value::Int(4), Value::Float(2.0)], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn parses_aggregates() {
        assert_eq!("MIN".parse::<Aggregate>(), Ok(Aggregate::Min));
        assert_eq!("sum".parse::<Aggregate>(), Ok(Aggregate::Sum));
        assert!("avg".parse::<Aggregate>().is_err());
        assert_eq!(Aggregate::Max.to_string(), "max");
    }
}
