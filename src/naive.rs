use crate::combine::CombineOp;
use crate::error::Error;
use crate::segtree::SegTree;
use derivative::Derivative;
use std::fmt::Debug;

/// Point updates and half-open range folds over a fixed-size sequence.
pub trait RangeFold {
    type Item;

    fn update(&mut self, index: usize, value: Self::Item) -> Result<(), Error>;

    fn query(&self, left: usize, right: usize) -> Result<Self::Item, Error>;
}

impl<O: CombineOp> RangeFold for SegTree<O> {
    type Item = O::Item;

    fn update(&mut self, index: usize, value: O::Item) -> Result<(), Error> {
        SegTree::update(self, index, value)
    }

    fn query(&self, left: usize, right: usize) -> Result<O::Item, Error> {
        SegTree::query(self, left, right)
    }
}

/// Unaccelerated counterpart of [`SegTree`] that rescans the range on every
/// query. Serves as an oracle.
#[derive(Derivative)]
#[derivative(Debug(bound = "O: Debug, O::Item: Debug"))]
pub struct NaiveFold<O: CombineOp> {
    values: Vec<O::Item>,
    identity: O::Item,
    op: O,
}

impl<O: CombineOp> NaiveFold<O> {
    /// Validates like [`SegTree::new`].
    pub fn new(values: Vec<O::Item>, op: O, identity: Option<O::Item>) -> Result<Self, Error> {
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }
        let identity = identity
            .or_else(|| op.identity())
            .ok_or(Error::MissingIdentity)?;
        Ok(Self {
            values,
            identity,
            op,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<O: CombineOp> RangeFold for NaiveFold<O> {
    type Item = O::Item;

    fn update(&mut self, index: usize, value: O::Item) -> Result<(), Error> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    fn query(&self, left: usize, right: usize) -> Result<O::Item, Error> {
        let len = self.values.len();
        if left > right || right > len {
            return Err(Error::RangeOutOfBounds { left, right, len });
        }
        Ok(self.values[left..right]
            .iter()
            .fold(self.identity.clone(), |acc, item| self.op.combine(&acc, item)))
    }
}
