use crate::combine::{CombineOp, Dynamic, Max, Min, Numeric, Sum};
use crate::error::Error;
use derivative::Derivative;
use log::debug;
use std::fmt::Debug;

/// Fixed-size sequence supporting point updates and range folds in
/// O(log n).
///
/// The tree is stored in a single array of length `2 * len`. Entries
/// `len..2 * len` are the leaves, i.e. the current elements in order. Entry
/// `i` in `1..len` caches `combine(data[2 * i], data[2 * i + 1])`, and entry
/// 0 is unused. This layout works for any `len`, not just powers of two.
///
/// Range queries preserve element order, so `combine` only has to be
/// associative.
#[derive(Derivative)]
#[derivative(Debug(bound = "O: Debug, O::Item: Debug"))]
#[derivative(Clone(bound = "O: Clone"))]
pub struct SegTree<O: CombineOp> {
    len: usize,
    data: Vec<O::Item>,
    identity: O::Item,
    op: O,
}

fn left_child(index: usize) -> usize {
    2 * index
}

fn right_child(index: usize) -> usize {
    2 * index + 1
}

fn parent(index: usize) -> usize {
    index / 2
}

impl<O: CombineOp> SegTree<O> {
    /// Builds a tree over `values` folding with `op`.
    ///
    /// An explicit `identity` is trusted as-is. Without one, the operation's
    /// canonical identity is used, and operations without one are rejected.
    pub fn new(values: Vec<O::Item>, op: O, identity: Option<O::Item>) -> Result<Self, Error> {
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }
        let identity = identity
            .or_else(|| op.identity())
            .ok_or(Error::MissingIdentity)?;

        // Internal nodes are placeholders until `build` overwrites them.
        let len = values.len();
        let mut data = Vec::with_capacity(2 * len);
        data.resize(len, identity.clone());
        data.extend(values);

        let mut tree = Self {
            len,
            data,
            identity,
            op,
        };
        tree.build();
        debug!("Built segment tree over {} elements", len);
        Ok(tree)
    }

    fn build(&mut self) {
        for index in (1..self.len).rev() {
            self.recalc_at(index);
        }
    }

    fn recalc_at(&mut self, index: usize) {
        self.data[index] = self
            .op
            .combine(&self.data[left_child(index)], &self.data[right_child(index)]);
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Number of elements. Fixed at construction.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; trees are never built empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn identity(&self) -> &O::Item {
        &self.identity
    }

    pub fn op(&self) -> &O {
        &self.op
    }

    /// Current elements in sequence order.
    pub fn leaves(&self) -> &[O::Item] {
        &self.data[self.len..]
    }

    pub fn get(&self, index: usize) -> Result<&O::Item, Error> {
        self.check_index(index)?;
        Ok(&self.data[self.len + index])
    }

    /// Changes the element at `index` in place and recomputes its ancestors.
    pub fn modify(&mut self, index: usize, op: impl FnOnce(&mut O::Item)) -> Result<(), Error> {
        self.check_index(index)?;
        let mut index = index + self.len;
        op(&mut self.data[index]);
        while index > 1 {
            index = parent(index);
            self.recalc_at(index);
        }
        Ok(())
    }

    /// Overwrites the element at `index`.
    pub fn update(&mut self, index: usize, value: O::Item) -> Result<(), Error> {
        self.modify(index, |item| *item = value)
    }

    /// Folds the elements in the half-open range `left..right` in order.
    ///
    /// An empty range yields the identity.
    pub fn query(&self, left: usize, right: usize) -> Result<O::Item, Error> {
        if left > right || right > self.len {
            return Err(Error::RangeOutOfBounds {
                left,
                right,
                len: self.len,
            });
        }
        Ok(self.fold(left, right))
    }

    fn fold(&self, left: usize, right: usize) -> O::Item {
        if left == right {
            return self.identity.clone();
        }

        // `acc_left` only grows to the right and `acc_right` only to the
        // left, so combining them at the end yields the in-order fold.
        let mut acc_left = self.identity.clone();
        let mut acc_right = self.identity.clone();
        let mut l = left + self.len;
        let mut r = right + self.len;
        while l < r {
            if l & 1 == 1 {
                acc_left = self.op.combine(&acc_left, &self.data[l]);
                l += 1;
            }
            if r & 1 == 1 {
                r -= 1;
                acc_right = self.op.combine(&self.data[r], &acc_right);
            }
            l = parent(l);
            r = parent(r);
        }

        self.op.combine(&acc_left, &acc_right)
    }

    /// Fold over all elements.
    pub fn total(&self) -> O::Item {
        // Node 1 is only the full fold when `len` is a power of two.
        self.fold(0, self.len)
    }
}

impl<T: Numeric> SegTree<Min<T>> {
    /// Range-minimum tree. Defaults the identity to the largest value of `T`.
    pub fn min(values: Vec<T>, identity: Option<T>) -> Result<Self, Error> {
        Self::new(values, Min::default(), identity)
    }
}

impl<T: Numeric> SegTree<Max<T>> {
    /// Range-maximum tree. Defaults the identity to the smallest value of `T`.
    pub fn max(values: Vec<T>, identity: Option<T>) -> Result<Self, Error> {
        Self::new(values, Max::default(), identity)
    }
}

impl<T: Numeric> SegTree<Sum<T>> {
    /// Range-sum tree. Defaults the identity to zero.
    pub fn sum(values: Vec<T>, identity: Option<T>) -> Result<Self, Error> {
        Self::new(values, Sum::default(), identity)
    }
}

impl<T: Clone> SegTree<Dynamic<T>> {
    pub fn generic(
        values: Vec<T>,
        combine: impl Fn(&T, &T) -> T + 'static,
        identity: T,
    ) -> Result<Self, Error> {
        Self::new(values, Dynamic::new(combine), Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn sum_scenario() {
        let mut tree = SegTree::sum(vec![5i64, 3, 8, 1], None).unwrap();
        assert_eq!(tree.query(0, 4), Ok(17));
        tree.update(2, 10).unwrap();
        assert_eq!(tree.query(0, 4), Ok(19));
        assert_eq!(tree.query(1, 3), Ok(13));
    }

    #[test]
    fn min_scenario() {
        let mut tree = SegTree::min(vec![5i64, 3, 8, 1], None).unwrap();
        assert_eq!(tree.query(1, 3), Ok(3));
        tree.update(0, 100).unwrap();
        assert_eq!(tree.query(0, 2), Ok(3));
    }

    #[test]
    fn max_over_floats() {
        let tree = SegTree::max(vec![-1.5f64, -7.25, -0.5, -3.0, -2.0], None).unwrap();
        assert_eq!(tree.query(0, 2), Ok(-1.5));
        assert_eq!(tree.query(1, 5), Ok(-0.5));
        assert_eq!(tree.total(), -0.5);
    }

    #[test]
    fn concatenation_keeps_order() {
        let tree = SegTree::generic(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            |a: &String, b: &String| format!("{}{}", a, b),
            String::new(),
        )
        .unwrap();
        assert_eq!(tree.query(0, 3).unwrap(), "abc");
        assert_eq!(tree.query(1, 2).unwrap(), "b");
        assert_eq!(tree.query(1, 1).unwrap(), "");
    }

    #[test]
    fn concatenation_on_odd_length() {
        let letters: Vec<String> = "abcdefg".chars().map(String::from).collect();
        let tree = SegTree::generic(letters, |a: &String, b: &String| a.clone() + b, String::new())
            .unwrap();
        for left in 0..=7 {
            for right in left..=7 {
                assert_eq!(tree.query(left, right).unwrap(), &"abcdefg"[left..right]);
            }
        }
    }

    #[test]
    fn affine_composition_keeps_order() {
        // (a, b) represents x -> a * x + b; combining applies left, then right.
        const P: u64 = 1_000_000_007;
        let compose = |f: &(u64, u64), g: &(u64, u64)| (f.0 * g.0 % P, (f.1 * g.0 + g.1) % P);
        let maps = vec![(2, 3), (5, 1), (1, 7), (3, 0), (4, 4), (6, 2)];
        let tree = SegTree::generic(maps.clone(), compose, (1, 0)).unwrap();
        for left in 0..=maps.len() {
            for right in left..=maps.len() {
                let expected = maps[left..right].iter().fold((1, 0), |acc, f| compose(&acc, f));
                assert_eq!(tree.query(left, right), Ok(expected));
            }
        }
    }

    #[test]
    fn single_element() {
        let mut tree = SegTree::sum(vec![42u32], None).unwrap();
        assert_eq!(tree.query(0, 1), Ok(42));
        tree.update(0, 7).unwrap();
        assert_eq!(tree.total(), 7);
        assert_eq!(tree.query(0, 0), Ok(0));
        assert_eq!(tree.query(1, 1), Ok(0));
    }

    #[test]
    fn identity_override_is_trusted() {
        let tree = SegTree::min(vec![5i64, 3], Some(-1)).unwrap();
        assert_eq!(tree.identity(), &-1);
        assert_eq!(tree.query(0, 0), Ok(-1));
        assert_eq!(tree.query(0, 2), Ok(-1));
    }

    #[test]
    fn modify_in_place() {
        let mut tree = SegTree::sum(vec![1i32, 2, 3], None).unwrap();
        tree.modify(1, |x| *x *= 10).unwrap();
        assert_eq!(tree.leaves(), &[1, 20, 3]);
        assert_eq!(tree.total(), 24);
    }

    #[test]
    fn construction_errors() {
        assert_eq!(SegTree::<Min<i64>>::min(vec![], None).unwrap_err(), Error::EmptyInput);
        let err = SegTree::new(vec![1u64], Dynamic::new(|a: &u64, b: &u64| a * b), None)
            .unwrap_err();
        assert_eq!(err, Error::MissingIdentity);
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn out_of_range_is_rejected_without_mutation() {
        let mut tree = SegTree::sum(vec![1i64, 2, 3, 4], None).unwrap();
        assert_eq!(
            tree.update(4, 100),
            Err(Error::IndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(
            tree.query(3, 5),
            Err(Error::RangeOutOfBounds {
                left: 3,
                right: 5,
                len: 4
            })
        );
        assert_eq!(tree.query(3, 2).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert!(tree.get(4).is_err());
        assert_eq!(tree.total(), 10);
    }
}
