use derivative::Derivative;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Associative binary operation a [`SegTree`](crate::SegTree) folds with.
///
/// `combine` must be associative over every triple the tree can produce.
/// It need not be commutative: the tree always combines a left operand with
/// the right operand that follows it in sequence order.
pub trait CombineOp {
    type Item: Clone;

    fn combine(&self, left: &Self::Item, right: &Self::Item) -> Self::Item;

    /// Neutral element of `combine`, if the operation knows one.
    fn identity(&self) -> Option<Self::Item> {
        None
    }
}

/// Closed set of numeric element kinds supported by the static operations.
pub trait Numeric: Copy + PartialOrd + Debug {
    const NAME: &'static str;

    /// Additive zero.
    const ZERO: Self;

    /// Smallest value of the kind. Floats use negative infinity rather than
    /// `MIN`, so the max identity stays neutral for infinite elements.
    const LOWEST: Self;

    /// Largest value of the kind. Floats use positive infinity rather than
    /// `MAX`, so the min identity stays neutral for infinite elements.
    const HIGHEST: Self;

    fn minimum(self, other: Self) -> Self;

    fn maximum(self, other: Self) -> Self;

    /// Sum of both values. Integers wrap on overflow.
    fn add(self, other: Self) -> Self;
}

macro_rules! impl_numeric_int {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                const NAME: &'static str = stringify!($ty);
                const ZERO: Self = 0;
                const LOWEST: Self = <$ty>::MIN;
                const HIGHEST: Self = <$ty>::MAX;

                fn minimum(self, other: Self) -> Self {
                    Ord::min(self, other)
                }

                fn maximum(self, other: Self) -> Self {
                    Ord::max(self, other)
                }

                fn add(self, other: Self) -> Self {
                    self.wrapping_add(other)
                }
            }
        )*
    };
}

macro_rules! impl_numeric_float {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                const NAME: &'static str = stringify!($ty);
                const ZERO: Self = 0.0;
                const LOWEST: Self = <$ty>::NEG_INFINITY;
                const HIGHEST: Self = <$ty>::INFINITY;

                fn minimum(self, other: Self) -> Self {
                    self.min(other)
                }

                fn maximum(self, other: Self) -> Self {
                    self.max(other)
                }

                fn add(self, other: Self) -> Self {
                    self + other
                }
            }
        )*
    };
}

impl_numeric_int!(i32, i64, u32, u64);
impl_numeric_float!(f32, f64);

/// Minimum over a numeric kind; identity is the kind's largest value.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Clone(bound = ""), Copy(bound = ""), Default(bound = ""))]
pub struct Min<T>(PhantomData<T>);

/// Maximum over a numeric kind; identity is the kind's smallest value.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Clone(bound = ""), Copy(bound = ""), Default(bound = ""))]
pub struct Max<T>(PhantomData<T>);

/// Sum over a numeric kind; identity is zero.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Clone(bound = ""), Copy(bound = ""), Default(bound = ""))]
pub struct Sum<T>(PhantomData<T>);

impl<T: Numeric> CombineOp for Min<T> {
    type Item = T;

    #[inline]
    fn combine(&self, left: &T, right: &T) -> T {
        left.minimum(*right)
    }

    fn identity(&self) -> Option<T> {
        Some(T::HIGHEST)
    }
}

impl<T: Numeric> CombineOp for Max<T> {
    type Item = T;

    #[inline]
    fn combine(&self, left: &T, right: &T) -> T {
        left.maximum(*right)
    }

    fn identity(&self) -> Option<T> {
        Some(T::LOWEST)
    }
}

impl<T: Numeric> CombineOp for Sum<T> {
    type Item = T;

    #[inline]
    fn combine(&self, left: &T, right: &T) -> T {
        left.add(*right)
    }

    fn identity(&self) -> Option<T> {
        Some(T::ZERO)
    }
}

/// Caller-supplied operation over an arbitrary element type.
///
/// Every combine goes through a boxed closure, and there is no canonical
/// identity, so trees over a `Dynamic` need one passed in explicitly.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Dynamic<T> {
    #[derivative(Debug = "ignore")]
    func: Box<dyn Fn(&T, &T) -> T>,
}

impl<T> Dynamic<T> {
    pub fn new(func: impl Fn(&T, &T) -> T + 'static) -> Self {
        Self {
            func: Box::new(func),
        }
    }
}

impl<T: Clone> CombineOp for Dynamic<T> {
    type Item = T;

    fn combine(&self, left: &T, right: &T) -> T {
        (self.func)(left, right)
    }
}
