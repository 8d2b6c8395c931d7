//! Segment trees over a fixed-size sequence with point updates and
//! order-preserving range folds.
//!
//! Numeric trees use a statically dispatched [`Min`], [`Max`] or [`Sum`]
//! with a canonical identity. Any other associative operation can be wrapped
//! in a [`Dynamic`], which needs an explicit identity.
//!
//! ```
//! use segtree::SegTree;
//!
//! let mut tree = SegTree::sum(vec![5i64, 3, 8, 1], None)?;
//! assert_eq!(tree.query(0, 4)?, 17);
//! tree.update(2, 10)?;
//! assert_eq!(tree.query(1, 3)?, 13);
//! # Ok::<(), segtree::Error>(())
//! ```

pub mod bench;
pub mod combine;
pub mod dispatch;
mod error;
pub mod naive;
pub mod report;
mod segtree;

pub use combine::{CombineOp, Dynamic, Max, Min, Numeric, Sum};
pub use dispatch::{Aggregate, NumericKind, NumericTree, Value};
pub use error::{Error, ErrorKind};
pub use naive::{NaiveFold, RangeFold};
pub use segtree::SegTree;
