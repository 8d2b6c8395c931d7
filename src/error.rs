use std::fmt::{self, Display, Formatter};

/// Broad category of an [`Error`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The tree could not be configured from the given arguments.
    Configuration,
    /// An element had a kind the requested tree cannot hold.
    Type,
    /// An index or range fell outside of the tree.
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Trees are never built from an empty sequence.
    EmptyInput,
    /// The combine operation has no canonical identity and none was given.
    MissingIdentity,
    /// A named builder was handed a non-numeric element.
    UnsupportedType { found: &'static str },
    /// An element's kind differs from the kind inferred from the first one.
    MixedTypes {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    /// A point index `>= len`.
    IndexOutOfRange { index: usize, len: usize },
    /// A half-open range not contained in `[0, len]`, or with `left > right`.
    RangeOutOfBounds {
        left: usize,
        right: usize,
        len: usize,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput | Self::MissingIdentity => ErrorKind::Configuration,
            Self::UnsupportedType { .. } | Self::MixedTypes { .. } => ErrorKind::Type,
            Self::IndexOutOfRange { .. } | Self::RangeOutOfBounds { .. } => ErrorKind::OutOfRange,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input sequence must be non-empty"),
            Self::MissingIdentity => write!(
                f,
                "an identity value is required for a custom combine operation"
            ),
            Self::UnsupportedType { found } => write!(
                f,
                "unsupported element type: must be numeric (found {})",
                found
            ),
            Self::MixedTypes {
                index,
                expected,
                found,
            } => write!(
                f,
                "element {} has type {}, but the sequence holds {} values",
                index, found, expected
            ),
            Self::IndexOutOfRange { index, len } => write!(
                f,
                "index out of range: the len is {} but the index is {}",
                len, index
            ),
            Self::RangeOutOfBounds { left, right, len } => write!(
                f,
                "range {}..{} out of bounds for length {}",
                left, right, len
            ),
        }
    }
}

impl std::error::Error for Error {}
