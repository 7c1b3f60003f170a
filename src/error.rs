//! Error type shared by every container.
//!
//! Configuration errors surface from constructors; usage errors surface
//! from the call that attempted the invalid store. In both cases the
//! container is left exactly as it was before the call.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectionError {
    /// Load factor outside the open interval (0, 1).
    #[error("load factor must be in (0, 1), got {0}")]
    InvalidLoadFactor(f32),

    /// A capacity (or set count / set size) of zero was requested.
    #[error("requested capacity must be positive")]
    ZeroCapacity,

    /// The requested capacity cannot be represented as a power of two.
    #[error("requested capacity {0} exceeds the maximum table capacity")]
    CapacityOverflow(usize),

    /// Attempt to store the reserved missing value as a value.
    #[error("cannot store the missing value {0} as a value")]
    MissingValue(String),

    /// Attempt to store a null value in a map that does not accept nulls.
    #[error("this map does not accept null values")]
    NullValue,
}

impl CollectionError {
    /// True for errors raised at construction time.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            CollectionError::InvalidLoadFactor(_)
                | CollectionError::ZeroCapacity
                | CollectionError::CapacityOverflow(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CollectionError>;
