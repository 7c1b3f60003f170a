//! Representations of "no value" that avoid wrapper allocation.
//!
//! Primitive-valued tables reserve one value (the missing value) to mark
//! vacant slots, so that value can never be stored. Object-valued tables
//! mark vacancy with `None` and, when nulls are accepted, keep a private
//! `Masked::Null` marker for an entry whose value is null. The marker is
//! translated back to `None` at every public boundary.

use crate::error::{CollectionError, Result};
use crate::hashing::Primitive;

/// Fails with `MissingValue` when `value` is the reserved missing value.
#[inline]
pub(crate) fn check_value<V: Primitive>(value: V, missing: V) -> Result<V> {
    if value == missing {
        return Err(missing_value_error(missing));
    }
    Ok(value)
}

#[cold]
#[inline(never)]
pub(crate) fn missing_value_error<V: Primitive>(missing: V) -> CollectionError {
    CollectionError::MissingValue(missing.to_string())
}

/// Stored form of a value in a table that may hold nulls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Masked<V> {
    Null,
    Value(V),
}

impl<V> Masked<V> {
    #[inline]
    pub(crate) fn get(&self) -> Option<&V> {
        match self {
            Masked::Null => None,
            Masked::Value(v) => Some(v),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self) -> Option<&mut V> {
        match self {
            Masked::Null => None,
            Masked::Value(v) => Some(v),
        }
    }

    #[inline]
    pub(crate) fn into_option(self) -> Option<V> {
        match self {
            Masked::Null => None,
            Masked::Value(v) => Some(v),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::NonNullValues {}
    impl Sealed for super::NullableValues {}
}

/// Whether an object-valued table accepts null values.
pub trait NullPolicy: sealed::Sealed {
    const ACCEPTS_NULL: bool;
}

/// Masked form of a null value, or `NullValue` if `P` rejects nulls.
#[inline]
pub(crate) fn masked_null<P: NullPolicy, V>() -> Result<Masked<V>> {
    if P::ACCEPTS_NULL {
        Ok(Masked::Null)
    } else {
        Err(CollectionError::NullValue)
    }
}

/// Every stored value is present; storing a null is a usage error.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct NonNullValues;

/// Null values are stored behind a private marker.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct NullableValues;

impl NullPolicy for NonNullValues {
    const ACCEPTS_NULL: bool = false;
}

impl NullPolicy for NullableValues {
    const ACCEPTS_NULL: bool = true;
}
