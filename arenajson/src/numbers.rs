// SPDX-License-Identifier: Apache-2.0

//! Numeric storage types selected by the `int32`/`int64` and
//! `float32`/`float64` features.

use core::cmp::Ordering;

#[cfg(feature = "int64")]
pub type Integer = i64;
#[cfg(feature = "int64")]
pub type UInt = u64;

#[cfg(feature = "int32")]
pub type Integer = i32;
#[cfg(feature = "int32")]
pub type UInt = u32;

#[cfg(feature = "float64")]
pub type Float = f64;

#[cfg(feature = "float32")]
pub type Float = f32;

pub(crate) const UINT_SIZE: usize = core::mem::size_of::<UInt>();
pub(crate) const FLOAT_SIZE: usize = core::mem::size_of::<Float>();

/// A JSON number the way a record stores it.
///
/// Integers keep sign and magnitude apart so the full unsigned range is
/// representable. Zero is always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    PositiveInteger(UInt),
    NegativeInteger(UInt),
    Float(Float),
}

impl Number {
    pub fn from_integer(value: Integer) -> Self {
        if value < 0 {
            Number::NegativeInteger(value.unsigned_abs())
        } else {
            Number::PositiveInteger(value.unsigned_abs())
        }
    }

    pub fn from_unsigned(value: UInt) -> Self {
        Number::PositiveInteger(value)
    }

    /// Any signed probe value; falls back to a float if the configured
    /// integer width cannot hold it.
    pub(crate) fn from_i64(value: i64) -> Self {
        let magnitude = value.unsigned_abs();
        match UInt::try_from(magnitude) {
            Ok(magnitude) if value < 0 => Number::NegativeInteger(magnitude),
            Ok(magnitude) => Number::PositiveInteger(magnitude),
            Err(_) => Number::Float(value as Float),
        }
    }

    pub(crate) fn from_u64(value: u64) -> Self {
        match UInt::try_from(value) {
            Ok(value) => Number::PositiveInteger(value),
            Err(_) => Number::Float(value as Float),
        }
    }

    pub fn to_float(self) -> Float {
        match self {
            Number::PositiveInteger(magnitude) => magnitude as Float,
            Number::NegativeInteger(magnitude) => -(magnitude as Float),
            Number::Float(value) => value,
        }
    }

    /// The value as a signed integer, if it fits. Floats truncate.
    pub fn to_integer(self) -> Option<Integer> {
        match self {
            Number::PositiveInteger(magnitude) => Integer::try_from(magnitude).ok(),
            Number::NegativeInteger(magnitude) => {
                if magnitude == Integer::MIN.unsigned_abs() {
                    Some(Integer::MIN)
                } else {
                    Integer::try_from(magnitude).ok().map(|value| -value)
                }
            }
            Number::Float(value) => {
                let limit = -(Integer::MIN as Float);
                (value >= -limit && value < limit).then(|| value as Integer)
            }
        }
    }

    /// The value as an unsigned integer, if it fits. Floats truncate.
    pub fn to_unsigned(self) -> Option<UInt> {
        match self {
            Number::PositiveInteger(magnitude) => Some(magnitude),
            Number::NegativeInteger(_) => None,
            Number::Float(value) => {
                let limit = UInt::MAX as Float;
                (value > -1.0 && value < limit).then(|| value as UInt)
            }
        }
    }

    /// Numeric order across integer and float representations.
    ///
    /// `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        use Number::*;
        match (self, other) {
            (PositiveInteger(lhs), PositiveInteger(rhs)) => Some(lhs.cmp(&rhs)),
            (NegativeInteger(lhs), NegativeInteger(rhs)) => Some(rhs.cmp(&lhs)),
            (PositiveInteger(_), NegativeInteger(_)) => Some(Ordering::Greater),
            (NegativeInteger(_), PositiveInteger(_)) => Some(Ordering::Less),
            _ => self.to_float().partial_cmp(&other.to_float()),
        }
    }
}
