use crate::error::{RuntimeError, RuntimeResult};

/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_INT: u64 = 9_007_199_254_740_991;

/// Safely converts an `i64` to `f64` if and only if it is exactly
/// representable.
///
/// ## Errors
/// Returns `ValueOutOfRange` if the value exceeds `MAX_SAFE_INT` in absolute
/// value.
///
/// ## Example
/// ```
/// use quanta::util::num::{MAX_SAFE_INT, i64_to_f64_checked};
///
/// assert_eq!(i64_to_f64_checked(42).unwrap(), 42.0);
///
/// let big = MAX_SAFE_INT as i64 + 1;
/// assert!(i64_to_f64_checked(big).is_err());
/// ```
#[allow(clippy::cast_precision_loss)]
pub const fn i64_to_f64_checked(value: i64) -> RuntimeResult<f64> {
    if value.unsigned_abs() > MAX_SAFE_INT {
        return Err(RuntimeError::ValueOutOfRange { value: value as f64 });
    }
    Ok(value as f64)
}

/// Safely converts a `usize` to `f64` if and only if it is exactly
/// representable.
///
/// ## Errors
/// Returns `ValueOutOfRange` if the value exceeds `MAX_SAFE_INT`.
#[allow(clippy::cast_precision_loss)]
pub const fn usize_to_f64_checked(value: usize) -> RuntimeResult<f64> {
    if value as u64 > MAX_SAFE_INT {
        return Err(RuntimeError::ValueOutOfRange { value: value as f64 });
    }
    Ok(value as f64)
}

/// Safely converts an `f64` to `i64` if the value is finite, within range, and
/// not fractional.
///
/// ## Errors
/// - `ValueOutOfRange` for non-finite or out-of-range values.
/// - `ValueIsFractional` for values with a fractional part.
///
/// ## Example
/// ```
/// use quanta::{error::RuntimeError, util::num::f64_to_i64_checked};
///
/// assert_eq!(f64_to_i64_checked(1000.0).unwrap(), 1000);
///
/// let err = f64_to_i64_checked(1.5).unwrap_err();
/// assert!(matches!(err, RuntimeError::ValueIsFractional { .. }));
///
/// let err = f64_to_i64_checked(1e20).unwrap_err();
/// assert!(matches!(err, RuntimeError::ValueOutOfRange { .. }));
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn f64_to_i64_checked(value: f64) -> RuntimeResult<i64> {
    if !value.is_finite() || value.abs() > MAX_SAFE_INT as f64 {
        return Err(RuntimeError::ValueOutOfRange { value });
    }
    if value.fract() != 0.0 {
        return Err(RuntimeError::ValueIsFractional { value });
    }
    Ok(value as i64)
}

/// Safely converts an `f64` to a `u32`, as required by shift amounts and
/// calendar fields.
///
/// ## Errors
/// - `ValueOutOfRange` for negative, non-finite or too large values.
/// - `ValueIsFractional` for values with a fractional part.
///
/// ## Example
/// ```
/// use quanta::util::num::f64_to_u32_checked;
///
/// assert_eq!(f64_to_u32_checked(12.0).unwrap(), 12);
/// assert!(f64_to_u32_checked(-1.0).is_err());
/// ```
pub fn f64_to_u32_checked(value: f64) -> RuntimeResult<u32> {
    let integer = f64_to_i64_checked(value)?;
    u32::try_from(integer).map_err(|_| RuntimeError::ValueOutOfRange { value })
}

/// Safely converts an `f64` to an `i32`, as required by calendar years.
///
/// ## Errors
/// - `ValueOutOfRange` for non-finite or too large values.
/// - `ValueIsFractional` for values with a fractional part.
pub fn f64_to_i32_checked(value: f64) -> RuntimeResult<i32> {
    let integer = f64_to_i64_checked(value)?;
    i32::try_from(integer).map_err(|_| RuntimeError::ValueOutOfRange { value })
}
