/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between floating-point
/// and integer types without risking silent data loss. Bitwise operators,
/// shifts, date construction and vector lengths all go through these helpers.
///
/// All functions return a `Result`, which is `Ok` if the conversion is lossless
/// and valid, or a [`RuntimeError`](crate::error::RuntimeError) otherwise.
pub mod num;
