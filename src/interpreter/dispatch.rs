/// The operator table keyed by operand tags.
pub mod core;
/// Calendar arithmetic and comparison.
pub(crate) mod date;
/// Complex scalar arithmetic, comparison, logic and bit operations.
pub mod scalar;
/// String equality and concatenation.
mod text;
/// Elementwise vector arithmetic and whole-vector equality.
mod vector;
