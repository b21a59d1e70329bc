/// Complex number support.
///
/// Defines the `ComplexNumber` type that backs every numeric scalar. Includes
/// arithmetic operators, powers, logarithms and the trigonometric family used
/// by the standard function library.
pub mod complex;

/// The tagged runtime value and its tag enum.
pub mod core;
