/// Vector reductions and the variadic numeric functions.
mod aggregate;
/// Elementwise numeric functions and `check`.
mod builtin;
/// The function registry, arities and the built-in table.
pub mod core;
/// Calendar constructors and accessors.
mod date;
/// String functions.
mod text;
