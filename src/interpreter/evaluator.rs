/// Cooperative cancellation.
///
/// A cheaply clonable flag that callers set from another thread; every
/// evaluation path polls it and unwinds with `Cancelled`.
pub mod cancel;

/// The evaluation engine.
///
/// Owns the function registry, the operator table and the options, and
/// routes statements and expressions through the compiler and the stack
/// machine.
pub mod core;

/// The RPN stack machine.
///
/// Executes a compiled program instruction by instruction, resolving
/// variables against the context and dispatching operators and calls.
pub mod machine;

/// Multi-line scripts with `for`, `while` and `if` blocks.
pub mod script;

mod statement;

/// Text-level conditional rewriting.
///
/// Splits sources at a top-level `?`, and substitutes the values of groups
/// and call arguments that contain conditionals before compilation.
pub mod ternary;
