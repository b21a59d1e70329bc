//! # quanta
//!
//! quanta is a small calculator language written in Rust.
//! It tokenizes expressions, compiles them to reverse Polish notation with a
//! shunting-yard pass and evaluates them on a stack machine over complex
//! scalars, vectors, strings and dates, with variables, assignments and
//! conditional expressions.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised while tokenizing,
/// compiling or executing code, plus the outer errors returned to callers of
/// the engine and the script runner.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, compiler, machine).
/// - Separates cancellation from failure at the public boundary.
/// - Supports integration with standard error handling traits and reporting
///   utilities.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, compilation, dispatch, the function
/// library, value representations and the evaluation engine. It exposes the
/// public API for evaluating expressions, statements and scripts.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, compiler, machine and values.
/// - Provides entry points for compiling and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion.
///
/// # Responsibilities
/// - Safely convert between `i64`, `usize`, `u32` and `f64` without silent
///   data loss.
pub mod util;

pub use crate::{
    error::{EvaluateError, ScriptError},
    interpreter::{
        context::Context,
        evaluator::{
            cancel::CancellationToken,
            core::{Engine, EngineOptions, TernaryMode},
        },
        value::core::Value,
    },
};

/// Runs a script in a fresh context and returns the last value it produced.
///
/// Convenience wrapper around [`Engine::run_script`] with the default engine
/// and a token that is never cancelled.
///
/// # Errors
/// Returns the first failing line and its error.
///
/// # Examples
/// ```
/// use quanta::{Value, get_result};
///
/// let result = get_result("r = 2\narea = pi * r ^ 2\nround(area)");
/// assert_eq!(result, Ok(Some(Value::from(13.0))));
///
/// // 'x' is not defined.
/// let err = get_result("y = x + 1").unwrap_err();
/// assert_eq!(err.line, 1);
/// ```
pub fn get_result(source: &str) -> Result<Option<Value>, ScriptError> {
    let mut context = Context::new();
    Engine::default().run_script(source, &mut context, &CancellationToken::new())
}
