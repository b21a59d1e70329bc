/// Errors raised while turning source text into an RPN program.
///
/// Covers the tokenizer, the shunting-yard compiler and the assignment
/// layer's target validation. Parse errors never depend on runtime state.
pub mod parse_error;
/// Errors raised while executing an RPN program.
///
/// Includes dispatch misses, arity mismatches, unknown names, stack
/// desynchronization and errors reported by native functions.
pub mod runtime_error;

use std::fmt;

pub use parse_error::ParseError;
pub use runtime_error::{RuntimeError, RuntimeResult};

/// Internal error channel threaded through every recursive evaluation path.
///
/// `Cancelled` is carried alongside real failures so that `?` propagates an
/// abort request exactly like an error, but it is surfaced to callers as a
/// distinct outcome by [`EvaluateError`].
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The source could not be tokenized or compiled.
    Parse(ParseError),
    /// The program failed while executing.
    Runtime(RuntimeError),
    /// The caller requested an abort through the cancellation token.
    Cancelled,
}

/// Result type used by the front-end, the preprocessor and the evaluator.
pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    /// Returns `true` for errors that speculative rewrites must never swallow.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self,
                 Self::Cancelled | Self::Runtime(RuntimeError::RecursionLimit { .. }))
    }
}

impl From<ParseError> for EvalError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

impl From<RuntimeError> for EvalError {
    fn from(error: RuntimeError) -> Self {
        Self::Runtime(error)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Runtime(e) => write!(f, "{e}"),
            Self::Cancelled => write!(f, "Operation cancelled."),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Runtime(e) => Some(e),
            Self::Cancelled => None,
        }
    }
}

/// The single outer error returned by `Engine::evaluate`.
///
/// A failed evaluation wraps the innermost error and keeps it reachable
/// through [`std::error::Error::source`].
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluateError {
    /// The cancellation token was set before or during evaluation.
    Cancelled,
    /// Evaluation of `expression` failed.
    Failed {
        /// The trimmed source text that was being evaluated.
        expression: String,
        /// The error that caused the failure.
        source:     EvalError,
    },
}

impl EvaluateError {
    /// Wraps an internal error for the given source text.
    #[must_use]
    pub fn new(expression: &str, error: EvalError) -> Self {
        match error {
            EvalError::Cancelled => Self::Cancelled,
            source => Self::Failed { expression: expression.to_string(),
                                     source },
        }
    }

    /// Returns `true` if evaluation was aborted rather than failed.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the innermost error, if evaluation failed.
    #[must_use]
    pub const fn cause(&self) -> Option<&EvalError> {
        match self {
            Self::Cancelled => None,
            Self::Failed { source, .. } => Some(source),
        }
    }
}

impl fmt::Display for EvaluateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Operation cancelled."),
            Self::Failed { expression, source } => {
                write!(f, "Failed to evaluate '{expression}': {source}")
            },
        }
    }
}

impl std::error::Error for EvaluateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cancelled => None,
            Self::Failed { source, .. } => Some(source),
        }
    }
}

/// An evaluation failure inside a multi-line script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    /// 1-based source line where the failure happened.
    pub line:  usize,
    /// The failure itself.
    pub error: EvaluateError,
}

impl ScriptError {
    /// Returns `true` if the script was aborted through the cancellation
    /// token.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.error.is_cancelled()
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error on line {}: {}", self.line, self.error)
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
