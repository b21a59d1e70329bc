#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur while executing a compiled program.
pub enum RuntimeError {
    /// Tried to read a variable that was never assigned.
    UnknownVariable {
        /// The name of the variable.
        name: String,
    },
    /// Called a function that is not registered.
    UnknownFunction {
        /// The name of the function.
        name: String,
    },
    /// A fixed-arity function received the wrong number of arguments.
    ArgumentCountMismatch {
        /// The name of the function.
        name:     String,
        /// The declared argument count.
        expected: usize,
        /// The number of arguments supplied.
        found:    usize,
    },
    /// No dispatch table entry exists for the operator and operand tags.
    UnsupportedOperation {
        /// The operator symbol.
        operator: String,
        /// Tag name of the left operand.
        left:     &'static str,
        /// Tag name of the right operand.
        right:    &'static str,
    },
    /// An instruction needed more operands than the stack holds.
    StackUnderflow {
        /// The instruction that underflowed.
        instruction: String,
    },
    /// The program finished with a stack that does not hold exactly one
    /// value.
    MalformedProgram {
        /// The number of values left on the stack.
        remaining: usize,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
    },
    /// An argument was invalid or out of range.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
    },
    /// Attempted division by zero.
    DivisionByZero,
    /// A real number had to be an integer but was fractional.
    ValueIsFractional {
        /// The offending value.
        value: f64,
    },
    /// A real number does not fit the integer range required by an operation.
    ValueOutOfRange {
        /// The offending value.
        value: f64,
    },
    /// Nesting exceeded the configured recursion depth.
    RecursionLimit {
        /// The configured limit.
        depth: usize,
    },
    /// A line of a constants block could not be loaded.
    InvalidConstant {
        /// 1-based line inside the constants block.
        line:    usize,
        /// Why the line was rejected.
        details: String,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariable { name } => write!(f, "Unknown variable '{name}'."),
            Self::UnknownFunction { name } => write!(f, "Unknown function '{name}'."),
            Self::ArgumentCountMismatch { name,
                                          expected,
                                          found, } => write!(f,
                                                             "Function '{name}' expects {expected} argument(s) but got {found}."),
            Self::UnsupportedOperation { operator, left, right } => write!(f,
                                                                           "Operator '{operator}' is not defined for {left} and {right}."),
            Self::StackUnderflow { instruction } => write!(f,
                                                           "Not enough operands for '{instruction}'."),
            Self::MalformedProgram { remaining } => write!(f,
                                                           "Expression left {remaining} values instead of one."),
            Self::TypeError { details } => write!(f, "Type error: {details}."),
            Self::InvalidArgument { details } => write!(f, "Invalid argument: {details}."),
            Self::DivisionByZero => write!(f, "Division by zero."),
            Self::ValueIsFractional { value } => {
                write!(f, "Value {value} is fractional but an integer is required.")
            },
            Self::ValueOutOfRange { value } => write!(f, "Value {value} is out of range."),
            Self::RecursionLimit { depth } => {
                write!(f, "Expression nesting exceeds the limit of {depth}.")
            },
            Self::InvalidConstant { line, details } => {
                write!(f, "Invalid constant on line {line}: {details}.")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type used by native functions and dispatch handlers.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
