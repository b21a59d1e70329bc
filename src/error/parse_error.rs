#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur while tokenizing or compiling an
/// expression.
pub enum ParseError {
    /// The tokenizer met a character sequence it does not recognize.
    UnrecognizedToken {
        /// The offending text.
        token: String,
    },
    /// A bracket has no matching partner.
    UnmatchedBracket {
        /// The bracket that could not be matched.
        bracket: char,
    },
    /// A comma appeared outside a call or vector literal, or without an
    /// argument on one of its sides.
    StrayComma,
    /// An identifier directly followed by `(` is not a registered function.
    NotAFunction {
        /// The identifier that was called.
        name: String,
    },
    /// A conditional expression is missing its `?` or `:`.
    MalformedTernary {
        /// What is missing.
        details: String,
    },
    /// A token appeared where it cannot be used.
    UnexpectedToken {
        /// The token that was found.
        token: String,
    },
    /// The expression ended while an operand was still expected.
    UnexpectedEnd,
    /// Nothing to evaluate.
    EmptyExpression,
    /// The left-hand side of `=` is not a plain, assignable identifier.
    InvalidAssignmentTarget {
        /// The rejected target text.
        name: String,
    },
    /// A script block header or its indented body is malformed.
    MalformedBlock {
        /// What is wrong with the block.
        details: String,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedToken { token } => write!(f, "Unrecognized token: '{token}'."),
            Self::UnmatchedBracket { bracket } => write!(f, "Unmatched bracket '{bracket}'."),
            Self::StrayComma => write!(f, "Unexpected ','."),
            Self::NotAFunction { name } => write!(f, "Variable '{name}' is not a function."),
            Self::MalformedTernary { details } => {
                write!(f, "Malformed conditional expression: {details}.")
            },
            Self::UnexpectedToken { token } => write!(f, "Unexpected token: {token}."),
            Self::UnexpectedEnd => write!(f, "Unexpected end of input."),
            Self::EmptyExpression => write!(f, "Nothing to evaluate."),
            Self::InvalidAssignmentTarget { name } => {
                write!(f, "Cannot assign to '{name}'.")
            },
            Self::MalformedBlock { details } => write!(f, "Malformed block: {details}."),
        }
    }
}

impl std::error::Error for ParseError {}
